pub mod gate;
pub mod marketplace;
