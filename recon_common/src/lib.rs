mod helpers;
mod micro_units;

pub mod op;
mod secret;

pub use helpers::parse_boolean_flag;
pub use micro_units::{AmountConversionError, MicroUnits, MATCH_TOLERANCE, MICROS_PER_UNIT};
pub use secret::Secret;
