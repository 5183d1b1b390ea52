mod helpers;
mod local_transactions;
mod reconcile;
mod stats;
