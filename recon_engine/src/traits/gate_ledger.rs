use thiserror::Error;

use crate::{
    db_types::{GateTransaction, NewGateTransaction, OwnershipLink},
    traits::{ClaimResult, UpsertResult},
};

#[derive(Debug, Clone, Error)]
pub enum GateLedgerError {
    #[error("Internal database error: {0}")]
    DatabaseError(String),
    #[error("Gate transaction {0} already exists")]
    TransactionAlreadyExists(String),
    #[error("Gate transaction {0} does not exist")]
    TransactionNotFound(String),
}

impl From<sqlx::Error> for GateLedgerError {
    fn from(e: sqlx::Error) -> Self {
        Self::DatabaseError(e.to_string())
    }
}

/// The deduplicated record of gate payouts, and who has seen them.
#[allow(async_fn_in_trait)]
pub trait GateLedger: Clone {
    /// Stores a payout observation, keyed on its gate transaction id.
    ///
    /// The first observation inserts a record. Later observations only ever change `status` and `updated_at`, and
    /// set `approved_at` if it was previously unknown. Every other field keeps its first-seen value.
    async fn upsert_gate_transaction(&self, transaction: NewGateTransaction) -> Result<UpsertResult, GateLedgerError>;

    async fn fetch_gate_transaction(&self, transaction_id: &str) -> Result<Option<GateTransaction>, GateLedgerError>;

    /// Links `user_id` to the gate transaction with row id `gate_tx_id`, unless the link already exists.
    ///
    /// A new link starts out `matched` if the transaction is already referenced by a match.
    async fn claim_gate_transaction(&self, user_id: i64, gate_tx_id: i64) -> Result<ClaimResult, GateLedgerError>;

    async fn fetch_ownership_link(
        &self,
        user_id: i64,
        gate_tx_id: i64,
    ) -> Result<Option<OwnershipLink>, GateLedgerError>;

    async fn fetch_ownership_links(&self, user_id: i64) -> Result<Vec<OwnershipLink>, GateLedgerError>;
}
