use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::{
    db_types::{GateTransaction, LocalTransaction, MatchRecord, NewLocalTransaction, NewMatch},
    traits::InsertLocalTransactionResult,
};

#[derive(Debug, Clone, Error)]
pub enum ReconciliationError {
    #[error("Internal database error: {0}")]
    DatabaseError(String),
    #[error("Gate transaction #{0} is already matched")]
    AlreadyMatched(i64),
    #[error("Local transaction #{0} has already been processed")]
    LocalTransactionAlreadyProcessed(i64),
    #[error("User {user_id} has no claim on gate transaction #{gate_tx_id}")]
    OwnershipLinkMissing { user_id: i64, gate_tx_id: i64 },
}

impl From<sqlx::Error> for ReconciliationError {
    fn from(e: sqlx::Error) -> Self {
        Self::DatabaseError(e.to_string())
    }
}

/// Local marketplace transactions and the matches made against gate transactions.
#[allow(async_fn_in_trait)]
pub trait ReconciliationStore: Clone {
    /// Stores a completed marketplace transaction. Inserting the same `(user_id, order_id)` twice is a no-op that
    /// returns the existing record.
    async fn insert_local_transaction(
        &self,
        transaction: NewLocalTransaction,
    ) -> Result<InsertLocalTransactionResult, ReconciliationError>;

    async fn fetch_local_transaction(&self, id: i64) -> Result<Option<LocalTransaction>, ReconciliationError>;

    /// The user's unprocessed local transactions completed strictly after `since`, oldest first.
    async fn fetch_unprocessed_local_transactions(
        &self,
        user_id: i64,
        since: DateTime<Utc>,
    ) -> Result<Vec<LocalTransaction>, ReconciliationError>;

    /// Approved gate transactions the user has an unmatched ownership link to.
    async fn fetch_match_candidates(&self, user_id: i64) -> Result<Vec<GateTransaction>, ReconciliationError>;

    /// True if any match references the gate transaction with row id `gate_tx_id`.
    async fn match_exists(&self, gate_tx_id: i64) -> Result<bool, ReconciliationError>;

    /// Atomically creates the match, marks the local transaction processed and marks the ownership links to the gate
    /// transaction matched. Either all of these happen or none do.
    ///
    /// Fails with [`ReconciliationError::AlreadyMatched`] if another match already references the gate transaction,
    /// and with [`ReconciliationError::LocalTransactionAlreadyProcessed`] if the local transaction was consumed in
    /// the meantime.
    async fn record_match(&self, new_match: NewMatch) -> Result<MatchRecord, ReconciliationError>;

    async fn fetch_matches_for_user(&self, user_id: i64) -> Result<Vec<MatchRecord>, ReconciliationError>;

    async fn fetch_match_for_gate_transaction(
        &self,
        gate_tx_id: i64,
    ) -> Result<Option<MatchRecord>, ReconciliationError>;

    /// Users that have at least one unprocessed local transaction.
    async fn fetch_users_with_pending_local_transactions(&self) -> Result<Vec<i64>, ReconciliationError>;
}
