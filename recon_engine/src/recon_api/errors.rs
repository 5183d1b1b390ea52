use thiserror::Error;

use crate::traits::{GateLedgerError, OrderFeedError, ReconciliationError, SessionStoreError, TokenStoreError};

#[derive(Debug, Clone, Error)]
pub enum ReconApiError {
    #[error("Session store error: {0}")]
    SessionStore(#[from] SessionStoreError),
    #[error("Gate ledger error: {0}")]
    Ledger(#[from] GateLedgerError),
    #[error("Reconciliation error: {0}")]
    Reconciliation(#[from] ReconciliationError),
    #[error("Token store error: {0}")]
    TokenStore(#[from] TokenStoreError),
    #[error("Order feed error: {0}")]
    OrderFeed(#[from] OrderFeedError),
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}
