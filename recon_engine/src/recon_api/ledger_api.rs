use std::fmt::Debug;

use log::*;

use crate::{
    db_types::{GateSession, GateTransaction, MarketplaceToken, MatchRecord, NewLocalTransaction, OwnershipLink},
    recon_api::errors::ReconApiError,
    traits::{GateLedger, InsertLocalTransactionResult, ReconciliationStore, SessionStore, TokenStore},
};

/// `LedgerApi` is the intake side of the engine: it registers gate sessions and marketplace tokens handed over by
/// users and records the marketplace transactions that the matcher will later try to pair. It also offers read access
/// to the ledger.
#[derive(Clone)]
pub struct LedgerApi<B> {
    db: B,
}

impl<B> Debug for LedgerApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "LedgerApi")
    }
}

impl<B> LedgerApi<B> {
    pub fn new(db: B) -> Self {
        Self { db }
    }
}

impl<B> LedgerApi<B>
where B: SessionStore
{
    /// Stores a new active gate session for the user. The credential is stored as given; it is converted into a
    /// cookie header only when the gate is called.
    pub async fn register_session(&self, user_id: i64, credential: &str) -> Result<GateSession, ReconApiError> {
        let session = self.db.insert_session(user_id, credential).await?;
        Ok(session)
    }

    pub async fn active_sessions(&self) -> Result<Vec<GateSession>, ReconApiError> {
        let sessions = self.db.fetch_active_sessions().await?;
        Ok(sessions)
    }
}

impl<B> LedgerApi<B>
where B: TokenStore
{
    /// Stores the user's marketplace token, replacing the previous one.
    pub async fn register_marketplace_token(&self, user_id: i64, token: &str) -> Result<MarketplaceToken, ReconApiError> {
        let token = self.db.upsert_token(user_id, token).await?;
        Ok(token)
    }

    pub async fn marketplace_tokens(&self) -> Result<Vec<MarketplaceToken>, ReconApiError> {
        let tokens = self.db.fetch_tokens().await?;
        Ok(tokens)
    }
}

impl<B> LedgerApi<B>
where B: ReconciliationStore
{
    /// Records a completed marketplace transaction. Recording the same order twice for a user is harmless and
    /// returns the stored transaction.
    pub async fn record_local_transaction(
        &self,
        transaction: NewLocalTransaction,
    ) -> Result<InsertLocalTransactionResult, ReconApiError> {
        if transaction.order_id.trim().is_empty() {
            return Err(ReconApiError::InvalidInput("A local transaction needs an order id".to_string()));
        }
        let result = self.db.insert_local_transaction(transaction).await?;
        match &result {
            InsertLocalTransactionResult::Inserted(tx) => {
                debug!("📥️ Local transaction [{}] recorded for user {}", tx.order_id, tx.user_id)
            },
            InsertLocalTransactionResult::AlreadyExists(tx) => {
                debug!("📥️ Local transaction [{}] for user {} was already recorded", tx.order_id, tx.user_id)
            },
        }
        Ok(result)
    }

    pub async fn matches_for_user(&self, user_id: i64) -> Result<Vec<MatchRecord>, ReconApiError> {
        let matches = self.db.fetch_matches_for_user(user_id).await?;
        Ok(matches)
    }
}

impl<B> LedgerApi<B>
where B: GateLedger
{
    pub async fn gate_transaction(&self, transaction_id: &str) -> Result<Option<GateTransaction>, ReconApiError> {
        let transaction = self.db.fetch_gate_transaction(transaction_id).await?;
        Ok(transaction)
    }

    pub async fn ownership_links(&self, user_id: i64) -> Result<Vec<OwnershipLink>, ReconApiError> {
        let links = self.db.fetch_ownership_links(user_id).await?;
        Ok(links)
    }
}
