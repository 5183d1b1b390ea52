//! `SqliteDatabase` is the SQLite implementation of the reconciliation engine's storage traits.
//!
//! It implements [`SessionStore`], [`GateLedger`], [`ReconciliationStore`] and [`TokenStore`].
use std::fmt::Debug;

use chrono::{DateTime, Utc};
use log::*;
use sqlx::{migrate, migrate::MigrateError, SqlitePool};

use super::db::{db_url, gate_transactions, local_transactions, matches, new_pool, ownership, sessions, tokens};
use crate::{
    db_types::{
        GateSession,
        GateTransaction,
        LocalTransaction,
        MarketplaceToken,
        MatchRecord,
        NewGateTransaction,
        NewLocalTransaction,
        NewMatch,
        OwnershipLink,
    },
    traits::{
        ClaimResult,
        GateLedger,
        GateLedgerError,
        InsertLocalTransactionResult,
        ReconciliationError,
        ReconciliationStore,
        SessionStore,
        SessionStoreError,
        TokenStore,
        TokenStoreError,
        UpsertResult,
    },
};

#[derive(Clone)]
pub struct SqliteDatabase {
    url: String,
    pool: SqlitePool,
}

impl Debug for SqliteDatabase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "SqliteDatabase ({:?})", self.pool)
    }
}

impl SessionStore for SqliteDatabase {
    async fn insert_session(&self, user_id: i64, credential: &str) -> Result<GateSession, SessionStoreError> {
        let credential = credential.trim();
        if credential.is_empty() {
            return Err(SessionStoreError::EmptyCredential);
        }
        let mut conn = self.pool.acquire().await?;
        let session = sessions::insert_session(user_id, credential, &mut conn).await?;
        info!("🔑️ Gate session #{} registered for user {user_id}", session.id);
        Ok(session)
    }

    async fn fetch_session(&self, id: i64) -> Result<Option<GateSession>, SessionStoreError> {
        let mut conn = self.pool.acquire().await?;
        let session = sessions::fetch_session(id, &mut conn).await?;
        Ok(session)
    }

    async fn fetch_active_sessions(&self) -> Result<Vec<GateSession>, SessionStoreError> {
        let mut conn = self.pool.acquire().await?;
        let sessions = sessions::fetch_active_sessions(&mut conn).await?;
        Ok(sessions)
    }

    async fn mark_session(
        &self,
        id: i64,
        valid: bool,
        checked_at: DateTime<Utc>,
    ) -> Result<GateSession, SessionStoreError> {
        let mut conn = self.pool.acquire().await?;
        sessions::update_validity(id, valid, checked_at, &mut conn).await
    }
}

impl GateLedger for SqliteDatabase {
    async fn upsert_gate_transaction(&self, transaction: NewGateTransaction) -> Result<UpsertResult, GateLedgerError> {
        let mut tx = self.pool.begin().await?;
        let result = gate_transactions::idempotent_upsert(transaction, &mut tx).await?;
        tx.commit().await?;
        Ok(result)
    }

    async fn fetch_gate_transaction(&self, transaction_id: &str) -> Result<Option<GateTransaction>, GateLedgerError> {
        let mut conn = self.pool.acquire().await?;
        let transaction = gate_transactions::fetch_by_transaction_id(transaction_id, &mut conn).await?;
        Ok(transaction)
    }

    async fn claim_gate_transaction(&self, user_id: i64, gate_tx_id: i64) -> Result<ClaimResult, GateLedgerError> {
        let mut conn = self.pool.acquire().await?;
        match ownership::claim(user_id, gate_tx_id, &mut conn).await? {
            Some(link) => {
                debug!("🔗️ User {user_id} claimed gate transaction #{gate_tx_id}. Matched: {}", link.matched);
                Ok(ClaimResult::Claimed(link))
            },
            None => Ok(ClaimResult::AlreadyClaimed),
        }
    }

    async fn fetch_ownership_link(
        &self,
        user_id: i64,
        gate_tx_id: i64,
    ) -> Result<Option<OwnershipLink>, GateLedgerError> {
        let mut conn = self.pool.acquire().await?;
        let link = ownership::fetch_link(user_id, gate_tx_id, &mut conn).await?;
        Ok(link)
    }

    async fn fetch_ownership_links(&self, user_id: i64) -> Result<Vec<OwnershipLink>, GateLedgerError> {
        let mut conn = self.pool.acquire().await?;
        let links = ownership::fetch_links_for_user(user_id, &mut conn).await?;
        Ok(links)
    }
}

impl ReconciliationStore for SqliteDatabase {
    async fn insert_local_transaction(
        &self,
        transaction: NewLocalTransaction,
    ) -> Result<InsertLocalTransactionResult, ReconciliationError> {
        let mut conn = self.pool.acquire().await?;
        local_transactions::idempotent_insert(transaction, &mut conn).await
    }

    async fn fetch_local_transaction(&self, id: i64) -> Result<Option<LocalTransaction>, ReconciliationError> {
        let mut conn = self.pool.acquire().await?;
        let transaction = local_transactions::fetch_by_id(id, &mut conn).await?;
        Ok(transaction)
    }

    async fn fetch_unprocessed_local_transactions(
        &self,
        user_id: i64,
        since: DateTime<Utc>,
    ) -> Result<Vec<LocalTransaction>, ReconciliationError> {
        let mut conn = self.pool.acquire().await?;
        let transactions = local_transactions::fetch_unprocessed(user_id, since, &mut conn).await?;
        Ok(transactions)
    }

    async fn fetch_match_candidates(&self, user_id: i64) -> Result<Vec<GateTransaction>, ReconciliationError> {
        let mut conn = self.pool.acquire().await?;
        let candidates = gate_transactions::fetch_match_candidates(user_id, &mut conn).await?;
        Ok(candidates)
    }

    async fn match_exists(&self, gate_tx_id: i64) -> Result<bool, ReconciliationError> {
        let mut conn = self.pool.acquire().await?;
        let exists = matches::match_exists(gate_tx_id, &mut conn).await?;
        Ok(exists)
    }

    async fn record_match(&self, new_match: NewMatch) -> Result<MatchRecord, ReconciliationError> {
        let user_id = new_match.user_id;
        let gate_tx_id = new_match.gate_tx_id;
        let local_tx_id = new_match.local_tx_id;
        let mut tx = self.pool.begin().await?;
        if ownership::fetch_link(user_id, gate_tx_id, &mut tx).await?.is_none() {
            return Err(ReconciliationError::OwnershipLinkMissing { user_id, gate_tx_id });
        }
        if !local_transactions::mark_processed(local_tx_id, &mut tx).await? {
            return Err(ReconciliationError::LocalTransactionAlreadyProcessed(local_tx_id));
        }
        let record = matches::insert_match(new_match, &mut tx).await?;
        let links = ownership::mark_matched(gate_tx_id, &mut tx).await?;
        tx.commit().await?;
        trace!("🔗️ Match #{} settled {links} ownership link(s)", record.id);
        Ok(record)
    }

    async fn fetch_matches_for_user(&self, user_id: i64) -> Result<Vec<MatchRecord>, ReconciliationError> {
        let mut conn = self.pool.acquire().await?;
        let records = matches::fetch_for_user(user_id, &mut conn).await?;
        Ok(records)
    }

    async fn fetch_match_for_gate_transaction(
        &self,
        gate_tx_id: i64,
    ) -> Result<Option<MatchRecord>, ReconciliationError> {
        let mut conn = self.pool.acquire().await?;
        let record = matches::fetch_for_gate_transaction(gate_tx_id, &mut conn).await?;
        Ok(record)
    }

    async fn fetch_users_with_pending_local_transactions(&self) -> Result<Vec<i64>, ReconciliationError> {
        let mut conn = self.pool.acquire().await?;
        let users = local_transactions::users_with_pending_transactions(&mut conn).await?;
        Ok(users)
    }
}

impl TokenStore for SqliteDatabase {
    async fn upsert_token(&self, user_id: i64, token: &str) -> Result<MarketplaceToken, TokenStoreError> {
        let token = token.trim();
        if token.is_empty() {
            return Err(TokenStoreError::EmptyToken);
        }
        let mut conn = self.pool.acquire().await?;
        let stored = tokens::upsert_token(user_id, token, &mut conn).await?;
        info!("🔑️ Marketplace token stored for user {user_id}");
        Ok(stored)
    }

    async fn fetch_token(&self, user_id: i64) -> Result<Option<MarketplaceToken>, TokenStoreError> {
        let mut conn = self.pool.acquire().await?;
        let token = tokens::fetch_token(user_id, &mut conn).await?;
        Ok(token)
    }

    async fn fetch_tokens(&self) -> Result<Vec<MarketplaceToken>, TokenStoreError> {
        let mut conn = self.pool.acquire().await?;
        let stored = tokens::fetch_tokens(&mut conn).await?;
        Ok(stored)
    }

    async fn clear_token(&self, user_id: i64) -> Result<bool, TokenStoreError> {
        let mut conn = self.pool.acquire().await?;
        let removed = tokens::delete_token(user_id, &mut conn).await?;
        if removed {
            info!("🔑️ Marketplace token for user {user_id} removed");
        }
        Ok(removed)
    }
}

impl SqliteDatabase {
    /// Creates a new database API object
    pub async fn new(max_connections: u32) -> Result<Self, sqlx::Error> {
        let url = db_url();
        SqliteDatabase::new_with_url(url.as_str(), max_connections).await
    }

    pub async fn new_with_url(url: &str, max_connections: u32) -> Result<Self, sqlx::Error> {
        trace!("Creating new database connection pool with url {url}");
        let pool = new_pool(url, max_connections).await?;
        let url = url.to_string();
        Ok(Self { url, pool })
    }

    pub fn url(&self) -> &str {
        self.url.as_str()
    }

    /// Returns a reference to the database connection pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Brings the schema up to date.
    pub async fn run_migrations(&self) -> Result<(), MigrateError> {
        migrate!("./src/sqlite/migrations").run(&self.pool).await?;
        info!("🚀️ Migrations complete");
        Ok(())
    }

    pub async fn close(&self) {
        self.pool.close().await;
    }
}
