use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::db_types::GateSession;

#[derive(Debug, Clone, Error)]
pub enum SessionStoreError {
    #[error("Internal database error: {0}")]
    DatabaseError(String),
    #[error("Gate session {0} does not exist")]
    SessionNotFound(i64),
    #[error("A gate session credential cannot be empty")]
    EmptyCredential,
}

impl From<sqlx::Error> for SessionStoreError {
    fn from(e: sqlx::Error) -> Self {
        Self::DatabaseError(e.to_string())
    }
}

/// Storage for the gate sessions registered by users.
#[allow(async_fn_in_trait)]
pub trait SessionStore: Clone {
    /// Stores a new, active session for `user_id`.
    async fn insert_session(&self, user_id: i64, credential: &str) -> Result<GateSession, SessionStoreError>;

    async fn fetch_session(&self, id: i64) -> Result<Option<GateSession>, SessionStoreError>;

    /// All sessions with `is_active` set, in id order.
    async fn fetch_active_sessions(&self) -> Result<Vec<GateSession>, SessionStoreError>;

    /// Records the outcome of a validation attempt: sets `is_active` to `valid` and `last_checked` to `checked_at`.
    async fn mark_session(
        &self,
        id: i64,
        valid: bool,
        checked_at: DateTime<Utc>,
    ) -> Result<GateSession, SessionStoreError>;
}
