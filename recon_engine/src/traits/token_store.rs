use thiserror::Error;

use crate::db_types::MarketplaceToken;

#[derive(Debug, Clone, Error)]
pub enum TokenStoreError {
    #[error("Internal database error: {0}")]
    DatabaseError(String),
    #[error("A marketplace token cannot be empty")]
    EmptyToken,
}

impl From<sqlx::Error> for TokenStoreError {
    fn from(e: sqlx::Error) -> Self {
        Self::DatabaseError(e.to_string())
    }
}

/// Storage for the marketplace tokens users hand over so their completed orders can be pulled in.
#[allow(async_fn_in_trait)]
pub trait TokenStore: Clone {
    /// Stores the user's token. A user has one token at most; storing another replaces it.
    async fn upsert_token(&self, user_id: i64, token: &str) -> Result<MarketplaceToken, TokenStoreError>;

    async fn fetch_token(&self, user_id: i64) -> Result<Option<MarketplaceToken>, TokenStoreError>;

    /// Every stored token, in user id order.
    async fn fetch_tokens(&self) -> Result<Vec<MarketplaceToken>, TokenStoreError>;

    /// Forgets the user's token. Returns false if there was none.
    async fn clear_token(&self, user_id: i64) -> Result<bool, TokenStoreError>;
}
