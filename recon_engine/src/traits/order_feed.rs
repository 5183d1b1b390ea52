use thiserror::Error;

use crate::db_types::{MarketplaceToken, NewLocalTransaction};

#[derive(Debug, Clone, Error)]
#[error("Could not fetch marketplace orders: {0}")]
pub struct OrderFeedError(pub String);

/// A source of completed marketplace orders for the holder of a token.
#[allow(async_fn_in_trait)]
pub trait OrderFeed {
    /// False if the marketplace no longer accepts the token, or if it could not be checked.
    async fn validate_token(&self, token: &MarketplaceToken) -> bool;

    /// The token holder's completed orders, ready to be recorded as local transactions.
    async fn fetch_orders(&self, token: &MarketplaceToken) -> Result<Vec<NewLocalTransaction>, OrderFeedError>;
}
