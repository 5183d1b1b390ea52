use std::{fmt::Debug, time::Duration};

use chrono::Utc;
use log::*;

use crate::{
    db_types::{MarketplaceToken, NewLocalTransaction},
    monitor::{ServiceMonitor, StatsUpdate},
    recon_api::errors::ReconApiError,
    traits::{InsertLocalTransactionResult, OrderFeed, ReconciliationStore, TokenStore},
};

/// The name the token validation loop reports its statistics under.
pub const TOKEN_VALIDATION_SERVICE: &str = "TokenValidation";

/// Counts for a single token's worth of orders.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OrderIntakeReport {
    pub fetched: u64,
    pub inserted: u64,
    pub errors: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenOutcome {
    /// The marketplace rejected the token. It has been removed and no orders were fetched.
    Invalid,
    Processed(OrderIntakeReport),
}

/// `OrderIntakeApi` runs the token validation cycle.
///
/// For every stored marketplace token: check it with the marketplace, forget it if the marketplace says no, otherwise
/// record each of the holder's completed orders as a local transaction. Orders already on file are left alone, so
/// the matcher sees every order exactly once.
pub struct OrderIntakeApi<B, F> {
    db: B,
    feed: F,
    monitor: ServiceMonitor,
    user_delay: Duration,
}

impl<B, F> Debug for OrderIntakeApi<B, F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "OrderIntakeApi (user delay {:?})", self.user_delay)
    }
}

impl<B, F> OrderIntakeApi<B, F> {
    pub fn new(db: B, feed: F, monitor: ServiceMonitor, user_delay: Duration) -> Self {
        monitor.initialize(TOKEN_VALIDATION_SERVICE);
        Self { db, feed, monitor, user_delay }
    }

    pub fn monitor(&self) -> &ServiceMonitor {
        &self.monitor
    }
}

impl<B, F> OrderIntakeApi<B, F>
where
    B: TokenStore + ReconciliationStore,
    F: OrderFeed,
{
    /// Processes every stored token once. Rejected tokens and failed order listings are counted as errors.
    pub async fn run_cycle(&self) {
        info!("🔄️ Starting token validation cycle");
        let tokens = match self.db.fetch_tokens().await {
            Ok(tokens) => tokens,
            Err(e) => {
                error!("🔄️ Could not load marketplace tokens. {e}");
                self.monitor.update(
                    TOKEN_VALIDATION_SERVICE,
                    StatsUpdate::default()
                        .with_processed_users(0)
                        .with_processed_transactions(0)
                        .with_errors(1)
                        .with_last_run_time(Utc::now()),
                );
                return;
            },
        };
        debug!("🔄️ {} user(s) with marketplace tokens", tokens.len());
        let mut users = 0u64;
        let mut transactions = 0u64;
        let mut errors = 0u64;
        for (i, token) in tokens.iter().enumerate() {
            match self.process_token(token).await {
                Ok(TokenOutcome::Invalid) => errors += 1,
                Ok(TokenOutcome::Processed(report)) => {
                    users += 1;
                    transactions += report.inserted;
                    errors += report.errors;
                },
                Err(e) => {
                    error!("🔄️ Error processing marketplace orders for user {}. {e}", token.user_id);
                    errors += 1;
                },
            }
            if i + 1 < tokens.len() && !self.user_delay.is_zero() {
                tokio::time::sleep(self.user_delay).await;
            }
        }
        let update = StatsUpdate::default()
            .with_processed_users(users)
            .with_processed_transactions(transactions)
            .with_errors(errors)
            .with_last_run_time(Utc::now());
        self.monitor.update(TOKEN_VALIDATION_SERVICE, update);
        self.monitor.log_stats(TOKEN_VALIDATION_SERVICE);
    }

    /// Validates one token and, if the marketplace still accepts it, records the holder's new orders.
    pub async fn process_token(&self, token: &MarketplaceToken) -> Result<TokenOutcome, ReconApiError> {
        let user_id = token.user_id;
        if !self.feed.validate_token(token).await {
            if let Err(e) = self.db.clear_token(user_id).await {
                warn!("🔄️ Could not remove the rejected marketplace token of user {user_id}. {e}");
            }
            info!("🔄️ The marketplace token of user {user_id} is no longer valid. It has been removed.");
            return Ok(TokenOutcome::Invalid);
        }
        let orders = self.feed.fetch_orders(token).await?;
        debug!("🔄️ User {user_id} has {} completed marketplace order(s)", orders.len());
        Ok(TokenOutcome::Processed(self.record_orders(user_id, orders).await))
    }

    /// Stores each order for `user_id`. Orders already on file are skipped. A failure on one order is logged and
    /// counted, and the rest are still recorded.
    pub async fn record_orders(&self, user_id: i64, orders: Vec<NewLocalTransaction>) -> OrderIntakeReport {
        let mut report = OrderIntakeReport { fetched: orders.len() as u64, ..Default::default() };
        for mut order in orders {
            order.user_id = user_id;
            if order.order_id.trim().is_empty() {
                warn!("🔄️ Skipping a marketplace order without an id for user {user_id}");
                report.errors += 1;
                continue;
            }
            let order_id = order.order_id.clone();
            match self.db.insert_local_transaction(order).await {
                Ok(InsertLocalTransactionResult::Inserted(tx)) => {
                    debug!("🔄️ Recorded marketplace order [{}] for user {user_id}", tx.order_id);
                    report.inserted += 1;
                },
                Ok(InsertLocalTransactionResult::AlreadyExists(_)) => {},
                Err(e) => {
                    warn!("🔄️ Could not record marketplace order [{order_id}] for user {user_id}. {e}");
                    report.errors += 1;
                },
            }
        }
        report
    }
}
