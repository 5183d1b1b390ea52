#![allow(dead_code)]
use std::{
    collections::{HashMap, HashSet},
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
        Mutex,
    },
};

use chrono::{DateTime, Duration, TimeZone, Utc};
use log::*;
use recon_engine::{
    db_types::{GateSession, GateTransaction, MarketplaceToken, MicroUnits, NewGateTransaction, NewLocalTransaction},
    GateLedger,
    OrderFeed,
    OrderFeedError,
    PayoutFeed,
    ReconciliationStore,
    SqliteDatabase,
};
use sqlx::{migrate::MigrateDatabase, Sqlite};

/// A fresh, migrated database in the system temp directory.
pub async fn prepare_test_db() -> SqliteDatabase {
    dotenvy::from_filename(".env.test").ok();
    let _ = env_logger::try_init();
    let url = format!("sqlite://{}/recon_engine_test_{}.db", std::env::temp_dir().display(), rand::random::<u64>());
    Sqlite::create_database(&url).await.expect("Error creating database");
    let db = SqliteDatabase::new_with_url(&url, 5).await.expect("Error connecting to database");
    db.run_migrations().await.expect("Error running migrations");
    debug!("🚀️ Test database ready at {url}");
    db
}

pub async fn drop_db(db: SqliteDatabase) {
    let url = db.url().to_string();
    db.close().await;
    let _ = Sqlite::drop_database(&url).await;
}

/// A whole-second timestamp a day in the past, well inside the look-back window.
pub fn base_time() -> DateTime<Utc> {
    Utc.timestamp_opt(Utc::now().timestamp() - 86_400, 0).unwrap()
}

pub fn amount(s: &str) -> MicroUnits {
    s.parse().unwrap()
}

pub fn payout(transaction_id: &str, value: &str, approved_at: Option<DateTime<Utc>>) -> NewGateTransaction {
    let mut tx = NewGateTransaction::new(transaction_id, amount(value), 7);
    tx.approved_at = approved_at;
    tx.updated_at = approved_at;
    tx
}

/// Stores a payout and links it to `user_id`, the way an ingestion pass would.
pub async fn seed_gate_transaction(
    db: &SqliteDatabase,
    user_id: i64,
    transaction_id: &str,
    value: &str,
    approved_at: Option<DateTime<Utc>>,
) -> GateTransaction {
    let stored = db.upsert_gate_transaction(payout(transaction_id, value, approved_at)).await.unwrap().into_transaction();
    db.claim_gate_transaction(user_id, stored.id).await.unwrap();
    stored
}

pub async fn seed_local_transaction(
    db: &SqliteDatabase,
    user_id: i64,
    order_id: &str,
    value: &str,
    completed_at: DateTime<Utc>,
) -> i64 {
    let tx = NewLocalTransaction::new(user_id, order_id, amount(value), completed_at).with_status("completed");
    db.insert_local_transaction(tx).await.unwrap().transaction().id
}

pub fn after(t: DateTime<Utc>, minutes: i64, seconds: i64) -> DateTime<Utc> {
    t + Duration::minutes(minutes) + Duration::seconds(seconds)
}

/// An in-memory stand-in for the gate.
#[derive(Clone, Default)]
pub struct FakeFeed {
    payouts: Arc<Mutex<HashMap<i64, Vec<NewGateTransaction>>>>,
    rejected_users: Arc<Mutex<HashSet<i64>>>,
    pub validations: Arc<AtomicUsize>,
    pub fetches: Arc<AtomicUsize>,
}

impl FakeFeed {
    pub fn set_payouts(&self, user_id: i64, payouts: Vec<NewGateTransaction>) {
        self.payouts.lock().unwrap().insert(user_id, payouts);
    }

    pub fn reject(&self, user_id: i64) {
        self.rejected_users.lock().unwrap().insert(user_id);
    }

    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }
}

impl PayoutFeed for FakeFeed {
    async fn validate(&self, session: &GateSession) -> bool {
        self.validations.fetch_add(1, Ordering::SeqCst);
        !self.rejected_users.lock().unwrap().contains(&session.user_id)
    }

    async fn fetch_all(&self, session: &GateSession) -> Vec<NewGateTransaction> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        self.payouts.lock().unwrap().get(&session.user_id).cloned().unwrap_or_default()
    }
}

/// An in-memory stand-in for the marketplace and its order listing.
#[derive(Clone, Default)]
pub struct FakeOrderFeed {
    orders: Arc<Mutex<HashMap<i64, Vec<NewLocalTransaction>>>>,
    rejected_users: Arc<Mutex<HashSet<i64>>>,
    broken_users: Arc<Mutex<HashSet<i64>>>,
    pub fetches: Arc<AtomicUsize>,
}

impl FakeOrderFeed {
    pub fn set_orders(&self, user_id: i64, orders: Vec<NewLocalTransaction>) {
        self.orders.lock().unwrap().insert(user_id, orders);
    }

    pub fn reject(&self, user_id: i64) {
        self.rejected_users.lock().unwrap().insert(user_id);
    }

    /// The order listing fails for this user.
    pub fn break_listing(&self, user_id: i64) {
        self.broken_users.lock().unwrap().insert(user_id);
    }

    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }
}

impl OrderFeed for FakeOrderFeed {
    async fn validate_token(&self, token: &MarketplaceToken) -> bool {
        !self.rejected_users.lock().unwrap().contains(&token.user_id)
    }

    async fn fetch_orders(&self, token: &MarketplaceToken) -> Result<Vec<NewLocalTransaction>, OrderFeedError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        if self.broken_users.lock().unwrap().contains(&token.user_id) {
            return Err(OrderFeedError("connection refused".to_string()));
        }
        Ok(self.orders.lock().unwrap().get(&token.user_id).cloned().unwrap_or_default())
    }
}

/// A completed marketplace order, as the feed reports it. The user id is filled in when the order is recorded.
pub fn order(order_id: &str, total_fiat: &str, completed_at: DateTime<Utc>) -> NewLocalTransaction {
    NewLocalTransaction::new(0, order_id, amount(total_fiat), completed_at).with_status("COMPLETED")
}
