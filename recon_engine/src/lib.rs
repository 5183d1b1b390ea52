//! Reconciliation Engine
//!
//! The engine keeps a local ledger of payouts observed on the gate, records which user sessions reported each payout,
//! and pairs every approved payout with at most one completed marketplace (P2P) transaction.
//!
//! The library is divided into the following sections:
//! 1. Storage ([`mod@traits`] and the `sqlite` backend). The traits define the storage contracts; [`SqliteDatabase`]
//!    implements all of them. Application code should go through the public APIs rather than the backend directly.
//!    The data types used in storage live in [`mod@db_types`].
//! 2. The engine APIs. [`IngestionApi`] runs a polling cycle over every active gate session, [`MatchingApi`] pairs
//!    transactions for a user, [`OrderIntakeApi`] pulls completed marketplace orders in for every stored token and
//!    [`LedgerApi`] covers session and token registration and local transaction intake.
//! 3. The [`ServiceMonitor`], an in-memory register of per-service run statistics.
//!
//! Whenever a match is recorded, a `MatchCreatedEvent` is emitted. See [`mod@events`] for how to hook into it.
pub mod db_types;
pub mod events;
pub mod monitor;
mod recon_api;
#[cfg(feature = "sqlite")]
mod sqlite;
pub mod traits;

#[cfg(any(feature = "test_utils", test))]
pub mod test_utils;

pub use monitor::{ServiceMonitor, ServiceStats, StatsUpdate};
pub use recon_api::{
    errors::ReconApiError,
    ingestion_api::{IngestionApi, IngestionReport, IngestionSettings, SessionOutcome, INGESTION_SERVICE},
    ledger_api::LedgerApi,
    match_objects::{MatchCurrency, MatchSettings, RankedCandidate},
    matching_api::{MatchingApi, MatchingCycleSummary, MATCHING_SERVICE},
    order_intake_api::{OrderIntakeApi, OrderIntakeReport, TokenOutcome, TOKEN_VALIDATION_SERVICE},
};
#[cfg(feature = "sqlite")]
pub use sqlite::{db::db_url, SqliteDatabase};
pub use traits::{
    ClaimResult,
    GateLedger,
    GateLedgerError,
    InsertLocalTransactionResult,
    OrderFeed,
    OrderFeedError,
    PayoutFeed,
    ReconciliationError,
    ReconciliationStore,
    SessionStore,
    SessionStoreError,
    TokenStore,
    TokenStoreError,
    UpsertResult,
};
