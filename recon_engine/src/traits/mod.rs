//! #  Storage and feed contracts.
//!
//! This module defines the behaviour a storage backend must expose in order to back the reconciliation engine, plus
//! the [`PayoutFeed`] seam through which the engine reads payouts from the gate.
//!
//! * [`SessionStore`] keeps the gate sessions registered by users and their validity.
//! * [`GateLedger`] keeps one record per gate transaction and the ownership links between users and transactions.
//! * [`ReconciliationStore`] keeps local marketplace transactions and the matches made against gate transactions.
//!   Recording a match is atomic.
//! * [`PayoutFeed`] validates a session against the gate and lists the payouts it can see.
//! * [`TokenStore`] keeps the marketplace tokens users hand over, and [`OrderFeed`] uses a token to list the user's
//!   completed marketplace orders.
mod gate_ledger;
mod order_feed;
mod payout_feed;
mod reconciliation_store;
mod session_store;
mod token_store;

mod data_objects;

pub use data_objects::{ClaimResult, InsertLocalTransactionResult, UpsertResult};
pub use gate_ledger::{GateLedger, GateLedgerError};
pub use payout_feed::PayoutFeed;
pub use reconciliation_store::{ReconciliationError, ReconciliationStore};
pub use order_feed::{OrderFeed, OrderFeedError};
pub use session_store::{SessionStore, SessionStoreError};
pub use token_store::{TokenStore, TokenStoreError};
