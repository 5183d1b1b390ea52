//! # Reconciliation engine public API
//!
//! * [`ingestion_api`] runs the gate polling cycle: validate each active session, store the payouts it can see,
//!   record ownership and hand the user over to the matcher.
//! * [`matching_api`] pairs a user's unprocessed local transactions with the approved gate transactions they own.
//! * [`ledger_api`] covers the intake side: registering gate sessions and marketplace tokens, and recording
//!   marketplace transactions.
//! * [`order_intake_api`] runs the token validation cycle: check each marketplace token and record the holder's
//!   completed orders as local transactions.
//!
//! Every API is created by supplying a storage backend that implements the traits it needs.
//!
//! ```rust,ignore
//! use recon_engine::{MatchingApi, MatchSettings, SqliteDatabase, events::EventProducers};
//! let db = SqliteDatabase::new_with_url(...).await?;
//! let api = MatchingApi::new(db, MatchSettings::default(), EventProducers::default());
//! let matched = api.reconcile(user_id).await?;
//! ```
pub mod errors;
pub mod ingestion_api;
pub mod ledger_api;
pub mod match_objects;
pub mod matching_api;
pub mod order_intake_api;
