use std::{fmt::Debug, time::Duration};

use chrono::Utc;
use log::*;

use crate::{
    db_types::{GateSession, NewGateTransaction},
    monitor::{ServiceMonitor, StatsUpdate},
    recon_api::{errors::ReconApiError, matching_api::MatchingApi},
    traits::{GateLedger, PayoutFeed, ReconciliationStore, SessionStore, UpsertResult},
};

/// The name the ingestion loop reports its statistics under.
pub const INGESTION_SERVICE: &str = "GateIngestion";

#[derive(Debug, Clone)]
pub struct IngestionSettings {
    /// Pause between consecutive sessions within a cycle.
    pub user_delay: Duration,
}

impl Default for IngestionSettings {
    fn default() -> Self {
        Self { user_delay: Duration::from_millis(1000) }
    }
}

/// Counts for a single session's worth of payouts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IngestionReport {
    pub fetched: u64,
    pub inserted: u64,
    pub updated: u64,
    pub claimed: u64,
    pub matched: u64,
    pub errors: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionOutcome {
    /// The gate rejected the session. It has been marked inactive and nothing was fetched.
    Invalid,
    Processed(IngestionReport),
}

/// `IngestionApi` runs the gate polling cycle.
///
/// For every active session: validate it against the gate, deactivate it if the gate says no, otherwise store every
/// payout the session can see, record the session's user as an owner of each payout, and then run the matcher for that
/// user. One session failing never stops the cycle.
pub struct IngestionApi<B, F> {
    db: B,
    feed: F,
    matcher: MatchingApi<B>,
    monitor: ServiceMonitor,
    settings: IngestionSettings,
}

impl<B, F> Debug for IngestionApi<B, F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "IngestionApi ({:?})", self.settings)
    }
}

impl<B, F> IngestionApi<B, F> {
    pub fn new(db: B, feed: F, matcher: MatchingApi<B>, monitor: ServiceMonitor, settings: IngestionSettings) -> Self {
        monitor.initialize(INGESTION_SERVICE);
        Self { db, feed, matcher, monitor, settings }
    }

    pub fn monitor(&self) -> &ServiceMonitor {
        &self.monitor
    }
}

impl<B, F> IngestionApi<B, F>
where
    B: SessionStore + GateLedger + ReconciliationStore,
    F: PayoutFeed,
{
    /// Processes every active session once. Never fails; problems are logged and counted in the cycle statistics.
    /// Sessions the gate rejects count as errors.
    pub async fn run_cycle(&self) {
        info!("🔄️ Starting gate ingestion cycle");
        let sessions = match self.db.fetch_active_sessions().await {
            Ok(sessions) => sessions,
            Err(e) => {
                error!("🔄️ Could not load active gate sessions. {e}");
                self.monitor.update(
                    INGESTION_SERVICE,
                    StatsUpdate::default()
                        .with_processed_users(0)
                        .with_processed_transactions(0)
                        .with_matched_transactions(0)
                        .with_errors(1)
                        .with_last_run_time(Utc::now()),
                );
                return;
            },
        };
        debug!("🔄️ {} active gate session(s)", sessions.len());
        let mut users = 0u64;
        let mut transactions = 0u64;
        let mut matched = 0u64;
        let mut errors = 0u64;
        for (i, session) in sessions.iter().enumerate() {
            match self.process_session(session).await {
                // a rejected session is a failure operators need to see
                Ok(SessionOutcome::Invalid) => errors += 1,
                Ok(SessionOutcome::Processed(report)) => {
                    users += 1;
                    transactions += report.fetched;
                    matched += report.matched;
                    errors += report.errors;
                },
                Err(e) => {
                    error!("🔄️ Error processing gate session #{} for user {}. {e}", session.id, session.user_id);
                    errors += 1;
                },
            }
            if i + 1 < sessions.len() && !self.settings.user_delay.is_zero() {
                tokio::time::sleep(self.settings.user_delay).await;
            }
        }
        let update = StatsUpdate::default()
            .with_processed_users(users)
            .with_processed_transactions(transactions)
            .with_matched_transactions(matched)
            .with_errors(errors)
            .with_last_run_time(Utc::now());
        self.monitor.update(INGESTION_SERVICE, update);
        self.monitor.log_stats(INGESTION_SERVICE);
    }

    /// Validates one session and, if the gate still accepts it, ingests its payouts and reconciles its user.
    pub async fn process_session(&self, session: &GateSession) -> Result<SessionOutcome, ReconApiError> {
        let user_id = session.user_id;
        let valid = self.feed.validate(session).await;
        if let Err(e) = self.db.mark_session(session.id, valid, Utc::now()).await {
            warn!("🔄️ Could not record validation result for gate session #{}. {e}", session.id);
        }
        if !valid {
            info!("🔄️ Gate session #{} for user {user_id} is no longer valid. It has been deactivated.", session.id);
            return Ok(SessionOutcome::Invalid);
        }
        let payouts = self.feed.fetch_all(session).await;
        debug!("🔄️ Gate session #{} returned {} payout(s)", session.id, payouts.len());
        let mut report = self.ingest_payouts(user_id, payouts).await;
        report.matched = self.matcher.reconcile(user_id).await? as u64;
        Ok(SessionOutcome::Processed(report))
    }

    /// Stores each payout and records `user_id` as one of its owners. A failure on one payout is logged and counted,
    /// and the rest are still processed.
    pub async fn ingest_payouts(&self, user_id: i64, payouts: Vec<NewGateTransaction>) -> IngestionReport {
        let mut report = IngestionReport { fetched: payouts.len() as u64, ..Default::default() };
        for payout in payouts {
            let transaction_id = payout.transaction_id.clone();
            let stored = match self.db.upsert_gate_transaction(payout).await {
                Ok(result) => {
                    match &result {
                        UpsertResult::Inserted(_) => report.inserted += 1,
                        UpsertResult::Updated(_) => report.updated += 1,
                        UpsertResult::Unchanged(_) => {},
                    }
                    result.into_transaction()
                },
                Err(e) => {
                    warn!("🔄️ Could not store gate transaction [{transaction_id}]. {e}");
                    report.errors += 1;
                    continue;
                },
            };
            match self.db.claim_gate_transaction(user_id, stored.id).await {
                Ok(claim) if claim.is_new() => report.claimed += 1,
                Ok(_) => {},
                Err(e) => {
                    warn!("🔄️ Could not link gate transaction [{transaction_id}] to user {user_id}. {e}");
                    report.errors += 1;
                },
            }
        }
        debug!(
            "🔄️ User {user_id}: {} new, {} updated, {} newly claimed, {} error(s)",
            report.inserted, report.updated, report.claimed, report.errors
        );
        report
    }
}
