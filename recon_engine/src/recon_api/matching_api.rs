use std::{fmt::Debug, time::Duration as StdDuration};

use chrono::Utc;
use log::*;

use crate::{
    db_types::{GateTransaction, LocalTransaction, MatchRecord, NewMatch},
    events::{EventProducers, MatchCreatedEvent},
    monitor::{ServiceMonitor, StatsUpdate},
    recon_api::{errors::ReconApiError, match_objects::MatchSettings},
    traits::{ReconciliationError, ReconciliationStore},
};

/// The name the matching loop reports its statistics under.
pub const MATCHING_SERVICE: &str = "TransactionMatching";

/// `MatchingApi` pairs a user's completed marketplace transactions with the approved gate transactions they own.
///
/// A gate transaction takes part in at most one match across all users, and a local transaction is matched at most
/// once. Both rules are enforced by the storage backend when the match is recorded, so concurrent matchers are safe.
#[derive(Clone)]
pub struct MatchingApi<B> {
    db: B,
    settings: MatchSettings,
    producers: EventProducers,
}

impl<B> Debug for MatchingApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "MatchingApi ({:?})", self.settings)
    }
}

/// What happened when we tried to pair one local transaction with one candidate.
enum MatchAttempt {
    Matched(MatchRecord),
    /// Somebody got to the gate transaction first. Try the next candidate.
    GateTransactionTaken,
    /// The local transaction was consumed elsewhere. Stop looking for it.
    LocalTransactionTaken,
    /// A read or write failed. The candidate stays available for a later cycle.
    Failed,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MatchingCycleSummary {
    pub processed_users: u64,
    pub matched_transactions: u64,
    pub errors: u64,
}

impl<B> MatchingApi<B> {
    pub fn new(db: B, settings: MatchSettings, producers: EventProducers) -> Self {
        Self { db, settings, producers }
    }

    pub fn settings(&self) -> &MatchSettings {
        &self.settings
    }

    pub fn db(&self) -> &B {
        &self.db
    }
}

impl<B> MatchingApi<B>
where B: ReconciliationStore
{
    /// Matches as many of the user's unprocessed local transactions as possible. Returns the number of matches made.
    ///
    /// Local transactions are visited oldest first. Each one takes the closest matching gate transaction in time; if
    /// recording that match fails, the next closest candidate is tried.
    pub async fn reconcile(&self, user_id: i64) -> Result<usize, ReconApiError> {
        let since = Utc::now() - self.settings.lookback;
        let locals = self.db.fetch_unprocessed_local_transactions(user_id, since).await?;
        if locals.is_empty() {
            trace!("🔗️ User {user_id} has no unprocessed local transactions");
            return Ok(0);
        }
        let mut candidates = self.db.fetch_match_candidates(user_id).await?;
        debug!(
            "🔗️ User {user_id}: {} unprocessed local transaction(s), {} candidate gate transaction(s)",
            locals.len(),
            candidates.len()
        );
        let mut matched = 0;
        for local in &locals {
            if candidates.is_empty() {
                break;
            }
            if let Some(record) = self.match_local_transaction(user_id, local, &mut candidates).await {
                info!(
                    "🔗️ Matched local transaction [{}] with gate transaction #{} for user {user_id} ({} min apart)",
                    local.order_id, record.gate_tx_id, record.time_difference
                );
                matched += 1;
                self.producers.publish_match_created(MatchCreatedEvent::new(record)).await;
            }
        }
        debug!("🔗️ User {user_id}: {matched} new match(es)");
        Ok(matched)
    }

    async fn match_local_transaction(
        &self,
        user_id: i64,
        local: &LocalTransaction,
        candidates: &mut Vec<GateTransaction>,
    ) -> Option<MatchRecord> {
        let ranked = self.settings.rank_candidates(local, candidates);
        for candidate in ranked {
            let gate_tx_id = candidate.gate_tx_id;
            match self.try_match(user_id, local, gate_tx_id, candidate.minutes()).await {
                MatchAttempt::Matched(record) => {
                    candidates.retain(|c| c.id != gate_tx_id);
                    return Some(record);
                },
                MatchAttempt::GateTransactionTaken => {
                    candidates.retain(|c| c.id != gate_tx_id);
                },
                MatchAttempt::LocalTransactionTaken => return None,
                MatchAttempt::Failed => {},
            }
        }
        None
    }

    async fn try_match(
        &self,
        user_id: i64,
        local: &LocalTransaction,
        gate_tx_id: i64,
        minutes: i64,
    ) -> MatchAttempt {
        match self.db.match_exists(gate_tx_id).await {
            Ok(true) => {
                debug!("🔗️ Gate transaction #{gate_tx_id} is already matched. Skipping.");
                return MatchAttempt::GateTransactionTaken;
            },
            Ok(false) => {},
            Err(e) => {
                error!("🔗️ Could not check for existing matches of gate transaction #{gate_tx_id}. {e}");
                return MatchAttempt::Failed;
            },
        }
        let new_match = NewMatch::auto(user_id, local.id, gate_tx_id, minutes);
        match self.db.record_match(new_match).await {
            Ok(record) => MatchAttempt::Matched(record),
            Err(ReconciliationError::AlreadyMatched(id)) => {
                debug!("🔗️ Gate transaction #{id} was matched concurrently. Skipping.");
                MatchAttempt::GateTransactionTaken
            },
            Err(ReconciliationError::LocalTransactionAlreadyProcessed(id)) => {
                debug!("🔗️ Local transaction #{id} was processed concurrently. Skipping.");
                MatchAttempt::LocalTransactionTaken
            },
            Err(e) => {
                error!(
                    "🔗️ Could not save match of local transaction [{}] with gate transaction #{gate_tx_id}. {e}",
                    local.order_id
                );
                MatchAttempt::Failed
            },
        }
    }

    /// Runs [`Self::reconcile`] for every user with unprocessed local transactions, pausing `user_delay` between
    /// users, and reports the outcome to `monitor` under [`MATCHING_SERVICE`].
    pub async fn run_cycle(&self, monitor: &ServiceMonitor, user_delay: StdDuration) -> MatchingCycleSummary {
        monitor.initialize(MATCHING_SERVICE);
        let mut summary = MatchingCycleSummary::default();
        let users = match self.db.fetch_users_with_pending_local_transactions().await {
            Ok(users) => users,
            Err(e) => {
                error!("🔗️ Could not fetch users with pending transactions. {e}");
                summary.errors = 1;
                Self::report(monitor, &summary);
                return summary;
            },
        };
        debug!("🔗️ Matching cycle: {} user(s) with pending transactions", users.len());
        for (i, user_id) in users.iter().enumerate() {
            match self.reconcile(*user_id).await {
                Ok(n) => {
                    summary.processed_users += 1;
                    summary.matched_transactions += n as u64;
                },
                Err(e) => {
                    error!("🔗️ Matching failed for user {user_id}. {e}");
                    summary.errors += 1;
                },
            }
            if i + 1 < users.len() && !user_delay.is_zero() {
                tokio::time::sleep(user_delay).await;
            }
        }
        Self::report(monitor, &summary);
        summary
    }

    fn report(monitor: &ServiceMonitor, summary: &MatchingCycleSummary) {
        let update = StatsUpdate::default()
            .with_processed_users(summary.processed_users)
            .with_processed_transactions(summary.matched_transactions)
            .with_matched_transactions(summary.matched_transactions)
            .with_errors(summary.errors)
            .with_last_run_time(Utc::now());
        monitor.update(MATCHING_SERVICE, update);
        monitor.log_stats(MATCHING_SERVICE);
    }
}
