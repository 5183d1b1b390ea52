//! In-memory run statistics for the background services.
//!
//! Each service registers itself under a name and reports after every cycle. Statistics describe the most recent
//! cycle only; they are not cumulative and are lost on restart.
use std::{
    collections::BTreeMap,
    sync::{Arc, PoisonError, RwLock},
};

use chrono::{DateTime, Utc};
use log::*;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceStats {
    pub processed_users: u64,
    pub processed_transactions: u64,
    pub matched_transactions: u64,
    pub errors: u64,
    pub last_run_time: Option<DateTime<Utc>>,
    pub is_running: bool,
}

/// A partial update to [`ServiceStats`]. Fields left as `None` keep their current value.
#[derive(Debug, Clone, Default)]
pub struct StatsUpdate {
    pub processed_users: Option<u64>,
    pub processed_transactions: Option<u64>,
    pub matched_transactions: Option<u64>,
    pub errors: Option<u64>,
    pub last_run_time: Option<DateTime<Utc>>,
    pub is_running: Option<bool>,
}

impl StatsUpdate {
    pub fn with_processed_users(mut self, n: u64) -> Self {
        self.processed_users = Some(n);
        self
    }

    pub fn with_processed_transactions(mut self, n: u64) -> Self {
        self.processed_transactions = Some(n);
        self
    }

    pub fn with_matched_transactions(mut self, n: u64) -> Self {
        self.matched_transactions = Some(n);
        self
    }

    pub fn with_errors(mut self, n: u64) -> Self {
        self.errors = Some(n);
        self
    }

    pub fn with_last_run_time(mut self, t: DateTime<Utc>) -> Self {
        self.last_run_time = Some(t);
        self
    }

    pub fn with_running(mut self, running: bool) -> Self {
        self.is_running = Some(running);
        self
    }

    fn apply(self, stats: &mut ServiceStats) {
        if let Some(v) = self.processed_users {
            stats.processed_users = v;
        }
        if let Some(v) = self.processed_transactions {
            stats.processed_transactions = v;
        }
        if let Some(v) = self.matched_transactions {
            stats.matched_transactions = v;
        }
        if let Some(v) = self.errors {
            stats.errors = v;
        }
        if let Some(v) = self.last_run_time {
            stats.last_run_time = Some(v);
        }
        if let Some(v) = self.is_running {
            stats.is_running = v;
        }
    }
}

/// A cheaply cloneable handle to the shared statistics table.
#[derive(Debug, Clone, Default)]
pub struct ServiceMonitor {
    stats: Arc<RwLock<BTreeMap<String, ServiceStats>>>,
}

impl ServiceMonitor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `service` with zeroed statistics. Registering an existing service leaves its statistics alone.
    pub fn initialize(&self, service: &str) {
        let mut stats = self.stats.write().unwrap_or_else(PoisonError::into_inner);
        stats.entry(service.to_string()).or_default();
    }

    /// Merges `update` into the statistics for `service`. Updates for unregistered services are dropped.
    pub fn update(&self, service: &str, update: StatsUpdate) {
        let mut stats = self.stats.write().unwrap_or_else(PoisonError::into_inner);
        match stats.get_mut(service) {
            Some(s) => update.apply(s),
            None => warn!("📊️ Ignoring stats update for unknown service '{service}'"),
        }
    }

    pub fn stats(&self, service: &str) -> Option<ServiceStats> {
        let stats = self.stats.read().unwrap_or_else(PoisonError::into_inner);
        stats.get(service).cloned()
    }

    /// A copy of the statistics of every registered service.
    pub fn snapshot(&self) -> BTreeMap<String, ServiceStats> {
        self.stats.read().unwrap_or_else(PoisonError::into_inner).clone()
    }

    pub fn log_stats(&self, service: &str) {
        match self.stats(service) {
            Some(s) => info!(
                "📊️ {service}: users: {}, transactions: {}, matches: {}, errors: {}, running: {}, last run: {}",
                s.processed_users,
                s.processed_transactions,
                s.matched_transactions,
                s.errors,
                s.is_running,
                s.last_run_time.map(|t| t.to_rfc3339()).unwrap_or_else(|| "never".to_string())
            ),
            None => debug!("📊️ No stats for {service}"),
        }
    }
}
