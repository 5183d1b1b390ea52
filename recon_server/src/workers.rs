//! Background loops.
//!
//! Each loop runs one pass, sleeps for its interval and repeats. A loop is started at most once at a time, and stopping
//! it is cooperative: the pass in flight runs to completion and the loop exits instead of sleeping. A stopped loop
//! cannot be restarted until that last pass has finished.
use std::{
    future::Future,
    sync::{Arc, Mutex, PoisonError},
    time::Duration,
};

use log::*;
use recon_engine::{IngestionApi, MatchingApi, OrderIntakeApi, ServiceMonitor, SqliteDatabase, StatsUpdate};
use tokio::{sync::watch, task::JoinHandle};

use crate::integrations::{gate::GatePayoutFeed, marketplace::MarketplaceOrderFeed};

pub struct BackgroundLoop {
    name: &'static str,
    interval: Duration,
    monitor: ServiceMonitor,
    shutdown: Mutex<Option<watch::Sender<bool>>>,
    task: Mutex<Option<JoinHandle<()>>>,
}

impl BackgroundLoop {
    /// Creates a stopped loop that reports its running state to `monitor` under `name`.
    pub fn new(name: &'static str, interval: Duration, monitor: ServiceMonitor) -> Self {
        monitor.initialize(name);
        Self { name, interval, monitor, shutdown: Mutex::new(None), task: Mutex::new(None) }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn is_running(&self) -> bool {
        self.shutdown.lock().unwrap_or_else(PoisonError::into_inner).is_some()
    }

    /// Spawns the loop. Returns false, and does nothing else, if the loop is already running or if a previous run is
    /// still finishing its last pass.
    pub fn start<F, Fut>(&self, pass: F) -> bool
    where
        F: Fn() -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let mut shutdown = self.shutdown.lock().unwrap_or_else(PoisonError::into_inner);
        if shutdown.is_some() {
            warn!("⚙️ {} is already running", self.name);
            return false;
        }
        let mut task = self.task.lock().unwrap_or_else(PoisonError::into_inner);
        if task.as_ref().is_some_and(|handle| !handle.is_finished()) {
            warn!("⚙️ {} is still finishing its last pass", self.name);
            return false;
        }
        let (tx, mut rx) = watch::channel(false);
        *shutdown = Some(tx);
        self.monitor.update(self.name, StatsUpdate::default().with_running(true));
        let name = self.name;
        let interval = self.interval;
        *task = Some(tokio::spawn(async move {
            info!("⚙️ {name} started. Running every {}s", interval.as_secs_f32());
            loop {
                pass().await;
                tokio::select! {
                    _ = tokio::time::sleep(interval) => {},
                    changed = rx.changed() => {
                        if changed.is_err() {
                            // the handle is gone, so nobody can stop us any more
                            break;
                        }
                    },
                }
                if *rx.borrow() {
                    break;
                }
            }
            info!("⚙️ {name} stopped");
        }));
        true
    }

    /// Asks the loop to stop after its current pass. Stopping a loop that isn't running does nothing.
    pub fn stop(&self) {
        let sender = self.shutdown.lock().unwrap_or_else(PoisonError::into_inner).take();
        match sender {
            Some(tx) => {
                info!("⚙️ Stopping {}", self.name);
                let _ = tx.send(true);
                self.monitor.update(self.name, StatsUpdate::default().with_running(false));
            },
            None => debug!("⚙️ {} is not running", self.name),
        }
    }
}

impl Drop for BackgroundLoop {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Starts polling the gate for every active session. The loop reports under the ingestion service's name.
pub fn start_ingestion_worker(
    worker: &BackgroundLoop,
    api: Arc<IngestionApi<SqliteDatabase, GatePayoutFeed>>,
) -> bool {
    worker.start(move || {
        let api = Arc::clone(&api);
        async move { api.run_cycle().await }
    })
}

/// Starts checking every stored marketplace token and pulling in the holders' completed orders.
pub fn start_token_validation_worker(
    worker: &BackgroundLoop,
    api: Arc<OrderIntakeApi<SqliteDatabase, MarketplaceOrderFeed>>,
) -> bool {
    worker.start(move || {
        let api = Arc::clone(&api);
        async move { api.run_cycle().await }
    })
}

/// Starts the sweep over every user with unprocessed local transactions.
pub fn start_matching_worker(
    worker: &BackgroundLoop,
    api: Arc<MatchingApi<SqliteDatabase>>,
    monitor: ServiceMonitor,
    user_delay: Duration,
) -> bool {
    worker.start(move || {
        let api = Arc::clone(&api);
        let monitor = monitor.clone();
        async move {
            let summary = api.run_cycle(&monitor, user_delay).await;
            debug!("⚙️ Matching cycle done. {summary:?}");
        }
    })
}
