use std::collections::HashMap;

use chrono::{DateTime, Utc};
use cucumber::World;
use recon_engine::{events::EventProducers, MatchSettings, MatchingApi, SqliteDatabase};

use crate::support;

#[derive(Default, Debug, World)]
pub struct ReconWorld {
    pub system: Option<ReconSystem>,
}

#[derive(Debug)]
pub struct ReconSystem {
    pub db: SqliteDatabase,
    pub matcher: MatchingApi<SqliteDatabase>,
    /// Every time in a scenario is given relative to this.
    pub reference_time: DateTime<Utc>,
    /// order id -> local transaction id
    pub orders: HashMap<String, i64>,
    /// gate transaction id -> row id
    pub payouts: HashMap<String, i64>,
}

impl ReconWorld {
    pub fn system(&self) -> &ReconSystem {
        self.system.as_ref().expect("System not initialised")
    }

    pub fn system_mut(&mut self) -> &mut ReconSystem {
        self.system.as_mut().expect("System not initialised")
    }
}

impl ReconSystem {
    pub async fn new() -> Self {
        let db = support::prepare_test_db().await;
        let matcher = MatchingApi::new(db.clone(), MatchSettings::default(), EventProducers::default());
        Self {
            db,
            matcher,
            reference_time: support::base_time(),
            orders: HashMap::new(),
            payouts: HashMap::new(),
        }
    }
}
