use std::{env, time::Duration};

use gate_tools::{env_or_default, GateConfig, MarketplaceConfig};
use log::*;
use recon_common::parse_boolean_flag;
use recon_engine::{db_url, MatchCurrency, MatchSettings};

const DEFAULT_RECON_HOST: &str = "127.0.0.1";
const DEFAULT_RECON_PORT: u16 = 8370;
const DEFAULT_POLL_INTERVAL_SECS: u64 = 60;
const DEFAULT_MATCH_INTERVAL_SECS: u64 = 60;
const DEFAULT_TOKEN_INTERVAL_SECS: u64 = 60;
const DEFAULT_USER_DELAY_MS: u64 = 1000;

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    /// Apply any outstanding database migrations before starting.
    pub run_migrations: bool,
    pub gate: GateConfig,
    pub marketplace: MarketplaceConfig,
    pub match_settings: MatchSettings,
    /// Pause between the end of one ingestion cycle and the start of the next.
    pub poll_interval: Duration,
    /// Pause between the end of one matching cycle and the start of the next.
    pub match_interval: Duration,
    /// Pause between the end of one token validation cycle and the start of the next.
    pub token_interval: Duration,
    /// Pause between users within a cycle, to spread the load on the gate.
    pub user_delay: Duration,
    /// Runs the standalone matching loop. Ingestion reconciles each user it polls regardless.
    pub enable_matching_worker: bool,
    /// Runs the loop that checks marketplace tokens and pulls in completed orders.
    pub enable_token_worker: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_RECON_HOST.to_string(),
            port: DEFAULT_RECON_PORT,
            database_url: String::default(),
            run_migrations: true,
            gate: GateConfig::default(),
            marketplace: MarketplaceConfig::default(),
            match_settings: MatchSettings::default(),
            poll_interval: Duration::from_secs(DEFAULT_POLL_INTERVAL_SECS),
            match_interval: Duration::from_secs(DEFAULT_MATCH_INTERVAL_SECS),
            token_interval: Duration::from_secs(DEFAULT_TOKEN_INTERVAL_SECS),
            user_delay: Duration::from_millis(DEFAULT_USER_DELAY_MS),
            enable_matching_worker: true,
            enable_token_worker: true,
        }
    }
}

impl ServerConfig {
    pub fn new(host: &str, port: u16) -> Self {
        Self { host: host.to_string(), port, ..Default::default() }
    }

    pub fn from_env_or_default() -> Self {
        let host = env::var("RECON_HOST").ok().unwrap_or_else(|| DEFAULT_RECON_HOST.into());
        let port = env_or_default("RECON_PORT", DEFAULT_RECON_PORT);
        let database_url = db_url();
        let run_migrations = parse_boolean_flag(env::var("RECON_RUN_MIGRATIONS").ok(), true);
        let gate = GateConfig::new_from_env_or_default();
        let marketplace = MarketplaceConfig::new_from_env_or_default();
        let match_settings = match_settings_from_env();
        let poll_interval = Duration::from_secs(env_or_default("RECON_POLL_INTERVAL_SECS", DEFAULT_POLL_INTERVAL_SECS));
        let match_interval =
            Duration::from_secs(env_or_default("RECON_MATCH_INTERVAL_SECS", DEFAULT_MATCH_INTERVAL_SECS));
        let token_interval =
            Duration::from_secs(env_or_default("RECON_TOKEN_INTERVAL_SECS", DEFAULT_TOKEN_INTERVAL_SECS));
        let user_delay = Duration::from_millis(env_or_default("RECON_USER_DELAY_MS", DEFAULT_USER_DELAY_MS));
        let enable_matching_worker = parse_boolean_flag(env::var("RECON_ENABLE_MATCHING_WORKER").ok(), true);
        if !enable_matching_worker {
            info!("🪛️ The standalone matching worker is disabled. Users are only reconciled after ingestion.");
        }
        let enable_token_worker = parse_boolean_flag(env::var("RECON_ENABLE_TOKEN_WORKER").ok(), true);
        if !enable_token_worker {
            info!("🪛️ The token validation worker is disabled. Marketplace orders must be posted to the API.");
        }
        Self {
            host,
            port,
            database_url,
            run_migrations,
            gate,
            marketplace,
            match_settings,
            poll_interval,
            match_interval,
            token_interval,
            user_delay,
            enable_matching_worker,
            enable_token_worker,
        }
    }
}

fn match_settings_from_env() -> MatchSettings {
    let defaults = MatchSettings::default();
    let lookback_days = env_or_default("RECON_MATCH_LOOKBACK_DAYS", defaults.lookback.num_days());
    let window_mins = env_or_default("RECON_MATCH_WINDOW_MINS", defaults.window.num_minutes());
    let currency = env_or_default("RECON_MATCH_CURRENCY", MatchCurrency::default());
    let lookback = if lookback_days > 0 {
        chrono::Duration::days(lookback_days)
    } else {
        warn!("🪛️ RECON_MATCH_LOOKBACK_DAYS must be positive. Using {} days.", defaults.lookback.num_days());
        defaults.lookback
    };
    let window = if window_mins >= 0 {
        chrono::Duration::minutes(window_mins)
    } else {
        warn!("🪛️ RECON_MATCH_WINDOW_MINS cannot be negative. Using {} minutes.", defaults.window.num_minutes());
        defaults.window
    };
    MatchSettings { window, lookback, currency, ..defaults }
}
