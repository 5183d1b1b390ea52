use std::{fmt::Display, str::FromStr, time::Duration};

use log::*;

pub const DEFAULT_GATE_URL: &str = "https://panel.gate.cx";
pub const PAYOUTS_PATH: &str = "/api/v1/payments/payouts";
/// Payout statuses requested from the gate listing.
pub const PAYOUT_STATUS_FILTER: [u32; 5] = [2, 3, 7, 8, 9];
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) \
                                      Chrome/120.0.0.0 Safari/537.36";
pub const DEFAULT_MAX_PAGES: u32 = 25;
pub const DEFAULT_PAGE_DELAY_MS: u64 = 500;
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

pub const DEFAULT_MARKETPLACE_URL: &str = "https://p2p.walletbot.me";
pub const MARKETPLACE_TRANSACTIONS_PATH: &str = "/api/v1/transactions/";
pub const DEFAULT_ORDERS_URL: &str = "http://127.0.0.1:9000";
pub const ORDERS_PATH: &str = "/get_orders";

#[derive(Debug, Clone)]
pub struct GateConfig {
    pub base_url: String,
    pub user_agent: String,
    pub status_filter: Vec<u32>,
    /// Upper bound on the number of listing pages fetched per session per cycle.
    pub max_pages: u32,
    pub page_delay: Duration,
    pub request_timeout: Duration,
}

impl Default for GateConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_GATE_URL.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            status_filter: PAYOUT_STATUS_FILTER.to_vec(),
            max_pages: DEFAULT_MAX_PAGES,
            page_delay: Duration::from_millis(DEFAULT_PAGE_DELAY_MS),
            request_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

impl GateConfig {
    pub fn new_from_env_or_default() -> Self {
        let base_url = std::env::var("RECON_GATE_URL").unwrap_or_else(|_| {
            info!("🪛️ RECON_GATE_URL not set, using {DEFAULT_GATE_URL}");
            DEFAULT_GATE_URL.to_string()
        });
        let user_agent = std::env::var("RECON_GATE_USER_AGENT").unwrap_or_else(|_| DEFAULT_USER_AGENT.to_string());
        let max_pages = env_or_default("RECON_GATE_MAX_PAGES", DEFAULT_MAX_PAGES);
        let page_delay = Duration::from_millis(env_or_default("RECON_GATE_PAGE_DELAY_MS", DEFAULT_PAGE_DELAY_MS));
        let request_timeout = Duration::from_secs(env_or_default("RECON_GATE_TIMEOUT_SECS", DEFAULT_TIMEOUT_SECS));
        Self { base_url, user_agent, status_filter: PAYOUT_STATUS_FILTER.to_vec(), max_pages, page_delay, request_timeout }
    }

    pub fn with_base_url<S: Into<String>>(mut self, base_url: S) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_max_pages(mut self, max_pages: u32) -> Self {
        self.max_pages = max_pages;
        self
    }

    pub fn with_page_delay(mut self, page_delay: Duration) -> Self {
        self.page_delay = page_delay;
        self
    }
}

/// Where marketplace tokens are checked and where completed P2P orders are listed.
#[derive(Debug, Clone)]
pub struct MarketplaceConfig {
    /// Base URL of the P2P marketplace API. Tokens are validated against its transaction listing.
    pub marketplace_url: String,
    /// Base URL of the order export service that lists a token holder's completed orders.
    pub orders_url: String,
    pub request_timeout: Duration,
}

impl Default for MarketplaceConfig {
    fn default() -> Self {
        Self {
            marketplace_url: DEFAULT_MARKETPLACE_URL.to_string(),
            orders_url: DEFAULT_ORDERS_URL.to_string(),
            request_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

impl MarketplaceConfig {
    pub fn new_from_env_or_default() -> Self {
        let marketplace_url = std::env::var("RECON_MARKETPLACE_URL").unwrap_or_else(|_| {
            info!("🪛️ RECON_MARKETPLACE_URL not set, using {DEFAULT_MARKETPLACE_URL}");
            DEFAULT_MARKETPLACE_URL.to_string()
        });
        let orders_url = std::env::var("RECON_ORDERS_URL").unwrap_or_else(|_| {
            info!("🪛️ RECON_ORDERS_URL not set, using {DEFAULT_ORDERS_URL}");
            DEFAULT_ORDERS_URL.to_string()
        });
        let request_timeout =
            Duration::from_secs(env_or_default("RECON_MARKETPLACE_TIMEOUT_SECS", DEFAULT_TIMEOUT_SECS));
        Self { marketplace_url, orders_url, request_timeout }
    }

    pub fn with_marketplace_url<S: Into<String>>(mut self, url: S) -> Self {
        self.marketplace_url = url.into();
        self
    }

    pub fn with_orders_url<S: Into<String>>(mut self, url: S) -> Self {
        self.orders_url = url.into();
        self
    }
}

/// Reads and parses an environment variable, falling back to `default` (with a warning) if it is set but invalid.
pub fn env_or_default<T>(name: &str, default: T) -> T
where
    T: FromStr + Display,
    T::Err: Display,
{
    match std::env::var(name) {
        Ok(s) => s.trim().parse::<T>().unwrap_or_else(|e| {
            warn!("🪛️ {name} is not valid ({e}). Using {default} instead.");
            default
        }),
        Err(_) => {
            debug!("🪛️ {name} not set, using {default}");
            default
        },
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn defaults() {
        let config = GateConfig::default();
        assert_eq!(config.base_url, "https://panel.gate.cx");
        assert_eq!(config.max_pages, 25);
        assert_eq!(config.page_delay, Duration::from_millis(500));
        assert_eq!(config.status_filter, vec![2, 3, 7, 8, 9]);
        let marketplace = MarketplaceConfig::default();
        assert_eq!(marketplace.marketplace_url, "https://p2p.walletbot.me");
        assert_eq!(marketplace.orders_url, "http://127.0.0.1:9000");
    }

    #[test]
    fn invalid_env_values_fall_back() {
        std::env::set_var("GATE_TOOLS_TEST_PAGES", "lots");
        assert_eq!(env_or_default("GATE_TOOLS_TEST_PAGES", 7u32), 7);
        std::env::set_var("GATE_TOOLS_TEST_PAGES", " 3 ");
        assert_eq!(env_or_default("GATE_TOOLS_TEST_PAGES", 7u32), 3);
        assert_eq!(env_or_default("GATE_TOOLS_TEST_UNSET", 11u64), 11);
    }
}
