mod api;
mod config;
mod credentials;
mod error;
mod helpers;
mod marketplace;

mod data_objects;

pub use api::GateApi;
pub use config::{
    env_or_default,
    GateConfig,
    MarketplaceConfig,
    DEFAULT_GATE_URL,
    DEFAULT_MARKETPLACE_URL,
    DEFAULT_ORDERS_URL,
    DEFAULT_USER_AGENT,
    MARKETPLACE_TRANSACTIONS_PATH,
    ORDERS_PATH,
    PAYOUTS_PATH,
    PAYOUT_STATUS_FILTER,
};
pub use credentials::cookie_header;
pub use data_objects::{MarketplaceOrder, PayoutRecord, FIAT_CURRENCY_CODE, STABLE_CURRENCY_CODE};
pub use error::GateApiError;
pub use marketplace::{MarketplaceApi, EXPIRED_TOKEN_CODES};
