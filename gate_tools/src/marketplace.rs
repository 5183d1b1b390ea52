use std::sync::Arc;

use log::*;
use reqwest::{
    header::{HeaderMap, HeaderValue, ACCEPT},
    Client,
};
use serde_json::Value;

use crate::{
    config::{MarketplaceConfig, MARKETPLACE_TRANSACTIONS_PATH, ORDERS_PATH},
    GateApiError,
    MarketplaceOrder,
};

/// Error codes the marketplace answers with when a token can no longer be used.
pub const EXPIRED_TOKEN_CODES: [&str; 2] = ["token_expired", "creds_not_provided"];

/// Client for the P2P marketplace: checks a user's token and lists the orders the user has completed.
#[derive(Clone)]
pub struct MarketplaceApi {
    config: MarketplaceConfig,
    client: Arc<Client>,
}

impl MarketplaceApi {
    pub fn new(config: MarketplaceConfig) -> Result<Self, GateApiError> {
        let mut headers = HeaderMap::with_capacity(1);
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        let client = Client::builder()
            .default_headers(headers)
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| GateApiError::Initialization(e.to_string()))?;
        Ok(Self { config, client: Arc::new(client) })
    }

    pub fn config(&self) -> &MarketplaceConfig {
        &self.config
    }

    fn url(base: &str, path: &str) -> String {
        format!("{}{path}", base.trim_end_matches('/'))
    }

    /// Asks the marketplace for the token holder's transactions. Only an explicit expiry code in the answer counts as
    /// a rejection; the listing itself is not inspected.
    pub async fn check_token(&self, token: &str) -> Result<(), GateApiError> {
        let url = Self::url(&self.config.marketplace_url, MARKETPLACE_TRANSACTIONS_PATH);
        trace!("Checking marketplace token against {url}");
        let response = self
            .client
            .get(url)
            .bearer_auth(token)
            .send()
            .await
            .map_err(|e| GateApiError::Transport(e.to_string()))?;
        let body = response.json::<Value>().await.map_err(|e| GateApiError::JsonError(e.to_string()))?;
        match body["code"].as_str() {
            Some(code) if EXPIRED_TOKEN_CODES.contains(&code) => Err(GateApiError::TokenRejected(code.to_string())),
            _ => Ok(()),
        }
    }

    /// False if the token was rejected or could not be checked at all.
    pub async fn validate_token(&self, token: &str) -> bool {
        match self.check_token(token).await {
            Ok(()) => true,
            Err(e) if e.is_auth_error() => {
                info!("🔒️ Marketplace token has expired. {e}");
                false
            },
            Err(e) => {
                warn!("🔒️ Could not validate marketplace token. {e}");
                false
            },
        }
    }

    /// Lists the token holder's completed orders, as raw JSON.
    pub async fn fetch_orders(&self, token: &str) -> Result<Vec<Value>, GateApiError> {
        let url = Self::url(&self.config.orders_url, ORDERS_PATH);
        trace!("Fetching marketplace orders from {url}");
        let response = self
            .client
            .post(url)
            .form(&[("token", token)])
            .send()
            .await
            .map_err(|e| GateApiError::Transport(e.to_string()))?;
        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(GateApiError::UnexpectedStatus { status: status.as_u16(), message });
        }
        let body = response.json::<Value>().await.map_err(|e| GateApiError::JsonError(e.to_string()))?;
        match body {
            Value::Array(orders) => Ok(orders),
            _ => Err(GateApiError::MalformedResponse("The order listing is not an array".to_string())),
        }
    }

    /// [`MarketplaceApi::fetch_orders`], with every order normalised. Orders without an id or a completion time are
    /// dropped.
    pub async fn fetch_order_records(&self, token: &str) -> Result<Vec<MarketplaceOrder>, GateApiError> {
        let orders = self.fetch_orders(token).await?;
        let records = orders
            .iter()
            .filter_map(|o| match MarketplaceOrder::from_json(o) {
                Ok(order) => Some(order),
                Err(e) => {
                    warn!("📄️ Skipping marketplace order. {e}");
                    None
                },
            })
            .collect();
        Ok(records)
    }
}
