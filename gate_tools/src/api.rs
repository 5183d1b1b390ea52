use std::sync::Arc;

use log::*;
use reqwest::{
    header::{HeaderMap, HeaderValue, ACCEPT, CONTENT_TYPE, COOKIE},
    Client,
    StatusCode,
};
use serde_json::Value;

use crate::{config::PAYOUTS_PATH, cookie_header, GateApiError, GateConfig, PayoutRecord};

/// Client for the gate's payout listing.
///
/// Every call is made on behalf of a single session, identified by its stored credential.
#[derive(Clone)]
pub struct GateApi {
    config: GateConfig,
    client: Arc<Client>,
}

impl GateApi {
    pub fn new(config: GateConfig) -> Result<Self, GateApiError> {
        let mut headers = HeaderMap::with_capacity(2);
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        let client = Client::builder()
            .default_headers(headers)
            .user_agent(config.user_agent.as_str())
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| GateApiError::Initialization(e.to_string()))?;
        Ok(Self { config, client: Arc::new(client) })
    }

    pub fn config(&self) -> &GateConfig {
        &self.config
    }

    pub fn url(&self) -> String {
        format!("{}{PAYOUTS_PATH}", self.config.base_url.trim_end_matches('/'))
    }

    async fn query_page(&self, credential: &str, page: u32) -> Result<Value, GateApiError> {
        let mut params = self
            .config
            .status_filter
            .iter()
            .map(|s| ("filters[status][]", s.to_string()))
            .collect::<Vec<(&str, String)>>();
        params.push(("page", page.to_string()));
        trace!("Sending payout query: {} page {page}", self.url());
        let response = self
            .client
            .get(self.url())
            .query(&params)
            .header(COOKIE, cookie_header(credential))
            .send()
            .await
            .map_err(|e| GateApiError::Transport(e.to_string()))?;
        let status = response.status();
        if status == StatusCode::UNAUTHORIZED {
            return Err(GateApiError::AuthExpired(status.as_u16()));
        }
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(GateApiError::UnexpectedStatus { status: status.as_u16(), message });
        }
        trace!("Payout query successful. {status}");
        response.json::<Value>().await.map_err(|e| GateApiError::JsonError(e.to_string()))
    }

    /// Fetches the first listing page and checks that it has the expected shape.
    ///
    /// An `Err` that satisfies [`GateApiError::is_auth_error`] means the credential has expired. Any other error
    /// says nothing about the credential.
    pub async fn check_session(&self, credential: &str) -> Result<(), GateApiError> {
        let body = self.query_page(credential, 1).await?;
        payouts_in(&body).map(|_| ())
    }

    /// Returns true only if the gate accepted the credential and answered with a well-formed listing.
    pub async fn validate(&self, credential: &str) -> bool {
        match self.check_session(credential).await {
            Ok(()) => true,
            Err(e) if e.is_auth_error() => {
                info!("🔒️ Gate session has expired. {e}");
                false
            },
            Err(e) => {
                warn!("🔒️ Could not validate gate session. {e}");
                false
            },
        }
    }

    /// Fetches one page of raw payouts. Failures are logged and yield an empty page.
    pub async fn fetch_page(&self, credential: &str, page: u32) -> Vec<Value> {
        let result = self.query_page(credential, page).await.and_then(|body| payouts_in(&body).cloned());
        match result {
            Ok(payouts) => payouts,
            Err(e) => {
                warn!("📄️ Could not fetch payout page {page}. {e}");
                Vec::new()
            },
        }
    }

    /// Fetches pages 1, 2, .. until a page comes back empty or `max_pages` pages have been read, pausing for
    /// `page_delay` between requests.
    pub async fn fetch_all(&self, credential: &str) -> Vec<Value> {
        let mut payouts = Vec::new();
        for page in 1..=self.config.max_pages {
            let batch = self.fetch_page(credential, page).await;
            if batch.is_empty() {
                debug!("📄️ Page {page} is empty. Done.");
                break;
            }
            debug!("📄️ Page {page} has {} payouts", batch.len());
            payouts.extend(batch);
            if page < self.config.max_pages && !self.config.page_delay.is_zero() {
                tokio::time::sleep(self.config.page_delay).await;
            }
        }
        payouts
    }

    /// [`GateApi::fetch_all`], with every payout normalised. Payouts without an id are dropped.
    pub async fn fetch_all_records(&self, credential: &str) -> Vec<PayoutRecord> {
        self.fetch_all(credential)
            .await
            .iter()
            .filter_map(|p| match PayoutRecord::from_json(p) {
                Ok(record) => Some(record),
                Err(e) => {
                    warn!("📄️ Skipping payout. {e}");
                    None
                },
            })
            .collect()
    }
}

fn payouts_in(body: &Value) -> Result<&Vec<Value>, GateApiError> {
    body["response"]["payouts"]["data"]
        .as_array()
        .ok_or_else(|| GateApiError::MalformedResponse("response.payouts.data is not an array".to_string()))
}
