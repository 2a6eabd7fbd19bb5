//! Nearmap coverage API client (blocking).

use reqwest::blocking::Client;
use serde_json::Value;

use crate::error::{AppError, EXIT_USAGE, PricingError};
use crate::pricing::{PricingService, TransactionQuery, TransactionQuote, classify_failure, parse_quote};

pub const DEFAULT_COVERAGE_URL: &str = "https://api.nearmap.com/coverage/v2/tx/aoi";
pub const DEFAULT_QUOTA_URL: &str = "https://api.betterview.net/api/properties/quota";

pub const API_KEY_VAR: &str = "NEARMAP_API_KEY";
const COVERAGE_URL_VAR: &str = "NEARMAP_COVERAGE_URL";
const QUOTA_URL_VAR: &str = "NEARMAP_QUOTA_URL";

pub struct NearmapClient {
    client: Client,
    api_key: String,
    coverage_url: String,
    quota_url: String,
}

impl NearmapClient {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.into(),
            coverage_url: DEFAULT_COVERAGE_URL.to_string(),
            quota_url: DEFAULT_QUOTA_URL.to_string(),
        }
    }

    /// Build a client from `NEARMAP_API_KEY` (and optional URL overrides),
    /// reading `.env` first.
    pub fn from_env() -> Result<Self, AppError> {
        dotenvy::dotenv().ok();
        let api_key = std::env::var(API_KEY_VAR)
            .ok()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| AppError::new(EXIT_USAGE, format!("Missing {API_KEY_VAR} in environment (.env).")))?;
        Ok(Self::new(api_key).with_endpoints_from_env())
    }

    pub fn with_endpoints_from_env(mut self) -> Self {
        if let Ok(url) = std::env::var(COVERAGE_URL_VAR) {
            self.coverage_url = url;
        }
        if let Ok(url) = std::env::var(QUOTA_URL_VAR) {
            self.quota_url = url;
        }
        self
    }

    /// Remaining credits for the account, returned as the service sends it.
    pub fn remaining_credits(&self) -> Result<Value, PricingError> {
        let resp = self
            .client
            .get(&self.quota_url)
            .header("accept", "application/json")
            .bearer_auth(&self.api_key)
            .send()
            .map_err(|e| PricingError::Request(e.to_string()))?;

        let status = resp.status();
        let body = resp.text().map_err(|e| PricingError::Request(e.to_string()))?;
        tracing::debug!(status = status.as_u16(), bytes = body.len(), "quota response");

        if !status.is_success() {
            return Err(PricingError::Status {
                status: status.as_u16(),
                body,
            });
        }
        if body.trim().is_empty() {
            return Err(PricingError::EmptyResponse);
        }
        serde_json::from_str(&body).map_err(|e| PricingError::Decode(e.to_string()))
    }
}

impl PricingService for NearmapClient {
    fn quote(&self, query: &TransactionQuery) -> Result<TransactionQuote, PricingError> {
        let resp = self
            .client
            .post(&self.coverage_url)
            .query(&[("apikey", self.api_key.as_str())])
            .header("accept", "application/json")
            .json(query)
            .send()
            .map_err(|e| PricingError::Request(e.to_string()))?;

        let status = resp.status();
        let body = resp.text().map_err(|e| PricingError::Request(e.to_string()))?;
        tracing::debug!(status = status.as_u16(), bytes = body.len(), "coverage transaction response");

        if status.as_u16() != 200 {
            return Err(classify_failure(status.as_u16(), &body));
        }
        parse_quote(&body)
    }
}
