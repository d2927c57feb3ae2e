//! Client configuration

use std::env;

use domain::pharmacies::DEFAULT_SEARCH_SIZE;

use crate::{ApiClient, ClientResult, HttpClient};

pub const DEFAULT_BASE_URL: &str = "http://localhost:8080/api";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Connection settings for the record/prescription API
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Server base URL (e.g., "http://localhost:8080/api")
    pub base_url: String,

    /// Bearer token for authentication
    pub token: Option<String>,

    /// Request timeout in seconds
    pub timeout: u64,

    /// Upper bound on pharmacy search results
    pub search_size: usize,
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            token: None,
            timeout: DEFAULT_TIMEOUT_SECS,
            search_size: DEFAULT_SEARCH_SIZE,
        }
    }

    /// Reads `RX_API_BASE_URL`, `RX_API_TOKEN`, `RX_API_TIMEOUT_SECS` and `RX_PHARMACY_SEARCH_SIZE`.
    pub fn from_env() -> Self {
        let base_url = env::var("RX_API_BASE_URL").unwrap_or(DEFAULT_BASE_URL.to_string());

        let token = env::var("RX_API_TOKEN").ok().filter(|t| !t.trim().is_empty());

        let timeout = env::var("RX_API_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_TIMEOUT_SECS);

        let search_size = env::var("RX_PHARMACY_SEARCH_SIZE")
            .ok()
            .and_then(|v| v.parse().ok())
            .filter(|size| *size > 0)
            .unwrap_or(DEFAULT_SEARCH_SIZE);

        Self {
            base_url,
            token,
            timeout,
            search_size,
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    pub fn with_timeout(mut self, seconds: u64) -> Self {
        self.timeout = seconds;
        self
    }

    pub fn with_search_size(mut self, size: usize) -> Self {
        self.search_size = size.max(1);
        self
    }

    pub fn build_http_client(&self) -> ClientResult<HttpClient> {
        HttpClient::new(self)
    }

    pub fn build_api_client(&self) -> ClientResult<ApiClient> {
        ApiClient::new(self)
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL)
    }
}
