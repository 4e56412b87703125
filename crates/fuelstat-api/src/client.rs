//! Transaction fetching
//!
//! [`FuelApiClient`] sends the built query with the current bearer token,
//! retries exactly once after a 401 with a refreshed token, and normalizes
//! the response into a [`TransactionTable`].

use crate::auth::TokenManager;
use crate::normalize::normalize_response;
use crate::query::Query;
use async_trait::async_trait;
use fuelstat_core::config::ApiSettings;
use fuelstat_core::error::Result;
use fuelstat_core::timezone::TimezoneConfig;
use fuelstat_core::types::TransactionTable;
use reqwest::StatusCode;
use reqwest::header::AUTHORIZATION;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Anything that can answer a transaction query
#[async_trait]
pub trait TransactionSource: Send + Sync {
    async fn fetch(&self, query: &Query) -> Result<TransactionTable>;
}

/// Client for the `/abastecimento` endpoint
pub struct FuelApiClient {
    http: reqwest::Client,
    endpoint: String,
    timeout: Duration,
    tokens: TokenManager,
    timezone: TimezoneConfig,
}

impl FuelApiClient {
    pub fn new(settings: &ApiSettings, timezone: TimezoneConfig) -> Self {
        let http = reqwest::Client::new();
        Self {
            tokens: TokenManager::new(http.clone(), settings),
            http,
            endpoint: format!("{}/abastecimento", settings.base_url),
            timeout: settings.timeout,
            timezone,
        }
    }

    /// Full request URL for a query
    pub fn url_for(&self, query: &Query) -> String {
        format!("{}?{}", self.endpoint, query.query_string())
    }

    async fn send(&self, url: &str, auth: String, timeout: Duration) -> Result<reqwest::Response> {
        Ok(self
            .http
            .get(url)
            .header(AUTHORIZATION, auth)
            .timeout(timeout)
            .send()
            .await?)
    }

    async fn get_with_retry(&self, url: &str, timeout: Duration) -> Result<reqwest::Response> {
        let response = self
            .send(url, self.tokens.auth_header().await?, timeout)
            .await?;

        let response = if response.status() == StatusCode::UNAUTHORIZED {
            warn!("Transaction request unauthorized, refreshing token and retrying once");
            let auth = self.tokens.refresh_and_get().await?;
            self.send(url, auth, timeout).await?
        } else {
            response
        };

        Ok(response.error_for_status()?)
    }
}

#[async_trait]
impl TransactionSource for FuelApiClient {
    async fn fetch(&self, query: &Query) -> Result<TransactionTable> {
        let url = self.url_for(query);
        let timeout = query.timeout.unwrap_or(self.timeout);
        debug!("GET {}", url);

        let response = self.get_with_retry(&url, timeout).await?;
        let body: Value = response.json().await?;

        let table = normalize_response(body, &query.select_fields(), &self.timezone);
        info!("Fetched {} transactions", table.len());
        Ok(table)
    }
}
