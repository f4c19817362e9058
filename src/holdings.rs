//! Investment portfolio holdings collaborator
//!
//! Fetches the current holdings for a portfolio and adapts the service
//! response shape into the internal holdings list.

use crate::error::BotError;
use crate::models::{Holding, HoldingsResponse, PortfolioRecord};
use crate::Result;
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use tracing::{error, info};

/// Trait for the holdings lookup service
#[async_trait]
pub trait HoldingsService: Send + Sync {
    async fn fetch_holdings(&self, portfolio_id: &str) -> Result<HoldingsResponse>;
}

/// Project the nested service response into the inner holdings list.
///
/// Pure and total: an empty outer list yields an empty list.
pub fn resolve_holdings(response: &HoldingsResponse) -> Vec<Holding> {
    response
        .holdings
        .first()
        .map(|record| record.holdings.clone())
        .unwrap_or_default()
}

/// HTTP holdings client (connection-pooled, basic auth)
pub struct HttpHoldingsService {
    client: Client,
    base_url: String,
    username: String,
    password: String,
}

impl HttpHoldingsService {
    pub fn new(base_url: String, username: String, password: String) -> Result<Self> {
        let client = Client::builder()
            .pool_idle_timeout(Duration::from_secs(90))
            .build()?;

        Ok(Self {
            client,
            base_url,
            username,
            password,
        })
    }
}

#[async_trait]
impl HoldingsService for HttpHoldingsService {
    async fn fetch_holdings(&self, portfolio_id: &str) -> Result<HoldingsResponse> {
        let url = format!("{}/{}/holdings", self.base_url, portfolio_id);

        info!(%portfolio_id, "Fetching portfolio holdings");

        let response = self
            .client
            .get(&url)
            .basic_auth(&self.username, Some(&self.password))
            .send()
            .await
            .map_err(|e| {
                error!("Holdings request failed: {}", e);
                BotError::HoldingsError(format!("holdings service unreachable: {}", e))
            })?;

        if !response.status().is_success() {
            let status = response.status();
            error!(%status, "Holdings service error response");
            return Err(BotError::HoldingsError(format!(
                "holdings service returned {}",
                status
            )));
        }

        response.json().await.map_err(|e| {
            error!("Failed to parse holdings response: {}", e);
            BotError::HoldingsError(format!("invalid holdings payload: {}", e))
        })
    }
}

/// Fixed-response holdings service for development & testing
pub struct StaticHoldingsService {
    pub holdings: Vec<Holding>,
}

#[async_trait]
impl HoldingsService for StaticHoldingsService {
    async fn fetch_holdings(&self, _portfolio_id: &str) -> Result<HoldingsResponse> {
        Ok(HoldingsResponse {
            holdings: vec![PortfolioRecord {
                holdings: self.holdings.clone(),
            }],
        })
    }
}
