//! Simulated instrument analytics collaborator
//!
//! Revalues one instrument at a time under a scenario file and returns
//! the raw scenario observations. The per-instrument fan-out is the
//! only point of parallelism in a turn.

use crate::error::BotError;
use crate::models::ScenarioObservation;
use crate::Result;
use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::Client;
use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, error, info};

/// Trait for the scenario analytics service
#[async_trait]
pub trait RiskAnalyticsService: Send + Sync {
    /// Run scenario analytics for a single instrument.
    async fn analyze_instrument(&self, instrument_id: &str) -> Result<Vec<ScenarioObservation>>;
}

/// Query analytics for every instrument concurrently.
///
/// One outbound request per instrument; results are combined
/// positionally. Fail-fast: a single failed request aborts the turn.
pub async fn analyze_instruments(
    service: &dyn RiskAnalyticsService,
    instrument_ids: &[String],
) -> Result<Vec<Vec<ScenarioObservation>>> {
    debug!(instrument_count = instrument_ids.len(), "Fanning out analytics requests");

    let requests = instrument_ids
        .iter()
        .map(|id| service.analyze_instrument(id));

    futures::future::try_join_all(requests).await
}

/// HTTP analytics client (connection-pooled)
///
/// Each request posts the configured scenario file as a multipart
/// attachment with the service access token in a header.
pub struct HttpRiskAnalytics {
    client: Client,
    base_url: String,
    access_token: String,
    scenario_file: PathBuf,
}

impl HttpRiskAnalytics {
    pub fn new(base_url: String, access_token: String, scenario_file: PathBuf) -> Result<Self> {
        let client = Client::builder()
            .pool_idle_timeout(Duration::from_secs(90))
            .pool_max_idle_per_host(8)
            .build()?;

        Ok(Self {
            client,
            base_url,
            access_token,
            scenario_file,
        })
    }
}

#[async_trait]
impl RiskAnalyticsService for HttpRiskAnalytics {
    async fn analyze_instrument(&self, instrument_id: &str) -> Result<Vec<ScenarioObservation>> {
        let url = format!("{}/{}", self.base_url, instrument_id);

        let scenario_bytes = tokio::fs::read(&self.scenario_file).await.map_err(|e| {
            error!(path = %self.scenario_file.display(), "Failed to read scenario file: {}", e);
            BotError::RiskAnalyticsError(format!("scenario file unreadable: {}", e))
        })?;

        let file_name = self
            .scenario_file
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "scenario.csv".to_string());

        let form = Form::new().part("scenario_file", Part::bytes(scenario_bytes).file_name(file_name));

        info!(%instrument_id, "Requesting instrument analytics");

        let response = self
            .client
            .post(&url)
            .header("X-Access-Token", &self.access_token)
            .multipart(form)
            .send()
            .await
            .map_err(|e| {
                error!(%instrument_id, "Analytics request failed: {}", e);
                BotError::RiskAnalyticsError(format!("analytics service unreachable: {}", e))
            })?;

        if !response.status().is_success() {
            let status = response.status();
            error!(%instrument_id, %status, "Analytics service error response");
            return Err(BotError::RiskAnalyticsError(format!(
                "analytics service returned {} for {}",
                status, instrument_id
            )));
        }

        response.json().await.map_err(|e| {
            error!(%instrument_id, "Failed to parse analytics response: {}", e);
            BotError::RiskAnalyticsError(format!("invalid analytics payload: {}", e))
        })
    }
}

/// Canned analytics service for development & testing.
/// Instruments without canned observations fail the request, which
/// exercises the fail-fast fan-out path.
pub struct StaticRiskAnalytics {
    pub observations: HashMap<String, Vec<ScenarioObservation>>,
}

#[async_trait]
impl RiskAnalyticsService for StaticRiskAnalytics {
    async fn analyze_instrument(&self, instrument_id: &str) -> Result<Vec<ScenarioObservation>> {
        self.observations
            .get(instrument_id)
            .cloned()
            .ok_or_else(|| {
                BotError::RiskAnalyticsError(format!(
                    "no canned observations for {}",
                    instrument_id
                ))
            })
    }
}
