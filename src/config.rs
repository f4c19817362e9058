//! Environment-driven configuration
//!
//! Collects the collaborator endpoints and credentials in one place so
//! the pipeline stages receive plain typed values instead of reading
//! the environment themselves.

use crate::analytics::ScenarioLabels;
use crate::error::BotError;
use crate::Result;
use std::env;
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct Config {
    pub classifier_url: String,
    pub classifier_username: Option<String>,
    pub classifier_password: Option<String>,

    pub holdings_url: String,
    pub holdings_username: String,
    pub holdings_password: String,

    pub risk_url: String,
    pub risk_access_token: String,
    pub risk_scenario_file: PathBuf,

    /// Document-database base URL; absent means in-memory sessions.
    pub session_db_url: Option<String>,
    pub session_db_name: String,

    pub portfolio_id: String,
    pub scenario_labels: ScenarioLabels,
    pub port: u16,
}

fn required(name: &str) -> Result<String> {
    env::var(name).map_err(|_| BotError::ConfigError(format!("{} not set", name)))
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let scenario_labels = ScenarioLabels {
            base_prefix: env::var("SCENARIO_BASE_PREFIX").unwrap_or_else(|_| "Base".to_string()),
            conditional_prefix: env::var("SCENARIO_CONDITIONAL_PREFIX")
                .unwrap_or_else(|_| "CONDITIONAL".to_string()),
        };

        let port = env::var("PORT")
            .unwrap_or_else(|_| "8080".to_string())
            .parse()
            .map_err(|_| BotError::ConfigError("PORT must be a number".to_string()))?;

        Ok(Self {
            classifier_url: required("CLASSIFIER_URL")?,
            classifier_username: env::var("CLASSIFIER_USERID").ok(),
            classifier_password: env::var("CLASSIFIER_PWD").ok(),

            holdings_url: required("URL_GET_PORTFOLIO_HOLDINGS")?,
            holdings_username: required("CRED_PORTFOLIO_USERID")?,
            holdings_password: required("CRED_PORTFOLIO_PWD")?,

            risk_url: required("CRED_SIMULATED_INSTRUMENT_ANALYTICS_URL")?,
            risk_access_token: required("CRED_SIMULATED_INSTRUMENT_ANALYTICS_ACCESSTOKEN")?,
            risk_scenario_file: required("CRED_SIMULATED_INSTRUMENT_ANALYTICS_SCENARIO_FILENAME")?
                .into(),

            session_db_url: env::var("CLOUDANT_URL").ok(),
            session_db_name: env::var("CLOUDANT_DB").unwrap_or_else(|_| "botusers".to_string()),

            portfolio_id: env::var("PORTFOLIO_ID").unwrap_or_else(|_| "P1".to_string()),
            scenario_labels,
            port,
        })
    }
}
