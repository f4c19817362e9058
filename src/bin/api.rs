use portfolio_wealth_bot::{
    api::start_server,
    classifier::HttpClassifier,
    config::Config,
    holdings::HttpHoldingsService,
    risk::HttpRiskAnalytics,
    session::{CloudantSessionStore, InMemorySessionStore, SessionStore},
    TurnPipeline,
};
use std::sync::Arc;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .init();

    // Load environment variables
    dotenv::dotenv().ok();

    let config = Config::from_env()?;

    info!("Portfolio Wealth Bot - API Server");
    info!("Port: {}", config.port);

    let classifier = HttpClassifier::new(
        config.classifier_url.clone(),
        config.classifier_username.clone(),
        config.classifier_password.clone(),
    )?;

    let holdings = HttpHoldingsService::new(
        config.holdings_url.clone(),
        config.holdings_username.clone(),
        config.holdings_password.clone(),
    )?;

    let risk = HttpRiskAnalytics::new(
        config.risk_url.clone(),
        config.risk_access_token.clone(),
        config.risk_scenario_file.clone(),
    )?;

    let sessions: Box<dyn SessionStore> = match &config.session_db_url {
        Some(url) => {
            info!("Session store backend: cloudant");
            Box::new(CloudantSessionStore::new(
                url.clone(),
                config.session_db_name.clone(),
            )?)
        }
        None => {
            warn!("CLOUDANT_URL not set, session store backend: in-memory");
            Box::new(InMemorySessionStore::new())
        }
    };

    let pipeline = Arc::new(TurnPipeline::new(
        Box::new(classifier),
        Box::new(holdings),
        Box::new(risk),
        sessions,
        config.scenario_labels.clone(),
        config.portfolio_id.clone(),
    ));

    info!("Pipeline initialized");
    info!("Starting API server...");

    start_server(pipeline, config.port).await?;

    Ok(())
}
