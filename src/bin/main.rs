use portfolio_wealth_bot::{
    analytics::ScenarioLabels,
    classifier::StaticClassifier,
    holdings::StaticHoldingsService,
    models::{Holding, IncomingMessage, ObservationValues, ScenarioObservation},
    risk::StaticRiskAnalytics,
    session::InMemorySessionStore,
    TurnPipeline,
};
use std::collections::HashMap;
use tracing::info;

fn observation(instrument: &str, scenario: &str, price: &str) -> ScenarioObservation {
    ScenarioObservation {
        instrument: instrument.to_string(),
        scenario: scenario.to_string(),
        values: vec![ObservationValues {
            price: Some(price.to_string()),
            date: Some("2017/03/10".to_string()),
        }],
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .init();

    info!("Portfolio bot - one-shot demo turn");

    // Canned collaborators so the pipeline runs without live services
    let holdings = StaticHoldingsService {
        holdings: vec![
            Holding {
                asset: "IBM".to_string(),
                instrument_id: "CX_US681919BA38_USD".to_string(),
                quantity: 36.0,
            },
            Holding {
                asset: "LNVGY".to_string(),
                instrument_id: "CX_US03523TBF49_USD".to_string(),
                quantity: 520.0,
            },
        ],
    };

    let mut observations = HashMap::new();
    observations.insert(
        "CX_US681919BA38_USD".to_string(),
        vec![
            observation("CX_US681919BA38_USD", "Base Scenario (0.0000)", "131.1828 USD"),
            observation("CX_US681919BA38_USD", "CONDITIONAL_1 (1.0000)", "131.1718 USD"),
        ],
    );
    observations.insert(
        "CX_US03523TBF49_USD".to_string(),
        vec![
            observation("CX_US03523TBF49_USD", "Base Scenario (0.0000)", "91.1828 USD"),
            observation("CX_US03523TBF49_USD", "CONDITIONAL_1 (1.0000)", "89.0000 USD"),
        ],
    );

    let args: Vec<String> = std::env::args().skip(1).collect();
    let text = if args.is_empty() {
        "What is the impact on my portfolio if the S&P 500 goes down 5%?".to_string()
    } else {
        args.join(" ")
    };

    // Keyword stand-in for the external classifier
    let lowered = text.to_lowercase();
    let intent = if lowered.contains("hello") || lowered.contains("hi ") || lowered == "hi" {
        "hello"
    } else if lowered.contains("holding") || lowered.contains("listing") {
        "portfolio_holdings"
    } else {
        "portfolio_impact"
    };

    let pipeline = TurnPipeline::new(
        Box::new(StaticClassifier::for_intent(intent)),
        Box::new(holdings),
        Box::new(StaticRiskAnalytics { observations }),
        Box::new(InMemorySessionStore::new()),
        ScenarioLabels::default(),
        "P1".to_string(),
    );

    let message = IncomingMessage {
        user: "demo-user".to_string(),
        text,
    };

    info!(user = %message.user, text = %message.text, "Running turn");

    match pipeline.process_message(message).await {
        Ok(reply) => {
            println!("\n=== BOT RESPONSE ===");
            println!("{}", reply.text);
            Ok(())
        }
        Err(e) => {
            eprintln!("Turn failed: {}", e);
            Err(Box::new(e) as Box<dyn std::error::Error>)
        }
    }
}
