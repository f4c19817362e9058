//! Core data models for the portfolio bot

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

//
// ================= Inbound =================
//

/// One user message, normalized from the transport envelope.
/// Immutable once received.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IncomingMessage {
    pub user: String,
    pub text: String,
}

//
// ================= Classification =================
//

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Intent {
    pub intent: String,
    pub confidence: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Entity {
    pub entity: String,
    pub value: String,
}

/// What the classifier returned for one turn.
///
/// `context` is an opaque blob owned by the classifier; it is
/// round-tripped through the session store unchanged apart from being
/// replaced each turn.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ClassificationResult {
    #[serde(default)]
    pub context: Value,
    #[serde(default)]
    pub intents: Vec<Intent>,
    #[serde(default)]
    pub entities: Vec<Entity>,
}

impl ClassificationResult {
    /// Name of the best-guess intent, or the empty string when the
    /// classifier returned no intents at all.
    pub fn top_intent(&self) -> &str {
        self.intents
            .first()
            .map(|i| i.intent.as_str())
            .unwrap_or("")
    }
}

//
// ================= Holdings =================
//

/// A position in one instrument. Quantity is a signed count of units;
/// negative values are short positions and flow through the impact
/// math unchanged.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Holding {
    pub asset: String,
    #[serde(rename = "instrumentId", alias = "instrument_Id")]
    pub instrument_id: String,
    pub quantity: f64,
}

/// Outer shape returned by the holdings service:
/// `{ holdings: [ { holdings: [Holding, ...] } ] }`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HoldingsResponse {
    #[serde(default)]
    pub holdings: Vec<PortfolioRecord>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PortfolioRecord {
    #[serde(default)]
    pub holdings: Vec<Holding>,
}

//
// ================= Scenario Analytics =================
//

/// One raw scenario observation for an instrument, as returned by the
/// instrument analytics service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioObservation {
    pub instrument: String,
    pub scenario: String,
    #[serde(default)]
    pub values: Vec<ObservationValues>,
}

/// Observed values record. The price is encoded as
/// `"<number> <currency-code>"`, e.g. `"131.1828 USD"`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ObservationValues {
    #[serde(rename = "THEO/Price", skip_serializing_if = "Option::is_none")]
    pub price: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
}

/// Normalized (base, conditional) valuation pair for one instrument,
/// derived from the raw observations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NormalizedAnalytic {
    pub instrument_id: String,
    pub base_value: f64,
    pub scenario_value: f64,
    pub percent_change: f64,
}

//
// ================= Impact =================
//

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HoldingImpact {
    pub asset: String,
    pub quantity: f64,
    pub percent_change: f64,
    pub value_change: f64,
    pub portfolio_impact_share: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PortfolioImpact {
    pub total_value_change: f64,
    pub total_percent_change: f64,
    pub impact_by_holding: Vec<HoldingImpact>,
}

//
// ================= Session =================
//

/// Per-user conversation session. Keyed by user identifier in the
/// session store; holds the classifier-owned context between turns.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(default)]
    pub context: Value,
    #[serde(default = "Utc::now")]
    pub updated_at: DateTime<Utc>,
}

impl Session {
    /// Brand-new session with an empty context.
    pub fn new(user: &str) -> Self {
        Self {
            id: user.to_string(),
            context: Value::Object(serde_json::Map::new()),
            updated_at: Utc::now(),
        }
    }
}

//
// ================= Outbound =================
//

/// The rendered reply for one turn, carried back to the transport
/// layer together with the updated conversation context.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TurnReply {
    pub user: String,
    pub text: String,
    pub context: Value,
}
