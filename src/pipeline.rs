//! Conversation session pipeline
//!
//! Orchestrates one turn end-to-end:
//! load session → classify → route → [fan-out analytics] → render → persist.
//! No state survives past a turn's completion; the session store is the
//! only persistence and this pipeline is the only component touching it.

use crate::analytics::{parse_risk_analytics, ScenarioLabels};
use crate::classifier::IntentClassifier;
use crate::holdings::{resolve_holdings, HoldingsService};
use crate::impact::aggregate_portfolio_impact;
use crate::models::{IncomingMessage, Session, TurnReply};
use crate::risk::{analyze_instruments, RiskAnalyticsService};
use crate::router::{
    implicated_instruments, render_holdings, render_impact, RouteBranch, EMPTY_PORTFOLIO_TEXT,
    GREETING_TEXT, UNKNOWN_INTENT_TEXT,
};
use crate::session::SessionStore;
use crate::Result;
use chrono::Utc;
use tracing::{debug, info};
use uuid::Uuid;

/// One-turn orchestrator over the four external collaborators.
pub struct TurnPipeline {
    classifier: Box<dyn IntentClassifier>,
    holdings: Box<dyn HoldingsService>,
    risk: Box<dyn RiskAnalyticsService>,
    sessions: Box<dyn SessionStore>,
    labels: ScenarioLabels,
    portfolio_id: String,
}

impl TurnPipeline {
    pub fn new(
        classifier: Box<dyn IntentClassifier>,
        holdings: Box<dyn HoldingsService>,
        risk: Box<dyn RiskAnalyticsService>,
        sessions: Box<dyn SessionStore>,
        labels: ScenarioLabels,
        portfolio_id: String,
    ) -> Self {
        Self {
            classifier,
            holdings,
            risk,
            sessions,
            labels,
            portfolio_id,
        }
    }

    /// Process one inbound message into exactly one reply.
    ///
    /// Collaborator failures abort the turn; the session context is
    /// persisted only on the success path.
    pub async fn process_message(&self, message: IncomingMessage) -> Result<TurnReply> {
        let turn_id = Uuid::new_v4();

        info!(%turn_id, user = %message.user, "Processing message");

        // 1. Load session; an absent record means a brand-new session,
        //    not an error.
        let session = self
            .sessions
            .load(&message.user)
            .await?
            .unwrap_or_else(|| Session::new(&message.user));

        // 2. Classify against the loaded context.
        let classification = self.classifier.classify(&message, &session.context).await?;
        let intent = classification.top_intent().to_string();

        debug!(%turn_id, %intent, "Routing classified message");

        // 3. Route and render.
        let text = match RouteBranch::for_intent(&intent) {
            RouteBranch::Greeting => GREETING_TEXT.to_string(),
            RouteBranch::Unknown => UNKNOWN_INTENT_TEXT.to_string(),
            RouteBranch::HoldingsQuery => {
                let response = self.holdings.fetch_holdings(&self.portfolio_id).await?;
                let holdings = resolve_holdings(&response);
                render_holdings(&holdings)
            }
            RouteBranch::ImpactQuery => {
                let response = self.holdings.fetch_holdings(&self.portfolio_id).await?;
                let holdings = resolve_holdings(&response);

                if holdings.is_empty() {
                    EMPTY_PORTFOLIO_TEXT.to_string()
                } else {
                    let instruments =
                        implicated_instruments(&holdings, &classification.entities);
                    let raw = analyze_instruments(self.risk.as_ref(), &instruments).await?;
                    let analytics = parse_risk_analytics(&raw, &self.labels);
                    let impact = aggregate_portfolio_impact(&holdings, &analytics);
                    render_impact(&impact)
                }
            }
        };

        // 4. Persist the context the classifier returned, under the
        //    same session key.
        let updated = Session {
            id: session.id,
            context: classification.context.clone(),
            updated_at: Utc::now(),
        };
        self.sessions.save(&updated).await?;

        info!(%turn_id, "Turn complete");

        Ok(TurnReply {
            user: message.user,
            text,
            context: classification.context,
        })
    }
}
