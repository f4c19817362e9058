//! HTTP surface for the portfolio bot
//!
//! Accepts SMS-webhook style message envelopes and returns the envelope
//! merged with the rendered response and conversation context. Exactly
//! one message goes back per turn: the rendered answer, or a generic
//! failure notice when a collaborator fails.

use axum::{extract::State, http::StatusCode, routing::{get, post}, Json, Router};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tracing::{error, info};

use crate::models::IncomingMessage;
use crate::pipeline::TurnPipeline;

pub const FAILURE_TEXT: &str =
    "Sorry, something went wrong handling your message. Please try again.";

/// =============================
/// Envelope
/// =============================

/// Inbound envelope. `user`/`from` and `input.text`/`text`/`Body` are
/// accepted interchangeably (`Body` is what the SMS gateway sends);
/// unrecognized fields are carried through to the response untouched.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageEnvelope {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(rename = "Body", default, skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input: Option<EnvelopeInput>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnvelopeInput {
    pub text: String,
}

impl MessageEnvelope {
    /// Normalize the envelope into the internal message shape, or
    /// `None` when no user or text can be found.
    pub fn to_message(&self) -> Option<IncomingMessage> {
        let user = self.user.clone().or_else(|| self.from.clone())?;
        let text = self
            .input
            .as_ref()
            .map(|input| input.text.clone())
            .or_else(|| self.text.clone())
            .or_else(|| self.body.clone())?;

        Some(IncomingMessage { user, text })
    }
}

/// =============================
/// API State
/// =============================

#[derive(Clone)]
pub struct ApiState {
    pub pipeline: Arc<TurnPipeline>,
}

/// =============================
/// Health Endpoint
/// =============================

async fn health() -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339()
    }))
}

/// =============================
/// Message Endpoint
/// =============================

async fn handle_message(
    State(state): State<ApiState>,
    Json(envelope): Json<MessageEnvelope>,
) -> (StatusCode, Json<Value>) {
    let Some(message) = envelope.to_message() else {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({
                "output": { "text": FAILURE_TEXT },
                "error": "envelope is missing a user or message text"
            })),
        );
    };

    info!(user = %message.user, "Received inbound message");

    match state.pipeline.process_message(message).await {
        Ok(reply) => {
            // Merge the reply into the original envelope.
            let mut merged = serde_json::to_value(&envelope).unwrap_or_else(|_| json!({}));
            merged["output"] = json!({ "text": reply.text });
            merged["context"] = reply.context;
            (StatusCode::OK, Json(merged))
        }
        Err(e) => {
            error!(error = %e, "Turn failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "output": { "text": FAILURE_TEXT } })),
            )
        }
    }
}

/// =============================
/// Router
/// =============================

pub fn create_router(pipeline: Arc<TurnPipeline>) -> Router {
    let state = ApiState { pipeline };

    Router::new()
        .route("/health", get(health))
        .route("/webhook/message", post(handle_message))
        .with_state(state)
        .layer(CorsLayer::permissive())
}

/// =============================
/// Server Startup
/// =============================

pub async fn start_server(
    pipeline: Arc<TurnPipeline>,
    port: u16,
) -> std::result::Result<(), Box<dyn std::error::Error>> {
    let router = create_router(pipeline);

    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", port)).await?;

    info!("API Server listening on http://0.0.0.0:{}", port);

    axum::serve(listener, router).await?;

    Ok(())
}
