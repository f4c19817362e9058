//! Conversational intent classifier collaborator
//!
//! The classifier owns the conversation context; the bot only reads the
//! ranked intents, the extracted entities and the replacement context.
//! Uses a long-lived reqwest::Client for connection pooling.

use crate::error::BotError;
use crate::models::{ClassificationResult, Entity, IncomingMessage, Intent};
use crate::Result;
use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use serde_json::Value;
use std::time::Duration;
use tracing::{error, info};

/// Trait for intent classification
#[async_trait]
pub trait IntentClassifier: Send + Sync {
    /// Classify one message against the session context loaded for the user.
    async fn classify(
        &self,
        message: &IncomingMessage,
        context: &Value,
    ) -> Result<ClassificationResult>;
}

#[derive(Debug, Serialize)]
struct ClassifyRequest<'a> {
    input: ClassifyInput<'a>,
    context: &'a Value,
    user: &'a str,
}

#[derive(Debug, Serialize)]
struct ClassifyInput<'a> {
    text: &'a str,
}

/// HTTP classifier client (connection-pooled)
pub struct HttpClassifier {
    client: Client,
    url: String,
    username: Option<String>,
    password: Option<String>,
}

impl HttpClassifier {
    pub fn new(url: String, username: Option<String>, password: Option<String>) -> Result<Self> {
        let client = Client::builder()
            .pool_idle_timeout(Duration::from_secs(90))
            .pool_max_idle_per_host(8)
            .build()?;

        Ok(Self {
            client,
            url,
            username,
            password,
        })
    }
}

#[async_trait]
impl IntentClassifier for HttpClassifier {
    async fn classify(
        &self,
        message: &IncomingMessage,
        context: &Value,
    ) -> Result<ClassificationResult> {
        let request = ClassifyRequest {
            input: ClassifyInput {
                text: &message.text,
            },
            context,
            user: &message.user,
        };

        info!(user = %message.user, "Sending message to classifier");

        let mut builder = self.client.post(&self.url).json(&request);
        if let Some(username) = &self.username {
            builder = builder.basic_auth(username, self.password.as_deref());
        }

        let response = builder.send().await.map_err(|e| {
            error!("Classifier request failed: {}", e);
            BotError::ClassifierError(format!("classifier unreachable: {}", e))
        })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            error!(%status, "Classifier error response: {}", body);
            return Err(BotError::ClassifierError(format!(
                "classifier returned {}",
                status
            )));
        }

        let classification: ClassificationResult = response.json().await.map_err(|e| {
            error!("Failed to parse classifier response: {}", e);
            BotError::ClassifierError(format!("invalid classifier payload: {}", e))
        })?;

        info!(
            intent = classification.top_intent(),
            intent_count = classification.intents.len(),
            entity_count = classification.entities.len(),
            "Classification received"
        );

        Ok(classification)
    }
}

/// Fixed-result classifier for development & testing.
/// Keeps the pipeline functional without the external service.
pub struct StaticClassifier {
    pub intents: Vec<Intent>,
    pub entities: Vec<Entity>,
    pub context: Value,
}

impl StaticClassifier {
    /// Classifier that always reports a single intent with full confidence.
    pub fn for_intent(intent: &str) -> Self {
        Self {
            intents: vec![Intent {
                intent: intent.to_string(),
                confidence: 1.0,
            }],
            entities: vec![],
            context: serde_json::json!({ "conversation_id": "static" }),
        }
    }

    /// Classifier that reports no intents at all (malformed upstream payload).
    pub fn empty() -> Self {
        Self {
            intents: vec![],
            entities: vec![],
            context: Value::Object(serde_json::Map::new()),
        }
    }
}

#[async_trait]
impl IntentClassifier for StaticClassifier {
    async fn classify(
        &self,
        _message: &IncomingMessage,
        _context: &Value,
    ) -> Result<ClassificationResult> {
        Ok(ClassificationResult {
            context: self.context.clone(),
            intents: self.intents.clone(),
            entities: self.entities.clone(),
        })
    }
}
