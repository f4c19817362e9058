//! Session persistence layer
//!
//! Sessions are keyed by user identifier and carry the classifier-owned
//! conversation context between turns. Only the pipeline touches this
//! store; every other component works on turn-scoped copies.

use crate::error::BotError;
use crate::models::Session;
use crate::Result;
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::{debug, error};

/// Trait for session persistence
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Load the session for a user, or `None` when no record exists yet.
    async fn load(&self, user: &str) -> Result<Option<Session>>;
    /// Persist the session under its user key (last write wins).
    async fn save(&self, session: &Session) -> Result<()>;
}

/// In-memory session store for development & testing
pub struct InMemorySessionStore {
    sessions: Arc<RwLock<HashMap<String, Session>>>,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self {
            sessions: Arc::new(RwLock::new(HashMap::new())),
        }
    }
}

impl Default for InMemorySessionStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn load(&self, user: &str) -> Result<Option<Session>> {
        let sessions = self.sessions.read().await;
        Ok(sessions.get(user).cloned())
    }

    async fn save(&self, session: &Session) -> Result<()> {
        let mut sessions = self.sessions.write().await;
        sessions.insert(session.id.clone(), session.clone());
        Ok(())
    }
}

/// Document-database session store (Cloudant-style HTTP API)
///
/// One document per user; document updates require the current `_rev`,
/// which is re-read before every save.
pub struct CloudantSessionStore {
    client: Client,
    base_url: String,
    database: String,
}

impl CloudantSessionStore {
    pub fn new(base_url: String, database: String) -> Result<Self> {
        let client = Client::builder()
            .pool_idle_timeout(Duration::from_secs(90))
            .build()?;

        Ok(Self {
            client,
            base_url,
            database,
        })
    }

    fn document_url(&self, id: &str) -> String {
        // User ids are phone numbers or opaque handles; escape the few
        // characters that would break the path.
        let encoded: String = id
            .chars()
            .map(|c| match c {
                '+' => "%2B".to_string(),
                '/' => "%2F".to_string(),
                ' ' => "%20".to_string(),
                other => other.to_string(),
            })
            .collect();
        format!("{}/{}/{}", self.base_url, self.database, encoded)
    }

    async fn current_revision(&self, id: &str) -> Result<Option<String>> {
        let response = self
            .client
            .get(self.document_url(id))
            .send()
            .await
            .map_err(|e| BotError::SessionStoreError(format!("session store unreachable: {}", e)))?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }

        let doc: serde_json::Value = response
            .json()
            .await
            .map_err(|e| BotError::SessionStoreError(format!("invalid session document: {}", e)))?;

        Ok(doc.get("_rev").and_then(|rev| rev.as_str()).map(String::from))
    }
}

#[async_trait]
impl SessionStore for CloudantSessionStore {
    async fn load(&self, user: &str) -> Result<Option<Session>> {
        let response = self
            .client
            .get(self.document_url(user))
            .send()
            .await
            .map_err(|e| {
                error!("Session load failed: {}", e);
                BotError::SessionStoreError(format!("session store unreachable: {}", e))
            })?;

        if response.status() == StatusCode::NOT_FOUND {
            debug!(%user, "No session document yet");
            return Ok(None);
        }

        if !response.status().is_success() {
            let status = response.status();
            return Err(BotError::SessionStoreError(format!(
                "session store returned {}",
                status
            )));
        }

        let session: Session = response.json().await.map_err(|e| {
            error!("Failed to parse session document: {}", e);
            BotError::SessionStoreError(format!("invalid session document: {}", e))
        })?;

        Ok(Some(session))
    }

    async fn save(&self, session: &Session) -> Result<()> {
        let mut doc = serde_json::to_value(session)?;
        if let Some(rev) = self.current_revision(&session.id).await? {
            doc["_rev"] = serde_json::Value::String(rev);
        }

        let response = self
            .client
            .put(self.document_url(&session.id))
            .json(&doc)
            .send()
            .await
            .map_err(|e| {
                error!("Session save failed: {}", e);
                BotError::SessionStoreError(format!("session store unreachable: {}", e))
            })?;

        if !response.status().is_success() {
            let status = response.status();
            return Err(BotError::SessionStoreError(format!(
                "session store returned {} on save",
                status
            )));
        }

        debug!(user = %session.id, "Session persisted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_absent_session_is_none() {
        let store = InMemorySessionStore::new();
        assert!(store.load("nobody").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_save_then_load_roundtrip() {
        let store = InMemorySessionStore::new();

        let mut session = Session::new("+17327599154");
        session.context = serde_json::json!({ "conversation_id": "c1", "turn": 3 });
        store.save(&session).await.unwrap();

        let loaded = store.load("+17327599154").await.unwrap().unwrap();
        assert_eq!(loaded.context["conversation_id"], "c1");
        assert_eq!(loaded.context["turn"], 3);
    }

    #[tokio::test]
    async fn test_save_replaces_context() {
        let store = InMemorySessionStore::new();

        let mut session = Session::new("u1");
        session.context = serde_json::json!({ "turn": 1 });
        store.save(&session).await.unwrap();

        session.context = serde_json::json!({ "turn": 2 });
        store.save(&session).await.unwrap();

        let loaded = store.load("u1").await.unwrap().unwrap();
        assert_eq!(loaded.context["turn"], 2);
    }

    #[test]
    fn test_document_url_escapes_phone_numbers() {
        let store =
            CloudantSessionStore::new("https://db.example.com".to_string(), "botusers".to_string())
                .unwrap();
        assert_eq!(
            store.document_url("+1 (732) 759-9154"),
            "https://db.example.com/botusers/%2B1%20(732)%20759-9154"
        );
    }
}
