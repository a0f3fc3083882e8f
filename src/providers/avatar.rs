// Live-avatar provider client — two-phase session protocol
//
// The provider's protocol is stateful: creating a session yields a token
// that every later call needs. The gateway holds that token in the Session
// Store and exposes only an opaque session id, so the frontend never
// handles raw provider credentials.

use anyhow::{Context, Result};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

use super::{check_status, transport_error};
use crate::config::AvatarConfig;
use crate::error::GatewayError;
use crate::normalize::SessionParams;
use crate::session::{AvatarSession, SessionStatus, SessionStore};

const PROVIDER_NAME: &str = "avatar";

/// Acknowledgement that the provider accepted an utterance.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SpeechAck {
    pub ack: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_ms: Option<u64>,
}

pub struct AvatarClient {
    client: Client,
    base_url: String,
    api_key: String,
    store: Arc<SessionStore>,
}

impl AvatarClient {
    pub fn new(config: &AvatarConfig, store: Arc<SessionStore>) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            store,
        })
    }

    /// Phase one: create a provider session and hold its token server-side.
    /// Returns the stored session; callers should only surface its `id`.
    pub async fn create_session(
        &self,
        params: SessionParams,
    ) -> Result<AvatarSession, GatewayError> {
        let url = format!("{}/v1/live-avatar/create", self.base_url);

        let request = CreateSessionRequest {
            avatar_id: &params.avatar_id,
            voice_id: &params.voice_id,
            context_id: params.context_id.as_deref(),
            language: &params.language,
        };

        let response = self
            .client
            .post(&url)
            .header("x-api-key", &self.api_key)
            .header("content-type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(|e| transport_error(PROVIDER_NAME, e))?;

        let response = check_status(PROVIDER_NAME, response, &self.api_key).await?;

        let created: CreateSessionResponse = response
            .json()
            .await
            .map_err(|e| transport_error(PROVIDER_NAME, e))?;

        let session = AvatarSession::new(
            created.session_id,
            created.session_token,
            params.avatar_id,
            params.voice_id,
            params.context_id,
            params.language,
        );
        tracing::info!(session_id = %session.id, avatar_id = %session.avatar_id, "avatar session created");

        self.store.put(session.clone());
        Ok(session)
    }

    /// Phase two: speak `text` in an existing session.
    ///
    /// Serialized per session id — the provider's conversational state is
    /// order-sensitive, so concurrent sends for one session queue on the
    /// session's mutex while unrelated sessions proceed.
    pub async fn send_text(&self, id: &str, text: &str) -> Result<SpeechAck, GatewayError> {
        // Cheap pre-checks before queueing on the lock
        let session = self.store.get(id)?;
        if session.status == SessionStatus::Closed {
            return Err(GatewayError::InvalidTransition {
                from: SessionStatus::Closed,
                to: SessionStatus::Active,
            });
        }

        let lock = self.store.send_lock(id)?;
        let _guard = lock.lock().await;

        // Re-read under the lock: a concurrent close may have landed while
        // this call was queued.
        let session = self.store.get(id)?;
        if session.status == SessionStatus::Closed {
            return Err(GatewayError::InvalidTransition {
                from: SessionStatus::Closed,
                to: SessionStatus::Active,
            });
        }

        let url = format!("{}/v1/live-avatar/task", self.base_url);
        let request = TaskRequest {
            session_id: &session.provider_session_id,
            session_token: &session.session_token,
            text,
        };

        let response = self
            .client
            .post(&url)
            .header("x-api-key", &self.api_key)
            .header("content-type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(|e| transport_error(PROVIDER_NAME, e))?;

        let response = check_status(PROVIDER_NAME, response, &self.api_key).await?;

        let task: TaskResponse = response.json().await.unwrap_or_default();

        self.store.update_status(id, SessionStatus::Active)?;
        tracing::debug!(session_id = id, chars = text.len(), "avatar utterance accepted");

        Ok(SpeechAck {
            ack: true,
            duration_ms: task.duration_ms,
        })
    }

    /// Tear down a session with the provider and mark it closed locally.
    /// Closing an already-closed session is a no-op.
    pub async fn close_session(&self, id: &str) -> Result<(), GatewayError> {
        let session = self.store.get(id)?;
        if session.status == SessionStatus::Closed {
            return Ok(());
        }

        // Don't tear the session down mid-utterance
        let lock = self.store.send_lock(id)?;
        let _guard = lock.lock().await;

        let url = format!("{}/v1/live-avatar/close", self.base_url);
        let request = CloseRequest {
            session_id: &session.provider_session_id,
            session_token: &session.session_token,
        };

        let response = self
            .client
            .post(&url)
            .header("x-api-key", &self.api_key)
            .header("content-type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(|e| transport_error(PROVIDER_NAME, e))?;

        check_status(PROVIDER_NAME, response, &self.api_key).await?;

        self.store.update_status(id, SessionStatus::Closed)?;
        tracing::info!(session_id = id, "avatar session closed");
        Ok(())
    }
}

// Provider wire types

#[derive(Debug, Serialize)]
struct CreateSessionRequest<'a> {
    avatar_id: &'a str,
    voice_id: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    context_id: Option<&'a str>,
    language: &'a str,
}

#[derive(Debug, Deserialize)]
struct CreateSessionResponse {
    session_id: String,
    session_token: String,
}

#[derive(Debug, Serialize)]
struct TaskRequest<'a> {
    session_id: &'a str,
    session_token: &'a str,
    text: &'a str,
}

#[derive(Debug, Default, Deserialize)]
struct TaskResponse {
    #[serde(default)]
    duration_ms: Option<u64>,
}

#[derive(Debug, Serialize)]
struct CloseRequest<'a> {
    session_id: &'a str,
    session_token: &'a str,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_store() -> Arc<SessionStore> {
        Arc::new(SessionStore::new(Duration::from_secs(1800)))
    }

    fn test_client(store: Arc<SessionStore>) -> AvatarClient {
        AvatarClient::new(
            &AvatarConfig {
                base_url: "https://api.heygen.com".to_string(),
                api_key: "hg-test".to_string(),
                timeout_secs: 15,
            },
            store,
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_send_text_unknown_session_is_not_found() {
        // No upstream is reachable in this test — proving the lookup fails
        // before any provider call is attempted.
        let client = test_client(test_store());
        let err = client.send_text("nonexistent", "hi").await.unwrap_err();
        assert!(matches!(err, GatewayError::SessionNotFound { .. }));
    }

    #[tokio::test]
    async fn test_send_text_closed_session_is_conflict() {
        let store = test_store();
        let session = AvatarSession::new(
            "prov-1".to_string(),
            "tok".to_string(),
            "a1".to_string(),
            "en_us_001".to_string(),
            None,
            "en".to_string(),
        );
        let id = session.id.clone();
        store.put(session);
        store.update_status(&id, SessionStatus::Closed).unwrap();

        let client = test_client(store);
        let err = client.send_text(&id, "hi").await.unwrap_err();
        assert!(matches!(err, GatewayError::InvalidTransition { .. }));
    }

    #[tokio::test]
    async fn test_close_already_closed_is_noop() {
        let store = test_store();
        let session = AvatarSession::new(
            "prov-1".to_string(),
            "tok".to_string(),
            "a1".to_string(),
            "en_us_001".to_string(),
            None,
            "en".to_string(),
        );
        let id = session.id.clone();
        store.put(session);
        store.update_status(&id, SessionStatus::Closed).unwrap();

        let client = test_client(store);
        assert!(client.close_session(&id).await.is_ok());
    }

    #[test]
    fn test_speech_ack_serializes_camel_case() {
        let ack = SpeechAck {
            ack: true,
            duration_ms: Some(1200),
        };
        let json = serde_json::to_value(&ack).unwrap();
        assert_eq!(json["ack"], true);
        assert_eq!(json["durationMs"], 1200);
    }

    #[test]
    fn test_speech_ack_omits_missing_duration() {
        let ack = SpeechAck {
            ack: true,
            duration_ms: None,
        };
        let json = serde_json::to_string(&ack).unwrap();
        assert!(!json.contains("durationMs"));
    }
}
