// Upstream provider clients
//
// One client per upstream service. Each owns its base URL, auth header
// shape, and wire mapping; nothing outside this module speaks a provider's
// dialect. All failures come back as typed `GatewayError`s — no raw
// reqwest error crosses the module boundary.

mod avatar;
mod llm;
mod renderer;

pub use avatar::{AvatarClient, SpeechAck};
pub use llm::LlmClient;
pub use renderer::{RenderJob, RenderStatus, RendererClient};

use crate::error::{GatewayError, UpstreamKind};

/// Upstream bodies are capped before they travel in error payloads.
const MAX_ERROR_BODY_BYTES: usize = 2048;

/// Outcome of one upstream call that did not succeed with 2xx.
///
/// Captured per call, never persisted; turned into the gateway error
/// taxonomy via [`ProviderCallResult::rejected`].
#[derive(Debug)]
pub struct ProviderCallResult {
    pub provider: &'static str,
    pub status: u16,
    pub body: String,
}

impl ProviderCallResult {
    pub fn rejected(self) -> GatewayError {
        GatewayError::Upstream {
            provider: self.provider,
            kind: UpstreamKind::Rejected,
            status: Some(self.status),
            body: self.body,
        }
    }
}

/// Map a transport-level reqwest failure (no HTTP response) into the
/// taxonomy: deadline exceeded → timeout, everything else → network.
pub(crate) fn transport_error(provider: &'static str, err: reqwest::Error) -> GatewayError {
    let kind = if err.is_timeout() {
        UpstreamKind::Timeout
    } else {
        UpstreamKind::Network
    };
    GatewayError::Upstream {
        provider,
        kind,
        status: None,
        // reqwest transport errors carry URLs, not credentials
        body: err.to_string(),
    }
}

/// Check an upstream response status; on non-2xx, read and redact the body
/// and produce the rejection error.
pub(crate) async fn check_status(
    provider: &'static str,
    response: reqwest::Response,
    secret: &str,
) -> Result<reqwest::Response, GatewayError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(ProviderCallResult {
        provider,
        status: status.as_u16(),
        body: redact(&body, secret),
    }
    .rejected())
}

/// Strip a secret from an upstream body and cap its length. Providers
/// occasionally echo auth material back in error payloads; it must never
/// reach the gateway's callers or logs.
pub(crate) fn redact(body: &str, secret: &str) -> String {
    let cleaned = if secret.is_empty() {
        body.to_string()
    } else {
        body.replace(secret, "[redacted]")
    };
    if cleaned.len() > MAX_ERROR_BODY_BYTES {
        let mut end = MAX_ERROR_BODY_BYTES;
        while !cleaned.is_char_boundary(end) {
            end -= 1;
        }
        cleaned[..end].to_string()
    } else {
        cleaned
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_redact_removes_secret() {
        let body = r#"{"error":"invalid key sk-abc123 provided"}"#;
        let redacted = redact(body, "sk-abc123");
        assert!(!redacted.contains("sk-abc123"));
        assert!(redacted.contains("[redacted]"));
    }

    #[test]
    fn test_redact_empty_secret_is_noop() {
        assert_eq!(redact("hello", ""), "hello");
    }

    #[test]
    fn test_redact_caps_length() {
        let body = "x".repeat(10_000);
        assert_eq!(redact(&body, "nope").len(), MAX_ERROR_BODY_BYTES);
    }

    #[test]
    fn test_redact_respects_char_boundaries() {
        // Multibyte chars straddling the cap must not panic
        let body = "é".repeat(MAX_ERROR_BODY_BYTES);
        let out = redact(&body, "nope");
        assert!(out.len() <= MAX_ERROR_BODY_BYTES);
    }

    #[test]
    fn test_call_result_maps_to_rejected() {
        let err = ProviderCallResult {
            provider: "avatar",
            status: 403,
            body: "forbidden".to_string(),
        }
        .rejected();
        match err {
            GatewayError::Upstream {
                provider,
                kind,
                status,
                ..
            } => {
                assert_eq!(provider, "avatar");
                assert_eq!(kind, UpstreamKind::Rejected);
                assert_eq!(status, Some(403));
            }
            other => panic!("expected Upstream, got {other:?}"),
        }
    }
}
