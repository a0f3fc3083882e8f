// Gateway error taxonomy
//
// Every failure a handler can surface is one of these variants; the
// `IntoResponse` impl is the single place provider failures, validation
// failures, and store refusals are mapped to HTTP statuses and the
// `{ok:false, errorKind, message}` envelope. Provider clients never let a
// raw reqwest error escape — they convert it here first.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use serde_json::json;
use thiserror::Error;

use crate::session::SessionStatus;

/// How an upstream call failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum UpstreamKind {
    /// Provider answered with a non-2xx status
    Rejected,
    /// Call exceeded its deadline
    Timeout,
    /// Connection-level failure (DNS, refused, reset)
    Network,
}

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("missing or empty required field: {field}")]
    Validation { field: &'static str },

    #[error("unknown session: {id}")]
    SessionNotFound { id: String },

    #[error("session status cannot move from {from} to {to}")]
    InvalidTransition {
        from: SessionStatus,
        to: SessionStatus,
    },

    #[error("{provider} upstream call failed ({kind:?})")]
    Upstream {
        provider: &'static str,
        kind: UpstreamKind,
        /// HTTP status the provider answered with, if it answered at all
        status: Option<u16>,
        /// Upstream body, already redacted of secrets
        body: String,
    },

    #[error("internal error")]
    Internal(#[from] anyhow::Error),
}

impl GatewayError {
    /// Stable error-kind discriminant surfaced to clients.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Validation { .. } => "ValidationError",
            Self::SessionNotFound { .. } => "SessionNotFound",
            Self::InvalidTransition { .. } => "InvalidTransition",
            Self::Upstream { .. } => "UpstreamError",
            Self::Internal(_) => "InternalError",
        }
    }

    fn status_code(&self) -> StatusCode {
        match self {
            Self::Validation { .. } => StatusCode::BAD_REQUEST,
            Self::SessionNotFound { .. } => StatusCode::NOT_FOUND,
            Self::InvalidTransition { .. } => StatusCode::CONFLICT,
            Self::Upstream { .. } => StatusCode::BAD_GATEWAY,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        let body = match &self {
            GatewayError::Upstream {
                provider,
                kind,
                status: upstream_status,
                body,
            } => {
                tracing::warn!(
                    provider = *provider,
                    kind = ?kind,
                    upstream_status = ?upstream_status,
                    body = body.as_str(),
                    "upstream call failed"
                );
                json!({
                    "ok": false,
                    "errorKind": self.kind(),
                    "message": self.to_string(),
                    "provider": provider,
                    "upstreamStatus": upstream_status,
                })
            }
            GatewayError::Internal(err) => {
                // Full detail to the log, generic message to the caller
                tracing::error!(error = ?err, "unhandled internal fault");
                json!({
                    "ok": false,
                    "errorKind": self.kind(),
                    "message": "internal error",
                })
            }
            _ => {
                tracing::debug!(error = %self, "request rejected");
                json!({
                    "ok": false,
                    "errorKind": self.kind(),
                    "message": self.to_string(),
                })
            }
        };

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_strings_are_stable() {
        assert_eq!(GatewayError::Validation { field: "question" }.kind(), "ValidationError");
        assert_eq!(
            GatewayError::SessionNotFound { id: "x".into() }.kind(),
            "SessionNotFound"
        );
        assert_eq!(
            GatewayError::InvalidTransition {
                from: SessionStatus::Closed,
                to: SessionStatus::Active,
            }
            .kind(),
            "InvalidTransition"
        );
        assert_eq!(
            GatewayError::Upstream {
                provider: "llm",
                kind: UpstreamKind::Timeout,
                status: None,
                body: String::new(),
            }
            .kind(),
            "UpstreamError"
        );
        assert_eq!(
            GatewayError::Internal(anyhow::anyhow!("boom")).kind(),
            "InternalError"
        );
    }

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            GatewayError::Validation { field: "text" }.status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            GatewayError::SessionNotFound { id: "x".into() }.status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            GatewayError::InvalidTransition {
                from: SessionStatus::Closed,
                to: SessionStatus::Started,
            }
            .status_code(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            GatewayError::Upstream {
                provider: "avatar",
                kind: UpstreamKind::Rejected,
                status: Some(403),
                body: String::new(),
            }
            .status_code(),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            GatewayError::Internal(anyhow::anyhow!("boom")).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_validation_message_names_the_field() {
        let err = GatewayError::Validation { field: "question" };
        assert!(err.to_string().contains("question"));
    }

    #[test]
    fn test_internal_message_is_generic() {
        // The anyhow detail must never reach the caller
        let err = GatewayError::Internal(anyhow::anyhow!("db password is hunter2"));
        let display = err.to_string();
        assert_eq!(display, "internal error");
    }
}
