// Route handlers
//
// Each handler is deliberately thin: normalize the request, invoke exactly
// one provider-client operation, wrap the result in the success envelope.
// Invariant-bearing logic lives in the provider clients and the Session
// Store; the error mapper (GatewayError::into_response) handles the rest.

use axum::extract::State;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};
use std::sync::Arc;

use super::AppState;
use super::api_types::{
    AskRequest, AvatarCloseRequest, AvatarSessionRequest, AvatarTextRequest, RenderRequest,
};
use crate::error::GatewayError;
use crate::normalize;

/// Build the public route table.
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/ask", post(handle_ask))
        .route("/avatar/session", post(handle_avatar_session))
        .route("/avatar/text", post(handle_avatar_text))
        .route("/avatar/close", post(handle_avatar_close))
        .route("/render", post(handle_render))
        .with_state(state)
}

fn envelope(data: Value) -> Json<Value> {
    Json(json!({ "ok": true, "data": data }))
}

/// GET /health — liveness probe, no envelope.
pub async fn health_check() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

/// POST /ask — tutoring question → LLM answer.
async fn handle_ask(
    State(state): State<Arc<AppState>>,
    Json(request): Json<AskRequest>,
) -> Result<Json<Value>, GatewayError> {
    let query = normalize::normalize_ask(request, &state.defaults)?;
    let answer = state.llm.ask(&query).await?;
    Ok(envelope(json!({ "answer": answer })))
}

/// POST /avatar/session — create a provider session, return its opaque id.
async fn handle_avatar_session(
    State(state): State<Arc<AppState>>,
    Json(request): Json<AvatarSessionRequest>,
) -> Result<Json<Value>, GatewayError> {
    let params = normalize::normalize_session(request, &state.defaults)?;
    let session = state.avatar.create_session(params).await?;
    Ok(envelope(json!({ "sessionId": session.id })))
}

/// POST /avatar/text — speak text in an existing session.
async fn handle_avatar_text(
    State(state): State<Arc<AppState>>,
    Json(request): Json<AvatarTextRequest>,
) -> Result<Json<Value>, GatewayError> {
    let (session_id, text) = normalize::normalize_text(request)?;
    let ack = state.avatar.send_text(&session_id, &text).await?;
    Ok(envelope(serde_json::to_value(ack).map_err(anyhow::Error::from)?))
}

/// POST /avatar/close — tear down a session.
async fn handle_avatar_close(
    State(state): State<Arc<AppState>>,
    Json(request): Json<AvatarCloseRequest>,
) -> Result<Json<Value>, GatewayError> {
    let session_id = normalize::normalize_close(request)?;
    state.avatar.close_session(&session_id).await?;
    Ok(envelope(json!({ "closed": true })))
}

/// POST /render — request an animation render (simulated when the renderer
/// is not configured).
async fn handle_render(
    State(state): State<Arc<AppState>>,
    Json(request): Json<RenderRequest>,
) -> Result<Json<Value>, GatewayError> {
    let topic = normalize::normalize_render(request);
    let job = state.renderer.request_render(&topic).await?;
    Ok(envelope(serde_json::to_value(job).map_err(anyhow::Error::from)?))
}
