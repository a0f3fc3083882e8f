// Public HTTP request shapes
//
// Every field is optional at the serde layer; the normalizer decides what
// is actually required per route and substitutes named defaults for the
// rest. This keeps malformed input failing as a 400 ValidationError with a
// field name instead of an undefined interpolation sent upstream.

use serde::Deserialize;

/// POST /ask
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AskRequest {
    pub board: Option<String>,
    pub grade_level: Option<String>,
    pub subject: Option<String>,
    pub chapter: Option<String>,
    pub question: Option<String>,
    pub language: Option<String>,
}

/// POST /avatar/session
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AvatarSessionRequest {
    pub avatar_id: Option<String>,
    pub voice_id: Option<String>,
    pub context_id: Option<String>,
    pub language: Option<String>,
}

/// POST /avatar/text
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AvatarTextRequest {
    pub session_id: Option<String>,
    pub text: Option<String>,
}

/// POST /avatar/close
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AvatarCloseRequest {
    pub session_id: Option<String>,
}

/// POST /render
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderRequest {
    pub topic: Option<String>,
}
