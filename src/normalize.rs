// Request Normalizer
//
// Pure mapping functions from the public request shapes to the internal
// entities the provider clients consume. Each route has exactly one truly
// required field; everything else gets a named default. Missing required
// input fails fast with a ValidationError naming the field, so nothing
// undefined ever reaches an upstream.

use serde::Serialize;

use crate::config::{constants, DefaultsConfig};
use crate::error::GatewayError;
use crate::server::api_types::{
    AskRequest, AvatarCloseRequest, AvatarSessionRequest, AvatarTextRequest, RenderRequest,
};

/// A student's question context. Built per request, immutable, discarded
/// once the answer is sent.
#[derive(Debug, Clone, Serialize)]
pub struct TutoringQuery {
    pub board: String,
    pub grade_level: String,
    pub subject: String,
    pub chapter: String,
    pub question_text: String,
    pub language: String,
}

impl TutoringQuery {
    /// Render the user prompt sent upstream. Field values appear verbatim,
    /// in board / grade / subject / chapter / question order.
    pub fn prompt(&self) -> String {
        format!(
            "Board: {}\nClass: {}\nSubject: {}\nChapter: {}\nQuestion: {}\n\nAnswer in language: {}.",
            self.board,
            self.grade_level,
            self.subject,
            self.chapter,
            self.question_text,
            self.language,
        )
    }
}

/// Parameters for creating an avatar session.
#[derive(Debug, Clone)]
pub struct SessionParams {
    pub avatar_id: String,
    pub voice_id: String,
    pub context_id: Option<String>,
    pub language: String,
}

/// Normalize an /ask body. `question` is required; board and language fall
/// back to the configured defaults, the remaining context fields to "".
pub fn normalize_ask(
    request: AskRequest,
    defaults: &DefaultsConfig,
) -> Result<TutoringQuery, GatewayError> {
    let question_text = required(request.question, "question")?;

    Ok(TutoringQuery {
        board: or_default(request.board, &defaults.board),
        grade_level: or_default(request.grade_level, ""),
        subject: or_default(request.subject, ""),
        chapter: or_default(request.chapter, ""),
        question_text,
        language: or_default(request.language, &defaults.language),
    })
}

/// Normalize an /avatar/session body. `avatarId` is required.
pub fn normalize_session(
    request: AvatarSessionRequest,
    defaults: &DefaultsConfig,
) -> Result<SessionParams, GatewayError> {
    let avatar_id = required(request.avatar_id, "avatarId")?;

    Ok(SessionParams {
        avatar_id,
        voice_id: or_default(request.voice_id, &defaults.voice_id),
        context_id: request.context_id.filter(|s| !s.trim().is_empty()),
        language: or_default(request.language, &defaults.language),
    })
}

/// Normalize an /avatar/text body. Both fields are required.
pub fn normalize_text(request: AvatarTextRequest) -> Result<(String, String), GatewayError> {
    let session_id = required(request.session_id, "sessionId")?;
    let text = required(request.text, "text")?;
    Ok((session_id, text))
}

/// Normalize an /avatar/close body.
pub fn normalize_close(request: AvatarCloseRequest) -> Result<String, GatewayError> {
    required(request.session_id, "sessionId")
}

/// Normalize a /render body. Nothing is required; an absent or empty topic
/// becomes the fallback topic.
pub fn normalize_render(request: RenderRequest) -> String {
    or_default(request.topic, constants::FALLBACK_RENDER_TOPIC)
}

fn required(value: Option<String>, field: &'static str) -> Result<String, GatewayError> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(GatewayError::Validation { field }),
    }
}

fn or_default(value: Option<String>, default: &str) -> String {
    match value {
        Some(v) if !v.trim().is_empty() => v,
        _ => default.to_string(),
    }
}
