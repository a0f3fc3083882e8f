// Project-wide constants
//
// Centralised here so port numbers and other magic values have one
// source of truth. Import via `use crate::config::constants::*;`.

/// Default bind address for the gateway (localhost only).
pub const DEFAULT_HTTP_ADDR: &str = "127.0.0.1:8080";

/// Default timeout for LLM chat-completion calls, in seconds.
pub const DEFAULT_LLM_TIMEOUT_SECS: u64 = 15;

/// Default timeout for avatar and renderer calls, in seconds.
pub const DEFAULT_PROVIDER_TIMEOUT_SECS: u64 = 15;

/// Default avatar-session idle TTL, in minutes.
pub const DEFAULT_SESSION_TTL_MINUTES: u64 = 30;

/// Default curriculum board substituted when a query omits one.
pub const DEFAULT_BOARD: &str = "CBSE";

/// Default ISO language code for queries and avatar sessions.
pub const DEFAULT_LANGUAGE: &str = "en";

/// Default avatar voice when the caller does not pick one.
pub const DEFAULT_VOICE_ID: &str = "en_us_001";

/// Topic substituted when a render request arrives with an empty topic.
pub const FALLBACK_RENDER_TOPIC: &str = "general topic";

/// Maximum accepted request body size (bytes).
///
/// 1MB is generous for natural-language tutoring queries while blocking
/// obvious oversized payloads.
pub const MAX_BODY_BYTES: usize = 1024 * 1024;
