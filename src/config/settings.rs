// Configuration structs

use serde::{Deserialize, Serialize};

use super::constants;

/// Top-level gateway configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// HTTP server settings
    #[serde(default)]
    pub server: ServerConfig,

    /// LLM chat-completion provider
    pub llm: LlmConfig,

    /// Live-avatar provider
    pub avatar: AvatarConfig,

    /// Animation renderer (optional — simulated when absent)
    #[serde(default)]
    pub renderer: RendererConfig,

    /// Named defaults substituted into underspecified requests
    #[serde(default)]
    pub defaults: DefaultsConfig,
}

/// HTTP server settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Bind address (e.g., "127.0.0.1:8080")
    #[serde(default = "default_bind_address")]
    pub bind_address: String,
    /// Avatar-session idle TTL in minutes
    #[serde(default = "default_session_ttl")]
    pub session_ttl_minutes: u64,
}

/// Settings for the LLM chat-completion provider.
///
/// The wire shape is OpenAI-compatible; auth is `Authorization: Bearer`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// Base URL, e.g. "https://api.openai.com"
    pub base_url: String,
    /// API key sent as a bearer token
    pub api_key: String,
    /// Model identifier
    #[serde(default = "default_model")]
    pub model: String,
    /// Per-call timeout in seconds
    #[serde(default = "default_llm_timeout")]
    pub timeout_secs: u64,
}

/// Settings for the live-avatar provider (two-phase session protocol,
/// `x-api-key` auth).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AvatarConfig {
    /// Base URL, e.g. "https://api.heygen.com"
    pub base_url: String,
    /// API key sent as `x-api-key`
    pub api_key: String,
    /// Per-call timeout in seconds
    #[serde(default = "default_provider_timeout")]
    pub timeout_secs: u64,
}

/// Settings for the animation renderer.
///
/// `base_url: None` puts the renderer client in simulated mode: render
/// requests succeed immediately with a queued job instead of failing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RendererConfig {
    #[serde(default)]
    pub base_url: Option<String>,
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default = "default_provider_timeout")]
    pub timeout_secs: u64,
}

/// Defaults substituted by the request normalizer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DefaultsConfig {
    /// Curriculum board when a query omits one
    #[serde(default = "default_board")]
    pub board: String,
    /// ISO language code
    #[serde(default = "default_language")]
    pub language: String,
    /// Avatar voice
    #[serde(default = "default_voice")]
    pub voice_id: String,
}

fn default_bind_address() -> String {
    constants::DEFAULT_HTTP_ADDR.to_string()
}

fn default_session_ttl() -> u64 {
    constants::DEFAULT_SESSION_TTL_MINUTES
}

fn default_model() -> String {
    "gpt-4o-mini".to_string()
}

fn default_llm_timeout() -> u64 {
    constants::DEFAULT_LLM_TIMEOUT_SECS
}

fn default_provider_timeout() -> u64 {
    constants::DEFAULT_PROVIDER_TIMEOUT_SECS
}

fn default_board() -> String {
    constants::DEFAULT_BOARD.to_string()
}

fn default_language() -> String {
    constants::DEFAULT_LANGUAGE.to_string()
}

fn default_voice() -> String {
    constants::DEFAULT_VOICE_ID.to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
            session_ttl_minutes: default_session_ttl(),
        }
    }
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            api_key: None,
            timeout_secs: default_provider_timeout(),
        }
    }
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            board: default_board(),
            language: default_language(),
            voice_id: default_voice(),
        }
    }
}

impl Config {
    /// Validate configuration and return helpful errors
    pub fn validate(&self) -> anyhow::Result<()> {
        if !self.server.bind_address.contains(':') {
            anyhow::bail!(
                "Invalid bind address: '{}'\n\
                 Bind address should be in format 'IP:PORT'\n\
                 Examples:\n  \
                 • 127.0.0.1:8080\n  \
                 • 0.0.0.0:8080",
                self.server.bind_address
            );
        }

        if self.server.session_ttl_minutes == 0 {
            anyhow::bail!("session_ttl_minutes must be greater than 0");
        }

        if self.llm.api_key.trim().is_empty() {
            anyhow::bail!(
                "LLM API key is empty\n\n\
                 Set it in ~/.tutorgate/config.toml under [llm], or export\n\
                 TUTORGATE_LLM_API_KEY"
            );
        }

        if self.avatar.api_key.trim().is_empty() {
            anyhow::bail!(
                "Avatar API key is empty\n\n\
                 Set it in ~/.tutorgate/config.toml under [avatar], or export\n\
                 TUTORGATE_AVATAR_API_KEY"
            );
        }

        for (label, url) in [
            ("llm.base_url", Some(&self.llm.base_url)),
            ("avatar.base_url", Some(&self.avatar.base_url)),
            ("renderer.base_url", self.renderer.base_url.as_ref()),
        ] {
            if let Some(url) = url {
                if !url.starts_with("http://") && !url.starts_with("https://") {
                    anyhow::bail!("{label} must start with http:// or https:// (got '{url}')");
                }
            }
        }

        if self.llm.timeout_secs == 0 || self.avatar.timeout_secs == 0 {
            anyhow::bail!("provider timeout_secs must be greater than 0");
        }

        if self.llm.timeout_secs > 300 {
            anyhow::bail!(
                "llm.timeout_secs ({}) is very high\n\
                 Recommended range: 5-60 seconds",
                self.llm.timeout_secs
            );
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_config() -> Config {
        Config {
            server: ServerConfig::default(),
            llm: LlmConfig {
                base_url: "https://api.openai.com".to_string(),
                api_key: "sk-test".to_string(),
                model: default_model(),
                timeout_secs: 15,
            },
            avatar: AvatarConfig {
                base_url: "https://api.heygen.com".to_string(),
                api_key: "hg-test".to_string(),
                timeout_secs: 15,
            },
            renderer: RendererConfig::default(),
            defaults: DefaultsConfig::default(),
        }
    }

    #[test]
    fn test_valid_config_passes() {
        assert!(base_config().validate().is_ok());
    }

    #[test]
    fn test_bind_address_requires_port() {
        let mut config = base_config();
        config.server.bind_address = "localhost".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_empty_llm_key_rejected() {
        let mut config = base_config();
        config.llm.api_key = "  ".to_string();
        let err = config.validate().unwrap_err().to_string();
        assert!(err.contains("LLM API key"), "got: {err}");
    }

    #[test]
    fn test_base_url_must_be_http() {
        let mut config = base_config();
        config.avatar.base_url = "api.heygen.com".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_zero_ttl_rejected() {
        let mut config = base_config();
        config.server.session_ttl_minutes = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_renderer_unconfigured_by_default() {
        let config = base_config();
        assert!(config.renderer.base_url.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_defaults_config_values() {
        let d = DefaultsConfig::default();
        assert_eq!(d.language, "en");
        assert_eq!(d.voice_id, "en_us_001");
        assert!(!d.board.is_empty());
    }
}
