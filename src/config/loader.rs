// Configuration loader
// Loads settings from ~/.tutorgate/config.toml or environment variables

use anyhow::{bail, Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

use super::settings::{AvatarConfig, Config, LlmConfig};

const OPENAI_DEFAULT_URL: &str = "https://api.openai.com";
const HEYGEN_DEFAULT_URL: &str = "https://api.heygen.com";

/// Load configuration from the gateway config file or environment
pub fn load_config() -> Result<Config> {
    if let Some(path) = default_config_path() {
        if path.exists() {
            let config = load_from_file(&path)?;
            config.validate()?;
            return Ok(config);
        }
    }

    // Fall back to environment variables
    if let Some(config) = try_load_from_env() {
        config.validate()?;
        return Ok(config);
    }

    bail!(
        "No configuration found.\n\n\
         Create ~/.tutorgate/config.toml:\n\n\
         [llm]\n\
         base_url = \"https://api.openai.com\"\n\
         api_key = \"sk-...\"\n\n\
         [avatar]\n\
         base_url = \"https://api.heygen.com\"\n\
         api_key = \"...\"\n\n\
         Or set environment variables:\n  \
         export TUTORGATE_LLM_API_KEY=\"sk-...\"\n  \
         export TUTORGATE_AVATAR_API_KEY=\"...\""
    );
}

/// Path of the user config file (`~/.tutorgate/config.toml`).
pub fn default_config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".tutorgate/config.toml"))
}

/// Parse a config file from disk.
pub fn load_from_file(path: &Path) -> Result<Config> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file {}", path.display()))?;
    parse_config(&contents)
        .with_context(|| format!("Failed to parse config file {}", path.display()))
}

/// Parse TOML config contents.
pub fn parse_config(contents: &str) -> Result<Config> {
    let config: Config = toml::from_str(contents)?;
    Ok(config)
}

/// Build a config purely from `TUTORGATE_*` environment variables.
///
/// Returns `None` when the required API keys are absent — the caller then
/// shows setup guidance instead of failing on a half-set environment.
fn try_load_from_env() -> Option<Config> {
    let llm_key = non_empty_env("TUTORGATE_LLM_API_KEY")?;
    let avatar_key = non_empty_env("TUTORGATE_AVATAR_API_KEY")?;

    let mut config = Config {
        server: Default::default(),
        llm: LlmConfig {
            base_url: non_empty_env("TUTORGATE_LLM_BASE_URL")
                .unwrap_or_else(|| OPENAI_DEFAULT_URL.to_string()),
            api_key: llm_key,
            model: non_empty_env("TUTORGATE_LLM_MODEL")
                .unwrap_or_else(|| "gpt-4o-mini".to_string()),
            timeout_secs: super::constants::DEFAULT_LLM_TIMEOUT_SECS,
        },
        avatar: AvatarConfig {
            base_url: non_empty_env("TUTORGATE_AVATAR_BASE_URL")
                .unwrap_or_else(|| HEYGEN_DEFAULT_URL.to_string()),
            api_key: avatar_key,
            timeout_secs: super::constants::DEFAULT_PROVIDER_TIMEOUT_SECS,
        },
        renderer: Default::default(),
        defaults: Default::default(),
    };

    if let Some(addr) = non_empty_env("TUTORGATE_BIND_ADDR") {
        config.server.bind_address = addr;
    }
    config.renderer.base_url = non_empty_env("TUTORGATE_RENDERER_URL");
    config.renderer.api_key = non_empty_env("TUTORGATE_RENDERER_API_KEY");

    Some(config)
}

fn non_empty_env(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}
