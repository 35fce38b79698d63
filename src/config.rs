//! Process configuration for the proxy and the client.
//!
//! Both are resolved once from the environment (a `.env` file is honored)
//! and then passed by value into the components that need them.

use crate::prompts;
use crate::{Error, Result};
use std::time::Duration;

pub const DEFAULT_UPSTREAM_BASE_URL: &str = "https://api.x.ai";
pub const DEFAULT_MODEL: &str = "grok-4-1-fast-reasoning-latest";
pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";
pub const DEFAULT_PROXY_BASE_URL: &str = "https://ascend-app-phi.vercel.app";
pub const ANALYZE_PATH: &str = "/api/analyze-face";

pub const TEMPERATURE: f32 = 0.3;
pub const MAX_TOKENS: u32 = 2000;
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(120);
pub const MAX_BODY_BYTES: usize = 50 * 1024 * 1024;

#[derive(Debug, Clone)]
pub struct ProxyConfig {
    /// Upstream credential. Checked per request so a missing key is
    /// reported to callers instead of aborting startup.
    pub api_key: Option<String>,
    pub base_url: String,
    pub model: String,
    pub prompt_template: String,
    pub temperature: f32,
    pub max_tokens: u32,
    pub bind_addr: String,
}

impl Default for ProxyConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: DEFAULT_UPSTREAM_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            prompt_template: prompts::ANALYSIS_USER.to_string(),
            temperature: TEMPERATURE,
            max_tokens: MAX_TOKENS,
            bind_addr: DEFAULT_BIND_ADDR.to_string(),
        }
    }
}

impl ProxyConfig {
    pub fn from_env() -> Result<Self> {
        load_dotenv()?;

        let prompt_template = match std::env::var("ANALYSIS_PROMPT_PATH") {
            Ok(path) => std::fs::read_to_string(&path).map_err(|e| {
                Error::Configuration(format!("Cannot read prompt template {}: {}", path, e))
            })?,
            Err(_) => prompts::ANALYSIS_USER.to_string(),
        };

        Ok(Self {
            api_key: std::env::var("XAI_API_KEY")
                .ok()
                .filter(|key| !key.trim().is_empty()),
            base_url: std::env::var("XAI_BASE_URL")
                .unwrap_or_else(|_| DEFAULT_UPSTREAM_BASE_URL.to_string()),
            model: std::env::var("ANALYSIS_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_string()),
            prompt_template,
            temperature: TEMPERATURE,
            max_tokens: MAX_TOKENS,
            bind_addr: std::env::var("BIND_ADDR").unwrap_or_else(|_| DEFAULT_BIND_ADDR.to_string()),
        })
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }
}

#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub base_url: String,
    pub timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_PROXY_BASE_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl ClientConfig {
    pub fn from_env() -> Result<Self> {
        load_dotenv()?;

        let timeout = match std::env::var("ANALYZE_TIMEOUT_SECS") {
            Ok(raw) => parse_timeout_secs(&raw)?,
            Err(_) => DEFAULT_TIMEOUT,
        };

        Ok(Self {
            base_url: std::env::var("ANALYZE_BASE_URL")
                .unwrap_or_else(|_| DEFAULT_PROXY_BASE_URL.to_string()),
            timeout,
        })
    }

    pub fn analyze_url(&self) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), ANALYZE_PATH)
    }
}

/// Load `.env` when present; a missing file is fine, a malformed one is not.
fn load_dotenv() -> Result<()> {
    match dotenvy::dotenv() {
        Ok(_) => Ok(()),
        Err(e) if e.not_found() => Ok(()),
        Err(e) => Err(e.into()),
    }
}

fn parse_timeout_secs(raw: &str) -> Result<Duration> {
    match raw.trim().parse::<u64>() {
        Ok(secs) if secs > 0 => Ok(Duration::from_secs(secs)),
        _ => Err(Error::Configuration(format!(
            "ANALYZE_TIMEOUT_SECS must be a positive integer, got '{}'",
            raw
        ))),
    }
}
