use std::path::PathBuf;
use std::time::Duration;

use compliance_context::Profile;

use crate::llm_client::DEFAULT_BASE_URL;

pub const DEFAULT_DATA_PATH: &str = "data/data_new.json";
pub const DEFAULT_MODEL: &str = "gpt-4";
pub const DEFAULT_PORT: u16 = 5000;
/// Leaves room for the reply in an 8k context window.
pub const DEFAULT_MAX_PROMPT_TOKENS: usize = 6000;

#[derive(Debug, Clone, PartialEq)]
pub struct RunnerConfig {
    /// `None` means no usable key: answers are composed offline.
    pub openai_api_key: Option<String>,
    pub openai_model: String,
    pub openai_base_url: String,
    pub request_timeout: Duration,
    pub max_tokens: u32,
    pub max_prompt_tokens: usize,
    pub data_path: PathBuf,
    pub profile: Profile,
    pub host: String,
    pub port: u16,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            openai_api_key: None,
            openai_model: DEFAULT_MODEL.to_string(),
            openai_base_url: DEFAULT_BASE_URL.to_string(),
            request_timeout: Duration::from_secs(60),
            max_tokens: 1000,
            max_prompt_tokens: DEFAULT_MAX_PROMPT_TOKENS,
            data_path: PathBuf::from(DEFAULT_DATA_PATH),
            profile: Profile::default(),
            host: "0.0.0.0".to_string(),
            port: DEFAULT_PORT,
        }
    }
}

impl RunnerConfig {
    /// Load `.env` (if any) and read the process environment.
    pub fn from_env() -> Self {
        if let Ok(path) = dotenvy::dotenv() {
            tracing::debug!(path = %path.display(), "loaded .env");
        }
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let defaults = Self::default();

        let openai_api_key = get("OPENAI_API_KEY").filter(|k| {
            let placeholder = k.contains("XXXXXXXX");
            if placeholder {
                tracing::warn!("OPENAI_API_KEY is a placeholder; answering offline");
            }
            !placeholder
        });

        let profile = match get("COMPLIANCE_PROFILE").map(|p| p.parse::<Profile>()) {
            Some(Ok(p)) => p,
            Some(Err(e)) => {
                tracing::warn!(error = %e, "ignoring COMPLIANCE_PROFILE");
                defaults.profile
            }
            None => defaults.profile,
        };

        Self {
            openai_api_key,
            openai_model: get("OPENAI_MODEL").unwrap_or(defaults.openai_model),
            openai_base_url: get("OPENAI_BASE_URL").unwrap_or(defaults.openai_base_url),
            request_timeout: parse_or(get("OPENAI_TIMEOUT_SECS"), "OPENAI_TIMEOUT_SECS")
                .map(Duration::from_secs)
                .unwrap_or(defaults.request_timeout),
            max_tokens: parse_or(get("OPENAI_MAX_TOKENS"), "OPENAI_MAX_TOKENS")
                .unwrap_or(defaults.max_tokens),
            max_prompt_tokens: parse_or(
                get("OPENAI_MAX_PROMPT_TOKENS"),
                "OPENAI_MAX_PROMPT_TOKENS",
            )
            .unwrap_or(defaults.max_prompt_tokens),
            data_path: get("COMPLIANCE_DATA_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.data_path),
            profile,
            host: get("HOST").unwrap_or(defaults.host),
            port: parse_or(get("PORT"), "PORT").unwrap_or(defaults.port),
        }
    }
}

fn parse_or<T: std::str::FromStr>(raw: Option<String>, key: &str) -> Option<T> {
    let raw = raw?;
    match raw.parse() {
        Ok(v) => Some(v),
        Err(_) => {
            tracing::warn!(key, value = %raw, "ignoring unparsable setting");
            None
        }
    }
}
