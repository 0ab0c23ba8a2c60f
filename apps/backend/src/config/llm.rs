use std::env;
use std::time::Duration;

use tracing::warn;

use crate::error::AppError;

const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
const DEFAULT_MODEL: &str = "gpt-4o-mini";
const DEFAULT_TIMEOUT_SECS: u64 = 20;

/// OpenAI-compatible chat-completions endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LlmConfig {
    pub base_url: String,
    pub api_key: String,
    pub model: String,
    pub timeout: Duration,
}

impl LlmConfig {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            api_key: api_key.into(),
            model: model.into(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }

    /// `None` when no API key is configured.
    pub fn from_env() -> Result<Option<Self>, AppError> {
        let Ok(api_key) = env::var("LLM_API_KEY") else {
            return Ok(None);
        };
        if api_key.trim().is_empty() {
            return Ok(None);
        }
        let timeout_secs = match env::var("LLM_TIMEOUT_SECS") {
            Ok(raw) => raw
                .trim()
                .parse::<u64>()
                .map_err(|_| AppError::config(format!("LLM_TIMEOUT_SECS has an invalid value: '{raw}'")))?,
            Err(_) => DEFAULT_TIMEOUT_SECS,
        };
        Ok(Some(Self {
            base_url: env::var("LLM_BASE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string()),
            api_key,
            model: env::var("LLM_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_string()),
            timeout: Duration::from_secs(timeout_secs),
        }))
    }
}

/// Which decision provider new sessions get.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecisionBackend {
    Random,
    Llm(LlmConfig),
}

impl DecisionBackend {
    /// `NIGHTFALL_DECISION_PROVIDER` = `random` (default) or `llm`.
    pub fn from_env() -> Result<Self, AppError> {
        let requested = env::var("NIGHTFALL_DECISION_PROVIDER")
            .unwrap_or_else(|_| "random".to_string())
            .to_ascii_lowercase();
        match requested.as_str() {
            "random" => Ok(DecisionBackend::Random),
            "llm" => match LlmConfig::from_env()? {
                Some(config) => Ok(DecisionBackend::Llm(config)),
                None => {
                    warn!("LLM provider requested but LLM_API_KEY is not set; using random decisions");
                    Ok(DecisionBackend::Random)
                }
            },
            other => Err(AppError::config(format!(
                "unknown decision provider '{other}'"
            ))),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            DecisionBackend::Random => "random",
            DecisionBackend::Llm(_) => "llm",
        }
    }
}

#[cfg(test)]
mod tests {
    use serial_test::serial;

    use super::*;

    fn clear_env() {
        for var in [
            "NIGHTFALL_DECISION_PROVIDER",
            "LLM_API_KEY",
            "LLM_BASE_URL",
            "LLM_MODEL",
            "LLM_TIMEOUT_SECS",
        ] {
            env::remove_var(var);
        }
    }

    #[test]
    #[serial]
    fn llm_without_key_falls_back_to_random() {
        clear_env();
        env::set_var("NIGHTFALL_DECISION_PROVIDER", "llm");
        assert_eq!(DecisionBackend::from_env().expect("valid"), DecisionBackend::Random);
        clear_env();
    }

    #[test]
    #[serial]
    fn llm_with_key_reads_endpoint() {
        clear_env();
        env::set_var("NIGHTFALL_DECISION_PROVIDER", "LLM");
        env::set_var("LLM_API_KEY", "sk-test");
        env::set_var("LLM_BASE_URL", "http://localhost:9999/v1");
        let backend = DecisionBackend::from_env().expect("valid");
        let DecisionBackend::Llm(config) = backend else {
            panic!("expected llm backend");
        };
        assert_eq!(config.base_url, "http://localhost:9999/v1");
        assert_eq!(config.model, DEFAULT_MODEL);
        clear_env();
    }

    #[test]
    #[serial]
    fn unknown_provider_is_a_config_error() {
        clear_env();
        env::set_var("NIGHTFALL_DECISION_PROVIDER", "oracle");
        assert!(DecisionBackend::from_env().is_err());
        clear_env();
    }
}
