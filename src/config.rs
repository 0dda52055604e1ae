//! Configuration management for Step Agent.
//!
//! Configuration can be set via environment variables:
//! - `OPENROUTER_API_KEY` - Required. Your OpenRouter API key.
//! - `DEFAULT_MODEL` - Optional. The LLM model to use. Defaults to `google/gemini-2.5-flash`.
//! - `OPENROUTER_BASE_URL` - Optional. Chat completions base URL. Defaults to `https://openrouter.ai/api/v1`.
//! - `MAX_STEPS` - Optional. Maximum model calls per turn. Defaults to `50`. `0`, `none` or `unlimited` disables the cap.
//! - `ECHO_TOOL_STEPS` - Optional. Record TOOL steps as assistant messages. Defaults to `true`.
//! - `WEATHER_URL` - Optional. Base URL of the weather service. Defaults to `https://wttr.in`.

use thiserror::Error;

use crate::llm::DEFAULT_BASE_URL;
use crate::tools::DEFAULT_WEATHER_URL;

pub const DEFAULT_MODEL: &str = "google/gemini-2.5-flash";
pub const DEFAULT_MAX_STEPS: usize = 50;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid value for {0}: {1}")]
    InvalidValue(String, String),
}

/// Agent configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// OpenRouter API key
    pub api_key: String,

    /// LLM model identifier (OpenRouter format)
    pub model: String,

    /// Chat completions base URL
    pub base_url: String,

    /// Maximum model calls per turn; `None` means no cap
    pub max_steps: Option<usize>,

    /// Whether TOOL steps are echoed into the transcript before their observation
    pub echo_tool_steps: bool,

    /// Weather service base URL
    pub weather_url: String,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::MissingEnvVar` if `OPENROUTER_API_KEY` is not set.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_key = lookup("OPENROUTER_API_KEY")
            .filter(|v| !v.trim().is_empty())
            .ok_or_else(|| ConfigError::MissingEnvVar("OPENROUTER_API_KEY".to_string()))?;

        let model = lookup("DEFAULT_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string());

        let base_url = lookup("OPENROUTER_BASE_URL").unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

        let max_steps = match lookup("MAX_STEPS") {
            Some(v) => parse_step_limit(&v)
                .map_err(|e| ConfigError::InvalidValue("MAX_STEPS".to_string(), e))?,
            None => Some(DEFAULT_MAX_STEPS),
        };

        let echo_tool_steps = lookup("ECHO_TOOL_STEPS")
            .map(|v| {
                parse_bool(&v).map_err(|e| ConfigError::InvalidValue("ECHO_TOOL_STEPS".to_string(), e))
            })
            .transpose()?
            .unwrap_or(true);

        let weather_url = lookup("WEATHER_URL").unwrap_or_else(|| DEFAULT_WEATHER_URL.to_string());

        Ok(Self {
            api_key,
            model,
            base_url,
            max_steps,
            echo_tool_steps,
            weather_url,
        })
    }

    /// Create a config with custom values (useful for testing).
    pub fn new(api_key: String, model: String) -> Self {
        Self {
            api_key,
            model,
            base_url: DEFAULT_BASE_URL.to_string(),
            max_steps: Some(DEFAULT_MAX_STEPS),
            echo_tool_steps: true,
            weather_url: DEFAULT_WEATHER_URL.to_string(),
        }
    }

    pub fn with_max_steps(mut self, max_steps: Option<usize>) -> Self {
        self.max_steps = max_steps;
        self
    }

    pub fn with_echo_tool_steps(mut self, echo: bool) -> Self {
        self.echo_tool_steps = echo;
        self
    }
}

fn parse_step_limit(value: &str) -> Result<Option<usize>, String> {
    match value.trim().to_lowercase().as_str() {
        "" | "0" | "none" | "unlimited" => Ok(None),
        other => other
            .parse::<usize>()
            .map(Some)
            .map_err(|e| format!("{}: {}", other, e)),
    }
}

fn parse_bool(value: &str) -> Result<bool, String> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "t" | "yes" | "y" | "on" => Ok(true),
        "0" | "false" | "f" | "no" | "n" | "off" => Ok(false),
        other => Err(format!("expected boolean-like value, got: {}", other)),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn load(vars: &[(&str, &str)]) -> Result<Config, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn api_key_is_required() {
        assert!(matches!(load(&[]), Err(ConfigError::MissingEnvVar(_))));
        assert!(matches!(
            load(&[("OPENROUTER_API_KEY", "  ")]),
            Err(ConfigError::MissingEnvVar(_))
        ));
    }

    #[test]
    fn defaults_apply() {
        let config = load(&[("OPENROUTER_API_KEY", "sk-test")]).unwrap();
        assert_eq!(config.model, DEFAULT_MODEL);
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.max_steps, Some(DEFAULT_MAX_STEPS));
        assert!(config.echo_tool_steps);
        assert_eq!(config.weather_url, DEFAULT_WEATHER_URL);
    }

    #[test]
    fn step_limit_can_be_disabled() {
        for value in ["0", "none", "Unlimited"] {
            let config = load(&[("OPENROUTER_API_KEY", "k"), ("MAX_STEPS", value)]).unwrap();
            assert_eq!(config.max_steps, None, "MAX_STEPS={value}");
        }
        let config = load(&[("OPENROUTER_API_KEY", "k"), ("MAX_STEPS", "7")]).unwrap();
        assert_eq!(config.max_steps, Some(7));
    }

    #[test]
    fn invalid_values_are_rejected() {
        assert!(matches!(
            load(&[("OPENROUTER_API_KEY", "k"), ("MAX_STEPS", "many")]),
            Err(ConfigError::InvalidValue(name, _)) if name == "MAX_STEPS"
        ));
        assert!(matches!(
            load(&[("OPENROUTER_API_KEY", "k"), ("ECHO_TOOL_STEPS", "maybe")]),
            Err(ConfigError::InvalidValue(name, _)) if name == "ECHO_TOOL_STEPS"
        ));
    }

    #[test]
    fn bool_parsing_accepts_common_spellings() {
        assert_eq!(parse_bool("Yes"), Ok(true));
        assert_eq!(parse_bool("off"), Ok(false));
        assert!(parse_bool("2").is_err());
    }
}
