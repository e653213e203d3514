//! Process configuration, read once at start.
//!
//! Layering, lowest to highest: built-in defaults, an optional TOML file,
//! then environment variables (after `.env` has been loaded).

use rig::client::CompletionClient;
use rig::providers::gemini;
use serde::Deserialize;
use std::fmt;
use std::path::Path;

use crate::error::CaptioneerError;
use crate::llm::{create_llm_client_with_config, LlmConfig, SharedLlmClient};

pub const API_KEY_VAR: &str = "GOOGLE_API_KEY";
pub const API_KEY_ALIAS_VAR: &str = "GEMINI_API_KEY";
pub const MODEL_VAR: &str = "CAPTIONEER_MODEL";
pub const TEMPERATURE_VAR: &str = "CAPTIONEER_TEMPERATURE";

pub const DEFAULT_MODEL: &str = "gemini-1.5-flash";

/// Optional settings file. The credential is never read from here.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    pub model: Option<String>,
    pub temperature: Option<f64>,
    pub max_tokens: Option<u64>,
    pub system_prompt: Option<String>,
}

impl FileConfig {
    pub fn from_path(path: &Path) -> Result<Self, CaptioneerError> {
        let raw = std::fs::read_to_string(path).map_err(|e| {
            CaptioneerError::Configuration(format!(
                "cannot read config file '{}': {}",
                path.display(),
                e
            ))
        })?;
        Self::parse(&raw)
    }

    pub fn parse(raw: &str) -> Result<Self, CaptioneerError> {
        Ok(toml::from_str(raw)?)
    }
}

#[derive(Clone)]
pub struct AppConfig {
    api_key: String,
    pub model: String,
    pub llm: LlmConfig,
}

impl fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppConfig")
            .field("api_key", &"<redacted>")
            .field("model", &self.model)
            .field("llm", &self.llm)
            .finish()
    }
}

impl AppConfig {
    /// Load `.env`, the optional config file and the process environment.
    pub fn load(config_path: Option<&Path>) -> Result<Self, CaptioneerError> {
        if let Ok(path) = dotenvy::dotenv() {
            tracing::debug!(path = %path.display(), "loaded .env");
        }

        let file = match config_path {
            Some(path) => FileConfig::from_path(path)?,
            None => FileConfig::default(),
        };

        Self::from_sources(file, |key| std::env::var(key).ok())
    }

    /// Resolve configuration from a parsed file and an environment lookup.
    pub fn from_sources<F>(file: FileConfig, env: F) -> Result<Self, CaptioneerError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_key = [API_KEY_VAR, API_KEY_ALIAS_VAR]
            .iter()
            .filter_map(|key| env(*key))
            .map(|value| value.trim().to_string())
            .find(|value| !value.is_empty())
            .ok_or_else(|| {
                CaptioneerError::Configuration(format!(
                    "{} is not set (or is empty)",
                    API_KEY_VAR
                ))
            })?;

        let model = env(MODEL_VAR)
            .filter(|m| !m.trim().is_empty())
            .or(file.model)
            .unwrap_or_else(|| DEFAULT_MODEL.to_string());

        let mut llm = LlmConfig::default().with_max_tokens(file.max_tokens);
        if let Some(prompt) = file.system_prompt {
            llm = llm.with_system_prompt(prompt);
        }

        let temperature = match env(TEMPERATURE_VAR) {
            Some(raw) => Some(raw.trim().parse::<f64>().map_err(|_| {
                CaptioneerError::Configuration(format!(
                    "{} must be a number, got '{}'",
                    TEMPERATURE_VAR, raw
                ))
            })?),
            None => file.temperature,
        };
        if let Some(temperature) = temperature {
            llm = llm.with_temperature(temperature);
        }

        Ok(Self {
            api_key,
            model,
            llm,
        })
    }

    /// Construct the Gemini-backed client. Called once, at start.
    pub fn build_client(&self) -> SharedLlmClient {
        let client = gemini::Client::new(&self.api_key);
        let model = client.completion_model(&self.model);
        tracing::info!(model = %self.model, "generative client ready");
        create_llm_client_with_config(model, self.llm.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn missing_key_fails_fast() {
        let err = AppConfig::from_sources(FileConfig::default(), env_from(&[])).unwrap_err();
        assert!(matches!(err, CaptioneerError::Configuration(_)));
        assert!(err.to_string().contains(API_KEY_VAR));
    }

    #[test]
    fn blank_key_counts_as_missing() {
        let err = AppConfig::from_sources(FileConfig::default(), env_from(&[(API_KEY_VAR, "  ")]))
            .unwrap_err();
        assert!(matches!(err, CaptioneerError::Configuration(_)));
    }

    #[test]
    fn alias_key_is_accepted() {
        let config =
            AppConfig::from_sources(FileConfig::default(), env_from(&[(API_KEY_ALIAS_VAR, "k")]))
                .unwrap();
        assert_eq!(config.model, DEFAULT_MODEL);
    }

    #[test]
    fn env_overrides_file() {
        let file = FileConfig::parse("model = \"gemini-from-file\"\ntemperature = 0.4\nmax_tokens = 256\n")
            .unwrap();
        let config = AppConfig::from_sources(
            file,
            env_from(&[(API_KEY_VAR, "k"), (MODEL_VAR, "gemini-from-env")]),
        )
        .unwrap();
        assert_eq!(config.model, "gemini-from-env");
        assert_eq!(config.llm.temperature, 0.4);
        assert_eq!(config.llm.max_tokens, Some(256));
    }

    #[test]
    fn bad_temperature_is_a_configuration_error() {
        let err = AppConfig::from_sources(
            FileConfig::default(),
            env_from(&[(API_KEY_VAR, "k"), (TEMPERATURE_VAR, "warm")]),
        )
        .unwrap_err();
        assert!(matches!(err, CaptioneerError::Configuration(_)));
    }

    #[test]
    fn unknown_file_keys_are_rejected() {
        assert!(FileConfig::parse("api_key = \"secret\"").is_err());
    }

    #[test]
    fn debug_output_hides_the_key() {
        let config =
            AppConfig::from_sources(FileConfig::default(), env_from(&[(API_KEY_VAR, "sekrit")]))
                .unwrap();
        assert!(!format!("{:?}", config).contains("sekrit"));
    }
}
