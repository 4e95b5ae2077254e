// src/config.rs
use crate::errors::SafeclickError;
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_ANALYSIS_MODEL: &str = "gemini-3-pro-preview";
pub const DEFAULT_CHAT_MODEL: &str = "gemini-3-flash-preview";
pub const DEFAULT_THINKING_BUDGET: u32 = 4000;
pub const DEFAULT_BIND: &str = "0.0.0.0:8080";
pub const DEFAULT_MAX_IMAGE_DIMENSION: u32 = 2048;

const API_KEY_VARS: [&str; 3] = ["GEMINI_API_KEY", "GOOGLE_API_KEY", "API_KEY"];

/// Model selection shared by the analysis and chat paths.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelSettings {
    pub analysis_model: String,
    pub chat_model: String,
    /// `None` leaves the remote model's default reasoning depth untouched.
    pub thinking_budget: Option<u32>,
}

impl Default for ModelSettings {
    fn default() -> Self {
        Self {
            analysis_model: DEFAULT_ANALYSIS_MODEL.to_string(),
            chat_model: DEFAULT_CHAT_MODEL.to_string(),
            thinking_budget: Some(DEFAULT_THINKING_BUDGET),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub api_key: String,
    pub api_base: String,
    pub models: ModelSettings,
    pub request_timeout: Option<Duration>,
    pub bind_addr: String,
    pub static_dir: Option<PathBuf>,
    pub max_image_dimension: u32,
}

impl Config {
    pub fn from_env() -> Result<Self, SafeclickError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Builds the configuration from an arbitrary variable source.
    /// Blank values are treated as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, SafeclickError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| {
            lookup(name)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let api_key = API_KEY_VARS
            .iter()
            .find_map(|name| get(*name))
            .ok_or_else(|| {
                SafeclickError::Config(format!("one of {} must be set", API_KEY_VARS.join(", ")))
            })?;

        let api_base = get("GEMINI_API_BASE")
            .map(|value| value.trim_end_matches('/').to_string())
            .unwrap_or_else(|| DEFAULT_API_BASE.to_string());

        let thinking_budget = match get("SAFECLICK_THINKING_BUDGET") {
            Some(raw) => match parse_number::<u32>("SAFECLICK_THINKING_BUDGET", &raw)? {
                0 => None,
                budget => Some(budget),
            },
            None => Some(DEFAULT_THINKING_BUDGET),
        };

        let request_timeout = get("SAFECLICK_REQUEST_TIMEOUT_SECS")
            .map(|raw| parse_number::<u64>("SAFECLICK_REQUEST_TIMEOUT_SECS", &raw))
            .transpose()?
            .map(Duration::from_secs);

        let max_image_dimension = get("SAFECLICK_MAX_IMAGE_DIMENSION")
            .map(|raw| parse_number::<u32>("SAFECLICK_MAX_IMAGE_DIMENSION", &raw))
            .transpose()?
            .unwrap_or(DEFAULT_MAX_IMAGE_DIMENSION);
        if max_image_dimension == 0 {
            return Err(SafeclickError::Config(
                "SAFECLICK_MAX_IMAGE_DIMENSION must be positive".to_string(),
            ));
        }

        Ok(Self {
            api_key,
            api_base,
            models: ModelSettings {
                analysis_model: get("SAFECLICK_ANALYSIS_MODEL")
                    .unwrap_or_else(|| DEFAULT_ANALYSIS_MODEL.to_string()),
                chat_model: get("SAFECLICK_CHAT_MODEL")
                    .unwrap_or_else(|| DEFAULT_CHAT_MODEL.to_string()),
                thinking_budget,
            },
            request_timeout,
            bind_addr: get("SAFECLICK_BIND").unwrap_or_else(|| DEFAULT_BIND.to_string()),
            static_dir: get("SAFECLICK_STATIC_DIR").map(PathBuf::from),
            max_image_dimension,
        })
    }
}

fn parse_number<T: std::str::FromStr>(name: &str, raw: &str) -> Result<T, SafeclickError> {
    raw.parse()
        .map_err(|_| SafeclickError::Config(format!("{} is not a valid number: {}", name, raw)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(vars: &[(&str, &str)]) -> Result<Config, SafeclickError> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|name| map.get(name).cloned())
    }

    #[test]
    fn missing_credential_fails_early() {
        let err = config_from(&[]).unwrap_err();
        assert!(matches!(err, SafeclickError::Config(_)));
    }

    #[test]
    fn blank_credential_counts_as_missing() {
        let err = config_from(&[("GEMINI_API_KEY", "   ")]).unwrap_err();
        assert!(matches!(err, SafeclickError::Config(_)));
    }

    #[test]
    fn falls_back_through_credential_variables() {
        let config = config_from(&[("API_KEY", "legacy-key")]).unwrap();
        assert_eq!(config.api_key, "legacy-key");

        let config = config_from(&[("API_KEY", "legacy-key"), ("GOOGLE_API_KEY", "google")]).unwrap();
        assert_eq!(config.api_key, "google");
    }

    #[test]
    fn defaults_apply() {
        let config = config_from(&[("GEMINI_API_KEY", "k")]).unwrap();
        assert_eq!(config.api_base, DEFAULT_API_BASE);
        assert_eq!(config.models, ModelSettings::default());
        assert_eq!(config.request_timeout, None);
        assert_eq!(config.bind_addr, DEFAULT_BIND);
        assert_eq!(config.static_dir, None);
        assert_eq!(config.max_image_dimension, DEFAULT_MAX_IMAGE_DIMENSION);
    }

    #[test]
    fn overrides_are_parsed() {
        let config = config_from(&[
            ("GEMINI_API_KEY", "k"),
            ("GEMINI_API_BASE", "http://localhost:9000/v1beta/"),
            ("SAFECLICK_ANALYSIS_MODEL", "gemini-2.5-pro"),
            ("SAFECLICK_THINKING_BUDGET", "0"),
            ("SAFECLICK_REQUEST_TIMEOUT_SECS", "30"),
            ("SAFECLICK_STATIC_DIR", "dist"),
        ])
        .unwrap();
        assert_eq!(config.api_base, "http://localhost:9000/v1beta");
        assert_eq!(config.models.analysis_model, "gemini-2.5-pro");
        assert_eq!(config.models.chat_model, DEFAULT_CHAT_MODEL);
        assert_eq!(config.models.thinking_budget, None);
        assert_eq!(config.request_timeout, Some(Duration::from_secs(30)));
        assert_eq!(config.static_dir, Some(PathBuf::from("dist")));
    }

    #[test]
    fn rejects_garbage_numbers() {
        let err = config_from(&[("GEMINI_API_KEY", "k"), ("SAFECLICK_THINKING_BUDGET", "lots")])
            .unwrap_err();
        assert!(err.to_string().contains("SAFECLICK_THINKING_BUDGET"));

        let err = config_from(&[("GEMINI_API_KEY", "k"), ("SAFECLICK_MAX_IMAGE_DIMENSION", "0")])
            .unwrap_err();
        assert!(matches!(err, SafeclickError::Config(_)));
    }
}
