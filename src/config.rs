//! Configuration types.

use std::path::PathBuf;

use secrecy::SecretString;

use crate::error::ConfigError;
use crate::llm::LlmConfig;
use crate::llm::gemini::DEFAULT_BASE_URL;

pub const DEFAULT_MODEL: &str = "gemini-2.0-flash";
pub const DEFAULT_DB_PATH: &str = "./data/trail-planner.db";
pub const DEFAULT_LOG_DIR: &str = "./data/logs";

/// Application configuration, read from the environment.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub llm: LlmConfig,
    /// Database file for plans and the hand-off table.
    pub db_path: PathBuf,
    /// Signed-in user. `None` means submissions fail as unauthenticated.
    pub user_id: Option<String>,
    /// Port for the results API; not served when unset.
    pub http_port: Option<u16>,
    /// Directory for the daily rolling log file.
    pub log_dir: PathBuf,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key/value source. Blank values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let api_key = get("GEMINI_API_KEY")
            .ok_or_else(|| ConfigError::MissingEnvVar("GEMINI_API_KEY".to_string()))?;

        let http_port = match get("TRAIL_PLANNER_HTTP_PORT") {
            Some(raw) => Some(raw.trim().parse::<u16>().map_err(|e| {
                ConfigError::InvalidValue {
                    key: "TRAIL_PLANNER_HTTP_PORT".to_string(),
                    message: format!("'{raw}' is not a port number: {e}"),
                }
            })?),
            None => None,
        };

        Ok(Self {
            llm: LlmConfig {
                api_key: SecretString::from(api_key),
                model: get("TRAIL_PLANNER_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string()),
                base_url: get("TRAIL_PLANNER_API_BASE")
                    .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            },
            db_path: get("TRAIL_PLANNER_DB_PATH")
                .unwrap_or_else(|| DEFAULT_DB_PATH.to_string())
                .into(),
            user_id: get("TRAIL_PLANNER_USER"),
            http_port,
            log_dir: get("TRAIL_PLANNER_LOG_DIR")
                .unwrap_or_else(|| DEFAULT_LOG_DIR.to_string())
                .into(),
        })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use secrecy::ExposeSecret;

    use super::*;

    fn config(pairs: &[(&str, &str)]) -> Result<AppConfig, ConfigError> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults() {
        let config = config(&[("GEMINI_API_KEY", "k")]).unwrap();
        assert_eq!(config.llm.api_key.expose_secret(), "k");
        assert_eq!(config.llm.model, DEFAULT_MODEL);
        assert_eq!(config.llm.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.db_path, PathBuf::from(DEFAULT_DB_PATH));
        assert_eq!(config.log_dir, PathBuf::from(DEFAULT_LOG_DIR));
        assert_eq!(config.user_id, None);
        assert_eq!(config.http_port, None);
    }

    #[test]
    fn missing_api_key() {
        assert!(matches!(
            config(&[]),
            Err(ConfigError::MissingEnvVar(key)) if key == "GEMINI_API_KEY"
        ));
        assert!(config(&[("GEMINI_API_KEY", "  ")]).is_err());
    }

    #[test]
    fn overrides() {
        let config = config(&[
            ("GEMINI_API_KEY", "k"),
            ("TRAIL_PLANNER_MODEL", "gemini-1.5-pro"),
            ("TRAIL_PLANNER_DB_PATH", "/tmp/t.db"),
            ("TRAIL_PLANNER_USER", "hiker-7"),
            ("TRAIL_PLANNER_HTTP_PORT", "8088"),
        ])
        .unwrap();
        assert_eq!(config.llm.model, "gemini-1.5-pro");
        assert_eq!(config.db_path, PathBuf::from("/tmp/t.db"));
        assert_eq!(config.user_id.as_deref(), Some("hiker-7"));
        assert_eq!(config.http_port, Some(8088));
    }

    #[test]
    fn bad_port() {
        let err = config(&[("GEMINI_API_KEY", "k"), ("TRAIL_PLANNER_HTTP_PORT", "http")])
            .unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidValue { ref key, .. } if key == "TRAIL_PLANNER_HTTP_PORT"
        ));
    }
}
