use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::warn;
use zeroize::Zeroizing;

use crate::error::{ConfigError, Result};

/// Environment variable holding the advisory service credential.
pub const API_KEY_VAR: &str = "GROQ_API_KEY";
/// Environment variable overriding the configured model.
pub const MODEL_VAR: &str = "BUDGET_BUDDY_MODEL";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_api_base")]
    pub api_base: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default)]
    pub user_name: String,
}

fn default_model() -> String {
    "llama-3.3-70b-versatile".to_string()
}

fn default_api_base() -> String {
    "https://api.groq.com/openai/v1".to_string()
}

fn default_timeout_secs() -> u64 {
    60
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            model: default_model(),
            api_base: default_api_base(),
            timeout_secs: default_timeout_secs(),
            user_name: String::new(),
        }
    }
}

pub fn config_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config")
        .join("budget-buddy")
}

pub fn settings_path() -> PathBuf {
    config_dir().join("settings.json")
}

pub fn log_path() -> PathBuf {
    config_dir().join("budget-buddy.log")
}

/// Load settings, falling back to defaults when the file is missing or unreadable.
pub fn load_settings() -> Settings {
    let path = settings_path();
    if !path.exists() {
        return Settings::default();
    }
    let content = std::fs::read_to_string(&path).unwrap_or_default();
    match serde_json::from_str(&content) {
        Ok(settings) => settings,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "ignoring unreadable settings file");
            Settings::default()
        }
    }
}

/// Everything the advisory client needs, resolved once at startup.
pub struct AdvisorConfig {
    pub api_key: Zeroizing<String>,
    pub model: String,
    pub api_base: String,
    pub timeout: Duration,
}

impl std::fmt::Debug for AdvisorConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdvisorConfig")
            .field("api_key", &"<redacted>")
            .field("model", &self.model)
            .field("api_base", &self.api_base)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl AdvisorConfig {
    /// Resolve from settings plus the environment (and `.env`). Fails when the
    /// credential is absent so callers can stop before drawing anything.
    pub fn from_env(settings: &Settings, model_override: Option<&str>) -> Result<Self> {
        let key = dotenv::var(API_KEY_VAR).ok();
        let env_model = dotenv::var(MODEL_VAR).ok();
        Self::resolve(settings, key, env_model.as_deref(), model_override)
    }

    pub fn resolve(
        settings: &Settings,
        api_key: Option<String>,
        env_model: Option<&str>,
        model_override: Option<&str>,
    ) -> Result<Self> {
        let api_key = api_key
            .map(|k| Zeroizing::new(k.trim().to_string()))
            .filter(|k| !k.is_empty())
            .ok_or(ConfigError::MissingCredential(API_KEY_VAR))?;
        let model = model_override
            .or(env_model)
            .map(str::trim)
            .filter(|m| !m.is_empty())
            .unwrap_or(&settings.model)
            .to_string();
        if settings.timeout_secs == 0 {
            return Err(ConfigError::Settings("timeout_secs must be greater than 0".into()).into());
        }
        Ok(Self {
            api_key,
            model,
            api_base: settings.api_base.trim_end_matches('/').to_string(),
            timeout: Duration::from_secs(settings.timeout_secs),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::BuddyError;

    #[test]
    fn test_defaults() {
        let s = Settings::default();
        assert_eq!(s.model, "llama-3.3-70b-versatile");
        assert_eq!(s.api_base, "https://api.groq.com/openai/v1");
        assert_eq!(s.timeout_secs, 60);
        assert!(s.user_name.is_empty());
    }

    #[test]
    fn test_load_merges_with_defaults() {
        let json = r#"{"model": "llama-3.1-8b-instant", "user_name": "Sam"}"#;
        let s: Settings = serde_json::from_str(json).unwrap();
        assert_eq!(s.model, "llama-3.1-8b-instant");
        assert_eq!(s.user_name, "Sam");
        assert_eq!(s.timeout_secs, 60);
    }

    #[test]
    fn test_settings_file_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        let settings = Settings {
            timeout_secs: 15,
            ..Settings::default()
        };
        std::fs::write(&path, serde_json::to_string_pretty(&settings).unwrap()).unwrap();
        let loaded: Settings =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(loaded.timeout_secs, 15);
    }

    #[test]
    fn test_missing_credential_is_descriptive() {
        let err = AdvisorConfig::resolve(&Settings::default(), None, None, None).unwrap_err();
        assert!(matches!(
            err,
            BuddyError::Config(ConfigError::MissingCredential("GROQ_API_KEY"))
        ));
        assert!(err.to_string().contains("GROQ_API_KEY is not set"));
    }

    #[test]
    fn test_blank_credential_counts_as_missing() {
        let err = AdvisorConfig::resolve(&Settings::default(), Some("   ".into()), None, None);
        assert!(err.is_err());
    }

    #[test]
    fn test_model_precedence() {
        let s = Settings::default();
        let key = || Some("gsk_test".to_string());

        let cfg = AdvisorConfig::resolve(&s, key(), None, None).unwrap();
        assert_eq!(cfg.model, "llama-3.3-70b-versatile");

        let cfg = AdvisorConfig::resolve(&s, key(), Some("env-model"), None).unwrap();
        assert_eq!(cfg.model, "env-model");

        let cfg = AdvisorConfig::resolve(&s, key(), Some("env-model"), Some("cli-model")).unwrap();
        assert_eq!(cfg.model, "cli-model");
    }

    #[test]
    fn test_debug_redacts_key() {
        let cfg =
            AdvisorConfig::resolve(&Settings::default(), Some("gsk_secret".into()), None, None)
                .unwrap();
        let dbg = format!("{cfg:?}");
        assert!(!dbg.contains("gsk_secret"));
        assert!(dbg.contains("<redacted>"));
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let s = Settings {
            timeout_secs: 0,
            ..Settings::default()
        };
        assert!(AdvisorConfig::resolve(&s, Some("k".into()), None, None).is_err());
    }
}
