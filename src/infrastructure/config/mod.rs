//! Configuration management

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use crate::application::errors::ConfigError;

/// Bot configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct Config {
    pub bot: BotConfig,
    pub limits: LimitsConfig,
    pub storage: StorageConfig,
    pub adapters: AdaptersConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct BotConfig {
    pub name: String,
    /// Used to recognise `/stop@<username>` in group chats
    pub username: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct LimitsConfig {
    pub max_files: usize,
    pub session_ttl_minutes: i64,
    /// Up to this many participants a file is answered with text, above it with a workbook
    pub text_threshold_max: usize,
    pub delivery_pause_ms: u64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct StorageConfig {
    /// Parent of per-run scratch directories; system temp dir when unset
    pub scratch_dir: Option<PathBuf>,
    pub prefix: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct AdaptersConfig {
    pub telegram: Option<TelegramConfig>,
    pub console: Option<ConsoleConfig>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct TelegramConfig {
    pub enabled: bool,
    pub token: Option<String>,
    pub poll_timeout_secs: i64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct ConsoleConfig {
    pub enabled: bool,
    pub output_dir: PathBuf,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_files: 10,
            session_ttl_minutes: 30,
            text_threshold_max: 50,
            delivery_pause_ms: 250,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bot: BotConfig {
                name: "export-roster-bot".to_string(),
                username: "export_roster_bot".to_string(),
            },
            limits: LimitsConfig::default(),
            storage: StorageConfig {
                scratch_dir: None,
                prefix: "tg-export-".to_string(),
            },
            adapters: AdaptersConfig {
                telegram: Some(TelegramConfig {
                    enabled: false,
                    token: None,
                    poll_timeout_secs: 30,
                }),
                console: Some(ConsoleConfig {
                    enabled: true,
                    output_dir: PathBuf::from("./out"),
                }),
            },
        }
    }
}

impl LimitsConfig {
    pub fn session_ttl(&self) -> chrono::Duration {
        chrono::Duration::minutes(self.session_ttl_minutes)
    }

    pub fn delivery_pause(&self) -> Duration {
        Duration::from_millis(self.delivery_pause_ms)
    }
}

impl Config {
    pub fn load(path: impl Into<PathBuf>) -> Result<Self, ConfigError> {
        let path = path.into();
        let content = std::fs::read_to_string(&path)
            .map_err(|e| ConfigError::Parse(format!("Failed to read config: {}", e)))?;

        Self::from_yaml(&content)
    }

    pub fn from_yaml(content: &str) -> Result<Self, ConfigError> {
        let config: Config = serde_yaml::from_str(content)
            .map_err(|e| ConfigError::Parse(format!("Failed to parse config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_yaml(&self) -> Result<String, ConfigError> {
        serde_yaml::to_string(self)
            .map_err(|e| ConfigError::Parse(format!("Failed to serialize config: {}", e)))
    }

    pub fn save(&self, path: impl Into<PathBuf>) -> Result<(), ConfigError> {
        let path = path.into();
        std::fs::write(&path, self.to_yaml()?)
            .map_err(|e| ConfigError::Parse(format!("Failed to write config: {}", e)))
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.limits.max_files == 0 {
            return Err(ConfigError::InvalidValue("limits.max-files must be at least 1".to_string()));
        }
        if self.limits.session_ttl_minutes <= 0 {
            return Err(ConfigError::InvalidValue("limits.session-ttl-minutes must be positive".to_string()));
        }
        if let Some(tg) = &self.adapters.telegram {
            if tg.enabled && tg.token.as_deref().map_or(true, str::is_empty) {
                return Err(ConfigError::MissingField("adapters.telegram.token".to_string()));
            }
        }
        Ok(())
    }

    /// Token of an enabled Telegram adapter, if any
    pub fn telegram_token(&self) -> Option<String> {
        self.adapters.telegram
            .as_ref()
            .filter(|t| t.enabled)
            .and_then(|t| t.token.clone())
    }

    pub fn load_env() -> Self {
        // Load from environment variables
        let mut config = Config::default();

        if let Ok(token) = std::env::var("BOT_TOKEN") {
            if let Some(ref mut tg) = config.adapters.telegram {
                tg.token = Some(token);
                tg.enabled = true;
            }
        }

        if let Ok(username) = std::env::var("BOT_USERNAME") {
            config.bot.username = username;
        }

        if let Ok(dir) = std::env::var("BOT_SCRATCH_DIR") {
            config.storage.scratch_dir = Some(PathBuf::from(dir));
        }

        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_limits() {
        let config = Config::default();
        assert_eq!(config.limits.max_files, 10);
        assert_eq!(config.limits.text_threshold_max, 50);
        assert_eq!(config.limits.session_ttl(), chrono::Duration::minutes(30));
        assert_eq!(config.limits.delivery_pause(), Duration::from_millis(250));
    }

    #[test]
    fn test_yaml_round_trip_uses_kebab_case() {
        let yaml = Config::default().to_yaml().unwrap();
        assert!(yaml.contains("max-files: 10"));
        assert!(yaml.contains("session-ttl-minutes: 30"));

        let parsed = Config::from_yaml(&yaml).unwrap();
        assert_eq!(parsed.bot.username, "export_roster_bot");
    }

    #[test]
    fn test_saved_config_loads_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");

        let mut config = Config::default();
        config.limits.max_files = 3;
        config.save(&path).unwrap();

        let loaded = Config::load(&path).unwrap();
        assert_eq!(loaded.limits.max_files, 3);
    }

    #[test]
    fn test_enabled_telegram_requires_token() {
        let mut config = Config::default();
        if let Some(ref mut tg) = config.adapters.telegram {
            tg.enabled = true;
        }
        assert!(matches!(config.validate(), Err(ConfigError::MissingField(_))));
    }

    #[test]
    fn test_zero_max_files_is_rejected() {
        let mut config = Config::default();
        config.limits.max_files = 0;
        assert!(matches!(config.validate(), Err(ConfigError::InvalidValue(_))));
    }
}
