use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::core::game::state::Role;
use crate::error::ConfigError;

pub(crate) const DEFAULT_PROVIDER: &str = "openai";
pub(crate) const DEFAULT_MODEL: &str = "gpt-4o-mini";
pub(crate) const DEFAULT_TEMPERATURE: f64 = 0.5;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Path to config.toml - computed from home, not serialized
    #[serde(skip)]
    pub config_path: PathBuf,
    pub api_key: Option<String>,
    pub default_provider: Option<String>,
    pub default_model: Option<String>,
    pub default_temperature: f64,

    /// Per-role overrides; unset fields fall back to the defaults above.
    #[serde(default)]
    pub host: RoleConfig,

    #[serde(default)]
    pub player: RoleConfig,

    #[serde(default)]
    pub game: GameConfig,

    #[serde(default)]
    pub observability: ObservabilityConfig,

    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_log_level() -> String {
    "info".into()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            config_path: PathBuf::new(),
            api_key: None,
            default_provider: Some(DEFAULT_PROVIDER.into()),
            default_model: Some(DEFAULT_MODEL.into()),
            default_temperature: DEFAULT_TEMPERATURE,
            host: RoleConfig::default(),
            player: RoleConfig::default(),
            game: GameConfig::default(),
            observability: ObservabilityConfig::default(),
            log_level: default_log_level(),
        }
    }
}

impl Config {
    pub fn role(&self, role: Role) -> &RoleConfig {
        match role {
            Role::Host => &self.host,
            Role::Player => &self.player,
        }
    }

    pub fn provider_for(&self, role: Role) -> String {
        self.role(role)
            .provider
            .clone()
            .or_else(|| self.default_provider.clone())
            .unwrap_or_else(|| DEFAULT_PROVIDER.into())
    }

    pub fn model_for(&self, role: Role) -> String {
        self.role(role)
            .model
            .clone()
            .or_else(|| self.default_model.clone())
            .unwrap_or_else(|| DEFAULT_MODEL.into())
    }

    pub fn temperature_for(&self, role: Role) -> f64 {
        self.role(role)
            .temperature
            .unwrap_or(self.default_temperature)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.game.question_quota == 0 {
            return Err(ConfigError::Validation(
                "game.question_quota must be at least 1".into(),
            ));
        }
        if self.game.max_transitions == 0 {
            return Err(ConfigError::Validation(
                "game.max_transitions must be at least 1".into(),
            ));
        }
        if self.game.topic_sample_size == 0 {
            return Err(ConfigError::Validation(
                "game.topic_sample_size must be at least 1".into(),
            ));
        }
        for (name, temperature) in [
            ("default_temperature", Some(self.default_temperature)),
            ("host.temperature", self.host.temperature),
            ("player.temperature", self.player.temperature),
        ] {
            if let Some(value) = temperature
                && !(0.0..=2.0).contains(&value)
            {
                return Err(ConfigError::Validation(format!(
                    "{name} must be within 0.0..=2.0, got {value}"
                )));
            }
        }
        Ok(())
    }

    /// The API key with everything but a short prefix hidden.
    pub fn masked_api_key(&self) -> String {
        match self.api_key.as_deref() {
            None | Some("") => "(unset)".into(),
            Some(key) => {
                let prefix: String = key.chars().take(4).collect();
                format!("{prefix}****")
            }
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RoleConfig {
    #[serde(default)]
    pub provider: Option<String>,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub temperature: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameConfig {
    #[serde(default = "default_question_quota")]
    pub question_quota: u32,
    /// Node visits allowed before a game is declared runaway.
    #[serde(default = "default_max_transitions")]
    pub max_transitions: u32,
    #[serde(default = "default_topic_sample_size")]
    pub topic_sample_size: usize,
    #[serde(default = "default_topics_path")]
    pub topics_path: PathBuf,
}

fn default_question_quota() -> u32 {
    20
}

fn default_max_transitions() -> u32 {
    200
}

fn default_topic_sample_size() -> usize {
    5
}

fn default_topics_path() -> PathBuf {
    PathBuf::from("data/reference_topics.csv")
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            question_quota: default_question_quota(),
            max_transitions: default_max_transitions(),
            topic_sample_size: default_topic_sample_size(),
            topics_path: default_topics_path(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObservabilityConfig {
    /// Comma-separated list of "log" | "jsonl" | "none"
    #[serde(default = "default_backend")]
    pub backend: String,
    /// Directory for per-game JSONL files.
    #[serde(default = "default_log_dir")]
    pub log_dir: PathBuf,
}

fn default_backend() -> String {
    "log".into()
}

fn default_log_dir() -> PathBuf {
    PathBuf::from("logs")
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            backend: default_backend(),
            log_dir: default_log_dir(),
        }
    }
}
