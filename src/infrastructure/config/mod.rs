use std::env;
use std::path::PathBuf;
use std::time::Duration;

use crate::domain::speech::model::{DEFAULT_SPEAKER_A_LABEL, DEFAULT_SPEAKER_B_LABEL};
use crate::domain::speech::{OrchestratorSettings, SpeakerLabels};
use crate::infrastructure::repositories::gemini_synthesis_repository::{
    DEFAULT_GEMINI_BASE_URL, DEFAULT_GEMINI_MODEL,
};

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("missing required environment variable {0}")]
    Missing(&'static str),
    #[error("invalid value '{value}' for {key}")]
    Invalid { key: &'static str, value: String },
}

#[derive(Debug, Clone, PartialEq)]
pub enum LogFormat {
    Pretty,
    Json,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub log_format: LogFormat,
    pub cors_allowed_origin: Option<String>,
    // Gemini
    pub gemini_api_key: Option<String>,
    pub gemini_model: String,
    pub gemini_base_url: String,
    pub synthesis_timeout: Duration,
    // Audio output
    pub player_command: String,
    pub player_args: Vec<String>,
    pub output_dir: Option<PathBuf>,
    // Speech
    pub speech_cache_enabled: bool,
    pub require_speakers: bool,
    pub speaker_a_label: String,
    pub speaker_b_label: String,
    pub catalog_path: Option<PathBuf>,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from an arbitrary variable source; unset and empty values fall
    /// back to defaults
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let config = Config {
            host: var("HOST").unwrap_or_else(|| "127.0.0.1".to_string()),
            port: parse_or("PORT", var("PORT"), 8080)?,
            log_format: match var("LOG_FORMAT").as_deref() {
                Some("json") => LogFormat::Json,
                _ => LogFormat::Pretty,
            },
            cors_allowed_origin: var("CORS_ALLOWED_ORIGIN"),
            gemini_api_key: var("GEMINI_API_KEY"),
            gemini_model: var("GEMINI_MODEL").unwrap_or_else(|| DEFAULT_GEMINI_MODEL.to_string()),
            gemini_base_url: var("GEMINI_BASE_URL")
                .unwrap_or_else(|| DEFAULT_GEMINI_BASE_URL.to_string()),
            synthesis_timeout: Duration::from_secs(parse_or(
                "SYNTHESIS_TIMEOUT_SECS",
                var("SYNTHESIS_TIMEOUT_SECS"),
                60,
            )?),
            player_command: var("PLAYER_COMMAND").unwrap_or_else(|| "aplay".to_string()),
            player_args: var("PLAYER_ARGS")
                .unwrap_or_else(|| "-q".to_string())
                .split_whitespace()
                .map(str::to_string)
                .collect(),
            output_dir: var("OUTPUT_DIR").map(PathBuf::from),
            speech_cache_enabled: parse_bool(
                "SPEECH_CACHE_ENABLED",
                var("SPEECH_CACHE_ENABLED"),
                false,
            )?,
            require_speakers: parse_bool("REQUIRE_SPEAKERS", var("REQUIRE_SPEAKERS"), true)?,
            speaker_a_label: var("SPEAKER_A_LABEL")
                .unwrap_or_else(|| DEFAULT_SPEAKER_A_LABEL.to_string()),
            speaker_b_label: var("SPEAKER_B_LABEL")
                .unwrap_or_else(|| DEFAULT_SPEAKER_B_LABEL.to_string()),
            catalog_path: var("CATALOG_PATH").map(PathBuf::from),
        };

        if config.synthesis_timeout.is_zero() {
            return Err(ConfigError::Invalid {
                key: "SYNTHESIS_TIMEOUT_SECS",
                value: "0".to_string(),
            });
        }
        // Markers match case-insensitively, so the labels must differ ignoring case
        if config.speaker_a_label.trim().to_lowercase()
            == config.speaker_b_label.trim().to_lowercase()
        {
            return Err(ConfigError::Invalid {
                key: "SPEAKER_B_LABEL",
                value: config.speaker_b_label,
            });
        }

        Ok(config)
    }

    /// The API key is only needed once a real backend is wired
    pub fn require_api_key(&self) -> Result<&str, ConfigError> {
        self.gemini_api_key
            .as_deref()
            .ok_or(ConfigError::Missing("GEMINI_API_KEY"))
    }

    pub fn speaker_labels(&self) -> SpeakerLabels {
        SpeakerLabels::new(
            self.speaker_a_label.trim(),
            self.speaker_b_label.trim(),
        )
    }

    pub fn orchestrator_settings(&self) -> OrchestratorSettings {
        OrchestratorSettings {
            speaker_labels: self.speaker_labels(),
            require_speakers: self.require_speakers,
            synthesis_timeout: self.synthesis_timeout,
            cache_enabled: self.speech_cache_enabled,
        }
    }
}

fn parse_or<T: std::str::FromStr>(
    key: &'static str,
    value: Option<String>,
    default: T,
) -> Result<T, ConfigError> {
    match value {
        Some(v) => v
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { key, value: v }),
        None => Ok(default),
    }
}

fn parse_bool(
    key: &'static str,
    value: Option<String>,
    default: bool,
) -> Result<bool, ConfigError> {
    let Some(value) = value else {
        return Ok(default);
    };

    match value.trim().to_lowercase().as_str() {
        "true" | "1" | "yes" => Ok(true),
        "false" | "0" | "no" => Ok(false),
        _ => Err(ConfigError::Invalid { key, value }),
    }
}
