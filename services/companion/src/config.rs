//! services/companion/src/config.rs
//!
//! Defines the service configuration structure and loading logic.
//!
//! All configuration is loaded from environment variables at startup. The `.env`
//! file is used for local development.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use mendi_core::domain::{AiPersonality, AiSettings, Provider};
use tracing::Level;

/// A custom error type for configuration loading failures.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing the environment variable {0}")]
    MissingVar(String),
    #[error("Invalid value for the environment variable {0}: {1}")]
    InvalidValue(String, String),
}

/// Holds all configuration loaded from the environment at startup.
#[derive(Clone, Debug)]
pub struct Config {
    pub bind_address: SocketAddr,
    pub log_level: Level,
    pub data_dir: PathBuf,
    pub openai_api_key: Option<String>,
    pub ai_provider: Provider,
    pub chat_model: String,
    pub emotion_model: String,
    pub sst_model: String,
    pub tts_voice: String,
    pub ai_temperature: f32,
    pub ai_max_tokens: u32,
    pub llm_timeout: Duration,
    pub cors_origin: String,
}

impl Config {
    /// Loads configuration from environment variables.
    ///
    /// It will look for a `.env` file in the current directory for development,
    /// but this is skipped in test environments to ensure tests are hermetic.
    pub fn from_env() -> Result<Self, ConfigError> {
        if !cfg!(test) {
            dotenvy::dotenv().ok();
        }
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from any key lookup; unset keys take their defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let or_default = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        // --- Server Settings ---
        let bind_address = parse("BIND_ADDRESS", &or_default("BIND_ADDRESS", "0.0.0.0:3000"))?;

        let log_level_str = or_default("RUST_LOG", "INFO");
        let log_level = log_level_str.parse::<Level>().map_err(|_| {
            ConfigError::InvalidValue(
                "RUST_LOG".to_string(),
                format!("'{}' is not a valid log level", log_level_str),
            )
        })?;

        let data_dir = PathBuf::from(or_default("DATA_DIR", "./data"));
        let cors_origin = or_default("CORS_ORIGIN", "http://localhost:3000");

        // --- Provider Settings ---
        let openai_api_key = lookup("OPENAI_API_KEY").filter(|k| !k.trim().is_empty());
        let ai_provider = match lookup("AI_PROVIDER").as_deref().map(str::to_lowercase).as_deref() {
            Some("openai") if openai_api_key.is_none() => {
                return Err(ConfigError::MissingVar("OPENAI_API_KEY".to_string()))
            }
            Some("openai") => Provider::OpenAi,
            Some("mock") => Provider::Mock,
            Some(other) => {
                return Err(ConfigError::InvalidValue(
                    "AI_PROVIDER".to_string(),
                    format!("'{}' is not one of openai, mock", other),
                ))
            }
            None if openai_api_key.is_some() => Provider::OpenAi,
            None => Provider::Mock,
        };

        // --- Adapter-specific Settings ---
        let chat_model = or_default("CHAT_MODEL", "gpt-4o-mini");
        let emotion_model = or_default("EMOTION_MODEL", "gpt-4o-mini");
        let sst_model = or_default("SST_MODEL", "whisper-1");
        let tts_voice = or_default("TTS_VOICE", "alloy");
        let ai_temperature: f32 = parse("AI_TEMPERATURE", &or_default("AI_TEMPERATURE", "0.7"))?;
        let ai_max_tokens: u32 = parse("AI_MAX_TOKENS", &or_default("AI_MAX_TOKENS", "1000"))?;
        let timeout_secs: u64 = parse("LLM_TIMEOUT_SECS", &or_default("LLM_TIMEOUT_SECS", "20"))?;

        Ok(Self {
            bind_address,
            log_level,
            data_dir,
            openai_api_key,
            ai_provider,
            chat_model,
            emotion_model,
            sst_model,
            tts_voice,
            ai_temperature,
            ai_max_tokens,
            llm_timeout: Duration::from_secs(timeout_secs),
            cors_origin,
        })
    }

    /// The explicit settings handed to the reply generator.
    pub fn ai_settings(&self) -> AiSettings {
        AiSettings {
            provider: self.ai_provider,
            model: self.chat_model.clone(),
            api_key: self.openai_api_key.clone(),
            temperature: self.ai_temperature,
            max_tokens: self.ai_max_tokens,
            system_prompt: AiPersonality::Empathetic.system_prompt().to_string(),
        }
    }

    /// True when remote adapters should be built at all.
    pub fn remote_enabled(&self) -> bool {
        self.ai_settings().remote_enabled()
    }
}

fn parse<T>(key: &str, raw: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    raw.trim()
        .parse::<T>()
        .map_err(|e| ConfigError::InvalidValue(key.to_string(), e.to_string()))
}
