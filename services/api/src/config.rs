use callrelay_core::{
    AgentPrompts, DurationPolicy, protocol::realtime::VoiceSettings,
};
use secrecy::SecretString;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::Level;

/// A custom error type for configuration loading failures.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingVar(String),
    #[error("Invalid value for environment variable {0}: {1}")]
    InvalidValue(String, String),
}

/// Holds all configuration loaded from the environment at startup.
#[derive(Clone, Debug)]
pub struct Config {
    pub bind_address: SocketAddr,
    /// Public `https://` origin the telephony provider reaches us on.
    pub public_base_url: Option<String>,
    pub openai_api_key: SecretString,
    pub realtime_url: String,
    pub realtime_model: String,
    pub voice: String,
    pub transcription_model: String,
    pub policy: DurationPolicy,
    pub log_level: Level,
    pub prompts_path: PathBuf,
}

impl Config {
    /// Loads configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Only load from .env in non-test mode to avoid contamination
        if !cfg!(test) {
            dotenvy::dotenv().ok();
        }

        let bind_address_str = std::env::var("BIND_ADDRESS").unwrap_or_else(|_| {
            let port = std::env::var("PORT").unwrap_or_else(|_| "3000".to_string());
            format!("0.0.0.0:{}", port)
        });
        let bind_address = bind_address_str
            .parse::<SocketAddr>()
            .map_err(|e| ConfigError::InvalidValue("BIND_ADDRESS".to_string(), e.to_string()))?;

        let public_base_url = std::env::var("PUBLIC_BASE_URL")
            .ok()
            .filter(|url| !url.trim().is_empty());

        let openai_api_key = std::env::var("OPENAI_API_KEY")
            .map(SecretString::from)
            .map_err(|_| ConfigError::MissingVar("OPENAI_API_KEY".to_string()))?;

        let realtime_url = std::env::var("REALTIME_URL")
            .unwrap_or_else(|_| "wss://api.openai.com/v1/realtime".to_string());
        let realtime_model = std::env::var("REALTIME_MODEL")
            .unwrap_or_else(|_| "gpt-4o-realtime-preview".to_string());

        let defaults = VoiceSettings::default();
        let voice = std::env::var("REALTIME_VOICE").unwrap_or(defaults.voice);
        let transcription_model =
            std::env::var("TRANSCRIPTION_MODEL").unwrap_or(defaults.transcription_model);

        let soft_cap = parse_secs("SOFT_CAP_SECS", 45)?;
        let hard_cap = parse_secs("HARD_CAP_SECS", 60)?;
        let policy = DurationPolicy::new(soft_cap, hard_cap)
            .map_err(|e| ConfigError::InvalidValue("SOFT_CAP_SECS".to_string(), e.to_string()))?;

        let log_level_str = std::env::var("RUST_LOG").unwrap_or_else(|_| "INFO".to_string());
        let log_level = log_level_str.parse::<Level>().map_err(|_| {
            ConfigError::InvalidValue(
                "RUST_LOG".to_string(),
                format!("'{}' is not a valid log level", log_level_str),
            )
        })?;

        let prompts_path = std::env::var("PROMPTS_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("./prompts"));

        Ok(Self {
            bind_address,
            public_base_url,
            openai_api_key,
            realtime_url,
            realtime_model,
            voice,
            transcription_model,
            policy,
            log_level,
            prompts_path,
        })
    }

    /// The realtime WebSocket URL including the model query parameter.
    pub fn realtime_endpoint(&self) -> String {
        format!("{}?model={}", self.realtime_url, self.realtime_model)
    }

    pub fn voice_settings(&self) -> VoiceSettings {
        VoiceSettings {
            voice: self.voice.clone(),
            transcription_model: self.transcription_model.clone(),
        }
    }
}

fn parse_secs(var: &str, default: u64) -> Result<Duration, ConfigError> {
    match std::env::var(var) {
        Ok(value) => value
            .trim()
            .parse::<u64>()
            .map(Duration::from_secs)
            .map_err(|e| ConfigError::InvalidValue(var.to_string(), e.to_string())),
        Err(_) => Ok(Duration::from_secs(default)),
    }
}

/// Loads prompt overrides from `instructions.md`, `greeting.md` and
/// `wrap_up.md` in `dir`. Missing files keep the built-in text.
pub fn load_prompts(dir: &Path) -> std::io::Result<AgentPrompts> {
    let mut prompts = AgentPrompts::default();
    if !dir.is_dir() {
        return Ok(prompts);
    }
    let slots = [
        ("instructions.md", &mut prompts.instructions),
        ("greeting.md", &mut prompts.greeting),
        ("wrap_up.md", &mut prompts.wrap_up),
    ];
    for (file, slot) in slots {
        let path = dir.join(file);
        if path.is_file() {
            let content = std::fs::read_to_string(&path)?;
            let content = content.trim();
            if !content.is_empty() {
                *slot = content.to_string();
            }
        }
    }
    Ok(prompts)
}
