// src/config.rs
use std::net::SocketAddr;
use std::time::Duration;

use thiserror::Error;

pub const DEFAULT_OLLAMA_URL: &str = "http://127.0.0.1:11434";
pub const DEFAULT_MODEL_NAME: &str = "gemma3:4b";
pub const MAX_PROBE_TIMEOUT_SECS: u64 = 5;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {key}: {value:?}")]
    Invalid { key: &'static str, value: String },

    #[error("{0} must not be empty")]
    Empty(&'static str),
}

/// Runtime settings, built once at startup and handed to the services.
#[derive(Debug, Clone)]
pub struct Config {
    pub bind_addr: SocketAddr,
    pub ollama_url: String,
    pub model_name: String,
    /// Program and arguments used to start the backend when it is down.
    pub launch_command: Vec<String>,
    pub probe_timeout: Duration,
    pub generate_timeout: Duration,
    /// Fixed wait after a launch attempt. Not tied to backend readiness.
    pub startup_grace: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 5000)),
            ollama_url: DEFAULT_OLLAMA_URL.to_string(),
            model_name: DEFAULT_MODEL_NAME.to_string(),
            launch_command: vec!["ollama".to_string(), "serve".to_string()],
            probe_timeout: Duration::from_secs(5),
            generate_timeout: Duration::from_secs(120),
            startup_grace: Duration::from_secs(3),
        }
    }
}

impl Config {
    /// Load `.env` if present, then overlay environment variables on the defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(value) = lookup("RELAY_BIND_ADDR") {
            config.bind_addr = value.parse().map_err(|_| ConfigError::Invalid {
                key: "RELAY_BIND_ADDR",
                value,
            })?;
        }
        if let Some(value) = lookup("OLLAMA_URL") {
            let trimmed = value.trim().trim_end_matches('/');
            if trimmed.is_empty() {
                return Err(ConfigError::Empty("OLLAMA_URL"));
            }
            config.ollama_url = trimmed.to_string();
        }
        if let Some(value) = lookup("OLLAMA_MODEL") {
            if value.trim().is_empty() {
                return Err(ConfigError::Empty("OLLAMA_MODEL"));
            }
            config.model_name = value.trim().to_string();
        }
        if let Some(value) = lookup("OLLAMA_LAUNCH_COMMAND") {
            let parts: Vec<String> = value.split_whitespace().map(str::to_string).collect();
            if parts.is_empty() {
                return Err(ConfigError::Empty("OLLAMA_LAUNCH_COMMAND"));
            }
            config.launch_command = parts;
        }
        let probe_max = Some(MAX_PROBE_TIMEOUT_SECS);
        if let Some(secs) = parse_secs(&lookup, "OLLAMA_PROBE_TIMEOUT_SECS", probe_max)? {
            config.probe_timeout = secs;
        }
        if let Some(secs) = parse_secs(&lookup, "OLLAMA_GENERATE_TIMEOUT_SECS", None)? {
            config.generate_timeout = secs;
        }
        if let Some(secs) = parse_secs(&lookup, "OLLAMA_STARTUP_GRACE_SECS", None)? {
            config.startup_grace = secs;
        }

        Ok(config)
    }
}

/// Whole seconds, at least 1 and at most `max` when given.
fn parse_secs<F>(
    lookup: &F,
    key: &'static str,
    max: Option<u64>,
) -> Result<Option<Duration>, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let Some(value) = lookup(key) else {
        return Ok(None);
    };

    match value.trim().parse::<u64>() {
        Ok(secs) if secs > 0 && max.is_none_or(|max| secs <= max) => {
            Ok(Some(Duration::from_secs(secs)))
        }
        _ => Err(ConfigError::Invalid { key, value }),
    }
}
