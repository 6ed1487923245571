use std::time::Duration;
use tracing::Level;
use viral_core::platform::DEFAULT_PASS_THRESHOLD;

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
    pub github_token: String,
    pub api_base: String,
    pub chat_model: String,
    pub temperature: f32,
    pub request_timeout: Duration,
    pub pass_threshold: f64,
    pub trends_geo: String,
    pub log_level: Level,
}

impl Config {
    /// Loads configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Only load from .env in non-test mode to avoid contamination
        if !cfg!(test) {
            dotenvy::dotenv().ok();
        }

        let github_token = std::env::var("GITHUB_TOKEN")
            .ok()
            .filter(|t| !t.trim().is_empty())
            .ok_or_else(|| {
                ConfigError::MissingVar(
                    "GITHUB_TOKEN (create a .env file with your GitHub personal access token)"
                        .to_string(),
                )
            })?;

        let api_base = std::env::var("API_BASE")
            .unwrap_or_else(|_| "https://models.github.ai/inference".to_string());

        let chat_model =
            std::env::var("CHAT_MODEL").unwrap_or_else(|_| "openai/gpt-4.1-mini".to_string());

        let temperature = parse_var("TEMPERATURE", 0.8_f32)?;
        if !(0.0..=2.0).contains(&temperature) {
            return Err(ConfigError::InvalidValue(
                "TEMPERATURE".to_string(),
                format!("{} is outside 0.0..=2.0", temperature),
            ));
        }

        let timeout_secs = parse_var("REQUEST_TIMEOUT_SECS", 60_u64)?;
        if timeout_secs == 0 {
            return Err(ConfigError::InvalidValue(
                "REQUEST_TIMEOUT_SECS".to_string(),
                "must be greater than zero".to_string(),
            ));
        }

        let pass_threshold = parse_var("PASS_THRESHOLD", DEFAULT_PASS_THRESHOLD)?;
        if !(0.0..=100.0).contains(&pass_threshold) {
            return Err(ConfigError::InvalidValue(
                "PASS_THRESHOLD".to_string(),
                format!("{} is outside 0..=100", pass_threshold),
            ));
        }

        let trends_geo = std::env::var("TRENDS_GEO").unwrap_or_else(|_| "US".to_string());

        let log_level_str = std::env::var("RUST_LOG").unwrap_or_else(|_| "WARN".to_string());
        let log_level = log_level_str.parse::<Level>().map_err(|_| {
            ConfigError::InvalidValue(
                "RUST_LOG".to_string(),
                format!("'{}' is not a valid log level", log_level_str),
            )
        })?;

        Ok(Self {
            github_token,
            api_base,
            chat_model,
            temperature,
            request_timeout: Duration::from_secs(timeout_secs),
            pass_threshold,
            trends_geo,
            log_level,
        })
    }
}

fn parse_var<T>(name: &str, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match std::env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|e| ConfigError::InvalidValue(name.to_string(), e.to_string())),
        Err(_) => Ok(default),
    }
}
