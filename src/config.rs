use serde::Deserialize;
use std::env;
use std::sync::OnceLock;
use thiserror::Error;

/// Errors encountered while loading configuration from environment variables.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Environment variable contained a value that could not be parsed.
    #[error("Invalid value for environment variable: {0}")]
    InvalidValue(String),
}

/// Default base URL of the hosted generative-language service.
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";

const DEFAULT_MODEL: &str = "gemini-3-flash-preview";
const DEFAULT_POLL_INTERVAL_MS: u64 = 2_000;
const DEFAULT_POLL_MAX_ATTEMPTS: u32 = 150;

/// Runtime configuration for the docchat server.
#[derive(Debug, Deserialize)]
pub struct Config {
    /// Base URL of the generative-language service.
    pub genai_base_url: String,
    /// Optional credential used when a session does not supply its own.
    pub genai_api_key: Option<String>,
    /// Model identifier used for summarization and chat calls.
    pub genai_model: String,
    /// Delay between upload processing-state checks, in milliseconds.
    pub upload_poll_interval_ms: u64,
    /// Number of state checks performed before an upload is declared stuck.
    pub upload_poll_max_attempts: u32,
    /// Optional override for the HTTP server port.
    pub server_port: Option<u16>,
}

impl Config {
    /// Load configuration from environment variables, performing validation along the way.
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            genai_base_url: load_env_optional("GENAI_BASE_URL")
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            genai_api_key: load_env_optional("GOOGLE_API_KEY"),
            genai_model: load_env_optional("GENAI_MODEL")
                .unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            upload_poll_interval_ms: parse_env_optional(
                "UPLOAD_POLL_INTERVAL_MS",
                DEFAULT_POLL_INTERVAL_MS,
            )?,
            upload_poll_max_attempts: parse_env_optional(
                "UPLOAD_POLL_MAX_ATTEMPTS",
                DEFAULT_POLL_MAX_ATTEMPTS,
            )?,
            server_port: load_env_optional("SERVER_PORT")
                .map(|value| {
                    value
                        .parse()
                        .map_err(|_| ConfigError::InvalidValue("SERVER_PORT".into()))
                })
                .transpose()?,
        })
    }
}

fn load_env_optional(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}

fn parse_env_optional<T: std::str::FromStr>(key: &str, default: T) -> Result<T, ConfigError> {
    load_env_optional(key)
        .map(|value| {
            value
                .parse()
                .map_err(|_| ConfigError::InvalidValue(key.to_string()))
        })
        .transpose()
        .map(|value| value.unwrap_or(default))
}

/// Global configuration cache populated during process start.
pub static CONFIG: OnceLock<Config> = OnceLock::new();

/// Retrieve the loaded configuration, panicking if initialization has not occurred.
pub fn get_config() -> &'static Config {
    CONFIG.get().expect("Config not initialized")
}

/// Load configuration from the environment and install it in the global cache.
pub fn init_config() {
    dotenvy::dotenv().ok();
    let config = Config::from_env().expect("Failed to load config from environment");
    tracing::debug!(
        base_url = %config.genai_base_url,
        model = %config.genai_model,
        has_api_key = config.genai_api_key.is_some(),
        poll_interval_ms = config.upload_poll_interval_ms,
        poll_max_attempts = config.upload_poll_max_attempts,
        server_port = ?config.server_port,
        "Loaded configuration"
    );
    CONFIG.set(config).expect("Failed to set config");
}
