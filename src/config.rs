//! Application configuration loaded from environment variables.
//!
//! Loaded once at startup; a `.env` file is honored for local development.

use secrecy::SecretString;
use std::env;
use std::str::FromStr;
use std::time::Duration;

/// Default model: a free-tier instruct model on an OpenAI-compatible router.
pub const DEFAULT_MODEL: &str = "meta-llama/llama-3.3-8b-instruct:free";
pub const DEFAULT_BASE_URL: &str = "https://openrouter.ai/api/v1";
pub const DEFAULT_TIMEOUT_MS: u64 = 30_000;
pub const DEFAULT_MAX_RETRIES: u32 = 3;
pub const DEFAULT_CACHE_TTL_MS: u64 = 15 * 60 * 1000;
pub const DEFAULT_TEMPERATURE: f32 = 0.7;
pub const DEFAULT_MAX_TOKENS: u32 = 150;

/// Application configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// Server port
    pub port: u16,
    /// Frontend URL allowed by CORS
    pub frontend_url: String,
    /// JWT key used to verify session tokens (raw bytes)
    pub jwt_signing_key: Vec<u8>,
    /// Optional JSON file used to seed the activity store
    pub activity_data_path: Option<String>,
    /// Text-generation settings
    pub ai: AiConfig,
}

/// Settings for the motivational insight generator.
#[derive(Debug, Clone)]
pub struct AiConfig {
    /// When false, only rule-based messages are produced and no network
    /// calls are made.
    pub enabled: bool,
    pub api_key: SecretString,
    pub model: String,
    pub base_url: String,
    /// Per-attempt deadline
    pub timeout_ms: u64,
    /// Total attempts per generation, including the first
    pub max_retries: u32,
    pub cache_ttl_ms: u64,
    pub temperature: f32,
    pub max_tokens: u32,
}

impl AiConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_millis(self.cache_ttl_ms)
    }
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            api_key: SecretString::from("test_api_key".to_string()),
            model: DEFAULT_MODEL.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_ms: DEFAULT_TIMEOUT_MS,
            max_retries: DEFAULT_MAX_RETRIES,
            cache_ttl_ms: DEFAULT_CACHE_TTL_MS,
            temperature: DEFAULT_TEMPERATURE,
            max_tokens: DEFAULT_MAX_TOKENS,
        }
    }
}

impl Config {
    /// Offline configuration for tests.
    pub fn test_default() -> Self {
        Self {
            port: 8080,
            frontend_url: "http://localhost:5173".to_string(),
            jwt_signing_key: b"test_jwt_key_32_bytes_minimum!!".to_vec(),
            activity_data_path: None,
            ai: AiConfig::default(),
        }
    }

    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        let enabled = parse_var("AI_INSIGHTS_ENABLED", true)?;

        // The key is only required when the generator may call out.
        let api_key = match env::var("AI_API_KEY") {
            Ok(key) => SecretString::from(key.trim().to_string()),
            Err(_) if !enabled => SecretString::from(String::new()),
            Err(_) => return Err(ConfigError::Missing("AI_API_KEY")),
        };

        Ok(Self {
            port: parse_var("PORT", 8080)?,
            frontend_url: env::var("FRONTEND_URL")
                .unwrap_or_else(|_| "http://localhost:5173".to_string()),
            jwt_signing_key: env::var("JWT_SIGNING_KEY")
                .map_err(|_| ConfigError::Missing("JWT_SIGNING_KEY"))?
                .into_bytes(),
            activity_data_path: env::var("ACTIVITY_DATA_PATH").ok(),
            ai: AiConfig {
                enabled,
                api_key,
                model: env::var("AI_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_string()),
                base_url: env::var("AI_BASE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string()),
                timeout_ms: parse_var("AI_TIMEOUT_MS", DEFAULT_TIMEOUT_MS)?,
                max_retries: parse_var("AI_MAX_RETRIES", DEFAULT_MAX_RETRIES)?,
                cache_ttl_ms: parse_var("AI_CACHE_TTL_MS", DEFAULT_CACHE_TTL_MS)?,
                temperature: parse_var("AI_TEMPERATURE", DEFAULT_TEMPERATURE)?,
                max_tokens: parse_var("AI_MAX_TOKENS", DEFAULT_MAX_TOKENS)?,
            },
        })
    }
}

/// Read an optional variable, falling back to `default` when unset.
fn parse_var<T: FromStr>(name: &'static str, default: T) -> Result<T, ConfigError> {
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { name, value: raw }),
        Err(_) => Ok(default),
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),

    #[error("Invalid value for {name}: {value:?}")]
    Invalid { name: &'static str, value: String },
}
