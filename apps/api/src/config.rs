use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};

/// Application configuration loaded from environment variables.
/// Fails at startup if required variables are missing.
#[derive(Debug, Clone)]
pub struct Config {
    pub gemini_api_key: String,
    pub gemini_api_base: String,
    pub host: String,
    pub port: u16,
    pub rust_log: String,
    /// Holds `resume.html`, `letter.html` and `style.css`.
    pub resume_dir: PathBuf,
    pub output_dir: PathBuf,
    pub static_dir: PathBuf,
    pub chromium_bin: String,
    /// Optional CSV spreadsheet that gets one row per generated application.
    pub application_log: Option<PathBuf>,
    pub message_queue_max_size: usize,
    pub stream_timeout: Duration,
    pub ping_interval: Duration,
    pub max_content_length: usize,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            gemini_api_key: require_env("GEMINI_API_KEY")?,
            gemini_api_base: env_or("GEMINI_API_BASE", crate::llm_client::GEMINI_API_BASE),
            host: env_or("HOST", "127.0.0.1"),
            port: parse_env("PORT", 5000)?,
            rust_log: env_or("RUST_LOG", "info"),
            resume_dir: PathBuf::from(env_or("RESUME_DIR", "resume")),
            output_dir: PathBuf::from(env_or("OUTPUT_DIR", "resume_gen")),
            static_dir: PathBuf::from(env_or("STATIC_DIR", "static")),
            chromium_bin: env_or("CHROMIUM_BIN", "chromium"),
            application_log: std::env::var("APPLICATION_LOG")
                .ok()
                .filter(|v| !v.trim().is_empty())
                .map(PathBuf::from),
            message_queue_max_size: parse_env("MESSAGE_QUEUE_MAX_SIZE", 100)?,
            stream_timeout: Duration::from_secs(parse_env("STREAM_TIMEOUT_SECS", 300)?),
            ping_interval: Duration::from_secs(parse_env("PING_INTERVAL_SECS", 5)?),
            max_content_length: parse_env("MAX_CONTENT_LENGTH", 10 * 1024 * 1024)?,
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("{key} must be a valid number, got '{raw}'")),
        Err(_) => Ok(default),
    }
}
