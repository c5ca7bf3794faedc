use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, Result};

const DEFAULT_BACKEND_URL: &str = "http://localhost:8000";
const DEFAULT_RESUME_PARSER_URL: &str = "http://localhost:5000";
const DEFAULT_SESSION_FILE: &str = ".mentor/session.json";

/// Application configuration loaded from environment variables.
/// Every key has a default except the optional identity and archive settings.
#[derive(Debug, Clone)]
pub struct Config {
    pub backend_url: String,
    pub resume_parser_url: String,
    pub port: u16,
    pub rust_log: String,
    pub session_file: PathBuf,
    /// Conversation archive. Archiving is disabled when unset.
    pub conversations_file: Option<PathBuf>,
    /// Pause between the profile summary and the resume prompt.
    pub resume_prompt_delay: Duration,
    pub http_timeout: Duration,
    pub user_email: Option<String>,
    pub username: Option<String>,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from an arbitrary key lookup so tests never touch the process env.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let optional = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        Ok(Config {
            backend_url: trim_base_url(
                optional("BACKEND_URL").unwrap_or_else(|| DEFAULT_BACKEND_URL.to_string()),
            ),
            resume_parser_url: trim_base_url(
                optional("RESUME_PARSER_URL")
                    .unwrap_or_else(|| DEFAULT_RESUME_PARSER_URL.to_string()),
            ),
            port: parse_or(&optional, "PORT", 8080)?,
            rust_log: optional("RUST_LOG").unwrap_or_else(|| "info".to_string()),
            session_file: optional("SESSION_FILE")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_SESSION_FILE)),
            conversations_file: optional("CONVERSATIONS_FILE").map(PathBuf::from),
            resume_prompt_delay: Duration::from_millis(parse_or(
                &optional,
                "RESUME_PROMPT_DELAY_MS",
                1500,
            )?),
            http_timeout: Duration::from_secs(parse_or(&optional, "HTTP_TIMEOUT_SECS", 60)?),
            user_email: optional("MENTOR_USER_EMAIL"),
            username: optional("MENTOR_USERNAME"),
        })
    }
}

fn parse_or<T, F>(optional: &F, key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
    F: Fn(&str) -> Option<String>,
{
    match optional(key) {
        Some(raw) => raw
            .parse::<T>()
            .with_context(|| format!("Environment variable '{key}' has an invalid value '{raw}'")),
        None => Ok(default),
    }
}

fn trim_base_url(url: String) -> String {
    url.trim_end_matches('/').to_string()
}
