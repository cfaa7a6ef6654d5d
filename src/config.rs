use crate::errors::ConfigError;
use std::env;

pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_API_BASE_URL: &str = "http://127.0.0.1:8000/api/v1";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub port: u16,
    /// Base path every backend endpoint is appended to, without trailing slash.
    pub api_base_url: String,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(env::var("PORT").ok(), env::var("API_BASE_URL").ok())
    }

    pub fn from_vars(port: Option<String>, api_base_url: Option<String>) -> Result<Self, ConfigError> {
        let port = port
            .and_then(|value| value.trim().parse::<u16>().ok())
            .unwrap_or(DEFAULT_PORT);

        let api_base_url = match api_base_url {
            Some(value) => normalize_base_url(&value)?,
            None => DEFAULT_API_BASE_URL.to_string(),
        };

        Ok(Self { port, api_base_url })
    }
}

fn normalize_base_url(value: &str) -> Result<String, ConfigError> {
    let trimmed = value.trim().trim_end_matches('/');
    if trimmed.is_empty() {
        return Err(ConfigError::EmptyBaseUrl);
    }
    Ok(trimmed.to_string())
}
