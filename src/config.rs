//! Client configuration parsed from environment variables.

use std::path::PathBuf;

pub const DEFAULT_API_BASE_URL: &str = "http://localhost:8000";
pub const DEFAULT_TOKEN_FILE: &str = ".feedback-session.json";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid base URL '{0}': expected http:// or https://")]
    InvalidBaseUrl(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Backend origin without a trailing slash.
    pub base_url: String,
    /// File the bearer token is persisted in.
    pub token_file: PathBuf,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self { base_url: DEFAULT_API_BASE_URL.to_owned(), token_file: PathBuf::from(DEFAULT_TOKEN_FILE) }
    }
}

impl ClientConfig {
    /// Build typed client config from environment variables.
    ///
    /// Optional:
    /// - `FEEDBACK_API_BASE_URL`: default `http://localhost:8000`
    /// - `FEEDBACK_TOKEN_FILE`: default `.feedback-session.json`
    ///
    /// # Errors
    ///
    /// Returns an error if the base URL is not an http(s) URL.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_values(
            std::env::var("FEEDBACK_API_BASE_URL").ok().as_deref(),
            std::env::var("FEEDBACK_TOKEN_FILE").ok().as_deref(),
        )
    }

    /// Build config from explicit optional values, applying defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the base URL is not an http(s) URL.
    pub fn from_values(base_url: Option<&str>, token_file: Option<&str>) -> Result<Self, ConfigError> {
        let base_url = normalize_base_url(base_url.unwrap_or(DEFAULT_API_BASE_URL))?;
        let token_file = token_file
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map_or_else(|| PathBuf::from(DEFAULT_TOKEN_FILE), PathBuf::from);
        Ok(Self { base_url, token_file })
    }
}

fn normalize_base_url(raw: &str) -> Result<String, ConfigError> {
    let trimmed = raw.trim().trim_end_matches('/');
    if !(trimmed.starts_with("http://") || trimmed.starts_with("https://")) {
        return Err(ConfigError::InvalidBaseUrl(raw.to_owned()));
    }
    Ok(trimmed.to_owned())
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
