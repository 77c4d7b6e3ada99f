use std::path::PathBuf;

use anyhow::{Context, Result};

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub rust_log: String,
    pub data_dir: PathBuf,
    pub search_cache_ttl_secs: u64,
    pub http_timeout_secs: u64,
    pub aggregator_url: Option<String>,
    pub greenhouse_boards: Vec<String>,
    pub lever_companies: Vec<String>,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            port: parse_env("PORT", 8080)?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            data_dir: std::env::var("DATA_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("data")),
            search_cache_ttl_secs: parse_env("SEARCH_CACHE_TTL_SECS", 30 * 60)?,
            http_timeout_secs: parse_env("HTTP_TIMEOUT_SECS", 20)?,
            aggregator_url: std::env::var("AGGREGATOR_URL")
                .ok()
                .filter(|url| !url.trim().is_empty()),
            greenhouse_boards: parse_list(&std::env::var("GREENHOUSE_BOARDS").unwrap_or_default()),
            lever_companies: parse_list(&std::env::var("LEVER_COMPANIES").unwrap_or_default()),
        })
    }
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

/// Splits a comma-separated list, dropping blanks.
pub fn parse_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}
