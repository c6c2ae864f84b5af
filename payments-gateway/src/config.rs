use std::env;
use std::time::Duration;

use thiserror::Error;

pub const DEFAULT_STRIPE_API_BASE: &str = "https://api.stripe.com";
pub const DEFAULT_CORS_ORIGINS: &[&str] = &[
    "http://localhost:3000",
    "http://localhost:3001",
    "http://localhost:5173",
];

const REQUIRED_KEYS: &[&str] = &[
    "PORT",
    "STRIPE_SECRET",
    "STRIPE_WEBHOOK_SECRET",
    "STRIPE_SUCCESS_URL",
    "STRIPE_CANCEL_URL",
];

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Configuration validation error: missing required setting(s): {}", .0.join(", "))]
    Missing(Vec<&'static str>),
    #[error("Configuration validation error: {key} has invalid value '{value}'")]
    Invalid { key: &'static str, value: String },
}

#[derive(Debug, Clone)]
pub struct GatewayConfig {
    pub host: String,
    pub port: u16,
    pub stripe_secret: String,
    pub stripe_webhook_secret: String,
    pub stripe_success_url: String,
    pub stripe_cancel_url: String,
    pub stripe_api_base: String,
    pub stripe_timeout: Duration,
    /// Maximum accepted webhook age in seconds; 0 disables the check.
    pub webhook_tolerance_secs: i64,
    pub bus_servers: Vec<String>,
    pub cors_allowed_origins: Vec<String>,
}

impl GatewayConfig {
    /// Load from the process environment, reading a local `.env` first when present.
    pub fn from_env() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        // Empty values count as absent.
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let missing: Vec<&'static str> = REQUIRED_KEYS
            .iter()
            .copied()
            .filter(|key| get(*key).is_none())
            .collect();
        if !missing.is_empty() {
            return Err(ConfigError::Missing(missing));
        }
        let required = |key: &'static str| get(key).unwrap_or_default();

        let port = parse_number::<u16>("PORT", required("PORT"))?;
        let stripe_timeout_ms = match get("STRIPE_TIMEOUT_MS") {
            Some(raw) => parse_number::<u64>("STRIPE_TIMEOUT_MS", raw)?,
            None => 15_000,
        };
        let webhook_tolerance_secs = match get("STRIPE_WEBHOOK_TOLERANCE_SECS") {
            Some(raw) => parse_number::<i64>("STRIPE_WEBHOOK_TOLERANCE_SECS", raw)?,
            None => 300,
        };
        let cors_allowed_origins = get("CORS_ALLOWED_ORIGINS")
            .map(|raw| split_list(&raw))
            .unwrap_or_else(|| DEFAULT_CORS_ORIGINS.iter().map(|s| s.to_string()).collect());

        Ok(Self {
            host: get("HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            port,
            stripe_secret: required("STRIPE_SECRET"),
            stripe_webhook_secret: required("STRIPE_WEBHOOK_SECRET"),
            stripe_success_url: required("STRIPE_SUCCESS_URL"),
            stripe_cancel_url: required("STRIPE_CANCEL_URL"),
            stripe_api_base: get("STRIPE_API_BASE")
                .map(|base| base.trim_end_matches('/').to_string())
                .unwrap_or_else(|| DEFAULT_STRIPE_API_BASE.to_string()),
            stripe_timeout: Duration::from_millis(stripe_timeout_ms.max(1)),
            webhook_tolerance_secs: webhook_tolerance_secs.max(0),
            bus_servers: get("KAFKA_BOOTSTRAP").map(|raw| split_list(&raw)).unwrap_or_default(),
            cors_allowed_origins,
        })
    }
}

fn parse_number<T: std::str::FromStr>(key: &'static str, raw: String) -> Result<T, ConfigError> {
    raw.trim()
        .parse::<T>()
        .map_err(|_| ConfigError::Invalid { key, value: raw })
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_list_drops_blank_entries() {
        assert_eq!(split_list(" a:9092, ,b:9092,"), vec!["a:9092", "b:9092"]);
        assert!(split_list("").is_empty());
    }
}
