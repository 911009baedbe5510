//! Application configuration loaded from environment variables.
//!
//! Everything is read once at startup. Missing credentials are fatal.

use std::env;
use std::time::Duration;

const DEFAULT_PORT: u16 = 8080;
const DEFAULT_UPSTREAM_TIMEOUT_SECS: u64 = 20;

/// Application configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// Server port
    pub port: u16,
    /// Frontend origin allowed by CORS
    pub frontend_url: String,

    /// Directus base URL (no trailing slash)
    pub directus_url: String,
    pub directus_admin_email: String,
    pub directus_admin_password: String,

    /// TikTok data API base URL
    pub tiktok_api_url: String,
    /// Value sent in the `x-access-key` header
    pub tiktok_api_key: String,
    /// Per-request timeout for the TikTok data API
    pub upstream_timeout: Duration,

    /// Number of users synced in parallel (1 = strictly sequential)
    pub sync_concurrency: usize,
    /// Run the sync in-process on this period, if set
    pub sync_interval_minutes: Option<u64>,
    /// Bearer token required by the update trigger, if set
    pub update_media_token: Option<String>,
}

impl Default for Config {
    /// Default config for testing only.
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            frontend_url: "http://localhost:3000".to_string(),
            directus_url: "http://localhost:8055".to_string(),
            directus_admin_email: "admin@example.com".to_string(),
            directus_admin_password: "test_password".to_string(),
            tiktok_api_url: "http://localhost:9000".to_string(),
            tiktok_api_key: "test_access_key".to_string(),
            upstream_timeout: Duration::from_secs(DEFAULT_UPSTREAM_TIMEOUT_SECS),
            sync_concurrency: 1,
            sync_interval_minutes: None,
            update_media_token: None,
        }
    }
}

impl Config {
    /// Config used by the test suites.
    pub fn test_default() -> Self {
        Self::default()
    }

    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        Ok(Self {
            port: parse_optional("PORT")?.unwrap_or(DEFAULT_PORT),
            frontend_url: env::var("FRONTEND_URL")
                .unwrap_or_else(|_| "http://localhost:3000".to_string()),

            directus_url: required("DIRECTUS_URL")?
                .trim_end_matches('/')
                .to_string(),
            directus_admin_email: required("DIRECTUS_ADMIN_EMAIL")?,
            directus_admin_password: required("DIRECTUS_ADMIN_PASSWORD")?,

            tiktok_api_url: required("TIKTOK_PAPI_URL")?
                .trim_end_matches('/')
                .to_string(),
            tiktok_api_key: required("TIKTOK_PAPI_KEY")?,
            upstream_timeout: Duration::from_secs(
                parse_optional("UPSTREAM_TIMEOUT_SECS")?.unwrap_or(DEFAULT_UPSTREAM_TIMEOUT_SECS),
            ),

            sync_concurrency: parse_optional::<usize>("SYNC_CONCURRENCY")?
                .unwrap_or(1)
                .max(1),
            sync_interval_minutes: parse_optional::<u64>("SYNC_INTERVAL_MINUTES")?
                .filter(|m| *m > 0),
            update_media_token: env::var("UPDATE_MEDIA_TOKEN")
                .ok()
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty()),
        })
    }
}

/// Read a required variable; blank values count as missing.
fn required(name: &'static str) -> Result<String, ConfigError> {
    env::var(name)
        .map(|v| v.trim().to_string())
        .ok()
        .filter(|v| !v.is_empty())
        .ok_or(ConfigError::Missing(name))
}

fn parse_optional<T: std::str::FromStr>(name: &'static str) -> Result<Option<T>, ConfigError> {
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::Invalid(name, raw)),
        Err(_) => Ok(None),
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),

    #[error("Invalid value for {0}: {1:?}")]
    Invalid(&'static str, String),
}
