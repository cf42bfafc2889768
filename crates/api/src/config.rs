//! # API Configuration Module
//!
//! Loads configuration for the Boxing24 API server from environment
//! variables, with defaults where appropriate.
//!
//! ## Environment Variables
//!
//! - `API_HOST`: The host address to bind the server to (default: "0.0.0.0")
//! - `API_PORT`: The port to listen on (default: 3000)
//! - `DATABASE_URL`: PostgreSQL connection string (required)
//! - `LOG_LEVEL`: Logging level (default: "info")
//! - `API_CORS_ORIGINS`: Comma-separated list of allowed CORS origins
//! - `API_REQUEST_TIMEOUT_SECONDS`: Per-request timeout (default: 30)
//! - `BOOKING_TIMEZONE`: IANA zone for work hours and slot labels (default: "Europe/Warsaw")
//! - `SLOT_MINUTES`: Slot granularity, at most a day (default: 60)
//! - `NOTIFY_WEBHOOK_URL` / `NOTIFY_WEBHOOK_TOKEN`: Client notification endpoint
//! - `CALENDAR_SYNC_URL` / `CALENDAR_SYNC_TOKEN`: External calendar mirror endpoint

use chrono_tz::Tz;
use eyre::{eyre, Result, WrapErr};
use std::env;
use tracing::Level;

use boxing24_core::availability::{DEFAULT_TIMEZONE, MAX_SLOT_MINUTES, SLOT_MINUTES};

/// Endpoint and credential for an outbound webhook
#[derive(Debug, Clone, PartialEq)]
pub struct WebhookConfig {
    pub url: String,
    pub token: String,
}

/// Configuration for the Boxing24 API server
///
/// # Example
///
/// ```
/// use eyre::Result;
/// use boxing24_api::config::ApiConfig;
///
/// fn example() -> Result<()> {
///     let config = ApiConfig::from_env()?;
///     println!("Starting server on {}:{}", config.host, config.port);
///     Ok(())
/// }
/// ```
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Host address for the API server (e.g., "127.0.0.1", "0.0.0.0")
    pub host: String,

    /// Port for the API server to listen on
    pub port: u16,

    /// PostgreSQL database connection string
    pub database_url: String,

    /// Log level for the application
    pub log_level: Level,

    /// CORS allowed origins (optional)
    pub cors_origins: Option<Vec<String>>,

    /// Request timeout in seconds
    pub request_timeout: u64,

    /// Zone in which work hours and booking times are interpreted
    pub timezone: Tz,

    /// Default slot duration in minutes
    pub slot_minutes: u32,

    /// Cancellation notification webhook; notifications are only logged when unset
    pub notify_webhook: Option<WebhookConfig>,

    /// Calendar sync webhook; sync is skipped when unset
    pub calendar_webhook: Option<WebhookConfig>,
}

impl ApiConfig {
    /// Creates a new ApiConfig from environment variables
    ///
    /// # Errors
    ///
    /// This function will return an error if:
    /// - The DATABASE_URL environment variable is not set
    /// - The API_PORT value cannot be parsed as a u16
    /// - BOOKING_TIMEZONE is not a known IANA zone
    /// - SLOT_MINUTES is not an integer between 1 and 1440
    /// - A webhook URL is set without its token
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        // Network settings
        let host = lookup("API_HOST").unwrap_or_else(|| "0.0.0.0".to_string());
        let port = lookup("API_PORT")
            .unwrap_or_else(|| "3000".to_string())
            .parse()
            .wrap_err("Invalid API_PORT value")?;

        // Database settings
        let database_url = lookup("DATABASE_URL")
            .ok_or_else(|| eyre!("DATABASE_URL environment variable must be set"))?;

        // Logging settings
        let log_level = match lookup("LOG_LEVEL").unwrap_or_else(|| "info".to_string()).as_str() {
            "trace" => Level::TRACE,
            "debug" => Level::DEBUG,
            "info" => Level::INFO,
            "warn" => Level::WARN,
            "error" => Level::ERROR,
            _ => Level::INFO,
        };

        // CORS settings
        let cors_origins = lookup("API_CORS_ORIGINS").map(|origins| {
            origins
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect()
        });

        // Performance settings
        let request_timeout = lookup("API_REQUEST_TIMEOUT_SECONDS")
            .unwrap_or_else(|| "30".to_string())
            .parse()
            .unwrap_or(30);

        // Scheduling settings
        let timezone = match lookup("BOOKING_TIMEZONE") {
            Some(name) => name
                .trim()
                .parse::<Tz>()
                .map_err(|e| eyre!("Invalid BOOKING_TIMEZONE '{}': {}", name, e))?,
            None => DEFAULT_TIMEZONE,
        };

        let slot_minutes = match lookup("SLOT_MINUTES") {
            Some(value) => match value.trim().parse::<u32>() {
                Ok(minutes) if (1..=MAX_SLOT_MINUTES).contains(&minutes) => minutes,
                _ => {
                    return Err(eyre!(
                        "SLOT_MINUTES must be between 1 and {}, got '{}'",
                        MAX_SLOT_MINUTES,
                        value
                    ));
                }
            },
            None => SLOT_MINUTES,
        };

        // External integrations
        let notify_webhook = webhook(&lookup, "NOTIFY_WEBHOOK_URL", "NOTIFY_WEBHOOK_TOKEN")?;
        let calendar_webhook = webhook(&lookup, "CALENDAR_SYNC_URL", "CALENDAR_SYNC_TOKEN")?;

        Ok(Self {
            host,
            port,
            database_url,
            log_level,
            cors_origins,
            request_timeout,
            timezone,
            slot_minutes,
            notify_webhook,
            calendar_webhook,
        })
    }

    /// Returns the server address as a string (e.g., "127.0.0.1:8080")
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// A configured URL without its credential is a startup error rather than a
/// silently disabled integration.
fn webhook<F>(lookup: &F, url_key: &str, token_key: &str) -> Result<Option<WebhookConfig>>
where
    F: Fn(&str) -> Option<String>,
{
    let Some(url) = lookup(url_key).filter(|u| !u.trim().is_empty()) else {
        return Ok(None);
    };

    let token = lookup(token_key)
        .filter(|t| !t.trim().is_empty())
        .ok_or_else(|| eyre!("{} is set but {} is missing", url_key, token_key))?;

    Ok(Some(WebhookConfig {
        url: url.trim().to_string(),
        token,
    }))
}
