//! Configuration module for the pickup backend.
//!
//! All configuration is loaded from environment variables with sensible defaults.

use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use chrono::{FixedOffset, NaiveDateTime, TimeDelta, Utc};

use crate::db::RetryPolicy;
use crate::errors::AppError;
use crate::models::{ContactInfo, GameStatus};
use crate::status::StatusClassifier;

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Application key guarding the API (disabled when unset)
    pub api_key: Option<String>,
    /// Path to SQLite database file
    pub db_path: PathBuf,
    /// Directory backing the blob store
    pub blob_dir: PathBuf,
    /// Base URL public blob links are built from
    pub public_url: String,
    /// Address to bind the server to
    pub bind_addr: SocketAddr,
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
    /// Emit logs as JSON lines instead of human-readable text
    pub log_json: bool,
    /// Offset game dates and times are interpreted in
    pub utc_offset: FixedOffset,
    /// Lifetime of a session token from sign-in
    pub session_ttl: TimeDelta,
    /// Retries for catalog reads after the first attempt
    pub read_retries: u32,
    pub retry_backoff_ms: u64,
    /// Status reported for games whose schedule does not parse
    pub unscheduled_status: GameStatus,
    pub contact_email: String,
    pub max_avatar_bytes: usize,
    /// scrypt cost parameter (log2 of N)
    pub scrypt_log_n: u8,
}

fn var_or(name: &str, default: &str) -> String {
    env::var(name).unwrap_or_else(|_| default.to_string())
}

fn parse_var<T: FromStr>(name: &str, default: &str) -> Result<T, AppError> {
    let raw = var_or(name, default);
    raw.trim()
        .parse()
        .map_err(|_| AppError::Validation(format!("Invalid {} value '{}'", name, raw)))
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, AppError> {
        dotenvy::dotenv().ok();

        let api_key = env::var("PICKUP_API_KEY")
            .ok()
            .filter(|key| !key.trim().is_empty());

        let unscheduled_raw = var_or("PICKUP_UNSCHEDULED_STATUS", "upcoming");
        let unscheduled_status = match GameStatus::from_str(&unscheduled_raw) {
            Some(status @ (GameStatus::Upcoming | GameStatus::Completed)) => status,
            _ => {
                return Err(AppError::Validation(format!(
                    "Invalid PICKUP_UNSCHEDULED_STATUS value '{}', expected upcoming or completed",
                    unscheduled_raw
                )))
            }
        };

        let log_json = match var_or("PICKUP_LOG_FORMAT", "text").trim() {
            "text" => false,
            "json" => true,
            other => {
                return Err(AppError::Validation(format!(
                    "Invalid PICKUP_LOG_FORMAT value '{}', expected text or json",
                    other
                )))
            }
        };

        let session_ttl_hours: i64 = parse_var("PICKUP_SESSION_TTL_HOURS", "168")?;
        let session_ttl = TimeDelta::try_hours(session_ttl_hours)
            .filter(|ttl| *ttl > TimeDelta::zero())
            .filter(|ttl| Utc::now().checked_add_signed(*ttl).is_some())
            .ok_or_else(|| {
                AppError::Validation(format!(
                    "Invalid PICKUP_SESSION_TTL_HOURS value '{}', expected a positive number of hours within the calendar range",
                    session_ttl_hours
                ))
            })?;

        Ok(Self {
            api_key,
            db_path: var_or("PICKUP_DB_PATH", "./data/pickup.sqlite").into(),
            blob_dir: var_or("PICKUP_BLOB_DIR", "./data/blobs").into(),
            public_url: var_or("PICKUP_PUBLIC_URL", "http://127.0.0.1:8080"),
            bind_addr: parse_var("PICKUP_BIND_ADDR", "127.0.0.1:8080")?,
            log_level: var_or("PICKUP_LOG_LEVEL", "info"),
            log_json,
            utc_offset: parse_var("PICKUP_UTC_OFFSET", "+00:00")?,
            session_ttl,
            read_retries: parse_var("PICKUP_READ_RETRIES", "3")?,
            retry_backoff_ms: parse_var("PICKUP_RETRY_BACKOFF_MS", "1000")?,
            unscheduled_status,
            contact_email: var_or("PICKUP_CONTACT_EMAIL", "bshoemak@mac.com"),
            max_avatar_bytes: parse_var("PICKUP_MAX_AVATAR_BYTES", "5242880")?,
            scrypt_log_n: parse_var("PICKUP_SCRYPT_LOG_N", "15")?,
        })
    }

    /// Current wall-clock time at the configured offset.
    pub fn local_now(&self) -> NaiveDateTime {
        Utc::now().with_timezone(&self.utc_offset).naive_local()
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_retries: self.read_retries,
            backoff: Duration::from_millis(self.retry_backoff_ms),
        }
    }

    pub fn classifier(&self) -> StatusClassifier {
        StatusClassifier::new(self.unscheduled_status)
    }

    pub fn scrypt_params(&self) -> Result<scrypt::Params, AppError> {
        scrypt::Params::new(self.scrypt_log_n, 8, 1, scrypt::Params::RECOMMENDED_LEN)
            .map_err(|e| AppError::Validation(format!("Invalid PICKUP_SCRYPT_LOG_N: {}", e)))
    }

    pub fn contact(&self) -> ContactInfo {
        ContactInfo {
            email: self.contact_email.clone(),
            mailto: format!("mailto:{}", self.contact_email),
        }
    }
}
