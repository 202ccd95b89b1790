use std::env;
use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use chrono_tz::Tz;
use dotenvy::dotenv;

use crate::service::roster::TimeWindow;

#[derive(Clone)]
pub struct Config {
    pub database_url: String,
    pub jwt_secret: String,
    pub server_addr: String,
    pub api_prefix: String,
    pub log_dir: String,

    /// Single reference zone for day keys and timestamps.
    pub timezone: Tz,
    pub arrival_window: TimeWindow,
    pub departure_window: TimeWindow,
    pub scan_lock_idle: Duration,

    // Rate limiting
    pub rate_scan_per_min: u32,
    pub rate_protected_per_min: u32,
}

fn required(key: &str) -> Result<String> {
    env::var(key).with_context(|| format!("{key} must be set"))
}

fn parsed_or<T>(key: &str, default: &str) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    let raw = env::var(key).unwrap_or_else(|_| default.to_string());
    raw.parse::<T>()
        .map_err(|e| anyhow!("{key}={raw:?} is invalid: {e}"))
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenv().ok();

        Ok(Self {
            server_addr: required("SERVER_ADDR")?,
            database_url: required("DATABASE_URL")?,
            jwt_secret: required("JWT_SECRET")?,
            api_prefix: env::var("API_PREFIX").unwrap_or_else(|_| "/api".to_string()),
            log_dir: env::var("LOG_DIR").unwrap_or_else(|_| "logs".to_string()),

            timezone: parsed_or("TIMEZONE", "Asia/Tashkent")?,
            arrival_window: parsed_or("ARRIVAL_WINDOW", "06:00-09:00")?,
            departure_window: parsed_or("DEPARTURE_WINDOW", "18:00-23:59")?,
            scan_lock_idle: Duration::from_secs(parsed_or("SCAN_LOCK_IDLE_SECS", "600")?),

            rate_scan_per_min: parsed_or("RATE_SCAN_PER_MIN", "120")?,
            rate_protected_per_min: parsed_or("RATE_PROTECTED_PER_MIN", "1000")?,
        })
    }
}

#[cfg(test)]
impl Config {
    pub fn for_tests() -> Self {
        Self {
            database_url: "mysql://unused".to_string(),
            jwt_secret: "test-secret".to_string(),
            server_addr: "127.0.0.1:0".to_string(),
            api_prefix: "/api".to_string(),
            log_dir: "logs".to_string(),
            timezone: chrono_tz::Asia::Tashkent,
            arrival_window: "06:00-09:00".parse().unwrap(),
            departure_window: "18:00-23:59".parse().unwrap(),
            scan_lock_idle: Duration::from_secs(60),
            rate_scan_per_min: 1000,
            rate_protected_per_min: 1000,
        }
    }
}
