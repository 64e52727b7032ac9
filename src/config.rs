use anyhow::{anyhow, Result};
use std::env;
use std::str::FromStr;
use std::time::Duration;

use crate::weather::open_meteo::{DEFAULT_FORECAST_URL, DEFAULT_GEOCODING_URL};

pub const DEFAULT_DATABASE_URL: &str = "sqlite:./data/weather_bot.db";

#[derive(Debug, Clone)]
pub struct Config {
    pub telegram_bot_token: String,
    pub database_url: String,
    pub http_port: u16,
    pub weather_api_url: String,
    pub geocoding_api_url: String,
    pub request_timeout_secs: u64,
    pub max_concurrent_requests: usize,
    pub sunny_alert_schedule: String,
    pub fixed_alert_schedule: String,
    pub prune_schedule: String,
    pub alert_retention_days: i64,
    pub alert_utc_offset_hours: i32,
}

/// Value of `name`, or `default` when unset or blank.
fn var_or(name: &str, default: &str) -> String {
    match env::var(name) {
        Ok(value) if !value.trim().is_empty() => value.trim().to_string(),
        _ => default.to_string(),
    }
}

fn parse_var<T: FromStr>(name: &str, default: T) -> Result<T> {
    match env::var(name) {
        Ok(value) if !value.trim().is_empty() => value
            .trim()
            .parse()
            .map_err(|_| anyhow!("Invalid {name}: '{value}'")),
        _ => Ok(default),
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let token = env::var("TELEGRAM_BOT_TOKEN")
            .map_err(|_| anyhow!("TELEGRAM_BOT_TOKEN must be set"))?;

        if token.trim().is_empty() {
            return Err(anyhow!("TELEGRAM_BOT_TOKEN must be set"));
        }

        let request_timeout_secs = parse_var("REQUEST_TIMEOUT_SECS", 10u64)?;
        if request_timeout_secs == 0 {
            return Err(anyhow!("REQUEST_TIMEOUT_SECS must be at least 1"));
        }

        let max_concurrent_requests = parse_var("MAX_CONCURRENT_REQUESTS", 4usize)?;
        if max_concurrent_requests == 0 {
            return Err(anyhow!("MAX_CONCURRENT_REQUESTS must be at least 1"));
        }

        let alert_retention_days = parse_var("ALERT_RETENTION_DAYS", 7i64)?;
        if alert_retention_days < 1 {
            return Err(anyhow!("ALERT_RETENTION_DAYS must be at least 1"));
        }

        let alert_utc_offset_hours = parse_var("ALERT_UTC_OFFSET_HOURS", 0i32)?;
        if !(-12..=14).contains(&alert_utc_offset_hours) {
            return Err(anyhow!("ALERT_UTC_OFFSET_HOURS must be between -12 and 14"));
        }

        Ok(Config {
            telegram_bot_token: token,
            database_url: Self::database_url_from_env(),
            http_port: parse_var("HTTP_PORT", 3000u16)?,
            weather_api_url: var_or("WEATHER_API_URL", DEFAULT_FORECAST_URL),
            geocoding_api_url: var_or("GEOCODING_API_URL", DEFAULT_GEOCODING_URL),
            request_timeout_secs,
            max_concurrent_requests,
            sunny_alert_schedule: var_or("SUNNY_ALERT_SCHEDULE", "0 0 * * * *"),
            fixed_alert_schedule: var_or("FIXED_ALERT_SCHEDULE", "0 * * * * *"),
            prune_schedule: var_or("PRUNE_SCHEDULE", "0 30 3 * * *"),
            alert_retention_days,
            alert_utc_offset_hours,
        })
    }

    /// `DATABASE_URL` alone, for tools that never talk to Telegram.
    pub fn database_url_from_env() -> String {
        var_or("DATABASE_URL", DEFAULT_DATABASE_URL)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}
