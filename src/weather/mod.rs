//! # Forecast Gateway
//!
//! Weather data and geocoding for the bot, backed by the Open-Meteo APIs.
//! Callers treat every [`WeatherError`] as "skip this user for this cycle".

pub mod codes;
pub mod open_meteo;

use async_trait::async_trait;
use chrono::{DateTime, FixedOffset, NaiveDate, Offset, Utc};

use crate::database::models::Location;

pub use open_meteo::{OpenMeteoClient, OpenMeteoGeocoder};

/// Hourly weather codes aligned by index with their UTC instants.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HourlyForecast {
    pub times: Vec<DateTime<Utc>>,
    pub codes: Vec<i32>,
    /// Offset of the forecast location, used when showing local clock times.
    pub utc_offset_seconds: i32,
}

impl HourlyForecast {
    pub fn points(&self) -> impl Iterator<Item = (DateTime<Utc>, i32)> + '_ {
        self.times.iter().copied().zip(self.codes.iter().copied())
    }

    /// Offset of the forecast location; out-of-range values fall back to UTC.
    pub fn offset(&self) -> FixedOffset {
        FixedOffset::east_opt(self.utc_offset_seconds).unwrap_or_else(|| Utc.fix())
    }
}

/// Daily aggregates, one entry per forecast day. Values the provider left
/// null stay `None`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DailyForecast {
    pub dates: Vec<NaiveDate>,
    pub temperature_max: Vec<Option<f64>>,
    pub temperature_min: Vec<Option<f64>>,
    pub precipitation_probability: Vec<Option<f64>>,
    pub uv_index: Vec<Option<f64>>,
    pub weather_code: Vec<Option<i32>>,
}

/// First day of a [`DailyForecast`].
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct DailySummary {
    pub date: Option<NaiveDate>,
    pub temperature_max: Option<f64>,
    pub temperature_min: Option<f64>,
    pub precipitation_probability: Option<f64>,
    pub uv_index: Option<f64>,
    pub weather_code: Option<i32>,
}

impl DailyForecast {
    pub fn today(&self) -> DailySummary {
        fn first<T: Copy>(values: &[Option<T>]) -> Option<T> {
            values.first().copied().flatten()
        }

        DailySummary {
            date: self.dates.first().copied(),
            temperature_max: first(&self.temperature_max),
            temperature_min: first(&self.temperature_min),
            precipitation_probability: first(&self.precipitation_probability),
            uv_index: first(&self.uv_index),
            weather_code: first(&self.weather_code),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct CurrentConditions {
    pub temperature: Option<f64>,
    pub apparent_temperature: Option<f64>,
    pub humidity: Option<f64>,
    pub precipitation_probability: Option<f64>,
    pub weather_code: Option<i32>,
    pub wind_speed: Option<f64>,
    pub wind_direction: Option<f64>,
    pub uv_index: Option<f64>,
}

/// Everything the `/weather` command shows.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WeatherReport {
    pub current: CurrentConditions,
    pub daily: DailyForecast,
}

#[derive(Debug, thiserror::Error)]
pub enum WeatherError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("Provider returned status {0}")]
    Status(u16),
    #[error("Response is missing '{0}'")]
    MissingField(&'static str),
    #[error("Parse error: {0}")]
    Parse(String),
}

#[async_trait]
pub trait ForecastGateway: Send + Sync {
    async fn fetch_hourly(&self, latitude: f64, longitude: f64) -> Result<HourlyForecast, WeatherError>;

    async fn fetch_daily(&self, latitude: f64, longitude: f64) -> Result<DailyForecast, WeatherError>;

    async fn fetch_report(&self, latitude: f64, longitude: f64) -> Result<WeatherReport, WeatherError>;
}

#[async_trait]
pub trait Geocoder: Send + Sync {
    /// Best match for a free-text place name, or `None` when nothing matched.
    async fn search(&self, name: &str) -> Result<Option<Location>, WeatherError>;
}
