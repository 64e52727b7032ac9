use async_trait::async_trait;
use chrono::{Duration as ChronoDuration, NaiveDate, NaiveDateTime};
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::time::Duration;

use super::{
    CurrentConditions, DailyForecast, ForecastGateway, Geocoder, HourlyForecast, WeatherError,
    WeatherReport,
};
use crate::database::models::Location;

pub const DEFAULT_FORECAST_URL: &str = "https://api.open-meteo.com/v1/forecast";
pub const DEFAULT_GEOCODING_URL: &str = "https://geocoding-api.open-meteo.com/v1/search";

const USER_AGENT: &str = concat!("weather-alert-bot/", env!("CARGO_PKG_VERSION"));

const CURRENT_FIELDS: &str = "temperature_2m,relative_humidity_2m,apparent_temperature,\
precipitation_probability,weather_code,wind_speed_10m,wind_direction_10m,uv_index";
const DAILY_FIELDS: &str = "temperature_2m_max,temperature_2m_min,\
precipitation_probability_max,uv_index_max,weather_code";
const HOURLY_FIELDS: &str = "weather_code";

#[derive(Debug, Deserialize)]
struct ForecastResponse {
    #[serde(default)]
    utc_offset_seconds: i32,
    hourly: Option<HourlyBlock>,
    daily: Option<DailyBlock>,
    current: Option<CurrentBlock>,
}

#[derive(Debug, Deserialize)]
struct HourlyBlock {
    time: Option<Vec<String>>,
    weather_code: Option<Vec<Option<i32>>>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct DailyBlock {
    time: Vec<String>,
    temperature_2m_max: Vec<Option<f64>>,
    temperature_2m_min: Vec<Option<f64>>,
    precipitation_probability_max: Vec<Option<f64>>,
    uv_index_max: Vec<Option<f64>>,
    weather_code: Vec<Option<i32>>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct CurrentBlock {
    temperature_2m: Option<f64>,
    relative_humidity_2m: Option<f64>,
    apparent_temperature: Option<f64>,
    precipitation_probability: Option<f64>,
    weather_code: Option<i32>,
    wind_speed_10m: Option<f64>,
    wind_direction_10m: Option<f64>,
    uv_index: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct GeocodingResponse {
    results: Option<Vec<GeocodingResult>>,
}

#[derive(Debug, Deserialize)]
struct GeocodingResult {
    latitude: f64,
    longitude: f64,
    name: Option<String>,
    country: Option<String>,
}

fn build_client(timeout: Duration) -> Result<Client, WeatherError> {
    Ok(Client::builder()
        .timeout(timeout)
        .user_agent(USER_AGENT)
        .build()?)
}

async fn get_json<T: DeserializeOwned>(
    client: &Client,
    url: &str,
    params: &[(&str, String)],
) -> Result<T, WeatherError> {
    let response = client.get(url).query(params).send().await?;

    if !response.status().is_success() {
        return Err(WeatherError::Status(response.status().as_u16()));
    }

    response
        .json::<T>()
        .await
        .map_err(|e| WeatherError::Parse(e.to_string()))
}

/// Forecast client for `api.open-meteo.com`.
#[derive(Debug, Clone)]
pub struct OpenMeteoClient {
    client: Client,
    base_url: String,
}

impl OpenMeteoClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, WeatherError> {
        Ok(Self {
            client: build_client(timeout)?,
            base_url: base_url.into(),
        })
    }

    async fn forecast(
        &self,
        latitude: f64,
        longitude: f64,
        extra: &[(&str, String)],
    ) -> Result<ForecastResponse, WeatherError> {
        let mut params = vec![
            ("latitude", latitude.to_string()),
            ("longitude", longitude.to_string()),
            ("timezone", "auto".to_string()),
        ];
        params.extend(extra.iter().cloned());

        get_json(&self.client, &self.base_url, &params).await
    }
}

#[async_trait]
impl ForecastGateway for OpenMeteoClient {
    async fn fetch_hourly(&self, latitude: f64, longitude: f64) -> Result<HourlyForecast, WeatherError> {
        let response = self
            .forecast(
                latitude,
                longitude,
                &[("hourly", HOURLY_FIELDS.to_string()), ("forecast_days", "2".to_string())],
            )
            .await?;
        let offset = response.utc_offset_seconds;
        let hourly = response.hourly.ok_or(WeatherError::MissingField("hourly"))?;
        convert_hourly(hourly, offset)
    }

    async fn fetch_daily(&self, latitude: f64, longitude: f64) -> Result<DailyForecast, WeatherError> {
        let response = self
            .forecast(
                latitude,
                longitude,
                &[("daily", DAILY_FIELDS.to_string()), ("forecast_days", "7".to_string())],
            )
            .await?;
        let daily = response.daily.ok_or(WeatherError::MissingField("daily"))?;
        convert_daily(daily)
    }

    async fn fetch_report(&self, latitude: f64, longitude: f64) -> Result<WeatherReport, WeatherError> {
        let response = self
            .forecast(
                latitude,
                longitude,
                &[
                    ("current", CURRENT_FIELDS.to_string()),
                    ("daily", DAILY_FIELDS.to_string()),
                    ("forecast_days", "7".to_string()),
                ],
            )
            .await?;
        let current = response.current.ok_or(WeatherError::MissingField("current"))?;
        let daily = response.daily.ok_or(WeatherError::MissingField("daily"))?;

        Ok(WeatherReport {
            current: CurrentConditions {
                temperature: current.temperature_2m,
                apparent_temperature: current.apparent_temperature,
                humidity: current.relative_humidity_2m,
                precipitation_probability: current.precipitation_probability,
                weather_code: current.weather_code,
                wind_speed: current.wind_speed_10m,
                wind_direction: current.wind_direction_10m,
                uv_index: current.uv_index,
            },
            daily: convert_daily(daily)?,
        })
    }
}

/// Open-Meteo reports local wall-clock times (`timezone=auto`); shift them by
/// the location's offset to get UTC. Entries with an unreadable time or a null
/// code are dropped pairwise so the two series stay aligned.
fn convert_hourly(block: HourlyBlock, utc_offset_seconds: i32) -> Result<HourlyForecast, WeatherError> {
    let times = block.time.ok_or(WeatherError::MissingField("hourly.time"))?;
    let codes = block
        .weather_code
        .ok_or(WeatherError::MissingField("hourly.weather_code"))?;
    let offset = ChronoDuration::seconds(i64::from(utc_offset_seconds));

    let mut forecast = HourlyForecast {
        utc_offset_seconds,
        ..HourlyForecast::default()
    };
    for (time, code) in times.iter().zip(codes) {
        let (Some(local), Some(code)) = (parse_local_time(time), code) else {
            continue;
        };
        forecast.times.push((local - offset).and_utc());
        forecast.codes.push(code);
    }

    Ok(forecast)
}

fn parse_local_time(value: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M")
        .or_else(|_| NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S"))
        .ok()
}

fn convert_daily(block: DailyBlock) -> Result<DailyForecast, WeatherError> {
    let dates = block
        .time
        .iter()
        .map(|value| {
            NaiveDate::parse_from_str(value, "%Y-%m-%d")
                .map_err(|e| WeatherError::Parse(format!("daily.time '{value}': {e}")))
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(DailyForecast {
        dates,
        temperature_max: block.temperature_2m_max,
        temperature_min: block.temperature_2m_min,
        precipitation_probability: block.precipitation_probability_max,
        uv_index: block.uv_index_max,
        weather_code: block.weather_code,
    })
}

/// Place-name search against `geocoding-api.open-meteo.com`.
#[derive(Debug, Clone)]
pub struct OpenMeteoGeocoder {
    client: Client,
    base_url: String,
}

impl OpenMeteoGeocoder {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, WeatherError> {
        Ok(Self {
            client: build_client(timeout)?,
            base_url: base_url.into(),
        })
    }
}

#[async_trait]
impl Geocoder for OpenMeteoGeocoder {
    async fn search(&self, name: &str) -> Result<Option<Location>, WeatherError> {
        let params = [
            ("name", name.to_string()),
            ("count", "1".to_string()),
            ("language", "en".to_string()),
        ];
        let response: GeocodingResponse = get_json(&self.client, &self.base_url, &params).await?;

        let Some(result) = response.results.and_then(|results| results.into_iter().next()) else {
            tracing::debug!("No geocoding match for '{}'", name);
            return Ok(None);
        };

        let place = result.name.unwrap_or_else(|| name.to_string());
        let display_name = match result.country.filter(|c| !c.is_empty()) {
            Some(country) => format!("{place}, {country}"),
            None => place,
        };

        Ok(Some(Location::new(result.latitude, result.longitude, display_name)))
    }
}
