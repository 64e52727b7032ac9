#![allow(dead_code, clippy::unwrap_used)]

use async_trait::async_trait;
use chrono::{DateTime, Duration, TimeZone, Utc};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tempfile::{tempdir, TempDir};

use weather_alert_bot::database::connection::DatabaseManager;
use weather_alert_bot::database::models::Location;
use weather_alert_bot::services::alerts::{AlertContext, AlertSettings};
use weather_alert_bot::services::notifier::{Notifier, NotifyError};
use weather_alert_bot::weather::{
    DailyForecast, ForecastGateway, Geocoder, HourlyForecast, WeatherError, WeatherReport,
};

pub async fn setup_test_db() -> (Arc<DatabaseManager>, TempDir) {
    let dir = tempdir().unwrap();
    let db_path = dir.path().join("test.db");
    let db_url = format!("sqlite:{}", db_path.to_string_lossy());

    let db = DatabaseManager::new(&db_url).await.unwrap();
    db.run_migrations().await.unwrap();
    (Arc::new(db), dir)
}

/// 2024-06-01 10:00:00 UTC
pub fn base_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, 1, 10, 0, 0).unwrap()
}

pub fn clear_sky_at(times: &[DateTime<Utc>]) -> HourlyForecast {
    HourlyForecast {
        times: times.to_vec(),
        codes: vec![0; times.len()],
        utc_offset_seconds: 0,
    }
}

pub fn daily_with(precipitation: Option<f64>, uv_index: Option<f64>) -> DailyForecast {
    DailyForecast {
        dates: vec![base_time().date_naive()],
        temperature_max: vec![Some(20.0)],
        temperature_min: vec![Some(11.0)],
        precipitation_probability: vec![precipitation],
        uv_index: vec![uv_index],
        weather_code: vec![Some(2)],
    }
}

/// Serves the same canned forecast for every location, except latitudes
/// listed in `failing_latitudes`.
#[derive(Default)]
pub struct FakeGateway {
    pub hourly: HourlyForecast,
    pub daily: DailyForecast,
    pub report: WeatherReport,
    pub failing_latitudes: Vec<f64>,
    pub calls: AtomicUsize,
}

impl FakeGateway {
    fn check(&self, latitude: f64) -> Result<(), WeatherError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.failing_latitudes.contains(&latitude) {
            return Err(WeatherError::Status(503));
        }
        Ok(())
    }
}

#[async_trait]
impl ForecastGateway for FakeGateway {
    async fn fetch_hourly(&self, latitude: f64, _longitude: f64) -> Result<HourlyForecast, WeatherError> {
        self.check(latitude)?;
        Ok(self.hourly.clone())
    }

    async fn fetch_daily(&self, latitude: f64, _longitude: f64) -> Result<DailyForecast, WeatherError> {
        self.check(latitude)?;
        Ok(self.daily.clone())
    }

    async fn fetch_report(&self, latitude: f64, _longitude: f64) -> Result<WeatherReport, WeatherError> {
        self.check(latitude)?;
        Ok(self.report.clone())
    }
}

#[derive(Default)]
pub struct FakeGeocoder {
    pub places: HashMap<String, Location>,
}

#[async_trait]
impl Geocoder for FakeGeocoder {
    async fn search(&self, name: &str) -> Result<Option<Location>, WeatherError> {
        Ok(self.places.get(name).cloned())
    }
}

/// Records every delivered message. Sends fail while `fail_all` is set or
/// for users in `failing_users`.
#[derive(Default)]
pub struct RecordingNotifier {
    pub sent: Mutex<Vec<(i64, String)>>,
    pub failing_users: Vec<i64>,
    pub fail_all: AtomicBool,
    pub delay: Option<std::time::Duration>,
}

impl RecordingNotifier {
    pub fn messages(&self) -> Vec<(i64, String)> {
        self.sent.lock().unwrap().clone()
    }

    pub fn count_for(&self, user_id: i64) -> usize {
        self.messages().iter().filter(|(id, _)| *id == user_id).count()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn send(&self, user_id: i64, text: &str) -> Result<(), NotifyError> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if self.fail_all.load(Ordering::SeqCst) || self.failing_users.contains(&user_id) {
            return Err(NotifyError::Rejected("bot was blocked by the user".to_string()));
        }
        self.sent.lock().unwrap().push((user_id, text.to_string()));
        Ok(())
    }
}

pub fn alert_context(
    db: Arc<DatabaseManager>,
    gateway: Arc<FakeGateway>,
    notifier: Arc<RecordingNotifier>,
) -> AlertContext {
    AlertContext {
        db,
        gateway,
        notifier,
        settings: AlertSettings {
            send_timeout: std::time::Duration::from_millis(200),
            ..AlertSettings::default()
        },
    }
}

pub fn hours(n: i64) -> Duration {
    Duration::hours(n)
}
