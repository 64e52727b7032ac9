//! # Alert Evaluator
//!
//! Pure decision functions: given forecast data and "now", which alerts are
//! due and what do they say. No I/O happens here; the alert service feeds
//! these functions and handles dedup and delivery.

use chrono::{DateTime, Duration, Utc};

use crate::utils::datetime::{format_clock, hour_bucket_key};
use crate::utils::markdown::{bold, escape_markdown};
use crate::weather::codes::{code_recommendation, CLEAR_SKY};
use crate::weather::{DailySummary, HourlyForecast};

/// How long before a clear-sky hour the sunny reminder goes out.
pub const SUNNY_LEAD_HOURS: i64 = 2;
/// Width of the window, starting now, in which the reminder instant must fall.
pub const SUNNY_WINDOW_SECS: i64 = 7200;
/// Minimum age of a ledger record before the same sunny bucket may be re-sent.
pub const SUNNY_COOLDOWN_HOURS: i64 = 2;
/// Cooldown for once-a-day alerts.
pub const DAILY_COOLDOWN_HOURS: i64 = 24;

/// A clear-sky forecast hour whose reminder is due now.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SunnyWindow {
    pub forecast_time: DateTime<Utc>,
    pub bucket_key: String,
}

/// Every future clear-sky hour `t` with `now <= t - 2h <= now + 2h`.
pub fn sunny_windows(hourly: &HourlyForecast, now: DateTime<Utc>) -> Vec<SunnyWindow> {
    let lead = Duration::hours(SUNNY_LEAD_HOURS);
    let window = Duration::seconds(SUNNY_WINDOW_SECS);

    hourly
        .points()
        .filter(|(time, code)| *time > now && *code == CLEAR_SKY)
        .filter(|(time, _)| {
            let until_reminder = (*time - lead) - now;
            until_reminder >= Duration::zero() && until_reminder <= window
        })
        .map(|(time, _)| SunnyWindow {
            forecast_time: time,
            bucket_key: hour_bucket_key(&time),
        })
        .collect()
}

pub fn sunny_alert_message(location_name: &str, window: &SunnyWindow, hourly: &HourlyForecast) -> String {
    let local = window.forecast_time.with_timezone(&hourly.offset());
    format!(
        "☀️ {}\n\n{}",
        bold(&format!("Sunny weather is forecast for {} at {}!", location_name, format_clock(&local))),
        escape_markdown("This is your reminder 2 hours before sunny weather.")
    )
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UmbrellaAdvice {
    Take,
    Consider,
}

impl UmbrellaAdvice {
    pub fn for_probability(probability: f64) -> Option<Self> {
        if probability > 60.0 {
            Some(Self::Take)
        } else if probability > 30.0 {
            Some(Self::Consider)
        } else {
            None
        }
    }

    /// Line used in the daily reminder alert.
    pub fn reminder(&self) -> &'static str {
        match self {
            Self::Take => "🌂 High chance of rain - bring an umbrella!",
            Self::Consider => "🌂 Possible rain - consider bringing an umbrella",
        }
    }

    /// Line used in the `/weather` recommendations.
    pub fn recommendation(&self) -> &'static str {
        match self {
            Self::Take => "🌂 Take an umbrella",
            Self::Consider => "🌂 Consider bringing an umbrella",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SunscreenAdvice {
    Apply,
    Consider,
}

impl SunscreenAdvice {
    pub fn for_uv_index(uv_index: f64) -> Option<Self> {
        if uv_index >= 6.0 {
            Some(Self::Apply)
        } else if uv_index >= 3.0 {
            Some(Self::Consider)
        } else {
            None
        }
    }

    pub fn reminder(&self) -> &'static str {
        match self {
            Self::Apply => "🧴 High UV index - apply sunscreen!",
            Self::Consider => "🧴 Moderate UV - consider sunscreen",
        }
    }

    pub fn recommendation(&self) -> &'static str {
        match self {
            Self::Apply => "🧴 Apply sunscreen (high UV)",
            Self::Consider => "🧴 Consider sunscreen (moderate UV)",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RainUvAdvice {
    pub umbrella: Option<UmbrellaAdvice>,
    pub sunscreen: Option<SunscreenAdvice>,
}

impl RainUvAdvice {
    pub fn is_empty(&self) -> bool {
        self.umbrella.is_none() && self.sunscreen.is_none()
    }
}

/// Advice from today's precipitation probability and UV index. Missing values
/// produce no advice for that half.
pub fn rain_uv_advice(today: &DailySummary) -> RainUvAdvice {
    RainUvAdvice {
        umbrella: today.precipitation_probability.and_then(UmbrellaAdvice::for_probability),
        sunscreen: today.uv_index.and_then(SunscreenAdvice::for_uv_index),
    }
}

/// The daily reminder, or `None` when neither threshold is crossed.
pub fn rain_uv_message(location_name: &str, today: &DailySummary) -> Option<String> {
    let advice = rain_uv_advice(today);
    if advice.is_empty() {
        return None;
    }

    let lines: Vec<&str> = advice
        .umbrella
        .map(|a| a.reminder())
        .into_iter()
        .chain(advice.sunscreen.map(|a| a.reminder()))
        .collect();

    Some(format!(
        "🌤️ {}\n\n{}",
        bold(&format!("Daily Weather Reminder for {location_name}")),
        escape_markdown(&lines.join("\n"))
    ))
}

// No previous snapshot is stored, so there is nothing to diff against; the
// alert always fires at its trigger time.
pub fn forecast_change_message(location_name: &str) -> String {
    format!(
        "📅 {}\n\n{}",
        bold(&format!("Forecast Update for {location_name}")),
        escape_markdown("Tomorrow's weather forecast has been updated. Check /weather for the latest information.")
    )
}

/// Recommendation lines for the `/weather` report.
pub fn recommendations(
    weather_code: Option<i32>,
    precipitation_probability: Option<f64>,
    uv_index: Option<f64>,
) -> Vec<&'static str> {
    let mut lines = Vec::new();
    if let Some(advice) = precipitation_probability.and_then(UmbrellaAdvice::for_probability) {
        lines.push(advice.recommendation());
    }
    if let Some(advice) = uv_index.and_then(SunscreenAdvice::for_uv_index) {
        lines.push(advice.recommendation());
    }
    if let Some(line) = weather_code.and_then(code_recommendation) {
        lines.push(line);
    }
    lines
}
