use chrono::{NaiveTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;
use std::str::FromStr;

use super::user::{Location, User};

/// The alert families a user can subscribe to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertKind {
    Sunny,
    RainOrUv,
    ForecastChange,
}

impl AlertKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            AlertKind::Sunny => "sunny",
            AlertKind::RainOrUv => "rain_or_uv",
            AlertKind::ForecastChange => "forecast_change",
        }
    }

    pub const fn all() -> &'static [AlertKind] {
        &[AlertKind::Sunny, AlertKind::RainOrUv, AlertKind::ForecastChange]
    }

    /// Trigger stored when a user subscribes from the alerts menu.
    pub fn default_trigger(&self) -> Trigger {
        match self {
            AlertKind::Sunny => Trigger::NextSunnyHour,
            AlertKind::RainOrUv => Trigger::At(NaiveTime::from_hms_opt(8, 0, 0).unwrap_or_default()),
            AlertKind::ForecastChange => Trigger::At(NaiveTime::from_hms_opt(18, 0, 0).unwrap_or_default()),
        }
    }

    /// Condition tag stored alongside the subscription.
    pub fn default_condition(&self) -> &'static str {
        match self {
            AlertKind::Sunny => "clear_sky",
            AlertKind::RainOrUv => "rain_or_high_uv",
            AlertKind::ForecastChange => "any_change",
        }
    }
}

impl fmt::Display for AlertKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AlertKind {
    type Err = anyhow::Error;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "sunny" => Ok(AlertKind::Sunny),
            "rain_or_uv" => Ok(AlertKind::RainOrUv),
            "forecast_change" => Ok(AlertKind::ForecastChange),
            other => Err(anyhow::anyhow!("Unknown alert kind '{other}'")),
        }
    }
}

/// When a subscription is evaluated: at a fixed clock time, or relative to
/// the next qualifying forecast hour.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    At(NaiveTime),
    NextSunnyHour,
}

impl Trigger {
    const NEXT_SUNNY_HOUR: &'static str = "next_sunny_hour";

    /// Clock string (`HH:MM`) matched against the scheduler's current time.
    pub fn clock(time: NaiveTime) -> String {
        time.format("%H:%M").to_string()
    }
}

impl fmt::Display for Trigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Trigger::At(time) => f.write_str(&Trigger::clock(*time)),
            Trigger::NextSunnyHour => f.write_str(Trigger::NEXT_SUNNY_HOUR),
        }
    }
}

impl FromStr for Trigger {
    type Err = anyhow::Error;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        if value == Trigger::NEXT_SUNNY_HOUR {
            return Ok(Trigger::NextSunnyHour);
        }
        NaiveTime::parse_from_str(value, "%H:%M")
            .map(Trigger::At)
            .map_err(|_| anyhow::anyhow!("Invalid trigger '{value}'"))
    }
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Subscription {
    pub id: i64,
    pub user_id: i64,
    pub kind: String,
    pub trigger_rule: String,
    pub conditions: String,
    pub active: bool,
    pub created_at: String,
}

#[derive(Debug, FromRow)]
struct CandidateRow {
    user_id: i64,
    location_lat: f64,
    location_lon: f64,
    location_name: Option<String>,
}

impl From<CandidateRow> for (i64, Location) {
    fn from(row: CandidateRow) -> Self {
        let location = match row.location_name {
            Some(name) => Location::new(row.location_lat, row.location_lon, name),
            None => Location::from_coordinates(row.location_lat, row.location_lon),
        };
        (row.user_id, location)
    }
}

impl Subscription {
    pub fn alert_kind(&self) -> Option<AlertKind> {
        self.kind.parse().ok()
    }

    pub fn trigger(&self) -> Option<Trigger> {
        self.trigger_rule.parse().ok()
    }

    /// Appends an active subscription. Identical rows are not collapsed.
    pub async fn add(
        pool: &sqlx::SqlitePool,
        user_id: i64,
        kind: AlertKind,
        trigger: Trigger,
        condition: &str,
    ) -> Result<Self, sqlx::Error> {
        User::ensure_exists(pool, user_id, None).await?;

        let now = Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true);
        let result = sqlx::query(
            r#"
            INSERT INTO subscriptions (user_id, kind, trigger_rule, conditions, active, created_at)
            VALUES (?, ?, ?, ?, 1, ?)
            "#
        )
        .bind(user_id)
        .bind(kind.as_str())
        .bind(trigger.to_string())
        .bind(condition)
        .bind(now)
        .execute(pool)
        .await?;

        Self::find_by_id(pool, result.last_insert_rowid())
            .await?
            .ok_or(sqlx::Error::RowNotFound)
    }

    /// Subscribes with the kind's default trigger and condition.
    pub async fn subscribe(
        pool: &sqlx::SqlitePool,
        user_id: i64,
        kind: AlertKind,
    ) -> Result<Self, sqlx::Error> {
        Self::add(pool, user_id, kind, kind.default_trigger(), kind.default_condition()).await
    }

    pub async fn find_by_id(
        pool: &sqlx::SqlitePool,
        id: i64,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Subscription>(
            "SELECT id, user_id, kind, trigger_rule, conditions, active, created_at FROM subscriptions WHERE id = ?"
        )
        .bind(id)
        .fetch_optional(pool)
        .await
    }

    /// Active subscriptions in insertion order. May contain duplicates.
    pub async fn list_active(
        pool: &sqlx::SqlitePool,
        user_id: i64,
    ) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Subscription>(
            "SELECT id, user_id, kind, trigger_rule, conditions, active, created_at FROM subscriptions WHERE user_id = ? AND active = 1 ORDER BY id"
        )
        .bind(user_id)
        .fetch_all(pool)
        .await
    }

    /// Every row of the user, including deactivated history.
    pub async fn list_all(
        pool: &sqlx::SqlitePool,
        user_id: i64,
    ) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Subscription>(
            "SELECT id, user_id, kind, trigger_rule, conditions, active, created_at FROM subscriptions WHERE user_id = ? ORDER BY id"
        )
        .bind(user_id)
        .fetch_all(pool)
        .await
    }

    /// Soft-deletes every subscription of the user. Returns the number of
    /// rows that were still active.
    pub async fn deactivate_all(
        pool: &sqlx::SqlitePool,
        user_id: i64,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE subscriptions SET active = 0 WHERE user_id = ? AND active = 1"
        )
        .bind(user_id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected())
    }

    /// Distinct users holding an active subscription of `kind` who also have a
    /// saved location. Users without coordinates are left out.
    pub async fn users_with_active_kind(
        pool: &sqlx::SqlitePool,
        kind: AlertKind,
    ) -> Result<Vec<(i64, Location)>, sqlx::Error> {
        let rows = sqlx::query_as::<_, CandidateRow>(
            r#"
            SELECT DISTINCT u.user_id, u.location_lat, u.location_lon, u.location_name
            FROM users u
            JOIN subscriptions s ON u.user_id = s.user_id
            WHERE s.kind = ? AND s.active = 1
              AND u.location_lat IS NOT NULL AND u.location_lon IS NOT NULL
            ORDER BY u.user_id
            "#
        )
        .bind(kind.as_str())
        .fetch_all(pool)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// Like [`Subscription::users_with_active_kind`], restricted to
    /// subscriptions whose trigger equals `trigger`.
    pub async fn users_due(
        pool: &sqlx::SqlitePool,
        kind: AlertKind,
        trigger: Trigger,
    ) -> Result<Vec<(i64, Location)>, sqlx::Error> {
        let rows = sqlx::query_as::<_, CandidateRow>(
            r#"
            SELECT DISTINCT u.user_id, u.location_lat, u.location_lon, u.location_name
            FROM users u
            JOIN subscriptions s ON u.user_id = s.user_id
            WHERE s.kind = ? AND s.trigger_rule = ? AND s.active = 1
              AND u.location_lat IS NOT NULL AND u.location_lon IS NOT NULL
            ORDER BY u.user_id
            "#
        )
        .bind(kind.as_str())
        .bind(trigger.to_string())
        .fetch_all(pool)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    pub async fn count_active(pool: &sqlx::SqlitePool) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM subscriptions WHERE active = 1")
            .fetch_one(pool)
            .await
    }
}
