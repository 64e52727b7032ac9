use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A saved geographic position with the name shown back to the user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub latitude: f64,
    pub longitude: f64,
    pub name: String,
}

impl Location {
    pub fn new(latitude: f64, longitude: f64, name: impl Into<String>) -> Self {
        Self {
            latitude,
            longitude,
            name: name.into(),
        }
    }

    /// Location named after its own coordinates, used for shared pins and
    /// `/location <lat> <lon>`.
    pub fn from_coordinates(latitude: f64, longitude: f64) -> Self {
        Self::new(latitude, longitude, format!("Lat: {latitude:.2}, Lon: {longitude:.2}"))
    }
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct User {
    pub user_id: i64,
    pub username: Option<String>,
    pub location_lat: Option<f64>,
    pub location_lon: Option<f64>,
    pub location_name: Option<String>,
    pub created_at: String,
}

impl User {
    /// The saved location, if both coordinates are present.
    pub fn location(&self) -> Option<Location> {
        let (latitude, longitude) = (self.location_lat?, self.location_lon?);
        Some(match &self.location_name {
            Some(name) => Location::new(latitude, longitude, name.clone()),
            None => Location::from_coordinates(latitude, longitude),
        })
    }

    pub async fn find_by_id(
        pool: &sqlx::SqlitePool,
        user_id: i64,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, User>(
            "SELECT user_id, username, location_lat, location_lon, location_name, created_at FROM users WHERE user_id = ?"
        )
        .bind(user_id)
        .fetch_optional(pool)
        .await
    }

    /// Creates a bare user row (no location) unless one already exists.
    pub async fn ensure_exists(
        pool: &sqlx::SqlitePool,
        user_id: i64,
        username: Option<&str>,
    ) -> Result<(), sqlx::Error> {
        let now = Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true);
        sqlx::query(
            "INSERT OR IGNORE INTO users (user_id, username, created_at) VALUES (?, ?, ?)"
        )
        .bind(user_id)
        .bind(username)
        .bind(now)
        .execute(pool)
        .await?;
        Ok(())
    }

    /// Upserts the user's location, replacing whatever was stored before.
    /// A `None` username keeps the handle already on file.
    pub async fn set_location(
        pool: &sqlx::SqlitePool,
        user_id: i64,
        username: Option<&str>,
        location: &Location,
    ) -> Result<(), sqlx::Error> {
        let now = Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true);
        sqlx::query(
            r#"
            INSERT INTO users (user_id, username, location_lat, location_lon, location_name, created_at)
            VALUES (?, ?, ?, ?, ?, ?)
            ON CONFLICT (user_id) DO UPDATE SET
                username = COALESCE(excluded.username, users.username),
                location_lat = excluded.location_lat,
                location_lon = excluded.location_lon,
                location_name = excluded.location_name
            "#
        )
        .bind(user_id)
        .bind(username)
        .bind(location.latitude)
        .bind(location.longitude)
        .bind(&location.name)
        .bind(now)
        .execute(pool)
        .await?;
        Ok(())
    }

    pub async fn get_location(
        pool: &sqlx::SqlitePool,
        user_id: i64,
    ) -> Result<Option<Location>, sqlx::Error> {
        Ok(Self::find_by_id(pool, user_id)
            .await?
            .and_then(|user| user.location()))
    }

    pub async fn count(pool: &sqlx::SqlitePool) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM users")
            .fetch_one(pool)
            .await
    }
}
