use chrono::{DateTime, Duration, NaiveDateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// One row of the dedup ledger: an alert already sent to `user_id` for
/// `bucket_key`.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct SentAlert {
    pub user_id: i64,
    pub bucket_key: String,
    pub sent_at: String,
}

impl SentAlert {
    /// Parses the stored timestamp. Accepts RFC 3339 and SQLite's
    /// `CURRENT_TIMESTAMP` layout (taken as UTC).
    pub fn sent_at_utc(&self) -> Option<DateTime<Utc>> {
        parse_timestamp(&self.sent_at)
    }

    pub async fn find(
        pool: &sqlx::SqlitePool,
        user_id: i64,
        bucket_key: &str,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, SentAlert>(
            "SELECT user_id, bucket_key, sent_at FROM sent_alerts WHERE user_id = ? AND bucket_key = ?"
        )
        .bind(user_id)
        .bind(bucket_key)
        .fetch_optional(pool)
        .await
    }

    /// True iff a record exists for (user, bucket) and it is younger than
    /// `cooldown`. A record exactly `cooldown` old is expired. An unreadable
    /// timestamp counts as no record.
    pub async fn has_sent_within_cooldown(
        pool: &sqlx::SqlitePool,
        user_id: i64,
        bucket_key: &str,
        cooldown: Duration,
        now: DateTime<Utc>,
    ) -> Result<bool, sqlx::Error> {
        let Some(record) = Self::find(pool, user_id, bucket_key).await? else {
            return Ok(false);
        };

        match record.sent_at_utc() {
            Some(sent_at) => Ok(now - sent_at < cooldown),
            None => {
                tracing::warn!(
                    "Unparseable sent_at '{}' for user {} bucket {}, treating as not sent",
                    record.sent_at, user_id, bucket_key
                );
                Ok(false)
            }
        }
    }

    /// Records the send unless a row for (user, bucket) already exists. An
    /// existing row keeps its original timestamp. Returns whether a row was
    /// inserted.
    pub async fn mark_sent(
        pool: &sqlx::SqlitePool,
        user_id: i64,
        bucket_key: &str,
        now: DateTime<Utc>,
    ) -> Result<bool, sqlx::Error> {
        let sent_at = now.to_rfc3339_opts(SecondsFormat::Secs, true);
        let result = sqlx::query(
            "INSERT OR IGNORE INTO sent_alerts (user_id, bucket_key, sent_at) VALUES (?, ?, ?)"
        )
        .bind(user_id)
        .bind(bucket_key)
        .bind(sent_at)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() == 1)
    }

    /// Retention pruning. Rows whose timestamp SQLite cannot read are kept.
    pub async fn prune_older_than(
        pool: &sqlx::SqlitePool,
        cutoff: DateTime<Utc>,
    ) -> Result<u64, sqlx::Error> {
        let cutoff = cutoff.to_rfc3339_opts(SecondsFormat::Secs, true);
        let result = sqlx::query(
            "DELETE FROM sent_alerts WHERE julianday(sent_at) < julianday(?)"
        )
        .bind(cutoff)
        .execute(pool)
        .await?;
        Ok(result.rows_affected())
    }

    pub async fn count(pool: &sqlx::SqlitePool) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM sent_alerts")
            .fetch_one(pool)
            .await
    }
}

fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    if let Ok(parsed) = DateTime::parse_from_rfc3339(value) {
        return Some(parsed.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S")
        .ok()
        .map(|naive| naive.and_utc())
}
