//! # Alert Service
//!
//! Cron-driven delivery of subscribed alerts. Each tick loads the candidate
//! users for one alert kind, evaluates them concurrently (bounded by a
//! semaphore), checks the dedup ledger, sends, and records successful sends.
//!
//! A failure for one user is logged and never aborts the rest of the tick.

use std::future::Future;
use std::sync::Arc;

use chrono::{DateTime, Duration, FixedOffset, Utc};
use tokio::sync::{Mutex, Semaphore};
use tokio::task::JoinSet;
use tokio_cron_scheduler::{Job, JobScheduler};

use crate::config::Config;
use crate::database::connection::DatabaseManager;
use crate::database::models::{AlertKind, Location, SentAlert, Subscription, Trigger};
use crate::services::evaluator::{
    forecast_change_message, rain_uv_message, sunny_alert_message, sunny_windows,
    DAILY_COOLDOWN_HOURS, SUNNY_COOLDOWN_HOURS,
};
use crate::services::notifier::{Notifier, NotifyError};
use crate::utils::datetime::{alert_offset, day_bucket_key, local_clock};
use crate::utils::logging::{
    log_alert_sent, log_alert_skipped, log_database_error, log_provider_error, log_system_event,
};
use crate::weather::ForecastGateway;

type ServiceResult<T> = Result<T, Box<dyn std::error::Error + Send + Sync>>;

#[derive(Debug, Clone)]
pub struct AlertSettings {
    pub sunny_schedule: String,
    pub fixed_schedule: String,
    pub prune_schedule: String,
    pub max_concurrent_requests: usize,
    pub send_timeout: std::time::Duration,
    pub retention_days: i64,
    /// Offset at which `HH:MM` triggers are read.
    pub utc_offset: FixedOffset,
}

impl Default for AlertSettings {
    fn default() -> Self {
        Self {
            sunny_schedule: "0 0 * * * *".to_string(),
            fixed_schedule: "0 * * * * *".to_string(),
            prune_schedule: "0 30 3 * * *".to_string(),
            max_concurrent_requests: 4,
            send_timeout: std::time::Duration::from_secs(10),
            retention_days: 7,
            utc_offset: alert_offset(0),
        }
    }
}

impl AlertSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            sunny_schedule: config.sunny_alert_schedule.clone(),
            fixed_schedule: config.fixed_alert_schedule.clone(),
            prune_schedule: config.prune_schedule.clone(),
            max_concurrent_requests: config.max_concurrent_requests,
            send_timeout: config.request_timeout(),
            retention_days: config.alert_retention_days,
            utc_offset: alert_offset(config.alert_utc_offset_hours),
        }
    }
}

/// Everything a tick needs. Cheap to clone; all handles are shared.
#[derive(Clone)]
pub struct AlertContext {
    pub db: Arc<DatabaseManager>,
    pub gateway: Arc<dyn ForecastGateway>,
    pub notifier: Arc<dyn Notifier>,
    pub settings: AlertSettings,
}

/// Counts for one tick. `sent` counts messages, not users.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickReport {
    pub candidates: usize,
    pub sent: usize,
    pub skipped: usize,
    pub failed: usize,
}

impl TickReport {
    fn absorb(&mut self, other: TickReport) {
        self.candidates += other.candidates;
        self.sent += other.sent;
        self.skipped += other.skipped;
        self.failed += other.failed;
    }

    fn failure() -> Self {
        Self { failed: 1, ..Self::default() }
    }
}

#[derive(Default)]
struct TickGuards {
    sunny: Mutex<()>,
    fixed: Mutex<()>,
    prune: Mutex<()>,
}

pub struct AlertService {
    ctx: AlertContext,
    scheduler: JobScheduler,
    guards: Arc<TickGuards>,
}

impl AlertService {
    pub async fn new(ctx: AlertContext) -> ServiceResult<Self> {
        let scheduler = JobScheduler::new().await?;

        Ok(Self {
            ctx,
            scheduler,
            guards: Arc::new(TickGuards::default()),
        })
    }

    pub async fn start(&mut self) -> ServiceResult<()> {
        let settings = self.ctx.settings.clone();

        let ctx = self.ctx.clone();
        let guards = self.guards.clone();
        let sunny_job = Job::new_async(settings.sunny_schedule.as_str(), move |_uuid, _l| {
            let ctx = ctx.clone();
            let guards = guards.clone();
            Box::pin(async move {
                let Ok(_guard) = guards.sunny.try_lock() else {
                    tracing::warn!("Previous sunny tick still running, skipping this one");
                    return;
                };
                if let Err(e) = sunny_tick(&ctx, Utc::now()).await {
                    log_database_error("sunny_tick", "subscriptions", &e.to_string());
                }
            })
        })?;

        let ctx = self.ctx.clone();
        let guards = self.guards.clone();
        let fixed_job = Job::new_async(settings.fixed_schedule.as_str(), move |_uuid, _l| {
            let ctx = ctx.clone();
            let guards = guards.clone();
            Box::pin(async move {
                let Ok(_guard) = guards.fixed.try_lock() else {
                    tracing::warn!("Previous fixed-time tick still running, skipping this one");
                    return;
                };
                if let Err(e) = fixed_time_tick(&ctx, Utc::now()).await {
                    log_database_error("fixed_time_tick", "subscriptions", &e.to_string());
                }
            })
        })?;

        let ctx = self.ctx.clone();
        let guards = self.guards.clone();
        let prune_job = Job::new_async(settings.prune_schedule.as_str(), move |_uuid, _l| {
            let ctx = ctx.clone();
            let guards = guards.clone();
            Box::pin(async move {
                let Ok(_guard) = guards.prune.try_lock() else {
                    tracing::warn!("Previous prune still running, skipping this one");
                    return;
                };
                if let Err(e) = prune_tick(&ctx, Utc::now()).await {
                    log_database_error("prune_older_than", "sent_alerts", &e.to_string());
                }
            })
        })?;

        self.scheduler.add(sunny_job).await?;
        self.scheduler.add(fixed_job).await?;
        self.scheduler.add(prune_job).await?;
        self.scheduler.start().await?;

        log_system_event(
            "Alert service started",
            Some(&format!(
                "sunny '{}', fixed-time '{}', prune '{}'",
                settings.sunny_schedule, settings.fixed_schedule, settings.prune_schedule
            )),
        );
        Ok(())
    }

    pub async fn stop(&mut self) -> ServiceResult<()> {
        self.scheduler.shutdown().await?;
        Ok(())
    }

    // Manual triggers; these wait for a running tick instead of skipping.
    pub async fn run_sunny_now(&self, now: DateTime<Utc>) -> Result<TickReport, sqlx::Error> {
        let _guard = self.guards.sunny.lock().await;
        sunny_tick(&self.ctx, now).await
    }

    pub async fn run_fixed_time_now(&self, now: DateTime<Utc>) -> Result<TickReport, sqlx::Error> {
        let _guard = self.guards.fixed.lock().await;
        fixed_time_tick(&self.ctx, now).await
    }

    pub async fn run_prune_now(&self, now: DateTime<Utc>) -> Result<u64, sqlx::Error> {
        let _guard = self.guards.prune.lock().await;
        prune_tick(&self.ctx, now).await
    }
}

/// One sunny pass over every user with an active sunny subscription.
pub async fn sunny_tick(ctx: &AlertContext, now: DateTime<Utc>) -> Result<TickReport, sqlx::Error> {
    let candidates = Subscription::users_with_active_kind(&ctx.db.pool, AlertKind::Sunny).await?;
    let report = fan_out(ctx, candidates, move |ctx, user_id, location| {
        sunny_for_user(ctx, user_id, location, now)
    })
    .await;

    log_tick("sunny", &report);
    Ok(report)
}

/// Sends the fixed-time kinds whose `HH:MM` trigger matches `now` read at the
/// configured offset.
pub async fn fixed_time_tick(ctx: &AlertContext, now: DateTime<Utc>) -> Result<TickReport, sqlx::Error> {
    let (date, clock) = local_clock(now, ctx.settings.utc_offset);
    let trigger = Trigger::At(clock);
    let mut report = TickReport::default();

    for kind in [AlertKind::RainOrUv, AlertKind::ForecastChange] {
        let candidates = Subscription::users_due(&ctx.db.pool, kind, trigger).await?;
        if candidates.is_empty() {
            continue;
        }

        let bucket_key = day_bucket_key(kind.as_str(), date);
        let kind_report = fan_out(ctx, candidates, move |ctx, user_id, location| {
            let bucket_key = bucket_key.clone();
            async move { daily_for_user(ctx, kind, user_id, location, bucket_key, now).await }
        })
        .await;

        log_tick(kind.as_str(), &kind_report);
        report.absorb(kind_report);
    }

    Ok(report)
}

/// Deletes ledger rows older than the retention period.
pub async fn prune_tick(ctx: &AlertContext, now: DateTime<Utc>) -> Result<u64, sqlx::Error> {
    let cutoff = now - Duration::days(ctx.settings.retention_days);
    let removed = SentAlert::prune_older_than(&ctx.db.pool, cutoff).await?;
    if removed > 0 {
        log_system_event("Pruned sent alerts", Some(&format!("{} rows before {}", removed, cutoff)));
    }
    Ok(removed)
}

async fn fan_out<F, Fut>(ctx: &AlertContext, candidates: Vec<(i64, Location)>, work: F) -> TickReport
where
    F: Fn(AlertContext, i64, Location) -> Fut,
    Fut: Future<Output = TickReport> + Send + 'static,
{
    let semaphore = Arc::new(Semaphore::new(ctx.settings.max_concurrent_requests.max(1)));
    let mut report = TickReport {
        candidates: candidates.len(),
        ..TickReport::default()
    };
    let mut tasks = JoinSet::new();

    for (user_id, location) in candidates {
        let semaphore = semaphore.clone();
        let job = work(ctx.clone(), user_id, location);
        tasks.spawn(async move {
            let Ok(_permit) = semaphore.acquire_owned().await else {
                return TickReport::failure();
            };
            job.await
        });
    }

    while let Some(result) = tasks.join_next().await {
        match result {
            Ok(outcome) => report.absorb(outcome),
            Err(e) => {
                tracing::error!("Alert task aborted: {}", e);
                report.failed += 1;
            }
        }
    }

    report
}

async fn sunny_for_user(
    ctx: AlertContext,
    user_id: i64,
    location: Location,
    now: DateTime<Utc>,
) -> TickReport {
    let hourly = match ctx.gateway.fetch_hourly(location.latitude, location.longitude).await {
        Ok(hourly) => hourly,
        Err(e) => {
            log_provider_error("fetch_hourly", user_id, &e.to_string());
            return TickReport::failure();
        }
    };

    let mut report = TickReport::default();
    let cooldown = Duration::hours(SUNNY_COOLDOWN_HOURS);

    for window in sunny_windows(&hourly, now) {
        match SentAlert::has_sent_within_cooldown(&ctx.db.pool, user_id, &window.bucket_key, cooldown, now).await {
            Ok(true) => {
                log_alert_skipped(AlertKind::Sunny.as_str(), user_id, "already sent within cooldown");
                report.skipped += 1;
                continue;
            }
            Ok(false) => {}
            Err(e) => {
                log_database_error("has_sent_within_cooldown", "sent_alerts", &e.to_string());
                report.failed += 1;
                continue;
            }
        }

        let text = sunny_alert_message(&location.name, &window, &hourly);
        if deliver(&ctx, AlertKind::Sunny, user_id, &text).await {
            record_sent(&ctx, AlertKind::Sunny, user_id, &window.bucket_key, now).await;
            report.sent += 1;
        } else {
            report.failed += 1;
        }
    }

    report
}

async fn daily_for_user(
    ctx: AlertContext,
    kind: AlertKind,
    user_id: i64,
    location: Location,
    bucket_key: String,
    now: DateTime<Utc>,
) -> TickReport {
    let cooldown = Duration::hours(DAILY_COOLDOWN_HOURS);
    match SentAlert::has_sent_within_cooldown(&ctx.db.pool, user_id, &bucket_key, cooldown, now).await {
        Ok(true) => {
            log_alert_skipped(kind.as_str(), user_id, "already sent today");
            return TickReport { skipped: 1, ..TickReport::default() };
        }
        Ok(false) => {}
        Err(e) => {
            log_database_error("has_sent_within_cooldown", "sent_alerts", &e.to_string());
            return TickReport::failure();
        }
    }

    let text = match kind {
        AlertKind::RainOrUv => {
            let daily = match ctx.gateway.fetch_daily(location.latitude, location.longitude).await {
                Ok(daily) => daily,
                Err(e) => {
                    log_provider_error("fetch_daily", user_id, &e.to_string());
                    return TickReport::failure();
                }
            };
            match rain_uv_message(&location.name, &daily.today()) {
                Some(text) => text,
                None => {
                    log_alert_skipped(kind.as_str(), user_id, "no rain or UV advice today");
                    return TickReport { skipped: 1, ..TickReport::default() };
                }
            }
        }
        AlertKind::ForecastChange => forecast_change_message(&location.name),
        AlertKind::Sunny => return TickReport::default(),
    };

    if deliver(&ctx, kind, user_id, &text).await {
        record_sent(&ctx, kind, user_id, &bucket_key, now).await;
        TickReport { sent: 1, ..TickReport::default() }
    } else {
        TickReport::failure()
    }
}

/// Sends with the configured timeout. Failures are logged and reported as
/// `false` so the caller leaves the ledger untouched.
async fn deliver(ctx: &AlertContext, kind: AlertKind, user_id: i64, text: &str) -> bool {
    let timeout = ctx.settings.send_timeout;
    let result = match tokio::time::timeout(timeout, ctx.notifier.send(user_id, text)).await {
        Ok(result) => result,
        Err(_) => Err(NotifyError::Timeout(timeout.as_secs())),
    };

    match result {
        Ok(()) => true,
        Err(e) => {
            tracing::warn!("Failed to send {} alert to user {}: {}", kind, user_id, e);
            false
        }
    }
}

async fn record_sent(ctx: &AlertContext, kind: AlertKind, user_id: i64, bucket_key: &str, now: DateTime<Utc>) {
    match SentAlert::mark_sent(&ctx.db.pool, user_id, bucket_key, now).await {
        Ok(_) => log_alert_sent(kind.as_str(), user_id, bucket_key),
        Err(e) => log_database_error("mark_sent", "sent_alerts", &e.to_string()),
    }
}

fn log_tick(job: &str, report: &TickReport) {
    if report.candidates == 0 {
        tracing::debug!("{} tick: no candidates", job);
    } else {
        tracing::info!(
            "{} tick: {} candidates, {} sent, {} skipped, {} failed",
            job, report.candidates, report.sent, report.skipped, report.failed
        );
    }
}
