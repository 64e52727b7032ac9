use axum::{
    extract::State,
    http::StatusCode,
    response::Json,
    routing::get,
    Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

use crate::database::connection::DatabaseManager;
use crate::database::models::{SentAlert, Subscription, User};

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: DateTime<Utc>,
    pub version: String,
    pub database: DatabaseHealth,
    pub store: StoreStats,
    pub uptime_seconds: u64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DatabaseHealth {
    pub status: String,
    pub connection_pool_size: u32,
    pub response_time_ms: u64,
}

/// Row counts reported on `/health`. Zeroed when the database is down.
#[derive(Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct StoreStats {
    pub users: i64,
    pub active_subscriptions: i64,
    pub sent_alerts: i64,
}

impl StoreStats {
    async fn collect(db: &DatabaseManager) -> Result<Self, sqlx::Error> {
        Ok(Self {
            users: User::count(&db.pool).await?,
            active_subscriptions: Subscription::count_active(&db.pool).await?,
            sent_alerts: SentAlert::count(&db.pool).await?,
        })
    }
}

#[derive(Clone)]
pub struct AppState {
    pub db: Arc<DatabaseManager>,
    pub start_time: DateTime<Utc>,
}

pub struct HealthService {
    pub router: Router,
}

impl HealthService {
    pub fn new(db: Arc<DatabaseManager>) -> Self {
        let state = AppState {
            db,
            start_time: Utc::now(),
        };

        let router = Router::new()
            .route("/health", get(health_check))
            .route("/health/ready", get(readiness_check))
            .route("/health/live", get(liveness_check))
            .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()))
            .with_state(state);

        Self { router }
    }
}

async fn health_check(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let start = Instant::now();
    let db_ok = state.db.ping().await.is_ok();
    let response_time_ms = start.elapsed().as_millis() as u64;

    let store = if db_ok {
        StoreStats::collect(&state.db).await.unwrap_or_else(|e| {
            tracing::warn!("Failed to collect store statistics: {}", e);
            StoreStats::default()
        })
    } else {
        StoreStats::default()
    };

    let uptime_seconds = Utc::now()
        .signed_duration_since(state.start_time)
        .num_seconds()
        .max(0) as u64;

    let status = if db_ok { "healthy" } else { "unhealthy" };
    let response = HealthResponse {
        status: status.to_string(),
        timestamp: Utc::now(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        database: DatabaseHealth {
            status: status.to_string(),
            connection_pool_size: state.db.pool.size(),
            response_time_ms,
        },
        store,
        uptime_seconds,
    };

    let code = if db_ok { StatusCode::OK } else { StatusCode::SERVICE_UNAVAILABLE };
    (code, Json(response))
}

async fn readiness_check(State(state): State<AppState>) -> Result<Json<&'static str>, StatusCode> {
    match state.db.ping().await {
        Ok(_) => Ok(Json("ready")),
        Err(_) => Err(StatusCode::SERVICE_UNAVAILABLE),
    }
}

async fn liveness_check() -> Json<&'static str> {
    Json("alive")
}
