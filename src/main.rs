//! # Weather Alert Bot Main Entry Point
//!
//! Initializes logging, loads configuration, sets up the database, starts the
//! alert service and the health endpoint, and runs the Telegram dispatcher.

use anyhow::Result;
use std::sync::Arc;
use teloxide::prelude::*;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use weather_alert_bot::bot::handlers::BotHandler;
use weather_alert_bot::bot::BotContext;
use weather_alert_bot::config::Config;
use weather_alert_bot::database::connection::DatabaseManager;
use weather_alert_bot::services::alerts::{AlertContext, AlertService, AlertSettings};
use weather_alert_bot::services::health::HealthService;
use weather_alert_bot::services::notifier::TelegramNotifier;
use weather_alert_bot::utils::logging::log_system_event;
use weather_alert_bot::weather::{OpenMeteoClient, OpenMeteoGeocoder};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "weather_alert_bot=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    dotenvy::dotenv().ok();
    let config = Config::from_env()?;

    info!("Starting Weather Alert Bot v{}", env!("CARGO_PKG_VERSION"));
    info!(
        "Configuration loaded - Database: {}, HTTP Port: {}, alert offset UTC{:+}",
        config.database_url, config.http_port, config.alert_utc_offset_hours
    );

    info!("Initializing database connection...");
    let db_manager = DatabaseManager::new(&config.database_url).await?;
    info!("Running database migrations...");
    db_manager.run_migrations().await?;
    let db = Arc::new(db_manager);
    info!("Database initialized successfully");

    let gateway = Arc::new(OpenMeteoClient::new(&config.weather_api_url, config.request_timeout())?);
    let geocoder = Arc::new(OpenMeteoGeocoder::new(&config.geocoding_api_url, config.request_timeout())?);

    let bot = Bot::new(&config.telegram_bot_token);
    let handler = BotHandler::new(BotContext {
        db: db.clone(),
        gateway: gateway.clone(),
        geocoder,
    });

    let alert_context = AlertContext {
        db: db.clone(),
        gateway,
        notifier: Arc::new(TelegramNotifier::new(bot.clone())),
        settings: AlertSettings::from_config(&config),
    };
    let mut alert_service = AlertService::new(alert_context)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to create alert service: {}", e))?;

    if let Err(e) = alert_service.start().await {
        tracing::error!("Failed to start alert service: {}", e);
    }

    let health_service = HealthService::new(db.clone());
    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", config.http_port))
        .await
        .map_err(|e| anyhow::anyhow!("Failed to bind to port {}: {}", config.http_port, e))?;
    info!("Health check server starting on port {}", config.http_port);

    let bot_task = tokio::spawn(async move {
        Dispatcher::builder(bot, handler.schema())
            .dependencies(dptree::deps![handler.context()])
            .enable_ctrlc_handler()
            .build()
            .dispatch()
            .await;
    });

    let health_task = tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, health_service.router).await {
            tracing::error!("Health server error: {}", e);
        }
    });

    tokio::select! {
        result = bot_task => {
            if let Err(e) = result {
                tracing::error!("Bot task error: {}", e);
            }
        }
        result = health_task => {
            if let Err(e) = result {
                tracing::error!("Health task error: {}", e);
            }
        }
    }

    if let Err(e) = alert_service.stop().await {
        tracing::warn!("Error stopping alert service: {}", e);
    }

    log_system_event("Application stopped", None);
    Ok(())
}
