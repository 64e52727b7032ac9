//! # Weather Alert Bot
//!
//! A Telegram bot that reports the weather for a saved location and sends
//! forecast-driven alerts.
//!
//! ## Features
//! - `/weather` reports from Open-Meteo for coordinates or a geocoded city
//! - Sunny-weather alerts two hours ahead of a clear-sky forecast hour
//! - Daily rain/UV reminders and forecast-change notices at fixed times
//! - A dedup ledger so no alert is delivered twice for the same forecast
//! - Persistent storage with SQLite

/// Bot command handlers and message processing
pub mod bot;
/// Configuration management and environment variables
pub mod config;
/// Database models, connections, and migrations
pub mod database;
/// Alert scheduling, evaluation, delivery and the health endpoint
pub mod services;
/// Utility functions for datetime, validation, and formatting
pub mod utils;
/// Forecast and geocoding clients
pub mod weather;
