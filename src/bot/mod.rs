pub mod commands;
pub mod handlers;

use std::sync::Arc;

use crate::database::connection::DatabaseManager;
use crate::weather::{ForecastGateway, Geocoder};

/// Shared handles for the chat handlers, injected through `dptree::deps!`.
#[derive(Clone)]
pub struct BotContext {
    pub db: Arc<DatabaseManager>,
    pub gateway: Arc<dyn ForecastGateway>,
    pub geocoder: Arc<dyn Geocoder>,
}
