use std::sync::Arc;

use teloxide::prelude::*;

use super::HandlerResult;
use crate::bot::commands::alerts::{describe_subscriptions, subscribed_reply};
use crate::bot::BotContext;
use crate::database::connection::DatabaseManager;
use crate::database::models::{AlertKind, Subscription, User};
use crate::utils::logging::{log_command_error, log_command_start, log_command_success};

const NEEDS_LOCATION: &str = "Please set your location first using /setlocation";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallbackAction {
    ShareLocation,
    ManualLocation,
    Subscribe(AlertKind),
    ViewAlerts,
    DeleteAlerts,
}

impl CallbackAction {
    pub fn parse(data: &str) -> Option<Self> {
        match data {
            "share_location" => Some(Self::ShareLocation),
            "manual_location" => Some(Self::ManualLocation),
            "alert_sunny" => Some(Self::Subscribe(AlertKind::Sunny)),
            "alert_rain_uv" => Some(Self::Subscribe(AlertKind::RainOrUv)),
            "alert_forecast_change" => Some(Self::Subscribe(AlertKind::ForecastChange)),
            "view_alerts" => Some(Self::ViewAlerts),
            "delete_alerts" => Some(Self::DeleteAlerts),
            _ => None,
        }
    }

    /// Performs the store side of the action and returns the text that
    /// replaces the menu message.
    pub async fn apply(self, db: &DatabaseManager, user_id: i64) -> Result<String, sqlx::Error> {
        match self {
            Self::ShareLocation => Ok(
                "Please share your location using the 📎 attachment button and selecting 'Location'.".to_string(),
            ),
            Self::ManualLocation => Ok(
                "Please send me your location in the format:\n/location <latitude> <longitude>\nor\n/location <city name>\n\nExample: /location 51.5074 -0.1278".to_string(),
            ),
            Self::Subscribe(kind) => {
                if User::get_location(&db.pool, user_id).await?.is_none() {
                    return Ok(NEEDS_LOCATION.to_string());
                }
                Subscription::subscribe(&db.pool, user_id, kind).await?;
                Ok(subscribed_reply(kind).to_string())
            }
            Self::ViewAlerts => {
                let subscriptions = Subscription::list_active(&db.pool, user_id).await?;
                Ok(describe_subscriptions(&subscriptions))
            }
            Self::DeleteAlerts => {
                Subscription::deactivate_all(&db.pool, user_id).await?;
                Ok("🗑️ All your alerts have been deleted.".to_string())
            }
        }
    }
}

pub async fn callback_handler(bot: Bot, q: CallbackQuery, ctx: Arc<BotContext>) -> HandlerResult {
    let user_id = q.from.id.0 as i64;
    let username = q.from.username.clone().unwrap_or_else(|| "unknown".to_string());
    let data = q.data.clone().unwrap_or_default();

    let Some(action) = CallbackAction::parse(&data) else {
        tracing::warn!("Unknown callback data '{}' from user {}", data, user_id);
        bot.answer_callback_query(q.id).text("Unknown action").await?;
        return Ok(());
    };

    log_command_start("callback", &username, user_id, Some(&data));

    let reply = match action.apply(&ctx.db, user_id).await {
        Ok(reply) => reply,
        Err(e) => {
            log_command_error("callback", &username, user_id, &e.to_string());
            bot.answer_callback_query(q.id)
                .text("Something went wrong, please try again")
                .await?;
            return Ok(());
        }
    };

    bot.answer_callback_query(q.id).await?;
    match q.message {
        Some(message) => {
            bot.edit_message_text(message.chat.id, message.id, reply).await?;
        }
        None => {
            bot.send_message(ChatId(user_id), reply).await?;
        }
    }

    log_command_success("callback", &username, user_id, Some(&data));
    Ok(())
}
