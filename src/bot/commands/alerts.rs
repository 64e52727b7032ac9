use teloxide::prelude::*;
use teloxide::types::{InlineKeyboardButton, InlineKeyboardMarkup};

use crate::database::models::{AlertKind, Subscription, Trigger};

pub fn alerts_keyboard() -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(vec![
        vec![InlineKeyboardButton::callback("☀️ Sunny Weather Alert", "alert_sunny")],
        vec![InlineKeyboardButton::callback("🌂 Rain/UV Reminder", "alert_rain_uv")],
        vec![InlineKeyboardButton::callback("📅 Forecast Change Alert", "alert_forecast_change")],
        vec![InlineKeyboardButton::callback("📋 View My Alerts", "view_alerts")],
        vec![InlineKeyboardButton::callback("🗑️ Delete Alerts", "delete_alerts")],
    ])
}

pub async fn handle_alerts(bot: Bot, msg: Message) -> ResponseResult<()> {
    bot.send_message(msg.chat.id, "🔔 Weather Alerts\n\nWhat would you like to do?")
        .reply_markup(alerts_keyboard())
        .await?;
    Ok(())
}

/// Confirmation shown after subscribing to `kind`.
pub fn subscribed_reply(kind: AlertKind) -> &'static str {
    match kind {
        AlertKind::Sunny => {
            "☀️ Sunny weather alert set!\n\nYou'll receive a notification 2 hours before any sunny weather is forecast in your area."
        }
        AlertKind::RainOrUv => {
            "🌂☀️ Rain/UV reminder set!\n\nYou'll receive daily reminders at 8:00 AM about bringing an umbrella or applying sunscreen based on the forecast."
        }
        AlertKind::ForecastChange => {
            "📅 Forecast change alert set!\n\nYou'll be notified at 6:00 PM about any significant changes to tomorrow's weather forecast."
        }
    }
}

/// Plain-text listing of active subscriptions, one line each, in the order
/// given. Rows with an unknown kind are skipped.
pub fn describe_subscriptions(subscriptions: &[Subscription]) -> String {
    if subscriptions.is_empty() {
        return "You don't have any active alerts.".to_string();
    }

    let mut text = String::from("📋 Your Active Alerts:\n\n");
    for subscription in subscriptions {
        let trigger = subscription.trigger_rule.as_str();
        let line = match (subscription.alert_kind(), subscription.trigger()) {
            (Some(AlertKind::Sunny), _) => "☀️ Sunny weather alert (2 hours before forecast)".to_string(),
            (Some(AlertKind::RainOrUv), Some(Trigger::At(_))) => format!("🌂☀️ Rain/UV reminder at {trigger}"),
            (Some(AlertKind::ForecastChange), Some(Trigger::At(_))) => {
                format!("📅 Forecast change alert at {trigger}")
            }
            (Some(kind), _) => format!("🔔 {kind} alert ({trigger})"),
            (None, _) => continue,
        };
        text.push_str(&line);
        text.push('\n');
    }
    text
}

#[cfg(test)]
mod tests {
    use super::*;

    fn subscription(kind: &str, trigger: &str) -> Subscription {
        Subscription {
            id: 1,
            user_id: 1,
            kind: kind.to_string(),
            trigger_rule: trigger.to_string(),
            conditions: String::new(),
            active: true,
            created_at: String::new(),
        }
    }

    #[test]
    fn test_describe_empty() {
        assert_eq!(describe_subscriptions(&[]), "You don't have any active alerts.");
    }

    #[test]
    fn test_describe_lists_each_subscription() {
        let text = describe_subscriptions(&[
            subscription("sunny", "next_sunny_hour"),
            subscription("rain_or_uv", "08:00"),
            subscription("forecast_change", "18:00"),
            subscription("rain_or_uv", "08:00"),
        ]);
        assert!(text.contains("Sunny weather alert"));
        assert!(text.contains("Forecast change alert at 18:00"));
        assert_eq!(text.matches("Rain/UV reminder at 08:00").count(), 2);
    }

    #[test]
    fn test_describe_skips_unknown_kinds() {
        let text = describe_subscriptions(&[subscription("hail", "08:00")]);
        assert_eq!(text, "📋 Your Active Alerts:\n\n");
    }

    #[test]
    fn test_keyboard_has_every_action() {
        let keyboard = alerts_keyboard();
        assert_eq!(keyboard.inline_keyboard.len(), 5);
    }
}
