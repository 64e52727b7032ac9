use teloxide::prelude::*;
use teloxide::types::{InlineKeyboardButton, InlineKeyboardMarkup};

use crate::bot::BotContext;
use crate::database::models::{Location, User};
use crate::utils::feedback::CommandFeedback;
use crate::utils::logging::{log_command_error, log_command_start, log_command_success, log_provider_error};
use crate::utils::validation::{validate_coordinates, validate_place_name};

pub const LOCATION_USAGE: &str = "Please provide a city name or latitude and longitude:
/location <city name>
/location <latitude> <longitude>

Examples: /location London or /location 51.5074 -0.1278";

/// What the user passed to `/location`.
#[derive(Debug, Clone, PartialEq)]
pub enum LocationQuery {
    Empty,
    Coordinates { latitude: f64, longitude: f64 },
    Place(String),
    Invalid(String),
}

/// Two numeric tokens are coordinates; anything else is a place name.
pub fn parse_location_args(args: &str) -> LocationQuery {
    let tokens: Vec<&str> = args.split_whitespace().collect();
    if tokens.is_empty() {
        return LocationQuery::Empty;
    }

    if let [lat, lon] = tokens.as_slice() {
        if let (Ok(latitude), Ok(longitude)) = (lat.parse::<f64>(), lon.parse::<f64>()) {
            return match validate_coordinates(latitude, longitude) {
                Ok(()) => LocationQuery::Coordinates { latitude, longitude },
                Err(e) => LocationQuery::Invalid(e.to_string()),
            };
        }
    }

    let joined = tokens.join(" ");
    match validate_place_name(&joined) {
        Ok(name) => LocationQuery::Place(name.to_string()),
        Err(e) => LocationQuery::Invalid(e.to_string()),
    }
}

pub fn saved_reply(location: &Location) -> String {
    format!(
        "📍 Location saved: {}\n\nUse /weather to get your local weather forecast!",
        location.name
    )
}

/// Resolves `/location` arguments, saves the result and returns the reply.
/// Geocoding failures become an apology rather than an error.
pub async fn apply_location(
    ctx: &BotContext,
    user_id: i64,
    username: Option<&str>,
    args: &str,
) -> Result<String, sqlx::Error> {
    let location = match parse_location_args(args) {
        LocationQuery::Empty => return Ok(LOCATION_USAGE.to_string()),
        LocationQuery::Invalid(reason) => {
            return Ok(format!("❌ {reason}\n\n{LOCATION_USAGE}"));
        }
        LocationQuery::Coordinates { latitude, longitude } => Location::from_coordinates(latitude, longitude),
        LocationQuery::Place(name) => match ctx.geocoder.search(&name).await {
            Ok(Some(location)) => location,
            Ok(None) => {
                return Ok(format!(
                    "Sorry, I couldn't find a location for '{name}'.\nPlease try another city or use coordinates."
                ));
            }
            Err(e) => {
                log_provider_error("geocode", user_id, &e.to_string());
                return Ok(format!(
                    "Sorry, I couldn't find a location for '{name}'.\nPlease try another city or use coordinates."
                ));
            }
        },
    };

    User::set_location(&ctx.db.pool, user_id, username, &location).await?;
    Ok(saved_reply(&location))
}

pub async fn handle_location(bot: Bot, msg: Message, args: String, ctx: &BotContext) -> ResponseResult<()> {
    let Some(user) = msg.from() else {
        return Ok(());
    };
    let user_id = user.id.0 as i64;
    let username = user.username.as_deref();
    let display = username.unwrap_or("unknown");

    log_command_start("location", display, user_id, Some(args.trim()));

    match apply_location(ctx, user_id, username, &args).await {
        Ok(reply) => {
            bot.send_message(msg.chat.id, reply).await?;
            log_command_success("location", display, user_id, None);
        }
        Err(e) => {
            log_command_error("location", display, user_id, &e.to_string());
            CommandFeedback::new(bot, msg.chat.id)
                .error("Failed to save your location. Please try again.")
                .await?;
        }
    }
    Ok(())
}

/// Saves a location shared through Telegram's attachment menu.
pub async fn handle_shared_location(bot: Bot, msg: Message, ctx: &BotContext) -> ResponseResult<()> {
    let (Some(user), Some(shared)) = (msg.from(), msg.location()) else {
        return Ok(());
    };
    let user_id = user.id.0 as i64;
    let username = user.username.as_deref();
    let location = Location::from_coordinates(shared.latitude, shared.longitude);

    match User::set_location(&ctx.db.pool, user_id, username, &location).await {
        Ok(()) => {
            bot.send_message(msg.chat.id, saved_reply(&location)).await?;
            log_command_success("shared_location", username.unwrap_or("unknown"), user_id, Some(&location.name));
        }
        Err(e) => {
            log_command_error("shared_location", username.unwrap_or("unknown"), user_id, &e.to_string());
            CommandFeedback::new(bot, msg.chat.id)
                .error("Failed to save your location. Please try again.")
                .await?;
        }
    }
    Ok(())
}

pub fn set_location_keyboard() -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(vec![
        vec![InlineKeyboardButton::callback("Share Location", "share_location")],
        vec![InlineKeyboardButton::callback("Enter Manually", "manual_location")],
    ])
}

pub async fn handle_set_location(bot: Bot, msg: Message) -> ResponseResult<()> {
    bot.send_message(msg.chat.id, "How would you like to set your location?")
        .reply_markup(set_location_keyboard())
        .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_empty() {
        assert_eq!(parse_location_args(""), LocationQuery::Empty);
        assert_eq!(parse_location_args("   "), LocationQuery::Empty);
    }

    #[test]
    fn test_parse_coordinates() {
        assert_eq!(
            parse_location_args("51.5074 -0.1278"),
            LocationQuery::Coordinates { latitude: 51.5074, longitude: -0.1278 }
        );
    }

    #[test]
    fn test_parse_out_of_range_coordinates() {
        assert!(matches!(parse_location_args("95 10"), LocationQuery::Invalid(_)));
        assert!(matches!(parse_location_args("NaN 10"), LocationQuery::Invalid(_)));
    }

    #[test]
    fn test_parse_place_names() {
        assert_eq!(parse_location_args("London"), LocationQuery::Place("London".to_string()));
        assert_eq!(
            parse_location_args("  New   York "),
            LocationQuery::Place("New York".to_string())
        );
        // one number is not a coordinate pair
        assert_eq!(parse_location_args("51.5"), LocationQuery::Place("51.5".to_string()));
        assert_eq!(
            parse_location_args("Royal Leamington Spa"),
            LocationQuery::Place("Royal Leamington Spa".to_string())
        );
    }

    #[test]
    fn test_saved_reply() {
        let reply = saved_reply(&Location::from_coordinates(51.5074, -0.1278));
        assert!(reply.starts_with("📍 Location saved: Lat: 51.51, Lon: -0.13"));
    }
}
