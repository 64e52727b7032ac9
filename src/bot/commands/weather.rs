use teloxide::prelude::*;
use teloxide::types::ParseMode;

use crate::bot::BotContext;
use crate::database::models::User;
use crate::services::evaluator::recommendations;
use crate::utils::feedback::CommandFeedback;
use crate::utils::logging::{log_command_error, log_command_start, log_command_success, log_provider_error};
use crate::utils::markdown::{bold, escape_markdown};
use crate::weather::codes::{describe_weather_code, wind_direction};
use crate::weather::WeatherReport;

const NO_LOCATION: &str = "Please set your location first using /setlocation or share your location.";
const FETCH_FAILED: &str = "Sorry, I couldn't fetch weather data at the moment.";

fn show(value: Option<f64>) -> String {
    value.map_or_else(|| "N/A".to_string(), |v| v.to_string())
}

fn line(icon: &str, label: &str, value: &str) -> String {
    format!("{} {} {}\n", icon, bold(label), escape_markdown(value))
}

/// MarkdownV2 report for `/weather`. Daily values come from today's entry;
/// the condition falls back to the current code and UV to the daily maximum
/// when the provider omitted them.
pub fn format_weather_report(report: &WeatherReport, location_name: &str) -> String {
    let current = &report.current;
    let today = report.daily.today();

    let code = today.weather_code.or(current.weather_code);
    let uv_index = current.uv_index.or(today.uv_index);
    let wind = current
        .wind_direction
        .map_or("N/A", wind_direction);

    let mut text = format!("🌤️ {}\n\n", bold(&format!("Weather for {location_name}")));
    text.push_str(&line(
        "🌡️",
        "Current:",
        &format!("{}°C (feels like {}°C)", show(current.temperature), show(current.apparent_temperature)),
    ));
    text.push_str(&line(
        "🌡️",
        "Today:",
        &format!("{}°C / {}°C", show(today.temperature_max), show(today.temperature_min)),
    ));
    text.push_str(&line("☁️", "Conditions:", code.map_or("Unknown", describe_weather_code)));
    text.push_str(&line("🌧️", "Rain Chance:", &format!("{}%", show(today.precipitation_probability))));
    text.push_str(&line("💨", "Wind:", &format!("{} km/h {}", show(current.wind_speed), wind)));
    text.push_str(&line("💧", "Humidity:", &format!("{}%", show(current.humidity))));
    text.push_str(&line("☀️", "UV Index:", &show(uv_index)));

    let advice = recommendations(code, today.precipitation_probability, uv_index);
    text.push('\n');
    text.push_str(&bold("Recommendations:"));
    text.push('\n');
    if advice.is_empty() {
        text.push_str(&escape_markdown("No special recommendations"));
    } else {
        text.push_str(&escape_markdown(&advice.join("\n")));
    }
    text
}

/// MarkdownV2 reply for `/weather`, including the no-location and
/// provider-failure replies.
pub async fn weather_reply(ctx: &BotContext, user_id: i64) -> Result<String, sqlx::Error> {
    let Some(location) = User::get_location(&ctx.db.pool, user_id).await? else {
        return Ok(escape_markdown(NO_LOCATION));
    };

    match ctx.gateway.fetch_report(location.latitude, location.longitude).await {
        Ok(report) => Ok(format_weather_report(&report, &location.name)),
        Err(e) => {
            log_provider_error("fetch_report", user_id, &e.to_string());
            Ok(escape_markdown(FETCH_FAILED))
        }
    }
}

pub async fn handle_weather(bot: Bot, msg: Message, ctx: &BotContext) -> ResponseResult<()> {
    let Some(user) = msg.from() else {
        return Ok(());
    };
    let user_id = user.id.0 as i64;
    let username = user.username.as_deref().unwrap_or("unknown");

    log_command_start("weather", username, user_id, None);

    match weather_reply(ctx, user_id).await {
        Ok(text) => {
            bot.send_message(msg.chat.id, text)
                .parse_mode(ParseMode::MarkdownV2)
                .await?;
            log_command_success("weather", username, user_id, None);
        }
        Err(e) => {
            log_command_error("weather", username, user_id, &e.to_string());
            CommandFeedback::new(bot, msg.chat.id)
                .error("Error processing weather data.")
                .await?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::weather::{CurrentConditions, DailyForecast};
    use chrono::NaiveDate;

    fn report() -> WeatherReport {
        WeatherReport {
            current: CurrentConditions {
                temperature: Some(14.2),
                apparent_temperature: Some(12.5),
                humidity: Some(70.0),
                precipitation_probability: None,
                weather_code: Some(3),
                wind_speed: Some(11.0),
                wind_direction: Some(225.0),
                uv_index: Some(6.5),
            },
            daily: DailyForecast {
                dates: vec![NaiveDate::from_ymd_opt(2024, 6, 1).unwrap()],
                temperature_max: vec![Some(18.0)],
                temperature_min: vec![Some(9.5)],
                precipitation_probability: vec![Some(65.0)],
                uv_index: vec![Some(7.0)],
                weather_code: vec![Some(61)],
            },
        }
    }

    #[test]
    fn test_report_contains_every_field() {
        let text = format_weather_report(&report(), "London, United Kingdom");
        assert!(text.contains("Weather for London, United Kingdom"));
        assert!(text.contains("14\\.2°C \\(feels like 12\\.5°C\\)"));
        assert!(text.contains("18°C / 9\\.5°C"));
        assert!(text.contains("Slight rain"));
        assert!(text.contains("65%"));
        assert!(text.contains("11 km/h SW"));
        assert!(text.contains("70%"));
        assert!(text.contains("6\\.5"));
        assert!(text.contains("🌂 Take an umbrella"));
        assert!(text.contains("🧴 Apply sunscreen \\(high UV\\)"));
    }

    #[test]
    fn test_report_with_missing_data() {
        let text = format_weather_report(&WeatherReport::default(), "Nowhere");
        assert!(text.contains("N/A°C"));
        assert!(text.contains("Unknown"));
        assert!(text.contains("N/A km/h N/A"));
        assert!(text.contains("No special recommendations"));
    }
}
