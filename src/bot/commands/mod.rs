pub mod alerts;
pub mod location;
pub mod weather;

use teloxide::utils::command::BotCommands;

#[derive(BotCommands, Clone, Debug, PartialEq)]
#[command(rename_rule = "lowercase", description = "Weather Alert Bot commands:")]
pub enum Command {
    #[command(description = "Display this help message")]
    Help,
    #[command(description = "Start the bot")]
    Start,
    #[command(description = "Get current weather for your location")]
    Weather,
    #[command(description = "Set your location")]
    SetLocation,
    #[command(description = "Set location: /location <city> or /location <lat> <lon>")]
    Location(String),
    #[command(description = "Manage your weather alerts")]
    Alerts,
}

pub const WELCOME_TEXT: &str = "🌤️ Welcome to the Weather Alert Bot!

I can help you with:
• Live weather data from Open-Meteo
• Sunscreen/umbrella reminders based on UV and rain forecasts
• Location-based weather stats
• Sunny weather alerts
• Weather forecast change notifications

To get started, please share your location or use /setlocation to set your location manually.

Commands:
/weather - Get current weather
/setlocation - Set your location
/location - Set your location by city or coordinates
/alerts - Manage your weather alerts
/help - Show this help message";
