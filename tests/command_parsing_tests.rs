#![allow(clippy::unwrap_used)]

use teloxide::utils::command::BotCommands;
use weather_alert_bot::bot::commands::location::{parse_location_args, LocationQuery};
use weather_alert_bot::bot::commands::Command;
use weather_alert_bot::bot::handlers::callback::CallbackAction;
use weather_alert_bot::bot::handlers::general_message::{hint_for, Hint};
use weather_alert_bot::database::models::AlertKind;

#[cfg(test)]
mod command_parsing_tests {
    use super::*;

    #[test]
    fn test_simple_commands() {
        let cases = [
            ("/help", Command::Help),
            ("/start", Command::Start),
            ("/weather", Command::Weather),
            ("/setlocation", Command::SetLocation),
            ("/alerts", Command::Alerts),
        ];
        for (input, expected) in cases {
            assert_eq!(Command::parse(input, "testbot").unwrap(), expected, "{input}");
        }
    }

    #[test]
    fn test_command_with_bot_mention() {
        assert_eq!(Command::parse("/weather@testbot", "testbot").unwrap(), Command::Weather);
    }

    #[test]
    fn test_location_command_keeps_arguments() {
        assert_eq!(
            Command::parse("/location New York", "testbot").unwrap(),
            Command::Location("New York".to_string())
        );
    }

    #[test]
    fn test_old_commands_are_gone() {
        for input in ["/schedule", "/list", "/confirm 1", "/stats"] {
            assert!(Command::parse(input, "testbot").is_err(), "{input}");
        }
    }
}

#[cfg(test)]
mod location_args_tests {
    use super::*;

    #[test]
    fn test_coordinate_pair() {
        assert_eq!(
            parse_location_args("-33.8688 151.2093"),
            LocationQuery::Coordinates { latitude: -33.8688, longitude: 151.2093 }
        );
    }

    #[test]
    fn test_non_numeric_pair_is_a_place() {
        assert_eq!(
            parse_location_args("Los Angeles"),
            LocationQuery::Place("Los Angeles".to_string())
        );
        assert_eq!(
            parse_location_args("51.5 north"),
            LocationQuery::Place("51.5 north".to_string())
        );
    }

    #[test]
    fn test_three_numbers_are_a_place() {
        assert_eq!(parse_location_args("1 2 3"), LocationQuery::Place("1 2 3".to_string()));
    }

    #[test]
    fn test_out_of_range_pair_is_rejected() {
        assert!(matches!(parse_location_args("51.5 190"), LocationQuery::Invalid(_)));
    }

    #[test]
    fn test_overlong_place_is_rejected() {
        assert!(matches!(parse_location_args(&"x".repeat(101)), LocationQuery::Invalid(_)));
    }
}

#[cfg(test)]
mod callback_and_hint_tests {
    use super::*;

    #[test]
    fn test_every_menu_button_parses() {
        let expected = [
            ("share_location", CallbackAction::ShareLocation),
            ("manual_location", CallbackAction::ManualLocation),
            ("alert_sunny", CallbackAction::Subscribe(AlertKind::Sunny)),
            ("alert_rain_uv", CallbackAction::Subscribe(AlertKind::RainOrUv)),
            ("alert_forecast_change", CallbackAction::Subscribe(AlertKind::ForecastChange)),
            ("view_alerts", CallbackAction::ViewAlerts),
            ("delete_alerts", CallbackAction::DeleteAlerts),
        ];
        for (data, action) in expected {
            assert_eq!(CallbackAction::parse(data), Some(action), "{data}");
        }
        assert_eq!(CallbackAction::parse("alert_hail"), None);
    }

    #[test]
    fn test_free_text_hints() {
        assert_eq!(hint_for("/unknown"), Some(Hint::UnknownCommand("/unknown".to_string())));
        assert_eq!(hint_for("is the WEATHER nice?"), Some(Hint::Weather));
        assert_eq!(hint_for("I need help"), Some(Hint::Help));
        assert_eq!(hint_for("thanks!"), None);
    }
}
