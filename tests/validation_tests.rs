use weather_alert_bot::utils::markdown::{bold, escape_markdown};
use weather_alert_bot::utils::validation::*;

#[cfg(test)]
mod validation_tests {
    use super::*;

    #[test]
    fn test_valid_coordinates() {
        let valid = [(0.0, 0.0), (90.0, 180.0), (-90.0, -180.0), (51.5074, -0.1278)];
        for (lat, lon) in valid {
            assert!(validate_coordinates(lat, lon).is_ok(), "Should accept {lat}, {lon}");
        }
    }

    #[test]
    fn test_invalid_coordinates() {
        let invalid = [(90.1, 0.0), (-91.0, 0.0), (0.0, 180.5), (0.0, -181.0), (f64::NAN, 0.0), (0.0, f64::INFINITY)];
        for (lat, lon) in invalid {
            assert!(validate_coordinates(lat, lon).is_err(), "Should reject {lat}, {lon}");
        }
    }

    #[test]
    fn test_place_names() {
        assert_eq!(validate_place_name("  Paris  ").ok(), Some("Paris"));
        assert!(validate_place_name(&"A".repeat(100)).is_ok());
        assert!(validate_place_name(&"A".repeat(101)).is_err());
        assert!(validate_place_name("   ").is_err());
        assert!(validate_place_name("Paris\nFrance").is_err());
    }
}

#[cfg(test)]
mod markdown_tests {
    use super::*;

    #[test]
    fn test_escape_weather_text() {
        assert_eq!(escape_markdown("-3.5°C"), "\\-3\\.5°C");
        assert_eq!(escape_markdown("Rain (light)!"), "Rain \\(light\\)\\!");
        assert_eq!(escape_markdown("plain text"), "plain text");
    }

    #[test]
    fn test_bold_escapes_contents() {
        assert_eq!(bold("Today:"), "*Today:*");
        assert_eq!(bold("St. Ives"), "*St\\. Ives*");
    }
}
