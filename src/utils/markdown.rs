//! Telegram MarkdownV2 helpers.
//!
//! Every character MarkdownV2 treats as markup must be backslash-escaped when
//! it is meant literally, including `.`, `-` and `!` which show up constantly
//! in weather text ("12.5°C", "-3°C", "Sunny!").

const SPECIAL: &[char] = &[
    '_', '*', '[', ']', '(', ')', '~', '`', '>', '#', '+', '-', '=', '|', '{', '}', '.', '!', '\\',
];

/// Escapes markdown special characters for MarkdownV2 parsing mode.
///
/// # Example
/// ```
/// use weather_alert_bot::utils::markdown::escape_markdown;
///
/// assert_eq!(escape_markdown("12.5°C (feels like -1)"), "12\\.5°C \\(feels like \\-1\\)");
/// ```
pub fn escape_markdown(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        if SPECIAL.contains(&c) {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// Escaped text wrapped in MarkdownV2 bold markers.
pub fn bold(text: &str) -> String {
    format!("*{}*", escape_markdown(text))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_temperatures_and_percentages() {
        assert_eq!(escape_markdown("21.4°C / 12.0°C"), "21\\.4°C / 12\\.0°C");
        assert_eq!(escape_markdown("-2°C"), "\\-2°C");
        assert_eq!(escape_markdown("40%"), "40%");
    }

    #[test]
    fn test_escape_location_names() {
        assert_eq!(escape_markdown("Lat: 51.51, Lon: -0.13"), "Lat: 51\\.51, Lon: \\-0\\.13");
        assert_eq!(escape_markdown("Stratford-upon-Avon, United Kingdom"), "Stratford\\-upon\\-Avon, United Kingdom");
    }

    #[test]
    fn test_escape_markup_characters() {
        assert_eq!(escape_markdown("*bold* _it_ `code`"), "\\*bold\\* \\_it\\_ \\`code\\`");
        assert_eq!(escape_markdown("[link](url)"), "\\[link\\]\\(url\\)");
        assert_eq!(escape_markdown("a\\b"), "a\\\\b");
    }

    #[test]
    fn test_escape_plain_text_untouched() {
        assert_eq!(escape_markdown(""), "");
        assert_eq!(escape_markdown("Clear sky"), "Clear sky");
    }

    #[test]
    fn test_bold() {
        assert_eq!(bold("Weather for Paris, France"), "*Weather for Paris, France*");
        assert_eq!(bold("UV 6.5"), "*UV 6\\.5*");
    }
}
