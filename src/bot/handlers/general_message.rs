use teloxide::prelude::*;

use super::HandlerResult;
use crate::utils::feedback::CommandFeedback;

/// What to say to a message that is neither a known command nor a location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Hint {
    UnknownCommand(String),
    Weather,
    Help,
}

pub fn hint_for(text: &str) -> Option<Hint> {
    if text.starts_with('/') {
        let command = text.split_whitespace().next().unwrap_or(text);
        return Some(Hint::UnknownCommand(command.to_string()));
    }

    let lowered = text.to_lowercase();
    if lowered.contains("weather") {
        Some(Hint::Weather)
    } else if lowered.contains("help") {
        Some(Hint::Help)
    } else {
        None
    }
}

pub async fn general_message_handler(bot: Bot, msg: Message) -> HandlerResult {
    let Some(hint) = msg.text().and_then(hint_for) else {
        // Other chatter gets no reply
        return Ok(());
    };

    let feedback = CommandFeedback::new(bot, msg.chat.id);
    match hint {
        Hint::UnknownCommand(command) => {
            feedback
                .validation_error(
                    &format!("Unknown command: {command}"),
                    "Use /help to see all available commands, or check your command syntax.",
                )
                .await?;
        }
        Hint::Weather => {
            feedback
                .info("Looking for the weather? Use /weather, or /setlocation first if you haven't saved a location yet.")
                .await?;
        }
        Hint::Help => {
            feedback.info("Use /help to see all available commands!").await?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hints() {
        assert_eq!(
            hint_for("/forecast tomorrow"),
            Some(Hint::UnknownCommand("/forecast".to_string()))
        );
        assert_eq!(hint_for("What's the Weather like?"), Some(Hint::Weather));
        assert_eq!(hint_for("help me"), Some(Hint::Help));
        assert_eq!(hint_for("good morning"), None);
    }
}
