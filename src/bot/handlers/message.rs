use std::sync::Arc;

use teloxide::prelude::*;
use teloxide::utils::command::BotCommands;

use super::HandlerResult;
use crate::bot::commands::{alerts, location, weather, Command, WELCOME_TEXT};
use crate::bot::BotContext;

pub async fn command_handler(
    bot: Bot,
    msg: Message,
    cmd: Command,
    ctx: Arc<BotContext>,
) -> HandlerResult {
    match cmd {
        Command::Help => {
            bot.send_message(msg.chat.id, Command::descriptions().to_string()).await?;
        }
        Command::Start => {
            bot.send_message(msg.chat.id, WELCOME_TEXT).await?;
        }
        Command::Weather => {
            weather::handle_weather(bot, msg, &ctx).await?;
        }
        Command::SetLocation => {
            location::handle_set_location(bot, msg).await?;
        }
        Command::Location(args) => {
            location::handle_location(bot, msg, args, &ctx).await?;
        }
        Command::Alerts => {
            alerts::handle_alerts(bot, msg).await?;
        }
    }
    Ok(())
}

pub async fn location_handler(bot: Bot, msg: Message, ctx: Arc<BotContext>) -> HandlerResult {
    location::handle_shared_location(bot, msg, &ctx).await?;
    Ok(())
}
