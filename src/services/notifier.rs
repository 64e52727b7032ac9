use async_trait::async_trait;
use teloxide::prelude::*;
use teloxide::types::ParseMode;

#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    #[error("Telegram request failed: {0}")]
    Telegram(#[from] teloxide::RequestError),
    #[error("Delivery timed out after {0}s")]
    Timeout(u64),
    #[error("Delivery rejected: {0}")]
    Rejected(String),
}

/// Outbound message sink for alerts. Text is MarkdownV2.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, user_id: i64, text: &str) -> Result<(), NotifyError>;
}

pub struct TelegramNotifier {
    bot: Bot,
}

impl TelegramNotifier {
    pub fn new(bot: Bot) -> Self {
        Self { bot }
    }
}

#[async_trait]
impl Notifier for TelegramNotifier {
    async fn send(&self, user_id: i64, text: &str) -> Result<(), NotifyError> {
        self.bot
            .send_message(ChatId(user_id), text)
            .parse_mode(ParseMode::MarkdownV2)
            .await?;
        Ok(())
    }
}
