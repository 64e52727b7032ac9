pub mod callback;
pub mod general_message;
pub mod message;

use std::sync::Arc;

use teloxide::{dispatching::UpdateHandler, prelude::*};

use crate::bot::commands::Command;
use crate::bot::BotContext;

pub type HandlerError = Box<dyn std::error::Error + Send + Sync + 'static>;
pub type HandlerResult = Result<(), HandlerError>;

pub struct BotHandler {
    ctx: Arc<BotContext>,
}

impl BotHandler {
    pub fn new(ctx: BotContext) -> Self {
        Self { ctx: Arc::new(ctx) }
    }

    /// Dependency for the dispatcher; endpoints receive it as `Arc<BotContext>`.
    pub fn context(&self) -> Arc<BotContext> {
        self.ctx.clone()
    }

    pub fn schema(&self) -> UpdateHandler<HandlerError> {
        use teloxide::dispatching::UpdateFilterExt;

        let message_handler = Update::filter_message()
            .branch(
                dptree::entry()
                    .filter_command::<Command>()
                    .endpoint(message::command_handler),
            )
            .branch(
                dptree::filter(|msg: Message| msg.location().is_some())
                    .endpoint(message::location_handler),
            )
            .branch(dptree::endpoint(general_message::general_message_handler));

        let callback_handler = Update::filter_callback_query().endpoint(callback::callback_handler);

        dptree::entry()
            .branch(message_handler)
            .branch(callback_handler)
    }
}
