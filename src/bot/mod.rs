//! Telegram front end
//!
//! Builds the teloxide handler tree and the Telegram-backed [`Replier`].

mod commands;
pub mod handlers;
pub mod messages;

use std::path::Path;

use teloxide::dispatching::{UpdateFilterExt, UpdateHandler};
use teloxide::prelude::*;
use teloxide::types::{InputFile, Me};
use tracing::debug;

use crate::error::{BotError, BotResult};
pub use commands::{is_prompt, Command};
pub use handlers::{Generator, Replier};

/// Replies into the chat a message came from
#[derive(Clone)]
pub struct TelegramReplier {
    bot: Bot,
    chat_id: ChatId,
}

impl TelegramReplier {
    pub fn new(bot: Bot, chat_id: ChatId) -> Self {
        Self { bot, chat_id }
    }
}

impl Replier for TelegramReplier {
    async fn reply_text(&self, text: String) -> BotResult<()> {
        self.bot.send_message(self.chat_id, text).await?;
        Ok(())
    }

    async fn reply_photo(&self, path: &Path, caption: String) -> BotResult<()> {
        self.bot
            .send_photo(self.chat_id, InputFile::file(path))
            .caption(caption)
            .await?;
        Ok(())
    }
}

/// Build the update handler tree
///
/// Commands are matched first; remaining non-command text is a prompt.
/// Everything else falls through to the dispatcher's default handler.
/// Expects a [`Generator`] and the bot's own [`Me`] among the dependencies.
pub fn schema() -> UpdateHandler<BotError> {
    let command_handler = Update::filter_message()
        .filter_map(|msg: Message, me: Me| {
            let username = me.user.username.as_deref().unwrap_or_default();
            msg.text().and_then(|text| Command::parse(text, username))
        })
        .endpoint(on_command);

    let prompt_handler = Update::filter_message()
        .filter(|msg: Message| msg.text().is_some_and(is_prompt))
        .endpoint(on_prompt);

    dptree::entry()
        .branch(command_handler)
        .branch(prompt_handler)
}

async fn on_command(bot: Bot, msg: Message, cmd: Command) -> BotResult<()> {
    debug!("Command {:?} in chat {}", cmd, msg.chat.id);
    let replier = TelegramReplier::new(bot, msg.chat.id);
    let result = handlers::handle_start(&replier).await;
    guard(&replier, &msg, result).await;
    Ok(())
}

async fn on_prompt(bot: Bot, msg: Message, generator: Generator) -> BotResult<()> {
    let replier = TelegramReplier::new(bot, msg.chat.id);
    let user_id = msg.from.as_ref().map(|user| user.id.0).unwrap_or_default();
    let prompt = msg.text().unwrap_or_default();
    let result = handlers::handle_prompt(&replier, &generator, user_id, prompt).await;
    guard(&replier, &msg, result).await;
    Ok(())
}

/// Route a handler failure through the error hook
async fn guard(replier: &TelegramReplier, msg: &Message, result: BotResult<()>) {
    if let Err(e) = result {
        let update = format!(
            "message {} in chat {} from {:?}",
            msg.id.0,
            msg.chat.id,
            msg.from.as_ref().map(|user| user.id.0)
        );
        handlers::report_failure(Some(replier), &update, &e).await;
    }
}
