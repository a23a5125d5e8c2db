//! Bot command parsing

use teloxide::types::BotCommand;

/// Commands the bot answers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Start,
    Help,
}

impl Command {
    /// Parse a command from message text
    ///
    /// Arguments are ignored. A command addressed to another bot
    /// (`/start@otherbot`) is not ours and yields `None`, as do plain text
    /// and commands the bot does not know.
    pub fn parse(text: &str, bot_username: &str) -> Option<Command> {
        let token = text.split_whitespace().next()?.strip_prefix('/')?;
        let (name, addressee) = match token.split_once('@') {
            Some((name, addressee)) => (name, Some(addressee)),
            None => (token, None),
        };
        if addressee.is_some_and(|a| !a.eq_ignore_ascii_case(bot_username)) {
            return None;
        }
        match name.to_lowercase().as_str() {
            "start" => Some(Command::Start),
            "help" => Some(Command::Help),
            _ => None,
        }
    }

    /// Entries for Telegram's command menu
    pub fn menu() -> Vec<BotCommand> {
        vec![
            BotCommand::new("start", "Show how to use the bot"),
            BotCommand::new("help", "Show how to use the bot"),
        ]
    }
}

/// True for text that should be treated as an image prompt
pub fn is_prompt(text: &str) -> bool {
    !text.trim_start().starts_with('/') && !text.trim().is_empty()
}
