//! Error types for the bot

use thiserror::Error;

/// Errors produced while configuring the bot or serving a prompt
#[derive(Debug, Error)]
pub enum BotError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("inference request failed: {0}")]
    Inference(#[from] reqwest::Error),

    #[error("invalid image payload: {0}")]
    Image(#[from] image::ImageError),

    #[error("temporary file error: {0}")]
    Io(#[from] std::io::Error),

    #[error("telegram API error: {0}")]
    Telegram(#[from] teloxide::RequestError),

    #[error("background task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

/// Convenience alias
pub type BotResult<T> = Result<T, BotError>;
