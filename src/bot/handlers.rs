//! Command and prompt handlers
//!
//! Handlers talk back to the chat through [`Replier`], so the same code
//! runs against Telegram in production and a recorder in tests.

use std::future::Future;
use std::path::{Path, PathBuf};

use tracing::{error, info};

use super::messages;
use crate::error::{BotError, BotResult};
use crate::images;
use crate::inference::{Generation, InferenceClient};

/// Outbound side of a chat
pub trait Replier: Sync {
    /// Send a text message
    fn reply_text(&self, text: String) -> impl Future<Output = BotResult<()>> + Send;

    /// Send the image file at `path` as a photo
    fn reply_photo(
        &self,
        path: &Path,
        caption: String,
    ) -> impl Future<Output = BotResult<()>> + Send;
}

/// What the prompt handler needs besides the chat
#[derive(Debug, Clone)]
pub struct Generator {
    pub inference: InferenceClient,
    pub temp_dir: PathBuf,
}

/// Answer `/start` (and `/help`) with the usage text
pub async fn handle_start<R: Replier>(replier: &R) -> BotResult<()> {
    replier.reply_text(messages::USAGE.to_string()).await
}

/// Turn a prompt into an image and send it back
///
/// Only a failure to deliver the acknowledgement or the generic apology
/// escapes as an error; everything between is reported to the user.
pub async fn handle_prompt<R: Replier>(
    replier: &R,
    generator: &Generator,
    user_id: u64,
    prompt: &str,
) -> BotResult<()> {
    info!("Prompt from user {}: {}", user_id, prompt);
    replier.reply_text(messages::processing(prompt)).await?;

    if let Err(e) = generate_and_send(replier, generator, user_id, prompt).await {
        error!("Image generation for user {} failed: {}", user_id, e);
        replier
            .reply_text(messages::GENERATION_FAILED.to_string())
            .await?;
    }
    Ok(())
}

async fn generate_and_send<R: Replier>(
    replier: &R,
    generator: &Generator,
    user_id: u64,
    prompt: &str,
) -> BotResult<()> {
    match generator.inference.generate(prompt).await? {
        Generation::Image(data) => {
            let image = images::stage(data, generator.temp_dir.clone(), user_id).await?;

            let sent = replier
                .reply_photo(image.path(), messages::caption(prompt))
                .await;
            tokio::task::spawn_blocking(move || image.remove()).await??;
            sent?;

            info!("Sent image to user {}", user_id);
        }
        Generation::Rejected { status, body } => {
            info!("Inference rejected prompt from user {} ({})", user_id, status);
            replier.reply_text(messages::rejected(&body)).await?;
        }
    }
    Ok(())
}

/// Outer error hook: log what escaped a handler and apologise if possible
pub async fn report_failure<R: Replier>(replier: Option<&R>, update: &str, err: &BotError) {
    error!("Update {} caused error: {}", update, err);
    if let Some(replier) = replier {
        if let Err(e) = replier
            .reply_text(messages::UNHANDLED_ERROR.to_string())
            .await
        {
            error!("Failed to deliver error notice for update {}: {}", update, e);
        }
    }
}
