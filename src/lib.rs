//! imagebot - Telegram image generation bot
//!
//! Relays chat messages as prompts to a hosted text-to-image API and sends
//! the generated picture back to the sender.

pub mod bot;
pub mod config;
pub mod error;
pub mod images;
pub mod inference;

use teloxide::error_handlers::LoggingErrorHandler;
use teloxide::prelude::*;
use tracing::{debug, info, warn};

use bot::{Command, Generator};
use inference::InferenceClient;

pub use config::Config;
pub use error::{BotError, BotResult};

/// The running bot instance
pub struct ImageBot {
    bot: Bot,
    generator: Generator,
}

impl ImageBot {
    /// Create a new bot from loaded configuration
    pub fn new(config: Config) -> BotResult<Self> {
        let inference = InferenceClient::new(&config)?;
        let generator = Generator {
            inference,
            temp_dir: config.temp_dir.clone(),
        };

        Ok(Self {
            bot: Bot::new(&config.telegram_token),
            generator,
        })
    }

    /// Poll Telegram until SIGINT or SIGTERM
    pub async fn run(&self) -> BotResult<()> {
        if let Err(e) = self.bot.set_my_commands(Command::menu()).await {
            warn!("Failed to register bot commands: {}", e);
        }

        info!(
            "imagebot polling for updates (inference endpoint {})",
            self.generator.inference.url()
        );

        let mut dispatcher = Dispatcher::builder(self.bot.clone(), bot::schema())
            .dependencies(dptree::deps![self.generator.clone()])
            .default_handler(|update| async move {
                debug!("Ignoring update {}", update.id.0);
            })
            .error_handler(LoggingErrorHandler::with_custom_text(
                "An error has occurred in the dispatcher",
            ))
            .build();

        let token = dispatcher.shutdown_token();
        tokio::spawn(async move {
            shutdown_signal().await;
            match token.shutdown() {
                Ok(done) => {
                    info!("Waiting for in-flight updates to finish");
                    done.await;
                }
                Err(e) => warn!("Dispatcher was not running at shutdown: {}", e),
            }
        });

        dispatcher.dispatch().await;

        info!("imagebot shutdown complete");
        Ok(())
    }
}

/// Resolves when the process receives SIGINT or SIGTERM
///
/// On non-Unix only Ctrl-C is available.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                warn!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };
    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received SIGINT, shutting down"),
        _ = terminate => info!("Received SIGTERM, shutting down"),
    }
}
