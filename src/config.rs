//! Bot configuration
//!
//! Layered with figment, later layers winning:
//! 1. Built-in defaults
//! 2. Optional TOML file
//! 3. `TELEGRAM_TOKEN` / `HF_API_KEY`
//! 4. `IMAGEBOT_*` environment variables

use std::path::{Path, PathBuf};

use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};

use crate::error::{BotError, BotResult};

/// Stable Diffusion XL on the Hugging Face inference API
pub const DEFAULT_INFERENCE_URL: &str =
    "https://api-inference.huggingface.co/models/stabilityai/stable-diffusion-xl-base-1.0";

/// Config file read when `--config` is not given
pub const DEFAULT_CONFIG_FILE: &str = "imagebot.toml";

/// Default denoising steps sent with every request
pub const DEFAULT_INFERENCE_STEPS: u32 = 30;

/// Default classifier-free guidance scale sent with every request
pub const DEFAULT_GUIDANCE_SCALE: f32 = 7.5;

/// Runtime configuration, loaded once at startup
#[derive(Clone, Deserialize)]
pub struct Config {
    /// Telegram Bot API token (from @BotFather)
    pub telegram_token: String,
    /// Hugging Face API key, sent as a bearer credential
    pub hf_api_key: String,
    /// Inference endpoint prompts are posted to
    pub inference_url: String,
    /// `num_inference_steps` request parameter
    pub num_inference_steps: u32,
    /// `guidance_scale` request parameter
    pub guidance_scale: f32,
    /// Directory for transient image files
    pub temp_dir: PathBuf,
    /// Optional bound on the inference request; unbounded when absent
    pub request_timeout_secs: Option<u64>,
}

/// Defaults for everything except the two secrets
#[derive(Serialize)]
struct Defaults {
    inference_url: &'static str,
    num_inference_steps: u32,
    guidance_scale: f32,
    temp_dir: &'static str,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            inference_url: DEFAULT_INFERENCE_URL,
            num_inference_steps: DEFAULT_INFERENCE_STEPS,
            guidance_scale: DEFAULT_GUIDANCE_SCALE,
            temp_dir: ".",
        }
    }
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("telegram_token", &"[REDACTED]")
            .field("hf_api_key", &"[REDACTED]")
            .field("inference_url", &self.inference_url)
            .field("num_inference_steps", &self.num_inference_steps)
            .field("guidance_scale", &self.guidance_scale)
            .field("temp_dir", &self.temp_dir)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .finish()
    }
}

impl Config {
    /// Build the layered figment for the given config file
    pub fn figment(path: &Path) -> Figment {
        Figment::from(Serialized::defaults(Defaults::default()))
            .merge(Toml::file(path))
            .merge(Env::raw().only(&["TELEGRAM_TOKEN", "HF_API_KEY"]))
            .merge(Env::prefixed("IMAGEBOT_"))
    }

    /// Load configuration, falling back to `imagebot.toml` in the working directory
    pub fn load(path: Option<&Path>) -> BotResult<Self> {
        let path = path.unwrap_or_else(|| Path::new(DEFAULT_CONFIG_FILE));
        Self::from_figment(&Self::figment(path))
    }

    /// Extract and validate a config from an already-built figment
    pub fn from_figment(figment: &Figment) -> BotResult<Self> {
        let config: Config = figment
            .extract()
            .map_err(|e| BotError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> BotResult<()> {
        if self.telegram_token.trim().is_empty() {
            return Err(BotError::Config(
                "telegram_token is required (set TELEGRAM_TOKEN)".to_string(),
            ));
        }
        if self.hf_api_key.trim().is_empty() {
            return Err(BotError::Config(
                "hf_api_key is required (set HF_API_KEY)".to_string(),
            ));
        }
        if self.num_inference_steps == 0 {
            return Err(BotError::Config(
                "num_inference_steps must be positive".to_string(),
            ));
        }
        Ok(())
    }
}
