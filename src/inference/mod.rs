//! Hosted image inference integration
//!
//! Posts a prompt to a text-to-image endpoint (Hugging Face inference API
//! by default) and hands back either the raw image bytes or the endpoint's
//! own error text.

use std::time::Duration;

use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Client, StatusCode};
use serde::Serialize;
use tracing::{debug, warn};

use crate::config::Config;
use crate::error::BotResult;

/// Sampling parameters sent with every request
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct InferenceParameters {
    pub num_inference_steps: u32,
    pub guidance_scale: f32,
}

impl Default for InferenceParameters {
    fn default() -> Self {
        Self {
            num_inference_steps: crate::config::DEFAULT_INFERENCE_STEPS,
            guidance_scale: crate::config::DEFAULT_GUIDANCE_SCALE,
        }
    }
}

/// Text-to-image request body
#[derive(Debug, Serialize)]
struct InferenceRequest<'a> {
    inputs: &'a str,
    parameters: InferenceParameters,
}

/// Result of a completed inference call
#[derive(Debug)]
pub enum Generation {
    /// HTTP 200: the body is the encoded image
    Image(Vec<u8>),
    /// Any other status, with the body as human-readable text
    Rejected { status: StatusCode, body: String },
}

/// Inference API client
#[derive(Debug, Clone)]
pub struct InferenceClient {
    /// HTTP client
    client: Client,
    /// Bearer credential
    api_key: String,
    /// Endpoint URL
    url: String,
    /// Sampling parameters
    parameters: InferenceParameters,
}

impl InferenceClient {
    /// Create a client from the loaded configuration
    pub fn new(config: &Config) -> BotResult<Self> {
        let mut builder = Client::builder();
        if let Some(secs) = config.request_timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }

        Ok(Self {
            client: builder.build()?,
            api_key: config.hf_api_key.clone(),
            url: config.inference_url.clone(),
            parameters: InferenceParameters {
                num_inference_steps: config.num_inference_steps,
                guidance_scale: config.guidance_scale,
            },
        })
    }

    /// Endpoint this client posts to
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Parameters attached to every request
    pub fn parameters(&self) -> InferenceParameters {
        self.parameters
    }

    /// Request an image for `prompt`
    ///
    /// Transport failures are errors; a non-200 answer is a
    /// [`Generation::Rejected`] carrying the endpoint's body.
    pub async fn generate(&self, prompt: &str) -> BotResult<Generation> {
        let request = InferenceRequest {
            inputs: prompt,
            parameters: self.parameters,
        };

        debug!("Sending inference request to {}", self.url);

        let response = self
            .client
            .post(&self.url)
            .header(AUTHORIZATION, format!("Bearer {}", self.api_key))
            .header(CONTENT_TYPE, "application/json")
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if status != StatusCode::OK {
            let body = response.text().await?;
            warn!("Inference API error: {} - {}", status, body);
            return Ok(Generation::Rejected { status, body });
        }

        let data = response.bytes().await?;
        debug!("Inference API returned {} bytes", data.len());
        Ok(Generation::Image(data.to_vec()))
    }
}
