//! Relays prompts to the generative service.
//!
//! Every method is a single best-effort round trip: no retries, no caching,
//! and the returned text is exactly what the service produced.

use tracing::{debug, warn};

use crate::error::CaptioneerError;
use crate::llm::SharedLlmClient;
use crate::model::UploadedImage;
use crate::prompts::{build_advice_prompt, TREND_PROMPT};

/// Holds the client created at start and issues one request per call.
#[derive(Clone)]
pub struct Orchestrator {
    client: SharedLlmClient,
}

impl Orchestrator {
    pub fn new(client: SharedLlmClient) -> Self {
        Self { client }
    }

    /// Ask for a caption of `image` using an already built caption prompt.
    pub async fn request_caption(
        &self,
        prompt: &str,
        image: &UploadedImage,
    ) -> Result<String, CaptioneerError> {
        self.send("caption", prompt, Some(image)).await
    }

    pub async fn request_trend(&self) -> Result<String, CaptioneerError> {
        self.send("trend", TREND_PROMPT, None).await
    }

    /// Ask for advice; `category` is interpolated verbatim into the prompt.
    pub async fn request_advice(&self, category: &str) -> Result<String, CaptioneerError> {
        let prompt = build_advice_prompt(category);
        self.send("advice", &prompt, None).await
    }

    async fn send(
        &self,
        kind: &'static str,
        prompt: &str,
        image: Option<&UploadedImage>,
    ) -> Result<String, CaptioneerError> {
        debug!(
            kind,
            prompt_len = prompt.len(),
            image_mime = image.map(|i| i.mime_type.as_str()),
            image_bytes = image.map(|i| i.data.len()),
            "sending generation request"
        );

        match self.client.generate(prompt, image).await {
            Ok(text) => {
                debug!(kind, response_len = text.len(), "generation succeeded");
                Ok(text)
            }
            Err(err) => {
                warn!(kind, error = %err, "generation failed");
                Err(err)
            }
        }
    }
}
