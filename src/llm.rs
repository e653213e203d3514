//! Generative model abstraction using any rig-core compatible model.
//!
//! [`LlmWrapper`] adapts any model implementing rig-core's `CompletionModel`
//! (Gemini by default, see [`crate::config::AppConfig::build_client`]) to the
//! small [`LlmClient`] trait the orchestrator depends on. [`MockLlmClient`]
//! stands in for the service in tests.
//!
//! # Example
//! ```ignore
//! use rig::client::CompletionClient;
//! use rig::providers::gemini;
//! use captioneer::llm::create_llm_client;
//!
//! let client = gemini::Client::from_env();
//! let llm = create_llm_client(client.completion_model("gemini-1.5-flash"));
//! ```

use async_trait::async_trait;
use rig::{
    completion::{AssistantContent, CompletionModel, CompletionRequest, CompletionRequestBuilder},
    message::{ImageDetail, ImageMediaType, Message, UserContent},
    OneOrMany,
};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use crate::error::CaptioneerError;
use crate::model::UploadedImage;
use crate::prompts::DEFAULT_SYSTEM_PROMPT;

/// Settings applied to every model call.
#[derive(Debug, Clone)]
pub struct LlmConfig {
    /// System prompt sent ahead of the user prompt
    pub system_prompt: String,
    /// Temperature for responses (0.0 = deterministic, 2.0 = most creative)
    pub temperature: f64,
    /// Maximum tokens for model output (None = provider default)
    pub max_tokens: Option<u64>,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            system_prompt: DEFAULT_SYSTEM_PROMPT.to_string(),
            temperature: 1.0,
            max_tokens: None,
        }
    }
}

impl LlmConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = prompt.into();
        self
    }

    /// Set the temperature, clamped to 0.0..=2.0
    pub fn with_temperature(mut self, temp: f64) -> Self {
        self.temperature = temp.clamp(0.0, 2.0);
        self
    }

    pub fn with_max_tokens(mut self, tokens: Option<u64>) -> Self {
        self.max_tokens = tokens;
        self
    }
}

/// A generative text service: prompt and optional image in, text out.
#[async_trait]
pub trait LlmClient: Send + Sync {
    /// Send one request and return the completion text as produced.
    async fn generate(
        &self,
        prompt: &str,
        image: Option<&UploadedImage>,
    ) -> Result<String, CaptioneerError>;
}

/// Universal wrapper that works with any rig-core CompletionModel.
pub struct LlmWrapper<M: CompletionModel> {
    model: Arc<M>,
    config: LlmConfig,
}

impl<M: CompletionModel> LlmWrapper<M> {
    /// Create a new wrapper with default configuration
    pub fn new(model: M) -> Self {
        Self {
            model: Arc::new(model),
            config: LlmConfig::default(),
        }
    }

    /// Create a new wrapper with custom configuration
    pub fn with_config(model: M, config: LlmConfig) -> Self {
        Self {
            model: Arc::new(model),
            config,
        }
    }

    /// The user content is the request's only turn; the system prompt is the preamble.
    fn build_request(&self, user_content: OneOrMany<UserContent>) -> CompletionRequestBuilder<M> {
        let mut builder = self
            .model
            .completion_request(Message::User {
                content: user_content,
            })
            .preamble(self.config.system_prompt.clone())
            .temperature(self.config.temperature);

        if let Some(max_tokens) = self.config.max_tokens {
            builder = builder.max_tokens(max_tokens);
        }

        builder
    }

    async fn send_request(&self, request: CompletionRequest) -> Result<String, CaptioneerError> {
        self.model
            .completion(request)
            .await
            .map(|r| extract_text_from_response(&r.choice))
            .map_err(|e| CaptioneerError::Service(e.to_string()))
    }
}

/// Extract text content from assistant response
fn extract_text_from_response(content: &OneOrMany<AssistantContent>) -> String {
    content
        .iter()
        .filter_map(|c| match c {
            AssistantContent::Text(text) => Some(text.text.clone()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .concat()
}

/// Prompt text first, then the image if one is attached.
fn user_content(prompt: &str, image: Option<&UploadedImage>) -> OneOrMany<UserContent> {
    let mut content = OneOrMany::one(UserContent::text(prompt));
    if let Some(image) = image {
        content.push(UserContent::image_base64(
            image.to_base64(),
            Some(parse_mime_to_image_type(&image.mime_type)),
            Some(ImageDetail::Auto),
        ));
    }
    content
}

/// Parse MIME type string to rig ImageMediaType
fn parse_mime_to_image_type(mime_type: &str) -> ImageMediaType {
    match mime_type.to_lowercase().as_str() {
        "image/jpeg" | "image/jpg" => ImageMediaType::JPEG,
        _ => ImageMediaType::PNG,
    }
}

#[async_trait]
impl<M: CompletionModel + Send + Sync + 'static> LlmClient for LlmWrapper<M> {
    async fn generate(
        &self,
        prompt: &str,
        image: Option<&UploadedImage>,
    ) -> Result<String, CaptioneerError> {
        let request = self.build_request(user_content(prompt, image)).build();
        self.send_request(request).await
    }
}

/// A request seen by [`MockLlmClient`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedCall {
    pub prompt: String,
    pub image_mime_type: Option<String>,
    pub image_len: Option<usize>,
}

/// A mock client for testing: returns a fixed response and records every call.
pub struct MockLlmClient {
    pub response: String,
    failure: Option<String>,
    failing: AtomicBool,
    calls: AtomicUsize,
    recorded: Mutex<Vec<RecordedCall>>,
}

impl MockLlmClient {
    pub fn new() -> Self {
        Self {
            response: "A mock response".to_string(),
            failure: None,
            failing: AtomicBool::new(false),
            calls: AtomicUsize::new(0),
            recorded: Mutex::new(Vec::new()),
        }
    }

    pub fn with_response(mut self, response: impl Into<String>) -> Self {
        self.response = response.into();
        self
    }

    /// Make every call fail with a service error carrying `message`.
    pub fn failing(mut self, message: impl Into<String>) -> Self {
        self.failure = Some(message.into());
        self.failing = AtomicBool::new(true);
        self
    }

    /// Toggle failure at runtime, e.g. to recover after an outage.
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.recorded
            .lock()
            .map(|calls| calls.clone())
            .unwrap_or_default()
    }

    pub fn last_prompt(&self) -> Option<String> {
        self.calls().pop().map(|c| c.prompt)
    }
}

impl Default for MockLlmClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl LlmClient for MockLlmClient {
    async fn generate(
        &self,
        prompt: &str,
        image: Option<&UploadedImage>,
    ) -> Result<String, CaptioneerError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut recorded) = self.recorded.lock() {
            recorded.push(RecordedCall {
                prompt: prompt.to_string(),
                image_mime_type: image.map(|i| i.mime_type.clone()),
                image_len: image.map(|i| i.data.len()),
            });
        }

        if self.failing.load(Ordering::SeqCst) {
            let message = self
                .failure
                .clone()
                .unwrap_or_else(|| "mock failure".to_string());
            return Err(CaptioneerError::Service(message));
        }
        Ok(self.response.clone())
    }
}

/// Type alias for a client that can be shared across threads
pub type SharedLlmClient = Arc<dyn LlmClient>;

/// Helper function to create a shared client from any CompletionModel
pub fn create_llm_client<M: CompletionModel + Send + Sync + 'static>(model: M) -> SharedLlmClient {
    Arc::new(LlmWrapper::new(model))
}

/// Helper function to create a shared client with custom config
pub fn create_llm_client_with_config<M: CompletionModel + Send + Sync + 'static>(
    model: M,
    config: LlmConfig,
) -> SharedLlmClient {
    Arc::new(LlmWrapper::with_config(model, config))
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;
    use rig::client::CompletionClient;
    use rig::providers::gemini;

    fn user_turns(request: &CompletionRequest) -> Vec<Vec<UserContent>> {
        request
            .chat_history
            .iter()
            .filter_map(|m| match m {
                Message::User { content } => Some(content.iter().cloned().collect()),
                _ => None,
            })
            .collect()
    }

    fn jpeg_image() -> UploadedImage {
        UploadedImage::from_bytes(
            Bytes::from_static(&[0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10, b'J', b'F', b'I', b'F']),
            Some("photo.jpg".to_string()),
        )
        .unwrap()
    }

    #[test]
    fn request_has_single_user_turn_with_prompt_and_image() {
        let model = gemini::Client::new("test-key").completion_model("gemini-1.5-flash");
        let wrapper = LlmWrapper::with_config(
            model,
            LlmConfig::new().with_system_prompt("Be brief."),
        );
        let image = jpeg_image();

        let request = wrapper
            .build_request(user_content("CAPTION PROMPT", Some(&image)))
            .build();

        assert_eq!(request.preamble.as_deref(), Some("Be brief."));
        let turns = user_turns(&request);
        assert_eq!(turns.len(), 1, "expected exactly one user turn");
        assert_eq!(request.chat_history.len(), 1);

        let parts = &turns[0];
        assert_eq!(parts.len(), 2);
        assert!(matches!(&parts[0], UserContent::Text(t) if t.text == "CAPTION PROMPT"));
        match &parts[1] {
            UserContent::Image(img) => {
                assert!(matches!(img.media_type, Some(ImageMediaType::JPEG)));
                assert!(format!("{:?}", img).contains(&image.to_base64()));
            }
            other => panic!("expected image content, got {:?}", other),
        }
    }

    #[test]
    fn text_only_request_carries_just_the_prompt() {
        let model = gemini::Client::new("test-key").completion_model("gemini-1.5-flash");
        let wrapper = LlmWrapper::new(model);

        let request = wrapper.build_request(user_content("TREND PROMPT", None)).build();

        assert_eq!(request.preamble.as_deref(), Some(DEFAULT_SYSTEM_PROMPT));
        let turns = user_turns(&request);
        assert_eq!(turns.len(), 1);
        assert_eq!(turns[0].len(), 1);
        assert!(matches!(&turns[0][0], UserContent::Text(t) if t.text == "TREND PROMPT"));
    }

    #[test]
    fn response_text_parts_are_concatenated_verbatim() {
        let mut choice = OneOrMany::one(AssistantContent::text("Golden hour "));
        choice.push(AssistantContent::text("glow ✨\n"));
        assert_eq!(extract_text_from_response(&choice), "Golden hour glow ✨\n");
    }

    #[test]
    fn temperature_is_clamped() {
        assert_eq!(LlmConfig::new().with_temperature(5.0).temperature, 2.0);
        assert_eq!(LlmConfig::new().with_temperature(-1.0).temperature, 0.0);
    }

    #[test]
    fn jpeg_aliases_map_to_jpeg() {
        assert!(matches!(parse_mime_to_image_type("image/JPG"), ImageMediaType::JPEG));
        assert!(matches!(parse_mime_to_image_type("image/png"), ImageMediaType::PNG));
    }

    #[tokio::test]
    async fn mock_can_recover_after_failure() {
        let mock = MockLlmClient::new().with_response("ok").failing("quota exceeded");
        assert!(mock.generate("p", None).await.is_err());
        mock.set_failing(false);
        assert_eq!(mock.generate("p", None).await.unwrap(), "ok");
        assert_eq!(mock.call_count(), 2);
    }
}
