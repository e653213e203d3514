//! Prompt templates sent to the generative service.
//!
//! Every prompt is plain string interpolation. The caption template keeps its
//! five numbered instructions fixed; the hashtag instruction is always present
//! and worded conditionally, whatever the user picked.

use crate::model::{Language, Theme};

/// System prompt used for every request unless overridden in [`crate::llm::LlmConfig`].
pub const DEFAULT_SYSTEM_PROMPT: &str = "You are a helpful assistant.";

/// Fixed prompt for the "best trends" feature.
pub const TREND_PROMPT: &str = "What is trending today in social media platforms? If you don't have access to real-time data, tell that these are the things, which when posted, tend to have the maximum impact.";

/// Build the caption instruction for an uploaded image.
///
/// `include_hashtags` is accepted for parity with the user's selection but the
/// template does not branch on it: point 3 always asks for hashtags "if selected".
pub fn build_caption_prompt(theme: Theme, language: Language, _include_hashtags: bool) -> String {
    let theme = theme.as_str().to_lowercase();
    format!(
        r#"
    You are a creative social media expert helping users craft captions for their posts.
    Analyze the uploaded image and generate the following based on the user’s preferences:
    1. **Primary Caption:** Provide a catchy caption suitable for the {theme} theme.
    2. **Tone:** Ensure the tone is {theme} and appealing to the target audience.
    3. **Hashtags (if selected):** Include trending hashtags related to the context of the image (if the option is selected by the user).
    4. **Multi-language:** Provide translations of the caption in the selected language: {language}.
    5. **Emojis:** Add emojis that enhance the caption's emotional impact.

    Keep the captions concise, engaging, and visually pleasing!
    "#,
        language = language.as_str(),
    )
}

/// Build the advice request for a category such as "Post Strategy".
pub fn build_advice_prompt(category: &str) -> String {
    format!(
        "Provide a detailed {} for optimal social media engagement and content strategy.",
        category
    )
}
