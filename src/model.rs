use bytes::Bytes;
use chrono::NaiveDate;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

use crate::error::CaptioneerError;

/// Caption theme offered to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
pub enum Theme {
    #[default]
    Funny,
    Inspirational,
    Romantic,
    Trendy,
    Minimalist,
}

impl Theme {
    pub const ALL: [Theme; 5] = [
        Theme::Funny,
        Theme::Inspirational,
        Theme::Romantic,
        Theme::Trendy,
        Theme::Minimalist,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Theme::Funny => "Funny",
            Theme::Inspirational => "Inspirational",
            Theme::Romantic => "Romantic",
            Theme::Trendy => "Trendy",
            Theme::Minimalist => "Minimalist",
        }
    }
}

/// Language the caption should be translated into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
pub enum Language {
    #[default]
    English,
    Spanish,
    French,
    German,
    Hindi,
}

impl Language {
    pub const ALL: [Language; 5] = [
        Language::English,
        Language::Spanish,
        Language::French,
        Language::German,
        Language::Hindi,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Language::English => "English",
            Language::Spanish => "Spanish",
            Language::French => "French",
            Language::German => "German",
            Language::Hindi => "Hindi",
        }
    }
}

/// Kind of advice requested from the generative service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
pub enum AdviceCategory {
    #[default]
    GeneralTips,
    PostStrategy,
    CaptionStrategy,
    /// Only reachable through the engagement tips of the analysis view
    #[value(skip)]
    EngagementStrategy,
}

impl AdviceCategory {
    /// Categories the user can pick directly.
    pub const SELECTABLE: [AdviceCategory; 3] = [
        AdviceCategory::GeneralTips,
        AdviceCategory::PostStrategy,
        AdviceCategory::CaptionStrategy,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AdviceCategory::GeneralTips => "General Tips",
            AdviceCategory::PostStrategy => "Post Strategy",
            AdviceCategory::CaptionStrategy => "Caption Strategy",
            AdviceCategory::EngagementStrategy => "Engagement Strategy",
        }
    }
}

/// Normalizes "Post Strategy", "post-strategy" and "post_strategy" to one key.
fn normalize_label(s: &str) -> String {
    s.trim()
        .chars()
        .filter(|c| !matches!(c, ' ' | '-' | '_'))
        .flat_map(char::to_lowercase)
        .collect()
}

macro_rules! impl_label_traits {
    ($ty:ty, $all:expr, $what:literal) => {
        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $ty {
            type Err = CaptioneerError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let wanted = normalize_label(s);
                $all.into_iter()
                    .find(|v| normalize_label(v.as_str()) == wanted)
                    .ok_or_else(|| {
                        CaptioneerError::InputValidation(format!(
                            "unknown {} '{}', expected one of: {}",
                            $what,
                            s.trim(),
                            $all.iter().map(|v| v.as_str()).collect::<Vec<_>>().join(", ")
                        ))
                    })
            }
        }
    };
}

impl_label_traits!(Theme, Theme::ALL, "theme");
impl_label_traits!(Language, Language::ALL, "language");
impl_label_traits!(AdviceCategory, AdviceCategory::SELECTABLE, "advice category");

/// Feature modes of the assistant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Feature {
    GenerateCaptions,
    PredictAnalysis,
    BestTrends,
    GenerateAdvice,
}

impl Feature {
    pub fn label(&self) -> &'static str {
        match self {
            Feature::GenerateCaptions => "Generate Captions",
            Feature::PredictAnalysis => "Predict Analysis",
            Feature::BestTrends => "What are the Best Trends?",
            Feature::GenerateAdvice => "Generate Advice",
        }
    }
}

/// The caption choices a user made for one interaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct UserPreferences {
    pub theme: Theme,
    pub language: Language,
    pub include_hashtags: bool,
}

impl UserPreferences {
    pub fn new(theme: Theme, language: Language, include_hashtags: bool) -> Self {
        Self {
            theme,
            language,
            include_hashtags,
        }
    }
}

/// An image supplied by the user for caption generation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedImage {
    /// MIME type, either "image/jpeg" or "image/png"
    pub mime_type: String,
    /// Raw file bytes as uploaded
    pub data: Bytes,
    /// File name the image was loaded from, if any
    pub file_name: Option<String>,
}

impl UploadedImage {
    pub const ACCEPTED_MIME_TYPES: [&'static str; 2] = ["image/jpeg", "image/png"];

    /// Load and validate an image file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, CaptioneerError> {
        let path = path.as_ref();
        let data = std::fs::read(path).map_err(|e| {
            CaptioneerError::InputValidation(format!(
                "could not read image '{}': {}",
                path.display(),
                e
            ))
        })?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned());
        Self::from_bytes(Bytes::from(data), name)
    }

    /// Validate in-memory image bytes. The MIME type is sniffed from the
    /// content first and from the file name only when the content is unknown.
    pub fn from_bytes(data: Bytes, file_name: Option<String>) -> Result<Self, CaptioneerError> {
        if data.is_empty() {
            return Err(CaptioneerError::InputValidation(
                "the uploaded image is empty".to_string(),
            ));
        }

        let mime_type = detect_mime_type(&data, file_name.as_deref());
        if !Self::ACCEPTED_MIME_TYPES.contains(&mime_type.as_str()) {
            return Err(CaptioneerError::UnsupportedImage(mime_type));
        }

        Ok(Self {
            mime_type,
            data,
            file_name,
        })
    }

    /// Get base64 encoded image data
    pub fn to_base64(&self) -> String {
        use base64::prelude::*;
        BASE64_STANDARD.encode(&self.data)
    }
}

fn detect_mime_type(data: &[u8], file_name: Option<&str>) -> String {
    if let Some(kind) = infer::get(data) {
        return kind.mime_type().to_string();
    }
    file_name
        .and_then(|name| mime_guess::from_path(name).first_raw())
        .unwrap_or("application/octet-stream")
        .to_string()
}

/// One day of synthetic engagement data.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EngagementPoint {
    pub date: NaiveDate,
    pub feed_engagement: f64,
    pub user_engagement: f64,
}

/// A block of rendered output
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ContentBlock {
    /// A heading with level (1-6) and text
    Heading { level: u8, text: String },
    /// Plain text content
    Text(String),
    /// A non-fatal problem with the user's input
    Warning(String),
    /// A failed action the user may retry
    Error(String),
    /// A pre-rendered text chart
    Chart(String),
    /// A table with headers and rows
    Table {
        headers: Vec<String>,
        rows: Vec<Vec<String>>,
    },
}

impl ContentBlock {
    pub fn to_markdown(&self) -> String {
        match self {
            ContentBlock::Heading { level, text } => {
                format!("{} {}\n", "#".repeat(*level as usize), text)
            }
            ContentBlock::Text(text) => format!("{}\n", text),
            ContentBlock::Warning(text) => format!("> **Warning:** {}\n", text),
            ContentBlock::Error(text) => format!("> **Error:** {}\n", text),
            ContentBlock::Chart(chart) => format!("```text\n{}\n```\n", chart.trim_end()),
            ContentBlock::Table { headers, rows } => {
                let mut md = String::new();
                md.push_str("| ");
                md.push_str(&headers.join(" | "));
                md.push_str(" |\n| ");
                md.push_str(
                    &headers
                        .iter()
                        .map(|_| "---")
                        .collect::<Vec<_>>()
                        .join(" | "),
                );
                md.push_str(" |\n");
                for row in rows {
                    md.push_str("| ");
                    md.push_str(&row.join(" | "));
                    md.push_str(" |\n");
                }
                md
            }
        }
    }
}

/// Everything one interaction produced, in display order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ViewOutput {
    pub blocks: Vec<ContentBlock>,
    /// The synthetic series behind a rendered chart, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub engagement: Option<Vec<EngagementPoint>>,
}

impl ViewOutput {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, block: ContentBlock) {
        self.blocks.push(block);
    }

    pub fn heading(&mut self, level: u8, text: impl Into<String>) {
        self.push(ContentBlock::Heading {
            level,
            text: text.into(),
        });
    }

    pub fn text(&mut self, text: impl Into<String>) {
        self.push(ContentBlock::Text(text.into()));
    }

    /// Record a failed interaction as a warning or an error block.
    pub fn report(&mut self, error: &CaptioneerError) {
        if error.is_input_problem() {
            self.push(ContentBlock::Warning(error.to_string()));
        } else {
            self.push(ContentBlock::Error(error.to_string()));
        }
    }

    pub fn has_errors(&self) -> bool {
        self.blocks
            .iter()
            .any(|b| matches!(b, ContentBlock::Error(_)))
    }

    pub fn warnings(&self) -> Vec<&str> {
        self.blocks
            .iter()
            .filter_map(|b| match b {
                ContentBlock::Warning(w) => Some(w.as_str()),
                _ => None,
            })
            .collect()
    }

    pub fn to_markdown(&self) -> String {
        self.blocks
            .iter()
            .map(ContentBlock::to_markdown)
            .collect::<Vec<_>>()
            .join("\n")
    }
}
