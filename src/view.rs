//! Feature handlers: one immutable [`ViewState`] in, one [`ViewOutput`] out.
//!
//! Handlers never return errors. Input problems become warnings and service
//! failures become error blocks, so the caller can keep going and retry.

use chrono::NaiveTime;
use serde::{Deserialize, Serialize};

use crate::chart::{render_line_chart, DEFAULT_CHART_HEIGHT};
use crate::engagement::generate_series;
use crate::error::CaptioneerError;
use crate::model::{
    AdviceCategory, ContentBlock, EngagementPoint, Feature, UploadedImage, UserPreferences,
    ViewOutput,
};
use crate::orchestrator::Orchestrator;
use crate::prompts::build_caption_prompt;

pub const MIN_FOLLOWERS: u32 = 1;
pub const MAX_FOLLOWERS: u32 = 1_000_000;
pub const DEFAULT_FOLLOWERS: u32 = 1000;
pub const OPTIMAL_TIME_SUGGESTION: &str = "Optimal Time for Maximum Views: 8:00 AM.";

/// Inputs of the engagement analysis view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisInput {
    pub follower_count: u32,
    pub post_time: NaiveTime,
    /// Whether the "engagement tips" button was pressed
    pub show_tips: bool,
}

impl AnalysisInput {
    pub fn new(
        follower_count: u32,
        post_time: NaiveTime,
        show_tips: bool,
    ) -> Result<Self, CaptioneerError> {
        if !(MIN_FOLLOWERS..=MAX_FOLLOWERS).contains(&follower_count) {
            return Err(CaptioneerError::InputValidation(format!(
                "follower count must be between {} and {}, got {}",
                MIN_FOLLOWERS, MAX_FOLLOWERS, follower_count
            )));
        }
        Ok(Self {
            follower_count,
            post_time,
            show_tips,
        })
    }
}

impl Default for AnalysisInput {
    fn default() -> Self {
        Self {
            follower_count: DEFAULT_FOLLOWERS,
            post_time: NaiveTime::from_hms_opt(8, 0, 0).unwrap_or_default(),
            show_tips: false,
        }
    }
}

/// The feature the user picked, with its feature-specific inputs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FeatureRequest {
    GenerateCaptions,
    PredictAnalysis(AnalysisInput),
    BestTrends,
    GenerateAdvice(AdviceCategory),
}

impl FeatureRequest {
    pub fn feature(&self) -> Feature {
        match self {
            FeatureRequest::GenerateCaptions => Feature::GenerateCaptions,
            FeatureRequest::PredictAnalysis(_) => Feature::PredictAnalysis,
            FeatureRequest::BestTrends => Feature::BestTrends,
            FeatureRequest::GenerateAdvice(_) => Feature::GenerateAdvice,
        }
    }
}

/// Snapshot of everything the user has selected for one interaction.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewState {
    pub preferences: UserPreferences,
    pub image: Option<UploadedImage>,
    pub request: FeatureRequest,
}

impl ViewState {
    pub fn new(preferences: UserPreferences, request: FeatureRequest) -> Self {
        Self {
            preferences,
            image: None,
            request,
        }
    }

    #[must_use]
    pub fn with_image(mut self, image: UploadedImage) -> Self {
        self.image = Some(image);
        self
    }
}

/// Run the selected feature and render its output.
pub async fn render(orchestrator: &Orchestrator, state: &ViewState) -> ViewOutput {
    let mut out = ViewOutput::new();
    match state.request {
        FeatureRequest::GenerateCaptions => render_captions(orchestrator, state, &mut out).await,
        FeatureRequest::PredictAnalysis(input) => {
            render_analysis(orchestrator, input, &mut out).await
        }
        FeatureRequest::BestTrends => render_trends(orchestrator, &mut out).await,
        FeatureRequest::GenerateAdvice(category) => {
            render_advice(orchestrator, category, &mut out).await
        }
    }
    out
}

async fn render_captions(orchestrator: &Orchestrator, state: &ViewState, out: &mut ViewOutput) {
    out.heading(3, "Caption Customization");

    let Some(image) = state.image.as_ref() else {
        out.report(&CaptioneerError::InputValidation(
            "Please upload an image to generate captions!".to_string(),
        ));
        return;
    };

    let prefs = state.preferences;
    let prompt = build_caption_prompt(prefs.theme, prefs.language, prefs.include_hashtags);
    match orchestrator.request_caption(&prompt, image).await {
        Ok(caption) => {
            out.heading(2, "Generated Caption");
            out.text(caption);
        }
        Err(err) => out.report(&err),
    }
}

async fn render_analysis(orchestrator: &Orchestrator, input: AnalysisInput, out: &mut ViewOutput) {
    out.heading(3, "Dynamic Engagement Prediction Based on Input");
    out.text(format!(
        "Followers: {} | Planned posting time: {}",
        input.follower_count,
        input.post_time.format("%H:%M")
    ));

    let series = generate_series();
    out.push(ContentBlock::Chart(render_line_chart(
        &series,
        DEFAULT_CHART_HEIGHT,
    )));
    out.push(engagement_table(&series));
    out.engagement = Some(series);
    out.text(OPTIMAL_TIME_SUGGESTION);

    if input.show_tips {
        match orchestrator
            .request_advice(AdviceCategory::EngagementStrategy.as_str())
            .await
        {
            Ok(advice) => out.text(format!("🔑 {}", advice)),
            Err(err) => out.report(&err),
        }
    }
}

fn engagement_table(series: &[EngagementPoint]) -> ContentBlock {
    ContentBlock::Table {
        headers: vec![
            "Date".to_string(),
            "Feed Engagement".to_string(),
            "User Engagement".to_string(),
        ],
        rows: series
            .iter()
            .map(|p| {
                vec![
                    p.date.format("%Y-%m-%d").to_string(),
                    format!("{:.2}", p.feed_engagement),
                    format!("{:.2}", p.user_engagement),
                ]
            })
            .collect(),
    }
}

async fn render_trends(orchestrator: &Orchestrator, out: &mut ViewOutput) {
    out.heading(3, "Top Social Media Trend of the Day:");
    match orchestrator.request_trend().await {
        Ok(trend) => out.text(format!("🌟 Trending Topic: {}", trend)),
        Err(err) => out.report(&err),
    }
}

async fn render_advice(orchestrator: &Orchestrator, category: AdviceCategory, out: &mut ViewOutput) {
    out.heading(3, format!("Advice: {}", category));
    match orchestrator.request_advice(category.as_str()).await {
        Ok(advice) => out.text(format!("🔑 {}", advice)),
        Err(err) => out.report(&err),
    }
}
