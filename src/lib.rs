pub mod chart;
pub mod config;
pub mod engagement;
pub mod error;
pub mod llm;
pub mod model;
pub mod orchestrator;
pub mod prompts;
pub mod session;
pub mod view;

// Re-export key types
pub use config::AppConfig;
pub use engagement::{generate_series, write_csv};
pub use error::CaptioneerError;
pub use llm::{
    create_llm_client, create_llm_client_with_config, LlmClient, LlmConfig, LlmWrapper,
    MockLlmClient, SharedLlmClient,
};
pub use model::{
    AdviceCategory, ContentBlock, EngagementPoint, Feature, Language, Theme, UploadedImage,
    UserPreferences, ViewOutput,
};
pub use orchestrator::Orchestrator;
pub use prompts::{build_advice_prompt, build_caption_prompt, TREND_PROMPT};
pub use session::Session;
pub use view::{render, AnalysisInput, FeatureRequest, ViewState};
