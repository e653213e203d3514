use std::io;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CaptioneerError {
    #[error("Configuration error: {0} - Please check your environment and config file")]
    Configuration(String),

    #[error("Service error: {0} - The generative service call failed, please try again")]
    Service(String),

    #[error("Input error: {0}")]
    InputValidation(String),

    #[error("Unsupported image: {0} - Only JPEG and PNG uploads are accepted")]
    UnsupportedImage(String),

    #[error("IO error: {0} - Please check file permissions and path")]
    Io(#[from] io::Error),

    #[error("CSV error: {0}")]
    Csv(String),
}

impl CaptioneerError {
    /// Errors the user can fix and retry from the same session.
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, CaptioneerError::Configuration(_))
    }

    /// Input problems are shown as warnings rather than errors.
    pub fn is_input_problem(&self) -> bool {
        matches!(
            self,
            CaptioneerError::InputValidation(_) | CaptioneerError::UnsupportedImage(_)
        )
    }
}

impl From<csv::Error> for CaptioneerError {
    fn from(error: csv::Error) -> Self {
        CaptioneerError::Csv(error.to_string())
    }
}

impl From<toml::de::Error> for CaptioneerError {
    fn from(error: toml::de::Error) -> Self {
        CaptioneerError::Configuration(format!("invalid config file: {}", error))
    }
}
