//! Line-oriented interactive session.
//!
//! The session keeps the user's current selections between commands. Each
//! feature command takes a fresh [`ViewState`] snapshot of them and renders it;
//! no error ends the session except a failure to write output.

use chrono::NaiveTime;
use std::io::Write;
use std::path::PathBuf;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};

use crate::error::CaptioneerError;
use crate::model::{AdviceCategory, Language, Theme, UploadedImage, UserPreferences, ViewOutput};
use crate::orchestrator::Orchestrator;
use crate::view::{render, AnalysisInput, FeatureRequest, ViewState};

pub const PROMPT: &str = "captioneer> ";

pub const HELP: &str = "\
Commands:
  image <path>          select a JPEG or PNG image
  clear-image           forget the selected image
  theme <name>          Funny, Inspirational, Romantic, Trendy, Minimalist
  language <name>       English, Spanish, French, German, Hindi
  hashtags on|off       include trending hashtags
  followers <n>         follower count for the analysis (1..1000000)
  post-time <HH:MM>     planned posting time for the analysis
  caption               generate captions for the selected image
  analysis [tips]       engagement chart, optionally with AI tips
  trends                what is trending today
  advice <category>     General Tips, Post Strategy, Caption Strategy
  status                show current selections
  help                  show this help
  quit                  leave the session";

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Image(PathBuf),
    ClearImage,
    Theme(Theme),
    Language(Language),
    Hashtags(bool),
    Followers(u32),
    PostTime(NaiveTime),
    Caption,
    Analysis { tips: bool },
    Trends,
    Advice(AdviceCategory),
    Status,
    Help,
    Quit,
}

impl Command {
    /// Parse one input line. Blank lines yield `Ok(None)`.
    pub fn parse(line: &str) -> Result<Option<Self>, CaptioneerError> {
        let line = line.trim();
        if line.is_empty() {
            return Ok(None);
        }
        let (word, rest) = match line.split_once(char::is_whitespace) {
            Some((word, rest)) => (word, rest.trim()),
            None => (line, ""),
        };

        let command = match word.to_lowercase().as_str() {
            "image" | "upload" => Command::Image(PathBuf::from(required(rest, "image <path>")?)),
            "clear-image" => Command::ClearImage,
            "theme" => Command::Theme(required(rest, "theme <name>")?.parse()?),
            "language" | "lang" => Command::Language(required(rest, "language <name>")?.parse()?),
            "hashtags" => Command::Hashtags(parse_toggle(rest)?),
            "followers" => Command::Followers(
                required(rest, "followers <n>")?
                    .parse::<u32>()
                    .map_err(|_| usage("followers <n>"))?,
            ),
            "post-time" => Command::PostTime(
                NaiveTime::parse_from_str(required(rest, "post-time <HH:MM>")?, "%H:%M")
                    .map_err(|_| usage("post-time <HH:MM>"))?,
            ),
            "caption" | "captions" => Command::Caption,
            "analysis" => Command::Analysis {
                tips: match rest.to_lowercase().as_str() {
                    "" => false,
                    "tips" => true,
                    _ => return Err(usage("analysis [tips]")),
                },
            },
            "trends" | "trend" => Command::Trends,
            "advice" => Command::Advice(if rest.is_empty() {
                AdviceCategory::default()
            } else {
                rest.parse()?
            }),
            "status" => Command::Status,
            "help" | "?" => Command::Help,
            "quit" | "exit" => Command::Quit,
            other => {
                return Err(CaptioneerError::InputValidation(format!(
                    "unknown command '{}', type 'help' for a list",
                    other
                )))
            }
        };
        Ok(Some(command))
    }
}

fn required<'a>(value: &'a str, form: &str) -> Result<&'a str, CaptioneerError> {
    if value.is_empty() {
        Err(usage(form))
    } else {
        Ok(value)
    }
}

fn usage(form: &str) -> CaptioneerError {
    CaptioneerError::InputValidation(format!("usage: {}", form))
}

fn parse_toggle(value: &str) -> Result<bool, CaptioneerError> {
    match value.to_lowercase().as_str() {
        "on" | "yes" | "true" | "1" => Ok(true),
        "off" | "no" | "false" | "0" => Ok(false),
        _ => Err(usage("hashtags on|off")),
    }
}

/// Result of executing one command.
#[derive(Debug)]
pub enum Outcome {
    Output(ViewOutput),
    Quit,
}

pub struct Session {
    orchestrator: Orchestrator,
    preferences: UserPreferences,
    image: Option<UploadedImage>,
    analysis: AnalysisInput,
}

impl Session {
    pub fn new(orchestrator: Orchestrator) -> Self {
        Self {
            orchestrator,
            preferences: UserPreferences::default(),
            image: None,
            analysis: AnalysisInput::default(),
        }
    }

    pub fn preferences(&self) -> UserPreferences {
        self.preferences
    }

    pub fn image(&self) -> Option<&UploadedImage> {
        self.image.as_ref()
    }

    fn snapshot(&self, request: FeatureRequest) -> ViewState {
        ViewState {
            preferences: self.preferences,
            image: self.image.clone(),
            request,
        }
    }

    pub async fn execute(&mut self, command: Command) -> Outcome {
        let mut out = ViewOutput::new();
        match command {
            Command::Image(path) => match UploadedImage::from_path(&path) {
                Ok(image) => {
                    out.text(format!(
                        "Selected {} ({}, {} bytes)",
                        path.display(),
                        image.mime_type,
                        image.data.len()
                    ));
                    self.image = Some(image);
                }
                Err(err) => out.report(&err),
            },
            Command::ClearImage => {
                self.image = None;
                out.text("Image cleared");
            }
            Command::Theme(theme) => {
                self.preferences.theme = theme;
                out.text(format!("Theme: {}", theme));
            }
            Command::Language(language) => {
                self.preferences.language = language;
                out.text(format!("Language: {}", language));
            }
            Command::Hashtags(on) => {
                self.preferences.include_hashtags = on;
                out.text(format!("Hashtags: {}", if on { "on" } else { "off" }));
            }
            Command::Followers(count) => {
                match AnalysisInput::new(count, self.analysis.post_time, false) {
                    Ok(input) => {
                        self.analysis = input;
                        out.text(format!("Followers: {}", count));
                    }
                    Err(err) => out.report(&err),
                }
            }
            Command::PostTime(time) => {
                self.analysis.post_time = time;
                out.text(format!("Posting time: {}", time.format("%H:%M")));
            }
            Command::Caption => return self.render(FeatureRequest::GenerateCaptions).await,
            Command::Analysis { tips } => {
                let input = AnalysisInput {
                    show_tips: tips,
                    ..self.analysis
                };
                return self.render(FeatureRequest::PredictAnalysis(input)).await;
            }
            Command::Trends => return self.render(FeatureRequest::BestTrends).await,
            Command::Advice(category) => {
                return self.render(FeatureRequest::GenerateAdvice(category)).await
            }
            Command::Status => out.text(self.status()),
            Command::Help => out.text(HELP),
            Command::Quit => return Outcome::Quit,
        }
        Outcome::Output(out)
    }

    async fn render(&self, request: FeatureRequest) -> Outcome {
        let state = self.snapshot(request);
        tracing::debug!(feature = state.request.feature().label(), "rendering feature");
        Outcome::Output(render(&self.orchestrator, &state).await)
    }

    fn status(&self) -> String {
        let image = match &self.image {
            Some(image) => format!(
                "{} ({})",
                image.file_name.as_deref().unwrap_or("<unnamed>"),
                image.mime_type
            ),
            None => "none".to_string(),
        };
        format!(
            "Image: {}\nTheme: {}\nLanguage: {}\nHashtags: {}\nFollowers: {}\nPosting time: {}",
            image,
            self.preferences.theme,
            self.preferences.language,
            if self.preferences.include_hashtags { "on" } else { "off" },
            self.analysis.follower_count,
            self.analysis.post_time.format("%H:%M"),
        )
    }

    /// Read commands until `quit` or end of input, writing rendered markdown.
    pub async fn run<R, W>(&mut self, mut reader: R, mut writer: W) -> Result<(), CaptioneerError>
    where
        R: AsyncBufRead + Unpin,
        W: Write,
    {
        let mut line = String::new();
        loop {
            write!(writer, "{}", PROMPT)?;
            writer.flush()?;

            line.clear();
            if reader.read_line(&mut line).await? == 0 {
                writeln!(writer)?;
                return Ok(());
            }

            let command = match Command::parse(&line) {
                Ok(Some(command)) => command,
                Ok(None) => continue,
                Err(err) => {
                    let mut out = ViewOutput::new();
                    out.report(&err);
                    writeln!(writer, "{}", out.to_markdown())?;
                    continue;
                }
            };

            match self.execute(command).await {
                Outcome::Output(out) => writeln!(writer, "{}", out.to_markdown())?,
                Outcome::Quit => return Ok(()),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_settings_commands() {
        assert_eq!(
            Command::parse("theme romantic").unwrap(),
            Some(Command::Theme(Theme::Romantic))
        );
        assert_eq!(
            Command::parse("  LANGUAGE french ").unwrap(),
            Some(Command::Language(Language::French))
        );
        assert_eq!(
            Command::parse("hashtags on").unwrap(),
            Some(Command::Hashtags(true))
        );
        assert_eq!(
            Command::parse("post-time 18:30").unwrap(),
            Some(Command::PostTime(NaiveTime::from_hms_opt(18, 30, 0).unwrap()))
        );
    }

    #[test]
    fn parses_feature_commands() {
        assert_eq!(Command::parse("caption").unwrap(), Some(Command::Caption));
        assert_eq!(
            Command::parse("analysis tips").unwrap(),
            Some(Command::Analysis { tips: true })
        );
        assert_eq!(
            Command::parse("analysis").unwrap(),
            Some(Command::Analysis { tips: false })
        );
        assert_eq!(
            Command::parse("Analysis TIPS").unwrap(),
            Some(Command::Analysis { tips: true })
        );
        assert_eq!(
            Command::parse("advice post strategy").unwrap(),
            Some(Command::Advice(AdviceCategory::PostStrategy))
        );
        assert_eq!(
            Command::parse("advice").unwrap(),
            Some(Command::Advice(AdviceCategory::GeneralTips))
        );
    }

    #[test]
    fn blank_line_is_not_a_command() {
        assert_eq!(Command::parse("   \n").unwrap(), None);
    }

    #[test]
    fn bad_input_is_a_validation_error() {
        for line in [
            "dance",
            "theme",
            "hashtags maybe",
            "followers many",
            "post-time noon",
            "analysis later",
            "analysis tips please",
        ] {
            let err = Command::parse(line).unwrap_err();
            assert!(
                matches!(err, CaptioneerError::InputValidation(_)),
                "{line}: {err}"
            );
        }
    }
}
