use chrono::NaiveTime;
use clap::{Parser, Subcommand};
use std::fs;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use captioneer::{
    render, write_csv, AdviceCategory, AnalysisInput, AppConfig, FeatureRequest,
    Language, Orchestrator, Session, Theme, UploadedImage, UserPreferences, ViewOutput, ViewState,
};

#[derive(Parser, Debug)]
#[command(name = "captioneer", about = "Generate social media captions, trends and advice")]
struct Cli {
    /// Optional TOML file with model settings
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Write output to a file instead of the console
    #[arg(short, long, global = true)]
    output: Option<String>,

    /// Print output as JSON instead of markdown
    #[arg(long, global = true)]
    json: bool,

    /// Log debug details to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Generate a caption for an image
    Caption {
        /// JPEG or PNG image to caption
        #[arg(short, long)]
        image: Option<PathBuf>,
        #[arg(short, long, value_enum, default_value_t = Theme::Funny)]
        theme: Theme,
        #[arg(short, long, value_enum, default_value_t = Language::English)]
        language: Language,
        /// Include trending hashtags
        #[arg(long)]
        hashtags: bool,
    },
    /// Show the (simulated) engagement chart
    Analysis {
        #[arg(long, default_value_t = 1000)]
        followers: u32,
        /// Planned posting time, HH:MM
        #[arg(long, default_value = "08:00", value_parser = parse_time)]
        post_time: NaiveTime,
        /// Also ask for engagement tips
        #[arg(long)]
        tips: bool,
        /// Export the generated series as CSV
        #[arg(long)]
        csv: Option<PathBuf>,
    },
    /// Ask what is trending today
    Trends,
    /// Ask for posting advice
    Advice {
        #[arg(short, long, value_enum, default_value_t = AdviceCategory::GeneralTips)]
        category: AdviceCategory,
    },
    /// Start an interactive session
    Interactive,
}

fn parse_time(s: &str) -> Result<NaiveTime, String> {
    NaiveTime::parse_from_str(s, "%H:%M").map_err(|e| format!("expected HH:MM: {}", e))
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "captioneer=debug" } else { "captioneer=warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = match AppConfig::load(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(2);
        }
    };
    let orchestrator = Orchestrator::new(config.build_client());

    let csv_path = match &cli.command {
        Commands::Analysis { csv, .. } => csv.clone(),
        _ => None,
    };

    let state = match cli.command {
        Commands::Interactive => {
            eprintln!("Captioneer interactive session. Type 'help' for commands.");
            let mut session = Session::new(orchestrator);
            let stdin = tokio::io::BufReader::new(tokio::io::stdin());
            session.run(stdin, std::io::stdout()).await?;
            return Ok(());
        }
        Commands::Caption {
            image,
            theme,
            language,
            hashtags,
        } => {
            let state = ViewState::new(
                UserPreferences::new(theme, language, hashtags),
                FeatureRequest::GenerateCaptions,
            );
            match image.map(|p| UploadedImage::from_path(&p)).transpose() {
                Ok(Some(image)) => state.with_image(image),
                Ok(None) => state,
                Err(e) => {
                    let mut out = ViewOutput::new();
                    out.report(&e);
                    return finish(&cli.output, cli.json, &out);
                }
            }
        }
        Commands::Analysis {
            followers,
            post_time,
            tips,
            ..
        } => {
            let input = match AnalysisInput::new(followers, post_time, tips) {
                Ok(input) => input,
                Err(e) => {
                    let mut out = ViewOutput::new();
                    out.report(&e);
                    return finish(&cli.output, cli.json, &out);
                }
            };
            ViewState::new(UserPreferences::default(), FeatureRequest::PredictAnalysis(input))
        }
        Commands::Trends => ViewState::new(UserPreferences::default(), FeatureRequest::BestTrends),
        Commands::Advice { category } => ViewState::new(
            UserPreferences::default(),
            FeatureRequest::GenerateAdvice(category),
        ),
    };

    let out = render(&orchestrator, &state).await;

    if let Some(path) = &csv_path {
        if let Some(series) = &out.engagement {
            let file = fs::File::create(path)
                .map_err(|e| format!("Failed to write to '{}': {}", path.display(), e))?;
            write_csv(series, file)?;
            eprintln!("Engagement series written to: {}", path.display());
        }
    }

    finish(&cli.output, cli.json, &out)
}

fn finish(
    output: &Option<String>,
    json: bool,
    out: &ViewOutput,
) -> Result<(), Box<dyn std::error::Error>> {
    let rendered = if json {
        serde_json::to_string_pretty(out)?
    } else {
        out.to_markdown()
    };

    match output {
        Some(file) => {
            fs::write(file, &rendered).map_err(|e| format!("Failed to write to '{}': {}", file, e))?;
            eprintln!("Successfully wrote: {}", file);
        }
        None => println!("{}", rendered),
    }

    if out.has_errors() || !out.warnings().is_empty() {
        std::process::exit(1);
    }
    Ok(())
}
