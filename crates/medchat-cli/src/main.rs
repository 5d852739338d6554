use anyhow::{Context, Result};
use clap::Parser;
use colored::*;
use medchat_common::{ExportConfig, Transcript};
use medchat_export::{DirectorySink, Exporter, Notifier};
use std::path::PathBuf;
use tracing::{debug, info};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Command-line arguments for the MedChat exporter
#[derive(Parser)]
#[command(
    name = "medchat-export",
    about = "Export a MedChat conversation transcript to a paginated PDF"
)]
pub struct Args {
    /// Transcript JSON: a message array, an export request or a conversation payload
    transcript: PathBuf,

    /// Conversation title, overriding the one in the transcript
    #[clap(short, long)]
    title: Option<String>,

    /// Display name for user messages
    #[clap(short, long)]
    user_name: Option<String>,

    /// Directory the PDF is written to
    #[clap(short, long, default_value = ".")]
    out_dir: PathBuf,

    /// Path to an export config file (TOML)
    #[clap(short, long)]
    config: Option<PathBuf>,

    /// Enable debug mode
    #[clap(short, long)]
    debug: bool,
}

/// Prints export notices to the terminal
struct TerminalNotifier;

impl Notifier for TerminalNotifier {
    fn success(&self, message: &str) {
        println!("{} {}", "✓".bright_green().bold(), message.bright_green());
    }

    fn failure(&self, message: &str) {
        eprintln!("{} {}", "✗".bright_red().bold(), message.bright_red());
    }
}

fn load_config(path: Option<PathBuf>) -> Result<ExportConfig> {
    let path = match path {
        Some(path) => path,
        None => ExportConfig::config_path().context("Failed to locate the config directory")?,
    };
    debug!("Loading export config from {:?}", path);
    ExportConfig::load(&path).with_context(|| format!("Failed to load config from {:?}", path))
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let args = Args::parse();

    let default_level = if args.debug { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| default_level.into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = load_config(args.config)?;

    let json = std::fs::read_to_string(&args.transcript)
        .with_context(|| format!("Failed to read transcript {:?}", args.transcript))?;
    let request = Transcript::from_json(&json)
        .with_context(|| format!("Failed to parse transcript {:?}", args.transcript))?
        .into_request(args.title, args.user_name);

    info!(
        "Exporting {} messages to {:?}",
        request.messages.len(),
        args.out_dir
    );

    let sink = DirectorySink::new(&args.out_dir);
    let saved = Exporter::with_config(config)
        .export_conversation(&request, &sink, &TerminalNotifier)
        .await
        .context("Export failed")?;

    println!(
        "{} {} ({} pages)",
        "📄".bright_cyan(),
        saved.location.bright_white().bold(),
        saved.page_count
    );
    Ok(())
}
