mod cli;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use daybrief::config::BriefConfig;

#[derive(Parser)]
#[command(
    name = "daybrief",
    version,
    about = "Personal daily brief from your facts, calendars, and forecasts"
)]
struct Cli {
    /// Config file (default: ~/.daybrief/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Generate today's brief and deliver it
    Brief {
        /// Days to look ahead (default from config)
        #[arg(long)]
        days: Option<u32>,
        /// Print the prompt instead of calling the model
        #[arg(long)]
        dry_run: bool,
    },
    /// Show the assembled brief context
    Context {
        #[arg(long)]
        days: Option<u32>,
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
    /// Store a manual fact
    Add {
        content: String,
        /// Relevance date (YYYY-MM-DD); omit for an evergreen fact
        #[arg(long)]
        date: Option<String>,
        /// External id for the fact
        #[arg(long)]
        uid: Option<String>,
    },
    /// Import calendar events from a JSON file
    Import {
        file: PathBuf,
        /// Calendar name, stored as `calendar:<name>`
        #[arg(long)]
        calendar: String,
        /// Replace all stored events of this calendar instead of upserting
        #[arg(long)]
        refresh: bool,
    },
    /// Fetch and store the weather forecast
    Weather,
    /// Show fact store statistics
    Stats {
        #[arg(long)]
        json: bool,
    },
    /// Check configuration and database health
    Doctor,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = match cli.config {
        Some(ref path) => BriefConfig::load_from(path)?,
        None => BriefConfig::load()?,
    };

    // Log to stderr so stdout carries only the brief.
    let filter = EnvFilter::try_new(&config.general.log_level)
        .unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Command::Brief { days, dry_run } => cli::brief::brief(&config, days, dry_run).await?,
        Command::Context { days, json } => cli::context::context(&config, days, json)?,
        Command::Add { content, date, uid } => {
            cli::add::add(&config, &content, date.as_deref(), uid)?
        }
        Command::Import {
            file,
            calendar,
            refresh,
        } => cli::import::import(&config, &file, &calendar, refresh)?,
        Command::Weather => cli::weather::weather(&config).await?,
        Command::Stats { json } => cli::stats::stats(&config, json)?,
        Command::Doctor => cli::doctor::doctor(&config)?,
    }

    Ok(())
}
