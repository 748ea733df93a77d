//! `trendsage` -- watch influencer matchmaking jobs from the terminal.
//!
//! # Environment variables
//!
//! | Variable                        | Default                 | Description                  |
//! |---------------------------------|-------------------------|------------------------------|
//! | `NEXT_PUBLIC_TRENDSAGE_API_URL` | --                      | Backend base URL             |
//! | `NEXT_PUBLIC_CREDBUZZ_API_URL`  | `https://api.cred.buzz` | Fallback base URL            |
//! | `NEXT_PUBLIC_API_KEY`           | --                      | Bearer token for all requests |
//! | `RUST_LOG`                      | `trendsage=info`        | Log filter                   |

mod commands;
mod render;

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// JSON config file. Without it, settings come from the environment.
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Print views and events as JSON.
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Show the current state for a project and follow it until it settles.
    Watch { project_key: String },
    /// Start a new matchmaking analysis and follow it.
    Start { project_key: String },
    /// Retry a failed analysis.
    Retry { project_key: String },
    /// Show matches for a project.
    Matches {
        project_key: String,
        #[command(flatten)]
        args: MatchArgs,
    },
    /// Hide a prompt on future runs.
    Dismiss {
        prompt: String,
        /// Show the prompt again.
        #[arg(long)]
        restore: bool,
    },
}

#[derive(Args, Debug)]
pub struct MatchArgs {
    #[arg(long, default_value = "1")]
    pub page: u32,

    /// Remembered for later runs.
    #[arg(long, value_name = "N")]
    pub page_size: Option<u32>,

    #[arg(long, value_name = "SCORE")]
    pub min_cred_score: Option<f64>,

    #[arg(long, value_name = "RATING")]
    pub min_synergy: Option<u8>,

    /// e.g. `tier-1`
    #[arg(long)]
    pub tier: Option<String>,

    /// Case-insensitive match on handle, rationale and marketing angle.
    #[arg(long)]
    pub search: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "trendsage=info,trendsage_cli=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let ctx = commands::Context::load(cli.config.as_deref(), cli.json)?;

    match cli.command {
        Command::Watch { project_key } => commands::watch(&ctx, &project_key).await,
        Command::Start { project_key } => commands::start(&ctx, &project_key).await,
        Command::Retry { project_key } => commands::retry(&ctx, &project_key).await,
        Command::Matches { project_key, args } => {
            commands::matches(&ctx, &project_key, args).await
        }
        Command::Dismiss { prompt, restore } => commands::dismiss(&ctx, &prompt, restore),
    }
}
