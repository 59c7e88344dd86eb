//! Score every team in a mission bundle and print the reports as JSON.
//!
//! Usage:
//!   cargo run -p scoring-cli --bin score_mission -- --input bundle.json --pretty

use anyhow::{Context, Result};
use clap::Parser;
use scoring_cli::{evaluate_all, load_bundle, load_rules, Config};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(author, version, about = "Score team submissions against a mission", long_about = None)]
struct Args {
    /// Bundle with the mission and team submissions
    #[arg(short, long)]
    input: PathBuf,

    /// Scoring rule overrides (defaults to SCORING_RULES_PATH)
    #[arg(long)]
    rules: Option<PathBuf>,

    /// Only score this team
    #[arg(long)]
    team: Option<String>,

    /// Pretty-print the JSON output
    #[arg(long)]
    pretty: bool,

    /// Teams evaluated concurrently (defaults to SCORING_WORKERS or CPU count)
    #[arg(long)]
    workers: Option<usize>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Logs go to stderr so stdout stays valid JSON.
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("scoring_cli=info".parse()?),
        )
        .init();

    let args = Args::parse();
    let config = Config::from_env();

    let rules_path = args.rules.or(config.rules_path);
    let rules = load_rules(rules_path.as_deref()).await?;

    let mut bundle = load_bundle(&args.input).await?;
    if let Some(team) = &args.team {
        bundle.retain_team(team);
        if bundle.submissions.is_empty() {
            anyhow::bail!("team {team} not found in {}", args.input.display());
        }
    }

    let workers = args.workers.unwrap_or(config.workers);
    let results = evaluate_all(
        Arc::new(bundle.mission),
        Arc::new(rules),
        bundle.submissions,
        workers,
    )
    .await?;

    let output = if args.pretty {
        serde_json::to_string_pretty(&results)
    } else {
        serde_json::to_string(&results)
    }
    .context("failed to serialize results")?;
    println!("{output}");

    Ok(())
}
