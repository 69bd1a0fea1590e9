//! Rank a routine catalog from a JSON request file and print the results

use anyhow::{Context, Result};
use clap::Parser;
use routine_ranker::ranking::{sessions_from_raw, RawSessionRecord};
use routine_ranker::{logging, RankOptions, Ranker, RankerConfig, RawRankingInput};
use serde::Deserialize;
use serde_json::Value;
use std::path::PathBuf;
use tracing::info;

#[derive(Debug, Parser)]
#[command(name = "rank-routines", about = "Rank workout routines against user preferences")]
struct Args {
    /// JSON file with `inputs`, `catalog`, `sessions`, `lastFocus`, `topK`
    #[arg(short, long)]
    request: PathBuf,

    /// Optional TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Print compact JSON
    #[arg(long)]
    compact: bool,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RankRequest {
    #[serde(default)]
    inputs: RawRankingInput,
    #[serde(default)]
    catalog: Vec<Value>,
    #[serde(default)]
    sessions: Vec<RawSessionRecord>,
    #[serde(default)]
    last_focus: Option<String>,
    #[serde(default)]
    top_k: Option<usize>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config = RankerConfig::load(args.config.as_deref()).context("loading configuration")?;
    logging::init(&config.logging).context("initializing logging")?;

    let raw = std::fs::read_to_string(&args.request)
        .with_context(|| format!("reading {}", args.request.display()))?;
    let request: RankRequest = serde_json::from_str(&raw)
        .with_context(|| format!("parsing {}", args.request.display()))?;

    let ranker = Ranker::from_config(&config).context("building ranker")?;
    let options = RankOptions {
        session_history: sessions_from_raw(&request.sessions),
        last_focus: request.last_focus,
        top_k: request.top_k,
        ..Default::default()
    };

    let results = ranker.rank(&request.inputs, &request.catalog, &options).await;
    info!("Ranked {} routines, returning {}", request.catalog.len(), results.len());

    let output = if args.compact {
        serde_json::to_string(&results)?
    } else {
        serde_json::to_string_pretty(&results)?
    };
    println!("{}", output);

    Ok(())
}
