//! Batch entry point
//!
//! Usage:
//!
//! ```text
//! arbiter-batch <transactions.csv> <accounts.csv> <regions.csv> [out_dir]
//! ```
//!
//! Configuration comes from the `ARBITER_CONFIG` TOML file if set,
//! otherwise from `ARBITER_RISK_THRESHOLD` / `ARBITER_LIMIT_MODE`.

use anyhow::{bail, Context, Result};
use batch_io::{load_accounts, load_regions, load_transactions, ArtifactWriter};
use decision_core::{BatchInput, DecisionPipeline, PipelineConfig};
use std::env;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let args: Vec<String> = env::args().skip(1).collect();
    if args.len() < 3 || args.len() > 4 {
        bail!("usage: arbiter-batch <transactions.csv> <accounts.csv> <regions.csv> [out_dir]");
    }
    let out_dir = args.get(3).map(String::as_str).unwrap_or("out");

    let config = match env::var("ARBITER_CONFIG") {
        Ok(path) => PipelineConfig::from_file(&path)
            .with_context(|| format!("loading config from {}", path))?,
        Err(_) => PipelineConfig::from_env().context("loading config from environment")?,
    };
    tracing::info!(
        "risk threshold {}, limit mode {:?}",
        config.risk_threshold,
        config.limit_mode
    );

    let transactions = load_transactions(&args[0])
        .with_context(|| format!("loading transactions from {}", args[0]))?;
    let accounts = load_accounts(&args[1], config.limit_mode)
        .with_context(|| format!("loading accounts from {}", args[1]))?;
    let regions =
        load_regions(&args[2]).with_context(|| format!("loading regions from {}", args[2]))?;

    let input = BatchInput {
        transactions,
        accounts,
        regions,
    };
    let pipeline = DecisionPipeline::new(config);
    let report = pipeline.run(&input).context("running decision pipeline")?;

    let approved = report.approved_ids().len();
    let total = report.final_decisions.len();

    ArtifactWriter::new(out_dir)
        .write_report(&input, &report)
        .with_context(|| format!("writing artifacts to {}", out_dir))?;

    tracing::info!("batch complete: {}/{} transactions approved", approved, total);
    Ok(())
}
