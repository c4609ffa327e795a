use anyhow::{bail, Context, Result};
use chrono::Local;
use tracing::{info, warn};

mod config;
mod error;
mod models;
mod parsers;
mod run;
mod scrapers;
mod storage;
mod summary;
mod utils;

use crate::config::Config;
use crate::run::{run_extraction, Outcome};
use crate::scrapers::{InvestKomfortExtractor, PriceExtractor};
use crate::summary::summarize;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("tricity_prices=info".parse()?),
        )
        .init();

    info!(
        "--- Starting price collection at {} ---",
        Local::now().format("%Y-%m-%d %H:%M:%S")
    );

    // Everything up to the first request is fatal on failure.
    let config = Config::load().context("Invalid configuration")?;
    let localities = config.localities();
    let client = utils::http::create_client(&config.http)?;
    let storage = storage::open(&config.output).await?;
    let extractor = InvestKomfortExtractor::from_config(&config);

    info!(
        "Collecting {} localities from {}",
        localities.len(),
        extractor.name()
    );

    let pace = config.http.request_delay();
    let report = run_extraction(&extractor, &client, &localities, pace).await;

    for entry in &report.outcomes {
        match &entry.outcome {
            Outcome::Extracted(count) => info!("{}: {} records", entry.locality, count),
            Outcome::Failed(e) => warn!("Removed {} from this run: {}", entry.locality, e),
        }
    }

    for summary in summarize(&report.records) {
        println!("{}\n", summary);
    }

    let written = storage.append(&report.records).await?;
    match storage::stored_total(storage.as_ref()).await {
        Some(total) => info!(
            "Stored {} new records ({} in total); {}",
            written,
            total,
            report.summary()
        ),
        None => info!("Stored {} new records; {}", written, report.summary()),
    }

    if report.all_failed() {
        bail!("No locality could be processed: {}", report.summary());
    }

    Ok(())
}
