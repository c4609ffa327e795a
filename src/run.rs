//! One extraction run: every configured locality, one after another.

use reqwest::Client;
use std::time::Duration;
use tracing::{error, info, warn};

use crate::error::ExtractError;
use crate::models::{Locality, PriceRecord};
use crate::scrapers::PriceExtractor;

#[derive(Debug)]
pub enum Outcome {
    Extracted(usize),
    Failed(ExtractError),
}

#[derive(Debug)]
pub struct LocalityOutcome {
    pub locality: Locality,
    pub outcome: Outcome,
}

impl LocalityOutcome {
    pub fn succeeded(&self) -> bool {
        matches!(self.outcome, Outcome::Extracted(_))
    }
}

#[derive(Debug, Default)]
pub struct RunReport {
    pub records: Vec<PriceRecord>,
    pub outcomes: Vec<LocalityOutcome>,
}

impl RunReport {
    pub fn attempted(&self) -> usize {
        self.outcomes.len()
    }

    pub fn succeeded(&self) -> usize {
        self.outcomes.iter().filter(|o| o.succeeded()).count()
    }

    pub fn failed(&self) -> usize {
        self.attempted() - self.succeeded()
    }

    pub fn all_failed(&self) -> bool {
        self.succeeded() == 0
    }

    pub fn failures(&self) -> impl Iterator<Item = (&Locality, &ExtractError)> {
        self.outcomes.iter().filter_map(|o| match &o.outcome {
            Outcome::Failed(e) => Some((&o.locality, e)),
            Outcome::Extracted(_) => None,
        })
    }

    /// e.g. `"2 of 3 localities succeeded"`
    pub fn summary(&self) -> String {
        format!(
            "{} of {} localities succeeded",
            self.succeeded(),
            self.attempted()
        )
    }
}

/// Extract every locality in order. A failing locality is logged and
/// recorded; it never stops the others. `pace` is slept between localities.
pub async fn run_extraction(
    extractor: &dyn PriceExtractor,
    client: &Client,
    localities: &[Locality],
    pace: Duration,
) -> RunReport {
    let mut report = RunReport::default();

    for (i, locality) in localities.iter().enumerate() {
        if i > 0 && !pace.is_zero() {
            tokio::time::sleep(pace).await;
        }

        let outcome = match extractor.extract(client, locality).await {
            Ok(records) => {
                if records.is_empty() {
                    warn!("No priced units found for {} on {}", locality, extractor.name());
                }
                let count = records.len();
                report.records.extend(records);
                Outcome::Extracted(count)
            }
            Err(e) => {
                match &e {
                    ExtractError::Parse(_) => warn!("Skipping {}: {}", locality, e),
                    ExtractError::Fetch(fetch) => error!(
                        "Giving up on {} after {} attempt(s): {}",
                        locality,
                        fetch.attempts(),
                        fetch
                    ),
                    ExtractError::Url(_) => error!("Could not extract {}: {}", locality, e),
                }
                Outcome::Failed(e)
            }
        };

        report.outcomes.push(LocalityOutcome {
            locality: locality.clone(),
            outcome,
        });
    }

    info!("{}", report.summary());
    report
}
