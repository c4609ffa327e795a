use anyhow::Result;
use async_trait::async_trait;
use tracing::warn;

use crate::config::{OutputConfig, OutputFormat};
use crate::models::PriceRecord;

mod csv_file;
mod sqlite;
pub use csv_file::CsvStorage;
pub use sqlite::SqliteStorage;

/// Append-only sink for price observations.
#[async_trait]
pub trait Storage: Send + Sync {
    async fn migrate(&self) -> Result<()>;
    /// Returns how many records were actually written.
    async fn append(&self, records: &[PriceRecord]) -> Result<usize>;
    async fn load_all(&self) -> Result<Vec<PriceRecord>>;
}

pub async fn open(output: &OutputConfig) -> Result<Box<dyn Storage>> {
    let storage: Box<dyn Storage> = match output.format {
        OutputFormat::Csv => Box::new(CsvStorage::new(&output.csv_path)),
        OutputFormat::Sqlite => Box::new(SqliteStorage::new(&output.sqlite_path).await?),
    };
    storage.migrate().await?;
    Ok(storage)
}

/// Number of stored records, for the end-of-run log line. An unreadable
/// history is reported and yields `None`; it never fails the run.
pub async fn stored_total(storage: &dyn Storage) -> Option<usize> {
    match storage.load_all().await {
        Ok(records) => Some(records.len()),
        Err(e) => {
            warn!("Could not read stored history: {:#}", e);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::City;
    use chrono::{TimeZone, Utc};
    use std::fs;

    fn record() -> PriceRecord {
        PriceRecord {
            city: City::Gdynia,
            neighbourhood: Some("silva".into()),
            unit: Some("2 pokoje".into()),
            rooms: Some(2),
            price: 420_000.0,
            price_max: None,
            area: None,
            observed_at: Utc.with_ymd_and_hms(2024, 5, 2, 6, 0, 0).unwrap(),
        }
    }

    #[tokio::test]
    async fn malformed_history_does_not_block_append() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("prices.csv");
        fs::write(
            &path,
            "city,neighbourhood,unit,rooms,price,price_max,area,observed_at\n\
             gdynia,silva,,,garbage,,,2024-05-01T06:00:00Z\n",
        )
        .unwrap();

        let storage = CsvStorage::new(&path);
        assert_eq!(storage.append(&[record()]).await.unwrap(), 1);
        assert_eq!(stored_total(&storage).await, None);
    }

    #[tokio::test]
    async fn stored_total_counts_readable_history() {
        let dir = tempfile::tempdir().unwrap();
        let storage = CsvStorage::new(dir.path().join("prices.csv"));
        storage.append(&[record(), record()]).await.unwrap();
        assert_eq!(stored_total(&storage).await, Some(2));
    }
}
