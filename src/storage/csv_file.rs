use anyhow::{Context, Result};
use async_trait::async_trait;
use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};
use tracing::info;

use crate::models::PriceRecord;
use crate::storage::Storage;

/// Delimited file, one row per record, columns in [`PriceRecord`] field order.
pub struct CsvStorage {
    path: PathBuf,
}

impl CsvStorage {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    fn is_empty(&self) -> bool {
        fs::metadata(&self.path).map(|m| m.len() == 0).unwrap_or(true)
    }
}

#[async_trait]
impl Storage for CsvStorage {
    async fn migrate(&self) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        Ok(())
    }

    async fn append(&self, records: &[PriceRecord]) -> Result<usize> {
        if records.is_empty() {
            return Ok(0);
        }

        let write_header = self.is_empty();
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .with_context(|| format!("Failed to open {}", self.path.display()))?;

        let mut writer = csv::WriterBuilder::new()
            .has_headers(write_header)
            .from_writer(file);

        for record in records {
            writer.serialize(record)?;
        }
        writer.flush()?;

        info!("Appended {} records to {}", records.len(), self.path.display());
        Ok(records.len())
    }

    async fn load_all(&self) -> Result<Vec<PriceRecord>> {
        if self.is_empty() {
            return Ok(Vec::new());
        }

        let mut reader = csv::Reader::from_path(&self.path)
            .with_context(|| format!("Failed to read {}", self.path.display()))?;

        reader
            .deserialize()
            .collect::<Result<Vec<PriceRecord>, _>>()
            .with_context(|| format!("Malformed row in {}", self.path.display()))
    }
}
