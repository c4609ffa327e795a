use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection};
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::info;

use crate::models::{City, PriceRecord};
use crate::storage::Storage;

pub struct SqliteStorage {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteStorage {
    pub async fn new(db_path: &str) -> Result<Self> {
        let conn = Connection::open(db_path)
            .with_context(|| format!("Failed to open SQLite database {}", db_path))?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| anyhow!("SQLite connection lock poisoned"))
    }
}

type StoredRow = (
    String,
    Option<String>,
    Option<String>,
    Option<u32>,
    f64,
    Option<f64>,
    Option<f64>,
    String,
);

fn into_record(row: StoredRow) -> Result<PriceRecord> {
    let (city, neighbourhood, unit, rooms, price, price_max, area, observed_at) = row;

    let city = City::from_key(&city).ok_or_else(|| anyhow!("Unknown city {:?} in database", city))?;
    let observed_at = DateTime::parse_from_rfc3339(&observed_at)
        .with_context(|| format!("Bad timestamp {:?} in database", observed_at))?
        .with_timezone(&Utc);

    Ok(PriceRecord {
        city,
        neighbourhood,
        unit,
        rooms,
        price,
        price_max,
        area,
        observed_at,
    })
}

#[async_trait]
impl Storage for SqliteStorage {
    async fn migrate(&self) -> Result<()> {
        let conn = self.conn()?;

        // One observation of a unit per day; a same-day re-run is a no-op.
        conn.execute(
            "CREATE TABLE IF NOT EXISTS price_records (
                city TEXT NOT NULL,
                neighbourhood TEXT,
                unit TEXT,
                rooms INTEGER,
                price REAL NOT NULL,
                price_max REAL,
                area REAL,
                observed_at TEXT NOT NULL,
                observed_on TEXT NOT NULL,
                fingerprint TEXT NOT NULL,
                UNIQUE (observed_on, fingerprint)
            )",
            [],
        )?;

        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_city_neighbourhood ON price_records(city, neighbourhood)",
            [],
        )?;

        info!("Database migration completed");
        Ok(())
    }

    async fn append(&self, records: &[PriceRecord]) -> Result<usize> {
        let mut conn = self.conn()?;
        let tx = conn.transaction()?;
        let mut written = 0;

        for record in records {
            written += tx.execute(
                "INSERT OR IGNORE INTO price_records
                    (city, neighbourhood, unit, rooms, price, price_max, area, observed_at, observed_on, fingerprint)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
                params![
                    record.city.key(),
                    record.neighbourhood,
                    record.unit,
                    record.rooms,
                    record.price,
                    record.price_max,
                    record.area,
                    record.observed_at.to_rfc3339(),
                    record.observed_at.format("%Y-%m-%d").to_string(),
                    record.fingerprint().0,
                ],
            )?;
        }

        tx.commit()?;
        Ok(written)
    }

    async fn load_all(&self) -> Result<Vec<PriceRecord>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT city, neighbourhood, unit, rooms, price, price_max, area, observed_at
             FROM price_records ORDER BY rowid",
        )?;

        let rows = stmt.query_map([], |row| -> rusqlite::Result<StoredRow> {
            Ok((
                row.get(0)?,
                row.get(1)?,
                row.get(2)?,
                row.get(3)?,
                row.get(4)?,
                row.get(5)?,
                row.get(6)?,
                row.get(7)?,
            ))
        })?;

        let mut records = Vec::new();
        for row in rows {
            records.push(into_record(row?)?);
        }
        Ok(records)
    }
}
