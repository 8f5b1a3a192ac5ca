//! Append-only SQLite store for battery samples.
//!
//! One row per device per collection tick. Every operation opens its own
//! short-lived connection; there is a single writer (the collector).

use battmon_core::{BatteryError, Result, Sample};
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::path::{Path, PathBuf};

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS samples (
    ts                    REAL NOT NULL,
    percentage            REAL,
    capacity_pct          REAL,
    health_pct            REAL,
    energy_now_wh         REAL,
    energy_full_wh        REAL,
    energy_full_design_wh REAL,
    status                TEXT,
    source_path           TEXT
);
CREATE INDEX IF NOT EXISTS idx_samples_ts ON samples (ts);
"#;

const COLUMNS: &str = "ts, percentage, capacity_pct, health_pct, energy_now_wh, \
                       energy_full_wh, energy_full_design_wh, status, source_path";

/// Handle to the sample database at a fixed path.
#[derive(Debug, Clone)]
pub struct Store {
    path: PathBuf,
}

impl Store {
    /// Open (creating parent directories and schema if needed) the database at `path`.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        let store = Self { path };
        store.connect()?.execute_batch(SCHEMA).map_err(db_err)?;
        Ok(store)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn connect(&self) -> Result<Connection> {
        Connection::open(&self.path).map_err(|e| {
            BatteryError::Store(format!("cannot open '{}': {e}", self.path.display()))
        })
    }

    pub fn insert_sample(&self, sample: &Sample) -> Result<()> {
        self.insert_samples(std::slice::from_ref(sample))
    }

    /// Insert all `samples` in one transaction.
    pub fn insert_samples(&self, samples: &[Sample]) -> Result<()> {
        let mut conn = self.connect()?;
        let tx = conn.transaction().map_err(db_err)?;
        {
            let mut stmt = tx
                .prepare(&format!(
                    "INSERT INTO samples ({COLUMNS}) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)"
                ))
                .map_err(db_err)?;
            for sample in samples {
                stmt.execute(params![
                    sample.ts,
                    sample.percentage,
                    sample.capacity_pct,
                    sample.health_pct,
                    sample.energy_now_wh,
                    sample.energy_full_wh,
                    sample.energy_full_design_wh,
                    sample.status,
                    sample.source_path,
                ])
                .map_err(db_err)?;
            }
        }
        tx.commit().map_err(db_err)?;
        tracing::debug!(rows = samples.len(), "inserted samples");
        Ok(())
    }

    /// Number of stored rows, optionally only those at or after `since`.
    pub fn count_samples(&self, since: Option<f64>) -> Result<usize> {
        self.count("SELECT COUNT(*) FROM samples WHERE ?1 IS NULL OR ts >= ?1", since)
    }

    /// Number of distinct collection ticks, optionally only those at or after `since`.
    pub fn count_events(&self, since: Option<f64>) -> Result<usize> {
        self.count(
            "SELECT COUNT(DISTINCT ts) FROM samples WHERE ?1 IS NULL OR ts >= ?1",
            since,
        )
    }

    fn count(&self, sql: &str, since: Option<f64>) -> Result<usize> {
        let count: i64 = self
            .connect()?
            .query_row(sql, params![since], |row| row.get(0))
            .map_err(db_err)?;
        Ok(usize::try_from(count).unwrap_or_default())
    }

    /// All rows at or after `since` (everything when `None`), oldest first.
    pub fn fetch_samples(&self, since: Option<f64>) -> Result<Vec<Sample>> {
        let conn = self.connect()?;
        let mut stmt = conn
            .prepare(&format!(
                "SELECT {COLUMNS} FROM samples WHERE ?1 IS NULL OR ts >= ?1 ORDER BY ts"
            ))
            .map_err(db_err)?;
        let rows = stmt
            .query_map(params![since], sample_from_row)
            .map_err(db_err)?;
        rows.collect::<rusqlite::Result<Vec<_>>>().map_err(db_err)
    }

    /// Every device row written at exactly `ts`.
    pub fn fetch_samples_for_timestamp(&self, ts: f64) -> Result<Vec<Sample>> {
        samples_at(&self.connect()?, ts)
    }

    /// Device rows of the oldest collection tick; empty when the store is empty.
    pub fn fetch_first_event(&self) -> Result<Vec<Sample>> {
        self.event_at("SELECT MIN(ts) FROM samples")
    }

    /// Device rows of the newest collection tick; empty when the store is empty.
    pub fn fetch_latest_event(&self) -> Result<Vec<Sample>> {
        self.event_at("SELECT MAX(ts) FROM samples")
    }

    fn event_at(&self, ts_query: &str) -> Result<Vec<Sample>> {
        let conn = self.connect()?;
        let ts: Option<f64> = conn
            .query_row(ts_query, [], |row| row.get::<_, Option<f64>>(0))
            .optional()
            .map_err(db_err)?
            .flatten();
        match ts {
            Some(ts) => samples_at(&conn, ts),
            None => Ok(Vec::new()),
        }
    }

    /// Up to `limit` most recent collection ticks, newest first.
    pub fn fetch_recent_events(&self, limit: usize) -> Result<Vec<Vec<Sample>>> {
        let conn = self.connect()?;
        let timestamps: Vec<f64> = {
            let mut stmt = conn
                .prepare("SELECT DISTINCT ts FROM samples ORDER BY ts DESC LIMIT ?1")
                .map_err(db_err)?;
            let limit = i64::try_from(limit).unwrap_or(i64::MAX);
            let rows = stmt
                .query_map(params![limit], |row| row.get::<_, f64>(0))
                .map_err(db_err)?;
            rows.collect::<rusqlite::Result<_>>().map_err(db_err)?
        };

        timestamps.into_iter().map(|ts| samples_at(&conn, ts)).collect()
    }
}

fn samples_at(conn: &Connection, ts: f64) -> Result<Vec<Sample>> {
    let mut stmt = conn
        .prepare(&format!(
            "SELECT {COLUMNS} FROM samples WHERE ts = ?1 ORDER BY source_path"
        ))
        .map_err(db_err)?;
    let rows = stmt.query_map(params![ts], sample_from_row).map_err(db_err)?;
    rows.collect::<rusqlite::Result<Vec<_>>>().map_err(db_err)
}

fn sample_from_row(row: &Row<'_>) -> rusqlite::Result<Sample> {
    Ok(Sample {
        ts: row.get("ts")?,
        percentage: row.get("percentage")?,
        capacity_pct: row.get("capacity_pct")?,
        health_pct: row.get("health_pct")?,
        energy_now_wh: row.get("energy_now_wh")?,
        energy_full_wh: row.get("energy_full_wh")?,
        energy_full_design_wh: row.get("energy_full_design_wh")?,
        status: row.get("status")?,
        source_path: row
            .get::<_, Option<String>>("source_path")?
            .unwrap_or_default(),
    })
}

fn db_err(e: rusqlite::Error) -> BatteryError {
    BatteryError::Store(e.to_string())
}
