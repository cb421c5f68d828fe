//! SQLite persistence for scan history and diffs.

use crate::error::Result;
use crate::model::VehicleData;
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection};
use std::path::Path;

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS scans (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    data_dir TEXT NOT NULL,
    created_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS scan_vehicles (
    scan_id INTEGER NOT NULL REFERENCES scans(id),
    vehicle_id TEXT NOT NULL,
    data_json TEXT NOT NULL,
    PRIMARY KEY (scan_id, vehicle_id)
);

CREATE INDEX IF NOT EXISTS idx_scan_vehicles_scan ON scan_vehicles(scan_id);
";

/// One row of the `scans` table.
#[derive(Debug, Clone, PartialEq)]
pub struct ScanInfo {
    pub id: i64,
    pub data_dir: String,
    pub created_at: String,
}

pub struct Store {
    conn: Connection,
}

impl Store {
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)?;
        conn.execute_batch(SCHEMA)?;
        Ok(Store { conn })
    }

    /// Record a scan and its vehicles in one transaction.
    pub fn insert_scan(&mut self, data_dir: &str, vehicles: &[VehicleData]) -> Result<i64> {
        let now: DateTime<Utc> = Utc::now();
        let created = now.to_rfc3339();
        let tx = self.conn.transaction()?;
        tx.execute(
            "INSERT INTO scans (data_dir, created_at) VALUES (?1, ?2)",
            params![data_dir, created],
        )?;
        let id = tx.last_insert_rowid();
        {
            let mut stmt = tx.prepare(
                "INSERT OR REPLACE INTO scan_vehicles (scan_id, vehicle_id, data_json) VALUES (?1, ?2, ?3)",
            )?;
            for v in vehicles {
                let json = serde_json::to_string(v)?;
                stmt.execute(params![id, v.id, json])?;
            }
        }
        tx.commit()?;
        Ok(id)
    }

    /// Newest first.
    pub fn list_scans(&self) -> Result<Vec<ScanInfo>> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, data_dir, created_at FROM scans ORDER BY id DESC")?;
        let rows = stmt.query_map([], |r| {
            Ok(ScanInfo {
                id: r.get(0)?,
                data_dir: r.get(1)?,
                created_at: r.get(2)?,
            })
        })?;
        let mut out = Vec::new();
        for row in rows {
            out.push(row?);
        }
        Ok(out)
    }

    pub fn latest_scan(&self) -> Result<Option<ScanInfo>> {
        Ok(self.list_scans()?.into_iter().next())
    }

    pub fn get_scan_vehicles(&self, scan_id: i64) -> Result<Vec<VehicleData>> {
        let mut stmt = self
            .conn
            .prepare("SELECT data_json FROM scan_vehicles WHERE scan_id = ?1 ORDER BY vehicle_id")?;
        let rows = stmt.query_map(params![scan_id], |r| r.get::<_, String>(0))?;
        let mut out = Vec::new();
        for row in rows {
            let json: String = row?;
            out.push(serde_json::from_str(&json)?);
        }
        Ok(out)
    }
}
