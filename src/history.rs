//! Session history
//!
//! A capped, newest-first record of the calculations made in this session,
//! kept in the session store and exportable as CSV.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::Connection;
use serde::Serialize;
use tracing::{debug, info};

use crate::db::{self, HistoryRow};
use crate::error::Result;
use crate::models::{HeatingRequest, HeatingResult, Mode};

/// Entries kept unless configured otherwise.
pub const DEFAULT_HISTORY_LIMIT: usize = 10;

/// One past calculation, in the shape it is exported
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistoryEntry {
    pub timestamp: String,
    pub liquid: String,
    pub volume_ml: f64,
    pub initial_temp_c: f64,
    pub intensity: Option<String>,
    pub mode: String,
    pub estimated_minutes: f64,
}

impl HistoryEntry {
    pub fn from_calculation(
        request: &HeatingRequest,
        result: &HeatingResult,
        at: DateTime<Utc>,
    ) -> Self {
        Self {
            timestamp: at.to_rfc3339_opts(SecondsFormat::Secs, true),
            liquid: request.liquid.name.clone(),
            volume_ml: request.volume_ml,
            initial_temp_c: request.initial_temperature_c,
            intensity: match request.mode {
                Mode::Basic => request.intensity.map(|i| i.name().to_string()),
                Mode::Advanced => None,
            },
            mode: request.mode.name().to_string(),
            estimated_minutes: result.estimated_minutes,
        }
    }
}

impl From<HistoryRow> for HistoryEntry {
    fn from(row: HistoryRow) -> Self {
        Self {
            timestamp: row.recorded_at,
            liquid: row.liquid,
            volume_ml: row.volume_ml,
            initial_temp_c: row.initial_temp_c,
            intensity: row.intensity,
            mode: row.mode,
            estimated_minutes: row.estimated_minutes,
        }
    }
}

/// Record a finished calculation, dropping the oldest entries beyond `cap`
pub fn record(
    conn: &Connection,
    request: &HeatingRequest,
    result: &HeatingResult,
    cap: usize,
) -> Result<HistoryEntry> {
    let entry = HistoryEntry::from_calculation(request, result, Utc::now());
    let id = db::insert_history(
        conn,
        &HistoryRow {
            recorded_at: entry.timestamp.clone(),
            liquid: entry.liquid.clone(),
            volume_ml: entry.volume_ml,
            initial_temp_c: entry.initial_temp_c,
            intensity: entry.intensity.clone(),
            mode: entry.mode.clone(),
            estimated_minutes: entry.estimated_minutes,
        },
    )?;
    let dropped = db::trim_history(conn, cap)?;
    debug!(id, dropped, cap, "recorded calculation");
    Ok(entry)
}

/// All kept entries, newest first
pub fn recent(conn: &Connection, cap: usize) -> Result<Vec<HistoryEntry>> {
    Ok(db::list_history(conn, cap)?
        .into_iter()
        .map(HistoryEntry::from)
        .collect())
}

/// Forget every entry, returning how many there were
pub fn clear(conn: &Connection) -> Result<usize> {
    let count = db::count_history(conn)?;
    db::clear_history(conn)?;
    Ok(count)
}

/// Write entries as CSV with a header row
pub fn export_csv<W: Write>(entries: &[HistoryEntry], writer: W) -> Result<()> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    if entries.is_empty() {
        csv_writer.write_record([
            "timestamp",
            "liquid",
            "volume_ml",
            "initial_temp_c",
            "intensity",
            "mode",
            "estimated_minutes",
        ])?;
    }
    for entry in entries {
        csv_writer.serialize(entry)?;
    }
    csv_writer.flush()?;
    Ok(())
}

pub fn export_csv_to_path(entries: &[HistoryEntry], path: &Path) -> Result<()> {
    let file = File::create(path)?;
    export_csv(entries, file)?;
    info!(path = %path.display(), count = entries.len(), "exported session history");
    Ok(())
}
