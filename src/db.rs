//! Session store schema and operations
//!
//! The store is an in-memory SQLite database that lives as long as one
//! session; nothing is written to disk.

use rusqlite::{Connection, OptionalExtension};

use crate::error::Result;
use crate::models::LiquidProfile;

/// A row of the session history table
#[derive(Debug, Clone, PartialEq)]
pub struct HistoryRow {
    pub recorded_at: String,
    pub liquid: String,
    pub volume_ml: f64,
    pub initial_temp_c: f64,
    pub intensity: Option<String>,
    pub mode: String,
    pub estimated_minutes: f64,
}

/// Open a fresh in-memory store with the schema in place
pub fn open_session_store() -> Result<Connection> {
    let conn = Connection::open_in_memory()?;
    init_schema(&conn)?;
    Ok(conn)
}

/// Initialize the database schema
pub fn init_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        -- Liquid catalog
        CREATE TABLE IF NOT EXISTS liquids (
            name TEXT PRIMARY KEY COLLATE NOCASE,
            target_temperature_c REAL NOT NULL
        );

        CREATE TABLE IF NOT EXISTS liquid_aliases (
            alias TEXT PRIMARY KEY COLLATE NOCASE,
            liquid_name TEXT NOT NULL
        );

        -- Past calculations, newest has the highest id
        CREATE TABLE IF NOT EXISTS history (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            recorded_at TEXT NOT NULL,
            liquid TEXT NOT NULL,
            volume_ml REAL NOT NULL,
            initial_temp_c REAL NOT NULL,
            intensity TEXT,
            mode TEXT NOT NULL,
            estimated_minutes REAL NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_liquid_aliases_liquid ON liquid_aliases(liquid_name);
        "#,
    )?;
    Ok(())
}

/// Insert or replace a liquid and its aliases
pub fn upsert_liquid(conn: &Connection, liquid: &LiquidProfile) -> Result<()> {
    conn.execute(
        "INSERT OR REPLACE INTO liquids (name, target_temperature_c) VALUES (?1, ?2)",
        (&liquid.name, liquid.target_temperature_c),
    )?;
    conn.execute(
        "DELETE FROM liquid_aliases WHERE liquid_name = ?1",
        [&liquid.name],
    )?;
    for alias in &liquid.aliases {
        conn.execute(
            "INSERT OR REPLACE INTO liquid_aliases (alias, liquid_name) VALUES (?1, ?2)",
            (alias, &liquid.name),
        )?;
    }
    Ok(())
}

fn aliases_for(conn: &Connection, name: &str) -> Result<Vec<String>> {
    let mut stmt =
        conn.prepare("SELECT alias FROM liquid_aliases WHERE liquid_name = ?1 ORDER BY alias")?;
    let rows = stmt.query_map([name], |row| row.get(0))?;

    let mut results = Vec::new();
    for row in rows {
        results.push(row?);
    }
    Ok(results)
}

/// Look up a liquid by name or alias (case-insensitive)
///
/// A liquid whose name matches wins over one that only has it as an alias.
pub fn get_liquid(conn: &Connection, name_or_alias: &str) -> Result<Option<LiquidProfile>> {
    let row: Option<(String, f64)> = conn
        .query_row(
            "SELECT l.name, l.target_temperature_c
             FROM liquids l
             LEFT JOIN liquid_aliases a ON a.liquid_name = l.name
             WHERE l.name = ?1 OR a.alias = ?1
             ORDER BY (l.name = ?1) DESC, l.name
             LIMIT 1",
            [name_or_alias],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )
        .optional()?;

    match row {
        Some((name, target_temperature_c)) => {
            let aliases = aliases_for(conn, &name)?;
            Ok(Some(LiquidProfile {
                name,
                target_temperature_c,
                aliases,
            }))
        }
        None => Ok(None),
    }
}

/// List all liquids ordered by name
pub fn list_liquids(conn: &Connection) -> Result<Vec<LiquidProfile>> {
    let mut stmt =
        conn.prepare("SELECT name, target_temperature_c FROM liquids ORDER BY name")?;
    let rows = stmt.query_map([], |row| Ok((row.get::<_, String>(0)?, row.get::<_, f64>(1)?)))?;

    let mut results = Vec::new();
    for row in rows {
        let (name, target_temperature_c) = row?;
        let aliases = aliases_for(conn, &name)?;
        results.push(LiquidProfile {
            name,
            target_temperature_c,
            aliases,
        });
    }
    Ok(results)
}

/// Append a history row, returning its id
pub fn insert_history(conn: &Connection, row: &HistoryRow) -> Result<i64> {
    conn.execute(
        "INSERT INTO history
             (recorded_at, liquid, volume_ml, initial_temp_c, intensity, mode, estimated_minutes)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        (
            &row.recorded_at,
            &row.liquid,
            row.volume_ml,
            row.initial_temp_c,
            &row.intensity,
            &row.mode,
            row.estimated_minutes,
        ),
    )?;
    Ok(conn.last_insert_rowid())
}

/// History rows, newest first
pub fn list_history(conn: &Connection, limit: usize) -> Result<Vec<HistoryRow>> {
    let mut stmt = conn.prepare(
        "SELECT recorded_at, liquid, volume_ml, initial_temp_c, intensity, mode, estimated_minutes
         FROM history
         ORDER BY id DESC
         LIMIT ?1",
    )?;

    let rows = stmt.query_map([limit as i64], |row| {
        Ok(HistoryRow {
            recorded_at: row.get(0)?,
            liquid: row.get(1)?,
            volume_ml: row.get(2)?,
            initial_temp_c: row.get(3)?,
            intensity: row.get(4)?,
            mode: row.get(5)?,
            estimated_minutes: row.get(6)?,
        })
    })?;

    let mut results = Vec::new();
    for row in rows {
        results.push(row?);
    }
    Ok(results)
}

/// Drop everything but the newest `keep` rows
pub fn trim_history(conn: &Connection, keep: usize) -> Result<usize> {
    let removed = conn.execute(
        "DELETE FROM history WHERE id NOT IN (SELECT id FROM history ORDER BY id DESC LIMIT ?1)",
        [keep as i64],
    )?;
    Ok(removed)
}

pub fn count_history(conn: &Connection) -> Result<usize> {
    let count: i64 = conn.query_row("SELECT COUNT(*) FROM history", [], |row| row.get(0))?;
    Ok(count as usize)
}

pub fn clear_history(conn: &Connection) -> Result<()> {
    conn.execute("DELETE FROM history", [])?;
    Ok(())
}
