// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use directories::ProjectDirs;
use once_cell::sync::Lazy;
use rusqlite::{Connection, OptionalExtension, params};
use std::fs;
use std::path::PathBuf;

use crate::models::FinanceOverview;

static APP: Lazy<(&str, &str, &str)> = Lazy::new(|| ("lk.aqualink", "AquaLink", "aqualink"));

pub fn data_dir() -> Result<PathBuf> {
    if let Ok(dir) = std::env::var("AQUALINK_DATA_DIR") {
        let dir = PathBuf::from(dir);
        fs::create_dir_all(&dir).context("Failed to create data dir")?;
        return Ok(dir);
    }
    let proj = ProjectDirs::from(APP.0, APP.1, APP.2)
        .context("Could not determine platform-specific data dir")?;
    let data_dir = proj.data_dir();
    fs::create_dir_all(data_dir).context("Failed to create data dir")?;
    Ok(data_dir.to_path_buf())
}

pub fn db_path() -> Result<PathBuf> {
    Ok(data_dir()?.join("aqualink.sqlite"))
}

pub fn open_or_init() -> Result<Connection> {
    let path = db_path()?;
    let conn =
        Connection::open(&path).with_context(|| format!("Open DB at {}", path.display()))?;
    init_schema(&conn)?;
    Ok(conn)
}

pub fn init_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
    CREATE TABLE IF NOT EXISTS settings(
        key TEXT PRIMARY KEY,
        value TEXT NOT NULL
    );

    -- at most one row
    CREATE TABLE IF NOT EXISTS session(
        id INTEGER PRIMARY KEY CHECK(id = 1),
        user TEXT NOT NULL,
        role TEXT NOT NULL,
        token TEXT,
        updated_at TEXT NOT NULL DEFAULT (datetime('now'))
    );

    CREATE TABLE IF NOT EXISTS overview_snapshots(
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        fetched_at TEXT NOT NULL,
        body TEXT NOT NULL
    );
    "#,
    )?;
    Ok(())
}

pub fn get_setting(conn: &Connection, key: &str) -> Result<Option<String>> {
    let v = conn
        .query_row("SELECT value FROM settings WHERE key=?1", params![key], |r| {
            r.get(0)
        })
        .optional()?;
    Ok(v)
}

pub fn set_setting(conn: &Connection, key: &str, value: &str) -> Result<()> {
    conn.execute(
        "INSERT INTO settings(key, value) VALUES(?1, ?2)
         ON CONFLICT(key) DO UPDATE SET value=excluded.value",
        params![key, value],
    )?;
    Ok(())
}

pub fn unset_setting(conn: &Connection, key: &str) -> Result<()> {
    conn.execute("DELETE FROM settings WHERE key=?1", params![key])?;
    Ok(())
}

/// Keeps only the newest snapshot; older ones are never read.
pub fn save_overview_snapshot(
    conn: &Connection,
    overview: &FinanceOverview,
    fetched_at: DateTime<Utc>,
) -> Result<()> {
    let body = serde_json::to_string(overview)?;
    conn.execute("DELETE FROM overview_snapshots", [])?;
    conn.execute(
        "INSERT INTO overview_snapshots(fetched_at, body) VALUES (?1, ?2)",
        params![fetched_at.to_rfc3339(), body],
    )?;
    Ok(())
}

pub fn last_overview_snapshot(
    conn: &Connection,
) -> Result<Option<(DateTime<Utc>, FinanceOverview)>> {
    let row: Option<(String, String)> = conn
        .query_row(
            "SELECT fetched_at, body FROM overview_snapshots ORDER BY id DESC LIMIT 1",
            [],
            |r| Ok((r.get(0)?, r.get(1)?)),
        )
        .optional()?;
    let Some((at, body)) = row else {
        return Ok(None);
    };
    let at = DateTime::parse_from_rfc3339(&at)
        .with_context(|| format!("Invalid snapshot timestamp '{}'", at))?
        .with_timezone(&Utc);
    let overview: FinanceOverview =
        serde_json::from_str(&body).context("Corrupt overview snapshot")?;
    Ok(Some((at, overview)))
}
