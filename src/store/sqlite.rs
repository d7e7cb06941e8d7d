use std::{path::Path, sync::RwLock};

use miette::{Context, IntoDiagnostic};
use rusqlite::{params, Connection};
use tracing::debug;

use super::{ClipRecord, ClipStore};
use crate::result::Result;

#[derive(Debug)]
pub struct Sqlite {
    conn: RwLock<Connection>,
}

impl ClipStore for Sqlite {
    fn open_or_create(p: &Path) -> Result<Self> {
        let store = Self {
            conn: RwLock::new(
                Connection::open(p)
                    .into_diagnostic()
                    .wrap_err("Could not open sqlite file")?,
            ),
        };

        store.create_tables()?;

        Ok(store)
    }

    fn record(&self, record: &ClipRecord) -> Result<()> {
        let conn = self.conn.write().unwrap();

        debug!("Recording clip '{}'", record.token);
        conn.execute(
            "INSERT INTO clips
            (token, source_url, title, start_seconds, end_seconds, clip_path, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?)",
            params![
                record.token,
                record.source_url,
                record.title,
                record.start_seconds as i64,
                record.end_seconds as i64,
                record.clip_path,
                record.created_at,
            ],
        )
        .into_diagnostic()
        .wrap_err("Could not insert clip row")?;

        Ok(())
    }

    fn count(&self) -> Result<usize> {
        let conn = self.conn.read().unwrap();

        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM clips", [], |row| row.get(0))
            .into_diagnostic()
            .wrap_err("Could not count clip rows")?;

        Ok(count as usize)
    }

    fn recent(&self, limit: usize) -> Result<Vec<ClipRecord>> {
        let conn = self.conn.read().unwrap();

        let mut stmt = conn
            .prepare(
                "SELECT token, source_url, title, start_seconds, end_seconds, clip_path, created_at
                FROM clips
                ORDER BY created_at DESC, id DESC
                LIMIT ?",
            )
            .into_diagnostic()?;

        let records = stmt
            .query_map([limit as i64], |row| {
                Ok(ClipRecord {
                    token: row.get(0)?,
                    source_url: row.get(1)?,
                    title: row.get(2)?,
                    start_seconds: row.get::<_, i64>(3)? as u64,
                    end_seconds: row.get::<_, i64>(4)? as u64,
                    clip_path: row.get(5)?,
                    created_at: row.get(6)?,
                })
            })
            .into_diagnostic()
            .wrap_err("Could not query clip rows")?
            .flatten()
            .collect();

        Ok(records)
    }
}

impl Sqlite {
    fn create_tables(&self) -> Result<()> {
        let conn = self.conn.write().unwrap();

        conn.execute(
            "CREATE TABLE IF NOT EXISTS clips (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                token TEXT NOT NULL UNIQUE,
                source_url TEXT NOT NULL,
                title TEXT NOT NULL,
                start_seconds INTEGER NOT NULL,
                end_seconds INTEGER NOT NULL,
                clip_path TEXT NOT NULL,
                created_at INTEGER NOT NULL
            )",
            [],
        )
        .into_diagnostic()
        .wrap_err("Could not create the clips table")?;

        Ok(())
    }
}
