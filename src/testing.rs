//! Test utilities for database setup.
//!
//! Provides a tempfile-backed sqlite fixture initialized through the
//! authoritative schema, so tests never duplicate DDL.

use rusqlite::Connection;
use std::path::Path;
use tempfile::TempDir;

use crate::domain::Flashcard;

/// Test environment with a study database using the authoritative schema.
pub struct TestEnv {
    /// Temporary directory (kept alive for database file persistence)
    pub temp: TempDir,
    /// Study database connection with full schema (all migrations)
    pub conn: Connection,
}

impl TestEnv {
    pub fn new() -> rusqlite::Result<Self> {
        let temp =
            TempDir::new().map_err(|e| rusqlite::Error::ToSqlConversionFailure(Box::new(e)))?;

        let db_path = temp.path().join("cardbox.db");
        let conn = Connection::open(&db_path)?;
        // The bundled SQLite is compiled with SQLITE_DEFAULT_FOREIGN_KEYS=1;
        // fixtures here assume stock SQLite's default of no FK enforcement
        // (dangling difficulty ids, deleting referenced parent rows).
        conn.pragma_update(None, "foreign_keys", false)?;
        crate::db::schema::run_migrations(&conn)?;

        Ok(Self { temp, conn })
    }

    /// Get the temporary directory path for creating test files.
    pub fn path(&self) -> &Path {
        self.temp.path()
    }

    /// Seed `count` flashcards into a study set, returning their ids in
    /// position order.
    pub fn seed_study_set(&self, study_set_id: i64, count: i64) -> rusqlite::Result<Vec<i64>> {
        (0..count)
            .map(|position| {
                crate::db::flashcards::insert_flashcard(
                    &self.conn,
                    &Flashcard {
                        id: 0,
                        study_set_id,
                        position,
                        term: format!("term {}", position),
                        definition: format!("definition {}", position),
                        media_id: None,
                    },
                )
            })
            .collect()
    }
}
