//! SQLite backend
//!
//! Objects are kept in a single `objects` table. Base fields get their own
//! columns; dynamic attributes are stored as a JSON object.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use rusqlite::{params, Connection, OptionalExtension};
use thiserror::Error;

use super::engine::{Backend, ObjectMap};
use crate::domain::{AttrValue, Instance, TIMESTAMP_FORMAT};

#[derive(Debug, Error)]
pub enum DbError {
    #[error("Database schema version {found} is newer than supported version {supported}")]
    UnsupportedSchema { found: i32, supported: i32 },

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

/// SQLite-backed object store
pub struct DbBackend {
    /// Path to the SQLite database, `None` for an in-memory database
    db_path: Option<PathBuf>,

    /// Database connection
    conn: Connection,
}

impl DbBackend {
    /// Schema version - bump when schema changes
    const SCHEMA_VERSION: i32 = 1;

    /// Creates or opens the database at the given path
    pub fn open(db_path: &Path) -> Result<Self> {
        if let Some(parent) = db_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }

        let conn = Connection::open(db_path)
            .with_context(|| format!("Failed to open database: {}", db_path.display()))?;

        Self::with_connection(conn, Some(db_path.to_path_buf()))
    }

    /// Creates a database that lives only as long as the backend
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().context("Failed to open in-memory database")?;
        Self::with_connection(conn, None)
    }

    fn with_connection(conn: Connection, db_path: Option<PathBuf>) -> Result<Self> {
        let backend = Self { db_path, conn };
        backend.ensure_schema()?;
        Ok(backend)
    }

    /// Returns the database path, if file-backed
    pub fn path(&self) -> Option<&Path> {
        self.db_path.as_deref()
    }

    /// Ensures the schema is up to date
    fn ensure_schema(&self) -> Result<()> {
        let current_version = self.get_schema_version()?;

        if current_version > Self::SCHEMA_VERSION {
            return Err(DbError::UnsupportedSchema {
                found: current_version,
                supported: Self::SCHEMA_VERSION,
            }
            .into());
        }

        if current_version < Self::SCHEMA_VERSION {
            self.create_schema()?;
        }

        Ok(())
    }

    /// Gets the current schema version
    fn get_schema_version(&self) -> Result<i32> {
        let result: Option<i32> = self
            .conn
            .query_row("PRAGMA user_version", [], |row| row.get(0))
            .optional()
            .map_err(DbError::from)?;

        Ok(result.unwrap_or(0))
    }

    /// Creates the schema from scratch
    fn create_schema(&self) -> Result<()> {
        self.conn
            .execute_batch(
                "
                CREATE TABLE IF NOT EXISTS objects (
                    key TEXT PRIMARY KEY,
                    class_name TEXT NOT NULL,
                    id TEXT NOT NULL,
                    created_at TEXT NOT NULL,
                    updated_at TEXT NOT NULL,
                    attributes TEXT NOT NULL
                );

                CREATE INDEX IF NOT EXISTS idx_objects_class ON objects(class_name);
                ",
            )
            .map_err(DbError::from)?;

        // Set schema version
        self.conn
            .execute_batch(&format!("PRAGMA user_version = {}", Self::SCHEMA_VERSION))
            .map_err(DbError::from)?;

        Ok(())
    }
}

impl Backend for DbBackend {
    fn name(&self) -> &'static str {
        "db"
    }

    fn load(&self) -> Result<Vec<Instance>> {
        let mut stmt = self.conn.prepare(
            "SELECT class_name, id, created_at, updated_at, attributes FROM objects ORDER BY key",
        )?;

        let rows = stmt.query_map([], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, String>(3)?,
                row.get::<_, String>(4)?,
            ))
        })?;

        let mut objects = Vec::new();
        for row in rows {
            let (class_name, id, created_at, updated_at, attributes) = row?;
            let attributes: BTreeMap<String, AttrValue> = serde_json::from_str(&attributes)
                .with_context(|| format!("Invalid attributes for {}.{}", class_name, id))?;
            let key = format!("{}.{}", class_name, id);

            let instance =
                Instance::from_parts(class_name, id, &created_at, &updated_at, attributes)
                    .with_context(|| format!("Failed to read object {}", key))?;
            objects.push(instance);
        }

        Ok(objects)
    }

    fn persist(&mut self, objects: &ObjectMap) -> Result<()> {
        let tx = self.conn.transaction()?;

        // Clear existing data
        tx.execute("DELETE FROM objects", [])?;

        {
            let mut stmt = tx.prepare(
                "INSERT INTO objects (key, class_name, id, created_at, updated_at, attributes)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            )?;

            for (key, instance) in objects {
                let attributes = serde_json::to_string(instance.attributes())
                    .context("Failed to serialize attributes")?;

                stmt.execute(params![
                    key.to_string(),
                    instance.class_name(),
                    instance.id(),
                    instance.created_at().format(TIMESTAMP_FORMAT).to_string(),
                    instance.updated_at().format(TIMESTAMP_FORMAT).to_string(),
                    attributes,
                ])?;
            }
        }

        tx.commit()?;

        Ok(())
    }
}
