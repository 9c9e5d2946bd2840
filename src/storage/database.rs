use crate::todo::TodoItem;
use anyhow::{Context, Result};
use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::debug;
use uuid::Uuid;

/// Metadata of a stored object, without its bytes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredObject {
    pub key: String,
    pub size: u64,
    pub created_at: DateTime<Utc>,
}

/// Parse an RFC3339 timestamp string into a DateTime<Utc>
fn parse_rfc3339(s: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

/// Fixed-width timestamps so that text ordering matches time ordering.
fn format_timestamp(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// Raw data extracted from a todos row before conversion to TodoItem
struct TodoRowData {
    id_str: String,
    content: Option<String>,
    created_at_str: String,
    updated_at_str: String,
}

impl TodoRowData {
    fn from_row(row: &rusqlite::Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id_str: row.get(0)?,
            content: row.get(1)?,
            created_at_str: row.get(2)?,
            updated_at_str: row.get(3)?,
        })
    }

    fn into_todo_item(self) -> TodoItem {
        let mut todo = TodoItem::new(self.content);
        todo.id = Uuid::parse_str(&self.id_str).unwrap_or_else(|_| Uuid::new_v4());
        if let Some(dt) = parse_rfc3339(&self.created_at_str) {
            todo.created_at = dt;
        }
        if let Some(dt) = parse_rfc3339(&self.updated_at_str) {
            todo.updated_at = dt;
        }
        todo
    }
}

/// SQLite store behind the local backend: todos and uploaded objects.
pub struct Database {
    conn: Connection,
}

impl Database {
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }

        let conn = Connection::open(path)
            .with_context(|| format!("Failed to open database at {path:?}"))?;
        let db = Self { conn };
        db.init_schema()?;
        debug!(path = %path.display(), "opened database");
        Ok(db)
    }

    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().context("Failed to open in-memory database")?;
        let db = Self { conn };
        db.init_schema()?;
        Ok(db)
    }

    fn init_schema(&self) -> Result<()> {
        self.conn.execute(
            "CREATE TABLE IF NOT EXISTS todos (
                id TEXT PRIMARY KEY,
                content TEXT,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            )",
            [],
        )?;

        self.conn.execute(
            "CREATE TABLE IF NOT EXISTS objects (
                key TEXT PRIMARY KEY,
                data BLOB NOT NULL,
                size INTEGER NOT NULL,
                created_at TEXT NOT NULL
            )",
            [],
        )?;

        self.conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_todos_created_at ON todos(created_at)",
            [],
        )?;

        Ok(())
    }

    pub fn insert_todo(&self, item: &TodoItem) -> rusqlite::Result<()> {
        self.conn.execute(
            "INSERT INTO todos (id, content, created_at, updated_at) VALUES (?1, ?2, ?3, ?4)",
            params![
                item.id.to_string(),
                item.content,
                format_timestamp(&item.created_at),
                format_timestamp(&item.updated_at),
            ],
        )?;
        Ok(())
    }

    /// All todos in creation order; ties keep insertion order.
    pub fn load_todos(&self) -> rusqlite::Result<Vec<TodoItem>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, content, created_at, updated_at FROM todos ORDER BY created_at, rowid",
        )?;
        let rows = stmt.query_map([], TodoRowData::from_row)?;

        let mut items = Vec::new();
        for row in rows {
            items.push(row?.into_todo_item());
        }
        Ok(items)
    }

    /// Stores an object, replacing any previous object with the same key.
    pub fn put_object(&self, key: &str, data: &[u8]) -> rusqlite::Result<StoredObject> {
        let created_at = Utc::now();
        self.conn.execute(
            "INSERT OR REPLACE INTO objects (key, data, size, created_at) VALUES (?1, ?2, ?3, ?4)",
            params![key, data, data.len() as i64, format_timestamp(&created_at)],
        )?;

        Ok(StoredObject {
            key: key.to_string(),
            size: data.len() as u64,
            created_at,
        })
    }

    pub fn get_object(&self, key: &str) -> rusqlite::Result<Option<Vec<u8>>> {
        self.conn
            .query_row("SELECT data FROM objects WHERE key = ?1", params![key], |row| {
                row.get(0)
            })
            .optional()
    }

    pub fn list_objects(&self) -> rusqlite::Result<Vec<StoredObject>> {
        let mut stmt = self
            .conn
            .prepare("SELECT key, size, created_at FROM objects ORDER BY created_at, key")?;
        let rows = stmt.query_map([], |row| {
            let size: i64 = row.get(1)?;
            let created_at: String = row.get(2)?;
            Ok(StoredObject {
                key: row.get(0)?,
                size: size as u64,
                created_at: parse_rfc3339(&created_at).unwrap_or_else(Utc::now),
            })
        })?;

        rows.collect()
    }
}
