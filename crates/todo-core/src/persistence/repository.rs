//! Repository for CRUD operations on items

use std::cell::Cell;
use std::path::Path;

use chrono::{DateTime, Duration, SecondsFormat, SubsecRound, Utc};
use rusqlite::types::{Type, Value};
use rusqlite::{params, Connection, OptionalExtension};

use super::schema::{MIGRATIONS, SCHEMA_VERSION, VERSION_TABLE};
use crate::error::{Result, StorageError, TodoError};
use crate::item::{Item, ItemChanges, ItemId, NewItem};
use crate::ordering::LIST_ORDER_SQL;

const ITEM_COLUMNS: &str =
    "id, title, description, completed, reminder_date, created_at, updated_at";

/// Repository for persisting items
pub struct Repository {
    conn: Connection,
    clock: Clock,
}

impl Repository {
    /// Open the database at `path` and bring its schema up to date
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let repo = Self::connect(path)?;
        repo.initialize()?;
        Ok(repo)
    }

    /// Open the database at `path` without touching the schema
    pub fn connect(path: impl AsRef<Path>) -> Result<Self> {
        let conn = Connection::open(path)?;
        Ok(Self::from_connection(conn))
    }

    /// Create an in-memory repository (for testing)
    pub fn in_memory() -> Result<Self> {
        let repo = Self::from_connection(Connection::open_in_memory()?);
        repo.initialize()?;
        Ok(repo)
    }

    fn from_connection(conn: Connection) -> Self {
        Self {
            conn,
            clock: Clock::default(),
        }
    }

    /// Apply every pending migration, returning the versions that ran
    pub fn initialize(&self) -> Result<Vec<u32>> {
        match self.run_migrations() {
            Ok(applied) => {
                tracing::info!(
                    applied = ?applied,
                    version = SCHEMA_VERSION,
                    "Database initialized successfully"
                );
                Ok(applied)
            }
            Err(e) => {
                tracing::error!("Error initializing database: {}", e);
                Err(e)
            }
        }
    }

    fn run_migrations(&self) -> Result<Vec<u32>> {
        self.conn.execute_batch(VERSION_TABLE)?;

        let recorded = self.recorded_versions()?;
        let mut applied = Vec::new();

        for migration in MIGRATIONS {
            if recorded.contains(&migration.version) {
                continue;
            }

            let failed = |e: rusqlite::Error| StorageError::Migration {
                version: migration.version,
                message: e.to_string(),
            };

            let tx = self.conn.unchecked_transaction().map_err(failed)?;
            if !(migration.satisfied)(&*tx).map_err(failed)? {
                tx.execute_batch(migration.sql).map_err(failed)?;
                applied.push(migration.version);
                tracing::debug!(version = migration.version, "{}", migration.description);
            }
            tx.execute(
                "INSERT OR IGNORE INTO schema_version (version, description) VALUES (?1, ?2)",
                params![migration.version, migration.description],
            )
            .map_err(failed)?;
            tx.commit().map_err(failed)?;
        }

        self.seed_clock()?;
        Ok(applied)
    }

    /// Never issue a timestamp at or before one already stored
    fn seed_clock(&self) -> Result<()> {
        let latest: Option<String> = self
            .conn
            .query_row("SELECT MAX(updated_at) FROM items", [], |row| row.get(0))?;
        if let Some(raw) = latest {
            self.clock.observe(parse_timestamp(0, &raw)?);
        }
        Ok(())
    }

    fn recorded_versions(&self) -> Result<Vec<u32>> {
        let mut stmt = self.conn.prepare("SELECT version FROM schema_version")?;
        let versions = stmt
            .query_map([], |row| row.get(0))?
            .collect::<rusqlite::Result<Vec<u32>>>()?;
        Ok(versions)
    }

    /// Highest recorded schema version, 0 for an uninitialized database
    pub fn schema_version(&self) -> Result<u32> {
        let version: Option<u32> = self
            .conn
            .query_row("SELECT MAX(version) FROM schema_version", [], |row| row.get(0))
            .optional()?
            .flatten();
        Ok(version.unwrap_or(0))
    }

    // ==================== Item Operations ====================

    /// All items, reminders first (earliest first), then newest
    pub fn list_all(&self) -> Result<Vec<Item>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {} FROM items ORDER BY {}",
            ITEM_COLUMNS, LIST_ORDER_SQL
        ))?;

        let items = stmt
            .query_map([], Self::row_to_item)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(items)
    }

    /// Get an item by id
    pub fn get(&self, id: ItemId) -> Result<Option<Item>> {
        let item = self
            .conn
            .query_row(
                &format!("SELECT {} FROM items WHERE id = ?1", ITEM_COLUMNS),
                [id.value()],
                Self::row_to_item,
            )
            .optional()?;
        Ok(item)
    }

    /// Insert a new item; the store assigns id and timestamps
    pub fn create(&self, new_item: &NewItem) -> Result<Item> {
        let now = self.clock.now();
        let stamp = format_timestamp(&now);

        self.conn.execute(
            r#"
            INSERT INTO items (title, description, completed, reminder_date, created_at, updated_at)
            VALUES (?1, ?2, 0, ?3, ?4, ?4)
            "#,
            params![
                new_item.title,
                new_item.description,
                new_item.reminder_date,
                stamp,
            ],
        )?;

        let id = ItemId::new(self.conn.last_insert_rowid());
        tracing::debug!(%id, "created item");

        Ok(Item {
            id,
            title: new_item.title.clone(),
            description: new_item.description.clone(),
            completed: false,
            reminder_date: new_item.reminder_date.clone(),
            created_at: now,
            updated_at: now,
        })
    }

    /// Apply the supplied fields and refresh `updated_at`.
    ///
    /// Returns the row as re-read after the write; `None` when the id does
    /// not exist.
    pub fn update(&self, id: ItemId, changes: &ItemChanges) -> Result<Option<Item>> {
        let mut assignments: Vec<&str> = Vec::new();
        let mut values: Vec<Value> = Vec::new();

        if let Some(title) = &changes.title {
            assignments.push("title = ?");
            values.push(Value::Text(title.clone()));
        }
        if let Some(description) = &changes.description {
            assignments.push("description = ?");
            values.push(optional_text(description));
        }
        if let Some(completed) = changes.completed {
            assignments.push("completed = ?");
            values.push(Value::Integer(completed as i64));
        }
        if let Some(reminder_date) = &changes.reminder_date {
            assignments.push("reminder_date = ?");
            values.push(optional_text(reminder_date));
        }

        assignments.push("updated_at = ?");
        values.push(Value::Text(format_timestamp(&self.clock.now())));
        values.push(Value::Integer(id.value()));

        let sql = format!("UPDATE items SET {} WHERE id = ?", assignments.join(", "));
        let changed = self
            .conn
            .execute(&sql, rusqlite::params_from_iter(values))?;
        tracing::debug!(%id, changed, "updated item");

        self.get(id)
    }

    /// Flip `completed` in a single statement
    pub fn toggle_completed(&self, id: ItemId) -> Result<Option<Item>> {
        let stamp = format_timestamp(&self.clock.now());
        self.conn.execute(
            "UPDATE items SET completed = NOT completed, updated_at = ?1 WHERE id = ?2",
            params![stamp, id.value()],
        )?;
        self.get(id)
    }

    /// Physically remove an item; false when no row matched
    pub fn delete(&self, id: ItemId) -> Result<bool> {
        let removed = self
            .conn
            .execute("DELETE FROM items WHERE id = ?1", [id.value()])?;
        tracing::debug!(%id, removed, "deleted item");
        Ok(removed > 0)
    }

    /// Number of stored items
    pub fn count(&self) -> Result<u64> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM items", [], |row| row.get(0))?;
        Ok(count as u64)
    }

    /// Close the underlying connection, reporting any error SQLite raises
    pub fn close(self) -> Result<()> {
        self.conn
            .close()
            .map_err(|(_, e)| TodoError::from(e))
    }

    fn row_to_item(row: &rusqlite::Row) -> rusqlite::Result<Item> {
        let created_at: String = row.get(5)?;
        let updated_at: String = row.get(6)?;

        Ok(Item {
            id: ItemId::new(row.get(0)?),
            title: row.get(1)?,
            description: row.get(2)?,
            completed: row.get(3)?,
            reminder_date: row.get(4)?,
            created_at: parse_timestamp(5, &created_at)?,
            updated_at: parse_timestamp(6, &updated_at)?,
        })
    }
}

/// Issues strictly increasing microsecond-precision timestamps
#[derive(Debug, Default)]
struct Clock {
    last: Cell<Option<DateTime<Utc>>>,
}

impl Clock {
    fn now(&self) -> DateTime<Utc> {
        let mut now = Utc::now().trunc_subsecs(6);
        if let Some(last) = self.last.get() {
            if now <= last {
                now = last + Duration::microseconds(1);
            }
        }
        self.last.set(Some(now));
        now
    }

    fn observe(&self, stored: DateTime<Utc>) {
        if self.last.get().map_or(true, |last| stored > last) {
            self.last.set(Some(stored));
        }
    }
}

fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn parse_timestamp(idx: usize, raw: &str) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

fn optional_text(value: &Option<String>) -> Value {
    match value {
        Some(text) => Value::Text(text.clone()),
        None => Value::Null,
    }
}
