//! SQLite schema and ordered migrations for the item store
//!
//! Each migration carries its own precondition probe, so a database created
//! by a build that predates version tracking is still upgraded in place.

use rusqlite::Connection;

/// Highest migration version
pub const SCHEMA_VERSION: u32 = 3;

/// Version bookkeeping table, created before any migration runs
pub const VERSION_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS schema_version (
    version INTEGER PRIMARY KEY,
    description TEXT NOT NULL,
    applied_at TEXT NOT NULL DEFAULT (datetime('now'))
);
"#;

/// A single forward-only schema step
pub struct Migration {
    pub version: u32,
    pub description: &'static str,
    /// Returns true when the change is already present in the database
    pub satisfied: fn(&Connection) -> rusqlite::Result<bool>,
    pub sql: &'static str,
}

/// All migrations, in application order
pub const MIGRATIONS: &[Migration] = &[
    Migration {
        version: 1,
        description: "create items table",
        satisfied: items_table_exists,
        sql: r#"
CREATE TABLE IF NOT EXISTS items (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    title TEXT NOT NULL,
    description TEXT,
    completed INTEGER NOT NULL DEFAULT 0,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);
"#,
    },
    Migration {
        version: 2,
        description: "add items.reminder_date",
        satisfied: reminder_column_exists,
        sql: "ALTER TABLE items ADD COLUMN reminder_date TEXT;",
    },
    Migration {
        version: 3,
        description: "index items by reminder_date",
        satisfied: reminder_index_exists,
        sql: "CREATE INDEX IF NOT EXISTS idx_items_reminder ON items(reminder_date, created_at);",
    },
];

fn items_table_exists(conn: &Connection) -> rusqlite::Result<bool> {
    table_exists(conn, "items")
}

fn reminder_column_exists(conn: &Connection) -> rusqlite::Result<bool> {
    column_exists(conn, "items", "reminder_date")
}

fn reminder_index_exists(conn: &Connection) -> rusqlite::Result<bool> {
    index_exists(conn, "idx_items_reminder")
}

/// Whether a table named `table` exists
pub fn table_exists(conn: &Connection, table: &str) -> rusqlite::Result<bool> {
    conn.query_row(
        "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = ?1",
        [table],
        |row| row.get::<_, i64>(0),
    )
    .map(|n| n > 0)
}

/// Whether `table` has a column named `column`
pub fn column_exists(conn: &Connection, table: &str, column: &str) -> rusqlite::Result<bool> {
    let mut stmt = conn.prepare("SELECT name FROM pragma_table_info(?1)")?;
    let names = stmt
        .query_map([table], |row| row.get::<_, String>(0))?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(names.iter().any(|name| name == column))
}

/// Whether an index named `index` exists
pub fn index_exists(conn: &Connection, index: &str) -> rusqlite::Result<bool> {
    conn.query_row(
        "SELECT COUNT(*) FROM sqlite_master WHERE type = 'index' AND name = ?1",
        [index],
        |row| row.get::<_, i64>(0),
    )
    .map(|n| n > 0)
}
