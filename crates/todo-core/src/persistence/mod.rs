//! Persistence layer for items
//!
//! Provides SQLite-backed storage with ordered, idempotent schema migrations.

mod repository;
mod schema;

pub use repository::Repository;
pub use schema::{Migration, MIGRATIONS, SCHEMA_VERSION};
