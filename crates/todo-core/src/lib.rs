//! Todo Core - items, ordering and storage for a single-user to-do list
//!
//! - **Item**: the to-do entry plus the create/update request payloads
//! - **Ordering**: the one reminder-date ordering policy shared by store and views
//! - **Persistence**: SQLite item store with startup migrations
//! - **Config**: listen address and database location
//! - **Error**: `NotFound`, `InvalidInput` and opaque storage failures

pub mod config;
pub mod error;
pub mod item;
pub mod ordering;
pub mod persistence;

pub use config::{ConfigError, DatabaseConfig, ServerConfig, TodoConfig};
pub use error::{Result, StorageError, TodoError};
pub use item::{CreateItemRequest, Item, ItemChanges, ItemId, NewItem, UpdateItemRequest};
pub use ordering::{sort_items, SortOrder};
pub use persistence::{Repository, SCHEMA_VERSION};
