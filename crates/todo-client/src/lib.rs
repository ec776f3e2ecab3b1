//! Todo Client - typed access to the item API
//!
//! - **client**: `ItemApi` and its reqwest implementation `ItemClient`
//! - **view**: `ListView`, the cached, sorted item list a UI renders from

pub mod client;
pub mod view;

pub use client::{ClientError, Health, ItemApi, ItemClient, DEFAULT_BASE_URL};
pub use view::{default_reminder, ListView, NewItemForm};
