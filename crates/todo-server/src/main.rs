//! Todo Server Binary
//!
//! Usage: `todo-server [config.toml|config.json]`. `PORT` overrides the listen port.

use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use todo_core::{Repository, TodoConfig};
use todo_server::{serve, AppState};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let mut config = match std::env::args().nth(1) {
        Some(path) => TodoConfig::load(&path)?,
        None => TodoConfig::default(),
    };
    config.apply_env()?;
    config.validate()?;

    let repository = Repository::connect(&config.database.path)?;
    if let Err(e) = repository.initialize() {
        tracing::warn!("Starting with an unmigrated database, queries may fail: {}", e);
    }

    let state = Arc::new(AppState::new(repository));
    serve(&config.server, Arc::clone(&state)).await?;

    match Arc::try_unwrap(state).ok().and_then(AppState::into_repository) {
        Some(repository) => {
            repository.close()?;
            tracing::info!("Closed database {:?}", config.database.path);
        }
        None => tracing::warn!("Database still in use at shutdown, leaving it to drop"),
    }

    Ok(())
}
