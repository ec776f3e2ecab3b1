//! Todo Server - REST API over the item store
//!
//! Serves `/items` CRUD plus `/health` and `/status`.

pub mod error;
pub mod http;

use std::future::Future;
use std::sync::{Arc, Mutex};

use axum::{
    routing::{get, post},
    Router,
};
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use todo_core::{Repository, ServerConfig, StorageError};

/// Shared application state
pub struct AppState {
    repository: Mutex<Repository>,
}

impl AppState {
    pub fn new(repository: Repository) -> Self {
        Self {
            repository: Mutex::new(repository),
        }
    }

    /// State backed by a fresh in-memory store
    pub fn in_memory() -> todo_core::Result<Self> {
        Ok(Self::new(Repository::in_memory()?))
    }

    /// Run `f` with exclusive access to the store
    pub fn with_repository<T>(
        &self,
        f: impl FnOnce(&Repository) -> todo_core::Result<T>,
    ) -> todo_core::Result<T> {
        let repo = self
            .repository
            .lock()
            .map_err(|e| StorageError::Unavailable(format!("Mutex poisoned: {}", e)))?;
        f(&repo)
    }

    /// Take the store back out, e.g. to close it on shutdown
    pub fn into_repository(self) -> Option<Repository> {
        self.repository.into_inner().ok()
    }
}

/// Create the API router
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        // Item endpoints
        .route("/items", get(http::list_items).post(http::create_item))
        .route(
            "/items/{id}",
            get(http::get_item)
                .put(http::update_item)
                .delete(http::delete_item),
        )
        .route("/items/{id}/toggle", post(http::toggle_item))
        // System endpoints
        .route("/health", get(http::health))
        .route("/status", get(http::get_status))
        // Middleware
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}

/// Bind `config`'s address and serve until Ctrl-C or SIGTERM
pub async fn serve(
    config: &ServerConfig,
    state: Arc<AppState>,
) -> Result<(), Box<dyn std::error::Error>> {
    let listener = TcpListener::bind(config.addr()).await?;
    serve_with_shutdown(listener, state, shutdown_signal()).await?;
    Ok(())
}

/// Serve on an already-bound listener until `signal` resolves
pub async fn serve_with_shutdown<F>(
    listener: TcpListener,
    state: Arc<AppState>,
    signal: F,
) -> std::io::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let app = create_router(state);
    tracing::info!("Todo server listening on {}", listener.local_addr()?);
    axum::serve(listener, app)
        .with_graceful_shutdown(signal)
        .await?;
    tracing::info!("Todo server stopped");
    Ok(())
}

/// Resolves on Ctrl-C, or SIGTERM on unix
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
