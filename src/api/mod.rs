//! HTTP API server for the callbell relay

pub mod dashboard;
pub mod events;
pub mod health;

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::{Arc, RwLock};

use axum::Router;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::announce::AnnouncerHandle;
use crate::config::{ButtonSpec, Config};
use crate::journal::EventJournal;
use crate::Result;

/// Shared state for API handlers
///
/// The journal lock is `std::sync::RwLock`: every acquisition is a brief
/// in-memory operation that never spans an `.await` point.
#[derive(Clone)]
pub struct ApiState {
    /// The press journal shared between the write and read paths
    pub journal: Arc<RwLock<EventJournal>>,
    /// Sender side of the announcement queue
    pub announcer: AnnouncerHandle,
    /// Registered buttons keyed by category name
    pub buttons: Arc<BTreeMap<String, ButtonSpec>>,
    /// Quote pool for quote buttons
    pub quotes: Arc<Vec<String>>,
}

impl ApiState {
    /// Assemble handler state from configuration and the shared pieces.
    #[must_use]
    pub fn new(
        config: &Config,
        journal: Arc<RwLock<EventJournal>>,
        announcer: AnnouncerHandle,
    ) -> Self {
        Self {
            journal,
            announcer,
            buttons: Arc::new(config.button_map()),
            quotes: Arc::new(config.quotes.clone()),
        }
    }
}

/// API server
pub struct ApiServer {
    state: Arc<ApiState>,
    bind: String,
    port: u16,
    static_dir: Option<PathBuf>,
}

impl ApiServer {
    /// Create a server from configuration and the shared pieces.
    #[must_use]
    pub fn new(
        config: &Config,
        journal: Arc<RwLock<EventJournal>>,
        announcer: AnnouncerHandle,
    ) -> Self {
        Self {
            state: Arc::new(ApiState::new(config, journal, announcer)),
            bind: config.server.bind.clone(),
            port: config.server.port,
            static_dir: config.server.static_dir.clone(),
        }
    }

    /// Build the router with all routes
    fn router(&self) -> Router {
        let mut router = Router::new()
            .merge(dashboard::router())
            .merge(events::router(self.state.clone()))
            .merge(health::router())
            .merge(health::ready_router(self.state.clone()));

        // Audio clips the dashboard plays are served from here.
        if let Some(static_dir) = &self.static_dir {
            router = router.nest_service("/static", ServeDir::new(static_dir));
            tracing::info!(path = %static_dir.display(), "serving static files");
        }

        // CORS layer for cross-origin requests from dashboards
        let cors = CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);

        router.layer(cors).layer(TraceLayer::new_for_http())
    }

    /// Run the API server.
    ///
    /// # Errors
    ///
    /// Returns an error when the server fails to bind or serve.
    pub async fn run(self) -> Result<()> {
        let addr = format!("{}:{}", self.bind, self.port);
        let listener = TcpListener::bind(&addr)
            .await
            .map_err(|e| crate::Error::Config(format!("failed to bind {addr}: {e}")))?;

        tracing::info!(%addr, "relay listening");

        axum::serve(listener, self.router())
            .await
            .map_err(|e| crate::Error::Config(format!("server error: {e}")))?;

        Ok(())
    }

    /// Run the API server in a background task.
    #[must_use]
    pub fn spawn(self) -> tokio::task::JoinHandle<Result<()>> {
        tokio::spawn(async move { self.run().await })
    }
}
