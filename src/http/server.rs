//! HTTP server setup.
//!
//! # Responsibilities
//! - Build the Axum router from the API routes and shared state
//! - Wrap it in the middleware chain
//! - Serve on a listener until the shutdown signal fires

use axum::Router;
use tokio::net::TcpListener;
use tokio::sync::broadcast;

use crate::api::{self, AppState};
use crate::board::ServiceCatalog;
use crate::config::BoardConfig;
use crate::http::middleware::apply_chain;

/// HTTP server for the status board.
pub struct HttpServer {
    router: Router,
}

impl HttpServer {
    pub fn new(config: BoardConfig, catalog: ServiceCatalog) -> Self {
        let state = AppState::new(catalog);
        let router = Self::build_router(&config, state);
        Self { router }
    }

    fn build_router(config: &BoardConfig, state: AppState) -> Router {
        apply_chain(api::router(state), config.limits.max_body_size)
    }

    /// Serve until `shutdown` fires.
    pub async fn run(self, listener: TcpListener, mut shutdown: broadcast::Receiver<()>) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("HTTP server draining connections");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}
