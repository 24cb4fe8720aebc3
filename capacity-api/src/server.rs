//! API Server setup

use axum::Router;
use capacity_db::{seed_if_empty, CapacityDatabase};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::{ServeDir, ServeFile};
use tower_http::trace::TraceLayer;

use crate::config::ServerConfig;
use crate::routes::create_router;
use crate::state::AppState;

/// Boxed error returned by server setup
pub type ServerError = Box<dyn std::error::Error + Send + Sync>;

/// Wrap the API router with middleware and, in production, the front-end fallback
pub fn build_router(state: AppState, config: &ServerConfig) -> Router {
    let mut router = create_router(state);

    if config.serves_static() {
        let index = config.static_dir.join("index.html");
        router = router.fallback_service(
            ServeDir::new(&config.static_dir).not_found_service(ServeFile::new(index)),
        );
    }

    // Add middleware
    router = router.layer(TraceLayer::new_for_http());

    if config.enable_cors {
        router = router.layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        );
    }

    router
}

/// Create the API server
pub async fn create_server(config: &ServerConfig) -> Result<(Router, SocketAddr), ServerError> {
    let database = Arc::new(CapacityDatabase::connect(&config.database_path).await?);
    let state = AppState::new(database.clone()).await?;

    if config.seed && seed_if_empty(&database).await? {
        tracing::info!("Seeded default project into empty database");
    }

    let router = build_router(state, config);

    // Parse address
    let addr: SocketAddr = config.bind_address().parse()?;

    Ok((router, addr))
}

/// Run the API server
pub async fn run_server(config: ServerConfig) -> Result<(), ServerError> {
    let (router, addr) = create_server(&config).await?;

    tracing::info!(
        mode = %config.mode,
        database = %config.database_path.display(),
        "Capacity API server listening on {}",
        addr
    );

    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, router).await?;

    Ok(())
}

/// Start server in background (for testing)
pub async fn start_background_server(config: ServerConfig) -> Result<SocketAddr, ServerError> {
    let (router, addr) = create_server(&config).await?;

    // Bind to get actual address (useful when port is 0)
    let listener = TcpListener::bind(addr).await?;
    let actual_addr = listener.local_addr()?;

    // Spawn server in background
    tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, router).await {
            tracing::error!("Server error: {}", e);
        }
    });

    Ok(actual_addr)
}
