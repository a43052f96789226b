//! HTTP proxy that holds the provider credentials on behalf of browser clients.
//!
//! | Method | Path | Body |
//! |---|---|---|
//! | GET | `/` | service banner |
//! | GET | `/api/health` | `{status:"ok"}` |
//! | POST | `/api/ingredients/analyze` | `{image}` → `{ingredients}` |
//! | POST | `/api/recipes/generate` | `{ingredients, difficulty}` → `{recipes}` |
//! | POST | `/api/recipes/image` | `{recipeName, description}` → `{imageUrl}` |
//!
//! Validation failures answer 400 with a descriptive message. Provider and parse failures
//! answer 500 with a generic per-operation message; the cause is only logged.

use anyhow::{Context, Result};
use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use tokio::{net::TcpListener, signal};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;

pub mod error;
pub mod routes;
pub mod state;

use crate::chef::Chef;
use crate::schema::Operation;
use routes::{
    analyze_image_handler, favicon_handler, generate_image_handler, generate_recipes_handler,
    health_handler, root_handler,
};
use state::State;

pub fn build_router(chef: Chef, max_body_bytes: usize) -> Router {
    let state = State::new(chef);

    let api = Router::new()
        .route("/health", get(health_handler))
        .route(Operation::AnalyzeImage.endpoint(), post(analyze_image_handler))
        .route(Operation::GenerateRecipes.endpoint(), post(generate_recipes_handler))
        .route(Operation::GenerateImage.endpoint(), post(generate_image_handler));

    Router::new()
        .route("/", get(root_handler))
        .route("/favicon.ico", get(favicon_handler))
        .nest("/api", api)
        .layer(DefaultBodyLimit::max(max_body_bytes))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub async fn start_server(chef: Chef, port: u16, max_body_bytes: usize) -> Result<()> {
    let app = build_router(chef, max_body_bytes);

    let address = format!("0.0.0.0:{port}");
    info!("Binding to {address}");

    let listener = TcpListener::bind(&address)
        .await
        .with_context(|| format!("Failed to bind {address}"))?;
    info!("SousChef server running on http://localhost:{port} (API base http://localhost:{port}/api)");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server terminated unexpectedly")?;

    info!("Server shut down");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        match signal::ctrl_c().await {
            Ok(()) => info!("Received Ctrl+C, shutting down"),
            Err(_) => std::future::pending::<()>().await,
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
                info!("Received terminate signal, shutting down");
            }
            Err(_) => std::future::pending::<()>().await,
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
