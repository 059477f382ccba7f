//! # portal-server
//!
//! HTTP front end for the activity report compiler.
//!
//! Routes:
//!
//! - `POST /reports/generate-slides` with `{"startDate", "endDate"}`
//!   returns the PPTX deck with summary and upload headers
//! - `GET /health` for liveness checks

pub mod auth;
pub mod config;
pub mod error;
pub mod routes;
pub mod state;

use axum::routing::{get, post};
use axum::Router;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

pub use auth::{Session, SessionVerifier, TokenSessionVerifier};
pub use config::ServerConfig;
pub use error::{ApiError, Result, ServerError};
pub use routes::GenerateRequest;
pub use state::AppState;

/// Build the router over shared state
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(routes::health))
        .route("/reports/generate-slides", post(routes::generate_slides))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Run the service until Ctrl+C or SIGTERM
pub async fn serve(config: ServerConfig) -> Result<()> {
    let addr = config.listen_addr()?;
    let state = AppState::from_config(&config).await?;

    let listener = TcpListener::bind(addr).await?;
    info!(%addr, "Report service listening");

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Report service stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            warn!(error = %err, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
        info!("Received Ctrl+C, shutting down");
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
                info!("Received terminate signal, shutting down");
            }
            Err(err) => {
                warn!(error = %err, "Failed to install signal handler");
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
}
