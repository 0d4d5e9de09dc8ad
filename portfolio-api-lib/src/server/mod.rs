//! HTTP surface of the portfolio API
//!
//! A small axum router over shared [`AppState`]:
//!
//! - `GET /api/github-contributions`: flattened contribution calendar
//! - `GET /api/project-repo/{owner}/{repo}`: repository metadata, README and languages
//! - `POST /api/contact`: validated, CAPTCHA-checked contact form relay
//! - `GET /api/link-metadata?url=`: link preview metadata
//! - `GET /robots.txt`
//!
//! Handlers return [`ApiError`] on failure, which renders as `{"error": "..."}` with a fixed
//! public message. Nothing is cached or retried server-side.

mod contact;
mod error;
mod routes;
mod state;

pub use contact::{ContactRequest, ValidatedContact};
pub use error::ApiError;
pub use state::{AppConfig, AppState};

use crate::Result;
use axum::Router;
use axum::http::Method;
use axum::http::header::CONTENT_TYPE;
use axum::routing::{get, post};
use core::net::SocketAddr;
use core::time::Duration;
use ohno::IntoAppError;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};

const LOG_TARGET: &str = "    server";

/// Build the application router.
pub fn router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE])
        .max_age(Duration::from_secs(60 * 60));

    Router::new()
        .route("/api/github-contributions", get(routes::github_contributions))
        .route("/api/project-repo/{owner}/{repo}", get(routes::project_repo))
        .route("/api/contact", post(routes::contact))
        .route("/api/link-metadata", get(routes::link_metadata))
        .route("/robots.txt", get(routes::robots))
        .fallback(routes::fallback)
        .layer(cors)
        .with_state(state)
}

/// Serve the API on `address` until Ctrl-C or SIGTERM.
pub async fn serve(state: Arc<AppState>, address: SocketAddr) -> Result<()> {
    let listener = TcpListener::bind(address)
        .await
        .into_app_err_with(|| format!("binding to {address}"))?;

    let local = listener.local_addr().into_app_err("reading bound address")?;
    log::info!(target: LOG_TARGET, "Listening on http://{local}");

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .into_app_err("serving HTTP")?;

    log::info!(target: LOG_TARGET, "Server shut down");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            log::error!(target: LOG_TARGET, "Unable to listen for Ctrl-C: {e}");
            core::future::pending::<()>().await;
        }

        log::info!(target: LOG_TARGET, "Received Ctrl-C, shutting down");
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                let _ = sig.recv().await;
                log::info!(target: LOG_TARGET, "Received terminate signal, shutting down");
            }
            Err(e) => {
                log::error!(target: LOG_TARGET, "Unable to listen for SIGTERM: {e}");
                core::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = core::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }
}
