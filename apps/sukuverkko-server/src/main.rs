//! Sukuverkko web backend server.
//!
//! Starts an Axum HTTP server with:
//! - REST API for family lookup, citation, prefetch, and cache admin
//! - Health check at `/healthz`
//! - CORS middleware
//! - Structured tracing
//! - Graceful shutdown on SIGINT/SIGTERM

mod collaborators;
mod config;
mod error;
mod handlers;
mod state;

use std::net::SocketAddr;

use axum::http::{HeaderValue, Method};
use axum::routing::{delete, get, post};
use axum::Router;
use tokio::net::TcpListener;
use tokio::signal;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use crate::config::ServerConfig;
use crate::state::AppState;

#[tokio::main]
async fn main() {
    let cfg = ServerConfig::load().unwrap_or_else(|e| {
        eprintln!("Failed to load configuration: {e}");
        std::process::exit(1);
    });

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cfg.log_level)))
        .init();

    info!(host = %cfg.host, port = %cfg.port, log_level = %cfg.log_level, "Starting Sukuverkko server");

    let collaborators = collaborators::build_collaborators(&cfg).unwrap_or_else(|e| {
        error!(%e, "Failed to bootstrap collaborators");
        std::process::exit(1);
    });

    let state = AppState::new(collaborators);

    let cors = if cfg.cors_origin == "*" {
        CorsLayer::permissive()
    } else {
        CorsLayer::new()
            .allow_origin(cfg.cors_origin.parse::<HeaderValue>().expect("invalid CORS origin"))
            .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
            .allow_headers(tower_http::cors::Any)
    };

    let app = Router::new()
        .route("/healthz", get(healthz))
        .route("/families/{id}", get(handlers::get_family))
        .route("/families/{id}/citation", get(handlers::get_citation))
        .route("/prefetch", post(handlers::post_prefetch))
        .route("/cache/{id}", delete(handlers::delete_cache_entry))
        .route("/cache", delete(handlers::delete_cache))
        .with_state(state)
        .layer(cors)
        .layer(TraceLayer::new_for_http());

    let addr = SocketAddr::new(cfg.host.parse().expect("invalid host address"), cfg.port);
    let listener = TcpListener::bind(addr).await.unwrap_or_else(|e| {
        error!(%e, %addr, "Failed to bind TCP listener");
        std::process::exit(1);
    });

    info!(%addr, "Listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .unwrap_or_else(|e| {
            error!(%e, "Server error");
            std::process::exit(1);
        });

    info!("Server shut down gracefully");
}

async fn healthz() -> axum::Json<serde_json::Value> {
    axum::Json(serde_json::json!({ "status": "ok" }))
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c().await.expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => info!("Received SIGINT, shutting down"),
        () = terminate => info!("Received SIGTERM, shutting down"),
    }
}
