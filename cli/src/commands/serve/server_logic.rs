//! # SnoRelax HTTP Server Implementation
//!
//! File: cli/src/commands/serve/server_logic.rs
//!
//! ## Overview
//!
//! Runs the chat API router built in `routes.rs`:
//! - Port availability checking with automatic fallback
//! - Permissive CORS for the browser client
//! - Request/response tracing
//! - Graceful shutdown on Ctrl+C or SIGTERM
//!
//! ## Examples
//!
//! ```rust
//! let state = routes::AppState::from_config(&cfg).await?;
//! server_logic::run_server(state, cfg.server.host, cfg.server.port).await?;
//! ```
//!
use super::routes::{self, AppState};
use crate::core::error::Result;
use anyhow::Context;
use axum::Router;
use std::net::{IpAddr, SocketAddr};
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::{error, info, warn, Level};

const MAX_PORT_ATTEMPTS: u8 = 10;

/// # Run HTTP Server (`run_server`)
///
/// Binds the first free port at or after `port`, prints where the API is reachable
/// and serves until a shutdown signal arrives.
///
/// ## Errors
///
/// - No free port within `MAX_PORT_ATTEMPTS` consecutive ports.
/// - Binding the listener fails.
/// - The server itself fails while running.
pub async fn run_server(state: AppState, host: IpAddr, port: u16) -> Result<()> {
    let addr = find_available_port(host, port, MAX_PORT_ATTEMPTS).await?;
    let app = create_app(state);

    println!("\n=================================================================");
    println!("SnoRelax API listening on http://{}", addr);
    println!("  POST /api/chat            GET /api/chat/history?userId=");
    println!("  POST /api/moods/{{userId}}  GET /api/moods/{{userId}}");
    println!("  POST /api/ai/guide");
    println!("=================================================================\n");
    println!("Server starting! Press Ctrl+C to stop.");
    info!("Starting API server on {}", addr);

    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind TCP listener to address {}", addr))?;

    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server failed")?;

    println!("\nServer shutdown complete.");
    Ok(())
}

/// Resolves on Ctrl+C, or SIGTERM on Unix.
async fn shutdown_signal() {
    let ctrl_c = async {
        match tokio::signal::ctrl_c().await {
            Ok(()) => info!("Received Ctrl+C, initiating graceful shutdown..."),
            Err(e) => {
                error!("Failed to install Ctrl+C handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut term) => {
                term.recv().await;
                info!("Received SIGTERM, initiating graceful shutdown...");
            }
            Err(e) => {
                error!(
                    "Failed to install SIGTERM handler: {}. Shutdown on SIGTERM might not work.",
                    e
                );
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

/// # Find Available Port (`find_available_port`)
///
/// Tries `start_port`, then each following port, up to `max_attempts` ports in total.
/// The trial listener is dropped before returning, so the caller binds again.
async fn find_available_port(
    req_host: IpAddr,
    start_port: u16,
    max_attempts: u8,
) -> Result<SocketAddr> {
    let mut current_port = start_port;

    for attempt in 0..max_attempts {
        let addr = SocketAddr::new(req_host, current_port);
        match TcpListener::bind(addr).await {
            Ok(listener) => {
                drop(listener);
                if attempt > 0 {
                    info!(
                        "Port {} was unavailable, successfully bound to available port {}.",
                        start_port, current_port
                    );
                }
                return Ok(addr);
            }
            Err(e) => {
                warn!(
                    "Attempt {}: Port {} on host {} is unavailable (Error: {}). Trying next port...",
                    attempt + 1,
                    current_port,
                    req_host,
                    e
                );
                current_port = match current_port.checked_add(1) {
                    Some(next) => next,
                    None => break,
                };
            }
        }
    }

    anyhow::bail!(
        "Could not find an available port on host {} starting from port {} after trying {} ports.",
        req_host,
        start_port,
        max_attempts
    )
}

/// # Create Axum Application (`create_app`)
///
/// The API router wrapped in tracing and permissive CORS.
pub fn create_app(state: AppState) -> Router {
    let trace_layer = TraceLayer::new_for_http()
        .make_span_with(DefaultMakeSpan::default().include_headers(true))
        .on_request(DefaultOnRequest::new().level(Level::INFO))
        .on_response(DefaultOnResponse::new().level(Level::INFO));

    routes::router(state).layer(
        ServiceBuilder::new()
            .layer(trace_layer)
            .layer(CorsLayer::permissive()),
    )
}
