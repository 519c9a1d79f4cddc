//! # SnoRelax Chat API Server
//!
//! File: cli/src/commands/serve/mod.rs
//!
//! ## Overview
//!
//! `snorelax serve` exposes the chatbot over HTTP for the web client:
//! - `POST /api/chat`: reply pipeline, conversation storage, training log
//! - `GET /api/chat/history`: a user's stored exchanges
//! - `POST|GET /api/moods/{userId}`: mood log
//! - `POST /api/ai/guide`: wellness guide
//!
//! ## Architecture
//!
//! - `routes.rs`: shared `AppState`, request/response types and handlers
//! - `server_logic.rs`: port selection, middleware, graceful shutdown
//!
//! Host and port come from `[server]` in the config; `--host` / `--port` override them.
//!
//! ```bash
//! snorelax serve --port 8080
//! ```
//!
use crate::core::config::Config;
use crate::core::error::Result;
use clap::Parser;
use std::net::IpAddr;
use tracing::info;

pub mod routes;
pub mod server_logic;

#[derive(Parser, Debug)]
pub struct ServeArgs {
    /// Interface to bind (default from config, 127.0.0.1).
    #[arg(long)]
    pub host: Option<IpAddr>,
    /// First port to try (default from config, 5000).
    #[arg(long, short)]
    pub port: Option<u16>,
}

pub async fn handle_serve(args: ServeArgs, cfg: &Config) -> Result<()> {
    let host = args.host.unwrap_or(cfg.server.host);
    let port = args.port.unwrap_or(cfg.server.port);
    info!("Handling serve command on {}:{}", host, port);

    let state = routes::AppState::from_config(cfg).await?;
    server_logic::run_server(state, host, port).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parses_overrides() {
        let args = ServeArgs::try_parse_from(["serve", "--host", "0.0.0.0", "-p", "9000"]).unwrap();
        assert_eq!(args.host, Some("0.0.0.0".parse().unwrap()));
        assert_eq!(args.port, Some(9000));
    }

    #[test]
    fn test_rejects_bad_host() {
        assert!(ServeArgs::try_parse_from(["serve", "--host", "localhost:80"]).is_err());
    }
}
