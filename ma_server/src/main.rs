//! Auction card game server.
//!
//! One WebSocket endpoint carries the whole protocol: lobby commands and
//! in-game actions. Each room that starts a game gets its own actor task
//! owning the game state, so slow auctions in one room never block another.

mod lobby;
mod room;
mod ws;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Error;
use axum::{Router, routing::get};
use ctrlc::set_handler;
use log::info;
use pico_args::Arguments;
use tokio::sync::Mutex;
use tower_http::cors::CorsLayer;

use lobby::Lobby;

const HELP: &str = "\
Run an auction card game server

USAGE:
  ma_server [OPTIONS]

OPTIONS:
  --bind       IP:PORT     Server socket bind address  [default: env SERVER_BIND or 127.0.0.1:8765]

FLAGS:
  -h, --help               Print help information

ENVIRONMENT:
  SERVER_BIND              Server bind address (e.g., 0.0.0.0:8765)
";

struct Args {
    bind: SocketAddr,
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    let mut pargs = Arguments::from_env();

    // Help has a higher priority and should be handled separately.
    if pargs.contains(["-h", "--help"]) {
        print!("{HELP}");
        std::process::exit(0);
    }

    let args = Args {
        bind: pargs.value_from_str("--bind").unwrap_or_else(|_| {
            std::env::var("SERVER_BIND")
                .unwrap_or_else(|_| "127.0.0.1:8765".to_string())
                .parse()
                .expect("Invalid SERVER_BIND address")
        }),
    };

    // Catching signals for exit.
    set_handler(|| std::process::exit(0))?;

    env_logger::builder().format_target(false).init();
    info!("Starting game server at {}", args.bind);

    let lobby = Arc::new(Mutex::new(Lobby::new()));
    let app = Router::new()
        .route("/ws", get(ws::websocket_handler))
        .layer(CorsLayer::permissive())
        .with_state(lobby);

    let listener = tokio::net::TcpListener::bind(args.bind)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to bind to {}: {e}", args.bind))?;

    info!(
        "Server is running at ws://{}/ws. Press Ctrl+C to stop.",
        args.bind
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| anyhow::anyhow!("Server error: {e}"))?;

    info!("Shutting down server...");
    Ok(())
}

/// Graceful shutdown signal
async fn shutdown_signal() {
    tokio::signal::ctrl_c()
        .await
        .expect("Failed to install CTRL+C signal handler");
}
