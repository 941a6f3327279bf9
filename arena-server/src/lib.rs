//! Authoritative multiplayer server for a browser-based first-person shooter
//! arena.
//!
//! # Architecture Overview
//!
//! ```text
//! Client -> /ws -> Session (reader) -> Dispatcher -> MatchStore
//!                                                       |
//! Client <- Session (writer) <- Broadcaster <- Tick loop/
//! ```
//!
//! The [`state::MatchStore`] is the single source of truth for player
//! identity, position, health and the kill/death bookkeeping. Sessions feed
//! validated actions into it, the tick loop advances its clock at ~60 Hz and
//! the broadcaster fans a consistent snapshot out to every session at 20 Hz.
//! Everything shares one [`ServerContext`] that `main` constructs and threads
//! through explicitly; there is no ambient global state.

pub mod combat;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod session;
pub mod state;
pub mod tick;

use crate::config::ServerConfig;
use crate::state::{MatchStore, default_spawn_points};
use axum::Json;
use axum::Router;
use axum::extract::State;
use axum::extract::ws::Utf8Bytes;
use axum::routing::get;
use std::sync::Arc;
use tokio::sync::{broadcast, watch};
use tower_http::services::{ServeDir, ServeFile};

/// Capacity of the snapshot fan-out channel. A session that falls further
/// behind than this starts losing the oldest snapshots.
const SNAPSHOT_BUFFER_SIZE: usize = 64;

/// Everything the router and the background tasks share. Constructed once in
/// `main` and threaded through explicitly.
pub struct ServerContext {
    /// Parsed process configuration.
    pub config: ServerConfig,
    /// The authoritative match state.
    pub store: MatchStore,
    /// Fan-out channel for serialized snapshots.
    pub snapshots: broadcast::Sender<Utf8Bytes>,
    /// Flips to true exactly once when the process begins shutting down.
    pub shutdown: watch::Receiver<bool>,
}

impl ServerContext {
    /// Builds the context around a fresh match.
    pub fn new(config: ServerConfig, shutdown: watch::Receiver<bool>) -> ServerContext {
        let (snapshots, _) = broadcast::channel(SNAPSHOT_BUFFER_SIZE);
        ServerContext {
            store: MatchStore::new(default_spawn_points(), config.max_players),
            config,
            snapshots,
            shutdown,
        }
    }
}

/// Builds the complete router: the WebSocket endpoint, the HTTP sideband for
/// monitoring, and the static fallback that serves the bundled web client.
pub fn build_router(ctx: Arc<ServerContext>) -> Router {
    Router::new()
        .route("/ws", get(session::websocket_handler))
        .route("/health", get(health_handler))
        .route("/status", get(status_handler))
        .with_state(ctx)
        .fallback_service(
            ServeDir::new("public").not_found_service(ServeFile::new("public/index.html")),
        )
}

/// Liveness probe for deployment and monitoring.
async fn health_handler() -> &'static str {
    "ok"
}

/// Small JSON summary of the running match.
async fn status_handler(State(ctx): State<Arc<ServerContext>>) -> Json<state::MatchStatus> {
    Json(ctx.store.status().await)
}
