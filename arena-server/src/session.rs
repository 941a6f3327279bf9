//! One WebSocket session per connected player.
//!
//! The accept path synthesizes a player id, registers it with the store and
//! answers with the id-assignment envelopes. Afterwards two tasks cooperate
//! per session: a reader that feeds the dispatcher and a writer that is the
//! only task ever touching the outgoing half of the socket. Either task
//! finishing tears down the other and triggers the one-shot cleanup.

use crate::{ServerContext, dispatch};
use axum::extract::ws::{Message, Utf8Bytes, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::response::IntoResponse;
use futures_util::sink::SinkExt;
use futures_util::stream::{SplitSink, SplitStream, StreamExt};
use protocol::{Envelope, ErrorBody, IdAssignment, MSG_ERROR, MSG_INIT, MSG_PLAYER_ID, PlayerId};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast::error::RecvError;
use tokio::sync::{broadcast, mpsc, watch};
use uuid::Uuid;

/// Upper bound of queued out-of-band messages (init, error) per session.
/// Senders wait for space, these messages are never dropped.
const CONTROL_QUEUE_SIZE: usize = 16;

/// A session whose peer stays silent this long is considered dead.
const CLIENT_TIMEOUT: Duration = Duration::from_secs(60);

/// Upgrades the HTTP request on `/ws` into a player session.
pub async fn websocket_handler(
    ws: WebSocketUpgrade,
    State(ctx): State<Arc<ServerContext>>,
) -> impl IntoResponse {
    ws.on_upgrade(|socket| websocket(socket, ctx))
}

/// Does the whole handling from join to cleanup for one peer.
async fn websocket(stream: WebSocket, ctx: Arc<ServerContext>) {
    // By splitting, we can send and receive at the same time.
    let (mut sender, receiver) = stream.split();

    let player_id: PlayerId = Uuid::new_v4().to_string();
    let joined = match ctx.store.add_player(&player_id).await {
        Ok(player) => player,
        Err(err) => {
            tracing::warn!(player = %player_id, %err, "Join rejected.");
            let body = ErrorBody::new(err.wire_code(), err.to_string());
            let _ = send_envelope(&mut sender, MSG_ERROR, &body).await;
            let _ = sender.send(Message::Close(None)).await;
            return;
        }
    };
    tracing::info!(player = %player_id, name = %joined.display_name, "Player joined.");

    // The assigned id goes out before anything else. Both historic tags carry
    // it, older clients listen for playerId instead of init.
    let assignment = IdAssignment {
        id: player_id.clone(),
    };
    for tag in [MSG_INIT, MSG_PLAYER_ID] {
        if !send_envelope(&mut sender, tag, &assignment).await {
            cleanup(&ctx, &player_id).await;
            return;
        }
    }

    let (control_tx, control_rx) = mpsc::channel::<Envelope>(CONTROL_QUEUE_SIZE);
    let snapshots = ctx.snapshots.subscribe();
    let shutdown = ctx.shutdown.clone();

    let mut write_task =
        tokio::spawn(async move { write_loop(sender, control_rx, snapshots, shutdown).await });
    let read_ctx = ctx.clone();
    let read_id = player_id.clone();
    let mut read_task =
        tokio::spawn(async move { read_loop(receiver, read_ctx, read_id, control_tx).await });

    // If any one of the tasks runs to completion, we abort the other.
    let end_reason = tokio::select! {
        res = &mut write_task => { read_task.abort(); res }
        res = &mut read_task => { write_task.abort(); res }
    };
    let end_reason = end_reason.unwrap_or_else(|err| {
        tracing::error!(?err, "Session task panicked.");
        "internal session failure"
    });

    tracing::info!(player = %player_id, reason = end_reason, "Session closed.");
    cleanup(&ctx, &player_id).await;
}

/// Consumes inbound frames, splits newline batches and hands every message to
/// the dispatcher. Returns the reason the session ended.
async fn read_loop(
    mut receiver: SplitStream<WebSocket>,
    ctx: Arc<ServerContext>,
    player_id: PlayerId,
    control_tx: mpsc::Sender<Envelope>,
) -> &'static str {
    loop {
        let frame = match tokio::time::timeout(CLIENT_TIMEOUT, receiver.next()).await {
            Err(_) => return "peer silent for too long",
            Ok(None) => return "connection closed",
            Ok(Some(Err(_))) => return "connection lost",
            Ok(Some(Ok(frame))) => frame,
        };
        match frame {
            Message::Text(text) => {
                // One envelope per frame, or a newline separated batch.
                for line in text.lines() {
                    let line = line.trim();
                    if line.is_empty() {
                        continue;
                    }
                    dispatch::handle_message(&ctx, &player_id, line, &control_tx).await;
                }
            }
            Message::Close(_) => return "peer closed the connection",
            // Transport-level ping/pong is answered by axum itself.
            _ => {}
        }
    }
}

/// Drains the outbound queues to the peer. This task is the only writer of
/// the socket: out-of-band messages from the control queue are never dropped,
/// snapshots from the broadcast channel may lag away for slow peers.
async fn write_loop(
    mut sender: SplitSink<WebSocket, Message>,
    mut control_rx: mpsc::Receiver<Envelope>,
    mut snapshots: broadcast::Receiver<Utf8Bytes>,
    mut shutdown: watch::Receiver<bool>,
) -> &'static str {
    loop {
        tokio::select! {
            control = control_rx.recv() => {
                let Some(envelope) = control else {
                    return "control channel closed";
                };
                let text = match serde_json::to_string(&envelope) {
                    Ok(text) => text,
                    Err(err) => {
                        tracing::error!(%err, "Outbound envelope failed to serialize.");
                        continue;
                    }
                };
                if sender.send(Message::Text(text.into())).await.is_err() {
                    return "connection lost";
                }
            }
            snapshot = snapshots.recv() => {
                match snapshot {
                    Ok(text) => {
                        if sender.send(Message::Text(text)).await.is_err() {
                            return "connection lost";
                        }
                    }
                    Err(RecvError::Lagged(skipped)) => {
                        // A slow peer loses snapshots, never the session.
                        tracing::debug!(skipped, "Dropped stale snapshots for lagging peer.");
                    }
                    Err(RecvError::Closed) => {
                        let _ = sender.send(Message::Close(None)).await;
                        return "server shutting down";
                    }
                }
            }
            _ = shutdown.changed() => {
                let _ = sender.send(Message::Close(None)).await;
                return "server shutting down";
            }
        }
    }
}

/// Serializes one envelope and writes it directly to the still-unsplit write
/// half. Only used during the join handshake, before the writer task exists.
async fn send_envelope<T: Serialize>(
    sender: &mut SplitSink<WebSocket, Message>,
    tag: &str,
    payload: &T,
) -> bool {
    let Ok(envelope) = Envelope::wrap(tag, payload) else {
        return false;
    };
    let Ok(text) = serde_json::to_string(&envelope) else {
        return false;
    };
    sender.send(Message::Text(text.into())).await.is_ok()
}

/// Removes the player from the match. Running the cleanup twice is a no-op.
async fn cleanup(ctx: &Arc<ServerContext>, player_id: &str) {
    match ctx.store.remove_player(player_id).await {
        Ok(()) => tracing::info!(player = %player_id, "Player removed."),
        Err(_) => tracing::debug!(player = %player_id, "Player was already gone."),
    }
}
