//! Decoding, validation and application of inbound client messages.
//!
//! Every message is decoded in two stages: the outer envelope tag first, then
//! the tag-specific payload. Anything that fails validation is answered with
//! an `error` envelope on the session's control queue and never touches the
//! state. Actions from dead players are dropped silently.

use crate::ServerContext;
use crate::combat::Aim;
use crate::error::StateError;
use crate::tick;
use protocol::{
    ACTION_JUMP, ACTION_MOVE, ACTION_RELOAD, ACTION_SHOOT, ActionBody, ERR_INVALID_ACTION_TYPE,
    ERR_INVALID_PAYLOAD, Envelope, ErrorBody, HealBody, MAX_NAME_LEN, MSG_ERROR, MSG_HEAL,
    MSG_PING, MSG_PLAYER_ACTION, MSG_SET_NAME, MovementData, SetNameBody, ShootData,
};
use std::sync::Arc;
use tokio::sync::mpsc;

/// Applies one raw wire message from the named player.
pub async fn handle_message(
    ctx: &Arc<ServerContext>,
    player_id: &str,
    raw: &str,
    feedback: &mpsc::Sender<Envelope>,
) {
    let envelope: Envelope = match serde_json::from_str(raw) {
        Ok(envelope) => envelope,
        Err(err) => {
            tracing::debug!(player = %player_id, %err, "Unparseable message.");
            send_error(feedback, ERR_INVALID_PAYLOAD, "message is not a valid envelope").await;
            return;
        }
    };

    match envelope.kind.as_str() {
        // Keepalive, only exists to defeat idle timeouts along the way.
        MSG_PING => {}
        MSG_PLAYER_ACTION => handle_action(ctx, player_id, envelope.payload, feedback).await,
        MSG_SET_NAME => handle_set_name(ctx, player_id, envelope.payload, feedback).await,
        MSG_HEAL => handle_heal(ctx, player_id, envelope.payload, feedback).await,
        other => {
            tracing::debug!(player = %player_id, kind = other, "Unknown message type.");
            send_error(
                feedback,
                ERR_INVALID_ACTION_TYPE,
                format!("unknown message type {other:?}"),
            )
            .await;
        }
    }
}

/// Dispatches the inner tag of a `playerAction` payload.
async fn handle_action(
    ctx: &Arc<ServerContext>,
    player_id: &str,
    payload: serde_json::Value,
    feedback: &mpsc::Sender<Envelope>,
) {
    let action: ActionBody = match serde_json::from_value(payload) {
        Ok(action) => action,
        Err(err) => {
            tracing::debug!(player = %player_id, %err, "Malformed playerAction payload.");
            send_error(feedback, ERR_INVALID_PAYLOAD, "playerAction payload is malformed").await;
            return;
        }
    };

    match action.kind.as_str() {
        ACTION_MOVE | ACTION_JUMP => apply_movement(ctx, player_id, action.data, feedback).await,
        ACTION_SHOOT => apply_shot(ctx, player_id, action.data, feedback).await,
        ACTION_RELOAD => {
            // No server-visible effect, but the usual identity checks apply.
            if let Err(err) = ctx.store.ensure_alive(player_id).await {
                report_state_error(err, player_id, feedback).await;
            }
        }
        other => {
            tracing::debug!(player = %player_id, kind = other, "Unknown action type.");
            send_error(
                feedback,
                ERR_INVALID_ACTION_TYPE,
                format!("unknown action type {other:?}"),
            )
            .await;
        }
    }
}

/// Position/rotation overwrite shared by `move` and `jump`.
async fn apply_movement(
    ctx: &Arc<ServerContext>,
    player_id: &str,
    data: serde_json::Value,
    feedback: &mpsc::Sender<Envelope>,
) {
    let movement: MovementData = match serde_json::from_value(data) {
        Ok(movement) => movement,
        Err(err) => {
            tracing::debug!(player = %player_id, %err, "Malformed movement data.");
            send_error(feedback, ERR_INVALID_PAYLOAD, "movement data is malformed").await;
            return;
        }
    };
    let finite = movement.position.map_or(true, |v| v.is_finite())
        && movement.rotation.map_or(true, |v| v.is_finite());
    if !finite {
        send_error(feedback, ERR_INVALID_PAYLOAD, "movement vectors must be finite").await;
        return;
    }

    if let Err(err) = ctx
        .store
        .update_transform(player_id, movement.position, movement.rotation)
        .await
    {
        report_state_error(err, player_id, feedback).await;
    }
}

/// Validates the aim of a `shoot` action and runs the shot resolver.
async fn apply_shot(
    ctx: &Arc<ServerContext>,
    player_id: &str,
    data: serde_json::Value,
    feedback: &mpsc::Sender<Envelope>,
) {
    let shoot: ShootData = match serde_json::from_value(data) {
        Ok(shoot) => shoot,
        Err(err) => {
            tracing::debug!(player = %player_id, %err, "Malformed shoot data.");
            send_error(feedback, ERR_INVALID_PAYLOAD, "shoot data is malformed").await;
            return;
        }
    };
    let aim = match (shoot.target, shoot.direction) {
        (Some(target), None) if target.is_finite() => Aim::Target(target),
        (None, Some(direction)) if direction.is_finite() => Aim::Direction(direction),
        _ => {
            send_error(
                feedback,
                ERR_INVALID_PAYLOAD,
                "shoot needs exactly one finite target or direction",
            )
            .await;
            return;
        }
    };

    match ctx.store.handle_shot(player_id, aim).await {
        Ok(Some(outcome)) if outcome.fatal => {
            tracing::info!(shooter = %player_id, victim = %outcome.victim, "Kill registered.");
            tick::schedule_respawn(ctx.clone(), outcome.victim);
        }
        Ok(Some(outcome)) => {
            tracing::debug!(
                shooter = %player_id,
                victim = %outcome.victim,
                health = outcome.victim_health,
                "Hit registered."
            );
        }
        Ok(None) => {}
        Err(err) => report_state_error(err, player_id, feedback).await,
    }
}

/// Validates and applies a `setName` request.
async fn handle_set_name(
    ctx: &Arc<ServerContext>,
    player_id: &str,
    payload: serde_json::Value,
    feedback: &mpsc::Sender<Envelope>,
) {
    let body: SetNameBody = match serde_json::from_value(payload) {
        Ok(body) => body,
        Err(err) => {
            tracing::debug!(player = %player_id, %err, "Malformed setName payload.");
            send_error(feedback, ERR_INVALID_PAYLOAD, "setName payload is malformed").await;
            return;
        }
    };
    if !is_valid_name(&body.display_name) {
        send_error(
            feedback,
            ERR_INVALID_PAYLOAD,
            "display name must be 1 to 32 printable characters",
        )
        .await;
        return;
    }

    if let Err(err) = ctx
        .store
        .update_player_name(player_id, body.display_name)
        .await
    {
        report_state_error(err, player_id, feedback).await;
    }
}

/// Validates and applies a `heal` request.
async fn handle_heal(
    ctx: &Arc<ServerContext>,
    player_id: &str,
    payload: serde_json::Value,
    feedback: &mpsc::Sender<Envelope>,
) {
    let body: HealBody = match serde_json::from_value(payload) {
        Ok(body) => body,
        Err(err) => {
            tracing::debug!(player = %player_id, %err, "Malformed heal payload.");
            send_error(feedback, ERR_INVALID_PAYLOAD, "heal payload is malformed").await;
            return;
        }
    };
    if body.amount < 0 {
        send_error(feedback, ERR_INVALID_PAYLOAD, "heal amount must not be negative").await;
        return;
    }

    match ctx.store.apply_heal(player_id, body.new_health).await {
        // A heal clamped to zero is a death like any other.
        Ok(true) => tick::schedule_respawn(ctx.clone(), player_id.to_string()),
        Ok(false) => {}
        Err(err) => report_state_error(err, player_id, feedback).await,
    }
}

/// A display name is 1 to 32 codepoints without control characters.
fn is_valid_name(name: &str) -> bool {
    let length = name.chars().count();
    (1..=MAX_NAME_LEN).contains(&length) && !name.chars().any(|c| c.is_control())
}

/// Reports a store rejection to the session. Liveness violations stay silent
/// in regular play, everything else goes out on the error channel.
async fn report_state_error(err: StateError, player_id: &str, feedback: &mpsc::Sender<Envelope>) {
    match err {
        StateError::NotAlive(_) => {
            tracing::trace!(player = %player_id, "Action from a dead player ignored.");
        }
        other => {
            tracing::debug!(player = %player_id, %other, "Action rejected.");
            send_error(feedback, other.wire_code(), other.to_string()).await;
        }
    }
}

/// Pushes one error envelope onto the session's control queue.
async fn send_error(feedback: &mpsc::Sender<Envelope>, code: &str, message: impl Into<String>) {
    let body = ErrorBody::new(code, message);
    match Envelope::wrap(MSG_ERROR, &body) {
        // A failed send only means the session is already tearing down.
        Ok(envelope) => {
            let _ = feedback.send(envelope).await;
        }
        Err(err) => tracing::error!(%err, "Error payload failed to serialize."),
    }
}
