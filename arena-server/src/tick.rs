//! The fixed-rate drivers of the match: the tick loop that advances the
//! authoritative clock, the broadcaster that fans snapshots out to every
//! session, and the scheduler for delayed respawns.
//!
//! All three run outside the state lock and only enter it through the narrow
//! store operations. The tick loop logs its observations after the lock has
//! been released.

use crate::ServerContext;
use crate::state::TickEvent;
use axum::extract::ws::Utf8Bytes;
use protocol::{Envelope, MSG_GAME_STATE, PlayerId};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{MissedTickBehavior, interval};

/// Nominal tick interval, ~60 Hz.
pub const TICK_INTERVAL: Duration = Duration::from_millis(16);

/// Cadence of the snapshot fan-out, 20 Hz.
pub const BROADCAST_INTERVAL: Duration = Duration::from_millis(50);

/// Delay between a death and the reinsertion at a spawn point.
pub const RESPAWN_DELAY: Duration = Duration::from_secs(3);

/// Advances the match clock at the tick rate until shutdown.
///
/// A tick that overruns its interval delays the next one instead of bursting
/// to catch up, so the clock never stacks frames.
pub async fn run_tick_loop(ctx: Arc<ServerContext>) {
    let mut shutdown = ctx.shutdown.clone();
    let mut ticker = interval(TICK_INTERVAL);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    loop {
        tokio::select! {
            _ = ticker.tick() => {
                for event in ctx.store.tick().await {
                    log_tick_event(&event);
                }
            }
            _ = shutdown.changed() => {
                tracing::debug!("Tick loop stopped.");
                return;
            }
        }
    }
}

/// Serializes one snapshot per broadcast interval and fans it out.
///
/// The snapshot is taken under a single read-lock acquisition and serialized
/// once, so every session receives the identical buffer.
pub async fn run_broadcaster(ctx: Arc<ServerContext>) {
    let mut shutdown = ctx.shutdown.clone();
    let mut cadence = interval(BROADCAST_INTERVAL);
    cadence.set_missed_tick_behavior(MissedTickBehavior::Delay);
    loop {
        tokio::select! {
            _ = cadence.tick() => {
                let snapshot = ctx.store.snapshot().await;
                let envelope = match Envelope::wrap(MSG_GAME_STATE, &snapshot) {
                    Ok(envelope) => envelope,
                    Err(err) => {
                        tracing::error!(%err, "Snapshot failed to serialize.");
                        continue;
                    }
                };
                let text = match serde_json::to_string(&envelope) {
                    Ok(text) => text,
                    Err(err) => {
                        tracing::error!(%err, "Snapshot envelope failed to serialize.");
                        continue;
                    }
                };
                // An error only means that no session is listening right now.
                let _ = ctx.snapshots.send(Utf8Bytes::from(text));
            }
            _ = shutdown.changed() => {
                tracing::debug!("Broadcaster stopped.");
                return;
            }
        }
    }
}

/// Schedules the delayed reinsertion of a dead player.
///
/// The task captures only the player id, sleeps outside any lock and re-enters
/// the store when the delay is over. A player who disconnected in the meantime
/// is simply not reinserted.
pub fn schedule_respawn(ctx: Arc<ServerContext>, victim: PlayerId) {
    tokio::spawn(async move {
        tokio::time::sleep(RESPAWN_DELAY).await;
        if ctx.store.respawn(&victim).await {
            tracing::info!(player = %victim, "Player respawned.");
        } else {
            tracing::debug!(player = %victim, "Respawn skipped, player left during the delay.");
        }
    });
}

fn log_tick_event(event: &TickEvent) {
    match event {
        TickEvent::Status {
            game_time,
            player_count,
            alive_count,
            leader,
        } => match leader {
            Some((name, kills)) => tracing::info!(
                game_time,
                player_count,
                alive_count,
                leader = %name,
                leader_kills = kills,
                "Match status."
            ),
            None => tracing::info!(game_time, player_count, alive_count, "Match status."),
        },
        TickEvent::KillMilestone { name, kills } => {
            tracing::info!(player = %name, kills, "Kill streak milestone.");
        }
        TickEvent::CloseMatch {
            leader,
            leader_kills,
            runner_up,
            runner_up_kills,
        } => {
            tracing::info!(
                leader = %leader,
                leader_kills,
                runner_up = %runner_up,
                runner_up_kills,
                "Close match between the leaders."
            );
        }
    }
}
