//! The message vocabulary that is used consistently between the arena server and its clients.
//! Every message on the wire is one UTF-8 JSON envelope; several envelopes may share a
//! transport frame when separated by a newline.
//! Also contains the authoritative player and match records as they appear in snapshots.

pub mod math;

use crate::math::Vec3;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Opaque player identifier, generated by the server and stable for one session.
pub type PlayerId = String;

/// The upper bound for player health. New and respawned players start here.
pub const MAX_HEALTH: i32 = 100;

/// Longest accepted display name, counted in codepoints.
pub const MAX_NAME_LEN: usize = 32;

// Server -> Client message tags.

/// Sent once per session directly after joining, carries the assigned player id.
pub const MSG_INIT: &str = "init";
/// Second id-assignment message kept for older clients, same payload as [`MSG_INIT`].
pub const MSG_PLAYER_ID: &str = "playerId";
/// Periodic broadcast of the complete match snapshot.
pub const MSG_GAME_STATE: &str = "gameState";
/// Per-session error report with a taxonomy code.
pub const MSG_ERROR: &str = "error";

// Client -> Server message tags.

/// Wraps one gameplay action, the concrete kind sits in the inner payload tag.
pub const MSG_PLAYER_ACTION: &str = "playerAction";
/// Display name change request.
pub const MSG_SET_NAME: &str = "setName";
/// Client-triggered health pickup.
pub const MSG_HEAL: &str = "heal";
/// Keepalive, accepted and ignored.
pub const MSG_PING: &str = "ping";

// Action kinds inside a playerAction payload.

/// Position and/or rotation overwrite.
pub const ACTION_MOVE: &str = "move";
/// Treated like a positional update, no independent effect on the server.
pub const ACTION_JUMP: &str = "jump";
/// Fire one shot, resolved authoritatively on the server.
pub const ACTION_SHOOT: &str = "shoot";
/// Accepted without server-visible effect, ammo lives on the client.
pub const ACTION_RELOAD: &str = "reload";

// Error codes carried in the error payload.

/// The match is at capacity, the joining session gets closed.
pub const ERR_MATCH_FULL: &str = "MATCH_FULL";
/// A player with this id is already registered.
pub const ERR_DUPLICATE_PLAYER: &str = "DUPLICATE_PLAYER";
/// The named player does not exist in the match.
pub const ERR_UNKNOWN_PLAYER: &str = "UNKNOWN_PLAYER";
/// Unparseable JSON or missing/ill-typed required fields.
pub const ERR_INVALID_PAYLOAD: &str = "INVALID_PAYLOAD";
/// Unknown envelope or action tag.
pub const ERR_INVALID_ACTION_TYPE: &str = "INVALID_ACTION_TYPE";
/// Action from a dead player. Ignored silently by default, reported only by debugging deployments.
pub const ERR_PLAYER_NOT_ALIVE: &str = "PLAYER_NOT_ALIVE";
/// Match control that requires more players than are present.
pub const ERR_MATCH_NOT_READY: &str = "MATCH_NOT_READY";

/// The envelope every wire message is wrapped in.
///
/// The payload stays loosely typed here and gets decoded per tag, so unknown
/// tags can be rejected with a taxonomy code before any payload parsing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Envelope {
    /// The message tag, one of the `MSG_*` constants.
    #[serde(rename = "type")]
    pub kind: String,
    /// Tag-specific payload object.
    #[serde(default)]
    pub payload: serde_json::Value,
    /// Optional sender clock in milliseconds since the epoch. Informational only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<f64>,
}

impl Envelope {
    /// Wraps a serializable payload under the given tag.
    pub fn wrap<T: Serialize>(kind: &str, payload: &T) -> Result<Envelope, serde_json::Error> {
        Ok(Envelope {
            kind: kind.to_string(),
            payload: serde_json::to_value(payload)?,
            timestamp: None,
        })
    }
}

/// Payload of [`MSG_INIT`] and [`MSG_PLAYER_ID`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdAssignment {
    /// The id the server assigned to this session.
    pub id: PlayerId,
}

/// Payload of [`MSG_ERROR`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    /// Stable taxonomy code, one of the `ERR_*` constants.
    pub code: String,
    /// Human readable description.
    pub message: String,
    /// Optional free-form context for debugging clients.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ErrorBody {
    /// Builds an error payload without details.
    pub fn new(code: &str, message: impl Into<String>) -> ErrorBody {
        ErrorBody {
            code: code.to_string(),
            message: message.into(),
            details: None,
        }
    }
}

/// Payload of [`MSG_PLAYER_ACTION`]: an inner tag plus loosely typed action data.
#[derive(Debug, Clone, Deserialize)]
pub struct ActionBody {
    /// The action kind, one of the `ACTION_*` constants.
    #[serde(rename = "type")]
    pub kind: String,
    /// Kind-specific data, decoded by the dispatcher.
    #[serde(default)]
    pub data: serde_json::Value,
}

/// Data of a `move` or `jump` action. All fields are optional overwrites.
#[derive(Debug, Clone, Deserialize)]
pub struct MovementData {
    /// New world-space position.
    pub position: Option<Vec3>,
    /// New Euler rotation.
    pub rotation: Option<Vec3>,
    /// Lean amount, accepted and ignored server-side.
    pub lean: Option<f64>,
}

/// Data of a `shoot` action. Exactly one of the two fields must be present.
#[derive(Debug, Clone, Deserialize)]
pub struct ShootData {
    /// Point the shooter aims at, the ray direction is derived from it.
    pub target: Option<Vec3>,
    /// Explicit ray direction, normalized by the server.
    pub direction: Option<Vec3>,
}

/// Payload of [`MSG_SET_NAME`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetNameBody {
    /// Requested display name, validated for length and printability.
    pub display_name: String,
}

/// Payload of [`MSG_HEAL`]. Integer fields, fractional numbers are rejected.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealBody {
    /// Pickup strength as reported by the client, must not be negative.
    pub amount: i64,
    /// Requested resulting health, clamped into `[0, MAX_HEALTH]`.
    pub new_health: i64,
}

/// One authoritative player record as it appears in snapshots.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Player {
    /// Server-assigned id, unique within the process.
    pub id: PlayerId,
    /// Printable name, at most [`MAX_NAME_LEN`] codepoints.
    pub display_name: String,
    /// World-space position.
    pub position: Vec3,
    /// Euler rotation.
    pub rotation: Vec3,
    /// Current health in `[0, MAX_HEALTH]`. Zero exactly when dead.
    pub health: i32,
    /// Liveness flag, coupled to `health` by the store.
    pub is_alive: bool,
    /// Fatal hits scored by this player.
    pub kills: u32,
    /// Times this player died.
    pub deaths: u32,
}

/// A coherent point-in-time view of the match, the payload of [`MSG_GAME_STATE`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchSnapshot {
    /// Every player currently in the match, keyed by id.
    pub players: HashMap<PlayerId, Player>,
    /// Seconds since match creation, monotonically non-decreasing.
    pub game_time: f64,
    /// True once at least two players joined and the match started.
    pub is_active: bool,
    /// Identifier derived at match construction time.
    pub match_id: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn envelope_tolerates_timestamp_and_extra_payload() {
        let raw = r#"{"type":"ping","payload":{"whatever":1},"timestamp":1712345678901.0}"#;
        let envelope: Envelope = serde_json::from_str(raw).unwrap();
        assert_eq!(envelope.kind, MSG_PING);
        assert_eq!(envelope.timestamp, Some(1712345678901.0));
    }

    #[test]
    fn envelope_payload_defaults_to_null() {
        let envelope: Envelope = serde_json::from_str(r#"{"type":"ping"}"#).unwrap();
        assert_eq!(envelope.kind, MSG_PING);
        assert!(envelope.payload.is_null());
    }

    #[test]
    fn heal_body_rejects_fractional_numbers() {
        let result = serde_json::from_str::<HealBody>(r#"{"amount":12.5,"newHealth":80}"#);
        assert!(result.is_err());
    }

    #[test]
    fn player_serializes_with_wire_field_names() {
        let player = Player {
            id: "p1".to_string(),
            display_name: "Alice".to_string(),
            position: Vec3::new(1.0, 2.0, 3.0),
            rotation: Vec3::default(),
            health: MAX_HEALTH,
            is_alive: true,
            kills: 0,
            deaths: 0,
        };
        let value = serde_json::to_value(&player).unwrap();
        assert_eq!(value["displayName"], "Alice");
        assert_eq!(value["isAlive"], true);
        assert_eq!(value["position"]["x"], 1.0);
    }
}
