//! The error taxonomy of the server.
//! Per-session failures are always recovered locally by closing the offending
//! session; only configuration and startup failures terminate the process.

use protocol::{
    ERR_DUPLICATE_PLAYER, ERR_MATCH_FULL, ERR_MATCH_NOT_READY, ERR_PLAYER_NOT_ALIVE,
    ERR_UNKNOWN_PLAYER,
};
use thiserror::Error;

/// Rejections raised by the state store operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StateError {
    /// The configured player capacity is reached.
    #[error("the match is full")]
    Full,
    /// A player with this id is already registered.
    #[error("player {0} is already registered")]
    Duplicate(String),
    /// The named player is not part of the match.
    #[error("unknown player {0}")]
    UnknownPlayer(String),
    /// The operation requires a living player.
    #[error("player {0} is not alive")]
    NotAlive(String),
    /// A match needs at least two players to start.
    #[error("not enough players to start the match")]
    TooFewPlayers,
}

impl StateError {
    /// The taxonomy code carried on the per-session error channel.
    pub fn wire_code(&self) -> &'static str {
        match self {
            StateError::Full => ERR_MATCH_FULL,
            StateError::Duplicate(_) => ERR_DUPLICATE_PLAYER,
            StateError::UnknownPlayer(_) => ERR_UNKNOWN_PLAYER,
            StateError::NotAlive(_) => ERR_PLAYER_NOT_ALIVE,
            StateError::TooFewPlayers => ERR_MATCH_NOT_READY,
        }
    }
}

/// Configuration mistakes that stop the process before it binds a socket.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// `PORT` did not parse as a port number.
    #[error("PORT is not a valid port number: {0:?}")]
    InvalidPort(String),
    /// `MAX_PLAYERS` did not parse as a positive integer.
    #[error("MAX_PLAYERS is not a positive integer: {0:?}")]
    InvalidMaxPlayers(String),
    /// Only one of the two TLS file variables was set.
    #[error("TLS_CERT_FILE and TLS_KEY_FILE must be set together")]
    PartialTls,
}
