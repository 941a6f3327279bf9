//! Process configuration, read once from the environment at startup.

use crate::error::ConfigError;
use std::env;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;

/// Listen port when `PORT` is not set.
const DEFAULT_PORT: u16 = 8080;

/// Player capacity when `MAX_PLAYERS` is not set.
const DEFAULT_MAX_PLAYERS: usize = 50;

/// Log verbosity profile, selected by `ENV`. Affects nothing but the default
/// tracing filter; `RUST_LOG` always wins when present.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Environment {
    #[default]
    Development,
    Production,
}

impl Environment {
    /// The tracing filter used when `RUST_LOG` is not set.
    pub fn default_filter(&self) -> &'static str {
        match self {
            Environment::Development => "arena_server=debug,info",
            Environment::Production => "arena_server=info,warn",
        }
    }
}

/// TLS key material locations. Both files have to be configured together.
#[derive(Debug, Clone)]
pub struct TlsConfig {
    pub cert_file: PathBuf,
    pub key_file: PathBuf,
}

/// Everything the process reads from its environment.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Listen port, `PORT`.
    pub port: u16,
    /// Verbosity profile, `ENV`.
    pub environment: Environment,
    /// TLS material, `TLS_CERT_FILE` and `TLS_KEY_FILE`. Plaintext when absent.
    pub tls: Option<TlsConfig>,
    /// Capacity of the single match room, `MAX_PLAYERS`.
    pub max_players: usize,
}

impl ServerConfig {
    /// Reads and validates the configuration from the process environment.
    pub fn from_env() -> Result<ServerConfig, ConfigError> {
        ServerConfig::parse(
            env::var("PORT").ok(),
            env::var("ENV").ok(),
            env::var("TLS_CERT_FILE").ok(),
            env::var("TLS_KEY_FILE").ok(),
            env::var("MAX_PLAYERS").ok(),
        )
    }

    fn parse(
        port: Option<String>,
        environment: Option<String>,
        tls_cert: Option<String>,
        tls_key: Option<String>,
        max_players: Option<String>,
    ) -> Result<ServerConfig, ConfigError> {
        let port = match port {
            None => DEFAULT_PORT,
            Some(raw) => raw.parse().map_err(|_| ConfigError::InvalidPort(raw))?,
        };

        let environment = match environment.as_deref() {
            Some("production") => Environment::Production,
            _ => Environment::Development,
        };

        let tls = match (tls_cert, tls_key) {
            (Some(cert), Some(key)) => Some(TlsConfig {
                cert_file: PathBuf::from(cert),
                key_file: PathBuf::from(key),
            }),
            (None, None) => None,
            _ => return Err(ConfigError::PartialTls),
        };

        let max_players = match max_players {
            None => DEFAULT_MAX_PLAYERS,
            Some(raw) => match raw.parse() {
                Ok(count) if count >= 1 => count,
                _ => return Err(ConfigError::InvalidMaxPlayers(raw)),
            },
        };

        Ok(ServerConfig {
            port,
            environment,
            tls,
            max_players,
        })
    }

    /// The socket address the listener binds to.
    pub fn listen_addr(&self) -> SocketAddr {
        SocketAddr::new(IpAddr::V4(Ipv4Addr::UNSPECIFIED), self.port)
    }
}
