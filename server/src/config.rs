//! Server configuration read from the environment.
//!
//! - `TASKDECK_HOST`: bind address (default `127.0.0.1`)
//! - `TASKDECK_PORT`: bind port (default `3000`)
//! - `TASKDECK_TOKENS`: comma-separated `token:external_id:username` entries
//! - `RUST_LOG`: log filter, read by `env_logger`

use taskdeck_shared::ExternalProfile;
use thiserror::Error;

const DEFAULT_HOST: &str = "127.0.0.1";
const DEFAULT_PORT: u16 = 3000;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("TASKDECK_PORT must be a port number, got {0:?}")]
    InvalidPort(String),

    #[error("TASKDECK_TOKENS entry {0:?} is not of the form token:external_id:username")]
    InvalidToken(String),
}

/// A bearer token bound to the identity it logs in as.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenGrant {
    pub token: String,
    pub profile: ExternalProfile,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub tokens: Vec<TokenGrant>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            tokens: Vec::new(),
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let host = lookup("TASKDECK_HOST")
            .filter(|host| !host.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_HOST.to_string());

        let port = match lookup("TASKDECK_PORT") {
            Some(raw) => raw
                .trim()
                .parse::<u16>()
                .map_err(|_| ConfigError::InvalidPort(raw))?,
            None => DEFAULT_PORT,
        };

        let tokens = match lookup("TASKDECK_TOKENS") {
            Some(raw) => parse_tokens(&raw)?,
            None => Vec::new(),
        };

        Ok(Self { host, port, tokens })
    }

    pub fn bind_address(&self) -> (String, u16) {
        (self.host.clone(), self.port)
    }
}

fn parse_tokens(raw: &str) -> Result<Vec<TokenGrant>, ConfigError> {
    raw.split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(|entry| {
            let mut parts = entry.splitn(3, ':').map(str::trim);
            match (parts.next(), parts.next(), parts.next()) {
                (Some(token), Some(external_id), Some(username))
                    if !token.is_empty() && !external_id.is_empty() && !username.is_empty() =>
                {
                    Ok(TokenGrant {
                        token: token.to_string(),
                        profile: ExternalProfile {
                            external_id: external_id.to_string(),
                            username: username.to_string(),
                            avatar: None,
                            email: None,
                        },
                    })
                }
                _ => Err(ConfigError::InvalidToken(entry.to_string())),
            }
        })
        .collect()
}
