// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Runtime Configuration
//!
//! Configuration is read from the environment exactly once at startup and
//! handed to constructors as an explicit [`AppConfig`]. Nothing in the crate
//! reads configuration from ambient global state afterwards.
//!
//! ## Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `HOST` | Server bind address | `0.0.0.0` |
//! | `PORT` | Server bind port | `8080` |
//! | `TOKEN_SIGNING_SECRET` | HMAC key for bearer credentials | Required |
//! | `TOKEN_TTL_HOURS` | Credential lifetime in hours, at most 8760 | `24` |
//! | `LOG_FORMAT` | Logging format (`json` or `pretty`) | `pretty` |
//! | `RUST_LOG` | Log level filter | `info,tower_http=debug` |
//! | `CHALLENGE_CATALOG_PATH` | JSON file with the challenge catalog | Optional |
//! | `SEED_ADMIN_NAME` | Bootstrap admin account name | Optional |
//! | `SEED_ADMIN_PASSWORD` | Bootstrap admin account password | Optional |

use std::path::PathBuf;

use chrono::Duration;
use thiserror::Error;
use zeroize::{Zeroize, ZeroizeOnDrop};

pub const HOST_ENV: &str = "HOST";
pub const PORT_ENV: &str = "PORT";

/// Environment variable holding the credential signing secret.
///
/// The process refuses to start without it. The value is never logged.
pub const TOKEN_SECRET_ENV: &str = "TOKEN_SIGNING_SECRET";
pub const TOKEN_TTL_HOURS_ENV: &str = "TOKEN_TTL_HOURS";
pub const LOG_FORMAT_ENV: &str = "LOG_FORMAT";
pub const CATALOG_PATH_ENV: &str = "CHALLENGE_CATALOG_PATH";
pub const SEED_ADMIN_NAME_ENV: &str = "SEED_ADMIN_NAME";
pub const SEED_ADMIN_PASSWORD_ENV: &str = "SEED_ADMIN_PASSWORD";

pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_TOKEN_TTL_HOURS: i64 = 24;
/// One year.
pub const MAX_TOKEN_TTL_HOURS: i64 = 24 * 365;

/// Startup configuration errors. All of them are fatal.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{TOKEN_SECRET_ENV} is not set; refusing to start without a signing secret")]
    MissingSecret,

    #[error("invalid value for {var}: {reason}")]
    Invalid { var: &'static str, reason: String },
}

/// Process-wide credential signing key.
///
/// `Debug` output is redacted and the bytes are wiped on drop.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct SigningSecret(Vec<u8>);

impl SigningSecret {
    /// Wrap raw key material. Blank secrets are rejected.
    pub fn new(bytes: impl Into<Vec<u8>>) -> Result<Self, ConfigError> {
        let bytes = bytes.into();
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Err(ConfigError::MissingSecret);
        }
        Ok(Self(bytes))
    }

    pub(crate) fn expose(&self) -> &[u8] {
        &self.0
    }
}

impl std::fmt::Debug for SigningSecret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("SigningSecret(<redacted>)")
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

impl LogFormat {
    fn parse(value: &str) -> Result<Self, ConfigError> {
        match value.trim().to_lowercase().as_str() {
            "pretty" | "" => Ok(LogFormat::Pretty),
            "json" => Ok(LogFormat::Json),
            other => Err(ConfigError::Invalid {
                var: LOG_FORMAT_ENV,
                reason: format!("expected 'json' or 'pretty', got '{other}'"),
            }),
        }
    }
}

/// Credential issuance settings.
#[derive(Debug, Clone)]
pub struct TokenConfig {
    pub secret: SigningSecret,
    pub ttl: Duration,
}

impl TokenConfig {
    pub fn new(secret: SigningSecret) -> Self {
        Self {
            secret,
            ttl: Duration::hours(DEFAULT_TOKEN_TTL_HOURS),
        }
    }

    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }
}

/// Credentials for the bootstrap admin account.
#[derive(Clone)]
pub struct SeedAdmin {
    pub name: String,
    pub password: String,
}

impl std::fmt::Debug for SeedAdmin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SeedAdmin")
            .field("name", &self.name)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Complete application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub token: TokenConfig,
    pub log_format: LogFormat,
    pub catalog_path: Option<PathBuf>,
    pub seed_admin: Option<SeedAdmin>,
}

impl AppConfig {
    /// Load configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let secret = lookup(TOKEN_SECRET_ENV).ok_or(ConfigError::MissingSecret)?;
        let secret = SigningSecret::new(secret.into_bytes())?;

        let ttl_hours = match lookup(TOKEN_TTL_HOURS_ENV) {
            Some(raw) => {
                let hours: i64 = raw.trim().parse().map_err(|_| ConfigError::Invalid {
                    var: TOKEN_TTL_HOURS_ENV,
                    reason: format!("'{raw}' is not an integer"),
                })?;
                if hours <= 0 {
                    return Err(ConfigError::Invalid {
                        var: TOKEN_TTL_HOURS_ENV,
                        reason: "must be positive".to_string(),
                    });
                }
                if hours > MAX_TOKEN_TTL_HOURS {
                    return Err(ConfigError::Invalid {
                        var: TOKEN_TTL_HOURS_ENV,
                        reason: format!("must be at most {MAX_TOKEN_TTL_HOURS}"),
                    });
                }
                hours
            }
            None => DEFAULT_TOKEN_TTL_HOURS,
        };
        let ttl = Duration::try_hours(ttl_hours).ok_or_else(|| ConfigError::Invalid {
            var: TOKEN_TTL_HOURS_ENV,
            reason: "out of range".to_string(),
        })?;

        let port = match lookup(PORT_ENV) {
            Some(raw) => raw.trim().parse().map_err(|_| ConfigError::Invalid {
                var: PORT_ENV,
                reason: format!("'{raw}' is not a valid port"),
            })?,
            None => DEFAULT_PORT,
        };

        let log_format = match lookup(LOG_FORMAT_ENV) {
            Some(raw) => LogFormat::parse(&raw)?,
            None => LogFormat::default(),
        };

        let seed_admin = match (lookup(SEED_ADMIN_NAME_ENV), lookup(SEED_ADMIN_PASSWORD_ENV)) {
            (Some(name), Some(password)) if !name.trim().is_empty() && !password.is_empty() => {
                Some(SeedAdmin {
                    name: name.trim().to_string(),
                    password,
                })
            }
            _ => None,
        };

        Ok(Self {
            host: lookup(HOST_ENV).unwrap_or_else(|| DEFAULT_HOST.to_string()),
            port,
            token: TokenConfig::new(secret).with_ttl(ttl),
            log_format,
            catalog_path: lookup(CATALOG_PATH_ENV).map(PathBuf::from),
            seed_admin,
        })
    }
}
