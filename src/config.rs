// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Runtime Configuration
//!
//! Configuration is read from the environment once at startup. Any invalid
//! value is fatal; nothing here is re-read per request.
//!
//! ## Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `HOST` | Server bind address | `0.0.0.0` |
//! | `PORT` | Server bind port | `8080` |
//! | `JWT_SECRET` | Token signing secret (base64 or raw text) | insecure development secret |
//! | `JWT_EXPIRATION_SECONDS` | Token lifetime | `86400` |
//! | `JWT_LEEWAY_SECONDS` | Accepted clock skew past `exp` | `0` |
//! | `JWT_KEY_POLICY` | `permissive` (base64 or raw) or `strict` (base64, ≥ 32 bytes) | `permissive` |
//! | `TLS_CERT_PATH` | PEM certificate chain; enables HTTPS together with `TLS_KEY_PATH` | unset |
//! | `TLS_KEY_PATH` | PEM private key | unset |
//! | `LOG_FORMAT` | Logging format (`json` or `pretty`) | `pretty` |
//! | `RUST_LOG` | Log level filter | `info,tower_http=debug` |

use std::net::SocketAddr;
use std::path::PathBuf;

use thiserror::Error;

use crate::auth::codec::DEFAULT_VALIDITY_SECS;
use crate::auth::key::INSECURE_DEFAULT_SECRET;
use crate::auth::{KeyPolicy, TokenSettings};

pub const HOST_ENV: &str = "HOST";
pub const PORT_ENV: &str = "PORT";
pub const JWT_SECRET_ENV: &str = "JWT_SECRET";
pub const JWT_EXPIRATION_ENV: &str = "JWT_EXPIRATION_SECONDS";
pub const JWT_LEEWAY_ENV: &str = "JWT_LEEWAY_SECONDS";
pub const JWT_KEY_POLICY_ENV: &str = "JWT_KEY_POLICY";
pub const TLS_CERT_PATH_ENV: &str = "TLS_CERT_PATH";
pub const TLS_KEY_PATH_ENV: &str = "TLS_KEY_PATH";
pub const LOG_FORMAT_ENV: &str = "LOG_FORMAT";

/// Default log filter when `RUST_LOG` is unset.
pub const DEFAULT_LOG_FILTER: &str = "info,tower_http=debug";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{name} has invalid value {value:?}: {reason}")]
    Invalid {
        name: &'static str,
        value: String,
        reason: &'static str,
    },
    #[error("{TLS_CERT_PATH_ENV} and {TLS_KEY_PATH_ENV} must be set together")]
    PartialTls,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TlsPaths {
    pub cert: PathBuf,
    pub key: PathBuf,
}

/// Everything the service reads from its environment.
#[derive(Clone, PartialEq, Eq)]
pub struct Settings {
    pub addr: SocketAddr,
    pub jwt_secret: String,
    pub key_policy: KeyPolicy,
    pub tokens: TokenSettings,
    pub tls: Option<TlsPaths>,
    pub log_format: LogFormat,
}

impl std::fmt::Debug for Settings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Settings")
            .field("addr", &self.addr)
            .field("jwt_secret", &"<redacted>")
            .field("key_policy", &self.key_policy)
            .field("tokens", &self.tokens)
            .field("tls", &self.tls)
            .field("log_format", &self.log_format)
            .finish()
    }
}

impl Settings {
    /// Load from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load using an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let host = lookup(HOST_ENV).unwrap_or_else(|| "0.0.0.0".to_string());
        let port: u16 = parse_or(&lookup, PORT_ENV, 8080)?;
        let addr: SocketAddr = match format!("{host}:{port}").parse() {
            Ok(addr) => addr,
            Err(_) => {
                return Err(ConfigError::Invalid {
                    name: HOST_ENV,
                    value: host,
                    reason: "not an IP address",
                })
            }
        };

        let validity_secs: u64 = parse_or(&lookup, JWT_EXPIRATION_ENV, DEFAULT_VALIDITY_SECS)?;
        if validity_secs == 0 {
            return Err(ConfigError::Invalid {
                name: JWT_EXPIRATION_ENV,
                value: "0".to_string(),
                reason: "must be at least 1",
            });
        }
        let leeway_secs: u64 = parse_or(&lookup, JWT_LEEWAY_ENV, 0)?;

        let key_policy = match lookup(JWT_KEY_POLICY_ENV) {
            None => KeyPolicy::default(),
            Some(value) => KeyPolicy::parse(&value).ok_or(ConfigError::Invalid {
                name: JWT_KEY_POLICY_ENV,
                value,
                reason: "expected `permissive` or `strict`",
            })?,
        };

        let tls = match (lookup(TLS_CERT_PATH_ENV), lookup(TLS_KEY_PATH_ENV)) {
            (Some(cert), Some(key)) => Some(TlsPaths {
                cert: cert.into(),
                key: key.into(),
            }),
            (None, None) => None,
            _ => return Err(ConfigError::PartialTls),
        };

        let log_format = match lookup(LOG_FORMAT_ENV).as_deref() {
            None | Some("pretty") => LogFormat::Pretty,
            Some("json") => LogFormat::Json,
            Some(other) => {
                return Err(ConfigError::Invalid {
                    name: LOG_FORMAT_ENV,
                    value: other.to_string(),
                    reason: "expected `json` or `pretty`",
                })
            }
        };

        Ok(Self {
            addr,
            jwt_secret: lookup(JWT_SECRET_ENV)
                .unwrap_or_else(|| INSECURE_DEFAULT_SECRET.to_string()),
            key_policy,
            tokens: TokenSettings {
                validity_secs,
                leeway_secs,
            },
            tls,
            log_format,
        })
    }
}

fn parse_or<F, T>(lookup: &F, name: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    match lookup(name) {
        None => Ok(default),
        Some(value) => value.trim().parse().map_err(|_| ConfigError::Invalid {
            name,
            value,
            reason: "not a non-negative integer",
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(vars: &[(&str, &str)]) -> Result<Settings, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Settings::from_lookup(|name| vars.get(name).cloned())
    }

    #[test]
    fn defaults_apply_when_unset() {
        let settings = load(&[]).unwrap();
        assert_eq!(settings.addr, "0.0.0.0:8080".parse().unwrap());
        assert_eq!(settings.jwt_secret, INSECURE_DEFAULT_SECRET);
        assert_eq!(settings.key_policy, KeyPolicy::Permissive);
        assert_eq!(settings.tokens, TokenSettings::default());
        assert_eq!(settings.tokens.validity_secs, 86_400);
        assert_eq!(settings.tls, None);
        assert_eq!(settings.log_format, LogFormat::Pretty);
    }

    #[test]
    fn reads_overrides() {
        let settings = load(&[
            ("HOST", "127.0.0.1"),
            ("PORT", "9000"),
            ("JWT_SECRET", "test-secret-32-bytes-minimum-xx"),
            ("JWT_EXPIRATION_SECONDS", "3600"),
            ("JWT_LEEWAY_SECONDS", "30"),
            ("JWT_KEY_POLICY", "strict"),
            ("TLS_CERT_PATH", "/certs/cert.pem"),
            ("TLS_KEY_PATH", "/certs/key.pem"),
            ("LOG_FORMAT", "json"),
        ])
        .unwrap();
        assert_eq!(settings.addr, "127.0.0.1:9000".parse().unwrap());
        assert_eq!(settings.jwt_secret, "test-secret-32-bytes-minimum-xx");
        assert_eq!(settings.key_policy, KeyPolicy::Strict);
        assert_eq!(settings.tokens.validity_secs, 3600);
        assert_eq!(settings.tokens.leeway_secs, 30);
        assert_eq!(
            settings.tls.map(|tls| tls.cert),
            Some(PathBuf::from("/certs/cert.pem"))
        );
        assert_eq!(settings.log_format, LogFormat::Json);
    }

    #[test]
    fn zero_validity_is_rejected() {
        let err = load(&[("JWT_EXPIRATION_SECONDS", "0")]).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { name: JWT_EXPIRATION_ENV, .. }));
    }

    #[test]
    fn non_numeric_values_are_rejected() {
        assert!(load(&[("PORT", "eighty")]).is_err());
        assert!(load(&[("JWT_EXPIRATION_SECONDS", "-5")]).is_err());
        assert!(load(&[("JWT_LEEWAY_SECONDS", "1.5")]).is_err());
    }

    #[test]
    fn unknown_policy_and_format_are_rejected() {
        assert!(load(&[("JWT_KEY_POLICY", "yolo")]).is_err());
        assert!(load(&[("LOG_FORMAT", "xml")]).is_err());
    }

    #[test]
    fn tls_paths_must_come_in_pairs() {
        let err = load(&[("TLS_CERT_PATH", "/certs/cert.pem")]).unwrap_err();
        assert_eq!(err, ConfigError::PartialTls);
    }

    #[test]
    fn debug_output_redacts_secret() {
        let settings = load(&[("JWT_SECRET", "hunter2-hunter2")]).unwrap();
        assert!(!format!("{settings:?}").contains("hunter2"));
    }
}
