// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Token claims.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Claim names owned by the codec. Extra claims may not override them.
pub const RESERVED_CLAIMS: [&str; 3] = ["sub", "iat", "exp"];

/// Claims carried in a session token payload.
///
/// `extra` is flattened into the payload next to the registered claims and is
/// opaque to the codec.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenClaims {
    /// Subject - identifies the caller. Never interpreted by the codec.
    pub sub: String,

    /// Issued at (seconds since the Unix epoch)
    pub iat: i64,

    /// Expiration (seconds since the Unix epoch)
    pub exp: i64,

    /// Any additional claims supplied at mint time
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl TokenClaims {
    /// Build claims for a token issued at `iat` and valid for `validity_secs`.
    ///
    /// Reserved names in `extra` are discarded.
    pub fn new(
        subject: impl Into<String>,
        mut extra: Map<String, Value>,
        iat: i64,
        validity_secs: i64,
    ) -> Self {
        for reserved in RESERVED_CLAIMS {
            extra.remove(reserved);
        }
        Self {
            sub: subject.into(),
            iat,
            exp: iat.saturating_add(validity_secs),
            extra,
        }
    }

    pub fn subject(&self) -> &str {
        &self.sub
    }

    pub fn issued_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.iat, 0)
    }

    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.exp, 0)
    }

    /// Strict expiry: expired once `now` is past `exp + leeway`.
    pub fn is_expired_at(&self, now: i64, leeway: u64) -> bool {
        let leeway = i64::try_from(leeway).unwrap_or(i64::MAX);
        now > self.exp.saturating_add(leeway)
    }
}
