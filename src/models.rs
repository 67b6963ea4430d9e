// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # API Data Models
//!
//! Request and response types for the auth endpoints, plus the stored user
//! record. Wire types derive `ToSchema` for the OpenAPI document.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

// =============================================================================
// Users
// =============================================================================

/// A user known to the service.
///
/// Tokens reference users by `id` (decimal string in `sub`). The auth core
/// never checks that a token's user still exists.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallerIdentity {
    pub id: u64,
    pub name: String,
    /// Canonical (normalised) contact address; unique per user.
    pub email: String,
    pub created_at: DateTime<Utc>,
}

impl CallerIdentity {
    /// The value placed in a token's `sub` claim.
    pub fn subject(&self) -> String {
        self.id.to_string()
    }
}

/// Public view of a user.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct UserSummary {
    /// Numeric user id.
    pub id: u64,
    /// Display name.
    pub name: String,
    /// Contact address.
    pub email: String,
}

impl From<&CallerIdentity> for UserSummary {
    fn from(user: &CallerIdentity) -> Self {
        Self {
            id: user.id,
            name: user.name.clone(),
            email: user.email.clone(),
        }
    }
}

// =============================================================================
// Login
// =============================================================================

/// Request body for `POST /api/auth/login`.
///
/// This is a mock login: the password is accepted but never checked.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct LoginRequest {
    /// Identifier, usually an email address.
    pub username: String,
    /// Ignored.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    /// Takes precedence over `username` when present.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// Display name used when the user is created.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl LoginRequest {
    /// The identifier to resolve: `email` if given, else `username`.
    pub fn identifier(&self) -> &str {
        self.email
            .as_deref()
            .filter(|email| !email.trim().is_empty())
            .unwrap_or(&self.username)
    }
}

/// Response body for `POST /api/auth/login`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct LoginResponse {
    /// Bearer token for the `Authorization` header.
    pub token: String,
    pub user: UserSummary,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn email_takes_precedence_over_username() {
        let request: LoginRequest = serde_json::from_str(
            r#"{"username":"bob","password":"x","email":"bob@example.com"}"#,
        )
        .unwrap();
        assert_eq!(request.identifier(), "bob@example.com");
    }

    #[test]
    fn blank_email_falls_back_to_username() {
        let request: LoginRequest =
            serde_json::from_str(r#"{"username":"bob@example.com","email":"  "}"#).unwrap();
        assert_eq!(request.identifier(), "bob@example.com");
    }

    #[test]
    fn password_is_optional() {
        let request: LoginRequest = serde_json::from_str(r#"{"username":"bob"}"#).unwrap();
        assert!(request.password.is_none());
    }

    #[test]
    fn summary_copies_public_fields() {
        let user = CallerIdentity {
            id: 3,
            name: "carol".to_string(),
            email: "carol@example.com".to_string(),
            created_at: Utc::now(),
        };
        let summary = UserSummary::from(&user);
        assert_eq!(summary.id, 3);
        assert_eq!(summary.name, "carol");
        assert_eq!(summary.email, "carol@example.com");
        assert_eq!(user.subject(), "3");
    }
}
