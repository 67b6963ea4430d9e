// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Per-request authentication context.

/// Who is calling, as resolved by the authentication gate.
///
/// One value is created per request and travels in that request's
/// extensions. It is never shared across requests or persisted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum AuthContext {
    /// No token, or a token that failed verification.
    #[default]
    Anonymous,
    /// A verified token's subject.
    Authenticated { subject: String },
}

impl AuthContext {
    pub fn authenticated(subject: impl Into<String>) -> Self {
        AuthContext::Authenticated {
            subject: subject.into(),
        }
    }

    /// The caller's subject, if authenticated.
    pub fn subject(&self) -> Option<&str> {
        match self {
            AuthContext::Anonymous => None,
            AuthContext::Authenticated { subject } => Some(subject),
        }
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(self, AuthContext::Authenticated { .. })
    }
}
