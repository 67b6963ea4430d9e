// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Axum extractors over the per-request [`AuthContext`].
//!
//! ```rust,ignore
//! async fn me(context: AuthContext) -> impl IntoResponse { /* may be anonymous */ }
//! async fn my_lists(CallerId(user_id): CallerId) -> impl IntoResponse { /* 401 if not */ }
//! ```
//!
//! All of them read the context the gate installed. If the gate is not
//! layered in front of a route, every request is anonymous.

use std::convert::Infallible;

use axum::{extract::FromRequestParts, http::request::Parts};

use super::{AuthContext, AuthError};

impl<S> FromRequestParts<S> for AuthContext
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(parts
            .extensions
            .get::<AuthContext>()
            .cloned()
            .unwrap_or_default())
    }
}

/// Requires an authenticated caller; yields the token subject.
pub struct Authenticated(pub String);

impl<S> FromRequestParts<S> for Authenticated
where
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Ok(context) = AuthContext::from_request_parts(parts, state).await;
        match context {
            AuthContext::Authenticated { subject } => Ok(Authenticated(subject)),
            AuthContext::Anonymous => Err(AuthError::Unauthenticated),
        }
    }
}

/// Requires an authenticated caller whose subject is a numeric user id.
///
/// Does not check that the user still exists; that is up to the handler.
pub struct CallerId(pub u64);

impl CallerId {
    /// Map a subject to a user id.
    pub fn from_subject(subject: &str) -> Option<u64> {
        subject.parse().ok()
    }
}

impl<S> FromRequestParts<S> for CallerId
where
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Authenticated(subject) = Authenticated::from_request_parts(parts, state).await?;
        CallerId::from_subject(&subject)
            .map(CallerId)
            .ok_or(AuthError::UnknownSubject)
    }
}
