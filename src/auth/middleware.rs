// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Authentication gate for Axum.
//!
//! Runs once per request before any handler. It never rejects: a missing,
//! foreign or broken token leaves the request anonymous and the handlers
//! (or the extractors in `extractor.rs`) decide whether that is acceptable.
//!
//! ## Usage
//!
//! ```rust,ignore
//! let app = Router::new()
//!     .route("/me", get(me))
//!     .layer(axum::middleware::from_fn_with_state(codec.clone(), authenticate));
//! ```

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::{header::AUTHORIZATION, HeaderMap},
    middleware::Next,
    response::Response,
};

use super::{AuthContext, TokenCodec};

/// Literal scheme prefix, case-sensitive, single space.
const BEARER_PREFIX: &str = "Bearer ";

/// Extract the bearer token from the first `Authorization` header.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix(BEARER_PREFIX)
}

/// Resolve the authentication context for a set of request headers.
pub fn resolve_context(headers: &HeaderMap, codec: &TokenCodec) -> AuthContext {
    let Some(token) = bearer_token(headers) else {
        return AuthContext::Anonymous;
    };

    match codec.verify(token) {
        Ok(claims) => AuthContext::authenticated(claims.sub),
        Err(failure) => {
            tracing::debug!(
                target: "auth",
                reason = failure.kind(),
                "bearer token rejected, continuing anonymously"
            );
            AuthContext::Anonymous
        }
    }
}

/// Authentication middleware function.
pub async fn authenticate(
    State(codec): State<Arc<TokenCodec>>,
    mut request: Request,
    next: Next,
) -> Response {
    let context = resolve_context(request.headers(), &codec);

    // Whatever was there before does not survive the gate.
    let extensions = request.extensions_mut();
    extensions.remove::<AuthContext>();
    extensions.insert(context);

    next.run(request).await
}
