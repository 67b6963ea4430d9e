// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Login and "who am I" endpoints.

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{Map, Value};

use crate::{
    auth::{AuthContext, CallerId},
    error::ApiError,
    models::{LoginRequest, LoginResponse, UserSummary},
    state::AppState,
};

/// Mock login: resolve or create the user and issue a session token.
///
/// No credential is checked. The token's `sub` is the user id; `name` and
/// `email` ride along as extra claims.
#[utoipa::path(
    post,
    path = "/api/auth/login",
    request_body = LoginRequest,
    tag = "Auth",
    responses(
        (status = 200, description = "Token issued", body = LoginResponse),
        (status = 400, description = "Blank identifier"),
    )
)]
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    let user = {
        let mut users = state.users.write().await;
        users.resolve_or_provision(request.identifier(), request.name.as_deref())?
    };

    let mut extra = Map::new();
    extra.insert("name".to_string(), Value::String(user.name.clone()));
    extra.insert("email".to_string(), Value::String(user.email.clone()));
    let token = state.tokens.mint(&user.subject(), extra)?;

    tracing::info!(user_id = user.id, "issued session token");
    Ok(Json(LoginResponse {
        token,
        user: UserSummary::from(&user),
    }))
}

/// Current caller, or 204 when the request is anonymous.
///
/// A verified token whose subject no longer names a user is also 204.
#[utoipa::path(
    get,
    path = "/api/auth/me",
    tag = "Auth",
    security(("bearer" = [])),
    responses(
        (status = 200, description = "Caller identity", body = UserSummary),
        (status = 204, description = "Anonymous caller"),
    )
)]
pub async fn me(State(state): State<AppState>, context: AuthContext) -> Response {
    let Some(user_id) = context.subject().and_then(CallerId::from_subject) else {
        return StatusCode::NO_CONTENT.into_response();
    };

    let users = state.users.read().await;
    match users.find_by_id(user_id) {
        Some(user) => Json(UserSummary::from(user)).into_response(),
        None => StatusCode::NO_CONTENT.into_response(),
    }
}
