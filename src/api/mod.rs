// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{
    middleware::from_fn_with_state,
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::CorsLayer,
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};
use utoipa::{
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    Modify, OpenApi,
};
use utoipa_swagger_ui::SwaggerUi;

use crate::{
    auth::authenticate,
    models::{LoginRequest, LoginResponse, UserSummary},
    state::AppState,
};

pub mod auth;
pub mod health;

/// Build the application router.
///
/// Every route sits behind the authentication gate; the gate never rejects,
/// so public routes are unaffected.
pub fn router(state: AppState) -> Router {
    let auth_routes = Router::new()
        .route("/login", post(auth::login))
        .route("/me", get(auth::me));

    Router::new()
        .nest("/api/auth", auth_routes)
        .route("/health/live", get(health::liveness))
        .with_state(state.clone())
        .merge(SwaggerUi::new("/docs").url("/api-doc/openapi.json", ApiDoc::openapi()))
        .layer(from_fn_with_state(state.tokens.clone(), authenticate))
        .layer(TraceLayer::new_for_http())
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
        .layer(CorsLayer::permissive())
}

struct BearerSecurity;

impl Modify for BearerSecurity {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(auth::login, auth::me, health::liveness),
    components(schemas(LoginRequest, LoginResponse, UserSummary, health::HealthResponse)),
    modifiers(&BearerSecurity),
    tags(
        (name = "Auth", description = "Session tokens and caller identity"),
        (name = "Health", description = "Probes")
    )
)]
struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{KeyPolicy, SigningKey, TokenCodec, TokenSettings};
    use crate::store::UserStore;
    use axum::{
        body::{to_bytes, Body},
        http::{header::AUTHORIZATION, Request, StatusCode},
        response::Response,
    };
    use serde_json::{json, Map, Value};
    use tower::ServiceExt;

    const SECRET: &str = "test-secret-32-bytes-minimum-xx";

    fn state_with(secret: &str) -> AppState {
        let key = SigningKey::derive(secret, KeyPolicy::Permissive).unwrap();
        AppState::new(TokenCodec::new(&key, TokenSettings::default()), UserStore::new())
    }

    async fn json_body(response: Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn login_request(body: Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/api/auth/login")
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn me_request(authorization: Option<&str>) -> Request<Body> {
        let mut builder = Request::builder().uri("/api/auth/me");
        if let Some(value) = authorization {
            builder = builder.header(AUTHORIZATION, value);
        }
        builder.body(Body::empty()).unwrap()
    }

    #[tokio::test]
    async fn router_builds_with_all_routes() {
        let app = router(state_with(SECRET));
        let _ = app.into_make_service();
    }

    #[tokio::test]
    async fn login_then_me_round_trip() {
        let app = router(state_with(SECRET));

        let response = app
            .clone()
            .oneshot(login_request(json!({"username": "alice@example.com", "password": "x"})))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["user"], json!({"id": 1, "name": "alice", "email": "alice@example.com"}));
        let token = body["token"].as_str().unwrap().to_string();

        let response = app
            .oneshot(me_request(Some(&format!("Bearer {token}"))))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json_body(response).await["id"], 1);
    }

    #[tokio::test]
    async fn repeated_login_resolves_same_user() {
        let app = router(state_with(SECRET));
        let first = json_body(
            app.clone()
                .oneshot(login_request(json!({"username": "bob@example.com"})))
                .await
                .unwrap(),
        )
        .await;
        let second = json_body(
            app.oneshot(login_request(json!({"username": "BOB@example.com"})))
                .await
                .unwrap(),
        )
        .await;
        assert_eq!(first["user"]["id"], second["user"]["id"]);
    }

    #[tokio::test]
    async fn blank_login_is_bad_request() {
        let app = router(state_with(SECRET));
        let response = app
            .oneshot(login_request(json!({"username": "   "})))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn me_without_header_is_no_content() {
        let app = router(state_with(SECRET));
        let response = app.oneshot(me_request(None)).await.unwrap();
        assert_eq!(response.status(), StatusCode::NO_CONTENT);
    }

    #[tokio::test]
    async fn me_with_foreign_token_proceeds_anonymously() {
        let foreign = state_with("a-completely-different-secret-value")
            .tokens
            .mint("1", Map::new())
            .unwrap();

        let state = state_with(SECRET);
        state
            .users
            .write()
            .await
            .resolve_or_provision("alice@example.com", None)
            .unwrap();
        let app = router(state);

        let response = app
            .oneshot(me_request(Some(&format!("Bearer {foreign}"))))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NO_CONTENT);
    }

    #[tokio::test]
    async fn me_with_non_bearer_scheme_is_no_content() {
        let state = state_with(SECRET);
        let token = state.tokens.mint("1", Map::new()).unwrap();
        let app = router(state);
        let response = app
            .oneshot(me_request(Some(&format!("bearer {token}"))))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NO_CONTENT);
    }

    #[tokio::test]
    async fn public_routes_ignore_broken_tokens() {
        let app = router(state_with(SECRET));
        let request = Request::builder()
            .uri("/health/live")
            .header(AUTHORIZATION, "Bearer garbage")
            .body(Body::empty())
            .unwrap();
        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn responses_carry_request_id() {
        let app = router(state_with(SECRET));
        let response = app.oneshot(me_request(None)).await.unwrap();
        assert!(response.headers().contains_key("x-request-id"));
    }

    #[tokio::test]
    async fn openapi_declares_bearer_scheme() {
        let app = router(state_with(SECRET));
        let request = Request::builder()
            .uri("/api-doc/openapi.json")
            .body(Body::empty())
            .unwrap();
        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let doc = json_body(response).await;
        assert_eq!(doc["components"]["securitySchemes"]["bearer"]["scheme"], "bearer");
        assert!(doc["paths"]["/api/auth/login"].is_object());
    }
}
