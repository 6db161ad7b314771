// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{
    http::{header, HeaderName, HeaderValue, Method, Request},
    middleware::from_fn_with_state,
    routing::{get, post},
    Json, Router,
};
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};
use utoipa::{
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    Modify, OpenApi,
};

use crate::{
    auth::{require_bearer, Audience, VerifiedClaims, HEALTH_PATH},
    models::{
        CreateEntryRequest, Employee, EntryInput, EntryType, LoginRequest, LoginResponse,
        LoginStatus, TimesheetEntry,
    },
    rate_limit::enforce_rate_limit,
    state::AppState,
};

pub mod health;
pub mod timesheet;
pub mod users;

pub const OPENAPI_PATH: &str = "/api-doc/openapi.json";

const REQUEST_ID_HEADER: &str = "x-request-id";

/// Build the application router.
///
/// Layers, outermost first: request id, tracing, CORS, rate limit, bearer
/// authentication. CORS sits outside authentication so preflight requests
/// are answered without a token.
pub fn router(state: AppState) -> Router {
    let trace_layer = TraceLayer::new_for_http().make_span_with(|request: &Request<_>| {
        let request_id = request
            .headers()
            .get(REQUEST_ID_HEADER)
            .and_then(|value| value.to_str().ok())
            .unwrap_or("-");
        tracing::info_span!(
            "http.request",
            method = %request.method(),
            uri = %request.uri(),
            request_id = %request_id,
        )
    });

    Router::new()
        .route(HEALTH_PATH, get(health::health))
        .route("/login", post(users::login))
        .route("/api/me", get(users::current_employee))
        .route("/api/timesheet", get(timesheet::list_entries))
        .route("/api/timesheet/demo", post(timesheet::create_entry))
        .route(OPENAPI_PATH, get(openapi_json))
        .layer(from_fn_with_state(state.verifier.clone(), require_bearer))
        .layer(from_fn_with_state(
            state.rate_limiter.clone(),
            enforce_rate_limit,
        ))
        .layer(cors_layer(state.cors_origin.clone()))
        .layer(PropagateRequestIdLayer::new(HeaderName::from_static(
            REQUEST_ID_HEADER,
        )))
        .layer(trace_layer)
        .layer(SetRequestIdLayer::new(
            HeaderName::from_static(REQUEST_ID_HEADER),
            MakeRequestUuid,
        ))
        .with_state(state)
}

/// CORS for the single browser origin of the frontend.
fn cors_layer(origin: HeaderValue) -> CorsLayer {
    CorsLayer::new()
        .allow_origin(AllowOrigin::exact(origin))
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
        .allow_credentials(true)
}

async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health,
        users::login,
        users::current_employee,
        timesheet::create_entry,
        timesheet::list_entries
    ),
    components(
        schemas(
            health::HealthResponse,
            health::SigningKeysStatus,
            Employee,
            LoginRequest,
            LoginResponse,
            LoginStatus,
            EntryType,
            EntryInput,
            CreateEntryRequest,
            TimesheetEntry,
            VerifiedClaims,
            Audience
        )
    ),
    modifiers(&BearerAuth),
    tags(
        (name = "Health", description = "Liveness"),
        (name = "Employees", description = "Employee login and profile"),
        (name = "Timesheet", description = "Timesheet entries")
    )
)]
pub struct ApiDoc;

struct BearerAuth;

impl Modify for BearerAuth {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
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
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::test_support::state;
    use axum::{body::Body, http::StatusCode};
    use tower::ServiceExt;

    #[test]
    fn openapi_lists_routes_and_bearer_scheme() {
        let doc = ApiDoc::openapi();
        for path in [
            "/_health",
            "/login",
            "/api/me",
            "/api/timesheet",
            "/api/timesheet/demo",
        ] {
            assert!(doc.paths.paths.contains_key(path), "missing {path}");
        }
        let components = doc.components.expect("components");
        assert!(components.security_schemes.contains_key("bearer"));
    }

    #[tokio::test]
    async fn health_is_public_and_tagged_with_request_id() {
        let response = router(state())
            .oneshot(Request::get("/_health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().contains_key(REQUEST_ID_HEADER));
    }

    #[tokio::test]
    async fn unknown_paths_require_a_token() {
        let response = router(state())
            .oneshot(Request::get("/nope").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn preflight_is_answered_without_a_token() {
        let response = router(state())
            .oneshot(
                Request::builder()
                    .method(Method::OPTIONS)
                    .uri("/api/timesheet")
                    .header(header::ORIGIN, "http://localhost:5173")
                    .header(header::ACCESS_CONTROL_REQUEST_METHOD, "GET")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers().get(header::ACCESS_CONTROL_ALLOW_ORIGIN).unwrap(),
            "http://localhost:5173"
        );
    }
}
