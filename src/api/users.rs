// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Employee endpoints.

use axum::{extract::rejection::JsonRejection, extract::State, Json};

use crate::{
    auth::{Auth, VerifiedClaims},
    error::ApiError,
    models::{DataResponse, Employee, LoginRequest, LoginResponse, LoginStatus, NewEmployee},
    state::AppState,
};

/// Record the signed-in employee.
///
/// The `object_id` in the body must match the token's `oid` claim. An
/// employee that already exists is left unchanged.
#[utoipa::path(
    post,
    path = "/login",
    tag = "Employees",
    request_body = LoginRequest,
    security(("bearer" = [])),
    responses(
        (status = 200, description = "Employee recorded", body = LoginResponse),
        (status = 400, description = "Missing required fields"),
        (status = 401, description = "Invalid token or object id mismatch"),
    )
)]
pub async fn login(
    State(state): State<AppState>,
    Auth(claims): Auth,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<LoginResponse>, ApiError> {
    let Json(request) = payload?;
    let employee = validate_login(&claims, request)?;

    let outcome = state.store.upsert_employee(employee).await?;
    let status = if outcome.created {
        LoginStatus::Created
    } else {
        LoginStatus::Updated
    };
    tracing::info!(object_id = %outcome.employee.object_id, ?status, "employee login");

    Ok(Json(LoginResponse { status }))
}

fn validate_login(
    claims: &VerifiedClaims,
    request: LoginRequest,
) -> Result<NewEmployee, ApiError> {
    let object_id = match (claims.object_id(), request.object_id) {
        (Some(token_oid), Some(body_oid)) if token_oid == body_oid => body_oid,
        _ => return Err(ApiError::unauthorized("Object ID does not match token claims.")),
    };

    let non_empty = |value: Option<String>| value.filter(|v| !v.trim().is_empty());
    match (
        non_empty(request.first_name),
        non_empty(request.last_name),
        non_empty(request.email),
    ) {
        (Some(first_name), Some(last_name), Some(email)) => Ok(NewEmployee {
            object_id,
            first_name,
            last_name,
            email,
        }),
        _ => Err(ApiError::bad_request("Missing required fields")),
    }
}

/// Get the current employee's record.
#[utoipa::path(
    get,
    path = "/api/me",
    tag = "Employees",
    security(("bearer" = [])),
    responses(
        (status = 200, description = "Employee record", body = Employee),
        (status = 401, description = "Unauthorized - invalid or missing token"),
        (status = 404, description = "Employee has not logged in yet"),
    )
)]
pub async fn current_employee(
    State(state): State<AppState>,
    Auth(claims): Auth,
) -> Result<Json<DataResponse<Employee>>, ApiError> {
    let object_id = claims
        .object_id()
        .ok_or_else(|| ApiError::unauthorized("Token has no object id"))?;

    state
        .store
        .find_employee(object_id)
        .await?
        .map(|employee| Json(DataResponse::new(employee)))
        .ok_or_else(|| ApiError::not_found("Employee not found"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::test_support::{claims, state};
    use axum::http::StatusCode;

    fn request(oid: &str) -> LoginRequest {
        LoginRequest {
            first_name: Some("Ada".into()),
            last_name: Some("Lovelace".into()),
            email: Some("ada@example.com".into()),
            object_id: Some(oid.into()),
        }
    }

    /// Log in as `token_oid`, sending `body` as the payload.
    async fn login_as(
        state: &AppState,
        token_oid: &str,
        body: LoginRequest,
    ) -> Result<LoginStatus, ApiError> {
        let Json(response) =
            login(State(state.clone()), Auth(claims(token_oid)), Ok(Json(body))).await?;
        Ok(response.status)
    }

    #[tokio::test]
    async fn login_creates_then_updates() {
        let state = state();

        let first = login_as(&state, "oid-1", request("oid-1")).await.unwrap();
        assert_eq!(first, LoginStatus::Created);

        let second = login_as(&state, "oid-1", request("oid-1")).await.unwrap();
        assert_eq!(second, LoginStatus::Updated);

        let stored = state.store.find_employee("oid-1").await.unwrap().unwrap();
        assert_eq!(stored.email, "ada@example.com");
    }

    #[tokio::test]
    async fn login_rejects_mismatched_object_id() {
        let err = login_as(&state(), "oid-1", request("oid-2"))
            .await
            .unwrap_err();
        assert_eq!(err.status, StatusCode::UNAUTHORIZED);
        assert_eq!(err.message, "Object ID does not match token claims.");
    }

    #[tokio::test]
    async fn login_rejects_token_without_oid() {
        let mut no_oid = claims("oid-1");
        no_oid.oid = None;
        let err = login(State(state()), Auth(no_oid), Ok(Json(request("oid-1"))))
            .await
            .unwrap_err();
        assert_eq!(err.status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn login_requires_profile_fields() {
        let mut incomplete = request("oid-1");
        incomplete.email = Some("  ".into());
        let err = login_as(&state(), "oid-1", incomplete).await.unwrap_err();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn current_employee_after_login() {
        let state = state();
        let missing = current_employee(State(state.clone()), Auth(claims("oid-1")))
            .await
            .unwrap_err();
        assert_eq!(missing.status, StatusCode::NOT_FOUND);

        let status = login_as(&state, "oid-1", request("oid-1")).await.unwrap();
        assert_eq!(status, LoginStatus::Created);

        let Json(found) = current_employee(State(state), Auth(claims("oid-1")))
            .await
            .unwrap();
        assert_eq!(found.data.object_id, "oid-1");
    }
}
