// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Authentication errors.
//!
//! Variants carry enough detail for server-side logs. The HTTP response only
//! distinguishes a missing header, an invalid token (401) and an authenticated
//! caller outside the allowed tenant or groups (403).

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// Client-facing message for a missing or non-`Bearer` Authorization header.
pub const MISSING_HEADER_MESSAGE: &str = "Missing or invalid Authorization header";
/// Client-facing message for every token verification failure.
pub const INVALID_TOKEN_MESSAGE: &str = "Invalid or expired token";
/// Client-facing message for tenant and group rejections.
pub const FORBIDDEN_MESSAGE: &str = "User is not authorized to access this resource";

/// Authentication error type.
#[derive(Debug, Error)]
pub enum AuthError {
    /// No Authorization header, or it does not use the `Bearer` scheme
    #[error("authorization header missing or not a bearer credential")]
    MissingBearer,
    /// Token structure could not be decoded, or the header has no `kid`
    #[error("malformed token: {0}")]
    MalformedHeader(String),
    /// Transport failure or non-success status from the key endpoint
    #[error("failed to fetch signing keys: {0}")]
    Network(String),
    /// Key endpoint returned a body that is not a usable key set
    #[error("failed to parse signing keys: {0}")]
    Parse(String),
    /// No signing key for the token's `kid`, even after a fetch
    #[error("no signing key found for kid '{0}'")]
    KeyNotFound(String),
    /// Signature did not verify against the resolved key
    #[error("token signature is invalid: {0}")]
    SignatureInvalid(String),
    /// Audience, issuer, expiry or another registered claim failed validation
    #[error("token claim validation failed: {0}")]
    ClaimMismatch(String),
    /// Token was issued for a different tenant
    #[error("token tenant '{found}' does not match configured tenant")]
    TenantMismatch { found: String },
    /// Allow-list is configured and the token's groups miss it entirely
    #[error("token groups do not intersect the allowed groups")]
    GroupNotAllowed,
}

#[derive(Serialize)]
struct AuthErrorBody {
    error: &'static str,
}

impl AuthError {
    /// Get the HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            AuthError::TenantMismatch { .. } | AuthError::GroupNotAllowed => {
                StatusCode::FORBIDDEN
            }
            _ => StatusCode::UNAUTHORIZED,
        }
    }

    /// Message returned to the client. Internal distinctions stay in logs.
    pub fn public_message(&self) -> &'static str {
        match self {
            AuthError::MissingBearer => MISSING_HEADER_MESSAGE,
            AuthError::TenantMismatch { .. } | AuthError::GroupNotAllowed => FORBIDDEN_MESSAGE,
            _ => INVALID_TOKEN_MESSAGE,
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let body = Json(AuthErrorBody {
            error: self.public_message(),
        });
        (self.status_code(), body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    async fn body_of(err: AuthError) -> (StatusCode, serde_json::Value) {
        let response = err.into_response();
        let status = response.status();
        let body_bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&body_bytes).unwrap())
    }

    #[tokio::test]
    async fn missing_bearer_returns_401() {
        let (status, body) = body_of(AuthError::MissingBearer).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"], MISSING_HEADER_MESSAGE);
    }

    #[tokio::test]
    async fn verification_failures_collapse_to_generic_401() {
        for err in [
            AuthError::MalformedHeader("no kid".into()),
            AuthError::Network("connection refused".into()),
            AuthError::Parse("bad json".into()),
            AuthError::KeyNotFound("abc".into()),
            AuthError::SignatureInvalid("InvalidSignature".into()),
            AuthError::ClaimMismatch("InvalidAudience".into()),
        ] {
            let (status, body) = body_of(err).await;
            assert_eq!(status, StatusCode::UNAUTHORIZED);
            assert_eq!(body, serde_json::json!({ "error": INVALID_TOKEN_MESSAGE }));
        }
    }

    #[tokio::test]
    async fn tenant_and_group_rejections_return_403() {
        let (status, body) = body_of(AuthError::TenantMismatch {
            found: "other".into(),
        })
        .await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["error"], FORBIDDEN_MESSAGE);

        let (status, _) = body_of(AuthError::GroupNotAllowed).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
    }
}
