// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Axum extractor for verified claims.
//!
//! Use the `Auth` extractor in handlers behind
//! [`require_bearer`](super::middleware::require_bearer):
//!
//! ```rust,ignore
//! async fn my_handler(Auth(claims): Auth) -> impl IntoResponse {
//!     // claims is VerifiedClaims
//! }
//! ```

use axum::{extract::FromRequestParts, http::request::Parts};

use super::{AuthError, VerifiedClaims};

/// Extractor for the caller's verified claims.
///
/// Rejects with [`AuthError::MissingBearer`] if the authentication middleware
/// did not run for this route.
pub struct Auth(pub VerifiedClaims);

impl<S> FromRequestParts<S> for Auth
where
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<VerifiedClaims>()
            .cloned()
            .map(Auth)
            .ok_or(AuthError::MissingBearer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;

    fn claims() -> VerifiedClaims {
        VerifiedClaims {
            tid: Some("tenant".to_string()),
            oid: Some("oid_123".to_string()),
            sub: None,
            aud: "client".into(),
            iss: "issuer".to_string(),
            exp: 0,
            iat: None,
            nbf: None,
            groups: None,
            roles: None,
            scp: None,
            name: None,
            preferred_username: None,
            email: None,
        }
    }

    #[tokio::test]
    async fn auth_extractor_reads_extensions() {
        let mut parts = Request::builder()
            .uri("/test")
            .body(())
            .unwrap()
            .into_parts()
            .0;
        parts.extensions.insert(claims());

        let Auth(found) = Auth::from_request_parts(&mut parts, &()).await.unwrap();
        assert_eq!(found.object_id(), Some("oid_123"));
    }

    #[tokio::test]
    async fn auth_extractor_rejects_without_middleware() {
        let mut parts = Request::builder()
            .uri("/test")
            .body(())
            .unwrap()
            .into_parts()
            .0;

        let result = Auth::from_request_parts(&mut parts, &()).await;
        assert!(matches!(result, Err(AuthError::MissingBearer)));
    }
}
