// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Authentication middleware for Axum.
//!
//! Applied to the whole router so that every route, including unknown paths,
//! requires a verified bearer token. Public paths are exempt.
//!
//! ```rust,ignore
//! let app = Router::new()
//!     .route("/api/timesheet", get(list_entries))
//!     .layer(axum::middleware::from_fn_with_state(
//!         verifier.clone(),
//!         require_bearer,
//!     ));
//! ```

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::{IntoResponse, Response},
};

use super::verifier::TokenVerifier;

/// Health check path, reachable without a token.
pub const HEALTH_PATH: &str = "/_health";

/// Paths that skip authentication.
const PUBLIC_PATHS: &[&str] = &[HEALTH_PATH];

/// Whether `path` is exempt from authentication.
pub fn is_public_path(path: &str) -> bool {
    PUBLIC_PATHS.contains(&path)
}

/// Authentication middleware function.
///
/// On success the [`VerifiedClaims`](super::VerifiedClaims) are inserted into
/// the request extensions. On failure the handler is never called.
pub async fn require_bearer(
    State(verifier): State<Arc<TokenVerifier>>,
    mut request: Request,
    next: Next,
) -> Response {
    if is_public_path(request.uri().path()) {
        return next.run(request).await;
    }

    let authorization = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok());

    match verifier.verify(authorization).await {
        Ok(claims) => {
            tracing::debug!(oid = ?claims.oid, "request authenticated");
            request.extensions_mut().insert(claims);
            next.run(request).await
        }
        Err(err) => {
            tracing::warn!(
                error = %err,
                method = %request.method(),
                path = %request.uri().path(),
                "rejected request"
            );
            err.into_response()
        }
    }
}
