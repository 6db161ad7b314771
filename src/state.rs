// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::sync::Arc;

use axum::http::HeaderValue;

use crate::auth::TokenVerifier;
use crate::config::{DEFAULT_CORS_ORIGIN, DEFAULT_RATE_LIMIT_PER_MINUTE};
use crate::rate_limit::RateLimiter;
use crate::storage::TimesheetStore;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn TimesheetStore>,
    pub verifier: Arc<TokenVerifier>,
    pub rate_limiter: Arc<RateLimiter>,
    pub cors_origin: HeaderValue,
}

impl AppState {
    pub fn new(store: Arc<dyn TimesheetStore>, verifier: Arc<TokenVerifier>) -> Self {
        Self {
            store,
            verifier,
            rate_limiter: Arc::new(RateLimiter::per_minute(DEFAULT_RATE_LIMIT_PER_MINUTE)),
            cors_origin: HeaderValue::from_static(DEFAULT_CORS_ORIGIN),
        }
    }

    pub fn with_rate_limiter(mut self, rate_limiter: RateLimiter) -> Self {
        self.rate_limiter = Arc::new(rate_limiter);
        self
    }

    pub fn with_cors_origin(mut self, origin: HeaderValue) -> Self {
        self.cors_origin = origin;
        self
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use crate::auth::{AuthConfig, AuthError, KeyFetcher, SigningKeySet, VerifiedClaims};
    use crate::storage::InMemoryStore;
    use async_trait::async_trait;

    struct NoKeys;

    #[async_trait]
    impl KeyFetcher for NoKeys {
        async fn fetch(&self) -> Result<SigningKeySet, AuthError> {
            Ok(SigningKeySet::new())
        }
    }

    /// State backed by an empty in-memory store and a verifier with no keys.
    pub fn state() -> AppState {
        let verifier = TokenVerifier::new(
            AuthConfig::entra("https://login.microsoftonline.com", "tenant-1", "client-1"),
            Arc::new(NoKeys),
        );
        AppState::new(Arc::new(InMemoryStore::new()), Arc::new(verifier))
    }

    /// Claims for a caller with object id `oid`.
    pub fn claims(oid: &str) -> VerifiedClaims {
        VerifiedClaims {
            tid: Some("tenant-1".to_string()),
            oid: Some(oid.to_string()),
            sub: Some("pairwise-subject".to_string()),
            aud: "client-1".into(),
            iss: "https://login.microsoftonline.com/tenant-1/v2.0".to_string(),
            exp: 1_900_000_000,
            iat: None,
            nbf: None,
            groups: None,
            roles: None,
            scp: None,
            name: Some("Ada Lovelace".to_string()),
            preferred_username: None,
            email: None,
        }
    }
}
