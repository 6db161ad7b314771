// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Bearer token verification.
//!
//! ## Key resolution
//!
//! The [`KeyStore`] is populated lazily. A lookup miss takes the fetch lock,
//! re-checks the store (another request may have populated it meanwhile),
//! then fetches and replaces the whole set. Concurrent cold-cache requests
//! therefore share a single fetch.
//!
//! A miss against an already populated store only re-fetches once the refresh
//! cooldown has elapsed since the last replacement, so tokens with unknown
//! `kid`s cannot force a fetch per request.
//!
//! ## Validation
//!
//! RS256 signature, `exp`/`nbf` with 60 seconds of leeway, audience and
//! issuer. Tenant and group checks run after a successful verification and
//! produce authorization (403) rather than authentication (401) errors.

use std::sync::Arc;
use std::time::Duration;

use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, decode_header, Algorithm, DecodingKey, Validation};
use tokio::sync::Mutex;

use super::claims::VerifiedClaims;
use super::error::AuthError;
use super::jwks::KeyFetcher;
use super::keys::KeyStore;

/// Clock skew tolerance (60 seconds).
const CLOCK_SKEW_LEEWAY: u64 = 60;

/// Default minimum interval between re-fetches triggered by unknown `kid`s.
pub const DEFAULT_REFRESH_COOLDOWN: Duration = Duration::from_secs(60);

/// Expected token properties.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthConfig {
    /// Tenant the `tid` claim must equal
    pub tenant_id: String,
    /// Accepted `aud` values
    pub audiences: Vec<String>,
    /// Accepted `iss` values
    pub issuers: Vec<String>,
    /// Group object ids; empty means no group restriction
    pub allowed_groups: Vec<String>,
}

impl AuthConfig {
    /// Configuration for an Entra ID v2.0 tenant.
    ///
    /// The issuer is `<authority_host>/<tenant>/v2.0` and the audience is the
    /// application's client id.
    pub fn entra(
        authority_host: &str,
        tenant_id: impl Into<String>,
        audience: impl Into<String>,
    ) -> Self {
        let tenant_id = tenant_id.into();
        let issuer = format!("{}/{}/v2.0", authority_host.trim_end_matches('/'), tenant_id);
        Self {
            tenant_id,
            audiences: vec![audience.into()],
            issuers: vec![issuer],
            allowed_groups: Vec::new(),
        }
    }

    /// Restrict access to members of at least one of `groups`.
    pub fn with_allowed_groups(mut self, groups: Vec<String>) -> Self {
        self.allowed_groups = groups;
        self
    }
}

/// Verifies bearer tokens against the identity provider's signing keys.
pub struct TokenVerifier {
    config: AuthConfig,
    keys: KeyStore,
    fetcher: Arc<dyn KeyFetcher>,
    fetch_lock: Mutex<()>,
    refresh_cooldown: Duration,
}

impl TokenVerifier {
    pub fn new(config: AuthConfig, fetcher: Arc<dyn KeyFetcher>) -> Self {
        Self::with_store(config, KeyStore::new(), fetcher)
    }

    /// Create with an existing key store.
    pub fn with_store(config: AuthConfig, keys: KeyStore, fetcher: Arc<dyn KeyFetcher>) -> Self {
        Self {
            config,
            keys,
            fetcher,
            fetch_lock: Mutex::new(()),
            refresh_cooldown: DEFAULT_REFRESH_COOLDOWN,
        }
    }

    /// Set the minimum interval between re-fetches on unknown `kid`s.
    pub fn with_refresh_cooldown(mut self, cooldown: Duration) -> Self {
        self.refresh_cooldown = cooldown;
        self
    }

    pub fn keys(&self) -> &KeyStore {
        &self.keys
    }

    /// Verify the value of an `Authorization` header.
    pub async fn verify(&self, authorization: Option<&str>) -> Result<VerifiedClaims, AuthError> {
        let token = bearer_token(authorization)?;
        self.verify_token(token).await
    }

    /// Verify a raw JWT, then apply tenant and group authorization.
    pub async fn verify_token(&self, token: &str) -> Result<VerifiedClaims, AuthError> {
        let header = decode_header(token).map_err(|e| AuthError::MalformedHeader(e.to_string()))?;
        let kid = header
            .kid
            .filter(|kid| !kid.is_empty())
            .ok_or_else(|| AuthError::MalformedHeader("token header has no kid".to_string()))?;

        let pem = self.resolve_key(&kid).await?;
        let decoding_key = DecodingKey::from_rsa_pem(pem.as_bytes()).map_err(|e| {
            AuthError::SignatureInvalid(format!("unusable key for kid '{kid}': {e}"))
        })?;

        let mut validation = Validation::new(Algorithm::RS256);
        validation.leeway = CLOCK_SKEW_LEEWAY;
        validation.set_audience(self.config.audiences.as_slice());
        validation.set_issuer(self.config.issuers.as_slice());
        validation.set_required_spec_claims(&["exp", "aud", "iss"]);

        let token_data =
            decode::<VerifiedClaims>(token, &decoding_key, &validation).map_err(map_jwt_error)?;
        let claims = token_data.claims;

        self.authorize(&claims)?;
        Ok(claims)
    }

    /// Tenant and group checks on already verified claims.
    pub fn authorize(&self, claims: &VerifiedClaims) -> Result<(), AuthError> {
        if claims.tid.as_deref() != Some(self.config.tenant_id.as_str()) {
            return Err(AuthError::TenantMismatch {
                found: claims.tid.clone().unwrap_or_default(),
            });
        }

        if !self.config.allowed_groups.is_empty()
            && !claims.in_any_group(&self.config.allowed_groups)
        {
            return Err(AuthError::GroupNotAllowed);
        }

        Ok(())
    }

    /// Find the PEM for `kid`, populating the store when needed.
    async fn resolve_key(&self, kid: &str) -> Result<String, AuthError> {
        if let Some(pem) = self.keys.get(kid).await {
            return Ok(pem);
        }

        let _guard = self.fetch_lock.lock().await;

        // Populated by a concurrent request while we waited for the lock.
        if let Some(pem) = self.keys.get(kid).await {
            return Ok(pem);
        }

        if !self.keys.is_empty().await && !self.refresh_due().await {
            return Err(AuthError::KeyNotFound(kid.to_string()));
        }

        let fetched = self.fetcher.fetch().await?;
        self.keys.replace_all(fetched).await;

        self.keys
            .get(kid)
            .await
            .ok_or_else(|| AuthError::KeyNotFound(kid.to_string()))
    }

    async fn refresh_due(&self) -> bool {
        self.keys
            .age()
            .await
            .is_none_or(|age| age >= self.refresh_cooldown)
    }
}

/// Extract the token from `Bearer <token>`.
pub fn bearer_token(authorization: Option<&str>) -> Result<&str, AuthError> {
    let token = authorization
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .ok_or(AuthError::MissingBearer)?;
    if token.is_empty() {
        return Err(AuthError::MissingBearer);
    }
    Ok(token)
}

fn map_jwt_error(e: jsonwebtoken::errors::Error) -> AuthError {
    match e.kind() {
        ErrorKind::InvalidSignature
        | ErrorKind::InvalidRsaKey(_)
        | ErrorKind::InvalidKeyFormat
        | ErrorKind::InvalidAlgorithm => AuthError::SignatureInvalid(e.to_string()),
        ErrorKind::ExpiredSignature
        | ErrorKind::ImmatureSignature
        | ErrorKind::InvalidAudience
        | ErrorKind::InvalidIssuer
        | ErrorKind::InvalidSubject
        | ErrorKind::MissingRequiredClaim(_) => AuthError::ClaimMismatch(e.to_string()),
        _ => AuthError::MalformedHeader(e.to_string()),
    }
}
