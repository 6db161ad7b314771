// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! JWKS (JSON Web Key Set) fetching.
//!
//! Entra ID publishes its signing keys at
//! `<authority>/discovery/v2.0/keys`. Each key carries an `x5c` certificate
//! chain; only the first certificate is used, wrapped as a PEM `CERTIFICATE`
//! block. The chain itself is not validated.
//!
//! Fetching is a single GET with a request timeout and no retry. Callers
//! decide when to fetch (see [`super::verifier::TokenVerifier`]).

use std::time::Duration;

use async_trait::async_trait;
use base64ct::{Base64, Encoding};
use serde::Deserialize;
use url::Url;

use super::error::AuthError;
use super::keys::SigningKeySet;

/// Default timeout for the key discovery request.
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(10);

/// Source of the identity provider's signing keys.
#[async_trait]
pub trait KeyFetcher: Send + Sync {
    /// Retrieve the full published key set.
    async fn fetch(&self) -> Result<SigningKeySet, AuthError>;
}

/// Fetches keys over HTTPS from the discovery endpoint.
#[derive(Clone)]
pub struct HttpKeyFetcher {
    /// JWKS URL
    jwks_url: String,
    /// HTTP client
    client: reqwest::Client,
}

impl HttpKeyFetcher {
    /// Create a fetcher for `jwks_url` with the given request timeout.
    pub fn new(jwks_url: impl Into<String>, timeout: Duration) -> Result<Self, AuthError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AuthError::Network(format!("failed to create HTTP client: {e}")))?;
        Ok(Self {
            jwks_url: jwks_url.into(),
            client,
        })
    }

    /// Create a fetcher for a tenant authority such as
    /// `https://login.microsoftonline.com/<tenant>`.
    pub fn for_authority(authority: &Url, timeout: Duration) -> Result<Self, AuthError> {
        Self::new(jwks_url(authority), timeout)
    }

    /// Get the JWKS URL.
    pub fn jwks_url(&self) -> &str {
        &self.jwks_url
    }
}

#[async_trait]
impl KeyFetcher for HttpKeyFetcher {
    async fn fetch(&self) -> Result<SigningKeySet, AuthError> {
        tracing::debug!(url = %self.jwks_url, "fetching signing keys");

        let response = self
            .client
            .get(&self.jwks_url)
            .send()
            .await
            .map_err(|e| AuthError::Network(e.to_string()))?;

        if !response.status().is_success() {
            return Err(AuthError::Network(format!(
                "HTTP {} from JWKS endpoint",
                response.status()
            )));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| AuthError::Network(e.to_string()))?;

        let keys = parse_key_set(&body)?;
        tracing::info!(count = keys.len(), "fetched signing keys");
        Ok(keys)
    }
}

/// Discovery URL for a tenant authority.
pub fn jwks_url(authority: &Url) -> String {
    format!(
        "{}/discovery/v2.0/keys",
        authority.as_str().trim_end_matches('/')
    )
}

#[derive(Debug, Deserialize)]
struct JwksDocument {
    keys: Vec<JwkEntry>,
}

#[derive(Debug, Deserialize)]
struct JwkEntry {
    kid: Option<String>,
    #[serde(default)]
    x5c: Vec<String>,
}

/// Parse a discovery document into a key set.
///
/// Entries without a `kid` or an `x5c` chain are skipped, since no token can
/// select them. A non-base64 certificate or a body that is not a key set
/// document is a [`AuthError::Parse`].
pub fn parse_key_set(body: &[u8]) -> Result<SigningKeySet, AuthError> {
    let document: JwksDocument =
        serde_json::from_slice(body).map_err(|e| AuthError::Parse(e.to_string()))?;

    let mut keys = SigningKeySet::with_capacity(document.keys.len());
    for entry in document.keys {
        let Some(kid) = entry.kid.filter(|kid| !kid.is_empty()) else {
            tracing::debug!("skipping key without kid");
            continue;
        };

        let Some(first) = entry.x5c.first() else {
            tracing::debug!(%kid, "skipping key without x5c chain");
            continue;
        };

        keys.insert(kid.clone(), certificate_pem(&kid, first)?);
    }

    Ok(keys)
}

fn certificate_pem(kid: &str, x5c: &str) -> Result<String, AuthError> {
    let der = Base64::decode_vec(x5c.trim())
        .map_err(|e| AuthError::Parse(format!("x5c for kid '{kid}' is not base64: {e}")))?;
    if der.is_empty() {
        return Err(AuthError::Parse(format!("x5c for kid '{kid}' is empty")));
    }
    Ok(pem::encode(&pem::Pem::new("CERTIFICATE", der)))
}
