// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{extract::State, Json};
use serde::Serialize;
use utoipa::ToSchema;

use crate::state::AppState;

/// Liveness response with signing key cache status.
#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    pub ok: bool,
    pub signing_keys: SigningKeysStatus,
}

/// State of the in-process signing key cache.
#[derive(Debug, Serialize, ToSchema, PartialEq, Eq)]
pub struct SigningKeysStatus {
    /// "cold" before the first successful fetch, "loaded" afterwards.
    pub status: String,
    /// Number of cached keys.
    pub count: usize,
    /// Seconds since the key set was last replaced.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub age_secs: Option<u64>,
}

/// Report the key cache without triggering a fetch.
async fn check_signing_keys(state: &AppState) -> SigningKeysStatus {
    let keys = state.verifier.keys();
    let age_secs = keys.age().await.map(|age| age.as_secs());
    SigningKeysStatus {
        status: if age_secs.is_some() { "loaded" } else { "cold" }.to_string(),
        count: keys.len().await,
        age_secs,
    }
}

/// Liveness probe handler.
///
/// Always returns 200 if the process is running. Reachable without a token.
/// A cold key cache is reported but does not fail the probe, since keys are
/// fetched on the first authenticated request.
#[utoipa::path(
    get,
    path = "/_health",
    tag = "Health",
    responses(
        (status = 200, description = "Service is alive", body = HealthResponse)
    )
)]
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        ok: true,
        signing_keys: check_signing_keys(&state).await,
    })
}
