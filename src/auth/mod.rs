// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Authentication Module
//!
//! Entra ID (Azure AD) bearer-token authentication for the Timesheets API.
//!
//! ## Auth Flow
//!
//! 1. Frontend signs the employee in with Entra ID (MSAL)
//! 2. Frontend sends `Authorization: Bearer <access token>`
//! 3. Server:
//!    - Fetches the tenant's signing keys on first use (`jwks`)
//!    - Caches them in process (`keys`)
//!    - Verifies signature, expiry, issuer, audience (`verifier`)
//!    - Checks the tenant (`tid`) and optional group allow-list
//!    - Exposes the claims to handlers (`middleware`, `extractor`)
//!
//! ## Security
//!
//! - Every path except the health check requires authentication
//! - Only the first certificate of each key's `x5c` chain is used; the chain
//!   is not validated
//! - Clients only see "invalid or expired token" or "not authorized";
//!   the detailed reason is logged

pub mod claims;
pub mod error;
pub mod extractor;
pub mod jwks;
pub mod keys;
pub mod middleware;
pub mod verifier;

pub use claims::{Audience, VerifiedClaims};
pub use error::AuthError;
pub use extractor::Auth;
pub use jwks::{HttpKeyFetcher, KeyFetcher};
pub use keys::{KeyStore, SigningKeySet};
pub use middleware::{require_bearer, HEALTH_PATH};
pub use verifier::{AuthConfig, TokenVerifier};
