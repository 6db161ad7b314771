// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Verified token claims.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Claims of an Entra ID access token after signature and claim validation.
///
/// Entra ID v2.0 tokens carry standard OIDC claims plus tenant (`tid`),
/// object (`oid`) and optional group memberships. See:
/// https://learn.microsoft.com/entra/identity-platform/access-token-claims-reference
///
/// Lives in request extensions for the duration of a request and is never
/// persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct VerifiedClaims {
    /// Tenant the token was issued for
    #[serde(default)]
    pub tid: Option<String>,

    /// Immutable object identifier of the signed-in user
    #[serde(default)]
    pub oid: Option<String>,

    /// Subject (pairwise per application)
    #[serde(default)]
    pub sub: Option<String>,

    /// Audience (client id or application ID URI)
    pub aud: Audience,

    /// Issuer
    pub iss: String,

    /// Expiration timestamp
    pub exp: i64,

    /// Issued at timestamp
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iat: Option<i64>,

    /// Not before timestamp
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nbf: Option<i64>,

    /// Security group object ids (requires `groupMembershipClaims` on the app registration)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub groups: Option<Vec<String>>,

    /// App roles assigned to the user
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub roles: Option<Vec<String>>,

    /// Delegated scopes, space separated
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scp: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preferred_username: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

/// The `aud` claim, which RFC 7519 allows as a single string or an array.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(untagged)]
pub enum Audience {
    Single(String),
    Multiple(Vec<String>),
}

impl Audience {
    pub fn contains(&self, audience: &str) -> bool {
        match self {
            Audience::Single(value) => value == audience,
            Audience::Multiple(values) => values.iter().any(|value| value == audience),
        }
    }
}

impl From<&str> for Audience {
    fn from(audience: &str) -> Self {
        Audience::Single(audience.to_string())
    }
}

impl VerifiedClaims {
    /// Object id of the caller, if present.
    pub fn object_id(&self) -> Option<&str> {
        self.oid.as_deref().filter(|oid| !oid.is_empty())
    }

    /// Whether any of the caller's groups appear in `allowed`.
    pub fn in_any_group(&self, allowed: &[String]) -> bool {
        self.groups
            .as_deref()
            .unwrap_or_default()
            .iter()
            .any(|group| allowed.contains(group))
    }
}
