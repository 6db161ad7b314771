// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Global request rate limiting.

use std::num::NonZeroU32;
use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
};
use governor::{DefaultDirectRateLimiter, Quota};

use crate::error::ApiError;

/// Process-wide request limiter. A limit of zero disables limiting.
pub struct RateLimiter {
    inner: Option<DefaultDirectRateLimiter>,
}

impl RateLimiter {
    /// Allow `limit` requests per minute, with the full minute's quota
    /// available as burst.
    pub fn per_minute(limit: u32) -> Self {
        Self {
            inner: NonZeroU32::new(limit)
                .map(|limit| DefaultDirectRateLimiter::direct(Quota::per_minute(limit))),
        }
    }

    /// Try to acquire a permit
    pub fn try_acquire(&self) -> bool {
        self.inner
            .as_ref()
            .is_none_or(|limiter| limiter.check().is_ok())
    }
}

/// Reject requests once the quota is exhausted.
pub async fn enforce_rate_limit(
    State(limiter): State<Arc<RateLimiter>>,
    request: Request,
    next: Next,
) -> Response {
    if limiter.try_acquire() {
        next.run(request).await
    } else {
        tracing::warn!(path = %request.uri().path(), "rate limit exceeded");
        ApiError::new(StatusCode::TOO_MANY_REQUESTS, "Too many requests").into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exhausts_quota() {
        let limiter = RateLimiter::per_minute(2);
        assert!(limiter.try_acquire());
        assert!(limiter.try_acquire());
        assert!(!limiter.try_acquire());
    }

    #[test]
    fn zero_disables_limiting() {
        let limiter = RateLimiter::per_minute(0);
        for _ in 0..100 {
            assert!(limiter.try_acquire());
        }
    }
}
