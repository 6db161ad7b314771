// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Timesheets API - Entra ID authenticated timesheet backend
//!
//! Employees sign in through Entra ID in the browser and call this service
//! with the resulting access token. Every route except the health check
//! verifies that token against the tenant's published signing keys.
//!
//! ## Modules
//!
//! - `api` - HTTP API handlers (Axum)
//! - `auth` - Bearer token verification (Entra ID JWKS)
//! - `config` - Environment configuration
//! - `rate_limit` - Global request limiting
//! - `storage` - Employee and timesheet persistence (Postgres or in-memory)

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

pub mod api;
pub mod auth;
pub mod config;
pub mod error;
pub mod models;
pub mod rate_limit;
pub mod state;
pub mod storage;

use config::{LogFormat, DEFAULT_LOG_FILTER};

/// Install the global tracing subscriber. `RUST_LOG` overrides the default filter.
pub fn setup_tracing(format: LogFormat) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

    let subscriber = tracing_subscriber::registry().with(filter);

    match format {
        LogFormat::Json => subscriber.with(fmt::layer().json()).init(),
        LogFormat::Pretty => subscriber.with(fmt::layer()).init(),
    }
}
