// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::{process::ExitCode, sync::Arc};

use timesheets_api::{
    api::router,
    auth::{HttpKeyFetcher, TokenVerifier},
    config::AppConfig,
    rate_limit::RateLimiter,
    setup_tracing,
    state::AppState,
    storage::{InMemoryStore, PostgresConfig, PostgresStore, TimesheetStore},
};
use tokio::{net::TcpListener, signal};
use tracing::{error, info, warn};

#[tokio::main]
async fn main() -> ExitCode {
    // A missing .env file is fine
    let _ = dotenvy::dotenv();

    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("invalid configuration: {err}");
            return ExitCode::FAILURE;
        }
    };
    setup_tracing(config.log_format);

    match run(config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!(error = %err, "server failed");
            ExitCode::FAILURE
        }
    }
}

async fn run(config: AppConfig) -> Result<(), Box<dyn std::error::Error>> {
    let store: Arc<dyn TimesheetStore> = match &config.database_url {
        Some(url) => {
            Arc::new(PostgresStore::connect(&PostgresConfig::new(url.clone())).await?)
        }
        None => {
            warn!("DATABASE_URL not set, using in-memory store; data is lost on restart");
            Arc::new(InMemoryStore::new())
        }
    };

    let fetcher = HttpKeyFetcher::for_authority(&config.authority()?, config.jwks_timeout)?;
    info!(
        jwks_url = %fetcher.jwks_url(),
        tenant = %config.tenant_id,
        "token verification configured"
    );
    let verifier = TokenVerifier::new(config.auth_config(), Arc::new(fetcher))
        .with_refresh_cooldown(config.jwks_refresh_cooldown);

    let state = AppState::new(store, Arc::new(verifier))
        .with_rate_limiter(RateLimiter::per_minute(config.rate_limit_per_minute))
        .with_cors_origin(config.cors_origin.clone());
    let app = router(state);

    let listener = TcpListener::bind(config.bind_addr).await?;
    info!(addr = %config.bind_addr, "timesheets API listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = signal::ctrl_c().await {
            error!(error = %err, "failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(err) => {
                error!(error = %err, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    info!("shutdown signal received");
}
