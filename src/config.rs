// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Runtime Configuration
//!
//! Configuration is loaded from the environment at startup (after reading an
//! optional `.env` file). Invalid or missing required values stop the
//! process before it binds a port.
//!
//! ## Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `HOST` | Server bind address | `0.0.0.0` |
//! | `PORT` | Server bind port | `5000` |
//! | `CORS_ORIGIN` | Browser origin allowed by CORS | `http://localhost:5173` |
//! | `TENANT_ID` | Entra ID tenant; tokens must carry this `tid` | Required |
//! | `CLIENT_ID` | Expected token audience | Required (or `API_AUDIENCE`) |
//! | `API_AUDIENCE` | Fallback for `CLIENT_ID` | - |
//! | `ALLOWED_GROUPS` | Comma-separated group object ids | No restriction |
//! | `AUTHORITY_HOST` | Identity provider host | `https://login.microsoftonline.com` |
//! | `JWKS_TIMEOUT_SECS` | Key discovery request timeout | `10` |
//! | `JWKS_REFRESH_COOLDOWN_SECS` | Minimum interval between key refreshes on unknown `kid` | `60` |
//! | `DATABASE_URL` | Postgres connection string | In-memory store |
//! | `RATE_LIMIT_PER_MINUTE` | Global request limit, `0` disables | `1000` |
//! | `LOG_FORMAT` | Logging format (`json` or `pretty`) | `pretty` |
//! | `RUST_LOG` | Log level filter | `info,tower_http=debug` |

use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;
use std::time::Duration;

use axum::http::HeaderValue;
use thiserror::Error;
use url::Url;

use crate::auth::{
    jwks::DEFAULT_FETCH_TIMEOUT, verifier::DEFAULT_REFRESH_COOLDOWN, AuthConfig,
};

pub const HOST_ENV: &str = "HOST";
pub const PORT_ENV: &str = "PORT";
pub const CORS_ORIGIN_ENV: &str = "CORS_ORIGIN";
pub const TENANT_ID_ENV: &str = "TENANT_ID";
pub const CLIENT_ID_ENV: &str = "CLIENT_ID";
pub const API_AUDIENCE_ENV: &str = "API_AUDIENCE";
pub const ALLOWED_GROUPS_ENV: &str = "ALLOWED_GROUPS";
pub const AUTHORITY_HOST_ENV: &str = "AUTHORITY_HOST";
pub const JWKS_TIMEOUT_ENV: &str = "JWKS_TIMEOUT_SECS";
pub const JWKS_REFRESH_COOLDOWN_ENV: &str = "JWKS_REFRESH_COOLDOWN_SECS";
pub const DATABASE_URL_ENV: &str = "DATABASE_URL";
pub const RATE_LIMIT_ENV: &str = "RATE_LIMIT_PER_MINUTE";
pub const LOG_FORMAT_ENV: &str = "LOG_FORMAT";

pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 5000;
pub const DEFAULT_CORS_ORIGIN: &str = "http://localhost:5173";
pub const DEFAULT_AUTHORITY_HOST: &str = "https://login.microsoftonline.com";
pub const DEFAULT_RATE_LIMIT_PER_MINUTE: u32 = 1000;
pub const DEFAULT_LOG_FILTER: &str = "info,tower_http=debug";

/// Configuration errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("{name} has an invalid value '{value}'")]
    Invalid { name: &'static str, value: String },
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Service configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bind_addr: SocketAddr,
    pub cors_origin: HeaderValue,
    pub tenant_id: String,
    pub audience: String,
    pub allowed_groups: Vec<String>,
    pub authority_host: String,
    pub jwks_timeout: Duration,
    pub jwks_refresh_cooldown: Duration,
    pub database_url: Option<String>,
    pub rate_limit_per_minute: u32,
    pub log_format: LogFormat,
}

impl AppConfig {
    /// Load from process environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load using `lookup` to resolve variable names. Blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| {
            lookup(name)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let host: IpAddr = parse_or(get(HOST_ENV), HOST_ENV, DEFAULT_HOST.parse().ok())?;
        let port: u16 = parse_or(get(PORT_ENV), PORT_ENV, Some(DEFAULT_PORT))?;

        let tenant_id = get(TENANT_ID_ENV).ok_or(ConfigError::Missing(TENANT_ID_ENV))?;
        let audience = get(CLIENT_ID_ENV)
            .or_else(|| get(API_AUDIENCE_ENV))
            .ok_or(ConfigError::Missing(CLIENT_ID_ENV))?;

        let allowed_groups = get(ALLOWED_GROUPS_ENV)
            .map(|groups| {
                groups
                    .split(',')
                    .map(str::trim)
                    .filter(|group| !group.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();

        let authority_host =
            get(AUTHORITY_HOST_ENV).unwrap_or_else(|| DEFAULT_AUTHORITY_HOST.to_string());
        if Url::parse(&authority_host).is_err() {
            return Err(ConfigError::Invalid {
                name: AUTHORITY_HOST_ENV,
                value: authority_host,
            });
        }

        let cors_origin =
            get(CORS_ORIGIN_ENV).unwrap_or_else(|| DEFAULT_CORS_ORIGIN.to_string());
        let cors_origin = match (
            Url::parse(&cors_origin),
            HeaderValue::from_str(&cors_origin),
        ) {
            (Ok(_), Ok(value)) => value,
            _ => {
                return Err(ConfigError::Invalid {
                    name: CORS_ORIGIN_ENV,
                    value: cors_origin,
                })
            }
        };

        let jwks_timeout = Duration::from_secs(parse_or(
            get(JWKS_TIMEOUT_ENV),
            JWKS_TIMEOUT_ENV,
            Some(DEFAULT_FETCH_TIMEOUT.as_secs()),
        )?);
        if jwks_timeout.is_zero() {
            return Err(ConfigError::Invalid {
                name: JWKS_TIMEOUT_ENV,
                value: "0".to_string(),
            });
        }
        let jwks_refresh_cooldown = Duration::from_secs(parse_or(
            get(JWKS_REFRESH_COOLDOWN_ENV),
            JWKS_REFRESH_COOLDOWN_ENV,
            Some(DEFAULT_REFRESH_COOLDOWN.as_secs()),
        )?);

        let rate_limit_per_minute = parse_or(
            get(RATE_LIMIT_ENV),
            RATE_LIMIT_ENV,
            Some(DEFAULT_RATE_LIMIT_PER_MINUTE),
        )?;

        let log_format = match get(LOG_FORMAT_ENV).as_deref() {
            None | Some("pretty") => LogFormat::Pretty,
            Some("json") => LogFormat::Json,
            Some(other) => {
                return Err(ConfigError::Invalid {
                    name: LOG_FORMAT_ENV,
                    value: other.to_string(),
                })
            }
        };

        Ok(Self {
            bind_addr: SocketAddr::new(host, port),
            cors_origin,
            tenant_id,
            audience,
            allowed_groups,
            authority_host,
            jwks_timeout,
            jwks_refresh_cooldown,
            database_url: get(DATABASE_URL_ENV),
            rate_limit_per_minute,
            log_format,
        })
    }

    /// Tenant authority, e.g. `https://login.microsoftonline.com/<tenant>`.
    pub fn authority(&self) -> Result<Url, ConfigError> {
        let raw = format!(
            "{}/{}",
            self.authority_host.trim_end_matches('/'),
            self.tenant_id
        );
        Url::parse(&raw).map_err(|_| ConfigError::Invalid {
            name: TENANT_ID_ENV,
            value: self.tenant_id.clone(),
        })
    }

    /// Token expectations derived from this configuration.
    pub fn auth_config(&self) -> AuthConfig {
        AuthConfig::entra(&self.authority_host, &self.tenant_id, &self.audience)
            .with_allowed_groups(self.allowed_groups.clone())
    }
}

fn parse_or<T: FromStr>(
    value: Option<String>,
    name: &'static str,
    default: Option<T>,
) -> Result<T, ConfigError> {
    match value {
        Some(raw) => raw
            .parse()
            .map_err(|_| ConfigError::Invalid { name, value: raw }),
        None => default.ok_or(ConfigError::Missing(name)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(vars: &[(&str, &str)]) -> Result<AppConfig, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|name| vars.get(name).cloned())
    }

    const REQUIRED: &[(&str, &str)] = &[("TENANT_ID", "tenant-1"), ("CLIENT_ID", "client-1")];

    #[test]
    fn defaults_apply() {
        let config = load(REQUIRED).unwrap();
        assert_eq!(config.bind_addr, "0.0.0.0:5000".parse().unwrap());
        assert_eq!(config.cors_origin, DEFAULT_CORS_ORIGIN);
        assert!(config.allowed_groups.is_empty());
        assert_eq!(config.jwks_timeout, DEFAULT_FETCH_TIMEOUT);
        assert_eq!(config.jwks_refresh_cooldown, DEFAULT_REFRESH_COOLDOWN);
        assert_eq!(config.rate_limit_per_minute, 1000);
        assert!(config.database_url.is_none());
        assert_eq!(config.log_format, LogFormat::Pretty);
    }

    #[test]
    fn tenant_and_audience_are_required() {
        assert_eq!(
            load(&[("CLIENT_ID", "c")]).unwrap_err(),
            ConfigError::Missing(TENANT_ID_ENV)
        );
        assert_eq!(
            load(&[("TENANT_ID", "t")]).unwrap_err(),
            ConfigError::Missing(CLIENT_ID_ENV)
        );
        assert_eq!(
            load(&[("TENANT_ID", "t"), ("CLIENT_ID", "  ")]).unwrap_err(),
            ConfigError::Missing(CLIENT_ID_ENV)
        );
    }

    #[test]
    fn api_audience_is_a_fallback_for_client_id() {
        let config = load(&[("TENANT_ID", "t"), ("API_AUDIENCE", "api://client")]).unwrap();
        assert_eq!(config.audience, "api://client");

        let config = load(&[
            ("TENANT_ID", "t"),
            ("CLIENT_ID", "client"),
            ("API_AUDIENCE", "api://client"),
        ])
        .unwrap();
        assert_eq!(config.audience, "client");
    }

    #[test]
    fn allowed_groups_are_split_and_trimmed() {
        let mut vars = REQUIRED.to_vec();
        vars.push(("ALLOWED_GROUPS", " g1, g2 ,,g3 "));
        let config = load(&vars).unwrap();
        assert_eq!(config.allowed_groups, vec!["g1", "g2", "g3"]);
    }

    #[test]
    fn invalid_values_are_reported() {
        let mut vars = REQUIRED.to_vec();
        vars.push(("PORT", "eighty"));
        assert_eq!(
            load(&vars).unwrap_err(),
            ConfigError::Invalid {
                name: PORT_ENV,
                value: "eighty".to_string()
            }
        );

        let mut vars = REQUIRED.to_vec();
        vars.push(("LOG_FORMAT", "xml"));
        assert!(matches!(
            load(&vars),
            Err(ConfigError::Invalid {
                name: LOG_FORMAT_ENV,
                ..
            })
        ));

        let mut vars = REQUIRED.to_vec();
        vars.push(("JWKS_TIMEOUT_SECS", "0"));
        assert!(matches!(
            load(&vars),
            Err(ConfigError::Invalid {
                name: JWKS_TIMEOUT_ENV,
                ..
            })
        ));
    }

    #[test]
    fn cors_origin_must_be_a_header_safe_url() {
        let mut vars = REQUIRED.to_vec();
        vars.push(("CORS_ORIGIN", "https://timesheets.example.com"));
        let config = load(&vars).unwrap();
        assert_eq!(config.cors_origin, "https://timesheets.example.com");

        for bad in ["not an origin", "https://timesheets.example.com\nx-evil: 1"] {
            let mut vars = REQUIRED.to_vec();
            vars.push(("CORS_ORIGIN", bad));
            assert_eq!(
                load(&vars).unwrap_err(),
                ConfigError::Invalid {
                    name: CORS_ORIGIN_ENV,
                    value: bad.to_string()
                }
            );
        }
    }

    #[test]
    fn authority_and_auth_config() {
        let mut vars = REQUIRED.to_vec();
        vars.push(("ALLOWED_GROUPS", "g1"));
        let config = load(&vars).unwrap();
        assert_eq!(
            config.authority().unwrap().as_str(),
            "https://login.microsoftonline.com/tenant-1"
        );

        let auth = config.auth_config();
        assert_eq!(auth.tenant_id, "tenant-1");
        assert_eq!(auth.audiences, vec!["client-1"]);
        assert_eq!(auth.issuers, vec!["https://login.microsoftonline.com/tenant-1/v2.0"]);
        assert_eq!(auth.allowed_groups, vec!["g1"]);
    }
}
