// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Runtime Configuration
//!
//! This module defines environment variable names and default values used
//! throughout the application. Configuration is loaded from the environment
//! (and a `.env` file, if present) at startup.
//!
//! ## Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `HOST` | Server bind address | `0.0.0.0` |
//! | `PORT` | Server bind port | `8080` |
//! | `DATA_DIR` | Directory of the identity database | in-memory store |
//! | `APP_SECRET` | Application secret, fallback HMAC key | Required unless `JWT_KEY` is set |
//! | `APP_DEBUG` | Propagate token verification errors | `false` |
//! | `JWT_HEADER` | Header carrying the token | `authorization` |
//! | `JWT_PREFIX` | Token prefix in the header | `bearer` |
//! | `JWT_COOKIE` | Cookie carrying the token | disabled |
//! | `JWT_QUERY_PARAM` | Query parameter carrying the token | `token` |
//! | `JWT_ALGORITHMS` | Comma-separated accepted algorithms | `HS256` |
//! | `JWT_KEY` | Verification key: secret, PEM, or JSON key set | `APP_SECRET` |
//! | `JWT_QUERY_DATASTORE` | Look `sub` up in the identity store | `true` |
//! | `JWT_USER_MODEL` | Entity holding identities | `Users` |
//! | `JWT_IDENTITY_FIELD` | Field matched against `sub` | `id` |
//! | `JWT_SECRET_FIELD` | Field removed from identities | `password` |
//! | `JWT_SCOPE` | JSON object of extra lookup conditions | none |
//! | `JWT_CONTAIN` | Comma-separated related entities | none |
//! | `JWT_UNAUTHENTICATED` | `unauthorized`, `invalid_token`, `forbidden` | `unauthorized` |
//! | `SEED_USERS` | JSON array of identity records stored at startup | none |
//! | `LOG_FORMAT` | Logging format (`json` or `pretty`) | `pretty` |
//! | `RUST_LOG` | Log level filter | `info,tower_http=debug` |
//!
//! `false`, `none`, `0` or an empty value disables `JWT_COOKIE`,
//! `JWT_QUERY_PARAM` and `JWT_UNAUTHENTICATED`.

use std::path::PathBuf;
use std::str::FromStr;

use jsonwebtoken::Algorithm;
use serde_json::{Map, Value};

use crate::auth::{AuthSettings, FailureKind, KeyMaterial, VerificationKey};

pub const HOST_ENV: &str = "HOST";
pub const PORT_ENV: &str = "PORT";

/// Environment variable name for the identity database directory.
///
/// When unset the server runs with an empty in-memory identity store.
pub const DATA_DIR_ENV: &str = "DATA_DIR";

/// Environment variable name for the application secret.
///
/// Used to verify HMAC tokens when `JWT_KEY` is not configured.
pub const APP_SECRET_ENV: &str = "APP_SECRET";
pub const APP_DEBUG_ENV: &str = "APP_DEBUG";
pub const LOG_FORMAT_ENV: &str = "LOG_FORMAT";

/// Environment variable name for identity records seeded into the store.
///
/// A JSON array of objects, each with an `id` field. Records are stored in
/// the entity named by `JWT_USER_MODEL`.
pub const SEED_USERS_ENV: &str = "SEED_USERS";

pub const JWT_HEADER_ENV: &str = "JWT_HEADER";
pub const JWT_PREFIX_ENV: &str = "JWT_PREFIX";
pub const JWT_COOKIE_ENV: &str = "JWT_COOKIE";
pub const JWT_QUERY_PARAM_ENV: &str = "JWT_QUERY_PARAM";
pub const JWT_ALGORITHMS_ENV: &str = "JWT_ALGORITHMS";
pub const JWT_KEY_ENV: &str = "JWT_KEY";
pub const JWT_QUERY_DATASTORE_ENV: &str = "JWT_QUERY_DATASTORE";
pub const JWT_USER_MODEL_ENV: &str = "JWT_USER_MODEL";
pub const JWT_IDENTITY_FIELD_ENV: &str = "JWT_IDENTITY_FIELD";
pub const JWT_SECRET_FIELD_ENV: &str = "JWT_SECRET_FIELD";
pub const JWT_SCOPE_ENV: &str = "JWT_SCOPE";
pub const JWT_CONTAIN_ENV: &str = "JWT_CONTAIN";
pub const JWT_UNAUTHENTICATED_ENV: &str = "JWT_UNAUTHENTICATED";

pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_LOG_FILTER: &str = "info,tower_http=debug";

/// Identity database file name inside `DATA_DIR`.
pub const IDENTITY_DB_FILE: &str = "identities.redb";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid value for {name}: {reason}")]
    Invalid { name: &'static str, reason: String },
}

impl ConfigError {
    fn invalid(name: &'static str, reason: impl Into<String>) -> Self {
        ConfigError::Invalid {
            name,
            reason: reason.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    Json,
    #[default]
    Pretty,
}

/// Server configuration.
#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub data_dir: Option<PathBuf>,
    pub app_secret: Option<String>,
    pub debug: bool,
    pub log_format: LogFormat,
    pub seed_users: Vec<Map<String, Value>>,
    pub auth: AuthSettings,
}

impl Config {
    /// Load configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        // A missing .env file is fine
        dotenvy::dotenv().ok();
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let port = match lookup(PORT_ENV) {
            Some(port) => port
                .parse()
                .map_err(|_| ConfigError::invalid(PORT_ENV, format!("'{port}' is not a port")))?,
            None => DEFAULT_PORT,
        };

        let log_format = match lookup(LOG_FORMAT_ENV).as_deref() {
            Some("json") => LogFormat::Json,
            _ => LogFormat::Pretty,
        };

        let seed_users: Vec<Map<String, Value>> = match lookup(SEED_USERS_ENV).filter(|v| !v.is_empty()) {
            Some(users) => serde_json::from_str(&users)
                .map_err(|e| ConfigError::invalid(SEED_USERS_ENV, e.to_string()))?,
            None => Vec::new(),
        };

        Ok(Self {
            host: lookup(HOST_ENV).unwrap_or_else(|| DEFAULT_HOST.to_string()),
            port,
            data_dir: lookup(DATA_DIR_ENV)
                .filter(|dir| !dir.is_empty())
                .map(PathBuf::from),
            app_secret: lookup(APP_SECRET_ENV).filter(|secret| !secret.is_empty()),
            debug: lookup(APP_DEBUG_ENV).is_some_and(|v| parse_flag(&v)),
            log_format,
            seed_users,
            auth: auth_settings(&lookup)?,
        })
    }
}

/// Build authenticator settings from `JWT_*` variables.
pub fn auth_settings<F>(lookup: &F) -> Result<AuthSettings, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let mut settings = AuthSettings::default();

    if let Some(header) = lookup(JWT_HEADER_ENV).filter(|v| !v.is_empty()) {
        settings.header = header;
    }
    if let Some(prefix) = lookup(JWT_PREFIX_ENV).filter(|v| !v.is_empty()) {
        settings.prefix = prefix;
    }
    if let Some(cookie) = lookup(JWT_COOKIE_ENV) {
        settings.cookie = source_name(&cookie);
    }
    if let Some(param) = lookup(JWT_QUERY_PARAM_ENV) {
        settings.query_param = source_name(&param);
    }
    if let Some(algorithms) = lookup(JWT_ALGORITHMS_ENV) {
        settings.allowed_algorithms = parse_algorithms(&algorithms)?;
    }
    if let Some(enabled) = lookup(JWT_QUERY_DATASTORE_ENV) {
        settings.query_datastore = parse_flag(&enabled);
    }
    if let Some(model) = lookup(JWT_USER_MODEL_ENV).filter(|v| !v.is_empty()) {
        settings.user_model = model;
    }
    if let Some(field) = lookup(JWT_IDENTITY_FIELD_ENV).filter(|v| !v.is_empty()) {
        settings.identity_field = field;
    }
    if let Some(field) = lookup(JWT_SECRET_FIELD_ENV).filter(|v| !v.is_empty()) {
        settings.secret_field = field;
    }
    if let Some(scope) = lookup(JWT_SCOPE_ENV).filter(|v| !v.is_empty()) {
        settings.scope = serde_json::from_str::<Map<String, Value>>(&scope)
            .map_err(|e| ConfigError::invalid(JWT_SCOPE_ENV, e.to_string()))?;
    }
    if let Some(contain) = lookup(JWT_CONTAIN_ENV) {
        settings.contain = contain
            .split(',')
            .map(str::trim)
            .filter(|entity| !entity.is_empty())
            .map(str::to_string)
            .collect();
    }
    if let Some(kind) = lookup(JWT_UNAUTHENTICATED_ENV) {
        settings.unauthenticated =
            FailureKind::parse(&kind).map_err(|e| ConfigError::invalid(JWT_UNAUTHENTICATED_ENV, e))?;
    }

    let settings = settings.normalized();
    let key = match lookup(JWT_KEY_ENV).filter(|v| !v.is_empty()) {
        Some(key) => Some(parse_key(&key, &settings.allowed_algorithms)?),
        None => None,
    };
    Ok(AuthSettings { key, ..settings })
}

fn parse_flag(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

fn source_name(value: &str) -> Option<String> {
    match value.trim() {
        "" => None,
        v if v.eq_ignore_ascii_case("false") || v.eq_ignore_ascii_case("none") || v == "0" => None,
        v => Some(v.to_string()),
    }
}

fn parse_algorithms(value: &str) -> Result<Vec<Algorithm>, ConfigError> {
    value
        .split(',')
        .map(str::trim)
        .filter(|alg| !alg.is_empty())
        .map(|alg| {
            Algorithm::from_str(alg)
                .map_err(|_| ConfigError::invalid(JWT_ALGORITHMS_ENV, format!("unknown algorithm '{alg}'")))
        })
        .collect()
}

/// A JSON key set, a PEM public key, or a shared secret.
///
/// The PEM flavour follows the family of the first accepted algorithm.
fn parse_key(value: &str, algorithms: &[Algorithm]) -> Result<VerificationKey, ConfigError> {
    let trimmed = value.trim_start();
    if trimmed.starts_with('{') {
        return serde_json::from_str(trimmed)
            .map_err(|e| ConfigError::invalid(JWT_KEY_ENV, e.to_string()));
    }
    if !trimmed.starts_with("-----BEGIN") {
        return Ok(VerificationKey::secret(value));
    }

    let pem = value.as_bytes().to_vec();
    let material = match algorithms.first() {
        Some(
            Algorithm::RS256
            | Algorithm::RS384
            | Algorithm::RS512
            | Algorithm::PS256
            | Algorithm::PS384
            | Algorithm::PS512,
        ) => KeyMaterial::RsaPem(pem),
        Some(Algorithm::ES256 | Algorithm::ES384) => KeyMaterial::EcPem(pem),
        Some(Algorithm::EdDSA) => KeyMaterial::EdPem(pem),
        _ => {
            return Err(ConfigError::invalid(
                JWT_KEY_ENV,
                "PEM key requires an asymmetric algorithm in JWT_ALGORITHMS",
            ))
        }
    };
    Ok(VerificationKey::Single(material))
}
