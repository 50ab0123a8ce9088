// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Authenticator configuration.
//!
//! | Option | Meaning | Default |
//! |--------|---------|---------|
//! | `header` | Header carrying `<prefix> <token>` | `authorization` |
//! | `prefix` | Token prefix, ASCII case-insensitive | `bearer` |
//! | `cookie` | Cookie name, `None` disables | disabled |
//! | `query_param` | Query parameter name, `None` disables | `token` |
//! | `allowed_algorithms` | Accepted signature algorithms | `[HS256]` |
//! | `query_datastore` | Resolve `sub` through the identity store | `true` |
//! | `key` | Verification key; falls back to the app secret | unset |
//! | `user_model` | Entity the identity lives in | `Users` |
//! | `identity_field` | Field matched against `sub` | `id` |
//! | `secret_field` | Field removed from looked-up records | `password` |
//! | `scope` | Extra equality conditions for the lookup | none |
//! | `contain` | Related entities attached to the record | none |
//! | `unauthenticated` | Failure raised for unauthenticated access, `None` disables | `unauthorized` |
//!
//! Unknown options are ignored when deserializing.

use jsonwebtoken::Algorithm;
use serde::{Deserialize, Deserializer};
use serde_json::{Map, Value};

use super::error::FailureKind;
use super::keys::VerificationKey;

pub const DEFAULT_HEADER: &str = "authorization";
pub const DEFAULT_PREFIX: &str = "bearer";
pub const DEFAULT_QUERY_PARAM: &str = "token";
pub const DEFAULT_USER_MODEL: &str = "Users";
pub const DEFAULT_IDENTITY_FIELD: &str = "id";
pub const DEFAULT_SECRET_FIELD: &str = "password";

/// Configuration of one authenticator.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct AuthSettings {
    pub header: String,
    pub prefix: String,
    #[serde(deserialize_with = "source_name")]
    pub cookie: Option<String>,
    #[serde(alias = "parameter", deserialize_with = "source_name")]
    pub query_param: Option<String>,
    #[serde(alias = "allowed_algs")]
    pub allowed_algorithms: Vec<Algorithm>,
    #[serde(alias = "query_datasource")]
    pub query_datastore: bool,
    pub key: Option<VerificationKey>,
    pub user_model: String,
    pub identity_field: String,
    pub secret_field: String,
    pub scope: Map<String, Value>,
    pub contain: Vec<String>,
    #[serde(deserialize_with = "failure_kind")]
    pub unauthenticated: Option<FailureKind>,
}

impl Default for AuthSettings {
    fn default() -> Self {
        Self {
            header: DEFAULT_HEADER.to_string(),
            prefix: DEFAULT_PREFIX.to_string(),
            cookie: None,
            query_param: Some(DEFAULT_QUERY_PARAM.to_string()),
            allowed_algorithms: vec![Algorithm::HS256],
            query_datastore: true,
            key: None,
            user_model: DEFAULT_USER_MODEL.to_string(),
            identity_field: DEFAULT_IDENTITY_FIELD.to_string(),
            secret_field: DEFAULT_SECRET_FIELD.to_string(),
            scope: Map::new(),
            contain: Vec::new(),
            unauthenticated: Some(FailureKind::Unauthorized),
        }
    }
}

impl AuthSettings {
    /// Fill in derived defaults.
    ///
    /// An empty algorithm list becomes `[HS256]`; duplicates are dropped
    /// keeping the first occurrence.
    pub fn normalized(mut self) -> Self {
        let mut algorithms = Vec::with_capacity(self.allowed_algorithms.len());
        for alg in self.allowed_algorithms {
            if !algorithms.contains(&alg) {
                algorithms.push(alg);
            }
        }
        if algorithms.is_empty() {
            algorithms.push(Algorithm::HS256);
        }
        self.allowed_algorithms = algorithms;
        self.cookie = self.cookie.filter(|name| !name.is_empty());
        self.query_param = self.query_param.filter(|name| !name.is_empty());
        self
    }

    pub fn with_cookie(mut self, name: impl Into<String>) -> Self {
        self.cookie = Some(name.into());
        self
    }

    pub fn with_query_param(mut self, name: Option<&str>) -> Self {
        self.query_param = name.map(str::to_string);
        self
    }

    pub fn with_key(mut self, key: impl Into<VerificationKey>) -> Self {
        self.key = Some(key.into());
        self
    }

    pub fn with_algorithms(mut self, algorithms: impl IntoIterator<Item = Algorithm>) -> Self {
        self.allowed_algorithms = algorithms.into_iter().collect();
        self
    }

    pub fn with_query_datastore(mut self, enabled: bool) -> Self {
        self.query_datastore = enabled;
        self
    }

    pub fn with_unauthenticated(mut self, kind: Option<FailureKind>) -> Self {
        self.unauthenticated = kind;
        self
    }
}

/// Accept a name, or `false`/`null`/`""` for a disabled source.
fn source_name<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(name) if !name.is_empty() => Some(name),
        _ => None,
    })
}

/// Accept a failure kind name, or `false`/`null` for "do nothing".
fn failure_kind<'de, D>(deserializer: D) -> Result<Option<FailureKind>, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(name) => FailureKind::parse(&name).map_err(serde::de::Error::custom),
        Value::Bool(true) => Ok(Some(FailureKind::Unauthorized)),
        _ => Ok(None),
    }
}
