// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Verified claims and the identity record handed to the application.

use serde::Serialize;
use serde_json::{Map, Value};
use utoipa::ToSchema;

/// Claim name → claim value of a verified token.
pub type Claims = Map<String, Value>;

/// Read the `sub` claim as a lookup key.
///
/// Strings are used as-is, numbers by their decimal text. `null` counts as
/// missing; any other value uses its JSON text.
pub fn subject(claims: &Claims) -> Option<String> {
    match claims.get("sub")? {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

/// The authenticated caller.
///
/// Either the verified claims themselves or a datastore record with the
/// secret field removed.
#[derive(Debug, Clone, PartialEq, Default, Serialize, ToSchema)]
#[serde(transparent)]
#[schema(value_type = Object)]
pub struct Identity(Map<String, Value>);

impl Identity {
    pub fn new(fields: Map<String, Value>) -> Self {
        Self(fields)
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }

    /// Drop `field`, returning whether it was present.
    pub(crate) fn strip(&mut self, field: &str) -> bool {
        self.0.remove(field).is_some()
    }
}

impl From<Map<String, Value>> for Identity {
    fn from(fields: Map<String, Value>) -> Self {
        Self(fields)
    }
}
