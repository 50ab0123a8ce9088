// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Identity Storage
//!
//! The authenticator looks identities up through [`IdentityStore`]: "find
//! one record of this entity whose field equals this value, matching these
//! extra conditions, with these related entities attached".
//!
//! ## Backends
//!
//! - [`MemoryIdentityStore`] - in-process, for tests and seeding
//! - [`RedbIdentityStore`] - embedded ACID database, one table per entity
//!
//! ## Matching Rules
//!
//! Field values compare by their string form, so a record with `"id": 1`
//! matches the lookup value `"1"`. Related entities follow the usual naming
//! convention: containing `Groups` reads the `group_id` field and attaches
//! the referenced record under `group`.

use serde_json::{Map, Value};

pub mod memory;
pub mod redb_store;

pub use memory::MemoryIdentityStore;
pub use redb_store::RedbIdentityStore;

/// One stored record: field name → value.
pub type Record = Map<String, Value>;

/// Primary key field of every entity.
pub const PRIMARY_KEY: &str = "id";

/// A single-record lookup.
#[derive(Debug, Clone, Copy)]
pub struct Lookup<'a> {
    pub entity: &'a str,
    pub field: &'a str,
    pub value: &'a str,
    pub conditions: &'a Map<String, Value>,
    pub contain: &'a [String],
}

/// Datastore collaborator used for identity lookups.
///
/// Calls are blocking and are not retried by the caller.
pub trait IdentityStore: Send + Sync {
    fn find_one_by(&self, lookup: &Lookup<'_>) -> Result<Option<Record>, StoreError>;
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("redb database error: {0}")]
    RedbDatabase(#[from] redb::DatabaseError),

    #[error("redb transaction error: {0}")]
    RedbTransaction(#[from] redb::TransactionError),

    #[error("redb table error: {0}")]
    RedbTable(#[from] redb::TableError),

    #[error("redb storage error: {0}")]
    RedbStorage(#[from] redb::StorageError),

    #[error("redb commit error: {0}")]
    RedbCommit(#[from] redb::CommitError),

    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("record has no '{PRIMARY_KEY}' field")]
    MissingPrimaryKey,

    #[error("store unavailable: {0}")]
    Unavailable(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// String form of a scalar field value. Objects and arrays have none.
pub(crate) fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

fn field_equals(record: &Record, field: &str, expected: &Value) -> bool {
    match record.get(field) {
        Some(actual) if actual == expected => true,
        Some(actual) => match (scalar_text(actual), scalar_text(expected)) {
            (Some(a), Some(b)) => a == b,
            _ => false,
        },
        None => expected.is_null(),
    }
}

/// Whether `record` satisfies the lookup field and every extra condition.
pub(crate) fn matches(record: &Record, lookup: &Lookup<'_>) -> bool {
    let key_matches = record
        .get(lookup.field)
        .and_then(scalar_text)
        .is_some_and(|text| text == lookup.value);

    key_matches
        && lookup
            .conditions
            .iter()
            .all(|(field, expected)| field_equals(record, field, expected))
}

/// Foreign key and attachment property for a contained entity.
///
/// `Groups` → (`group_id`, `group`).
pub(crate) fn association(entity: &str) -> (String, String) {
    let lower = entity.to_lowercase();
    let singular = lower.strip_suffix('s').unwrap_or(&lower).to_string();
    (format!("{singular}_id"), singular)
}

/// Attach every contained entity to `record`.
///
/// `find` loads a record of an entity by primary key. Records without the
/// foreign key, or whose target is missing, get nothing attached.
pub(crate) fn attach_related<F>(record: &mut Record, contain: &[String], mut find: F) -> StoreResult<()>
where
    F: FnMut(&str, &str) -> StoreResult<Option<Record>>,
{
    for entity in contain {
        let (foreign_key, property) = association(entity);
        let Some(id) = record.get(&foreign_key).and_then(scalar_text) else {
            continue;
        };
        if let Some(related) = find(entity, &id)? {
            record.insert(property, Value::Object(related));
        }
    }
    Ok(())
}
