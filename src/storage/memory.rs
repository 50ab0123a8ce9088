// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! In-memory identity store.

use std::collections::HashMap;
use std::sync::RwLock;

use super::{
    attach_related, matches, scalar_text, IdentityStore, Lookup, Record, StoreError, StoreResult,
    PRIMARY_KEY,
};

/// Identity store backed by process memory.
#[derive(Debug, Default)]
pub struct MemoryIdentityStore {
    entities: RwLock<HashMap<String, Vec<Record>>>,
}

impl MemoryIdentityStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a record, replacing any record of the entity with the same `id`.
    pub fn insert(&self, entity: &str, record: Record) -> StoreResult<()> {
        let id = record
            .get(PRIMARY_KEY)
            .and_then(scalar_text)
            .ok_or(StoreError::MissingPrimaryKey)?;

        let mut entities = self
            .entities
            .write()
            .map_err(|_| StoreError::Unavailable("memory store lock poisoned".to_string()))?;
        let records = entities.entry(entity.to_string()).or_default();
        records.retain(|r| {
            r.get(PRIMARY_KEY).and_then(scalar_text).as_deref() != Some(id.as_str())
        });
        records.push(record);
        Ok(())
    }

    pub fn with_record(self, entity: &str, record: Record) -> StoreResult<Self> {
        self.insert(entity, record)?;
        Ok(self)
    }

    fn by_id(entities: &HashMap<String, Vec<Record>>, entity: &str, id: &str) -> Option<Record> {
        entities
            .get(entity)?
            .iter()
            .find(|r| r.get(PRIMARY_KEY).and_then(scalar_text).as_deref() == Some(id))
            .cloned()
    }
}

impl IdentityStore for MemoryIdentityStore {
    fn find_one_by(&self, lookup: &Lookup<'_>) -> Result<Option<Record>, StoreError> {
        let entities = self
            .entities
            .read()
            .map_err(|_| StoreError::Unavailable("memory store lock poisoned".to_string()))?;

        let Some(mut record) = entities
            .get(lookup.entity)
            .and_then(|records| records.iter().find(|r| matches(r, lookup)))
            .cloned()
        else {
            return Ok(None);
        };

        attach_related(&mut record, lookup.contain, |entity, id| {
            Ok(Self::by_id(&entities, entity, id))
        })?;
        Ok(Some(record))
    }
}
