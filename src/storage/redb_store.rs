// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Embedded identity store backed by redb (pure Rust, ACID).
//!
//! ## Table Layout
//!
//! One table per entity (`Users`, `Groups`, ...): primary key (`id` as
//! text) → serialized record (JSON bytes).

use std::path::Path;

use redb::{Database, ReadTransaction, ReadableDatabase, ReadableTable, TableDefinition, TableError};

use super::{
    attach_related, matches, scalar_text, IdentityStore, Lookup, Record, StoreError, StoreResult,
    PRIMARY_KEY,
};

fn table(entity: &str) -> TableDefinition<'_, &'static str, &'static [u8]> {
    TableDefinition::new(entity)
}

/// Identity store persisted in a redb database file.
pub struct RedbIdentityStore {
    db: Database,
}

impl RedbIdentityStore {
    /// Open (or create) the database at the given path.
    pub fn open(path: &Path) -> StoreResult<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let db = Database::create(path)?;
        Ok(Self { db })
    }

    /// Insert or replace a record, keyed by its `id` field.
    pub fn upsert(&self, entity: &str, record: &Record) -> StoreResult<()> {
        let id = record
            .get(PRIMARY_KEY)
            .and_then(scalar_text)
            .ok_or(StoreError::MissingPrimaryKey)?;
        let json = serde_json::to_vec(record)?;

        let write_txn = self.db.begin_write()?;
        {
            let mut records = write_txn.open_table(table(entity))?;
            records.insert(id.as_str(), json.as_slice())?;
        }
        write_txn.commit()?;
        Ok(())
    }

    /// Look up a record by primary key.
    pub fn get(&self, entity: &str, id: &str) -> StoreResult<Option<Record>> {
        let read_txn = self.db.begin_read()?;
        Self::get_in(&read_txn, entity, id)
    }

    fn get_in(read_txn: &ReadTransaction, entity: &str, id: &str) -> StoreResult<Option<Record>> {
        let records = match read_txn.open_table(table(entity)) {
            Ok(records) => records,
            Err(TableError::TableDoesNotExist(_)) => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        match records.get(id)? {
            Some(value) => Ok(Some(serde_json::from_slice(value.value())?)),
            None => Ok(None),
        }
    }

    fn scan_in(read_txn: &ReadTransaction, lookup: &Lookup<'_>) -> StoreResult<Option<Record>> {
        let records = match read_txn.open_table(table(lookup.entity)) {
            Ok(records) => records,
            Err(TableError::TableDoesNotExist(_)) => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        for entry in records.iter()? {
            let (_, value) = entry?;
            let record: Record = serde_json::from_slice(value.value())?;
            if matches(&record, lookup) {
                return Ok(Some(record));
            }
        }
        Ok(None)
    }
}

impl IdentityStore for RedbIdentityStore {
    fn find_one_by(&self, lookup: &Lookup<'_>) -> Result<Option<Record>, StoreError> {
        let read_txn = self.db.begin_read()?;

        // Primary key lookups avoid the scan
        let found = if lookup.field == PRIMARY_KEY {
            Self::get_in(&read_txn, lookup.entity, lookup.value)?
                .filter(|record| matches(record, lookup))
        } else {
            Self::scan_in(&read_txn, lookup)?
        };

        let Some(mut record) = found else {
            return Ok(None);
        };
        attach_related(&mut record, lookup.contain, |entity, id| {
            Self::get_in(&read_txn, entity, id)
        })?;
        Ok(Some(record))
    }
}
