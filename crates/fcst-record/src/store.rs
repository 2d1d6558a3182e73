//! In-memory record store
//!
//! One [`RecordStore`] is owned by each grid view. It keeps records in
//! insertion order, guarantees key uniqueness for its whole lifetime, and
//! funnels every field mutation through [`EditPatch`].

use crate::error::RecordError;
use crate::record::{EditPatch, Record, RecordKey};
use crate::scalar::Scalar;
use crate::schema::EntitySchema;
use indexmap::IndexMap;
use std::sync::Arc;

/// Outcome of [`RecordStore::merge`]
#[derive(Debug, Default, Clone, PartialEq)]
pub struct MergeReport {
    /// Keys added to the store
    pub inserted: Vec<RecordKey>,
    /// Keys whose fields were overwritten
    pub updated: Vec<RecordKey>,
    /// Records refused by schema validation
    pub rejected: Vec<(RecordKey, RecordError)>,
}

impl MergeReport {
    /// Number of records accepted
    #[inline]
    #[must_use]
    pub fn accepted(&self) -> usize {
        self.inserted.len() + self.updated.len()
    }
}

/// Ordered, key-unique collection of records for one entity
#[derive(Debug, Clone)]
pub struct RecordStore {
    schema: Arc<EntitySchema>,
    records: IndexMap<RecordKey, Record>,
    revision: u64,
}

impl RecordStore {
    /// Create an empty store
    #[inline]
    #[must_use]
    pub fn new(schema: Arc<EntitySchema>) -> Self {
        Self {
            schema,
            records: IndexMap::new(),
            revision: 0,
        }
    }

    /// Create a store from an initial batch
    ///
    /// # Errors
    /// - `RecordError::DuplicateKey` if two records share a key
    /// - Any validation error from [`Record::validate`]
    pub fn from_records(
        schema: Arc<EntitySchema>,
        records: impl IntoIterator<Item = Record>,
    ) -> Result<Self, RecordError> {
        let mut store = Self::new(schema);
        for record in records {
            store.insert(record)?;
        }
        tracing::debug!(
            entity = store.schema.name(),
            count = store.len(),
            "record store initialized"
        );
        Ok(store)
    }

    /// Entity schema
    #[inline]
    #[must_use]
    pub fn schema(&self) -> &Arc<EntitySchema> {
        &self.schema
    }

    /// Number of records
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Check for an empty store
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Mutation counter, bumped on every successful change
    #[inline]
    #[must_use]
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Look up a record
    #[inline]
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Record> {
        self.records.get(key)
    }

    /// Check for a key
    #[inline]
    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.records.contains_key(key)
    }

    /// Records in insertion order
    pub fn iter(&self) -> impl ExactSizeIterator<Item = &Record> {
        self.records.values()
    }

    /// Records in insertion order, collected
    #[must_use]
    pub fn records(&self) -> Vec<&Record> {
        self.records.values().collect()
    }

    /// Add one record ("add row")
    ///
    /// # Errors
    /// - `RecordError::DuplicateKey` if the key is already present
    /// - Any validation error from [`Record::validate`]
    pub fn insert(&mut self, record: Record) -> Result<(), RecordError> {
        if self.records.contains_key(record.key()) {
            return Err(RecordError::DuplicateKey(record.key().clone()));
        }
        record.validate(&self.schema)?;
        tracing::trace!(entity = self.schema.name(), key = %record.key(), "insert record");
        self.records.insert(record.key().clone(), record);
        self.revision += 1;
        Ok(())
    }

    /// Delete a record, preserving the order of the rest
    ///
    /// # Errors
    /// - `RecordError::NotFound` if the key is absent
    pub fn remove(&mut self, key: &str) -> Result<Record, RecordError> {
        let record = self
            .records
            .shift_remove(key)
            .ok_or_else(|| RecordError::NotFound(RecordKey::from(key)))?;
        tracing::debug!(entity = self.schema.name(), key, "removed record");
        self.revision += 1;
        Ok(record)
    }

    /// Apply a single-field patch, returning the previous value.
    ///
    /// Only the named field of the named record changes.
    ///
    /// # Errors
    /// - `RecordError::NotFound` if the record is absent
    /// - `RecordError::KeyFieldImmutable`, `UnknownField` or `TypeMismatch`
    ///   from schema validation
    pub fn apply_patch(&mut self, patch: &EditPatch) -> Result<Scalar, RecordError> {
        self.schema.check_value(&patch.field, &patch.value)?;
        let record = self
            .records
            .get_mut(&patch.key)
            .ok_or_else(|| RecordError::NotFound(patch.key.clone()))?;
        let previous = record.set(patch.field.clone(), patch.value.clone());
        tracing::trace!(
            entity = self.schema.name(),
            key = %patch.key,
            field = %patch.field,
            "patched record"
        );
        self.revision += 1;
        Ok(previous)
    }

    /// Upsert records by key, as after an import.
    ///
    /// New keys are appended; existing records have the incoming fields
    /// written over theirs. Invalid records are reported, not applied.
    pub fn merge(&mut self, records: impl IntoIterator<Item = Record>) -> MergeReport {
        let mut report = MergeReport::default();
        for record in records {
            let key = record.key().clone();
            if let Err(e) = record.validate(&self.schema) {
                report.rejected.push((key, e));
                continue;
            }
            if let Some(existing) = self.records.get_mut(&key) {
                existing.overlay(record);
                report.updated.push(key);
            } else {
                self.records.insert(key.clone(), record);
                report.inserted.push(key);
            }
        }
        if report.accepted() > 0 {
            self.revision += 1;
        }
        tracing::debug!(
            entity = self.schema.name(),
            inserted = report.inserted.len(),
            updated = report.updated.len(),
            rejected = report.rejected.len(),
            "merged records"
        );
        report
    }

    /// First record whose fields equal every given value
    #[must_use]
    pub fn find_by(&self, matches: &[(&str, &Scalar)]) -> Option<&Record> {
        self.records.values().find(|record| {
            matches
                .iter()
                .all(|(field, expected)| record.value(field) == *expected)
        })
    }
}
