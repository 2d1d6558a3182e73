//! Filter engine
//!
//! Applies a free-text search plus per-field constraints to a record
//! sequence. Filtering is pure: the same records and criteria always yield
//! the same rows, in their original order.

use fcst_record::{EntitySchema, FieldName, Record, Scalar};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Search term plus field constraints
///
/// Empty search text and `Null` or blank constraint values impose no
/// constraint.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FilterCriteria {
    search: String,
    fields: IndexMap<FieldName, Scalar>,
}

impl FilterCriteria {
    /// Create empty criteria
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the free-text search term
    #[inline]
    #[must_use]
    pub fn with_search(mut self, term: impl Into<String>) -> Self {
        self.search = term.into();
        self
    }

    /// Add a field constraint
    #[inline]
    #[must_use]
    pub fn with_field(mut self, field: impl Into<FieldName>, value: impl Into<Scalar>) -> Self {
        self.set_field(field, value);
        self
    }

    /// Replace the search term
    pub fn set_search(&mut self, term: impl Into<String>) {
        self.search = term.into();
    }

    /// Set or clear a field constraint. A blank value clears it.
    pub fn set_field(&mut self, field: impl Into<FieldName>, value: impl Into<Scalar>) {
        let field = field.into();
        let value = value.into();
        if value.is_blank() {
            self.fields.shift_remove(&field);
        } else {
            self.fields.insert(field, value);
        }
    }

    /// Drop a field constraint
    pub fn clear_field(&mut self, field: &str) {
        self.fields.shift_remove(field);
    }

    /// Drop every constraint and the search term
    pub fn clear(&mut self) {
        self.search.clear();
        self.fields.clear();
    }

    /// Search term as entered
    #[inline]
    #[must_use]
    pub fn search(&self) -> &str {
        &self.search
    }

    /// Trimmed search term, if any
    #[must_use]
    pub fn search_term(&self) -> Option<&str> {
        let term = self.search.trim();
        (!term.is_empty()).then_some(term)
    }

    /// Field constraints in insertion order
    pub fn fields(&self) -> impl Iterator<Item = (&FieldName, &Scalar)> {
        self.fields.iter()
    }

    /// Constraint on one field
    #[inline]
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&Scalar> {
        self.fields.get(name)
    }

    /// Check whether the criteria constrain nothing
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.search_term().is_none() && self.fields.values().all(Scalar::is_blank)
    }
}

enum Constraint<'c> {
    Exact(&'c Scalar),
    Partial(String),
}

struct Compiled<'c> {
    search: Option<String>,
    fields: Vec<(&'c FieldName, Constraint<'c>)>,
}

/// Filter engine bound to one entity schema
#[derive(Debug, Clone)]
pub struct FilterEngine {
    schema: Arc<EntitySchema>,
}

impl FilterEngine {
    /// Create an engine for a schema
    #[inline]
    #[must_use]
    pub fn new(schema: Arc<EntitySchema>) -> Self {
        Self { schema }
    }

    /// Schema the engine filters against
    #[inline]
    #[must_use]
    pub fn schema(&self) -> &Arc<EntitySchema> {
        &self.schema
    }

    /// Records matching every constraint, in input order
    pub fn apply<'r>(
        &self,
        records: impl IntoIterator<Item = &'r Record>,
        criteria: &FilterCriteria,
    ) -> Vec<&'r Record> {
        let compiled = self.compile(criteria);
        records
            .into_iter()
            .filter(|record| self.matches_compiled(record, &compiled))
            .collect()
    }

    /// Check a single record
    #[must_use]
    pub fn matches(&self, record: &Record, criteria: &FilterCriteria) -> bool {
        let compiled = self.compile(criteria);
        self.matches_compiled(record, &compiled)
    }

    fn compile<'c>(&self, criteria: &'c FilterCriteria) -> Compiled<'c> {
        let search = criteria.search_term().map(str::to_lowercase);
        let mut fields = Vec::with_capacity(criteria.fields.len());
        for (field, expected) in &criteria.fields {
            if expected.is_blank() {
                continue;
            }
            if !self.schema.contains(field.as_str()) {
                tracing::debug!(
                    entity = self.schema.name(),
                    field = %field,
                    "ignoring filter on unknown field"
                );
                continue;
            }
            let constraint = if self.schema.is_partial_match(field.as_str()) {
                Constraint::Partial(expected.to_string().to_lowercase())
            } else {
                Constraint::Exact(expected)
            };
            fields.push((field, constraint));
        }
        Compiled { search, fields }
    }

    fn matches_compiled(&self, record: &Record, compiled: &Compiled<'_>) -> bool {
        if let Some(term) = &compiled.search {
            let hit = self
                .schema
                .search_fields()
                .iter()
                .any(|field| record.value(field.as_str()).contains_lowercase(term));
            if !hit {
                return false;
            }
        }

        compiled.fields.iter().all(|(field, constraint)| {
            let actual = record.value(field.as_str());
            match constraint {
                Constraint::Exact(expected) => actual.matches_exact(expected),
                Constraint::Partial(needle) => actual.contains_lowercase(needle),
            }
        })
    }
}
