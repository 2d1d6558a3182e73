//! Entity schemas
//!
//! An [`EntitySchema`] describes one kind of grid row: its fields and their
//! kinds, which fields free-text search looks at, which field filters match
//! by substring, how columns are grouped for bulk toggling, the default
//! column set, and the summary metrics shown above the grid.
//!
//! The filter, column, edit and aggregate code is written once against this
//! description instead of once per page.

use crate::error::{RecordError, SchemaError};
use crate::field::{FieldKind, FieldName, FieldSpec};
use crate::scalar::Scalar;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Named set of columns toggled together
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnGroup {
    /// Group identifier
    pub name: String,
    /// Display label
    pub label: String,
    /// Member fields, in display order
    pub fields: Vec<FieldName>,
}

impl ColumnGroup {
    /// Check membership
    #[inline]
    #[must_use]
    pub fn contains(&self, field: &str) -> bool {
        self.fields.iter().any(|f| f.as_str() == field)
    }
}

/// How a summary metric is computed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricKind {
    /// Sum of a field
    Sum(FieldName),
    /// Arithmetic mean of a field
    Mean(FieldName),
    /// Number of rows
    Count,
    /// Number of rows whose field equals a value
    CountWhere {
        /// Field compared
        field: FieldName,
        /// Expected value
        value: Scalar,
    },
    /// `sum(numerator) / sum(denominator)`, optionally as a percentage
    Ratio {
        /// Numerator field
        numerator: FieldName,
        /// Denominator field
        denominator: FieldName,
        /// Multiply by 100
        percent: bool,
    },
    /// Mean over every (row, field) pair, e.g. average monthly sales
    MeanAcross(Vec<FieldName>),
}

impl MetricKind {
    /// Fields the metric reads
    #[must_use]
    pub fn fields(&self) -> Vec<&FieldName> {
        match self {
            Self::Sum(f) | Self::Mean(f) | Self::CountWhere { field: f, .. } => vec![f],
            Self::Count => Vec::new(),
            Self::Ratio {
                numerator,
                denominator,
                ..
            } => vec![numerator, denominator],
            Self::MeanAcross(fields) => fields.iter().collect(),
        }
    }
}

/// Named summary metric
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricSpec {
    /// Metric name as shown in the summary bar
    pub name: String,
    /// Computation
    pub kind: MetricKind,
}

/// Schema of one grid entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntitySchema {
    name: String,
    key_field: FieldName,
    fields: IndexMap<FieldName, FieldSpec>,
    search_fields: Vec<FieldName>,
    partial_match_fields: Vec<FieldName>,
    column_groups: Vec<ColumnGroup>,
    default_columns: Vec<FieldName>,
    metrics: Vec<MetricSpec>,
}

impl EntitySchema {
    /// Start building a schema
    #[inline]
    #[must_use]
    pub fn builder(name: impl Into<String>) -> EntitySchemaBuilder {
        EntitySchemaBuilder::new(name)
    }

    /// Entity name
    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Name under which the record key is serialized
    #[inline]
    #[must_use]
    pub fn key_field(&self) -> &FieldName {
        &self.key_field
    }

    /// Field specs in declaration order
    pub fn fields(&self) -> impl Iterator<Item = &FieldSpec> {
        self.fields.values()
    }

    /// Field names in declaration order
    pub fn field_names(&self) -> impl Iterator<Item = &FieldName> {
        self.fields.keys()
    }

    /// Look up a field
    #[inline]
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.get(name)
    }

    /// Check whether a field is declared
    #[inline]
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    /// Position of a field in declaration order
    #[inline]
    #[must_use]
    pub fn position(&self, name: &str) -> Option<usize> {
        self.fields.get_index_of(name)
    }

    /// Editable fields in declaration order
    pub fn editable_fields(&self) -> impl Iterator<Item = &FieldSpec> {
        self.fields.values().filter(|f| f.is_editable())
    }

    /// Fields consulted by free-text search
    #[inline]
    #[must_use]
    pub fn search_fields(&self) -> &[FieldName] {
        &self.search_fields
    }

    /// Fields whose filters match by case-insensitive substring
    #[inline]
    #[must_use]
    pub fn partial_match_fields(&self) -> &[FieldName] {
        &self.partial_match_fields
    }

    /// Check whether a field filter matches by substring
    #[inline]
    #[must_use]
    pub fn is_partial_match(&self, field: &str) -> bool {
        self.partial_match_fields.iter().any(|f| f.as_str() == field)
    }

    /// Column groups in display order
    #[inline]
    #[must_use]
    pub fn column_groups(&self) -> &[ColumnGroup] {
        &self.column_groups
    }

    /// Look up a column group by name
    #[must_use]
    pub fn column_group(&self, name: &str) -> Option<&ColumnGroup> {
        self.column_groups.iter().find(|g| g.name == name)
    }

    /// The group a field belongs to, if any
    #[must_use]
    pub fn group_of(&self, field: &str) -> Option<&ColumnGroup> {
        self.column_groups.iter().find(|g| g.contains(field))
    }

    /// Columns shown after a reset
    #[inline]
    #[must_use]
    pub fn default_columns(&self) -> &[FieldName] {
        &self.default_columns
    }

    /// Summary metrics
    #[inline]
    #[must_use]
    pub fn metrics(&self) -> &[MetricSpec] {
        &self.metrics
    }

    /// Check that a value may be stored in a field
    ///
    /// # Errors
    /// - `RecordError::KeyFieldImmutable` for the key field
    /// - `RecordError::UnknownField` for undeclared fields
    /// - `RecordError::TypeMismatch` if the value does not fit the field kind
    pub fn check_value(&self, field: &FieldName, value: &Scalar) -> Result<(), RecordError> {
        if field == &self.key_field {
            return Err(RecordError::KeyFieldImmutable(field.clone()));
        }
        let spec = self.field(field.as_str()).ok_or_else(|| RecordError::UnknownField {
            entity: self.name.clone(),
            field: field.clone(),
        })?;
        if spec.value_kind.accepts(value) {
            Ok(())
        } else {
            Err(RecordError::TypeMismatch {
                field: field.clone(),
                expected: spec.value_kind.name(),
                actual: value.kind_name(),
            })
        }
    }
}

/// Builder for [`EntitySchema`]
#[derive(Debug, Clone)]
pub struct EntitySchemaBuilder {
    name: String,
    key_field: FieldName,
    fields: Vec<FieldSpec>,
    search_fields: Vec<FieldName>,
    partial_match_fields: Vec<FieldName>,
    column_groups: Vec<ColumnGroup>,
    default_columns: Option<Vec<FieldName>>,
    metrics: Vec<MetricSpec>,
}

impl EntitySchemaBuilder {
    fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            key_field: FieldName::from("key"),
            fields: Vec::new(),
            search_fields: Vec::new(),
            partial_match_fields: Vec::new(),
            column_groups: Vec::new(),
            default_columns: None,
            metrics: Vec::new(),
        }
    }

    /// Override the key field name (default `key`)
    #[must_use]
    pub fn key_field(mut self, name: &str) -> Self {
        self.key_field = FieldName::from(name);
        self
    }

    /// Declare a field
    #[must_use]
    pub fn field(mut self, spec: FieldSpec) -> Self {
        self.fields.push(spec);
        self
    }

    /// Declare several fields
    #[must_use]
    pub fn fields(mut self, specs: impl IntoIterator<Item = FieldSpec>) -> Self {
        self.fields.extend(specs);
        self
    }

    /// Fields consulted by free-text search
    #[must_use]
    pub fn search(mut self, fields: &[&str]) -> Self {
        self.search_fields = fields.iter().map(|f| FieldName::from(*f)).collect();
        self
    }

    /// Fields whose filters match by substring (at most two)
    #[must_use]
    pub fn partial_match(mut self, fields: &[&str]) -> Self {
        self.partial_match_fields = fields.iter().map(|f| FieldName::from(*f)).collect();
        self
    }

    /// Add a column group
    #[must_use]
    pub fn group(mut self, name: &str, label: &str, fields: &[&str]) -> Self {
        self.column_groups.push(ColumnGroup {
            name: name.to_string(),
            label: label.to_string(),
            fields: fields.iter().map(|f| FieldName::from(*f)).collect(),
        });
        self
    }

    /// Columns shown after a reset. Defaults to identity and editable fields.
    #[must_use]
    pub fn default_columns(mut self, fields: &[&str]) -> Self {
        self.default_columns = Some(fields.iter().map(|f| FieldName::from(*f)).collect());
        self
    }

    /// Add a summary metric
    #[must_use]
    pub fn metric(mut self, name: &str, kind: MetricKind) -> Self {
        self.metrics.push(MetricSpec {
            name: name.to_string(),
            kind,
        });
        self
    }

    /// Validate and build
    ///
    /// # Errors
    /// - `SchemaError::DuplicateField` if a field (or the key field) repeats
    /// - `SchemaError::UnknownField` if any reference names an undeclared field
    /// - `SchemaError::FieldInMultipleGroups` if column groups overlap
    /// - `SchemaError::TooManyPartialFields` for more than two substring fields
    pub fn build(self) -> Result<EntitySchema, SchemaError> {
        let mut fields = IndexMap::with_capacity(self.fields.len());
        for spec in self.fields {
            if spec.name == self.key_field || fields.contains_key(&spec.name) {
                return Err(SchemaError::DuplicateField(spec.name));
            }
            fields.insert(spec.name.clone(), spec);
        }

        let require = |context: &'static str, field: &FieldName| {
            if fields.contains_key(field) {
                Ok(())
            } else {
                Err(SchemaError::UnknownField {
                    context,
                    field: field.clone(),
                })
            }
        };

        for field in &self.search_fields {
            require("search", field)?;
        }

        if self.partial_match_fields.len() > 2 {
            return Err(SchemaError::TooManyPartialFields(
                self.partial_match_fields.len(),
            ));
        }
        for field in &self.partial_match_fields {
            require("partial match", field)?;
        }

        let mut owner: HashMap<&FieldName, &str> = HashMap::new();
        for group in &self.column_groups {
            for field in &group.fields {
                require("column group", field)?;
                if let Some(first) = owner.insert(field, &group.name) {
                    return Err(SchemaError::FieldInMultipleGroups {
                        field: field.clone(),
                        first: first.to_string(),
                        second: group.name.clone(),
                    });
                }
            }
        }

        for metric in &self.metrics {
            for field in metric.kind.fields() {
                require("metric", field)?;
            }
        }

        let default_columns = match self.default_columns {
            Some(columns) => {
                for field in &columns {
                    require("default columns", field)?;
                }
                columns
            }
            None => fields
                .values()
                .filter(|f: &&FieldSpec| f.kind != FieldKind::Derived)
                .map(|f| f.name.clone())
                .collect(),
        };

        Ok(EntitySchema {
            name: self.name,
            key_field: self.key_field,
            fields,
            search_fields: self.search_fields,
            partial_match_fields: self.partial_match_fields,
            column_groups: self.column_groups,
            default_columns,
            metrics: self.metrics,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> EntitySchemaBuilder {
        EntitySchema::builder("sample")
            .field(FieldSpec::identity("category", "Category"))
            .field(FieldSpec::identity("pn", "PN"))
            .field(FieldSpec::editable("amount", "Amount"))
            .field(FieldSpec::derived("corrected", "Corrected"))
    }

    #[test]
    fn default_columns_are_identity_and_editable() {
        let schema = base().build().unwrap();
        let defaults: Vec<&str> = schema.default_columns().iter().map(FieldName::as_str).collect();
        assert_eq!(defaults, vec!["category", "pn", "amount"]);
    }

    #[test]
    fn duplicate_field_rejected() {
        let err = base()
            .field(FieldSpec::editable("amount", "Again"))
            .build()
            .unwrap_err();
        assert_eq!(err, SchemaError::DuplicateField(FieldName::from("amount")));
    }

    #[test]
    fn key_field_cannot_be_declared() {
        let err = base()
            .field(FieldSpec::identity("key", "Key"))
            .build()
            .unwrap_err();
        assert!(matches!(err, SchemaError::DuplicateField(_)));
    }

    #[test]
    fn overlapping_groups_rejected() {
        let err = base()
            .group("basic", "Basic", &["category", "pn"])
            .group("codes", "Codes", &["pn"])
            .build()
            .unwrap_err();
        assert!(matches!(err, SchemaError::FieldInMultipleGroups { .. }));
    }

    #[test]
    fn unknown_references_rejected() {
        assert!(matches!(
            base().search(&["nope"]).build(),
            Err(SchemaError::UnknownField { context: "search", .. })
        ));
        assert!(matches!(
            base().metric("total", MetricKind::Sum(FieldName::from("nope"))).build(),
            Err(SchemaError::UnknownField { context: "metric", .. })
        ));
    }

    #[test]
    fn at_most_two_partial_fields() {
        let err = base()
            .partial_match(&["category", "pn", "amount"])
            .build()
            .unwrap_err();
        assert_eq!(err, SchemaError::TooManyPartialFields(3));
    }

    #[test]
    fn check_value_guards_kind_and_key() {
        let schema = base().build().unwrap();
        assert!(schema
            .check_value(&FieldName::from("amount"), &Scalar::Number(1.0))
            .is_ok());
        assert!(matches!(
            schema.check_value(&FieldName::from("amount"), &Scalar::text("x")),
            Err(RecordError::TypeMismatch { .. })
        ));
        assert!(matches!(
            schema.check_value(&FieldName::from("key"), &Scalar::text("x")),
            Err(RecordError::KeyFieldImmutable(_))
        ));
        assert!(matches!(
            schema.check_value(&FieldName::from("ghost"), &Scalar::Null),
            Err(RecordError::UnknownField { .. })
        ));
    }
}
