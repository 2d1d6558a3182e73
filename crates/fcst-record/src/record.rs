//! Records, record keys and edit patches

use crate::error::RecordError;
use crate::field::FieldName;
use crate::scalar::Scalar;
use crate::schema::EntitySchema;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt::{self, Display, Formatter};

/// Partial set of field values, as sent to the persistence collaborator
pub type PartialFields = IndexMap<FieldName, Scalar>;

static NULL: Scalar = Scalar::Null;

/// Unique key of a record within its store
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordKey(String);

impl RecordKey {
    /// Create a key
    #[inline]
    #[must_use]
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// Borrow as `&str`
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for RecordKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Borrow<str> for RecordKey {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for RecordKey {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for RecordKey {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<usize> for RecordKey {
    fn from(n: usize) -> Self {
        Self(n.to_string())
    }
}

/// One row of a grid
///
/// The key lives beside the field map rather than inside it, so no patch can
/// change it. Field order follows insertion order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    key: RecordKey,
    fields: IndexMap<FieldName, Scalar>,
}

impl Record {
    /// Create an empty record
    #[inline]
    #[must_use]
    pub fn new(key: impl Into<RecordKey>) -> Self {
        Self {
            key: key.into(),
            fields: IndexMap::new(),
        }
    }

    /// Builder-style field assignment
    #[inline]
    #[must_use]
    pub fn with(mut self, field: impl Into<FieldName>, value: impl Into<Scalar>) -> Self {
        self.fields.insert(field.into(), value.into());
        self
    }

    /// Record key
    #[inline]
    #[must_use]
    pub fn key(&self) -> &RecordKey {
        &self.key
    }

    /// Field value, if present
    #[inline]
    #[must_use]
    pub fn get(&self, field: &str) -> Option<&Scalar> {
        self.fields.get(field)
    }

    /// Field value, or [`Scalar::Null`] when absent
    #[inline]
    #[must_use]
    pub fn value(&self, field: &str) -> &Scalar {
        self.fields.get(field).unwrap_or(&NULL)
    }

    /// Numeric value of a field; absent or non-numeric values count as zero
    #[inline]
    #[must_use]
    pub fn number(&self, field: &str) -> f64 {
        self.value(field).to_number().unwrap_or(0.0)
    }

    /// Iterate over fields in insertion order
    pub fn fields(&self) -> impl Iterator<Item = (&FieldName, &Scalar)> {
        self.fields.iter()
    }

    /// Number of fields held (the key is not counted)
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Check for a record without fields
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Overwrite one field, returning the previous value.
    ///
    /// Only the store calls this, through [`EditPatch`].
    pub(crate) fn set(&mut self, field: FieldName, value: Scalar) -> Scalar {
        self.fields.insert(field, value).unwrap_or_default()
    }

    /// Copy every field of `other` over this record
    pub(crate) fn overlay(&mut self, other: Record) {
        for (field, value) in other.fields {
            self.fields.insert(field, value);
        }
    }

    /// Check every field against the schema
    ///
    /// # Errors
    /// - `RecordError::UnknownField` for fields the schema does not declare
    /// - `RecordError::TypeMismatch` for values of the wrong kind
    pub fn validate(&self, schema: &EntitySchema) -> Result<(), RecordError> {
        for (field, value) in &self.fields {
            schema.check_value(field, value)?;
        }
        Ok(())
    }

    /// Build a record from a JSON object.
    ///
    /// The key is read from the schema's key field (string or number). Fields
    /// the schema does not declare are dropped, so payloads carrying extra
    /// server-side columns still load.
    ///
    /// # Errors
    /// - `RecordError::NotAnObject` if `value` is not an object
    /// - `RecordError::MissingKey` if the key field is absent or blank
    /// - `RecordError::TypeMismatch` for declared fields with wrong kinds
    pub fn from_json(schema: &EntitySchema, value: serde_json::Value) -> Result<Self, RecordError> {
        let serde_json::Value::Object(object) = value else {
            return Err(RecordError::NotAnObject);
        };

        let key_field = schema.key_field();
        let key = match object.get(key_field.as_str()) {
            Some(serde_json::Value::String(s)) if !s.trim().is_empty() => RecordKey::new(s.clone()),
            Some(serde_json::Value::Number(n)) => RecordKey::new(n.to_string()),
            _ => return Err(RecordError::MissingKey(key_field.clone())),
        };

        let mut record = Record::new(key);
        for spec in schema.fields() {
            let Some(raw) = object.get(spec.name.as_str()) else {
                continue;
            };
            let scalar = scalar_from_json(raw);
            schema.check_value(&spec.name, &scalar)?;
            record.fields.insert(spec.name.clone(), scalar);
        }
        Ok(record)
    }

    /// Render as a JSON object, key field first
    #[must_use]
    pub fn to_json(&self, schema: &EntitySchema) -> serde_json::Value {
        let mut object = serde_json::Map::new();
        object.insert(
            schema.key_field().to_string(),
            serde_json::Value::String(self.key.to_string()),
        );
        for (field, value) in &self.fields {
            let json = serde_json::to_value(value).unwrap_or(serde_json::Value::Null);
            object.insert(field.to_string(), json);
        }
        serde_json::Value::Object(object)
    }
}

fn scalar_from_json(value: &serde_json::Value) -> Scalar {
    match value {
        serde_json::Value::Bool(b) => Scalar::Bool(*b),
        serde_json::Value::Number(n) => n.as_f64().map_or(Scalar::Null, Scalar::Number),
        serde_json::Value::String(s) => Scalar::Text(s.clone()),
        serde_json::Value::Null | serde_json::Value::Array(_) | serde_json::Value::Object(_) => {
            Scalar::Null
        }
    }
}

/// Single-field change to a single record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EditPatch {
    /// Target record
    pub key: RecordKey,
    /// Target field
    pub field: FieldName,
    /// New value
    pub value: Scalar,
}

impl EditPatch {
    /// Create a patch
    #[inline]
    #[must_use]
    pub fn new(
        key: impl Into<RecordKey>,
        field: impl Into<FieldName>,
        value: impl Into<Scalar>,
    ) -> Self {
        Self {
            key: key.into(),
            field: field.into(),
            value: value.into(),
        }
    }

    /// The patch as a one-entry partial field set
    #[must_use]
    pub fn to_partial(&self) -> PartialFields {
        let mut fields = PartialFields::new();
        fields.insert(self.field.clone(), self.value.clone());
        fields
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities;
    use serde_json::json;

    #[test]
    fn missing_fields_read_as_null_and_zero() {
        let record = Record::new("1").with("amount", 10.0);
        assert_eq!(record.value("missing"), &Scalar::Null);
        assert_eq!(record.number("missing"), 0.0);
        assert_eq!(record.number("amount"), 10.0);
    }

    #[test]
    fn set_returns_previous_value() {
        let mut record = Record::new("1").with("amount", 10.0);
        let prev = record.set(FieldName::from("amount"), Scalar::Number(25.0));
        assert_eq!(prev, Scalar::Number(10.0));
        let prev = record.set(FieldName::from("fresh"), Scalar::Number(1.0));
        assert_eq!(prev, Scalar::Null);
    }

    #[test]
    fn from_json_reads_key_and_declared_fields() {
        let schema = entities::pdt_forecast().unwrap();
        let record = Record::from_json(
            &schema,
            json!({
                "key": "1",
                "cnCategory": "Chargers",
                "q3AchievedAmount": 2850000,
                "septemberForecast": 980000,
                "unrelated": "dropped"
            }),
        )
        .unwrap();

        assert_eq!(record.key().as_str(), "1");
        assert_eq!(record.value("cnCategory"), &Scalar::text("Chargers"));
        assert_eq!(record.number("q3AchievedAmount"), 2_850_000.0);
        assert!(record.get("unrelated").is_none());
    }

    #[test]
    fn from_json_accepts_numeric_key() {
        let schema = entities::pdt_forecast().unwrap();
        let record = Record::from_json(&schema, json!({ "key": 7 })).unwrap();
        assert_eq!(record.key().as_str(), "7");
    }

    #[test]
    fn from_json_rejects_missing_key_and_bad_types() {
        let schema = entities::pdt_forecast().unwrap();
        assert!(matches!(
            Record::from_json(&schema, json!({ "cnCategory": "x" })),
            Err(RecordError::MissingKey(_))
        ));
        assert!(matches!(
            Record::from_json(&schema, json!({ "key": "1", "septemberForecast": "lots" })),
            Err(RecordError::TypeMismatch { .. })
        ));
        assert!(matches!(
            Record::from_json(&schema, json!([1, 2])),
            Err(RecordError::NotAnObject)
        ));
    }

    #[test]
    fn to_json_puts_key_first() {
        let schema = entities::pdt_forecast().unwrap();
        let record = Record::new("3").with("cnCategory", "Cables");
        let value = record.to_json(&schema);
        let object = value.as_object().unwrap();
        assert_eq!(object.keys().next().map(String::as_str), Some("key"));
        assert_eq!(object["cnCategory"], json!("Cables"));
    }

    #[test]
    fn patch_to_partial() {
        let patch = EditPatch::new("1", "amount", 25.0);
        let partial = patch.to_partial();
        assert_eq!(partial.len(), 1);
        assert_eq!(partial.get("amount"), Some(&Scalar::Number(25.0)));
    }
}
