//! Field names and per-field schema entries

use crate::scalar::Scalar;
use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt::{self, Display, Formatter};

/// Name of a record field (a column identifier)
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldName(String);

impl FieldName {
    /// Create a field name
    #[inline]
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Borrow as `&str`
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for FieldName {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Borrow<str> for FieldName {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for FieldName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<&str> for FieldName {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for FieldName {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&FieldName> for FieldName {
    fn from(f: &FieldName) -> Self {
        f.clone()
    }
}

/// How a field participates in editing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    /// Immutable display field (product number, category)
    Identity,
    /// User-editable forecast quantity
    Editable,
    /// Computed or server-corrected value, shown but not edited
    Derived,
}

/// Value type a field holds
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueKind {
    /// Free text
    Text,
    /// Number (quantity, amount, percentage)
    Number,
    /// Boolean flag
    Bool,
    /// Text restricted to a fixed set of variants
    Enum(Vec<String>),
}

impl ValueKind {
    /// Build an enum kind from static variant names
    #[must_use]
    pub fn variants(names: &[&str]) -> Self {
        Self::Enum(names.iter().map(|n| (*n).to_string()).collect())
    }

    /// Check whether a value fits this kind. Null fits every kind.
    #[must_use]
    pub fn accepts(&self, value: &Scalar) -> bool {
        match (self, value) {
            (_, Scalar::Null)
            | (Self::Text, Scalar::Text(_))
            | (Self::Number, Scalar::Number(_))
            | (Self::Bool, Scalar::Bool(_)) => true,
            (Self::Enum(variants), Scalar::Text(s)) => variants.iter().any(|v| v == s),
            _ => false,
        }
    }

    /// Check for numeric kind
    #[inline]
    #[must_use]
    pub fn is_numeric(&self) -> bool {
        matches!(self, Self::Number)
    }

    /// Short name used in error messages
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Number => "number",
            Self::Bool => "bool",
            Self::Enum(_) => "enum",
        }
    }
}

/// Schema entry for one field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldSpec {
    /// Field name
    pub name: FieldName,
    /// Display label
    pub label: String,
    /// Value type
    pub value_kind: ValueKind,
    /// Edit participation
    pub kind: FieldKind,
}

impl FieldSpec {
    /// Identity text field
    #[must_use]
    pub fn identity(name: &str, label: &str) -> Self {
        Self::new(name, label, ValueKind::Text, FieldKind::Identity)
    }

    /// Identity field restricted to the given variants
    #[must_use]
    pub fn identity_enum(name: &str, label: &str, variants: &[&str]) -> Self {
        Self::new(name, label, ValueKind::variants(variants), FieldKind::Identity)
    }

    /// Editable numeric field
    #[must_use]
    pub fn editable(name: &str, label: &str) -> Self {
        Self::new(name, label, ValueKind::Number, FieldKind::Editable)
    }

    /// Editable text field (remarks)
    #[must_use]
    pub fn editable_text(name: &str, label: &str) -> Self {
        Self::new(name, label, ValueKind::Text, FieldKind::Editable)
    }

    /// Read-only numeric field
    #[must_use]
    pub fn derived(name: &str, label: &str) -> Self {
        Self::new(name, label, ValueKind::Number, FieldKind::Derived)
    }

    /// Fully specified field
    #[must_use]
    pub fn new(name: &str, label: &str, value_kind: ValueKind, kind: FieldKind) -> Self {
        Self {
            name: FieldName::from(name),
            label: label.to_string(),
            value_kind,
            kind,
        }
    }

    /// Check whether users may edit this field
    #[inline]
    #[must_use]
    pub fn is_editable(&self) -> bool {
        self.kind == FieldKind::Editable
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn enum_kind_checks_variants() {
        let kind = ValueKind::variants(&["active", "eol"]);
        assert!(kind.accepts(&Scalar::text("eol")));
        assert!(!kind.accepts(&Scalar::text("retired")));
        assert!(!kind.accepts(&Scalar::Number(1.0)));
        assert!(kind.accepts(&Scalar::Null));
    }

    #[test]
    fn field_name_borrows_as_str() {
        let mut map = std::collections::BTreeMap::new();
        map.insert(FieldName::from("pn"), 1);
        assert_eq!(map.get("pn"), Some(&1));
    }
}
