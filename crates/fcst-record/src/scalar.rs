//! Scalar cell values
//!
//! Provides [`Scalar`], the value held by every record field.

use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};

/// A single cell value
///
/// Small enums (product status, sales trend) are carried as [`Scalar::Text`]
/// and validated against the field's allowed variants by the schema.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Scalar {
    /// Absent value
    #[default]
    Null,
    /// Boolean flag
    Bool(bool),
    /// Numeric quantity, amount or percentage
    Number(f64),
    /// Free text or enum variant
    Text(String),
}

impl Scalar {
    /// Create a text scalar
    #[inline]
    #[must_use]
    pub fn text(value: impl Into<String>) -> Self {
        Self::Text(value.into())
    }

    /// Numeric value, if this is a number
    #[inline]
    #[must_use]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Text value, if this is text
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s.as_str()),
            _ => None,
        }
    }

    /// Boolean value, if this is a flag
    #[inline]
    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Check for null
    #[inline]
    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// True for null and for empty text.
    ///
    /// Filter constraints holding a blank value place no restriction.
    #[must_use]
    pub fn is_blank(&self) -> bool {
        match self {
            Self::Null => true,
            Self::Text(s) => s.trim().is_empty(),
            _ => false,
        }
    }

    /// Short name of the variant, used in error messages
    #[must_use]
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool(_) => "bool",
            Self::Number(_) => "number",
            Self::Text(_) => "text",
        }
    }

    /// Interpret this value as a number.
    ///
    /// Text is parsed after trimming and removing thousands separators, so
    /// `"15,000"` reads as `15000`. Non-finite results are rejected.
    #[must_use]
    pub fn to_number(&self) -> Option<f64> {
        match self {
            Self::Number(n) => n.is_finite().then_some(*n),
            Self::Text(s) => parse_number(s),
            Self::Bool(_) | Self::Null => None,
        }
    }

    /// Exact-equality match used by field filters.
    ///
    /// Same-variant values compare directly. A textual expectation against a
    /// numeric value matches when it parses to the same number.
    #[must_use]
    pub fn matches_exact(&self, expected: &Scalar) -> bool {
        match (self, expected) {
            (Self::Number(actual), Self::Text(_)) => {
                expected.to_number().is_some_and(|n| n == *actual)
            }
            (Self::Text(actual), Self::Number(n)) => parse_number(actual).is_some_and(|a| a == *n),
            _ => self == expected,
        }
    }

    /// Case-insensitive substring match against an already-lowercased needle
    #[must_use]
    pub fn contains_lowercase(&self, needle_lower: &str) -> bool {
        match self {
            Self::Text(s) => s.to_lowercase().contains(needle_lower),
            Self::Null => needle_lower.is_empty(),
            other => other.to_string().to_lowercase().contains(needle_lower),
        }
    }
}

fn parse_number(text: &str) -> Option<f64> {
    let n = text.trim().replace(',', "").parse::<f64>().ok()?;
    n.is_finite().then_some(n)
}

impl Display for Scalar {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => Ok(()),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Number(n) if n.fract() == 0.0 && n.abs() < 1e15 => write!(f, "{n:.0}"),
            Self::Number(n) => write!(f, "{n}"),
            Self::Text(s) => f.write_str(s),
        }
    }
}

impl From<f64> for Scalar {
    fn from(n: f64) -> Self {
        Self::Number(n)
    }
}

impl From<i64> for Scalar {
    #[allow(clippy::cast_precision_loss)]
    fn from(n: i64) -> Self {
        Self::Number(n as f64)
    }
}

impl From<i32> for Scalar {
    fn from(n: i32) -> Self {
        Self::Number(f64::from(n))
    }
}

impl From<u32> for Scalar {
    fn from(n: u32) -> Self {
        Self::Number(f64::from(n))
    }
}

impl From<bool> for Scalar {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<&str> for Scalar {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for Scalar {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<Option<Scalar>> for Scalar {
    fn from(value: Option<Scalar>) -> Self {
        value.unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_values() {
        assert!(Scalar::Null.is_blank());
        assert!(Scalar::text("  ").is_blank());
        assert!(!Scalar::text("A").is_blank());
        assert!(!Scalar::Number(0.0).is_blank());
    }

    #[test]
    fn numbers_parse_from_text() {
        assert_eq!(Scalar::text("15,000").to_number(), Some(15000.0));
        assert_eq!(Scalar::text(" 2.5 ").to_number(), Some(2.5));
        assert_eq!(Scalar::text("abc").to_number(), None);
        assert_eq!(Scalar::text("NaN").to_number(), None);
        assert_eq!(Scalar::Bool(true).to_number(), None);
    }

    #[test]
    fn exact_match_is_case_sensitive_for_text() {
        assert!(Scalar::text("active").matches_exact(&Scalar::text("active")));
        assert!(!Scalar::text("Active").matches_exact(&Scalar::text("active")));
    }

    #[test]
    fn exact_match_crosses_number_and_text() {
        assert!(Scalar::Number(42.0).matches_exact(&Scalar::text("42")));
        assert!(Scalar::text("42").matches_exact(&Scalar::Number(42.0)));
        assert!(!Scalar::Number(42.0).matches_exact(&Scalar::text("43")));
    }

    #[test]
    fn substring_match_lowercases_haystack() {
        assert!(Scalar::text("A5634-BK-US").contains_lowercase("bk-us"));
        assert!(!Scalar::text("A5634").contains_lowercase("a26"));
        assert!(Scalar::Number(1200.0).contains_lowercase("120"));
    }

    #[test]
    fn integral_numbers_display_without_fraction() {
        assert_eq!(Scalar::Number(15000.0).to_string(), "15000");
        assert_eq!(Scalar::Number(0.75).to_string(), "0.75");
        assert_eq!(Scalar::Null.to_string(), "");
    }

    #[test]
    fn json_roundtrip_is_untagged() {
        let v: Scalar = serde_json::from_str("12.5").unwrap();
        assert_eq!(v, Scalar::Number(12.5));
        let v: Scalar = serde_json::from_str("\"eol\"").unwrap();
        assert_eq!(v, Scalar::text("eol"));
        let v: Scalar = serde_json::from_str("null").unwrap();
        assert_eq!(v, Scalar::Null);
        assert_eq!(serde_json::to_string(&Scalar::Bool(true)).unwrap(), "true");
    }
}
