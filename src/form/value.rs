//! Field value objects and the field map

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Flat mapping from field key to value.
///
/// The key set is fixed when an engine is constructed and never grows or
/// shrinks afterwards.
pub type FieldMap = BTreeMap<String, FieldValue>;

/// Type-safe field values
///
/// The engine treats values as opaque; only the numeric coercion path
/// inspects them. Structured values go through the `Json` variant.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Text(String),
    Number(f64),
    Bool(bool),
    Json(serde_json::Value),
}

impl FieldValue {
    /// Sentinel stored when numeric coercion fails. Unlike plain IEEE 754
    /// NaN it compares equal to itself (see `PartialEq` below), so dirty
    /// checks over maps containing it stay stable.
    pub const NOT_A_NUMBER: FieldValue = FieldValue::Number(f64::NAN);

    /// Create a text value
    pub fn text(value: impl Into<String>) -> Self {
        FieldValue::Text(value.into())
    }

    /// Create a numeric value
    pub fn number(value: f64) -> Self {
        FieldValue::Number(value)
    }

    /// Get the text content (`None` for non-text values)
    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Get the numeric content (`None` for non-numeric values)
    pub fn as_number(&self) -> Option<f64> {
        match self {
            FieldValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// True for the failed-coercion sentinel (and any other NaN)
    pub fn is_not_a_number(&self) -> bool {
        matches!(self, FieldValue::Number(n) if n.is_nan())
    }

    /// Coerce to a numeric value.
    ///
    /// Follows the conventions of text inputs: trimmed-empty text coerces
    /// to `0`, parseable text to its value, booleans to `0`/`1`. Anything
    /// unparseable (and structured values) coerces to [`NOT_A_NUMBER`],
    /// which resolvers are expected to reject.
    ///
    /// [`NOT_A_NUMBER`]: Self::NOT_A_NUMBER
    pub fn coerce_number(&self) -> FieldValue {
        let n = match self {
            FieldValue::Number(n) => *n,
            FieldValue::Bool(b) => {
                if *b {
                    1.0
                } else {
                    0.0
                }
            }
            FieldValue::Text(s) => {
                let trimmed = s.trim();
                if trimmed.is_empty() {
                    0.0
                } else {
                    trimmed.parse::<f64>().unwrap_or(f64::NAN)
                }
            }
            FieldValue::Json(_) => f64::NAN,
        };
        FieldValue::Number(n)
    }

    /// Value rendered for an edit buffer. The sentinel renders empty so a
    /// numeric field with no input yet shows as blank.
    pub fn display_string(&self) -> String {
        match self {
            FieldValue::Text(s) => s.clone(),
            FieldValue::Number(n) if n.is_nan() => String::new(),
            FieldValue::Number(n) => n.to_string(),
            FieldValue::Bool(b) => b.to_string(),
            FieldValue::Json(v) => v.to_string(),
        }
    }
}

impl Default for FieldValue {
    fn default() -> Self {
        FieldValue::Text(String::new())
    }
}

/// Deep equality, with the one deviation that NaN equals NaN. The
/// not-a-number sentinel must be comparable for dirty checks to work.
impl PartialEq for FieldValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (FieldValue::Text(a), FieldValue::Text(b)) => a == b,
            (FieldValue::Number(a), FieldValue::Number(b)) => {
                a == b || (a.is_nan() && b.is_nan())
            }
            (FieldValue::Bool(a), FieldValue::Bool(b)) => a == b,
            (FieldValue::Json(a), FieldValue::Json(b)) => a == b,
            _ => false,
        }
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Text(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::Text(value)
    }
}

impl From<f64> for FieldValue {
    fn from(value: f64) -> Self {
        FieldValue::Number(value)
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        FieldValue::Bool(value)
    }
}

impl From<serde_json::Value> for FieldValue {
    fn from(value: serde_json::Value) -> Self {
        FieldValue::Json(value)
    }
}
