//! Declarative rule-based resolver
//!
//! A ready-made [`Resolver`] for the common case: attach a list of rules to
//! each field key and get ordered, human-readable messages back. Fields
//! without rules always pass. Custom checks that fail unexpectedly are
//! caught at this boundary and reported as a generic field error, so the
//! engine never sees a panic.

use crate::form::{ErrorReport, FieldMap, FieldValue, Resolution, Resolver};
use std::collections::BTreeMap;
use std::fmt;
use std::panic::{catch_unwind, AssertUnwindSafe};

/// Message reported when a custom check panics instead of returning.
const FORBIDDEN_VALUE: &str = "Forbidden value";

type Check = Box<dyn Fn(&FieldValue) -> Result<(), String> + Send + Sync>;

enum Rule {
    Required,
    MinLen(usize),
    MaxLen(usize),
    Min(f64),
    Max(f64),
    Finite,
    OneOf(Vec<String>),
    Check(Check),
}

impl Rule {
    /// Returns the violation message, if any.
    fn apply(&self, value: &FieldValue) -> Option<String> {
        match self {
            Rule::Required => match value {
                FieldValue::Text(s) if s.trim().is_empty() => {
                    Some("this field is required".to_string())
                }
                FieldValue::Json(serde_json::Value::Null) => {
                    Some("this field is required".to_string())
                }
                _ => None,
            },
            Rule::MinLen(min) => match value.as_text() {
                Some(s) if s.chars().count() < *min => {
                    Some(format!("must be at least {min} characters"))
                }
                _ => None,
            },
            Rule::MaxLen(max) => match value.as_text() {
                Some(s) if s.chars().count() > *max => {
                    Some(format!("must be at most {max} characters"))
                }
                _ => None,
            },
            Rule::Min(min) => match value.as_number() {
                Some(n) if n < *min => Some(format!("must be at least {min}")),
                Some(n) if n.is_nan() => Some("must be a number".to_string()),
                Some(_) => None,
                None => Some("must be a number".to_string()),
            },
            Rule::Max(max) => match value.as_number() {
                Some(n) if n > *max => Some(format!("must be at most {max}")),
                Some(n) if n.is_nan() => Some("must be a number".to_string()),
                Some(_) => None,
                None => Some("must be a number".to_string()),
            },
            Rule::Finite => match value.as_number() {
                Some(n) if n.is_finite() => None,
                _ => Some("must be a number".to_string()),
            },
            Rule::OneOf(options) => match value.as_text() {
                Some(s) if options.iter().any(|o| o == s) => None,
                _ => Some(format!("must be one of: {}", options.join(", "))),
            },
            Rule::Check(check) => {
                match catch_unwind(AssertUnwindSafe(|| check(value))) {
                    Ok(Ok(())) => None,
                    Ok(Err(message)) => Some(message),
                    Err(_) => Some(FORBIDDEN_VALUE.to_string()),
                }
            }
        }
    }
}

/// Ordered rule list for one field. Violations are reported in the order
/// the rules were declared.
#[derive(Default)]
pub struct FieldRules {
    rules: Vec<Rule>,
}

impl FieldRules {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reject empty (or whitespace-only) text and JSON null
    pub fn required(mut self) -> Self {
        self.rules.push(Rule::Required);
        self
    }

    /// Minimum text length in characters
    pub fn min_len(mut self, min: usize) -> Self {
        self.rules.push(Rule::MinLen(min));
        self
    }

    /// Maximum text length in characters
    pub fn max_len(mut self, max: usize) -> Self {
        self.rules.push(Rule::MaxLen(max));
        self
    }

    /// Numeric lower bound (also rejects non-numbers and the sentinel)
    pub fn min(mut self, min: f64) -> Self {
        self.rules.push(Rule::Min(min));
        self
    }

    /// Numeric upper bound (also rejects non-numbers and the sentinel)
    pub fn max(mut self, max: f64) -> Self {
        self.rules.push(Rule::Max(max));
        self
    }

    /// Require a finite number; rejects the failed-coercion sentinel
    pub fn finite(mut self) -> Self {
        self.rules.push(Rule::Finite);
        self
    }

    /// Text must equal one of the given options
    pub fn one_of<I, S>(mut self, options: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.rules
            .push(Rule::OneOf(options.into_iter().map(Into::into).collect()));
        self
    }

    /// Custom predicate. A returned `Err` becomes the field's message; a
    /// panic is caught and reported as "Forbidden value".
    pub fn check<F>(mut self, check: F) -> Self
    where
        F: Fn(&FieldValue) -> Result<(), String> + Send + Sync + 'static,
    {
        self.rules.push(Rule::Check(Box::new(check)));
        self
    }

    fn violations(&self, value: &FieldValue) -> Vec<String> {
        self.rules
            .iter()
            .filter_map(|rule| rule.apply(value))
            .collect()
    }
}

impl fmt::Debug for FieldRules {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldRules")
            .field("rules", &self.rules.len())
            .finish()
    }
}

/// Resolver built from per-field rule sets.
///
/// Iterates the input field map, so it only ever reports keys from the
/// input; rules declared for keys the engine never passes in are inert.
/// Accepted values are mirrored into `Resolution::values`.
#[derive(Debug, Default)]
pub struct RuleResolver {
    rules: BTreeMap<String, FieldRules>,
}

impl RuleResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach a rule set to a field key
    pub fn field(mut self, key: impl Into<String>, rules: FieldRules) -> Self {
        self.rules.insert(key.into(), rules);
        self
    }
}

impl Resolver for RuleResolver {
    fn resolve(&self, fields: &FieldMap) -> Resolution {
        let mut errors = ErrorReport::new();
        let mut values = FieldMap::new();
        for (key, value) in fields {
            let violations = self
                .rules
                .get(key)
                .map(|rules| rules.violations(value))
                .unwrap_or_default();
            if violations.is_empty() {
                values.insert(key.clone(), value.clone());
            } else {
                errors.insert(key.clone(), violations);
            }
        }
        Resolution { values, errors }
    }
}
