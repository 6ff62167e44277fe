//! Trait abstraction for validation strategies to enable mocking in tests

use super::report::ErrorReport;
use super::value::FieldMap;

/// Outcome of one validation pass over a full field map.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Resolution {
    /// Accepted (non-errored) field values, mirrored for bookkeeping.
    /// The engine does not consume these for errored keys.
    pub values: FieldMap,
    /// Per-field error lists; a key absent means "no known error".
    pub errors: ErrorReport,
}

/// A pluggable validation strategy.
///
/// Implementations must be pure with respect to their input, must never
/// panic past this boundary (unexpected internal failures are reported as
/// field errors instead), and must only report keys present in `fields`.
/// Any closure of type `Fn(&FieldMap) -> Resolution` is a resolver.
#[cfg_attr(test, mockall::automock)]
pub trait Resolver {
    /// Validate the entire field map and report per-field errors.
    ///
    /// The whole map is passed even when the caller is only interested in
    /// one field, so cross-field rules can apply.
    fn resolve(&self, fields: &FieldMap) -> Resolution;
}

impl<F> Resolver for F
where
    F: Fn(&FieldMap) -> Resolution,
{
    fn resolve(&self, fields: &FieldMap) -> Resolution {
        self(fields)
    }
}
