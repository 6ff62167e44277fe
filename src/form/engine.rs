//! The form state machine
//!
//! `FormEngine` owns the field values for one logical form: an immutable
//! snapshot of the defaults, a mutable working copy, and the derived state
//! (dirtiness, validity, per-field errors, submission flag). All operations
//! are synchronous and run to completion; observers only ever see the state
//! between calls, never mid-transition.

use super::report::ErrorReport;
use super::resolver::Resolver;
use super::value::{FieldMap, FieldValue};
use crate::error::{FormError, Result};
use serde::Serialize;
use std::fmt;
use tracing::{debug, warn};

/// Options recognized by `set_field_value`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SetValueOptions {
    /// Coerce the incoming value to a number before storing. Inputs that
    /// do not parse store the not-a-number sentinel.
    pub as_number: bool,
}

impl SetValueOptions {
    pub fn numeric() -> Self {
        Self { as_number: true }
    }
}

/// A read snapshot of the engine's derived state.
///
/// Snapshots are detached copies: mutating one has no effect on the engine,
/// and a fresh snapshot must be taken after each operation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FormState {
    /// Current (possibly edited) field values
    pub fields: FieldMap,
    /// Per-field validation errors
    pub errors: ErrorReport,
    /// True when `fields` differs from the default snapshot
    pub is_dirty: bool,
    /// True when the last validation pass left no errors. Starts false:
    /// a freshly built or reset form is unvalidated, not error-free.
    pub is_valid: bool,
    /// True only for the duration of a submit validation pass. Kept as a
    /// flag so the state shape survives a move to asynchronous resolvers.
    pub is_submitting: bool,
}

/// Form state engine over a fixed set of named fields.
///
/// The key set is determined by the default values passed at construction
/// and never changes. Validation is delegated entirely to the injected
/// [`Resolver`]; field edits never validate on their own.
pub struct FormEngine {
    defaults: FieldMap,
    fields: FieldMap,
    resolver: Box<dyn Resolver>,
    errors: ErrorReport,
    is_dirty: bool,
    is_valid: bool,
    is_submitting: bool,
}

impl FormEngine {
    /// Build an engine from default values and a validation strategy.
    ///
    /// The defaults are captured once as an immutable snapshot; the working
    /// copy starts equal to it. No validation runs here, so the engine
    /// starts with empty errors and `is_valid == false`.
    pub fn new(defaults: FieldMap, resolver: impl Resolver + 'static) -> Self {
        let fields = defaults.clone();
        Self {
            defaults,
            fields,
            resolver: Box::new(resolver),
            errors: ErrorReport::new(),
            is_dirty: false,
            is_valid: false,
            is_submitting: false,
        }
    }

    /// Current derived state as a detached snapshot
    pub fn state(&self) -> FormState {
        FormState {
            fields: self.fields.clone(),
            errors: self.errors.clone(),
            is_dirty: self.is_dirty,
            is_valid: self.is_valid,
            is_submitting: self.is_submitting,
        }
    }

    /// Current value of a single field
    pub fn field(&self, key: &str) -> Result<&FieldValue> {
        self.fields.get(key).ok_or_else(|| FormError::UnknownField {
            key: key.to_string(),
        })
    }

    /// Store a new value for `key` and recompute dirtiness.
    ///
    /// Does not validate and does not touch `errors` or `is_valid`; a plain
    /// edit only moves data. Fails on keys outside the fixed field set.
    pub fn set_field_value(
        &mut self,
        key: &str,
        input: FieldValue,
        options: SetValueOptions,
    ) -> Result<()> {
        let slot = self.fields.get_mut(key).ok_or_else(|| FormError::UnknownField {
            key: key.to_string(),
        })?;
        *slot = if options.as_number {
            input.coerce_number()
        } else {
            input
        };
        self.is_dirty = self.fields != self.defaults;
        debug!(key, dirty = self.is_dirty, "field value updated");
        Ok(())
    }

    /// Run the resolver and merge only `key`'s outcome into the error state.
    ///
    /// The resolver always sees the whole field map (cross-field rules may
    /// apply), but only `key`'s entry is set or cleared here; errors other
    /// fields accumulated earlier stay untouched. Validity is then
    /// recomputed over the full merged report, so clearing the last error
    /// flips the form valid while a lingering error on another field keeps
    /// it invalid.
    pub fn validate_field(&mut self, key: &str) -> Result<()> {
        if !self.fields.contains_key(key) {
            return Err(FormError::UnknownField {
                key: key.to_string(),
            });
        }
        let resolution = self.resolver.resolve(&self.fields);
        self.check_report(&resolution.errors)?;
        match resolution.errors.get(key) {
            Some(messages) => self.errors.insert(key, messages.to_vec()),
            None => {
                self.errors.remove(key);
            }
        }
        self.is_valid = self.errors.is_empty();
        debug!(key, valid = self.is_valid, "field validated");
        Ok(())
    }

    /// Validate the whole form and invoke `on_valid` iff it passes.
    ///
    /// The error report is replaced wholesale with the resolver's and
    /// validity recomputed before the callback sees the current field
    /// values, so the callback never observes a half-finished pass.
    /// Returns `Ok(true)` iff the callback ran.
    pub fn submit<F>(&mut self, on_valid: F) -> Result<bool>
    where
        F: FnOnce(&FieldMap),
    {
        self.is_submitting = true;
        let resolution = self.resolver.resolve(&self.fields);
        if let Err(err) = self.check_report(&resolution.errors) {
            self.is_submitting = false;
            return Err(err);
        }
        self.errors = resolution.errors;
        self.is_valid = self.errors.is_empty();
        self.is_submitting = false;
        if self.is_valid {
            debug!("submit accepted");
            on_valid(&self.fields);
            Ok(true)
        } else {
            debug!(failing_fields = self.errors.len(), "submit rejected");
            Ok(false)
        }
    }

    /// Restore the default values and drop all derived state.
    ///
    /// Equivalent to reconstructing the engine with the same resolver: the
    /// working copy becomes a fresh clone of the snapshot and the form is
    /// unvalidated again (`is_valid == false`, empty errors).
    pub fn reset(&mut self) {
        self.fields = self.defaults.clone();
        self.errors.clear();
        self.is_dirty = false;
        self.is_valid = false;
        self.is_submitting = false;
        debug!("form reset to defaults");
    }

    /// Reject resolver reports naming keys outside the field set, leaving
    /// engine state untouched.
    fn check_report(&self, report: &ErrorReport) -> Result<()> {
        for key in report.keys() {
            if !self.fields.contains_key(key) {
                warn!(key, "resolver reported a key outside the field set");
                return Err(FormError::ForeignErrorKey {
                    key: key.to_string(),
                });
            }
        }
        Ok(())
    }
}

impl fmt::Debug for FormEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FormEngine")
            .field("fields", &self.fields)
            .field("errors", &self.errors)
            .field("is_dirty", &self.is_dirty)
            .field("is_valid", &self.is_valid)
            .field("is_submitting", &self.is_submitting)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::super::resolver::{MockResolver, Resolution};
    use super::*;
    use pretty_assertions::assert_eq;

    fn signup_defaults() -> FieldMap {
        FieldMap::from([
            ("name".to_string(), FieldValue::text("")),
            ("age".to_string(), FieldValue::NOT_A_NUMBER),
        ])
    }

    /// name must be 3..=32 chars, age must be 18..=100
    fn name_age_resolver() -> impl Fn(&FieldMap) -> Resolution {
        |fields: &FieldMap| {
            let mut errors = ErrorReport::new();
            let mut values = FieldMap::new();
            for (key, value) in fields {
                match key.as_str() {
                    "name" => {
                        let len = value.as_text().map(|s| s.chars().count()).unwrap_or(0);
                        if !(3..=32).contains(&len) {
                            errors.push("name", "must be between 3 and 32 characters");
                            continue;
                        }
                    }
                    "age" => {
                        let age = value.as_number().unwrap_or(f64::NAN);
                        if !(18.0..=100.0).contains(&age) {
                            errors.push("age", "must be between 18 and 100");
                            continue;
                        }
                    }
                    _ => {}
                }
                values.insert(key.clone(), value.clone());
            }
            Resolution { values, errors }
        }
    }

    fn signup_engine() -> FormEngine {
        FormEngine::new(signup_defaults(), name_age_resolver())
    }

    fn set_text(engine: &mut FormEngine, key: &str, value: &str) {
        engine
            .set_field_value(key, FieldValue::text(value), SetValueOptions::default())
            .unwrap();
    }

    mod construction {
        use super::*;
        use pretty_assertions::assert_eq;

        #[test]
        fn test_initial_state() {
            let engine = signup_engine();
            let state = engine.state();
            assert_eq!(state.fields, signup_defaults());
            assert!(state.errors.is_empty());
            assert!(!state.is_dirty);
            assert!(!state.is_valid);
            assert!(!state.is_submitting);
        }

        #[test]
        fn test_no_validation_runs_at_construction() {
            let mut mock = MockResolver::new();
            mock.expect_resolve().times(0);
            let engine = FormEngine::new(signup_defaults(), mock);
            assert!(engine.state().errors.is_empty());
        }

        #[test]
        fn test_state_snapshot_is_detached() {
            let engine = signup_engine();
            let mut snapshot = engine.state();
            snapshot
                .fields
                .insert("name".to_string(), FieldValue::text("mutated"));
            snapshot.errors.push("name", "fake error");

            let fresh = engine.state();
            assert_eq!(fresh.fields, signup_defaults());
            assert!(fresh.errors.is_empty());
        }

        #[test]
        fn test_field_accessor() {
            let engine = signup_engine();
            assert_eq!(engine.field("name").unwrap(), &FieldValue::text(""));
            assert_eq!(
                engine.field("nickname"),
                Err(FormError::UnknownField {
                    key: "nickname".to_string()
                })
            );
        }
    }

    mod set_field_value {
        use super::*;
        use pretty_assertions::assert_eq;

        #[test]
        fn test_updates_value_and_dirtiness() {
            let mut engine = signup_engine();
            set_text(&mut engine, "name", "Al");

            let state = engine.state();
            assert_eq!(state.fields["name"], FieldValue::text("Al"));
            assert!(state.is_dirty);
        }

        #[test]
        fn test_restoring_default_clears_dirtiness() {
            let mut engine = signup_engine();
            set_text(&mut engine, "name", "Al");
            assert!(engine.state().is_dirty);
            set_text(&mut engine, "name", "");
            assert!(!engine.state().is_dirty);
        }

        #[test]
        fn test_unknown_key_fails_and_leaves_state_untouched() {
            let mut engine = signup_engine();
            let before = engine.state();
            let result = engine.set_field_value(
                "nickname",
                FieldValue::text("x"),
                SetValueOptions::default(),
            );
            assert_eq!(
                result,
                Err(FormError::UnknownField {
                    key: "nickname".to_string()
                })
            );
            assert_eq!(engine.state(), before);
        }

        #[test]
        fn test_key_set_never_grows() {
            let mut engine = signup_engine();
            let _ = engine.set_field_value(
                "nickname",
                FieldValue::text("x"),
                SetValueOptions::default(),
            );
            set_text(&mut engine, "name", "Alice");
            let state = engine.state();
            let keys: Vec<&str> = state.fields.keys().map(String::as_str).collect();
            assert_eq!(keys, vec!["age", "name"]);
        }

        #[test]
        fn test_edit_does_not_validate() {
            let mut mock = MockResolver::new();
            mock.expect_resolve().times(0);
            let mut engine = FormEngine::new(signup_defaults(), mock);
            set_text(&mut engine, "name", "x");
            assert!(engine.state().errors.is_empty());
            assert!(!engine.state().is_valid);
        }

        #[test]
        fn test_edit_leaves_existing_errors_alone() {
            let mut engine = signup_engine();
            engine.validate_field("name").unwrap();
            assert!(engine.state().errors.contains("name"));

            set_text(&mut engine, "name", "Alice");
            assert!(engine.state().errors.contains("name"));
        }

        #[test]
        fn test_as_number_coerces_text() {
            let mut engine = signup_engine();
            engine
                .set_field_value("age", FieldValue::text("30"), SetValueOptions::numeric())
                .unwrap();
            assert_eq!(engine.field("age").unwrap(), &FieldValue::Number(30.0));
        }

        #[test]
        fn test_as_number_stores_sentinel_on_junk() {
            let mut engine = signup_engine();
            engine
                .set_field_value(
                    "age",
                    FieldValue::text("not a number"),
                    SetValueOptions::numeric(),
                )
                .unwrap();
            assert!(engine.field("age").unwrap().is_not_a_number());
            // sentinel equals the sentinel default, so nothing is dirty
            assert!(!engine.state().is_dirty);
        }

        #[test]
        fn test_without_as_number_raw_input_is_kept() {
            let mut engine = signup_engine();
            set_text(&mut engine, "age", "30");
            assert_eq!(engine.field("age").unwrap(), &FieldValue::text("30"));
        }
    }

    mod validate_field {
        use super::*;
        use pretty_assertions::assert_eq;

        #[test]
        fn test_flags_error_for_key() {
            let mut engine = signup_engine();
            set_text(&mut engine, "name", "Al");
            engine.validate_field("name").unwrap();

            let state = engine.state();
            assert_eq!(
                state.errors.first("name"),
                Some("must be between 3 and 32 characters")
            );
            assert!(!state.is_valid);
        }

        #[test]
        fn test_clears_stale_error_when_fixed() {
            let mut engine = signup_engine();
            engine.validate_field("name").unwrap();
            assert!(engine.state().errors.contains("name"));

            set_text(&mut engine, "name", "Alice");
            engine.validate_field("name").unwrap();
            assert!(!engine.state().errors.contains("name"));
        }

        #[test]
        fn test_merges_locally_without_touching_other_fields() {
            let mut engine = signup_engine();
            engine.validate_field("name").unwrap();
            engine.validate_field("age").unwrap();
            assert_eq!(engine.state().errors.len(), 2);

            // fixing age and re-validating it must not clear name's entry
            engine
                .set_field_value("age", FieldValue::text("30"), SetValueOptions::numeric())
                .unwrap();
            engine.validate_field("age").unwrap();

            let state = engine.state();
            assert!(state.errors.contains("name"));
            assert!(!state.errors.contains("age"));
            assert!(!state.is_valid);
        }

        #[test]
        fn test_validity_follows_the_merged_report() {
            let mut engine = signup_engine();
            set_text(&mut engine, "name", "Al");
            engine.validate_field("name").unwrap();
            assert!(!engine.state().is_valid);

            // clearing the only merged error flips the form valid, even
            // though the never-blurred age field would not pass a full run
            set_text(&mut engine, "name", "Alice");
            engine.validate_field("name").unwrap();
            let state = engine.state();
            assert!(state.errors.is_empty());
            assert!(state.is_valid);
        }

        #[test]
        fn test_resolver_sees_the_whole_field_map() {
            let mut mock = MockResolver::new();
            mock.expect_resolve()
                .withf(|fields: &FieldMap| {
                    fields.len() == 2
                        && fields["name"] == FieldValue::text("Alice")
                        && fields.contains_key("age")
                })
                .times(1)
                .returning(|_| Resolution::default());

            let mut engine = FormEngine::new(signup_defaults(), mock);
            set_text(&mut engine, "name", "Alice");
            engine.validate_field("name").unwrap();
        }

        #[test]
        fn test_unknown_key_fails_without_resolving() {
            let mut mock = MockResolver::new();
            mock.expect_resolve().times(0);
            let mut engine = FormEngine::new(signup_defaults(), mock);
            assert_eq!(
                engine.validate_field("nickname"),
                Err(FormError::UnknownField {
                    key: "nickname".to_string()
                })
            );
        }

        #[test]
        fn test_foreign_error_key_is_rejected() {
            let rogue = |_: &FieldMap| {
                let mut errors = ErrorReport::new();
                errors.push("phantom", "not even a field");
                Resolution {
                    values: FieldMap::new(),
                    errors,
                }
            };
            let mut engine = FormEngine::new(signup_defaults(), rogue);
            let before = engine.state();
            assert_eq!(
                engine.validate_field("name"),
                Err(FormError::ForeignErrorKey {
                    key: "phantom".to_string()
                })
            );
            assert_eq!(engine.state(), before);
        }
    }

    mod submit {
        use super::*;
        use pretty_assertions::assert_eq;

        #[test]
        fn test_valid_form_invokes_callback_once() {
            let mut engine = signup_engine();
            set_text(&mut engine, "name", "Alice");
            engine
                .set_field_value("age", FieldValue::text("30"), SetValueOptions::numeric())
                .unwrap();

            let mut submitted = Vec::new();
            let accepted = engine.submit(|fields| submitted.push(fields.clone())).unwrap();

            assert!(accepted);
            assert_eq!(submitted.len(), 1);
            assert_eq!(submitted[0]["name"], FieldValue::text("Alice"));
            assert_eq!(submitted[0]["age"], FieldValue::Number(30.0));

            let state = engine.state();
            assert!(state.errors.is_empty());
            assert!(state.is_valid);
            assert!(!state.is_submitting);
        }

        #[test]
        fn test_invalid_form_withholds_callback() {
            let mut engine = signup_engine();
            set_text(&mut engine, "name", "Alice");
            engine
                .set_field_value("age", FieldValue::text("150"), SetValueOptions::numeric())
                .unwrap();

            let mut called = false;
            let accepted = engine.submit(|_| called = true).unwrap();

            assert!(!accepted);
            assert!(!called);
            let state = engine.state();
            assert_eq!(state.errors.first("age"), Some("must be between 18 and 100"));
            assert!(!state.is_valid);
            assert!(!state.is_submitting);
        }

        #[test]
        fn test_reports_every_failing_field_even_unblurred_ones() {
            let mut engine = signup_engine();
            let accepted = engine.submit(|_| {}).unwrap();
            assert!(!accepted);
            let state = engine.state();
            assert!(state.errors.contains("name"));
            assert!(state.errors.contains("age"));
        }

        #[test]
        fn test_replaces_error_report_wholesale() {
            let mut engine = signup_engine();
            engine.validate_field("name").unwrap();
            assert!(engine.state().errors.contains("name"));

            set_text(&mut engine, "name", "Alice");
            engine
                .set_field_value("age", FieldValue::text("30"), SetValueOptions::numeric())
                .unwrap();
            let accepted = engine.submit(|_| {}).unwrap();

            assert!(accepted);
            assert!(engine.state().errors.is_empty());
        }

        #[test]
        fn test_foreign_error_key_preserves_prior_state() {
            let rogue = |_: &FieldMap| {
                let mut errors = ErrorReport::new();
                errors.push("phantom", "not even a field");
                Resolution {
                    values: FieldMap::new(),
                    errors,
                }
            };
            let mut engine = FormEngine::new(signup_defaults(), rogue);
            let before = engine.state();

            let mut called = false;
            let result = engine.submit(|_| called = true);

            assert_eq!(
                result,
                Err(FormError::ForeignErrorKey {
                    key: "phantom".to_string()
                })
            );
            assert!(!called);
            assert_eq!(engine.state(), before);
        }
    }

    mod reset {
        use super::*;
        use pretty_assertions::assert_eq;

        #[test]
        fn test_restores_defaults_and_clears_derived_state() {
            let mut engine = signup_engine();
            set_text(&mut engine, "name", "Alice");
            engine.validate_field("age").unwrap();

            engine.reset();

            let state = engine.state();
            assert_eq!(state.fields, signup_defaults());
            assert!(state.errors.is_empty());
            assert!(!state.is_dirty);
            assert!(!state.is_valid);
            assert!(!state.is_submitting);
        }

        #[test]
        fn test_reset_is_idempotent() {
            let mut engine = signup_engine();
            set_text(&mut engine, "name", "Alice");
            engine.reset();
            let once = engine.state();
            engine.reset();
            assert_eq!(engine.state(), once);
        }

        #[test]
        fn test_reset_after_valid_submit_is_unvalidated_not_error_free() {
            let mut engine = signup_engine();
            set_text(&mut engine, "name", "Alice");
            engine
                .set_field_value("age", FieldValue::text("30"), SetValueOptions::numeric())
                .unwrap();
            assert!(engine.submit(|_| {}).unwrap());
            assert!(engine.state().is_valid);

            engine.reset();
            let state = engine.state();
            assert!(state.errors.is_empty());
            assert!(!state.is_valid);
        }

        #[test]
        fn test_reset_does_not_validate() {
            let mut mock = MockResolver::new();
            mock.expect_resolve().times(0);
            let mut engine = FormEngine::new(signup_defaults(), mock);
            set_text(&mut engine, "name", "Alice");
            engine.reset();
        }

        #[test]
        fn test_edits_never_leak_into_the_default_snapshot() {
            let mut engine = signup_engine();
            set_text(&mut engine, "name", "Alice");
            engine.reset();
            set_text(&mut engine, "name", "Bob");
            engine.reset();
            assert_eq!(engine.state().fields["name"], FieldValue::text(""));
        }
    }

    mod flow {
        use super::*;
        use pretty_assertions::assert_eq;

        #[test]
        fn test_edit_blur_submit_reset_walkthrough() {
            let mut engine = signup_engine();

            // edit alone: dirty, still no errors
            set_text(&mut engine, "name", "Al");
            let state = engine.state();
            assert!(state.is_dirty);
            assert!(state.errors.is_empty());

            // blur flags the short name
            engine.validate_field("name").unwrap();
            assert_eq!(
                engine.state().errors.first("name"),
                Some("must be between 3 and 32 characters")
            );

            // fix both fields and submit
            set_text(&mut engine, "name", "Alice");
            engine
                .set_field_value("age", FieldValue::text("30"), SetValueOptions::numeric())
                .unwrap();
            let mut submitted = Vec::new();
            assert!(engine.submit(|f| submitted.push(f.clone())).unwrap());
            assert_eq!(submitted.len(), 1);
            assert!(engine.state().is_valid);

            // out-of-range edit makes the next submit fail
            engine
                .set_field_value("age", FieldValue::text("150"), SetValueOptions::numeric())
                .unwrap();
            assert!(!engine.submit(|f| submitted.push(f.clone())).unwrap());
            assert_eq!(submitted.len(), 1);

            // reset goes back to the unvalidated initial state
            engine.reset();
            let state = engine.state();
            assert_eq!(state.fields, signup_defaults());
            assert!(!state.is_dirty);
            assert!(!state.is_valid);
            assert!(state.errors.is_empty());
        }
    }
}
