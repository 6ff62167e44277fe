//! formic - framework-agnostic form state engine
//!
//! Tracks field values, dirtiness, validity, per-field error lists, and
//! the submission lifecycle for a fixed set of named fields. Validation is
//! delegated to a pluggable [`Resolver`]; the shipped [`RuleResolver`]
//! covers the declarative common case. The `ui` module is a thin Ratatui
//! binding; the engine itself has no rendering dependencies.

pub mod error;
pub mod form;
pub mod resolvers;
pub mod ui;

pub use error::{FormError, Result};
pub use form::{
    ErrorReport, FieldMap, FieldValue, FormEngine, FormState, Resolution, Resolver,
    SetValueOptions,
};
pub use resolvers::{FieldRules, RuleResolver};
