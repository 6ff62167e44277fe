//! Error types for the form engine

use thiserror::Error;

/// Result type for engine operations
pub type Result<T> = std::result::Result<T, FormError>;

/// Errors raised by engine operations.
///
/// Validation failures are never represented here; they are ordinary state,
/// carried per field in the error report and read back via `state()`. These
/// variants cover integration mistakes that must fail loudly instead of
/// being folded into UI state.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FormError {
    /// Caller referenced a field key outside the fixed key set
    #[error("unknown field key: {key}")]
    UnknownField { key: String },

    /// The resolver reported an error for a key outside the field set
    #[error("resolver reported unknown field key: {key}")]
    ForeignErrorKey { key: String },
}
