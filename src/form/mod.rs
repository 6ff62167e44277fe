//! Form domain layer
//!
//! The engine, its value and error-report types, and the resolver seam.
//! Everything here is render-framework-independent; the `ui` module binds
//! it to a terminal.

mod engine;
mod report;
mod resolver;
mod value;

pub use engine::{FormEngine, FormState, SetValueOptions};
pub use report::ErrorReport;
pub use resolver::{Resolution, Resolver};
pub use value::{FieldMap, FieldValue};
