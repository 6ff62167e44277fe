//! Ratatui binding for the form engine
//!
//! The engine is render-framework-independent; this module is the thin
//! adapter that wires it to a terminal. Nothing in `form` depends on it.

mod binding;
mod field_renderer;
mod form_view;

pub use binding::{BindingEvent, FieldSpec, FormBinding};
pub use field_renderer::draw_field;
pub use form_view::draw_form;
