//! Shipped resolver implementations
//!
//! The engine only requires the `Resolver` contract; anything satisfying it
//! plugs in. This module carries the batteries-included one.

mod rules;

pub use rules::{FieldRules, RuleResolver};
