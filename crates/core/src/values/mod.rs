//! Values module - attribute metadata and per-instant value state.

mod attribute;
pub mod money;
mod values_model;

pub use attribute::{Attribute, AttributeKind, AttributeMeta, Denomination, ValueLayout};
pub use values_model::{Value, Values};

#[cfg(test)]
mod values_model_tests;
