//! History module - per-bucket snapshot sequences and windowing.

mod history_model;
mod snapshot;

pub use history_model::{History, Window};
pub use snapshot::Snapshot;

#[cfg(test)]
mod history_model_tests;
