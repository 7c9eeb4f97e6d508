//! Ledger Analysis Core - temporal valuation and aggregation engine.
//!
//! This crate turns an immutable, date-sorted transaction feed plus price and
//! exchange-rate series into per-account, per-position, per-payee,
//! per-category, per-tax-basis and per-tag aggregates for any date or date
//! range. It is storage-agnostic: collaborators are reached through the
//! provider traits in [`ledger`].

pub mod analysis;
pub mod buckets;
pub mod constants;
pub mod errors;
pub mod history;
pub mod ledger;
pub mod market_data;
pub mod settings;
pub mod values;

// Re-export the main entry points
pub use analysis::{Analysis, AnalysisKey, AnalysisManager};
pub use buckets::{Bucket, BucketId, BucketKind, BucketList};
pub use settings::AnalysisSettings;
pub use values::{Attribute, Value, Values};

// Re-export error types
pub use errors::Error;
pub use errors::Result;
