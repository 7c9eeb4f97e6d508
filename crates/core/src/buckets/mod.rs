//! Buckets module - per-kind aggregation units and their list container.

mod bucket_list;
mod bucket_model;

pub use bucket_list::BucketList;
pub use bucket_model::{Bucket, BucketExtension, BucketId, BucketKind};

#[cfg(test)]
mod bucket_model_tests;
