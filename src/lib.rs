pub mod cache;
pub mod config;
pub mod date_utils;
pub mod error;
pub mod filters;
pub mod models;
pub mod services;

pub use models::{Bucket, Granularity, MovementKind, TransactionRecord};
pub use services::bucketizer::{aggregate, Aggregation, Bucketizer, SkippedRecord};

/// Application version from Cargo.toml (single source of truth)
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
