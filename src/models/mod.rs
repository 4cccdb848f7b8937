pub mod bucket;
pub mod movement;

pub use bucket::{Bucket, Granularity};
pub use movement::{MovementKind, TransactionRecord, MAX_AMOUNT_CENTS, UNCATEGORIZED};
