//! Review analysis.
//!
//! Classification of individual records and aggregation of a scanned
//! collection into review-completion counts.

pub mod aggregator;
pub mod predicate;

pub use aggregator::*;
pub use predicate::*;
