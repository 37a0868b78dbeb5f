//! Review-completion aggregation.
//!
//! Turns a scanned record collection into total/reviewed/pending counts.

use crate::analysis::predicate::is_reviewed;
use crate::models::{MetricsResult, Record};

/// Count total, reviewed and pending records.
///
/// `pending` is derived as `total - reviewed`, which never underflows
/// since `reviewed` counts a subset of the same records.
pub fn aggregate(records: &[Record]) -> MetricsResult {
    let total = records.len();
    let reviewed = records.iter().filter(|r| is_reviewed(r)).count();

    MetricsResult {
        total,
        reviewed,
        pending: total - reviewed,
    }
}
