//! Reviewed/pending classification of a single record.

use crate::models::{FieldValue, Record};

/// Reviewer comment field.
pub const REV_COMMENT: &str = "rev_comment";

/// Reviewer feedback field.
pub const REV_FEEDBACK: &str = "rev_feedback";

/// Returns true if a field carries review content.
///
/// Missing fields, blank values and whitespace-only text all count as empty.
/// The ASCII file, group, record and unit separators (`\x1c`..=`\x1f`) are
/// treated as whitespace too.
pub fn has_content(value: Option<&FieldValue>) -> bool {
    match value {
        None => false,
        Some(v) if v.is_blank() => false,
        Some(v) => !v.to_string().trim_matches(is_space).is_empty(),
    }
}

fn is_space(c: char) -> bool {
    c.is_whitespace() || ('\x1c'..='\x1f').contains(&c)
}

/// A record is reviewed once either review field holds non-whitespace content.
pub fn is_reviewed(record: &Record) -> bool {
    has_content(record.get(REV_COMMENT)) || has_content(record.get(REV_FEEDBACK))
}
