//! Paginated full-collection scanner.
//!
//! This module provides the paging loop that drains a collection through
//! any [`PageSource`], independent of the store behind it.

pub mod dynamo;
pub mod json_file;

use crate::analysis::{REV_COMMENT, REV_FEEDBACK};
use crate::models::Record;
use anyhow::{Context, Result};
use tracing::{debug, info};

pub use dynamo::DynamoTable;
pub use json_file::JsonFileSource;

/// Fields requested from a source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Projection {
    fields: Vec<String>,
}

impl Projection {
    /// Create a projection over the given field names.
    pub fn new<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            fields: fields.into_iter().map(Into::into).collect(),
        }
    }

    /// Identifying key plus the two review fields.
    pub fn for_collection(key_field: &str) -> Self {
        Self::new([key_field, REV_COMMENT, REV_FEEDBACK])
    }

    /// Field names in request order.
    pub fn fields(&self) -> &[String] {
        &self.fields
    }
}

/// One batch of records plus the cursor for the next batch, if any.
#[derive(Debug, Clone)]
pub struct ScanPage<C> {
    /// Records returned by this query.
    pub records: Vec<Record>,
    /// Present while more pages remain.
    pub next: Option<C>,
}

/// A paged, read-only data source.
#[allow(async_fn_in_trait)]
pub trait PageSource {
    /// Opaque continuation token.
    type Cursor;

    /// Human-readable name used in logs and errors.
    fn name(&self) -> &str;

    /// Fetch one page restricted to `projection`, starting after `cursor`.
    async fn fetch_page(
        &self,
        projection: &Projection,
        cursor: Option<Self::Cursor>,
    ) -> Result<ScanPage<Self::Cursor>>;
}

/// Read every record of `source`, following continuation tokens until a
/// page arrives without one.
///
/// Any failed page query aborts the scan; nothing collected so far is
/// returned and nothing is retried.
pub async fn scan_all<S: PageSource>(source: &S, projection: &Projection) -> Result<Vec<Record>> {
    let mut records = Vec::new();
    let mut cursor = None;
    let mut page_number = 0usize;

    loop {
        page_number += 1;
        let page = source
            .fetch_page(projection, cursor)
            .await
            .with_context(|| format!("page {} of {} failed", page_number, source.name()))?;

        debug!(
            "{}: page {} returned {} records (more: {})",
            source.name(),
            page_number,
            page.records.len(),
            page.next.is_some()
        );

        records.extend(page.records);

        match page.next {
            Some(next) => cursor = Some(next),
            None => break,
        }
    }

    info!(
        "Scanned {} records from {} in {} pages",
        records.len(),
        source.name(),
        page_number
    );

    Ok(records)
}

#[cfg(test)]
pub(crate) mod testing {
    //! In-memory page source for exercising the scan loop.

    use super::*;
    use std::cell::{Cell, RefCell};

    /// Serves pre-built pages in order; the cursor is the index of the next page.
    pub struct PagedSource {
        pub name: String,
        pub pages: Vec<Vec<Record>>,
        pub fail_on_page: Option<usize>,
        pub calls: Cell<usize>,
        pub seen_cursors: RefCell<Vec<Option<usize>>>,
        pub seen_projections: RefCell<Vec<Projection>>,
    }

    impl PagedSource {
        pub fn new(name: &str, pages: Vec<Vec<Record>>) -> Self {
            Self {
                name: name.to_string(),
                pages,
                fail_on_page: None,
                calls: Cell::new(0),
                seen_cursors: RefCell::new(Vec::new()),
                seen_projections: RefCell::new(Vec::new()),
            }
        }

        pub fn failing_on(mut self, page: usize) -> Self {
            self.fail_on_page = Some(page);
            self
        }
    }

    impl PageSource for PagedSource {
        type Cursor = usize;

        fn name(&self) -> &str {
            &self.name
        }

        async fn fetch_page(
            &self,
            projection: &Projection,
            cursor: Option<usize>,
        ) -> Result<ScanPage<usize>> {
            self.calls.set(self.calls.get() + 1);
            self.seen_cursors.borrow_mut().push(cursor);
            self.seen_projections.borrow_mut().push(projection.clone());

            let index = cursor.unwrap_or(0);
            if self.fail_on_page == Some(index) {
                anyhow::bail!("ProvisionedThroughputExceededException");
            }

            let records = self.pages.get(index).cloned().unwrap_or_default();
            let next = if index + 1 < self.pages.len() {
                Some(index + 1)
            } else {
                None
            };

            Ok(ScanPage { records, next })
        }
    }

    pub fn records(prefix: &str, count: usize) -> Vec<Record> {
        (0..count)
            .map(|i| Record::new().with("log_id", format!("{}-{}", prefix, i)))
            .collect()
    }
}
