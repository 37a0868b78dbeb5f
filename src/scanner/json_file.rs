//! Local JSON page source.
//!
//! Serves an exported collection (a JSON array of objects) in fixed-size
//! pages, for offline runs and table dumps.

use super::{PageSource, Projection, ScanPage};
use crate::models::{FieldValue, Record};
use anyhow::{bail, Context, Result};
use std::path::Path;

const DEFAULT_PAGE_SIZE: usize = 100;

/// A collection loaded from a JSON file.
#[derive(Debug, Clone)]
pub struct JsonFileSource {
    name: String,
    records: Vec<Record>,
    page_size: usize,
}

impl JsonFileSource {
    /// Load every object from the array stored at `path`.
    pub fn open(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;

        Self::from_json(&content, path)
    }

    fn from_json(content: &str, path: &Path) -> Result<Self> {
        let value: serde_json::Value = serde_json::from_str(content)
            .with_context(|| format!("Failed to parse {}", path.display()))?;

        let items = match value {
            serde_json::Value::Array(items) => items,
            _ => bail!("{} must contain a JSON array of objects", path.display()),
        };

        let mut records: Vec<Record> = Vec::with_capacity(items.len());
        for (index, item) in items.into_iter().enumerate() {
            match item {
                serde_json::Value::Object(fields) => records.push(
                    fields
                        .into_iter()
                        .map(|(k, v)| (k, FieldValue::from(v)))
                        .collect(),
                ),
                other => bail!(
                    "{}: entry {} is not an object (found {})",
                    path.display(),
                    index,
                    other
                ),
            }
        }

        Ok(Self {
            name: path.display().to_string(),
            records,
            page_size: DEFAULT_PAGE_SIZE,
        })
    }

    /// Set the number of records per page. Zero keeps the current size.
    pub fn with_page_size(mut self, page_size: Option<u32>) -> Self {
        if let Some(size) = page_size.filter(|n| *n > 0) {
            self.page_size = size as usize;
        }
        self
    }
}

impl PageSource for JsonFileSource {
    /// Offset of the first record of the next page.
    type Cursor = usize;

    fn name(&self) -> &str {
        &self.name
    }

    async fn fetch_page(
        &self,
        projection: &Projection,
        cursor: Option<usize>,
    ) -> Result<ScanPage<usize>> {
        let start = cursor.unwrap_or(0);
        if start > self.records.len() {
            bail!("cursor {} is past the end of {}", start, self.name);
        }

        let end = (start + self.page_size).min(self.records.len());
        let records = self.records[start..end]
            .iter()
            .cloned()
            .map(|mut record| {
                record.retain_fields(projection.fields());
                record
            })
            .collect();

        let next = if end < self.records.len() {
            Some(end)
        } else {
            None
        };

        Ok(ScanPage { records, next })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scanner::scan_all;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_fixture(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[tokio::test]
    async fn test_pages_follow_page_size() {
        let file = write_fixture(
            r#"[
                {"id": "1", "rev_comment": "ok"},
                {"id": "2"},
                {"id": "3", "rev_feedback": "  "},
                {"id": "4"},
                {"id": "5", "user_name": "sam"}
            ]"#,
        );
        let source = JsonFileSource::open(file.path())
            .unwrap()
            .with_page_size(Some(2));
        let projection = Projection::for_collection("id");

        let first = source.fetch_page(&projection, None).await.unwrap();
        assert_eq!(first.records.len(), 2);
        assert_eq!(first.next, Some(2));

        let last = source.fetch_page(&projection, Some(4)).await.unwrap();
        assert_eq!(last.records.len(), 1);
        assert!(last.next.is_none());
        assert!(last.records[0].get("user_name").is_none());

        let all = scan_all(&source, &projection).await.unwrap();
        assert_eq!(all.len(), 5);
    }

    #[tokio::test]
    async fn test_empty_array_is_single_terminal_page() {
        let file = write_fixture("[]");
        let source = JsonFileSource::open(file.path()).unwrap();

        let page = source
            .fetch_page(&Projection::for_collection("id"), None)
            .await
            .unwrap();

        assert!(page.records.is_empty());
        assert!(page.next.is_none());
    }

    #[test]
    fn test_rejects_non_array() {
        let file = write_fixture(r#"{"id": "1"}"#);
        let err = JsonFileSource::open(file.path()).unwrap_err();
        assert!(err.to_string().contains("JSON array"));
    }

    #[test]
    fn test_rejects_non_object_entries() {
        let file = write_fixture(r#"[{"id": "1"}, 7]"#);
        let err = JsonFileSource::open(file.path()).unwrap_err();
        assert!(err.to_string().contains("entry 1"));
    }

    #[test]
    fn test_missing_file() {
        let err = JsonFileSource::open(Path::new("/nonexistent/chat_logs.json")).unwrap_err();
        assert!(err.to_string().contains("Failed to read"));
    }
}
