//! DynamoDB page source.
//!
//! Drives the table's native `Scan` pagination: `LastEvaluatedKey` from one
//! response becomes `ExclusiveStartKey` of the next request.

use super::{PageSource, Projection, ScanPage};
use crate::models::{FieldValue, Record};
use anyhow::{anyhow, Context, Result};
use aws_sdk_dynamodb::error::DisplayErrorContext;
use aws_sdk_dynamodb::types::AttributeValue;
use aws_sdk_dynamodb::Client;
use std::collections::HashMap;

/// Primary key of the last item evaluated by a scan.
pub type StartKey = HashMap<String, AttributeValue>;

/// A DynamoDB table scanned page by page.
#[derive(Debug, Clone)]
pub struct DynamoTable {
    client: Client,
    table_name: String,
    page_size: Option<i32>,
}

impl DynamoTable {
    /// Create a source for `table_name`.
    pub fn new(client: Client, table_name: impl Into<String>) -> Self {
        Self {
            client,
            table_name: table_name.into(),
            page_size: None,
        }
    }

    /// Limit the number of items evaluated per page.
    pub fn with_page_size(mut self, page_size: Option<u32>) -> Self {
        self.page_size = page_size.map(|n| n.min(i32::MAX as u32) as i32);
        self
    }
}

/// Build `#p0, #p1, ...` placeholders so reserved words never reach the
/// projection expression.
pub fn projection_expression(projection: &Projection) -> (String, HashMap<String, String>) {
    let mut names = HashMap::new();
    let placeholders: Vec<String> = projection
        .fields()
        .iter()
        .enumerate()
        .map(|(i, field)| {
            let placeholder = format!("#p{}", i);
            names.insert(placeholder.clone(), field.clone());
            placeholder
        })
        .collect();

    (placeholders.join(", "), names)
}

impl PageSource for DynamoTable {
    type Cursor = StartKey;

    fn name(&self) -> &str {
        &self.table_name
    }

    async fn fetch_page(
        &self,
        projection: &Projection,
        cursor: Option<StartKey>,
    ) -> Result<ScanPage<StartKey>> {
        let (expression, names) = projection_expression(projection);

        let output = self
            .client
            .scan()
            .table_name(&self.table_name)
            .projection_expression(expression)
            .set_expression_attribute_names(Some(names))
            .set_exclusive_start_key(cursor)
            .set_limit(self.page_size)
            .send()
            .await
            .map_err(|e| anyhow!("{}", DisplayErrorContext(&e)))?;

        let records = output
            .items
            .unwrap_or_default()
            .into_iter()
            .map(record_from_item)
            .collect::<Result<Vec<_>>>()?;

        // An empty key map carries no position to resume from.
        let next = output.last_evaluated_key.filter(|key| !key.is_empty());

        Ok(ScanPage { records, next })
    }
}

/// Convert a raw DynamoDB item into a [`Record`].
///
/// An attribute of a type this crate does not know fails the whole item,
/// and with it the page.
pub fn record_from_item(item: HashMap<String, AttributeValue>) -> Result<Record> {
    convert_item(item, FieldValue::try_from)
}

fn convert_item<F>(item: HashMap<String, AttributeValue>, convert: F) -> Result<Record>
where
    F: Fn(AttributeValue) -> Result<FieldValue>,
{
    item.into_iter()
        .map(|(name, value)| {
            let value = convert(value).with_context(|| format!("attribute '{}'", name))?;
            Ok((name, value))
        })
        .collect()
}

fn unsupported_attribute(value: &AttributeValue) -> anyhow::Error {
    anyhow!("unsupported attribute value type in scan response: {:?}", value)
}

impl TryFrom<AttributeValue> for FieldValue {
    type Error = anyhow::Error;

    fn try_from(value: AttributeValue) -> Result<Self> {
        Ok(match value {
            AttributeValue::S(s) => FieldValue::Text(s),
            AttributeValue::N(n) => FieldValue::Number(n),
            AttributeValue::Bool(b) => FieldValue::Bool(b),
            AttributeValue::Null(_) => FieldValue::Null,
            AttributeValue::B(blob) => FieldValue::Binary(blob.into_inner()),
            AttributeValue::L(items) => FieldValue::List(
                items
                    .into_iter()
                    .map(FieldValue::try_from)
                    .collect::<Result<_>>()?,
            ),
            AttributeValue::M(map) => FieldValue::Map(
                map.into_iter()
                    .map(|(k, v)| Ok((k, FieldValue::try_from(v)?)))
                    .collect::<Result<_>>()?,
            ),
            AttributeValue::Ss(items) => FieldValue::TextSet(items),
            AttributeValue::Ns(items) => FieldValue::NumberSet(items),
            AttributeValue::Bs(items) => {
                FieldValue::BinarySet(items.into_iter().map(|b| b.into_inner()).collect())
            }
            other => return Err(unsupported_attribute(&other)),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::is_reviewed;
    use aws_sdk_dynamodb::primitives::Blob;

    #[test]
    fn test_projection_expression_uses_placeholders() {
        let (expression, names) = projection_expression(&Projection::for_collection("id"));

        assert_eq!(expression, "#p0, #p1, #p2");
        assert_eq!(names.get("#p0").map(String::as_str), Some("id"));
        assert_eq!(names.get("#p1").map(String::as_str), Some("rev_comment"));
        assert_eq!(names.get("#p2").map(String::as_str), Some("rev_feedback"));
    }

    fn convert(value: AttributeValue) -> FieldValue {
        FieldValue::try_from(value).unwrap()
    }

    #[test]
    fn test_attribute_conversion() {
        assert_eq!(
            convert(AttributeValue::S("hi".to_string())),
            FieldValue::Text("hi".to_string())
        );
        assert_eq!(
            convert(AttributeValue::N("10".to_string())),
            FieldValue::Number("10".to_string())
        );
        assert_eq!(convert(AttributeValue::Null(true)), FieldValue::Null);
        assert_eq!(
            convert(AttributeValue::B(Blob::new(vec![1, 2]))),
            FieldValue::Binary(vec![1, 2])
        );
        assert_eq!(
            convert(AttributeValue::Ss(vec!["a".to_string()])),
            FieldValue::TextSet(vec!["a".to_string()])
        );
        assert_eq!(
            convert(AttributeValue::L(vec![AttributeValue::M(HashMap::from([(
                "note".to_string(),
                AttributeValue::Bool(true)
            )]))])),
            FieldValue::List(vec![FieldValue::Map(
                [("note".to_string(), FieldValue::Bool(true))].into()
            )])
        );
    }

    #[test]
    fn test_record_from_item() {
        let item = HashMap::from([
            ("log_id".to_string(), AttributeValue::S("abc".to_string())),
            ("rev_comment".to_string(), AttributeValue::S("  ".to_string())),
            ("rev_feedback".to_string(), AttributeValue::S("needs work".to_string())),
        ]);

        let record = record_from_item(item).unwrap();

        assert_eq!(record.len(), 3);
        assert!(is_reviewed(&record));
    }

    #[test]
    fn test_unconvertible_attribute_fails_item() {
        let item = HashMap::from([
            ("log_id".to_string(), AttributeValue::S("abc".to_string())),
            ("rev_comment".to_string(), AttributeValue::Bool(true)),
        ]);

        let err = convert_item(item, |value| {
            if matches!(value, AttributeValue::Bool(_)) {
                Err(unsupported_attribute(&value))
            } else {
                FieldValue::try_from(value)
            }
        })
        .unwrap_err();

        let message = format!("{:#}", err);
        assert!(message.contains("attribute 'rev_comment'"));
        assert!(message.contains("unsupported attribute value type"));
    }

    #[test]
    fn test_page_size_clamped() {
        let config = aws_sdk_dynamodb::Config::builder()
            .behavior_version(aws_sdk_dynamodb::config::BehaviorVersion::latest())
            .region(aws_sdk_dynamodb::config::Region::new("us-east-1"))
            .build();
        let table = DynamoTable::new(Client::from_conf(config), "UnityAIAssistantLogs")
            .with_page_size(Some(u32::MAX));

        assert_eq!(table.page_size, Some(i32::MAX));
        assert_eq!(table.name(), "UnityAIAssistantLogs");
    }
}
