//! DynamoDB implementation of `BulkWriteSink`.

use std::collections::HashMap;

use async_trait::async_trait;
use aws_sdk_dynamodb::error::DisplayErrorContext;
use aws_sdk_dynamodb::types::{AttributeValue, PutRequest, WriteRequest};
use aws_sdk_dynamodb::Client;
use tracing::{debug, instrument};

use crate::aws::is_transient;
use crate::config::{TableSchema, ENTITIES_ATTRIBUTE, TEXT_ATTRIBUTE};
use crate::errors::SinkError;
use crate::interfaces::BulkWriteSink;
use document_analyzer_shared::{AnalyzedLine, EntityMention, RecordKey};

/// `BatchWriteItem`-backed sink.
///
/// Item layout: the hash key holds the document key, the range key the line
/// id, `text` the line text and `entities` (only when non-empty) a list of
/// `{ text, type, score }` string maps.
pub struct DynamoDbSink {
    client: Client,
}

impl DynamoDbSink {
    /// Create a sink from a loaded AWS configuration.
    pub fn new(config: &aws_config::SdkConfig) -> Self {
        Self {
            client: Client::new(config),
        }
    }

    /// Wrap an already-built DynamoDB client.
    pub fn from_client(client: Client) -> Self {
        Self { client }
    }

    fn entity_attribute(entity: &EntityMention) -> AttributeValue {
        AttributeValue::M(HashMap::from([
            ("text".to_string(), AttributeValue::S(entity.text.clone())),
            ("type".to_string(), AttributeValue::S(entity.entity_type.clone())),
            (
                "score".to_string(),
                AttributeValue::S(entity.confidence_score.to_string()),
            ),
        ]))
    }

    fn to_item(table: &TableSchema, line: &AnalyzedLine) -> HashMap<String, AttributeValue> {
        let mut item = HashMap::new();
        item.insert(
            table.hash_key_name.clone(),
            AttributeValue::S(line.document_key.clone()),
        );
        item.insert(
            table.range_key_name.clone(),
            AttributeValue::S(line.line_id.clone()),
        );
        item.insert(TEXT_ATTRIBUTE.to_string(), AttributeValue::S(line.text.clone()));

        if let Some(entities) = line.entities.as_ref().filter(|e| !e.is_empty()) {
            item.insert(
                ENTITIES_ATTRIBUTE.to_string(),
                AttributeValue::L(entities.iter().map(Self::entity_attribute).collect()),
            );
        }

        item
    }

    fn to_write_request(
        table: &TableSchema,
        line: &AnalyzedLine,
    ) -> Result<WriteRequest, SinkError> {
        let put = PutRequest::builder()
            .set_item(Some(Self::to_item(table, line)))
            .build()
            .map_err(|e| SinkError::serialization(e.to_string()))?;

        Ok(WriteRequest::builder().put_request(put).build())
    }

    /// Recover the composite key of an unprocessed put request.
    fn key_of(table: &TableSchema, request: &WriteRequest) -> Option<RecordKey> {
        let item = request.put_request()?.item();
        let document_key = item.get(&table.hash_key_name)?.as_s().ok()?;
        let line_id = item.get(&table.range_key_name)?.as_s().ok()?;
        Some(RecordKey::new(document_key.as_str(), line_id.as_str()))
    }
}

#[async_trait]
impl BulkWriteSink for DynamoDbSink {
    #[instrument(skip_all, fields(table = %table.table_name, item_count = items.len()))]
    async fn batch_write(
        &self,
        table: &TableSchema,
        items: &[AnalyzedLine],
    ) -> Result<Vec<RecordKey>, SinkError> {
        let requests = items
            .iter()
            .map(|line| Self::to_write_request(table, line))
            .collect::<Result<Vec<_>, _>>()?;

        let output = self
            .client
            .batch_write_item()
            .request_items(table.table_name.as_str(), requests)
            .send()
            .await
            .map_err(|e| {
                let message = DisplayErrorContext(&e).to_string();
                if is_transient(&e) {
                    SinkError::transient(message)
                } else {
                    SinkError::rejected(message)
                }
            })?;

        let unprocessed_requests = output
            .unprocessed_items()
            .and_then(|tables| tables.get(&table.table_name))
            .map(Vec::as_slice)
            .unwrap_or_default();

        let mut unprocessed = Vec::with_capacity(unprocessed_requests.len());
        for request in unprocessed_requests {
            let key = Self::key_of(table, request).ok_or_else(|| {
                SinkError::serialization("unprocessed item is missing its key attributes")
            })?;
            unprocessed.push(key);
        }

        debug!(unprocessed = unprocessed.len(), "DynamoDB batch completed");
        Ok(unprocessed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn schema() -> TableSchema {
        TableSchema::new("analysis", "document", "line")
    }

    fn line(entities: Option<Vec<EntityMention>>) -> AnalyzedLine {
        AnalyzedLine {
            document_key: "scan.png".to_string(),
            line_id: "line-1".to_string(),
            text: "Jane Doe, Seattle".to_string(),
            entities,
        }
    }

    #[test]
    fn test_item_without_entities_omits_attribute() {
        let item = DynamoDbSink::to_item(&schema(), &line(None));

        assert_eq!(item.len(), 3);
        assert_eq!(item["document"], AttributeValue::S("scan.png".to_string()));
        assert_eq!(item["line"], AttributeValue::S("line-1".to_string()));
        assert!(!item.contains_key(ENTITIES_ATTRIBUTE));
    }

    #[test]
    fn test_item_with_entities_stores_string_maps() {
        let item = DynamoDbSink::to_item(
            &schema(),
            &line(Some(vec![EntityMention::new("Jane Doe", "PERSON", 0.5)])),
        );

        let AttributeValue::L(entities) = &item[ENTITIES_ATTRIBUTE] else {
            panic!("entities should be a list");
        };
        let AttributeValue::M(entity) = &entities[0] else {
            panic!("entity should be a map");
        };
        assert_eq!(entity["type"], AttributeValue::S("PERSON".to_string()));
        assert_eq!(entity["score"], AttributeValue::S("0.5".to_string()));
    }

    #[test]
    fn test_key_recovered_from_write_request() {
        let request = DynamoDbSink::to_write_request(&schema(), &line(None)).unwrap();
        assert_eq!(
            DynamoDbSink::key_of(&schema(), &request),
            Some(RecordKey::new("scan.png", "line-1"))
        );
    }
}
