//! Decoding of storage notifications into document references.

use aws_lambda_events::event::s3::S3Event;
use tracing::warn;

use crate::AnalyzerError;
use document_analyzer_shared::DocumentReference;

/// Decode an object key as it appears in a notification.
///
/// Keys arrive form-encoded: `+` stands for a space and other reserved or
/// non-ASCII bytes are percent-encoded.
pub fn decode_object_key(raw: &str) -> Result<String, AnalyzerError> {
    let spaced = raw.replace('+', " ");
    urlencoding::decode(&spaced)
        .map(|key| key.into_owned())
        .map_err(|e| AnalyzerError::trigger(format!("Invalid object key {:?}: {}", raw, e)))
}

/// Extract one document reference per notification record.
///
/// Records without a bucket name or object key, or whose key does not
/// decode, are skipped so the remaining records still run.
pub fn document_references(event: &S3Event) -> Vec<DocumentReference> {
    let mut documents = Vec::with_capacity(event.records.len());

    for record in &event.records {
        let (Some(bucket), Some(key)) = (
            record.s3.bucket.name.as_deref(),
            record.s3.object.key.as_deref(),
        ) else {
            warn!("Skipping notification record without bucket or key");
            continue;
        };

        match decode_object_key(key) {
            Ok(object_key) => documents.push(DocumentReference::new(bucket, object_key)),
            Err(e) => warn!(bucket, error = %e, "Skipping notification record with undecodable key"),
        }
    }

    documents
}

#[cfg(test)]
mod tests {
    use super::*;

    const NOTIFICATION: &str = r#"{
      "Records": [
        {
          "eventVersion": "2.1",
          "eventSource": "aws:s3",
          "awsRegion": "us-east-1",
          "eventTime": "2024-05-01T12:00:00.000Z",
          "eventName": "ObjectCreated:Put",
          "userIdentity": { "principalId": "EXAMPLE" },
          "requestParameters": { "sourceIPAddress": "127.0.0.1" },
          "responseElements": {
            "x-amz-request-id": "EXAMPLE123456789",
            "x-amz-id-2": "EXAMPLE123/5678abcdefghijklambdaisawesome/mnopqrstuvwxyzABCDEFGH"
          },
          "s3": {
            "s3SchemaVersion": "1.0",
            "configurationId": "testConfigRule",
            "bucket": {
              "name": "uploads",
              "ownerIdentity": { "principalId": "EXAMPLE" },
              "arn": "arn:aws:s3:::uploads"
            },
            "object": {
              "key": "scans/Q1+report+%C3%A9t%C3%A9.pdf",
              "size": 1024,
              "eTag": "0123456789abcdef0123456789abcdef",
              "sequencer": "0A1B2C3D4E5F678901"
            }
          }
        }
      ]
    }"#;

    #[test]
    fn test_decode_plus_and_percent() {
        assert_eq!(decode_object_key("my+scan%281%29.png").unwrap(), "my scan(1).png");
        assert_eq!(decode_object_key("caf%C3%A9.jpg").unwrap(), "café.jpg");
        assert_eq!(decode_object_key("plain.pdf").unwrap(), "plain.pdf");
    }

    #[test]
    fn test_literal_plus_is_percent_encoded() {
        assert_eq!(decode_object_key("a%2Bb.pdf").unwrap(), "a+b.pdf");
    }

    #[test]
    fn test_invalid_utf8_is_an_error() {
        assert!(decode_object_key("bad%FF.pdf").is_err());
    }

    #[test]
    fn test_document_references_from_notification() {
        let event: S3Event = serde_json::from_str(NOTIFICATION).unwrap();

        let documents = document_references(&event);

        assert_eq!(
            documents,
            vec![DocumentReference::new("uploads", "scans/Q1 report été.pdf")]
        );
    }

    #[test]
    fn test_undecodable_key_skips_only_that_record() {
        let mut notification: serde_json::Value = serde_json::from_str(NOTIFICATION).unwrap();
        let mut broken = notification["Records"][0].clone();
        broken["s3"]["object"]["key"] = serde_json::Value::from("bad%FF.pdf");
        notification["Records"]
            .as_array_mut()
            .unwrap()
            .insert(0, broken);
        let event: S3Event = serde_json::from_value(notification).unwrap();

        let documents = document_references(&event);

        assert_eq!(
            documents,
            vec![DocumentReference::new("uploads", "scans/Q1 report été.pdf")]
        );
    }
}
