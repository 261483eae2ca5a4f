//! S3 event notifications as they arrive on the queue.
//!
//! A message body is one of:
//! - an S3 event notification (`{"Records": [...]}`),
//! - the `s3:TestEvent` S3 sends when a notification configuration is saved,
//! - either of the above wrapped in an SNS envelope (`{"Type": "Notification", "Message": "..."}`).

use photodrop_core::SourceObject;
use serde::Deserialize;
use serde_json::Value;

const TEST_EVENT: &str = "s3:TestEvent";
const OBJECT_CREATED_PREFIX: &str = "ObjectCreated:";

#[derive(Debug, thiserror::Error)]
pub enum EventError {
    #[error("Message body is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Message body is not an S3 event notification")]
    Unrecognized,

    #[error("Object key {key} could not be decoded: {reason}")]
    InvalidKey { key: String, reason: String },
}

#[derive(Debug, Clone, Deserialize)]
pub struct S3Event {
    #[serde(rename = "Records", default)]
    pub records: Vec<S3EventRecord>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct S3EventRecord {
    #[serde(rename = "eventName")]
    pub event_name: String,
    pub s3: S3Entity,
}

#[derive(Debug, Clone, Deserialize)]
pub struct S3Entity {
    pub bucket: S3Bucket,
    pub object: S3Object,
}

#[derive(Debug, Clone, Deserialize)]
pub struct S3Bucket {
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct S3Object {
    /// URL-encoded object key, `+` standing for a space.
    pub key: String,
    #[serde(default)]
    pub size: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct TestEvent {
    #[serde(rename = "Event")]
    event: String,
    #[serde(rename = "Bucket", default)]
    bucket: Option<String>,
}

/// A parsed queue message.
#[derive(Debug, Clone)]
pub enum Notification {
    /// Sent by S3 to confirm a notification configuration; carries no object.
    Test { bucket: Option<String> },
    Records(Vec<S3EventRecord>),
}

impl S3EventRecord {
    /// Whether the record reports a new object (any `ObjectCreated:*` event).
    pub fn is_object_created(&self) -> bool {
        self.event_name
            .trim_start_matches("s3:")
            .starts_with(OBJECT_CREATED_PREFIX)
    }

    pub fn bucket(&self) -> &str {
        &self.s3.bucket.name
    }

    /// The object this record refers to, with its key decoded.
    pub fn source_object(&self) -> Result<SourceObject, EventError> {
        let key = decode_key(&self.s3.object.key)?;
        Ok(SourceObject::new(self.s3.bucket.name.clone(), key))
    }
}

/// Decode an object key as S3 encodes it in event notifications.
pub fn decode_key(raw: &str) -> Result<String, EventError> {
    let spaced = raw.replace('+', " ");
    urlencoding::decode(&spaced)
        .map(|key| key.into_owned())
        .map_err(|e| EventError::InvalidKey {
            key: raw.to_string(),
            reason: e.to_string(),
        })
}

/// Parse a queue message body.
pub fn parse_notification(body: &str) -> Result<Notification, EventError> {
    let value: Value = serde_json::from_str(body)?;
    parse_value(value, true)
}

fn parse_value(value: Value, unwrap_envelope: bool) -> Result<Notification, EventError> {
    if value.get("Records").is_some() {
        let event: S3Event = serde_json::from_value(value)?;
        return Ok(Notification::Records(event.records));
    }

    if value.get("Event").and_then(Value::as_str) == Some(TEST_EVENT) {
        let event: TestEvent = serde_json::from_value(value)?;
        tracing::debug!(event = %event.event, "Received S3 test event");
        return Ok(Notification::Test {
            bucket: event.bucket,
        });
    }

    if unwrap_envelope {
        if let Some(message) = value.get("Message").and_then(Value::as_str) {
            let inner: Value = serde_json::from_str(message)?;
            return parse_value(inner, false);
        }
    }

    Err(EventError::Unrecognized)
}

#[cfg(test)]
mod tests {
    use super::*;

    const PUT_EVENT: &str = r#"{
        "Records": [{
            "eventVersion": "2.1",
            "eventSource": "aws:s3",
            "awsRegion": "eu-west-1",
            "eventName": "ObjectCreated:Put",
            "s3": {
                "bucket": {"name": "uploads", "arn": "arn:aws:s3:::uploads"},
                "object": {"key": "2024/06/beach+day%281%29.jpg", "size": 1024, "eTag": "abc"}
            }
        }]
    }"#;

    fn records(body: &str) -> Vec<S3EventRecord> {
        match parse_notification(body).unwrap() {
            Notification::Records(records) => records,
            other => panic!("expected records, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_put_event() {
        let records = records(PUT_EVENT);
        assert_eq!(records.len(), 1);

        let record = &records[0];
        assert!(record.is_object_created());
        assert_eq!(record.bucket(), "uploads");
        assert_eq!(record.s3.object.size, Some(1024));

        let object = record.source_object().unwrap();
        assert_eq!(object, SourceObject::new("uploads", "2024/06/beach day(1).jpg"));
    }

    #[test]
    fn test_decode_key() {
        assert_eq!(decode_key("plain.jpg").unwrap(), "plain.jpg");
        assert_eq!(decode_key("a+b.jpg").unwrap(), "a b.jpg");
        assert_eq!(decode_key("a%2Bb.jpg").unwrap(), "a+b.jpg");
        assert_eq!(decode_key("caf%C3%A9.jpg").unwrap(), "café.jpg");
        assert!(matches!(
            decode_key("bad%FF.jpg"),
            Err(EventError::InvalidKey { .. })
        ));
    }

    #[test]
    fn test_non_create_events() {
        let body = PUT_EVENT.replace("ObjectCreated:Put", "ObjectRemoved:Delete");
        assert!(!records(&body)[0].is_object_created());

        let body = PUT_EVENT.replace("ObjectCreated:Put", "ObjectCreated:CompleteMultipartUpload");
        assert!(records(&body)[0].is_object_created());

        let body = PUT_EVENT.replace("ObjectCreated:Put", "s3:ObjectCreated:Copy");
        assert!(records(&body)[0].is_object_created());
    }

    #[test]
    fn test_sns_envelope_is_unwrapped() {
        let envelope = serde_json::json!({
            "Type": "Notification",
            "MessageId": "4b2c",
            "TopicArn": "arn:aws:sns:eu-west-1:123:uploads",
            "Message": PUT_EVENT,
        })
        .to_string();

        let records = records(&envelope);
        assert_eq!(records[0].bucket(), "uploads");
    }

    #[test]
    fn test_test_event() {
        let body = r#"{"Service":"Amazon S3","Event":"s3:TestEvent","Time":"2024-06-01T00:00:00.000Z","Bucket":"uploads","RequestId":"1","HostId":"2"}"#;
        match parse_notification(body).unwrap() {
            Notification::Test { bucket } => assert_eq!(bucket.as_deref(), Some("uploads")),
            other => panic!("expected test event, got {:?}", other),
        }
    }

    #[test]
    fn test_unrecognized_bodies() {
        assert!(matches!(
            parse_notification("not json"),
            Err(EventError::Json(_))
        ));
        assert!(matches!(
            parse_notification(r#"{"hello": "world"}"#),
            Err(EventError::Unrecognized)
        ));
        // Only one level of envelope is unwrapped.
        let nested = serde_json::json!({
            "Message": serde_json::json!({"Message": PUT_EVENT}).to_string()
        })
        .to_string();
        assert!(matches!(
            parse_notification(&nested),
            Err(EventError::Unrecognized)
        ));
    }
}
