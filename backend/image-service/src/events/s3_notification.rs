//! S3 bucket notification payloads
//!
//! Parses the JSON document S3 delivers for bucket events. Object keys
//! arrive form-encoded (`+` for space, `%XX` escapes).

use serde::Deserialize;

use super::ObjectCreated;

#[derive(Debug, Deserialize)]
pub struct S3EventNotification {
    // Absent on `s3:TestEvent` payloads
    #[serde(rename = "Records", default)]
    pub records: Vec<S3EventRecord>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct S3EventRecord {
    pub event_name: String,
    pub s3: S3Entity,
}

#[derive(Debug, Deserialize)]
pub struct S3Entity {
    pub bucket: S3Bucket,
    pub object: S3Object,
}

#[derive(Debug, Deserialize)]
pub struct S3Bucket {
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct S3Object {
    pub key: String,
}

impl S3EventNotification {
    pub fn from_slice(body: &[u8]) -> serde_json::Result<Self> {
        serde_json::from_slice(body)
    }

    /// Object-created records as events; removals and other kinds are dropped.
    pub fn object_created_events(&self) -> Vec<ObjectCreated> {
        self.records
            .iter()
            .filter(|record| record.event_name.contains("ObjectCreated:"))
            .map(|record| {
                ObjectCreated::new(&record.s3.bucket.name, decode_key(&record.s3.object.key))
            })
            .collect()
    }
}

fn decode_key(raw: &str) -> String {
    let spaced = raw.replace('+', " ");
    match urlencoding::decode(&spaced) {
        Ok(decoded) => decoded.into_owned(),
        Err(_) => spaced,
    }
}
