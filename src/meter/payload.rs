use clap::ValueEnum;
use std::time::SystemTime;
use time::format_description::well_known::Rfc3339;
use time::{OffsetDateTime, UtcOffset};

/// Bucket (and publish name) used for storage records unless overridden.
pub const DEFAULT_BUCKET: &str = "AudioVolume";

/// Shape of the publish payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum PayloadFormat {
    /// Binary storage record named after the bucket.
    Record,
    /// `vol,<level>,<amplitude>` carried in the name, no payload bytes.
    Text,
}

impl PayloadFormat {
    pub fn label(self) -> &'static str {
        match self {
            PayloadFormat::Record => "record",
            PayloadFormat::Text => "text",
        }
    }
}

/// What the sink should receive for one published block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublicationRequest {
    pub name: String,
    pub payload: Option<Vec<u8>>,
}

impl PublicationRequest {
    pub(super) fn text(level: u8, amplitude: f64) -> Self {
        Self {
            name: format!("vol,{level},{amplitude}"),
            payload: None,
        }
    }

    pub(super) fn record(bucket: &str, record: &StorageRecord) -> Self {
        Self {
            name: bucket.to_string(),
            payload: Some(record.encode()),
        }
    }
}

/// Storage-channel record: bucket, timestamped object name, opaque bytes.
///
/// Encoded with protobuf wire rules (fields 1..=3, length-delimited) so a
/// storage provider can decode it with its own generated types.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageRecord {
    pub bucket_name: String,
    pub object_name: String,
    pub record: Vec<u8>,
}

const WIRE_LENGTH_DELIMITED: u8 = 2;

impl StorageRecord {
    pub fn new(bucket: &str, captured: SystemTime, utc_offset_hours: i8, level: u8) -> Self {
        Self {
            bucket_name: bucket.to_string(),
            object_name: object_name_for(captured, utc_offset_hours),
            record: vec![level],
        }
    }

    pub fn encode(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(
            self.bucket_name.len() + self.object_name.len() + self.record.len() + 8,
        );
        put_bytes(&mut out, 1, self.bucket_name.as_bytes());
        put_bytes(&mut out, 2, self.object_name.as_bytes());
        put_bytes(&mut out, 3, &self.record);
        out
    }
}

// Empty fields are omitted, matching proto3 default-value elision.
fn put_bytes(out: &mut Vec<u8>, field: u8, bytes: &[u8]) {
    if bytes.is_empty() {
        return;
    }
    out.push((field << 3) | WIRE_LENGTH_DELIMITED);
    put_varint(out, bytes.len() as u64);
    out.extend_from_slice(bytes);
}

fn put_varint(out: &mut Vec<u8>, mut value: u64) {
    while value >= 0x80 {
        out.push((value as u8 & 0x7f) | 0x80);
        value >>= 7;
    }
    out.push(value as u8);
}

/// RFC 3339 timestamp of `captured` in the requested offset.
pub(crate) fn object_name_for(captured: SystemTime, utc_offset_hours: i8) -> String {
    let offset = UtcOffset::from_hms(utc_offset_hours, 0, 0).unwrap_or(UtcOffset::UTC);
    let stamp = OffsetDateTime::from(captured).to_offset(offset);
    stamp
        .format(&Rfc3339)
        .unwrap_or_else(|_| stamp.unix_timestamp_nanos().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{Duration, UNIX_EPOCH};

    fn fixed_time() -> SystemTime {
        // 2024-03-01T12:30:45.5Z
        UNIX_EPOCH + Duration::from_millis(1_709_296_245_500)
    }

    #[test]
    fn object_name_is_rfc3339_utc() {
        assert_eq!(
            object_name_for(fixed_time(), 0),
            "2024-03-01T12:30:45.5Z"
        );
    }

    #[test]
    fn object_name_applies_offset() {
        assert_eq!(
            object_name_for(fixed_time(), 9),
            "2024-03-01T21:30:45.5+09:00"
        );
    }

    #[test]
    fn record_encodes_length_delimited_fields() {
        let record = StorageRecord {
            bucket_name: "AB".to_string(),
            object_name: "t".to_string(),
            record: vec![12],
        };
        assert_eq!(
            record.encode(),
            vec![0x0a, 2, b'A', b'B', 0x12, 1, b't', 0x1a, 1, 12]
        );
    }

    #[test]
    fn record_skips_empty_fields() {
        let record = StorageRecord {
            bucket_name: String::new(),
            object_name: "t".to_string(),
            record: Vec::new(),
        };
        assert_eq!(record.encode(), vec![0x12, 1, b't']);
    }

    #[test]
    fn long_fields_use_multibyte_length() {
        let record = StorageRecord {
            bucket_name: "b".repeat(200),
            object_name: String::new(),
            record: Vec::new(),
        };
        let encoded = record.encode();
        // 200 = 0b1_1001000 -> [0xc8, 0x01]
        assert_eq!(&encoded[..3], &[0x0a, 0xc8, 0x01]);
        assert_eq!(encoded.len(), 203);
    }

    #[test]
    fn text_request_has_no_payload() {
        let request = PublicationRequest::text(12, 0.5);
        assert_eq!(request.name, "vol,12,0.5");
        assert!(request.payload.is_none());
    }

    #[test]
    fn record_request_is_named_after_bucket() {
        let record = StorageRecord::new(DEFAULT_BUCKET, fixed_time(), 0, 220);
        let request = PublicationRequest::record(DEFAULT_BUCKET, &record);
        assert_eq!(request.name, DEFAULT_BUCKET);
        let payload = request.payload.unwrap_or_default();
        assert_eq!(payload.last().copied(), Some(220));
        assert_eq!(payload[0], 0x0a);
    }
}
