//! Encoding of payloads into the bytes a [Value](crate::Value) carries.
//!
//! Username records are stored as bencode dictionaries, raw payloads are
//! plain UTF-8 text.

use std::time::{SystemTime, UNIX_EPOCH};

use bytes::Bytes;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
/// A username registration as it is stored in the DHT.
///
/// The username itself is not part of the payload, it is implied by the key
/// the record is stored under.
pub struct UsernameRecord {
    pub node_id: String,
    pub endpoint: String,
    /// Milliseconds since the Unix epoch at which the record was encoded.
    #[serde(rename = "registered")]
    pub registered_at_millis: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Caller supplied part of a [UsernameRecord].
pub struct Registration {
    pub node_id: String,
    pub endpoint: String,
}

#[derive(thiserror::Error, Debug)]
pub enum CodecError {
    /// Stored bytes are not a well formed record.
    #[error("Invalid value format: {0}")]
    MalformedValue(#[source] serde_bencode::Error),

    #[error("Failed to encode record: {0}")]
    Encode(#[source] serde_bencode::Error),
}

/// Encode a registration, stamping it with the current time.
pub fn encode_record(registration: &Registration) -> Result<Bytes, CodecError> {
    let record = UsernameRecord {
        node_id: registration.node_id.clone(),
        endpoint: registration.endpoint.clone(),
        registered_at_millis: now_millis(),
    };

    serde_bencode::to_bytes(&record)
        .map(Bytes::from)
        .map_err(CodecError::Encode)
}

pub fn decode_record(bytes: &[u8]) -> Result<UsernameRecord, CodecError> {
    serde_bencode::from_bytes(bytes).map_err(CodecError::MalformedValue)
}

pub fn encode_raw(text: &str) -> Bytes {
    Bytes::copy_from_slice(text.as_bytes())
}

/// Invalid UTF-8 sequences are replaced with `U+FFFD`.
pub fn decode_raw(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes).into_owned()
}

fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or_default()
}

#[cfg(test)]
mod test {
    use super::*;

    fn registration() -> Registration {
        Registration {
            node_id: "HZXXs9LTfNQjrDKvvexRhuMk8TTJhYCfrHwaj3jUzuhZ".to_string(),
            endpoint: "https://alice.example.com".to_string(),
        }
    }

    #[test]
    fn record_round_trip() {
        let before = now_millis();
        let bytes = encode_record(&registration()).unwrap();
        let record = decode_record(&bytes).unwrap();

        assert_eq!(record.node_id, registration().node_id);
        assert_eq!(record.endpoint, registration().endpoint);
        assert!(record.registered_at_millis >= before);
    }

    #[test]
    fn record_is_canonical_dict() {
        let bytes = encode_record(&Registration {
            node_id: "n".to_string(),
            endpoint: "e".to_string(),
        })
        .unwrap();

        assert!(bytes.starts_with(b"d8:endpoint1:e6:nodeId1:n10:registeredi"));
        assert!(bytes.ends_with(b"ee"));
    }

    #[test]
    fn decode_ignores_unknown_fields() {
        let record =
            decode_record(b"d8:endpoint1:e5:extra3:foo6:nodeId1:n10:registeredi42ee").unwrap();

        assert_eq!(
            record,
            UsernameRecord {
                node_id: "n".to_string(),
                endpoint: "e".to_string(),
                registered_at_millis: 42,
            }
        );
    }

    #[test]
    fn decode_malformed() {
        assert!(matches!(
            decode_record(b"not bencode"),
            Err(CodecError::MalformedValue(_))
        ));
        // Missing `endpoint`.
        assert!(matches!(
            decode_record(b"d6:nodeId1:n10:registeredi42ee"),
            Err(CodecError::MalformedValue(_))
        ));
    }

    #[test]
    fn raw_passthrough() {
        assert_eq!(encode_raw("hello"), Bytes::from_static(b"hello"));
        assert_eq!(decode_raw(b"hello"), "hello");
        assert_eq!(decode_raw(&[0x68, 0xff]), "h\u{fffd}");
    }
}
