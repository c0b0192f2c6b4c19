//! The exact wire envelope exchanged over the worker channel.
//!
//! Framing is bit-exact: a JSON object with a `"type"` tag and, where
//! applicable, a `"value"` field holding the base64 encoding of whatever
//! bytes a [`crate::Codec`] produced. Nothing here interprets those bytes.

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// A message sent from the coordinator to a worker.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ToWorker {
    /// The serialized `f` blob, sent once per worker before any task.
    Function {
        /// Base64 of the codec-encoded function blob.
        value: String,
    },
    /// A single task dispatch: base64 of the codec-encoded `(index, payload)`.
    Data {
        /// Base64 of the codec-encoded `(index, payload)` pair.
        value: String,
    },
}

/// A message sent from a worker to the coordinator.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FromWorker {
    /// Voluntary readiness signal, sent with no payload.
    Ready,
    /// A task result: base64 of the codec-encoded `(index, result)` pair.
    Result {
        /// Base64 of the codec-encoded `(index, result)` pair.
        value: String,
    },
}

impl ToWorker {
    /// Build a `function` message from already codec-encoded bytes.
    pub fn function(blob: &[u8]) -> Self {
        ToWorker::Function {
            value: BASE64.encode(blob),
        }
    }

    /// Build a `data` message from an already codec-encoded `(index, payload)`.
    pub fn data(encoded_task: &[u8]) -> Self {
        ToWorker::Data {
            value: BASE64.encode(encoded_task),
        }
    }

    /// Serialize this message to the JSON text frame sent on the wire.
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string(self).map_err(|e| crate::error::CodecError::Encode(e.to_string()))
    }
}

impl FromWorker {
    /// Parse a JSON text frame received from a worker.
    pub fn from_json(text: &str) -> Result<Self> {
        serde_json::from_str(text).map_err(|e| crate::error::CodecError::Decode(e.to_string()))
    }

    /// Decode the base64 `value` field of a `result` message back to raw
    /// codec-encoded bytes. Returns `None` for `ready`, which carries none.
    pub fn decode_value(&self) -> Result<Option<Vec<u8>>> {
        match self {
            FromWorker::Ready => Ok(None),
            FromWorker::Result { value } => Ok(Some(BASE64.decode(value)?)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn function_message_shape_is_bit_exact() {
        let msg = ToWorker::function(b"hello");
        let json = msg.to_json().unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed["type"], "function");
        assert_eq!(parsed["value"], BASE64.encode(b"hello"));
    }

    #[test]
    fn data_message_shape_is_bit_exact() {
        let msg = ToWorker::data(b"task-bytes");
        let json = msg.to_json().unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed["type"], "data");
    }

    #[test]
    fn ready_message_has_no_value_field() {
        let parsed: serde_json::Value = serde_json::from_str(r#"{"type":"ready"}"#).unwrap();
        let msg: FromWorker = serde_json::from_value(parsed).unwrap();
        assert_eq!(msg, FromWorker::Ready);
        assert!(msg.decode_value().unwrap().is_none());
    }

    #[test]
    fn result_message_round_trips_through_json_and_base64() {
        let raw = b"the-actual-result-bytes";
        let encoded = BASE64.encode(raw);
        let text = format!(r#"{{"type":"result","value":"{encoded}"}}"#);

        let msg = FromWorker::from_json(&text).unwrap();
        let decoded = msg.decode_value().unwrap().unwrap();
        assert_eq!(decoded, raw);
    }

    #[test]
    fn unknown_type_is_rejected() {
        let result = FromWorker::from_json(r#"{"type":"bogus"}"#);
        assert!(result.is_err());
    }
}
