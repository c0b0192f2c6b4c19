//! Pluggable value codec.
//!
//! Every value that crosses the worker channel -- the `f` blob, task
//! payloads, and results -- passes through a [`Codec`] before it becomes an
//! opaque byte string. The dispatch engine itself never depends on this
//! trait: it only ever sees `Vec<u8>`. The codec lives at the edges, where
//! the [`crate::wire`] envelope and the coordinator's public API need to turn
//! typed values into bytes and back.
//!
//! # Example
//!
//! ```rust
//! # use dispatch_codec::{Codec, JsonCodec};
//! let codec = JsonCodec;
//! let bytes = codec.encode(&42i32).unwrap();
//! let value: i32 = codec.decode(&bytes).unwrap();
//! assert_eq!(value, 42);
//! ```

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::error::{CodecError, Result};

/// Serializes values to opaque bytes and back.
///
/// Implementations must not assume anything about the shape of `T` beyond
/// what `serde` requires. The engine treats the output as opaque.
pub trait Codec: Send + Sync + std::fmt::Debug {
    /// Serialize `value` into an opaque byte string.
    fn encode<T: Serialize>(&self, value: &T) -> Result<Vec<u8>>;

    /// Deserialize an opaque byte string back into `T`.
    fn decode<T: DeserializeOwned>(&self, bytes: &[u8]) -> Result<T>;
}

/// The default codec: JSON via `serde_json`.
///
/// This is the obvious choice for a crate that otherwise has no opinion
/// about the shape of `f` or of caller values -- every type the corpus
/// serializes over the wire already derives `Serialize`/`Deserialize`.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

impl Codec for JsonCodec {
    fn encode<T: Serialize>(&self, value: &T) -> Result<Vec<u8>> {
        serde_json::to_vec(value).map_err(|e| CodecError::Encode(e.to_string()))
    }

    fn decode<T: DeserializeOwned>(&self, bytes: &[u8]) -> Result<T> {
        serde_json::from_slice(bytes).map_err(|e| CodecError::Decode(e.to_string()))
    }
}
