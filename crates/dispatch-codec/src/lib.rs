//! Dispatch payload codec and wire envelope.
//!
//! This crate provides the two pieces the dispatch engine treats as opaque:
//!
//! - **[`codec`]** -- [`Codec`], the pluggable `value <-> bytes` capability,
//!   and [`JsonCodec`], the default `serde_json`-backed implementation.
//! - **[`wire`]** -- [`ToWorker`]/[`FromWorker`], the bit-exact JSON envelope
//!   exchanged over the worker channel, with base64 framing of codec output.
//! - **[`error`]** -- [`CodecError`], the unified error type.
//!
//! Neither `dispatch-kernel` nor `dispatch-transport` need to know that JSON
//! or base64 are involved; they only see `Vec<u8>` and `ToWorker`/`FromWorker`
//! values respectively.

pub mod codec;
pub mod error;
pub mod wire;

pub use codec::{Codec, JsonCodec};
pub use error::{CodecError, Result};
pub use wire::{FromWorker, ToWorker};
