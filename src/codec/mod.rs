//! Codec module - serialization/deserialization for message buffers.
//!
//! This module provides codecs for the wire shapes in [`crate::message`]:
//!
//! - [`JsonCodec`] - JSON using `serde_json`
//! - [`MsgPackCodec`] - MessagePack using `rmp-serde` (`to_vec_named` for
//!   struct-as-map format, interoperable with JS `@msgpack/msgpack`)
//!
//! # Design
//!
//! Codecs are marker structs with static methods rather than trait objects.
//! Each also builds the injected function bundles the dispatcher and caller
//! consume: per-method [`MethodCodec`](crate::handler::MethodCodec) triples,
//! [`CallCodec`](crate::call::CallCodec) quadruples, head decoders, and the
//! transport-wide default err-encoder.
//!
//! # Example
//!
//! ```
//! use pubrpc::codec::{JsonCodec, MsgPackCodec};
//!
//! let encoded = JsonCodec::encode(&"hello").unwrap();
//! let decoded: String = JsonCodec::decode(&encoded).unwrap();
//! assert_eq!(decoded, "hello");
//!
//! let encoded = MsgPackCodec::encode(&"hello").unwrap();
//! let decoded: String = MsgPackCodec::decode(&encoded).unwrap();
//! assert_eq!(decoded, "hello");
//! ```

mod json;
mod msgpack;

pub use json::JsonCodec;
pub use msgpack::MsgPackCodec;
