//! MsgPack codec using `rmp-serde`.
//!
//! Always uses `to_vec_named`: structs serialize as maps with field names,
//! the format JS `@msgpack/msgpack` peers expect. `to_vec` (positional
//! arrays) would break head decoding, which relies on picking named fields
//! out of a map without the full schema.

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::call::CallCodec;
use crate::dispatch::{ErrEncodeFn, HeadDecodeFn};
use crate::error::Result;
use crate::handler::MethodCodec;

/// MessagePack codec for structured data.
///
/// Uses `rmp_serde::to_vec_named` so structs serialize as maps (with field
/// names) rather than arrays (positional).
pub struct MsgPackCodec;

impl MsgPackCodec {
    /// Encode a value to MsgPack bytes (struct-as-map format).
    ///
    /// # Errors
    ///
    /// Returns error if the value cannot be serialized.
    #[inline]
    pub fn encode<T: Serialize>(value: &T) -> Result<Vec<u8>> {
        Ok(rmp_serde::to_vec_named(value)?)
    }

    /// Decode MsgPack bytes to a value.
    ///
    /// # Errors
    ///
    /// Returns error if the bytes cannot be deserialized to type T.
    #[inline]
    pub fn decode<T: DeserializeOwned>(bytes: &[u8]) -> Result<T> {
        Ok(rmp_serde::from_slice(bytes)?)
    }

    /// Build a per-method codec triple over MsgPack.
    pub fn method_codec<P, D, E>() -> MethodCodec<P, D, E>
    where
        P: DeserializeOwned + 'static,
        D: Serialize + 'static,
        E: Serialize + 'static,
    {
        MethodCodec {
            decode_req: Box::new(|bytes| Self::decode(bytes).map_err(Into::into)),
            encode_ok: Box::new(|res| Self::encode(res).map_err(Into::into)),
            encode_err: Box::new(|res| Self::encode(res).map_err(Into::into)),
        }
    }

    /// Build a request-head decoder over MsgPack.
    pub fn head_decoder() -> HeadDecodeFn {
        Box::new(|bytes| Self::decode(bytes).map_err(Into::into))
    }

    /// Build the registry-independent default err-encoder over MsgPack.
    pub fn err_encoder() -> ErrEncodeFn {
        Box::new(|res| Self::encode(res).map_err(Into::into))
    }

    /// Build a call-side codec quadruple over MsgPack.
    pub fn call_codec<P, D, E>() -> CallCodec<P, D, E>
    where
        P: Serialize + 'static,
        D: DeserializeOwned + 'static,
        E: DeserializeOwned + 'static,
    {
        CallCodec {
            encode_req: Box::new(|req| Self::encode(req).map_err(Into::into)),
            decode_head: Box::new(|bytes| Self::decode(bytes).map_err(Into::into)),
            decode_ok: Box::new(|bytes| Self::decode(bytes).map_err(Into::into)),
            decode_err: Box::new(|bytes| Self::decode(bytes).map_err(Into::into)),
        }
    }
}
