//! JSON codec using `serde_json`.

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::call::CallCodec;
use crate::dispatch::{ErrEncodeFn, HeadDecodeFn};
use crate::error::Result;
use crate::handler::MethodCodec;

/// JSON codec for structured data.
pub struct JsonCodec;

impl JsonCodec {
    /// Encode a value to JSON bytes.
    ///
    /// # Errors
    ///
    /// Returns error if the value cannot be serialized.
    #[inline]
    pub fn encode<T: Serialize>(value: &T) -> Result<Vec<u8>> {
        Ok(serde_json::to_vec(value)?)
    }

    /// Decode JSON bytes to a value.
    ///
    /// # Errors
    ///
    /// Returns error if the bytes cannot be deserialized to type T.
    #[inline]
    pub fn decode<T: DeserializeOwned>(bytes: &[u8]) -> Result<T> {
        Ok(serde_json::from_slice(bytes)?)
    }

    /// Build a per-method codec triple over JSON.
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

    /// Build a request-head decoder over JSON.
    pub fn head_decoder() -> HeadDecodeFn {
        Box::new(|bytes| Self::decode(bytes).map_err(Into::into))
    }

    /// Build the registry-independent default err-encoder over JSON.
    pub fn err_encoder() -> ErrEncodeFn {
        Box::new(|res| Self::encode(res).map_err(Into::into))
    }

    /// Build a call-side codec quadruple over JSON.
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
