//! Method table and the type-erasing method entry.
//!
//! Each registered method carries its own payload types `(P, D, E)` behind a
//! [`MethodCodec`]. [`MethodEntry::new`] erases them into a single call shape
//! (`request buffer + id -> encoded response buffer`) so the dispatcher has
//! one dispatch path regardless of per-method schemas.

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;

use bytes::Bytes;

use super::HandlerFailure;
use crate::error::{BoxError, FaultSink, Result, RpcError};
use crate::message::{ErrResult, Req, ResErr, ResOk, RpcCode};
use crate::transport::BoxFuture;

/// Per-method codec triple: request decoder plus ok/err response encoders.
///
/// Different methods may use different payload shapes (or entirely different
/// wire encodings) while sharing one dispatch path.
pub struct MethodCodec<P, D, E = ()> {
    /// Full request decoder, applied once the method is resolved.
    pub decode_req:
        Box<dyn Fn(&[u8]) -> std::result::Result<Req<P>, BoxError> + Send + Sync>,
    /// Success response encoder.
    pub encode_ok:
        Box<dyn Fn(&ResOk<D>) -> std::result::Result<Vec<u8>, BoxError> + Send + Sync>,
    /// Error response encoder.
    pub encode_err:
        Box<dyn Fn(&ResErr<E>) -> std::result::Result<Vec<u8>, BoxError> + Send + Sync>,
}

type ErasedCall =
    Box<dyn Fn(Bytes, String, Option<FaultSink>) -> BoxFuture<'static, Result<Vec<u8>>> + Send + Sync>;

/// One registered method: handler + codec triple, types erased.
pub struct MethodEntry {
    call: ErasedCall,
}

impl MethodEntry {
    /// Erase a typed handler and codec into a uniform call shape.
    ///
    /// The produced call decodes the request body, invokes the handler with
    /// its params, and encodes the outcome:
    /// - `Ok(None)` -> `{type:"ok"}` with no data key
    /// - `Ok(Some(d))` -> `{type:"ok", data}`
    /// - declared error -> code/message/data verbatim
    /// - anything else (body decode, handler bug, ok-encoder setup) ->
    ///   fixed `INTERNAL_ERROR`; the cause goes to the fault sink only.
    ///
    /// Only an err-encoder failure escapes as `Err`; the dispatcher routes
    /// it like any other transport-level error.
    pub fn new<P, D, E, H, Fut>(name: &str, codec: MethodCodec<P, D, E>, handler: H) -> Self
    where
        P: Send + 'static,
        D: Send + 'static,
        E: Send + 'static,
        H: Fn(Option<P>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = std::result::Result<Option<D>, HandlerFailure<E>>> + Send + 'static,
    {
        let name = name.to_string();
        let codec = Arc::new(codec);
        let handler = Arc::new(handler);

        let call: ErasedCall = Box::new(move |data, id, on_fault| {
            let name = name.clone();
            let codec = Arc::clone(&codec);
            let handler = Arc::clone(&handler);

            Box::pin(async move {
                let outcome = match (codec.decode_req)(&data) {
                    Ok(req) => (handler)(req.params).await,
                    Err(cause) => Err(HandlerFailure::Unexpected(cause)),
                };

                let (err_result, fault): (ErrResult<E>, Option<BoxError>) = match outcome {
                    Ok(payload) => {
                        let res = ResOk::new(id.clone(), payload);
                        match (codec.encode_ok)(&res) {
                            Ok(buf) => return Ok(buf),
                            Err(cause) => {
                                (ErrResult::from_code(RpcCode::InternalError), Some(cause))
                            }
                        }
                    }
                    Err(HandlerFailure::Declared(err)) => (err.into_result(), None),
                    Err(HandlerFailure::Unexpected(cause)) => {
                        (ErrResult::from_code(RpcCode::InternalError), Some(cause))
                    }
                };

                if let Some(cause) = fault {
                    tracing::warn!(method = %name, error = %cause, "handler failed unexpectedly");
                    if let Some(sink) = on_fault {
                        sink(cause);
                    }
                }

                let res = ResErr::new(id, err_result);
                (codec.encode_err)(&res).map_err(|cause| RpcError::Encode {
                    method: name,
                    source: cause,
                })
            })
        });

        Self { call }
    }

    /// Run this method against one request buffer.
    pub(crate) fn call(
        &self,
        data: Bytes,
        id: String,
        on_fault: Option<FaultSink>,
    ) -> BoxFuture<'static, Result<Vec<u8>>> {
        (self.call)(data, id, on_fault)
    }
}

/// Registry mapping method names to entries.
///
/// Immutable once handed to the dispatcher; duplicate names are rejected at
/// registration time rather than silently overwritten.
#[derive(Default)]
pub struct MethodTable {
    methods: HashMap<String, MethodEntry>,
}

impl MethodTable {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a method entry under `name`.
    ///
    /// # Errors
    ///
    /// Returns [`RpcError::DuplicateMethod`] if `name` is already taken.
    pub fn register(&mut self, name: &str, entry: MethodEntry) -> Result<()> {
        if self.methods.contains_key(name) {
            return Err(RpcError::DuplicateMethod(name.to_string()));
        }
        self.methods.insert(name.to_string(), entry);
        Ok(())
    }

    /// Look up a method by name.
    pub fn get(&self, name: &str) -> Option<&MethodEntry> {
        self.methods.get(name)
    }

    /// Number of registered methods.
    pub fn len(&self) -> usize {
        self.methods.len()
    }

    /// Whether the table is empty.
    pub fn is_empty(&self) -> bool {
        self.methods.is_empty()
    }
}
