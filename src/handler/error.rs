//! Handler-declared errors and the handler outcome type.

use std::fmt;

use crate::error::BoxError;
use crate::message::{ErrResult, RpcCode};

/// Structured error a handler raises deliberately.
///
/// Code, message, and data are caller-chosen, opaque to the dispatcher, and
/// copied verbatim into the err response.
#[derive(Debug, Clone, PartialEq)]
pub struct HandlerError<E = ()> {
    /// Numeric wire code.
    pub code: i64,
    /// Human-readable message.
    pub message: String,
    /// Optional structured error payload.
    pub data: Option<E>,
}

impl<E> HandlerError<E> {
    /// Build a handler error with no data payload.
    pub fn new(code: i64, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            data: None,
        }
    }

    /// Build a handler error from the reserved taxonomy.
    pub fn from_code(code: RpcCode) -> Self {
        Self::new(code.code(), code.message())
    }

    /// Shorthand for the reserved `INVALID_PARAMS` error.
    pub fn invalid_params() -> Self {
        Self::from_code(RpcCode::InvalidParams)
    }

    /// Attach a structured data payload.
    pub fn with_data(mut self, data: E) -> Self {
        self.data = Some(data);
        self
    }

    /// Convert into the wire-shaped err result.
    pub fn into_result(self) -> ErrResult<E> {
        ErrResult::new(self.code, self.message, self.data)
    }
}

impl<E> fmt::Display for HandlerError<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (code {})", self.message, self.code)
    }
}

/// Everything a handler invocation can fail with.
///
/// `Declared` maps 1:1 onto the wire; `Unexpected` maps to the fixed
/// `INTERNAL_ERROR` response and its cause stays off the wire.
#[derive(Debug)]
pub enum HandlerFailure<E = ()> {
    /// Structured error raised intentionally by the handler.
    Declared(HandlerError<E>),
    /// Any other failure (body decode, handler bug, encoder setup).
    Unexpected(BoxError),
}

impl<E> HandlerFailure<E> {
    /// Wrap an arbitrary cause as an unexpected failure.
    pub fn unexpected(cause: impl Into<BoxError>) -> Self {
        Self::Unexpected(cause.into())
    }
}

impl<E> From<HandlerError<E>> for HandlerFailure<E> {
    fn from(err: HandlerError<E>) -> Self {
        Self::Declared(err)
    }
}

impl<E> From<std::io::Error> for HandlerFailure<E> {
    fn from(err: std::io::Error) -> Self {
        Self::Unexpected(Box::new(err))
    }
}

impl<E> From<serde_json::Error> for HandlerFailure<E> {
    fn from(err: serde_json::Error) -> Self {
        Self::Unexpected(Box::new(err))
    }
}

impl<E> From<rmp_serde::decode::Error> for HandlerFailure<E> {
    fn from(err: rmp_serde::decode::Error) -> Self {
        Self::Unexpected(Box::new(err))
    }
}

impl<E> From<rmp_serde::encode::Error> for HandlerFailure<E> {
    fn from(err: rmp_serde::encode::Error) -> Self {
        Self::Unexpected(Box::new(err))
    }
}
