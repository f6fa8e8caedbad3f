//! Wire message shapes ("loosely JSON-RPC 2.0").
//!
//! Requests carry a `method`, an opaque correlation `id`, and optional
//! `params`. Responses carry the same `id` and a tagged `result` that is
//! either `{type: "ok", data?}` or `{type: "err", code, message, data?}`.
//!
//! The `data` field is *omitted* when empty, never serialized as null —
//! consumers distinguish the two shapes.
//!
//! Head types ([`ReqHead`], [`ResHead`]) decode the minimal prefix of a
//! message without knowing the method-specific payload schema; serde ignores
//! the fields they leave out.

use serde::{Deserialize, Serialize};

/// Closed set of synthetic error kinds, with the JSON-RPC 2.0 reserved
/// codes and messages as parallel constant tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RpcCode {
    /// Invalid wire data (reserved for callers wrapping decode).
    ParseError,
    /// Structurally invalid request (reserved for callers adding validation).
    InvalidRequest,
    /// Method not present in the registry.
    MethodNotFound,
    /// Invalid method parameters (reserved for decoders/handlers).
    InvalidParams,
    /// Any failure other than a handler-declared error.
    InternalError,
}

impl RpcCode {
    /// Numeric wire code.
    pub const fn code(self) -> i64 {
        match self {
            Self::ParseError => -32700,
            Self::InvalidRequest => -32600,
            Self::MethodNotFound => -32601,
            Self::InvalidParams => -32602,
            Self::InternalError => -32603,
        }
    }

    /// Canonical wire message.
    pub const fn message(self) -> &'static str {
        match self {
            Self::ParseError => "Parse error",
            Self::InvalidRequest => "Invalid Request",
            Self::MethodNotFound => "Method not found",
            Self::InvalidParams => "Invalid params",
            Self::InternalError => "Internal error",
        }
    }
}

/// Minimal decodable prefix of a request: method + correlation id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReqHead {
    /// Requested method name.
    pub method: String,
    /// Opaque correlation token, echoed back in the response.
    pub id: String,
}

/// Full request, decoded once the method (and thus the params schema)
/// is known.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Req<P> {
    /// Requested method name.
    pub method: String,
    /// Opaque correlation token.
    pub id: String,
    /// Method parameters; absent on the wire decodes to `None`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub params: Option<P>,
}

/// Discriminant of a response result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResultKind {
    /// Success result.
    Ok,
    /// Error result.
    Err,
}

/// Success result: `{type: "ok", data?}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OkResult<D> {
    /// Always [`ResultKind::Ok`] when built by this crate.
    #[serde(rename = "type")]
    pub kind: ResultKind,
    /// Handler payload; omitted from the wire when `None`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<D>,
}

impl<D> OkResult<D> {
    /// Build a success result, with or without a payload.
    pub fn new(data: Option<D>) -> Self {
        Self {
            kind: ResultKind::Ok,
            data,
        }
    }
}

/// Error result: `{type: "err", code, message, data?}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrResult<E = ()> {
    /// Always [`ResultKind::Err`] when built by this crate.
    #[serde(rename = "type")]
    pub kind: ResultKind,
    /// Numeric error code.
    pub code: i64,
    /// Human-readable message.
    pub message: String,
    /// Optional structured error payload; omitted from the wire when `None`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<E>,
}

impl<E> ErrResult<E> {
    /// Build an error result from explicit parts.
    pub fn new(code: i64, message: impl Into<String>, data: Option<E>) -> Self {
        Self {
            kind: ResultKind::Err,
            code,
            message: message.into(),
            data,
        }
    }

    /// Build a synthetic error result from the closed taxonomy.
    pub fn from_code(code: RpcCode) -> Self {
        Self::new(code.code(), code.message(), None)
    }
}

/// Success response envelope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResOk<D> {
    /// Correlation id copied from the request.
    pub id: String,
    /// The tagged success result.
    pub result: OkResult<D>,
}

impl<D> ResOk<D> {
    /// Build a success response for the given correlation id.
    pub fn new(id: impl Into<String>, data: Option<D>) -> Self {
        Self {
            id: id.into(),
            result: OkResult::new(data),
        }
    }
}

/// Error response envelope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResErr<E = ()> {
    /// Correlation id copied from the request.
    pub id: String,
    /// The tagged error result.
    pub result: ErrResult<E>,
}

impl<E> ResErr<E> {
    /// Build an error response from an already-built result.
    pub fn new(id: impl Into<String>, result: ErrResult<E>) -> Self {
        Self {
            id: id.into(),
            result,
        }
    }

    /// Build a synthetic error response from the closed taxonomy.
    pub fn from_code(id: impl Into<String>, code: RpcCode) -> Self {
        Self::new(id, ErrResult::from_code(code))
    }
}

/// Result head: just the discriminant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResResultHead {
    /// Whether the full result is ok- or err-shaped.
    #[serde(rename = "type")]
    pub kind: ResultKind,
}

/// Minimal decodable prefix of a response: id + result discriminant.
///
/// Lets a caller match the correlation id and pick the right decoder before
/// committing to a payload schema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResHead {
    /// Correlation id.
    pub id: String,
    /// Result discriminant.
    pub result: ResResultHead,
}
