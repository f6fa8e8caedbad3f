//! Error types for pubrpc.

use std::sync::Arc;

use thiserror::Error;

/// Boxed error used at every injected seam (codecs, transport, sinks).
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Sink for errors the dispatcher chooses not to propagate.
///
/// When configured, transport-level failures (header decode, publish) are
/// routed here instead of being returned from `dispatch`.
pub type ErrorSink = Arc<dyn Fn(RpcError) + Send + Sync>;

/// Diagnostic-only sink for the causes behind synthetic `INTERNAL_ERROR`
/// responses. The cause never reaches the wire; this sink is the only place
/// it can be observed.
pub type FaultSink = Arc<dyn Fn(BoxError) + Send + Sync>;

/// Main error type for all pubrpc operations.
#[derive(Debug, Error)]
pub enum RpcError {
    /// Request header could not be decoded; no response can be correlated.
    #[error("request head decode error: {0}")]
    HeadDecode(#[source] BoxError),

    /// A response could not be encoded for publishing.
    #[error("response encode error for method '{method}': {source}")]
    Encode {
        /// Requested method name.
        method: String,
        /// Underlying encoder failure.
        #[source]
        source: BoxError,
    },

    /// A response could not be decoded by the call side.
    #[error("response decode error for method '{method}': {source}")]
    Decode {
        /// Called method name.
        method: String,
        /// Underlying decoder failure.
        #[source]
        source: BoxError,
    },

    /// Publish failed after a response was built.
    #[error("publish error: {0}")]
    Publish(#[source] BoxError),

    /// Subscribe primitive failed to install a listener.
    #[error("subscribe error: {0}")]
    Subscribe(#[source] BoxError),

    /// Method name registered twice.
    #[error("duplicate method: {0}")]
    DuplicateMethod(String),

    /// Dispatcher builder is missing a required piece.
    #[error("dispatcher config error: {0}")]
    Config(&'static str),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// MsgPack serialization error.
    #[error("MsgPack encode error: {0}")]
    MsgPackEncode(#[from] rmp_serde::encode::Error),

    /// MsgPack deserialization error.
    #[error("MsgPack decode error: {0}")]
    MsgPackDecode(#[from] rmp_serde::decode::Error),

    /// Response channel closed before a reply arrived.
    #[error("connection closed")]
    ConnectionClosed,
}

/// Result type alias using RpcError.
pub type Result<T> = std::result::Result<T, RpcError>;
