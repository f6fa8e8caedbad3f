//! # pubrpc
//!
//! Transport-agnostic request/response dispatch over pub/sub channels,
//! loosely following JSON-RPC 2.0.
//!
//! The core is a [`Dispatcher`]: it receives opaque request buffers from a
//! subscribe primitive, routes them to a registered handler by method name,
//! and publishes a serialized ok or err response on the same channel. Wire
//! encoding and transport are injected - each method brings its own codec
//! triple, and the channel is just a pair of subscribe/publish functions.
//!
//! ## Architecture
//!
//! - **Dispatch** - method lookup, per-method codec indirection,
//!   error-to-code translation, publish-failure escape hatch
//! - **Call** - the client half: correlated, deadline-bound typed calls
//! - **Codecs** - JSON and MsgPack (struct-as-map) out of the box
//! - **Transport** - `Publish`/`Subscribe` capability traits plus an
//!   in-memory pair for tests and same-process wiring
//!
//! ## Example
//!
//! ```ignore
//! use pubrpc::codec::JsonCodec;
//! use pubrpc::{Dispatcher, HandlerError};
//!
//! let dispatcher = Dispatcher::builder()
//!     .method("add", JsonCodec::method_codec(), |params: Option<Params>| async move {
//!         let p = params.ok_or_else(HandlerError::invalid_params)?;
//!         Ok(Some(p.a + p.b))
//!     })?
//!     .head_decoder(JsonCodec::head_decoder())
//!     .err_encoder(JsonCodec::err_encoder())
//!     .publisher(pubsub.publish.clone())
//!     .build()?;
//!
//! dispatcher.attach(pubsub.subscribe.as_ref()).await?;
//! ```

pub mod call;
pub mod codec;
pub mod dispatch;
pub mod error;
pub mod handler;
pub mod message;
pub mod transport;

pub use call::{CallCodec, CallError, Caller, DEFAULT_CALL_TIMEOUT};
pub use dispatch::{Dispatcher, DispatcherBuilder};
pub use error::{BoxError, Result, RpcError};
pub use handler::{HandlerError, HandlerFailure, MethodCodec};
pub use message::{Req, ReqHead, ResErr, ResHead, ResOk, RpcCode};
pub use transport::{PubSub, Publish, Subscribe};
