//! Handler module - method registration and per-method dispatch plumbing.
//!
//! Provides:
//! - [`HandlerError`] - the structured error a handler raises deliberately
//! - [`HandlerFailure`] - declared-vs-unexpected handler outcome
//! - [`MethodCodec`] - the per-method (decode, ok-encode, err-encode) triple
//! - [`MethodTable`] - name-to-entry registry, duplicate names rejected
//!
//! # Example
//!
//! ```ignore
//! use pubrpc::codec::JsonCodec;
//! use pubrpc::handler::{HandlerError, HandlerFailure};
//!
//! let dispatcher = pubrpc::Dispatcher::builder()
//!     .method("div", JsonCodec::method_codec(), |params: Option<(i64, i64)>| async move {
//!         let (a, b) = params.ok_or_else(HandlerError::invalid_params)?;
//!         if b == 0 {
//!             return Err(HandlerError::new(1000, "division by zero").into());
//!         }
//!         Ok::<_, HandlerFailure>(Some(a / b))
//!     })?;
//! ```

mod error;
mod registry;

pub use error::{HandlerError, HandlerFailure};
pub use registry::{MethodCodec, MethodEntry, MethodTable};
