//! Dispatcher - the request/response core.
//!
//! Built once per process from a method table, a head decoder, a publisher,
//! and optional error/fault sinks; exposes [`Dispatcher::dispatch`], invoked
//! once per inbound request buffer.
//!
//! Per invocation:
//! 1. decode the request head (method + id) only;
//! 2. look the method up - unknown methods get a `METHOD_NOT_FOUND` response
//!    encoded with the registry-independent default err-encoder;
//! 3. run the method entry (decode body, invoke handler, encode outcome);
//! 4. publish the response buffer.
//!
//! Failures that cannot produce a wire response (head decode, encode,
//! publish) go to the `on_error` sink when one is configured, otherwise they
//! propagate to the caller. A head-decode failure is the single case where
//! no response is published: the correlation id is unknown.
//!
//! Invocations are independent and stateless; the dispatcher holds only the
//! immutable table and injected functions and may be cloned freely across
//! concurrent invocations.
//!
//! # Example
//!
//! ```ignore
//! use pubrpc::codec::JsonCodec;
//! use pubrpc::Dispatcher;
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
//! let unsubscribe = dispatcher.attach(pubsub.subscribe.as_ref()).await?;
//! ```

use std::future::Future;
use std::sync::Arc;

use bytes::Bytes;

use crate::error::{BoxError, ErrorSink, FaultSink, Result, RpcError};
use crate::handler::{HandlerFailure, MethodCodec, MethodEntry, MethodTable};
use crate::message::{ReqHead, ResErr, RpcCode};
use crate::transport::{Listener, Publish, Subscribe, Unsubscribe};

/// Head decoder: buffer -> `ReqHead`, usable before the method is resolved.
pub type HeadDecodeFn =
    Box<dyn Fn(&[u8]) -> std::result::Result<ReqHead, BoxError> + Send + Sync>;

/// Registry-independent err-encoder for the generic `ResErr<()>` shape.
///
/// Used where no method (and thus no codec triple) was resolved.
pub type ErrEncodeFn =
    Box<dyn Fn(&ResErr) -> std::result::Result<Vec<u8>, BoxError> + Send + Sync>;

/// Builder for configuring and creating a [`Dispatcher`].
pub struct DispatcherBuilder {
    table: MethodTable,
    decode_head: Option<HeadDecodeFn>,
    encode_err: Option<ErrEncodeFn>,
    publish: Option<Arc<dyn Publish>>,
    on_error: Option<ErrorSink>,
    on_fault: Option<FaultSink>,
}

impl DispatcherBuilder {
    /// Create an empty builder.
    pub fn new() -> Self {
        Self {
            table: MethodTable::new(),
            decode_head: None,
            encode_err: None,
            publish: None,
            on_error: None,
            on_fault: None,
        }
    }

    /// Register a method with its codec triple and handler.
    ///
    /// The handler receives the decoded `params` (absent on the wire ->
    /// `None`) and resolves to an optional payload or a
    /// [`HandlerFailure`].
    ///
    /// # Errors
    ///
    /// Returns [`RpcError::DuplicateMethod`] if `name` is already registered.
    pub fn method<P, D, E, H, Fut>(
        mut self,
        name: &str,
        codec: MethodCodec<P, D, E>,
        handler: H,
    ) -> Result<Self>
    where
        P: Send + 'static,
        D: Send + 'static,
        E: Send + 'static,
        H: Fn(Option<P>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = std::result::Result<Option<D>, HandlerFailure<E>>> + Send + 'static,
    {
        self.table
            .register(name, MethodEntry::new(name, codec, handler))?;
        Ok(self)
    }

    /// Set the request-head decoder. Required.
    pub fn head_decoder(mut self, decode: HeadDecodeFn) -> Self {
        self.decode_head = Some(decode);
        self
    }

    /// Set the transport-wide default err-encoder. Required.
    ///
    /// Unknown-method responses carry no method-specific schema, so this
    /// encoder must exist independently of the registry.
    pub fn err_encoder(mut self, encode: ErrEncodeFn) -> Self {
        self.encode_err = Some(encode);
        self
    }

    /// Set the publish primitive. Required.
    pub fn publisher(mut self, publish: Arc<dyn Publish>) -> Self {
        self.publish = Some(publish);
        self
    }

    /// Set the sink for errors the dispatcher will not propagate.
    ///
    /// Without it, transport-level failures are returned from `dispatch`.
    pub fn on_error(mut self, sink: impl Fn(RpcError) + Send + Sync + 'static) -> Self {
        self.on_error = Some(Arc::new(sink));
        self
    }

    /// Set the diagnostic sink for causes swallowed behind `INTERNAL_ERROR`
    /// responses. Purely observational; never changes what goes on the wire.
    pub fn on_fault(mut self, sink: impl Fn(BoxError) + Send + Sync + 'static) -> Self {
        self.on_fault = Some(Arc::new(sink));
        self
    }

    /// Build the dispatcher.
    ///
    /// # Errors
    ///
    /// Returns [`RpcError::Config`] if the head decoder, default
    /// err-encoder, or publisher is missing.
    pub fn build(self) -> Result<Dispatcher> {
        let decode_head = self
            .decode_head
            .ok_or(RpcError::Config("head decoder is required"))?;
        let encode_err = self
            .encode_err
            .ok_or(RpcError::Config("default err-encoder is required"))?;
        let publish = self
            .publish
            .ok_or(RpcError::Config("publisher is required"))?;

        Ok(Dispatcher {
            inner: Arc::new(Inner {
                table: self.table,
                decode_head,
                encode_err,
                publish,
                on_error: self.on_error,
                on_fault: self.on_fault,
            }),
        })
    }
}

impl Default for DispatcherBuilder {
    fn default() -> Self {
        Self::new()
    }
}

struct Inner {
    table: MethodTable,
    decode_head: HeadDecodeFn,
    encode_err: ErrEncodeFn,
    publish: Arc<dyn Publish>,
    on_error: Option<ErrorSink>,
    on_fault: Option<FaultSink>,
}

/// The request/response dispatcher.
///
/// Cheap to clone; all state is immutable and shared.
#[derive(Clone)]
pub struct Dispatcher {
    inner: Arc<Inner>,
}

impl Dispatcher {
    /// Create a new dispatcher builder.
    pub fn builder() -> DispatcherBuilder {
        DispatcherBuilder::new()
    }

    /// Handle one inbound request buffer.
    ///
    /// Always publishes exactly one ok- or err-response correlated by id,
    /// except when the head itself cannot be decoded.
    ///
    /// # Errors
    ///
    /// With an `on_error` sink configured this never returns an error: the
    /// failure is handed to the sink instead. Without one, head-decode,
    /// encode, and publish failures are returned to the caller.
    pub async fn dispatch(&self, data: Bytes) -> Result<()> {
        match self.run(data).await {
            Ok(()) => Ok(()),
            Err(reason) => match &self.inner.on_error {
                Some(sink) => {
                    sink(reason);
                    Ok(())
                }
                None => Err(reason),
            },
        }
    }

    async fn run(&self, data: Bytes) -> Result<()> {
        let head = (self.inner.decode_head)(&data).map_err(RpcError::HeadDecode)?;
        tracing::debug!(method = %head.method, id = %head.id, "dispatching request");

        let buf = match self.inner.table.get(&head.method) {
            Some(entry) => {
                entry
                    .call(data, head.id, self.inner.on_fault.clone())
                    .await?
            }
            None => {
                tracing::debug!(method = %head.method, "method not found");
                let res = ResErr::from_code(head.id.clone(), RpcCode::MethodNotFound);
                (self.inner.encode_err)(&res).map_err(|cause| RpcError::Encode {
                    method: head.method.clone(),
                    source: cause,
                })?
            }
        };

        self.inner
            .publish
            .publish(Bytes::from(buf))
            .await
            .map_err(RpcError::Publish)
    }

    /// Install this dispatcher as the listener of a subscribe primitive.
    ///
    /// Errors `dispatch` would propagate (no `on_error` configured) are
    /// reported via `tracing::error!` here, since a transport listener has
    /// no caller to propagate to.
    ///
    /// # Errors
    ///
    /// Returns [`RpcError::Subscribe`] if the primitive fails to install
    /// the listener.
    pub async fn attach(&self, subscribe: &dyn Subscribe) -> Result<Unsubscribe> {
        let dispatcher = self.clone();
        let listener: Listener = Arc::new(move |data: Bytes| {
            let dispatcher = dispatcher.clone();
            Box::pin(async move {
                if let Err(reason) = dispatcher.dispatch(data).await {
                    tracing::error!(error = %reason, "dispatch failed");
                }
            })
        });

        subscribe
            .subscribe(listener)
            .await
            .map_err(RpcError::Subscribe)
    }
}
