//! Transport capability seams.
//!
//! The core never touches a socket: it is handed a [`Publish`] for the
//! outbound side and installs a listener through a [`Subscribe`] for the
//! inbound side. Both traits are single-method and object-safe; `Publish`
//! also has a blanket impl for async closures so tests and glue code can
//! inject plain functions.
//!
//! [`memory`] provides an in-process pair built on `tokio::sync::broadcast`.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use bytes::Bytes;

use crate::error::BoxError;

pub mod memory;

/// Boxed future used at the erased capability seams.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Listener installed on the inbound side; invoked once per delivered buffer.
pub type Listener = Arc<dyn Fn(Bytes) -> BoxFuture<'static, ()> + Send + Sync>;

/// Handle that removes a previously installed listener.
pub type Unsubscribe =
    Box<dyn FnOnce() -> BoxFuture<'static, std::result::Result<(), BoxError>> + Send>;

/// Outbound side of the channel.
pub trait Publish: Send + Sync {
    /// Publish one buffer. May fail; never retried by this crate.
    fn publish(&self, data: Bytes) -> BoxFuture<'static, std::result::Result<(), BoxError>>;
}

impl<F, Fut> Publish for F
where
    F: Fn(Bytes) -> Fut + Send + Sync,
    Fut: Future<Output = std::result::Result<(), BoxError>> + Send + 'static,
{
    fn publish(&self, data: Bytes) -> BoxFuture<'static, std::result::Result<(), BoxError>> {
        Box::pin(self(data))
    }
}

/// Inbound side of the channel.
pub trait Subscribe: Send + Sync {
    /// Install `listener` and return a handle that removes it.
    fn subscribe(
        &self,
        listener: Listener,
    ) -> BoxFuture<'static, std::result::Result<Unsubscribe, BoxError>>;
}

/// A subscribe/publish pair describing one end of a bidirectional channel.
#[derive(Clone)]
pub struct PubSub {
    /// Inbound primitive.
    pub subscribe: Arc<dyn Subscribe>,
    /// Outbound primitive.
    pub publish: Arc<dyn Publish>,
}
