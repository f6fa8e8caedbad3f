//! In-memory pub/sub pair backed by `tokio::sync::broadcast`.
//!
//! [`duplex`] returns two [`PubSub`] endpoints wired back to back: buffers
//! published on one end are delivered to listeners subscribed on the other.
//! Intended for tests and same-process wiring; a real deployment injects its
//! own transport (Redis pub/sub, pipes, websockets, ...).

use std::sync::Arc;

use bytes::Bytes;
use tokio::sync::broadcast;

use super::{BoxFuture, Listener, PubSub, Subscribe, Unsubscribe};
use crate::error::BoxError;

/// Default channel capacity for [`duplex`].
pub const DEFAULT_CAPACITY: usize = 64;

/// Publisher feeding one broadcast channel.
#[derive(Clone)]
struct MemoryPublisher {
    tx: broadcast::Sender<Bytes>,
}

impl super::Publish for MemoryPublisher {
    fn publish(&self, data: Bytes) -> BoxFuture<'static, std::result::Result<(), BoxError>> {
        let tx = self.tx.clone();
        Box::pin(async move {
            // Fails when no subscriber is alive, like a closed channel.
            tx.send(data).map(|_| ()).map_err(|e| -> BoxError { Box::new(e) })
        })
    }
}

/// Subscriber spawning one forwarding task per installed listener.
#[derive(Clone)]
struct MemorySubscriber {
    tx: broadcast::Sender<Bytes>,
}

impl Subscribe for MemorySubscriber {
    fn subscribe(
        &self,
        listener: Listener,
    ) -> BoxFuture<'static, std::result::Result<Unsubscribe, BoxError>> {
        let mut rx = self.tx.subscribe();
        Box::pin(async move {
            let task = tokio::spawn(async move {
                loop {
                    match rx.recv().await {
                        Ok(data) => listener(data).await,
                        Err(broadcast::error::RecvError::Lagged(skipped)) => {
                            tracing::warn!(skipped, "memory subscriber lagged");
                        }
                        Err(broadcast::error::RecvError::Closed) => break,
                    }
                }
            });

            let unsubscribe: Unsubscribe = Box::new(move || {
                task.abort();
                Box::pin(async { Ok(()) })
            });
            Ok(unsubscribe)
        })
    }
}

/// Create a connected pair of in-memory endpoints with the given capacity.
pub fn duplex_with_capacity(capacity: usize) -> (PubSub, PubSub) {
    let (a, _) = broadcast::channel(capacity);
    let (b, _) = broadcast::channel(capacity);

    let left = PubSub {
        publish: Arc::new(MemoryPublisher { tx: a.clone() }),
        subscribe: Arc::new(MemorySubscriber { tx: b.clone() }),
    };
    let right = PubSub {
        publish: Arc::new(MemoryPublisher { tx: b }),
        subscribe: Arc::new(MemorySubscriber { tx: a }),
    };
    (left, right)
}

/// Create a connected pair of in-memory endpoints.
pub fn duplex() -> (PubSub, PubSub) {
    duplex_with_capacity(DEFAULT_CAPACITY)
}
