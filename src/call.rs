//! Call side - typed request/response calls over a pub/sub pair.
//!
//! A [`Caller`] binds one method name to a [`CallCodec`] quadruple and a
//! [`PubSub`] pair. Each call publishes a request with a fresh UUIDv4
//! correlation id, listens for the response carrying that id, and enforces a
//! deadline (default 30 seconds). Buffers that do not decode as a response
//! head, or carry a different id, are skipped; request and response traffic
//! may share the channel.
//!
//! # Example
//!
//! ```ignore
//! use pubrpc::call::Caller;
//! use pubrpc::codec::JsonCodec;
//!
//! let add = Caller::new("add", JsonCodec::call_codec::<Params, i64, ()>(), pubsub);
//! let sum = add.call(Some(Params { a: 2, b: 3 })).await?;
//! assert_eq!(sum, Some(5));
//! ```

use std::sync::{Arc, Mutex};
use std::time::Duration;

use bytes::Bytes;
use thiserror::Error;
use tokio::sync::oneshot;
use uuid::Uuid;

use crate::error::{BoxError, RpcError};
use crate::message::{ErrResult, Req, ResErr, ResHead, ResOk, ResultKind};
use crate::transport::{Listener, PubSub, Unsubscribe};

/// Default call deadline.
pub const DEFAULT_CALL_TIMEOUT: Duration = Duration::from_secs(30);

/// Call-side codec quadruple: request encoder plus response head/ok/err
/// decoders.
pub struct CallCodec<P, D, E = ()> {
    /// Request encoder.
    pub encode_req:
        Box<dyn Fn(&Req<P>) -> std::result::Result<Vec<u8>, BoxError> + Send + Sync>,
    /// Response-head decoder, applied to every delivered buffer.
    pub decode_head:
        Box<dyn Fn(&[u8]) -> std::result::Result<ResHead, BoxError> + Send + Sync>,
    /// Success response decoder.
    pub decode_ok:
        Box<dyn Fn(&[u8]) -> std::result::Result<ResOk<D>, BoxError> + Send + Sync>,
    /// Error response decoder.
    pub decode_err:
        Box<dyn Fn(&[u8]) -> std::result::Result<ResErr<E>, BoxError> + Send + Sync>,
}

/// How a call can fail.
#[derive(Debug, Error)]
pub enum CallError<E = ()> {
    /// The remote handler answered with an err result.
    #[error("{method} call returned error: {}", .result.message)]
    Remote {
        /// Called method name.
        method: String,
        /// The err result, verbatim.
        result: ErrResult<E>,
    },

    /// No response arrived before the deadline.
    #[error("{method} call timed out after {timeout:?}")]
    Timeout {
        /// Called method name.
        method: String,
        /// The deadline that elapsed.
        timeout: Duration,
    },

    /// Transport or codec failure.
    #[error(transparent)]
    Rpc(#[from] RpcError),
}

/// Typed call function for one method.
pub struct Caller<P, D, E = ()> {
    method: String,
    codec: Arc<CallCodec<P, D, E>>,
    pubsub: PubSub,
    timeout: Duration,
}

impl<P, D, E> Caller<P, D, E>
where
    P: 'static,
    D: 'static,
    E: 'static,
{
    /// Bind a method name to its call codec and channel pair.
    pub fn new(method: impl Into<String>, codec: CallCodec<P, D, E>, pubsub: PubSub) -> Self {
        Self {
            method: method.into(),
            codec: Arc::new(codec),
            pubsub,
            timeout: DEFAULT_CALL_TIMEOUT,
        }
    }

    /// Override the call deadline.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Perform one call.
    ///
    /// Subscribes before publishing so the response cannot be missed, and
    /// unsubscribes on every exit path.
    ///
    /// # Errors
    ///
    /// [`CallError::Remote`] for an err result, [`CallError::Timeout`] when
    /// the deadline elapses, [`CallError::Rpc`] for transport and codec
    /// failures.
    pub async fn call(&self, params: Option<P>) -> std::result::Result<Option<D>, CallError<E>> {
        let req = Req {
            method: self.method.clone(),
            id: Uuid::new_v4().to_string(),
            params,
        };
        let buf = (self.codec.encode_req)(&req).map_err(|cause| RpcError::Encode {
            method: self.method.clone(),
            source: cause,
        })?;

        let (tx, rx) = oneshot::channel::<Bytes>();
        let slot = Arc::new(Mutex::new(Some(tx)));
        let codec = Arc::clone(&self.codec);
        let id = req.id.clone();

        let listener: Listener = Arc::new(move |data: Bytes| {
            let codec = Arc::clone(&codec);
            let slot = Arc::clone(&slot);
            let id = id.clone();
            Box::pin(async move {
                // Request traffic and foreign responses share the channel;
                // anything that is not our response head is skipped.
                let head = match (codec.decode_head)(&data) {
                    Ok(head) => head,
                    Err(_) => return,
                };
                if head.id != id {
                    return;
                }
                let Ok(mut slot) = slot.lock() else { return };
                if let Some(tx) = slot.take() {
                    let _ = tx.send(data);
                }
            })
        });

        let unsubscribe = self
            .pubsub
            .subscribe
            .subscribe(listener)
            .await
            .map_err(RpcError::Subscribe)?;

        if let Err(cause) = self.pubsub.publish.publish(Bytes::from(buf)).await {
            detach(unsubscribe).await;
            return Err(RpcError::Publish(cause).into());
        }

        let data = match tokio::time::timeout(self.timeout, rx).await {
            Ok(Ok(data)) => {
                detach(unsubscribe).await;
                data
            }
            Ok(Err(_)) => {
                detach(unsubscribe).await;
                return Err(RpcError::ConnectionClosed.into());
            }
            Err(_) => {
                detach(unsubscribe).await;
                return Err(CallError::Timeout {
                    method: self.method.clone(),
                    timeout: self.timeout,
                });
            }
        };

        let head = (self.codec.decode_head)(&data).map_err(|cause| RpcError::Decode {
            method: self.method.clone(),
            source: cause,
        })?;

        match head.result.kind {
            ResultKind::Ok => {
                let res = (self.codec.decode_ok)(&data).map_err(|cause| RpcError::Decode {
                    method: self.method.clone(),
                    source: cause,
                })?;
                Ok(res.result.data)
            }
            ResultKind::Err => {
                let res = (self.codec.decode_err)(&data).map_err(|cause| RpcError::Decode {
                    method: self.method.clone(),
                    source: cause,
                })?;
                Err(CallError::Remote {
                    method: self.method.clone(),
                    result: res.result,
                })
            }
        }
    }
}

async fn detach(unsubscribe: Unsubscribe) {
    if let Err(cause) = unsubscribe().await {
        tracing::debug!(error = %cause, "unsubscribe failed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::JsonCodec;
    use crate::transport::memory;
    use serde_json::Value;

    #[tokio::test]
    async fn test_timeout_when_nothing_answers() {
        let (left, right) = memory::duplex();
        // A silent peer: subscribed so publish succeeds, never responds.
        let silent: Listener = Arc::new(|_data: Bytes| Box::pin(async {}));
        let _unsub = right.subscribe.subscribe(silent).await.unwrap();

        let caller = Caller::new(
            "add",
            JsonCodec::call_codec::<Value, Value, ()>(),
            left,
        )
        .timeout(Duration::from_millis(50));

        let err = caller.call(None).await.unwrap_err();
        assert!(matches!(err, CallError::Timeout { .. }));
    }

    #[tokio::test]
    async fn test_foreign_ids_are_skipped() {
        let (left, right) = memory::duplex();

        // Peer that answers every request, but under the wrong id.
        let answer = right.publish.clone();
        let echo_wrong_id: Listener = Arc::new(move |_data: Bytes| {
            let answer = answer.clone();
            Box::pin(async move {
                let res = ResOk::new("not-your-id", Some(1i64));
                let buf = JsonCodec::encode(&res).unwrap();
                let _ = answer.publish(Bytes::from(buf)).await;
            })
        });
        let _unsub = right.subscribe.subscribe(echo_wrong_id).await.unwrap();

        let caller = Caller::new(
            "add",
            JsonCodec::call_codec::<Value, i64, ()>(),
            left,
        )
        .timeout(Duration::from_millis(50));

        let err = caller.call(None).await.unwrap_err();
        assert!(matches!(err, CallError::Timeout { .. }));
    }

    #[tokio::test]
    async fn test_remote_err_result_maps_to_remote_error() {
        let (left, right) = memory::duplex();

        // Peer that answers every request with an err result under the
        // request's own id.
        let answer = right.publish.clone();
        let reject: Listener = Arc::new(move |data: Bytes| {
            let answer = answer.clone();
            Box::pin(async move {
                let req: Req<Value> = JsonCodec::decode(&data).unwrap();
                let res = ResErr::new(req.id, ErrResult::<()>::new(4200, "nope", None));
                let buf = JsonCodec::encode(&res).unwrap();
                let _ = answer.publish(Bytes::from(buf)).await;
            })
        });
        let _unsub = right.subscribe.subscribe(reject).await.unwrap();

        let caller = Caller::new("add", JsonCodec::call_codec::<Value, Value, ()>(), left);
        let err = caller.call(None).await.unwrap_err();

        match err {
            CallError::Remote { method, result } => {
                assert_eq!(method, "add");
                assert_eq!(result.code, 4200);
                assert_eq!(result.message, "nope");
            }
            other => panic!("expected remote error, got {other:?}"),
        }
    }
}
