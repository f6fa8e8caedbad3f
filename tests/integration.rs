//! Integration tests for pubrpc.
//!
//! These run the full loop: a caller on one end of an in-memory channel
//! pair, a dispatcher attached on the other.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use bytes::Bytes;
use serde::{Deserialize, Serialize};

use pubrpc::call::Caller;
use pubrpc::codec::{JsonCodec, MsgPackCodec};
use pubrpc::transport::memory;
use pubrpc::{CallError, Dispatcher, HandlerError, ResErr, ResHead, RpcError};

#[derive(Debug, Clone, Serialize, Deserialize)]
struct AddParams {
    a: i64,
    b: i64,
}

fn add_dispatcher(publish: Arc<dyn pubrpc::Publish>) -> Dispatcher {
    Dispatcher::builder()
        .method(
            "add",
            JsonCodec::method_codec::<AddParams, i64, ()>(),
            |params: Option<AddParams>| async move {
                let p = params.ok_or_else(HandlerError::invalid_params)?;
                Ok(Some(p.a + p.b))
            },
        )
        .unwrap()
        .head_decoder(JsonCodec::head_decoder())
        .err_encoder(JsonCodec::err_encoder())
        .publisher(publish)
        .build()
        .unwrap()
}

/// `add` with params `{a:2, b:3}` yields `{result: {type:"ok", data:5}}`.
#[tokio::test]
async fn test_call_roundtrip_ok() {
    let (client, server) = memory::duplex();

    let dispatcher = add_dispatcher(server.publish.clone());
    let _unsub = dispatcher.attach(server.subscribe.as_ref()).await.unwrap();

    let add = Caller::new(
        "add",
        JsonCodec::call_codec::<AddParams, i64, ()>(),
        client,
    );
    let sum = add.call(Some(AddParams { a: 2, b: 3 })).await.unwrap();
    assert_eq!(sum, Some(5));
}

/// An unregistered method yields `{type:"err", code:-32601}`.
#[tokio::test]
async fn test_call_unknown_method() {
    let (client, server) = memory::duplex();

    let dispatcher = add_dispatcher(server.publish.clone());
    let _unsub = dispatcher.attach(server.subscribe.as_ref()).await.unwrap();

    let sub = Caller::new(
        "sub",
        JsonCodec::call_codec::<AddParams, i64, ()>(),
        client,
    );
    let err = sub.call(None).await.unwrap_err();

    match err {
        CallError::Remote { result, .. } => {
            assert_eq!(result.code, -32601);
            assert_eq!(result.message, "Method not found");
            assert_eq!(result.data, None);
        }
        other => panic!("expected remote error, got {other:?}"),
    }
}

/// Missing params surface as the handler's declared INVALID_PARAMS error.
#[tokio::test]
async fn test_call_invalid_params() {
    let (client, server) = memory::duplex();

    let dispatcher = add_dispatcher(server.publish.clone());
    let _unsub = dispatcher.attach(server.subscribe.as_ref()).await.unwrap();

    let add = Caller::new(
        "add",
        JsonCodec::call_codec::<AddParams, i64, ()>(),
        client,
    );
    let err = add.call(None).await.unwrap_err();

    match err {
        CallError::Remote { result, .. } => {
            assert_eq!(result.code, -32602);
            assert_eq!(result.message, "Invalid params");
        }
        other => panic!("expected remote error, got {other:?}"),
    }
}

/// The full loop also works over MsgPack, struct-as-map end to end.
#[tokio::test]
async fn test_call_roundtrip_msgpack() {
    let (client, server) = memory::duplex();

    let dispatcher = Dispatcher::builder()
        .method(
            "add",
            MsgPackCodec::method_codec::<AddParams, i64, ()>(),
            |params: Option<AddParams>| async move {
                let p = params.ok_or_else(HandlerError::invalid_params)?;
                Ok(Some(p.a + p.b))
            },
        )
        .unwrap()
        .head_decoder(MsgPackCodec::head_decoder())
        .err_encoder(MsgPackCodec::err_encoder())
        .publisher(server.publish.clone())
        .build()
        .unwrap();
    let _unsub = dispatcher.attach(server.subscribe.as_ref()).await.unwrap();

    let add = Caller::new(
        "add",
        MsgPackCodec::call_codec::<AddParams, i64, ()>(),
        client,
    );
    let sum = add.call(Some(AddParams { a: 40, b: 2 })).await.unwrap();
    assert_eq!(sum, Some(42));
}

/// Concurrent in-flight calls resolve independently by correlation id.
#[tokio::test]
async fn test_concurrent_calls_are_independent() {
    let (client, server) = memory::duplex();

    let dispatcher = Dispatcher::builder()
        .method(
            "add",
            JsonCodec::method_codec::<AddParams, i64, ()>(),
            |params: Option<AddParams>| async move {
                let p = params.ok_or_else(HandlerError::invalid_params)?;
                // Stagger completion so responses interleave.
                tokio::time::sleep(Duration::from_millis((p.a % 7) as u64)).await;
                Ok(Some(p.a + p.b))
            },
        )
        .unwrap()
        .head_decoder(JsonCodec::head_decoder())
        .err_encoder(JsonCodec::err_encoder())
        .publisher(server.publish.clone())
        .build()
        .unwrap();
    let _unsub = dispatcher.attach(server.subscribe.as_ref()).await.unwrap();

    let add = Arc::new(Caller::new(
        "add",
        JsonCodec::call_codec::<AddParams, i64, ()>(),
        client,
    ));

    let mut tasks = Vec::new();
    for i in 0..10i64 {
        let add = add.clone();
        tasks.push(tokio::spawn(async move {
            add.call(Some(AddParams { a: i, b: 100 })).await
        }));
    }

    for (i, task) in tasks.into_iter().enumerate() {
        let sum = task.await.unwrap().unwrap();
        assert_eq!(sum, Some(i as i64 + 100));
    }
}

/// Raw wire check: requests published by hand get byte-exact response
/// shapes.
#[tokio::test]
async fn test_wire_shapes_by_hand() {
    let (client, server) = memory::duplex();

    let dispatcher = add_dispatcher(server.publish.clone());
    let _unsub = dispatcher.attach(server.subscribe.as_ref()).await.unwrap();

    let responses: Arc<Mutex<Vec<Bytes>>> = Arc::new(Mutex::new(Vec::new()));
    let sink = responses.clone();
    let listener: pubrpc::transport::Listener = Arc::new(move |data: Bytes| {
        let sink = sink.clone();
        Box::pin(async move {
            sink.lock().unwrap().push(data);
        })
    });
    let _unsub_client = client.subscribe.subscribe(listener).await.unwrap();

    client
        .publish
        .publish(Bytes::from_static(
            br#"{"method":"add","id":"1","params":{"a":2,"b":3}}"#,
        ))
        .await
        .unwrap();
    client
        .publish
        .publish(Bytes::from_static(br#"{"method":"sub","id":"2"}"#))
        .await
        .unwrap();

    tokio::time::sleep(Duration::from_millis(50)).await;

    let responses = responses.lock().unwrap();
    assert_eq!(responses.len(), 2);

    let mut texts: Vec<&str> = responses
        .iter()
        .map(|b| std::str::from_utf8(b).unwrap())
        .collect();
    texts.sort();

    assert_eq!(texts[0], r#"{"id":"1","result":{"type":"ok","data":5}}"#);
    assert_eq!(
        texts[1],
        r#"{"id":"2","result":{"type":"err","code":-32601,"message":"Method not found"}}"#
    );
}

/// Handlers answering with no payload produce a data-less ok result, and
/// the distinction survives a head decode on the caller side.
#[tokio::test]
async fn test_empty_payload_roundtrip() {
    let (client, server) = memory::duplex();

    let dispatcher = Dispatcher::builder()
        .method(
            "ping",
            JsonCodec::method_codec::<serde_json::Value, serde_json::Value, ()>(),
            |_params| async move { Ok(None) },
        )
        .unwrap()
        .head_decoder(JsonCodec::head_decoder())
        .err_encoder(JsonCodec::err_encoder())
        .publisher(server.publish.clone())
        .build()
        .unwrap();
    let _unsub = dispatcher.attach(server.subscribe.as_ref()).await.unwrap();

    let ping = Caller::new(
        "ping",
        JsonCodec::call_codec::<serde_json::Value, serde_json::Value, ()>(),
        client,
    );
    let data = ping.call(None).await.unwrap();
    assert_eq!(data, None);
}

/// Unexpected handler failures cross the wire as a bare internal error; the
/// cause is only visible to the dispatcher's fault sink.
#[tokio::test]
async fn test_internal_error_confinement() {
    let (client, server) = memory::duplex();

    let faults: Arc<Mutex<Vec<String>>> = Arc::new(Mutex::new(Vec::new()));
    let fault_sink = faults.clone();

    let dispatcher = Dispatcher::builder()
        .method(
            "explode",
            JsonCodec::method_codec::<serde_json::Value, serde_json::Value, ()>(),
            |_params| async move {
                Err(pubrpc::HandlerFailure::unexpected("cable unplugged"))
            },
        )
        .unwrap()
        .head_decoder(JsonCodec::head_decoder())
        .err_encoder(JsonCodec::err_encoder())
        .publisher(server.publish.clone())
        .on_fault(move |cause| fault_sink.lock().unwrap().push(cause.to_string()))
        .build()
        .unwrap();
    let _unsub = dispatcher.attach(server.subscribe.as_ref()).await.unwrap();

    let explode = Caller::new(
        "explode",
        JsonCodec::call_codec::<serde_json::Value, serde_json::Value, ()>(),
        client,
    );
    let err = explode.call(None).await.unwrap_err();

    match err {
        CallError::Remote { result, .. } => {
            assert_eq!(result.code, -32603);
            assert_eq!(result.message, "Internal error");
            assert_eq!(result.data, None);
        }
        other => panic!("expected remote error, got {other:?}"),
    }
    assert_eq!(
        faults.lock().unwrap().as_slice(),
        &["cable unplugged".to_string()]
    );
}

/// A dispatcher whose publisher has no live subscriber reports the publish
/// failure through its error sink; the caller, never answered, times out.
#[tokio::test]
async fn test_publish_failure_surfaces_in_error_sink() {
    let (client, server) = memory::duplex();

    let errors: Arc<Mutex<Vec<RpcError>>> = Arc::new(Mutex::new(Vec::new()));
    let sink = errors.clone();

    let dispatcher = Dispatcher::builder()
        .method(
            "ping",
            JsonCodec::method_codec::<serde_json::Value, serde_json::Value, ()>(),
            |_params| async move { Ok(None) },
        )
        .unwrap()
        .head_decoder(JsonCodec::head_decoder())
        .err_encoder(JsonCodec::err_encoder())
        .publisher(server.publish.clone())
        .on_error(move |reason| sink.lock().unwrap().push(reason))
        .build()
        .unwrap();
    let _unsub = dispatcher.attach(server.subscribe.as_ref()).await.unwrap();

    // Nobody subscribes on the client end, so the dispatcher's publish has
    // no receiver and fails.
    let req = Bytes::from_static(br#"{"method":"ping","id":"1"}"#);
    client.publish.publish(req).await.unwrap();

    tokio::time::sleep(Duration::from_millis(50)).await;

    let errors = errors.lock().unwrap();
    assert_eq!(errors.len(), 1);
    assert!(matches!(errors[0], RpcError::Publish(_)));
}

/// Responses stay decodable as generic heads regardless of method codec.
#[tokio::test]
async fn test_err_response_head_is_generic() {
    let res = ResErr::<()>::from_code("2", pubrpc::RpcCode::MethodNotFound);
    let buf = JsonCodec::encode(&res).unwrap();
    let head: ResHead = JsonCodec::decode(&buf).unwrap();
    assert_eq!(head.id, "2");
}
