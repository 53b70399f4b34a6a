use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{StatusCode, header};
use futures_util::StreamExt;
use ssestream::{Event, Stream, TEXT_EVENT_STREAM};
use tokio::time::timeout;

/// Drain a response body to completion. Hangs if the stream never
/// terminates, so callers wrap it in a timeout.
async fn read_body(body: Body) -> String {
    let mut frames = body.into_data_stream();
    let mut out = Vec::new();
    while let Some(chunk) = frames.next().await {
        out.extend_from_slice(&chunk.expect("body chunk"));
    }
    String::from_utf8(out).expect("utf8 body")
}

async fn serve_and_collect(
    stream: &Arc<Stream>,
    produce: impl Future<Output = ()> + Send + 'static,
) -> String {
    let response = stream.serve();
    tokio::spawn(produce);
    timeout(Duration::from_secs(5), read_body(response.into_body()))
        .await
        .expect("stream should terminate")
}

#[tokio::test]
async fn ping_then_close_emits_comment_and_headers() {
    let stream = Arc::new(Stream::new());
    let response = stream.serve();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get(header::CONTENT_TYPE).unwrap(),
        TEXT_EVENT_STREAM
    );
    assert_eq!(response.headers().get(header::CACHE_CONTROL).unwrap(), "no-cache");

    let producer = Arc::clone(&stream);
    tokio::spawn(async move {
        producer.ping().await;
        producer.close();
    });

    let body = timeout(Duration::from_secs(5), read_body(response.into_body()))
        .await
        .expect("stream should terminate");
    assert_eq!(body, ":ping\n\n");
}

#[tokio::test]
async fn unnamed_events_default_to_message_type() {
    let stream = Arc::new(Stream::new());
    let producer = Arc::clone(&stream);
    let body = serve_and_collect(&stream, async move {
        producer
            .send(Event::message("No type defaults to 'message'"))
            .await;
        producer.send(Event::new()).await;
        producer.close();
    })
    .await;
    assert_eq!(
        body,
        "event:message\ndata:No type defaults to 'message'\n\nevent:message\n\n"
    );
}

#[tokio::test]
async fn explicit_names_are_preserved() {
    let stream = Arc::new(Stream::new());
    let producer = Arc::clone(&stream);
    let body = serve_and_collect(&stream, async move {
        producer
            .send(Event::named("test").with_data("this message\nhas two lines"))
            .await;
        producer.close();
    })
    .await;
    assert_eq!(body, "event:test\ndata:this message\ndata:has two lines\n\n");
}

#[tokio::test]
async fn retry_convenience_sends_reconnect_delay() {
    let stream = Arc::new(Stream::new());
    let producer = Arc::clone(&stream);
    let body = serve_and_collect(&stream, async move {
        producer.retry(888).await;
        producer.close();
    })
    .await;
    assert_eq!(body, "retry:888\nevent:message\n\n");
}

#[tokio::test]
async fn events_arrive_in_send_order() {
    let stream = Arc::new(Stream::new());
    let producer = Arc::clone(&stream);
    let body = serve_and_collect(&stream, async move {
        for i in 1..=5 {
            producer.send(Event::named("tick").with_data(i.to_string())).await;
        }
        producer.close();
    })
    .await;
    let expected: String = (1..=5)
        .map(|i| format!("event:tick\ndata:{i}\n\n"))
        .collect();
    assert_eq!(body, expected);
}

#[tokio::test]
async fn invalid_event_is_skipped_not_fatal() {
    let stream = Arc::new(Stream::new());
    let producer = Arc::clone(&stream);
    let body = serve_and_collect(&stream, async move {
        producer
            .send(Event::named("bad\nname").with_data("never delivered"))
            .await;
        producer.send(Event::named("ok").with_data("delivered")).await;
        producer.close();
    })
    .await;
    assert_eq!(body, "event:ok\ndata:delivered\n\n");
}

#[tokio::test]
async fn sends_after_close_are_not_delivered() {
    let stream = Arc::new(Stream::new());
    let producer = Arc::clone(&stream);
    let body = serve_and_collect(&stream, async move {
        producer.ping().await;
        producer.close();
        producer.ping().await;
        producer.ping().await;
    })
    .await;
    assert_eq!(body, ":ping\n\n");
}

#[tokio::test]
async fn send_after_close_returns_promptly_without_serving() {
    let stream = Stream::new();
    stream.close();
    for _ in 0..3 {
        timeout(Duration::from_millis(100), stream.send(Event::message("dropped")))
            .await
            .expect("send after close must not hang");
    }
    timeout(Duration::from_millis(100), stream.ping())
        .await
        .expect("ping after close must not hang");
}

#[tokio::test]
async fn close_is_idempotent_and_observable() {
    let stream = Stream::new();
    assert!(!stream.is_closed());
    stream.close();
    stream.close();
    stream.close();
    assert!(stream.is_closed());
    timeout(Duration::from_millis(100), stream.closed())
        .await
        .expect("closed() should resolve once the stream is closed");
}

#[tokio::test]
async fn dropping_the_response_closes_the_stream() {
    // Client disconnect reaches the stream as the transport dropping the
    // response body.
    let stream = Arc::new(Stream::new());
    let response = stream.serve();
    drop(response);

    timeout(Duration::from_secs(1), stream.closed())
        .await
        .expect("disconnect should close the stream");
    assert!(stream.is_closed());
    timeout(Duration::from_millis(100), stream.send(Event::message("late")))
        .await
        .expect("send after disconnect must not hang");
}

#[tokio::test]
async fn disconnect_before_any_send_yields_empty_body() {
    let stream = Arc::new(Stream::new());
    let response = stream.serve();
    let closer = Arc::clone(&stream);
    tokio::spawn(async move {
        closer.close();
    });
    let body = timeout(Duration::from_secs(5), read_body(response.into_body()))
        .await
        .expect("stream should terminate");
    assert_eq!(body, "");
}

#[test]
#[should_panic(expected = "once per stream")]
fn second_bind_panics() {
    let stream = Stream::new();
    let _first = stream.serve();
    let _second = stream.serve();
}

#[test]
fn bind_once_then_close_does_not_panic() {
    let stream = Stream::new();
    let _response = stream.serve();
    stream.close();
    stream.close();
}
