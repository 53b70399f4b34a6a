//! Streams named `counter` events with incrementing ids. Because each event
//! carries an `id`, a reconnecting client reports it back via the
//! `Last-Event-ID` header and the counter resumes where it left off — try
//! stopping and restarting the server with a browser tab open.
//!
//! Run with `cargo run --example counter`, then open http://127.0.0.1:8080/.

use std::sync::Arc;
use std::time::Duration;

use axum::http::HeaderMap;
use axum::response::{Html, Response};
use axum::{Router, routing::get};
use ssestream::{Event, Stream};

const PAGE: &str = r#"<!DOCTYPE html>
<html>
  <head>
    <meta charset="utf-8">
    <title>ssestream counter</title>
  </head>
  <body>
    <script>
      const source = new EventSource("/sse/counter");
      source.addEventListener("counter", (m) => {
        document.body.innerText = m.data;
      });
    </script>
  </body>
</html>"#;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let app = Router::new()
        .route("/", get(|| async { Html(PAGE) }))
        .route("/sse/counter", get(counter_handler));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:8080")
        .await
        .expect("bind 127.0.0.1:8080");
    tracing::info!("demo available at http://127.0.0.1:8080/");
    axum::serve(listener, app).await.expect("serve");
}

async fn counter_handler(headers: HeaderMap) -> Response {
    // Resume the counter if this is a reconnect.
    let mut counter: u64 = headers
        .get("last-event-id")
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.parse().ok())
        .unwrap_or(0);

    let stream = Arc::new(Stream::new());
    let producer = Arc::clone(&stream);
    tokio::spawn(async move {
        loop {
            counter += 1;
            producer
                .send(
                    Event::named("counter")
                        .with_id(counter.to_string())
                        .with_data(counter.to_string()),
                )
                .await;
            if producer.is_closed() {
                break;
            }
            tokio::time::sleep(Duration::from_secs(1)).await;
        }
    });
    stream.serve()
}
