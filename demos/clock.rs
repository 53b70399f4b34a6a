//! Pushes the current time to each connected client once per second.
//!
//! Run with `cargo run --example clock`, then open http://127.0.0.1:8080/.

use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use axum::response::{Html, Response};
use axum::{Router, routing::get};
use ssestream::{Event, Stream};

const PAGE: &str = r#"<!DOCTYPE html>
<html>
  <head>
    <meta charset="utf-8">
    <title>ssestream clock</title>
  </head>
  <body>
    <script>
      const source = new EventSource("/stream");
      source.addEventListener("message", (m) => {
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
        .route("/stream", get(stream_handler));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:8080")
        .await
        .expect("bind 127.0.0.1:8080");
    tracing::info!("demo available at http://127.0.0.1:8080/");
    axum::serve(listener, app).await.expect("serve");
}

async fn stream_handler() -> Response {
    let stream = Arc::new(Stream::new());
    let producer = Arc::clone(&stream);
    tokio::spawn(async move {
        tracing::info!("client connected");
        loop {
            tokio::select! {
                _ = producer.closed() => {
                    tracing::info!("client disconnected");
                    break;
                }
                _ = tokio::time::sleep(Duration::from_secs(1)) => {
                    let now = SystemTime::now()
                        .duration_since(UNIX_EPOCH)
                        .expect("clock before epoch");
                    producer
                        .send(Event::message(format!("{}s since the epoch", now.as_secs())))
                        .await;
                }
            }
        }
    });
    stream.serve()
}
