//! # ssestream: Server-Sent Events for one long-lived connection
//!
//! This crate implements the SSE wire protocol in two small, tightly coupled
//! pieces:
//!
//! - **[`Event`] + [`encode`]**: a data-only event record and a stateless
//!   encoder that renders it into the exact byte format (`retry:`/`event:`/
//!   `id:`/`data:` lines, comment lines, blank-line terminator).
//! - **[`Stream`]**: adapts any number of producer tasks into one live,
//!   flushed HTTP response body, handling client disconnect, backpressure,
//!   and exactly-once connection binding.
//!
//! Routing, TLS, and the browser's `EventSource` are left to collaborators;
//! a `Stream` plugs into any axum route as a plain handler return value.
//!
//! ## Quick start
//!
//! ```no_run
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! use axum::{Router, routing::get, response::Response};
//! use ssestream::{Event, Stream};
//!
//! async fn events() -> Response {
//!     let stream = Arc::new(Stream::new());
//!     let producer = Arc::clone(&stream);
//!     tokio::spawn(async move {
//!         loop {
//!             tokio::select! {
//!                 _ = producer.closed() => break,
//!                 _ = tokio::time::sleep(Duration::from_secs(1)) => {
//!                     producer.send(Event::message("tick")).await;
//!                 }
//!             }
//!         }
//!     });
//!     stream.serve()
//! }
//!
//! # async fn run() {
//! let app: Router = Router::new().route("/events", get(events));
//! let listener = tokio::net::TcpListener::bind("127.0.0.1:8080").await.unwrap();
//! axum::serve(listener, app).await.unwrap();
//! # }
//! ```
//!
//! ## Guarantees
//!
//! - Events reach the wire in channel-admission order, one response-body
//!   frame per event, flushed as produced.
//! - [`Stream::send`] suspends until the serve loop takes the event or the
//!   stream closes; after close it returns promptly without delivering.
//! - [`Stream::close`] is idempotent and race-safe; client disconnect is
//!   observed the same way (see [`Stream::closed`]).
//! - Binding a stream to a second connection panics: it is a one-shot
//!   resource, like binding a socket twice.
//! - A validation failure on one event (a line terminator inside `name` or
//!   `id`) never tears down the connection; the event is logged and dropped.

pub mod encode;
pub mod error;
pub mod event;
pub mod stream;

pub use error::EncodeError;
pub use event::Event;
pub use stream::{Stream, TEXT_EVENT_STREAM};
