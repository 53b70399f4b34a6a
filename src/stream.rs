//! Single-connection event streaming.
//!
//! A [`Stream`] sits between any number of producer tasks and exactly one
//! HTTP response. Producers hand events over a rendezvous channel; the serve
//! loop encodes each one and yields it as its own response-body frame, so the
//! client sees every event as soon as it is produced. A separate close signal
//! (rather than closing the data channel itself) keeps producers from ever
//! blocking on a dead connection.

use std::convert::Infallible;
use std::sync::Mutex;

use axum::body::Body;
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use bytes::Bytes;
use futures_util::stream;
use tokio::sync::watch;

use crate::encode;
use crate::event::Event;

/// Media type of an SSE response body.
pub const TEXT_EVENT_STREAM: &str = "text/event-stream";

/// Event name injected when a record has neither a name nor a comment, so
/// plain `EventSource.onmessage` handlers still fire. Applied by the stream,
/// never by the encoder.
const DEFAULT_EVENT_NAME: &str = "message";

/// A live SSE connection: producers on one side, one HTTP response on the
/// other.
///
/// Lifecycle is `idle → serving → closed`. A stream is bound to a connection
/// exactly once via [`serve`](Stream::serve); it stays bound until the client
/// disconnects or [`close`](Stream::close) is called, after which every
/// `send`-family call returns promptly without delivering anything.
///
/// # Example
///
/// ```no_run
/// use std::sync::Arc;
/// use axum::{Router, routing::get, response::Response};
/// use ssestream::{Event, Stream};
///
/// async fn handler() -> Response {
///     let stream = Arc::new(Stream::new());
///     let producer = Arc::clone(&stream);
///     tokio::spawn(async move {
///         producer.send(Event::message("hello")).await;
///         producer.close();
///     });
///     stream.serve()
/// }
///
/// let app: Router = Router::new().route("/events", get(handler));
/// ```
pub struct Stream {
    events_tx: flume::Sender<Event>,
    events_rx: flume::Receiver<Event>,
    close_tx: watch::Sender<bool>,
    bound: Mutex<bool>,
}

impl Default for Stream {
    fn default() -> Self {
        Self::new()
    }
}

impl Stream {
    /// Create an idle stream.
    ///
    /// The event channel is a rendezvous: [`send`](Stream::send) suspends
    /// until the serve loop takes the event, so producers are naturally
    /// paced by the connection.
    pub fn new() -> Self {
        let (events_tx, events_rx) = flume::bounded(0);
        let (close_tx, _) = watch::channel(false);
        Self {
            events_tx,
            events_rx,
            close_tx,
            bound: Mutex::new(false),
        }
    }

    /// Hand an event to the serve loop.
    ///
    /// Suspends until the serve loop accepts the event or the stream closes,
    /// whichever comes first; delivery wins when both are possible at once.
    /// After close this is a silent no-op — it never blocks and never
    /// panics. Events are delivered in the order sends are admitted by the
    /// channel.
    pub async fn send(&self, event: Event) {
        let mut close_rx = self.close_tx.subscribe();
        if *close_rx.borrow() {
            return;
        }
        tokio::select! {
            biased;
            result = self.events_tx.send_async(event) => {
                // The receiving half lives in `self`, so the channel can only
                // report disconnected once the stream is closing down.
                let _ = result;
            }
            _ = close_rx.wait_for(|closed| *closed) => {}
        }
    }

    /// Send a comment-only event (`:text`), invisible to client listeners.
    pub async fn comment(&self, text: impl Into<String>) {
        self.send(Event::comment(text)).await;
    }

    /// Send a `:ping` comment to keep the connection alive.
    pub async fn ping(&self) {
        self.comment("ping").await;
    }

    /// Tell the client how long to wait, in milliseconds, before
    /// reconnecting.
    pub async fn retry(&self, millis: u64) {
        self.send(Event::retry_after(millis)).await;
    }

    /// Close the stream. Idempotent; safe to call from any task at any
    /// point in the lifecycle. Unblocks pending senders and terminates the
    /// serve loop.
    pub fn close(&self) {
        if !self.close_tx.send_replace(true) {
            tracing::debug!("sse stream closed");
        }
    }

    /// True once the stream has closed, whether by [`close`](Stream::close)
    /// or by client disconnect.
    pub fn is_closed(&self) -> bool {
        *self.close_tx.borrow()
    }

    /// Wait until the stream has closed. Returns immediately if it already
    /// has.
    pub async fn closed(&self) {
        let mut close_rx = self.close_tx.subscribe();
        // The sender half lives in `self`, so `wait_for` cannot fail while
        // this borrow is alive.
        let _ = close_rx.wait_for(|closed| *closed).await;
    }

    /// Bind this stream to its one HTTP connection.
    ///
    /// Returns the streaming response: status 200, `Content-Type:
    /// text/event-stream`, and a body that emits one frame per event until
    /// the client disconnects or the stream is closed. Events without a name
    /// or comment are delivered under the generic `message` type. An event
    /// that fails validation is logged and skipped; the connection stays up.
    ///
    /// # Panics
    ///
    /// Panics if called a second time. A stream binds to exactly one
    /// connection; rebinding is a programming error, not a runtime
    /// condition.
    pub fn serve(&self) -> Response {
        {
            let mut bound = self.bound.lock().expect("bind flag poisoned");
            if *bound {
                panic!("Stream::serve may only be called once per stream");
            }
            *bound = true;
        }
        tracing::debug!("sse stream bound to connection");

        let relay = Relay {
            events: self.events_rx.clone(),
            close_rx: self.close_tx.subscribe(),
            close_tx: self.close_tx.clone(),
        };
        let frames = stream::unfold(relay, |mut relay| async move {
            loop {
                let received = tokio::select! {
                    received = relay.events.recv_async() => received,
                    _ = relay.close_rx.wait_for(|closed| *closed) => return None,
                };
                let Ok(event) = received else { return None };
                match encode_frame(event) {
                    Some(frame) => return Some((Ok::<_, Infallible>(frame), relay)),
                    None => continue,
                }
            }
        });

        (
            StatusCode::OK,
            [
                (header::CONTENT_TYPE, TEXT_EVENT_STREAM),
                (header::CACHE_CONTROL, "no-cache"),
            ],
            Body::from_stream(frames),
        )
            .into_response()
    }
}

/// Serve-loop state. Dropping it closes the stream, which is how a client
/// disconnect (the transport dropping the response body) propagates back to
/// producers.
struct Relay {
    events: flume::Receiver<Event>,
    close_rx: watch::Receiver<bool>,
    close_tx: watch::Sender<bool>,
}

impl Drop for Relay {
    fn drop(&mut self) {
        if !self.close_tx.send_replace(true) {
            tracing::debug!("client disconnected; sse stream closed");
        }
    }
}

/// Apply the stream-level default name, encode, and package one body frame.
/// Returns `None` for events that produce no bytes or fail validation.
fn encode_frame(mut event: Event) -> Option<Bytes> {
    if event.name().is_none() && event.comment_text().is_none() {
        event = event.with_name(DEFAULT_EVENT_NAME);
    }
    let mut buf = Vec::with_capacity(64);
    match encode::write_event(&mut buf, &event) {
        Ok(()) if buf.is_empty() => None,
        Ok(()) => Some(Bytes::from(buf)),
        Err(err) => {
            tracing::warn!(error = %err, "dropping unencodable event");
            None
        }
    }
}
