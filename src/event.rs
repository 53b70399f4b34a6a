use std::io;

use serde::{Deserialize, Serialize};

use crate::encode;
use crate::error::EncodeError;

/// One Server-Sent Event.
///
/// All fields are optional; an event with no field set encodes to zero bytes.
/// Fields map onto the wire format like this:
///
/// | field     | wire line(s)                         |
/// |-----------|--------------------------------------|
/// | `retry`   | `retry:<millis>`                     |
/// | `name`    | `event:<name>`                       |
/// | `id`      | `id:<id>`                            |
/// | `data`    | one `data:<line>` per input line     |
/// | `comment` | one `:<line>` per input line         |
///
/// `name` and `id` are single-line fields; encoding rejects line terminators
/// in them. `data` and `comment` may span multiple lines and are folded into
/// repeated field lines, which a conforming client joins back together with
/// `\n`.
///
/// # Example
///
/// ```
/// use ssestream::Event;
///
/// let event = Event::named("tick")
///     .with_id("42")
///     .with_data("the tick payload");
///
/// let mut buf = Vec::new();
/// event.write_to(&mut buf).unwrap();
/// assert_eq!(buf, b"event:tick\nid:42\ndata:the tick payload\n\n");
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    data: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    comment: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    retry: Option<u64>,
}

impl Event {
    /// Create an event with no field set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an event carrying only `data`.
    ///
    /// When sent through a [`Stream`](crate::Stream), an event without a name
    /// or comment is delivered under the generic `message` type, which is
    /// what browser-side `EventSource.onmessage` listens for.
    pub fn message(data: impl Into<String>) -> Self {
        Self::new().with_data(data)
    }

    /// Create an event with only its `name` (wire field `event`) set.
    pub fn named(name: impl Into<String>) -> Self {
        Self::new().with_name(name)
    }

    /// Create a comment-only event.
    ///
    /// Comments are invisible to the client's event model; they exist to keep
    /// intermediaries from timing out an otherwise quiet connection.
    pub fn comment(text: impl Into<String>) -> Self {
        Self {
            comment: Some(text.into()),
            ..Self::default()
        }
    }

    /// Create a retry-only event instructing the client to wait `millis`
    /// milliseconds before reconnecting.
    pub fn retry_after(millis: u64) -> Self {
        Self {
            retry: Some(millis),
            ..Self::default()
        }
    }

    /// Create a `data`-only event whose payload is `value` rendered as
    /// compact JSON. JSON never contains raw line terminators, so the result
    /// is always a single `data:` line.
    pub fn json_data<T: Serialize>(value: &T) -> Result<Self, serde_json::Error> {
        Ok(Self::message(serde_json::to_string(value)?))
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_data(mut self, data: impl Into<String>) -> Self {
        self.data = Some(data.into());
        self
    }

    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }

    pub fn with_retry(mut self, millis: u64) -> Self {
        self.retry = Some(millis);
        self
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    pub fn data(&self) -> Option<&str> {
        self.data.as_deref()
    }

    pub fn comment_text(&self) -> Option<&str> {
        self.comment.as_deref()
    }

    pub fn retry(&self) -> Option<u64> {
        self.retry
    }

    /// True when no field is set. Empty events encode to zero bytes.
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.id.is_none()
            && self.data.is_none()
            && self.comment.is_none()
            && self.retry.is_none()
    }

    /// Render this event in SSE wire format.
    ///
    /// Shorthand for [`encode::write_event`]. The encoder is stateless and
    /// applies no defaults; stream-level concerns such as the fallback
    /// `message` name live in [`Stream`](crate::Stream).
    pub fn write_to<W: io::Write>(&self, sink: &mut W) -> Result<(), EncodeError> {
        encode::write_event(sink, self)
    }
}
