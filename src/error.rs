use std::io;

use thiserror::Error;

/// Errors raised while rendering a single event.
///
/// An encode failure is local to the event that produced it: a
/// [`Stream`](crate::Stream) logs and drops the offending event and keeps
/// relaying later ones. Callers driving the encoder directly must treat any
/// error as "this event was not delivered cleanly" — a validation failure may
/// leave a partially written field behind on the sink.
#[derive(Debug, Error)]
pub enum EncodeError {
    /// A single-line field (`event` or `id`) contained `\n` or `\r`.
    #[error("field `{field}` must not contain line terminators")]
    InvalidField { field: &'static str },

    /// The sink rejected a write. When the sink is a live connection the
    /// stream treats this the same as a client disconnect.
    #[error("write to event sink failed")]
    Io(#[from] io::Error),
}

impl EncodeError {
    /// The wire-format field name the error refers to, if any.
    pub fn field(&self) -> Option<&'static str> {
        match self {
            EncodeError::InvalidField { field } => Some(field),
            EncodeError::Io(_) => None,
        }
    }
}
