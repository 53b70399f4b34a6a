//! Stateless SSE wire encoding.
//!
//! [`write_event`] renders one [`Event`] into the exact byte format the
//! protocol prescribes: a fixed field order (`retry`, `event`, `id`, `data`,
//! comment lines), one trailing blank line iff at least one field was
//! emitted, and nothing at all for an empty event. The encoder applies no
//! defaults and keeps no state between events, so it is usable on its own
//! against any `io::Write` sink.

use std::io::Write;

use crate::error::EncodeError;
use crate::event::Event;

/// Validation window for single-line fields. Content is copied to the sink
/// one chunk at a time so oversized names/ids never need full buffering.
const SCAN_CHUNK: usize = 1024;

/// Write `event` to `sink` in SSE wire format.
///
/// Field order is fixed: `retry`, `event`, `id`, `data` lines, comment
/// lines, then the blank-line terminator. An event with no field set writes
/// zero bytes.
///
/// On [`EncodeError::InvalidField`] the offending field's tag (and any
/// earlier fields) may already be on the sink; the terminator is never
/// written for a failed event. Callers must discard or abandon the sink's
/// current event on error.
pub fn write_event<W: Write>(sink: &mut W, event: &Event) -> Result<(), EncodeError> {
    let mut fields = FieldWriter::new(sink);

    if let Some(retry) = event.retry() {
        fields.retry(retry)?;
    }
    if let Some(name) = event.name() {
        fields.single_line("event", name)?;
    }
    if let Some(id) = event.id() {
        fields.single_line("id", id)?;
    }
    if let Some(data) = event.data() {
        fields.multi_line("data", data)?;
    }
    if let Some(comment) = event.comment_text() {
        fields.multi_line("", comment)?;
    }

    fields.finish()
}

/// Tracks whether any field line has been emitted so the event terminator is
/// only written for non-empty events, and guards single-line fields against
/// embedded line terminators.
struct FieldWriter<'a, W: Write> {
    sink: &'a mut W,
    wrote_field: bool,
}

impl<'a, W: Write> FieldWriter<'a, W> {
    fn new(sink: &'a mut W) -> Self {
        Self {
            sink,
            wrote_field: false,
        }
    }

    fn retry(&mut self, millis: u64) -> Result<(), EncodeError> {
        self.wrote_field = true;
        writeln!(self.sink, "retry:{millis}")?;
        Ok(())
    }

    /// Emit `tag:content\n`, copying `content` chunk-wise and checking each
    /// chunk for `\n`/`\r` before it is forwarded. On a violation the error
    /// is raised before any byte of the offending chunk reaches the sink;
    /// earlier chunks stay written and the event is left unterminated.
    fn single_line(&mut self, tag: &'static str, content: &str) -> Result<(), EncodeError> {
        self.wrote_field = true;
        write!(self.sink, "{tag}:")?;
        for chunk in content.as_bytes().chunks(SCAN_CHUNK) {
            if chunk.iter().any(|&b| matches!(b, b'\n' | b'\r')) {
                return Err(EncodeError::InvalidField { field: tag });
            }
            self.sink.write_all(chunk)?;
        }
        self.sink.write_all(b"\n")?;
        Ok(())
    }

    /// Emit one `tag:line\n` per line of `content`. Line boundaries are `\n`
    /// or `\r\n`; a trailing partial line is still emitted; an empty string
    /// yields no lines and therefore no field. An empty `tag` produces the
    /// protocol's unnamed comment lines (`:line`).
    fn multi_line(&mut self, tag: &str, content: &str) -> Result<(), EncodeError> {
        for line in content.lines() {
            self.wrote_field = true;
            writeln!(self.sink, "{tag}:{line}")?;
        }
        Ok(())
    }

    fn finish(self) -> Result<(), EncodeError> {
        if self.wrote_field {
            self.sink.write_all(b"\n")?;
        }
        Ok(())
    }
}
