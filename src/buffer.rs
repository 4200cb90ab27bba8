//! Text buffers that operations are spliced into.
//!
//! An insert is `text[..p] + content + text[p..]` and a delete is
//! `text[..p] + text[p + len..]`, with `p` and `len` counted in chars.

use crate::error::OtError;
use crate::error::Result;
use crate::ot::op::OpKind;
use crate::ot::op::Operation;

/// A char-indexed text buffer.
///
/// Callers check bounds before splicing; implementations may assume
/// `at + count <= char_len()`.
pub trait TextBuffer {
    fn char_len(&self) -> u64;
    fn insert_chars(&mut self, at: u64, text: &str);
    fn remove_chars(&mut self, at: u64, count: u64);
}

impl TextBuffer for String {
    fn char_len(&self) -> u64 {
        return self.chars().count() as u64;
    }

    fn insert_chars(&mut self, at: u64, text: &str) {
        let index = byte_offset(self, at);
        self.insert_str(index, text);
    }

    fn remove_chars(&mut self, at: u64, count: u64) {
        let start = byte_offset(self, at);
        let end = start + byte_offset(&self[start..], count);
        self.replace_range(start..end, "");
    }
}

impl TextBuffer for Vec<char> {
    fn char_len(&self) -> u64 {
        return self.len() as u64;
    }

    fn insert_chars(&mut self, at: u64, text: &str) {
        let at = at as usize;
        self.splice(at..at, text.chars());
    }

    fn remove_chars(&mut self, at: u64, count: u64) {
        let at = at as usize;
        self.drain(at..at + count as usize);
    }
}

fn byte_offset(text: &str, chars: u64) -> usize {
    return text
        .char_indices()
        .nth(chars as usize)
        .map(|(index, _)| index)
        .unwrap_or(text.len());
}

/// Splice one operation into `buffer`.
///
/// A retain never touches the buffer and is never bounds-checked. An
/// operation reaching past the end of the buffer fails with
/// [`OtError::OutOfBounds`] and leaves the buffer unchanged.
pub fn apply<B: TextBuffer + ?Sized>(buffer: &mut B, op: &Operation) -> Result<()> {
    let len = buffer.char_len();
    match &op.kind {
        OpKind::Retain => {}
        OpKind::Insert { content } => {
            if op.position > len {
                return Err(OtError::OutOfBounds { position: op.position, end: op.position, len });
            }
            buffer.insert_chars(op.position, content);
        }
        OpKind::Delete { length } => {
            let end = op.position + length;
            if end > len {
                return Err(OtError::OutOfBounds { position: op.position, end, len });
            }
            buffer.remove_chars(op.position, *length);
        }
    }
    return Ok(());
}

/// Apply `ops` in order, stopping at the first one that does not fit.
/// Operations before the failing one stay applied.
pub fn apply_all<B: TextBuffer + ?Sized>(buffer: &mut B, ops: &[Operation]) -> Result<()> {
    for op in ops {
        apply(buffer, op)?;
    }
    return Ok(());
}
