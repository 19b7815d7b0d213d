//! Quote tracker
//!
//! The `csv` crate accepts a quoted field left open at the end of the input
//! and silently turns everything after the opening quote into that field.
//! [QuoteTracker] watches the bytes handed to the CSV parser and tells
//! whether the input ended inside a quoted field.

use std::io::{self, Read};

/// Lexer state, following the `csv` parser with double quote escaping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum QuoteState {
    FieldStart,
    Unquoted,
    Quoted,
    /// A quote was met in a quoted field: either its end or the first half
    /// of an escaped `""`.
    QuoteInQuoted,
}

/// Pass-through reader tracking the quoting state of the bytes read.
pub(crate) struct QuoteTracker<R> {
    inner: R,
    delimiter: u8,
    state: QuoteState,
}

impl<R> QuoteTracker<R> {
    pub(crate) fn new(inner: R, delimiter: u8) -> Self {
        Self {
            inner,
            delimiter,
            state: QuoteState::FieldStart,
        }
    }

    /// Tell if the bytes read so far end inside an open quoted field.
    pub(crate) fn in_quoted_field(&self) -> bool {
        self.state == QuoteState::Quoted
    }

    fn is_separator(&self, byte: u8) -> bool {
        byte == self.delimiter || byte == b'\n' || byte == b'\r'
    }

    fn track(&mut self, byte: u8) {
        self.state = match self.state {
            QuoteState::FieldStart if byte == b'"' => QuoteState::Quoted,
            QuoteState::FieldStart | QuoteState::Unquoted | QuoteState::QuoteInQuoted
                if self.is_separator(byte) =>
            {
                QuoteState::FieldStart
            }
            QuoteState::QuoteInQuoted if byte == b'"' => QuoteState::Quoted,
            QuoteState::FieldStart | QuoteState::Unquoted | QuoteState::QuoteInQuoted => {
                QuoteState::Unquoted
            }
            QuoteState::Quoted if byte == b'"' => QuoteState::QuoteInQuoted,
            QuoteState::Quoted => QuoteState::Quoted,
        };
    }
}

impl<R: Read> Read for QuoteTracker<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let read = self.inner.read(buf)?;
        for &byte in &buf[..read] {
            self.track(byte);
        }

        Ok(read)
    }
}
