//! Session transcript buffer with tail-search for expect patterns.
//!
//! Everything a device sends is kept (ANSI-stripped) so the whole session
//! can be handed back as a transcript. Expect searches only look at bytes
//! after the last consumed match, and only at the last `search_depth` of
//! those, which keeps long discovery captures cheap to scan.

use std::fmt;

use regex::bytes::Regex;
use vte::{Parser, Perform};

/// Collects printable output from the VT parser.
struct Printable<'a> {
    out: &'a mut Vec<u8>,
}

impl Perform for Printable<'_> {
    fn print(&mut self, c: char) {
        let mut utf8 = [0u8; 4];
        self.out.extend_from_slice(c.encode_utf8(&mut utf8).as_bytes());
    }

    fn execute(&mut self, byte: u8) {
        if matches!(byte, b'\n' | b'\r' | b'\t') {
            self.out.push(byte);
        }
    }
}

/// Whole-session output with a moving search window.
pub struct Transcript {
    /// The accumulated, escape-free output.
    buffer: Vec<u8>,

    /// Bytes before this offset belong to earlier matches.
    consumed: usize,

    /// Window size for expect searches.
    search_depth: usize,

    /// Escape sequences may straddle reads, so parser state persists.
    parser: Parser,
}

impl Transcript {
    pub fn new(search_depth: usize) -> Self {
        Self {
            buffer: Vec::with_capacity(4096),
            consumed: 0,
            search_depth,
            parser: Parser::new(),
        }
    }

    /// Append device output minus escape sequences.
    pub fn extend(&mut self, data: &[u8]) {
        let mut sink = Printable {
            out: &mut self.buffer,
        };
        self.parser.advance(&mut sink, data);
    }

    /// Search the unconsumed tail of the buffer for the pattern.
    ///
    /// Returns the absolute byte offset where the match ends.
    pub fn search_tail(&self, pattern: &Regex) -> Option<usize> {
        let start = self
            .buffer
            .len()
            .saturating_sub(self.search_depth)
            .max(self.consumed);
        pattern.find(&self.buffer[start..]).map(|m| start + m.end())
    }

    /// Mark everything up to `end` as seen, so later searches skip it.
    pub fn consume_to(&mut self, end: usize) {
        self.consumed = end.min(self.buffer.len()).max(self.consumed);
    }

    /// Mark the whole buffer as seen.
    pub fn consume_all(&mut self) {
        self.consumed = self.buffer.len();
    }

    /// Everything received so far.
    pub fn as_slice(&self) -> &[u8] {
        &self.buffer
    }

    /// Split the transcript into lines, dropping carriage returns and
    /// blank lines produced by CR/LF pairs.
    pub fn lines(&self) -> Vec<String> {
        String::from_utf8_lossy(&self.buffer)
            .split('\n')
            .map(|line| line.trim_end_matches('\r').replace('\r', ""))
            .filter(|line| !line.is_empty())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.buffer.len()
    }
}

impl fmt::Debug for Transcript {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Transcript")
            .field("len", &self.buffer.len())
            .field("consumed", &self.consumed)
            .field("search_depth", &self.search_depth)
            .finish()
    }
}
