// feedsniff - app/stream.rs
//
// Incremental classification of a feed that arrives in pieces (an HTTP
// body, a pipe, a slow disk).
//
// The sniffer itself is stateless; `StreamSniffer` is the caller-side loop
// around it: accumulate bytes, re-classify after each chunk while the
// answer is `Unknown`, and stop re-classifying once it is definitive.
// Only the first `STREAM_BUFFER_LIMIT` bytes are kept, since nothing past
// the sniff window can change the answer.

use crate::core::model::FeedFormat;
use crate::core::sniffer;
use crate::util::constants;
use std::io::{self, Read};

/// Accumulate-and-re-poll state for one stream.
#[derive(Debug, Clone)]
pub struct StreamSniffer {
    buffer: Vec<u8>,
    consumed: usize,
    format: FeedFormat,
    decided_at: Option<usize>,
}

impl Default for StreamSniffer {
    fn default() -> Self {
        Self::new()
    }
}

impl StreamSniffer {
    pub fn new() -> Self {
        Self {
            buffer: Vec::with_capacity(constants::MIN_BYTES_REQUIRED),
            consumed: 0,
            format: FeedFormat::Unknown,
            decided_at: None,
        }
    }

    /// Feed the next chunk and return the current classification.
    ///
    /// Once the classification is definitive further chunks only advance
    /// the byte count.
    pub fn push(&mut self, chunk: &[u8]) -> FeedFormat {
        self.consumed += chunk.len();
        if self.decided_at.is_some() {
            return self.format;
        }

        let room = constants::STREAM_BUFFER_LIMIT.saturating_sub(self.buffer.len());
        self.buffer.extend_from_slice(&chunk[..chunk.len().min(room)]);

        self.format = sniffer::classify(&self.buffer);
        if self.format.is_definitive() {
            self.decided_at = Some(self.consumed);
        }
        self.format
    }

    /// The latest classification (`Unknown` until enough bytes arrived).
    pub fn format(&self) -> FeedFormat {
        self.format
    }

    pub fn is_decided(&self) -> bool {
        self.decided_at.is_some()
    }

    /// Total bytes pushed so far, including any not buffered.
    pub fn bytes_consumed(&self) -> usize {
        self.consumed
    }

    /// Bytes that had been pushed when the classification became definitive.
    pub fn decided_at(&self) -> Option<usize> {
        self.decided_at
    }

    /// The retained prefix of the stream.
    pub fn buffered(&self) -> &[u8] {
        &self.buffer
    }
}

/// Classify `reader` by pulling `chunk_size`-byte chunks until the answer
/// is definitive or the reader is exhausted. A stream that ends early stays
/// `Unknown`.
pub fn sniff_reader<R: Read>(mut reader: R, chunk_size: usize) -> io::Result<StreamSniffer> {
    let mut sniffer = StreamSniffer::new();
    let mut chunk = vec![0u8; chunk_size.max(1)];

    while !sniffer.is_decided() {
        let n = match reader.read(&mut chunk) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        };
        sniffer.push(&chunk[..n]);
    }

    Ok(sniffer)
}
