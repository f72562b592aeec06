//! Chunk stream reader.
//!
//! [`ChunkReader`] consumes length-prefixed chunks from any `Read`
//! source in order. The terminator ends the stream; nothing after it is
//! ever read.

use std::io::Read;

use crate::frame::{read_len_prefix, read_payload, TERMINATOR};
use simcache_core::CacheError;

/// Reads chunks from a byte stream, with one length prefix of lookahead.
///
/// Generic over `R: Read` so tests can use `&[u8]` and the streaming
/// store can use `BufReader<File>`.
pub struct ChunkReader<R: Read> {
    reader: R,
    /// Length prefix already decoded but whose payload is not yet read.
    pending_len: Option<u64>,
    ended: bool,
    chunks_read: u64,
}

impl<R: Read> ChunkReader<R> {
    /// Wrap a source. Nothing is read until the first request.
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            pending_len: None,
            ended: false,
            chunks_read: 0,
        }
    }

    /// Decode the next length prefix without consuming its payload.
    fn peek_len(&mut self) -> Result<u64, CacheError> {
        if self.ended {
            return Ok(TERMINATOR);
        }
        if let Some(len) = self.pending_len {
            return Ok(len);
        }
        let len = read_len_prefix(&mut self.reader)?.ok_or_else(|| {
            CacheError::corrupt("chunk stream ended without a terminator")
        })?;
        if len == TERMINATOR {
            self.ended = true;
        } else {
            self.pending_len = Some(len);
        }
        Ok(len)
    }

    /// `true` once the terminator has been (or is next to be) decoded.
    pub fn is_at_end(&mut self) -> Result<bool, CacheError> {
        Ok(self.peek_len()? == TERMINATOR)
    }

    /// Read the next chunk, or `None` at the terminator.
    pub fn next_chunk(&mut self) -> Result<Option<Vec<u8>>, CacheError> {
        let len = self.peek_len()?;
        if len == TERMINATOR {
            return Ok(None);
        }
        self.pending_len = None;
        let payload = read_payload(&mut self.reader, len)?;
        self.chunks_read += 1;
        Ok(Some(payload))
    }

    /// Number of chunks read so far.
    pub fn chunks_read(&self) -> u64 {
        self.chunks_read
    }

    /// Convert into a chunk iterator.
    pub fn chunks(self) -> ChunkIter<R> {
        ChunkIter {
            inner: self,
            done: false,
        }
    }

    /// Consume the reader and return the underlying source.
    pub fn into_inner(self) -> R {
        self.reader
    }
}

/// Iterator adapter over stream chunks.
///
/// Yields every payload in order, stops at the terminator, and fuses
/// after the first error.
pub struct ChunkIter<R: Read> {
    inner: ChunkReader<R>,
    done: bool,
}

impl<R: Read> Iterator for ChunkIter<R> {
    type Item = Result<Vec<u8>, CacheError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.inner.next_chunk() {
            Ok(Some(chunk)) => Some(Ok(chunk)),
            Ok(None) => {
                self.done = true;
                None
            }
            Err(e) => {
                self.done = true;
                Some(Err(e))
            }
        }
    }
}
