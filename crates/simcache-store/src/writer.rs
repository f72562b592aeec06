//! Chunk stream writer.
//!
//! [`ChunkWriter`] appends length-prefixed chunks to any `Write` sink
//! and seals the stream with the terminator in [`finish`](ChunkWriter::finish).

use std::io::Write;

use crate::frame::{write_chunk, write_terminator};
use simcache_core::CacheError;

/// Writes snapshots to a byte stream one chunk at a time.
///
/// Generic over `W: Write` so tests can use `Vec<u8>` and the streaming
/// store can use `BufWriter<File>`.
///
/// # Examples
///
/// ```
/// use simcache_store::{ChunkReader, ChunkWriter};
///
/// let mut writer = ChunkWriter::new(Vec::new());
/// writer.write_chunk(b"first").unwrap();
/// writer.write_chunk(b"second").unwrap();
/// assert_eq!(writer.chunks_written(), 2);
/// let buf = writer.finish().unwrap();
///
/// let mut reader = ChunkReader::new(buf.as_slice());
/// assert_eq!(reader.next_chunk().unwrap().unwrap(), b"first");
/// assert_eq!(reader.next_chunk().unwrap().unwrap(), b"second");
/// assert!(reader.next_chunk().unwrap().is_none());
/// ```
pub struct ChunkWriter<W: Write> {
    writer: W,
    chunks_written: u64,
    sealed: bool,
}

impl<W: Write> ChunkWriter<W> {
    /// Wrap a sink. Nothing is written until the first chunk.
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            chunks_written: 0,
            sealed: false,
        }
    }

    /// Append one chunk.
    pub fn write_chunk(&mut self, payload: &[u8]) -> Result<(), CacheError> {
        if self.sealed {
            return Err(CacheError::invalid_state("chunk written after the terminator"));
        }
        write_chunk(&mut self.writer, payload)?;
        self.chunks_written += 1;
        Ok(())
    }

    /// Flush the underlying writer.
    pub fn flush(&mut self) -> Result<(), CacheError> {
        self.writer.flush()?;
        Ok(())
    }

    /// Number of chunks written so far.
    pub fn chunks_written(&self) -> u64 {
        self.chunks_written
    }

    /// `true` once the terminator has been written to the sink.
    pub fn is_sealed(&self) -> bool {
        self.sealed
    }

    /// Write the terminator and flush, keeping the sink.
    ///
    /// Safe to call again after a failure: the terminator is written at
    /// most once, and every call flushes.
    pub fn seal(&mut self) -> Result<(), CacheError> {
        if !self.sealed {
            write_terminator(&mut self.writer)?;
            self.sealed = true;
        }
        self.writer.flush()?;
        Ok(())
    }

    /// Write the terminator, flush, and return the underlying sink.
    pub fn finish(mut self) -> Result<W, CacheError> {
        self.seal()?;
        Ok(self.writer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::scan_chunks;
    use std::io;

    /// Accepts every write but fails the first `failures` flushes.
    struct StubbornSink {
        bytes: Vec<u8>,
        failures: usize,
    }

    impl Write for StubbornSink {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.bytes.extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            if self.failures > 0 {
                self.failures -= 1;
                return Err(io::Error::new(io::ErrorKind::StorageFull, "disk full"));
            }
            Ok(())
        }
    }

    #[test]
    fn seal_retry_writes_one_terminator() {
        let mut writer = ChunkWriter::new(StubbornSink {
            bytes: Vec::new(),
            failures: 1,
        });
        writer.write_chunk(b"abc").unwrap();
        assert!(matches!(writer.seal(), Err(CacheError::Io(_))));
        assert!(writer.is_sealed());
        writer.seal().unwrap();

        let sink = writer.finish().unwrap();
        let scan = scan_chunks(&mut sink.bytes.as_slice()).unwrap();
        assert_eq!(scan.chunk_lengths, vec![3]);
        assert!(scan.is_well_formed());
    }

    #[test]
    fn no_chunks_after_the_terminator() {
        let mut writer = ChunkWriter::new(Vec::new());
        writer.seal().unwrap();
        assert!(matches!(
            writer.write_chunk(b"late"),
            Err(CacheError::InvalidState { .. })
        ));
        assert_eq!(writer.finish().unwrap().len(), 8);
    }
}
