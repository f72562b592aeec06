//! Length-prefixed chunk framing for the streaming cache format.
//!
//! Every chunk is an 8-byte little-endian `u64` length followed by
//! exactly that many payload bytes. A length of zero is the end-of-cache
//! terminator and is never followed by a payload. There is no header.

use std::io::{ErrorKind, Read, Write};

use simcache_core::CacheError;

/// Size of a chunk length prefix in bytes.
pub const LEN_PREFIX_SIZE: usize = 8;

/// Length prefix value that terminates a chunk stream.
pub const TERMINATOR: u64 = 0;

// ── Writers ─────────────────────────────────────────────────────

/// Write a little-endian u64.
pub fn write_u64_le(w: &mut dyn Write, v: u64) -> Result<(), CacheError> {
    w.write_all(&v.to_le_bytes())?;
    Ok(())
}

/// Write one chunk: length prefix, then payload.
///
/// Rejects an empty payload, which would read back as the terminator.
pub fn write_chunk(w: &mut dyn Write, payload: &[u8]) -> Result<(), CacheError> {
    if payload.is_empty() {
        return Err(CacheError::EmptySnapshot);
    }
    write_u64_le(w, payload.len() as u64)?;
    w.write_all(payload)?;
    Ok(())
}

/// Write the end-of-cache terminator.
pub fn write_terminator(w: &mut dyn Write) -> Result<(), CacheError> {
    write_u64_le(w, TERMINATOR)
}

// ── Readers ─────────────────────────────────────────────────────

/// Read the next length prefix.
///
/// Returns `None` on a clean end of input (no prefix bytes at all),
/// which in a well-formed stream can only happen after the terminator.
/// A partial prefix is reported as [`CacheError::CorruptCache`].
pub fn read_len_prefix(r: &mut dyn Read) -> Result<Option<u64>, CacheError> {
    let mut buf = [0u8; LEN_PREFIX_SIZE];
    let mut filled = 0;
    while filled < LEN_PREFIX_SIZE {
        match r.read(&mut buf[filled..]) {
            Ok(0) => {
                if filled == 0 {
                    return Ok(None);
                }
                return Err(CacheError::corrupt(format!(
                    "truncated length prefix: got {filled} of {LEN_PREFIX_SIZE} bytes"
                )));
            }
            Ok(n) => filled += n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(CacheError::Io(e)),
        }
    }
    Ok(Some(u64::from_le_bytes(buf)))
}

/// Read exactly `len` payload bytes.
///
/// The buffer grows with the data actually read, so a corrupt, huge
/// length prefix fails on truncation instead of allocating up front.
pub fn read_payload(r: &mut dyn Read, len: u64) -> Result<Vec<u8>, CacheError> {
    let mut payload = Vec::new();
    Read::take(&mut *r, len).read_to_end(&mut payload)?;
    if (payload.len() as u64) < len {
        return Err(CacheError::corrupt(format!(
            "truncated chunk: expected {len} bytes, got {}",
            payload.len()
        )));
    }
    Ok(payload)
}

// ── Inspection ──────────────────────────────────────────────────

/// Structural summary of a chunk stream, produced by [`scan_chunks`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ChunkScan {
    /// Payload length of every chunk before the terminator, in order.
    pub chunk_lengths: Vec<u64>,
    /// Whether a terminator was found.
    pub terminated: bool,
    /// Bytes remaining after the terminator.
    pub trailing_bytes: u64,
}

impl ChunkScan {
    /// Number of payload chunks.
    pub fn chunk_count(&self) -> usize {
        self.chunk_lengths.len()
    }

    /// `true` for a terminated stream with nothing after the terminator.
    pub fn is_well_formed(&self) -> bool {
        self.terminated && self.trailing_bytes == 0
    }
}

/// Walk a chunk stream without decoding payloads.
///
/// Stops at the terminator and counts whatever bytes follow it. A stream
/// that ends without a terminator yields `terminated == false`; a stream
/// that ends mid-chunk is an error.
pub fn scan_chunks(r: &mut dyn Read) -> Result<ChunkScan, CacheError> {
    let mut scan = ChunkScan::default();
    loop {
        match read_len_prefix(r)? {
            None => return Ok(scan),
            Some(TERMINATOR) => {
                scan.terminated = true;
                scan.trailing_bytes = std::io::copy(r, &mut std::io::sink())?;
                return Ok(scan);
            }
            Some(len) => {
                read_payload(r, len)?;
                scan.chunk_lengths.push(len);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn chunk_layout_is_prefix_then_payload() {
        let mut buf = Vec::new();
        write_chunk(&mut buf, b"abc").unwrap();
        write_terminator(&mut buf).unwrap();
        assert_eq!(
            buf,
            [
                3, 0, 0, 0, 0, 0, 0, 0, b'a', b'b', b'c', //
                0, 0, 0, 0, 0, 0, 0, 0,
            ]
        );
    }

    #[test]
    fn empty_chunk_is_rejected() {
        let mut buf = Vec::new();
        assert!(matches!(
            write_chunk(&mut buf, &[]),
            Err(CacheError::EmptySnapshot)
        ));
        assert!(buf.is_empty());
    }

    #[test]
    fn partial_prefix_is_corrupt() {
        let data = [1u8, 0, 0];
        let err = read_len_prefix(&mut data.as_slice()).unwrap_err();
        assert!(matches!(err, CacheError::CorruptCache { .. }));
    }

    #[test]
    fn huge_length_fails_on_truncation() {
        let mut data = Vec::new();
        write_u64_le(&mut data, u64::MAX).unwrap();
        data.extend_from_slice(b"tiny");
        let mut r = data.as_slice();
        let len = read_len_prefix(&mut r).unwrap().unwrap();
        assert!(matches!(
            read_payload(&mut r, len),
            Err(CacheError::CorruptCache { .. })
        ));
    }

    #[test]
    fn scan_reports_missing_terminator_and_trailing_bytes() {
        let mut unterminated = Vec::new();
        write_chunk(&mut unterminated, b"xy").unwrap();
        let scan = scan_chunks(&mut unterminated.as_slice()).unwrap();
        assert_eq!(scan.chunk_lengths, vec![2]);
        assert!(!scan.terminated);

        let mut trailing = unterminated.clone();
        write_terminator(&mut trailing).unwrap();
        trailing.extend_from_slice(b"junk");
        let scan = scan_chunks(&mut trailing.as_slice()).unwrap();
        assert!(scan.terminated);
        assert_eq!(scan.trailing_bytes, 4);
        assert!(!scan.is_well_formed());
    }

    proptest! {
        #[test]
        fn any_chunk_sequence_scans_to_its_lengths(
            payloads in proptest::collection::vec(
                proptest::collection::vec(any::<u8>(), 1..64),
                0..16,
            )
        ) {
            let mut buf = Vec::new();
            for p in &payloads {
                write_chunk(&mut buf, p).unwrap();
            }
            write_terminator(&mut buf).unwrap();

            let scan = scan_chunks(&mut buf.as_slice()).unwrap();
            let expected: Vec<u64> = payloads.iter().map(|p| p.len() as u64).collect();
            prop_assert_eq!(&scan.chunk_lengths, &expected);
            prop_assert!(scan.is_well_formed());
        }
    }
}
