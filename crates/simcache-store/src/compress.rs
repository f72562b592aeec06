//! Pluggable whole-cache compression for [`MemoryStore`](crate::MemoryStore).
//!
//! The compressor's [`tag`](Compressor::tag) is written into the artifact
//! header, so a cache is only ever decompressed by the algorithm that
//! produced it.

use std::io::{Read, Write};

use flate2::read::DeflateDecoder;
use flate2::write::DeflateEncoder;
use flate2::Compression;
use simcache_core::CacheError;

/// A compression algorithm for the whole-cache artifact.
pub trait Compressor {
    /// Stable identifier recorded in the artifact header.
    fn tag(&self) -> u8;

    /// Human-readable algorithm name, for diagnostics.
    fn name(&self) -> &'static str;

    /// Compress the encoded snapshot sequence.
    fn compress(&self, raw: &[u8]) -> Result<Vec<u8>, CacheError>;

    /// Invert [`compress`](Compressor::compress).
    ///
    /// Returns [`CacheError::CorruptCache`] if `packed` is not valid
    /// output of this algorithm.
    fn decompress(&self, packed: &[u8]) -> Result<Vec<u8>, CacheError>;
}

/// LZ4 block compression with the uncompressed size prepended.
///
/// The default: fast in both directions, moderate ratio.
#[derive(Clone, Copy, Debug, Default)]
pub struct Lz4Compressor;

impl Compressor for Lz4Compressor {
    fn tag(&self) -> u8 {
        1
    }

    fn name(&self) -> &'static str {
        "lz4"
    }

    fn compress(&self, raw: &[u8]) -> Result<Vec<u8>, CacheError> {
        Ok(lz4_flex::compress_prepend_size(raw))
    }

    fn decompress(&self, packed: &[u8]) -> Result<Vec<u8>, CacheError> {
        lz4_flex::decompress_size_prepended(packed)
            .map_err(|e| CacheError::corrupt(format!("lz4 decompression failed: {e}")))
    }
}

/// Raw deflate stream. Slower than LZ4, smaller output.
#[derive(Clone, Copy, Debug)]
pub struct DeflateCompressor {
    level: u32,
}

impl DeflateCompressor {
    /// Deflate at the given level, clamped to `0..=9`.
    pub fn new(level: u32) -> Self {
        Self {
            level: level.min(9),
        }
    }

    /// Maximum compression.
    pub fn best() -> Self {
        Self::new(9)
    }

    /// The configured compression level.
    pub fn level(&self) -> u32 {
        self.level
    }
}

impl Default for DeflateCompressor {
    fn default() -> Self {
        Self::new(6)
    }
}

impl Compressor for DeflateCompressor {
    fn tag(&self) -> u8 {
        2
    }

    fn name(&self) -> &'static str {
        "deflate"
    }

    fn compress(&self, raw: &[u8]) -> Result<Vec<u8>, CacheError> {
        let mut encoder = DeflateEncoder::new(Vec::new(), Compression::new(self.level));
        encoder.write_all(raw)?;
        Ok(encoder.finish()?)
    }

    fn decompress(&self, packed: &[u8]) -> Result<Vec<u8>, CacheError> {
        let mut out = Vec::new();
        DeflateDecoder::new(packed)
            .read_to_end(&mut out)
            .map_err(|e| CacheError::corrupt(format!("deflate decompression failed: {e}")))?;
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn repetitive(n: usize) -> Vec<u8> {
        (0..n).map(|i| (i % 7) as u8).collect()
    }

    #[test]
    fn both_algorithms_invert() {
        let raw = repetitive(4096);
        let lz4 = Lz4Compressor;
        let deflate = DeflateCompressor::default();
        assert_eq!(lz4.decompress(&lz4.compress(&raw).unwrap()).unwrap(), raw);
        assert_eq!(
            deflate.decompress(&deflate.compress(&raw).unwrap()).unwrap(),
            raw
        );
    }

    #[test]
    fn tags_are_distinct() {
        assert_ne!(Lz4Compressor.tag(), DeflateCompressor::default().tag());
    }

    #[test]
    fn deflate_level_is_clamped() {
        assert_eq!(DeflateCompressor::new(42).level(), 9);
    }

    #[test]
    fn lz4_rejects_garbage() {
        // Declares 16 uncompressed bytes, then a literal run that overruns the input.
        let packed = [16u8, 0, 0, 0, 0xF0];
        assert!(matches!(
            Lz4Compressor.decompress(&packed),
            Err(CacheError::CorruptCache { .. })
        ));
    }
}
