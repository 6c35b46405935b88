//! Framed payload compression.
//!
//! A compressed BTOON payload is a 16-byte header followed by the
//! compressor's output:
//!
//! ```text
//! +-------+---------+-----------+----------+-----------------+-------------------+
//! | magic | version | algorithm | reserved | compressed_size | uncompressed_size |
//! | BTON  |   u8    |    u8     |  u16 0   |     u32 be      |      u32 be       |
//! +-------+---------+-----------+----------+-----------------+-------------------+
//! ```
//!
//! Input without the magic bytes is treated as plain wire data, which makes
//! the frame opt-in on the wire. Because `0x42` (`B`) is itself a legal
//! positive fixint, frame detection also requires the version byte to be 1
//! before treating input as a frame; callers whose payloads may legitimately
//! start with `B`, `T`, `O`, `N`, `1` can turn `auto_decompress` off.
//!
//! Unwrapping cross-checks every declared size and enforces a configurable
//! expansion-ratio guard *before* the decompressor runs, so a hostile header
//! cannot trigger a huge allocation.

use crate::error::{Error, Result};
use std::io::Read;

/// Supported frame algorithms with their on-wire codes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub enum CompressionAlgorithm {
    Zlib,
    Lz4,
    Zstd,
    /// Frame present but payload stored raw.
    #[default]
    None,
}

impl CompressionAlgorithm {
    /// On-wire algorithm code for the frame header.
    #[must_use]
    pub const fn code(self) -> u8 {
        match self {
            CompressionAlgorithm::Zlib => 0,
            CompressionAlgorithm::Lz4 => 1,
            CompressionAlgorithm::Zstd => 2,
            CompressionAlgorithm::None => 255,
        }
    }

    /// Resolves an on-wire code back to an algorithm.
    #[must_use]
    pub const fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(CompressionAlgorithm::Zlib),
            1 => Some(CompressionAlgorithm::Lz4),
            2 => Some(CompressionAlgorithm::Zstd),
            255 => Some(CompressionAlgorithm::None),
            _ => None,
        }
    }
}

pub(crate) const FRAME_MAGIC: [u8; 4] = *b"BTON";
pub(crate) const FRAME_VERSION: u8 = 1;
pub(crate) const FRAME_LEN: usize = 16;

const ZLIB_DEFAULT_LEVEL: i32 = 6;
const ZSTD_DEFAULT_LEVEL: i32 = 3;

/// Payloads at or above this many bytes adaptively select zstd over zlib.
const ADAPTIVE_ZSTD_THRESHOLD: usize = 64 * 1024;

/// Compresses `data` with the given algorithm.
///
/// `level` is algorithm-specific; `0` selects the library default (zlib 6,
/// zstd 3). LZ4 has a single speed profile and ignores the level. The output
/// is a bare compressed block without the frame header; LZ4 blocks carry a
/// small internal size prefix so they remain self-describing.
pub fn compress(algorithm: CompressionAlgorithm, data: &[u8], level: i32) -> Result<Vec<u8>> {
    match algorithm {
        CompressionAlgorithm::Zlib => {
            let level = if level == 0 { ZLIB_DEFAULT_LEVEL } else { level };
            let level = level.clamp(1, 9) as u32;
            let mut encoder = flate2::read::ZlibEncoder::new(data, flate2::Compression::new(level));
            let mut out = Vec::new();
            encoder
                .read_to_end(&mut out)
                .map_err(|e| Error::compression(format!("zlib: {e}")))?;
            Ok(out)
        }
        CompressionAlgorithm::Lz4 => Ok(lz4_flex::compress_prepend_size(data)),
        CompressionAlgorithm::Zstd => {
            let level = if level == 0 { ZSTD_DEFAULT_LEVEL } else { level };
            zstd::bulk::compress(data, level).map_err(|e| Error::compression(format!("zstd: {e}")))
        }
        CompressionAlgorithm::None => Ok(data.to_vec()),
    }
}

/// Decompresses a block produced by [`compress`] with the same algorithm.
///
/// This is the bare-block operation; frame unwrapping with its size
/// cross-checks and ratio guard lives in the decode path.
pub fn decompress(algorithm: CompressionAlgorithm, data: &[u8]) -> Result<Vec<u8>> {
    match algorithm {
        CompressionAlgorithm::Zlib => {
            let mut decoder = flate2::read::ZlibDecoder::new(data);
            let mut out = Vec::new();
            decoder
                .read_to_end(&mut out)
                .map_err(|e| Error::compression(format!("zlib: {e}")))?;
            Ok(out)
        }
        CompressionAlgorithm::Lz4 => lz4_flex::decompress_size_prepended(data)
            .map_err(|e| Error::compression(format!("lz4: {e}"))),
        CompressionAlgorithm::Zstd => {
            zstd::stream::decode_all(data).map_err(|e| Error::compression(format!("zstd: {e}")))
        }
        CompressionAlgorithm::None => Ok(data.to_vec()),
    }
}

/// Picks an algorithm and level for `adaptive_compression` from the payload
/// size alone, so the choice stays deterministic for a given input.
pub(crate) fn select_adaptive(payload_len: usize) -> (CompressionAlgorithm, i32) {
    let choice = if payload_len < ADAPTIVE_ZSTD_THRESHOLD {
        (CompressionAlgorithm::Zlib, ZLIB_DEFAULT_LEVEL)
    } else {
        (CompressionAlgorithm::Zstd, ZSTD_DEFAULT_LEVEL)
    };
    tracing::debug!(payload_len, algorithm = ?choice.0, "adaptive compression selection");
    choice
}

/// Returns `true` when `data` begins with a version-1 frame header.
#[must_use]
pub(crate) fn is_frame(data: &[u8]) -> bool {
    data.len() >= 5 && data[..4] == FRAME_MAGIC && data[4] == FRAME_VERSION
}

/// Builds a frame around an already-compressed payload.
pub(crate) fn wrap_frame(
    algorithm: CompressionAlgorithm,
    compressed: &[u8],
    uncompressed_len: usize,
) -> Vec<u8> {
    let mut out = Vec::with_capacity(FRAME_LEN + compressed.len());
    out.extend_from_slice(&FRAME_MAGIC);
    out.push(FRAME_VERSION);
    out.push(algorithm.code());
    out.extend_from_slice(&[0, 0]);
    out.extend_from_slice(&(compressed.len() as u32).to_be_bytes());
    out.extend_from_slice(&(uncompressed_len as u32).to_be_bytes());
    out.extend_from_slice(compressed);
    out
}

/// Unwraps a frame previously detected by [`is_frame`], enforcing size
/// cross-checks and the ratio guard, and returns the decompressed bytes.
pub(crate) fn unwrap_frame(data: &[u8], ratio_guard: u64) -> Result<Vec<u8>> {
    if data.len() < FRAME_LEN {
        return Err(Error::length_mismatch(
            data.len(),
            format!("frame header needs {FRAME_LEN} bytes, found {}", data.len()),
        ));
    }
    let algorithm_code = data[5];
    let compressed_size = u32::from_be_bytes([data[8], data[9], data[10], data[11]]);
    let uncompressed_size = u32::from_be_bytes([data[12], data[13], data[14], data[15]]);

    let payload = &data[FRAME_LEN..];
    if payload.len() != compressed_size as usize {
        return Err(Error::length_mismatch(
            FRAME_LEN,
            format!(
                "frame declares {compressed_size} compressed byte(s), found {}",
                payload.len()
            ),
        ));
    }

    let algorithm = CompressionAlgorithm::from_code(algorithm_code)
        .ok_or(Error::UnsupportedAlgorithm {
            code: algorithm_code,
        })?;

    let expansion_limit = ratio_guard.saturating_mul(u64::from(compressed_size).max(1));
    if u64::from(uncompressed_size) > expansion_limit {
        return Err(Error::DecompressionBomb {
            compressed: compressed_size,
            uncompressed: uncompressed_size,
            guard: ratio_guard,
        });
    }

    let out = decompress(algorithm, payload)?;
    if out.len() != uncompressed_size as usize {
        return Err(Error::length_mismatch(
            FRAME_LEN,
            format!(
                "frame declares {uncompressed_size} uncompressed byte(s), decompressor produced {}",
                out.len()
            ),
        ));
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ErrorKind;

    fn sample() -> Vec<u8> {
        b"the quick brown fox jumps over the lazy dog".repeat(20)
    }

    #[test]
    fn block_round_trips() {
        let data = sample();
        for algorithm in [
            CompressionAlgorithm::Zlib,
            CompressionAlgorithm::Lz4,
            CompressionAlgorithm::Zstd,
            CompressionAlgorithm::None,
        ] {
            let block = compress(algorithm, &data, 0).unwrap();
            assert_eq!(decompress(algorithm, &block).unwrap(), data);
        }
    }

    #[test]
    fn frame_round_trips() {
        let data = sample();
        let block = compress(CompressionAlgorithm::Zstd, &data, 0).unwrap();
        let framed = wrap_frame(CompressionAlgorithm::Zstd, &block, data.len());
        assert!(is_frame(&framed));
        assert_eq!(unwrap_frame(&framed, 1024).unwrap(), data);
    }

    #[test]
    fn detection_requires_magic_and_version() {
        assert!(!is_frame(b"BTOX\x01"));
        assert!(!is_frame(b"BTON\x02"));
        assert!(!is_frame(b"BTO"));
        assert!(is_frame(b"BTON\x01"));
    }

    #[test]
    fn rejects_compressed_size_mismatch() {
        let data = sample();
        let block = compress(CompressionAlgorithm::Zlib, &data, 0).unwrap();
        let mut framed = wrap_frame(CompressionAlgorithm::Zlib, &block, data.len());
        framed.push(0); // one stray byte after the payload
        let err = unwrap_frame(&framed, 1024).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::LengthMismatch);
    }

    #[test]
    fn rejects_unknown_algorithm() {
        let mut framed = wrap_frame(CompressionAlgorithm::None, b"abc", 3);
        framed[5] = 7;
        let err = unwrap_frame(&framed, 1024).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnsupportedAlgorithm);
    }

    #[test]
    fn ratio_guard_fires_before_decompression() {
        // 16 payload bytes claiming to expand to 1 GiB.
        let mut framed = wrap_frame(CompressionAlgorithm::Zlib, &[0u8; 16], 0);
        framed[12..16].copy_from_slice(&(1u32 << 30).to_be_bytes());
        let err = unwrap_frame(&framed, 1024).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DecompressionBomb);
    }

    #[test]
    fn corrupt_stream_is_a_backend_error() {
        let framed = wrap_frame(CompressionAlgorithm::Zlib, &[0xff; 8], 8);
        let err = unwrap_frame(&framed, 1024).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Compression);
    }

    #[test]
    fn adaptive_selection_is_size_driven() {
        assert_eq!(select_adaptive(100).0, CompressionAlgorithm::Zlib);
        assert_eq!(select_adaptive(1 << 20).0, CompressionAlgorithm::Zstd);
    }
}
