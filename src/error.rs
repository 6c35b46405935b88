//! Error types for BTOON encoding, decoding, and validation.
//!
//! Every fallible operation in this crate reports one of a closed set of
//! error kinds. Decode errors carry the byte offset at which the wire grammar
//! was violated, so a failing payload can be diagnosed without re-parsing.
//!
//! ## Examples
//!
//! ```rust
//! use btoon::{decode, ErrorKind};
//!
//! // str16 declaring 16 bytes with only 2 available
//! let truncated = [0xda, 0x00, 0x10, b'h', b'i'];
//! let err = decode(&truncated).unwrap_err();
//! assert_eq!(err.kind(), ErrorKind::OutOfBounds);
//! assert_eq!(err.offset(), Some(3));
//! ```

use std::fmt;
use thiserror::Error;

/// Classification of an [`Error`], used by the validator's diagnostics and by
/// callers that dispatch on failure category rather than on the full error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// A read or a declared length would exceed the buffer.
    OutOfBounds,
    /// A first byte does not belong to any defined range.
    UnknownTag,
    /// A string payload failed UTF-8 validation in strict mode.
    InvalidUtf8,
    /// Recursion would exceed the configured maximum depth.
    DepthExceeded,
    /// A map key is not strictly greater than its predecessor (strict mode).
    KeyOrder,
    /// A map key equals its predecessor (strict mode).
    DuplicateKey,
    /// A declared size disagrees with the actual payload size.
    LengthMismatch,
    /// A tabular header carries an unrecognized version.
    UnsupportedVersion,
    /// A compression frame names an unknown algorithm.
    UnsupportedAlgorithm,
    /// The declared compression ratio exceeds the configured guard.
    DecompressionBomb,
    /// A private extension payload failed its shape check.
    InvalidExtension,
    /// Bytes remain after the outermost value (strict mode).
    TrailingBytes,
    /// A compression backend reported a failure of its own.
    Compression,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorKind::OutOfBounds => "out of bounds",
            ErrorKind::UnknownTag => "unknown tag",
            ErrorKind::InvalidUtf8 => "invalid UTF-8",
            ErrorKind::DepthExceeded => "depth exceeded",
            ErrorKind::KeyOrder => "key order",
            ErrorKind::DuplicateKey => "duplicate key",
            ErrorKind::LengthMismatch => "length mismatch",
            ErrorKind::UnsupportedVersion => "unsupported version",
            ErrorKind::UnsupportedAlgorithm => "unsupported algorithm",
            ErrorKind::DecompressionBomb => "decompression bomb",
            ErrorKind::InvalidExtension => "invalid extension",
            ErrorKind::TrailingBytes => "trailing bytes",
            ErrorKind::Compression => "compression",
        };
        f.write_str(name)
    }
}

/// Represents all failures that can occur while encoding, decoding, or
/// unwrapping BTOON data.
///
/// Wire errors carry the byte offset of the violation. The decoder fails
/// fatally on the first structural violation and produces no partial value;
/// use [`validate`](crate::validate) to collect every problem in one pass.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum Error {
    /// A read of `needed` bytes at `offset` would pass the end of the buffer.
    #[error("read of {needed} byte(s) at offset {offset} exceeds buffer of {len}")]
    OutOfBounds {
        offset: usize,
        needed: usize,
        len: usize,
    },

    /// The tag byte at `offset` does not start any wire element.
    #[error("unknown tag byte 0x{tag:02x} at offset {offset}")]
    UnknownTag { offset: usize, tag: u8 },

    /// A string payload beginning at `offset` is not valid UTF-8.
    #[error("invalid UTF-8 in string at offset {offset}")]
    InvalidUtf8 { offset: usize },

    /// Nesting at `offset` would exceed `max_depth`.
    #[error("nesting at offset {offset} exceeds maximum depth {max_depth}")]
    DepthExceeded { offset: usize, max_depth: usize },

    /// The map key at `offset` sorts at or below its predecessor.
    #[error("map key at offset {offset} is not in ascending order")]
    KeyOrder { offset: usize },

    /// The map key at `offset` repeats an earlier key.
    #[error("duplicate map key at offset {offset}")]
    DuplicateKey { offset: usize },

    /// A declared size disagrees with the payload actually present.
    #[error("length mismatch at offset {offset}: {detail}")]
    LengthMismatch { offset: usize, detail: String },

    /// A tabular payload carries a version this library does not read.
    #[error("unsupported tabular version {version} at offset {offset}")]
    UnsupportedVersion { offset: usize, version: u32 },

    /// A compression frame names an algorithm this build does not provide.
    #[error("unsupported compression algorithm code {code}")]
    UnsupportedAlgorithm { code: u8 },

    /// The frame's declared expansion exceeds the configured ratio guard.
    #[error(
        "declared decompression of {compressed} -> {uncompressed} bytes exceeds ratio guard {guard}"
    )]
    DecompressionBomb {
        compressed: u32,
        uncompressed: u32,
        guard: u64,
    },

    /// A private extension payload failed its shape check.
    #[error("invalid extension payload at offset {offset}: {detail}")]
    InvalidExtension { offset: usize, detail: String },

    /// Bytes remain after the outermost value.
    #[error("{trailing} trailing byte(s) after value ending at offset {offset}")]
    TrailingBytes { offset: usize, trailing: usize },

    /// A compression backend failed; never claims to be a wire error.
    #[error("compression backend error: {detail}")]
    Compression { detail: String },
}

impl Error {
    /// Returns the classification of this error.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::OutOfBounds { .. } => ErrorKind::OutOfBounds,
            Error::UnknownTag { .. } => ErrorKind::UnknownTag,
            Error::InvalidUtf8 { .. } => ErrorKind::InvalidUtf8,
            Error::DepthExceeded { .. } => ErrorKind::DepthExceeded,
            Error::KeyOrder { .. } => ErrorKind::KeyOrder,
            Error::DuplicateKey { .. } => ErrorKind::DuplicateKey,
            Error::LengthMismatch { .. } => ErrorKind::LengthMismatch,
            Error::UnsupportedVersion { .. } => ErrorKind::UnsupportedVersion,
            Error::UnsupportedAlgorithm { .. } => ErrorKind::UnsupportedAlgorithm,
            Error::DecompressionBomb { .. } => ErrorKind::DecompressionBomb,
            Error::InvalidExtension { .. } => ErrorKind::InvalidExtension,
            Error::TrailingBytes { .. } => ErrorKind::TrailingBytes,
            Error::Compression { .. } => ErrorKind::Compression,
        }
    }

    /// Returns the byte offset the error is anchored to, when it has one.
    ///
    /// Frame-level and backend errors are not positional and return `None`.
    #[must_use]
    pub fn offset(&self) -> Option<usize> {
        match self {
            Error::OutOfBounds { offset, .. }
            | Error::UnknownTag { offset, .. }
            | Error::InvalidUtf8 { offset }
            | Error::DepthExceeded { offset, .. }
            | Error::KeyOrder { offset }
            | Error::DuplicateKey { offset }
            | Error::LengthMismatch { offset, .. }
            | Error::UnsupportedVersion { offset, .. }
            | Error::InvalidExtension { offset, .. }
            | Error::TrailingBytes { offset, .. } => Some(*offset),
            Error::UnsupportedAlgorithm { .. }
            | Error::DecompressionBomb { .. }
            | Error::Compression { .. } => None,
        }
    }

    pub(crate) fn length_mismatch(offset: usize, detail: impl Into<String>) -> Self {
        Error::LengthMismatch {
            offset,
            detail: detail.into(),
        }
    }

    pub(crate) fn invalid_extension(offset: usize, detail: impl Into<String>) -> Self {
        Error::InvalidExtension {
            offset,
            detail: detail.into(),
        }
    }

    pub(crate) fn compression(detail: impl Into<String>) -> Self {
        Error::Compression {
            detail: detail.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_and_offset() {
        let err = Error::OutOfBounds {
            offset: 3,
            needed: 16,
            len: 5,
        };
        assert_eq!(err.kind(), ErrorKind::OutOfBounds);
        assert_eq!(err.offset(), Some(3));

        let err = Error::UnsupportedAlgorithm { code: 9 };
        assert_eq!(err.kind(), ErrorKind::UnsupportedAlgorithm);
        assert_eq!(err.offset(), None);
    }

    #[test]
    fn display_includes_context() {
        let err = Error::UnknownTag {
            offset: 7,
            tag: 0xc1,
        };
        let msg = err.to_string();
        assert!(msg.contains("0xc1"));
        assert!(msg.contains("offset 7"));
    }
}
