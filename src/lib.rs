//! # btoon
//!
//! A binary serialization library for the BTOON format: a
//! MessagePack-compatible wire encoding extended with a columnar layout for
//! uniform record arrays, framed payload compression, and domain extension
//! types (timestamps at three resolutions, big integers, packed float
//! vectors).
//!
//! ## Key Features
//!
//! - **MessagePack-compatible wire**: the narrowest tag always wins, all
//!   multi-byte fields are big-endian
//! - **Tabular arrays**: homogeneous record arrays encode column-wise and
//!   decode back to the identical array
//! - **Defensive decoding**: bounds-checked, depth-limited, allocation-guarded
//!   against hostile length claims; no panics on arbitrary input
//! - **Framed compression**: zlib, lz4, or zstd behind a self-describing
//!   header with a decompression-bomb guard
//! - **Validation without materialization**: walk untrusted bytes and collect
//!   every finding in one report
//!
//! ## Quick Start
//!
//! ```rust
//! use btoon::{btoon, decode, encode};
//!
//! let value = btoon!({
//!     "name": "Alice",
//!     "age": 30,
//!     "tags": ["admin", "user"]
//! });
//!
//! let bytes = encode(&value).unwrap();
//! let back = decode(&bytes).unwrap();
//! assert_eq!(value, back);
//! ```
//!
//! ## Tabular Encoding
//!
//! Arrays of maps sharing one key set encode column-wise automatically:
//!
//! ```rust
//! use btoon::{btoon, decode, encode, is_tabular};
//!
//! let rows = btoon!([
//!     {"id": 1, "name": "Widget"},
//!     {"id": 2, "name": "Gadget"}
//! ]);
//! assert!(is_tabular(rows.as_array().unwrap()));
//! assert_eq!(decode(&encode(&rows).unwrap()).unwrap(), rows);
//! ```
//!
//! ## Compression
//!
//! ```rust
//! use btoon::{decode, encode_with_options, CompressionAlgorithm, EncodeOptions, Value};
//!
//! let value = Value::String("a".repeat(4096));
//! let options = EncodeOptions::new().with_compression(CompressionAlgorithm::Zstd);
//! let bytes = encode_with_options(&value, &options).unwrap();
//! assert_eq!(&bytes[..4], b"BTON");
//! assert_eq!(decode(&bytes).unwrap(), value);
//! ```
//!
//! ## Validating Untrusted Input
//!
//! ```rust
//! use btoon::{validate, ValidationOptions};
//!
//! let report = validate(&[0x91, 0xc1], &ValidationOptions::default());
//! assert!(!report.valid);
//! assert_eq!(report.errors.len(), 1);
//! ```
//!
//! ## Safety Guarantees
//!
//! - No `unsafe` code blocks
//! - Every read is bounds-checked through one chokepoint
//! - Length claims are verified against remaining input before allocation
//! - Decoding arbitrary bytes returns a value or an error, never panics
//!
//! ## Format Specification
//!
//! See the [`spec`] module for the complete wire grammar.

#![forbid(unsafe_code)]

pub mod buffer;
mod compress;
mod decode;
mod encode;
pub mod error;
pub mod macros;
pub mod map;
pub mod marker;
pub mod options;
pub mod spec;
mod tabular;
mod validate;
pub mod value;

pub use buffer::{ByteReader, ByteWriter};
pub use compress::{compress, decompress, CompressionAlgorithm};
pub use error::{Error, ErrorKind, Result};
pub use map::BtoonMap;
pub use options::{DecodeOptions, EncodeOptions};
pub use tabular::is_tabular;
pub use validate::{
    validate, Diagnostic, ValidationOptions, ValidationReport, ValidationStats, Validator,
};
pub use value::Value;

/// Encodes a value with default options.
///
/// # Examples
///
/// ```rust
/// use btoon::{encode, Value};
///
/// assert_eq!(encode(&Value::Nil).unwrap(), vec![0xc0]);
/// ```
///
/// # Errors
///
/// Returns an error if the value contains a malformed payload that cannot be
/// represented on the wire (e.g. an empty big integer).
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn encode(value: &Value) -> Result<Vec<u8>> {
    encode_with_options(value, &EncodeOptions::default())
}

/// Encodes a value with explicit options.
///
/// # Errors
///
/// Returns an error on unrepresentable payloads or when a compression
/// backend fails.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn encode_with_options(value: &Value, options: &EncodeOptions) -> Result<Vec<u8>> {
    encode::encode_value(value, options)
}

/// Decodes one value from `data` with default (strict) options.
///
/// # Examples
///
/// ```rust
/// use btoon::{decode, Value};
///
/// assert_eq!(decode(&[0xc0]).unwrap(), Value::Nil);
/// ```
///
/// # Errors
///
/// Fails fatally on the first structural violation, carrying the error kind
/// and the byte offset; no partial value is produced.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn decode(data: &[u8]) -> Result<Value> {
    decode_with_options(data, &DecodeOptions::default())
}

/// Decodes one value from `data` with explicit options.
///
/// # Errors
///
/// As [`decode`]; lenient options demote UTF-8, key-order, and trailing-byte
/// violations to logged warnings.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn decode_with_options(data: &[u8], options: &DecodeOptions) -> Result<Value> {
    decode::decode_value(data, options)
}

/// Returns the library version string.
#[must_use]
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::btoon;

    #[test]
    fn encode_decode_round_trip() {
        let value = btoon!({
            "active": true,
            "id": 123,
            "name": "Alice",
            "score": (-1.5)
        });
        let bytes = encode(&value).unwrap();
        assert_eq!(decode(&bytes).unwrap(), value);
    }

    #[test]
    fn version_is_set() {
        assert!(!version().is_empty());
    }

    #[test]
    fn validator_agrees_with_decoder() {
        let good = encode(&btoon!([1, "two", nil])).unwrap();
        assert!(validate(&good, &ValidationOptions::default()).valid);
        assert!(decode(&good).is_ok());

        let bad = [0xc1];
        assert!(!validate(&bad, &ValidationOptions::default()).valid);
        assert!(decode(&bad).is_err());
    }
}
