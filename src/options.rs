//! Configuration options for BTOON encoding and decoding.
//!
//! - [`EncodeOptions`]: tabular detection, compression selection and sizing
//! - [`DecodeOptions`]: strictness, auto-decompression, recursion and ratio limits
//!
//! ## Examples
//!
//! ```rust
//! use btoon::{encode_with_options, CompressionAlgorithm, EncodeOptions, Value};
//!
//! let value = Value::String("x".repeat(1024));
//!
//! let options = EncodeOptions::new()
//!     .with_compression(CompressionAlgorithm::Zstd)
//!     .with_min_compression_size(512);
//! let bytes = encode_with_options(&value, &options).unwrap();
//! assert_eq!(&bytes[..4], b"BTON");
//! ```

use crate::compress::CompressionAlgorithm;

/// Configuration for [`encode_with_options`](crate::encode_with_options).
#[derive(Clone, Debug)]
pub struct EncodeOptions {
    /// Wrap the encoded bytes in a compression frame.
    pub compress: bool,
    /// Algorithm for the frame; ignored unless `compress` is set.
    pub compression_algorithm: CompressionAlgorithm,
    /// Algorithm-specific level; `0` means the library default.
    pub compression_level: i32,
    /// Detect uniform-map arrays and encode them column-wise.
    pub auto_tabular: bool,
    /// Let the encoder pick the algorithm from the payload size. The choice
    /// is deterministic within one library version but unspecified across
    /// versions; pin an explicit algorithm for byte-exact output.
    pub adaptive_compression: bool,
    /// Payloads smaller than this are never wrapped in a frame.
    pub min_compression_size: usize,
}

impl Default for EncodeOptions {
    fn default() -> Self {
        EncodeOptions {
            compress: false,
            compression_algorithm: CompressionAlgorithm::None,
            compression_level: 0,
            auto_tabular: true,
            adaptive_compression: false,
            min_compression_size: 256,
        }
    }
}

impl EncodeOptions {
    /// Creates the default options: no compression, tabular detection on.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Enables compression with the given algorithm.
    #[must_use]
    pub fn with_compression(mut self, algorithm: CompressionAlgorithm) -> Self {
        self.compress = true;
        self.compression_algorithm = algorithm;
        self
    }

    /// Sets the algorithm-specific compression level (`0` = library default).
    #[must_use]
    pub fn with_compression_level(mut self, level: i32) -> Self {
        self.compression_level = level;
        self
    }

    /// Enables or disables tabular detection for arrays.
    #[must_use]
    pub fn with_auto_tabular(mut self, enabled: bool) -> Self {
        self.auto_tabular = enabled;
        self
    }

    /// Enables compression with the algorithm chosen from the payload size.
    #[must_use]
    pub fn with_adaptive_compression(mut self) -> Self {
        self.compress = true;
        self.adaptive_compression = true;
        self
    }

    /// Sets the minimum payload size below which framing is skipped.
    #[must_use]
    pub fn with_min_compression_size(mut self, size: usize) -> Self {
        self.min_compression_size = size;
        self
    }
}

/// Configuration for [`decode_with_options`](crate::decode_with_options).
#[derive(Clone, Debug)]
pub struct DecodeOptions {
    /// Transparently unwrap compression frames recognized by their magic
    /// bytes and version. When off, framed input decodes as whatever wire
    /// value its first byte happens to start.
    pub auto_decompress: bool,
    /// Require valid UTF-8 in strings, strictly ascending unique map keys,
    /// and no trailing bytes. Outside strict mode these demote to warnings.
    pub strict: bool,
    /// Maximum nesting depth for arrays, maps, and tabular payloads.
    pub max_depth: usize,
    /// Reject frames whose declared expansion ratio exceeds this guard.
    pub max_decompression_ratio: u64,
}

impl Default for DecodeOptions {
    fn default() -> Self {
        DecodeOptions {
            auto_decompress: true,
            strict: true,
            max_depth: 128,
            max_decompression_ratio: 1024,
        }
    }
}

impl DecodeOptions {
    /// Creates the default options: strict, auto-decompressing, depth 128.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates permissive options: strict-mode violations become warnings.
    #[must_use]
    pub fn lenient() -> Self {
        DecodeOptions {
            strict: false,
            ..Self::default()
        }
    }

    /// Enables or disables transparent frame unwrapping.
    #[must_use]
    pub fn with_auto_decompress(mut self, enabled: bool) -> Self {
        self.auto_decompress = enabled;
        self
    }

    /// Enables or disables strict mode.
    #[must_use]
    pub fn with_strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    /// Sets the maximum nesting depth.
    #[must_use]
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Sets the decompression-bomb ratio guard.
    #[must_use]
    pub fn with_max_decompression_ratio(mut self, ratio: u64) -> Self {
        self.max_decompression_ratio = ratio;
        self
    }
}
