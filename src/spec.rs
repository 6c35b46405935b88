//! BTOON Wire Format Specification
//!
//! This module documents the BTOON binary format as implemented by this
//! library. BTOON is a MessagePack-compatible encoding extended with a
//! columnar layout for uniform record arrays, a framed compression envelope,
//! and a small set of domain extension types.
//!
//! # Overview
//!
//! A BTOON document is a single encoded value. Every element begins with a
//! tag byte that determines its shape; multi-byte integers and floats are
//! always big-endian. There is no padding and no alignment.
//!
//! # Tag ranges
//!
//! | Range | Shape |
//! |-------|-------|
//! | `0x00..=0x7f` | positive fixint (value is the tag) |
//! | `0x80..=0x8f` | fixmap, low nibble = entry count |
//! | `0x90..=0x9f` | fixarray, low nibble = element count |
//! | `0xa0..=0xbf` | fixstr, low five bits = byte length |
//! | `0xc0` | nil |
//! | `0xc1` | never used; rejected |
//! | `0xc2` / `0xc3` | false / true |
//! | `0xc4..=0xc6` | bin 8/16/32 |
//! | `0xc7..=0xc9` | ext 8/16/32 |
//! | `0xca` / `0xcb` | float32 / float64 |
//! | `0xcc..=0xcf` | uint 8/16/32/64 |
//! | `0xd0..=0xd3` | int 8/16/32/64 |
//! | `0xd4..=0xd8` | fixext 1/2/4/8/16 |
//! | `0xd9..=0xdb` | str 8/16/32 |
//! | `0xdc` / `0xdd` | array 16/32 |
//! | `0xde` / `0xdf` | map 16/32 |
//! | `0xe0..=0xff` | negative fixint (-32..=-1) |
//!
//! Encoders always pick the narrowest form that holds the payload, and use
//! the signed integer ladder only for negative values; a non-negative value
//! travels on the unsigned ladder even when it was constructed as signed.
//! Consequently a value decoded from a signed tag is always negative unless
//! the payload came from a foreign encoder, in which case it decodes as a
//! signed integer and narrows on re-encode. Compare integers by numeric
//! meaning, not by wire tag.
//!
//! # Maps
//!
//! Map keys are strings, emitted in ascending byte-lexicographic order on
//! their raw bytes. A strict decoder rejects out-of-order keys (key order
//! error) and repeated keys (duplicate key error); a lenient decoder warns,
//! keeps the last value for a repeated key, and re-sorts on the way in.
//!
//! # Extension types
//!
//! An extension element carries a signed type code byte and an opaque
//! payload. Negative codes belong to BTOON:
//!
//! | Code | Type | Payload |
//! |------|------|---------|
//! | -1 | timestamp | 4 or 8 bytes, big-endian signed seconds since the epoch |
//! | -2 | date | 8 bytes, big-endian signed milliseconds |
//! | -3 | datetime | 8 bytes, big-endian signed nanoseconds |
//! | -4 | big integer | big-endian two's-complement, at least one byte |
//! | -5 | float vector | packed big-endian f32, length a multiple of 4 |
//! | -6 | double vector | packed big-endian f64, length a multiple of 8 |
//! | -10 | tabular array | see below |
//! | -11..=-127 | reserved | preserved opaquely, flagged by the validator |
//!
//! Codes `0..=127` are free for applications.
//!
//! # Tabular arrays
//!
//! An array of at least two maps sharing one non-empty key set may encode as
//! extension -10. Its payload is a 12-byte header (`u32` version = 1, `u32`
//! column count, `u32` row count), a schema section (per column, in key
//! order: `u32` name length, name bytes, one type-hint byte), and a data
//! section (per column: `u32` byte length, then row-count wire-encoded
//! values). Hints: 0 nil, 1 bool, 2 int, 3 uint, 4 float, 5 string, `0xff`
//! mixed. A hinted column must agree with its cells.
//!
//! The layout is transparent: decoding reproduces the original array, and
//! readers that do not know code -10 still round-trip it as an opaque
//! extension.
//!
//! # Compression frames
//!
//! A framed payload begins with the magic bytes `BTON`, a version byte (1),
//! an algorithm byte (0 zlib, 1 lz4, 2 zstd, 255 none), two reserved zero
//! bytes, and two `u32` sizes: compressed and uncompressed. The compressor
//! output follows. Unwrapping verifies both sizes and applies an expansion
//! ratio guard before the decompressor runs.
//!
//! `0x42` (`B`) is also a legal positive fixint, so frame detection requires
//! the version byte to match as well; callers whose payloads may start with
//! the full five-byte prefix can disable automatic unwrapping.
//!
//! # Strictness
//!
//! Strict decoding (the default) requires UTF-8 strings, ascending unique
//! map keys, and no trailing bytes. Lenient decoding demotes those to
//! warnings: invalid UTF-8 is replaced, later duplicate keys win, trailing
//! bytes are ignored. Everything else — truncation, unknown tags, depth
//! blowouts, malformed extension payloads, frame size lies — is an error in
//! both modes.
