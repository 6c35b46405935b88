//! Wire tag-byte constants.
//!
//! The first byte of every wire element selects its shape. The ranges follow
//! MessagePack; the extension type codes in the reserved negative band are
//! BTOON-specific.

// Nil
pub const NIL: u8 = 0xc0;

// 0xc1 is not assigned to any shape and is rejected by the decoder.
pub const NEVER_USED: u8 = 0xc1;

// Boolean
pub const FALSE: u8 = 0xc2;
pub const TRUE: u8 = 0xc3;

// Binary
pub const BIN8: u8 = 0xc4;
pub const BIN16: u8 = 0xc5;
pub const BIN32: u8 = 0xc6;

// Extension with explicit length
pub const EXT8: u8 = 0xc7;
pub const EXT16: u8 = 0xc8;
pub const EXT32: u8 = 0xc9;

// IEEE-754 floats
pub const FLOAT32: u8 = 0xca;
pub const FLOAT64: u8 = 0xcb;

// Unsigned integers (beyond positive fixint range)
pub const UINT8: u8 = 0xcc;
pub const UINT16: u8 = 0xcd;
pub const UINT32: u8 = 0xce;
pub const UINT64: u8 = 0xcf;

// Signed integers (beyond negative fixint range)
pub const INT8: u8 = 0xd0;
pub const INT16: u8 = 0xd1;
pub const INT32: u8 = 0xd2;
pub const INT64: u8 = 0xd3;

// Extension with implied payload length 1/2/4/8/16
pub const FIXEXT1: u8 = 0xd4;
pub const FIXEXT2: u8 = 0xd5;
pub const FIXEXT4: u8 = 0xd6;
pub const FIXEXT8: u8 = 0xd7;
pub const FIXEXT16: u8 = 0xd8;

// String
pub const STR8: u8 = 0xd9;
pub const STR16: u8 = 0xda;
pub const STR32: u8 = 0xdb;

// Array
pub const ARRAY16: u8 = 0xdc;
pub const ARRAY32: u8 = 0xdd;

// Map
pub const MAP16: u8 = 0xde;
pub const MAP32: u8 = 0xdf;

// Single-byte ranges.
// Positive fixint: 0x00..=0x7f (value 0..=127)
// Fixmap: 0x80..=0x8f (low nibble = entry count 0..=15)
// Fixarray: 0x90..=0x9f (low nibble = element count 0..=15)
// Fixstr: 0xa0..=0xbf (low five bits = byte length 0..=31)
// Negative fixint: 0xe0..=0xff (value -32..=-1)
pub const POS_FIXINT_MAX: u8 = 0x7f;
pub const FIXMAP: u8 = 0x80;
pub const FIXARRAY: u8 = 0x90;
pub const FIXSTR: u8 = 0xa0;
pub const NEG_FIXINT: u8 = 0xe0;

pub const FIXSTR_MAX_LEN: usize = 31;
pub const FIXARRAY_MAX_LEN: usize = 15;
pub const FIXMAP_MAX_LEN: usize = 15;

/// BTOON-private extension type codes.
///
/// Codes `-1..=-6` and `-10` carry the domain types below; the rest of the
/// negative band (`-11..=-127`) is reserved and passes through as an opaque
/// [`Value::Extension`](crate::Value::Extension). Codes `0..=127` are free for
/// applications.
pub const EXT_TIMESTAMP: i8 = -1;
pub const EXT_DATE: i8 = -2;
pub const EXT_DATETIME: i8 = -3;
pub const EXT_BIGINT: i8 = -4;
pub const EXT_VECTOR_F32: i8 = -5;
pub const EXT_VECTOR_F64: i8 = -6;
pub const EXT_TABULAR: i8 = -10;

/// Returns `true` for extension codes in the reserved BTOON band that are not
/// assigned to a known domain type.
#[inline]
#[must_use]
pub const fn is_reserved_ext(code: i8) -> bool {
    code < 0
        && !matches!(
            code,
            EXT_TIMESTAMP
                | EXT_DATE
                | EXT_DATETIME
                | EXT_BIGINT
                | EXT_VECTOR_F32
                | EXT_VECTOR_F64
                | EXT_TABULAR
        )
}
