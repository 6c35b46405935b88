//! BTOON wire encoding.
//!
//! The encoder walks a [`Value`] and appends its wire form to a
//! [`ByteWriter`], always choosing the narrowest tag that holds the payload:
//! the smallest integer width, the shortest length prefix, fixext for the
//! five fixed extension sizes. Map entries are emitted in ascending
//! byte-lexicographic key order, which [`BtoonMap`](crate::BtoonMap)
//! guarantees structurally.
//!
//! Uniform record arrays are delegated to the tabular codec when
//! `auto_tabular` is on, and the finished byte string is wrapped in a
//! compression frame when the options ask for one and the payload is large
//! enough to be worth it.

use crate::buffer::ByteWriter;
use crate::error::{Error, Result};
use crate::marker;
use crate::options::EncodeOptions;
use crate::{compress, tabular, Value};

/// Encodes a value using the given options.
pub(crate) fn encode_value(value: &Value, options: &EncodeOptions) -> Result<Vec<u8>> {
    let mut encoder = Encoder::new(options);
    encoder.write_value(value)?;
    let encoded = encoder.finish();

    if !options.compress || encoded.len() < options.min_compression_size {
        return Ok(encoded);
    }

    let (algorithm, level) = if options.adaptive_compression {
        compress::select_adaptive(encoded.len())
    } else {
        (options.compression_algorithm, options.compression_level)
    };
    let block = compress::compress(algorithm, &encoded, level)?;
    Ok(compress::wrap_frame(algorithm, &block, encoded.len()))
}

/// Per-call scratch state for one encode pass. The codec keeps no state
/// between top-level calls.
pub(crate) struct Encoder<'o> {
    w: ByteWriter,
    options: &'o EncodeOptions,
}

impl<'o> Encoder<'o> {
    pub(crate) fn new(options: &'o EncodeOptions) -> Self {
        Encoder {
            w: ByteWriter::with_capacity(128),
            options,
        }
    }

    pub(crate) fn finish(self) -> Vec<u8> {
        self.w.into_vec()
    }

    pub(crate) fn write_value(&mut self, value: &Value) -> Result<()> {
        match value {
            Value::Nil => {
                self.w.put_u8(marker::NIL);
                Ok(())
            }
            Value::Bool(b) => {
                self.w.put_u8(if *b { marker::TRUE } else { marker::FALSE });
                Ok(())
            }
            Value::Int(i) => {
                self.write_int(*i);
                Ok(())
            }
            Value::Uint(u) => {
                self.write_uint(*u);
                Ok(())
            }
            Value::Float(x) => {
                self.w.put_u8(marker::FLOAT64);
                self.w.put_f64_be(*x);
                Ok(())
            }
            Value::String(s) => {
                self.write_str(s);
                Ok(())
            }
            Value::Binary(b) => {
                self.write_bin(b);
                Ok(())
            }
            Value::Array(values) => self.write_array(values),
            Value::Map(map) => {
                self.write_map_header(map.len());
                for (key, val) in map.iter() {
                    self.write_str(key);
                    self.write_value(val)?;
                }
                Ok(())
            }
            Value::Timestamp(secs) => {
                self.write_ext_i64(marker::EXT_TIMESTAMP, *secs);
                Ok(())
            }
            Value::Date(ms) => {
                self.write_ext_i64(marker::EXT_DATE, *ms);
                Ok(())
            }
            Value::DateTime(ns) => {
                self.write_ext_i64(marker::EXT_DATETIME, *ns);
                Ok(())
            }
            Value::BigInt(bytes) => {
                if bytes.is_empty() {
                    return Err(Error::invalid_extension(
                        self.w.len(),
                        "big integer payload must be at least one byte",
                    ));
                }
                self.write_ext(marker::EXT_BIGINT, bytes);
                Ok(())
            }
            Value::VectorFloat(values) => {
                let mut payload = ByteWriter::with_capacity(values.len() * 4);
                for x in values {
                    payload.put_f32_be(*x);
                }
                self.write_ext(marker::EXT_VECTOR_F32, payload.as_slice());
                Ok(())
            }
            Value::VectorDouble(values) => {
                let mut payload = ByteWriter::with_capacity(values.len() * 8);
                for x in values {
                    payload.put_f64_be(*x);
                }
                self.write_ext(marker::EXT_VECTOR_F64, payload.as_slice());
                Ok(())
            }
            Value::Extension { code, data } => {
                self.write_ext(*code, data);
                Ok(())
            }
        }
    }

    fn write_array(&mut self, values: &[Value]) -> Result<()> {
        if self.options.auto_tabular && tabular::is_tabular(values) {
            let payload = tabular::encode_payload(values, self.options)?;
            self.write_ext(marker::EXT_TABULAR, &payload);
            return Ok(());
        }
        let len = values.len();
        if len <= marker::FIXARRAY_MAX_LEN {
            self.w.put_u8(marker::FIXARRAY | len as u8);
        } else if len <= u16::MAX as usize {
            self.w.put_u8(marker::ARRAY16);
            self.w.put_u16_be(len as u16);
        } else {
            self.w.put_u8(marker::ARRAY32);
            self.w.put_u32_be(len as u32);
        }
        for value in values {
            self.write_value(value)?;
        }
        Ok(())
    }

    fn write_map_header(&mut self, len: usize) {
        if len <= marker::FIXMAP_MAX_LEN {
            self.w.put_u8(marker::FIXMAP | len as u8);
        } else if len <= u16::MAX as usize {
            self.w.put_u8(marker::MAP16);
            self.w.put_u16_be(len as u16);
        } else {
            self.w.put_u8(marker::MAP32);
            self.w.put_u32_be(len as u32);
        }
    }

    /// Unsigned ladder: positive fixint, then uint8/16/32/64.
    fn write_uint(&mut self, value: u64) {
        if value <= marker::POS_FIXINT_MAX as u64 {
            self.w.put_u8(value as u8);
        } else if value <= u8::MAX as u64 {
            self.w.put_u8(marker::UINT8);
            self.w.put_u8(value as u8);
        } else if value <= u16::MAX as u64 {
            self.w.put_u8(marker::UINT16);
            self.w.put_u16_be(value as u16);
        } else if value <= u32::MAX as u64 {
            self.w.put_u8(marker::UINT32);
            self.w.put_u32_be(value as u32);
        } else {
            self.w.put_u8(marker::UINT64);
            self.w.put_u64_be(value);
        }
    }

    /// Signed ladder for negative values; non-negative values narrow to the
    /// unsigned ladder, which is the representation the decoder would pick
    /// for them anyway.
    fn write_int(&mut self, value: i64) {
        if value >= 0 {
            self.write_uint(value as u64);
        } else if value >= -32 {
            self.w.put_u8(value as i8 as u8);
        } else if value >= i8::MIN as i64 {
            self.w.put_u8(marker::INT8);
            self.w.put_i8(value as i8);
        } else if value >= i16::MIN as i64 {
            self.w.put_u8(marker::INT16);
            self.w.put_i16_be(value as i16);
        } else if value >= i32::MIN as i64 {
            self.w.put_u8(marker::INT32);
            self.w.put_i32_be(value as i32);
        } else {
            self.w.put_u8(marker::INT64);
            self.w.put_i64_be(value);
        }
    }

    fn write_str(&mut self, s: &str) {
        let len = s.len();
        if len <= marker::FIXSTR_MAX_LEN {
            self.w.put_u8(marker::FIXSTR | len as u8);
        } else if len <= u8::MAX as usize {
            self.w.put_u8(marker::STR8);
            self.w.put_u8(len as u8);
        } else if len <= u16::MAX as usize {
            self.w.put_u8(marker::STR16);
            self.w.put_u16_be(len as u16);
        } else {
            self.w.put_u8(marker::STR32);
            self.w.put_u32_be(len as u32);
        }
        self.w.put_bytes(s.as_bytes());
    }

    fn write_bin(&mut self, bytes: &[u8]) {
        let len = bytes.len();
        if len <= u8::MAX as usize {
            self.w.put_u8(marker::BIN8);
            self.w.put_u8(len as u8);
        } else if len <= u16::MAX as usize {
            self.w.put_u8(marker::BIN16);
            self.w.put_u16_be(len as u16);
        } else {
            self.w.put_u8(marker::BIN32);
            self.w.put_u32_be(len as u32);
        }
        self.w.put_bytes(bytes);
    }

    /// Fixed-size extension carrying one big-endian `i64`, used by the three
    /// time-like domain types.
    fn write_ext_i64(&mut self, code: i8, value: i64) {
        self.w.put_u8(marker::FIXEXT8);
        self.w.put_i8(code);
        self.w.put_i64_be(value);
    }

    fn write_ext(&mut self, code: i8, payload: &[u8]) {
        match payload.len() {
            1 => self.w.put_u8(marker::FIXEXT1),
            2 => self.w.put_u8(marker::FIXEXT2),
            4 => self.w.put_u8(marker::FIXEXT4),
            8 => self.w.put_u8(marker::FIXEXT8),
            16 => self.w.put_u8(marker::FIXEXT16),
            len if len <= u8::MAX as usize => {
                self.w.put_u8(marker::EXT8);
                self.w.put_u8(len as u8);
            }
            len if len <= u16::MAX as usize => {
                self.w.put_u8(marker::EXT16);
                self.w.put_u16_be(len as u16);
            }
            len => {
                self.w.put_u8(marker::EXT32);
                self.w.put_u32_be(len as u32);
            }
        }
        self.w.put_i8(code);
        self.w.put_bytes(payload);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::btoon;

    fn encode(value: &Value) -> Vec<u8> {
        encode_value(value, &EncodeOptions::default()).unwrap()
    }

    #[test]
    fn scalar_tags() {
        assert_eq!(encode(&Value::Nil), [0xc0]);
        assert_eq!(encode(&Value::Bool(false)), [0xc2]);
        assert_eq!(encode(&Value::Bool(true)), [0xc3]);
        assert_eq!(
            encode(&Value::Float(1.5)),
            [0xcb, 0x3f, 0xf8, 0, 0, 0, 0, 0, 0]
        );
    }

    #[test]
    fn unsigned_ladder_boundaries() {
        assert_eq!(encode(&Value::Uint(0)), [0x00]);
        assert_eq!(encode(&Value::Uint(127)), [0x7f]);
        assert_eq!(encode(&Value::Uint(128)), [0xcc, 0x80]);
        assert_eq!(encode(&Value::Uint(255)), [0xcc, 0xff]);
        assert_eq!(encode(&Value::Uint(256)), [0xcd, 0x01, 0x00]);
        assert_eq!(encode(&Value::Uint(65535)), [0xcd, 0xff, 0xff]);
        assert_eq!(encode(&Value::Uint(65536)), [0xce, 0, 1, 0, 0]);
        assert_eq!(
            encode(&Value::Uint(u64::MAX)),
            [0xcf, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff]
        );
    }

    #[test]
    fn signed_ladder_boundaries() {
        assert_eq!(encode(&Value::Int(-1)), [0xff]);
        assert_eq!(encode(&Value::Int(-32)), [0xe0]);
        assert_eq!(encode(&Value::Int(-33)), [0xd0, 0xdf]);
        assert_eq!(encode(&Value::Int(-128)), [0xd0, 0x80]);
        assert_eq!(encode(&Value::Int(-129)), [0xd1, 0xff, 0x7f]);
        assert_eq!(encode(&Value::Int(-32769)), [0xd2, 0xff, 0xff, 0x7f, 0xff]);
        assert_eq!(
            encode(&Value::Int(i64::MIN)),
            [0xd3, 0x80, 0, 0, 0, 0, 0, 0, 0]
        );
    }

    #[test]
    fn non_negative_int_narrows_to_unsigned() {
        assert_eq!(encode(&Value::Int(0)), [0x00]);
        assert_eq!(encode(&Value::Int(5)), [0x05]);
        assert_eq!(encode(&Value::Int(300)), encode(&Value::Uint(300)));
    }

    #[test]
    fn string_ladder_boundaries() {
        assert_eq!(encode(&Value::from("")), [0xa0]);
        let s31 = "a".repeat(31);
        assert_eq!(encode(&Value::from(s31.as_str()))[0], 0xa0 | 31);
        let s32 = "a".repeat(32);
        assert_eq!(&encode(&Value::from(s32.as_str()))[..2], &[0xd9, 32]);
        let s256 = "a".repeat(256);
        assert_eq!(&encode(&Value::from(s256.as_str()))[..3], &[0xda, 1, 0]);
    }

    #[test]
    fn map_keys_emit_sorted() {
        let map = btoon!({"name": "Alice", "age": 30});
        assert_eq!(
            encode(&map),
            [
                0x82, 0xa3, b'a', b'g', b'e', 0x1e, 0xa4, b'n', b'a', b'm', b'e', 0xa5, b'A',
                b'l', b'i', b'c', b'e'
            ]
        );
    }

    #[test]
    fn time_extensions_are_fixext8() {
        let bytes = encode(&Value::Timestamp(1));
        assert_eq!(bytes, [0xd7, 0xff, 0, 0, 0, 0, 0, 0, 0, 1]);
        assert_eq!(encode(&Value::Date(1))[1], 0xfe);
        assert_eq!(encode(&Value::DateTime(1))[1], 0xfd);
    }

    #[test]
    fn ext_length_selection() {
        let ext = |n: usize| Value::Extension {
            code: 7,
            data: vec![0; n],
        };
        assert_eq!(encode(&ext(1))[0], 0xd4);
        assert_eq!(encode(&ext(2))[0], 0xd5);
        assert_eq!(encode(&ext(4))[0], 0xd6);
        assert_eq!(encode(&ext(8))[0], 0xd7);
        assert_eq!(encode(&ext(16))[0], 0xd8);
        assert_eq!(&encode(&ext(3))[..3], &[0xc7, 3, 7]);
        assert_eq!(&encode(&ext(300))[..4], &[0xc8, 0x01, 0x2c, 7]);
    }

    #[test]
    fn empty_bigint_is_rejected() {
        let err = encode_value(&Value::BigInt(vec![]), &EncodeOptions::default()).unwrap_err();
        assert_eq!(err.kind(), crate::ErrorKind::InvalidExtension);
    }

    #[test]
    fn vector_payloads_are_packed_big_endian() {
        let bytes = encode(&Value::VectorFloat(vec![1.0, -2.0]));
        assert_eq!(bytes[0], 0xd7); // 8-byte payload lands on fixext8
        assert_eq!(bytes[1], 0xfb); // -5
        assert_eq!(&bytes[2..6], &1.0f32.to_be_bytes());
        assert_eq!(&bytes[6..10], &(-2.0f32).to_be_bytes());

        let bytes = encode(&Value::VectorDouble(vec![0.5; 3]));
        assert_eq!(&bytes[..2], &[0xc7, 24]);
        assert_eq!(bytes[2], 0xfa); // -6
    }

    #[test]
    fn small_payload_skips_frame() {
        let options = EncodeOptions::new().with_compression(crate::CompressionAlgorithm::Zlib);
        let bytes = encode_value(&Value::from("tiny"), &options).unwrap();
        assert_eq!(bytes[0], 0xa4);
    }
}
