//! BTOON wire decoding.
//!
//! The decoder reads one tag byte, dispatches on its range, pulls the payload
//! through the bounds-checked [`ByteReader`], and recurses for containers.
//! It is built for untrusted input:
//!
//! - every length claim is checked against the bytes actually remaining
//!   before anything is allocated,
//! - container recursion is capped by `max_depth`,
//! - strict mode requires valid UTF-8 strings, strictly ascending unique map
//!   keys, and no trailing bytes; outside strict mode those demote to
//!   warnings with last-wins / lossy semantics.
//!
//! Decoding fails fatally on the first structural violation and produces no
//! partial value. The error names the violation kind and the byte offset at
//! which it was found.

use crate::buffer::ByteReader;
use crate::error::{Error, Result};
use crate::marker;
use crate::options::DecodeOptions;
use crate::{compress, tabular, BtoonMap, Value};

/// Decodes one value from `data` using the given options.
pub(crate) fn decode_value(data: &[u8], options: &DecodeOptions) -> Result<Value> {
    if options.auto_decompress && compress::is_frame(data) {
        let inner = compress::unwrap_frame(data, options.max_decompression_ratio)?;
        return decode_wire(&inner, options);
    }
    decode_wire(data, options)
}

fn decode_wire(data: &[u8], options: &DecodeOptions) -> Result<Value> {
    let mut decoder = Decoder::new(ByteReader::new(data), options);
    let value = decoder.read_value(0)?;
    let trailing = decoder.reader.remaining();
    if trailing > 0 {
        if options.strict {
            return Err(Error::TrailingBytes {
                offset: decoder.reader.position(),
                trailing,
            });
        }
        tracing::warn!(
            offset = decoder.reader.position(),
            trailing,
            "ignoring trailing bytes after value"
        );
    }
    Ok(value)
}

/// Per-call scratch state for one decode pass. Nested recursion uses only
/// the call stack and the shared cursor.
pub(crate) struct Decoder<'a, 'o> {
    pub(crate) reader: ByteReader<'a>,
    options: &'o DecodeOptions,
}

impl<'a, 'o> Decoder<'a, 'o> {
    pub(crate) fn new(reader: ByteReader<'a>, options: &'o DecodeOptions) -> Self {
        Decoder { reader, options }
    }

    pub(crate) fn position(&self) -> usize {
        self.reader.position()
    }

    pub(crate) fn is_at_end(&self) -> bool {
        self.reader.is_at_end()
    }

    pub(crate) fn read_value(&mut self, depth: usize) -> Result<Value> {
        let offset = self.reader.position();
        let tag = self.reader.read_u8()?;
        match tag {
            0x00..=0x7f => Ok(Value::Uint(tag as u64)),
            0x80..=0x8f => self.read_map((tag & 0x0f) as usize, offset, depth),
            0x90..=0x9f => self.read_array((tag & 0x0f) as usize, offset, depth),
            0xa0..=0xbf => self.read_string((tag & 0x1f) as usize),
            marker::NIL => Ok(Value::Nil),
            marker::NEVER_USED => Err(Error::UnknownTag { offset, tag }),
            marker::FALSE => Ok(Value::Bool(false)),
            marker::TRUE => Ok(Value::Bool(true)),
            marker::BIN8 => {
                let len = self.reader.read_u8()? as usize;
                self.read_binary(len)
            }
            marker::BIN16 => {
                let len = self.reader.read_u16_be()? as usize;
                self.read_binary(len)
            }
            marker::BIN32 => {
                let len = self.reader.read_u32_be()? as usize;
                self.read_binary(len)
            }
            marker::EXT8 => {
                let len = self.reader.read_u8()? as usize;
                self.read_ext(len, offset, depth)
            }
            marker::EXT16 => {
                let len = self.reader.read_u16_be()? as usize;
                self.read_ext(len, offset, depth)
            }
            marker::EXT32 => {
                let len = self.reader.read_u32_be()? as usize;
                self.read_ext(len, offset, depth)
            }
            marker::FLOAT32 => Ok(Value::Float(self.reader.read_f32_be()? as f64)),
            marker::FLOAT64 => Ok(Value::Float(self.reader.read_f64_be()?)),
            marker::UINT8 => Ok(Value::Uint(self.reader.read_u8()? as u64)),
            marker::UINT16 => Ok(Value::Uint(self.reader.read_u16_be()? as u64)),
            marker::UINT32 => Ok(Value::Uint(self.reader.read_u32_be()? as u64)),
            marker::UINT64 => Ok(Value::Uint(self.reader.read_u64_be()?)),
            marker::INT8 => Ok(Value::Int(self.reader.read_i8()? as i64)),
            marker::INT16 => Ok(Value::Int(self.reader.read_i16_be()? as i64)),
            marker::INT32 => Ok(Value::Int(self.reader.read_i32_be()? as i64)),
            marker::INT64 => Ok(Value::Int(self.reader.read_i64_be()?)),
            marker::FIXEXT1 => self.read_ext(1, offset, depth),
            marker::FIXEXT2 => self.read_ext(2, offset, depth),
            marker::FIXEXT4 => self.read_ext(4, offset, depth),
            marker::FIXEXT8 => self.read_ext(8, offset, depth),
            marker::FIXEXT16 => self.read_ext(16, offset, depth),
            marker::STR8 => {
                let len = self.reader.read_u8()? as usize;
                self.read_string(len)
            }
            marker::STR16 => {
                let len = self.reader.read_u16_be()? as usize;
                self.read_string(len)
            }
            marker::STR32 => {
                let len = self.reader.read_u32_be()? as usize;
                self.read_string(len)
            }
            marker::ARRAY16 => {
                let len = self.reader.read_u16_be()? as usize;
                self.read_array(len, offset, depth)
            }
            marker::ARRAY32 => {
                let len = self.reader.read_u32_be()? as usize;
                self.read_array(len, offset, depth)
            }
            marker::MAP16 => {
                let len = self.reader.read_u16_be()? as usize;
                self.read_map(len, offset, depth)
            }
            marker::MAP32 => {
                let len = self.reader.read_u32_be()? as usize;
                self.read_map(len, offset, depth)
            }
            0xe0..=0xff => Ok(Value::Int(tag as i8 as i64)),
        }
    }

    fn check_depth(&self, offset: usize, depth: usize) -> Result<usize> {
        let depth = depth + 1;
        if depth > self.options.max_depth {
            return Err(Error::DepthExceeded {
                offset,
                max_depth: self.options.max_depth,
            });
        }
        Ok(depth)
    }

    fn read_string(&mut self, len: usize) -> Result<Value> {
        if self.options.strict {
            return Ok(Value::String(self.reader.read_utf8(len)?.to_string()));
        }
        let offset = self.reader.position();
        let bytes = self.reader.read_bytes(len)?;
        match std::str::from_utf8(bytes) {
            Ok(s) => Ok(Value::String(s.to_string())),
            Err(_) => {
                tracing::warn!(offset, "replacing invalid UTF-8 in string payload");
                Ok(Value::String(String::from_utf8_lossy(bytes).into_owned()))
            }
        }
    }

    fn read_binary(&mut self, len: usize) -> Result<Value> {
        Ok(Value::Binary(self.reader.read_bytes(len)?.to_vec()))
    }

    fn read_array(&mut self, len: usize, offset: usize, depth: usize) -> Result<Value> {
        let depth = self.check_depth(offset, depth)?;
        // Every element occupies at least one byte; a count beyond the
        // remaining bytes is a hostile claim, rejected before allocation.
        if len > self.reader.remaining() {
            return Err(Error::OutOfBounds {
                offset: self.reader.position(),
                needed: len,
                len: self.reader.end(),
            });
        }
        let mut values = Vec::with_capacity(len);
        for _ in 0..len {
            values.push(self.read_value(depth)?);
        }
        Ok(Value::Array(values))
    }

    fn read_map(&mut self, len: usize, offset: usize, depth: usize) -> Result<Value> {
        let depth = self.check_depth(offset, depth)?;
        // Each entry needs a key byte and a value byte at minimum.
        if len > self.reader.remaining() / 2 {
            return Err(Error::OutOfBounds {
                offset: self.reader.position(),
                needed: len * 2,
                len: self.reader.end(),
            });
        }
        let mut map = BtoonMap::with_capacity(len);
        let mut previous: Option<String> = None;
        for _ in 0..len {
            let key_offset = self.reader.position();
            let key = self.read_key(key_offset)?;
            if let Some(prev) = &previous {
                if key == *prev {
                    if self.options.strict {
                        return Err(Error::DuplicateKey { offset: key_offset });
                    }
                    tracing::warn!(offset = key_offset, key, "duplicate map key; last value wins");
                } else if key < *prev {
                    if self.options.strict {
                        return Err(Error::KeyOrder { offset: key_offset });
                    }
                    tracing::warn!(offset = key_offset, key, "map key out of ascending order");
                }
            }
            let value = self.read_value(depth)?;
            previous = Some(key.clone());
            map.insert(key, value);
        }
        Ok(Value::Map(map))
    }

    /// Map keys are strings only; any other tag here is a grammar violation.
    fn read_key(&mut self, offset: usize) -> Result<String> {
        let tag = self.reader.read_u8()?;
        let len = match tag {
            0xa0..=0xbf => (tag & 0x1f) as usize,
            marker::STR8 => self.reader.read_u8()? as usize,
            marker::STR16 => self.reader.read_u16_be()? as usize,
            marker::STR32 => self.reader.read_u32_be()? as usize,
            _ => return Err(Error::UnknownTag { offset, tag }),
        };
        match self.read_string(len)? {
            Value::String(s) => Ok(s),
            _ => unreachable!("read_string returns Value::String"),
        }
    }

    fn read_ext(&mut self, len: usize, offset: usize, depth: usize) -> Result<Value> {
        let code = self.reader.read_i8()?;
        let payload_offset = self.reader.position();
        match code {
            marker::EXT_TIMESTAMP => match len {
                4 => Ok(Value::Timestamp(self.reader.read_i32_be()? as i64)),
                8 => Ok(Value::Timestamp(self.reader.read_i64_be()?)),
                _ => Err(Error::invalid_extension(
                    payload_offset,
                    format!("timestamp payload must be 4 or 8 bytes, found {len}"),
                )),
            },
            marker::EXT_DATE => match len {
                8 => Ok(Value::Date(self.reader.read_i64_be()?)),
                _ => Err(Error::invalid_extension(
                    payload_offset,
                    format!("date payload must be 8 bytes, found {len}"),
                )),
            },
            marker::EXT_DATETIME => match len {
                8 => Ok(Value::DateTime(self.reader.read_i64_be()?)),
                _ => Err(Error::invalid_extension(
                    payload_offset,
                    format!("datetime payload must be 8 bytes, found {len}"),
                )),
            },
            marker::EXT_BIGINT => {
                if len == 0 {
                    return Err(Error::invalid_extension(
                        payload_offset,
                        "big integer payload must be at least one byte",
                    ));
                }
                Ok(Value::BigInt(self.reader.read_bytes(len)?.to_vec()))
            }
            marker::EXT_VECTOR_F32 => {
                if len % 4 != 0 {
                    return Err(Error::invalid_extension(
                        payload_offset,
                        format!("float vector payload of {len} bytes is not a multiple of 4"),
                    ));
                }
                let bytes = self.reader.read_bytes(len)?;
                let values = bytes
                    .chunks_exact(4)
                    .map(|c| f32::from_be_bytes([c[0], c[1], c[2], c[3]]))
                    .collect();
                Ok(Value::VectorFloat(values))
            }
            marker::EXT_VECTOR_F64 => {
                if len % 8 != 0 {
                    return Err(Error::invalid_extension(
                        payload_offset,
                        format!("double vector payload of {len} bytes is not a multiple of 8"),
                    ));
                }
                let bytes = self.reader.read_bytes(len)?;
                let values = bytes
                    .chunks_exact(8)
                    .map(|c| {
                        f64::from_be_bytes([c[0], c[1], c[2], c[3], c[4], c[5], c[6], c[7]])
                    })
                    .collect();
                Ok(Value::VectorDouble(values))
            }
            marker::EXT_TABULAR => {
                let depth = self.check_depth(offset, depth)?;
                let payload = self.reader.read_bytes(len)?;
                tabular::decode_payload(payload, payload_offset, depth, self.options)
            }
            _ => Ok(Value::Extension {
                code,
                data: self.reader.read_bytes(len)?.to_vec(),
            }),
        }
    }
}
