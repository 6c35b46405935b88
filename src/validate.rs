//! Structural validation without materialization.
//!
//! The validator walks a byte buffer with the same grammar dispatch as the
//! decoder but builds no values: it accumulates diagnostics and optional
//! statistics instead, and keeps going after an error wherever the grammar
//! allows, so one pass can report several independent problems where the
//! decoder would have stopped at the first.
//!
//! It shares the decoder's defenses — bounds checks through
//! [`ByteReader`], a depth cap, rejection of length claims that exceed the
//! remaining input — plus its own configurable limits on string, binary,
//! array, map, and total input sizes.
//!
//! ## Examples
//!
//! ```rust
//! use btoon::{validate, ValidationOptions};
//!
//! // A truncated string, then an unknown tag: two findings in one pass.
//! let report = validate(&[0xda, 0x00, 0x10, b'h', b'i', 0xc1], &ValidationOptions::default());
//! assert!(!report.valid);
//! assert!(report.errors.len() >= 2);
//! ```

use crate::buffer::ByteReader;
use crate::error::{Error, ErrorKind};
use crate::{compress, marker};
use std::collections::BTreeMap;

/// Limits and toggles for [`validate`].
#[derive(Clone, Debug)]
pub struct ValidationOptions {
    /// Maximum nesting depth for arrays, maps, and tabular payloads.
    pub max_depth: usize,
    /// Longest acceptable string payload, in bytes.
    pub max_string_length: usize,
    /// Longest acceptable binary payload, in bytes.
    pub max_binary_length: usize,
    /// Largest acceptable array element count.
    pub max_array_size: usize,
    /// Largest acceptable map entry count.
    pub max_map_size: usize,
    /// Largest acceptable input, in bytes; larger buffers are rejected
    /// without being walked.
    pub max_total_size: usize,
    /// Report non-UTF-8 string payloads as errors.
    pub require_utf8_strings: bool,
    /// Accept repeated map keys instead of reporting them as errors.
    pub allow_duplicate_map_keys: bool,
    /// Skip statistics collection.
    pub fast_mode: bool,
}

impl Default for ValidationOptions {
    fn default() -> Self {
        ValidationOptions {
            max_depth: 128,
            max_string_length: usize::MAX,
            max_binary_length: usize::MAX,
            max_array_size: usize::MAX,
            max_map_size: usize::MAX,
            max_total_size: usize::MAX,
            require_utf8_strings: true,
            allow_duplicate_map_keys: false,
            fast_mode: false,
        }
    }
}

impl ValidationOptions {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    #[must_use]
    pub fn with_max_string_length(mut self, limit: usize) -> Self {
        self.max_string_length = limit;
        self
    }

    #[must_use]
    pub fn with_max_binary_length(mut self, limit: usize) -> Self {
        self.max_binary_length = limit;
        self
    }

    #[must_use]
    pub fn with_max_array_size(mut self, limit: usize) -> Self {
        self.max_array_size = limit;
        self
    }

    #[must_use]
    pub fn with_max_map_size(mut self, limit: usize) -> Self {
        self.max_map_size = limit;
        self
    }

    #[must_use]
    pub fn with_max_total_size(mut self, limit: usize) -> Self {
        self.max_total_size = limit;
        self
    }

    #[must_use]
    pub fn with_require_utf8_strings(mut self, required: bool) -> Self {
        self.require_utf8_strings = required;
        self
    }

    #[must_use]
    pub fn with_allow_duplicate_map_keys(mut self, allowed: bool) -> Self {
        self.allow_duplicate_map_keys = allowed;
        self
    }

    #[must_use]
    pub fn with_fast_mode(mut self, fast: bool) -> Self {
        self.fast_mode = fast;
        self
    }
}

/// One finding: what went wrong, where, and a human-readable description.
#[derive(Clone, Debug, PartialEq)]
pub struct Diagnostic {
    pub kind: ErrorKind,
    pub offset: usize,
    pub message: String,
}

impl Diagnostic {
    fn from_error(err: &Error) -> Self {
        Diagnostic {
            kind: err.kind(),
            offset: err.offset().unwrap_or(0),
            message: err.to_string(),
        }
    }
}

/// Aggregate counts collected during a walk, unless `fast_mode` skipped them.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ValidationStats {
    /// Deepest nesting level reached.
    pub max_depth: usize,
    /// Elements seen, keyed by tag name (`"int"`, `"str"`, `"array"`, ...).
    pub count_by_tag: BTreeMap<&'static str, u64>,
    /// Size of the walked buffer in bytes.
    pub total_bytes: usize,
}

/// The validator's output: overall verdict, findings, and statistics.
#[derive(Clone, Debug, Default)]
pub struct ValidationReport {
    /// `true` when no errors were found; warnings do not affect validity.
    pub valid: bool,
    pub errors: Vec<Diagnostic>,
    pub warnings: Vec<Diagnostic>,
    pub stats: Option<ValidationStats>,
}

/// A reusable validator carrying its options.
#[derive(Clone, Debug, Default)]
pub struct Validator {
    options: ValidationOptions,
}

impl Validator {
    #[must_use]
    pub fn new() -> Self {
        Validator::default()
    }

    #[must_use]
    pub fn with_options(options: ValidationOptions) -> Self {
        Validator { options }
    }

    /// Walks `data` and reports every finding.
    #[must_use]
    pub fn validate(&self, data: &[u8]) -> ValidationReport {
        validate(data, &self.options)
    }

    /// Boolean fast path: no statistics, just the verdict.
    #[must_use]
    pub fn quick_check(&self, data: &[u8]) -> bool {
        let options = self.options.clone().with_fast_mode(true);
        validate(data, &options).valid
    }
}

/// Validates `data` against the wire grammar and the given limits.
///
/// Never panics and never fails: every problem becomes an entry in the
/// report. Framed input has its header cross-checked (including the
/// decompression-bomb guard) and its decompressed content walked; offsets of
/// inner findings are relative to the decompressed buffer.
#[must_use]
pub fn validate(data: &[u8], options: &ValidationOptions) -> ValidationReport {
    if data.len() > options.max_total_size {
        return report_with_error(Diagnostic {
            kind: ErrorKind::LengthMismatch,
            offset: 0,
            message: format!(
                "input of {} byte(s) exceeds configured maximum {}",
                data.len(),
                options.max_total_size
            ),
        });
    }

    if compress::is_frame(data) {
        return match compress::unwrap_frame(data, DEFAULT_FRAME_RATIO) {
            Ok(inner) => walk_buffer(&inner, options),
            Err(err) => report_with_error(Diagnostic::from_error(&err)),
        };
    }

    walk_buffer(data, options)
}

const DEFAULT_FRAME_RATIO: u64 = 1024;

fn report_with_error(diagnostic: Diagnostic) -> ValidationReport {
    ValidationReport {
        valid: false,
        errors: vec![diagnostic],
        warnings: Vec::new(),
        stats: None,
    }
}

fn walk_buffer(data: &[u8], options: &ValidationOptions) -> ValidationReport {
    let mut walker = Walker {
        reader: ByteReader::new(data),
        options,
        errors: Vec::new(),
        warnings: Vec::new(),
        stats: if options.fast_mode {
            None
        } else {
            Some(ValidationStats {
                total_bytes: data.len(),
                ..ValidationStats::default()
            })
        },
    };

    if data.is_empty() {
        walker.error(
            ErrorKind::OutOfBounds,
            0,
            "empty input holds no value".to_string(),
        );
    }

    let mut first = true;
    while !walker.reader.is_at_end() {
        if first {
            first = false;
        } else if !walker
            .errors
            .iter()
            .any(|d| d.kind == ErrorKind::TrailingBytes)
        {
            // The decoder would stop here; keep scanning so later problems
            // surface in the same report.
            walker.errors.push(Diagnostic {
                kind: ErrorKind::TrailingBytes,
                offset: walker.reader.position(),
                message: format!(
                    "{} trailing byte(s) after value ending at offset {}",
                    walker.reader.remaining(),
                    walker.reader.position()
                ),
            });
        }
        if !walker.walk_value(0) {
            break;
        }
    }

    ValidationReport {
        valid: walker.errors.is_empty(),
        errors: walker.errors,
        warnings: walker.warnings,
        stats: walker.stats,
    }
}

struct Walker<'a, 'o> {
    reader: ByteReader<'a>,
    options: &'o ValidationOptions,
    errors: Vec<Diagnostic>,
    warnings: Vec<Diagnostic>,
    stats: Option<ValidationStats>,
}

impl<'a, 'o> Walker<'a, 'o> {
    fn error(&mut self, kind: ErrorKind, offset: usize, message: String) {
        self.errors.push(Diagnostic {
            kind,
            offset,
            message,
        });
    }

    fn warning(&mut self, kind: ErrorKind, offset: usize, message: String) {
        self.warnings.push(Diagnostic {
            kind,
            offset,
            message,
        });
    }

    fn record(&mut self, tag_name: &'static str, depth: usize) {
        if let Some(stats) = &mut self.stats {
            *stats.count_by_tag.entry(tag_name).or_insert(0) += 1;
            stats.max_depth = stats.max_depth.max(depth);
        }
    }

    /// Walks one element. Returns `false` when the walk cannot meaningfully
    /// continue (truncated fixed-width payload, depth blowout).
    fn walk_value(&mut self, depth: usize) -> bool {
        let offset = self.reader.position();
        let tag = match self.reader.read_u8() {
            Ok(tag) => tag,
            Err(err) => {
                self.errors.push(Diagnostic::from_error(&err));
                return false;
            }
        };
        match tag {
            0x00..=0x7f => {
                self.record("uint", depth);
                true
            }
            0xe0..=0xff => {
                self.record("int", depth);
                true
            }
            0x80..=0x8f => self.walk_map((tag & 0x0f) as usize, offset, depth),
            0x90..=0x9f => self.walk_array((tag & 0x0f) as usize, offset, depth),
            0xa0..=0xbf => self.walk_string((tag & 0x1f) as usize, depth),
            marker::NIL => {
                self.record("nil", depth);
                true
            }
            marker::FALSE | marker::TRUE => {
                self.record("bool", depth);
                true
            }
            marker::BIN8 | marker::BIN16 | marker::BIN32 => {
                let len = match self.read_length(tag, marker::BIN8) {
                    Some(len) => len,
                    None => return false,
                };
                self.walk_binary(len, depth)
            }
            marker::EXT8 | marker::EXT16 | marker::EXT32 => {
                let len = match self.read_length(tag, marker::EXT8) {
                    Some(len) => len,
                    None => return false,
                };
                self.walk_ext(len, offset, depth)
            }
            marker::FLOAT32 => self.walk_fixed("float", 4, depth),
            marker::FLOAT64 => self.walk_fixed("float", 8, depth),
            marker::UINT8 => self.walk_fixed("uint", 1, depth),
            marker::UINT16 => self.walk_fixed("uint", 2, depth),
            marker::UINT32 => self.walk_fixed("uint", 4, depth),
            marker::UINT64 => self.walk_fixed("uint", 8, depth),
            marker::INT8 => self.walk_fixed("int", 1, depth),
            marker::INT16 => self.walk_fixed("int", 2, depth),
            marker::INT32 => self.walk_fixed("int", 4, depth),
            marker::INT64 => self.walk_fixed("int", 8, depth),
            marker::FIXEXT1 => self.walk_ext(1, offset, depth),
            marker::FIXEXT2 => self.walk_ext(2, offset, depth),
            marker::FIXEXT4 => self.walk_ext(4, offset, depth),
            marker::FIXEXT8 => self.walk_ext(8, offset, depth),
            marker::FIXEXT16 => self.walk_ext(16, offset, depth),
            marker::STR8 | marker::STR16 | marker::STR32 => {
                let len = match self.read_length(tag, marker::STR8) {
                    Some(len) => len,
                    None => return false,
                };
                self.walk_string(len, depth)
            }
            marker::ARRAY16 | marker::ARRAY32 => {
                let len = match self.read_length16(tag, marker::ARRAY16) {
                    Some(len) => len,
                    None => return false,
                };
                self.walk_array(len, offset, depth)
            }
            marker::MAP16 | marker::MAP32 => {
                let len = match self.read_length16(tag, marker::MAP16) {
                    Some(len) => len,
                    None => return false,
                };
                self.walk_map(len, offset, depth)
            }
            _ => {
                self.error(
                    ErrorKind::UnknownTag,
                    offset,
                    format!("unknown tag byte 0x{tag:02x} at offset {offset}"),
                );
                true
            }
        }
    }

    /// Length prefix for the u8/u16/u32 ladders starting at `base`.
    fn read_length(&mut self, tag: u8, base: u8) -> Option<usize> {
        let result = match tag - base {
            0 => self.reader.read_u8().map(|l| l as usize),
            1 => self.reader.read_u16_be().map(|l| l as usize),
            _ => self.reader.read_u32_be().map(|l| l as usize),
        };
        self.ok_or_abort(result)
    }

    /// Length prefix for the u16/u32 ladders starting at `base`.
    fn read_length16(&mut self, tag: u8, base: u8) -> Option<usize> {
        let result = match tag - base {
            0 => self.reader.read_u16_be().map(|l| l as usize),
            _ => self.reader.read_u32_be().map(|l| l as usize),
        };
        self.ok_or_abort(result)
    }

    fn ok_or_abort<T>(&mut self, result: crate::Result<T>) -> Option<T> {
        match result {
            Ok(value) => Some(value),
            Err(err) => {
                self.errors.push(Diagnostic::from_error(&err));
                None
            }
        }
    }

    fn walk_fixed(&mut self, tag_name: &'static str, width: usize, depth: usize) -> bool {
        match self.reader.read_bytes(width) {
            Ok(_) => {
                self.record(tag_name, depth);
                true
            }
            Err(err) => {
                self.errors.push(Diagnostic::from_error(&err));
                false
            }
        }
    }

    fn walk_string(&mut self, len: usize, depth: usize) -> bool {
        let payload_offset = self.reader.position();
        if len > self.options.max_string_length {
            self.error(
                ErrorKind::LengthMismatch,
                payload_offset,
                format!(
                    "string of {len} byte(s) exceeds configured maximum {}",
                    self.options.max_string_length
                ),
            );
        }
        if len > self.reader.remaining() {
            self.error(
                ErrorKind::OutOfBounds,
                payload_offset,
                format!(
                    "string claims {len} byte(s) with {} remaining",
                    self.reader.remaining()
                ),
            );
            // Resync at the payload start; whatever follows is scanned as
            // fresh elements so later problems still surface.
            return true;
        }
        let bytes = match self.reader.read_bytes(len) {
            Ok(bytes) => bytes,
            Err(err) => {
                self.errors.push(Diagnostic::from_error(&err));
                return true;
            }
        };
        if self.options.require_utf8_strings && std::str::from_utf8(bytes).is_err() {
            self.error(
                ErrorKind::InvalidUtf8,
                payload_offset,
                format!("invalid UTF-8 in string at offset {payload_offset}"),
            );
        }
        self.record("str", depth);
        true
    }

    fn walk_binary(&mut self, len: usize, depth: usize) -> bool {
        let payload_offset = self.reader.position();
        if len > self.options.max_binary_length {
            self.error(
                ErrorKind::LengthMismatch,
                payload_offset,
                format!(
                    "binary of {len} byte(s) exceeds configured maximum {}",
                    self.options.max_binary_length
                ),
            );
        }
        if len > self.reader.remaining() {
            self.error(
                ErrorKind::OutOfBounds,
                payload_offset,
                format!(
                    "binary claims {len} byte(s) with {} remaining",
                    self.reader.remaining()
                ),
            );
            return true;
        }
        let _ = self.reader.read_bytes(len);
        self.record("bin", depth);
        true
    }

    fn walk_array(&mut self, len: usize, offset: usize, depth: usize) -> bool {
        let depth = depth + 1;
        if depth > self.options.max_depth {
            self.error(
                ErrorKind::DepthExceeded,
                offset,
                format!(
                    "nesting at offset {offset} exceeds maximum depth {}",
                    self.options.max_depth
                ),
            );
            return false;
        }
        self.record("array", depth);
        if len > self.options.max_array_size {
            self.error(
                ErrorKind::LengthMismatch,
                offset,
                format!(
                    "array of {len} element(s) exceeds configured maximum {}",
                    self.options.max_array_size
                ),
            );
        }
        if len > self.reader.remaining() {
            self.error(
                ErrorKind::OutOfBounds,
                self.reader.position(),
                format!(
                    "array claims {len} element(s) with {} byte(s) remaining",
                    self.reader.remaining()
                ),
            );
            return true;
        }
        for _ in 0..len {
            if !self.walk_value(depth) {
                return false;
            }
        }
        true
    }

    fn walk_map(&mut self, len: usize, offset: usize, depth: usize) -> bool {
        let depth = depth + 1;
        if depth > self.options.max_depth {
            self.error(
                ErrorKind::DepthExceeded,
                offset,
                format!(
                    "nesting at offset {offset} exceeds maximum depth {}",
                    self.options.max_depth
                ),
            );
            return false;
        }
        self.record("map", depth);
        if len > self.options.max_map_size {
            self.error(
                ErrorKind::LengthMismatch,
                offset,
                format!(
                    "map of {len} entrie(s) exceeds configured maximum {}",
                    self.options.max_map_size
                ),
            );
        }
        if len > self.reader.remaining() / 2 {
            self.error(
                ErrorKind::OutOfBounds,
                self.reader.position(),
                format!(
                    "map claims {len} entrie(s) with {} byte(s) remaining",
                    self.reader.remaining()
                ),
            );
            return true;
        }
        let mut previous: Option<Vec<u8>> = None;
        for _ in 0..len {
            let key_offset = self.reader.position();
            match self.walk_key(key_offset) {
                KeyOutcome::Key(key) => {
                    if let Some(prev) = &previous {
                        if key == *prev {
                            if !self.options.allow_duplicate_map_keys {
                                self.error(
                                    ErrorKind::DuplicateKey,
                                    key_offset,
                                    format!("duplicate map key at offset {key_offset}"),
                                );
                            }
                        } else if key < *prev {
                            self.error(
                                ErrorKind::KeyOrder,
                                key_offset,
                                format!("map key at offset {key_offset} is not in ascending order"),
                            );
                        }
                    }
                    previous = Some(key);
                }
                KeyOutcome::NotAKey => {
                    previous = None;
                }
                KeyOutcome::Abort => return false,
            }
            if !self.walk_value(depth) {
                return false;
            }
        }
        true
    }

    fn walk_key(&mut self, offset: usize) -> KeyOutcome {
        let tag = match self.reader.peek_u8() {
            Some(tag) => tag,
            None => {
                self.error(
                    ErrorKind::OutOfBounds,
                    offset,
                    format!("map key expected at offset {offset}, input ended"),
                );
                return KeyOutcome::Abort;
            }
        };
        let is_string = matches!(tag, 0xa0..=0xbf | marker::STR8 | marker::STR16 | marker::STR32);
        if !is_string {
            self.error(
                ErrorKind::UnknownTag,
                offset,
                format!("map key at offset {offset} is not a string (tag 0x{tag:02x})"),
            );
            // Walk whatever it is so the entry's value still lines up.
            if !self.walk_value(0) {
                return KeyOutcome::Abort;
            }
            return KeyOutcome::NotAKey;
        }
        let _ = self.reader.read_u8();
        let len = if (0xa0..=0xbf).contains(&tag) {
            (tag & 0x1f) as usize
        } else {
            match self.read_length(tag, marker::STR8) {
                Some(len) => len,
                None => return KeyOutcome::Abort,
            }
        };
        let payload_offset = self.reader.position();
        if len > self.reader.remaining() {
            self.error(
                ErrorKind::OutOfBounds,
                payload_offset,
                format!(
                    "map key claims {len} byte(s) with {} remaining",
                    self.reader.remaining()
                ),
            );
            return KeyOutcome::Abort;
        }
        let bytes = match self.reader.read_bytes(len) {
            Ok(bytes) => bytes.to_vec(),
            Err(err) => {
                self.errors.push(Diagnostic::from_error(&err));
                return KeyOutcome::Abort;
            }
        };
        if self.options.require_utf8_strings && std::str::from_utf8(&bytes).is_err() {
            self.error(
                ErrorKind::InvalidUtf8,
                payload_offset,
                format!("invalid UTF-8 in map key at offset {payload_offset}"),
            );
        }
        self.record("str", 0);
        KeyOutcome::Key(bytes)
    }

    fn walk_ext(&mut self, len: usize, offset: usize, depth: usize) -> bool {
        let code = match self.reader.read_i8() {
            Ok(code) => code,
            Err(err) => {
                self.errors.push(Diagnostic::from_error(&err));
                return false;
            }
        };
        let payload_offset = self.reader.position();
        if len > self.reader.remaining() {
            self.error(
                ErrorKind::OutOfBounds,
                payload_offset,
                format!(
                    "extension claims {len} byte(s) with {} remaining",
                    self.reader.remaining()
                ),
            );
            return true;
        }
        match code {
            marker::EXT_TIMESTAMP => {
                if len != 4 && len != 8 {
                    self.error(
                        ErrorKind::InvalidExtension,
                        payload_offset,
                        format!("timestamp payload must be 4 or 8 bytes, found {len}"),
                    );
                }
                let _ = self.reader.read_bytes(len);
                self.record("timestamp", depth);
            }
            marker::EXT_DATE | marker::EXT_DATETIME => {
                if len != 8 {
                    self.error(
                        ErrorKind::InvalidExtension,
                        payload_offset,
                        format!("time payload must be 8 bytes, found {len}"),
                    );
                }
                let _ = self.reader.read_bytes(len);
                self.record(
                    if code == marker::EXT_DATE {
                        "date"
                    } else {
                        "datetime"
                    },
                    depth,
                );
            }
            marker::EXT_BIGINT => {
                if len == 0 {
                    self.error(
                        ErrorKind::InvalidExtension,
                        payload_offset,
                        "big integer payload must be at least one byte".to_string(),
                    );
                }
                let _ = self.reader.read_bytes(len);
                self.record("bigint", depth);
            }
            marker::EXT_VECTOR_F32 => {
                if len % 4 != 0 {
                    self.error(
                        ErrorKind::InvalidExtension,
                        payload_offset,
                        format!("float vector payload of {len} bytes is not a multiple of 4"),
                    );
                }
                let _ = self.reader.read_bytes(len);
                self.record("vector_float", depth);
            }
            marker::EXT_VECTOR_F64 => {
                if len % 8 != 0 {
                    self.error(
                        ErrorKind::InvalidExtension,
                        payload_offset,
                        format!("double vector payload of {len} bytes is not a multiple of 8"),
                    );
                }
                let _ = self.reader.read_bytes(len);
                self.record("vector_double", depth);
            }
            marker::EXT_TABULAR => {
                self.record("tabular", depth);
                let payload = match self.reader.read_bytes(len) {
                    Ok(payload) => payload,
                    Err(err) => {
                        self.errors.push(Diagnostic::from_error(&err));
                        return true;
                    }
                };
                self.walk_tabular(payload, payload_offset, depth);
            }
            _ => {
                if marker::is_reserved_ext(code) {
                    self.warning(
                        ErrorKind::InvalidExtension,
                        offset,
                        format!("extension code {code} is reserved for future use"),
                    );
                }
                let _ = self.reader.read_bytes(len);
                self.record("extension", depth);
            }
        }
        true
    }

    fn walk_tabular(&mut self, payload: &[u8], base_offset: usize, depth: usize) {
        let depth = depth + 1;
        if depth > self.options.max_depth {
            self.error(
                ErrorKind::DepthExceeded,
                base_offset,
                format!(
                    "nesting at offset {base_offset} exceeds maximum depth {}",
                    self.options.max_depth
                ),
            );
            return;
        }
        let mut r = ByteReader::with_offset(payload, base_offset);
        let version = match r.read_u32_be() {
            Ok(version) => version,
            Err(err) => {
                self.errors.push(Diagnostic::from_error(&err));
                return;
            }
        };
        if version != crate::tabular::TABULAR_VERSION {
            self.error(
                ErrorKind::UnsupportedVersion,
                base_offset,
                format!("unsupported tabular version {version}"),
            );
            return;
        }
        let (num_columns, num_rows) = match (r.read_u32_be(), r.read_u32_be()) {
            (Ok(c), Ok(n)) => (c as usize, n as usize),
            (Err(err), _) | (_, Err(err)) => {
                self.errors.push(Diagnostic::from_error(&err));
                return;
            }
        };
        if num_columns == 0 || num_columns > r.remaining() / 5 {
            self.error(
                ErrorKind::InvalidExtension,
                base_offset,
                format!("tabular payload declares {num_columns} column(s)"),
            );
            return;
        }
        let mut previous_name: Option<Vec<u8>> = None;
        let mut hints: Vec<u8> = Vec::with_capacity(num_columns);
        for _ in 0..num_columns {
            let name_len = match r.read_u32_be() {
                Ok(l) => l as usize,
                Err(err) => {
                    self.errors.push(Diagnostic::from_error(&err));
                    return;
                }
            };
            let name_offset = r.position();
            let name = match r.read_bytes(name_len) {
                Ok(name) => name.to_vec(),
                Err(err) => {
                    self.errors.push(Diagnostic::from_error(&err));
                    return;
                }
            };
            if std::str::from_utf8(&name).is_err() {
                self.error(
                    ErrorKind::InvalidUtf8,
                    name_offset,
                    format!("invalid UTF-8 in tabular column name at offset {name_offset}"),
                );
            }
            if let Some(prev) = &previous_name {
                if name == *prev {
                    self.error(
                        ErrorKind::DuplicateKey,
                        name_offset,
                        format!("duplicate tabular column name at offset {name_offset}"),
                    );
                } else if name < *prev {
                    self.error(
                        ErrorKind::KeyOrder,
                        name_offset,
                        format!("tabular column name at offset {name_offset} out of order"),
                    );
                }
            }
            previous_name = Some(name);
            match r.read_u8() {
                Ok(hint) => hints.push(hint),
                Err(err) => {
                    self.errors.push(Diagnostic::from_error(&err));
                    return;
                }
            }
        }
        for hint in hints {
            let declared = match r.read_u32_be() {
                Ok(l) => l as usize,
                Err(err) => {
                    self.errors.push(Diagnostic::from_error(&err));
                    return;
                }
            };
            let column_offset = r.position();
            let column = match r.read_bytes(declared) {
                Ok(column) => column,
                Err(err) => {
                    self.errors.push(Diagnostic::from_error(&err));
                    return;
                }
            };
            let mut inner = Walker {
                reader: ByteReader::with_offset(column, column_offset),
                options: self.options,
                errors: Vec::new(),
                warnings: Vec::new(),
                stats: None,
            };
            for _ in 0..num_rows {
                if !cell_tag_matches_hint(&inner.reader, hint) {
                    inner.error(
                        ErrorKind::InvalidExtension,
                        inner.reader.position(),
                        format!("tabular cell disagrees with column type hint {hint}"),
                    );
                }
                if !inner.walk_value(depth) {
                    break;
                }
            }
            if inner.errors.is_empty() && !inner.reader.is_at_end() {
                self.error(
                    ErrorKind::LengthMismatch,
                    inner.reader.position(),
                    "tabular column holds bytes beyond its declared rows".to_string(),
                );
            }
            self.errors.append(&mut inner.errors);
            self.warnings.append(&mut inner.warnings);
        }
        if !r.is_at_end() {
            self.error(
                ErrorKind::LengthMismatch,
                r.position(),
                "tabular sections shorter than declared payload length".to_string(),
            );
        }
    }
}

enum KeyOutcome {
    Key(Vec<u8>),
    NotAKey,
    Abort,
}

/// Checks a cell's leading bytes against a tabular column hint, mirroring
/// the decoder's post-decode check: a signed tag with a non-negative payload
/// counts as unsigned, because that is what it decodes and re-encodes to.
fn cell_tag_matches_hint(reader: &ByteReader<'_>, hint: u8) -> bool {
    use crate::tabular::{HINT_BOOL, HINT_FLOAT, HINT_INT, HINT_NIL, HINT_STRING, HINT_UINT};

    let mut probe = reader.clone();
    let tag = match probe.read_u8() {
        Ok(tag) => tag,
        // Truncation is the walker's finding, not a hint disagreement.
        Err(_) => return true,
    };
    // Big-endian payloads carry the sign in their first byte.
    let signed_payload_negative = probe.read_u8().map(|b| b & 0x80 != 0).unwrap_or(true);
    match hint {
        HINT_NIL => tag == marker::NIL,
        HINT_BOOL => tag == marker::FALSE || tag == marker::TRUE,
        HINT_INT => {
            matches!(tag, 0xe0..=0xff)
                || (matches!(tag, 0xd0..=0xd3) && signed_payload_negative)
        }
        HINT_UINT => {
            matches!(tag, 0x00..=0x7f | 0xcc..=0xcf)
                || (matches!(tag, 0xd0..=0xd3) && !signed_payload_negative)
        }
        HINT_FLOAT => tag == marker::FLOAT32 || tag == marker::FLOAT64,
        HINT_STRING => matches!(tag, 0xa0..=0xbf | 0xd9..=0xdb),
        _ => true,
    }
}
