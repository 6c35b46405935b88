//! Columnar encoding for uniform record arrays.
//!
//! An array qualifies as *tabular* when it has at least two elements, every
//! element is a map, and all maps share exactly the same non-empty key set.
//! Such arrays encode as a private extension (type code `-10`) whose payload
//! stores the records column by column:
//!
//! ```text
//! header   u32 version (=1) | u32 num_columns | u32 num_rows
//! schema   per column, in ascending key order:
//!          u32 name_len | name bytes | u8 type hint
//! data     per column, same order:
//!          u32 column_payload_len | num_rows wire-encoded values
//! ```
//!
//! Columns are length-prefixed independently so a future revision can
//! compress them per column; version 1 stores them raw. The layout is
//! semantically transparent: decoding a tabular extension yields an array
//! equal to the one that produced it.

use crate::buffer::ByteReader;
use crate::decode::Decoder;
use crate::encode::Encoder;
use crate::error::{Error, Result};
use crate::options::{DecodeOptions, EncodeOptions};
use crate::{BtoonMap, Value};

pub(crate) const TABULAR_VERSION: u32 = 1;

/// Column type hints. Advisory on the wire, but a hinted column must agree
/// with its cells or the decoder rejects the payload.
pub(crate) const HINT_NIL: u8 = 0;
pub(crate) const HINT_BOOL: u8 = 1;
pub(crate) const HINT_INT: u8 = 2;
pub(crate) const HINT_UINT: u8 = 3;
pub(crate) const HINT_FLOAT: u8 = 4;
pub(crate) const HINT_STRING: u8 = 5;
pub(crate) const HINT_MIXED: u8 = 0xff;

/// Returns `true` when `values` qualifies for columnar encoding: at least two
/// elements, all maps, all sharing the same non-empty key set.
///
/// # Examples
///
/// ```rust
/// use btoon::{btoon, is_tabular};
///
/// let rows = btoon!([
///     {"a": 1, "b": "x"},
///     {"a": 2, "b": "y"}
/// ]);
/// assert!(is_tabular(rows.as_array().unwrap()));
///
/// let ragged = btoon!([{"a": 1}, {"b": 2}]);
/// assert!(!is_tabular(ragged.as_array().unwrap()));
/// ```
#[must_use]
pub fn is_tabular(values: &[Value]) -> bool {
    if values.len() < 2 {
        return false;
    }
    let first = match &values[0] {
        Value::Map(map) if !map.is_empty() => map,
        _ => return false,
    };
    values[1..].iter().all(|row| match row {
        // Maps iterate in sorted key order, so equal key sets mean equal
        // key sequences.
        Value::Map(map) => {
            map.len() == first.len() && map.keys().zip(first.keys()).all(|(a, b)| a == b)
        }
        _ => false,
    })
}

/// The hint a cell would contribute to its column, normalized to the wire
/// representation: a non-negative `Int` encodes through the unsigned ladder
/// and therefore hints as uint.
fn cell_hint(value: &Value) -> u8 {
    match value {
        Value::Nil => HINT_NIL,
        Value::Bool(_) => HINT_BOOL,
        Value::Int(i) if *i >= 0 => HINT_UINT,
        Value::Int(_) => HINT_INT,
        Value::Uint(_) => HINT_UINT,
        Value::Float(_) => HINT_FLOAT,
        Value::String(_) => HINT_STRING,
        _ => HINT_MIXED,
    }
}

/// Builds the extension payload for a tabular array.
///
/// Callers must have checked [`is_tabular`]; the row maps are trusted to
/// share one key set.
pub(crate) fn encode_payload(rows: &[Value], options: &EncodeOptions) -> Result<Vec<u8>> {
    let first = match &rows[0] {
        Value::Map(map) => map,
        _ => unreachable!("is_tabular requires map rows"),
    };
    let names: Vec<&String> = first.keys().collect();

    let mut columns: Vec<Vec<&Value>> = (0..names.len())
        .map(|_| Vec::with_capacity(rows.len()))
        .collect();
    for row in rows {
        if let Value::Map(map) = row {
            for (c, cell) in map.values().enumerate() {
                columns[c].push(cell);
            }
        }
    }

    let mut w = crate::buffer::ByteWriter::with_capacity(64 + rows.len() * names.len() * 4);
    w.put_u32_be(TABULAR_VERSION);
    w.put_u32_be(names.len() as u32);
    w.put_u32_be(rows.len() as u32);

    for (name, cells) in names.iter().zip(&columns) {
        w.put_u32_be(name.len() as u32);
        w.put_bytes(name.as_bytes());
        let hint = column_hint(cells);
        w.put_u8(hint);
    }

    for cells in &columns {
        let mut column = Encoder::new(options);
        for cell in cells {
            column.write_value(cell)?;
        }
        let column = column.finish();
        w.put_u32_be(column.len() as u32);
        w.put_bytes(&column);
    }

    Ok(w.into_vec())
}

fn column_hint(cells: &[&Value]) -> u8 {
    let first = cell_hint(cells[0]);
    if first != HINT_MIXED && cells[1..].iter().all(|c| cell_hint(c) == first) {
        first
    } else {
        HINT_MIXED
    }
}

/// Decodes an extension payload produced by [`encode_payload`] back into an
/// array of row maps.
///
/// `base_offset` is the payload's position in the enclosing buffer, so error
/// offsets point into the original input.
pub(crate) fn decode_payload(
    payload: &[u8],
    base_offset: usize,
    depth: usize,
    options: &DecodeOptions,
) -> Result<Value> {
    let mut r = ByteReader::with_offset(payload, base_offset);

    let version = r.read_u32_be()?;
    if version != TABULAR_VERSION {
        return Err(Error::UnsupportedVersion {
            offset: base_offset,
            version,
        });
    }
    let num_columns = r.read_u32_be()? as usize;
    let num_rows = r.read_u32_be()? as usize;

    if num_columns == 0 {
        return Err(Error::invalid_extension(
            base_offset,
            "tabular payload with zero columns",
        ));
    }
    // Every column needs at least a length word and a hint byte in the
    // schema, so a claim larger than that is bogus before any allocation.
    if num_columns > r.remaining() / 5 {
        return Err(Error::OutOfBounds {
            offset: r.position(),
            needed: num_columns * 5,
            len: r.end(),
        });
    }
    if num_rows > payload.len() {
        return Err(Error::OutOfBounds {
            offset: r.position(),
            needed: num_rows,
            len: r.end(),
        });
    }

    let mut names: Vec<String> = Vec::with_capacity(num_columns);
    let mut hints: Vec<u8> = Vec::with_capacity(num_columns);
    for _ in 0..num_columns {
        let name_len = r.read_u32_be()? as usize;
        let name_offset = r.position();
        let name = if options.strict {
            r.read_utf8(name_len)?.to_string()
        } else {
            String::from_utf8_lossy(r.read_bytes(name_len)?).into_owned()
        };
        if let Some(prev) = names.last() {
            if name == *prev {
                if options.strict {
                    return Err(Error::DuplicateKey {
                        offset: name_offset,
                    });
                }
                tracing::warn!(offset = name_offset, "duplicate tabular column name");
            } else if name < *prev {
                if options.strict {
                    return Err(Error::KeyOrder {
                        offset: name_offset,
                    });
                }
                tracing::warn!(offset = name_offset, "tabular column names out of order");
            }
        }
        names.push(name);
        hints.push(r.read_u8()?);
    }

    let mut columns: Vec<Vec<Value>> = Vec::with_capacity(num_columns);
    for (name, hint) in names.iter().zip(&hints) {
        let declared = r.read_u32_be()? as usize;
        let column_offset = r.position();
        let column_bytes = r.read_bytes(declared)?;
        if num_rows > declared {
            return Err(Error::length_mismatch(
                column_offset,
                format!("column {name:?} declares {declared} byte(s) for {num_rows} row(s)"),
            ));
        }

        let mut decoder = Decoder::new(ByteReader::with_offset(column_bytes, column_offset), options);
        let mut cells = Vec::with_capacity(num_rows);
        for _ in 0..num_rows {
            let cell_offset = decoder.position();
            let cell = decoder.read_value(depth)?;
            // Hint bytes above the scalar range all mean "mixed".
            if *hint <= HINT_STRING && cell_hint(&cell) != *hint {
                return Err(Error::invalid_extension(
                    cell_offset,
                    format!(
                        "column {name:?} hints type {hint} but holds a {}",
                        cell.type_name()
                    ),
                ));
            }
            cells.push(cell);
        }
        if !decoder.is_at_end() {
            return Err(Error::length_mismatch(
                decoder.position(),
                format!("column {name:?} holds bytes beyond its {num_rows} row(s)"),
            ));
        }
        columns.push(cells);
    }

    if !r.is_at_end() {
        return Err(Error::length_mismatch(
            r.position(),
            "tabular sections shorter than declared payload length",
        ));
    }

    let mut iters: Vec<_> = columns.into_iter().map(Vec::into_iter).collect();
    let mut rows = Vec::with_capacity(num_rows);
    for _ in 0..num_rows {
        let mut row = BtoonMap::with_capacity(num_columns);
        for (name, cells) in names.iter().zip(iters.iter_mut()) {
            row.insert(name.clone(), cells.next().unwrap_or(Value::Nil));
        }
        rows.push(Value::Map(row));
    }
    Ok(Value::Array(rows))
}
