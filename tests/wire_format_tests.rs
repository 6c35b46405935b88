//! Byte-exact wire format checks against the specification's reference
//! encodings, plus the decoder's failure offsets on malformed input.

use btoon::{btoon, decode, decode_with_options, encode, DecodeOptions, ErrorKind, Value};

#[test]
fn nil_is_one_byte() {
    let bytes = encode(&Value::Nil).unwrap();
    assert_eq!(bytes, vec![0xc0]);
    assert_eq!(decode(&bytes).unwrap(), Value::Nil);
}

#[test]
fn fixmap_reference_encoding() {
    let value = btoon!({"age": 30, "name": "Alice"});
    let bytes = encode(&value).unwrap();
    assert_eq!(
        bytes,
        vec![
            0x82, 0xa3, b'a', b'g', b'e', 0x1e, 0xa4, b'n', b'a', b'm', b'e', 0xa5, b'A', b'l',
            b'i', b'c', b'e'
        ]
    );
    assert_eq!(decode(&bytes).unwrap(), value);
}

#[test]
fn negative_fixint_boundary() {
    assert_eq!(encode(&Value::Int(-32)).unwrap(), vec![0xe0]);
    assert_eq!(encode(&Value::Int(-33)).unwrap(), vec![0xd0, 0xdf]);
    assert_eq!(decode(&[0xe0]).unwrap(), Value::Int(-32));
    assert_eq!(decode(&[0xd0, 0xdf]).unwrap(), Value::Int(-33));
}

#[test]
fn integer_ladders_round_trip_at_boundaries() {
    let cases: [u64; 9] = [0, 127, 128, 255, 256, 65535, 65536, u32::MAX as u64, u64::MAX];
    for value in cases {
        let bytes = encode(&Value::Uint(value)).unwrap();
        assert_eq!(decode(&bytes).unwrap(), Value::Uint(value), "uint {value}");
    }

    let cases: [i64; 8] = [-1, -32, -33, -128, -129, -32768, -32769, i64::MIN];
    for value in cases {
        let bytes = encode(&Value::Int(value)).unwrap();
        assert_eq!(decode(&bytes).unwrap(), Value::Int(value), "int {value}");
    }
}

#[test]
fn truncated_string_fails_at_payload_offset() {
    let err = decode(&[0xda, 0x00, 0x10, b'h', b'i']).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::OutOfBounds);
    assert_eq!(err.offset(), Some(3));
}

#[test]
fn map_key_order_strict_and_lenient() {
    // {"b": 1, "a": 2} in that wire order.
    let bytes = [0x82, 0xa1, b'b', 0x01, 0xa1, b'a', 0x02];

    let err = decode(&bytes).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::KeyOrder);
    assert_eq!(err.offset(), Some(4));

    let value = decode_with_options(&bytes, &DecodeOptions::lenient()).unwrap();
    let reencoded = encode(&value).unwrap();
    assert_eq!(
        reencoded,
        vec![0x82, 0xa1, b'a', 0x02, 0xa1, b'b', 0x01],
        "re-encode emits ascending keys"
    );
}

#[test]
fn signed_tag_decodes_as_int_and_narrows() {
    // 5 carried via int64.
    let wide = [0xd3, 0, 0, 0, 0, 0, 0, 0, 5];
    let value = decode(&wide).unwrap();
    assert_eq!(value, Value::Int(5));
    // Re-encoding narrows to a positive fixint; numeric meaning survives.
    let narrow = encode(&value).unwrap();
    assert_eq!(narrow, vec![0x05]);
    assert_eq!(decode(&narrow).unwrap(), Value::Uint(5));
}

#[test]
fn float_is_eight_byte_big_endian() {
    let bytes = encode(&Value::Float(-2.5)).unwrap();
    assert_eq!(bytes[0], 0xcb);
    assert_eq!(&bytes[1..], &(-2.5f64).to_be_bytes());

    // float32 input widens losslessly.
    let mut small = vec![0xca];
    small.extend_from_slice(&3.25f32.to_be_bytes());
    assert_eq!(decode(&small).unwrap(), Value::Float(3.25));
}

#[test]
fn binary_is_distinct_from_string() {
    let bytes = encode(&Value::Binary(vec![1, 2, 3])).unwrap();
    assert_eq!(&bytes[..2], &[0xc4, 3]);
    assert_eq!(decode(&bytes).unwrap(), Value::Binary(vec![1, 2, 3]));
}

#[test]
fn array_ladder_boundaries() {
    let fifteen = Value::Array(vec![Value::Nil; 15]);
    assert_eq!(encode(&fifteen).unwrap()[0], 0x9f);

    let sixteen = Value::Array(vec![Value::Nil; 16]);
    let bytes = encode(&sixteen).unwrap();
    assert_eq!(&bytes[..3], &[0xdc, 0, 16]);
    assert_eq!(decode(&bytes).unwrap(), sixteen);
}

#[test]
fn str8_boundary() {
    let s = "x".repeat(32);
    let bytes = encode(&Value::from(s.as_str())).unwrap();
    assert_eq!(&bytes[..2], &[0xd9, 32]);
    assert_eq!(decode(&bytes).unwrap(), Value::from(s.as_str()));
}

#[test]
fn timestamp_wire_shape() {
    let bytes = encode(&Value::Timestamp(1_700_000_000)).unwrap();
    assert_eq!(bytes.len(), 10);
    assert_eq!(bytes[0], 0xd7);
    assert_eq!(bytes[1] as i8, -1);
    assert_eq!(decode(&bytes).unwrap(), Value::Timestamp(1_700_000_000));

    // Four-byte timestamps from compact encoders are accepted.
    let compact = [0xd6, 0xff, 0x49, 0x96, 0x02, 0xd2];
    assert_eq!(decode(&compact).unwrap(), Value::Timestamp(1_234_567_890));
}

#[test]
fn date_and_datetime_round_trip() {
    for value in [
        Value::Date(1_700_000_000_123),
        Value::DateTime(1_700_000_000_123_456_789),
        Value::Date(-1),
        Value::DateTime(i64::MIN),
    ] {
        let bytes = encode(&value).unwrap();
        assert_eq!(decode(&bytes).unwrap(), value);
    }
}

#[test]
fn bigint_and_vectors_round_trip() {
    let values = [
        Value::BigInt(vec![0x01, 0x02, 0x03]),
        Value::VectorFloat(vec![1.0, -1.0, 0.5]),
        Value::VectorDouble(vec![f64::MAX, f64::MIN_POSITIVE]),
        Value::VectorFloat(vec![]),
    ];
    for value in values {
        let bytes = encode(&value).unwrap();
        assert_eq!(decode(&bytes).unwrap(), value);
    }
}

#[test]
fn application_extension_round_trip() {
    for len in [0usize, 1, 2, 3, 4, 8, 15, 16, 17, 255, 256] {
        let value = Value::Extension {
            code: 42,
            data: vec![0xab; len],
        };
        let bytes = encode(&value).unwrap();
        assert_eq!(decode(&bytes).unwrap(), value, "payload length {len}");
    }
}

#[test]
fn reserved_band_extension_survives_round_trip() {
    let value = Value::Extension {
        code: -77,
        data: vec![1, 2, 3, 4, 5],
    };
    let bytes = encode(&value).unwrap();
    assert_eq!(decode(&bytes).unwrap(), value);
}

#[test]
fn unknown_tag_is_rejected_with_offset() {
    let err = decode(&[0x91, 0xc1]).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::UnknownTag);
    assert_eq!(err.offset(), Some(1));
}

#[test]
fn trailing_bytes_strict_vs_lenient() {
    let bytes = [0x01, 0x02];
    let err = decode(&bytes).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::TrailingBytes);

    let value = decode_with_options(&bytes, &DecodeOptions::lenient()).unwrap();
    assert_eq!(value, Value::Uint(1));
}

#[test]
fn depth_limit_fails_on_the_next_descent() {
    let options = DecodeOptions::new().with_max_depth(128);
    let mut at_limit = vec![0x91; 127];
    at_limit.push(0x90);
    assert!(decode_with_options(&at_limit, &options).is_ok());

    let mut beyond = vec![0x91; 128];
    beyond.push(0x90);
    let err = decode_with_options(&beyond, &options).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::DepthExceeded);
}

#[test]
fn idempotent_encode() {
    let values = [
        btoon!({"a": [1, 2, 3], "b": {"c": nil}, "d": "text"}),
        btoon!([{"x": 1, "y": (-2)}, {"x": 3, "y": (-4)}]),
        Value::VectorDouble(vec![0.25, 0.5]),
        Value::Timestamp(0),
    ];
    for value in values {
        let first = encode(&value).unwrap();
        let second = encode(&decode(&first).unwrap()).unwrap();
        assert_eq!(first, second);
    }
}
