//! Validator behavior: verdicts, multi-error accumulation, configurable
//! limits, statistics, and agreement with the decoder.

use btoon::{
    btoon, decode, encode, encode_with_options, validate, CompressionAlgorithm, EncodeOptions,
    ErrorKind, ValidationOptions, Validator, Value,
};

fn defaults() -> ValidationOptions {
    ValidationOptions::default()
}

#[test]
fn valid_data_produces_clean_reports() {
    let samples = [
        encode(&Value::Uint(42)).unwrap(),
        encode(&Value::from("Hello, BTOON!")).unwrap(),
        encode(&btoon!([1, 2, 3])).unwrap(),
        encode(&btoon!({"key": "value", "number": 123})).unwrap(),
        encode(&btoon!([{"a": 1, "b": 2}, {"a": 3, "b": 4}])).unwrap(),
        encode(&Value::VectorFloat(vec![1.0, 2.0])).unwrap(),
    ];
    for bytes in &samples {
        let report = validate(bytes, &defaults());
        assert!(report.valid, "errors: {:?}", report.errors);
        assert!(report.errors.is_empty());
    }
}

#[test]
fn truncated_data_is_invalid() {
    let report = validate(&[0xda, 0x00, 0x10], &defaults());
    assert!(!report.valid);
    assert!(!report.errors.is_empty());
    assert_eq!(report.errors[0].kind, ErrorKind::OutOfBounds);
}

#[test]
fn accumulates_multiple_errors_with_distinct_offsets() {
    // A truncated string claim, then an unknown tag. The decoder stops at
    // the first problem; the validator reports both.
    let bytes = [0xda, 0x00, 0x10, b'h', b'i', 0xc1];
    assert_eq!(decode(&bytes).unwrap_err().kind(), ErrorKind::OutOfBounds);

    let report = validate(&bytes, &defaults());
    assert!(!report.valid);
    assert!(report.errors.len() >= 2, "errors: {:?}", report.errors);
    let truncation = report
        .errors
        .iter()
        .find(|d| d.kind == ErrorKind::OutOfBounds)
        .expect("truncated string reported");
    let unknown = report
        .errors
        .iter()
        .find(|d| d.kind == ErrorKind::UnknownTag)
        .expect("unknown tag reported");
    assert_ne!(truncation.offset, unknown.offset);
}

#[test]
fn excessive_depth_is_reported() {
    let options = defaults().with_max_depth(100);
    let mut bytes = vec![0x91; 200];
    bytes.push(0xc0);
    let report = validate(&bytes, &options);
    assert!(!report.valid);
    assert_eq!(report.errors[0].kind, ErrorKind::DepthExceeded);
}

#[test]
fn huge_length_claim_is_reported() {
    // str32 claiming 2 GiB backed by one byte.
    let bytes = [0xdb, 0x7f, 0xff, 0xff, 0xff, b'a'];
    let report = validate(&bytes, &defaults());
    assert!(!report.valid);
    assert_eq!(report.errors[0].kind, ErrorKind::OutOfBounds);
}

#[test]
fn invalid_utf8_is_reported_when_required() {
    let bytes = [0xa4, 0xff, 0xff, 0xff, 0xff];
    let report = validate(&bytes, &defaults());
    assert!(!report.valid);
    assert_eq!(report.errors[0].kind, ErrorKind::InvalidUtf8);

    let relaxed = defaults().with_require_utf8_strings(false);
    assert!(validate(&bytes, &relaxed).valid);
}

#[test]
fn size_limits_apply() {
    let options = defaults()
        .with_max_string_length(10)
        .with_max_array_size(2);

    let long_string = encode(&Value::from(
        "This is a very long string that exceeds the limit",
    ))
    .unwrap();
    assert!(!validate(&long_string, &options).valid);

    let large_array = encode(&btoon!([1, 2, 3, 4, 5])).unwrap();
    assert!(!validate(&large_array, &options).valid);

    let small = encode(&btoon!(["ok", 2])).unwrap();
    assert!(validate(&small, &options).valid);
}

#[test]
fn total_size_limit_applies() {
    let options = defaults().with_max_total_size(4);
    let bytes = encode(&Value::from("longer than four bytes")).unwrap();
    let report = validate(&bytes, &options);
    assert!(!report.valid);
    assert_eq!(report.errors[0].kind, ErrorKind::LengthMismatch);
}

#[test]
fn duplicate_and_out_of_order_keys() {
    let duplicated = [0x82, 0xa1, b'a', 0x01, 0xa1, b'a', 0x02];
    let report = validate(&duplicated, &defaults());
    assert!(!report.valid);
    assert_eq!(report.errors[0].kind, ErrorKind::DuplicateKey);

    let allowing = defaults().with_allow_duplicate_map_keys(true);
    assert!(validate(&duplicated, &allowing).valid);

    let out_of_order = [0x82, 0xa1, b'b', 0x01, 0xa1, b'a', 0x02];
    let report = validate(&out_of_order, &defaults());
    assert!(!report.valid);
    assert_eq!(report.errors[0].kind, ErrorKind::KeyOrder);
}

#[test]
fn trailing_bytes_are_an_error_but_still_walked() {
    let bytes = [0xc0, 0xc1];
    let report = validate(&bytes, &defaults());
    assert!(!report.valid);
    let kinds: Vec<_> = report.errors.iter().map(|d| d.kind).collect();
    assert!(kinds.contains(&ErrorKind::TrailingBytes));
    assert!(kinds.contains(&ErrorKind::UnknownTag));
}

#[test]
fn reserved_extension_codes_warn_without_invalidating() {
    let bytes = encode(&Value::Extension {
        code: -50,
        data: vec![0x01],
    })
    .unwrap();
    let report = validate(&bytes, &defaults());
    assert!(report.valid);
    assert_eq!(report.warnings.len(), 1);
    assert!(report.warnings[0].message.contains("reserved"));
}

#[test]
fn malformed_extension_shapes_are_errors() {
    // Date with a 4-byte payload.
    let report = validate(&[0xd6, 0xfe, 0, 0, 0, 42], &defaults());
    assert!(!report.valid);
    assert_eq!(report.errors[0].kind, ErrorKind::InvalidExtension);

    // Float vector with a 6-byte payload.
    let report = validate(&[0xc7, 6, 0xfb, 0, 0, 0, 0, 0, 0], &defaults());
    assert!(!report.valid);
    assert_eq!(report.errors[0].kind, ErrorKind::InvalidExtension);
}

#[test]
fn statistics_count_tags_and_depth() {
    let value = btoon!({
        "binary": "unused",
        "nested": {"inner": "value"},
        "numbers": [1, 2, 3],
        "strings": ["a", "bb", "ccc"]
    });
    let bytes = encode(&value).unwrap();
    let report = validate(&bytes, &defaults());
    assert!(report.valid);

    let stats = report.stats.expect("stats collected by default");
    assert_eq!(stats.total_bytes, bytes.len());
    assert!(stats.max_depth >= 2);
    assert!(stats.count_by_tag["str"] > 0);
    assert!(stats.count_by_tag["array"] >= 2);
    assert!(stats.count_by_tag["map"] >= 2);
    assert!(stats.count_by_tag["uint"] >= 3);
}

#[test]
fn fast_mode_skips_statistics() {
    let bytes = encode(&btoon!([1, 2, 3])).unwrap();
    let options = defaults().with_fast_mode(true);
    let report = validate(&bytes, &options);
    assert!(report.valid);
    assert!(report.stats.is_none());
}

#[test]
fn quick_check_matches_validate() {
    let validator = Validator::new();
    assert!(validator.quick_check(&encode(&Value::Uint(1)).unwrap()));
    assert!(!validator.quick_check(&[0xc1]));
    assert!(!validator.quick_check(&[]));
}

#[test]
fn framed_input_is_validated_through_the_envelope() {
    let value = btoon!({"payload": "zzzzzzzzzzzzzzzzzzzzzzzzzzzzzzzzzzzzzzzz"});
    let options = EncodeOptions::new()
        .with_compression(CompressionAlgorithm::Zlib)
        .with_min_compression_size(1);
    let bytes = encode_with_options(&value, &options).unwrap();
    assert_eq!(&bytes[..4], b"BTON");

    let report = validate(&bytes, &defaults());
    assert!(report.valid, "errors: {:?}", report.errors);

    // A bomb header fails validation without inflating.
    let mut bomb = bytes.clone();
    bomb[12..16].copy_from_slice(&u32::MAX.to_be_bytes());
    let report = validate(&bomb, &defaults());
    assert!(!report.valid);
    assert_eq!(report.errors[0].kind, ErrorKind::DecompressionBomb);
}

#[test]
fn validator_verdict_implies_decoder_success() {
    let corpus: Vec<Vec<u8>> = vec![
        encode(&Value::Nil).unwrap(),
        encode(&btoon!({"a": [1, {"b": nil}], "c": (-9.5)})).unwrap(),
        encode(&btoon!([{"x": 1}, {"x": 2}, {"x": 3}])).unwrap(),
        encode(&Value::Timestamp(1_700_000_000)).unwrap(),
        vec![0xc1],
        vec![0xda, 0x00, 0x10],
        vec![0x91],
        vec![],
        vec![0x82, 0xa1, b'b', 0x01, 0xa1, b'a', 0x02],
    ];
    for bytes in &corpus {
        let report = validate(bytes, &defaults());
        if report.valid {
            assert!(
                decode(bytes).is_ok(),
                "validator accepted what the decoder rejects: {bytes:02x?}"
            );
        }
    }
}
