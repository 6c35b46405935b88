use btoon::{
    btoon, decode, encode, encode_with_options, validate, CompressionAlgorithm, EncodeOptions,
    ValidationOptions, Value,
};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

fn record_array(rows: usize) -> Value {
    Value::Array(
        (0..rows)
            .map(|i| {
                btoon!({
                    "active": true,
                    "email": "user@example.com",
                    "id": (i as u64),
                    "name": "Alice Example",
                    "score": 0.875
                })
            })
            .collect(),
    )
}

fn mixed_document() -> Value {
    btoon!({
        "binary": [1, 2, 3, 4, 5, 6, 7, 8],
        "nested": {"a": {"b": {"c": "deep"}}},
        "numbers": [1, (-2), 3.5, 4294967296u64],
        "text": "the quick brown fox jumps over the lazy dog",
        "vector": [0.1, 0.2, 0.3, 0.4]
    })
}

fn benchmark_encode(c: &mut Criterion) {
    let mut group = c.benchmark_group("encode");
    let doc = mixed_document();
    group.bench_function("mixed_document", |b| {
        b.iter(|| encode(black_box(&doc)).unwrap())
    });

    for rows in [10, 100, 1000] {
        let records = record_array(rows);
        group.bench_with_input(BenchmarkId::new("tabular", rows), &records, |b, v| {
            b.iter(|| encode(black_box(v)).unwrap())
        });
        let options = EncodeOptions::new().with_auto_tabular(false);
        group.bench_with_input(BenchmarkId::new("row_wise", rows), &records, |b, v| {
            b.iter(|| encode_with_options(black_box(v), &options).unwrap())
        });
    }
    group.finish();
}

fn benchmark_decode(c: &mut Criterion) {
    let mut group = c.benchmark_group("decode");
    let doc_bytes = encode(&mixed_document()).unwrap();
    group.bench_function("mixed_document", |b| {
        b.iter(|| decode(black_box(&doc_bytes)).unwrap())
    });

    for rows in [10, 100, 1000] {
        let bytes = encode(&record_array(rows)).unwrap();
        group.bench_with_input(BenchmarkId::new("tabular", rows), &bytes, |b, data| {
            b.iter(|| decode(black_box(data)).unwrap())
        });
    }
    group.finish();
}

fn benchmark_compression(c: &mut Criterion) {
    let mut group = c.benchmark_group("compression");
    let records = record_array(500);
    for algorithm in [
        CompressionAlgorithm::Zlib,
        CompressionAlgorithm::Lz4,
        CompressionAlgorithm::Zstd,
    ] {
        let options = EncodeOptions::new().with_compression(algorithm);
        group.bench_with_input(
            BenchmarkId::new("encode", format!("{algorithm:?}")),
            &records,
            |b, v| b.iter(|| encode_with_options(black_box(v), &options).unwrap()),
        );
        let bytes = encode_with_options(&records, &options).unwrap();
        group.bench_with_input(
            BenchmarkId::new("decode", format!("{algorithm:?}")),
            &bytes,
            |b, data| b.iter(|| decode(black_box(data)).unwrap()),
        );
    }
    group.finish();
}

fn benchmark_validate(c: &mut Criterion) {
    let mut group = c.benchmark_group("validate");
    let bytes = encode(&record_array(1000)).unwrap();
    let full = ValidationOptions::default();
    let fast = ValidationOptions::default().with_fast_mode(true);
    group.bench_function("with_stats", |b| {
        b.iter(|| validate(black_box(&bytes), &full))
    });
    group.bench_function("fast_mode", |b| {
        b.iter(|| validate(black_box(&bytes), &fast))
    });
    group.finish();
}

criterion_group!(
    benches,
    benchmark_encode,
    benchmark_decode,
    benchmark_compression,
    benchmark_validate
);
criterion_main!(benches);
