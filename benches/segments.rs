use criterion::{criterion_group, criterion_main, Criterion};
use segmeta::{join, read_segments_from_bytes, split_bytes, ReaderRegistry, SegmentType};
use std::collections::BTreeSet;
use std::hint::black_box;
use std::io::Cursor;

fn segment(marker: u8, payload: &[u8]) -> Vec<u8> {
    let mut bytes = vec![0xFF, marker];
    bytes.extend_from_slice(&((payload.len() + 2) as u16).to_be_bytes());
    bytes.extend_from_slice(payload);
    bytes
}

// Header with a large APP1, ICC chunks, tables and a comment, followed by scan data
fn create_sample_jpeg() -> Vec<u8> {
    let mut data = vec![0xFF, 0xD8];
    data.extend(segment(
        0xE0,
        &[b'J', b'F', b'I', b'F', 0, 1, 1, 1, 0, 72, 0, 72, 0, 0],
    ));
    data.extend(segment(0xE1, &vec![0x42; 60_000]));
    for chunk in 0..4u8 {
        data.extend(segment(0xE2, &vec![chunk; 8_000]));
    }
    data.extend(segment(0xDB, &[0x01; 130]));
    data.extend(segment(
        0xC0,
        &[8, 0x0F, 0xA0, 0x0B, 0xB8, 3, 1, 0x22, 0, 2, 0x11, 1, 3, 0x11, 1],
    ));
    data.extend(segment(0xC4, &[0x10; 400]));
    data.extend(segment(0xFE, b"benchmark"));
    data.extend(segment(0xDA, &[1, 1, 0, 0, 0x3F, 0]));
    data.extend(vec![0x55; 200_000]);
    data.extend_from_slice(&[0xFF, 0xD9]);
    data
}

fn bench_read_segments(c: &mut Criterion) {
    let data = create_sample_jpeg();

    c.bench_function("read_segments_all", |b| {
        b.iter(|| {
            let outcome = read_segments_from_bytes(black_box(&data), None).unwrap();
            black_box(outcome.into_store());
        });
    });

    let wanted = BTreeSet::from([SegmentType::App0, SegmentType::Com]);
    c.bench_function("read_segments_filtered", |b| {
        b.iter(|| {
            let outcome = read_segments_from_bytes(black_box(&data), Some(&wanted)).unwrap();
            black_box(outcome.into_store());
        });
    });
}

fn bench_split_join(c: &mut Criterion) {
    let data = create_sample_jpeg();

    c.bench_function("split_bytes", |b| {
        b.iter(|| {
            black_box(split_bytes(black_box(&data)).unwrap());
        });
    });

    let fragments = split_bytes(&data).unwrap();
    c.bench_function("join", |b| {
        b.iter(|| {
            black_box(join(black_box(&fragments)));
        });
    });
}

fn bench_registry(c: &mut Criterion) {
    let data = create_sample_jpeg();
    let registry = ReaderRegistry::new();

    c.bench_function("registry_process", |b| {
        b.iter(|| {
            black_box(registry.process(Cursor::new(black_box(&data))).unwrap());
        });
    });
}

criterion_group!(
    benches,
    bench_read_segments,
    bench_split_join,
    bench_registry
);
criterion_main!(benches);
