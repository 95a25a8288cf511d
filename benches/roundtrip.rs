//! Codec throughput benchmarks

use criterion::{criterion_group, criterion_main, Criterion};
use dxfdom::entities::Line;
use dxfdom::types::Vector3;
use dxfdom::{CadDocument, DxfVersion};
use std::io::Cursor;

fn build_document(lines: usize) -> CadDocument {
    let mut doc = CadDocument::new();
    for i in 0..lines {
        let x = i as f64;
        let line = Line::from_points(Vector3::new(x, 0.0, 0.0), Vector3::new(x, 100.0, 0.0));
        doc.add_to_model_space(line.into()).unwrap();
    }
    doc
}

fn bench_write(c: &mut Criterion) {
    let mut doc = build_document(1000);
    c.bench_function("write_ascii_1k_lines", |b| {
        b.iter(|| doc.to_bytes(DxfVersion::AC1032, false).unwrap())
    });
    c.bench_function("write_binary_1k_lines", |b| {
        b.iter(|| doc.to_bytes(DxfVersion::AC1032, true).unwrap())
    });
}

fn bench_read(c: &mut Criterion) {
    let mut doc = build_document(1000);
    let ascii = doc.to_bytes(DxfVersion::AC1032, false).unwrap();
    let binary = doc.to_bytes(DxfVersion::AC1032, true).unwrap();

    c.bench_function("read_ascii_1k_lines", |b| {
        b.iter(|| {
            let mut cursor = Cursor::new(ascii.clone());
            CadDocument::read_from(&mut cursor).unwrap()
        })
    });
    c.bench_function("read_binary_1k_lines", |b| {
        b.iter(|| {
            let mut cursor = Cursor::new(binary.clone());
            CadDocument::read_from(&mut cursor).unwrap()
        })
    });
}

criterion_group!(benches, bench_write, bench_read);
criterion_main!(benches);
