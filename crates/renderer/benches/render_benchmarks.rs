//! Benchmarks for decode, raster rendering and PNG encoding.
//!
//! Run with: cargo bench --package renderer --bench render_benchmarks

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use grib2_parser::decode;
use renderer::{png, render_indexed, render_rgba, REFLECTIVITY};
use test_utils::Grib2Builder;

/// Storm-like reflectivity field: concentric rings of echo with a clear-air
/// border masked out by the bitmap.
fn storm_message(width: u32, height: u32) -> Vec<u8> {
    let (cx, cy) = (width as f32 / 2.0, height as f32 / 2.0);
    let values: Vec<Option<f32>> = (0..height)
        .flat_map(|y| (0..width).map(move |x| (x, y)))
        .map(|(x, y)| {
            let d = ((x as f32 - cx).powi(2) + (y as f32 - cy).powi(2)).sqrt();
            let dbz = 70.0 - d * 0.15;
            (dbz > -10.0).then_some(dbz)
        })
        .collect();
    Grib2Builder::mrms(width, height).with_values(&values).build()
}

fn bench_pipeline(c: &mut Criterion) {
    let mut group = c.benchmark_group("pipeline");

    for (width, height) in [(256u32, 256u32), (1000, 500)] {
        let bytes = storm_message(width, height);
        let message = decode(&bytes, "bench").expect("synthetic message decodes");
        let cells = u64::from(width * height);
        group.throughput(Throughput::Elements(cells));
        let label = format!("{width}x{height}");

        group.bench_with_input(BenchmarkId::new("decode", &label), &bytes, |b, bytes| {
            b.iter(|| decode(black_box(bytes), "bench"))
        });
        group.bench_with_input(BenchmarkId::new("render_rgba", &label), &message.grid, |b, grid| {
            b.iter(|| render_rgba(black_box(grid), &REFLECTIVITY))
        });
        group.bench_with_input(
            BenchmarkId::new("render_indexed", &label),
            &message.grid,
            |b, grid| b.iter(|| render_indexed(black_box(grid), &REFLECTIVITY)),
        );
        group.bench_with_input(BenchmarkId::new("encode_png", &label), &message.grid, |b, grid| {
            b.iter(|| png::encode_grid_png(black_box(grid), &REFLECTIVITY))
        });
    }

    group.finish();
}

criterion_group!(benches, bench_pipeline);
criterion_main!(benches);
