//! Benchmarks for field generation and per-frame CPU work.
//!
//! Run with: `cargo bench`

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use horizon::gpu::build_instances;
use horizon::orbit::project_field;
use horizon::prelude::*;

const VIEWPORTS: [(f32, f32); 2] = [(390.0, 844.0), (1920.0, 1080.0)];

fn bench_field_generation(c: &mut Criterion) {
    let mut group = c.benchmark_group("field_generation");
    let config = IntroConfig::default();

    for (w, h) in VIEWPORTS {
        let viewport = Viewport::new(w, h);
        group.bench_with_input(BenchmarkId::from_parameter(format!("{w}x{h}")), &viewport, |b, v| {
            b.iter(|| black_box(ParticleField::generate(SessionSeed::new(42.0), *v, &config.field)))
        });
    }

    group.finish();
}

fn bench_frame(c: &mut Criterion) {
    let mut group = c.benchmark_group("frame");
    let config = IntroConfig::default();
    let viewport = Viewport::new(1920.0, 1080.0);
    let field = ParticleField::generate(SessionSeed::new(42.0), viewport, &config.field);

    group.bench_function("project_and_sort", |b| {
        b.iter(|| black_box(project_field(&field, black_box(3000.0), viewport.center(), &config.motion)))
    });

    group.bench_function("compose", |b| {
        b.iter(|| black_box(compose_frame(&field, black_box(3000.0), viewport, &config)))
    });

    let list = compose_frame(&field, 3000.0, viewport, &config);
    group.bench_function("gpu_instances", |b| b.iter(|| black_box(build_instances(&list))));

    group.finish();
}

fn bench_raster(c: &mut Criterion) {
    let config = IntroConfig::default();
    let viewport = Viewport::new(640.0, 360.0);
    let field = ParticleField::generate(SessionSeed::new(42.0), viewport, &config.field);
    let list = compose_frame(&field, 3000.0, viewport, &config);
    let mut surface = PixelSurface::new(640, 360);

    c.bench_function("raster_640x360", |b| {
        b.iter(|| surface.draw(black_box(&list), 1.0).unwrap())
    });
}

criterion_group!(benches, bench_field_generation, bench_frame, bench_raster);
criterion_main!(benches);
