//! Criterion benchmarks for chopshop-core primitives
//!
//! Run with: cargo bench -p chopshop-core
#![allow(missing_docs)]

use chopshop_core::{
    DelayLine, ParamDescriptor, PositionTracker, Rng, TransportSnapshot, normalized_to_steps,
};
use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};

const SAMPLE_RATE: f64 = 48000.0;
const BLOCK_SIZES: &[usize] = &[64, 256, 1024];

fn bench_tracker(c: &mut Criterion) {
    let mut group = c.benchmark_group("PositionTracker");

    for &block_size in BLOCK_SIZES {
        group.bench_with_input(
            BenchmarkId::new("walk_block", block_size),
            &block_size,
            |b, &n| {
                let mut tracker = PositionTracker::new(16, SAMPLE_RATE);
                let mut transport = TransportSnapshot::playing(128.0, 0.0);
                b.iter(|| {
                    let mut grid = tracker.begin_block(n, &transport).unwrap();
                    for _ in 0..n {
                        black_box(tracker.advance(&mut grid));
                    }
                    transport.ppq_position += transport.quarter_notes(n, SAMPLE_RATE);
                });
            },
        );
    }

    group.finish();
}

fn bench_param_mapping(c: &mut Criterion) {
    let mut group = c.benchmark_group("ParamMapping");
    let desc = ParamDescriptor::continuous("Min Pitch", "min_pitch", -2400.0, 2400.0, 0.5);

    group.bench_function("normalized_to_steps", |b| {
        b.iter(|| black_box(normalized_to_steps(black_box(31), 1, black_box(0.37))));
    });
    group.bench_function("descriptor_to_native", |b| {
        b.iter(|| black_box(desc.to_native(black_box(0.37))));
    });

    group.finish();
}

fn bench_delay_and_rng(c: &mut Criterion) {
    let mut group = c.benchmark_group("Primitives");

    group.bench_function("delay_read_write_1024", |b| {
        let mut delay = DelayLine::from_time(SAMPLE_RATE, 0.05);
        b.iter(|| {
            for i in 0..1024 {
                let out = delay.read(black_box(371.5));
                delay.write(black_box(i as f32 * 1e-3) + out * 0.5);
            }
        });
    });

    group.bench_function("rng_range_f64_1024", |b| {
        let mut rng = Rng::new(1);
        b.iter(|| {
            for _ in 0..1024 {
                black_box(rng.range_f64(-1.0, 1.0));
            }
        });
    });

    group.finish();
}

criterion_group!(benches, bench_tracker, bench_param_mapping, bench_delay_and_rng);
criterion_main!(benches);
