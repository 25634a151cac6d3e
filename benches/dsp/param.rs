//! Benchmarks for parameter automation rendering.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use oracle_audio::dsp::Param;

use crate::{BLOCK_SIZES, SAMPLE_RATE};

pub fn bench_param(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/param");

    for &size in BLOCK_SIZES {
        let mut buffer = vec![0.0f32; size];

        let mut constant = Param::new(0.5);
        group.bench_with_input(BenchmarkId::new("constant", size), &size, |b, _| {
            b.iter(|| constant.render(black_box(&mut buffer), 0.0, SAMPLE_RATE))
        });

        // Ramps far in the future so every iteration stays inside them
        let mut linear = Param::new(0.0);
        linear.linear_ramp_to(1.0, 3600.0);
        group.bench_with_input(BenchmarkId::new("linear_ramp", size), &size, |b, _| {
            b.iter(|| linear.render(black_box(&mut buffer), 1.0, SAMPLE_RATE))
        });

        let mut exponential = Param::new(1.0);
        exponential.exponential_ramp_to(0.001, 3600.0);
        group.bench_with_input(BenchmarkId::new("exponential_ramp", size), &size, |b, _| {
            b.iter(|| exponential.render(black_box(&mut buffer), 1.0, SAMPLE_RATE))
        });
    }

    group.finish();
}
