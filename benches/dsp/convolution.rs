//! Benchmarks for the partitioned convolution reverb.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use oracle_audio::graph::{ConvolverNode, GraphNode, RenderCtx};
use rand::{rngs::StdRng, SeedableRng};

use crate::{BLOCK_SIZES, SAMPLE_RATE};

pub fn bench_convolution(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/convolution");
    let ctx = RenderCtx::new(SAMPLE_RATE, 0.0);
    let mut rng = StdRng::seed_from_u64(1);

    for &size in BLOCK_SIZES {
        let input: Vec<f32> = (0..size).map(|i| ((i * 7919) % 200) as f32 / 100.0 - 1.0).collect();

        for (name, seconds) in [("ir_0.5s", 0.5), ("ir_2.5s", 2.5)] {
            let mut reverb = ConvolverNode::synthetic(SAMPLE_RATE, seconds, 2.0, 512, &mut rng);
            let mut buffer = input.clone();
            group.bench_with_input(BenchmarkId::new(name, size), &size, |b, _| {
                b.iter(|| {
                    buffer.copy_from_slice(&input);
                    reverb.render_block(black_box(&mut buffer), black_box(&ctx));
                })
            });
        }
    }

    group.finish();
}
