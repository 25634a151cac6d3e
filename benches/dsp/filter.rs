//! Benchmarks for biquad filter nodes.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use oracle_audio::graph::{FilterNode, GraphNode, RenderCtx};

use crate::{BLOCK_SIZES, SAMPLE_RATE};

pub fn bench_filter(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/filter");
    let ctx = RenderCtx::new(SAMPLE_RATE, 0.0);

    for &size in BLOCK_SIZES {
        // Sawtooth-like ramp as input
        let input: Vec<f32> = (0..size)
            .map(|i| (i as f32 / size as f32) * 2.0 - 1.0)
            .collect();

        let filters = [
            ("lowpass", FilterNode::lowpass(400.0)),
            ("highpass", FilterNode::highpass(400.0)),
            ("bandpass", FilterNode::bandpass(800.0, 1.0)),
        ];
        for (name, mut filter) in filters {
            let mut buffer = input.clone();
            group.bench_with_input(BenchmarkId::new(name, size), &size, |b, _| {
                b.iter(|| {
                    buffer.copy_from_slice(&input);
                    filter.render_block(black_box(&mut buffer), black_box(&ctx));
                })
            });
        }
    }

    group.finish();
}
