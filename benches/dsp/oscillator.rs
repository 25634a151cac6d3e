//! Benchmarks for oscillator nodes, steady and swept.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use oracle_audio::dsp::Waveform;
use oracle_audio::graph::{GraphNode, OscNode, RenderCtx, Source};

use crate::{BLOCK_SIZES, SAMPLE_RATE};

pub fn bench_oscillator(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/oscillator");
    let ctx = RenderCtx::new(SAMPLE_RATE, 0.0);

    for &size in BLOCK_SIZES {
        let mut buffer = vec![0.0f32; size];

        for waveform in Waveform::ALL {
            let mut osc = OscNode::new(waveform, 440.0);
            osc.start(0.0);
            group.bench_with_input(
                BenchmarkId::new(waveform.to_string(), size),
                &size,
                |b, _| b.iter(|| osc.render_block(black_box(&mut buffer), black_box(&ctx))),
            );
        }

        // Frequency automation forces per-sample parameter evaluation
        let mut swept = OscNode::sine(110.0);
        swept.start(0.0);
        swept.frequency_mut().linear_ramp_to(880.0, 3600.0);
        group.bench_with_input(BenchmarkId::new("sine_swept", size), &size, |b, _| {
            b.iter(|| swept.render_block(black_box(&mut buffer), black_box(&ctx)))
        });
    }

    group.finish();
}
