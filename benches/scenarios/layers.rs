//! Benchmarks for each ambient layer rendered alone.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use oracle_audio::{ambient::AmbientLayer, AudioManager, EngineConfig, OfflineDevice};

use crate::{BLOCK_SIZES, SAMPLE_RATE};

fn manager_with(layer: AmbientLayer, block_size: usize) -> AudioManager {
    let config = EngineConfig::default()
        .with_block_size(block_size)
        .with_seed(7);
    let mut audio = AudioManager::new(config, OfflineDevice::factory(SAMPLE_RATE));
    audio.initialize();
    audio.start_layer(layer);
    audio
}

pub fn bench_layers(c: &mut Criterion) {
    let mut group = c.benchmark_group("scenarios/layers");

    for &size in BLOCK_SIZES {
        let mut left = vec![0.0f32; size];
        let mut right = vec![0.0f32; size];

        for layer in AmbientLayer::ALL {
            let mut audio = manager_with(layer, size);
            group.bench_with_input(BenchmarkId::new(layer.name(), size), &size, |b, _| {
                b.iter(|| audio.render(black_box(&mut left), black_box(&mut right)))
            });
        }
    }

    group.finish();
}
