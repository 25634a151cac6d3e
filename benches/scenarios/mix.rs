//! Benchmarks for busy scenes through every category bus.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use oracle_audio::{
    ambient::AmbientLayer, AudioManager, EngineConfig, OfflineDevice, SacredOptions,
};

use crate::{BLOCK_SIZES, SAMPLE_RATE};

fn manager(block_size: usize) -> AudioManager {
    let config = EngineConfig::default()
        .with_block_size(block_size)
        .with_seed(11);
    let mut audio = AudioManager::new(config, OfflineDevice::factory(SAMPLE_RATE));
    audio.initialize();
    audio
}

pub fn bench_mix(c: &mut Criterion) {
    let mut group = c.benchmark_group("scenarios/mix");

    for &size in BLOCK_SIZES {
        let mut left = vec![0.0f32; size];
        let mut right = vec![0.0f32; size];

        // === MEDITATION: sacred tone + binaural + schumann ===
        let mut meditation = manager(size);
        meditation.play_sacred_frequency("solfeggio.mi", None, SacredOptions::default());
        meditation.play_binaural_beat("theta", None);
        meditation.play_schumann_resonance(true, None);

        group.bench_with_input(BenchmarkId::new("meditation", size), &size, |b, _| {
            b.iter(|| meditation.render(black_box(&mut left), black_box(&mut right)))
        });

        // === SOUNDSCAPE: every ambient layer at once ===
        let mut soundscape = manager(size);
        for layer in AmbientLayer::ALL {
            soundscape.start_layer(layer);
        }

        group.bench_with_input(BenchmarkId::new("all_layers", size), &size, |b, _| {
            b.iter(|| soundscape.render(black_box(&mut left), black_box(&mut right)))
        });
    }

    group.finish();
}
