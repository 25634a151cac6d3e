use oracle_audio::{
    ambient::AmbientLayer,
    catalog::Catalog,
    error::EngineError,
    synth::VoiceKind,
    AudioManager, EngineConfig, OfflineDevice,
};

fn running(seed: u64) -> AudioManager {
    let config = EngineConfig::default().with_seed(seed).with_strict(true);
    let mut audio = AudioManager::new(config, OfflineDevice::factory(8_000.0));
    audio.initialize();
    audio
}

#[test]
fn starting_an_active_layer_is_a_no_op() {
    let mut audio = running(1);
    assert!(audio.start_ambient_layer("deepSpace").is_some());
    assert!(audio.start_ambient_layer("deepSpace").is_none());
    assert_eq!(audio.layer_voice_count(AmbientLayer::DeepSpace), 1);
}

#[test]
fn stopped_layer_releases_and_can_restart() {
    let mut audio = running(2);
    audio.start_layer(AmbientLayer::CosmicWind);
    audio.advance(1.0);

    assert!(audio.stop_ambient_layer("cosmicWind"));
    assert!(!audio.is_layer_active(AmbientLayer::CosmicWind));
    assert!(!audio.stop_ambient_layer("cosmicWind"));

    // the voice rings through its release, then goes
    assert_eq!(audio.layer_voice_count(AmbientLayer::CosmicWind), 0);
    assert_eq!(audio.voice_count(), 1);
    audio.advance(1.0);
    assert_eq!(audio.voice_count(), 0);

    assert!(audio.start_ambient_layer("cosmicWind").is_some());
    assert_eq!(audio.layer_voice_count(AmbientLayer::CosmicWind), 1);
}

#[test]
fn quick_restart_counts_only_the_new_voice() {
    let mut audio = running(5);
    let first = audio.start_layer(AmbientLayer::CosmicWind).expect("running");
    audio.advance(0.5);
    assert!(audio.stop_ambient_layer("cosmicWind"));

    let second = audio.start_layer(AmbientLayer::CosmicWind).expect("restarted");
    assert_ne!(first, second);
    assert_eq!(audio.voice_count(), 2);
    assert_eq!(audio.layer_voice_count(AmbientLayer::CosmicWind), 1);

    audio.advance(1.0);
    assert_eq!(audio.voice_ids(), vec![second]);
    assert_eq!(audio.layer_voice_count(AmbientLayer::CosmicWind), 1);
}

#[test]
fn stopping_the_layer_voice_clears_the_layer() {
    let mut audio = running(3);
    let id = audio.start_layer(AmbientLayer::EarthHum).expect("running");
    assert!(audio.stop_sound(&id));
    assert!(!audio.is_layer_active(AmbientLayer::EarthHum));
    assert!(audio.start_layer(AmbientLayer::EarthHum).is_some());
}

#[test]
fn crystal_resonance_spawns_chimes() {
    let mut audio = running(4);
    audio.start_layer(AmbientLayer::CrystalResonance);

    let mut saw_chime = false;
    for _ in 0..120 {
        audio.advance(0.1);
        saw_chime |= audio
            .voice_ids()
            .iter()
            .any(|id| id.kind() == VoiceKind::Chime);
    }
    assert!(saw_chime);
    assert_eq!(audio.layer_voice_count(AmbientLayer::CrystalResonance), 1);
}

#[test]
fn chimes_stop_coming_after_the_layer_stops() {
    let mut audio = running(5);
    audio.start_layer(AmbientLayer::CrystalResonance);
    audio.advance(3.0);
    audio.stop_layer(AmbientLayer::CrystalResonance);

    // anything already ringing decays within the longest strike
    audio.advance(5.0);
    for _ in 0..100 {
        audio.advance(0.1);
        assert_eq!(audio.voice_count(), 0);
    }
}

#[test]
fn quantum_flux_glitches_are_audible() {
    let mut audio = running(6);
    audio.start_layer(AmbientLayer::QuantumFlux);

    let mut left = vec![0.0; 800];
    let mut right = vec![0.0; 800];
    let mut loudest = 0.0f32;
    for _ in 0..60 {
        audio.render(&mut left, &mut right);
        loudest = left.iter().chain(&right).fold(loudest, |m, s| m.max(s.abs()));
    }
    assert!(loudest > 0.0);
    assert!(loudest < 1.0);
}

#[test]
fn every_layer_renders_finite_output() {
    let mut audio = running(7);
    for layer in AmbientLayer::ALL {
        assert!(audio.start_layer(layer).is_some(), "{layer}");
    }
    let mut left = vec![0.0; 4096];
    let mut right = vec![0.0; 4096];
    for _ in 0..8 {
        audio.render(&mut left, &mut right);
        assert!(left.iter().chain(&right).all(|s| s.is_finite()));
    }
}

#[test]
fn unknown_layer_is_reported() {
    let mut audio = running(8);
    assert!(audio.start_ambient_layer("deepOcean").is_none());
    let diagnostics = audio.take_diagnostics();
    assert_eq!(
        diagnostics[0].error,
        EngineError::UnknownCatalogKey {
            catalog: Catalog::Layer,
            key: "deepOcean".to_string(),
        }
    );
}
