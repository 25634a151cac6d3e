use std::{fmt, str::FromStr};

use rand::Rng;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{
    ambient::effects::RetriggerEffect,
    catalog::{lookup, Catalog},
    config::{
        ambient::{
            CHIME_FREQUENCIES, CHIME_REST, CONVOLUTION_PARTITION, ECHO_IR_DECAY, ECHO_IR_SECONDS,
            FLUX_FREQUENCY, FLUX_OSCILLATORS, GLITCH_REST, LAYER_GAIN,
        },
        envelope::AMBIENT_FADE_IN,
    },
    dsp::{oscillator::Waveform, param::Param},
    engine::Category,
    error::EngineError,
    graph::{ConvolverNode, FilterNode, LfoNode, Modulator, NoiseNode, OscNode},
    synth::{Chain, ModTarget, Voice, VoiceId},
};

/*
Ambient layers
==============

Six long-running soundscapes, each one voice on the ambient bus:

  deepSpace         3 low sines → lowpass 200 Hz, each drifting on its own
                    slow LFO (0.10 / 0.13 / 0.17 Hz)
  earthHum          brown noise → bandpass 100 Hz, plus a pure 68 Hz tone
  cosmicWind        white noise → bandpass 800 Hz, center swept ±600 Hz by
                    a 0.2 Hz LFO
  crystalResonance  faint high shimmer; four bells chime on their own
                    schedules as separate short voices
  ancientEchoes     pink noise → lowpass 400 Hz → 2.5 s synthetic reverb
  quantumFlux       5 oscillators of random shape, pitch and pan, silent
                    except for glitch bursts

Every layer fades in over a few seconds. Random choices come from the
engine's RNG, so a seeded engine builds the same layers every time.
*/

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize), serde(rename_all = "camelCase"))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AmbientLayer {
    DeepSpace,
    EarthHum,
    CosmicWind,
    CrystalResonance,
    AncientEchoes,
    QuantumFlux,
}

impl AmbientLayer {
    pub const COUNT: usize = 6;

    pub const ALL: [AmbientLayer; AmbientLayer::COUNT] = [
        AmbientLayer::DeepSpace,
        AmbientLayer::EarthHum,
        AmbientLayer::CosmicWind,
        AmbientLayer::CrystalResonance,
        AmbientLayer::AncientEchoes,
        AmbientLayer::QuantumFlux,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn name(self) -> &'static str {
        match self {
            AmbientLayer::DeepSpace => "deepSpace",
            AmbientLayer::EarthHum => "earthHum",
            AmbientLayer::CosmicWind => "cosmicWind",
            AmbientLayer::CrystalResonance => "crystalResonance",
            AmbientLayer::AncientEchoes => "ancientEchoes",
            AmbientLayer::QuantumFlux => "quantumFlux",
        }
    }
}

impl fmt::Display for AmbientLayer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for AmbientLayer {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        lookup(&Self::ALL, Self::name, Catalog::Layer, s)
    }
}

/// A freshly built layer: its voice and the effects that keep it moving.
pub struct LayerBuild {
    pub voice: Voice,
    pub effects: Vec<RetriggerEffect>,
}

/// Build the subgraph for `layer`, starting at `now`.
pub fn build_layer<R: Rng + ?Sized>(
    layer: AmbientLayer,
    id: VoiceId,
    now: f64,
    sample_rate: f32,
    generation: u64,
    rng: &mut R,
) -> LayerBuild {
    let mut envelope = Param::new(0.0);
    envelope.set_value_at(0.0, now);
    envelope.linear_ramp_to(LAYER_GAIN, now + AMBIENT_FADE_IN);

    let voice = Voice::new(id, Category::Ambient)
        .with_layer(layer)
        .with_envelope(envelope);

    let (voice, effects) = match layer {
        AmbientLayer::DeepSpace => (deep_space(voice), Vec::new()),
        AmbientLayer::EarthHum => (earth_hum(voice, rng), Vec::new()),
        AmbientLayer::CosmicWind => (cosmic_wind(voice, rng), Vec::new()),
        AmbientLayer::CrystalResonance => crystal_resonance(voice, now, generation, rng),
        AmbientLayer::AncientEchoes => (ancient_echoes(voice, sample_rate, rng), Vec::new()),
        AmbientLayer::QuantumFlux => quantum_flux(voice, now, generation, rng),
    };

    let mut voice = voice;
    voice.start(now);
    LayerBuild { voice, effects }
}

fn deep_space(voice: Voice) -> Voice {
    const DRONES: [(f32, f32); 3] = [(40.0, 0.10), (55.0, 0.13), (73.42, 0.17)];
    const DRIFT_HZ: f32 = 2.0;

    DRONES
        .iter()
        .enumerate()
        .fold(voice, |voice, (index, &(hz, rate))| {
            voice
                .with_chain(
                    Chain::osc(OscNode::sine(hz))
                        .with_filter(FilterNode::lowpass(200.0))
                        .with_gain(0.15),
                )
                .with_modulator(
                    Modulator::new(LfoNode::sine(rate), DRIFT_HZ)
                        .with_target(ModTarget::frequency(index)),
                )
        })
}

fn earth_hum<R: Rng + ?Sized>(voice: Voice, rng: &mut R) -> Voice {
    voice
        .with_chain(
            Chain::noise(NoiseNode::brown(rng.gen()))
                .with_filter(FilterNode::bandpass(100.0, 2.0))
                .with_gain(0.5),
        )
        .with_chain(Chain::osc(OscNode::sine(68.05)).with_gain(0.1))
}

fn cosmic_wind<R: Rng + ?Sized>(voice: Voice, rng: &mut R) -> Voice {
    voice
        .with_chain(
            Chain::noise(NoiseNode::white(rng.gen()))
                .with_filter(FilterNode::bandpass(800.0, 1.0))
                .with_gain(0.25),
        )
        .with_modulator(Modulator::new(LfoNode::sine(0.2), 600.0).with_target(ModTarget::cutoff(0)))
}

fn crystal_resonance<R: Rng + ?Sized>(
    voice: Voice,
    now: f64,
    generation: u64,
    rng: &mut R,
) -> (Voice, Vec<RetriggerEffect>) {
    let voice = voice
        .with_chain(Chain::osc(OscNode::sine(2093.0)).with_gain(0.01).with_pan(-0.5))
        .with_chain(Chain::osc(OscNode::sine(2099.0)).with_gain(0.01).with_pan(0.5));

    let effects = CHIME_FREQUENCIES
        .iter()
        .map(|&hz| {
            let first = now + rng.gen_range(0.0..CHIME_REST.1);
            RetriggerEffect::chime(AmbientLayer::CrystalResonance, generation, hz, first)
        })
        .collect();
    (voice, effects)
}

fn ancient_echoes<R: Rng + ?Sized>(voice: Voice, sample_rate: f32, rng: &mut R) -> Voice {
    let reverb = ConvolverNode::synthetic(
        sample_rate,
        ECHO_IR_SECONDS,
        ECHO_IR_DECAY,
        CONVOLUTION_PARTITION,
        rng,
    );
    voice.with_chain(
        Chain::noise(NoiseNode::pink(rng.gen()))
            .with_filter(FilterNode::lowpass(400.0))
            .with_effect(reverb)
            .with_gain(0.3),
    )
}

fn quantum_flux<R: Rng + ?Sized>(
    voice: Voice,
    now: f64,
    generation: u64,
    rng: &mut R,
) -> (Voice, Vec<RetriggerEffect>) {
    let mut voice = voice;
    let mut effects = Vec::with_capacity(FLUX_OSCILLATORS);
    for chain in 0..FLUX_OSCILLATORS {
        let waveform = Waveform::ALL[rng.gen_range(0..Waveform::ALL.len())];
        let hz = rng.gen_range(FLUX_FREQUENCY.0..FLUX_FREQUENCY.1);
        let pan = rng.gen_range(-1.0..=1.0);
        voice = voice.with_chain(
            Chain::osc(OscNode::new(waveform, hz))
                .with_gain(0.0)
                .with_pan(pan),
        );
        let first = now + rng.gen_range(GLITCH_REST.0..GLITCH_REST.1);
        effects.push(RetriggerEffect::glitch(
            AmbientLayer::QuantumFlux,
            generation,
            chain,
            first,
        ));
    }
    (voice, effects)
}
