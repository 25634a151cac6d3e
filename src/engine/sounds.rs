#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{
    ambient::AmbientLayer,
    catalog::{AlertLevel, BinauralPreset, EventOptions, EventSound, SacredFrequency},
    config::{
        ambient::CHIME_PEAK,
        envelope::{BINAURAL_FADE, DECAY_FLOOR, PULSE_SPACING, SCHUMANN_FADE},
        levels::{
            ALERT_PEAK, BINAURAL_PEAK, EVENT_PEAK, SACRED_HARMONICS, SACRED_HARMONIC_BUS,
            SACRED_PEAK, SCHUMANN_PEAK, TONE_PEAK,
        },
    },
    dsp::{oscillator::Waveform, param::Param},
    engine::Category,
    graph::{LfoNode, Modulator, OscNode},
    synth::{Chain, ModTarget, Voice, VoiceId},
};

/*
Sound builders
==============

Each `play_*` call turns into one of these: a pure function from a catalog
entry and the current time to a fully scheduled `Voice`. Nothing here
touches the registry or the mixer.

Two envelope shapes cover everything:

  sustained   0 ──fade in──→ peak ─────────── peak ──fade out──→ 0
              now          now+in         end-out              end

  pulse train ┌──┐    ┌──┐    ┌──┐          length  = duration / pulses
              │  │    │  │    │  │          spacing = 1.1 × length
              ┘  └────┘  └────┘  └──        (hard edges, or an exponential
                                             decay to 0.001 over each pulse)
*/

/// Fades for a sacred tone.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SacredOptions {
    pub fade_in: f64,
    pub fade_out: f64,
}

impl Default for SacredOptions {
    fn default() -> Self {
        Self {
            fade_in: 0.1,
            fade_out: 0.1,
        }
    }
}

/// Fades for a plain tone.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ToneEnvelope {
    pub fade_in: f64,
    pub fade_out: f64,
}

impl Default for ToneEnvelope {
    fn default() -> Self {
        Self {
            fade_in: 0.01,
            fade_out: 0.1,
        }
    }
}

/// LFO applied to every oscillator of a Schumann voice.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Modulation {
    /// LFO rate in Hz.
    pub rate: f32,
    /// Peak frequency deviation in Hz.
    pub depth: f32,
}

/// Relative gains of the Schumann harmonics above the fundamental.
const SCHUMANN_HARMONIC_GAINS: [f32; 4] = [0.5, 0.3, 0.2, 0.1];

/// Envelope rising from 0 to `peak` at `now`, and back to 0 at `now + duration`.
pub fn sustained_envelope(
    now: f64,
    peak: f32,
    fade_in: f64,
    duration: Option<f64>,
    fade_out: f64,
) -> Param {
    let mut fade_in = fade_in.max(0.0);
    if let Some(duration) = duration {
        fade_in = fade_in.min(duration.max(0.0));
    }

    let mut envelope = Param::new(0.0);
    envelope.set_value_at(0.0, now);
    if fade_in > 0.0 {
        envelope.linear_ramp_to(peak, now + fade_in);
    } else {
        envelope.set_value_at(peak, now);
    }

    if let Some(duration) = duration {
        let end = now + duration.max(0.0);
        let release = (end - fade_out.max(0.0)).max(now + fade_in);
        envelope.set_value_at(peak, release);
        envelope.linear_ramp_to(0.0, end);
    }
    envelope
}

/// Start and length of each pulse in a train.
pub fn pulse_times(now: f64, duration: f64, pulses: u32) -> impl Iterator<Item = (f64, f64)> {
    let pulses = pulses.max(1);
    let length = duration.max(0.0) / pulses as f64;
    let spacing = PULSE_SPACING * length;
    (0..pulses).map(move |i| (now + i as f64 * spacing, length))
}

/// One chain per pulse per partial; the chain gain carries the pulse shape.
#[allow(clippy::too_many_arguments)]
fn pulse_train(
    voice: Voice,
    waveform: Waveform,
    frequency: f32,
    harmonics: &[f32],
    now: f64,
    duration: f64,
    pulses: u32,
    peak: f32,
    fade: bool,
) -> (Voice, f64) {
    let mut voice = voice;
    let mut end = now;
    let partials = std::iter::once(1.0).chain(harmonics.iter().copied());

    for (start, length) in pulse_times(now, duration, pulses) {
        let stop = start + length;
        for multiple in partials.clone() {
            let level = peak / multiple;
            let mut gain = Param::new(0.0);
            gain.set_value_at(level, start);
            if fade {
                gain.exponential_ramp_to(DECAY_FLOOR.min(level), stop);
            } else {
                gain.set_value_at(0.0, stop);
            }

            let mut chain = Chain::osc(OscNode::new(waveform, frequency * multiple))
                .with_gain_param(gain)
                .starting_at(start);
            // a fresh source has never been stopped
            let _ = chain.stop(stop);
            voice = voice.with_chain(chain);
        }
        end = stop;
    }
    (voice, end)
}

pub fn sacred_voice(
    id: VoiceId,
    frequency: SacredFrequency,
    now: f64,
    duration: Option<f64>,
    options: SacredOptions,
) -> Voice {
    let hz = frequency.hz();
    let mut voice = Voice::new(id, Category::Sacred)
        .with_envelope(sustained_envelope(
            now,
            SACRED_PEAK,
            options.fade_in,
            duration,
            options.fade_out,
        ))
        .with_chain(Chain::osc(OscNode::sine(hz)))
        .with_chains(SACRED_HARMONICS.iter().map(|&(multiple, gain)| {
            Chain::osc(OscNode::sine(hz * multiple)).with_gain(gain * SACRED_HARMONIC_BUS)
        }));

    voice.start(now);
    if let Some(duration) = duration {
        voice.end_at(now + duration.max(0.0));
    }
    voice
}

pub fn binaural_voice(
    id: VoiceId,
    preset: BinauralPreset,
    now: f64,
    duration: Option<f64>,
) -> Voice {
    let mut voice = Voice::new(id, Category::Binaural)
        .with_envelope(sustained_envelope(
            now,
            BINAURAL_PEAK,
            BINAURAL_FADE,
            duration,
            BINAURAL_FADE,
        ))
        .with_chain(Chain::osc(OscNode::sine(preset.base())).with_pan(-1.0))
        .with_chain(Chain::osc(OscNode::sine(preset.base() + preset.beat())).with_pan(1.0));

    voice.start(now);
    if let Some(duration) = duration {
        voice.end_at(now + duration.max(0.0));
    }
    voice
}

pub fn schumann_voice(
    id: VoiceId,
    include_harmonics: bool,
    modulation: Option<Modulation>,
    now: f64,
) -> Voice {
    let mut voice = Voice::new(id, Category::Sacred)
        .with_envelope(sustained_envelope(now, SCHUMANN_PEAK, SCHUMANN_FADE, None, 0.0))
        .with_chain(Chain::osc(OscNode::sine(SacredFrequency::SchumannFundamental.hz())));

    if include_harmonics {
        voice = voice.with_chains(
            SacredFrequency::SCHUMANN_HARMONICS
                .iter()
                .zip(SCHUMANN_HARMONIC_GAINS)
                .map(|(harmonic, gain)| Chain::osc(OscNode::sine(harmonic.hz())).with_gain(gain)),
        );
    }

    if let Some(Modulation { rate, depth }) = modulation {
        let targets = (0..voice.chains().len()).map(ModTarget::frequency);
        voice = voice.with_modulator(Modulator::new(LfoNode::sine(rate), depth).with_targets(targets));
    }

    voice.start(now);
    voice
}

pub fn event_voice(id: VoiceId, sound: EventSound, options: EventOptions, now: f64) -> Voice {
    let preset = sound.preset();
    let options = options.sanitized();
    let (mut voice, end) = pulse_train(
        Voice::new(id, Category::Events),
        preset.waveform,
        preset.frequency * options.pitch,
        preset.harmonics,
        now,
        preset.duration,
        preset.pulses,
        EVENT_PEAK * options.volume,
        preset.fade,
    );
    voice.end_at(end);
    voice
}

pub fn alert_voice(id: VoiceId, level: AlertLevel, now: f64) -> Voice {
    let preset = level.preset();
    let (mut voice, end) = pulse_train(
        Voice::new(id, Category::Alerts),
        Waveform::Square,
        preset.frequency,
        &[],
        now,
        preset.duration,
        preset.pulses,
        ALERT_PEAK,
        false,
    );
    voice.end_at(end);
    voice
}

pub fn tone_voice(
    id: VoiceId,
    frequency: f32,
    duration: f64,
    waveform: Waveform,
    category: Category,
    envelope: ToneEnvelope,
    at: f64,
) -> Voice {
    let mut voice = Voice::new(id, category)
        .with_envelope(sustained_envelope(
            at,
            TONE_PEAK,
            envelope.fade_in,
            Some(duration),
            envelope.fade_out,
        ))
        .with_chain(Chain::osc(OscNode::new(waveform, frequency)));
    voice.start(at);
    voice.end_at(at + duration.max(0.0));
    voice
}

/// A single bell strike that rings out on its own.
pub fn chime_voice(id: VoiceId, layer: AmbientLayer, frequency: f32, at: f64, decay: f64) -> Voice {
    let mut envelope = Param::new(0.0);
    envelope.set_value_at(CHIME_PEAK, at);
    envelope.exponential_ramp_to(DECAY_FLOOR, at + decay);

    let mut voice = Voice::new(id, Category::Ambient)
        .with_layer(layer)
        .with_envelope(envelope)
        .with_chain(Chain::osc(OscNode::sine(frequency)));
    voice.start(at);
    voice.end_at(at + decay);
    voice
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::RenderCtx;
    use crate::synth::{SourceKind, VoiceKind};

    fn id(kind: VoiceKind) -> VoiceId {
        VoiceId::new(kind, "test", 0, 0)
    }

    #[test]
    fn sustained_envelope_shape() {
        let env = sustained_envelope(1.0, 0.3, 0.1, Some(1.0), 0.1);
        assert_eq!(env.value_at(1.0), 0.0);
        assert!((env.value_at(1.05) - 0.15).abs() < 1e-4);
        assert!((env.value_at(1.5) - 0.3).abs() < 1e-6);
        assert!((env.value_at(1.95) - 0.15).abs() < 1e-4);
        assert_eq!(env.value_at(2.0), 0.0);
    }

    #[test]
    fn short_durations_squeeze_the_fades() {
        let env = sustained_envelope(0.0, 1.0, 1.0, Some(0.5), 1.0);
        assert_eq!(env.value_at(0.5), 0.0);
        assert!(env.value_at(0.25) > 0.0);
    }

    #[test]
    fn pulses_are_spaced_ten_percent_apart() {
        let times: Vec<_> = pulse_times(0.0, 1.0, 5).collect();
        assert_eq!(times.len(), 5);
        for (i, &(start, length)) in times.iter().enumerate() {
            assert!((length - 0.2).abs() < 1e-12);
            assert!((start - i as f64 * 0.22).abs() < 1e-12);
        }
    }

    #[test]
    fn sacred_voice_has_fundamental_and_two_harmonics() {
        let voice = sacred_voice(
            id(VoiceKind::Sacred),
            SacredFrequency::SolfeggioMi,
            0.0,
            Some(1.0),
            SacredOptions::default(),
        );
        let info = voice.info();
        let freqs: Vec<_> = info.chains.iter().filter_map(|c| c.frequency).collect();
        assert_eq!(freqs, vec![528.0, 1056.0, 1584.0]);
        assert_eq!(info.ends_at, Some(1.0));
        assert!(info.chains.iter().all(|c| c.stop == Some(1.0)));
        assert_eq!(info.category, Category::Sacred);
    }

    #[test]
    fn binaural_pair_is_split_across_ears() {
        let info = binaural_voice(id(VoiceKind::Binaural), BinauralPreset::Theta, 0.0, None).info();
        assert_eq!(info.chains.len(), 2);
        assert_eq!((info.chains[0].pan, info.chains[0].frequency), (-1.0, Some(200.0)));
        assert_eq!((info.chains[1].pan, info.chains[1].frequency), (1.0, Some(206.0)));
        assert_eq!(info.ends_at, None);
    }

    #[test]
    fn schumann_modulation_reaches_every_oscillator() {
        let modulation = Modulation { rate: 0.5, depth: 1.0 };
        let full = schumann_voice(id(VoiceKind::Schumann), true, Some(modulation), 0.0).info();
        assert_eq!(full.chains.len(), 5);
        assert_eq!(full.modulators, 1);

        let bare = schumann_voice(id(VoiceKind::Schumann), false, None, 0.0).info();
        assert_eq!(bare.chains.len(), 1);
        assert_eq!(bare.modulators, 0);
    }

    #[test]
    fn event_harmonics_multiply_the_pulses() {
        // decrypt: 6 pulses, one harmonic
        let info = event_voice(id(VoiceKind::Event), EventSound::Decrypt, EventOptions::default(), 0.0).info();
        assert_eq!(info.chains.len(), 12);

        let pitched = event_voice(
            id(VoiceKind::Event),
            EventSound::NodeSelect,
            EventOptions::default().with_pitch(2.0),
            0.0,
        )
        .info();
        assert_eq!(pitched.chains[0].frequency, Some(1760.0));
    }

    #[test]
    fn critical_alert_is_five_square_pulses() {
        let info = alert_voice(id(VoiceKind::Alert), AlertLevel::Critical, 0.0).info();
        assert_eq!(info.chains.len(), 5);
        assert!(info
            .chains
            .iter()
            .all(|c| c.kind == SourceKind::Oscillator(Waveform::Square)));
        let last = &info.chains[4];
        assert!((last.start - 4.0 * 0.22).abs() < 1e-9);
        assert_eq!(info.ends_at, last.stop);
    }

    #[test]
    fn hard_pulses_are_silent_between_pulses() {
        let mut voice = alert_voice(id(VoiceKind::Alert), AlertLevel::Caution, 0.0);
        // caution: 2 pulses of 0.25 s, the second at 0.275 s
        let sr = 1_000.0;
        let mut left = vec![0.0; 400];
        let mut right = vec![0.0; 400];
        voice.render(&mut left, &mut right, &RenderCtx::new(sr, 0.0));
        assert!(left[10..240].iter().any(|s| s.abs() > 0.1));
        assert!(left[252..273].iter().all(|&s| s == 0.0));
        assert!(left[280..320].iter().any(|s| s.abs() > 0.1));
    }

    #[test]
    fn nan_event_options_play_the_preset() {
        let options = EventOptions {
            volume: f32::NAN,
            pitch: f32::NAN,
        };
        let mut voice = event_voice(id(VoiceKind::Event), EventSound::DataPulse, options, 0.0);
        let mut left = vec![0.0; 1024];
        let mut right = vec![0.0; 1024];
        voice.render(&mut left, &mut right, &RenderCtx::new(48_000.0, 0.0));
        assert!(left.iter().chain(right.iter()).all(|s| s.is_finite()));
        assert!(left.iter().any(|s| s.abs() > 0.0));
    }
}
