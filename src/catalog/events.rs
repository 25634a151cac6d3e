use std::{fmt, str::FromStr};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::catalog::{lookup, Catalog};
use crate::dsp::oscillator::Waveform;
use crate::engine::mixer::unit_volume;
use crate::error::EngineError;

/*
Event sounds
============

Short UI cues. Each preset is one tone, or a train of `pulses` equal tones
spaced 10 % apart, optionally thickened with harmonics at integer or
fractional multiples of the fundamental (each at 1/m gain).

  key               Hz     secs  wave      pulses  harmonics  decay
  nodeSelect        880    0.10  sine      1       -          yes
  connectionReveal  440    0.50  triangle  1       2, 3       yes
  dataPulse         1200   0.30  square    3       -          no
  discovery         528    1.50  sine      1       1.5, 2     yes
  glitch            150    0.20  sawtooth  4       -          no
  transmission      1000   0.80  sine      8       -          no
  decrypt           660    0.60  triangle  6       2          no
  warning           220    0.80  sawtooth  2       -          yes
*/

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EventPreset {
    pub frequency: f32,
    pub duration: f64,
    pub waveform: Waveform,
    pub pulses: u32,
    pub harmonics: &'static [f32],
    /// Exponential decay over each tone instead of hard on/off.
    pub fade: bool,
}

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize), serde(rename_all = "camelCase"))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventSound {
    NodeSelect,
    ConnectionReveal,
    DataPulse,
    Discovery,
    Glitch,
    Transmission,
    Decrypt,
    Warning,
}

impl EventSound {
    pub const ALL: [EventSound; 8] = [
        EventSound::NodeSelect,
        EventSound::ConnectionReveal,
        EventSound::DataPulse,
        EventSound::Discovery,
        EventSound::Glitch,
        EventSound::Transmission,
        EventSound::Decrypt,
        EventSound::Warning,
    ];

    pub fn name(self) -> &'static str {
        match self {
            EventSound::NodeSelect => "nodeSelect",
            EventSound::ConnectionReveal => "connectionReveal",
            EventSound::DataPulse => "dataPulse",
            EventSound::Discovery => "discovery",
            EventSound::Glitch => "glitch",
            EventSound::Transmission => "transmission",
            EventSound::Decrypt => "decrypt",
            EventSound::Warning => "warning",
        }
    }

    pub fn preset(self) -> EventPreset {
        let (frequency, duration, waveform, pulses, harmonics, fade): (_, _, _, _, &'static [f32], _) =
            match self {
                EventSound::NodeSelect => (880.0, 0.1, Waveform::Sine, 1, &[], true),
                EventSound::ConnectionReveal => (440.0, 0.5, Waveform::Triangle, 1, &[2.0, 3.0], true),
                EventSound::DataPulse => (1200.0, 0.3, Waveform::Square, 3, &[], false),
                EventSound::Discovery => (528.0, 1.5, Waveform::Sine, 1, &[1.5, 2.0], true),
                EventSound::Glitch => (150.0, 0.2, Waveform::Sawtooth, 4, &[], false),
                EventSound::Transmission => (1000.0, 0.8, Waveform::Sine, 8, &[], false),
                EventSound::Decrypt => (660.0, 0.6, Waveform::Triangle, 6, &[2.0], false),
                EventSound::Warning => (220.0, 0.8, Waveform::Sawtooth, 2, &[], true),
            };
        EventPreset {
            frequency,
            duration,
            waveform,
            pulses,
            harmonics,
            fade,
        }
    }
}

impl fmt::Display for EventSound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for EventSound {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        lookup(&Self::ALL, Self::name, Catalog::Event, s)
    }
}

/// Per-call adjustments to an event preset.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EventOptions {
    /// Gain multiplier, clamped to [0, 1]. Non-finite values play at full volume.
    pub volume: f32,
    /// Frequency multiplier. Non-finite values keep the preset pitch.
    pub pitch: f32,
}

impl Default for EventOptions {
    fn default() -> Self {
        Self {
            volume: 1.0,
            pitch: 1.0,
        }
    }
}

impl EventOptions {
    pub fn with_volume(mut self, volume: f32) -> Self {
        if let Some(volume) = unit_volume(volume) {
            self.volume = volume;
        }
        self
    }

    pub fn with_pitch(mut self, pitch: f32) -> Self {
        if pitch.is_finite() {
            self.pitch = pitch.max(0.0);
        }
        self
    }

    /// Volume and pitch with non-finite fields replaced by the defaults.
    pub fn sanitized(self) -> Self {
        let default = Self::default();
        Self {
            volume: unit_volume(self.volume).unwrap_or(default.volume),
            pitch: if self.pitch.is_finite() {
                self.pitch.max(0.0)
            } else {
                default.pitch
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn camel_case_keys_resolve() {
        assert_eq!("dataPulse".parse(), Ok(EventSound::DataPulse));
        assert_eq!("connectionReveal".parse(), Ok(EventSound::ConnectionReveal));
        assert!("nonexistent".parse::<EventSound>().is_err());
        assert!("datapulse".parse::<EventSound>().is_err());
    }

    #[test]
    fn presets_are_playable() {
        for sound in EventSound::ALL {
            let preset = sound.preset();
            assert!(preset.pulses >= 1, "{sound}");
            assert!(preset.duration > 0.0, "{sound}");
            assert!(preset.harmonics.iter().all(|&m| m > 1.0), "{sound}");
        }
    }

    #[test]
    fn non_finite_options_fall_back_to_defaults() {
        let options = EventOptions::default()
            .with_volume(0.3)
            .with_volume(f32::NAN)
            .with_pitch(f32::INFINITY);
        assert_eq!(options.volume, 0.3);
        assert_eq!(options.pitch, 1.0);

        let raw = EventOptions {
            volume: f32::NAN,
            pitch: f32::NAN,
        };
        assert_eq!(raw.sanitized(), EventOptions::default());
    }
}
