//! Engine configuration and tuning constants.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::engine::{mixer::unit_volume, Category};
use crate::MAX_BLOCK_SIZE;

/// Envelope and fade timings (seconds)
pub mod envelope {
    /// Linear window used for every master/category volume change
    pub const VOLUME_RAMP: f64 = 0.05;

    /// Default fade in/out for sacred tones
    pub const SACRED_FADE: f64 = 0.1;

    /// Fade in/out for binaural pairs
    pub const BINAURAL_FADE: f64 = 1.0;

    /// Fade in for the Schumann voice
    pub const SCHUMANN_FADE: f64 = 2.0;

    /// Fade in for ambient layers
    pub const AMBIENT_FADE_IN: f64 = 3.0;

    /// Release applied when an ambient layer is stopped
    pub const AMBIENT_RELEASE: f64 = 0.5;

    /// Floor reached by exponential decays (exponential ramps cannot hit zero)
    pub const DECAY_FLOOR: f32 = 0.001;

    /// Share of a healing-sequence slot spent fading in and out
    pub const HEALING_FADE_RATIO: f64 = 0.1;

    /// Gap factor between pulses: onsets are `PULSE_SPACING * pulse_length` apart
    pub const PULSE_SPACING: f64 = 1.1;
}

/// Voice levels and harmonic balance
pub mod levels {
    /// Peak gain of a sacred fundamental
    pub const SACRED_PEAK: f32 = 0.3;

    /// Sub-gain the sacred harmonics are summed through
    pub const SACRED_HARMONIC_BUS: f32 = 0.3;

    /// Relative gains of the 2nd and 3rd sacred harmonics
    pub const SACRED_HARMONICS: [(f32, f32); 2] = [(2.0, 0.5), (3.0, 0.25)];

    /// Peak gain of each binaural oscillator
    pub const BINAURAL_PEAK: f32 = 0.25;

    /// Peak gain of the Schumann voice
    pub const SCHUMANN_PEAK: f32 = 0.4;

    /// Peak gain of one event pulse before `EventOptions::volume`
    pub const EVENT_PEAK: f32 = 0.3;

    /// Peak gain of one alert pulse
    pub const ALERT_PEAK: f32 = 0.4;

    /// Peak gain of a plain tone
    pub const TONE_PEAK: f32 = 0.3;
}

/// Analyser defaults
pub mod analyser {
    /// FFT window size for visualization
    pub const FFT_SIZE: usize = 2048;

    /// Exponential smoothing between analysis frames (0.0-1.0, higher = slower)
    pub const SMOOTHING: f32 = 0.8;

    /// Level mapped to 0.0 in the normalized spectrum
    pub const MIN_DB: f32 = -100.0;

    /// Level mapped to 1.0 in the normalized spectrum
    pub const MAX_DB: f32 = -30.0;
}

/// Ambient layer tuning
pub mod ambient {
    /// Overall gain of a running layer
    pub const LAYER_GAIN: f32 = 1.0;

    /// Synthetic impulse response length for ancient echoes (seconds)
    pub const ECHO_IR_SECONDS: f32 = 2.5;

    /// Decay exponent of the synthetic impulse response
    pub const ECHO_IR_DECAY: f32 = 2.0;

    /// Partition size of the convolution engine
    pub const CONVOLUTION_PARTITION: usize = 512;

    /// Chime partials (Hz)
    pub const CHIME_FREQUENCIES: [f32; 4] = [1046.5, 1318.5, 1568.0, 2093.0];

    /// Chime decay range (seconds)
    pub const CHIME_DECAY: (f64, f64) = (2.0, 4.0);

    /// Wait between chimes of one partial (seconds)
    pub const CHIME_REST: (f64, f64) = (2.0, 8.0);

    /// Peak gain of a chime strike
    pub const CHIME_PEAK: f32 = 0.1;

    /// Number of quantum-flux oscillators
    pub const FLUX_OSCILLATORS: usize = 5;

    /// Frequency range re-rolled by each glitch burst (Hz)
    pub const FLUX_FREQUENCY: (f32, f32) = (200.0, 2000.0);

    /// Glitch burst length range (seconds)
    pub const GLITCH_LENGTH: (f64, f64) = (0.05, 0.2);

    /// Wait between glitch bursts (seconds)
    pub const GLITCH_REST: (f64, f64) = (0.1, 2.0);

    /// Peak gain of a glitch burst
    pub const GLITCH_PEAK: f32 = 0.05;
}

/// Runtime configuration for an [`AudioManager`](crate::engine::AudioManager).
///
/// ```
/// use oracle_audio::config::EngineConfig;
///
/// let config = EngineConfig::default()
///     .with_block_size(256)
///     .with_seed(7)
///     .with_strict(true);
/// assert_eq!(config.block_size, 256);
/// ```
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    /// Render quantum: the scheduler and effects tick once per block.
    pub block_size: usize,
    pub fft_size: usize,
    pub smoothing: f32,
    /// Linear ramp window for master/category volume changes (seconds).
    pub volume_ramp: f64,
    pub master_volume: f32,
    /// Initial bus gains, indexed by [`Category::index`].
    pub category_volumes: [f32; Category::COUNT],
    /// Seed for every random choice the engine makes. `None` seeds from entropy.
    pub seed: Option<u64>,
    /// Record reported failures as [`Diagnostic`](crate::engine::Diagnostic)s.
    pub strict: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            block_size: 128,
            fft_size: analyser::FFT_SIZE,
            smoothing: analyser::SMOOTHING,
            volume_ramp: envelope::VOLUME_RAMP,
            master_volume: 0.7,
            category_volumes: [0.6, 0.4, 0.7, 0.5, 0.8],
            seed: None,
            strict: false,
        }
    }
}

impl EngineConfig {
    pub fn with_block_size(mut self, block_size: usize) -> Self {
        self.block_size = block_size.clamp(1, MAX_BLOCK_SIZE);
        self
    }

    /// FFT size is rounded up to a power of two (minimum 32).
    pub fn with_fft_size(mut self, fft_size: usize) -> Self {
        self.fft_size = fft_size.max(32).next_power_of_two();
        self
    }

    pub fn with_smoothing(mut self, smoothing: f32) -> Self {
        self.smoothing = smoothing.clamp(0.0, 0.99);
        self
    }

    pub fn with_volume_ramp(mut self, seconds: f64) -> Self {
        self.volume_ramp = seconds.max(0.0);
        self
    }

    /// Non-finite values leave the current volume in place.
    pub fn with_master_volume(mut self, volume: f32) -> Self {
        if let Some(volume) = unit_volume(volume) {
            self.master_volume = volume;
        }
        self
    }

    pub fn with_category_volume(mut self, category: Category, volume: f32) -> Self {
        if let Some(volume) = unit_volume(volume) {
            self.category_volumes[category.index()] = volume;
        }
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    pub fn category_volume(&self, category: Category) -> f32 {
        self.category_volumes[category.index()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_category_table() {
        let config = EngineConfig::default();
        assert_eq!(config.category_volume(Category::Sacred), 0.6);
        assert_eq!(config.category_volume(Category::Binaural), 0.4);
        assert_eq!(config.category_volume(Category::Events), 0.7);
        assert_eq!(config.category_volume(Category::Ambient), 0.5);
        assert_eq!(config.category_volume(Category::Alerts), 0.8);
        assert_eq!(config.master_volume, 0.7);
    }

    #[test]
    fn builders_clamp_out_of_range_values() {
        let config = EngineConfig::default()
            .with_block_size(0)
            .with_fft_size(1000)
            .with_master_volume(3.0)
            .with_category_volume(Category::Ambient, -1.0);

        assert_eq!(config.block_size, 1);
        assert_eq!(config.fft_size, 1024);
        assert_eq!(config.master_volume, 1.0);
        assert_eq!(config.category_volume(Category::Ambient), 0.0);
    }

    #[test]
    fn nan_volumes_keep_the_defaults() {
        let defaults = EngineConfig::default();
        let config = EngineConfig::default()
            .with_master_volume(f32::NAN)
            .with_category_volume(Category::Events, f32::NAN);

        assert_eq!(config.master_volume, defaults.master_volume);
        assert_eq!(
            config.category_volume(Category::Events),
            defaults.category_volume(Category::Events)
        );
    }
}
