//! Low-level DSP primitives used by the graph nodes.
//!
//! Everything here works on caller-provided buffers and allocates only at
//! construction, so the primitives can live inside voices that are rendered
//! on the audio thread.

/// Spectrum and waveform capture for visualization.
pub mod analyser;
/// FFT-partitioned convolution and synthetic impulse responses.
pub mod convolution;
/// State-variable filter with multiple responses.
pub mod filter;
/// Gain, summing and equal-power panning.
pub mod mix;
/// Block-rate modulation helpers.
pub mod modulate;
/// White, pink and brown noise.
pub mod noise;
/// Phase-accumulator oscillators.
pub mod oscillator;
/// Automatable parameter timelines.
pub mod param;

pub use analyser::{Analyser, VisualizationData};
pub use noise::NoiseColor;
pub use oscillator::Waveform;
pub use param::Param;
