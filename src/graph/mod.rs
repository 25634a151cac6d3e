//! Render-ready nodes built on the DSP primitives.
//!
//! Sources (`OscNode`, `NoiseNode`, `LfoNode`) carry a start/stop lifecycle on
//! the audio clock through the [`Source`](node::Source) trait. Shaping nodes
//! (`FilterNode`, `ConvolverNode`) process a block in place. Everything
//! implements [`GraphNode`](node::GraphNode).

/// Convolution reverb node.
pub mod convolver;
/// Topology-preserving filter node with multiple responses.
pub mod filter;
/// Low frequency oscillators for parameter modulation.
pub mod lfo;
/// LFO fan-out to modulation targets.
pub mod modulate;
/// Colored noise sources.
pub mod noise;
/// Core traits shared by all graph nodes.
pub mod node;
/// Audio-band oscillators.
pub mod oscillator;

pub use convolver::ConvolverNode;
pub use filter::{FilterNode, FilterParam};
pub use lfo::LfoNode;
pub use modulate::Modulator;
pub use noise::NoiseNode;
pub use node::{GraphNode, Lifetime, Modulatable, RenderCtx, Source};
pub use oscillator::{OscNode, OscParam};
