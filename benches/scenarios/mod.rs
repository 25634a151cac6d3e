//! Engine-level scenario benchmarks.
//!
//! These drive the manager the way a host would: start sounds, then pull
//! blocks through the mixer.

mod layers;
mod mix;

pub use layers::bench_layers;
pub use mix::bench_mix;
