//! Benchmarks for low-level DSP primitives.

mod convolution;
mod filter;
mod oscillator;
mod param;

pub use convolution::bench_convolution;
pub use filter::bench_filter;
pub use oscillator::bench_oscillator;
pub use param::bench_param;
