//! FFT-partitioned convolution and synthetic impulse responses.

/*
Uniform Partitioned Convolution
===============================

Convolving with a multi-second impulse response sample-by-sample would cost
hundreds of thousands of multiplies per sample. Instead the IR is cut into
partitions of B samples, each transformed once up front (FFT size 2B):

    IR:   [ h0 | h1 | h2 | ... | hP-1 ]      H_p = FFT(h_p ++ zeros(B))

Input is collected in blocks of B. Each completed block is transformed
together with the block before it (overlap-save) and pushed onto a
frequency-domain delay line. The output block is

    Y = Σ_p  X[now - p] · H_p
    y = last B samples of IFFT(Y)

so every input block meets every IR partition exactly once. Output lags the
input by exactly B samples; all buffers are allocated at construction and
`process` never allocates.
*/

use std::sync::Arc;

use rand::Rng;
use rustfft::{num_complex::Complex, Fft, FftPlanner};

/// Decaying noise burst: `(uniform[-1, 1]) × (1 - i/len)^decay` per channel sample.
pub fn synthetic_impulse_response<R: Rng + ?Sized>(
    sample_rate: f32,
    seconds: f32,
    decay: f32,
    rng: &mut R,
) -> Vec<f32> {
    let len = (sample_rate * seconds).max(1.0) as usize;
    (0..len)
        .map(|i| {
            let envelope = (1.0 - i as f32 / len as f32).powf(decay);
            rng.gen_range(-1.0f32..=1.0) * envelope
        })
        .collect()
}

pub struct PartitionedConvolver {
    block: usize,
    fft: Arc<dyn Fft<f32>>,
    ifft: Arc<dyn Fft<f32>>,
    ir_spectra: Vec<Vec<Complex<f32>>>,
    /// Input spectra, newest at `fdl_head`.
    fdl: Vec<Vec<Complex<f32>>>,
    fdl_head: usize,
    /// Previous and current input blocks back to back (2B).
    window: Vec<f32>,
    accumulator: Vec<Complex<f32>>,
    scratch: Vec<Complex<f32>>,
    output: Vec<f32>,
    position: usize,
}

impl PartitionedConvolver {
    pub fn new(impulse_response: &[f32], block: usize) -> Self {
        let block = block.max(1);
        let size = 2 * block;

        let mut planner = FftPlanner::new();
        let fft = planner.plan_fft_forward(size);
        let ifft = planner.plan_fft_inverse(size);
        let scratch_len = fft
            .get_inplace_scratch_len()
            .max(ifft.get_inplace_scratch_len());
        let mut scratch = vec![Complex::new(0.0, 0.0); scratch_len];

        let ir_spectra: Vec<Vec<Complex<f32>>> = impulse_response
            .chunks(block)
            .map(|chunk| {
                let mut spectrum = vec![Complex::new(0.0, 0.0); size];
                for (bin, &h) in spectrum.iter_mut().zip(chunk) {
                    bin.re = h;
                }
                fft.process_with_scratch(&mut spectrum, &mut scratch);
                spectrum
            })
            .collect();

        let partitions = ir_spectra.len().max(1);

        Self {
            block,
            fft,
            ifft,
            ir_spectra,
            fdl: vec![vec![Complex::new(0.0, 0.0); size]; partitions],
            fdl_head: 0,
            window: vec![0.0; size],
            accumulator: vec![Complex::new(0.0, 0.0); size],
            scratch,
            output: vec![0.0; block],
            position: 0,
        }
    }

    /// Samples of delay between input and output.
    pub fn latency(&self) -> usize {
        self.block
    }

    pub fn partitions(&self) -> usize {
        self.ir_spectra.len()
    }

    /// Convolve `buffer` in place.
    pub fn process(&mut self, buffer: &mut [f32]) {
        for sample in buffer.iter_mut() {
            self.window[self.block + self.position] = *sample;
            *sample = self.output[self.position];
            self.position += 1;

            if self.position == self.block {
                self.position = 0;
                self.process_block();
            }
        }
    }

    fn process_block(&mut self) {
        let size = 2 * self.block;
        let partitions = self.fdl.len();

        self.fdl_head = (self.fdl_head + 1) % partitions;
        let head = &mut self.fdl[self.fdl_head];
        for (bin, &x) in head.iter_mut().zip(&self.window) {
            *bin = Complex::new(x, 0.0);
        }
        self.fft.process_with_scratch(head, &mut self.scratch);

        self.accumulator.fill(Complex::new(0.0, 0.0));
        for (p, h) in self.ir_spectra.iter().enumerate() {
            let x = &self.fdl[(self.fdl_head + partitions - p) % partitions];
            for ((acc, &xb), &hb) in self.accumulator.iter_mut().zip(x).zip(h) {
                *acc += xb * hb;
            }
        }

        self.ifft
            .process_with_scratch(&mut self.accumulator, &mut self.scratch);

        let norm = 1.0 / size as f32;
        for (out, y) in self.output.iter_mut().zip(&self.accumulator[self.block..]) {
            *out = y.re * norm;
        }

        // slide: the current block becomes the previous one
        self.window.copy_within(self.block.., 0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn direct_convolution(input: &[f32], ir: &[f32]) -> Vec<f32> {
        let mut out = vec![0.0; input.len()];
        for n in 0..input.len() {
            for (k, &h) in ir.iter().enumerate() {
                if k <= n {
                    out[n] += input[n - k] * h;
                }
            }
        }
        out
    }

    #[test]
    fn impulse_reproduces_the_ir_after_latency() {
        let ir = [1.0, 0.5, 0.25, -0.5, 0.1];
        let mut conv = PartitionedConvolver::new(&ir, 4);

        let mut buffer = vec![0.0; 16];
        buffer[0] = 1.0;
        conv.process(&mut buffer);

        let latency = conv.latency();
        for (k, &h) in ir.iter().enumerate() {
            assert!(
                (buffer[latency + k] - h).abs() < 1e-5,
                "tap {k}: expected {h}, got {}",
                buffer[latency + k]
            );
        }
        assert!(buffer[..latency].iter().all(|s| s.abs() < 1e-6));
    }

    #[test]
    fn matches_direct_convolution_across_partitions() {
        let mut rng = StdRng::seed_from_u64(5);
        let ir = synthetic_impulse_response(1_000.0, 0.05, 2.0, &mut rng);
        let input: Vec<f32> = (0..256).map(|_| rng.gen_range(-1.0..=1.0)).collect();

        let mut conv = PartitionedConvolver::new(&ir, 16);
        assert!(conv.partitions() > 1);

        // feed in uneven chunks to cross block boundaries
        let mut output = input.clone();
        for chunk in output.chunks_mut(7) {
            conv.process(chunk);
        }

        let expected = direct_convolution(&input, &ir);
        let latency = conv.latency();
        for n in 0..(input.len() - latency) {
            assert!(
                (output[n + latency] - expected[n]).abs() < 1e-3,
                "sample {n}: expected {}, got {}",
                expected[n],
                output[n + latency]
            );
        }
    }

    #[test]
    fn synthetic_ir_decays() {
        let mut rng = StdRng::seed_from_u64(1);
        let ir = synthetic_impulse_response(48_000.0, 1.0, 2.0, &mut rng);
        assert_eq!(ir.len(), 48_000);

        let energy = |s: &[f32]| s.iter().map(|x| x * x).sum::<f32>();
        let head = energy(&ir[..4_800]);
        let tail = energy(&ir[ir.len() - 4_800..]);
        assert!(head > tail * 100.0, "head={head}, tail={tail}");
    }
}
