//! Spectrum and waveform capture for visualization.

use std::f32::consts::TAU;
use std::sync::Arc;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use rustfft::{num_complex::Complex, Fft, FftPlanner};

use crate::config::analyser::{MAX_DB, MIN_DB};

/// Read-only telemetry for visuals.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct VisualizationData {
    /// `fft_size / 2` bins, dB mapped from [MIN_DB, MAX_DB] to [0, 1].
    pub frequency: Vec<f32>,
    /// The last `fft_size` output samples, oldest first.
    pub waveform: Vec<f32>,
    /// Mean of the squared normalized bins.
    pub energy: f32,
    /// Frequency of the loudest bin, in Hz. Zero when silent.
    pub dominant_frequency: f32,
}

/// Windowed FFT over the most recent output, with smoothing between frames.
///
/// A frame is analysed every `fft_size / 2` pushed samples. Magnitudes are
/// smoothed in the linear domain before conversion to dB.
pub struct Analyser {
    fft_size: usize,
    smoothing: f32,
    fft: Arc<dyn Fft<f32>>,
    window: Vec<f32>,
    ring: Vec<f32>,
    write: usize,
    since_frame: usize,
    input: Vec<Complex<f32>>,
    scratch: Vec<Complex<f32>>,
    smoothed: Vec<f32>,
}

impl Analyser {
    pub fn new(fft_size: usize, smoothing: f32) -> Self {
        let fft_size = fft_size.max(2);
        let mut planner = FftPlanner::new();
        let fft = planner.plan_fft_forward(fft_size);
        let scratch = vec![Complex::new(0.0, 0.0); fft.get_inplace_scratch_len()];

        // Hann window
        let window = (0..fft_size)
            .map(|i| 0.5 * (1.0 - (TAU * i as f32 / fft_size as f32).cos()))
            .collect();

        Self {
            fft_size,
            smoothing: smoothing.clamp(0.0, 0.99),
            fft,
            window,
            ring: vec![0.0; fft_size],
            write: 0,
            since_frame: 0,
            input: vec![Complex::new(0.0, 0.0); fft_size],
            scratch,
            smoothed: vec![0.0; fft_size / 2],
        }
    }

    pub fn fft_size(&self) -> usize {
        self.fft_size
    }

    pub fn push(&mut self, samples: &[f32]) {
        let hop = self.fft_size / 2;
        for &sample in samples {
            self.ring[self.write] = sample;
            self.write = (self.write + 1) % self.fft_size;
            self.since_frame += 1;
            if self.since_frame >= hop {
                self.since_frame = 0;
                self.analyse();
            }
        }
    }

    fn analyse(&mut self) {
        let n = self.fft_size;
        for (i, bin) in self.input.iter_mut().enumerate() {
            let sample = self.ring[(self.write + i) % n];
            *bin = Complex::new(sample * self.window[i], 0.0);
        }
        self.fft.process_with_scratch(&mut self.input, &mut self.scratch);

        let norm = 1.0 / n as f32;
        let tau = self.smoothing;
        for (smoothed, bin) in self.smoothed.iter_mut().zip(&self.input) {
            *smoothed = tau * *smoothed + (1.0 - tau) * bin.norm() * norm;
        }
    }

    /// Normalized spectrum: 0.0 at or below `MIN_DB`, 1.0 at or above `MAX_DB`.
    pub fn frequency_data(&self) -> Vec<f32> {
        self.smoothed
            .iter()
            .map(|&magnitude| {
                if magnitude <= 0.0 {
                    return 0.0;
                }
                let db = 20.0 * magnitude.log10();
                ((db - MIN_DB) / (MAX_DB - MIN_DB)).clamp(0.0, 1.0)
            })
            .collect()
    }

    pub fn waveform_data(&self) -> Vec<f32> {
        let n = self.fft_size;
        (0..n).map(|i| self.ring[(self.write + i) % n]).collect()
    }

    pub fn snapshot(&self, sample_rate: f32) -> VisualizationData {
        let frequency = self.frequency_data();
        let waveform = self.waveform_data();

        let energy = if frequency.is_empty() {
            0.0
        } else {
            frequency.iter().map(|v| v * v).sum::<f32>() / frequency.len() as f32
        };

        let dominant_frequency = frequency
            .iter()
            .enumerate()
            .filter(|(_, &v)| v > 0.0)
            .max_by(|a, b| a.1.total_cmp(b.1))
            .map(|(bin, _)| bin as f32 * sample_rate / self.fft_size as f32)
            .unwrap_or(0.0);

        VisualizationData {
            frequency,
            waveform,
            energy,
            dominant_frequency,
        }
    }
}
