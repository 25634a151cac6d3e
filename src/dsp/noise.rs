//! Colored noise generators.

/*
Noise Colors
============

  white   flat spectrum: independent uniform samples in [-1, 1]
  pink    -3 dB/octave: equal energy per octave, like rain or surf
  brown   -6 dB/octave: leaky integral of white noise, a deep rumble

Pink noise uses Paul Kellett's refined filter: seven first-order sections
fed by the same white sample, summed and scaled back to roughly unit peak.
Brown noise leaks its integrator (divide by 1.02) so it cannot drift away,
then gets a fixed make-up gain.
*/

use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NoiseColor {
    White,
    Pink,
    Brown,
}

impl fmt::Display for NoiseColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            NoiseColor::White => "white",
            NoiseColor::Pink => "pink",
            NoiseColor::Brown => "brown",
        })
    }
}

const PINK_GAIN: f32 = 0.11;
const BROWN_GAIN: f32 = 3.5;

pub struct NoiseGenerator {
    color: NoiseColor,
    rng: StdRng,
    pink: [f32; 7],
    brown: f32,
}

impl NoiseGenerator {
    pub fn new(color: NoiseColor, seed: u64) -> Self {
        Self {
            color,
            rng: StdRng::seed_from_u64(seed),
            pink: [0.0; 7],
            brown: 0.0,
        }
    }

    pub fn color(&self) -> NoiseColor {
        self.color
    }

    #[inline]
    pub fn next_sample(&mut self) -> f32 {
        let white: f32 = self.rng.gen_range(-1.0..=1.0);
        match self.color {
            NoiseColor::White => white,
            NoiseColor::Pink => {
                let b = &mut self.pink;
                b[0] = 0.99886 * b[0] + white * 0.0555179;
                b[1] = 0.99332 * b[1] + white * 0.0750759;
                b[2] = 0.96900 * b[2] + white * 0.1538520;
                b[3] = 0.86650 * b[3] + white * 0.3104856;
                b[4] = 0.55000 * b[4] + white * 0.5329522;
                b[5] = -0.7616 * b[5] - white * 0.0168980;
                let out = b[0] + b[1] + b[2] + b[3] + b[4] + b[5] + b[6] + white * 0.5362;
                b[6] = white * 0.115926;
                out * PINK_GAIN
            }
            NoiseColor::Brown => {
                self.brown = (self.brown + 0.02 * white) / 1.02;
                self.brown * BROWN_GAIN
            }
        }
    }

    pub fn render(&mut self, out: &mut [f32]) {
        for sample in out.iter_mut() {
            *sample = self.next_sample();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn noise_buffer(color: NoiseColor, sample_rate: f32, seconds: f32, seed: u64) -> Vec<f32> {
        let mut buffer = vec![0.0; (sample_rate * seconds) as usize];
        NoiseGenerator::new(color, seed).render(&mut buffer);
        buffer
    }

    fn rms(buffer: &[f32]) -> f32 {
        (buffer.iter().map(|s| s * s).sum::<f32>() / buffer.len() as f32).sqrt()
    }

    /// Mean absolute difference between neighbours: high for bright noise.
    fn roughness(buffer: &[f32]) -> f32 {
        buffer.windows(2).map(|w| (w[1] - w[0]).abs()).sum::<f32>() / buffer.len() as f32
    }

    #[test]
    fn every_color_is_bounded_and_audible() {
        for color in [NoiseColor::White, NoiseColor::Pink, NoiseColor::Brown] {
            let buffer = noise_buffer(color, 48_000.0, 1.0, 11);
            assert!(buffer.iter().all(|s| s.abs() <= 1.5), "{color} too hot");
            assert!(rms(&buffer) > 0.01, "{color} is silent");
        }
    }

    #[test]
    fn darker_colors_are_smoother() {
        let white = noise_buffer(NoiseColor::White, 48_000.0, 0.5, 3);
        let pink = noise_buffer(NoiseColor::Pink, 48_000.0, 0.5, 3);
        let brown = noise_buffer(NoiseColor::Brown, 48_000.0, 0.5, 3);

        let (w, p, b) = (
            roughness(&white) / rms(&white),
            roughness(&pink) / rms(&pink),
            roughness(&brown) / rms(&brown),
        );
        assert!(w > p && p > b, "white={w}, pink={p}, brown={b}");
    }

    #[test]
    fn same_seed_same_noise() {
        let a = noise_buffer(NoiseColor::Pink, 48_000.0, 0.01, 99);
        let b = noise_buffer(NoiseColor::Pink, 48_000.0, 0.01, 99);
        assert_eq!(a, b);
    }
}
