//! Block-rate parameter modulation.

/*
Modulation
==========

A slow control signal (an LFO in [-1, +1]) moves a parameter around its base
value:

    modulated = base + modulator × depth

    deep space drones    LFO → oscillator frequency   (a few Hz of drift)
    cosmic wind          LFO → band-pass center       (hundreds of Hz of gusting)
    Schumann shimmer     one LFO → every oscillator's frequency

Modulation is applied once per render block. The LFO block is rendered in
full and averaged so the value represents the middle of the block rather
than its first sample. LFOs here run well under 1 Hz, so at 128 samples per
block (2.7 ms at 48 kHz) there are thousands of updates per cycle.

The target clamps the result into its own valid range: oscillators to
[0, Nyquist], filters to [20 Hz, 20 kHz].
*/

/// base + modulator × depth
#[inline]
pub fn apply_modulation(base_value: f32, modulator: f32, depth: f32) -> f32 {
    base_value + (modulator * depth)
}

/// Mean of a block of modulator samples.
#[inline]
pub fn block_average(samples: &[f32]) -> f32 {
    if samples.is_empty() {
        return 0.0;
    }
    samples.iter().sum::<f32>() / samples.len() as f32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn modulation_swings_around_base() {
        assert_eq!(apply_modulation(800.0, 0.0, 600.0), 800.0);
        assert_eq!(apply_modulation(800.0, 1.0, 600.0), 1400.0);
        assert_eq!(apply_modulation(800.0, -1.0, 600.0), 200.0);
        assert_eq!(apply_modulation(800.0, 0.5, 600.0), 1100.0);
    }

    #[test]
    fn block_average_of_ramp() {
        assert_eq!(block_average(&[1.0, 2.0, 3.0, 4.0]), 2.5);
        assert_eq!(block_average(&[0.5]), 0.5);
    }

    #[test]
    fn block_average_empty() {
        let samples: [f32; 0] = [];
        assert_eq!(block_average(&samples), 0.0);
    }
}
