use crate::dsp::oscillator::{OscillatorBlock, Waveform};
use crate::dsp::param::Param;
use crate::graph::node::{GraphNode, Lifetime, Modulatable, RenderCtx, Source};
use crate::MAX_BLOCK_SIZE;

/*
Audio Oscillator
================

The tonal source of every voice. Frequency is an automatable `Param`, so a
pulse train or a glitch burst can retune the oscillator at an exact time,
and an LFO can add a block-rate offset on top:

    frequency(t) = param(t) + modulation        clamped to [0, Nyquist]

Outside its [start, stop) window the oscillator writes silence and its phase
does not advance, so a source scheduled in the future starts from phase 0.

  Sine      pure tone: sacred frequencies, binaural carriers, drones
  Square    odd harmonics, hollow and hard: alerts, data pulses
  Sawtooth  every harmonic, bright and buzzy: glitches, warnings
  Triangle  odd harmonics falling off fast, soft: connection cues

Example:
  let mut osc = OscNode::new(Waveform::Sine, 528.0);
  osc.start(now);
  osc.stop(now + 1.0)?;
*/

pub struct OscNode {
    osc: OscillatorBlock,
    frequency: Param,
    modulation: f32,
    lifetime: Lifetime,
    freq_buffer: Vec<f32>,
}

/// Parameters that can be modulated on an oscillator
#[derive(Clone, Copy, Debug)]
pub enum OscParam {
    /// Oscillator frequency in Hz
    Frequency,
}

impl OscNode {
    pub fn new(waveform: Waveform, frequency: f32) -> Self {
        Self {
            osc: OscillatorBlock::new(waveform),
            frequency: Param::new(frequency),
            modulation: 0.0,
            lifetime: Lifetime::default(),
            freq_buffer: vec![0.0; MAX_BLOCK_SIZE],
        }
    }

    pub fn sine(frequency: f32) -> Self {
        Self::new(Waveform::Sine, frequency)
    }

    pub fn square(frequency: f32) -> Self {
        Self::new(Waveform::Square, frequency)
    }

    pub fn sawtooth(frequency: f32) -> Self {
        Self::new(Waveform::Sawtooth, frequency)
    }

    pub fn triangle(frequency: f32) -> Self {
        Self::new(Waveform::Triangle, frequency)
    }

    pub fn waveform(&self) -> Waveform {
        self.osc.waveform()
    }

    pub fn frequency(&self) -> &Param {
        &self.frequency
    }

    pub fn frequency_mut(&mut self) -> &mut Param {
        &mut self.frequency
    }
}

impl GraphNode for OscNode {
    fn render_block(&mut self, out: &mut [f32], ctx: &RenderCtx) {
        let len = out.len();
        let freqs = &mut self.freq_buffer[..len];
        self.frequency.render(freqs, ctx.time, ctx.sample_rate);

        let (from, to) = self.lifetime.active_range(ctx, len);
        let nyquist = ctx.sample_rate * 0.5;

        out[..from].fill(0.0);
        for (sample, &freq) in out[from..to].iter_mut().zip(&freqs[from..to]) {
            let hz = (freq + self.modulation).clamp(0.0, nyquist);
            *sample = self.osc.next_sample(hz, ctx.sample_rate);
        }
        out[to..].fill(0.0);
    }

    fn is_active(&self) -> bool {
        self.lifetime.stop_time().is_none()
    }
}

impl Source for OscNode {
    fn lifetime(&self) -> &Lifetime {
        &self.lifetime
    }

    fn lifetime_mut(&mut self) -> &mut Lifetime {
        &mut self.lifetime
    }
}

impl Modulatable for OscNode {
    type Param = OscParam;

    fn get_param(&self, param: Self::Param) -> f32 {
        match param {
            OscParam::Frequency => self.frequency.current(),
        }
    }

    /// The offset is kept separately so it rides on top of any automation.
    fn apply_modulation(&mut self, param: Self::Param, _base: f32, modulation: f32) {
        match param {
            OscParam::Frequency => self.modulation = modulation,
        }
    }
}
