use crate::{
    dsp::oscillator::{OscillatorBlock, Waveform},
    graph::node::{GraphNode, Lifetime, RenderCtx, Source},
};

/*
LFO (Low Frequency Oscillator)
==============================

An oscillator at sub-audio rates whose output drives a parameter instead of
a speaker. Output is bipolar in [-1, +1]; the modulator scales it by depth.

  0.10 / 0.13 / 0.17 Hz   deep space drones drift against each other
  0.2 Hz                  cosmic wind gusts every five seconds
  user rate               Schumann shimmer

An LFO belongs to exactly one voice and is stopped with it. Once stopped it
outputs zero, so whatever it was modulating settles back to its base value.
*/

pub struct LfoNode {
    osc: OscillatorBlock,
    frequency: f32,
    lifetime: Lifetime,
}

impl LfoNode {
    pub fn new(waveform: Waveform, frequency: f32) -> Self {
        Self {
            osc: OscillatorBlock::new(waveform),
            frequency,
            lifetime: Lifetime::default(),
        }
    }

    pub fn sine(frequency: f32) -> Self {
        Self::new(Waveform::Sine, frequency)
    }

    pub fn triangle(frequency: f32) -> Self {
        Self::new(Waveform::Triangle, frequency)
    }

    pub fn frequency(&self) -> f32 {
        self.frequency
    }
}

impl GraphNode for LfoNode {
    fn render_block(&mut self, out: &mut [f32], ctx: &RenderCtx) {
        let (from, to) = self.lifetime.active_range(ctx, out.len());
        out[..from].fill(0.0);
        self.osc
            .render(&mut out[from..to], self.frequency, ctx.sample_rate);
        out[to..].fill(0.0);
    }

    fn is_active(&self) -> bool {
        self.lifetime.stop_time().is_none()
    }
}

impl Source for LfoNode {
    fn lifetime(&self) -> &Lifetime {
        &self.lifetime
    }

    fn lifetime_mut(&mut self) -> &mut Lifetime {
        &mut self.lifetime
    }
}
