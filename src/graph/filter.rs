use crate::{
    dsp::filter::{FilterType, SVFilter, BUTTERWORTH_Q},
    graph::node::{GraphNode, Modulatable, RenderCtx},
};

/*
State-Variable Filter Node
==========================

Shapes noise and drones into the ambient textures:

  Lowpass   keeps the body, drops the hiss: deep space drones (200 Hz),
            ancient echoes before the reverb (400 Hz)
  Bandpass  a resonant window into noise: earth hum (~100 Hz),
            cosmic wind (800 Hz center, swept by an LFO)

Cutoff and Q are modulatable. The base value is what the node was built
with; modulation is added on top and clamped to [20 Hz, 20 kHz]:

  FilterNode::bandpass(800.0, 1.0)     // wind, 200..1400 Hz with depth 600
*/

#[derive(Clone, Copy, Debug)]
pub enum FilterParam {
    Cutoff,
    Q,
}

pub struct FilterNode {
    filter: SVFilter,
    base_cutoff: f32,
    base_q: f32,
}

impl FilterNode {
    pub fn new(filter_type: FilterType, cutoff_hz: f32, q: f32) -> Self {
        Self {
            filter: SVFilter::new(filter_type, cutoff_hz, q),
            base_cutoff: cutoff_hz,
            base_q: q,
        }
    }

    pub fn lowpass(cutoff_hz: f32) -> Self {
        Self::new(FilterType::LowPass, cutoff_hz, BUTTERWORTH_Q)
    }

    pub fn highpass(cutoff_hz: f32) -> Self {
        Self::new(FilterType::HighPass, cutoff_hz, BUTTERWORTH_Q)
    }

    pub fn bandpass(cutoff_hz: f32, q: f32) -> Self {
        Self::new(FilterType::BandPass, cutoff_hz, q)
    }

    pub fn filter_type(&self) -> FilterType {
        self.filter.filter_type()
    }

    /// Cutoff currently in effect, including modulation.
    pub fn cutoff(&self) -> f32 {
        self.filter.cutoff()
    }
}

impl Modulatable for FilterNode {
    type Param = FilterParam;

    fn get_param(&self, param: Self::Param) -> f32 {
        match param {
            FilterParam::Cutoff => self.base_cutoff,
            FilterParam::Q => self.base_q,
        }
    }

    fn apply_modulation(&mut self, param: Self::Param, base: f32, modulation: f32) {
        let final_value = base + modulation;
        match param {
            FilterParam::Cutoff => {
                self.base_cutoff = base;
                self.filter.set_cutoff(final_value.clamp(20.0, 20_000.0));
            }
            FilterParam::Q => {
                self.base_q = base;
                self.filter.set_q(final_value.clamp(0.1, 30.0));
            }
        }
    }
}

impl GraphNode for FilterNode {
    fn render_block(&mut self, out: &mut [f32], ctx: &RenderCtx) {
        self.filter.render(out, ctx.sample_rate);
    }
}
