use rand::Rng;

use crate::dsp::convolution::{synthetic_impulse_response, PartitionedConvolver};
use crate::graph::node::{GraphNode, RenderCtx};

/// Convolution reverb, fully wet.
pub struct ConvolverNode {
    convolver: PartitionedConvolver,
}

impl ConvolverNode {
    pub fn new(impulse_response: &[f32], partition: usize) -> Self {
        Self {
            convolver: PartitionedConvolver::new(impulse_response, partition),
        }
    }

    /// Reverb from a decaying noise burst instead of a recorded space.
    pub fn synthetic<R: Rng + ?Sized>(
        sample_rate: f32,
        seconds: f32,
        decay: f32,
        partition: usize,
        rng: &mut R,
    ) -> Self {
        let ir = synthetic_impulse_response(sample_rate, seconds, decay, rng);
        Self::new(&ir, partition)
    }

    pub fn latency(&self) -> usize {
        self.convolver.latency()
    }
}

impl GraphNode for ConvolverNode {
    fn render_block(&mut self, out: &mut [f32], _ctx: &RenderCtx) {
        self.convolver.process(out);
    }
}
