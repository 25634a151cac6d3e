use crate::{
    dsp::modulate::{apply_modulation, block_average},
    graph::lfo::LfoNode,
    graph::node::{GraphNode, RenderCtx, Source},
    MAX_BLOCK_SIZE,
};

/*
Modulator
=========

An LFO with a depth and a list of targets. Each block the LFO is rendered,
averaged, and scaled by depth; the owner then hands that one offset to every
target. One modulator can therefore drive several parameters in lockstep
(the Schumann shimmer moves all of its oscillators together), while voices
that want independent drift simply own one modulator per target.

    offset = average(lfo block) × depth
    target = base + offset
*/

pub struct Modulator<T> {
    lfo: LfoNode,
    depth: f32,
    targets: Vec<T>,
    buffer: Vec<f32>,
}

impl<T: Copy> Modulator<T> {
    pub fn new(lfo: LfoNode, depth: f32) -> Self {
        Self {
            lfo,
            depth,
            targets: Vec::new(),
            buffer: vec![0.0; MAX_BLOCK_SIZE],
        }
    }

    pub fn with_target(mut self, target: T) -> Self {
        self.targets.push(target);
        self
    }

    pub fn with_targets(mut self, targets: impl IntoIterator<Item = T>) -> Self {
        self.targets.extend(targets);
        self
    }

    pub fn targets(&self) -> &[T] {
        &self.targets
    }

    pub fn depth(&self) -> f32 {
        self.depth
    }

    pub fn lfo(&self) -> &LfoNode {
        &self.lfo
    }

    pub fn lfo_mut(&mut self) -> &mut LfoNode {
        &mut self.lfo
    }

    /// Advance the LFO by `len` samples and return this block's offset.
    pub fn next_offset(&mut self, len: usize, ctx: &RenderCtx) -> f32 {
        let block = &mut self.buffer[..len];
        self.lfo.render_block(block, ctx);
        apply_modulation(0.0, block_average(block), self.depth)
    }

    pub fn is_finished(&self, now: f64) -> bool {
        self.lfo.is_finished(now)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn offset_follows_lfo_scaled_by_depth() {
        let sr = 1_000.0;
        let mut modulator: Modulator<usize> = Modulator::new(LfoNode::sine(1.0), 600.0)
            .with_targets([0, 1, 2]);
        assert_eq!(modulator.targets(), &[0, 1, 2]);

        // quarter period: the LFO is near its crest
        let ctx = RenderCtx::new(sr, 0.0);
        let _ = modulator.next_offset(240, &ctx);
        let ctx = RenderCtx::new(sr, 0.24);
        let offset = modulator.next_offset(20, &ctx);
        assert!(offset > 590.0 && offset <= 600.0, "offset {offset}");
    }

    #[test]
    fn stopped_lfo_contributes_nothing() {
        let mut modulator: Modulator<usize> = Modulator::new(LfoNode::sine(3.0), 10.0);
        modulator.lfo_mut().stop(0.0).unwrap();
        let offset = modulator.next_offset(128, &RenderCtx::new(48_000.0, 0.0));
        assert_eq!(offset, 0.0);
        assert!(modulator.is_finished(0.0));
    }
}
