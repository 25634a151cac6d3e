use crate::dsp::noise::{NoiseColor, NoiseGenerator};
use crate::graph::node::{GraphNode, Lifetime, RenderCtx, Source};

/// Continuous colored noise with a start/stop lifecycle.
pub struct NoiseNode {
    generator: NoiseGenerator,
    lifetime: Lifetime,
}

impl NoiseNode {
    pub fn new(color: NoiseColor, seed: u64) -> Self {
        Self {
            generator: NoiseGenerator::new(color, seed),
            lifetime: Lifetime::default(),
        }
    }

    pub fn white(seed: u64) -> Self {
        Self::new(NoiseColor::White, seed)
    }

    pub fn pink(seed: u64) -> Self {
        Self::new(NoiseColor::Pink, seed)
    }

    pub fn brown(seed: u64) -> Self {
        Self::new(NoiseColor::Brown, seed)
    }

    pub fn color(&self) -> NoiseColor {
        self.generator.color()
    }
}

impl GraphNode for NoiseNode {
    fn render_block(&mut self, out: &mut [f32], ctx: &RenderCtx) {
        let (from, to) = self.lifetime.active_range(ctx, out.len());
        out[..from].fill(0.0);
        self.generator.render(&mut out[from..to]);
        out[to..].fill(0.0);
    }

    fn is_active(&self) -> bool {
        self.lifetime.stop_time().is_none()
    }
}

impl Source for NoiseNode {
    fn lifetime(&self) -> &Lifetime {
        &self.lifetime
    }

    fn lifetime_mut(&mut self) -> &mut Lifetime {
        &mut self.lifetime
    }
}
