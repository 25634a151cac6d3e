use crate::error::{EngineError, Result};

/// Context passed to graph nodes during rendering
///
/// - sample_rate: Audio sample rate (e.g., 48000.0)
/// - time: audio-clock time of the first sample in the block, in seconds
#[derive(Debug, Clone, Copy)]
pub struct RenderCtx {
    pub sample_rate: f32,
    pub time: f64,
}

impl RenderCtx {
    pub fn new(sample_rate: f32, time: f64) -> Self {
        Self { sample_rate, time }
    }

    /// Time of sample `index` within the block.
    #[inline]
    pub fn sample_time(&self, index: usize) -> f64 {
        self.time + index as f64 / self.sample_rate as f64
    }

    /// Time just past the last sample of a block of `len` samples.
    #[inline]
    pub fn end_time(&self, len: usize) -> f64 {
        self.sample_time(len)
    }

    /// Index of the first sample at or after `time`, clamped to `[0, len]`.
    #[inline]
    pub fn index_of(&self, time: f64, len: usize) -> usize {
        // tolerance keeps times that land exactly on a sample from rounding up
        let offset = ((time - self.time) * self.sample_rate as f64 - 1e-6).ceil();
        offset.clamp(0.0, len as f64) as usize
    }
}

/// Trait for nodes that support parameter modulation
pub trait Modulatable: Send {
    type Param: Copy + Send;

    fn get_param(&self, param: Self::Param) -> f32;

    fn apply_modulation(&mut self, param: Self::Param, base: f32, modulation: f32);
}

/// Core trait for audio processing graph nodes
pub trait GraphNode: Send {
    fn render_block(&mut self, out: &mut [f32], ctx: &RenderCtx);

    /// Check if this node can still produce sound
    fn is_active(&self) -> bool {
        true
    }
}

/// Allow boxed graph nodes to be used as graph nodes (for dynamic dispatch)
impl GraphNode for Box<dyn GraphNode> {
    fn render_block(&mut self, out: &mut [f32], ctx: &RenderCtx) {
        (**self).render_block(out, ctx)
    }

    fn is_active(&self) -> bool {
        (**self).is_active()
    }
}

/// Generators with a start/stop lifecycle on the audio clock.
pub trait Source: GraphNode {
    fn lifetime(&self) -> &Lifetime;

    fn lifetime_mut(&mut self) -> &mut Lifetime;

    fn start(&mut self, at: f64) {
        self.lifetime_mut().start(at);
    }

    /// Schedule a stop. Stopping a source that is already stopped by `at`
    /// is an error the caller is expected to ignore.
    fn stop(&mut self, at: f64) -> Result<()> {
        self.lifetime_mut().stop(at)
    }

    fn is_finished(&self, now: f64) -> bool {
        self.lifetime().is_finished(now)
    }
}

/// Start and stop deadlines of a source.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Lifetime {
    start: f64,
    stop: Option<f64>,
}

impl Default for Lifetime {
    fn default() -> Self {
        Self {
            start: 0.0,
            stop: None,
        }
    }
}

impl Lifetime {
    pub fn start_time(&self) -> f64 {
        self.start
    }

    pub fn stop_time(&self) -> Option<f64> {
        self.stop
    }

    pub fn start(&mut self, at: f64) {
        self.start = at;
    }

    /// A stop only ever moves earlier.
    pub fn stop(&mut self, at: f64) -> Result<()> {
        match self.stop {
            Some(existing) if existing <= at => Err(EngineError::AlreadyStopped),
            _ => {
                self.stop = Some(at);
                Ok(())
            }
        }
    }

    pub fn is_finished(&self, now: f64) -> bool {
        self.stop.is_some_and(|stop| now >= stop)
    }

    /// Sample range of a block during which the source is sounding.
    #[inline]
    pub fn active_range(&self, ctx: &RenderCtx, len: usize) -> (usize, usize) {
        let from = ctx.index_of(self.start, len);
        let to = match self.stop {
            Some(stop) => ctx.index_of(stop, len),
            None => len,
        };
        (from, to.max(from))
    }
}
