use std::fmt;

use tracing::trace;

use crate::{
    ambient::AmbientLayer,
    dsp::{
        mix::{accumulate_panned, multiply_in_place},
        noise::NoiseColor,
        oscillator::Waveform,
        param::Param,
    },
    engine::Category,
    error::{EngineError, Result},
    graph::{
        FilterNode, FilterParam, GraphNode, Modulatable, Modulator, NoiseNode, OscNode, OscParam,
        RenderCtx, Source,
    },
    MAX_BLOCK_SIZE,
};

/*
Voice
=====

One playing sound and everything it owns. A voice is a set of chains summed
into a stereo pair, scaled by a voice-wide envelope:

    chain:  source ─→ [filter] ─→ [effect] ─→ × gain(t) ─→ pan ─┐
    chain:  source ─→ ...                                        ├─→ × envelope(t) ─→ bus
    chain:  source ─→ ...                                       ─┘

Chains are never shared. Dropping a voice drops every node it built, so
removing it from the registry is the whole teardown.

Modulators are owned by the voice too. Each one is rendered once per block
and its offset pushed into the chains it targets:

    Modulator(lfo 0.2 Hz, depth 600) ─→ ModTarget { chain: 0, param: Cutoff }

Times are on the audio clock. A voice with a fixed duration records
`ends_at`; the manager deregisters it once the clock passes that point.
*/

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VoiceKind {
    Tone,
    Sacred,
    Binaural,
    Schumann,
    Event,
    Alert,
    Ambient,
    Chime,
}

impl VoiceKind {
    pub fn name(&self) -> &'static str {
        match self {
            VoiceKind::Tone => "tone",
            VoiceKind::Sacred => "sacred",
            VoiceKind::Binaural => "binaural",
            VoiceKind::Schumann => "schumann",
            VoiceKind::Event => "event",
            VoiceKind::Alert => "alert",
            VoiceKind::Ambient => "ambient",
            VoiceKind::Chime => "chime",
        }
    }
}

impl fmt::Display for VoiceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Registry key of a live voice.
///
/// Two starts of the same sound get different ids: the creation time and a
/// sequence number are part of the key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct VoiceId {
    kind: VoiceKind,
    name: String,
    created_us: u64,
    seq: u64,
}

impl VoiceId {
    pub fn new(kind: VoiceKind, name: impl Into<String>, created_us: u64, seq: u64) -> Self {
        Self {
            kind,
            name: name.into(),
            created_us,
            seq,
        }
    }

    pub fn kind(&self) -> VoiceKind {
        self.kind
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn created_us(&self) -> u64 {
        self.created_us
    }

    pub fn seq(&self) -> u64 {
        self.seq
    }
}

impl fmt::Display for VoiceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}@{}#{}",
            self.kind, self.name, self.created_us, self.seq
        )
    }
}

/// Generator at the head of a chain.
pub enum ChainSource {
    Osc(OscNode),
    Noise(NoiseNode),
}

impl ChainSource {
    fn source(&self) -> &dyn Source {
        match self {
            ChainSource::Osc(osc) => osc,
            ChainSource::Noise(noise) => noise,
        }
    }

    fn source_mut(&mut self) -> &mut dyn Source {
        match self {
            ChainSource::Osc(osc) => osc,
            ChainSource::Noise(noise) => noise,
        }
    }
}

/// What kind of generator a chain is built on.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SourceKind {
    Oscillator(Waveform),
    Noise(NoiseColor),
}

pub struct Chain {
    source: ChainSource,
    filter: Option<FilterNode>,
    effect: Option<Box<dyn GraphNode>>,
    gain: Param,
    pan: f32,
}

impl Chain {
    pub fn osc(osc: OscNode) -> Self {
        Self::from_source(ChainSource::Osc(osc))
    }

    pub fn noise(noise: NoiseNode) -> Self {
        Self::from_source(ChainSource::Noise(noise))
    }

    fn from_source(source: ChainSource) -> Self {
        Self {
            source,
            filter: None,
            effect: None,
            gain: Param::new(1.0),
            pan: 0.0,
        }
    }

    pub fn with_filter(mut self, filter: FilterNode) -> Self {
        self.filter = Some(filter);
        self
    }

    pub fn with_effect(mut self, effect: impl GraphNode + 'static) -> Self {
        self.effect = Some(Box::new(effect));
        self
    }

    pub fn with_gain(mut self, gain: f32) -> Self {
        self.gain = Param::new(gain);
        self
    }

    /// Replace the gain with a prepared automation timeline.
    pub fn with_gain_param(mut self, gain: Param) -> Self {
        self.gain = gain;
        self
    }

    pub fn with_pan(mut self, pan: f32) -> Self {
        self.pan = pan.clamp(-1.0, 1.0);
        self
    }

    pub fn starting_at(mut self, at: f64) -> Self {
        self.start(at);
        self
    }

    pub fn start(&mut self, at: f64) {
        self.source.source_mut().start(at);
    }

    pub fn stop(&mut self, at: f64) -> Result<()> {
        self.source.source_mut().stop(at)
    }

    pub fn gain_mut(&mut self) -> &mut Param {
        &mut self.gain
    }

    pub fn oscillator(&self) -> Option<&OscNode> {
        match &self.source {
            ChainSource::Osc(osc) => Some(osc),
            ChainSource::Noise(_) => None,
        }
    }

    pub fn oscillator_mut(&mut self) -> Option<&mut OscNode> {
        match &mut self.source {
            ChainSource::Osc(osc) => Some(osc),
            ChainSource::Noise(_) => None,
        }
    }

    pub fn filter(&self) -> Option<&FilterNode> {
        self.filter.as_ref()
    }

    pub fn pan(&self) -> f32 {
        self.pan
    }

    pub fn is_finished(&self, now: f64) -> bool {
        self.source.source().is_finished(now)
    }

    /// Nothing audible can come out of this chain during the block.
    fn is_silent(&self, ctx: &RenderCtx, len: usize) -> bool {
        if self.effect.is_some() {
            // reverb tails outlive the source
            return false;
        }
        let lifetime = self.source.source().lifetime();
        let (from, to) = lifetime.active_range(ctx, len);
        from == to
    }

    fn modulate(&mut self, param: ChainParam, offset: f32) {
        match param {
            ChainParam::Frequency => {
                if let ChainSource::Osc(osc) = &mut self.source {
                    let base = osc.get_param(OscParam::Frequency);
                    osc.apply_modulation(OscParam::Frequency, base, offset);
                }
            }
            ChainParam::Cutoff => {
                if let Some(filter) = &mut self.filter {
                    let base = filter.get_param(FilterParam::Cutoff);
                    filter.apply_modulation(FilterParam::Cutoff, base, offset);
                }
            }
        }
    }

    fn render(&mut self, out: &mut [f32], gain: &mut [f32], ctx: &RenderCtx) {
        match &mut self.source {
            ChainSource::Osc(osc) => osc.render_block(out, ctx),
            ChainSource::Noise(noise) => noise.render_block(out, ctx),
        }
        if let Some(filter) = &mut self.filter {
            filter.render_block(out, ctx);
        }
        if let Some(effect) = &mut self.effect {
            effect.render_block(out, ctx);
        }
        self.gain.render(gain, ctx.time, ctx.sample_rate);
        multiply_in_place(out, gain);
    }

    pub fn info(&self) -> ChainInfo {
        let lifetime = self.source.source().lifetime();
        let (kind, frequency) = match &self.source {
            ChainSource::Osc(osc) => (
                SourceKind::Oscillator(osc.waveform()),
                Some(osc.frequency().current()),
            ),
            ChainSource::Noise(noise) => (SourceKind::Noise(noise.color()), None),
        };
        ChainInfo {
            kind,
            frequency,
            start: lifetime.start_time(),
            stop: lifetime.stop_time(),
            pan: self.pan,
            filtered: self.filter.is_some(),
            has_effect: self.effect.is_some(),
        }
    }
}

/// Parameter of a chain an LFO can drive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChainParam {
    Frequency,
    Cutoff,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModTarget {
    pub chain: usize,
    pub param: ChainParam,
}

impl ModTarget {
    pub fn frequency(chain: usize) -> Self {
        Self {
            chain,
            param: ChainParam::Frequency,
        }
    }

    pub fn cutoff(chain: usize) -> Self {
        Self {
            chain,
            param: ChainParam::Cutoff,
        }
    }
}

pub struct Voice {
    id: VoiceId,
    category: Category,
    layer: Option<AmbientLayer>,
    chains: Vec<Chain>,
    modulators: Vec<Modulator<ModTarget>>,
    envelope: Param,
    ends_at: Option<f64>,
    releasing: bool,
    chain_buffer: Vec<f32>,
    gain_buffer: Vec<f32>,
    envelope_buffer: Vec<f32>,
}

impl Voice {
    pub fn new(id: VoiceId, category: Category) -> Self {
        Self {
            id,
            category,
            layer: None,
            chains: Vec::new(),
            modulators: Vec::new(),
            envelope: Param::new(1.0),
            ends_at: None,
            releasing: false,
            chain_buffer: vec![0.0; MAX_BLOCK_SIZE],
            gain_buffer: vec![0.0; MAX_BLOCK_SIZE],
            envelope_buffer: vec![0.0; MAX_BLOCK_SIZE],
        }
    }

    pub fn with_chain(mut self, chain: Chain) -> Self {
        self.chains.push(chain);
        self
    }

    pub fn with_chains(mut self, chains: impl IntoIterator<Item = Chain>) -> Self {
        self.chains.extend(chains);
        self
    }

    pub fn with_modulator(mut self, modulator: Modulator<ModTarget>) -> Self {
        self.modulators.push(modulator);
        self
    }

    pub fn with_layer(mut self, layer: AmbientLayer) -> Self {
        self.layer = Some(layer);
        self
    }

    pub fn with_envelope(mut self, envelope: Param) -> Self {
        self.envelope = envelope;
        self
    }

    pub fn id(&self) -> &VoiceId {
        &self.id
    }

    pub fn category(&self) -> Category {
        self.category
    }

    pub fn layer(&self) -> Option<AmbientLayer> {
        self.layer
    }

    pub fn ends_at(&self) -> Option<f64> {
        self.ends_at
    }

    pub fn is_releasing(&self) -> bool {
        self.releasing
    }

    pub fn chains(&self) -> &[Chain] {
        &self.chains
    }

    pub fn chain_mut(&mut self, index: usize) -> Option<&mut Chain> {
        self.chains.get_mut(index)
    }

    /// Start every chain and modulator at `at`.
    pub fn start(&mut self, at: f64) {
        for chain in &mut self.chains {
            chain.start(at);
        }
        for modulator in &mut self.modulators {
            modulator.lfo_mut().start(at);
        }
    }

    /// Schedule every source to stop at `at` and mark the voice for removal then.
    pub fn end_at(&mut self, at: f64) {
        self.stop_sources(at);
        self.ends_at = Some(self.ends_at.map_or(at, |end| end.min(at)));
    }

    /// Fade the envelope to silence over `seconds`, then end.
    pub fn release(&mut self, now: f64, seconds: f64) {
        self.envelope.ramp_from_current(0.0, now, seconds);
        self.releasing = true;
        self.end_at(now + seconds);
    }

    /// Stop every source at `at`. Returns how many were newly stopped.
    pub fn stop_sources(&mut self, at: f64) -> usize {
        let mut stopped = 0;
        for (index, chain) in self.chains.iter_mut().enumerate() {
            match chain.stop(at) {
                Ok(()) => stopped += 1,
                Err(EngineError::AlreadyStopped) => {
                    trace!(voice = %self.id, chain = index, "source already stopped");
                }
                Err(err) => trace!(voice = %self.id, chain = index, %err, "stop failed"),
            }
        }
        for modulator in &mut self.modulators {
            if modulator.lfo_mut().stop(at).is_err() {
                trace!(voice = %self.id, "lfo already stopped");
            }
        }
        stopped
    }

    /// Every source has stopped by `now`.
    pub fn is_finished(&self, now: f64) -> bool {
        self.chains.iter().all(|chain| chain.is_finished(now))
    }

    /// Mix this voice into a stereo pair.
    pub fn render(&mut self, left: &mut [f32], right: &mut [f32], ctx: &RenderCtx) {
        let len = left.len().min(right.len());

        for modulator in &mut self.modulators {
            let offset = modulator.next_offset(len, ctx);
            for target in modulator.targets() {
                if let Some(chain) = self.chains.get_mut(target.chain) {
                    chain.modulate(target.param, offset);
                }
            }
        }

        let envelope = &mut self.envelope_buffer[..len];
        self.envelope.render(envelope, ctx.time, ctx.sample_rate);

        for chain in &mut self.chains {
            if chain.is_silent(ctx, len) {
                continue;
            }
            let block = &mut self.chain_buffer[..len];
            chain.render(block, &mut self.gain_buffer[..len], ctx);
            multiply_in_place(block, envelope);
            accumulate_panned(&mut left[..len], &mut right[..len], block, chain.pan);
        }
    }

    pub fn info(&self) -> VoiceInfo {
        VoiceInfo {
            id: self.id.clone(),
            category: self.category,
            layer: self.layer,
            ends_at: self.ends_at,
            releasing: self.releasing,
            chains: self.chains.iter().map(Chain::info).collect(),
            modulators: self.modulators.len(),
        }
    }
}

/// Read-only description of a chain.
#[derive(Debug, Clone, PartialEq)]
pub struct ChainInfo {
    pub kind: SourceKind,
    pub frequency: Option<f32>,
    pub start: f64,
    pub stop: Option<f64>,
    pub pan: f32,
    pub filtered: bool,
    pub has_effect: bool,
}

/// Read-only description of a voice.
#[derive(Debug, Clone, PartialEq)]
pub struct VoiceInfo {
    pub id: VoiceId,
    pub category: Category,
    pub layer: Option<AmbientLayer>,
    pub ends_at: Option<f64>,
    pub releasing: bool,
    pub chains: Vec<ChainInfo>,
    pub modulators: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::LfoNode;

    const SR: f32 = 48_000.0;

    fn id(name: &str) -> VoiceId {
        VoiceId::new(VoiceKind::Tone, name, 0, 0)
    }

    fn render(voice: &mut Voice, time: f64, len: usize) -> (Vec<f32>, Vec<f32>) {
        let mut left = vec![0.0; len];
        let mut right = vec![0.0; len];
        voice.render(&mut left, &mut right, &RenderCtx::new(SR, time));
        (left, right)
    }

    fn energy(buf: &[f32]) -> f32 {
        buf.iter().map(|s| s * s).sum()
    }

    #[test]
    fn id_display_includes_every_part() {
        let id = VoiceId::new(VoiceKind::Sacred, "solfeggio.mi", 1_500_000, 3);
        assert_eq!(id.to_string(), "sacred:solfeggio.mi@1500000#3");
    }

    #[test]
    fn ids_with_different_sequence_never_collide() {
        let a = VoiceId::new(VoiceKind::Event, "dataPulse", 10, 1);
        let b = VoiceId::new(VoiceKind::Event, "dataPulse", 10, 2);
        assert_ne!(a, b);
    }

    #[test]
    fn hard_panned_chains_land_on_one_side() {
        let mut voice = Voice::new(id("pair"), Category::Binaural)
            .with_chain(Chain::osc(OscNode::sine(200.0)).with_pan(-1.0))
            .with_chain(Chain::osc(OscNode::sine(206.0)).with_pan(1.0).with_gain(0.0));

        let (left, right) = render(&mut voice, 0.0, 256);
        assert!(energy(&left) > 1.0);
        assert!(energy(&right) < 1e-9);
    }

    #[test]
    fn envelope_scales_every_chain() {
        let mut envelope = Param::new(0.0);
        envelope.set_value_at(1.0, 128.0 / SR as f64);
        let mut voice = Voice::new(id("env"), Category::Sacred)
            .with_chain(Chain::osc(OscNode::square(500.0)))
            .with_envelope(envelope);

        let (left, _) = render(&mut voice, 0.0, 256);
        assert!(left[..127].iter().all(|&s| s == 0.0));
        assert!(left[130..].iter().any(|&s| s.abs() > 0.5));
    }

    #[test]
    fn stop_reports_only_new_stops() {
        let mut voice = Voice::new(id("two"), Category::Events)
            .with_chain(Chain::osc(OscNode::sine(100.0)))
            .with_chain(Chain::osc(OscNode::sine(200.0)));

        assert_eq!(voice.stop_sources(1.0), 2);
        assert_eq!(voice.stop_sources(1.0), 0);
        assert_eq!(voice.stop_sources(2.0), 0);
        assert!(voice.is_finished(1.0));
    }

    #[test]
    fn stopped_voice_renders_silence() {
        let mut voice =
            Voice::new(id("silent"), Category::Events).with_chain(Chain::osc(OscNode::sine(440.0)));
        voice.stop_sources(0.0);
        let (left, right) = render(&mut voice, 0.0, 128);
        assert_eq!(energy(&left) + energy(&right), 0.0);
    }

    #[test]
    fn release_fades_then_ends() {
        let mut voice =
            Voice::new(id("fade"), Category::Ambient).with_chain(Chain::osc(OscNode::sine(300.0)));
        voice.release(0.0, 0.5);

        assert!(voice.is_releasing());
        assert_eq!(voice.ends_at(), Some(0.5));
        let info = voice.info();
        assert_eq!(info.chains[0].stop, Some(0.5));
    }

    #[test]
    fn modulator_drives_its_target_chain() {
        let lfo_voice = |depth: f32| {
            Voice::new(id("mod"), Category::Ambient)
                .with_chain(Chain::osc(OscNode::sine(1_000.0)))
                .with_modulator(
                    Modulator::new(LfoNode::sine(0.0), depth).with_target(ModTarget::frequency(0)),
                )
        };
        // a 0 Hz sine LFO sits at zero; the chain keeps its base frequency
        let mut plain = lfo_voice(500.0);
        let (a, _) = render(&mut plain, 0.0, 128);
        let mut reference = Voice::new(id("ref"), Category::Ambient)
            .with_chain(Chain::osc(OscNode::sine(1_000.0)));
        let (b, _) = render(&mut reference, 0.0, 128);
        for (x, y) in a.iter().zip(&b) {
            assert!((x - y).abs() < 1e-6);
        }
        assert_eq!(plain.info().modulators, 1);
    }

    #[test]
    fn running_lfo_sweeps_the_target_frequency() {
        let crossings = |buf: &[f32]| {
            buf.windows(2)
                .filter(|w| (w[0] < 0.0) != (w[1] < 0.0))
                .count()
        };

        // 2 Hz LFO: +1 around 0.125 s, -1 around 0.375 s
        let mut voice = Voice::new(id("sweep"), Category::Ambient)
            .with_chain(Chain::osc(OscNode::sine(1_000.0)))
            .with_modulator(
                Modulator::new(LfoNode::sine(2.0), 500.0).with_target(ModTarget::frequency(0)),
            );
        let block = 480;
        let blocks: Vec<Vec<f32>> = (0..40)
            .map(|k| render(&mut voice, k as f64 * 0.01, block).0)
            .collect();

        // 1000 Hz over 10 ms crosses zero about 20 times
        let near_peak = crossings(&blocks[12]);
        let near_trough = crossings(&blocks[37]);
        assert!(near_peak >= 27, "near peak: {near_peak}");
        assert!(near_trough <= 12, "near trough: {near_trough}");
        assert!(near_trough > 0);
    }

    #[test]
    fn info_reports_chain_layout() {
        let voice = Voice::new(id("info"), Category::Ambient)
            .with_layer(AmbientLayer::EarthHum)
            .with_chain(
                Chain::noise(NoiseNode::brown(1))
                    .with_filter(FilterNode::bandpass(100.0, 2.0))
                    .starting_at(0.25),
            )
            .with_chain(Chain::osc(OscNode::sine(60.0)).with_pan(3.0));

        let info = voice.info();
        assert_eq!(info.layer, Some(AmbientLayer::EarthHum));
        assert_eq!(info.chains[0].kind, SourceKind::Noise(NoiseColor::Brown));
        assert!(info.chains[0].filtered);
        assert_eq!(info.chains[0].start, 0.25);
        assert_eq!(info.chains[1].frequency, Some(60.0));
        assert_eq!(info.chains[1].pan, 1.0);
    }
}
