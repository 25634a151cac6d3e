use rand::{rngs::StdRng, SeedableRng};
use tracing::{debug, info, trace};

use crate::{
    ambient::{build_layer, AmbientLayer, EffectAction, RetriggerEffect},
    catalog::{AlertLevel, BinauralPreset, EventOptions, EventSound, HealingSequence, SacredFrequency},
    config::{
        ambient::GLITCH_PEAK,
        envelope::{AMBIENT_RELEASE, HEALING_FADE_RATIO},
        EngineConfig,
    },
    dsp::{mix::downmix, oscillator::Waveform, Analyser, VisualizationData},
    engine::{
        device::AudioDevice,
        mixer::{Category, Mixer},
        scheduler::Scheduler,
        sounds::{self, Modulation, SacredOptions, ToneEnvelope},
    },
    error::{EngineError, Result},
    graph::RenderCtx,
    synth::{Voice, VoiceId, VoiceInfo, VoiceKind, VoiceRegistry},
    MAX_BLOCK_SIZE,
};

/*
Session
=======

Everything that exists only while the device is open. The manager owns at
most one, created by `initialize` and dropped by `dispose`.

Each render quantum:

    1. pop scheduler events due before the block ends   (healing steps)
    2. step re-triggering effects to the block end        (chimes, glitches)
    3. render every voice into its category bus
    4. mix buses through master, feed the analyser
    5. advance the clock, drop voices whose end has passed

Steps 1 and 2 look ahead by one block so what they start lands on its exact
sample. Step 5 runs after rendering so a voice is never cut before its end.
*/

/// A tone waiting on the scheduler.
#[derive(Debug, Clone, Copy)]
pub(crate) struct ScheduledTone {
    pub frequency: f32,
    pub duration: f64,
    pub waveform: Waveform,
    pub category: Category,
    pub envelope: ToneEnvelope,
    pub sequence: HealingSequence,
    pub step: usize,
}

#[derive(Debug, Clone, Default)]
struct LayerState {
    active: bool,
    generation: u64,
    voice: Option<VoiceId>,
}

pub(crate) struct Session {
    device: Box<dyn AudioDevice>,
    sample_rate: f32,
    block_size: usize,
    mixer: Mixer,
    voices: VoiceRegistry,
    scheduler: Scheduler<ScheduledTone>,
    effects: Vec<RetriggerEffect>,
    layers: [LayerState; AmbientLayer::COUNT],
    schumann: Option<VoiceId>,
    analyser: Analyser,
    rng: StdRng,
    frames: u64,
    next_seq: u64,
    mono: Vec<f32>,
}

impl Session {
    pub fn new(device: Box<dyn AudioDevice>, config: &EngineConfig) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self {
            sample_rate: device.sample_rate(),
            device,
            block_size: config.block_size.clamp(1, MAX_BLOCK_SIZE),
            mixer: Mixer::new(config),
            voices: VoiceRegistry::new(),
            scheduler: Scheduler::new(),
            effects: Vec::new(),
            layers: Default::default(),
            schumann: None,
            analyser: Analyser::new(config.fft_size, config.smoothing),
            rng,
            frames: 0,
            next_seq: 0,
            mono: vec![0.0; MAX_BLOCK_SIZE],
        }
    }

    pub fn now(&self) -> f64 {
        self.frames as f64 / self.sample_rate as f64
    }

    pub fn sample_rate(&self) -> f32 {
        self.sample_rate
    }

    fn next_id(&mut self, kind: VoiceKind, name: &str) -> VoiceId {
        let seq = self.next_seq;
        self.next_seq += 1;
        let created_us = (self.now() * 1_000_000.0).round() as u64;
        VoiceId::new(kind, name, created_us, seq)
    }

    fn register(&mut self, voice: Voice) -> VoiceId {
        debug!(voice = %voice.id(), category = %voice.category(), "voice started");
        self.voices.insert(voice)
    }

    pub fn play_sacred(
        &mut self,
        frequency: SacredFrequency,
        duration: Option<f64>,
        options: SacredOptions,
    ) -> VoiceId {
        let id = self.next_id(VoiceKind::Sacred, frequency.path());
        let voice = sounds::sacred_voice(id, frequency, self.now(), duration, options);
        self.register(voice)
    }

    pub fn play_binaural(&mut self, preset: BinauralPreset, duration: Option<f64>) -> VoiceId {
        let id = self.next_id(VoiceKind::Binaural, preset.name());
        let voice = sounds::binaural_voice(id, preset, self.now(), duration);
        self.register(voice)
    }

    /// Replaces any Schumann voice already playing.
    pub fn play_schumann(
        &mut self,
        include_harmonics: bool,
        modulation: Option<Modulation>,
    ) -> VoiceId {
        if let Some(previous) = self.schumann.take() {
            debug!(voice = %previous, "replacing schumann resonance");
            let _ = self.stop_sound(&previous);
        }
        let id = self.next_id(VoiceKind::Schumann, "resonance");
        let voice = sounds::schumann_voice(id, include_harmonics, modulation, self.now());
        let id = self.register(voice);
        self.schumann = Some(id.clone());
        id
    }

    pub fn play_event(&mut self, sound: EventSound, options: EventOptions) -> VoiceId {
        let id = self.next_id(VoiceKind::Event, sound.name());
        let voice = sounds::event_voice(id, sound, options, self.now());
        self.register(voice)
    }

    pub fn play_alert(&mut self, level: AlertLevel) -> VoiceId {
        let id = self.next_id(VoiceKind::Alert, &level.level().to_string());
        let voice = sounds::alert_voice(id, level, self.now());
        self.register(voice)
    }

    pub fn play_tone(
        &mut self,
        frequency: f32,
        duration: f64,
        waveform: Waveform,
        category: Category,
        envelope: ToneEnvelope,
    ) -> VoiceId {
        let now = self.now();
        self.spawn_tone(frequency, duration, waveform, category, envelope, now)
    }

    fn spawn_tone(
        &mut self,
        frequency: f32,
        duration: f64,
        waveform: Waveform,
        category: Category,
        envelope: ToneEnvelope,
        at: f64,
    ) -> VoiceId {
        let id = self.next_id(VoiceKind::Tone, &format!("{frequency}hz"));
        let voice = sounds::tone_voice(id, frequency, duration, waveform, category, envelope, at);
        self.register(voice)
    }

    /// Queue one tone per step of the sequence. Returns the number of steps.
    pub fn play_healing(&mut self, sequence: HealingSequence, total: f64) -> usize {
        let frequencies = sequence.frequencies();
        if frequencies.is_empty() {
            return 0;
        }
        let step_length = total.max(0.0) / frequencies.len() as f64;
        let fade = step_length * HEALING_FADE_RATIO;
        let now = self.now();

        for (step, &frequency) in frequencies.iter().enumerate() {
            self.scheduler.schedule(
                now + step as f64 * step_length,
                ScheduledTone {
                    frequency,
                    duration: step_length,
                    waveform: Waveform::Sine,
                    category: Category::Sacred,
                    envelope: ToneEnvelope {
                        fade_in: fade,
                        fade_out: fade,
                    },
                    sequence,
                    step,
                },
            );
        }
        debug!(%sequence, steps = frequencies.len(), total, "healing sequence queued");
        frequencies.len()
    }

    /// Returns `None` when the layer is already running.
    pub fn start_layer(&mut self, layer: AmbientLayer) -> Option<VoiceId> {
        if self.layers[layer.index()].active {
            debug!(%layer, "ambient layer already active");
            return None;
        }

        let generation = self.layers[layer.index()].generation + 1;
        let id = self.next_id(VoiceKind::Ambient, layer.name());
        let now = self.now();
        let built = build_layer(layer, id, now, self.sample_rate, generation, &mut self.rng);

        self.effects.extend(built.effects);
        let id = self.register(built.voice);
        self.layers[layer.index()] = LayerState {
            active: true,
            generation,
            voice: Some(id.clone()),
        };
        info!(%layer, "ambient layer started");
        Some(id)
    }

    /// Returns `false` when the layer was not running.
    pub fn stop_layer(&mut self, layer: AmbientLayer) -> bool {
        let state = &mut self.layers[layer.index()];
        if !state.active {
            debug!(%layer, "ambient layer not active");
            return false;
        }
        state.active = false;

        if let Some(id) = state.voice.take() {
            let now = self.now();
            if let Some(voice) = self.voices.get_mut(&id) {
                voice.release(now, AMBIENT_RELEASE);
            }
        }
        info!(%layer, "ambient layer stopped");
        true
    }

    pub fn is_layer_active(&self, layer: AmbientLayer) -> bool {
        self.layers[layer.index()].active
    }

    /// Stop every source of the voice now and drop it.
    pub fn stop_sound(&mut self, id: &VoiceId) -> Result<()> {
        let mut voice = self
            .voices
            .remove(id)
            .ok_or_else(|| EngineError::UnknownVoice(id.clone()))?;
        let stopped = voice.stop_sources(self.now());
        debug!(voice = %id, stopped, "voice stopped");

        if let Some(layer) = voice.layer() {
            let state = &mut self.layers[layer.index()];
            if state.voice.as_ref() == Some(id) {
                state.active = false;
                state.voice = None;
            }
        }
        if self.schumann.as_ref() == Some(id) {
            self.schumann = None;
        }
        Ok(())
    }

    pub fn stop_all(&mut self) {
        let now = self.now();
        let mut voices = self.voices.drain();
        for voice in &mut voices {
            voice.stop_sources(now);
        }
        for state in &mut self.layers {
            state.active = false;
            state.voice = None;
        }
        self.effects.clear();
        self.scheduler.clear();
        self.schumann = None;
        info!(voices = voices.len(), "all sounds stopped");
    }

    pub fn set_master_volume(&mut self, volume: f32) {
        let now = self.now();
        self.mixer.set_master_volume(volume, now);
    }

    pub fn set_category_volume(&mut self, category: Category, volume: f32) {
        let now = self.now();
        self.mixer.set_category_volume(category, volume, now);
    }

    pub fn toggle_mute(&mut self) -> bool {
        let now = self.now();
        let muted = self.mixer.toggle_mute(now);
        debug!(muted, "mute toggled");
        muted
    }

    pub fn mixer(&self) -> &Mixer {
        &self.mixer
    }

    pub fn voices(&self) -> &VoiceRegistry {
        &self.voices
    }

    pub fn voice_info(&self, id: &VoiceId) -> Option<VoiceInfo> {
        self.voices.get(id).map(Voice::info)
    }

    /// Sounding layer voices tagged with `layer`. Chimes and voices fading
    /// out after a stop are not counted.
    pub fn layer_voice_count(&self, layer: AmbientLayer) -> usize {
        self.voices
            .iter()
            .filter(|v| {
                v.layer() == Some(layer)
                    && v.id().kind() == VoiceKind::Ambient
                    && !v.is_releasing()
            })
            .count()
    }

    pub fn pending_events(&self) -> usize {
        self.scheduler.pending()
    }

    pub fn visualization(&self) -> VisualizationData {
        self.analyser.snapshot(self.sample_rate)
    }

    pub fn close(&mut self) {
        self.stop_all();
        self.device.close();
    }

    /// Render a stereo pair, one quantum at a time.
    pub fn render(&mut self, left: &mut [f32], right: &mut [f32]) {
        let total = left.len().min(right.len());
        let mut offset = 0;
        while offset < total {
            let len = (total - offset).min(self.block_size);
            self.render_block(
                &mut left[offset..offset + len],
                &mut right[offset..offset + len],
            );
            offset += len;
        }
    }

    fn render_block(&mut self, left: &mut [f32], right: &mut [f32]) {
        let len = left.len();
        let ctx = RenderCtx::new(self.sample_rate, self.now());
        let block_end = ctx.end_time(len);

        self.run_scheduler(block_end);
        self.run_effects(block_end);

        self.mixer.clear(len);
        for voice in self.voices.iter_mut() {
            let (bus_left, bus_right) = self.mixer.bus_mut(voice.category(), len);
            voice.render(bus_left, bus_right, &ctx);
        }
        self.mixer.mix(left, right, &ctx);

        let mono = &mut self.mono[..len];
        downmix(left, right, mono);
        self.analyser.push(mono);

        self.frames += len as u64;
        self.sweep(block_end);
    }

    fn run_scheduler(&mut self, until: f64) {
        while let Some((at, tone)) = self.scheduler.pop_due(until) {
            trace!(sequence = %tone.sequence, step = tone.step, at, "sequence step");
            self.spawn_tone(
                tone.frequency,
                tone.duration,
                tone.waveform,
                tone.category,
                tone.envelope,
                at,
            );
        }
    }

    fn run_effects(&mut self, until: f64) {
        let mut actions = Vec::new();
        let layers = &self.layers;
        for effect in &mut self.effects {
            let state = &layers[effect.layer().index()];
            let active = state.active && state.generation == effect.generation();
            if let Some(action) = effect.step(until, active, &mut self.rng) {
                actions.push(action);
            }
        }
        self.effects.retain(|effect| !effect.is_finished());

        for action in actions {
            self.apply_effect(action);
        }
    }

    fn apply_effect(&mut self, action: EffectAction) {
        match action {
            EffectAction::Chime {
                layer,
                frequency,
                at,
                decay,
            } => {
                let id = self.next_id(VoiceKind::Chime, layer.name());
                let voice = sounds::chime_voice(id, layer, frequency, at, decay);
                self.register(voice);
            }
            EffectAction::Glitch {
                layer,
                chain,
                at,
                length,
                frequency,
            } => {
                let Some(id) = self.layers[layer.index()].voice.as_ref() else {
                    trace!(%layer, "glitch without a layer voice");
                    return;
                };
                let Some(chain) = self.voices.get_mut(id).and_then(|v| v.chain_mut(chain)) else {
                    trace!(%layer, chain, "glitch target missing");
                    return;
                };
                chain.gain_mut().set_value_at(GLITCH_PEAK, at);
                chain.gain_mut().set_value_at(0.0, at + length);
                if let Some(osc) = chain.oscillator_mut() {
                    osc.frequency_mut().set_value_at(frequency, at);
                }
            }
        }
    }

    /// Drop voices whose scheduled end has passed.
    fn sweep(&mut self, now: f64) {
        let ended = self
            .voices
            .remove_where(|voice| voice.ends_at().is_some_and(|end| end <= now));
        for voice in ended {
            debug!(voice = %voice.id(), "voice ended");
            if self.schumann.as_ref() == Some(voice.id()) {
                self.schumann = None;
            }
        }
    }
}
