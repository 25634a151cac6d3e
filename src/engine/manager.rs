use tracing::{debug, info, trace, warn};

use crate::{
    ambient::AmbientLayer,
    catalog::{AlertLevel, BinauralPreset, EventOptions, EventSound, HealingSequence, SacredFrequency},
    config::EngineConfig,
    dsp::{oscillator::Waveform, VisualizationData},
    engine::{
        device::{ActivationPolicy, DeviceFactory, DeviceStatus, FirstGesture, Interaction},
        mixer::Category,
        session::Session,
        sounds::{Modulation, SacredOptions, ToneEnvelope},
    },
    error::EngineError,
    synth::{VoiceId, VoiceInfo},
};

/*
Audio manager
=============

The one object the rest of an application talks to. It owns the device
session and every voice, and nothing it exposes can fail loudly: a call that
cannot do its job reports why and returns `None`, `false` or `0`.

    Uninitialized ──initialize()──→ Running ──dispose()──→ Disposed
          │                                                   ▲
          └───────────────────dispose()───────────────────────┘

Every entry point starts with the same guard. Before a successful
`initialize` (or after `dispose`) it reports and returns early, so a caller
never has to check state first.

String entry points parse into the catalog enums up front; a bad key is one
report and an early return. The typed variants skip that step.

Reporting goes through one path: unknown keys and device failures log at
warn, everything else at debug. With `EngineConfig::strict` set, each report
is also kept as a `Diagnostic` until the caller takes them.
*/

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceState {
    Uninitialized,
    Running,
    Disposed,
}

/// A failure the manager swallowed, kept in strict mode.
#[derive(Debug, Clone, PartialEq)]
pub struct Diagnostic {
    /// Engine time of the report, in seconds.
    pub time: f64,
    pub error: EngineError,
}

struct Reporter {
    strict: bool,
    diagnostics: Vec<Diagnostic>,
}

impl Reporter {
    fn report(&mut self, error: EngineError, time: f64) {
        match &error {
            EngineError::UnknownCatalogKey { .. }
            | EngineError::UnknownCategory(_)
            | EngineError::InvalidAlertLevel(_)
            | EngineError::InvalidVolume(_)
            | EngineError::DeviceUnavailable(_) => warn!(%error, "audio call ignored"),
            EngineError::AlreadyStopped => trace!(%error),
            _ => debug!(%error, "audio call ignored"),
        }
        if self.strict {
            self.diagnostics.push(Diagnostic { time, error });
        }
    }
}

enum State {
    Uninitialized,
    Running(Box<Session>),
    Disposed,
}

pub struct AudioManager {
    config: EngineConfig,
    factory: Box<dyn DeviceFactory>,
    policy: Box<dyn ActivationPolicy>,
    activation_consumed: bool,
    state: State,
    reporter: Reporter,
}

impl AudioManager {
    pub fn new(config: EngineConfig, factory: impl DeviceFactory + 'static) -> Self {
        Self {
            reporter: Reporter {
                strict: config.strict,
                diagnostics: Vec::new(),
            },
            config,
            factory: Box::new(factory),
            policy: Box::new(FirstGesture),
            activation_consumed: false,
            state: State::Uninitialized,
        }
    }

    /// Replace the gesture rule used by [`notify_interaction`](Self::notify_interaction).
    pub fn with_activation_policy(mut self, policy: impl ActivationPolicy + 'static) -> Self {
        self.policy = Box::new(policy);
        self
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn state(&self) -> DeviceState {
        match self.state {
            State::Uninitialized => DeviceState::Uninitialized,
            State::Running(_) => DeviceState::Running,
            State::Disposed => DeviceState::Disposed,
        }
    }

    /// Open and resume the device. Idempotent; never succeeds after `dispose`.
    pub fn initialize(&mut self) -> bool {
        match self.state {
            State::Running(_) => return true,
            State::Disposed => {
                self.reporter.report(EngineError::Disposed, 0.0);
                return false;
            }
            State::Uninitialized => {}
        }

        let mut device = match self.factory.open() {
            Ok(device) => device,
            Err(err) => {
                self.reporter.report(err, 0.0);
                return false;
            }
        };
        if device.status() == DeviceStatus::Suspended {
            if let Err(err) = device.resume() {
                self.reporter.report(err, 0.0);
                return false;
            }
        }

        info!(sample_rate = device.sample_rate(), "audio engine initialized");
        self.state = State::Running(Box::new(Session::new(device, &self.config)));
        true
    }

    /// Forward a user gesture. The first one the activation policy accepts
    /// initializes the engine; later gestures are ignored.
    pub fn notify_interaction(&mut self, interaction: Interaction) -> bool {
        if self.activation_consumed || !self.policy.qualifies(interaction) {
            return false;
        }
        self.activation_consumed = true;
        debug!(?interaction, "activation gesture");
        self.initialize()
    }

    fn ensure_initialized(&mut self) -> Option<(&mut Session, &mut Reporter)> {
        match &mut self.state {
            State::Running(session) => Some((&mut **session, &mut self.reporter)),
            State::Uninitialized => {
                self.reporter.report(EngineError::NotInitialized, 0.0);
                None
            }
            State::Disposed => {
                self.reporter.report(EngineError::Disposed, 0.0);
                None
            }
        }
    }

    fn session(&self) -> Option<&Session> {
        match &self.state {
            State::Running(session) => Some(&**session),
            _ => None,
        }
    }

    pub fn play_sacred_frequency(
        &mut self,
        name: &str,
        duration: Option<f64>,
        options: SacredOptions,
    ) -> Option<VoiceId> {
        let (session, reporter) = self.ensure_initialized()?;
        match name.parse::<SacredFrequency>() {
            Ok(frequency) => Some(session.play_sacred(frequency, duration, options)),
            Err(err) => {
                reporter.report(err, session.now());
                None
            }
        }
    }

    pub fn play_sacred(
        &mut self,
        frequency: SacredFrequency,
        duration: Option<f64>,
        options: SacredOptions,
    ) -> Option<VoiceId> {
        let (session, _) = self.ensure_initialized()?;
        Some(session.play_sacred(frequency, duration, options))
    }

    pub fn play_binaural_beat(&mut self, kind: &str, duration: Option<f64>) -> Option<VoiceId> {
        let (session, reporter) = self.ensure_initialized()?;
        match kind.parse::<BinauralPreset>() {
            Ok(preset) => Some(session.play_binaural(preset, duration)),
            Err(err) => {
                reporter.report(err, session.now());
                None
            }
        }
    }

    pub fn play_binaural(&mut self, preset: BinauralPreset, duration: Option<f64>) -> Option<VoiceId> {
        let (session, _) = self.ensure_initialized()?;
        Some(session.play_binaural(preset, duration))
    }

    /// Starts the Schumann voice, stopping any previous one first.
    pub fn play_schumann_resonance(
        &mut self,
        include_harmonics: bool,
        modulation: Option<Modulation>,
    ) -> Option<VoiceId> {
        let (session, _) = self.ensure_initialized()?;
        Some(session.play_schumann(include_harmonics, modulation))
    }

    pub fn play_event_sound(&mut self, kind: &str, options: EventOptions) -> Option<VoiceId> {
        let (session, reporter) = self.ensure_initialized()?;
        match kind.parse::<EventSound>() {
            Ok(sound) => Some(session.play_event(sound, options)),
            Err(err) => {
                reporter.report(err, session.now());
                None
            }
        }
    }

    pub fn play_event(&mut self, sound: EventSound, options: EventOptions) -> Option<VoiceId> {
        let (session, _) = self.ensure_initialized()?;
        Some(session.play_event(sound, options))
    }

    /// `None` for an unknown layer or one that is already running.
    pub fn start_ambient_layer(&mut self, name: &str) -> Option<VoiceId> {
        let (session, reporter) = self.ensure_initialized()?;
        match name.parse::<AmbientLayer>() {
            Ok(layer) => session.start_layer(layer),
            Err(err) => {
                reporter.report(err, session.now());
                None
            }
        }
    }

    pub fn start_layer(&mut self, layer: AmbientLayer) -> Option<VoiceId> {
        let (session, _) = self.ensure_initialized()?;
        session.start_layer(layer)
    }

    pub fn stop_ambient_layer(&mut self, name: &str) -> bool {
        let Some((session, reporter)) = self.ensure_initialized() else {
            return false;
        };
        match name.parse::<AmbientLayer>() {
            Ok(layer) => session.stop_layer(layer),
            Err(err) => {
                reporter.report(err, session.now());
                false
            }
        }
    }

    pub fn stop_layer(&mut self, layer: AmbientLayer) -> bool {
        self.ensure_initialized()
            .is_some_and(|(session, _)| session.stop_layer(layer))
    }

    /// Queue the sequence's tones back to back over `total_duration` seconds.
    /// Returns the number of steps queued.
    pub fn play_healing_sequence(&mut self, name: &str, total_duration: f64) -> usize {
        let Some((session, reporter)) = self.ensure_initialized() else {
            return 0;
        };
        match name.parse::<HealingSequence>() {
            Ok(sequence) => session.play_healing(sequence, total_duration),
            Err(err) => {
                reporter.report(err, session.now());
                0
            }
        }
    }

    pub fn play_healing(&mut self, sequence: HealingSequence, total_duration: f64) -> usize {
        self.ensure_initialized()
            .map_or(0, |(session, _)| session.play_healing(sequence, total_duration))
    }

    /// Alerts play on their own bus and stay audible while muted.
    pub fn play_alert(&mut self, level: u8) -> Option<VoiceId> {
        let (session, reporter) = self.ensure_initialized()?;
        match AlertLevel::try_from(level) {
            Ok(level) => Some(session.play_alert(level)),
            Err(err) => {
                reporter.report(err, session.now());
                None
            }
        }
    }

    pub fn play_tone(
        &mut self,
        frequency: f32,
        duration: f64,
        waveform: Waveform,
        category: Category,
        envelope: ToneEnvelope,
    ) -> Option<VoiceId> {
        let (session, _) = self.ensure_initialized()?;
        Some(session.play_tone(frequency, duration, waveform, category, envelope))
    }

    /// Stop a voice and forget it. Unknown ids are reported and ignored.
    pub fn stop_sound(&mut self, id: &VoiceId) -> bool {
        let Some((session, reporter)) = self.ensure_initialized() else {
            return false;
        };
        match session.stop_sound(id) {
            Ok(()) => true,
            Err(err) => {
                reporter.report(err, session.now());
                false
            }
        }
    }

    pub fn stop_all(&mut self) {
        if let Some((session, _)) = self.ensure_initialized() {
            session.stop_all();
        }
    }

    /// NaN or infinite volumes are reported and leave the mix unchanged.
    pub fn set_master_volume(&mut self, volume: f32) {
        let Some((session, reporter)) = self.ensure_initialized() else {
            return;
        };
        if volume.is_finite() {
            session.set_master_volume(volume);
        } else {
            reporter.report(EngineError::InvalidVolume(volume), session.now());
        }
    }

    pub fn set_category_volume(&mut self, category: Category, volume: f32) {
        let Some((session, reporter)) = self.ensure_initialized() else {
            return;
        };
        if volume.is_finite() {
            session.set_category_volume(category, volume);
        } else {
            reporter.report(EngineError::InvalidVolume(volume), session.now());
        }
    }

    /// Category given by name; unknown names are reported and ignored.
    pub fn set_category_volume_by_name(&mut self, category: &str, volume: f32) {
        let Some((session, reporter)) = self.ensure_initialized() else {
            return;
        };
        match category.parse::<Category>() {
            Ok(_) if !volume.is_finite() => {
                reporter.report(EngineError::InvalidVolume(volume), session.now())
            }
            Ok(category) => session.set_category_volume(category, volume),
            Err(err) => reporter.report(err, session.now()),
        }
    }

    /// Returns the new mute state.
    pub fn toggle_mute(&mut self) -> bool {
        self.ensure_initialized()
            .is_some_and(|(session, _)| session.toggle_mute())
    }

    pub fn get_visualization_data(&self) -> Option<VisualizationData> {
        self.session().map(Session::visualization)
    }

    /// Stop everything and close the device. The manager cannot be
    /// initialized again afterwards.
    pub fn dispose(&mut self) {
        if let State::Running(session) = &mut self.state {
            session.close();
        }
        if !matches!(self.state, State::Disposed) {
            info!("audio engine disposed");
        }
        self.state = State::Disposed;
    }

    /// Render the next stereo block. Silence while not running.
    pub fn render(&mut self, left: &mut [f32], right: &mut [f32]) {
        match &mut self.state {
            State::Running(session) => session.render(left, right),
            _ => {
                left.fill(0.0);
                right.fill(0.0);
            }
        }
    }

    /// Render `seconds` of audio and throw it away.
    pub fn advance(&mut self, seconds: f64) {
        let State::Running(session) = &mut self.state else {
            return;
        };
        let mut frames = (seconds.max(0.0) * session.sample_rate() as f64).round() as usize;
        let mut left = [0.0f32; 512];
        let mut right = [0.0f32; 512];
        while frames > 0 {
            let len = frames.min(left.len());
            session.render(&mut left[..len], &mut right[..len]);
            frames -= len;
        }
    }

    /// Drain the diagnostics recorded in strict mode.
    pub fn take_diagnostics(&mut self) -> Vec<Diagnostic> {
        std::mem::take(&mut self.reporter.diagnostics)
    }

    /// Engine time in seconds. Zero while not running.
    pub fn now(&self) -> f64 {
        self.session().map_or(0.0, Session::now)
    }

    pub fn sample_rate(&self) -> Option<f32> {
        self.session().map(Session::sample_rate)
    }

    pub fn voice_count(&self) -> usize {
        self.session().map_or(0, |s| s.voices().len())
    }

    pub fn voice_ids(&self) -> Vec<VoiceId> {
        self.session().map_or_else(Vec::new, |s| s.voices().ids())
    }

    pub fn voice_info(&self, id: &VoiceId) -> Option<VoiceInfo> {
        self.session()?.voice_info(id)
    }

    pub fn layer_voice_count(&self, layer: AmbientLayer) -> usize {
        self.session().map_or(0, |s| s.layer_voice_count(layer))
    }

    pub fn is_layer_active(&self, layer: AmbientLayer) -> bool {
        self.session().is_some_and(|s| s.is_layer_active(layer))
    }

    pub fn is_muted(&self) -> bool {
        self.session().is_some_and(|s| s.mixer().is_muted())
    }

    /// Volume master returns to when unmuted.
    pub fn master_volume(&self) -> f32 {
        self.session()
            .map_or(self.config.master_volume, |s| s.mixer().master_volume())
    }

    /// Master gain in effect right now, including mute and ramps.
    pub fn master_gain(&self) -> f32 {
        self.session()
            .map_or(0.0, |s| s.mixer().master_gain(s.now()))
    }

    /// Bus gain in effect right now.
    pub fn category_volume(&self, category: Category) -> f32 {
        self.session().map_or(self.config.category_volume(category), |s| {
            s.mixer().category_gain(category, s.now())
        })
    }

    /// Scheduler events not yet fired.
    pub fn pending_events(&self) -> usize {
        self.session().map_or(0, Session::pending_events)
    }
}

impl Drop for AudioManager {
    fn drop(&mut self) {
        if let State::Running(session) = &mut self.state {
            session.close();
        }
    }
}
