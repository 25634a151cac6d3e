//! TUI module for oracle
//!
//! Key bindings drive the engine through the command queue; the analyser
//! snapshot is read back once per frame.

mod spectrum;
mod status;
mod waveform;

use color_eyre::eyre::Result as EyreResult;
use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use ratatui::{
    layout::{Constraint, Direction, Layout},
    style::{Color, Style},
    widgets::Paragraph,
    DefaultTerminal, Frame,
};
use rtrb::Producer;
use std::{
    sync::{Arc, Mutex},
    time::Duration,
};
use tracing::warn;

use oracle_audio::{
    ambient::AmbientLayer,
    catalog::{BinauralPreset, EventSound, HealingSequence, SacredFrequency},
    dsp::VisualizationData,
    engine::{Command, Interaction},
    AudioManager,
};

use spectrum::render_spectrum;
use status::{render_status, Status};
use waveform::render_waveform;

const VOLUME_STEP: f32 = 0.05;
const HEALING_SECONDS: f64 = 60.0;
const BINAURAL_SECONDS: f64 = 30.0;

pub struct UiApp {
    manager: Arc<Mutex<AudioManager>>,
    commands: Producer<Command>,
    sample_rate: f32,
    volume: f32,
    binaural: usize,
    sacred: usize,
    alert: u8,
    visualization: Option<VisualizationData>,
    status: Status,
    should_quit: bool,
}

impl UiApp {
    pub fn new(
        manager: Arc<Mutex<AudioManager>>,
        commands: Producer<Command>,
        sample_rate: f32,
    ) -> Self {
        let volume = manager
            .lock()
            .map(|audio| audio.config().master_volume)
            .unwrap_or(0.5);
        Self {
            manager,
            commands,
            sample_rate,
            volume,
            binaural: 0,
            sacred: 0,
            alert: 1,
            visualization: None,
            status: Status::default(),
            should_quit: false,
        }
    }

    pub fn run(&mut self, terminal: &mut DefaultTerminal) -> EyreResult<()> {
        while !self.should_quit {
            self.poll_engine();
            terminal.draw(|frame| self.render(frame))?;

            // ~60fps
            if event::poll(Duration::from_millis(16))? {
                if let Event::Key(key) = event::read()? {
                    if key.kind == KeyEventKind::Press {
                        self.handle_key(key.code);
                    }
                }
            }
        }
        Ok(())
    }

    fn poll_engine(&mut self) {
        let Ok(audio) = self.manager.lock() else {
            return;
        };
        self.visualization = audio.get_visualization_data();
        self.status = Status {
            state: audio.state(),
            voices: audio.voice_count(),
            muted: audio.is_muted(),
            master: audio.master_volume(),
            layers: AmbientLayer::ALL.map(|layer| audio.is_layer_active(layer)),
            time: audio.now(),
        };
    }

    fn handle_key(&mut self, key: KeyCode) {
        if let Ok(mut audio) = self.manager.lock() {
            audio.notify_interaction(Interaction::KeyDown);
        }

        let command = match key {
            KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => {
                self.should_quit = true;
                return;
            }
            KeyCode::Char(c @ '1'..='6') => {
                let index = c as usize - '1' as usize;
                Command::ToggleLayer(AmbientLayer::ALL[index])
            }
            KeyCode::Char('f') => {
                let frequency = SacredFrequency::ALL[self.sacred % SacredFrequency::ALL.len()];
                self.sacred += 1;
                Command::PlaySacred {
                    frequency,
                    duration: Some(4.0),
                }
            }
            KeyCode::Char('b') => {
                let preset = BinauralPreset::ALL[self.binaural % BinauralPreset::ALL.len()];
                self.binaural += 1;
                Command::PlayBinaural {
                    preset,
                    duration: Some(BINAURAL_SECONDS),
                }
            }
            KeyCode::Char('s') => Command::PlaySchumann {
                include_harmonics: true,
                modulation: None,
            },
            KeyCode::Char('h') => Command::PlayHealing {
                sequence: HealingSequence::SolfeggioAscent,
                total_duration: HEALING_SECONDS,
            },
            KeyCode::Char('e') => Command::PlayEvent(EventSound::NodeSelect),
            KeyCode::Char('a') => {
                let level = self.alert;
                self.alert = self.alert % 4 + 1;
                Command::PlayAlert(level)
            }
            KeyCode::Char('m') => Command::ToggleMute,
            KeyCode::Char('+') | KeyCode::Char('=') => self.nudge_volume(VOLUME_STEP),
            KeyCode::Char('-') => self.nudge_volume(-VOLUME_STEP),
            KeyCode::Char('x') => Command::StopAll,
            _ => return,
        };

        if self.commands.push(command).is_err() {
            warn!(?command, "command queue full, dropping");
        }
    }

    fn nudge_volume(&mut self, delta: f32) -> Command {
        self.volume = (self.volume + delta).clamp(0.0, 1.0);
        Command::SetMasterVolume(self.volume)
    }

    fn render(&self, frame: &mut Frame) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(4), // Status
                Constraint::Min(8),    // Spectrum
                Constraint::Length(8), // Waveform
                Constraint::Length(1), // Help
            ])
            .split(frame.area());

        render_status(frame, chunks[0], &self.status);

        let (frequency, waveform) = match &self.visualization {
            Some(data) => (data.frequency.as_slice(), data.waveform.as_slice()),
            None => (&[][..], &[][..]),
        };
        render_spectrum(frame, chunks[1], frequency, self.sample_rate);
        render_waveform(frame, chunks[2], waveform);

        let help = Paragraph::new(
            " [1-6] Layers  [F] Sacred  [B] Binaural  [S] Schumann  [H] Healing  [E] Event  [A] Alert  [M] Mute  [+/-] Volume  [X] Stop  [Q] Quit",
        )
        .style(Style::default().fg(Color::DarkGray));
        frame.render_widget(help, chunks[3]);
    }
}
