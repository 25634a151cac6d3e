#[cfg(feature = "rtrb")]
use rtrb::Consumer;

use crate::{
    ambient::AmbientLayer,
    catalog::{BinauralPreset, EventOptions, EventSound, HealingSequence, SacredFrequency},
    engine::{
        manager::AudioManager,
        mixer::Category,
        sounds::{Modulation, SacredOptions},
    },
};

/// Control messages for a manager living on another thread.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum Command {
    PlaySacred {
        frequency: SacredFrequency,
        duration: Option<f64>,
    },
    PlayBinaural {
        preset: BinauralPreset,
        duration: Option<f64>,
    },
    PlaySchumann {
        include_harmonics: bool,
        modulation: Option<Modulation>,
    },
    PlayEvent(EventSound),
    PlayAlert(u8),
    PlayHealing {
        sequence: HealingSequence,
        total_duration: f64,
    },
    /// Start the layer if it is stopped, stop it if it is running.
    ToggleLayer(AmbientLayer),
    SetMasterVolume(f32),
    SetCategoryVolume(Category, f32),
    ToggleMute,
    StopAll,
}

pub trait CommandReceiver {
    fn pop(&mut self) -> Option<Command>;
}

#[cfg(feature = "rtrb")]
impl CommandReceiver for Consumer<Command> {
    fn pop(&mut self) -> Option<Command> {
        Consumer::pop(self).ok()
    }
}

impl AudioManager {
    pub fn apply(&mut self, command: Command) {
        match command {
            Command::PlaySacred {
                frequency,
                duration,
            } => {
                self.play_sacred(frequency, duration, SacredOptions::default());
            }
            Command::PlayBinaural { preset, duration } => {
                self.play_binaural(preset, duration);
            }
            Command::PlaySchumann {
                include_harmonics,
                modulation,
            } => {
                self.play_schumann_resonance(include_harmonics, modulation);
            }
            Command::PlayEvent(sound) => {
                self.play_event(sound, EventOptions::default());
            }
            Command::PlayAlert(level) => {
                self.play_alert(level);
            }
            Command::PlayHealing {
                sequence,
                total_duration,
            } => {
                self.play_healing(sequence, total_duration);
            }
            Command::ToggleLayer(layer) => {
                if self.is_layer_active(layer) {
                    self.stop_layer(layer);
                } else {
                    self.start_layer(layer);
                }
            }
            Command::SetMasterVolume(volume) => self.set_master_volume(volume),
            Command::SetCategoryVolume(category, volume) => {
                self.set_category_volume(category, volume)
            }
            Command::ToggleMute => {
                self.toggle_mute();
            }
            Command::StopAll => self.stop_all(),
        }
    }

    /// Apply every queued command. Returns how many were applied.
    pub fn drain_commands(&mut self, rx: &mut impl CommandReceiver) -> usize {
        let mut applied = 0;
        while let Some(command) = rx.pop() {
            self.apply(command);
            applied += 1;
        }
        applied
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EngineConfig;
    use crate::engine::device::OfflineDevice;
    use std::collections::VecDeque;

    impl CommandReceiver for VecDeque<Command> {
        fn pop(&mut self) -> Option<Command> {
            self.pop_front()
        }
    }

    #[test]
    fn toggle_layer_flips_the_layer() {
        let mut audio = AudioManager::new(EngineConfig::default().with_seed(4), OfflineDevice::factory(8_000.0));
        audio.initialize();

        let mut queue: VecDeque<Command> = VecDeque::from([
            Command::ToggleLayer(AmbientLayer::CosmicWind),
            Command::PlayEvent(EventSound::NodeSelect),
        ]);
        assert_eq!(audio.drain_commands(&mut queue), 2);
        assert!(audio.is_layer_active(AmbientLayer::CosmicWind));
        assert_eq!(audio.voice_count(), 2);

        audio.apply(Command::ToggleLayer(AmbientLayer::CosmicWind));
        assert!(!audio.is_layer_active(AmbientLayer::CosmicWind));
    }

    #[cfg(feature = "rtrb")]
    #[test]
    fn ring_buffer_delivers_commands() {
        let (mut tx, mut rx) = rtrb::RingBuffer::<Command>::new(8);
        tx.push(Command::ToggleMute).unwrap();
        tx.push(Command::SetMasterVolume(0.2)).unwrap();

        let mut audio = AudioManager::new(EngineConfig::default(), OfflineDevice::factory(8_000.0));
        audio.initialize();
        assert_eq!(audio.drain_commands(&mut rx), 2);
        assert!(audio.is_muted());
        assert_eq!(audio.master_volume(), 0.2);
    }
}
