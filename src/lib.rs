//! Procedural audio engine: sacred tones, binaural beats, event cues and
//! self-sustaining ambient soundscapes, mixed through category buses.
//!
//! ```
//! use oracle_audio::{AudioManager, EngineConfig, OfflineDevice, SacredOptions};
//!
//! let mut audio = AudioManager::new(EngineConfig::default(), OfflineDevice::factory(48_000.0));
//! audio.initialize();
//! let id = audio.play_sacred_frequency("solfeggio.mi", Some(1.0), SacredOptions::default());
//! assert!(id.is_some());
//!
//! audio.advance(1.2);
//! assert_eq!(audio.voice_count(), 0);
//! ```

pub mod ambient; // Ambient layers and re-triggering effects
pub mod catalog; // Named frequencies and presets
pub mod config;
pub mod dsp;
pub mod engine; // Manager, mixer, scheduler, devices
pub mod error;
pub mod graph; // Render-ready nodes
pub mod synth; // Voices and the live-voice registry

pub use config::EngineConfig;
pub use engine::{AudioManager, Category, OfflineDevice, SacredOptions};
pub use error::EngineError;

pub const MAX_BLOCK_SIZE: usize = 2048;
