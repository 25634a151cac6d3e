//! Error types for the audio engine.

use thiserror::Error;

use crate::catalog::Catalog;
use crate::synth::VoiceId;

/// Everything that can go wrong inside the engine.
///
/// The public [`AudioManager`](crate::engine::AudioManager) surface never
/// hands these out; they are reported (logged, and recorded as diagnostics in
/// strict mode) and the call degrades to doing nothing audible.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EngineError {
    #[error("audio device unavailable: {0}")]
    DeviceUnavailable(String),

    #[error("audio engine not initialized")]
    NotInitialized,

    #[error("audio engine has been disposed")]
    Disposed,

    #[error("unknown {catalog} key: {key:?}")]
    UnknownCatalogKey { catalog: Catalog, key: String },

    #[error("unknown mixer category: {0:?}")]
    UnknownCategory(String),

    #[error("invalid alert level {0} (expected 1..=4)")]
    InvalidAlertLevel(u8),

    #[error("invalid volume {0}")]
    InvalidVolume(f32),

    #[error("source already stopped")]
    AlreadyStopped,

    #[error("no live voice with id {0}")]
    UnknownVoice(VoiceId),
}

impl EngineError {
    pub(crate) fn unknown_key(catalog: Catalog, key: &str) -> Self {
        Self::UnknownCatalogKey {
            catalog,
            key: key.to_string(),
        }
    }
}

/// Result type for engine internals.
pub type Result<T> = std::result::Result<T, EngineError>;
