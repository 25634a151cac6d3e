//! Voices: named subgraphs of sources, shaping nodes and gain envelopes, and
//! the registry that tracks the live ones.

pub mod registry;
pub mod voice;

pub use registry::VoiceRegistry;
pub use voice::{Chain, ChainInfo, ChainParam, ModTarget, SourceKind, Voice, VoiceId, VoiceInfo, VoiceKind};
