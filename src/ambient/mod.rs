//! Long-running ambient soundscapes and the effects that re-trigger inside
//! them.

pub mod effects;
pub mod layers;

pub use effects::{EffectAction, EffectKind, EffectPhase, RetriggerEffect};
pub use layers::{build_layer, AmbientLayer, LayerBuild};
