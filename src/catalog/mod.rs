//! Closed, enum-keyed sound catalogs.
//!
//! Every catalog is a plain enum with a `FromStr` impl. String keys coming
//! from callers are parsed once at the edge; an unknown key becomes
//! [`EngineError::UnknownCatalogKey`](crate::error::EngineError) and the
//! call stops there.

use std::fmt;

pub mod alerts;
pub mod binaural;
pub mod events;
pub mod sacred;
pub mod sequences;

pub use alerts::{AlertLevel, AlertPreset};
pub use binaural::BinauralPreset;
pub use events::{EventOptions, EventPreset, EventSound};
pub use sacred::SacredFrequency;
pub use sequences::HealingSequence;

/// Which catalog a lookup went to, for error reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Catalog {
    Sacred,
    Binaural,
    Event,
    Sequence,
    Layer,
    Waveform,
}

impl fmt::Display for Catalog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Catalog::Sacred => "sacred frequency",
            Catalog::Binaural => "binaural preset",
            Catalog::Event => "event sound",
            Catalog::Sequence => "healing sequence",
            Catalog::Layer => "ambient layer",
            Catalog::Waveform => "waveform",
        })
    }
}

/// Parse a camelCase key by scanning a variant table.
pub(crate) fn lookup<T: Copy>(
    all: &[T],
    name: impl Fn(T) -> &'static str,
    catalog: Catalog,
    key: &str,
) -> crate::error::Result<T> {
    all.iter()
        .copied()
        .find(|&item| name(item) == key)
        .ok_or_else(|| crate::error::EngineError::unknown_key(catalog, key))
}
