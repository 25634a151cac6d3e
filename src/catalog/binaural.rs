use std::{fmt, str::FromStr};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::catalog::{lookup, Catalog};
use crate::error::EngineError;

/// Carrier and beat pairs. The left ear hears `base`, the right `base + beat`.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize), serde(rename_all = "camelCase"))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinauralPreset {
    Delta,
    Theta,
    Alpha,
    Beta,
    Gamma,
    Schumann,
}

impl BinauralPreset {
    pub const ALL: [BinauralPreset; 6] = [
        BinauralPreset::Delta,
        BinauralPreset::Theta,
        BinauralPreset::Alpha,
        BinauralPreset::Beta,
        BinauralPreset::Gamma,
        BinauralPreset::Schumann,
    ];

    pub fn name(self) -> &'static str {
        match self {
            BinauralPreset::Delta => "delta",
            BinauralPreset::Theta => "theta",
            BinauralPreset::Alpha => "alpha",
            BinauralPreset::Beta => "beta",
            BinauralPreset::Gamma => "gamma",
            BinauralPreset::Schumann => "schumann",
        }
    }

    pub fn base(self) -> f32 {
        match self {
            BinauralPreset::Delta => 100.0,
            BinauralPreset::Theta | BinauralPreset::Alpha | BinauralPreset::Schumann => 200.0,
            BinauralPreset::Beta => 250.0,
            BinauralPreset::Gamma => 300.0,
        }
    }

    pub fn beat(self) -> f32 {
        match self {
            BinauralPreset::Delta => 2.0,
            BinauralPreset::Theta => 6.0,
            BinauralPreset::Alpha => 10.0,
            BinauralPreset::Beta => 20.0,
            BinauralPreset::Gamma => 40.0,
            BinauralPreset::Schumann => 7.83,
        }
    }
}

impl fmt::Display for BinauralPreset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for BinauralPreset {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        lookup(&Self::ALL, Self::name, Catalog::Binaural, s)
    }
}
