use std::{fmt, str::FromStr};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::catalog::{lookup, Catalog, SacredFrequency};
use crate::error::EngineError;

/// Ordered frequency lists played one after another as plain tones.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize), serde(rename_all = "camelCase"))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HealingSequence {
    SolfeggioAscent,
    SolfeggioDescent,
    ChakraAlignment,
    PlanetaryAlignment,
}

const SOLFEGGIO: [f32; 7] = [396.0, 417.0, 528.0, 639.0, 741.0, 852.0, 963.0];
const SOLFEGGIO_DESCENT: [f32; 7] = [963.0, 852.0, 741.0, 639.0, 528.0, 417.0, 396.0];
// root to crown
const CHAKRAS: [f32; 7] = [194.18, 210.42, 126.22, 136.10, 141.27, 221.23, 172.06];

impl HealingSequence {
    pub const ALL: [HealingSequence; 4] = [
        HealingSequence::SolfeggioAscent,
        HealingSequence::SolfeggioDescent,
        HealingSequence::ChakraAlignment,
        HealingSequence::PlanetaryAlignment,
    ];

    pub fn name(self) -> &'static str {
        match self {
            HealingSequence::SolfeggioAscent => "solfeggioAscent",
            HealingSequence::SolfeggioDescent => "solfeggioDescent",
            HealingSequence::ChakraAlignment => "chakraAlignment",
            HealingSequence::PlanetaryAlignment => "planetaryAlignment",
        }
    }

    pub fn frequencies(self) -> Vec<f32> {
        match self {
            HealingSequence::SolfeggioAscent => SOLFEGGIO.to_vec(),
            HealingSequence::SolfeggioDescent => SOLFEGGIO_DESCENT.to_vec(),
            HealingSequence::ChakraAlignment => CHAKRAS.to_vec(),
            // innermost orbit outwards
            HealingSequence::PlanetaryAlignment => [
                SacredFrequency::PlanetaryMercury,
                SacredFrequency::PlanetaryVenus,
                SacredFrequency::PlanetaryEarth,
                SacredFrequency::PlanetaryMars,
                SacredFrequency::PlanetaryJupiter,
                SacredFrequency::PlanetarySaturn,
            ]
            .map(SacredFrequency::hz)
            .to_vec(),
        }
    }
}

impl fmt::Display for HealingSequence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for HealingSequence {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        lookup(&Self::ALL, Self::name, Catalog::Sequence, s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ascent_and_descent_mirror_each_other() {
        let mut up = HealingSequence::SolfeggioAscent.frequencies();
        up.reverse();
        assert_eq!(up, HealingSequence::SolfeggioDescent.frequencies());
    }

    #[test]
    fn planetary_alignment_uses_the_planetary_table() {
        let freqs = HealingSequence::PlanetaryAlignment.frequencies();
        assert_eq!(freqs.len(), 6);
        assert_eq!(freqs[2], SacredFrequency::PlanetaryEarth.hz());
    }

    #[test]
    fn names_parse() {
        for sequence in HealingSequence::ALL {
            assert_eq!(sequence.name().parse(), Ok(sequence));
        }
        assert!("rainbowBridge".parse::<HealingSequence>().is_err());
    }
}
