use std::{fmt, str::FromStr};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::catalog::{lookup, Catalog};
use crate::error::EngineError;

/*
Sacred frequencies
==================

Addressed by a dotted path, `group.key`:

  solfeggio.ut       396 Hz     planetary.sun      126.22 Hz
  solfeggio.re       417        planetary.moon     210.42
  solfeggio.mi       528        planetary.mercury  141.27
  solfeggio.fa       639        planetary.venus    221.23
  solfeggio.sol      741        planetary.earth    136.10
  solfeggio.la       852        planetary.mars     144.72
  solfeggio.si       963        planetary.jupiter  183.58
                                planetary.saturn   147.85
  schumann.fundamental  7.83
  schumann.second      14.3     tuning.verdi       432
  schumann.third       20.8     tuning.standard    440
  schumann.fourth      27.3     tuning.scientific  256
  schumann.fifth       33.8
*/

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SacredFrequency {
    SolfeggioUt,
    SolfeggioRe,
    SolfeggioMi,
    SolfeggioFa,
    SolfeggioSol,
    SolfeggioLa,
    SolfeggioSi,
    PlanetarySun,
    PlanetaryMoon,
    PlanetaryMercury,
    PlanetaryVenus,
    PlanetaryEarth,
    PlanetaryMars,
    PlanetaryJupiter,
    PlanetarySaturn,
    SchumannFundamental,
    SchumannSecond,
    SchumannThird,
    SchumannFourth,
    SchumannFifth,
    TuningVerdi,
    TuningStandard,
    TuningScientific,
}

use SacredFrequency::*;

impl SacredFrequency {
    pub const ALL: [SacredFrequency; 23] = [
        SolfeggioUt,
        SolfeggioRe,
        SolfeggioMi,
        SolfeggioFa,
        SolfeggioSol,
        SolfeggioLa,
        SolfeggioSi,
        PlanetarySun,
        PlanetaryMoon,
        PlanetaryMercury,
        PlanetaryVenus,
        PlanetaryEarth,
        PlanetaryMars,
        PlanetaryJupiter,
        PlanetarySaturn,
        SchumannFundamental,
        SchumannSecond,
        SchumannThird,
        SchumannFourth,
        SchumannFifth,
        TuningVerdi,
        TuningStandard,
        TuningScientific,
    ];

    /// Schumann harmonics above the fundamental, in order.
    pub const SCHUMANN_HARMONICS: [SacredFrequency; 4] =
        [SchumannSecond, SchumannThird, SchumannFourth, SchumannFifth];

    pub fn path(self) -> &'static str {
        match self {
            SolfeggioUt => "solfeggio.ut",
            SolfeggioRe => "solfeggio.re",
            SolfeggioMi => "solfeggio.mi",
            SolfeggioFa => "solfeggio.fa",
            SolfeggioSol => "solfeggio.sol",
            SolfeggioLa => "solfeggio.la",
            SolfeggioSi => "solfeggio.si",
            PlanetarySun => "planetary.sun",
            PlanetaryMoon => "planetary.moon",
            PlanetaryMercury => "planetary.mercury",
            PlanetaryVenus => "planetary.venus",
            PlanetaryEarth => "planetary.earth",
            PlanetaryMars => "planetary.mars",
            PlanetaryJupiter => "planetary.jupiter",
            PlanetarySaturn => "planetary.saturn",
            SchumannFundamental => "schumann.fundamental",
            SchumannSecond => "schumann.second",
            SchumannThird => "schumann.third",
            SchumannFourth => "schumann.fourth",
            SchumannFifth => "schumann.fifth",
            TuningVerdi => "tuning.verdi",
            TuningStandard => "tuning.standard",
            TuningScientific => "tuning.scientific",
        }
    }

    pub fn hz(self) -> f32 {
        match self {
            SolfeggioUt => 396.0,
            SolfeggioRe => 417.0,
            SolfeggioMi => 528.0,
            SolfeggioFa => 639.0,
            SolfeggioSol => 741.0,
            SolfeggioLa => 852.0,
            SolfeggioSi => 963.0,
            PlanetarySun => 126.22,
            PlanetaryMoon => 210.42,
            PlanetaryMercury => 141.27,
            PlanetaryVenus => 221.23,
            PlanetaryEarth => 136.10,
            PlanetaryMars => 144.72,
            PlanetaryJupiter => 183.58,
            PlanetarySaturn => 147.85,
            SchumannFundamental => 7.83,
            SchumannSecond => 14.3,
            SchumannThird => 20.8,
            SchumannFourth => 27.3,
            SchumannFifth => 33.8,
            TuningVerdi => 432.0,
            TuningStandard => 440.0,
            TuningScientific => 256.0,
        }
    }

    /// Group part of the path (`solfeggio`, `planetary`, ...).
    pub fn group(self) -> &'static str {
        self.path().split('.').next().unwrap_or_default()
    }
}

impl fmt::Display for SacredFrequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

impl FromStr for SacredFrequency {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        lookup(&Self::ALL, Self::path, Catalog::Sacred, s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dotted_paths_resolve() {
        let mi: SacredFrequency = "solfeggio.mi".parse().unwrap();
        assert_eq!(mi, SolfeggioMi);
        assert_eq!(mi.hz(), 528.0);
        assert_eq!(mi.group(), "solfeggio");
    }

    #[test]
    fn unknown_paths_are_rejected() {
        for key in ["not.a.key", "solfeggio", "mi", "solfeggio.MI", ""] {
            assert_eq!(
                key.parse::<SacredFrequency>(),
                Err(EngineError::unknown_key(Catalog::Sacred, key))
            );
        }
    }

    #[test]
    fn every_path_is_unique_and_parses_back() {
        for freq in SacredFrequency::ALL {
            assert_eq!(freq.path().parse::<SacredFrequency>(), Ok(freq));
            assert!(freq.hz() > 0.0);
        }
    }
}
