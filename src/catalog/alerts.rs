use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::EngineError;

/// Urgency of an alert, 1 (lowest) to 4.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum AlertLevel {
    Notice = 1,
    Caution = 2,
    Warning = 3,
    Critical = 4,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AlertPreset {
    pub frequency: f32,
    pub pulses: u32,
    /// Length of the whole train of pulses, gaps excluded.
    pub duration: f64,
}

impl AlertLevel {
    pub fn level(self) -> u8 {
        self as u8
    }

    pub fn preset(self) -> AlertPreset {
        let (frequency, pulses, duration) = match self {
            AlertLevel::Notice => (440.0, 1, 0.3),
            AlertLevel::Caution => (660.0, 2, 0.5),
            AlertLevel::Warning => (880.0, 3, 0.8),
            AlertLevel::Critical => (1100.0, 5, 1.0),
        };
        AlertPreset {
            frequency,
            pulses,
            duration,
        }
    }
}

impl TryFrom<u8> for AlertLevel {
    type Error = EngineError;

    fn try_from(level: u8) -> Result<Self, Self::Error> {
        match level {
            1 => Ok(AlertLevel::Notice),
            2 => Ok(AlertLevel::Caution),
            3 => Ok(AlertLevel::Warning),
            4 => Ok(AlertLevel::Critical),
            other => Err(EngineError::InvalidAlertLevel(other)),
        }
    }
}

impl fmt::Display for AlertLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "level {}", self.level())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn levels_map_to_presets() {
        let critical = AlertLevel::try_from(4).unwrap();
        assert_eq!(critical, AlertLevel::Critical);
        assert_eq!(critical.preset().pulses, 5);
        assert_eq!(AlertLevel::Notice.preset().frequency, 440.0);
    }

    #[test]
    fn out_of_range_levels_are_rejected() {
        assert_eq!(AlertLevel::try_from(0), Err(EngineError::InvalidAlertLevel(0)));
        assert_eq!(AlertLevel::try_from(5), Err(EngineError::InvalidAlertLevel(5)));
    }
}
