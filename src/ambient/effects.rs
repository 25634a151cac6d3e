use rand::Rng;

use crate::ambient::AmbientLayer;
use crate::config::ambient::{
    CHIME_DECAY, CHIME_REST, FLUX_FREQUENCY, GLITCH_LENGTH, GLITCH_REST,
};

/*
Re-triggering effects
=====================

Chimes and glitches fire, wait, and fire again for as long as their layer is
wanted. Each one is a small state machine stepped once per block:

        ┌──────────────────────────────────────────────┐
        ▼                                              │
    Armed(at) ──now ≥ at, layer active──→ Sounding(until) ──now ≥ until──→ CoolingDown(until)
        │
        └──now ≥ at, layer inactive──→ Finished

The layer flag is read only on the Armed edge. Stopping a layer therefore
never cuts a chime that is already ringing; it only stops the next one from
firing. The owner passes `active = false` when the layer was stopped, and
also when the layer was stopped and started again since this effect was
created (the generation no longer matches), so old chains die out instead of
doubling up with the new ones.

`step` is handed the end of the block about to be rendered. Whatever fires
carries its exact start time, so the owner can place it sample-accurately.
*/

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EffectPhase {
    Armed { at: f64 },
    Sounding { until: f64 },
    CoolingDown { until: f64 },
    Finished,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EffectKind {
    /// A bell at a fixed frequency, spawned as its own short voice.
    Chime { frequency: f32 },
    /// A gain burst on one chain of the layer voice, retuned each time.
    Glitch { chain: usize },
}

/// What the owner has to do when an effect fires.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EffectAction {
    Chime {
        layer: AmbientLayer,
        frequency: f32,
        at: f64,
        decay: f64,
    },
    Glitch {
        layer: AmbientLayer,
        chain: usize,
        at: f64,
        length: f64,
        frequency: f32,
    },
}

#[derive(Debug, Clone)]
pub struct RetriggerEffect {
    layer: AmbientLayer,
    generation: u64,
    kind: EffectKind,
    phase: EffectPhase,
}

impl RetriggerEffect {
    pub fn chime(layer: AmbientLayer, generation: u64, frequency: f32, first_at: f64) -> Self {
        Self::new(layer, generation, EffectKind::Chime { frequency }, first_at)
    }

    pub fn glitch(layer: AmbientLayer, generation: u64, chain: usize, first_at: f64) -> Self {
        Self::new(layer, generation, EffectKind::Glitch { chain }, first_at)
    }

    fn new(layer: AmbientLayer, generation: u64, kind: EffectKind, first_at: f64) -> Self {
        Self {
            layer,
            generation,
            kind,
            phase: EffectPhase::Armed { at: first_at },
        }
    }

    pub fn layer(&self) -> AmbientLayer {
        self.layer
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn kind(&self) -> EffectKind {
        self.kind
    }

    pub fn phase(&self) -> EffectPhase {
        self.phase
    }

    pub fn is_finished(&self) -> bool {
        self.phase == EffectPhase::Finished
    }

    /// Advance to `now`. Fires at most once per call.
    pub fn step<R: Rng + ?Sized>(
        &mut self,
        now: f64,
        active: bool,
        rng: &mut R,
    ) -> Option<EffectAction> {
        loop {
            match self.phase {
                EffectPhase::Armed { at } if now >= at => {
                    if !active {
                        self.phase = EffectPhase::Finished;
                        return None;
                    }
                    let (action, until) = self.fire(at, rng);
                    self.phase = EffectPhase::Sounding { until };
                    return Some(action);
                }
                EffectPhase::Sounding { until } if now >= until => {
                    self.phase = EffectPhase::CoolingDown {
                        until: until + self.rest(rng),
                    };
                }
                EffectPhase::CoolingDown { until } if now >= until => {
                    self.phase = EffectPhase::Armed { at: until };
                }
                _ => return None,
            }
        }
    }

    fn fire<R: Rng + ?Sized>(&self, at: f64, rng: &mut R) -> (EffectAction, f64) {
        match self.kind {
            EffectKind::Chime { frequency } => {
                let decay = rng.gen_range(CHIME_DECAY.0..CHIME_DECAY.1);
                let action = EffectAction::Chime {
                    layer: self.layer,
                    frequency,
                    at,
                    decay,
                };
                (action, at + decay)
            }
            EffectKind::Glitch { chain } => {
                let length = rng.gen_range(GLITCH_LENGTH.0..GLITCH_LENGTH.1);
                let action = EffectAction::Glitch {
                    layer: self.layer,
                    chain,
                    at,
                    length,
                    frequency: rng.gen_range(FLUX_FREQUENCY.0..FLUX_FREQUENCY.1),
                };
                (action, at + length)
            }
        }
    }

    fn rest<R: Rng + ?Sized>(&self, rng: &mut R) -> f64 {
        let (lo, hi) = match self.kind {
            EffectKind::Chime { .. } => CHIME_REST,
            EffectKind::Glitch { .. } => GLITCH_REST,
        };
        rng.gen_range(lo..hi)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn rng() -> StdRng {
        StdRng::seed_from_u64(11)
    }

    #[test]
    fn waits_for_its_arm_time() {
        let mut rng = rng();
        let mut chime = RetriggerEffect::chime(AmbientLayer::CrystalResonance, 0, 1046.5, 2.0);
        assert_eq!(chime.step(1.0, true, &mut rng), None);
        assert_eq!(chime.phase(), EffectPhase::Armed { at: 2.0 });

        match chime.step(2.5, true, &mut rng) {
            Some(EffectAction::Chime { at, frequency, decay, .. }) => {
                assert_eq!(at, 2.0);
                assert_eq!(frequency, 1046.5);
                assert!((CHIME_DECAY.0..CHIME_DECAY.1).contains(&decay));
                assert_eq!(chime.phase(), EffectPhase::Sounding { until: 2.0 + decay });
            }
            other => panic!("expected a chime, got {other:?}"),
        }
    }

    #[test]
    fn inactive_layer_finishes_at_the_arm_point() {
        let mut rng = rng();
        let mut glitch = RetriggerEffect::glitch(AmbientLayer::QuantumFlux, 0, 3, 1.0);
        assert_eq!(glitch.step(0.5, false, &mut rng), None);
        assert!(!glitch.is_finished());
        assert_eq!(glitch.step(1.0, false, &mut rng), None);
        assert!(glitch.is_finished());
        assert_eq!(glitch.step(100.0, true, &mut rng), None);
    }

    #[test]
    fn deactivation_does_not_cut_a_sounding_effect() {
        let mut rng = rng();
        let mut chime = RetriggerEffect::chime(AmbientLayer::CrystalResonance, 0, 2093.0, 0.0);
        assert!(chime.step(0.0, true, &mut rng).is_some());

        // still sounding: the flag is not consulted
        assert_eq!(chime.step(0.5, false, &mut rng), None);
        assert!(matches!(chime.phase(), EffectPhase::Sounding { .. }));

        // past decay and rest, at the next arm it sees the flag and stops
        assert_eq!(chime.step(60.0, false, &mut rng), None);
        assert!(chime.is_finished());
    }

    #[test]
    fn keeps_firing_while_active() {
        let mut rng = rng();
        let mut glitch = RetriggerEffect::glitch(AmbientLayer::QuantumFlux, 0, 0, 0.0);
        let mut fired = Vec::new();
        let mut t = 0.0;
        while t < 30.0 {
            if let Some(EffectAction::Glitch { at, length, .. }) = glitch.step(t, true, &mut rng) {
                fired.push((at, length));
            }
            t += 0.01;
        }
        assert!(fired.len() > 10, "only {} glitches", fired.len());
        // never overlapping: each starts after the previous one ended
        for pair in fired.windows(2) {
            assert!(pair[1].0 >= pair[0].0 + pair[0].1);
        }
    }
}
