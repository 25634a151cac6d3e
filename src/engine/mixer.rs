use std::{fmt, str::FromStr};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{
    config::EngineConfig,
    dsp::{
        mix::{multiply_in_place, sum_in_place},
        param::Param,
    },
    error::EngineError,
    graph::RenderCtx,
    MAX_BLOCK_SIZE,
};

/*
Mixer
=====

Every voice lands on exactly one category bus; every bus lands on master.

    sacred   ──→ × gain ─┐
    binaural ──→ × gain ─┤
    events   ──→ × gain ─┼──→ × master ─────────────┐
    ambient  ──→ × gain ─┘                          ├──→ out (L, R)
    alerts   ──→ × gain ──→ × master (ignores mute) ┘

Buses live in an array indexed by `Category`, so a voice cannot name a bus
that does not exist.

Volume changes never step. They ramp linearly from wherever the gain is at
the moment of the call, which also means a change issued mid-ramp starts
from the in-between value rather than jumping back.

Mute ramps master to zero but remembers the volume to return to. Alerts
follow a second master gain that tracks volume changes and ignores mute, so
they stay audible (at their category volume) while everything else is muted.
*/

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize), serde(rename_all = "lowercase"))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    Sacred,
    Binaural,
    Events,
    Ambient,
    Alerts,
}

impl Category {
    pub const COUNT: usize = 5;

    pub const ALL: [Category; Category::COUNT] = [
        Category::Sacred,
        Category::Binaural,
        Category::Events,
        Category::Ambient,
        Category::Alerts,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn name(self) -> &'static str {
        match self {
            Category::Sacred => "sacred",
            Category::Binaural => "binaural",
            Category::Events => "events",
            Category::Ambient => "ambient",
            Category::Alerts => "alerts",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Category {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Category::ALL
            .into_iter()
            .find(|category| category.name() == s)
            .ok_or_else(|| EngineError::UnknownCategory(s.to_string()))
    }
}

struct Bus {
    gain: Param,
    volume: f32,
    left: Vec<f32>,
    right: Vec<f32>,
}

impl Bus {
    fn new(volume: f32) -> Self {
        Self {
            gain: Param::new(volume),
            volume,
            left: vec![0.0; MAX_BLOCK_SIZE],
            right: vec![0.0; MAX_BLOCK_SIZE],
        }
    }
}

/// `volume` clamped to `0.0..=1.0`, or `None` when it is NaN or infinite.
pub fn unit_volume(volume: f32) -> Option<f32> {
    volume.is_finite().then(|| volume.clamp(0.0, 1.0))
}

pub struct Mixer {
    buses: [Bus; Category::COUNT],
    master: Param,
    alert_master: Param,
    master_volume: f32,
    muted: bool,
    ramp: f64,
    gain_buffer: Vec<f32>,
}

impl Mixer {
    pub fn new(config: &EngineConfig) -> Self {
        let master_volume = config.master_volume.clamp(0.0, 1.0);
        Self {
            buses: std::array::from_fn(|i| Bus::new(config.category_volumes[i].clamp(0.0, 1.0))),
            master: Param::new(master_volume),
            alert_master: Param::new(master_volume),
            master_volume,
            muted: false,
            ramp: config.volume_ramp,
            gain_buffer: vec![0.0; MAX_BLOCK_SIZE],
        }
    }

    /// Zero the first `len` samples of every bus.
    pub fn clear(&mut self, len: usize) {
        for bus in &mut self.buses {
            bus.left[..len].fill(0.0);
            bus.right[..len].fill(0.0);
        }
    }

    /// Stereo input of a bus, `len` samples long.
    pub fn bus_mut(&mut self, category: Category, len: usize) -> (&mut [f32], &mut [f32]) {
        let bus = &mut self.buses[category.index()];
        (&mut bus.left[..len], &mut bus.right[..len])
    }

    pub fn set_master_volume(&mut self, volume: f32, now: f64) {
        let Some(volume) = unit_volume(volume) else {
            return;
        };
        self.master_volume = volume;
        self.alert_master
            .ramp_from_current(self.master_volume, now, self.ramp);
        if !self.muted {
            self.master
                .ramp_from_current(self.master_volume, now, self.ramp);
        }
    }

    pub fn set_category_volume(&mut self, category: Category, volume: f32, now: f64) {
        let Some(volume) = unit_volume(volume) else {
            return;
        };
        let bus = &mut self.buses[category.index()];
        bus.volume = volume;
        bus.gain.ramp_from_current(bus.volume, now, self.ramp);
    }

    /// Flip mute and return the new state.
    pub fn toggle_mute(&mut self, now: f64) -> bool {
        self.muted = !self.muted;
        let target = if self.muted { 0.0 } else { self.master_volume };
        self.master.ramp_from_current(target, now, self.ramp);
        self.muted
    }

    pub fn is_muted(&self) -> bool {
        self.muted
    }

    /// Volume master returns to when unmuted.
    pub fn master_volume(&self) -> f32 {
        self.master_volume
    }

    /// Master gain in effect at `now`, mute and ramps included.
    pub fn master_gain(&self, now: f64) -> f32 {
        self.master.value_at(now)
    }

    /// Bus gain in effect at `now`.
    pub fn category_gain(&self, category: Category, now: f64) -> f32 {
        self.buses[category.index()].gain.value_at(now)
    }

    /// Volume a bus is set to (the end point of any ramp).
    pub fn category_volume(&self, category: Category) -> f32 {
        self.buses[category.index()].volume
    }

    /// Apply bus and master gains and sum every bus into `left`/`right`.
    pub fn mix(&mut self, left: &mut [f32], right: &mut [f32], ctx: &RenderCtx) {
        let len = left.len().min(right.len());
        let (left, right) = (&mut left[..len], &mut right[..len]);
        left.fill(0.0);
        right.fill(0.0);

        let gain = &mut self.gain_buffer[..len];
        for bus in &mut self.buses {
            bus.gain.render(gain, ctx.time, ctx.sample_rate);
            multiply_in_place(&mut bus.left[..len], gain);
            multiply_in_place(&mut bus.right[..len], gain);
        }

        let alerts = Category::Alerts.index();
        for (index, bus) in self.buses.iter().enumerate() {
            if index != alerts {
                sum_in_place(left, &bus.left[..len]);
                sum_in_place(right, &bus.right[..len]);
            }
        }
        self.master.render(gain, ctx.time, ctx.sample_rate);
        multiply_in_place(left, gain);
        multiply_in_place(right, gain);

        let bus = &mut self.buses[alerts];
        self.alert_master.render(gain, ctx.time, ctx.sample_rate);
        multiply_in_place(&mut bus.left[..len], gain);
        multiply_in_place(&mut bus.right[..len], gain);
        sum_in_place(left, &bus.left[..len]);
        sum_in_place(right, &bus.right[..len]);
    }
}
