//! Automatable parameter timelines.

/*
Parameter Automation
====================

Every gain, frequency and pan value a voice owns is a `Param`: a value that
follows a timeline of scheduled events on the audio clock. Events are kept
sorted by time and consumed as rendering moves past them.

  Set { time, value }          jump to `value` at `time`
  Linear { time, value }       ramp linearly from the previous event to
                               `value`, arriving at `time`
  Exponential { time, value }  ramp geometrically, arriving at `time`

A ramp always starts at the previous event (or the anchor, if everything
before it has already been consumed):

     value
       │          Linear(t2, 1.0)
   1.0 ┤            ╱‾‾‾‾‾‾‾‾‾‾‾╲
       │          ╱               ╲  Linear(t4, 0.0)
       │        ╱                   ╲
   0.0 ┼──────●                       ●─────────
       └──────t1──────t2──────t3──────t4──────→ time
            Set(t1, 0.0)       Set(t3, 1.0)

Exponential ramps cannot cross or touch zero. When either end is not
strictly positive (or the signs differ) the ramp holds its start value until
the end time and then jumps, which keeps the math finite.

`cancel_and_hold` freezes the value at a given time and discards everything
after it, which is how a fade-out is started from wherever a fade-in got to.
*/

use std::collections::VecDeque;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Automation {
    Set { time: f64, value: f32 },
    Linear { time: f64, value: f32 },
    Exponential { time: f64, value: f32 },
}

impl Automation {
    #[inline]
    pub fn time(&self) -> f64 {
        match *self {
            Automation::Set { time, .. }
            | Automation::Linear { time, .. }
            | Automation::Exponential { time, .. } => time,
        }
    }

    #[inline]
    pub fn value(&self) -> f32 {
        match *self {
            Automation::Set { value, .. }
            | Automation::Linear { value, .. }
            | Automation::Exponential { value, .. } => value,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Param {
    /// Time and value of the last consumed event.
    anchor: (f64, f32),
    events: VecDeque<Automation>,
    current: f32,
}

impl Param {
    pub fn new(value: f32) -> Self {
        Self {
            anchor: (0.0, value),
            events: VecDeque::new(),
            current: value,
        }
    }

    /// Value produced by the most recent render.
    pub fn current(&self) -> f32 {
        self.current
    }

    /// Number of events not yet consumed.
    pub fn pending(&self) -> usize {
        self.events.len()
    }

    /// Drop the timeline and jump to `value` immediately.
    pub fn set_value(&mut self, value: f32) {
        self.events.clear();
        self.anchor.1 = value;
        self.current = value;
    }

    pub fn set_value_at(&mut self, value: f32, time: f64) {
        self.insert(Automation::Set { time, value });
    }

    pub fn linear_ramp_to(&mut self, value: f32, end_time: f64) {
        self.insert(Automation::Linear {
            time: end_time,
            value,
        });
    }

    pub fn exponential_ramp_to(&mut self, value: f32, end_time: f64) {
        self.insert(Automation::Exponential {
            time: end_time,
            value,
        });
    }

    /// Freeze the value the timeline has at `time` and drop everything after.
    pub fn cancel_and_hold(&mut self, time: f64) {
        let held = self.value_at(time);
        self.events.retain(|event| event.time() <= time);
        self.set_value_at(held, time);
    }

    /// Hold the current value at `now` and ramp linearly to `target` over `seconds`.
    pub fn ramp_from_current(&mut self, target: f32, now: f64, seconds: f64) {
        self.cancel_and_hold(now);
        if seconds > 0.0 {
            self.linear_ramp_to(target, now + seconds);
        } else {
            self.set_value_at(target, now);
        }
    }

    /// Value of the timeline at `time`, without consuming anything.
    pub fn value_at(&self, time: f64) -> f32 {
        let mut prev = self.anchor;
        for event in &self.events {
            if event.time() <= time {
                prev = (event.time(), event.value());
                continue;
            }
            return interpolate(prev, event, time);
        }
        prev.1
    }

    /// Fill `out` with per-sample values starting at `start_time`, consuming
    /// events the block moves past.
    pub fn render(&mut self, out: &mut [f32], start_time: f64, sample_rate: f32) {
        if self.events.is_empty() {
            out.fill(self.anchor.1);
            self.current = self.anchor.1;
            return;
        }

        let dt = 1.0 / sample_rate as f64;
        for (i, sample) in out.iter_mut().enumerate() {
            let t = start_time + i as f64 * dt;
            while let Some(event) = self.events.front() {
                if event.time() > t {
                    break;
                }
                self.anchor = (event.time(), event.value());
                self.events.pop_front();
            }
            *sample = match self.events.front() {
                Some(next) => interpolate(self.anchor, next, t),
                None => self.anchor.1,
            };
        }

        if let Some(&last) = out.last() {
            self.current = last;
        }
    }

    /// Sorted insert; events at equal times keep their insertion order.
    fn insert(&mut self, event: Automation) {
        let time = event.time();
        let index = self.events.partition_point(|existing| existing.time() <= time);
        self.events.insert(index, event);
    }
}

#[inline]
fn interpolate(prev: (f64, f32), next: &Automation, t: f64) -> f32 {
    let (t0, v0) = prev;
    match *next {
        Automation::Set { .. } => v0,
        Automation::Linear { time: t1, value: v1 } => {
            if t1 <= t0 {
                return v1;
            }
            let frac = ((t - t0) / (t1 - t0)).clamp(0.0, 1.0) as f32;
            v0 + (v1 - v0) * frac
        }
        Automation::Exponential { time: t1, value: v1 } => {
            if t1 <= t0 {
                return v1;
            }
            if v0 == 0.0 || v1 == 0.0 || (v0 < 0.0) != (v1 < 0.0) {
                return v0;
            }
            let frac = ((t - t0) / (t1 - t0)).clamp(0.0, 1.0) as f32;
            v0 * (v1 / v0).powf(frac)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SR: f32 = 1_000.0;

    #[test]
    fn holds_initial_value_without_events() {
        let mut param = Param::new(0.5);
        let mut buffer = vec![0.0; 16];
        param.render(&mut buffer, 0.0, SR);
        assert!(buffer.iter().all(|&v| v == 0.5));
        assert_eq!(param.current(), 0.5);
    }

    #[test]
    fn linear_ramp_reaches_target_at_end_time() {
        let mut param = Param::new(0.0);
        param.set_value_at(0.0, 0.0);
        param.linear_ramp_to(1.0, 0.1);

        assert!((param.value_at(0.05) - 0.5).abs() < 1e-6);
        assert_eq!(param.value_at(0.1), 1.0);
        assert_eq!(param.value_at(5.0), 1.0);

        let mut buffer = vec![0.0; 200];
        param.render(&mut buffer, 0.0, SR);
        assert!((buffer[50] - 0.5).abs() < 1e-3);
        assert_eq!(buffer[150], 1.0);
        assert_eq!(param.pending(), 0);
    }

    #[test]
    fn exponential_ramp_is_geometric() {
        let mut param = Param::new(1.0);
        param.set_value_at(1.0, 0.0);
        param.exponential_ramp_to(0.01, 1.0);

        // halfway in time = geometric mean of the endpoints
        assert!((param.value_at(0.5) - 0.1).abs() < 1e-4);
        assert!((param.value_at(1.0) - 0.01).abs() < 1e-6);
    }

    #[test]
    fn exponential_ramp_from_zero_holds_then_jumps() {
        let mut param = Param::new(0.0);
        param.set_value_at(0.0, 0.0);
        param.exponential_ramp_to(1.0, 1.0);

        assert_eq!(param.value_at(0.5), 0.0);
        assert_eq!(param.value_at(1.0), 1.0);
    }

    #[test]
    fn cancel_and_hold_freezes_mid_ramp() {
        let mut param = Param::new(0.0);
        param.set_value_at(0.0, 0.0);
        param.linear_ramp_to(1.0, 1.0);
        param.cancel_and_hold(0.25);

        assert!((param.value_at(0.25) - 0.25).abs() < 1e-6);
        assert!((param.value_at(0.9) - 0.25).abs() < 1e-6);
    }

    #[test]
    fn ramp_from_current_starts_where_the_value_is() {
        let mut param = Param::new(0.7);
        param.ramp_from_current(0.0, 2.0, 0.05);

        assert!((param.value_at(2.0) - 0.7).abs() < 1e-6);
        assert!((param.value_at(2.025) - 0.35).abs() < 1e-4);
        assert_eq!(param.value_at(2.05), 0.0);
    }

    #[test]
    fn events_at_the_same_time_apply_in_insertion_order() {
        let mut param = Param::new(0.0);
        param.set_value_at(0.2, 1.0);
        param.set_value_at(0.8, 1.0);
        assert_eq!(param.value_at(1.0), 0.8);
    }

    #[test]
    fn render_consumes_events_across_blocks() {
        let mut param = Param::new(0.0);
        param.set_value_at(0.0, 0.0);
        param.linear_ramp_to(1.0, 0.064);

        let mut block = vec![0.0; 32];
        param.render(&mut block, 0.0, SR);
        assert!((block[31] - 31.0 / 64.0).abs() < 1e-3);
        param.render(&mut block, 0.032, SR);
        assert!((block[31] - 63.0 / 64.0).abs() < 1e-3);
        param.render(&mut block, 0.064, SR);
        assert!(block.iter().all(|&v| v == 1.0));
    }
}
