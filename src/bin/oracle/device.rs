//! Device handle for the cpal stream owned by `Oracle::run`

use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

use oracle_audio::{
    engine::{AudioDevice, DeviceStatus},
    error::Result,
};

/// The stream itself stays on the main thread; the manager only sees its
/// sample rate and a flag the callback checks before pulling samples.
pub struct StreamDevice {
    sample_rate: f32,
    running: Arc<AtomicBool>,
    closed: bool,
}

impl StreamDevice {
    pub fn new(sample_rate: f32, running: Arc<AtomicBool>) -> Self {
        Self {
            sample_rate,
            running,
            closed: false,
        }
    }
}

impl AudioDevice for StreamDevice {
    fn sample_rate(&self) -> f32 {
        self.sample_rate
    }

    fn status(&self) -> DeviceStatus {
        if self.closed {
            DeviceStatus::Closed
        } else if self.running.load(Ordering::Acquire) {
            DeviceStatus::Running
        } else {
            DeviceStatus::Suspended
        }
    }

    fn resume(&mut self) -> Result<()> {
        self.running.store(true, Ordering::Release);
        Ok(())
    }

    fn close(&mut self) {
        self.running.store(false, Ordering::Release);
        self.closed = true;
    }
}
