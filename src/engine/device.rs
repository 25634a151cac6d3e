use crate::error::{EngineError, Result};

/*
Audio device and activation
===========================

The manager does not talk to hardware directly. It asks a `DeviceFactory`
for an `AudioDevice` on initialize, and only for the handle's sample rate
and run state: samples are pulled by whoever drives `AudioManager::render`
(the cpal callback in the player, a loop in tests).

    DeviceFactory::open() ──→ Box<dyn AudioDevice> ──→ resume() if suspended

Platforms may refuse the device (no output, permissions). That failure is
reported and the manager stays uninitialized.

Lazy activation is a separate strategy: an `ActivationPolicy` says which
user gesture counts as permission to start audio. The manager consults it
until one gesture qualifies, and never again after that.
*/

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceStatus {
    Running,
    Suspended,
    Closed,
}

pub trait AudioDevice: Send {
    fn sample_rate(&self) -> f32;

    fn status(&self) -> DeviceStatus;

    fn resume(&mut self) -> Result<()>;

    fn close(&mut self);
}

/// Opens the shared device. Any `FnMut() -> Result<Box<dyn AudioDevice>>` works.
pub trait DeviceFactory: Send {
    fn open(&mut self) -> Result<Box<dyn AudioDevice>>;
}

impl<F> DeviceFactory for F
where
    F: FnMut() -> Result<Box<dyn AudioDevice>> + Send,
{
    fn open(&mut self) -> Result<Box<dyn AudioDevice>> {
        self()
    }
}

/// Headless device: render calls are the only clock.
#[derive(Debug, Clone)]
pub struct OfflineDevice {
    sample_rate: f32,
    status: DeviceStatus,
}

impl OfflineDevice {
    pub fn new(sample_rate: f32) -> Self {
        Self {
            sample_rate,
            status: DeviceStatus::Running,
        }
    }

    /// Starts suspended, like a browser context created before a gesture.
    pub fn suspended(sample_rate: f32) -> Self {
        Self {
            sample_rate,
            status: DeviceStatus::Suspended,
        }
    }

    /// Factory producing offline devices at `sample_rate`.
    pub fn factory(sample_rate: f32) -> impl DeviceFactory {
        move || -> Result<Box<dyn AudioDevice>> { Ok(Box::new(OfflineDevice::new(sample_rate))) }
    }
}

impl AudioDevice for OfflineDevice {
    fn sample_rate(&self) -> f32 {
        self.sample_rate
    }

    fn status(&self) -> DeviceStatus {
        self.status
    }

    fn resume(&mut self) -> Result<()> {
        match self.status {
            DeviceStatus::Closed => Err(EngineError::DeviceUnavailable(
                "device is closed".to_string(),
            )),
            _ => {
                self.status = DeviceStatus::Running;
                Ok(())
            }
        }
    }

    fn close(&mut self) {
        self.status = DeviceStatus::Closed;
    }
}

/// User gestures the host forwards to the manager.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Interaction {
    Click,
    KeyDown,
    PointerMove,
    Scroll,
    Focus,
}

/// Decides which gesture unlocks audio.
pub trait ActivationPolicy: Send {
    fn qualifies(&self, interaction: Interaction) -> bool;
}

/// The first click or key press.
#[derive(Debug, Clone, Copy, Default)]
pub struct FirstGesture;

impl ActivationPolicy for FirstGesture {
    fn qualifies(&self, interaction: Interaction) -> bool {
        matches!(interaction, Interaction::Click | Interaction::KeyDown)
    }
}

impl<F> ActivationPolicy for F
where
    F: Fn(Interaction) -> bool + Send,
{
    fn qualifies(&self, interaction: Interaction) -> bool {
        self(interaction)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn offline_device_resumes_until_closed() {
        let mut device = OfflineDevice::suspended(44_100.0);
        assert_eq!(device.status(), DeviceStatus::Suspended);
        device.resume().unwrap();
        assert_eq!(device.status(), DeviceStatus::Running);

        device.close();
        assert!(matches!(
            device.resume(),
            Err(EngineError::DeviceUnavailable(_))
        ));
    }

    #[test]
    fn closures_are_factories_and_policies() {
        let mut factory = OfflineDevice::factory(22_050.0);
        let device = factory.open().unwrap();
        assert_eq!(device.sample_rate(), 22_050.0);

        let scroll_only = |interaction: Interaction| interaction == Interaction::Scroll;
        assert!(scroll_only.qualifies(Interaction::Scroll));
        assert!(!FirstGesture.qualifies(Interaction::Scroll));
        assert!(FirstGesture.qualifies(Interaction::KeyDown));
    }
}
