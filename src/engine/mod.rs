//! The audio graph manager and the machinery under it: category mixing, the
//! event scheduler, device abstraction and the per-sound voice builders.

pub mod command;
pub mod device;
pub mod manager;
pub mod mixer;
pub mod scheduler;
mod session;
pub mod sounds;

pub use command::{Command, CommandReceiver};
pub use device::{
    ActivationPolicy, AudioDevice, DeviceFactory, DeviceStatus, FirstGesture, Interaction,
    OfflineDevice,
};
pub use manager::{AudioManager, DeviceState, Diagnostic};
pub use mixer::{Category, Mixer};
pub use scheduler::Scheduler;
pub use sounds::{Modulation, SacredOptions, ToneEnvelope};
