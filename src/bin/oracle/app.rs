//! Oracle - audio stream setup and the shared engine

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use color_eyre::eyre::{eyre, Result as EyreResult, WrapErr};
use rtrb::RingBuffer;
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc, Mutex,
};
use tracing::{error, info};

use oracle_audio::{
    engine::{AudioDevice, Command},
    AudioManager, EngineConfig, MAX_BLOCK_SIZE,
};

use super::device::StreamDevice;
use super::ui::UiApp;

/// Control messages buffered between key presses and the audio callback.
const COMMAND_QUEUE: usize = 64;

pub struct Oracle {
    config: EngineConfig,
}

impl Oracle {
    pub fn new(config: EngineConfig) -> Self {
        Self { config }
    }

    /// Open the output, hand the engine to the callback, run the UI until quit.
    pub fn run(self) -> EyreResult<()> {
        let host = cpal::default_host();
        let device = host
            .default_output_device()
            .ok_or_else(|| eyre!("no default output device available"))?;
        let config = device
            .default_output_config()
            .wrap_err("failed to fetch default output config")?;

        let sample_rate = config.sample_rate().0 as f32;
        let channels = config.channels() as usize;
        info!(sample_rate, channels, "output device ready");

        // Audio starts on the first key press, not before.
        let running = Arc::new(AtomicBool::new(false));
        let factory_flag = running.clone();
        let factory = move || -> oracle_audio::error::Result<Box<dyn AudioDevice>> {
            Ok(Box::new(StreamDevice::new(sample_rate, factory_flag.clone())))
        };
        let manager = Arc::new(Mutex::new(AudioManager::new(self.config, factory)));

        let (commands_tx, mut commands_rx) = RingBuffer::<Command>::new(COMMAND_QUEUE);

        let audio = manager.clone();
        let callback_flag = running.clone();
        let mut left = vec![0.0f32; MAX_BLOCK_SIZE];
        let mut right = vec![0.0f32; MAX_BLOCK_SIZE];

        let stream = device.build_output_stream(
            &config.into(),
            move |data: &mut [f32], _| {
                let Ok(mut audio) = audio.lock() else {
                    data.fill(0.0);
                    return;
                };
                audio.drain_commands(&mut commands_rx);
                if !callback_flag.load(Ordering::Acquire) {
                    data.fill(0.0);
                    return;
                }

                for frame in data.chunks_mut(MAX_BLOCK_SIZE * channels) {
                    let frames = frame.len() / channels;
                    let (l, r) = (&mut left[..frames], &mut right[..frames]);
                    audio.render(l, r);
                    interleave(frame, l, r, channels);
                }
            },
            |err| error!(%err, "audio stream error"),
            None,
        )?;
        stream.play()?;

        let mut terminal = ratatui::init();
        let result = UiApp::new(manager.clone(), commands_tx, sample_rate).run(&mut terminal);
        ratatui::restore();

        if let Ok(mut audio) = manager.lock() {
            audio.dispose();
        }
        drop(stream);
        result
    }
}

/// Stereo to the device layout. Mono outputs get the average, extra
/// channels stay silent.
fn interleave(out: &mut [f32], left: &[f32], right: &[f32], channels: usize) {
    for (i, frame) in out.chunks_mut(channels).enumerate() {
        match frame {
            [mono] => *mono = 0.5 * (left[i] + right[i]),
            [l, r, rest @ ..] => {
                *l = left[i];
                *r = right[i];
                rest.fill(0.0);
            }
            [] => {}
        }
    }
}
