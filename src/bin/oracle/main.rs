//! oracle - terminal player for the ambient engine
//!
//! Run with: cargo run --bin oracle
//! Logs go to `oracle.log`; set ORACLE_LOG (e.g. `oracle_audio=debug`) for more.

mod app;
mod device;
mod ui;

use std::{fs::File, sync::Mutex};

use color_eyre::eyre::{Result as EyreResult, WrapErr};
use tracing_subscriber::EnvFilter;

use app::Oracle;
use oracle_audio::EngineConfig;

const LOG_FILE: &str = "oracle.log";

fn main() -> EyreResult<()> {
    color_eyre::install()?;
    init_tracing()?;

    Oracle::new(EngineConfig::default().with_master_volume(0.5)).run()
}

/// The terminal belongs to the UI, so logs go to a file.
fn init_tracing() -> EyreResult<()> {
    let file = File::create(LOG_FILE).wrap_err("failed to create log file")?;
    let filter = EnvFilter::try_from_env("ORACLE_LOG")
        .unwrap_or_else(|_| EnvFilter::new("oracle_audio=info,oracle=info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_ansi(false)
        .with_writer(Mutex::new(file))
        .init();
    Ok(())
}
