//! inharmonic - Terminal front end for the inharmonic synthesizer
//!
//! Run with: cargo run --release
//! Play with the computer keyboard, tweak parameters with the arrow keys.
//! Logs go to `inharmonic.log` in the working directory.

mod app;
mod ui;

use std::{fs::File, sync::Mutex};

use color_eyre::eyre::WrapErr;

const LOG_FILE: &str = "inharmonic.log";

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    // the terminal belongs to the UI, so logs go to a file
    let log = File::create(LOG_FILE).wrap_err("failed to create log file")?;
    tracing_subscriber::fmt()
        .with_writer(Mutex::new(log))
        .with_ansi(false)
        .with_max_level(tracing::Level::INFO)
        .init();

    app::run()
}
