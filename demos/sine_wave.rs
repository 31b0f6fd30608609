//! Plays a 440 Hz tone on the configured ALSA device until Enter is pressed.
//!
//! Usage: `sine_wave [config.toml]`.

use anyhow::Result;
use fragstream::prelude::*;
use std::sync::Arc;

fn main() -> Result<()> {
    env_logger::init();

    let settings = match std::env::args().nth(1) {
        Some(path) => SoundSettings::from_store(&TomlConfig::load(path)?)?,
        None => SoundSettings::default(),
    };
    let driver = default_driver();
    let registrar = Arc::new(BackgroundManager::new()?);
    let handle = driver.open(OpenRequest {
        settings,
        desired: DesiredFormat::new(16, true, 44100),
        voices: 1,
        mixer: Box::new(ToneMixer::new(440.0)),
        registrar,
    })?;
    println!("{}", handle.description());
    println!(
        "Buffer: {} frames in {} fragments",
        driver.buffer_size_frames(&handle),
        handle.config().fragment_count
    );
    driver.set_volume(&handle, 192);

    println!("Press Enter to stop");
    std::io::stdin().read_line(&mut String::new())?;
    let stats = handle.stats();
    driver.close(handle);
    println!(
        "{} ticks, {} fragments, {} underruns, {} suspends",
        stats.ticks, stats.fragments_written, stats.underruns, stats.suspends
    );
    Ok(())
}
