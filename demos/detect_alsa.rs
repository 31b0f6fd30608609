//! Lists the ALSA playback devices and checks whether the configured one can be opened.
//!
//! Usage: `detect_alsa [config.toml]`. Without a file, the default `sound` settings are used.

use anyhow::Result;
use fragstream::backends::alsa::AlsaDriver;
use fragstream::prelude::*;

fn main() -> Result<()> {
    env_logger::init();

    let settings = match std::env::args().nth(1) {
        Some(path) => SoundSettings::from_store(&TomlConfig::load(path)?)?,
        None => SoundSettings::default(),
    };
    let driver = AlsaDriver;

    eprintln!("Driver name   : {}", AlsaDriver::DISPLAY_NAME);
    eprintln!("All playback devices");
    for device in driver.list_devices()? {
        eprintln!("\t{device}");
    }
    let device = settings.device();
    if driver.detect(&settings) {
        eprintln!("Configured device '{device}' is available");
    } else {
        eprintln!("Configured device '{device}' cannot be opened");
    }
    Ok(())
}
