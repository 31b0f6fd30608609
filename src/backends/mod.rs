//! # Backends
//!
//! Home of the PCM backends supported by the library.
//!
//! Each backend is provided in its own submodule. Types are public so that the user can pick a
//! specific backend instead of going through [`default_driver`].

#[cfg(os_alsa)]
pub mod alsa;

/// Returns the default driver for this platform.
///
/// | **Platform** | **Driver** |
/// |:------------:|:----------:|
/// |     Linux    |    ALSA    |
#[cfg(os_alsa)]
pub fn default_driver() -> alsa::AlsaDriver {
    alsa::AlsaDriver
}
