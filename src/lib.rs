//! # fragstream
//!
//! Fragment streaming for PCM playback devices: negotiates a sample format and fragment layout
//! with the device, then writes host-mixed fragments on every tick of a periodic task, recovering
//! from underruns and power-management suspends along the way.
//!
//! The device-independent engine lives in [`fragstream_core`] and is re-exported here. This crate
//! adds the ALSA backend, a threaded task registrar, a TOML configuration store and a couple of
//! ready-made host mixers.

pub use fragstream_core::*;

pub mod background;
pub mod backends;
pub mod mixers;
pub mod prelude;
pub mod sample;
pub mod toml_config;
