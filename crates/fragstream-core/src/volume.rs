//! Best-effort hardware volume control.

use crate::error::PcmError;

/// Hardware volume element with a native value range.
pub trait VolumeControl {
    /// Native `(min, max)` playback volume range of the element.
    fn playback_range(&self) -> (i64, i64);

    /// Set left and right playback volume, in native units.
    fn set_playback_volume(&mut self, left: i64, right: i64) -> Result<(), PcmError>;
}

/// Maps host volume (0..=255) onto a native hardware range.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VolumeScale {
    ratio: f64,
}

impl VolumeScale {
    pub fn new(min: i64, max: i64) -> Self {
        Self {
            ratio: (max - min) as f64 / 255.0,
        }
    }

    pub fn ratio(&self) -> f64 {
        self.ratio
    }

    /// Rounds the host value first, then multiplies by the ratio and truncates.
    pub fn to_native(&self, volume: u8) -> i64 {
        let rounded = (f64::from(volume) + 0.5).floor() as i64;
        (rounded as f64 * self.ratio) as i64
    }
}

/// A [`VolumeControl`] paired with its scale. Absent when attaching failed.
pub struct Volume {
    control: Box<dyn VolumeControl + Send>,
    scale: VolumeScale,
}

impl Volume {
    pub fn new(control: Box<dyn VolumeControl + Send>) -> Self {
        let (min, max) = control.playback_range();
        log::debug!(min, max; "Volume element attached");
        Self {
            control,
            scale: VolumeScale::new(min, max),
        }
    }

    pub fn set(&mut self, volume: u8) {
        let native = self.scale.to_native(volume);
        if let Err(err) = self.control.set_playback_volume(native, native) {
            log::warn!(volume, native; "Cannot set playback volume: {err}");
        }
    }
}
