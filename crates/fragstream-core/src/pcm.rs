//! Seam between the engine and a concrete PCM playback API.

use crate::error::{ConfigureError, PcmError};
use crate::format::SampleFormat;
use crate::volume::VolumeControl;

/// How the sample rate should be requested.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateRequest {
    /// Accept the closest rate the device supports. Callers must use the granted rate.
    Nearest(u32),
    /// The device must accept exactly this rate.
    Exact(u32),
}

impl RateRequest {
    pub fn hz(&self) -> u32 {
        match *self {
            Self::Nearest(hz) | Self::Exact(hz) => hz,
        }
    }
}

/// How the fragment (period) count should be requested.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PeriodRequest {
    /// Ask for this many periods; the device may grant a different count.
    Count(u32),
    /// Any count in `min..=max`.
    Range { min: u32, max: u32 },
}

/// Hardware parameter set sent to the device. Access is always interleaved read/write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HwRequest {
    pub format: SampleFormat,
    pub channels: u32,
    pub rate: RateRequest,
    pub period_frames: u32,
    pub periods: PeriodRequest,
    /// Leave the device in the prepared state once the parameters are installed.
    pub prepare: bool,
}

/// Values the device actually accepted, read back after installing a [`HwRequest`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HwGrant {
    pub rate_hz: u32,
    pub period_frames: u32,
    pub periods: u32,
}

/// An open playback stream on some device. Dropping the value closes the device.
pub trait PcmDevice {
    /// Install hardware parameters and read back what the device accepted.
    fn configure(&mut self, request: &HwRequest) -> Result<HwGrant, ConfigureError>;

    /// Reset the stream to its pre-roll state, ready to accept writes.
    fn prepare(&mut self) -> Result<(), PcmError>;

    /// Leave a suspended state. [`PcmError::WouldBlock`] means the device is not ready yet.
    fn resume(&mut self) -> Result<(), PcmError>;

    /// Write interleaved frames from `data`, which holds a whole number of frames. Returns the
    /// number of frames the device took.
    fn write_interleaved(&mut self, data: &[u8]) -> Result<usize, PcmError>;
}

/// Opens PCM devices and their optional volume controls by identifier.
pub trait PcmBackend {
    type Device: PcmDevice + Send + 'static;

    /// Open a playback stream in non-blocking mode.
    fn open_pcm(&self, device: &str) -> Result<Self::Device, PcmError>;

    /// Attach to the volume element `element` of `device`. Failing here never fails `open`.
    fn attach_volume(
        &self,
        device: &str,
        element: &str,
    ) -> Result<Box<dyn VolumeControl + Send>, PcmError>;
}
