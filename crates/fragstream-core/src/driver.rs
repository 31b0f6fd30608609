//! The driver interface a host talks to: detect, open, close and volume.

use crate::config::SoundSettings;
use crate::error::DeviceError;
use crate::pcm::PcmBackend;
use crate::stream::{self, DeviceHandle, OpenRequest};

/// Sound output drivers stream host-mixed audio to a PCM device in fixed-size fragments.
///
/// Voice control, panning and the like belong to the host mixer and are not part of this
/// interface. Only [`SoundDriver::DISPLAY_NAME`] needs to be provided; everything else has a
/// default implementation on top of [`PcmBackend`].
pub trait SoundDriver: PcmBackend {
    /// Driver display name.
    const DISPLAY_NAME: &'static str;

    /// Whether the configured device can be opened for playback. The device is closed again
    /// before returning.
    fn detect(&self, settings: &SoundSettings) -> bool {
        let device = settings.device();
        match self.open_pcm(&device) {
            Ok(_) => true,
            Err(err) => {
                log::debug!(device = device.as_str(); "Detection failed: {err}");
                false
            }
        }
    }

    /// Open, configure and start a stream.
    fn open(&self, request: OpenRequest) -> Result<DeviceHandle<Self::Device>, DeviceError> {
        stream::open(self, request)
    }

    /// Stop the stream and release the device.
    fn close(&self, handle: DeviceHandle<Self::Device>) {
        handle.close()
    }

    /// Set the hardware playback volume (0..=255), if the device has a volume control.
    fn set_volume(&self, handle: &DeviceHandle<Self::Device>, volume: u8) {
        handle.set_volume(volume)
    }

    /// Total device buffer size in frames.
    fn buffer_size_frames(&self, handle: &DeviceHandle<Self::Device>) -> usize {
        handle.buffer_size_frames()
    }
}
