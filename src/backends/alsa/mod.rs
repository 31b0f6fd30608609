//! # ALSA backend
//!
//! ALSA is a generally available driver for Linux systems. Newer sound servers (PulseAudio,
//! PipeWire) offer ALSA-compatible PCM devices, so the `default` device usually routes through
//! them transparently.
//!
//! Playback streams are opened in non-blocking mode; the fragment streamer retries writes that
//! would block and drives underrun/suspend recovery through [`fragstream_core::recovery`].

use alsa::device_name::HintIter;
use fragstream_core::volume::VolumeControl;
use fragstream_core::{PcmError, SoundDriver};
use nix::errno::Errno;

pub use device::AlsaPcm;
pub use volume::AlsaVolume;

mod device;
mod volume;

/// ALSA driver type. ALSA is statically available without client configuration, therefore this
/// type is zero-sized.
#[derive(Debug, Clone, Copy, Default)]
pub struct AlsaDriver;

impl AlsaDriver {
    /// List the identifiers of every PCM device that can play back, as advertised by the ALSA
    /// device-name hints.
    pub fn list_devices(&self) -> Result<Vec<String>, PcmError> {
        Ok(HintIter::new(None, c"pcm")
            .map_err(pcm_error)?
            .filter(|hint| {
                hint.direction
                    .is_none_or(|direction| direction == alsa::Direction::Playback)
            })
            .filter_map(|hint| hint.name)
            .collect())
    }
}

impl fragstream_core::pcm::PcmBackend for AlsaDriver {
    type Device = AlsaPcm;

    fn open_pcm(&self, device: &str) -> Result<Self::Device, PcmError> {
        AlsaPcm::open(device)
    }

    fn attach_volume(
        &self,
        device: &str,
        element: &str,
    ) -> Result<Box<dyn VolumeControl + Send>, PcmError> {
        Ok(Box::new(AlsaVolume::attach(device, element)?))
    }
}

impl SoundDriver for AlsaDriver {
    const DISPLAY_NAME: &'static str = "ALSA";
}

/// Translate an ALSA error code into the engine's device error.
pub(crate) fn pcm_error(err: alsa::Error) -> PcmError {
    errno_error(Errno::from_raw(err.errno().abs()))
}

fn errno_error(errno: Errno) -> PcmError {
    match errno {
        Errno::EAGAIN => PcmError::WouldBlock,
        Errno::EPIPE => PcmError::Underrun,
        Errno::ESTRPIPE => PcmError::Suspended,
        errno => PcmError::Other {
            errno: errno as i32,
            description: errno.desc(),
        },
    }
}
