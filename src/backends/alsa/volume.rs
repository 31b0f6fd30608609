use alsa::mixer::{Mixer, Selem, SelemChannelId, SelemId};
use fragstream_core::volume::VolumeControl;
use fragstream_core::PcmError;

use super::pcm_error;

/// Playback volume element of an ALSA simple mixer.
pub struct AlsaVolume {
    mixer: Mixer,
    name: String,
    index: u32,
    range: (i64, i64),
}

impl AlsaVolume {
    /// Attach to the mixer of `device` and look up `element` by name, ignoring case.
    pub(super) fn attach(device: &str, element: &str) -> Result<Self, PcmError> {
        let mixer = Mixer::new(device, false).map_err(pcm_error)?;
        let (name, index, range) = mixer
            .iter()
            .filter_map(Selem::new)
            .filter(|selem| selem.has_playback_volume())
            .find_map(|selem| {
                let id = selem.get_id();
                let name = id.get_name().ok()?;
                name.eq_ignore_ascii_case(element).then(|| {
                    (
                        name.to_string(),
                        id.get_index(),
                        selem.get_playback_volume_range(),
                    )
                })
            })
            .ok_or(PcmError::Other {
                errno: nix::errno::Errno::ENOENT as i32,
                description: "no such mixer element",
            })?;
        log::debug!(element = name.as_str(), index; "Attached mixer element");
        Ok(Self {
            mixer,
            name,
            index,
            range,
        })
    }
}

impl VolumeControl for AlsaVolume {
    fn playback_range(&self) -> (i64, i64) {
        self.range
    }

    fn set_playback_volume(&mut self, left: i64, right: i64) -> Result<(), PcmError> {
        let id = SelemId::new(&self.name, self.index);
        let selem = self.mixer.find_selem(&id).ok_or(PcmError::Other {
            errno: nix::errno::Errno::ENODEV as i32,
            description: "mixer element went away",
        })?;
        selem
            .set_playback_volume(SelemChannelId::FrontLeft, left)
            .map_err(pcm_error)?;
        selem
            .set_playback_volume(SelemChannelId::FrontRight, right)
            .map_err(pcm_error)
    }
}
