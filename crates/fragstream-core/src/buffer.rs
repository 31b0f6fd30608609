//! The fragment buffer shared, in turn, by the host mixer and the device.

use crate::error::DeviceError;
use crate::format::StreamConfig;
use crate::mixer::HostMixer;

/// One fragment worth of interleaved samples. The mixer fills it, the device drains it, and the
/// streamer makes sure the two never overlap.
#[derive(Debug)]
pub struct FragmentBuffer {
    data: Box<[u8]>,
    signed: bool,
}

impl FragmentBuffer {
    /// Allocate a zeroed buffer of `config.fragment_size_bytes` for `device`.
    pub fn allocate(device: &str, config: &StreamConfig) -> Result<Self, DeviceError> {
        let bytes = config.fragment_size_bytes;
        let mut data = Vec::new();
        data.try_reserve_exact(bytes)
            .map_err(|_| DeviceError::OutOfMemory {
                device: device.to_owned(),
                bytes,
            })?;
        data.resize(bytes, 0);
        Ok(Self {
            data: data.into_boxed_slice(),
            signed: config.signed_samples,
        })
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// Have the mixer replace the whole content, starting at offset 0.
    pub fn refill(&mut self, mixer: &mut dyn HostMixer) {
        mixer.fill(&mut self.data, 0, self.signed);
    }
}
