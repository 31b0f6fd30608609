//! Contract with the host-owned software mixer that produces the audio.

use crate::error::MixerError;

/// Format information given to the mixer once negotiation is done.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MixerParams {
    pub frames_per_fragment: usize,
    pub rate_hz: u32,
    pub stereo: bool,
    pub sixteen_bit: bool,
}

/// Host software mixer. All calls happen with the stream lock held, so implementations never
/// see concurrent calls for the same stream.
pub trait HostMixer {
    /// Prepare for the negotiated format. Receives the requested voice count and returns the
    /// count actually granted.
    fn init(&mut self, params: MixerParams, voices: usize) -> Result<usize, MixerError>;

    /// Fill `buffer[offset..]` entirely with the next samples. The engine always passes the
    /// whole fragment with `offset == 0`. `signed` tells the mixer the sample signedness the
    /// device expects.
    fn fill(&mut self, buffer: &mut [u8], offset: usize, signed: bool);

    /// Release mixer resources. Called once, after the last `fill`.
    fn shutdown(&mut self);
}

impl<M: HostMixer + ?Sized> HostMixer for Box<M> {
    fn init(&mut self, params: MixerParams, voices: usize) -> Result<usize, MixerError> {
        (**self).init(params, voices)
    }

    fn fill(&mut self, buffer: &mut [u8], offset: usize, signed: bool) {
        (**self).fill(buffer, offset, signed)
    }

    fn shutdown(&mut self) {
        (**self).shutdown()
    }
}
