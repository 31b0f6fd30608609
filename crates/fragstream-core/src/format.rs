//! Stream formats: what the caller asks for, and what the device actually accepted.

use std::fmt;

/// Sample rate used when the caller does not request a positive one.
pub const DEFAULT_SAMPLE_RATE: u32 = 44100;

/// Fragment count used when neither the caller nor the configuration asks for one.
pub const DEFAULT_FRAGMENT_COUNT: u32 = 16;

/// Smallest fragment, in frames, produced by the default fragment-size policy.
pub const MIN_DEFAULT_FRAGMENT_FRAMES: u32 = 16;

/// The two sample formats the engine can stream. Anything else is rejected rather than
/// approximated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SampleFormat {
    /// Unsigned 8-bit samples, silence at `0x80`.
    U8,
    /// Signed 16-bit samples in the byte order of the host CPU.
    S16Native,
}

impl SampleFormat {
    /// Resolve a requested bit depth. 8 stays 8, every other value becomes 16.
    pub fn from_bits(bits: u32) -> Self {
        if bits == 8 {
            Self::U8
        } else {
            Self::S16Native
        }
    }

    pub fn bits(self) -> u32 {
        match self {
            Self::U8 => 8,
            Self::S16Native => 16,
        }
    }

    pub fn bytes_per_sample(self) -> usize {
        self.bits() as usize / 8
    }

    /// Whether samples in this format are signed. The host mixer needs this to pick its own
    /// output conversion.
    pub fn is_signed(self) -> bool {
        matches!(self, Self::S16Native)
    }
}

/// Playback format requested by the caller, before any negotiation with the device.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DesiredFormat {
    /// Requested bit depth. Only 8 is honored as-is; everything else resolves to 16.
    pub bits: u32,
    pub stereo: bool,
    /// Requested sample rate. Zero or negative selects [`DEFAULT_SAMPLE_RATE`].
    pub rate_hz: i64,
    /// Fragment size hint in frames. `None` selects the default fragment-size policy.
    pub fragment_frames: Option<u32>,
    /// Fragment count hint. `None` selects [`DEFAULT_FRAGMENT_COUNT`].
    pub fragment_count: Option<u32>,
}

impl Default for DesiredFormat {
    fn default() -> Self {
        Self {
            bits: 16,
            stereo: true,
            rate_hz: DEFAULT_SAMPLE_RATE as i64,
            fragment_frames: None,
            fragment_count: None,
        }
    }
}

impl DesiredFormat {
    /// Shortcut for the common (bits, stereo, rate) request without fragment hints.
    pub fn new(bits: u32, stereo: bool, rate_hz: i64) -> Self {
        Self {
            bits,
            stereo,
            rate_hz,
            ..Self::default()
        }
    }

    /// Apply the normalization rules: bit depth coercion, default rate, default fragment count.
    pub fn resolve(&self) -> ResolvedFormat {
        let format = SampleFormat::from_bits(self.bits);
        let channels = if self.stereo { 2 } else { 1 };
        let rate_hz = if self.rate_hz > 0 {
            u32::try_from(self.rate_hz).unwrap_or(u32::MAX)
        } else {
            DEFAULT_SAMPLE_RATE
        };
        let fragment_count = self
            .fragment_count
            .filter(|&n| n > 0)
            .unwrap_or(DEFAULT_FRAGMENT_COUNT);
        ResolvedFormat {
            format,
            channels,
            rate_hz,
            fragment_frames: self.fragment_frames.filter(|&n| n > 0),
            fragment_count,
        }
    }
}

/// A [`DesiredFormat`] after normalization, ready to be sent to the device.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedFormat {
    pub format: SampleFormat,
    pub channels: u32,
    pub rate_hz: u32,
    pub fragment_frames: Option<u32>,
    pub fragment_count: u32,
}

impl ResolvedFormat {
    pub fn bytes_per_frame(&self) -> usize {
        self.format.bytes_per_sample() * self.channels as usize
    }

    /// Fragment size to request from the device, in frames.
    ///
    /// Without a hint, this is one 512th of the byte rate, floored at
    /// [`MIN_DEFAULT_FRAGMENT_FRAMES`] and rounded up to a power of two. A hint is used verbatim.
    pub fn requested_fragment_frames(&self) -> u32 {
        if let Some(frames) = self.fragment_frames {
            return frames;
        }
        let bytes_per_second = u64::from(self.rate_hz) * self.bytes_per_frame() as u64;
        let target = (bytes_per_second >> 9).max(u64::from(MIN_DEFAULT_FRAGMENT_FRAMES));
        u32::try_from(target.next_power_of_two()).unwrap_or(1 << 31)
    }

    /// Fragment size to request from the device, in bytes.
    pub fn requested_fragment_bytes(&self) -> usize {
        self.requested_fragment_frames() as usize * self.bytes_per_frame()
    }
}

/// Configuration negotiated with the device. Immutable for the lifetime of a device handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreamConfig {
    pub sample_bits: u32,
    pub signed_samples: bool,
    pub channels: u32,
    pub sample_rate_hz: u32,
    /// Always a whole number of frames.
    pub fragment_size_bytes: usize,
    pub fragment_count: u32,
}

impl StreamConfig {
    pub fn sample_format(&self) -> SampleFormat {
        SampleFormat::from_bits(self.sample_bits)
    }

    pub fn bytes_per_sample(&self) -> usize {
        self.sample_bits as usize / 8
    }

    pub fn bytes_per_frame(&self) -> usize {
        self.bytes_per_sample() * self.channels as usize
    }

    pub fn is_stereo(&self) -> bool {
        self.channels == 2
    }

    pub fn frames_per_fragment(&self) -> usize {
        self.fragment_size_bytes / self.bytes_per_frame()
    }

    /// Total device buffer, in frames, across all fragments. Useful to reason about latency.
    pub fn buffer_size_frames(&self) -> usize {
        self.fragment_size_bytes * self.fragment_count as usize
            / self.bytes_per_sample()
            / self.channels as usize
    }
}

/// Human-readable description of an open stream, e.g.
/// `Device 'default': 16 bits, signed, 44100 bps, stereo`.
#[derive(Debug, Clone, Copy)]
pub struct Description<'a> {
    pub device: &'a str,
    pub config: &'a StreamConfig,
}

impl fmt::Display for Description<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Device '{}': {} bits, {}, {} bps, {}",
            self.device,
            self.config.sample_bits,
            if self.config.signed_samples { "signed" } else { "unsigned" },
            self.config.sample_rate_hz,
            if self.config.is_stereo() { "stereo" } else { "mono" },
        )
    }
}
