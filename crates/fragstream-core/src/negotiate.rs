//! Capability negotiation: turn a [`DesiredFormat`] into the [`StreamConfig`] the device accepts.
//!
//! Two PCM API generations are supported through [`Protocol`]:
//!
//! | **Protocol** | **Period size** | **Period count** | **Rate**  | **Recovery** |
//! |:------------:|:---------------:|:----------------:|:---------:|:------------:|
//! |  `HwParams`  |   read back     |    read back     |  nearest  |     yes      |
//! |   `Block`    |   read back     |    requested     |   exact   |     none     |

use std::str::FromStr;

use crate::error::{ConfigureError, DeviceError, HwStage, PcmError};
use crate::format::{DesiredFormat, ResolvedFormat, StreamConfig};
use crate::pcm::{HwRequest, PcmDevice, PeriodRequest, RateRequest};

/// PCM API variant used to talk to the device.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Protocol {
    /// Hardware-parameter negotiation with accepted values read back, plus underrun and suspend
    /// recovery on write errors.
    #[default]
    HwParams,
    /// Fixed-block channel setup. Short writes end the current tick; there is no recovery.
    Block,
}

impl Protocol {
    pub fn supports_recovery(self) -> bool {
        matches!(self, Self::HwParams)
    }

    /// Whether the device is prepared as part of negotiation rather than after the first fill.
    pub fn prepares_during_negotiation(self) -> bool {
        matches!(self, Self::Block)
    }

    fn request(self, resolved: &ResolvedFormat) -> HwRequest {
        match self {
            Self::HwParams => HwRequest {
                format: resolved.format,
                channels: resolved.channels,
                rate: RateRequest::Nearest(resolved.rate_hz),
                period_frames: resolved.requested_fragment_frames(),
                periods: PeriodRequest::Count(resolved.fragment_count),
                prepare: false,
            },
            Self::Block => HwRequest {
                format: resolved.format,
                channels: resolved.channels,
                rate: RateRequest::Exact(resolved.rate_hz),
                period_frames: resolved.requested_fragment_frames(),
                periods: PeriodRequest::Range {
                    min: 1,
                    max: resolved.fragment_count,
                },
                prepare: true,
            },
        }
    }
}

impl FromStr for Protocol {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "hw_params" | "hwparams" | "9" => Ok(Self::HwParams),
            "block" | "5" => Ok(Self::Block),
            _ => Err(format!("unknown PCM protocol '{s}'")),
        }
    }
}

/// Negotiate a playback configuration with `pcm`.
///
/// The returned configuration is built from the values the device granted, not the ones that
/// were requested.
pub fn negotiate(
    pcm: &mut impl PcmDevice,
    device: &str,
    protocol: Protocol,
    desired: &DesiredFormat,
) -> Result<StreamConfig, DeviceError> {
    let resolved = desired.resolve();
    let request = protocol.request(&resolved);
    log::debug!(
        device,
        bits = resolved.format.bits(),
        channels = resolved.channels,
        rate = resolved.rate_hz,
        period_frames = request.period_frames,
        fragments = resolved.fragment_count;
        "Requesting hardware parameters ({protocol:?})"
    );

    let grant = pcm.configure(&request).map_err(|err| match err.stage {
        HwStage::Format => DeviceError::UnsupportedFormat {
            device: device.to_string(),
            bits: resolved.format.bits(),
            source: err.source,
        },
        _ => DeviceError::ConfigFailed {
            device: device.to_string(),
            source: err,
        },
    })?;

    let config_failed = |source| DeviceError::ConfigFailed {
        device: device.to_string(),
        source,
    };
    if grant.period_frames == 0 || grant.rate_hz == 0 {
        return Err(config_failed(ConfigureError::new(
            HwStage::Readback,
            PcmError::Other {
                errno: 22,
                description: "device granted an empty period or rate",
            },
        )));
    }

    let fragment_count = match protocol {
        Protocol::HwParams => grant.periods,
        Protocol::Block => resolved.fragment_count,
    };
    if fragment_count == 0 {
        return Err(config_failed(ConfigureError::new(
            HwStage::Periods,
            PcmError::Other {
                errno: 22,
                description: "device granted zero periods",
            },
        )));
    }

    let rate_hz = match request.rate {
        RateRequest::Nearest(_) => grant.rate_hz,
        RateRequest::Exact(hz) => hz,
    };
    if rate_hz != resolved.rate_hz {
        log::debug!(requested = resolved.rate_hz, granted = rate_hz; "Device picked another rate");
    }

    let config = StreamConfig {
        sample_bits: resolved.format.bits(),
        signed_samples: resolved.format.is_signed(),
        channels: resolved.channels,
        sample_rate_hz: rate_hz,
        fragment_size_bytes: grant.period_frames as usize * resolved.bytes_per_frame(),
        fragment_count,
    };
    log::debug!(
        fragment_bytes = config.fragment_size_bytes,
        fragments = config.fragment_count;
        "Negotiated {config:?}"
    );
    Ok(config)
}
