use alsa::pcm::{Access, Format, Frames, HwParams};
use alsa::{ValueOr, PCM};
use fragstream_core::error::{ConfigureError, HwStage};
use fragstream_core::format::SampleFormat;
use fragstream_core::pcm::{HwGrant, HwRequest, PcmDevice, PeriodRequest, RateRequest};
use fragstream_core::PcmError;
use std::fmt;

use super::pcm_error;

/// Non-blocking ALSA playback stream. Dropping it closes the PCM handle.
pub struct AlsaPcm {
    pcm: PCM,
    name: String,
}

impl fmt::Debug for AlsaPcm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AlsaPcm")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

impl AlsaPcm {
    pub(super) fn open(name: &str) -> Result<Self, PcmError> {
        log::debug!("Opening device: {name}");
        let pcm = PCM::new(name, alsa::Direction::Playback, true).map_err(pcm_error)?;
        Ok(Self {
            pcm,
            name: name.to_string(),
        })
    }

    fn get_hwp(&self, request: &HwRequest) -> Result<HwParams<'_>, ConfigureError> {
        let hwp = HwParams::any(&self.pcm).map_err(stage(HwStage::Any))?;
        hwp.set_access(Access::RWInterleaved)
            .map_err(stage(HwStage::Access))?;
        let format = match request.format {
            SampleFormat::U8 => Format::U8,
            SampleFormat::S16Native => Format::s16(),
        };
        hwp.set_format(format).map_err(stage(HwStage::Format))?;
        hwp.set_channels(request.channels)
            .map_err(stage(HwStage::Channels))?;
        match request.rate {
            RateRequest::Nearest(hz) => {
                let rate = hwp
                    .set_rate_near(hz, ValueOr::Nearest)
                    .map_err(stage(HwStage::Rate))?;
                log::debug!(requested = hz, accepted = rate; "Sample rate");
            }
            RateRequest::Exact(hz) => hwp
                .set_rate(hz, ValueOr::Nearest)
                .map_err(stage(HwStage::Rate))?,
        }
        let period = hwp
            .set_period_size_near(request.period_frames as Frames, ValueOr::Nearest)
            .map_err(stage(HwStage::PeriodSize))?;
        log::debug!(requested = request.period_frames, accepted = period; "Period size");
        match request.periods {
            PeriodRequest::Count(count) => hwp
                .set_periods(count, ValueOr::Nearest)
                .map_err(stage(HwStage::Periods))?,
            PeriodRequest::Range { min, max } => {
                // Largest count the device accepts.
                let mut last = Ok(());
                for count in (min..=max).rev() {
                    last = hwp.set_periods(count, ValueOr::Nearest);
                    if last.is_ok() {
                        break;
                    }
                }
                last.map_err(stage(HwStage::Periods))?;
            }
        }
        Ok(hwp)
    }
}

impl PcmDevice for AlsaPcm {
    fn configure(&mut self, request: &HwRequest) -> Result<HwGrant, ConfigureError> {
        let hwp = self.get_hwp(request)?;
        self.pcm
            .hw_params(&hwp)
            .map_err(stage(HwStage::Install))?;
        drop(hwp);

        let hwp = self
            .pcm
            .hw_params_current()
            .map_err(stage(HwStage::Readback))?;
        let grant = HwGrant {
            rate_hz: hwp.get_rate().map_err(stage(HwStage::Readback))?,
            period_frames: hwp
                .get_period_size()
                .map_err(stage(HwStage::Readback))?
                .try_into()
                .unwrap_or(0),
            periods: hwp.get_periods().map_err(stage(HwStage::Readback))?,
        };
        drop(hwp);
        log::debug!(
            device = self.name.as_str(),
            rate = grant.rate_hz,
            period = grant.period_frames,
            periods = grant.periods;
            "Hardware parameters installed"
        );

        if request.prepare {
            self.pcm.prepare().map_err(stage(HwStage::Prepare))?;
        }
        Ok(grant)
    }

    fn prepare(&mut self) -> Result<(), PcmError> {
        self.pcm.prepare().map_err(pcm_error)
    }

    fn resume(&mut self) -> Result<(), PcmError> {
        self.pcm.resume().map_err(pcm_error)
    }

    fn write_interleaved(&mut self, data: &[u8]) -> Result<usize, PcmError> {
        self.pcm.io_bytes().writei(data).map_err(pcm_error)
    }
}

fn stage(stage: HwStage) -> impl FnOnce(alsa::Error) -> ConfigureError {
    move |err| ConfigureError::new(stage, pcm_error(err))
}
