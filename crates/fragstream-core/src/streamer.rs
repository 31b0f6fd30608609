//! The periodic fragment writer.
//!
//! Each tick writes `fragment_count` fragments. After every successful write the host mixer
//! refills the single fragment buffer, so the device always receives the data mixed right after
//! the previous write (or during the pre-stream fill for the very first one).

use crate::buffer::FragmentBuffer;
use crate::error::PcmError;
use crate::format::StreamConfig;
use crate::mixer::HostMixer;
use crate::negotiate::Protocol;
use crate::pcm::PcmDevice;
use crate::recovery::{recover, RecoveryOutcome, ResumePolicy};
use crate::volume::Volume;

/// Lifecycle state of a device handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeviceState {
    Closed,
    /// `open` is agreeing on a configuration with the device. Handles are only returned once
    /// prepared, so this shows up in the state-change log rather than on a handle.
    Negotiating,
    Prepared,
    Streaming,
    /// Transient, while waiting for the device to resume.
    Suspended,
    /// The last tick was abandoned after an unrecoverable write error. The next tick tries again.
    Faulted,
}

/// Counters describing what the streamer has done so far.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StreamStats {
    pub ticks: u64,
    pub fragments_written: u64,
    pub underruns: u64,
    pub suspends: u64,
    pub fatal_errors: u64,
}

/// How a single fragment write ended.
enum WriteOutcome {
    Written,
    /// The fragment was dropped but the stream is usable; refill and carry on.
    Skipped,
    /// Stop this tick without refilling.
    Abandon,
}

/// Everything a stream owns, guarded by the stream lock shared with the tick task.
pub(crate) struct StreamCore<D> {
    pub(crate) device: String,
    pub(crate) pcm: Option<D>,
    pub(crate) volume: Option<Volume>,
    pub(crate) mixer: Box<dyn HostMixer + Send>,
    pub(crate) buffer: Option<FragmentBuffer>,
    pub(crate) config: StreamConfig,
    pub(crate) protocol: Protocol,
    pub(crate) resume: ResumePolicy,
    pub(crate) state: DeviceState,
    pub(crate) stats: StreamStats,
}

impl<D: PcmDevice> StreamCore<D> {
    /// Write every fragment of this period. Write errors never escape: they are recovered in
    /// place or logged, and the stream keeps going on the next tick.
    pub(crate) fn on_tick(&mut self) {
        let Self {
            device,
            pcm: Some(pcm),
            mixer,
            buffer: Some(buffer),
            config,
            protocol,
            resume,
            state,
            stats,
            ..
        } = self
        else {
            return;
        };
        match *state {
            DeviceState::Prepared | DeviceState::Faulted => *state = DeviceState::Streaming,
            DeviceState::Streaming => {}
            _ => return,
        }
        stats.ticks += 1;
        log::trace!(device = device.as_str(), tick = stats.ticks; "on_tick");

        for _ in 0..config.fragment_count {
            let outcome = match protocol {
                Protocol::HwParams => {
                    write_negotiated(&mut *pcm, buffer, *protocol, resume, state, stats)
                }
                Protocol::Block => write_block(&mut *pcm, buffer, config),
            };
            match outcome {
                WriteOutcome::Written => stats.fragments_written += 1,
                WriteOutcome::Skipped => {}
                WriteOutcome::Abandon => break,
            }
            buffer.refill(&mut **mixer);
        }
    }
}

fn write_negotiated(
    pcm: &mut impl PcmDevice,
    buffer: &FragmentBuffer,
    protocol: Protocol,
    policy: &ResumePolicy,
    state: &mut DeviceState,
    stats: &mut StreamStats,
) -> WriteOutcome {
    loop {
        let err = match pcm.write_interleaved(buffer.as_bytes()) {
            Ok(_) => return WriteOutcome::Written,
            Err(PcmError::WouldBlock) => {
                std::hint::spin_loop();
                continue;
            }
            Err(err) => err,
        };
        match err {
            PcmError::Underrun => stats.underruns += 1,
            PcmError::Suspended => {
                stats.suspends += 1;
                *state = DeviceState::Suspended;
            }
            _ => {}
        }
        return match recover(pcm, protocol, policy, err.clone()) {
            RecoveryOutcome::Recovered => {
                *state = DeviceState::Streaming;
                WriteOutcome::Skipped
            }
            RecoveryOutcome::Fatal(recovery_err) => {
                stats.fatal_errors += 1;
                *state = DeviceState::Faulted;
                log::error!("Write error: {err} (recovery: {recovery_err})");
                WriteOutcome::Abandon
            }
        };
    }
}

fn write_block(
    pcm: &mut impl PcmDevice,
    buffer: &FragmentBuffer,
    config: &StreamConfig,
) -> WriteOutcome {
    match pcm.write_interleaved(buffer.as_bytes()) {
        Ok(frames) if frames * config.bytes_per_frame() == buffer.len() => WriteOutcome::Written,
        Ok(frames) => {
            log::debug!(frames, expected = config.frames_per_fragment(); "Short block write");
            WriteOutcome::Abandon
        }
        Err(err) => {
            log::debug!("Block write failed: {err}");
            WriteOutcome::Abandon
        }
    }
}
