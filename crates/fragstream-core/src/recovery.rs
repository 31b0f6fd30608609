//! Underrun and suspend recovery for write failures.

use std::time::Duration;

use crate::error::PcmError;
use crate::negotiate::Protocol;
use crate::pcm::PcmDevice;

/// Bounds on the resume loop run after a suspend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResumePolicy {
    /// Sleep between two resume attempts while the device is not ready.
    pub interval: Duration,
    /// Resume attempts before giving up and re-preparing instead.
    pub max_attempts: u32,
}

impl Default for ResumePolicy {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(1),
            max_attempts: 30,
        }
    }
}

/// Result of a recovery attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecoveryOutcome {
    /// The stream accepts writes again.
    Recovered,
    /// The stream is left broken until it is closed and reopened.
    Fatal(PcmError),
}

/// Recover `pcm` from the write failure `error`.
///
/// Never closes or reconfigures the device. The [`Protocol::Block`] variant has no recovery and
/// always reports [`RecoveryOutcome::Fatal`].
pub fn recover(
    pcm: &mut impl PcmDevice,
    protocol: Protocol,
    policy: &ResumePolicy,
    error: PcmError,
) -> RecoveryOutcome {
    if !protocol.supports_recovery() {
        return RecoveryOutcome::Fatal(error);
    }
    match error {
        PcmError::Underrun => {
            log::warn!("Underrun, re-preparing stream");
            reprepare(pcm, "underrun")
        }
        PcmError::Suspended => {
            log::warn!("Stream suspended, waiting for resume");
            match resume(pcm, policy) {
                Ok(()) => RecoveryOutcome::Recovered,
                Err(err) => {
                    log::debug!("Resume failed ({err}), re-preparing instead");
                    reprepare(pcm, "suspend")
                }
            }
        }
        error => RecoveryOutcome::Fatal(error),
    }
}

fn reprepare(pcm: &mut impl PcmDevice, cause: &str) -> RecoveryOutcome {
    match pcm.prepare() {
        Ok(()) => RecoveryOutcome::Recovered,
        Err(err) => {
            log::error!("Can't recover from {cause}, prepare failed: {err}");
            RecoveryOutcome::Fatal(err)
        }
    }
}

fn resume(pcm: &mut impl PcmDevice, policy: &ResumePolicy) -> Result<(), PcmError> {
    let mut attempts = 0;
    loop {
        match pcm.resume() {
            Err(PcmError::WouldBlock) if attempts < policy.max_attempts => {
                attempts += 1;
                std::thread::sleep(policy.interval);
            }
            result => return result,
        }
    }
}
