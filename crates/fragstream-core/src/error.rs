//! Error types shared by the engine and its backends.

use thiserror::Error;

/// Coarse classification of every failure the engine can observe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    OpenFailed,
    UnsupportedFormat,
    ConfigFailed,
    OutOfMemory,
    WriteFatal,
    RecoverableUnderrun,
    RecoverableSuspend,
}

/// Error code reported by a PCM device call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PcmError {
    /// Non-blocking call with no room (or not ready) yet. Retried, never surfaced.
    #[error("resource temporarily unavailable")]
    WouldBlock,
    /// The device drained its buffer before new data arrived.
    #[error("buffer underrun")]
    Underrun,
    /// The device entered a power-management suspend.
    #[error("stream suspended")]
    Suspended,
    /// Anything else, with the OS errno and its description.
    #[error("{description} (errno {errno})")]
    Other {
        errno: i32,
        description: &'static str,
    },
}

impl PcmError {
    /// Classify a write failure. `None` for [`PcmError::WouldBlock`], which is not a failure.
    pub fn kind(&self) -> Option<ErrorKind> {
        match self {
            Self::WouldBlock => None,
            Self::Underrun => Some(ErrorKind::RecoverableUnderrun),
            Self::Suspended => Some(ErrorKind::RecoverableSuspend),
            Self::Other { .. } => Some(ErrorKind::WriteFatal),
        }
    }
}

/// Step of hardware parameter negotiation that the device refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HwStage {
    Any,
    Access,
    Format,
    Channels,
    Rate,
    PeriodSize,
    Periods,
    Install,
    Readback,
    Prepare,
}

/// Failure of [`crate::PcmDevice::configure`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{stage:?}: {source}")]
pub struct ConfigureError {
    pub stage: HwStage,
    pub source: PcmError,
}

impl ConfigureError {
    pub fn new(stage: HwStage, source: PcmError) -> Self {
        Self { stage, source }
    }
}

/// The host mixer refused to initialize.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct MixerError(pub String);

/// The periodic-task registrar refused a task.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegisterError {
    #[error("task table is full ({0} tasks)")]
    Full(usize),
    #[error("registrar is shut down")]
    ShutDown,
}

/// Errors aborting [`crate::SoundDriver::open`]. Nothing stays open or registered when one of
/// these is returned.
#[derive(Debug, Error)]
pub enum DeviceError {
    #[error("Can not open card/pcm device '{device}': {source}")]
    OpenFailed { device: String, source: PcmError },
    #[error("Unsupported sample format {bits} bits on '{device}': {source}")]
    UnsupportedFormat {
        device: String,
        bits: u32,
        source: PcmError,
    },
    #[error("Can not set channel parameters on '{device}': {source}")]
    ConfigFailed {
        device: String,
        source: ConfigureError,
    },
    #[error("Can not allocate audio buffer of {bytes} bytes for '{device}'")]
    OutOfMemory { device: String, bytes: usize },
    #[error("Can not init software mixer for '{device}': {source}")]
    MixerInit { device: String, source: MixerError },
    #[error("Can not register audio update for '{device}': {source}")]
    Registration {
        device: String,
        source: RegisterError,
    },
}

impl DeviceError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::OpenFailed { .. } => ErrorKind::OpenFailed,
            Self::UnsupportedFormat { .. } => ErrorKind::UnsupportedFormat,
            Self::ConfigFailed { .. } | Self::MixerInit { .. } | Self::Registration { .. } => {
                ErrorKind::ConfigFailed
            }
            Self::OutOfMemory { .. } => ErrorKind::OutOfMemory,
        }
    }
}

/// Errors reading configuration values.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for [{section}] {key}: {value}")]
    InvalidValue {
        section: String,
        key: String,
        value: String,
    },
}
