//! Device-independent half of the fragment streaming engine: format negotiation, the fragment
//! buffer, the periodic writer and its error recovery, and the stream lifecycle. Backends plug
//! in through [`pcm::PcmBackend`].

pub mod buffer;
pub mod config;
pub mod driver;
pub mod error;
pub mod format;
pub mod mixer;
pub mod negotiate;
pub mod pcm;
pub mod recovery;
pub mod registrar;
pub mod stream;
pub mod streamer;
pub mod volume;

#[cfg(test)]
mod testing;

pub use config::{ConfigStore, MemoryConfig, SoundSettings};
pub use driver::SoundDriver;
pub use error::{DeviceError, ErrorKind, MixerError, PcmError, RegisterError};
pub use format::{DesiredFormat, SampleFormat, StreamConfig};
pub use mixer::{HostMixer, MixerParams};
pub use negotiate::Protocol;
pub use registrar::{ManualRegistrar, Task, TaskId, TaskRegistrar, TaskTable};
pub use stream::{DeviceHandle, OpenRequest};
pub use streamer::{DeviceState, StreamStats};
