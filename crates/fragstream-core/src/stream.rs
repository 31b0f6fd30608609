//! Lifecycle of a playback stream: open, negotiate, allocate, prepare, register, and the
//! symmetric teardown.

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::buffer::FragmentBuffer;
use crate::config::SoundSettings;
use crate::error::{ConfigureError, DeviceError, HwStage};
use crate::format::{DesiredFormat, Description, StreamConfig};
use crate::mixer::{HostMixer, MixerParams};
use crate::negotiate::negotiate;
use crate::pcm::{PcmBackend, PcmDevice};
use crate::registrar::{TaskId, TaskRegistrar};
use crate::streamer::{DeviceState, StreamCore, StreamStats};
use crate::volume::Volume;

/// Everything needed to open a stream.
pub struct OpenRequest {
    pub settings: SoundSettings,
    pub desired: DesiredFormat,
    /// Voice count requested from the host mixer.
    pub voices: usize,
    pub mixer: Box<dyn HostMixer + Send>,
    pub registrar: Arc<dyn TaskRegistrar>,
}

/// An open playback stream. Exclusively owns the device, the fragment buffer and the mixer
/// until [`DeviceHandle::close`] (or drop).
pub struct DeviceHandle<D: PcmDevice + Send + 'static> {
    core: Arc<Mutex<StreamCore<D>>>,
    registrar: Arc<dyn TaskRegistrar>,
    task: Option<TaskId>,
    config: StreamConfig,
    voices: usize,
    description: String,
}

impl<D: PcmDevice + Send + 'static> fmt::Debug for DeviceHandle<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DeviceHandle")
            .field("description", &self.description)
            .field("config", &self.config)
            .field("task", &self.task)
            .finish_non_exhaustive()
    }
}

/// Open `request.settings.device()` through `backend` and start streaming.
///
/// Any failure releases whatever was acquired so far; nothing stays registered.
pub fn open<B: PcmBackend + ?Sized>(
    backend: &B,
    request: OpenRequest,
) -> Result<DeviceHandle<B::Device>, DeviceError> {
    let OpenRequest {
        settings,
        desired,
        voices,
        mut mixer,
        registrar,
    } = request;
    let device = settings.device();

    let mut pcm = backend
        .open_pcm(&device)
        .map_err(|source| DeviceError::OpenFailed {
            device: device.clone(),
            source,
        })?;

    let volume = match backend.attach_volume(&device, &settings.mixer_element) {
        Ok(control) => Some(Volume::new(control)),
        Err(err) => {
            log::warn!(
                device = device.as_str(),
                element = settings.mixer_element.as_str();
                "No volume control, volume changes are ignored: {err}"
            );
            None
        }
    };

    let desired = settings.apply_hints(desired);
    let mut state = DeviceState::Closed;
    enter(&device, &mut state, DeviceState::Negotiating);
    let config = negotiate(&mut pcm, &device, settings.protocol, &desired)?;
    let mut buffer = FragmentBuffer::allocate(&device, &config)?;

    let granted_voices = mixer
        .init(
            MixerParams {
                frames_per_fragment: config.frames_per_fragment(),
                rate_hz: config.sample_rate_hz,
                stereo: config.is_stereo(),
                sixteen_bit: config.sample_bits == 16,
            },
            voices,
        )
        .map_err(|source| DeviceError::MixerInit {
            device: device.clone(),
            source,
        })?;

    let mut core = StreamCore {
        device: device.clone(),
        pcm: None,
        volume,
        mixer,
        buffer: None,
        config,
        protocol: settings.protocol,
        resume: settings.resume,
        state,
        stats: StreamStats::default(),
    };

    buffer.refill(&mut *core.mixer);
    core.buffer = Some(buffer);
    if !settings.protocol.prepares_during_negotiation() {
        if let Err(err) = pcm.prepare() {
            core.pcm = Some(pcm);
            teardown(&mut core);
            return Err(DeviceError::ConfigFailed {
                device,
                source: ConfigureError::new(HwStage::Prepare, err),
            });
        }
    }

    core.pcm = Some(pcm);
    enter(&device, &mut core.state, DeviceState::Prepared);
    let core = Arc::new(Mutex::new(core));

    let task = registrar.register(Arc::new({
        let core = core.clone();
        move || lock(&core).on_tick()
    }));
    let task = match task {
        Ok(task) => task,
        Err(source) => {
            teardown(&mut lock(&core));
            return Err(DeviceError::Registration { device, source });
        }
    };

    let description = Description {
        device: &device,
        config: &config,
    }
    .to_string();
    log::info!("{description}");

    Ok(DeviceHandle {
        core,
        registrar,
        task: Some(task),
        config,
        voices: granted_voices,
        description,
    })
}

impl<D: PcmDevice + Send + 'static> DeviceHandle<D> {
    /// Negotiated configuration.
    pub fn config(&self) -> &StreamConfig {
        &self.config
    }

    /// Voice count granted by the host mixer.
    pub fn voices(&self) -> usize {
        self.voices
    }

    /// Human-readable summary, e.g. `Device 'default': 16 bits, signed, 44100 bps, stereo`.
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Total device buffer size in frames.
    pub fn buffer_size_frames(&self) -> usize {
        self.config.buffer_size_frames()
    }

    pub fn state(&self) -> DeviceState {
        lock(&self.core).state
    }

    pub fn stats(&self) -> StreamStats {
        lock(&self.core).stats
    }

    /// Set the hardware playback volume (0..=255). Does nothing without a volume control.
    pub fn set_volume(&self, volume: u8) {
        if let Some(control) = lock(&self.core).volume.as_mut() {
            control.set(volume);
        }
    }

    /// Run one period on the calling thread. Equivalent to what the registrar does on its own.
    pub fn tick(&self) {
        lock(&self.core).on_tick();
    }

    /// Stop streaming and release everything. Blocks until an in-progress tick completes.
    pub fn close(mut self) {
        self.shutdown();
    }

    fn shutdown(&mut self) {
        let Some(task) = self.task.take() else {
            return;
        };
        self.registrar.unregister(task);
        teardown(&mut lock(&self.core));
        log::info!("Closed {}", self.description);
    }
}

impl<D: PcmDevice + Send + 'static> Drop for DeviceHandle<D> {
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// Release stream resources in order: buffer, mixer, volume control, device.
fn teardown<D>(core: &mut StreamCore<D>) {
    drop(core.buffer.take());
    core.mixer.shutdown();
    drop(core.volume.take());
    drop(core.pcm.take());
    core.state = DeviceState::Closed;
}

fn enter(device: &str, state: &mut DeviceState, next: DeviceState) {
    log::debug!(device, from:? = *state, to:? = next; "Device state change");
    *state = next;
}

fn lock<D>(core: &Mutex<StreamCore<D>>) -> MutexGuard<'_, StreamCore<D>> {
    core.lock().unwrap_or_else(PoisonError::into_inner)
}
