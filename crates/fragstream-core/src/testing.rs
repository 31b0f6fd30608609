//! Scripted stand-ins for the device, the backend and the host mixer.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::driver::SoundDriver;
use crate::error::{ConfigureError, HwStage, MixerError, PcmError};
use crate::mixer::{HostMixer, MixerParams};
use crate::pcm::{HwGrant, HwRequest, PcmBackend, PcmDevice, PeriodRequest};
use crate::volume::VolumeControl;

type Events = Arc<Mutex<Vec<&'static str>>>;

/// Route engine logs to the test harness output.
pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Result of one scripted write. Writes past the end of the script succeed.
#[derive(Debug, Clone)]
pub enum WriteScript {
    Ok,
    Short(usize),
    Fail(PcmError),
}

#[derive(Debug, Clone, Default)]
pub struct MockState {
    pub requests: Vec<HwRequest>,
    pub writes: usize,
    pub prepares: usize,
    pub resumes: usize,
    pub closed: bool,
    grant: Option<HwGrant>,
    refuse: Option<HwStage>,
    script: VecDeque<WriteScript>,
    prepare_error: Option<PcmError>,
    resume_error: Option<PcmError>,
    resume_pending: u32,
    write_delay: Duration,
    bytes_per_frame: usize,
}

/// Shared-state PCM device. Clones observe the same device.
#[derive(Debug, Clone, Default)]
pub struct MockPcm {
    state: Arc<Mutex<MockState>>,
    events: Events,
}

impl MockPcm {
    pub fn state(&self) -> MockState {
        self.state.lock().unwrap().clone()
    }

    pub fn events(&self) -> Vec<&'static str> {
        self.events.lock().unwrap().clone()
    }

    fn update(self, f: impl FnOnce(&mut MockState)) -> Self {
        f(&mut self.state.lock().unwrap());
        self
    }

    pub fn granting(self, grant: HwGrant) -> Self {
        self.update(|s| s.grant = Some(grant))
    }

    /// Grant exactly what is requested.
    pub fn echoing(self) -> Self {
        self.update(|s| s.grant = None)
    }

    pub fn refusing(self, stage: HwStage) -> Self {
        self.update(|s| s.refuse = Some(stage))
    }

    pub fn scripted(self, script: impl IntoIterator<Item = WriteScript>) -> Self {
        self.update(|s| s.script.extend(script))
    }

    pub fn failing_prepare(self, err: PcmError) -> Self {
        self.update(|s| s.prepare_error = Some(err))
    }

    pub fn failing_resume(self, err: PcmError) -> Self {
        self.update(|s| s.resume_error = Some(err))
    }

    /// `resume` reports "not ready" this many times before succeeding.
    pub fn resuming_after(self, attempts: u32) -> Self {
        self.update(|s| s.resume_pending = attempts)
    }

    pub fn with_write_delay(self, delay: Duration) -> Self {
        self.update(|s| s.write_delay = delay)
    }

    fn event(&self, name: &'static str) {
        self.events.lock().unwrap().push(name);
    }
}

impl PcmDevice for MockPcm {
    fn configure(&mut self, request: &HwRequest) -> Result<HwGrant, ConfigureError> {
        self.event("configure");
        let mut state = self.state.lock().unwrap();
        state.requests.push(*request);
        if let Some(stage) = state.refuse {
            return Err(ConfigureError::new(
                stage,
                PcmError::Other {
                    errno: 22,
                    description: "Invalid argument",
                },
            ));
        }
        state.bytes_per_frame = request.format.bytes_per_sample() * request.channels as usize;
        Ok(state.grant.unwrap_or(HwGrant {
            rate_hz: request.rate.hz(),
            period_frames: request.period_frames,
            periods: match request.periods {
                PeriodRequest::Count(n) => n,
                PeriodRequest::Range { max, .. } => max,
            },
        }))
    }

    fn prepare(&mut self) -> Result<(), PcmError> {
        self.event("prepare");
        let mut state = self.state.lock().unwrap();
        state.prepares += 1;
        match state.prepare_error.clone() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    fn resume(&mut self) -> Result<(), PcmError> {
        let mut state = self.state.lock().unwrap();
        state.resumes += 1;
        if state.resume_pending > 0 {
            state.resume_pending -= 1;
            return Err(PcmError::WouldBlock);
        }
        match state.resume_error.clone() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    fn write_interleaved(&mut self, data: &[u8]) -> Result<usize, PcmError> {
        let (step, delay, bytes_per_frame) = {
            let mut state = self.state.lock().unwrap();
            state.writes += 1;
            (
                state.script.pop_front(),
                state.write_delay,
                state.bytes_per_frame,
            )
        };
        if !delay.is_zero() {
            std::thread::sleep(delay);
        }
        self.event("write");
        // Unconfigured devices assume 16-bit stereo.
        let frames = data.len() / if bytes_per_frame == 0 { 4 } else { bytes_per_frame };
        match step {
            None | Some(WriteScript::Ok) => Ok(frames),
            Some(WriteScript::Short(frames)) => Ok(frames),
            Some(WriteScript::Fail(err)) => Err(err),
        }
    }
}

/// A [`MockPcm`] as handed out by [`MockBackend`]: dropping it closes the device.
#[derive(Debug)]
pub struct MockDevice(MockPcm);

impl Drop for MockDevice {
    fn drop(&mut self) {
        self.0.event("close");
        self.0.state.lock().unwrap().closed = true;
    }
}

impl PcmDevice for MockDevice {
    fn configure(&mut self, request: &HwRequest) -> Result<HwGrant, ConfigureError> {
        self.0.configure(request)
    }

    fn prepare(&mut self) -> Result<(), PcmError> {
        self.0.prepare()
    }

    fn resume(&mut self) -> Result<(), PcmError> {
        self.0.resume()
    }

    fn write_interleaved(&mut self, data: &[u8]) -> Result<usize, PcmError> {
        self.0.write_interleaved(data)
    }
}

struct MockVolume(Arc<Mutex<Vec<(i64, i64)>>>);

impl VolumeControl for MockVolume {
    fn playback_range(&self) -> (i64, i64) {
        (0, 31)
    }

    fn set_playback_volume(&mut self, left: i64, right: i64) -> Result<(), PcmError> {
        self.0.lock().unwrap().push((left, right));
        Ok(())
    }
}

pub struct MockBackend {
    pcm: Option<MockPcm>,
    volume: Option<Arc<Mutex<Vec<(i64, i64)>>>>,
}

impl MockBackend {
    pub fn new(pcm: MockPcm) -> Self {
        Self {
            pcm: Some(pcm),
            volume: Some(Arc::default()),
        }
    }

    /// A backend whose device cannot be opened.
    pub fn unavailable() -> Self {
        Self {
            pcm: None,
            volume: None,
        }
    }

    pub fn without_volume(mut self) -> Self {
        self.volume = None;
        self
    }

    pub fn volume_log(&self) -> Vec<(i64, i64)> {
        self.volume
            .as_ref()
            .map(|log| log.lock().unwrap().clone())
            .unwrap_or_default()
    }
}

impl PcmBackend for MockBackend {
    type Device = MockDevice;

    fn open_pcm(&self, _device: &str) -> Result<Self::Device, PcmError> {
        let pcm = self.pcm.clone().ok_or(PcmError::Other {
            errno: 2,
            description: "No such file or directory",
        })?;
        pcm.state.lock().unwrap().closed = false;
        Ok(MockDevice(pcm))
    }

    fn attach_volume(
        &self,
        _device: &str,
        _element: &str,
    ) -> Result<Box<dyn VolumeControl + Send>, PcmError> {
        match &self.volume {
            Some(log) => Ok(Box::new(MockVolume(log.clone()))),
            None => Err(PcmError::Other {
                errno: 19,
                description: "No such device",
            }),
        }
    }
}

impl SoundDriver for MockBackend {
    const DISPLAY_NAME: &'static str = "Mock";
}

#[derive(Debug, Default)]
pub struct MixerLog {
    pub inits: Vec<(MixerParams, usize)>,
    /// `(len, offset, signed)` of every fill.
    pub fills: Vec<(usize, usize, bool)>,
    pub shutdowns: usize,
}

/// Host mixer recording every call. Fills write `1` bytes.
#[derive(Debug, Clone, Default)]
pub struct RecordingMixer {
    pub log: Arc<Mutex<MixerLog>>,
    events: Events,
    init_error: Option<MixerError>,
}

impl RecordingMixer {
    /// Record events in the same timeline as `pcm`.
    pub fn with_events(pcm: &MockPcm) -> Self {
        Self {
            events: pcm.events.clone(),
            ..Self::default()
        }
    }

    pub fn failing(err: MixerError) -> Self {
        Self {
            init_error: Some(err),
            ..Self::default()
        }
    }
}

impl HostMixer for RecordingMixer {
    fn init(&mut self, params: MixerParams, voices: usize) -> Result<usize, MixerError> {
        if let Some(err) = self.init_error.clone() {
            return Err(err);
        }
        self.events.lock().unwrap().push("init");
        self.log.lock().unwrap().inits.push((params, voices));
        Ok(voices)
    }

    fn fill(&mut self, buffer: &mut [u8], offset: usize, signed: bool) {
        self.events.lock().unwrap().push("fill");
        buffer[offset..].fill(1);
        self.log
            .lock()
            .unwrap()
            .fills
            .push((buffer.len(), offset, signed));
    }

    fn shutdown(&mut self) {
        self.events.lock().unwrap().push("shutdown");
        self.log.lock().unwrap().shutdowns += 1;
    }
}
