//! Ready-made host mixers, for hosts without a software mixer of their own and for testing a
//! device.

use crate::sample::ConvertSample;
use fragstream_core::{HostMixer, MixerError, MixerParams};
use std::f32::consts::TAU;

/// Plays silence in whatever format was negotiated.
#[derive(Debug, Clone, Copy, Default)]
pub struct SilenceMixer {
    sixteen_bit: bool,
}

impl HostMixer for SilenceMixer {
    fn init(&mut self, params: MixerParams, voices: usize) -> Result<usize, MixerError> {
        self.sixteen_bit = params.sixteen_bit;
        Ok(voices)
    }

    fn fill(&mut self, buffer: &mut [u8], offset: usize, _signed: bool) {
        if self.sixteen_bit {
            i16::fill_silence(&mut buffer[offset..]);
        } else {
            u8::fill_silence(&mut buffer[offset..]);
        }
    }

    fn shutdown(&mut self) {}
}

/// Sine wave generator, the same tone on every channel.
#[derive(Debug, Clone)]
pub struct ToneMixer {
    pub frequency: f32,
    /// Linear gain, kept low by default so as not to blow up speakers and ears.
    pub amplitude: f32,
    phase: f32,
    params: Option<MixerParams>,
}

impl ToneMixer {
    pub fn new(frequency: f32) -> Self {
        Self {
            frequency,
            amplitude: 0.125,
            phase: 0.0,
            params: None,
        }
    }

    fn next_sample(&mut self, samplerate: f32) -> f32 {
        let y = (TAU * self.phase).sin();
        self.phase += self.frequency / samplerate;
        if self.phase >= 1.0 {
            self.phase -= 1.0;
        }
        y * self.amplitude
    }

    fn render<S: ConvertSample>(&mut self, output: &mut [u8], params: MixerParams) {
        let channels = if params.stereo { 2 } else { 1 };
        let samplerate = params.rate_hz as f32;
        for frame in output.chunks_exact_mut(S::BYTES * channels) {
            let value = self.next_sample(samplerate);
            S::convert_into_bytes(frame, std::iter::repeat_n(value, channels));
        }
    }
}

impl HostMixer for ToneMixer {
    fn init(&mut self, params: MixerParams, voices: usize) -> Result<usize, MixerError> {
        if params.rate_hz == 0 {
            return Err(MixerError("sample rate is zero".into()));
        }
        log::debug!(frequency = self.frequency, rate = params.rate_hz; "Tone mixer ready");
        self.params = Some(params);
        self.phase = 0.0;
        Ok(voices)
    }

    fn fill(&mut self, buffer: &mut [u8], offset: usize, _signed: bool) {
        let Some(params) = self.params else {
            return;
        };
        if params.sixteen_bit {
            self.render::<i16>(&mut buffer[offset..], params);
        } else {
            self.render::<u8>(&mut buffer[offset..], params);
        }
    }

    fn shutdown(&mut self) {
        self.params = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(stereo: bool, sixteen_bit: bool) -> MixerParams {
        MixerParams {
            frames_per_fragment: 8,
            rate_hz: 8,
            stereo,
            sixteen_bit,
        }
    }

    #[test]
    fn test_silence_by_format() {
        let mut mixer = SilenceMixer::default();
        mixer.init(params(true, false), 4).unwrap();
        let mut buffer = [0u8; 16];
        mixer.fill(&mut buffer, 0, false);
        assert!(buffer.iter().all(|&b| b == 0x80));

        mixer.init(params(true, true), 4).unwrap();
        let mut buffer = [0xAAu8; 32];
        mixer.fill(&mut buffer, 0, true);
        assert!(buffer.iter().all(|&b| b == 0));
    }

    #[test]
    fn test_tone_channels_match() {
        let mut mixer = ToneMixer::new(2.0);
        mixer.amplitude = 1.0;
        mixer.init(params(true, true), 1).unwrap();
        let mut buffer = [0u8; 32];
        mixer.fill(&mut buffer, 0, true);
        let samples: Vec<i16> = buffer
            .chunks_exact(2)
            .map(|b| i16::from_ne_bytes([b[0], b[1]]))
            .collect();
        for frame in samples.chunks_exact(2) {
            assert_eq!(frame[0], frame[1]);
        }
        // 2 Hz at 8 Hz: peak on the second frame.
        assert_eq!(0, samples[0]);
        assert_eq!(i16::MAX, samples[2]);
    }

    #[test]
    fn test_tone_unsigned_centered() {
        let mut mixer = ToneMixer::new(1.0);
        mixer.init(params(false, false), 1).unwrap();
        let mut buffer = [0u8; 8];
        mixer.fill(&mut buffer, 0, false);
        assert_eq!(0x80, buffer[0]);
        assert!(buffer[1] > 0x80);
    }

    #[test]
    fn test_tone_rejects_zero_rate() {
        let mut mixer = ToneMixer::new(440.0);
        let mut params = params(true, true);
        params.rate_hz = 0;
        assert!(mixer.init(params, 1).is_err());
    }
}
