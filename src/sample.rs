//! Conversions between `f32` samples and the raw interleaved bytes of a fragment buffer.

use duplicate::duplicate_item;

/// PCM sample types a fragment can hold.
pub trait ConvertSample: Sized + Copy {
    /// Value of silence.
    const ZERO: Self;
    /// Size of one sample in the fragment buffer.
    const BYTES: usize;

    fn convert_from_f32(v: f32) -> Self;

    /// Write `self` in native byte order into the first [`Self::BYTES`] bytes of `out`.
    fn write_ne(self, out: &mut [u8]);

    /// Write one converted sample per chunk of `output`. Extra samples are ignored.
    fn convert_into_bytes(output: &mut [u8], input: impl IntoIterator<Item = f32>) {
        for (out, sample) in output.chunks_exact_mut(Self::BYTES).zip(input) {
            Self::convert_from_f32(sample).write_ne(out);
        }
    }

    /// Fill `output` with silence.
    fn fill_silence(output: &mut [u8]) {
        for out in output.chunks_exact_mut(Self::BYTES) {
            Self::ZERO.write_ne(out);
        }
    }
}

#[duplicate_item(
int     zero    bytes;
[i16]   [0]     [2];
[u8]    [128]   [1];
)]
impl ConvertSample for int {
    const ZERO: Self = zero;
    const BYTES: usize = bytes;

    fn convert_from_f32(f: f32) -> Self {
        let f = f.clamp(-1.0, 1.0);
        (Self::ZERO as f32 + f * (Self::MAX as f32 - Self::ZERO as f32)).round() as Self
    }

    #[inline]
    fn write_ne(self, out: &mut [u8]) {
        out[..bytes].copy_from_slice(&self.to_ne_bytes());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_u8_is_offset_binary() {
        assert_eq!(128, u8::convert_from_f32(0.0));
        assert_eq!(255, u8::convert_from_f32(1.0));
        assert_eq!(1, u8::convert_from_f32(-1.0));
        assert_eq!(255, u8::convert_from_f32(4.0));
    }

    #[test]
    fn test_i16_full_scale() {
        assert_eq!(0, i16::convert_from_f32(0.0));
        assert_eq!(i16::MAX, i16::convert_from_f32(1.0));
        assert_eq!(-i16::MAX, i16::convert_from_f32(-1.0));
    }

    #[test]
    fn test_bytes_are_native_endian() {
        let mut out = [0u8; 4];
        i16::convert_into_bytes(&mut out, [1.0, -1.0]);
        assert_eq!(i16::MAX.to_ne_bytes(), out[..2]);
        assert_eq!((-i16::MAX).to_ne_bytes(), out[2..]);
    }

    #[test]
    fn test_silence() {
        let mut out = [7u8; 3];
        u8::fill_silence(&mut out);
        assert_eq!([128; 3], out);
        let mut out = [7u8; 4];
        i16::fill_silence(&mut out);
        assert_eq!([0; 4], out);
    }
}
