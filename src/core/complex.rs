// Fixed-point complex coefficient codec

use crate::core::constants::COMPLEX_SAMPLE_SIZE;
use crate::core::cursor::ByteCursor;
use crate::core::error::{PnmError, Result};
use num_complex::Complex64;

pub type ComplexSample = Complex64;

pub trait SampleExt {
    fn magnitude(&self) -> f64;
    fn phase(&self) -> f64;
    /// 20*log10(|x|), -inf for a zero sample.
    fn magnitude_db(&self) -> f64;
}

impl SampleExt for ComplexSample {
    fn magnitude(&self) -> f64 {
        self.norm()
    }

    fn phase(&self) -> f64 {
        self.im.atan2(self.re)
    }

    fn magnitude_db(&self) -> f64 {
        20.0 * self.norm().log10()
    }
}

/// Signed 16+16 bit big-endian pairs with a configurable binary point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ComplexCodec {
    fractional_bits: u32,
    scale: f64,
}

impl ComplexCodec {
    pub fn new(fractional_bits: u32) -> Self {
        let fractional_bits = fractional_bits.min(15);
        Self {
            fractional_bits,
            scale: f64::from(1u32 << fractional_bits),
        }
    }

    pub fn fractional_bits(&self) -> u32 {
        self.fractional_bits
    }

    /// Smallest representable step.
    pub fn quantum(&self) -> f64 {
        1.0 / self.scale
    }

    pub fn decode_pair(&self, re: i16, im: i16) -> ComplexSample {
        ComplexSample::new(f64::from(re) / self.scale, f64::from(im) / self.scale)
    }

    pub fn decode_all(&self, data: &[u8]) -> Result<Vec<ComplexSample>> {
        if data.len() % COMPLEX_SAMPLE_SIZE != 0 {
            return Err(PnmError::MisalignedLength {
                field: "complex data",
                length: data.len(),
                width: COMPLEX_SAMPLE_SIZE,
            });
        }
        let mut cursor = ByteCursor::new(data);
        let mut samples = Vec::with_capacity(data.len() / COMPLEX_SAMPLE_SIZE);
        while !cursor.is_empty() {
            let re = cursor.read_i16("complex re")?;
            let im = cursor.read_i16("complex im")?;
            samples.push(self.decode_pair(re, im));
        }
        Ok(samples)
    }

    /// Quantize back to the wire format, saturating at the i16 range.
    pub fn encode(&self, sample: ComplexSample) -> [u8; COMPLEX_SAMPLE_SIZE] {
        let quantize = |v: f64| (v * self.scale).round().clamp(i16::MIN as f64, i16::MAX as f64) as i16;
        let mut out = [0u8; COMPLEX_SAMPLE_SIZE];
        out[0..2].copy_from_slice(&quantize(sample.re).to_be_bytes());
        out[2..4].copy_from_slice(&quantize(sample.im).to_be_bytes());
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_s2_13() {
        let codec = ComplexCodec::new(13);
        // 0x2000 = 8192 -> 1.0, 0xE000 = -8192 -> -1.0
        let data = [0x20, 0x00, 0xE0, 0x00, 0x60, 0x00, 0x00, 0x00];
        let samples = codec.decode_all(&data).unwrap();
        assert_eq!(samples[0], ComplexSample::new(1.0, -1.0));
        assert_eq!(samples[1], ComplexSample::new(3.0, 0.0));
    }

    #[test]
    fn test_encode_within_quantum() {
        let codec = ComplexCodec::new(13);
        let value = ComplexSample::new(0.123_456, -1.987_654);
        let decoded = codec.decode_all(&codec.encode(value)).unwrap()[0];
        assert!((decoded.re - value.re).abs() <= codec.quantum() / 2.0);
        assert!((decoded.im - value.im).abs() <= codec.quantum() / 2.0);
    }

    #[test]
    fn test_magnitude_and_phase() {
        let s = ComplexSample::new(0.0, 1.0);
        assert!((s.magnitude() - 1.0).abs() < 1e-12);
        assert!((s.phase() - std::f64::consts::FRAC_PI_2).abs() < 1e-12);
        assert!(s.magnitude_db().abs() < 1e-12);
    }

    #[test]
    fn test_misaligned_data() {
        let codec = ComplexCodec::new(13);
        assert!(matches!(
            codec.decode_all(&[0, 1, 2]),
            Err(PnmError::MisalignedLength { .. })
        ));
    }
}
