// Synthetic capture encoder used by unit tests

use crate::core::complex::{ComplexCodec, ComplexSample};
use crate::core::constants::*;
use crate::core::format::CodewordSample;
use crate::core::header::CaptureHeader;

pub const TEST_MAC: [u8; 6] = [0x00, 0x50, 0xF1, 0x12, 0x34, 0x56];
pub const TEST_CAPTURE_TIME: u32 = 1_700_000_000;
pub const TEST_ZERO_FREQ: u32 = 700_000_000;

pub fn test_header(file_type: FileType) -> CaptureHeader {
    CaptureHeader {
        file_type,
        file_type_version: 1,
        major_version: 1,
        minor_version: 0,
        capture_time: TEST_CAPTURE_TIME,
    }
}

pub struct CaptureBuilder {
    bytes: Vec<u8>,
}

impl CaptureBuilder {
    pub fn new(file_type: FileType) -> Self {
        Self {
            bytes: test_header(file_type).to_bytes().to_vec(),
        }
    }

    pub fn u8(mut self, v: u8) -> Self {
        self.bytes.push(v);
        self
    }

    pub fn u16(mut self, v: u16) -> Self {
        self.bytes.extend_from_slice(&v.to_be_bytes());
        self
    }

    pub fn i16(mut self, v: i16) -> Self {
        self.bytes.extend_from_slice(&v.to_be_bytes());
        self
    }

    pub fn u32(mut self, v: u32) -> Self {
        self.bytes.extend_from_slice(&v.to_be_bytes());
        self
    }

    pub fn bytes(mut self, v: &[u8]) -> Self {
        self.bytes.extend_from_slice(v);
        self
    }

    pub fn ofdm_preamble(self, first: u16, last: u16, spacing_khz: u8) -> Self {
        self.u8(33)
            .bytes(&TEST_MAC)
            .u32(TEST_ZERO_FREQ)
            .u16(first)
            .u16(last)
            .u8(spacing_khz)
    }

    pub fn complex(mut self, samples: &[ComplexSample]) -> Self {
        let codec = ComplexCodec::new(DEFAULT_FRACTIONAL_BITS);
        for s in samples {
            self.bytes.extend_from_slice(&codec.encode(*s));
        }
        self
    }

    pub fn build(self) -> Vec<u8> {
        self.bytes
    }
}

fn last_index(first: u16, count: usize) -> u16 {
    if count == 0 {
        INDEX_NOT_PRESENT
    } else {
        first + count as u16 - 1
    }
}

pub fn rxmer_capture(first: u16, raw: &[u8]) -> Vec<u8> {
    let first_field = if raw.is_empty() { INDEX_NOT_PRESENT } else { first };
    CaptureBuilder::new(FileType::RxMer)
        .ofdm_preamble(first_field, last_index(first, raw.len()), 50)
        .u32(raw.len() as u32)
        .bytes(raw)
        .build()
}

pub fn channel_estimation_capture(first: u16, spacing_khz: u8, samples: &[ComplexSample]) -> Vec<u8> {
    CaptureBuilder::new(FileType::ChannelEstimation)
        .ofdm_preamble(first, last_index(first, samples.len()), spacing_khz)
        .u32((samples.len() * COMPLEX_SAMPLE_SIZE) as u32)
        .complex(samples)
        .build()
}

pub fn pre_eq_capture(file_type: FileType, first: u16, samples: &[ComplexSample]) -> Vec<u8> {
    CaptureBuilder::new(file_type)
        .bytes(&TEST_MAC)
        .bytes(&[0x00, 0x01, 0x5C, 0xAA, 0xBB, 0xCC])
        .u32(TEST_ZERO_FREQ / 10)
        .u16(first)
        .u16(last_index(first, samples.len()))
        .u8(50)
        .u32((samples.len() * COMPLEX_SAMPLE_SIZE) as u32)
        .complex(samples)
        .build()
}

/// Profiles as `(profile_id, [(modulation_code, run_length)])`.
pub fn modulation_profile_capture(first: u16, last: u16, profiles: &[(u8, Vec<(u8, u16)>)]) -> Vec<u8> {
    let mut builder = CaptureBuilder::new(FileType::ModulationProfile)
        .ofdm_preamble(first, last, 50)
        .u8(profiles.len() as u8);
    for (profile_id, runs) in profiles {
        builder = builder
            .u8(*profile_id)
            .u16((runs.len() * SCHEME_ENTRY_SIZE) as u16);
        for (code, count) in runs {
            builder = builder.u8(0).u8(*code).u16(*count);
        }
    }
    builder.build()
}

pub fn fec_summary_capture(summary_type: u8, profiles: &[(u8, Vec<CodewordSample>)]) -> Vec<u8> {
    let mut builder = CaptureBuilder::new(FileType::FecSummary)
        .u8(33)
        .bytes(&TEST_MAC)
        .u8(summary_type)
        .u8(profiles.len() as u8);
    for (profile_id, samples) in profiles {
        builder = builder.u8(*profile_id).u16(samples.len() as u16);
        for s in samples {
            builder = builder
                .u32(s.timestamp)
                .u32(s.total)
                .u32(s.corrected)
                .u32(s.uncorrectable);
        }
    }
    builder.build()
}

pub fn histogram_capture(symmetry: u8, dwell: &[u32], hits: &[u32]) -> Vec<u8> {
    let mut builder = CaptureBuilder::new(FileType::Histogram)
        .u8(33)
        .bytes(&TEST_MAC)
        .u8(symmetry)
        .u32((dwell.len() * HISTOGRAM_COUNTER_SIZE) as u32);
    for d in dwell {
        builder = builder.u32(*d);
    }
    builder = builder.u32((hits.len() * HISTOGRAM_COUNTER_SIZE) as u32);
    for h in hits {
        builder = builder.u32(*h);
    }
    builder.build()
}

/// Spectrum capture with amplitudes in hundredths of a dB, `bins` per segment.
pub fn spectrum_capture(first_center: u32, span: u32, bins: u16, bin_spacing: u32, amplitudes: &[i16]) -> Vec<u8> {
    let segments = if bins == 0 { 0 } else { amplitudes.len() / bins as usize };
    let last_center = first_center + span * segments.saturating_sub(1) as u32;
    let mut builder = CaptureBuilder::new(FileType::SpectrumAnalysis)
        .u8(0)
        .bytes(&TEST_MAC)
        .u32(first_center)
        .u32(last_center)
        .u32(span)
        .u16(bins)
        .u16(110)
        .u16(1)
        .u32(bin_spacing)
        .u32((amplitudes.len() * SPECTRUM_SAMPLE_SIZE) as u32);
    for a in amplitudes {
        builder = builder.i16(*a);
    }
    builder.build()
}

pub fn constellation_capture(modulation_order: u8, samples: &[ComplexSample]) -> Vec<u8> {
    CaptureBuilder::new(FileType::Constellation)
        .u8(33)
        .bytes(&TEST_MAC)
        .u8(modulation_order)
        .u16(samples.len() as u16)
        .u32((samples.len() * COMPLEX_SAMPLE_SIZE) as u32)
        .complex(samples)
        .build()
}
