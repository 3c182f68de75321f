// Data structures for decoded PNM payloads

use crate::core::complex::ComplexSample;
use crate::core::constants::*;
use crate::core::grid::SubcarrierGrid;
use crate::core::header::CaptureHeader;
use serde::{Serialize, Serializer};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MacAddress(pub [u8; 6]);

impl fmt::Display for MacAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let b = self.0;
        write!(
            f,
            "{:02x}:{:02x}:{:02x}:{:02x}:{:02x}:{:02x}",
            b[0], b[1], b[2], b[3], b[4], b[5]
        )
    }
}

impl Serialize for MacAddress {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

// ---------------------------------------------------------------- RxMER

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CarrierStatus {
    Measured,
    Excluded,
    Clipped,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RxMerPayload {
    pub header: CaptureHeader,
    pub channel_id: u8,
    pub cm_mac: MacAddress,
    #[serde(flatten)]
    pub grid: SubcarrierGrid,
    /// MER in dB per active subcarrier; NaN for excluded carriers.
    pub values: Vec<f64>,
    pub carrier_status: Vec<CarrierStatus>,
}

impl RxMerPayload {
    /// Values of carriers with a usable measurement (clipped carriers included).
    pub fn measured_values(&self) -> Vec<f64> {
        self.values
            .iter()
            .zip(&self.carrier_status)
            .filter(|(_, status)| **status != CarrierStatus::Excluded)
            .map(|(v, _)| *v)
            .collect()
    }

    pub fn count_status(&self, status: CarrierStatus) -> usize {
        self.carrier_status.iter().filter(|s| **s == status).count()
    }
}

// ---------------------------------------------------------------- complex payloads

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChannelEstimationPayload {
    pub header: CaptureHeader,
    pub channel_id: u8,
    pub cm_mac: MacAddress,
    #[serde(flatten)]
    pub grid: SubcarrierGrid,
    #[serde(rename = "complex")]
    pub coefficients: Vec<ComplexSample>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConstellationPayload {
    pub header: CaptureHeader,
    pub channel_id: u8,
    pub cm_mac: MacAddress,
    pub modulation_order: u8,
    pub num_sample_symbols: u16,
    #[serde(rename = "complex")]
    pub samples: Vec<ComplexSample>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PreEqualizationPayload {
    pub header: CaptureHeader,
    pub cm_mac: MacAddress,
    pub cmts_mac: MacAddress,
    #[serde(flatten)]
    pub grid: SubcarrierGrid,
    #[serde(rename = "complex")]
    pub coefficients: Vec<ComplexSample>,
    pub last_update: bool,
}

// ---------------------------------------------------------------- modulation profile

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ModulationOrder {
    ZeroBitLoaded,
    ContinuousPilot,
    /// 2^bits point constellation (QPSK is 2 bits).
    Qam { bits: u8 },
    Unknown(u8),
}

impl ModulationOrder {
    pub fn from_code(code: u8) -> Self {
        match code {
            0 => ModulationOrder::ZeroBitLoaded,
            1 => ModulationOrder::ContinuousPilot,
            2..=16 => ModulationOrder::Qam { bits: code },
            other => ModulationOrder::Unknown(other),
        }
    }

    pub fn code(&self) -> u8 {
        match *self {
            ModulationOrder::ZeroBitLoaded => 0,
            ModulationOrder::ContinuousPilot => 1,
            ModulationOrder::Qam { bits } => bits,
            ModulationOrder::Unknown(code) => code,
        }
    }

    pub fn is_excluded(&self) -> bool {
        !matches!(self, ModulationOrder::Qam { .. })
    }
}

impl fmt::Display for ModulationOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            ModulationOrder::ZeroBitLoaded => f.write_str("zero-bit-loaded"),
            ModulationOrder::ContinuousPilot => f.write_str("continuous-pilot"),
            ModulationOrder::Qam { bits: 2 } => f.write_str("qpsk"),
            ModulationOrder::Qam { bits } => write!(f, "qam{}", 1u32 << bits),
            ModulationOrder::Unknown(code) => write!(f, "unknown({})", code),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SchemeRun {
    pub scheme_type: u8,
    pub modulation: ModulationOrder,
    pub subcarrier_count: u16,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProfileSchemes {
    pub profile_id: u8,
    pub runs: Vec<SchemeRun>,
}

impl ProfileSchemes {
    pub fn total_subcarriers(&self) -> usize {
        self.runs.iter().map(|r| r.subcarrier_count as usize).sum()
    }

    /// Flat per-subcarrier modulation array.
    pub fn expand(&self) -> Vec<ModulationOrder> {
        let mut out = Vec::with_capacity(self.total_subcarriers());
        for run in &self.runs {
            out.extend(std::iter::repeat(run.modulation).take(run.subcarrier_count as usize));
        }
        out
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModulationProfilePayload {
    pub header: CaptureHeader,
    pub channel_id: u8,
    pub cm_mac: MacAddress,
    #[serde(flatten)]
    pub grid: SubcarrierGrid,
    pub profiles: Vec<ProfileSchemes>,
}

impl ModulationProfilePayload {
    pub fn profile(&self, profile_id: u8) -> Option<&ProfileSchemes> {
        self.profiles.iter().find(|p| p.profile_id == profile_id)
    }
}

// ---------------------------------------------------------------- FEC summary

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FecSummaryType {
    TwentyFourHour,
    TenMinute,
}

impl FecSummaryType {
    pub fn from_u8(val: u8) -> Option<Self> {
        match val {
            FEC_SUMMARY_24_HOUR => Some(FecSummaryType::TwentyFourHour),
            FEC_SUMMARY_10_MINUTE => Some(FecSummaryType::TenMinute),
            _ => None,
        }
    }

    pub fn code(self) -> u8 {
        match self {
            FecSummaryType::TwentyFourHour => FEC_SUMMARY_24_HOUR,
            FecSummaryType::TenMinute => FEC_SUMMARY_10_MINUTE,
        }
    }

    pub fn max_records(self) -> usize {
        match self {
            FecSummaryType::TwentyFourHour => FEC_24_HOUR_MAX_RECORDS,
            FecSummaryType::TenMinute => FEC_10_MINUTE_MAX_RECORDS,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CodewordSample {
    pub timestamp: u32,
    pub total: u32,
    pub corrected: u32,
    pub uncorrectable: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FecProfileSeries {
    pub profile_id: u8,
    pub samples: Vec<CodewordSample>,
}

impl FecProfileSeries {
    pub fn is_ncp(&self) -> bool {
        self.profile_id == NCP_PROFILE_ID
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FecSummaryPayload {
    pub header: CaptureHeader,
    pub channel_id: u8,
    pub cm_mac: MacAddress,
    pub summary_type: FecSummaryType,
    pub profiles: Vec<FecProfileSeries>,
}

// ---------------------------------------------------------------- histogram

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistogramPayload {
    pub header: CaptureHeader,
    pub channel_id: u8,
    pub cm_mac: MacAddress,
    pub symmetry: u8,
    pub dwell_counts: Vec<u32>,
    pub hit_counts: Vec<u32>,
}

// ---------------------------------------------------------------- spectrum

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SpectrumPayload {
    pub header: CaptureHeader,
    pub channel_id: u8,
    pub cm_mac: MacAddress,
    pub first_segment_center_freq: u32,
    pub last_segment_center_freq: u32,
    pub segment_freq_span: u32,
    pub num_bins_per_segment: u16,
    pub equivalent_noise_bandwidth: u16,
    pub window_function: u16,
    pub bin_frequency_spacing: u32,
    pub segment_count: usize,
    pub frequencies_hz: Vec<f64>,
    pub amplitudes_db: Vec<f64>,
}

// ---------------------------------------------------------------- tagged union

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "payload", rename_all = "snake_case")]
pub enum FormatPayload {
    RxMer(RxMerPayload),
    ChannelEstimation(ChannelEstimationPayload),
    Constellation(ConstellationPayload),
    ModulationProfile(ModulationProfilePayload),
    FecSummary(FecSummaryPayload),
    Histogram(HistogramPayload),
    SpectrumAnalysis(SpectrumPayload),
    UpstreamPreEqualization(PreEqualizationPayload),
}

impl FormatPayload {
    pub fn header(&self) -> &CaptureHeader {
        match self {
            FormatPayload::RxMer(p) => &p.header,
            FormatPayload::ChannelEstimation(p) => &p.header,
            FormatPayload::Constellation(p) => &p.header,
            FormatPayload::ModulationProfile(p) => &p.header,
            FormatPayload::FecSummary(p) => &p.header,
            FormatPayload::Histogram(p) => &p.header,
            FormatPayload::SpectrumAnalysis(p) => &p.header,
            FormatPayload::UpstreamPreEqualization(p) => &p.header,
        }
    }

    pub fn file_type(&self) -> FileType {
        self.header().file_type
    }

    pub fn grid(&self) -> Option<&SubcarrierGrid> {
        match self {
            FormatPayload::RxMer(p) => Some(&p.grid),
            FormatPayload::ChannelEstimation(p) => Some(&p.grid),
            FormatPayload::ModulationProfile(p) => Some(&p.grid),
            FormatPayload::UpstreamPreEqualization(p) => Some(&p.grid),
            _ => None,
        }
    }

    /// Complex per-subcarrier data, for payloads that carry it.
    pub fn complex_samples(&self) -> Option<&[ComplexSample]> {
        match self {
            FormatPayload::ChannelEstimation(p) => Some(&p.coefficients),
            FormatPayload::UpstreamPreEqualization(p) => Some(&p.coefficients),
            _ => None,
        }
    }
}
