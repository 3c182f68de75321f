// Format constants for DOCSIS PNM capture files

pub const MAGIC: &[u8; 3] = b"PNN";

// Header: MAGIC(3) type(u8) file_type_version(u8) major(u8) minor(u8) capture_time(u32)
pub const HEADER_SIZE: usize = 3 + 1 + 1 + 1 + 1 + 4; // 11 bytes

// OFDM grid preamble: channel(u8) mac(6) zero_freq(u32) first(u16) last(u16) spacing_khz(u8)
pub const OFDM_PREAMBLE_SIZE: usize = 1 + 6 + 4 + 2 + 2 + 1; // 16 bytes

// Sentinel for "index not present" in 16-bit subcarrier index fields
pub const INDEX_NOT_PRESENT: u16 = 0xFFFF;

// Complex coefficient: re(i16) im(i16)
pub const COMPLEX_SAMPLE_SIZE: usize = 4;

// Default fixed-point format for complex coefficients (s2.13)
pub const DEFAULT_FRACTIONAL_BITS: u32 = 13;

// RxMER encoding: one byte per subcarrier, quarter-dB steps
pub const RXMER_SAMPLE_SIZE: usize = 1;
pub const RXMER_STEP_DB: f64 = 0.25;
pub const RXMER_EXCLUDED: u8 = 0xFF;
pub const RXMER_CLIPPED: u8 = 0xFE;

// Modulation profile scheme entry: scheme_type(u8) modulation(u8) count(u16)
pub const SCHEME_ENTRY_SIZE: usize = 4;

// FEC summary record: timestamp(u32) total(u32) corrected(u32) uncorrectable(u32)
pub const FEC_RECORD_SIZE: usize = 16;
pub const FEC_SUMMARY_24_HOUR: u8 = 2;
pub const FEC_SUMMARY_10_MINUTE: u8 = 3;
pub const FEC_24_HOUR_MAX_RECORDS: usize = 1440;
pub const FEC_10_MINUTE_MAX_RECORDS: usize = 600;
pub const NCP_PROFILE_ID: u8 = 255;

// Histogram counters are u32
pub const HISTOGRAM_COUNTER_SIZE: usize = 4;

// Spectrum amplitudes: i16 in hundredths of a dB
pub const SPECTRUM_SAMPLE_SIZE: usize = 2;
pub const SPECTRUM_AMPLITUDE_SCALE: f64 = 0.01;

// Propagation
pub const SPEED_OF_LIGHT_M_S: f64 = 299_792_458.0;
pub const FEET_PER_METER: f64 = 3.28084;

// File type codes (the byte following "PNN")
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FileType {
    ChannelEstimation = 2,
    Constellation = 3,
    RxMer = 4,
    Histogram = 5,
    UpstreamPreEqualization = 6,
    UpstreamPreEqualizationLastUpdate = 7,
    FecSummary = 8,
    SpectrumAnalysis = 9,
    ModulationProfile = 10,
}

impl FileType {
    pub fn from_u8(val: u8) -> Option<Self> {
        match val {
            2 => Some(FileType::ChannelEstimation),
            3 => Some(FileType::Constellation),
            4 => Some(FileType::RxMer),
            5 => Some(FileType::Histogram),
            6 => Some(FileType::UpstreamPreEqualization),
            7 => Some(FileType::UpstreamPreEqualizationLastUpdate),
            8 => Some(FileType::FecSummary),
            9 => Some(FileType::SpectrumAnalysis),
            10 => Some(FileType::ModulationProfile),
            _ => None,
        }
    }

    pub fn code(self) -> u8 {
        self as u8
    }

    /// Tag as printed on capture files, e.g. `PNN4`.
    pub fn tag(self) -> String {
        format!("PNN{}", self.code())
    }
}

impl std::fmt::Display for FileType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.tag())
    }
}
