use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::core::constants::{DEFAULT_FRACTIONAL_BITS, RXMER_CLIPPED, RXMER_EXCLUDED};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DecodeOptions {
    /// RxMER bytes that mark a carrier as excluded from measurement.
    pub rxmer_excluded: Vec<u8>,
    /// RxMER bytes that mark a carrier as clipped at the top of the scale.
    pub rxmer_clipped: Vec<u8>,
    pub complex_fractional_bits: u32,
}

impl Default for DecodeOptions {
    fn default() -> Self {
        Self {
            rxmer_excluded: vec![RXMER_EXCLUDED],
            rxmer_clipped: vec![RXMER_CLIPPED],
            complex_fractional_bits: DEFAULT_FRACTIONAL_BITS,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EchoMode {
    FirstEcho,
    MultiEcho,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EchoConfig {
    pub mode: EchoMode,
    pub threshold_frac: f64,
    pub guard_bins: usize,
    pub n_fft: Option<usize>,
    pub velocity_factor: f64,
    pub max_delay_s: Option<f64>,
    pub min_separation_s: f64,
    pub max_peaks: usize,
}

impl Default for EchoConfig {
    fn default() -> Self {
        Self {
            mode: EchoMode::MultiEcho,
            threshold_frac: 0.2,
            guard_bins: 2,
            n_fft: None,
            velocity_factor: 0.87,
            max_delay_s: None,
            min_separation_s: 0.0,
            max_peaks: 5,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum GroupDelayMode {
    /// Coherent average across snapshots, then a single unwrap.
    #[default]
    Full,
    /// Per-snapshot group delay, then the per-subcarrier median.
    PerSnapshot,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct GroupDelayConfig {
    pub mode: GroupDelayMode,
    /// Optional masked moving-average width applied to the delay series.
    pub smoothing_points: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CapacityConfig {
    pub threshold_offset_db: f64,
    /// Required MER in dB keyed by bits per symbol.
    pub required_mer_db: BTreeMap<u8, f64>,
}

impl Default for CapacityConfig {
    fn default() -> Self {
        let table = [
            (2, 9.0),
            (3, 12.0),
            (4, 15.0),
            (5, 18.0),
            (6, 21.0),
            (7, 24.0),
            (8, 27.0),
            (9, 30.5),
            (10, 34.0),
            (11, 37.0),
            (12, 41.0),
            (13, 46.0),
            (14, 50.0),
            (15, 54.0),
            (16, 58.0),
        ];
        Self {
            threshold_offset_db: 0.0,
            required_mer_db: table.into_iter().collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct AnalysisConfig {
    pub decode: DecodeOptions,
    pub echo: EchoConfig,
    pub group_delay: GroupDelayConfig,
    pub capacity: CapacityConfig,
}
