// Per-capture derived views

use crate::analysis::capacity::{capacity_margin, required_average_mer, shannon_bits, CapacityMargin};
use crate::analysis::echo::{detect_echoes, EchoReport};
use crate::analysis::group_delay::group_delay;
use crate::analysis::smoothing::{moving_average, EdgeMode};
use crate::analysis::statistics::SignalStatistics;
use crate::core::complex::{ComplexSample, SampleExt};
use crate::core::error::{PnmError, Result};
use crate::core::format::*;
use crate::core::grid::SubcarrierGrid;
use crate::models::analysis_config::AnalysisConfig;
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RxMerAnalysis {
    pub signal_statistics: Option<SignalStatistics>,
    pub shannon_bits: Vec<Option<u8>>,
    pub measured_count: usize,
    pub excluded_count: usize,
    pub clipped_count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChannelResponseAnalysis {
    pub magnitude: Vec<f64>,
    pub magnitude_db: Vec<f64>,
    /// Seconds per subcarrier; absent with fewer than two subcarriers
    pub group_delay: Option<Vec<f64>>,
    pub echo: Option<EchoReport>,
    pub signal_statistics: Option<SignalStatistics>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConstellationAnalysis {
    pub sample_count: usize,
    /// Mean of `|s|^2`
    pub average_power: Option<f64>,
    pub magnitude_statistics: Option<SignalStatistics>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProfileSummary {
    pub profile_id: u8,
    pub data_subcarriers: usize,
    pub required_average_mer_db: Option<f64>,
    /// Subcarrier count per modulation name
    pub order_counts: BTreeMap<String, usize>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModulationProfileAnalysis {
    pub profiles: Vec<ProfileSummary>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FecProfileTotals {
    pub profile_id: u8,
    pub is_ncp: bool,
    pub sample_count: usize,
    pub total_codewords: u64,
    pub corrected: u64,
    pub uncorrectable: u64,
    pub corrected_ratio: Option<f64>,
    pub uncorrectable_ratio: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FecSummaryAnalysis {
    pub profiles: Vec<FecProfileTotals>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistogramAnalysis {
    pub total_hits: u64,
    pub total_dwell: u64,
    pub hit_statistics: Option<SignalStatistics>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SpectrumView {
    pub amplitude_statistics: Option<SignalStatistics>,
    pub peak_frequency_hz: Option<f64>,
    pub peak_amplitude_db: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "analysis", rename_all = "snake_case")]
pub enum AnalysisResult {
    RxMer(RxMerAnalysis),
    ChannelEstimation(ChannelResponseAnalysis),
    UpstreamPreEqualization(ChannelResponseAnalysis),
    Constellation(ConstellationAnalysis),
    ModulationProfile(ModulationProfileAnalysis),
    FecSummary(FecSummaryAnalysis),
    Histogram(HistogramAnalysis),
    SpectrumAnalysis(SpectrumView),
}

pub fn analyze(payload: &FormatPayload, config: &AnalysisConfig) -> Result<AnalysisResult> {
    debug!("analyzing {} payload", payload.file_type());
    let result = match payload {
        FormatPayload::RxMer(p) => AnalysisResult::RxMer(analyze_rxmer(p)),
        FormatPayload::ChannelEstimation(p) => {
            AnalysisResult::ChannelEstimation(analyze_channel_response(&p.grid, &p.coefficients, config)?)
        }
        FormatPayload::UpstreamPreEqualization(p) => {
            AnalysisResult::UpstreamPreEqualization(analyze_channel_response(&p.grid, &p.coefficients, config)?)
        }
        FormatPayload::Constellation(p) => AnalysisResult::Constellation(analyze_constellation(p)),
        FormatPayload::ModulationProfile(p) => AnalysisResult::ModulationProfile(analyze_profiles(p, config)),
        FormatPayload::FecSummary(p) => AnalysisResult::FecSummary(analyze_fec(p)),
        FormatPayload::Histogram(p) => AnalysisResult::Histogram(analyze_histogram(p)),
        FormatPayload::SpectrumAnalysis(p) => AnalysisResult::SpectrumAnalysis(analyze_spectrum(p)),
    };
    Ok(result)
}

fn statistics(values: &[f64]) -> Option<SignalStatistics> {
    SignalStatistics::compute(values).ok()
}

pub fn analyze_rxmer(payload: &RxMerPayload) -> RxMerAnalysis {
    RxMerAnalysis {
        signal_statistics: statistics(&payload.measured_values()),
        shannon_bits: payload.values.iter().map(|v| shannon_bits(*v)).collect(),
        measured_count: payload.count_status(CarrierStatus::Measured),
        excluded_count: payload.count_status(CarrierStatus::Excluded),
        clipped_count: payload.count_status(CarrierStatus::Clipped),
    }
}

pub fn analyze_channel_response(
    grid: &SubcarrierGrid,
    samples: &[ComplexSample],
    config: &AnalysisConfig,
) -> Result<ChannelResponseAnalysis> {
    let magnitude: Vec<f64> = samples.iter().map(|s| s.magnitude()).collect();
    let magnitude_db: Vec<f64> = samples.iter().map(|s| s.magnitude_db()).collect();

    let group_delay = if samples.len() >= 2 {
        let delay = group_delay(samples, &grid.frequencies())?;
        match config.group_delay.smoothing_points {
            Some(points) => Some(moving_average(&delay, points, EdgeMode::Reflect)?),
            None => Some(delay),
        }
    } else {
        None
    };

    let echo = match detect_echoes(samples, f64::from(grid.spacing_hz), &config.echo) {
        Ok(report) => Some(report),
        Err(PnmError::NoDirectPath) => None,
        Err(e) => return Err(e),
    };

    Ok(ChannelResponseAnalysis {
        signal_statistics: statistics(&magnitude_db),
        magnitude,
        magnitude_db,
        group_delay,
        echo,
    })
}

pub fn analyze_constellation(payload: &ConstellationPayload) -> ConstellationAnalysis {
    let magnitudes: Vec<f64> = payload.samples.iter().map(|s| s.magnitude()).collect();
    let average_power = if magnitudes.is_empty() {
        None
    } else {
        Some(magnitudes.iter().map(|m| m * m).sum::<f64>() / magnitudes.len() as f64)
    };
    ConstellationAnalysis {
        sample_count: magnitudes.len(),
        average_power,
        magnitude_statistics: statistics(&magnitudes),
    }
}

pub fn summarize_profile(profile: &ProfileSchemes, config: &AnalysisConfig) -> ProfileSummary {
    let modulations = profile.expand();
    let mut order_counts = BTreeMap::new();
    for order in &modulations {
        *order_counts.entry(order.to_string()).or_insert(0) += 1;
    }
    ProfileSummary {
        profile_id: profile.profile_id,
        data_subcarriers: modulations.iter().filter(|m| !m.is_excluded()).count(),
        required_average_mer_db: required_average_mer(&modulations, &config.capacity),
        order_counts,
    }
}

pub fn analyze_profiles(payload: &ModulationProfilePayload, config: &AnalysisConfig) -> ModulationProfileAnalysis {
    ModulationProfileAnalysis {
        profiles: payload.profiles.iter().map(|p| summarize_profile(p, config)).collect(),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProfileMargin {
    pub profile_id: u8,
    #[serde(flatten)]
    pub margin: CapacityMargin,
}

/// Compare one profile of `profiles` against a measured RxMER capture of the
/// same channel. The RxMER grid must equal the profile grid; a mismatch is
/// reported as row 1 against row 0.
pub fn profile_margin(
    profiles: &ModulationProfilePayload,
    profile: &ProfileSchemes,
    rxmer: &RxMerPayload,
    config: &AnalysisConfig,
) -> Result<ProfileMargin> {
    if profiles.grid != rxmer.grid {
        return Err(PnmError::GridMismatch { row: 1 });
    }
    let modulations = profile.expand();
    Ok(ProfileMargin {
        profile_id: profile.profile_id,
        margin: capacity_margin(&modulations, &rxmer.values, &config.capacity)?,
    })
}

pub fn analyze_fec(payload: &FecSummaryPayload) -> FecSummaryAnalysis {
    let ratio = |part: u64, total: u64| if total == 0 { None } else { Some(part as f64 / total as f64) };
    let profiles = payload
        .profiles
        .iter()
        .map(|series| {
            let sum = |f: fn(&CodewordSample) -> u32| series.samples.iter().map(|s| u64::from(f(s))).sum::<u64>();
            let total_codewords = sum(|s| s.total);
            let corrected = sum(|s| s.corrected);
            let uncorrectable = sum(|s| s.uncorrectable);
            FecProfileTotals {
                profile_id: series.profile_id,
                is_ncp: series.is_ncp(),
                sample_count: series.samples.len(),
                total_codewords,
                corrected,
                uncorrectable,
                corrected_ratio: ratio(corrected, total_codewords),
                uncorrectable_ratio: ratio(uncorrectable, total_codewords),
            }
        })
        .collect();
    FecSummaryAnalysis { profiles }
}

pub fn analyze_histogram(payload: &HistogramPayload) -> HistogramAnalysis {
    let hits: Vec<f64> = payload.hit_counts.iter().map(|h| f64::from(*h)).collect();
    HistogramAnalysis {
        total_hits: payload.hit_counts.iter().map(|h| u64::from(*h)).sum(),
        total_dwell: payload.dwell_counts.iter().map(|d| u64::from(*d)).sum(),
        hit_statistics: statistics(&hits),
    }
}

pub fn analyze_spectrum(payload: &SpectrumPayload) -> SpectrumView {
    let peak = payload
        .amplitudes_db
        .iter()
        .zip(&payload.frequencies_hz)
        .filter(|(a, _)| a.is_finite())
        .fold(None, |best: Option<(f64, f64)>, (&a, &f)| match best {
            Some((best_a, _)) if best_a >= a => best,
            _ => Some((a, f)),
        });
    SpectrumView {
        amplitude_statistics: statistics(&payload.amplitudes_db),
        peak_frequency_hz: peak.map(|(_, f)| f),
        peak_amplitude_db: peak.map(|(a, _)| a),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::reader::CaptureDecoder;
    use crate::models::analysis_config::EchoConfig;
    use crate::testing::*;
    use std::f64::consts::PI;

    fn decode(bytes: &[u8]) -> FormatPayload {
        CaptureDecoder::default().decode(bytes).unwrap()
    }

    #[test]
    fn test_rxmer_view() {
        let payload = decode(&rxmer_capture(100, &[160, 168, 0xFF, 0xFE]));
        let AnalysisResult::RxMer(view) = analyze(&payload, &AnalysisConfig::default()).unwrap() else {
            panic!("expected RxMER analysis");
        };
        assert_eq!(view.measured_count, 2);
        assert_eq!(view.excluded_count, 1);
        assert_eq!(view.clipped_count, 1);
        assert_eq!(view.shannon_bits[2], None);
        assert_eq!(view.signal_statistics.unwrap().finite_count, 3);
    }

    #[test]
    fn test_empty_rxmer_view() {
        let payload = decode(&rxmer_capture(0, &[]));
        let AnalysisResult::RxMer(view) = analyze(&payload, &AnalysisConfig::default()).unwrap() else {
            panic!("expected RxMER analysis");
        };
        assert!(view.signal_statistics.is_none());
        assert!(view.shannon_bits.is_empty());
    }

    #[test]
    fn test_channel_estimation_view() {
        let n = 128;
        let samples: Vec<ComplexSample> = (0..n)
            .map(|k| {
                ComplexSample::new(0.5, 0.0) + ComplexSample::from_polar(0.25, -2.0 * PI * k as f64 * 16.0 / n as f64)
            })
            .collect();
        let payload = decode(&channel_estimation_capture(800, 50, &samples));
        let config = AnalysisConfig {
            echo: EchoConfig {
                velocity_factor: 0.9,
                ..EchoConfig::default()
            },
            ..AnalysisConfig::default()
        };
        let AnalysisResult::ChannelEstimation(view) = analyze(&payload, &config).unwrap() else {
            panic!("expected channel estimation analysis");
        };
        assert_eq!(view.magnitude.len(), n);
        assert_eq!(view.group_delay.as_ref().map(Vec::len), Some(n));
        let echo = view.echo.unwrap();
        assert_eq!(echo.echoes[0].bin_index, 16);
        assert_eq!(echo.velocity_factor, 0.9);
    }

    #[test]
    fn test_invalid_echo_config_propagates() {
        let payload = decode(&channel_estimation_capture(0, 50, &[ComplexSample::new(1.0, 0.0); 4]));
        let config = AnalysisConfig {
            echo: EchoConfig {
                velocity_factor: 1.5,
                ..EchoConfig::default()
            },
            ..AnalysisConfig::default()
        };
        assert!(matches!(
            analyze(&payload, &config),
            Err(PnmError::InvalidPropagationSpeed(_))
        ));
    }

    #[test]
    fn test_profile_summary_and_margin() {
        let FormatPayload::ModulationProfile(profiles) =
            decode(&modulation_profile_capture(100, 103, &[(0, vec![(12, 2), (1, 1), (8, 1)])]))
        else {
            panic!("expected modulation profile");
        };
        let config = AnalysisConfig::default();
        let summary = summarize_profile(&profiles.profiles[0], &config);
        assert_eq!(summary.data_subcarriers, 3);
        assert_eq!(summary.order_counts["qam4096"], 2);
        assert_eq!(summary.order_counts["continuous-pilot"], 1);
        assert!((summary.required_average_mer_db.unwrap() - (41.0 + 41.0 + 27.0) / 3.0).abs() < 1e-12);

        // 35, 45, 40, 30 dB
        let FormatPayload::RxMer(rxmer) = decode(&rxmer_capture(100, &[140, 180, 160, 120])) else {
            panic!("expected RxMER");
        };
        let margin = profile_margin(&profiles, &profiles.profiles[0], &rxmer, &config).unwrap();
        assert_eq!(margin.profile_id, 0);
        assert_eq!(margin.margin.below_threshold_count, 1);
        assert_eq!(margin.margin.capacity_delta[2], None);
    }

    #[test]
    fn test_profile_margin_needs_same_grid() {
        let FormatPayload::ModulationProfile(profiles) =
            decode(&modulation_profile_capture(100, 103, &[(0, vec![(12, 4)])]))
        else {
            panic!("expected modulation profile");
        };
        let FormatPayload::RxMer(shifted) = decode(&rxmer_capture(200, &[140, 180, 160, 120])) else {
            panic!("expected RxMER");
        };
        assert_eq!(shifted.values.len(), profiles.profiles[0].total_subcarriers());
        assert!(matches!(
            profile_margin(&profiles, &profiles.profiles[0], &shifted, &AnalysisConfig::default()),
            Err(PnmError::GridMismatch { row: 1 })
        ));
    }

    #[test]
    fn test_fec_totals() {
        let sample = |total, corrected, uncorrectable| CodewordSample {
            timestamp: 1_700_000_000,
            total,
            corrected,
            uncorrectable,
        };
        let payload = decode(&fec_summary_capture(
            3,
            &[
                (0, vec![sample(1000, 10, 1), sample(3000, 30, 3)]),
                (255, vec![sample(0, 0, 0)]),
            ],
        ));
        let AnalysisResult::FecSummary(view) = analyze(&payload, &AnalysisConfig::default()).unwrap() else {
            panic!("expected FEC analysis");
        };
        let data = &view.profiles[0];
        assert_eq!(data.total_codewords, 4000);
        assert_eq!(data.corrected_ratio, Some(0.01));
        assert_eq!(data.uncorrectable_ratio, Some(0.001));
        assert!(view.profiles[1].is_ncp);
        assert_eq!(view.profiles[1].corrected_ratio, None);
    }

    #[test]
    fn test_histogram_and_spectrum_views() {
        let payload = decode(&histogram_capture(0, &[60, 40], &[1, 2, 3]));
        let AnalysisResult::Histogram(view) = analyze(&payload, &AnalysisConfig::default()).unwrap() else {
            panic!("expected histogram analysis");
        };
        assert_eq!(view.total_hits, 6);
        assert_eq!(view.total_dwell, 100);

        let payload = decode(&spectrum_capture(100_000_000, 1_000_000, 3, 250_000, &[-500, 120, -300, -700, -100, 90]));
        let AnalysisResult::SpectrumAnalysis(view) = analyze(&payload, &AnalysisConfig::default()).unwrap() else {
            panic!("expected spectrum analysis");
        };
        assert!((view.peak_amplitude_db.unwrap() - 1.2).abs() < 1e-12);
        assert_eq!(view.peak_frequency_hz, Some(100_000_000.0));
    }

    #[test]
    fn test_constellation_power() {
        let payload = decode(&constellation_capture(
            8,
            &[ComplexSample::new(1.0, 0.0), ComplexSample::new(0.0, -1.0), ComplexSample::new(1.0, 1.0)],
        ));
        let AnalysisResult::Constellation(view) = analyze(&payload, &AnalysisConfig::default()).unwrap() else {
            panic!("expected constellation analysis");
        };
        assert_eq!(view.sample_count, 3);
        assert!((view.average_power.unwrap() - 4.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_results_serialize_with_tag() {
        let payload = decode(&rxmer_capture(0, &[160, 160]));
        let json = serde_json::to_value(analyze(&payload, &AnalysisConfig::default()).unwrap()).unwrap();
        assert_eq!(json["analysis"], "rx_mer");
        assert_eq!(json["signal_statistics"]["mean"], 40.0);
    }
}
