// Descriptive statistics; non-finite samples are counted but never used

use crate::core::error::{PnmError, Result};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SignalStatistics {
    /// Number of samples supplied, finite or not
    pub count: usize,
    pub finite_count: usize,
    pub mean: f64,
    pub median: f64,
    pub variance: f64,
    pub std: f64,
    pub mean_abs_deviation: f64,
    pub power: f64,
    pub min: f64,
    pub max: f64,
    pub peak_to_peak: f64,
    /// `max|x| / sqrt(power)`, 0 for an all-zero sequence
    pub crest_factor: f64,
    /// Third standardized moment, 0 when the variance is 0
    pub skewness: f64,
    /// Fourth standardized moment (not excess), 0 when the variance is 0
    pub kurtosis: f64,
    pub zero_crossings: usize,
    pub zero_crossing_rate: f64,
}

impl SignalStatistics {
    pub fn compute(samples: &[f64]) -> Result<Self> {
        if samples.is_empty() {
            return Err(PnmError::EmptyInput);
        }

        let mut finite: Vec<f64> = samples.iter().copied().filter(|v| v.is_finite()).collect();
        if finite.is_empty() {
            return Err(PnmError::EmptyInput);
        }
        let n = finite.len() as f64;

        let mean = finite.iter().sum::<f64>() / n;
        let power = finite.iter().map(|v| v * v).sum::<f64>() / n;
        let mean_abs_deviation = finite.iter().map(|v| (v - mean).abs()).sum::<f64>() / n;

        let (mut m2, mut m3, mut m4) = (0.0, 0.0, 0.0);
        for v in &finite {
            let d = v - mean;
            let d2 = d * d;
            m2 += d2;
            m3 += d2 * d;
            m4 += d2 * d2;
        }
        let variance = m2 / n;
        let std = variance.sqrt();
        let (skewness, kurtosis) = if variance > 0.0 {
            (m3 / n / (variance * std), m4 / n / (variance * variance))
        } else {
            (0.0, 0.0)
        };

        let min = finite.iter().copied().fold(f64::INFINITY, f64::min);
        let max = finite.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let peak = min.abs().max(max.abs());
        let crest_factor = if power > 0.0 { peak / power.sqrt() } else { 0.0 };

        finite.sort_by(f64::total_cmp);
        let median = median_of_sorted(&finite);

        let zero_crossings = zero_crossings(samples);
        let zero_crossing_rate = zero_crossing_rate(samples);

        Ok(Self {
            count: samples.len(),
            finite_count: finite.len(),
            mean,
            median,
            variance,
            std,
            mean_abs_deviation,
            power,
            min,
            max,
            peak_to_peak: max - min,
            crest_factor,
            skewness,
            kurtosis,
            zero_crossings,
            zero_crossing_rate,
        })
    }
}

fn median_of_sorted(sorted: &[f64]) -> f64 {
    let n = sorted.len();
    if n % 2 == 1 {
        sorted[n / 2]
    } else {
        (sorted[n / 2 - 1] + sorted[n / 2]) / 2.0
    }
}

/// Median of the finite values, `None` if there are none.
pub fn median(samples: &[f64]) -> Option<f64> {
    let mut finite: Vec<f64> = samples.iter().copied().filter(|v| v.is_finite()).collect();
    if finite.is_empty() {
        return None;
    }
    finite.sort_by(f64::total_cmp);
    Some(median_of_sorted(&finite))
}

/// Strict sign changes between consecutive finite samples. A sample that is
/// exactly zero never forms a crossing with either neighbour.
pub fn zero_crossings(samples: &[f64]) -> usize {
    samples
        .iter()
        .filter(|v| v.is_finite())
        .collect::<Vec<_>>()
        .windows(2)
        .filter(|w| (*w[0] < 0.0 && *w[1] > 0.0) || (*w[0] > 0.0 && *w[1] < 0.0))
        .count()
}

pub fn zero_crossing_rate(samples: &[f64]) -> f64 {
    let pairs = samples.iter().filter(|v| v.is_finite()).count().saturating_sub(1);
    if pairs == 0 {
        0.0
    } else {
        zero_crossings(samples) as f64 / pairs as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    #[test]
    fn test_constant_sequence() {
        let stats = SignalStatistics::compute(&[40.0, 40.0, 40.0, 40.0]).unwrap();
        assert_eq!(stats.mean, 40.0);
        assert_eq!(stats.median, 40.0);
        assert_eq!(stats.variance, 0.0);
        assert_eq!(stats.skewness, 0.0);
        assert_eq!(stats.peak_to_peak, 0.0);
        assert!((stats.crest_factor - 1.0).abs() < 1e-12);
        assert_eq!(stats.zero_crossings, 0);
    }

    #[test]
    fn test_known_moments() {
        let stats = SignalStatistics::compute(&[1.0, 2.0, 3.0, 4.0]).unwrap();
        assert_eq!(stats.mean, 2.5);
        assert_eq!(stats.median, 2.5);
        assert!((stats.variance - 1.25).abs() < 1e-12);
        assert_eq!(stats.mean_abs_deviation, 1.0);
        assert!((stats.power - 7.5).abs() < 1e-12);
        assert!(stats.skewness.abs() < 1e-12);
        // uniform 4-point kurtosis: (2*1.5^4 + 2*0.5^4)/4 / 1.25^2 = 1.64
        assert!((stats.kurtosis - 1.64).abs() < 1e-12);
    }

    #[test]
    fn test_non_finite_excluded_but_counted() {
        let stats = SignalStatistics::compute(&[1.0, f64::NAN, 3.0, f64::INFINITY]).unwrap();
        assert_eq!(stats.count, 4);
        assert_eq!(stats.finite_count, 2);
        assert_eq!(stats.mean, 2.0);
        assert_eq!(stats.max, 3.0);
    }

    #[test]
    fn test_empty_input() {
        assert!(matches!(SignalStatistics::compute(&[]), Err(PnmError::EmptyInput)));
        assert!(matches!(SignalStatistics::compute(&[f64::NAN]), Err(PnmError::EmptyInput)));
        assert_eq!(zero_crossings(&[]), 0);
        assert_eq!(zero_crossing_rate(&[]), 0.0);
    }

    #[test]
    fn test_zero_is_not_a_crossing() {
        assert_eq!(zero_crossings(&[1.0, -1.0, 1.0]), 2);
        assert_eq!(zero_crossings(&[1.0, 0.0, -1.0]), 0);
        assert_eq!(zero_crossings(&[-1.0, 0.0, 0.0, 1.0]), 0);
        assert_eq!(zero_crossing_rate(&[1.0, -1.0, 1.0]), 1.0);
    }

    #[test]
    fn test_skewed_distribution() {
        let stats = SignalStatistics::compute(&[0.0, 0.0, 0.0, 0.0, 10.0]).unwrap();
        assert!(stats.skewness > 1.0);
        assert_eq!(stats.median, 0.0);
    }

    #[test]
    fn test_gaussian_noise_moments() {
        let mut rng = StdRng::seed_from_u64(7);
        // Sum of 12 uniforms approximates a unit normal
        let samples: Vec<f64> = (0..20_000)
            .map(|_| (0..12).map(|_| rng.gen::<f64>()).sum::<f64>() - 6.0)
            .collect();
        let stats = SignalStatistics::compute(&samples).unwrap();
        assert!(stats.mean.abs() < 0.05);
        assert!((stats.variance - 1.0).abs() < 0.05);
        assert!(stats.skewness.abs() < 0.1);
        assert!((stats.kurtosis - 3.0).abs() < 0.2);
        assert!((stats.zero_crossing_rate - 0.5).abs() < 0.05);
    }
}
