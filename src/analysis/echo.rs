//! Echo detection from a frequency-domain channel response.
//!
//! The per-subcarrier response is zero-padded to `n_fft`, inverse
//! transformed (scaled by `1/n_fft`), and the resulting impulse response is
//! searched for reflections trailing the direct path. Bin `n` sits at
//! `n / (n_fft * spacing_hz)` seconds. Distances are one-way:
//! `velocity_factor * c * delay / 2`.

use crate::analysis::aggregate::{coherent_mean, ComplexSnapshots};
use crate::core::complex::{ComplexSample, SampleExt};
use crate::core::constants::{FEET_PER_METER, SPEED_OF_LIGHT_M_S};
use crate::core::error::{PnmError, Result};
use crate::models::analysis_config::{EchoConfig, EchoMode};
use rustfft::{Fft, FftPlanner};
use serde::Serialize;
use std::sync::Arc;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct EchoPath {
    pub bin_index: usize,
    /// Absolute position on the impulse-response time axis
    pub time_s: f64,
    /// Delay relative to the direct path
    pub delay_s: f64,
    pub amplitude: f64,
    pub distance_m: f64,
    pub distance_ft: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EchoReport {
    pub direct_path: EchoPath,
    /// Accepted echoes, strongest first
    pub echoes: Vec<EchoPath>,
    pub n_fft: usize,
    pub time_resolution_s: f64,
    pub threshold: f64,
    pub velocity_factor: f64,
    pub propagation_speed_m_s: f64,
    pub impulse_magnitude: Vec<f64>,
}

struct TimeAxis {
    dt: f64,
    direct: usize,
    speed: f64,
}

impl TimeAxis {
    fn path(&self, bin: usize, amplitude: f64) -> EchoPath {
        let delay_s = (bin as f64 - self.direct as f64) * self.dt;
        let distance_m = self.speed * delay_s / 2.0;
        EchoPath {
            bin_index: bin,
            time_s: bin as f64 * self.dt,
            delay_s,
            amplitude,
            distance_m,
            distance_ft: distance_m * FEET_PER_METER,
        }
    }
}

/// Inverse FFT of the zero-padded response, scaled by `1/n_fft`.
/// Non-finite subcarriers contribute nothing.
pub fn impulse_response(samples: &[ComplexSample], n_fft: usize) -> Vec<ComplexSample> {
    let mut buffer: Vec<ComplexSample> = samples
        .iter()
        .map(|s| if s.is_finite() { *s } else { ComplexSample::new(0.0, 0.0) })
        .collect();
    buffer.resize(n_fft.max(samples.len()), ComplexSample::new(0.0, 0.0));
    if buffer.is_empty() {
        return buffer;
    }

    let n = buffer.len();
    let mut planner = FftPlanner::<f64>::new();
    let ifft: Arc<dyn Fft<f64>> = planner.plan_fft_inverse(n);
    ifft.process(&mut buffer);
    let scale = 1.0 / n as f64;
    for v in buffer.iter_mut() {
        *v *= scale;
    }
    buffer
}

pub fn detect_echoes(samples: &[ComplexSample], spacing_hz: f64, config: &EchoConfig) -> Result<EchoReport> {
    if samples.is_empty() {
        return Err(PnmError::NoDirectPath);
    }
    let vf = config.velocity_factor;
    if !(vf > 0.0 && vf <= 1.0) {
        return Err(PnmError::InvalidPropagationSpeed(vf));
    }
    if !(spacing_hz > 0.0 && spacing_hz.is_finite()) {
        return Err(PnmError::InvalidGrid(format!("subcarrier spacing {} Hz", spacing_hz)));
    }

    let n_fft = config.n_fft.unwrap_or(samples.len()).max(samples.len());
    let magnitude: Vec<f64> = impulse_response(samples, n_fft).iter().map(|h| h.magnitude()).collect();

    let (direct, peak) = magnitude
        .iter()
        .copied()
        .enumerate()
        .fold((0, f64::NEG_INFINITY), |best, (i, m)| if m > best.1 { (i, m) } else { best });
    if !(peak > 0.0) {
        return Err(PnmError::NoDirectPath);
    }

    let axis = TimeAxis {
        dt: 1.0 / (n_fft as f64 * spacing_hz),
        direct,
        speed: vf * SPEED_OF_LIGHT_M_S,
    };
    let threshold = config.threshold_frac * peak;

    let start = direct.saturating_add(config.guard_bins).saturating_add(1);
    let mut end = n_fft;
    if let Some(max_delay) = config.max_delay_s {
        let max_bins = (max_delay / axis.dt).floor().max(0.0) as usize;
        end = end.min(direct.saturating_add(max_bins).saturating_add(1));
    }
    debug!(
        "echo search over bins {}..{} of {}, direct path at {} ({:.4})",
        start, end, n_fft, direct, peak
    );

    let echoes = if start >= end {
        Vec::new()
    } else {
        match config.mode {
            EchoMode::FirstEcho => (start..end)
                .find(|&i| magnitude[i] >= threshold)
                .map(|i| vec![axis.path(i, magnitude[i])])
                .unwrap_or_default(),
            EchoMode::MultiEcho => {
                let mut candidates: Vec<usize> = (start..end)
                    .filter(|&i| magnitude[i] >= threshold && is_local_max(&magnitude, i))
                    .collect();
                // stable: equal magnitudes keep ascending bin order
                candidates.sort_by(|&a, &b| magnitude[b].total_cmp(&magnitude[a]));

                let mut accepted: Vec<EchoPath> = Vec::new();
                for i in candidates {
                    if accepted.len() >= config.max_peaks {
                        break;
                    }
                    let path = axis.path(i, magnitude[i]);
                    if accepted
                        .iter()
                        .all(|a| (a.time_s - path.time_s).abs() >= config.min_separation_s)
                    {
                        accepted.push(path);
                    }
                }
                accepted
            }
        }
    };

    Ok(EchoReport {
        direct_path: axis.path(direct, peak),
        echoes,
        n_fft,
        time_resolution_s: axis.dt,
        threshold,
        velocity_factor: vf,
        propagation_speed_m_s: axis.speed,
        impulse_magnitude: magnitude,
    })
}

/// Coherently average the snapshots, then detect on the mean response.
pub fn detect_echoes_snapshots(snapshots: &ComplexSnapshots, config: &EchoConfig) -> Result<EchoReport> {
    let spacing = f64::from(snapshots.grid().spacing_hz);
    detect_echoes(&coherent_mean(snapshots), spacing, config)
}

// Leftmost sample of a plateau counts as the peak. The array ends never do:
// the last bin wraps around onto the direct path.
fn is_local_max(magnitude: &[f64], i: usize) -> bool {
    if i == 0 || i + 1 >= magnitude.len() {
        return false;
    }
    magnitude[i] > magnitude[i - 1] && magnitude[i] >= magnitude[i + 1]
}
