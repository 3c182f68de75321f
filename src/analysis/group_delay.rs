//! Group delay from complex per-subcarrier response.
//!
//! `tau = -d(phi)/d(omega)`, estimated from the unwrapped phase with a
//! forward difference at the first subcarrier, central differences inside
//! and a backward difference at the last. Output is in seconds.

use crate::analysis::aggregate::{coherent_mean, per_snapshot_median, ComplexSnapshots};
use crate::core::complex::{ComplexSample, SampleExt};
use crate::core::error::{PnmError, Result};
use crate::models::analysis_config::GroupDelayMode;
use std::f64::consts::PI;

/// Remove 2*pi discontinuities in index order.
///
/// Any step larger than pi in magnitude is folded back into (-pi, pi].
/// Non-finite samples stay non-finite and do not disturb the running
/// correction for the samples after them.
pub fn unwrap_phase(phase: &[f64]) -> Vec<f64> {
    let mut output = Vec::with_capacity(phase.len());
    let mut correction = 0.0;
    let mut prev: Option<f64> = None;

    for &x in phase {
        if !x.is_finite() {
            output.push(x);
            continue;
        }
        if let Some(p) = prev {
            let diff = x - p;
            if diff.abs() > PI {
                let mut folded = (diff + PI).rem_euclid(2.0 * PI) - PI;
                if folded == -PI && diff > 0.0 {
                    folded = PI;
                }
                correction += folded - diff;
            }
        }
        prev = Some(x);
        output.push(x + correction);
    }
    output
}

fn check_grid(frequencies: &[f64]) -> Result<()> {
    if frequencies.len() < 2 {
        return Err(PnmError::InvalidGrid(format!(
            "{} frequency points, need at least 2",
            frequencies.len()
        )));
    }
    let increasing = frequencies[1] > frequencies[0];
    for (i, w) in frequencies.windows(2).enumerate() {
        let step_ok = if increasing { w[1] > w[0] } else { w[1] < w[0] };
        if !step_ok {
            return Err(PnmError::InvalidGrid(format!(
                "frequency {} Hz at index {} breaks strict monotonicity after {} Hz",
                w[1],
                i + 1,
                w[0]
            )));
        }
    }
    Ok(())
}

/// Group delay in seconds from an already unwrapped phase series.
pub fn group_delay_from_phase(phase: &[f64], frequencies: &[f64]) -> Result<Vec<f64>> {
    if phase.len() != frequencies.len() {
        return Err(PnmError::LengthMismatch {
            left: phase.len(),
            right: frequencies.len(),
        });
    }
    check_grid(frequencies)?;

    let n = phase.len();
    let delay = |lo: usize, hi: usize| -(phase[hi] - phase[lo]) / (2.0 * PI * (frequencies[hi] - frequencies[lo]));
    Ok((0..n)
        .map(|k| match k {
            0 => delay(0, 1),
            k if k == n - 1 => delay(n - 2, n - 1),
            k => delay(k - 1, k + 1),
        })
        .collect())
}

pub fn group_delay(samples: &[ComplexSample], frequencies: &[f64]) -> Result<Vec<f64>> {
    if samples.len() != frequencies.len() {
        return Err(PnmError::LengthMismatch {
            left: samples.len(),
            right: frequencies.len(),
        });
    }
    let phase: Vec<f64> = samples.iter().map(|s| s.phase()).collect();
    group_delay_from_phase(&unwrap_phase(&phase), frequencies)
}

/// Group delay over several snapshots of the same grid.
pub fn group_delay_snapshots(snapshots: &ComplexSnapshots, mode: GroupDelayMode) -> Result<Vec<f64>> {
    let frequencies = snapshots.grid().frequencies();
    match mode {
        GroupDelayMode::Full => group_delay(&coherent_mean(snapshots), &frequencies),
        GroupDelayMode::PerSnapshot => per_snapshot_median(snapshots, |row| group_delay(row, &frequencies)),
    }
}

pub fn to_microseconds(delay_s: &[f64]) -> Vec<f64> {
    delay_s.iter().map(|t| t * 1e6).collect()
}
