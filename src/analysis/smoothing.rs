// Masked moving average: L = M/2 samples left, R = M - 1 - L right

use crate::core::error::{PnmError, Result};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EdgeMode {
    /// Mirror the input about its end samples (`d c b | a b c d`)
    #[default]
    Reflect,
    /// Truncate the window at the edges
    Same,
}

/// Mirror an out-of-range index back into `0..n`.
fn reflect_index(i: isize, n: usize) -> usize {
    if n == 1 {
        return 0;
    }
    let period = 2 * (n as isize - 1);
    let m = i.rem_euclid(period);
    if m >= n as isize {
        (period - m) as usize
    } else {
        m as usize
    }
}

/// Prefix sums of the masked values and of the mask itself.
fn prefix_sums<I: Iterator<Item = f64>>(values: I) -> (Vec<f64>, Vec<usize>) {
    let mut sums = vec![0.0];
    let mut counts = vec![0];
    for v in values {
        let (s, c) = if v.is_finite() { (v, 1) } else { (0.0, 0) };
        sums.push(sums[sums.len() - 1] + s);
        counts.push(counts[counts.len() - 1] + c);
    }
    (sums, counts)
}

fn window_mean(sums: &[f64], counts: &[usize], lo: usize, hi: usize) -> f64 {
    let count = counts[hi] - counts[lo];
    if count == 0 {
        0.0
    } else {
        (sums[hi] - sums[lo]) / count as f64
    }
}

pub fn moving_average(samples: &[f64], n_points: usize, mode: EdgeMode) -> Result<Vec<f64>> {
    if n_points == 0 {
        return Err(PnmError::InvalidWindow(n_points));
    }
    let n = samples.len();
    if n == 0 {
        return Ok(Vec::new());
    }
    let left = n_points / 2;
    let right = n_points - 1 - left;

    let output = match mode {
        EdgeMode::Reflect => {
            let padded = (-(left as isize)..(n + right) as isize).map(|i| samples[reflect_index(i, n)]);
            let (sums, counts) = prefix_sums(padded);
            (0..n).map(|k| window_mean(&sums, &counts, k, k + n_points)).collect()
        }
        EdgeMode::Same => {
            let (sums, counts) = prefix_sums(samples.iter().copied());
            (0..n)
                .map(|k| window_mean(&sums, &counts, k.saturating_sub(left), (k + right + 1).min(n)))
                .collect()
        }
    };
    Ok(output)
}
