// Multi-snapshot aggregation over a shared subcarrier grid

use crate::analysis::statistics::median;
use crate::core::complex::{ComplexSample, SampleExt};
use crate::core::error::{PnmError, Result};
use crate::core::format::FormatPayload;
use crate::core::grid::SubcarrierGrid;
use serde::Serialize;
use tracing::warn;

#[derive(Debug, Clone, PartialEq)]
pub struct SnapshotMatrix<T> {
    grid: SubcarrierGrid,
    rows: usize,
    cols: usize,
    data: Vec<T>,
    skipped: usize,
}

pub type RealSnapshots = SnapshotMatrix<f64>;
pub type ComplexSnapshots = SnapshotMatrix<ComplexSample>;

impl<T: Copy> SnapshotMatrix<T> {
    /// Stack `(grid, row)` pairs in order. A grid differing from the first
    /// row's is a hard error.
    pub fn from_snapshots<I>(snapshots: I) -> Result<Self>
    where
        I: IntoIterator<Item = (SubcarrierGrid, Vec<T>)>,
    {
        let mut grid: Option<SubcarrierGrid> = None;
        let mut data = Vec::new();
        let mut rows = 0;
        for (row, (row_grid, values)) in snapshots.into_iter().enumerate() {
            let reference = *grid.get_or_insert(row_grid);
            if row_grid != reference {
                return Err(PnmError::GridMismatch { row });
            }
            if values.len() != reference.len() {
                return Err(PnmError::LengthMismatch {
                    left: values.len(),
                    right: reference.len(),
                });
            }
            data.extend(values);
            rows += 1;
        }
        let grid = grid.ok_or(PnmError::EmptyInput)?;
        Ok(Self {
            grid,
            rows,
            cols: grid.len(),
            data,
            skipped: 0,
        })
    }

    pub fn grid(&self) -> &SubcarrierGrid {
        &self.grid
    }

    pub fn n_rows(&self) -> usize {
        self.rows
    }

    pub fn n_cols(&self) -> usize {
        self.cols
    }

    pub fn skipped(&self) -> usize {
        self.skipped
    }

    pub fn row(&self, index: usize) -> &[T] {
        &self.data[index * self.cols..(index + 1) * self.cols]
    }

    pub fn iter_rows(&self) -> impl Iterator<Item = &[T]> {
        (0..self.rows).map(move |r| self.row(r))
    }

    pub fn column(&self, index: usize) -> impl Iterator<Item = T> + '_ {
        (0..self.rows).map(move |r| self.data[r * self.cols + index])
    }

    pub fn map<U, F: Fn(T) -> U>(&self, f: F) -> SnapshotMatrix<U> {
        SnapshotMatrix {
            grid: self.grid,
            rows: self.rows,
            cols: self.cols,
            data: self.data.iter().map(|v| f(*v)).collect(),
            skipped: self.skipped,
        }
    }

    fn from_decoded<I, F>(results: I, extract: F) -> Result<Self>
    where
        I: IntoIterator<Item = Result<FormatPayload>>,
        F: Fn(&FormatPayload) -> Option<(SubcarrierGrid, Vec<T>)>,
    {
        let mut skipped = 0;
        let mut snapshots = Vec::new();
        for (i, result) in results.into_iter().enumerate() {
            match result.as_ref().map(&extract) {
                Ok(Some(snapshot)) => snapshots.push(snapshot),
                Ok(None) => {
                    warn!("snapshot {} skipped: unexpected capture type", i);
                    skipped += 1;
                }
                Err(e) => {
                    warn!("snapshot {} skipped: {}", i, e);
                    skipped += 1;
                }
            }
        }
        let mut matrix = Self::from_snapshots(snapshots)?;
        matrix.skipped = skipped;
        Ok(matrix)
    }
}

impl RealSnapshots {
    /// RxMER values from per-capture decode results; failed decodes are skipped.
    pub fn from_rxmer<I>(results: I) -> Result<Self>
    where
        I: IntoIterator<Item = Result<FormatPayload>>,
    {
        Self::from_decoded(results, |payload| match payload {
            FormatPayload::RxMer(p) => Some((p.grid, p.values.clone())),
            _ => None,
        })
    }
}

impl ComplexSnapshots {
    pub fn from_coefficients<I>(results: I) -> Result<Self>
    where
        I: IntoIterator<Item = Result<FormatPayload>>,
    {
        Self::from_decoded(results, |payload| {
            let grid = payload.grid()?;
            payload.complex_samples().map(|c| (*grid, c.to_vec()))
        })
    }
}

/// Column-wise reductions. `count[n]` is how many snapshots had a finite
/// value at subcarrier `n`; columns with none report NaN.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnSummary {
    pub min: Vec<f64>,
    pub mean: Vec<f64>,
    pub max: Vec<f64>,
    pub median: Vec<f64>,
    pub variance: Vec<f64>,
    pub std: Vec<f64>,
    pub range: Vec<f64>,
    pub count: Vec<usize>,
    pub snapshots: usize,
    pub skipped: usize,
}

pub fn summarize(matrix: &RealSnapshots) -> ColumnSummary {
    let n = matrix.n_cols();
    let mut summary = ColumnSummary {
        min: Vec::with_capacity(n),
        mean: Vec::with_capacity(n),
        max: Vec::with_capacity(n),
        median: Vec::with_capacity(n),
        variance: Vec::with_capacity(n),
        std: Vec::with_capacity(n),
        range: Vec::with_capacity(n),
        count: Vec::with_capacity(n),
        snapshots: matrix.n_rows(),
        skipped: matrix.skipped(),
    };

    for col in 0..n {
        let values: Vec<f64> = matrix.column(col).filter(|v| v.is_finite()).collect();
        summary.count.push(values.len());
        if values.is_empty() {
            for series in [
                &mut summary.min,
                &mut summary.mean,
                &mut summary.max,
                &mut summary.median,
                &mut summary.variance,
                &mut summary.std,
                &mut summary.range,
            ] {
                series.push(f64::NAN);
            }
            continue;
        }
        let k = values.len() as f64;
        let min = values.iter().copied().fold(f64::INFINITY, f64::min);
        let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let mean = values.iter().sum::<f64>() / k;
        let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / k;
        summary.min.push(min);
        summary.mean.push(mean);
        summary.max.push(max);
        summary.median.push(median(&values).unwrap_or(f64::NAN));
        summary.variance.push(variance);
        summary.std.push(variance.sqrt());
        summary.range.push(max - min);
    }
    summary
}

/// Average complex values per subcarrier, preserving phase.
pub fn coherent_mean(matrix: &ComplexSnapshots) -> Vec<ComplexSample> {
    let m = matrix.n_rows() as f64;
    (0..matrix.n_cols())
        .map(|col| matrix.column(col).sum::<ComplexSample>() / m)
        .collect()
}

pub fn coherent_magnitude(matrix: &ComplexSnapshots) -> Vec<f64> {
    coherent_mean(matrix).iter().map(|c| c.magnitude()).collect()
}

/// `mean(|H|)` per subcarrier. Differs from `coherent_magnitude` whenever
/// phase varies between snapshots.
pub fn mean_magnitude(matrix: &ComplexSnapshots) -> Vec<f64> {
    let m = matrix.n_rows() as f64;
    (0..matrix.n_cols())
        .map(|col| matrix.column(col).map(|c| c.magnitude()).sum::<f64>() / m)
        .collect()
}

/// Derive a scalar series from every snapshot independently, then take the
/// per-subcarrier median. Snapshots whose derivation fails are skipped.
pub fn per_snapshot_median<T, F>(matrix: &SnapshotMatrix<T>, derive: F) -> Result<Vec<f64>>
where
    T: Copy,
    F: Fn(&[T]) -> Result<Vec<f64>>,
{
    let mut derived = Vec::with_capacity(matrix.n_rows());
    for (i, row) in matrix.iter_rows().enumerate() {
        match derive(row) {
            Ok(series) => derived.push((*matrix.grid(), series)),
            Err(e) => warn!("snapshot {} excluded from median: {}", i, e),
        }
    }
    let stacked = RealSnapshots::from_snapshots(derived)?;
    Ok(summarize(&stacked).median)
}
