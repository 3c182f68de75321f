//! Butterworth low-pass as a cascade of second-order sections.
//!
//! Analog prototype poles are scaled to the prewarped cutoff and mapped
//! through the bilinear transform with the sample rate normalized to 2
//! (Nyquist = 1). Sections run in Direct Form II Transposed.

use crate::core::complex::ComplexSample;
use crate::core::error::{PnmError, Result};
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

pub const MAX_ORDER: usize = 20;

// bilinear constant 2*fs with fs = 2
const K: f64 = 4.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterMode {
    /// Forward then backward; no phase shift, squared magnitude response
    #[default]
    ZeroPhase,
    Causal,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Biquad {
    /// [b0, b1, b2]
    pub b: [f64; 3],
    /// [a1, a2], a0 normalized to 1
    pub a: [f64; 2],
}

impl Biquad {
    fn step(&self, x: f64, state: &mut [f64; 2]) -> f64 {
        let y = self.b[0] * x + state[0];
        state[0] = self.b[1] * x - self.a[0] * y + state[1];
        state[1] = self.b[2] * x - self.a[1] * y;
        y
    }

    pub fn dc_gain(&self) -> f64 {
        (self.b[0] + self.b[1] + self.b[2]) / (1.0 + self.a[0] + self.a[1])
    }

    /// State that holds the output steady for a constant input `x`.
    fn steady_state(&self, x: f64) -> [f64; 2] {
        let y = self.dc_gain() * x;
        let s0 = y - self.b[0] * x;
        let s1 = s0 - self.b[1] * x + self.a[0] * y;
        [s0, s1]
    }

    fn response(&self, z_inv: ComplexSample) -> ComplexSample {
        let num = self.b[0] + z_inv * (self.b[1] + z_inv * self.b[2]);
        let den = 1.0 + z_inv * (self.a[0] + z_inv * self.a[1]);
        num / den
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Butterworth {
    order: usize,
    cutoff: f64,
    sections: Vec<Biquad>,
}

impl Butterworth {
    /// `cutoff` is normalized to Nyquist and must lie strictly in (0, 1).
    pub fn lowpass(order: usize, cutoff: f64) -> Result<Self> {
        if !(cutoff > 0.0 && cutoff < 1.0) {
            return Err(PnmError::InvalidCutoff(cutoff));
        }
        if order == 0 || order > MAX_ORDER {
            return Err(PnmError::InvalidOrder(order));
        }

        let wc = K * (PI * cutoff / 2.0).tan();
        let mut sections = Vec::with_capacity(order.div_ceil(2));
        for k in 0..order / 2 {
            let theta = PI * (2 * k + order + 1) as f64 / (2 * order) as f64;
            let p = ComplexSample::from_polar(wc, theta);
            sections.push(bilinear_pair(p));
        }
        if order % 2 == 1 {
            sections.push(bilinear_real(-wc));
        }

        Ok(Self {
            order,
            cutoff,
            sections,
        })
    }

    pub fn from_frequency(order: usize, cutoff_hz: f64, sample_rate_hz: f64) -> Result<Self> {
        Self::lowpass(order, cutoff_hz / (sample_rate_hz / 2.0))
    }

    pub fn order(&self) -> usize {
        self.order
    }

    pub fn cutoff(&self) -> f64 {
        self.cutoff
    }

    pub fn sections(&self) -> &[Biquad] {
        &self.sections
    }

    /// Single-pass magnitude response at normalized frequency `w` (Nyquist = 1).
    pub fn magnitude_response(&self, w: f64) -> f64 {
        let z_inv = ComplexSample::from_polar(1.0, -PI * w);
        self.sections
            .iter()
            .fold(ComplexSample::new(1.0, 0.0), |h, s| h * s.response(z_inv))
            .norm()
    }

    pub fn filter(&self, samples: &[f64], mode: FilterMode) -> Vec<f64> {
        match mode {
            FilterMode::Causal => self.run(samples, false),
            FilterMode::ZeroPhase => self.filtfilt(samples),
        }
    }

    pub fn filter_complex(&self, samples: &[ComplexSample], mode: FilterMode) -> Vec<ComplexSample> {
        let re: Vec<f64> = samples.iter().map(|s| s.re).collect();
        let im: Vec<f64> = samples.iter().map(|s| s.im).collect();
        self.filter(&re, mode)
            .into_iter()
            .zip(self.filter(&im, mode))
            .map(|(re, im)| ComplexSample::new(re, im))
            .collect()
    }

    fn run(&self, samples: &[f64], steady: bool) -> Vec<f64> {
        let mut out = samples.to_vec();
        let Some(&first) = samples.first() else {
            return out;
        };
        let mut level = first;
        for section in &self.sections {
            let mut state = if steady { section.steady_state(level) } else { [0.0; 2] };
            level *= section.dc_gain();
            for v in out.iter_mut() {
                *v = section.step(*v, &mut state);
            }
        }
        out
    }

    fn filtfilt(&self, samples: &[f64]) -> Vec<f64> {
        let n = samples.len();
        if n == 0 {
            return Vec::new();
        }
        let pad = (3 * (2 * self.sections.len() + 1)).min(n - 1);

        // odd extension about both end samples
        let mut extended = Vec::with_capacity(n + 2 * pad);
        extended.extend((1..=pad).rev().map(|i| 2.0 * samples[0] - samples[i]));
        extended.extend_from_slice(samples);
        extended.extend((1..=pad).map(|i| 2.0 * samples[n - 1] - samples[n - 1 - i]));

        let mut forward = self.run(&extended, true);
        forward.reverse();
        let mut backward = self.run(&forward, true);
        backward.reverse();
        backward[pad..pad + n].to_vec()
    }
}

/// Real pole `p` of `H(s) = -p / (s - p)`.
fn bilinear_real(p: f64) -> Biquad {
    let alpha = K - p;
    let beta = K + p;
    Biquad {
        b: [-p / alpha, -p / alpha, 0.0],
        a: [-beta / alpha, 0.0],
    }
}

/// Conjugate pole pair of `H(s) = |p|^2 / (s^2 - 2 Re(p) s + |p|^2)`.
fn bilinear_pair(p: ComplexSample) -> Biquad {
    let mag_sq = p.norm_sqr();
    let k2 = K * K;
    let d = k2 - 2.0 * K * p.re + mag_sq;
    Biquad {
        b: [mag_sq / d, 2.0 * mag_sq / d, mag_sq / d],
        a: [2.0 * (mag_sq - k2) / d, (k2 + 2.0 * K * p.re + mag_sq) / d],
    }
}
