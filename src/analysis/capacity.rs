// MER to bit-loading capacity

use crate::core::error::{PnmError, Result};
use crate::core::format::ModulationOrder;
use crate::models::analysis_config::CapacityConfig;
use serde::Serialize;

/// `floor(log2(1 + 10^(mer/10)))`; `None` for a non-finite MER.
pub fn shannon_bits(mer_db: f64) -> Option<u8> {
    if !mer_db.is_finite() {
        return None;
    }
    let snr = 10f64.powf(mer_db / 10.0);
    Some((1.0 + snr).log2().floor().clamp(0.0, f64::from(u8::MAX)) as u8)
}

/// Required MER for a modulation order; `None` for excluded carriers and
/// orders missing from the table.
pub fn required_mer(order: ModulationOrder, config: &CapacityConfig) -> Option<f64> {
    match order {
        ModulationOrder::Qam { bits } => config.required_mer_db.get(&bits).copied(),
        _ => None,
    }
}

/// Mean required MER over the data-carrying subcarriers of a profile.
pub fn required_average_mer(modulations: &[ModulationOrder], config: &CapacityConfig) -> Option<f64> {
    let required: Vec<f64> = modulations.iter().filter_map(|m| required_mer(*m, config)).collect();
    if required.is_empty() {
        None
    } else {
        Some(required.iter().sum::<f64>() / required.len() as f64)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CapacityMargin {
    pub required_average_mer_db: Option<f64>,
    /// Per subcarrier `profile_bits - shannon_bits(mer)`. Negative means the
    /// profile loads fewer bits than the measured MER supports. `None` where
    /// the carrier is excluded or the MER is not finite.
    pub capacity_delta: Vec<Option<i16>>,
    /// Data carriers with `mer < required - threshold_offset_db`
    pub below_threshold_count: usize,
    /// Data carriers with both a required and a measured MER
    pub compared_count: usize,
}

pub fn capacity_margin(
    modulations: &[ModulationOrder],
    mer_db: &[f64],
    config: &CapacityConfig,
) -> Result<CapacityMargin> {
    if modulations.len() != mer_db.len() {
        return Err(PnmError::LengthMismatch {
            left: modulations.len(),
            right: mer_db.len(),
        });
    }

    let mut capacity_delta = Vec::with_capacity(modulations.len());
    let mut below_threshold_count = 0;
    let mut compared_count = 0;
    for (order, &mer) in modulations.iter().zip(mer_db) {
        let delta = match (order, shannon_bits(mer)) {
            (ModulationOrder::Qam { bits }, Some(supported)) => Some(i16::from(*bits) - i16::from(supported)),
            _ => None,
        };
        capacity_delta.push(delta);

        if let (Some(required), true) = (required_mer(*order, config), mer.is_finite()) {
            compared_count += 1;
            if mer < required - config.threshold_offset_db {
                below_threshold_count += 1;
            }
        }
    }

    Ok(CapacityMargin {
        required_average_mer_db: required_average_mer(modulations, config),
        capacity_delta,
        below_threshold_count,
        compared_count,
    })
}
