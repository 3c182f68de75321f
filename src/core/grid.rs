// Subcarrier frequency grid shared by OFDM/OFDMA captures

use crate::core::constants::*;
use crate::core::cursor::ByteCursor;
use crate::core::error::{PnmError, Result};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SubcarrierGrid {
    #[serde(rename = "subcarrier_zero_frequency")]
    pub zero_frequency_hz: u64,
    /// Absolute index of the first active subcarrier, -1 when not present.
    #[serde(rename = "first_active_subcarrier_index")]
    pub first_active_index: i32,
    #[serde(rename = "subcarrier_spacing")]
    pub spacing_hz: u32,
    pub active_count: u32,
}

impl SubcarrierGrid {
    pub fn new(
        zero_frequency_hz: u64,
        first_active_index: i32,
        spacing_hz: u32,
        active_count: u32,
    ) -> Result<Self> {
        if spacing_hz == 0 {
            return Err(PnmError::InconsistentGrid("subcarrier spacing is zero".into()));
        }
        if first_active_index < -1 {
            return Err(PnmError::InconsistentGrid(format!(
                "first active index {} below -1",
                first_active_index
            )));
        }
        if first_active_index == -1 && active_count > 0 {
            return Err(PnmError::InconsistentGrid(format!(
                "{} active subcarriers without a first active index",
                active_count
            )));
        }
        Ok(Self {
            zero_frequency_hz,
            first_active_index,
            spacing_hz,
            active_count,
        })
    }

    pub fn len(&self) -> usize {
        self.active_count as usize
    }

    pub fn is_empty(&self) -> bool {
        self.active_count == 0
    }

    pub fn last_active_index(&self) -> Option<i32> {
        if self.is_empty() {
            None
        } else {
            Some(self.first_active_index + self.active_count as i32 - 1)
        }
    }

    /// Frequency of absolute subcarrier index `k`.
    pub fn subcarrier_frequency(&self, k: i64) -> f64 {
        self.zero_frequency_hz as f64 + k as f64 * f64::from(self.spacing_hz)
    }

    /// Frequencies of the active subcarriers in index order.
    pub fn frequencies(&self) -> Vec<f64> {
        let first = i64::from(self.first_active_index.max(0));
        (0..i64::from(self.active_count))
            .map(|k| self.subcarrier_frequency(first + k))
            .collect()
    }
}

/// Fields of the 16-byte OFDM preamble that precede per-subcarrier data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OfdmPreamble {
    pub channel_id: u8,
    pub cm_mac: [u8; 6],
    pub zero_frequency_hz: u32,
    pub first_active_index: i32,
    pub last_active_index: i32,
    pub spacing_khz: u8,
}

/// Map a raw 16-bit index field to -1 when it carries the not-present marker.
pub fn index_field(raw: u16) -> i32 {
    if raw == INDEX_NOT_PRESENT {
        -1
    } else {
        i32::from(raw)
    }
}

impl OfdmPreamble {
    pub fn read(cursor: &mut ByteCursor<'_>) -> Result<Self> {
        Ok(Self {
            channel_id: cursor.read_u8("channel_id")?,
            cm_mac: cursor.read_array("cm_mac")?,
            zero_frequency_hz: cursor.read_u32("zero_frequency")?,
            first_active_index: index_field(cursor.read_u16("first_active_index")?),
            last_active_index: index_field(cursor.read_u16("last_active_index")?),
            spacing_khz: cursor.read_u8("subcarrier_spacing")?,
        })
    }

    /// Number of subcarriers spanned by the declared first/last indices.
    pub fn declared_span(&self) -> Result<u32> {
        match (self.first_active_index, self.last_active_index) {
            (-1, _) | (_, -1) => Ok(0),
            (first, last) if last >= first => Ok((last - first + 1) as u32),
            (first, last) => Err(PnmError::InconsistentGrid(format!(
                "last active index {} precedes first {}",
                last, first
            ))),
        }
    }

    /// Build the grid for `active_count` decoded subcarriers, checking it
    /// against the declared first/last span.
    pub fn grid(&self, active_count: usize) -> Result<SubcarrierGrid> {
        if active_count > 0 {
            let span = self.declared_span()?;
            if span as usize != active_count {
                return Err(PnmError::InconsistentGrid(format!(
                    "{} subcarriers declared by data length, first/last span is {}",
                    active_count, span
                )));
            }
        }
        let first = if active_count == 0 && self.declared_span()? == 0 {
            -1
        } else {
            self.first_active_index
        };
        SubcarrierGrid::new(
            u64::from(self.zero_frequency_hz),
            first,
            u32::from(self.spacing_khz) * 1000,
            active_count as u32,
        )
    }
}
