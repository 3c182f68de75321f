// Downstream OFDM modulation profile (PNN10): run-length scheme lists per profile

use crate::core::constants::*;
use crate::core::cursor::ByteCursor;
use crate::core::error::{PnmError, Result};
use crate::core::format::{MacAddress, ModulationOrder, ModulationProfilePayload, ProfileSchemes, SchemeRun};
use crate::core::grid::OfdmPreamble;
use crate::core::header::CaptureHeader;
use tracing::debug;

pub fn decode(header: CaptureHeader, body: &[u8]) -> Result<ModulationProfilePayload> {
    let mut cursor = ByteCursor::new(body);
    let preamble = OfdmPreamble::read(&mut cursor)?;
    let active_count = preamble.declared_span()? as usize;
    let grid = preamble.grid(active_count)?;

    let num_profiles = cursor.read_u8("num_profiles")?;
    let mut profiles = Vec::with_capacity(num_profiles as usize);

    for _ in 0..num_profiles {
        let profile_id = cursor.read_u8("profile_id")?;
        let scheme_length = cursor.read_u16("scheme_length")? as usize;
        if scheme_length % SCHEME_ENTRY_SIZE != 0 {
            return Err(PnmError::MisalignedLength {
                field: "scheme_length",
                length: scheme_length,
                width: SCHEME_ENTRY_SIZE,
            });
        }

        let mut block = cursor.sub_cursor(scheme_length, "profile schemes")?;
        let mut runs = Vec::with_capacity(scheme_length / SCHEME_ENTRY_SIZE);
        while !block.is_empty() {
            runs.push(SchemeRun {
                scheme_type: block.read_u8("scheme_type")?,
                modulation: ModulationOrder::from_code(block.read_u8("modulation_order")?),
                subcarrier_count: block.read_u16("subcarrier_count")?,
            });
        }

        let profile = ProfileSchemes { profile_id, runs };
        let total = profile.total_subcarriers();
        if total != active_count {
            return Err(PnmError::RunLengthMismatch {
                profile_id,
                expected: active_count,
                actual: total,
            });
        }
        debug!("profile {}: {} runs over {} subcarriers", profile_id, profile.runs.len(), total);
        profiles.push(profile);
    }

    Ok(ModulationProfilePayload {
        header,
        channel_id: preamble.channel_id,
        cm_mac: MacAddress(preamble.cm_mac),
        grid,
        profiles,
    })
}
