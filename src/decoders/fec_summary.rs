// Downstream OFDM FEC summary (PNN8): per-profile codeword counter series

use crate::core::constants::*;
use crate::core::cursor::ByteCursor;
use crate::core::error::{PnmError, Result};
use crate::core::format::{CodewordSample, FecProfileSeries, FecSummaryPayload, FecSummaryType, MacAddress};
use crate::core::header::CaptureHeader;

pub fn decode(header: CaptureHeader, body: &[u8]) -> Result<FecSummaryPayload> {
    let mut cursor = ByteCursor::new(body);
    let channel_id = cursor.read_u8("channel_id")?;
    let cm_mac = cursor.read_array("cm_mac")?;
    let type_code = cursor.read_u8("summary_type")?;
    let summary_type = FecSummaryType::from_u8(type_code).ok_or(PnmError::UnsupportedValue {
        field: "summary_type",
        value: u32::from(type_code),
    })?;
    let num_profiles = cursor.read_u8("num_profiles")?;

    let bound = summary_type.max_records();
    let mut profiles = Vec::with_capacity(num_profiles as usize);
    for _ in 0..num_profiles {
        let profile_id = cursor.read_u8("profile_id")?;
        let declared = cursor.read_u16("record_count")? as usize;
        if declared > bound {
            return Err(PnmError::SeriesOverflow {
                profile_id,
                declared,
                bound,
            });
        }

        let mut records = cursor.sub_cursor(declared * FEC_RECORD_SIZE, "fec records")?;
        let mut samples = Vec::with_capacity(declared);
        for _ in 0..declared {
            samples.push(CodewordSample {
                timestamp: records.read_u32("timestamp")?,
                total: records.read_u32("total_codewords")?,
                corrected: records.read_u32("corrected_codewords")?,
                uncorrectable: records.read_u32("uncorrectable_codewords")?,
            });
        }
        profiles.push(FecProfileSeries { profile_id, samples });
    }

    Ok(FecSummaryPayload {
        header,
        channel_id,
        cm_mac: MacAddress(cm_mac),
        summary_type,
        profiles,
    })
}
