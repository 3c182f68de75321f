// Upstream pre-equalizer coefficients (PNN6, and PNN7 for the last update)

use crate::core::complex::ComplexCodec;
use crate::core::constants::*;
use crate::core::cursor::ByteCursor;
use crate::core::error::Result;
use crate::core::format::{MacAddress, PreEqualizationPayload};
use crate::core::grid::{index_field, OfdmPreamble};
use crate::core::header::CaptureHeader;

pub fn decode(header: CaptureHeader, body: &[u8]) -> Result<PreEqualizationPayload> {
    decode_with(header, body, ComplexCodec::new(DEFAULT_FRACTIONAL_BITS))
}

pub fn decode_with(header: CaptureHeader, body: &[u8], codec: ComplexCodec) -> Result<PreEqualizationPayload> {
    let mut cursor = ByteCursor::new(body);
    let cm_mac = cursor.read_array("cm_mac")?;
    let cmts_mac = cursor.read_array("cmts_mac")?;

    // Same grid fields as the downstream preamble, without the channel id.
    let preamble = OfdmPreamble {
        channel_id: 0,
        cm_mac,
        zero_frequency_hz: cursor.read_u32("zero_frequency")?,
        first_active_index: index_field(cursor.read_u16("first_active_index")?),
        last_active_index: index_field(cursor.read_u16("last_active_index")?),
        spacing_khz: cursor.read_u8("subcarrier_spacing")?,
    };

    let data_length = cursor.read_length("coefficient data_length", COMPLEX_SAMPLE_SIZE)?;
    let grid = preamble.grid(data_length / COMPLEX_SAMPLE_SIZE)?;
    let coefficients = codec.decode_all(cursor.read_bytes(data_length, "coefficients")?)?;

    Ok(PreEqualizationPayload {
        header,
        cm_mac: MacAddress(cm_mac),
        cmts_mac: MacAddress(cmts_mac),
        grid,
        coefficients,
        last_update: header.file_type == FileType::UpstreamPreEqualizationLastUpdate,
    })
}
