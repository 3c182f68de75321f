// Downstream constellation display soft decisions (PNN3)

use crate::core::complex::ComplexCodec;
use crate::core::constants::*;
use crate::core::cursor::ByteCursor;
use crate::core::error::{PnmError, Result};
use crate::core::format::{ConstellationPayload, MacAddress};
use crate::core::header::CaptureHeader;

pub fn decode(header: CaptureHeader, body: &[u8]) -> Result<ConstellationPayload> {
    decode_with(header, body, ComplexCodec::new(DEFAULT_FRACTIONAL_BITS))
}

pub fn decode_with(header: CaptureHeader, body: &[u8], codec: ComplexCodec) -> Result<ConstellationPayload> {
    let mut cursor = ByteCursor::new(body);
    let channel_id = cursor.read_u8("channel_id")?;
    let cm_mac = cursor.read_array("cm_mac")?;
    let modulation_order = cursor.read_u8("modulation_order")?;
    let num_sample_symbols = cursor.read_u16("num_sample_symbols")?;
    let data_length = cursor.read_length("sample data_length", COMPLEX_SAMPLE_SIZE)?;

    if data_length / COMPLEX_SAMPLE_SIZE != num_sample_symbols as usize {
        return Err(PnmError::InconsistentGrid(format!(
            "{} sample symbols declared, data holds {}",
            num_sample_symbols,
            data_length / COMPLEX_SAMPLE_SIZE
        )));
    }
    let samples = codec.decode_all(cursor.read_bytes(data_length, "samples")?)?;

    Ok(ConstellationPayload {
        header,
        channel_id,
        cm_mac: MacAddress(cm_mac),
        modulation_order,
        num_sample_symbols,
        samples,
    })
}
