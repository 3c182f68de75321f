// Downstream OFDM channel estimation coefficients (PNN2)

use crate::core::complex::ComplexCodec;
use crate::core::constants::*;
use crate::core::cursor::ByteCursor;
use crate::core::error::Result;
use crate::core::format::{ChannelEstimationPayload, MacAddress};
use crate::core::grid::OfdmPreamble;
use crate::core::header::CaptureHeader;

pub fn decode(header: CaptureHeader, body: &[u8]) -> Result<ChannelEstimationPayload> {
    decode_with(header, body, ComplexCodec::new(DEFAULT_FRACTIONAL_BITS))
}

pub fn decode_with(header: CaptureHeader, body: &[u8], codec: ComplexCodec) -> Result<ChannelEstimationPayload> {
    let mut cursor = ByteCursor::new(body);
    let preamble = OfdmPreamble::read(&mut cursor)?;
    let data_length = cursor.read_length("coefficient data_length", COMPLEX_SAMPLE_SIZE)?;
    let grid = preamble.grid(data_length / COMPLEX_SAMPLE_SIZE)?;
    let coefficients = codec.decode_all(cursor.read_bytes(data_length, "coefficients")?)?;

    Ok(ChannelEstimationPayload {
        header,
        channel_id: preamble.channel_id,
        cm_mac: MacAddress(preamble.cm_mac),
        grid,
        coefficients,
    })
}
