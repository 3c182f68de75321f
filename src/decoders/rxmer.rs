// RxMER per subcarrier (PNN4): one quarter-dB byte per active subcarrier

use crate::core::constants::*;
use crate::core::cursor::ByteCursor;
use crate::core::error::Result;
use crate::core::format::{CarrierStatus, MacAddress, RxMerPayload};
use crate::core::grid::OfdmPreamble;
use crate::core::header::CaptureHeader;
use crate::models::analysis_config::DecodeOptions;
use tracing::debug;

pub fn decode(header: CaptureHeader, body: &[u8]) -> Result<RxMerPayload> {
    decode_with(header, body, &DecodeOptions::default())
}

pub fn decode_with(header: CaptureHeader, body: &[u8], options: &DecodeOptions) -> Result<RxMerPayload> {
    let mut cursor = ByteCursor::new(body);
    let preamble = OfdmPreamble::read(&mut cursor)?;
    let data_length = cursor.read_length("rxmer data_length", RXMER_SAMPLE_SIZE)?;
    let grid = preamble.grid(data_length / RXMER_SAMPLE_SIZE)?;
    let data = cursor.read_bytes(data_length, "rxmer data")?;

    let mut values = Vec::with_capacity(data.len());
    let mut carrier_status = Vec::with_capacity(data.len());
    for &raw in data {
        if options.rxmer_excluded.contains(&raw) {
            values.push(f64::NAN);
            carrier_status.push(CarrierStatus::Excluded);
        } else {
            values.push(f64::from(raw) * RXMER_STEP_DB);
            carrier_status.push(if options.rxmer_clipped.contains(&raw) {
                CarrierStatus::Clipped
            } else {
                CarrierStatus::Measured
            });
        }
    }

    if !cursor.is_empty() {
        debug!("rxmer: ignoring {} trailing bytes", cursor.remaining());
    }

    Ok(RxMerPayload {
        header,
        channel_id: preamble.channel_id,
        cm_mac: MacAddress(preamble.cm_mac),
        grid,
        values,
        carrier_status,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::error::PnmError;
    use crate::core::header::parse_header;
    use crate::testing::*;

    fn decode_bytes(bytes: &[u8]) -> Result<RxMerPayload> {
        let (header, body) = parse_header(bytes)?;
        decode(header, body)
    }

    #[test]
    fn test_quarter_db_values() {
        let payload = decode_bytes(&rxmer_capture(148, &[160, 161, 0, 253])).unwrap();
        assert_eq!(payload.values, vec![40.0, 40.25, 0.0, 63.25]);
        assert_eq!(payload.grid.first_active_index, 148);
        assert_eq!(payload.grid.active_count, 4);
        assert_eq!(payload.grid.spacing_hz, 50_000);
        assert_eq!(payload.channel_id, 33);
        assert_eq!(payload.cm_mac, MacAddress(TEST_MAC));
    }

    #[test]
    fn test_sentinels_flagged() {
        let payload = decode_bytes(&rxmer_capture(0, &[0xFF, 0xFE, 100])).unwrap();
        assert!(payload.values[0].is_nan());
        assert_eq!(payload.carrier_status[0], CarrierStatus::Excluded);
        assert_eq!(payload.values[1], 63.5);
        assert_eq!(payload.carrier_status[1], CarrierStatus::Clipped);
        assert_eq!(payload.carrier_status[2], CarrierStatus::Measured);
        assert_eq!(payload.measured_values(), vec![63.5, 25.0]);
    }

    #[test]
    fn test_vendor_sentinels() {
        let options = DecodeOptions {
            rxmer_excluded: vec![0x00],
            rxmer_clipped: vec![],
            ..DecodeOptions::default()
        };
        let bytes = rxmer_capture(0, &[0x00, 0xFF]);
        let (header, body) = parse_header(&bytes).unwrap();
        let payload = decode_with(header, body, &options).unwrap();
        assert_eq!(payload.carrier_status[0], CarrierStatus::Excluded);
        assert_eq!(payload.values[1], 63.75);
        assert_eq!(payload.carrier_status[1], CarrierStatus::Measured);
    }

    #[test]
    fn test_empty_grid_is_empty_series() {
        let payload = decode_bytes(&rxmer_capture(0, &[])).unwrap();
        assert!(payload.values.is_empty());
        assert_eq!(payload.grid.active_count, 0);
        assert_eq!(payload.grid.first_active_index, -1);
    }

    #[test]
    fn test_truncated_body() {
        let mut bytes = rxmer_capture(0, &[160; 8]);
        bytes.truncate(bytes.len() - 3);
        assert!(matches!(
            decode_bytes(&bytes),
            Err(PnmError::TruncatedPayload { expected: 8, actual: 5, .. })
        ));
    }

    #[test]
    fn test_inconsistent_span() {
        let bytes = CaptureBuilder::new(FileType::RxMer)
            .ofdm_preamble(10, 20, 50)
            .u32(4)
            .bytes(&[160; 4])
            .build();
        assert!(matches!(decode_bytes(&bytes), Err(PnmError::InconsistentGrid(_))));
    }

    #[test]
    fn test_decode_is_idempotent() {
        let bytes = rxmer_capture(300, &[1, 2, 3, 0xFF, 200]);
        let a = decode_bytes(&bytes).unwrap();
        let b = decode_bytes(&bytes).unwrap();
        // NaN != NaN, so compare bit patterns
        let bits = |p: &RxMerPayload| p.values.iter().map(|v| v.to_bits()).collect::<Vec<_>>();
        assert_eq!(bits(&a), bits(&b));
        assert_eq!(a.carrier_status, b.carrier_status);
    }
}
