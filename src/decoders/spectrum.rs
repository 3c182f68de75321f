// Spectrum analysis sweep (PNN9): fixed-width amplitude segments

use crate::core::constants::*;
use crate::core::cursor::ByteCursor;
use crate::core::error::{PnmError, Result};
use crate::core::format::{MacAddress, SpectrumPayload};
use crate::core::header::CaptureHeader;

pub fn decode(header: CaptureHeader, body: &[u8]) -> Result<SpectrumPayload> {
    let mut cursor = ByteCursor::new(body);
    let channel_id = cursor.read_u8("channel_id")?;
    let cm_mac = cursor.read_array("cm_mac")?;
    let first_segment_center_freq = cursor.read_u32("first_segment_center_freq")?;
    let last_segment_center_freq = cursor.read_u32("last_segment_center_freq")?;
    let segment_freq_span = cursor.read_u32("segment_freq_span")?;
    let num_bins_per_segment = cursor.read_u16("num_bins_per_segment")?;
    let equivalent_noise_bandwidth = cursor.read_u16("equivalent_noise_bandwidth")?;
    let window_function = cursor.read_u16("window_function")?;
    let bin_frequency_spacing = cursor.read_u32("bin_frequency_spacing")?;
    let data_length = cursor.read_length("amplitude data_length", SPECTRUM_SAMPLE_SIZE)?;

    let bins = num_bins_per_segment as usize;
    let segment_bytes = bins * SPECTRUM_SAMPLE_SIZE;
    if data_length > 0 && (bins == 0 || data_length % segment_bytes != 0) {
        return Err(PnmError::InconsistentGrid(format!(
            "amplitude data of {} bytes is not a whole number of {}-bin segments",
            data_length, bins
        )));
    }
    let segment_count = if bins == 0 { 0 } else { data_length / segment_bytes };

    if segment_count > 0 {
        let expected_last =
            u64::from(first_segment_center_freq) + (segment_count as u64 - 1) * u64::from(segment_freq_span);
        if expected_last != u64::from(last_segment_center_freq) {
            return Err(PnmError::InconsistentGrid(format!(
                "{} segments from {} Hz every {} Hz end at {} Hz, header says {} Hz",
                segment_count,
                first_segment_center_freq,
                segment_freq_span,
                expected_last,
                last_segment_center_freq
            )));
        }
    }

    let mut data = cursor.sub_cursor(data_length, "amplitudes")?;
    let mut amplitudes_db = Vec::with_capacity(segment_count * bins);
    let mut frequencies_hz = Vec::with_capacity(segment_count * bins);
    let half_width = (bins as f64 - 1.0) / 2.0;
    for segment in 0..segment_count {
        let center = f64::from(first_segment_center_freq) + segment as f64 * f64::from(segment_freq_span);
        for bin in 0..bins {
            let raw = data.read_i16("amplitude")?;
            amplitudes_db.push(f64::from(raw) * SPECTRUM_AMPLITUDE_SCALE);
            frequencies_hz.push(center + (bin as f64 - half_width) * f64::from(bin_frequency_spacing));
        }
    }

    Ok(SpectrumPayload {
        header,
        channel_id,
        cm_mac: MacAddress(cm_mac),
        first_segment_center_freq,
        last_segment_center_freq,
        segment_freq_span,
        num_bins_per_segment,
        equivalent_noise_bandwidth,
        window_function,
        bin_frequency_spacing,
        segment_count,
        frequencies_hz,
        amplitudes_db,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::header::parse_header;
    use crate::testing::*;

    fn decode_bytes(bytes: &[u8]) -> Result<SpectrumPayload> {
        let (header, body) = parse_header(bytes)?;
        decode(header, body)
    }

    #[test]
    fn test_segments_concatenate_in_frequency_order() {
        // 3 segments of 5 bins, 100 kHz bins, segment span 500 kHz
        let amplitudes: Vec<i16> = (0..15).map(|i| -1000 + i * 10).collect();
        let bytes = spectrum_capture(300_000_000, 500_000, 5, 100_000, &amplitudes);
        let payload = decode_bytes(&bytes).unwrap();

        assert_eq!(payload.segment_count, 3);
        assert_eq!(payload.amplitudes_db.len(), 15);
        assert!((payload.amplitudes_db[0] + 10.0).abs() < 1e-12);
        assert!((payload.amplitudes_db[14] + 8.6).abs() < 1e-12);
        assert_eq!(payload.frequencies_hz[0], 299_800_000.0);
        assert_eq!(payload.frequencies_hz[2], 300_000_000.0);
        assert_eq!(payload.frequencies_hz[5], 300_300_000.0);
        assert_eq!(payload.frequencies_hz[14], 301_200_000.0);
        assert!(payload.frequencies_hz.windows(2).all(|w| w[1] > w[0]));
    }

    #[test]
    fn test_partial_segment_rejected() {
        let bytes = spectrum_capture(300_000_000, 500_000, 4, 100_000, &[0; 6]);
        assert!(matches!(decode_bytes(&bytes), Err(PnmError::InconsistentGrid(_))));
    }

    #[test]
    fn test_last_center_mismatch() {
        let bytes = CaptureBuilder::new(FileType::SpectrumAnalysis)
            .u8(0)
            .bytes(&TEST_MAC)
            .u32(100_000_000)
            .u32(999)
            .u32(1_000_000)
            .u16(2)
            .u16(0)
            .u16(0)
            .u32(500_000)
            .u32(8)
            .bytes(&[0; 8])
            .build();
        assert!(matches!(decode_bytes(&bytes), Err(PnmError::InconsistentGrid(_))));
    }

    #[test]
    fn test_empty_sweep() {
        let payload = decode_bytes(&spectrum_capture(100, 10, 8, 1, &[])).unwrap();
        assert_eq!(payload.segment_count, 0);
        assert!(payload.amplitudes_db.is_empty());
    }
}
