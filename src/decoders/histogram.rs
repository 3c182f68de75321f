// Downstream amplitude histogram (PNN5)

use crate::core::constants::*;
use crate::core::cursor::ByteCursor;
use crate::core::error::Result;
use crate::core::format::{HistogramPayload, MacAddress};
use crate::core::header::CaptureHeader;

fn read_counters(cursor: &mut ByteCursor<'_>, field: &'static str) -> Result<Vec<u32>> {
    let length = cursor.read_length(field, HISTOGRAM_COUNTER_SIZE)?;
    let mut block = cursor.sub_cursor(length, field)?;
    let mut counters = Vec::with_capacity(length / HISTOGRAM_COUNTER_SIZE);
    while !block.is_empty() {
        counters.push(block.read_u32(field)?);
    }
    Ok(counters)
}

pub fn decode(header: CaptureHeader, body: &[u8]) -> Result<HistogramPayload> {
    let mut cursor = ByteCursor::new(body);
    let channel_id = cursor.read_u8("channel_id")?;
    let cm_mac = cursor.read_array("cm_mac")?;
    let symmetry = cursor.read_u8("symmetry")?;
    let dwell_counts = read_counters(&mut cursor, "dwell_counts")?;
    let hit_counts = read_counters(&mut cursor, "hit_counts")?;

    Ok(HistogramPayload {
        header,
        channel_id,
        cm_mac: MacAddress(cm_mac),
        symmetry,
        dwell_counts,
        hit_counts,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::error::PnmError;
    use crate::core::header::parse_header;
    use crate::testing::*;

    #[test]
    fn test_decode_histogram() {
        let hits: Vec<u32> = (0..255).map(|i| 1000 - (i as i32 - 127).unsigned_abs() * 7).collect();
        let bytes = histogram_capture(1, &[86_400], &hits);
        let (header, body) = parse_header(&bytes).unwrap();
        let payload = decode(header, body).unwrap();
        assert_eq!(payload.symmetry, 1);
        assert_eq!(payload.dwell_counts, vec![86_400]);
        assert_eq!(payload.hit_counts.len(), 255);
        assert_eq!(payload.hit_counts[127], 1000);
    }

    #[test]
    fn test_truncated_hits() {
        let mut bytes = histogram_capture(0, &[1, 2], &[5; 256]);
        bytes.truncate(bytes.len() - 4);
        let (header, body) = parse_header(&bytes).unwrap();
        assert!(matches!(
            decode(header, body),
            Err(PnmError::TruncatedPayload { context: "hit_counts", .. })
        ));
    }
}
