// Common capture header shared by every PNM file type

use crate::core::constants::*;
use crate::core::cursor::ByteCursor;
use crate::core::error::{PnmError, Result};
use chrono::{DateTime, TimeZone, Utc};
use serde::Serialize;
use tracing::debug;

// Highest major version we have seen in the field; newer ones are accepted as-is.
const KNOWN_MAJOR_VERSION: u8 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CaptureHeader {
    pub file_type: FileType,
    pub file_type_version: u8,
    pub major_version: u8,
    pub minor_version: u8,
    pub capture_time: u32,
}

impl CaptureHeader {
    pub fn captured_at(&self) -> Option<DateTime<Utc>> {
        Utc.timestamp_opt(i64::from(self.capture_time), 0).single()
    }

    pub fn to_bytes(&self) -> [u8; HEADER_SIZE] {
        let mut out = [0u8; HEADER_SIZE];
        out[0..3].copy_from_slice(MAGIC);
        out[3] = self.file_type.code();
        out[4] = self.file_type_version;
        out[5] = self.major_version;
        out[6] = self.minor_version;
        out[7..11].copy_from_slice(&self.capture_time.to_be_bytes());
        out
    }
}

/// Parse the fixed header and return it with the remaining body bytes.
pub fn parse_header(data: &[u8]) -> Result<(CaptureHeader, &[u8])> {
    if data.len() < HEADER_SIZE {
        return Err(PnmError::MalformedHeader(format!(
            "need {} bytes, got {}",
            HEADER_SIZE,
            data.len()
        )));
    }

    let mut cursor = ByteCursor::new(data);
    let magic = cursor.read_bytes(MAGIC.len(), "magic")?;
    if magic != MAGIC {
        return Err(PnmError::MalformedHeader(format!(
            "invalid magic bytes: expected {:?}, got {:?}",
            MAGIC, magic
        )));
    }

    let type_code = cursor.read_u8("file_type")?;
    let file_type = FileType::from_u8(type_code)
        .ok_or_else(|| PnmError::MalformedHeader(format!("unknown file type code {}", type_code)))?;

    let header = CaptureHeader {
        file_type,
        file_type_version: cursor.read_u8("file_type_version")?,
        major_version: cursor.read_u8("major_version")?,
        minor_version: cursor.read_u8("minor_version")?,
        capture_time: cursor.read_u32("capture_time")?,
    };

    if header.major_version > KNOWN_MAJOR_VERSION {
        debug!(
            "accepting {} capture with newer version {}.{}",
            file_type, header.major_version, header.minor_version
        );
    }

    Ok((header, cursor.rest()))
}
