// Compressed capture archives: detection and inflation

use crate::core::constants::MAGIC;
use crate::core::error::{PnmError, Result};
use flate2::read::{GzDecoder, ZlibDecoder};
use std::io::Read;

#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompressionType {
    None = 0,
    Zlib = 1,
    Lz4 = 2,
    Zstd = 3,
    Gzip = 4,
}

impl CompressionType {
    /// Sniff the leading bytes. Raw captures (`PNN...`) are never treated as compressed.
    pub fn detect(data: &[u8]) -> Self {
        if data.starts_with(MAGIC) {
            return CompressionType::None;
        }
        match data {
            [0x1F, 0x8B, ..] => CompressionType::Gzip,
            [0x28, 0xB5, 0x2F, 0xFD, ..] => CompressionType::Zstd,
            [0x04, 0x22, 0x4D, 0x18, ..] => CompressionType::Lz4,
            [cmf, flg, ..]
                if cmf & 0x0F == 8 && cmf >> 4 <= 7 && (u16::from(*cmf) << 8 | u16::from(*flg)) % 31 == 0 =>
            {
                CompressionType::Zlib
            }
            _ => CompressionType::None,
        }
    }
}

fn read_all<R: Read>(mut reader: R, codec: &str) -> Result<Vec<u8>> {
    let mut decompressed = Vec::new();
    reader
        .read_to_end(&mut decompressed)
        .map_err(|e| PnmError::DecompressionFailed(format!("{}: {}", codec, e)))?;
    Ok(decompressed)
}

pub fn decompress(data: &[u8], compression: CompressionType) -> Result<Vec<u8>> {
    match compression {
        CompressionType::None => Ok(data.to_vec()),

        CompressionType::Zlib => read_all(ZlibDecoder::new(data), "Zlib"),

        CompressionType::Gzip => read_all(GzDecoder::new(data), "Gzip"),

        #[cfg(feature = "lz4")]
        CompressionType::Lz4 => {
            let decoder = lz4::Decoder::new(data)
                .map_err(|e| PnmError::DecompressionFailed(format!("LZ4: {}", e)))?;
            read_all(decoder, "LZ4")
        }

        #[cfg(not(feature = "lz4"))]
        CompressionType::Lz4 => Err(PnmError::UnsupportedCompression(compression as u8)),

        #[cfg(feature = "zstd")]
        CompressionType::Zstd => zstd::decode_all(data)
            .map_err(|e| PnmError::DecompressionFailed(format!("Zstd: {}", e))),

        #[cfg(not(feature = "zstd"))]
        CompressionType::Zstd => Err(PnmError::UnsupportedCompression(compression as u8)),
    }
}
