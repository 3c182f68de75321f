// Capture decoder facade: decompress, parse header, dispatch by file type

use crate::core::complex::ComplexCodec;
use crate::core::compression::{decompress, CompressionType};
use crate::core::constants::{FileType, HEADER_SIZE};
use crate::core::error::{PnmError, Result};
use crate::core::format::FormatPayload;
use crate::core::header::{parse_header, CaptureHeader};
use crate::decoders::*;
use crate::models::analysis_config::DecodeOptions;
use std::borrow::Cow;
use tracing::{debug, warn};

/// Stateless decoder; holds only the options applied to every capture.
#[derive(Debug, Clone, Default)]
pub struct CaptureDecoder {
    options: DecodeOptions,
}

impl CaptureDecoder {
    pub fn new(options: DecodeOptions) -> Self {
        Self { options }
    }

    pub fn decode(&self, data: &[u8]) -> Result<FormatPayload> {
        let raw = Self::inflate(data)?;
        let (header, body) = parse_header(&raw)?;
        self.decode_body(header, body)
    }

    /// Decode and require the capture to be of the type the caller expects.
    pub fn decode_with_hint(&self, data: &[u8], expected: FileType) -> Result<FormatPayload> {
        let raw = Self::inflate(data)?;
        let (header, body) = parse_header(&raw)?;
        if header.file_type != expected {
            return Err(PnmError::TypeMismatch {
                expected,
                found: header.file_type,
            });
        }
        self.decode_body(header, body)
    }

    /// Decode independent captures; one failure never affects the others.
    pub fn decode_batch<'a, I>(&self, captures: I) -> Vec<Result<FormatPayload>>
    where
        I: IntoIterator<Item = &'a [u8]>,
    {
        captures
            .into_iter()
            .enumerate()
            .map(|(i, data)| {
                let result = self.decode(data);
                if let Err(e) = &result {
                    warn!("capture {} failed to decode: {}", i, e);
                }
                result
            })
            .collect()
    }

    pub fn decode_body(&self, header: CaptureHeader, body: &[u8]) -> Result<FormatPayload> {
        debug!("decoding {} body of {} bytes", header.file_type, body.len());
        let codec = ComplexCodec::new(self.options.complex_fractional_bits);

        let payload = match header.file_type {
            FileType::RxMer => FormatPayload::RxMer(rxmer::decode_with(header, body, &self.options)?),
            FileType::ChannelEstimation => {
                FormatPayload::ChannelEstimation(channel_estimation::decode_with(header, body, codec)?)
            }
            FileType::Constellation => {
                FormatPayload::Constellation(constellation::decode_with(header, body, codec)?)
            }
            FileType::ModulationProfile => {
                FormatPayload::ModulationProfile(modulation_profile::decode(header, body)?)
            }
            FileType::FecSummary => FormatPayload::FecSummary(fec_summary::decode(header, body)?),
            FileType::Histogram => FormatPayload::Histogram(histogram::decode(header, body)?),
            FileType::SpectrumAnalysis => FormatPayload::SpectrumAnalysis(spectrum::decode(header, body)?),
            FileType::UpstreamPreEqualization | FileType::UpstreamPreEqualizationLastUpdate => {
                FormatPayload::UpstreamPreEqualization(pre_equalization::decode_with(header, body, codec)?)
            }
        };
        Ok(payload)
    }

    // No archive is shorter than a bare header; leave those to header validation.
    fn inflate(data: &[u8]) -> Result<Cow<'_, [u8]>> {
        if data.len() < HEADER_SIZE {
            return Ok(Cow::Borrowed(data));
        }
        match CompressionType::detect(data) {
            CompressionType::None => Ok(Cow::Borrowed(data)),
            compression => {
                debug!("inflating {:?} capture archive", compression);
                decompress(data, compression).map(Cow::Owned)
            }
        }
    }
}
