// Error handling for PNM decoding and analysis

use crate::core::constants::FileType;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, PnmError>;

#[derive(Error, Debug)]
pub enum PnmError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Config error: {0}")]
    Config(#[from] serde_json::Error),

    #[error("Malformed header: {0}")]
    MalformedHeader(String),

    #[error("Capture type mismatch: expected {expected}, got {found}")]
    TypeMismatch { expected: FileType, found: FileType },

    #[error("Unsupported compression type: {0}")]
    UnsupportedCompression(u8),

    #[error("Decompression failed: {0}")]
    DecompressionFailed(String),

    #[error("Truncated payload reading {context}: need {expected} bytes, have {actual}")]
    TruncatedPayload {
        context: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("Inconsistent grid: {0}")]
    InconsistentGrid(String),

    #[error("Misaligned length for {field}: {length} is not a multiple of {width}")]
    MisalignedLength {
        field: &'static str,
        length: usize,
        width: usize,
    },

    #[error("Unsupported value for {field}: {value}")]
    UnsupportedValue { field: &'static str, value: u32 },

    #[error("Run-length mismatch in profile {profile_id}: runs sum to {actual}, expected {expected}")]
    RunLengthMismatch {
        profile_id: u8,
        expected: usize,
        actual: usize,
    },

    #[error("Series overflow in profile {profile_id}: {declared} records exceeds bound {bound}")]
    SeriesOverflow {
        profile_id: u8,
        declared: usize,
        bound: usize,
    },

    #[error("Invalid grid: {0}")]
    InvalidGrid(String),

    #[error("Invalid cutoff: normalized cutoff {0} must lie in (0, 1)")]
    InvalidCutoff(f64),

    #[error("Invalid filter order: {0}")]
    InvalidOrder(usize),

    #[error("Invalid window width: {0}")]
    InvalidWindow(usize),

    #[error("No direct path: empty sample sequence")]
    NoDirectPath,

    #[error("Empty input")]
    EmptyInput,

    #[error("Invalid propagation speed: velocity factor {0} must lie in (0, 1]")]
    InvalidPropagationSpeed(f64),

    #[error("Length mismatch: {left} vs {right}")]
    LengthMismatch { left: usize, right: usize },

    #[error("Grid mismatch at row {row}")]
    GridMismatch { row: usize },
}
