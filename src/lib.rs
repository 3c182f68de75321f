// PNM capture decoder
// Main library entry point

pub mod analysis;
pub mod core;
pub mod decoders;
pub mod models;
pub mod utils;

#[cfg(test)]
mod testing;

// Re-export main types
pub use crate::analysis::report::{analyze, AnalysisResult};
pub use crate::core::constants::FileType;
pub use crate::core::error::{PnmError, Result};
pub use crate::core::format::FormatPayload;
pub use crate::core::header::CaptureHeader;
pub use crate::core::reader::CaptureDecoder;
pub use crate::models::analysis_config::AnalysisConfig;
