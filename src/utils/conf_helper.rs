use std::fs;
use std::path::Path;
use tracing::info;

use crate::core::error::Result;
use crate::models::analysis_config::AnalysisConfig;

/// Parse an analysis configuration; omitted fields take their defaults.
pub fn parse_config(data: &str) -> Result<AnalysisConfig> {
    let config: AnalysisConfig = serde_json::from_str(data)?;
    Ok(config)
}

pub fn read_config_file<P: AsRef<Path>>(file_path: P) -> Result<AnalysisConfig> {
    let file_path = file_path.as_ref();
    let data = fs::read_to_string(file_path)?;
    let config = parse_config(&data)?;

    info!(
        "Analysis config loaded from {} (echo mode {:?}, group delay {:?})",
        file_path.display(),
        config.echo.mode,
        config.group_delay.mode
    );

    Ok(config)
}
