// Decode a PNM capture file, analyze it and print both as JSON
//
// Usage: decode_capture <capture-file> [analysis-config.json]

use anyhow::{bail, Context};
use pnm_decoder::utils::conf_helper::read_config_file;
use pnm_decoder::{analyze, AnalysisConfig, CaptureDecoder};
use tracing::{info, Level};

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(Level::DEBUG)
        .init();

    let mut args = std::env::args().skip(1);
    let Some(capture_path) = args.next() else {
        bail!("usage: decode_capture <capture-file> [analysis-config.json]");
    };
    let config = match args.next() {
        Some(path) => read_config_file(&path).with_context(|| format!("loading config {}", path))?,
        None => AnalysisConfig::default(),
    };

    let bytes = std::fs::read(&capture_path).with_context(|| format!("reading {}", capture_path))?;
    let decoder = CaptureDecoder::new(config.decode.clone());
    let payload = decoder
        .decode(&bytes)
        .with_context(|| format!("decoding {}", capture_path))?;

    let header = payload.header();
    info!(
        "{} v{}.{} captured at {}",
        header.file_type,
        header.major_version,
        header.minor_version,
        header
            .captured_at()
            .map(|t| t.to_rfc3339())
            .unwrap_or_else(|| "unknown time".to_string())
    );

    let analysis = analyze(&payload, &config)?;
    let output = serde_json::json!({
        "capture": payload,
        "analysis": analysis,
    });
    println!("{}", serde_json::to_string_pretty(&output)?);

    Ok(())
}
