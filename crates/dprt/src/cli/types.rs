//! CLI enum types: output format and batch request kind.

use clap::ValueEnum;
use dprt_core::RequestKind;

/// Supported output formats.
#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum OutputFormat {
    /// Single JSON object or array
    Json,
    /// One JSON object per line (newline-delimited)
    Jsonl,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Json => write!(f, "json"),
            OutputFormat::Jsonl => write!(f, "jsonl"),
        }
    }
}

impl From<OutputFormat> for dprt_core::OutputFormat {
    fn from(format: OutputFormat) -> Self {
        match format {
            OutputFormat::Json => dprt_core::OutputFormat::Json,
            OutputFormat::Jsonl => dprt_core::OutputFormat::JsonLines,
        }
    }
}

/// Which reduction a batch applies to each frame.
#[derive(Clone, Copy, Debug, ValueEnum, Default)]
pub enum BatchKind {
    /// Calibration frames (mean and peak counts)
    #[default]
    Calibrate,
    /// Science exposures (seeing and brightest pixel)
    Expose,
}

impl From<BatchKind> for RequestKind {
    fn from(kind: BatchKind) -> Self {
        match kind {
            BatchKind::Calibrate => RequestKind::Calibration,
            BatchKind::Expose => RequestKind::Exposure,
        }
    }
}
