//! Core data types for reduction requests and results.
//!
//! Result structs derive `Default`: the all-zero state is what a host sees
//! after a failed call, so there is never a partially filled result.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Statistics produced by reducing a calibration (bias/dark/flat) frame.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CalibrationResult {
    /// Mean sample value over the whole frame
    pub mean_counts: f64,

    /// Highest sample value in the frame
    pub peak_counts: f64,

    /// Name of the reduced output artifact
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_filename: Option<String>,
}

/// Statistics produced by reducing a science exposure.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExposureResult {
    /// Seeing estimate (arcsec)
    pub seeing: f64,

    /// Counts in the brightest pixel / object
    pub counts: f64,

    /// X position of the brightest object (may be fractional)
    pub x_pix: f64,

    /// Y position of the brightest object (may be fractional)
    pub y_pix: f64,

    /// Photometricity measure. Only the external pipeline fills this.
    pub photometricity: f64,

    /// Sky brightness. Only the external pipeline fills this.
    pub sky_brightness: f64,

    /// Whether the frame is saturated. Only the external pipeline fills this.
    pub saturated: bool,

    /// Name of the reduced output artifact
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_filename: Option<String>,
}

/// Quick or full external reduction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReductionMode {
    Quick,
    Full,
}

impl ReductionMode {
    pub fn from_full_flag(full: bool) -> Self {
        if full {
            Self::Full
        } else {
            Self::Quick
        }
    }
}

/// What a request asks the engine to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestKind {
    /// Reduce a single calibration frame
    Calibration,
    /// Reduce a single science exposure
    Exposure,
    /// Build a master bias from a directory of frames
    MasterBias,
    /// Build a master flat from a directory of frames
    MasterFlat,
}

/// One reduction request. The path is a file for frame reductions and a
/// directory for master frame creation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReductionRequest {
    pub input: PathBuf,
    pub kind: RequestKind,
}

impl ReductionRequest {
    pub fn new(input: impl Into<PathBuf>, kind: RequestKind) -> Self {
        Self {
            input: input.into(),
            kind,
        }
    }

    pub fn input(&self) -> &Path {
        &self.input
    }
}

/// Result payload keyed by request kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ReductionOutput {
    Calibration(CalibrationResult),
    Exposure(ExposureResult),
    MasterBias,
    MasterFlat,
}

impl ReductionOutput {
    /// The zeroed output for a request kind.
    pub fn zeroed(kind: RequestKind) -> Self {
        match kind {
            RequestKind::Calibration => Self::Calibration(CalibrationResult::default()),
            RequestKind::Exposure => Self::Exposure(ExposureResult::default()),
            RequestKind::MasterBias => Self::MasterBias,
            RequestKind::MasterFlat => Self::MasterFlat,
        }
    }
}

/// One line of batch output: the request, whether it succeeded, the error
/// slot after the call and the (zeroed on failure) result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReductionRecord {
    pub input: PathBuf,
    pub success: bool,
    pub error_number: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_string: Option<String>,
    pub output: ReductionOutput,
}
