//! Contract for the external reduction pipeline.
//!
//! When the `dprt.fake` property is false the engine hands frames to a
//! host-supplied [`ReductionPipeline`]. Its numerics are outside this crate;
//! the engine only selects the mode, forwards the abort flag and copies the
//! returned values (or the returned failure) back to the caller.

use std::path::Path;

use crate::abort::AbortSignal;
use crate::error::PipelineFailure;
use crate::types::{CalibrationResult, ExposureResult, ReductionMode};

/// A full/quick reduction backend.
///
/// Implementations should poll `abort` where they can and return a
/// [`PipelineFailure`] with their own code when they stop early.
pub trait ReductionPipeline: Send + Sync {
    /// Backend name for logging.
    fn name(&self) -> &str;

    fn calibrate_reduce(
        &self,
        input: &Path,
        mode: ReductionMode,
        abort: &AbortSignal,
    ) -> Result<CalibrationResult, PipelineFailure>;

    fn expose_reduce(
        &self,
        input: &Path,
        mode: ReductionMode,
        abort: &AbortSignal,
    ) -> Result<ExposureResult, PipelineFailure>;

    fn make_master_bias(&self, directory: &Path, abort: &AbortSignal)
        -> Result<(), PipelineFailure>;

    fn make_master_flat(&self, directory: &Path, abort: &AbortSignal)
        -> Result<(), PipelineFailure>;
}
