//! Reduction engine - selects fake or external execution and runs it.
//!
//! Frame reductions first read `dprt.fake` and `dprt.full_reduction`. In fake
//! mode the frame is reduced locally (see `fake.rs`); otherwise the request
//! goes to the host-installed [`ReductionPipeline`] in quick or full mode
//! according to `dprt.full_reduction`. Master-frame operations read
//! `dprt.fake` and their own enable flag. Engine methods do not touch the error slot or reset
//! the abort flag; [`crate::Dprt`] does that around each public call.

mod fake;
pub mod seeing;
pub mod stats;

use std::path::Path;

use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::abort::AbortSignal;
use crate::error::{DprtError, Operation, Result};
use crate::fits::{FitsReader, ImageSource};
use crate::pipeline::ReductionPipeline;
use crate::properties::{keys, PropertyBindings};
use crate::types::{
    CalibrationResult, ExposureResult, ReductionMode, ReductionOutput, ReductionRequest,
    RequestKind,
};

/// Called with the row index at each mid-scan checkpoint.
type RowObserver = Box<dyn Fn(usize) + Send + Sync>;

/// The reduction engine.
pub struct ReductionEngine {
    properties: PropertyBindings,
    images: Box<dyn ImageSource>,
    pipeline: Option<Box<dyn ReductionPipeline>>,
    abort: AbortSignal,
    rng: StdRng,
    row_observer: Option<RowObserver>,
}

impl ReductionEngine {
    /// Create an engine reading FITS files from disk, with no external
    /// pipeline installed.
    pub fn new(properties: PropertyBindings) -> Self {
        Self {
            properties,
            images: Box::new(FitsReader::new()),
            pipeline: None,
            abort: AbortSignal::new(),
            rng: StdRng::from_entropy(),
            row_observer: None,
        }
    }

    /// Replace the image loader.
    pub fn with_image_source(mut self, images: Box<dyn ImageSource>) -> Self {
        self.images = images;
        self
    }

    /// Install the external pipeline used when `dprt.fake` is false.
    pub fn with_pipeline(mut self, pipeline: Box<dyn ReductionPipeline>) -> Self {
        self.pipeline = Some(pipeline);
        self
    }

    /// Share an existing abort flag.
    pub fn with_abort_signal(mut self, abort: AbortSignal) -> Self {
        self.abort = abort;
        self
    }

    /// Seed the random source used for simulated seeing.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    #[cfg(test)]
    pub(crate) fn with_row_observer(
        mut self,
        observer: impl Fn(usize) + Send + Sync + 'static,
    ) -> Self {
        self.row_observer = Some(Box::new(observer));
        self
    }

    pub fn abort_signal(&self) -> &AbortSignal {
        &self.abort
    }

    pub fn properties(&self) -> &PropertyBindings {
        &self.properties
    }

    /// Mutable access so a host can rebind individual lookup slots.
    pub fn properties_mut(&mut self) -> &mut PropertyBindings {
        &mut self.properties
    }

    pub fn has_pipeline(&self) -> bool {
        self.pipeline.is_some()
    }

    /// Reduce a calibration frame.
    pub fn calibrate_reduce(&mut self, input: &Path) -> Result<CalibrationResult> {
        tracing::debug!("calibrate_reduce({:?})", input);
        let (fake, mode) = self.reduction_flags()?;
        if fake {
            return self.fake_calibrate(input);
        }
        let pipeline = self.require_pipeline(Operation::CalibrateReduce)?;
        tracing::debug!("Delegating {:?} to {} ({:?})", input, pipeline.name(), mode);
        Ok(pipeline.calibrate_reduce(input, mode, &self.abort)?)
    }

    /// Reduce a science exposure.
    pub fn expose_reduce(&mut self, input: &Path) -> Result<ExposureResult> {
        tracing::debug!("expose_reduce({:?})", input);
        let (fake, mode) = self.reduction_flags()?;
        if fake {
            return self.fake_expose(input);
        }
        let pipeline = self.require_pipeline(Operation::ExposeReduce)?;
        tracing::debug!("Delegating {:?} to {} ({:?})", input, pipeline.name(), mode);
        Ok(pipeline.expose_reduce(input, mode, &self.abort)?)
    }

    /// Build a master bias from the frames in `directory`.
    pub fn make_master_bias(&mut self, directory: &Path) -> Result<()> {
        self.make_master(Operation::MakeMasterBias, keys::MAKE_MASTER_BIAS, directory)
    }

    /// Build a master flat from the frames in `directory`.
    pub fn make_master_flat(&mut self, directory: &Path) -> Result<()> {
        self.make_master(Operation::MakeMasterFlat, keys::MAKE_MASTER_FLAT, directory)
    }

    /// Run any request kind.
    pub fn reduce(&mut self, request: &ReductionRequest) -> Result<ReductionOutput> {
        let input = request.input();
        match request.kind {
            RequestKind::Calibration => self
                .calibrate_reduce(input)
                .map(ReductionOutput::Calibration),
            RequestKind::Exposure => self.expose_reduce(input).map(ReductionOutput::Exposure),
            RequestKind::MasterBias => self
                .make_master_bias(input)
                .map(|()| ReductionOutput::MasterBias),
            RequestKind::MasterFlat => self
                .make_master_flat(input)
                .map(|()| ReductionOutput::MasterFlat),
        }
    }

    fn make_master(&mut self, operation: Operation, enable_key: &str, directory: &Path) -> Result<()> {
        tracing::debug!("{}({:?})", operation, directory);
        if self.properties.get_bool(keys::FAKE)? {
            tracing::info!("{operation}: fake mode, nothing to do");
            return Ok(());
        }
        if !self.properties.get_bool(enable_key)? {
            tracing::info!("{operation}: disabled by {enable_key}, skipping {:?}", directory);
            return Ok(());
        }
        let pipeline = self.require_pipeline(operation)?;
        match operation {
            Operation::MakeMasterFlat => pipeline.make_master_flat(directory, &self.abort)?,
            _ => pipeline.make_master_bias(directory, &self.abort)?,
        }
        tracing::info!("{operation}: {} completed for {:?}", pipeline.name(), directory);
        Ok(())
    }

    /// `dprt.fake` and `dprt.full_reduction`, both read before any branch.
    fn reduction_flags(&self) -> Result<(bool, ReductionMode)> {
        let fake = self.properties.get_bool(keys::FAKE)?;
        let full = self.properties.get_bool(keys::FULL_REDUCTION)?;
        Ok((fake, ReductionMode::from_full_flag(full)))
    }

    fn require_pipeline(&self, operation: Operation) -> Result<&dyn ReductionPipeline> {
        self.pipeline
            .as_deref()
            .ok_or(DprtError::PipelineUnavailable { operation })
    }
}
