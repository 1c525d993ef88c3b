//! DpRt Core - real-time data reduction for a telescope instrument.
//!
//! Given the path of a freshly read-out FITS frame, DpRt either runs a
//! cheap local "fake" reduction or hands the frame to an external reduction
//! pipeline, and reports a fixed set of scalar results.
//!
//! # Architecture
//!
//! ```text
//! PropertyBindings ─┐
//! ImageSource ──────┼─> ReductionEngine ─> Dprt (error slot + abort) ─> host
//! ReductionPipeline ┘
//! ```
//!
//! # Usage
//!
//! ```rust,ignore
//! use dprt_core::{CalibrationResult, Dprt};
//!
//! let mut dprt = Dprt::with_property_file("dprt.properties".as_ref())?;
//! let mut result = CalibrationResult::default();
//! if !dprt.calibrate_reduce("bias.fits".as_ref(), &mut result) {
//!     eprintln!("error {}: {}", dprt.error_number(), dprt.error_string());
//! }
//! ```

pub mod abort;
pub mod config;
pub mod discovery;
pub mod engine;
pub mod error;
pub mod fits;
pub mod output;
pub mod pipeline;
pub mod properties;
pub mod types;

#[cfg(test)]
mod test_helpers;

use std::path::Path;
use std::sync::Arc;

pub use abort::AbortSignal;
pub use config::{BatchConfig, Config};
pub use discovery::FileDiscovery;
pub use engine::ReductionEngine;
pub use error::{
    ConfigError, DprtError, ErrorState, ImageError, PipelineFailure, PropertyError, Result,
};
pub use fits::{FitsImage, FitsReader, ImageSource};
pub use output::{OutputFormat, RecordWriter};
pub use pipeline::ReductionPipeline;
pub use properties::{FileProperties, PropertyBindings, PropertySource};
pub use types::{
    CalibrationResult, ExposureResult, ReductionMode, ReductionOutput, ReductionRecord,
    ReductionRequest, RequestKind,
};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// A reduction context: the engine plus the host-visible error slot.
///
/// Every call clears the error slot and the abort flag before it starts.
/// On failure the result slot is overwritten with zeros and the error slot
/// holds the failure's code and message until the next call.
pub struct Dprt {
    engine: ReductionEngine,
    error: ErrorState,
}

impl Dprt {
    pub fn new(engine: ReductionEngine) -> Self {
        tracing::debug!("Initializing DpRt v{}", VERSION);
        Self {
            engine,
            error: ErrorState::new(),
        }
    }

    /// Context reading reduction properties from `path`.
    pub fn with_property_file(path: &Path) -> std::result::Result<Self, PropertyError> {
        let properties = FileProperties::open(path)?;
        Ok(Self::new(ReductionEngine::new(PropertyBindings::from_source(
            Arc::new(properties),
        ))))
    }

    /// Context reading the property file named by `config`.
    pub fn from_config(config: &Config) -> std::result::Result<Self, PropertyError> {
        Self::with_property_file(&config.property_file())
    }

    /// Reduce a calibration frame into `result`.
    pub fn calibrate_reduce(&mut self, input: &Path, result: &mut CalibrationResult) -> bool {
        self.begin();
        let outcome = self.engine.calibrate_reduce(input);
        store(self.settle(outcome), result)
    }

    /// Reduce a science exposure into `result`.
    pub fn expose_reduce(&mut self, input: &Path, result: &mut ExposureResult) -> bool {
        self.begin();
        let outcome = self.engine.expose_reduce(input);
        store(self.settle(outcome), result)
    }

    /// Build a master bias from the frames in `directory`.
    pub fn make_master_bias(&mut self, directory: &Path) -> bool {
        self.begin();
        let outcome = self.engine.make_master_bias(directory);
        self.settle(outcome).is_some()
    }

    /// Build a master flat from the frames in `directory`.
    pub fn make_master_flat(&mut self, directory: &Path) -> bool {
        self.begin();
        let outcome = self.engine.make_master_flat(directory);
        self.settle(outcome).is_some()
    }

    /// Run a request and capture the outcome as a record.
    pub fn reduce(&mut self, request: &ReductionRequest) -> ReductionRecord {
        self.begin();
        let outcome = self.engine.reduce(request);
        let output = self.settle(outcome);
        ReductionRecord {
            input: request.input.clone(),
            success: output.is_some(),
            error_number: self.error.number(),
            error_string: self
                .error
                .is_error()
                .then(|| self.error.message().to_string()),
            output: output.unwrap_or_else(|| ReductionOutput::zeroed(request.kind)),
        }
    }

    /// Request (or withdraw a request) that the running call stop.
    pub fn set_abort(&self, value: bool) {
        self.engine.abort_signal().set(value);
    }

    /// A handle that can set the abort flag from another thread.
    pub fn abort_handle(&self) -> AbortSignal {
        self.engine.abort_signal().clone()
    }

    /// Code of the last failure, 0 after a successful call.
    pub fn error_number(&self) -> i32 {
        self.error.number()
    }

    /// Message of the last failure, empty after a successful call.
    pub fn error_string(&self) -> &str {
        self.error.message()
    }

    pub fn error_state(&self) -> &ErrorState {
        &self.error
    }

    pub fn engine(&self) -> &ReductionEngine {
        &self.engine
    }

    pub fn engine_mut(&mut self) -> &mut ReductionEngine {
        &mut self.engine
    }

    fn begin(&mut self) {
        self.error.clear();
        self.engine.abort_signal().reset();
    }

    /// Record a failure in the error slot.
    fn settle<T>(&mut self, outcome: Result<T>) -> Option<T> {
        match outcome {
            Ok(value) => Some(value),
            Err(e) => {
                if e.is_abort() {
                    tracing::warn!("{e}");
                } else {
                    tracing::error!("{e}");
                }
                self.error.record(&e);
                None
            }
        }
    }
}

/// Write a result into a host slot, zeroing it on failure.
fn store<T: Default>(value: Option<T>, slot: &mut T) -> bool {
    let success = value.is_some();
    *slot = value.unwrap_or_default();
    success
}
