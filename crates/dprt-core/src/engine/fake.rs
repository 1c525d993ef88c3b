//! Local simulated reductions used when `dprt.fake` is true.

use std::path::Path;

use super::seeing::{self, FocusModel};
use super::stats::{self, Interrupted};
use super::ReductionEngine;
use crate::error::{Checkpoint, DprtError, Operation, PropertyError, Result};
use crate::fits::FitsImage;
use crate::properties::keys;
use crate::types::{CalibrationResult, ExposureResult};

impl ReductionEngine {
    /// Mean and peak counts of a calibration frame.
    pub(super) fn fake_calibrate(&mut self, input: &Path) -> Result<CalibrationResult> {
        let operation = Operation::CalibrateReduce;
        let image = self.load_checked(operation, input)?;

        let frame = stats::frame_stats(&image, |row| self.row_checkpoint(row))
            .map_err(|i| aborted_mid_scan(operation, input, i))?;
        drop(image);

        let output_filename = output_filename(operation, input)?;
        tracing::info!(
            "calibrate_reduce({:?}): mean {:.3}, peak {}",
            input,
            frame.mean,
            frame.peak
        );
        Ok(CalibrationResult {
            mean_counts: frame.mean,
            peak_counts: f64::from(frame.peak),
            output_filename: Some(output_filename),
        })
    }

    /// Brightest pixel and simulated seeing of a science exposure.
    ///
    /// Photometricity, sky brightness and saturation are left at zero/false.
    pub(super) fn fake_expose(&mut self, input: &Path) -> Result<ExposureResult> {
        let operation = Operation::ExposeReduce;
        let model = self.focus_model()?;
        let image = self.load_checked(operation, input)?;

        let focus = image
            .telescope_focus()
            .map_err(|source| DprtError::MissingFocus {
                operation,
                path: input.to_path_buf(),
                source,
            })?;

        let brightest = stats::brightest_pixel(&image, |row| self.row_checkpoint(row))
            .map_err(|i| aborted_mid_scan(operation, input, i))?;
        drop(image);

        let seeing = if seeing::is_focus_frame(input) {
            model.simulate(focus, &mut self.rng)
        } else {
            seeing::pseudo_seeing(&mut self.rng)
        };

        let output_filename = output_filename(operation, input)?;
        tracing::info!(
            "expose_reduce({:?}): seeing {:.3}, brightest {} at ({}, {})",
            input,
            seeing,
            brightest.value,
            brightest.x,
            brightest.y
        );
        Ok(ExposureResult {
            seeing,
            counts: f64::from(brightest.value),
            x_pix: brightest.x as f64,
            y_pix: brightest.y as f64,
            output_filename: Some(output_filename),
            ..ExposureResult::default()
        })
    }

    /// Checkpoint, load, checkpoint.
    fn load_checked(&self, operation: Operation, input: &Path) -> Result<FitsImage> {
        self.checkpoint(operation, input, Checkpoint::BeforeLoad)?;
        let image = self
            .images
            .load(input)
            .map_err(|source| DprtError::ImageLoad {
                operation,
                path: input.to_path_buf(),
                source,
            })?;
        self.checkpoint(operation, input, Checkpoint::AfterLoad)?;
        Ok(image)
    }

    fn checkpoint(&self, operation: Operation, input: &Path, checkpoint: Checkpoint) -> Result<()> {
        if self.abort.get() {
            tracing::warn!("{operation}({:?}): abort requested {checkpoint}", input);
            return Err(DprtError::Aborted {
                operation,
                path: input.to_path_buf(),
                checkpoint,
            });
        }
        Ok(())
    }

    /// Whether a scan should stop after `row`.
    fn row_checkpoint(&self, row: usize) -> bool {
        if let Some(observer) = &self.row_observer {
            observer(row);
        }
        self.abort.get()
    }

    fn focus_model(&self) -> Result<FocusModel> {
        Ok(FocusModel {
            best_focus: self.finite_double(keys::BEST_FOCUS)?,
            fwhm_per_mm: self.finite_double(keys::FWHM_PER_MM)?,
            atmospheric_seeing: self.finite_double(keys::ATMOSPHERIC_SEEING)?,
            atmospheric_variation: self.finite_double(keys::ATMOSPHERIC_VARIATION)?,
        })
    }

    /// A double property; `inf` and `NaN` parse but are rejected.
    fn finite_double(&self, keyword: &str) -> Result<f64> {
        let value = self.properties.get_double(keyword)?;
        if !value.is_finite() {
            return Err(PropertyError::MalformedDouble {
                keyword: keyword.to_string(),
                value: value.to_string(),
            }
            .into());
        }
        Ok(value)
    }
}

fn aborted_mid_scan(operation: Operation, input: &Path, interrupted: Interrupted) -> DprtError {
    tracing::warn!(
        "{operation}({:?}): abort requested after row {}",
        input,
        interrupted.row
    );
    DprtError::Aborted {
        operation,
        path: input.to_path_buf(),
        checkpoint: Checkpoint::MidScan {
            row: interrupted.row,
        },
    }
}

/// The output artifact name: a verbatim copy of the input path.
fn output_filename(operation: Operation, input: &Path) -> Result<String> {
    let source = input.to_string_lossy();
    let mut name = String::new();
    name.try_reserve_exact(source.len() + 1)
        .map_err(|_| DprtError::OutputAlloc {
            operation,
            path: input.to_path_buf(),
        })?;
    name.push_str(&source);
    Ok(name)
}
