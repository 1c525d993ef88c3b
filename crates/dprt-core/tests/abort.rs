//! Abort flag behaviour observed from outside the engine.

mod common;

use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use common::{context, write_frame, FAKE_PROPERTIES};
use dprt_core::{
    AbortSignal, CalibrationResult, Dprt, ExposureResult, FitsImage, FitsReader, ImageError,
    ImageSource,
};

/// Raises the abort flag from inside a property lookup, after the facade
/// has already reset it for the new call.
fn abort_on_fake_lookup(dprt: &mut Dprt) {
    let abort = dprt.abort_handle();
    dprt.engine_mut().properties_mut().bind_bool(move |keyword| {
        if keyword == "dprt.fake" {
            abort.set(true);
        }
        Ok(true)
    });
}

/// Loads normally, then raises the abort flag.
struct AbortingLoader {
    abort: AbortSignal,
    loads: Arc<AtomicUsize>,
}

impl ImageSource for AbortingLoader {
    fn load(&self, path: &Path) -> Result<FitsImage, ImageError> {
        self.loads.fetch_add(1, Ordering::SeqCst);
        let image = FitsReader::new().load(path)?;
        self.abort.set(true);
        Ok(image)
    }
}

fn loading_context(loads: Arc<AtomicUsize>) -> Dprt {
    let abort = AbortSignal::new();
    let loader = AbortingLoader {
        abort: abort.clone(),
        loads,
    };
    Dprt::new(
        common::engine(FAKE_PROPERTIES)
            .with_abort_signal(abort)
            .with_image_source(Box::new(loader)),
    )
}

#[test]
fn abort_before_load_zeroes_calibration() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_frame(dir.path(), "c_b_1.fits", 2, 2, &[1, 2, 3, 4], None);
    let mut dprt = context(FAKE_PROPERTIES);
    abort_on_fake_lookup(&mut dprt);

    let mut result = CalibrationResult {
        mean_counts: 3.0,
        peak_counts: 3.0,
        output_filename: Some("old".into()),
    };
    assert!(!dprt.calibrate_reduce(&path, &mut result));
    assert_eq!(dprt.error_number(), 1);
    assert_eq!(result, CalibrationResult::default());
}

#[test]
fn abort_before_load_on_exposure_never_opens_file() {
    let loads = Arc::new(AtomicUsize::new(0));
    let mut dprt = loading_context(loads.clone());
    abort_on_fake_lookup(&mut dprt);

    let mut result = ExposureResult::default();
    assert!(!dprt.expose_reduce(Path::new("/nonexistent/e.fits"), &mut result));
    assert_eq!(dprt.error_number(), 3);
    assert_eq!(loads.load(Ordering::SeqCst), 0);
}

#[test]
fn abort_after_load_zeroes_exposure() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_frame(dir.path(), "c_e_2.fits", 2, 2, &[1, 2, 3, 4], Some(27.0));
    let loads = Arc::new(AtomicUsize::new(0));
    let mut dprt = loading_context(loads.clone());

    let mut result = ExposureResult {
        seeing: 1.0,
        counts: 1.0,
        ..ExposureResult::default()
    };
    assert!(!dprt.expose_reduce(&path, &mut result));
    assert_eq!(dprt.error_number(), 8);
    assert_eq!(result, ExposureResult::default());
    assert_eq!(loads.load(Ordering::SeqCst), 1);
}

#[test]
fn abort_flag_is_cleared_for_next_call() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_frame(dir.path(), "c_b_3.fits", 2, 2, &[1, 2, 3, 4], None);
    let mut dprt = context(FAKE_PROPERTIES);

    dprt.set_abort(true);
    let mut result = CalibrationResult::default();
    assert!(dprt.calibrate_reduce(&path, &mut result));
    assert_eq!(result.mean_counts, 2.5);
}
