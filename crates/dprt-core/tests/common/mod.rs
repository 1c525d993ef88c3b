//! Shared fixtures for integration tests.

#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::sync::Arc;

use dprt_core::{Dprt, FileProperties, PropertyBindings, ReductionEngine};

pub const FAKE_PROPERTIES: &str = "\
# fake reduction
dprt.fake=true
dprt.full_reduction=false
dprt.make_master_bias=false
dprt.make_master_flat=false
dprt.fake.best_focus=27.0
dprt.fake.fwhm_per_mm=3.0
dprt.fake.atmospheric_seeing=0.8
dprt.fake.atmospheric_variation=0.1
";

/// Write a 16-bit, 2-axis FITS frame using the unsigned BZERO convention.
pub fn write_frame(
    dir: &Path,
    name: &str,
    width: usize,
    height: usize,
    pixels: &[u16],
    focus: Option<f64>,
) -> PathBuf {
    write_raw(dir, name, 16, 2, width, height, pixels, focus)
}

/// Write a frame with arbitrary BITPIX/NAXIS header values.
#[allow(clippy::too_many_arguments)]
pub fn write_raw(
    dir: &Path,
    name: &str,
    bitpix: i64,
    naxis: i64,
    width: usize,
    height: usize,
    pixels: &[u16],
    focus: Option<f64>,
) -> PathBuf {
    let mut header = vec![
        card("SIMPLE", "T"),
        card("BITPIX", &bitpix.to_string()),
        card("NAXIS", &naxis.to_string()),
        card("NAXIS1", &width.to_string()),
        card("NAXIS2", &height.to_string()),
        card("BSCALE", "1.0"),
        card("BZERO", "32768.0"),
    ];
    if let Some(focus) = focus {
        header.push(card("TELFOCUS", &format!("{focus:.3}")));
    }
    header.push(format!("{:<80}", "END"));

    let mut bytes: Vec<u8> = header.concat().into_bytes();
    pad(&mut bytes, b' ');
    for &p in pixels {
        bytes.extend(((i32::from(p) - 32768) as i16).to_be_bytes());
    }
    pad(&mut bytes, 0);

    let path = dir.join(name);
    std::fs::write(&path, bytes).unwrap();
    path
}

fn card(keyword: &str, value: &str) -> String {
    format!("{:<80}", format!("{keyword:<8}= {value:>20}"))
}

fn pad(bytes: &mut Vec<u8>, fill: u8) {
    let rem = bytes.len() % 2880;
    if rem != 0 {
        bytes.resize(bytes.len() + 2880 - rem, fill);
    }
}

/// A context over in-memory properties.
pub fn context(properties: &str) -> Dprt {
    Dprt::new(engine(properties))
}

pub fn engine(properties: &str) -> ReductionEngine {
    ReductionEngine::new(PropertyBindings::from_source(Arc::new(
        FileProperties::parse(properties),
    )))
}
