//! Fixtures shared by unit tests.

use std::path::{Path, PathBuf};

use crate::fits::{BLOCK_SIZE, CARD_SIZE};

/// Description of a FITS file to synthesize.
#[derive(Debug, Clone)]
pub struct FitsFixture {
    pub width: usize,
    pub height: usize,
    pub bitpix: i64,
    pub naxis: i64,
    /// `Some(32768.0)` gives the standard unsigned encoding.
    pub bzero: Option<f64>,
    pub telfocus: Option<f64>,
    /// Keywords to leave out of the header.
    pub omit: Vec<&'static str>,
    pub pixels: Vec<u16>,
}

impl FitsFixture {
    pub fn new(width: usize, height: usize, pixels: Vec<u16>) -> Self {
        Self {
            width,
            height,
            bitpix: 16,
            naxis: 2,
            bzero: Some(32768.0),
            telfocus: None,
            omit: Vec::new(),
            pixels,
        }
    }

    pub fn with_focus(mut self, focus: f64) -> Self {
        self.telfocus = Some(focus);
        self
    }
}

fn card(keyword: &str, value: &str) -> String {
    format!("{keyword:<8}= {value:>20}")
}

/// Encode a fixture as FITS bytes.
pub fn fits_bytes(fixture: &FitsFixture) -> Vec<u8> {
    let mut cards = vec![
        ("SIMPLE", "T".to_string()),
        ("BITPIX", fixture.bitpix.to_string()),
        ("NAXIS", fixture.naxis.to_string()),
        ("NAXIS1", fixture.width.to_string()),
        ("NAXIS2", fixture.height.to_string()),
    ];
    if let Some(bzero) = fixture.bzero {
        cards.push(("BSCALE", "1.0".to_string()));
        cards.push(("BZERO", format!("{bzero:.1}")));
    }
    if let Some(focus) = fixture.telfocus {
        cards.push(("TELFOCUS", format!("{focus}")));
    }

    let mut bytes = Vec::new();
    for (keyword, value) in cards {
        if fixture.omit.contains(&keyword) {
            continue;
        }
        bytes.extend(format!("{:<80}", card(keyword, &value)).into_bytes());
    }
    bytes.extend(format!("{:<80}", "END").into_bytes());
    pad(&mut bytes, b' ');
    debug_assert_eq!(bytes.len() % CARD_SIZE, 0);

    let offset = fixture.bzero.unwrap_or(0.0);
    for &p in &fixture.pixels {
        let stored = (f64::from(p) - offset) as i16;
        bytes.extend(stored.to_be_bytes());
    }
    pad(&mut bytes, 0);
    bytes
}

/// Write a fixture to `dir/name` and return the path.
pub fn write_fits(dir: &Path, name: &str, fixture: &FitsFixture) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, fits_bytes(fixture)).unwrap();
    path
}

fn pad(bytes: &mut Vec<u8>, fill: u8) {
    let rem = bytes.len() % BLOCK_SIZE;
    if rem != 0 {
        bytes.resize(bytes.len() + BLOCK_SIZE - rem, fill);
    }
}
