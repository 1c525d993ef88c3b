//! Row-major pixel scans with an abort checkpoint after every row.

use crate::fits::FitsImage;

/// Mean and peak of a calibration frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameStats {
    pub mean: f64,
    pub peak: u16,
}

/// The brightest sample and where it is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BrightestPixel {
    pub value: u16,
    pub x: usize,
    pub y: usize,
}

/// A scan stopped because the checkpoint asked it to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Interrupted {
    /// Index of the row completed just before the abort was seen.
    pub row: usize,
}

/// Sum and maximum over every sample.
///
/// `should_abort` is called with the row index after each completed row;
/// returning true discards the partial sum.
pub fn frame_stats<F>(image: &FitsImage, mut should_abort: F) -> Result<FrameStats, Interrupted>
where
    F: FnMut(usize) -> bool,
{
    let mut sum = 0.0f64;
    let mut peak = 0u16;
    for (row, samples) in image.rows().enumerate() {
        for &value in samples {
            sum += f64::from(value);
            peak = peak.max(value);
        }
        if should_abort(row) {
            return Err(Interrupted { row });
        }
    }
    let count = image.width() * image.height();
    Ok(FrameStats {
        mean: sum / count as f64,
        peak,
    })
}

/// Locate the brightest sample. Ties keep the first one seen.
pub fn brightest_pixel<F>(
    image: &FitsImage,
    mut should_abort: F,
) -> Result<BrightestPixel, Interrupted>
where
    F: FnMut(usize) -> bool,
{
    let mut best = BrightestPixel {
        value: image.pixels().first().copied().unwrap_or(0),
        x: 0,
        y: 0,
    };
    for (y, samples) in image.rows().enumerate() {
        for (x, &value) in samples.iter().enumerate() {
            if value > best.value {
                best = BrightestPixel { value, x, y };
            }
        }
        if should_abort(y) {
            return Err(Interrupted { row: y });
        }
    }
    Ok(best)
}
