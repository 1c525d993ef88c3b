//! FITS image loading.
//!
//! Only the primary HDU of a 2-D, 16-bit image is supported. The header is
//! validated (BITPIX, NAXIS, axis lengths) before any pixel data is read, and
//! samples are scaled with BSCALE/BZERO into unsigned 16-bit values. The
//! loader never looks at the abort flag; callers check it before and after.

mod header;

pub use header::{FitsHeader, BLOCK_SIZE, CARD_SIZE};

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use crate::error::ImageError;

/// The only accepted pixel depth.
pub const REQUIRED_BITPIX: i64 = 16;
/// The only accepted axis count.
pub const REQUIRED_NAXIS: i64 = 2;
/// Header keyword holding the telescope focus (mm).
pub const TELFOCUS: &str = "TELFOCUS";

/// Something that can load an image for reduction.
pub trait ImageSource: Send + Sync {
    fn load(&self, path: &Path) -> Result<FitsImage, ImageError>;
}

/// Default [`ImageSource`] reading FITS files from disk.
#[derive(Debug, Clone, Copy, Default)]
pub struct FitsReader;

impl FitsReader {
    pub fn new() -> Self {
        Self
    }

    /// Read and validate an image from any byte stream.
    pub fn read<R: Read>(reader: &mut R) -> Result<FitsImage, ImageError> {
        Self::read_bounded(reader, None)
    }

    /// Like [`FitsReader::read`], but when the stream length is known a
    /// header promising more pixel data than the stream holds is rejected
    /// before any pixel buffer is allocated.
    pub fn read_bounded<R: Read>(
        reader: &mut R,
        stream_len: Option<u64>,
    ) -> Result<FitsImage, ImageError> {
        let (header, header_len) = FitsHeader::read_from(reader)?;

        let bitpix = header.get_int("BITPIX")?;
        if bitpix != REQUIRED_BITPIX {
            return Err(ImageError::WrongBitpix {
                found: bitpix,
                expected: REQUIRED_BITPIX,
            });
        }
        let naxis = header.get_int("NAXIS")?;
        if naxis != REQUIRED_NAXIS {
            return Err(ImageError::WrongNaxis {
                found: naxis,
                expected: REQUIRED_NAXIS,
            });
        }
        let width = axis_length(&header, "NAXIS1")?;
        let height = axis_length(&header, "NAXIS2")?;
        let bscale = header.get_f64_or("BSCALE", 1.0)?;
        let bzero = header.get_f64_or("BZERO", 0.0)?;

        let alloc_err = || ImageError::Alloc { width, height };
        let count = width.checked_mul(height).ok_or_else(alloc_err)?;
        let byte_count = count.checked_mul(2).ok_or_else(alloc_err)?;

        if let Some(len) = stream_len {
            let available = len.saturating_sub(header_len);
            if available < byte_count as u64 {
                return Err(ImageError::Read {
                    message: format!(
                        "{width}x{height} pixel data needs {byte_count} bytes, file has {available} after the header"
                    ),
                });
            }
        }

        let mut raw: Vec<u8> = Vec::new();
        raw.try_reserve_exact(byte_count).map_err(|_| alloc_err())?;
        raw.resize(byte_count, 0);
        let mut pixels: Vec<u16> = Vec::new();
        pixels.try_reserve_exact(count).map_err(|_| alloc_err())?;

        reader.read_exact(&mut raw).map_err(|e| ImageError::Read {
            message: format!("pixel data ({count} samples expected): {e}"),
        })?;

        for (i, chunk) in raw.chunks_exact(2).enumerate() {
            let stored = i16::from_be_bytes([chunk[0], chunk[1]]);
            let value = f64::from(stored) * bscale + bzero;
            if !(0.0..=f64::from(u16::MAX)).contains(&value) {
                return Err(ImageError::Read {
                    message: format!(
                        "sample {i} scales to {value}, outside the unsigned 16-bit range"
                    ),
                });
            }
            pixels.push(value.round() as u16);
        }

        Ok(FitsImage {
            header,
            width,
            height,
            pixels,
        })
    }
}

impl ImageSource for FitsReader {
    fn load(&self, path: &Path) -> Result<FitsImage, ImageError> {
        let file = File::open(path).map_err(|source| ImageError::Open {
            path: path.to_path_buf(),
            source,
        })?;
        let stream_len = file.metadata().ok().map(|m| m.len());
        let mut reader = BufReader::new(file);
        let image = Self::read_bounded(&mut reader, stream_len)?;
        tracing::trace!(
            "Loaded {:?}: {}x{} ({} header cards)",
            path,
            image.width,
            image.height,
            image.header.len()
        );
        Ok(image)
    }
}

fn axis_length(header: &FitsHeader, keyword: &str) -> Result<usize, ImageError> {
    let length = header.get_int(keyword)?;
    usize::try_from(length)
        .ok()
        .filter(|&n| n > 0)
        .ok_or_else(|| ImageError::MalformedHeader {
            keyword: keyword.to_string(),
            value: length.to_string(),
        })
}

/// A loaded 2-D image of unsigned 16-bit samples, stored row-major.
#[derive(Debug, Clone, PartialEq)]
pub struct FitsImage {
    header: FitsHeader,
    width: usize,
    height: usize,
    pixels: Vec<u16>,
}

impl FitsImage {
    /// Build an image in memory. Both axes must be non-empty and
    /// `pixels.len()` must equal `width * height`.
    pub fn new(
        header: FitsHeader,
        width: usize,
        height: usize,
        pixels: Vec<u16>,
    ) -> Result<Self, ImageError> {
        if width == 0 || height == 0 || width.checked_mul(height) != Some(pixels.len()) {
            return Err(ImageError::Read {
                message: format!(
                    "{} samples do not fill a {width}x{height} image",
                    pixels.len()
                ),
            });
        }
        Ok(Self {
            header,
            width,
            height,
            pixels,
        })
    }

    /// Number of columns (NAXIS1).
    pub fn width(&self) -> usize {
        self.width
    }

    /// Number of rows (NAXIS2).
    pub fn height(&self) -> usize {
        self.height
    }

    pub fn pixels(&self) -> &[u16] {
        &self.pixels
    }

    /// Rows in storage order.
    pub fn rows(&self) -> std::slice::ChunksExact<'_, u16> {
        self.pixels.chunks_exact(self.width)
    }

    /// Sample at column `x`, row `y`.
    pub fn pixel(&self, x: usize, y: usize) -> Option<u16> {
        if x >= self.width {
            return None;
        }
        self.pixels.get(y * self.width + x).copied()
    }

    pub fn header(&self) -> &FitsHeader {
        &self.header
    }

    /// Telescope focus recorded in the header.
    pub fn telescope_focus(&self) -> Result<f64, ImageError> {
        self.header.get_f64(TELFOCUS)
    }
}
