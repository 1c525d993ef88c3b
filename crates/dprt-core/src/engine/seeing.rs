//! Simulated seeing for fake exposure reductions.
//!
//! Nothing here is a measurement. Focus-run frames get a defocus parabola
//! plus random atmospheric noise; any other frame gets a random value in a
//! fixed range.

use std::path::Path;

use rand::Rng;

/// Substring in a file name marking a telescope focus-run exposure.
pub const FOCUS_MARKER: &str = "telFocus";
/// Lower bound (inclusive) of seeing for non focus-run frames (arcsec).
pub const SIMULATED_SEEING_MIN: f64 = 0.5;
/// Upper bound (exclusive) of seeing for non focus-run frames (arcsec).
pub const SIMULATED_SEEING_MAX: f64 = 1.5;

/// Property-supplied parameters of the focus model.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FocusModel {
    pub best_focus: f64,
    pub fwhm_per_mm: f64,
    pub atmospheric_seeing: f64,
    pub atmospheric_variation: f64,
}

impl FocusModel {
    /// Seeing at `focus`, without the random term.
    pub fn defocused_seeing(&self, focus: f64) -> f64 {
        let defocus = focus - self.best_focus;
        defocus * defocus * (self.fwhm_per_mm - self.atmospheric_seeing) + self.atmospheric_seeing
    }

    /// Seeing at `focus` plus noise drawn from `[0, atmospheric_variation]`.
    pub fn simulate<R: Rng + ?Sized>(&self, focus: f64, rng: &mut R) -> f64 {
        let noise = if self.atmospheric_variation > 0.0 {
            rng.gen_range(0.0..=self.atmospheric_variation)
        } else {
            0.0
        };
        self.defocused_seeing(focus) + noise
    }
}

/// Whether the file name marks a focus-run exposure.
pub fn is_focus_frame(path: &Path) -> bool {
    path.file_name()
        .map(|name| name.to_string_lossy().contains(FOCUS_MARKER))
        .unwrap_or(false)
}

/// Stand-in seeing for frames that are not part of a focus run.
pub fn pseudo_seeing<R: Rng + ?Sized>(rng: &mut R) -> f64 {
    rng.gen_range(SIMULATED_SEEING_MIN..SIMULATED_SEEING_MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn model(variation: f64) -> FocusModel {
        FocusModel {
            best_focus: 27.0,
            fwhm_per_mm: 3.0,
            atmospheric_seeing: 1.0,
            atmospheric_variation: variation,
        }
    }

    #[test]
    fn test_best_focus_gives_atmospheric_seeing() {
        assert_eq!(model(0.0).defocused_seeing(27.0), 1.0);
    }

    #[test]
    fn test_defocus_is_quadratic() {
        // 0.5 mm out: 0.25 * (3.0 - 1.0) + 1.0
        assert!((model(0.0).defocused_seeing(27.5) - 1.5).abs() < 1e-12);
        assert!((model(0.0).defocused_seeing(26.5) - 1.5).abs() < 1e-12);
        assert!((model(0.0).defocused_seeing(29.0) - 9.0).abs() < 1e-12);
    }

    #[test]
    fn test_noise_bounded_by_variation() {
        let mut rng = StdRng::seed_from_u64(7);
        let m = model(0.3);
        for _ in 0..1000 {
            let seeing = m.simulate(27.0, &mut rng);
            assert!((1.0..=1.3).contains(&seeing), "seeing {seeing}");
        }
    }

    #[test]
    fn test_zero_or_negative_variation_adds_no_noise() {
        let mut rng = StdRng::seed_from_u64(7);
        assert_eq!(model(0.0).simulate(27.0, &mut rng), 1.0);
        assert_eq!(model(-1.0).simulate(27.0, &mut rng), 1.0);
    }

    #[test]
    fn test_pseudo_seeing_range() {
        let mut rng = StdRng::seed_from_u64(42);
        for _ in 0..1000 {
            let seeing = pseudo_seeing(&mut rng);
            assert!((SIMULATED_SEEING_MIN..SIMULATED_SEEING_MAX).contains(&seeing));
        }
    }

    #[test]
    fn test_focus_marker_in_file_name_only() {
        assert!(is_focus_frame(Path::new("/data/c_e_20240101_telFocus_1_0.fits")));
        assert!(!is_focus_frame(Path::new("/telFocus/c_e_20240101_1_0.fits")));
        assert!(!is_focus_frame(Path::new("/data/c_e_20240101_telfocus.fits")));
    }
}
