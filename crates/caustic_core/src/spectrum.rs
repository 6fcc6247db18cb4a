//! Spectral constants and conversions.
//!
//! Wavelengths are in nanometres everywhere in the public API. The visible
//! range rendered by Caustic is [`LAMBDA_MIN`, `LAMBDA_MAX`].

use std::sync::LazyLock;

use caustic_math::Vec3;
use serde::{Deserialize, Serialize};

pub const LAMBDA_MIN: f32 = 360.0;
pub const LAMBDA_MAX: f32 = 750.0;

/// Width of the rendered wavelength range in nanometres.
pub const LAMBDA_RANGE: f32 = LAMBDA_MAX - LAMBDA_MIN;

/// Second radiation constant hc/k in micrometre-kelvin.
const PLANCK_C2: f32 = 1.438_777e4;

/// Number of entries in the wavelength to RGB lookup table.
pub const RGB_TABLE_SIZE: usize = 256;

/// Planck spectral radiance, up to a constant factor.
///
/// `L(λ,T) = 1 / (λ⁵ (exp(hc/λkT) − 1))` with λ in micrometres, which keeps
/// values in a comfortable f32 range for visible wavelengths.
pub fn blackbody(wavelength_nm: f32, temperature: f32) -> f32 {
    let lambda = wavelength_nm * 1.0e-3;
    let x = PLANCK_C2 / (lambda * temperature.max(1.0));
    if x > 80.0 {
        return 0.0;
    }
    1.0 / (lambda.powi(5) * x.exp_m1())
}

/// Mean of a spectral function over the rendered range.
pub fn spectral_mean(f: impl Fn(f32) -> f32) -> f32 {
    const STEPS: usize = 128;
    let sum: f32 = (0..STEPS)
        .map(|i| f(LAMBDA_MIN + LAMBDA_RANGE * (i as f32 + 0.5) / STEPS as f32))
        .sum();
    sum / STEPS as f32
}

/// Relative spectral power distribution of the emitter.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EmissionSpectrum {
    /// Equal energy at every wavelength.
    Flat,
    /// Planckian emitter at the given temperature in kelvin.
    Blackbody { temperature: f32 },
    /// Narrow band centred on a wavelength in nanometres.
    Monochromatic { wavelength: f32 },
}

impl Default for EmissionSpectrum {
    fn default() -> Self {
        EmissionSpectrum::Blackbody { temperature: 6500.0 }
    }
}

impl EmissionSpectrum {
    /// Relative power at a wavelength (unnormalized).
    pub fn eval(&self, wavelength_nm: f32) -> f32 {
        match *self {
            EmissionSpectrum::Flat => 1.0,
            EmissionSpectrum::Blackbody { temperature } => blackbody(wavelength_nm, temperature),
            EmissionSpectrum::Monochromatic { wavelength } => {
                let sigma = 2.0;
                let d = (wavelength_nm - wavelength) / sigma;
                (-0.5 * d * d).exp()
            }
        }
    }
}

/// Piecewise Gaussian used by the analytic colour matching fit.
fn lobe(lambda: f32, mu: f32, sigma_lo: f32, sigma_hi: f32) -> f32 {
    let sigma = if lambda < mu { sigma_lo } else { sigma_hi };
    let t = (lambda - mu) / sigma;
    (-0.5 * t * t).exp()
}

/// CIE 1931 colour matching functions, multi-lobe fit of Wyman, Sloan and
/// Shirley (2013).
pub fn cie_xyz(lambda: f32) -> Vec3 {
    let x = 1.056 * lobe(lambda, 599.8, 37.9, 31.0) + 0.362 * lobe(lambda, 442.0, 16.0, 26.7)
        - 0.065 * lobe(lambda, 501.1, 20.4, 26.2);
    let y = 0.821 * lobe(lambda, 568.8, 46.9, 40.5) + 0.286 * lobe(lambda, 530.9, 16.3, 31.1);
    let z = 1.217 * lobe(lambda, 437.0, 11.8, 36.0) + 0.681 * lobe(lambda, 459.0, 26.0, 13.8);
    Vec3::new(x, y, z)
}

/// CIE XYZ to linear sRGB (D65).
pub fn xyz_to_linear_srgb(xyz: Vec3) -> Vec3 {
    Vec3::new(
        3.240_454 * xyz.x - 1.537_138 * xyz.y - 0.498_531 * xyz.z,
        -0.969_266 * xyz.x + 1.876_011 * xyz.y + 0.041_556 * xyz.z,
        0.055_643 * xyz.x - 0.204_026 * xyz.y + 1.057_225 * xyz.z,
    )
}

/// Wavelength to linear RGB lookup table.
///
/// Each channel is scaled so that the mean over the rendered range is one:
/// a flat unit spectrum integrates to white `(1, 1, 1)`.
#[derive(Debug, Clone)]
pub struct RgbTable {
    entries: Vec<Vec3>,
}

impl RgbTable {
    pub fn new() -> Self {
        let raw: Vec<Vec3> = (0..RGB_TABLE_SIZE)
            .map(|i| {
                let lambda = LAMBDA_MIN + LAMBDA_RANGE * i as f32 / (RGB_TABLE_SIZE - 1) as f32;
                xyz_to_linear_srgb(cie_xyz(lambda))
            })
            .collect();

        // Trapezoidal mean so the normalization matches linear lookup.
        let mut sum = Vec3::ZERO;
        for pair in raw.windows(2) {
            sum += 0.5 * (pair[0] + pair[1]);
        }
        let mean = sum / (RGB_TABLE_SIZE - 1) as f32;
        let entries = raw.into_iter().map(|c| c / mean).collect();

        Self { entries }
    }

    /// Linear RGB weight of a wavelength. Outside the range returns black.
    pub fn rgb_at(&self, wavelength_nm: f32) -> Vec3 {
        if !(LAMBDA_MIN..=LAMBDA_MAX).contains(&wavelength_nm) {
            return Vec3::ZERO;
        }
        let x = (wavelength_nm - LAMBDA_MIN) / LAMBDA_RANGE * (RGB_TABLE_SIZE - 1) as f32;
        let i = (x.floor() as usize).min(RGB_TABLE_SIZE - 2);
        let t = x - i as f32;
        self.entries[i].lerp(self.entries[i + 1], t)
    }

    /// Per-wavelength reflectance of an RGB colour.
    ///
    /// Blends the colour channels by the positive lobes of the table at this
    /// wavelength. Grey colours map to the same constant at every wavelength.
    pub fn uplift(&self, rgb: Vec3, wavelength_nm: f32) -> f32 {
        let w = self.rgb_at(wavelength_nm).max(Vec3::ZERO);
        let total = w.x + w.y + w.z;
        let value = if total < 1.0e-6 {
            (rgb.x + rgb.y + rgb.z) / 3.0
        } else {
            rgb.dot(w) / total
        };
        value.clamp(0.0, 1.0)
    }
}

impl Default for RgbTable {
    fn default() -> Self {
        Self::new()
    }
}

/// Shared wavelength to RGB table.
pub static RGB_TABLE: LazyLock<RgbTable> = LazyLock::new(RgbTable::new);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blackbody_peak_shifts_with_temperature() {
        // Hot emitters are bluer: relative blue/red ratio grows with T
        let ratio = |t: f32| blackbody(450.0, t) / blackbody(650.0, t);
        assert!(ratio(9000.0) > ratio(3000.0));
        assert!(blackbody(550.0, 5000.0) > 0.0);
    }

    #[test]
    fn test_flat_spectrum_is_white() {
        let table = RgbTable::new();
        let white = {
            let mut sum = Vec3::ZERO;
            let steps = 4096;
            for i in 0..steps {
                let lambda = LAMBDA_MIN + LAMBDA_RANGE * (i as f32 + 0.5) / steps as f32;
                sum += table.rgb_at(lambda);
            }
            sum / steps as f32
        };
        assert!((white - Vec3::ONE).abs().max_element() < 0.01, "white = {white}");
    }

    #[test]
    fn test_rgb_table_hues() {
        let table = RgbTable::new();
        let red = table.rgb_at(650.0);
        let blue = table.rgb_at(450.0);
        assert!(red.x > red.z);
        assert!(blue.z > blue.x);
        assert_eq!(table.rgb_at(800.0), Vec3::ZERO);
    }

    #[test]
    fn test_uplift_grey_is_constant() {
        let table = RgbTable::new();
        for lambda in [380.0, 450.0, 550.0, 620.0, 740.0] {
            let r = table.uplift(Vec3::splat(0.4), lambda);
            assert!((r - 0.4).abs() < 1e-5);
        }
        // A red colour reflects long wavelengths more than short ones
        let red = Vec3::new(0.9, 0.1, 0.1);
        assert!(table.uplift(red, 650.0) > table.uplift(red, 450.0));
    }

    #[test]
    fn test_monochromatic_emission() {
        let spectrum = EmissionSpectrum::Monochromatic { wavelength: 532.0 };
        assert_eq!(spectrum.eval(532.0), 1.0);
        assert!(spectrum.eval(560.0) < 1.0e-6);
    }
}
