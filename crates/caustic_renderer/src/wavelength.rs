//! Hero wavelength sampling.

use caustic_core::spectrum::LAMBDA_RANGE;
use caustic_core::{EmissionSpectrum, LAMBDA_MAX, LAMBDA_MIN};

/// Number of bins in the inverse CDF table.
pub const WAVELENGTH_BINS: usize = 1024;

/// Share of samples drawn uniformly, so wavelengths the emitter lacks can
/// still carry environment light.
const UNIFORM_MIX: f32 = 0.05;

/// A wavelength in nanometres and the density it was drawn with (per nm).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WavelengthSample {
    pub wavelength: f32,
    pub pdf: f32,
}

/// Piecewise-constant importance sampler proportional to the emitter spectrum.
#[derive(Debug, Clone)]
pub struct WavelengthSampler {
    /// `WAVELENGTH_BINS + 1` monotonic entries from 0 to 1
    cdf: Vec<f32>,
    /// Density per nm of each bin
    density: Vec<f32>,
    /// Mean relative power of the spectrum over the rendered range
    emission_mean: f32,
}

impl WavelengthSampler {
    pub fn new(spectrum: &EmissionSpectrum) -> Self {
        let bin_width = LAMBDA_RANGE / WAVELENGTH_BINS as f32;
        let power: Vec<f32> = (0..WAVELENGTH_BINS)
            .map(|i| spectrum.eval(LAMBDA_MIN + (i as f32 + 0.5) * bin_width).max(0.0))
            .collect();
        let total: f32 = power.iter().sum();
        let emission_mean = total / WAVELENGTH_BINS as f32;

        let uniform = 1.0 / WAVELENGTH_BINS as f32;
        let weights: Vec<f32> = if total > 0.0 {
            power
                .iter()
                .map(|p| (1.0 - UNIFORM_MIX) * p / total + UNIFORM_MIX * uniform)
                .collect()
        } else {
            vec![uniform; WAVELENGTH_BINS]
        };

        let mut cdf = Vec::with_capacity(WAVELENGTH_BINS + 1);
        cdf.push(0.0);
        let mut running = 0.0;
        for w in &weights {
            running += w;
            cdf.push(running);
        }
        // Remove accumulated rounding so the last entry is exactly one
        for c in cdf.iter_mut() {
            *c /= running;
        }
        let density = weights.iter().map(|w| w / running / bin_width).collect();

        log::debug!(
            "Wavelength sampler: {} bins, emission mean {:.4e}",
            WAVELENGTH_BINS,
            emission_mean
        );

        Self {
            cdf,
            density,
            emission_mean,
        }
    }

    /// Inverse CDF lookup for `u` in [0, 1).
    pub fn sample(&self, u: f32) -> WavelengthSample {
        let u = u.clamp(0.0, 1.0);
        let bin = self
            .cdf
            .partition_point(|&c| c <= u)
            .saturating_sub(1)
            .min(WAVELENGTH_BINS - 1);
        let lo = self.cdf[bin];
        let hi = self.cdf[bin + 1];
        let t = if hi > lo { (u - lo) / (hi - lo) } else { 0.5 };
        let bin_width = LAMBDA_RANGE / WAVELENGTH_BINS as f32;
        let wavelength = (LAMBDA_MIN + (bin as f32 + t) * bin_width).clamp(LAMBDA_MIN, LAMBDA_MAX);
        WavelengthSample {
            wavelength,
            pdf: self.density[bin],
        }
    }

    /// Density (per nm) of drawing `wavelength`.
    pub fn pdf(&self, wavelength: f32) -> f32 {
        if !(LAMBDA_MIN..=LAMBDA_MAX).contains(&wavelength) {
            return 0.0;
        }
        let x = (wavelength - LAMBDA_MIN) / LAMBDA_RANGE * WAVELENGTH_BINS as f32;
        self.density[(x as usize).min(WAVELENGTH_BINS - 1)]
    }

    /// Mean of the unnormalized emission spectrum, used to normalize emitter radiance.
    #[inline]
    pub fn emission_mean(&self) -> f32 {
        self.emission_mean
    }
}
