//! Dispersion curves: index of refraction as a function of wavelength.
//!
//! Every analytic curve is a formula family tag plus a fixed-size coefficient
//! array, evaluated by one match per family. The historical fits use
//! micrometres; callers always pass nanometres and the conversion stays in
//! here.

use std::fmt;

use crate::error::{ConfigError, ConfigResult};

/// Maximum number of coefficients an analytic curve can carry.
pub const MAX_COEFFICIENTS: usize = 17;

/// Samples per channel in a tabulated curve.
pub const TABLE_SAMPLES: usize = 64;

/// First tabulated wavelength in nanometres.
pub const TABLE_MIN: f32 = 390.0;

/// Last tabulated wavelength in nanometres.
pub const TABLE_MAX: f32 = 750.0;

/// Floor applied to n² before the square root.
const N_SQUARED_FLOOR: f32 = 1.0e-4;

/// Analytic dispersion formula families.
///
/// Coefficient layouts follow refractiveindex.info:
/// - `Constant`: `[n]`
/// - `Sellmeier`: `[C1, B1, C1', B2, C2', ...]`, `n² = 1 + C1 + Σ Bᵢλ²/(λ² − Cᵢ'²)`
/// - `Sellmeier2`: same layout, `n² = 1 + C1 + Σ Bᵢλ²/(λ² − Cᵢ')`
/// - `Cauchy`: `[C1, C2, C3, ...]`, `n = C1 + Σ C₂ᵢλ^C₂ᵢ₊₁`
/// - `Polyanskiy`: `[C1..C5, C6, C7, ...]`,
///   `n² = C1 + C2λ^C3/(λ² − C4^C5) + Σ C₂ᵢλ^C₂ᵢ₊₁` over the trailing pairs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DispersionFormula {
    Constant,
    Sellmeier,
    Sellmeier2,
    Cauchy,
    Polyanskiy,
}

impl DispersionFormula {
    pub fn name(&self) -> &'static str {
        match self {
            DispersionFormula::Constant => "Constant",
            DispersionFormula::Sellmeier => "Sellmeier",
            DispersionFormula::Sellmeier2 => "Sellmeier2",
            DispersionFormula::Cauchy => "Cauchy",
            DispersionFormula::Polyanskiy => "Polyanskiy",
        }
    }
}

impl fmt::Display for DispersionFormula {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Complex index of refraction `n + ik`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ComplexIor {
    pub n: f32,
    pub k: f32,
}

impl ComplexIor {
    pub fn new(n: f32, k: f32) -> Self {
        Self { n, k }
    }
}

/// Fixed-size coefficient storage.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coefficients {
    values: [f32; MAX_COEFFICIENTS],
    len: usize,
}

impl Coefficients {
    pub fn new(values: &[f32]) -> ConfigResult<Self> {
        if values.len() > MAX_COEFFICIENTS {
            return Err(ConfigError::TooManyCoefficients {
                max: MAX_COEFFICIENTS,
                got: values.len(),
            });
        }
        let mut storage = [0.0; MAX_COEFFICIENTS];
        storage[..values.len()].copy_from_slice(values);
        Ok(Self {
            values: storage,
            len: values.len(),
        })
    }

    /// Store at most [`MAX_COEFFICIENTS`] leading values.
    pub(crate) fn leading(values: &[f32]) -> Self {
        let len = values.len().min(MAX_COEFFICIENTS);
        let mut storage = [0.0; MAX_COEFFICIENTS];
        storage[..len].copy_from_slice(&values[..len]);
        Self {
            values: storage,
            len,
        }
    }

    #[inline]
    pub fn as_slice(&self) -> &[f32] {
        &self.values[..self.len]
    }

    /// Coefficient `i`, zero when absent.
    #[inline]
    fn get(&self, i: usize) -> f32 {
        if i < self.len {
            self.values[i]
        } else {
            0.0
        }
    }
}

/// Tabulated `n` and `k` over [`TABLE_MIN`, `TABLE_MAX`].
#[derive(Debug, Clone, PartialEq)]
pub struct TabulatedIor {
    pub n: [f32; TABLE_SAMPLES],
    pub k: [f32; TABLE_SAMPLES],
}

impl TabulatedIor {
    /// Resample sparse measurements onto the uniform table grid.
    ///
    /// `samples` are `(wavelength_nm, n, k)` sorted by wavelength; grid points
    /// outside the measured span take the nearest measurement.
    pub fn from_measurements(samples: &[(f32, f32, f32)]) -> Self {
        let mut n = [0.0; TABLE_SAMPLES];
        let mut k = [0.0; TABLE_SAMPLES];
        for i in 0..TABLE_SAMPLES {
            let lambda = Self::wavelength_of(i);
            let (ni, ki) = interpolate_measurements(samples, lambda);
            n[i] = ni;
            k[i] = ki;
        }
        Self { n, k }
    }

    /// Wavelength of grid sample `i`.
    pub fn wavelength_of(i: usize) -> f32 {
        TABLE_MIN + (TABLE_MAX - TABLE_MIN) * i as f32 / (TABLE_SAMPLES - 1) as f32
    }

    /// Linear lookup, clamped to the table endpoints.
    pub fn lookup(&self, wavelength_nm: f32) -> ComplexIor {
        let u = ((wavelength_nm - TABLE_MIN) / (TABLE_MAX - TABLE_MIN)).clamp(0.0, 1.0);
        let x = u * (TABLE_SAMPLES - 1) as f32;
        let i = (x.floor() as usize).min(TABLE_SAMPLES - 2);
        let t = x - i as f32;
        ComplexIor {
            n: self.n[i] + t * (self.n[i + 1] - self.n[i]),
            k: self.k[i] + t * (self.k[i + 1] - self.k[i]),
        }
    }
}

fn interpolate_measurements(samples: &[(f32, f32, f32)], lambda: f32) -> (f32, f32) {
    let Some(&(first_l, first_n, first_k)) = samples.first() else {
        return (1.0, 0.0);
    };
    if lambda <= first_l {
        return (first_n, first_k);
    }
    for pair in samples.windows(2) {
        let (l0, n0, k0) = pair[0];
        let (l1, n1, k1) = pair[1];
        if lambda <= l1 {
            let t = (lambda - l0) / (l1 - l0);
            return (n0 + t * (n1 - n0), k0 + t * (k1 - k0));
        }
    }
    let &(_, last_n, last_k) = samples.last().unwrap_or(&(0.0, first_n, first_k));
    (last_n, last_k)
}

/// Wavelength-dependent index of refraction.
#[derive(Debug, Clone, PartialEq)]
pub enum DispersionCurve {
    Analytic {
        formula: DispersionFormula,
        coefficients: Coefficients,
    },
    Tabulated(Box<TabulatedIor>),
}

impl DispersionCurve {
    /// A wavelength-independent index.
    pub fn constant(ior: f32) -> Self {
        DispersionCurve::Analytic {
            formula: DispersionFormula::Constant,
            coefficients: Coefficients::leading(&[ior]),
        }
    }

    pub fn analytic(formula: DispersionFormula, coefficients: &[f32]) -> ConfigResult<Self> {
        Ok(DispersionCurve::Analytic {
            formula,
            coefficients: Coefficients::new(coefficients)?,
        })
    }

    pub fn tabulated(table: TabulatedIor) -> Self {
        DispersionCurve::Tabulated(Box::new(table))
    }

    /// Real index of refraction at a wavelength in nanometres.
    pub fn ior_at(&self, wavelength_nm: f32) -> f32 {
        self.complex_ior_at(wavelength_nm).n
    }

    /// Complex index `(n, k)`. Analytic curves are lossless (`k = 0`).
    pub fn complex_ior_at(&self, wavelength_nm: f32) -> ComplexIor {
        match self {
            DispersionCurve::Analytic {
                formula,
                coefficients,
            } => ComplexIor::new(eval_formula(*formula, coefficients, wavelength_nm), 0.0),
            DispersionCurve::Tabulated(table) => table.lookup(wavelength_nm),
        }
    }

    /// Formula family, or `None` for tabulated data.
    pub fn formula(&self) -> Option<DispersionFormula> {
        match self {
            DispersionCurve::Analytic { formula, .. } => Some(*formula),
            DispersionCurve::Tabulated(_) => None,
        }
    }

    /// Coefficients of an analytic curve; empty for tabulated data.
    pub fn coefficients(&self) -> &[f32] {
        match self {
            DispersionCurve::Analytic { coefficients, .. } => coefficients.as_slice(),
            DispersionCurve::Tabulated(_) => &[],
        }
    }
}

fn eval_formula(formula: DispersionFormula, c: &Coefficients, wavelength_nm: f32) -> f32 {
    let lambda = wavelength_nm * 1.0e-3;
    let l2 = lambda * lambda;
    match formula {
        DispersionFormula::Constant => c.get(0),
        DispersionFormula::Sellmeier | DispersionFormula::Sellmeier2 => {
            let squared_poles = formula == DispersionFormula::Sellmeier;
            let mut n2 = 1.0 + c.get(0);
            for pair in c.as_slice().get(1..).unwrap_or(&[]).chunks_exact(2) {
                let pole = if squared_poles { pair[1] * pair[1] } else { pair[1] };
                n2 += pair[0] * l2 / (l2 - pole);
            }
            n2.max(N_SQUARED_FLOOR).sqrt()
        }
        DispersionFormula::Cauchy => {
            let mut n = c.get(0);
            for pair in c.as_slice().get(1..).unwrap_or(&[]).chunks_exact(2) {
                n += pair[0] * lambda.powf(pair[1]);
            }
            n
        }
        DispersionFormula::Polyanskiy => {
            let mut n2 =
                c.get(0) + c.get(1) * lambda.powf(c.get(2)) / (l2 - c.get(3).powf(c.get(4)));
            for pair in c.as_slice().get(5..).unwrap_or(&[]).chunks_exact(2) {
                n2 += pair[0] * lambda.powf(pair[1]);
            }
            n2.max(N_SQUARED_FLOOR).sqrt()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constant_ignores_wavelength() {
        let curve = DispersionCurve::constant(1.33);
        assert_eq!(curve.ior_at(400.0), 1.33);
        assert_eq!(curve.ior_at(700.0), 1.33);
        assert_eq!(curve.complex_ior_at(500.0).k, 0.0);
    }

    #[test]
    fn test_sellmeier_fused_silica() {
        // Malitson 1965, squared-pole layout
        let curve = DispersionCurve::analytic(
            DispersionFormula::Sellmeier,
            &[0.0, 0.696_166_3, 0.068_404_3, 0.407_942_6, 0.116_241_4, 0.897_479_4, 9.896_161],
        )
        .unwrap();
        assert!((curve.ior_at(587.6) - 1.4585).abs() < 1e-3);
        // Normal dispersion: blue bends more than red
        assert!(curve.ior_at(400.0) > curve.ior_at(700.0));
    }

    #[test]
    fn test_sellmeier2_unsquared_poles() {
        // Schott N-BK7, pole coefficients already in µm²
        let curve = DispersionCurve::analytic(
            DispersionFormula::Sellmeier2,
            &[
                0.0,
                1.039_612_1,
                0.006_000_699,
                0.231_792_34,
                0.020_017_914,
                1.010_469_4,
                103.560_65,
            ],
        )
        .unwrap();
        assert!((curve.ior_at(587.6) - 1.5168).abs() < 1e-3);
    }

    #[test]
    fn test_cauchy_power_terms() {
        let curve =
            DispersionCurve::analytic(DispersionFormula::Cauchy, &[1.5, 0.01, -2.0]).unwrap();
        let expected = 1.5 + 0.01 / (0.5 * 0.5);
        assert!((curve.ior_at(500.0) - expected).abs() < 1e-5);
    }

    #[test]
    fn test_polyanskiy_rutile() {
        let curve = DispersionCurve::analytic(
            DispersionFormula::Polyanskiy,
            &[5.913, 0.2441, 0.0, 0.0803, 1.0],
        )
        .unwrap();
        let l2: f32 = 0.55 * 0.55;
        let expected = (5.913 + 0.2441 / (l2 - 0.0803)).sqrt();
        assert!((curve.ior_at(550.0) - expected).abs() < 1e-4);
    }

    #[test]
    fn test_polyanskiy_trailing_power_terms() {
        let curve = DispersionCurve::analytic(
            DispersionFormula::Polyanskiy,
            &[7.483, 0.474, 0.0, 0.09, 1.0, -0.0019, 2.0],
        )
        .unwrap();
        for lambda_um in [0.45_f32, 0.6, 0.7] {
            let l2 = lambda_um * lambda_um;
            let expected = (7.483 + 0.474 / (l2 - 0.09) - 0.0019 * l2).sqrt();
            assert!((curve.ior_at(lambda_um * 1.0e3) - expected).abs() < 1e-4);
        }
    }

    #[test]
    fn test_negative_n_squared_is_floored() {
        // A pole just above the evaluated wavelength drives n² negative
        let curve =
            DispersionCurve::analytic(DispersionFormula::Sellmeier2, &[-1.0, 1.0, 0.2]).unwrap();
        let n = curve.ior_at(440.0);
        assert!(n.is_finite());
        assert!(n > 0.0);
    }

    #[test]
    fn test_too_many_coefficients() {
        let coefficients = [1.0; MAX_COEFFICIENTS + 1];
        let result = DispersionCurve::analytic(DispersionFormula::Cauchy, &coefficients);
        assert!(matches!(
            result,
            Err(ConfigError::TooManyCoefficients { got: 18, .. })
        ));
    }

    #[test]
    fn test_tabulated_clamps_and_interpolates() {
        let table = TabulatedIor::from_measurements(&[(400.0, 1.0, 2.0), (700.0, 2.0, 5.0)]);
        let curve = DispersionCurve::tabulated(table);

        assert_eq!(curve.complex_ior_at(300.0), curve.complex_ior_at(390.0));
        assert_eq!(curve.complex_ior_at(900.0), curve.complex_ior_at(750.0));
        let mid = curve.complex_ior_at(550.0);
        assert!((mid.n - 1.5).abs() < 1e-3);
        assert!((mid.k - 3.5).abs() < 1e-3);
        assert!(curve.coefficients().is_empty());
        assert_eq!(curve.formula(), None);
    }
}
