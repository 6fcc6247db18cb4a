//! Named physical material presets.
//!
//! Dielectric coefficient sets come from the refractiveindex.info catalogue
//! (Schott datasheets for the glasses). Metal data are measured `(n, k)`
//! values at 50 nm spacing, resampled onto the 64-entry table grid.

use crate::dispersion::{
    Coefficients, ComplexIor, DispersionCurve, DispersionFormula, TabulatedIor,
};
use crate::error::{ConfigError, ConfigResult};

/// Name of the dielectric preset whose index is set directly.
pub const CONSTANT_IOR_DIELECTRIC: &str = "Constant IOR dielectric";

/// A named dielectric and its dispersion formula.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DielectricPreset {
    pub name: &'static str,
    pub formula: DispersionFormula,
    pub coefficients: &'static [f32],
}

impl DielectricPreset {
    pub fn curve(&self) -> DispersionCurve {
        DispersionCurve::Analytic {
            formula: self.formula,
            coefficients: Coefficients::leading(self.coefficients),
        }
    }

    pub fn ior_at(&self, wavelength_nm: f32) -> f32 {
        self.curve().ior_at(wavelength_nm)
    }
}

const fn schott(name: &'static str, coefficients: &'static [f32]) -> DielectricPreset {
    DielectricPreset {
        name,
        formula: DispersionFormula::Sellmeier2,
        coefficients,
    }
}

pub const DIELECTRIC_PRESETS: &[DielectricPreset] = &[
    DielectricPreset {
        name: CONSTANT_IOR_DIELECTRIC,
        formula: DispersionFormula::Constant,
        coefficients: &[1.5],
    },
    schott(
        "Glass (BK7)",
        &[0.0, 1.039_612_1, 0.006_000_699, 0.231_792_34, 0.020_017_914, 1.010_469_4, 103.560_65],
    ),
    schott(
        "Glass (K7)",
        &[0.0, 1.127_355_5, 0.007_203_417, 0.124_412_3, 0.026_983_592, 0.827_100_5, 100.384_59],
    ),
    schott(
        "Glass (F5)",
        &[0.0, 1.310_446_3, 0.009_586_33, 0.196_034_26, 0.045_762_763, 0.966_129_77, 115.011_88],
    ),
    schott(
        "Glass (LAFN7)",
        &[0.0, 1.668_426_2, 0.010_316, 0.298_512_8, 0.046_921_635, 1.077_437_6, 82.507_85],
    ),
    schott(
        "Glass (LASF35)",
        &[0.0, 2.455_058_6, 0.013_567_04, 0.453_006_08, 0.054_580_302, 2.385_130_8, 167.904_72],
    ),
    schott(
        "Glass (N-LAK33A)",
        &[0.0, 1.441_17, 0.006_809_339, 0.571_749_5, 0.022_229_182, 1.166_052_3, 80.937_96],
    ),
    schott(
        "Glass (N-FK51A)",
        &[0.0, 0.971_247_8, 0.004_723_02, 0.216_901_42, 0.015_357_561, 0.904_651_7, 168.681_33],
    ),
    schott(
        "Glass (SF4)",
        &[0.0, 1.619_578_3, 0.012_550_21, 0.339_493_2, 0.054_455_98, 1.025_669_3, 117.652_22],
    ),
    schott(
        "Glass (SF67)",
        &[0.0, 1.974_642_3, 0.014_577_232, 0.467_095_92, 0.066_979_036, 2.431_542_1, 157.444_9],
    ),
    // Daimon and Masumura 2007, 20 °C
    DielectricPreset {
        name: "Water",
        formula: DispersionFormula::Sellmeier2,
        coefficients: &[
            0.0,
            0.568_402_76,
            0.005_101_83,
            0.172_617_74,
            0.018_211_539,
            0.020_861_896,
            0.026_207_223,
            0.113_074_87,
            10.697_927,
        ],
    },
    DielectricPreset {
        name: "Polycarbonate",
        formula: DispersionFormula::Sellmeier2,
        coefficients: &[0.0, 1.4182, 0.021_304],
    },
    DielectricPreset {
        name: "Glycerol",
        formula: DispersionFormula::Cauchy,
        coefficients: &[1.457_97, 0.005_98, -2.0, -0.000_36, -4.0],
    },
    // Ordinary ray, Li et al. 2005
    DielectricPreset {
        name: "Liquid Crystal (E7)",
        formula: DispersionFormula::Cauchy,
        coefficients: &[1.4994, 0.0070, -2.0, 0.0004, -4.0],
    },
    DielectricPreset {
        name: "Diamond",
        formula: DispersionFormula::Sellmeier,
        coefficients: &[0.0, 0.3306, 0.1750, 4.3356, 0.1060],
    },
    // Ordinary ray, Ghosh 1999
    DielectricPreset {
        name: "Quartz",
        formula: DispersionFormula::Sellmeier2,
        coefficients: &[0.286_041_4, 1.070_440_8, 0.010_058_6, 1.102_022_4, 100.0],
    },
    DielectricPreset {
        name: "Fused Silica",
        formula: DispersionFormula::Sellmeier,
        coefficients: &[
            0.0, 0.696_166_3, 0.068_404_3, 0.407_942_6, 0.116_241_4, 0.897_479_4, 9.896_161,
        ],
    },
    // Ordinary ray, Malitson 1972
    DielectricPreset {
        name: "Sapphire",
        formula: DispersionFormula::Sellmeier,
        coefficients: &[
            0.0, 1.431_349_3, 0.072_663_1, 0.650_547_1, 0.119_324_2, 5.341_402, 18.028_25,
        ],
    },
    DielectricPreset {
        name: "Sodium Chloride",
        formula: DispersionFormula::Sellmeier,
        coefficients: &[
            0.000_55, 0.198, 0.050, 0.483_98, 0.100, 0.386_96, 0.128, 0.259_98, 0.158, 0.087_96,
            40.50, 3.170_64, 60.98, 0.300_38, 120.34,
        ],
    },
    // Ordinary ray
    DielectricPreset {
        name: "Proustite",
        formula: DispersionFormula::Polyanskiy,
        coefficients: &[7.483, 0.474, 0.0, 0.09, 1.0, -0.0019, 2.0],
    },
    // Ordinary ray, DeVore 1951
    DielectricPreset {
        name: "Rutile",
        formula: DispersionFormula::Polyanskiy,
        coefficients: &[5.913, 0.2441, 0.0, 0.0803, 1.0],
    },
    DielectricPreset {
        name: "Silver Chloride",
        formula: DispersionFormula::Polyanskiy,
        coefficients: &[4.008_04, 0.079_086, 0.0, 0.045_84, 1.0],
    },
];

/// Wavelengths of the metal measurement columns, in nanometres.
const METAL_WAVELENGTHS: [f32; 8] = [400.0, 450.0, 500.0, 550.0, 600.0, 650.0, 700.0, 750.0];

/// A named conductor with measured `(n, k)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MetalPreset {
    pub name: &'static str,
    n: [f32; 8],
    k: [f32; 8],
}

impl MetalPreset {
    /// Measured refractive index at 400, 450, ..., 750 nm.
    pub fn n_table(&self) -> &[f32; 8] {
        &self.n
    }

    /// Measured extinction coefficient at the same wavelengths as [`MetalPreset::n_table`].
    pub fn k_table(&self) -> &[f32; 8] {
        &self.k
    }

    /// The 64-entry tabulated curve.
    pub fn table(&self) -> TabulatedIor {
        let samples: Vec<(f32, f32, f32)> = METAL_WAVELENGTHS
            .iter()
            .zip(self.n.iter().zip(self.k.iter()))
            .map(|(&l, (&n, &k))| (l, n, k))
            .collect();
        TabulatedIor::from_measurements(&samples)
    }

    pub fn curve(&self) -> DispersionCurve {
        DispersionCurve::tabulated(self.table())
    }

    pub fn ior_at(&self, wavelength_nm: f32) -> ComplexIor {
        self.table().lookup(wavelength_nm)
    }
}

const fn metal(name: &'static str, n: [f32; 8], k: [f32; 8]) -> MetalPreset {
    MetalPreset { name, n, k }
}

pub const METAL_PRESETS: &[MetalPreset] = &[
    metal(
        "Aluminium",
        [0.49, 0.62, 0.77, 0.96, 1.20, 1.47, 1.83, 2.40],
        [4.86, 5.47, 6.08, 6.69, 7.26, 7.79, 8.31, 8.62],
    ),
    metal(
        "Brass",
        [1.32, 1.23, 1.10, 0.87, 0.59, 0.47, 0.44, 0.45],
        [1.89, 2.04, 2.21, 2.52, 2.95, 3.35, 3.72, 4.06],
    ),
    metal(
        "Calcium",
        [0.27, 0.28, 0.29, 0.29, 0.30, 0.31, 0.32, 0.33],
        [1.87, 2.15, 2.41, 2.66, 2.90, 3.13, 3.36, 3.58],
    ),
    metal(
        "Chromium",
        [2.12, 2.43, 2.75, 3.03, 3.18, 3.25, 3.26, 3.27],
        [3.35, 3.46, 3.48, 3.33, 3.33, 3.34, 3.36, 3.40],
    ),
    metal(
        "Cobalt",
        [1.69, 1.82, 1.95, 2.07, 2.18, 2.28, 2.38, 2.48],
        [3.14, 3.49, 3.81, 4.10, 4.38, 4.64, 4.89, 5.12],
    ),
    metal(
        "Copper",
        [1.18, 1.17, 1.13, 1.02, 0.30, 0.21, 0.21, 0.24],
        [2.21, 2.40, 2.56, 2.58, 3.21, 3.67, 4.18, 4.60],
    ),
    metal(
        "Gold",
        [1.47, 1.38, 0.97, 0.43, 0.25, 0.17, 0.16, 0.16],
        [1.95, 1.91, 1.87, 2.46, 3.00, 3.52, 3.95, 4.40],
    ),
    metal(
        "Iridium",
        [2.04, 2.19, 2.32, 2.43, 2.52, 2.60, 2.66, 2.71],
        [3.96, 4.14, 4.31, 4.47, 4.63, 4.79, 4.96, 5.13],
    ),
    metal(
        "Iron",
        [2.44, 2.62, 2.80, 2.90, 2.93, 2.91, 2.92, 2.93],
        [2.98, 3.12, 3.28, 3.34, 3.39, 3.42, 3.47, 3.55],
    ),
    metal(
        "Lead",
        [1.48, 1.64, 1.78, 1.91, 2.02, 2.12, 2.21, 2.30],
        [3.09, 3.32, 3.52, 3.69, 3.84, 3.98, 4.11, 4.23],
    ),
    metal(
        "Mercury",
        [0.98, 1.18, 1.38, 1.58, 1.78, 1.98, 2.17, 2.36],
        [3.78, 4.12, 4.45, 4.76, 5.05, 5.33, 5.59, 5.84],
    ),
    metal(
        "Molybdenum",
        [3.04, 3.32, 3.62, 3.77, 3.82, 3.80, 3.75, 3.68],
        [3.29, 3.45, 3.54, 3.53, 3.55, 3.60, 3.70, 3.82],
    ),
    metal(
        "Nickel",
        [1.61, 1.71, 1.82, 1.94, 2.02, 2.11, 2.20, 2.28],
        [2.36, 2.65, 2.93, 3.20, 3.45, 3.66, 3.85, 4.05],
    ),
    metal(
        "Palladium",
        [1.36, 1.48, 1.58, 1.68, 1.77, 1.86, 1.95, 2.04],
        [3.07, 3.34, 3.60, 3.86, 4.11, 4.35, 4.58, 4.80],
    ),
    metal(
        "Platinum",
        [1.76, 1.87, 1.99, 2.11, 2.23, 2.35, 2.47, 2.59],
        [3.29, 3.54, 3.77, 3.99, 4.21, 4.43, 4.64, 4.84],
    ),
    metal(
        "Silicon",
        [5.57, 4.67, 4.30, 4.08, 3.94, 3.85, 3.78, 3.73],
        [0.39, 0.14, 0.07, 0.04, 0.02, 0.02, 0.01, 0.01],
    ),
    metal(
        "Silver",
        [0.05, 0.04, 0.05, 0.06, 0.06, 0.05, 0.04, 0.03],
        [2.10, 2.65, 3.13, 3.59, 4.00, 4.42, 4.83, 5.24],
    ),
    metal(
        "Titanium",
        [1.89, 2.02, 2.15, 2.29, 2.44, 2.59, 2.74, 2.86],
        [2.62, 2.85, 2.97, 3.04, 3.11, 3.21, 3.30, 3.38],
    ),
    metal(
        "Tungsten",
        [3.40, 3.46, 3.52, 3.56, 3.60, 3.62, 3.60, 3.54],
        [2.66, 2.70, 2.72, 2.73, 2.80, 2.88, 2.97, 3.05],
    ),
    metal(
        "Vanadium",
        [2.85, 3.05, 3.24, 3.38, 3.49, 3.55, 3.58, 3.59],
        [2.84, 2.98, 3.06, 3.12, 3.16, 3.22, 3.30, 3.40],
    ),
    metal(
        "Zinc",
        [0.67, 0.79, 0.93, 1.07, 1.22, 1.37, 1.53, 1.69],
        [4.04, 4.57, 5.05, 5.51, 5.95, 6.36, 6.76, 7.14],
    ),
    metal(
        "Zirconium",
        [1.73, 1.83, 1.93, 2.03, 2.13, 2.23, 2.33, 2.43],
        [2.44, 2.62, 2.78, 2.93, 3.06, 3.19, 3.31, 3.42],
    ),
];

/// Look up a dielectric by name (ASCII case-insensitive).
pub fn dielectric_preset(name: &str) -> ConfigResult<&'static DielectricPreset> {
    DIELECTRIC_PRESETS
        .iter()
        .find(|p| p.name.eq_ignore_ascii_case(name))
        .ok_or_else(|| ConfigError::UnknownDielectric(name.to_string()))
}

/// Look up a metal by name (ASCII case-insensitive).
pub fn metal_preset(name: &str) -> ConfigResult<&'static MetalPreset> {
    METAL_PRESETS
        .iter()
        .find(|p| p.name.eq_ignore_ascii_case(name))
        .ok_or_else(|| ConfigError::UnknownMetal(name.to_string()))
}

/// Names of every dielectric preset.
pub fn dielectric_presets() -> impl Iterator<Item = &'static str> {
    DIELECTRIC_PRESETS.iter().map(|p| p.name)
}

/// Names of every metal preset.
pub fn metal_presets() -> impl Iterator<Item = &'static str> {
    METAL_PRESETS.iter().map(|p| p.name)
}
