//! Caustic Core - Spectral material data and scene descriptions.
//!
//! This crate provides:
//!
//! - **Spectral tables**: wavelength range, blackbody, wavelength to RGB
//! - **Dispersion curves**: Sellmeier, Cauchy, Polyanskiy and tabulated `(n, k)`
//! - **Presets**: named dielectrics and metals
//! - **Scene description**: serde types resolved by the renderer
//!
//! # Example
//!
//! ```ignore
//! use caustic_core::SceneDescription;
//!
//! let scene = SceneDescription::load("scene.json")?;
//! let materials = scene.materials.resolve()?;
//! println!("n(550nm) = {}", materials.dielectric.ior_at(550.0));
//! ```

pub mod dispersion;
pub mod error;
pub mod material;
pub mod presets;
pub mod scene;
pub mod spectrum;

// Re-export commonly used types
pub use dispersion::{ComplexIor, DispersionCurve, DispersionFormula, TabulatedIor};
pub use error::{ConfigError, ConfigResult};
pub use material::{
    DielectricMaterial, DiffuseMaterial, MaterialClass, MaterialSet, MetalMaterial,
    SurfaceMaterial,
};
pub use presets::{
    dielectric_preset, dielectric_presets, metal_preset, metal_presets, DielectricPreset,
    MetalPreset,
};
pub use scene::{
    CameraDesc, EmitterDesc, EnvironmentDesc, GeometryDesc, MaterialsDesc, RenderSettings,
    SceneDescription, ShapeDesc,
};
pub use spectrum::{EmissionSpectrum, RgbTable, LAMBDA_MAX, LAMBDA_MIN, RGB_TABLE};
