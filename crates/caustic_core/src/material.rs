//! Surface material descriptions for the three SDF channels.
//!
//! These types are renderer-agnostic: they know how to report their spectral
//! response at a wavelength, but not how to scatter light.

use caustic_math::Vec3;

use crate::dispersion::{ComplexIor, DispersionCurve};
use crate::spectrum::RGB_TABLE;

/// Material channel of a signed distance field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MaterialClass {
    Dielectric,
    Metal,
    Diffuse,
}

impl MaterialClass {
    pub const ALL: [MaterialClass; 3] = [
        MaterialClass::Dielectric,
        MaterialClass::Metal,
        MaterialClass::Diffuse,
    ];

    #[inline]
    pub fn index(self) -> usize {
        match self {
            MaterialClass::Dielectric => 0,
            MaterialClass::Metal => 1,
            MaterialClass::Diffuse => 2,
        }
    }
}

/// A transparent, possibly rough, possibly absorbing dielectric.
#[derive(Clone, Debug)]
pub struct DielectricMaterial {
    /// Preset name
    pub name: String,

    /// Index of refraction of the interior
    pub dispersion: DispersionCurve,

    /// Beckmann roughness (alpha)
    pub roughness: f32,

    /// Colour of light after travelling through the interior
    pub absorption_color: Vec3,

    /// Absorption strength per unit distance
    pub absorption_scale: f32,
}

impl DielectricMaterial {
    pub fn new(name: impl Into<String>, dispersion: DispersionCurve, roughness: f32) -> Self {
        Self {
            name: name.into(),
            dispersion,
            roughness,
            absorption_color: Vec3::ONE,
            absorption_scale: 0.0,
        }
    }

    pub fn with_absorption(mut self, color: Vec3, scale: f32) -> Self {
        self.absorption_color = color;
        self.absorption_scale = scale;
        self
    }

    pub fn ior_at(&self, wavelength_nm: f32) -> f32 {
        self.dispersion.ior_at(wavelength_nm)
    }

    /// Interior extinction coefficient σ(λ) for Beer–Lambert attenuation.
    pub fn absorption_at(&self, wavelength_nm: f32) -> f32 {
        if self.absorption_scale <= 0.0 {
            return 0.0;
        }
        self.absorption_scale * (1.0 - RGB_TABLE.uplift(self.absorption_color, wavelength_nm))
    }
}

/// A rough conductor.
#[derive(Clone, Debug)]
pub struct MetalMaterial {
    /// Preset name
    pub name: String,

    /// Complex index of refraction
    pub dispersion: DispersionCurve,

    /// Beckmann roughness (alpha)
    pub roughness: f32,
}

impl MetalMaterial {
    pub fn new(name: impl Into<String>, dispersion: DispersionCurve, roughness: f32) -> Self {
        Self {
            name: name.into(),
            dispersion,
            roughness,
        }
    }

    pub fn ior_at(&self, wavelength_nm: f32) -> ComplexIor {
        self.dispersion.complex_ior_at(wavelength_nm)
    }
}

/// A Lambertian surface.
#[derive(Clone, Debug)]
pub struct DiffuseMaterial {
    /// Linear RGB albedo (0-1)
    pub albedo: Vec3,
}

impl DiffuseMaterial {
    pub fn new(albedo: Vec3) -> Self {
        Self {
            albedo: albedo.clamp(Vec3::ZERO, Vec3::ONE),
        }
    }

    /// Reflectance at a wavelength.
    pub fn albedo_at(&self, wavelength_nm: f32) -> f32 {
        RGB_TABLE.uplift(self.albedo, wavelength_nm)
    }
}

impl Default for DiffuseMaterial {
    fn default() -> Self {
        Self::new(Vec3::splat(0.5))
    }
}

/// Borrowed view of the material bound to one channel.
#[derive(Clone, Copy, Debug)]
pub enum SurfaceMaterial<'a> {
    Dielectric(&'a DielectricMaterial),
    Metal(&'a MetalMaterial),
    Diffuse(&'a DiffuseMaterial),
}

impl SurfaceMaterial<'_> {
    pub fn class(&self) -> MaterialClass {
        match self {
            SurfaceMaterial::Dielectric(_) => MaterialClass::Dielectric,
            SurfaceMaterial::Metal(_) => MaterialClass::Metal,
            SurfaceMaterial::Diffuse(_) => MaterialClass::Diffuse,
        }
    }

    /// Complex index at a wavelength. Diffuse surfaces report air.
    pub fn ior_at(&self, wavelength_nm: f32) -> ComplexIor {
        match self {
            SurfaceMaterial::Dielectric(m) => ComplexIor::new(m.ior_at(wavelength_nm), 0.0),
            SurfaceMaterial::Metal(m) => m.ior_at(wavelength_nm),
            SurfaceMaterial::Diffuse(_) => ComplexIor::new(1.0, 0.0),
        }
    }
}

/// One material per channel.
#[derive(Clone, Debug)]
pub struct MaterialSet {
    pub dielectric: DielectricMaterial,
    pub metal: MetalMaterial,
    pub diffuse: DiffuseMaterial,
}

impl MaterialSet {
    pub fn get(&self, class: MaterialClass) -> SurfaceMaterial<'_> {
        match class {
            MaterialClass::Dielectric => SurfaceMaterial::Dielectric(&self.dielectric),
            MaterialClass::Metal => SurfaceMaterial::Metal(&self.metal),
            MaterialClass::Diffuse => SurfaceMaterial::Diffuse(&self.diffuse),
        }
    }
}
