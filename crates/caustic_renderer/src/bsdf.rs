//! Scattering functions for the three material channels.
//!
//! Every direction is expressed in the local shading frame: +z is the macro
//! surface normal, and both `wo` and `wi` point away from the surface. For
//! dielectrics +z is the outward normal of the interior. Opaque surfaces
//! expect `wo` on the +z side.

use std::f32::consts::FRAC_1_PI;

use caustic_core::{DielectricMaterial, DiffuseMaterial, MetalMaterial, SurfaceMaterial};
use caustic_math::Vec3;
use rand::RngCore;

use crate::fresnel::{fresnel_conductor, fresnel_dielectric, reflect, refract};
use crate::microfacet::{Beckmann, COS_EPSILON};
use crate::sampling::{gen_f32, gen_vec2, sample_cosine_hemisphere};

/// Roughness below which an interface is treated as ideally smooth.
pub const DELTA_ROUGHNESS: f32 = 1.0e-3;

/// Sample densities at or below this are discarded.
pub const PDF_EPSILON: f32 = 1.0e-7;

/// Result of sampling an incident direction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BsdfSample {
    pub wi: Vec3,
    /// BSDF value for `(wo, wi)`
    pub value: f32,
    /// Solid-angle density, or the discrete probability for delta lobes
    pub pdf: f32,
    pub delta: bool,
}

/// Shared contract of the surface scattering models.
pub trait Bsdf {
    /// BSDF value for a pair of directions. Zero for delta lobes.
    fn evaluate(&self, wo: Vec3, wi: Vec3, wavelength: f32) -> f32;

    /// Draw an incident direction for `wo`. `None` when the sample is rejected.
    fn sample(&self, wo: Vec3, wavelength: f32, rng: &mut dyn RngCore) -> Option<BsdfSample>;

    /// Solid-angle density of [`Bsdf::sample`] producing `wi`.
    fn pdf(&self, wo: Vec3, wi: Vec3, wavelength: f32) -> f32;

    /// True when every sample is a delta lobe, so light sampling cannot help.
    fn is_delta(&self) -> bool {
        false
    }
}

/// Mirror direction about the macro normal.
#[inline]
fn reflect_z(w: Vec3) -> Vec3 {
    Vec3::new(-w.x, -w.y, w.z)
}

#[inline]
fn same_hemisphere(a: Vec3, b: Vec3) -> bool {
    a.z * b.z > 0.0
}

/// Half vector of a reflection pair, oriented towards +z.
fn reflection_half_vector(wo: Vec3, wi: Vec3) -> Option<Vec3> {
    let h = (wo + wi).normalize_or_zero();
    if h == Vec3::ZERO {
        return None;
    }
    Some(if h.z < 0.0 { -h } else { h })
}

/// Rough dielectric interface after Walter et al. 2007.
#[derive(Debug, Clone, Copy)]
pub struct DielectricBsdf<'a> {
    material: &'a DielectricMaterial,
    distribution: Beckmann,
}

impl<'a> DielectricBsdf<'a> {
    pub fn new(material: &'a DielectricMaterial) -> Self {
        Self {
            material,
            distribution: Beckmann::new(material.roughness),
        }
    }

    fn smooth(&self) -> bool {
        self.material.roughness < DELTA_ROUGHNESS
    }

    /// Indices on the `wo` side and on the far side.
    fn side_indices(&self, wo: Vec3, wavelength: f32) -> (f32, f32) {
        let eta = self.material.ior_at(wavelength);
        if wo.z > 0.0 {
            (1.0, eta)
        } else {
            (eta, 1.0)
        }
    }

    /// Half vector of a transmission pair, oriented towards +z.
    fn transmission_half_vector(wo: Vec3, wi: Vec3, eta_o: f32, eta_i: f32) -> Option<Vec3> {
        let h = (eta_o * wo + eta_i * wi).normalize_or_zero();
        if h == Vec3::ZERO {
            return None;
        }
        Some(if h.z < 0.0 { -h } else { h })
    }

    fn sample_smooth(
        &self,
        wo: Vec3,
        wavelength: f32,
        rng: &mut dyn RngCore,
    ) -> Option<BsdfSample> {
        let eta = self.material.ior_at(wavelength);
        let (eta_o, eta_i) = self.side_indices(wo, wavelength);
        let f = fresnel_dielectric(wo.z, eta, 1.0);

        let reflected = |f: f32| {
            let wi = reflect_z(wo);
            BsdfSample {
                wi,
                value: f / wi.z.abs().max(COS_EPSILON),
                pdf: f,
                delta: true,
            }
        };

        if gen_f32(rng) < f {
            return Some(reflected(f));
        }
        let normal = if wo.z > 0.0 { Vec3::Z } else { Vec3::NEG_Z };
        match refract(normal, eta_o / eta_i, wo) {
            Some(wi) => {
                let t = 1.0 - f;
                let scale = (eta_o / eta_i) * (eta_o / eta_i);
                Some(BsdfSample {
                    wi,
                    value: t * scale / wi.z.abs().max(COS_EPSILON),
                    pdf: t,
                    delta: true,
                })
            }
            None => Some(reflected(1.0)),
        }
    }
}

impl Bsdf for DielectricBsdf<'_> {
    fn evaluate(&self, wo: Vec3, wi: Vec3, wavelength: f32) -> f32 {
        if self.smooth() {
            return 0.0;
        }
        let cos_o = wo.z.abs();
        let cos_i = wi.z.abs();
        if cos_o < COS_EPSILON || cos_i < COS_EPSILON {
            return 0.0;
        }

        let eta = self.material.ior_at(wavelength);
        let dist = &self.distribution;

        if same_hemisphere(wo, wi) {
            let Some(h) = reflection_half_vector(wo, wi) else {
                return 0.0;
            };
            let f = fresnel_dielectric(wo.dot(h), eta, 1.0);
            return f * dist.d(h) * dist.g2(wo, wi, h) / (4.0 * cos_o * cos_i);
        }

        let (eta_o, eta_i) = self.side_indices(wo, wavelength);
        let Some(h) = Self::transmission_half_vector(wo, wi, eta_o, eta_i) else {
            return 0.0;
        };
        let wo_h = wo.dot(h);
        let wi_h = wi.dot(h);
        if wo_h * wi_h >= 0.0 {
            return 0.0;
        }
        let denom = eta_i * wi_h + eta_o * wo_h;
        if denom * denom < COS_EPSILON {
            return 0.0;
        }
        let f = fresnel_dielectric(wo_h, eta, 1.0);
        (wi_h * wo_h).abs() / (cos_i * cos_o) * eta_o * eta_o * (1.0 - f)
            * dist.g2(wo, wi, h)
            * dist.d(h)
            / (denom * denom)
    }

    fn sample(&self, wo: Vec3, wavelength: f32, rng: &mut dyn RngCore) -> Option<BsdfSample> {
        if wo.z.abs() < COS_EPSILON {
            return None;
        }
        if self.smooth() {
            return self.sample_smooth(wo, wavelength, rng);
        }

        let m = self.distribution.sample(gen_vec2(rng));
        let wo_m = wo.dot(m);
        if wo_m * wo.z <= 0.0 {
            return None;
        }

        let eta = self.material.ior_at(wavelength);
        let f = fresnel_dielectric(wo_m, eta, 1.0);
        let wi = if gen_f32(rng) < f {
            let wi = reflect(wo, m);
            if !same_hemisphere(wo, wi) {
                return None;
            }
            wi
        } else {
            let (eta_o, eta_i) = self.side_indices(wo, wavelength);
            let facing = if wo_m > 0.0 { m } else { -m };
            let wi = refract(facing, eta_o / eta_i, wo)?;
            if same_hemisphere(wo, wi) || wi.z == 0.0 {
                return None;
            }
            wi
        };

        let pdf = self.pdf(wo, wi, wavelength);
        if pdf <= PDF_EPSILON {
            return None;
        }
        Some(BsdfSample {
            wi,
            value: self.evaluate(wo, wi, wavelength),
            pdf,
            delta: false,
        })
    }

    fn pdf(&self, wo: Vec3, wi: Vec3, wavelength: f32) -> f32 {
        if self.smooth() || wo.z.abs() < COS_EPSILON || wi.z.abs() < COS_EPSILON {
            return 0.0;
        }
        let eta = self.material.ior_at(wavelength);
        let dist = &self.distribution;

        if same_hemisphere(wo, wi) {
            let Some(h) = reflection_half_vector(wo, wi) else {
                return 0.0;
            };
            let wo_h = wo.dot(h);
            if wo_h * wo.z <= 0.0 {
                return 0.0;
            }
            let f = fresnel_dielectric(wo_h, eta, 1.0);
            return f * dist.pdf(h) / (4.0 * wo_h.abs().max(COS_EPSILON));
        }

        let (eta_o, eta_i) = self.side_indices(wo, wavelength);
        let Some(h) = Self::transmission_half_vector(wo, wi, eta_o, eta_i) else {
            return 0.0;
        };
        let wo_h = wo.dot(h);
        let wi_h = wi.dot(h);
        if wo_h * wo.z <= 0.0 || wo_h * wi_h >= 0.0 {
            return 0.0;
        }
        let denom = eta_i * wi_h + eta_o * wo_h;
        if denom * denom < COS_EPSILON {
            return 0.0;
        }
        let f = fresnel_dielectric(wo_h, eta, 1.0);
        let jacobian = eta_i * eta_i * wi_h.abs() / (denom * denom);
        (1.0 - f) * dist.pdf(h) * jacobian
    }

    fn is_delta(&self) -> bool {
        self.smooth()
    }
}

/// Rough conductor: the reflection lobe of the dielectric model with complex Fresnel.
#[derive(Debug, Clone, Copy)]
pub struct ConductorBsdf<'a> {
    material: &'a MetalMaterial,
    distribution: Beckmann,
}

impl<'a> ConductorBsdf<'a> {
    pub fn new(material: &'a MetalMaterial) -> Self {
        Self {
            material,
            distribution: Beckmann::new(material.roughness),
        }
    }

    fn smooth(&self) -> bool {
        self.material.roughness < DELTA_ROUGHNESS
    }

    fn fresnel(&self, cos: f32, wavelength: f32) -> f32 {
        let ior = self.material.ior_at(wavelength);
        fresnel_conductor(cos, ior.n, ior.k)
    }
}

impl Bsdf for ConductorBsdf<'_> {
    fn evaluate(&self, wo: Vec3, wi: Vec3, wavelength: f32) -> f32 {
        if self.smooth() || wo.z < COS_EPSILON || wi.z < COS_EPSILON {
            return 0.0;
        }
        let Some(h) = reflection_half_vector(wo, wi) else {
            return 0.0;
        };
        let dist = &self.distribution;
        self.fresnel(wo.dot(h), wavelength) * dist.d(h) * dist.g2(wo, wi, h)
            / (4.0 * wo.z * wi.z)
    }

    fn sample(&self, wo: Vec3, wavelength: f32, rng: &mut dyn RngCore) -> Option<BsdfSample> {
        if wo.z < COS_EPSILON {
            return None;
        }
        if self.smooth() {
            let wi = reflect_z(wo);
            return Some(BsdfSample {
                wi,
                value: self.fresnel(wo.z, wavelength) / wi.z,
                pdf: 1.0,
                delta: true,
            });
        }

        let m = self.distribution.sample(gen_vec2(rng));
        if wo.dot(m) <= 0.0 {
            return None;
        }
        let wi = reflect(wo, m);
        if wi.z <= 0.0 {
            return None;
        }
        let pdf = self.pdf(wo, wi, wavelength);
        if pdf <= PDF_EPSILON {
            return None;
        }
        Some(BsdfSample {
            wi,
            value: self.evaluate(wo, wi, wavelength),
            pdf,
            delta: false,
        })
    }

    fn pdf(&self, wo: Vec3, wi: Vec3, _wavelength: f32) -> f32 {
        if self.smooth() || wo.z < COS_EPSILON || wi.z < COS_EPSILON {
            return 0.0;
        }
        let Some(h) = reflection_half_vector(wo, wi) else {
            return 0.0;
        };
        let wo_h = wo.dot(h);
        if wo_h <= 0.0 {
            return 0.0;
        }
        self.distribution.pdf(h) / (4.0 * wo_h.max(COS_EPSILON))
    }

    fn is_delta(&self) -> bool {
        self.smooth()
    }
}

/// Lambertian reflector.
#[derive(Debug, Clone, Copy)]
pub struct LambertianBsdf<'a> {
    material: &'a DiffuseMaterial,
}

impl<'a> LambertianBsdf<'a> {
    pub fn new(material: &'a DiffuseMaterial) -> Self {
        Self { material }
    }
}

impl Bsdf for LambertianBsdf<'_> {
    fn evaluate(&self, wo: Vec3, wi: Vec3, wavelength: f32) -> f32 {
        if wo.z <= 0.0 || wi.z <= 0.0 {
            return 0.0;
        }
        self.material.albedo_at(wavelength) * FRAC_1_PI
    }

    fn sample(&self, wo: Vec3, wavelength: f32, rng: &mut dyn RngCore) -> Option<BsdfSample> {
        if wo.z <= 0.0 {
            return None;
        }
        let wi = sample_cosine_hemisphere(gen_vec2(rng));
        let pdf = self.pdf(wo, wi, wavelength);
        if pdf <= PDF_EPSILON {
            return None;
        }
        Some(BsdfSample {
            wi,
            value: self.evaluate(wo, wi, wavelength),
            pdf,
            delta: false,
        })
    }

    fn pdf(&self, wo: Vec3, wi: Vec3, _wavelength: f32) -> f32 {
        if wo.z <= 0.0 || wi.z <= 0.0 {
            return 0.0;
        }
        wi.z * FRAC_1_PI
    }
}

/// Closed set of surface BSDFs, one per material channel.
#[derive(Debug, Clone, Copy)]
pub enum SurfaceBsdf<'a> {
    Dielectric(DielectricBsdf<'a>),
    Conductor(ConductorBsdf<'a>),
    Lambertian(LambertianBsdf<'a>),
}

impl<'a> SurfaceBsdf<'a> {
    pub fn new(material: SurfaceMaterial<'a>) -> Self {
        match material {
            SurfaceMaterial::Dielectric(m) => SurfaceBsdf::Dielectric(DielectricBsdf::new(m)),
            SurfaceMaterial::Metal(m) => SurfaceBsdf::Conductor(ConductorBsdf::new(m)),
            SurfaceMaterial::Diffuse(m) => SurfaceBsdf::Lambertian(LambertianBsdf::new(m)),
        }
    }

    /// Whether light passes through the surface.
    pub fn is_transmissive(&self) -> bool {
        matches!(self, SurfaceBsdf::Dielectric(_))
    }
}

impl Bsdf for SurfaceBsdf<'_> {
    fn evaluate(&self, wo: Vec3, wi: Vec3, wavelength: f32) -> f32 {
        match self {
            SurfaceBsdf::Dielectric(b) => b.evaluate(wo, wi, wavelength),
            SurfaceBsdf::Conductor(b) => b.evaluate(wo, wi, wavelength),
            SurfaceBsdf::Lambertian(b) => b.evaluate(wo, wi, wavelength),
        }
    }

    fn sample(&self, wo: Vec3, wavelength: f32, rng: &mut dyn RngCore) -> Option<BsdfSample> {
        match self {
            SurfaceBsdf::Dielectric(b) => b.sample(wo, wavelength, rng),
            SurfaceBsdf::Conductor(b) => b.sample(wo, wavelength, rng),
            SurfaceBsdf::Lambertian(b) => b.sample(wo, wavelength, rng),
        }
    }

    fn pdf(&self, wo: Vec3, wi: Vec3, wavelength: f32) -> f32 {
        match self {
            SurfaceBsdf::Dielectric(b) => b.pdf(wo, wi, wavelength),
            SurfaceBsdf::Conductor(b) => b.pdf(wo, wi, wavelength),
            SurfaceBsdf::Lambertian(b) => b.pdf(wo, wi, wavelength),
        }
    }

    fn is_delta(&self) -> bool {
        match self {
            SurfaceBsdf::Dielectric(b) => b.is_delta(),
            SurfaceBsdf::Conductor(b) => b.is_delta(),
            SurfaceBsdf::Lambertian(b) => b.is_delta(),
        }
    }
}
