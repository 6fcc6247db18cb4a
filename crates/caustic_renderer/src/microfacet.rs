//! Beckmann microfacet distribution with Smith shadowing.
//!
//! All vectors are in the local shading frame (macro normal along +z).

use std::f32::consts::PI;

use caustic_math::{Vec2, Vec3};

/// Added to α² so the distribution stays finite as roughness goes to zero.
const ALPHA2_EPSILON: f32 = 1.0e-7;

/// Floor for cosine denominators.
pub const COS_EPSILON: f32 = 1.0e-7;

/// Isotropic Beckmann distribution of microfacet normals.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Beckmann {
    alpha: f32,
    alpha2: f32,
}

impl Beckmann {
    pub fn new(roughness: f32) -> Self {
        let alpha = roughness.max(0.0);
        Self {
            alpha,
            alpha2: alpha * alpha + ALPHA2_EPSILON,
        }
    }

    #[inline]
    pub fn alpha(&self) -> f32 {
        self.alpha
    }

    /// Normal distribution `D(m) = exp(−tan²θ/α²) / (π α² cos⁴θ)`.
    pub fn d(&self, m: Vec3) -> f32 {
        let cos2 = m.z * m.z;
        if m.z <= 0.0 || cos2 < COS_EPSILON {
            return 0.0;
        }
        let tan2 = (1.0 - cos2).max(0.0) / cos2;
        let exponent = -tan2 / self.alpha2;
        if exponent < -80.0 {
            return 0.0;
        }
        exponent.exp() / (PI * self.alpha2 * cos2 * cos2)
    }

    /// Draw a microfacet normal with density `D(m) cosθ_m`.
    pub fn sample(&self, u: Vec2) -> Vec3 {
        let tan2 = -self.alpha2 * u.x.max(1.0e-7).ln();
        let cos_theta = 1.0 / (1.0 + tan2).sqrt();
        let sin_theta = (1.0 - cos_theta * cos_theta).max(0.0).sqrt();
        let phi = 2.0 * PI * u.y;
        Vec3::new(sin_theta * phi.cos(), sin_theta * phi.sin(), cos_theta)
    }

    /// Density of [`Beckmann::sample`] over microfacet normals.
    #[inline]
    pub fn pdf(&self, m: Vec3) -> f32 {
        self.d(m) * m.z.max(0.0)
    }

    /// Monostatic Smith shadowing, Walter et al. 2007 rational fit.
    pub fn g1(&self, v: Vec3, m: Vec3) -> f32 {
        // Back-facing to the microfacet relative to the macro surface side
        if v.dot(m) * v.z <= 0.0 {
            return 0.0;
        }
        let cos2 = v.z * v.z;
        let sin2 = (1.0 - cos2).max(0.0);
        if sin2 == 0.0 {
            return 1.0;
        }
        let tan_theta = (sin2 / cos2.max(COS_EPSILON)).sqrt();
        let a = 1.0 / (self.alpha2.sqrt() * tan_theta);
        if a >= 1.6 {
            return 1.0;
        }
        // The fit overshoots 1 slightly just below a = 1.6
        ((3.535 * a + 2.181 * a * a) / (1.0 + 2.276 * a + 2.577 * a * a)).min(1.0)
    }

    /// Uncorrelated bidirectional shadowing-masking `G1(o) G1(i)`.
    #[inline]
    pub fn g2(&self, wo: Vec3, wi: Vec3, m: Vec3) -> f32 {
        self.g1(wo, m) * self.g1(wi, m)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sampling::{gen_vec2, sample_uniform_sphere};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_d_is_normalized() {
        // ∫ D(m) cosθ dω = 1, estimated with uniform sphere directions
        let mut rng = StdRng::seed_from_u64(5);
        for roughness in [0.3, 0.5, 0.9] {
            let dist = Beckmann::new(roughness);
            let n = 200_000;
            let mut sum = 0.0;
            for _ in 0..n {
                let m = sample_uniform_sphere(gen_vec2(&mut rng));
                sum += dist.d(m) * m.z.max(0.0) * 4.0 * PI;
            }
            let integral = sum / n as f32;
            assert!((integral - 1.0).abs() < 0.05, "α={roughness}: {integral}");
        }
    }

    #[test]
    fn test_near_zero_roughness_is_finite() {
        let dist = Beckmann::new(0.0);
        let d = dist.d(Vec3::Z);
        assert!(d.is_finite() && d > 0.0);
        assert_eq!(dist.d(Vec3::new(0.1, 0.0, 0.995).normalize()), 0.0);
    }

    #[test]
    fn test_samples_in_upper_hemisphere() {
        let dist = Beckmann::new(0.4);
        let mut rng = StdRng::seed_from_u64(9);
        for _ in 0..1000 {
            let m = dist.sample(gen_vec2(&mut rng));
            assert!(m.z > 0.0);
            assert!((m.length() - 1.0).abs() < 1e-4);
            assert!(dist.pdf(m).is_finite());
        }
        // u = 0 would take ln(0); the floor keeps it finite
        assert!(dist.sample(Vec2::ZERO).z > 0.0);
    }

    #[test]
    fn test_g1_along_normal_is_one() {
        let dist = Beckmann::new(0.7);
        assert_eq!(dist.g1(Vec3::Z, Vec3::Z), 1.0);
        // The side test compares against the macro normal, so the
        // transmitted side of an upward facet is unshadowed too
        assert_eq!(dist.g1(-Vec3::Z, Vec3::Z), 1.0);
        // Above the horizon but behind the facet
        let v = Vec3::new(0.8, 0.0, 0.6);
        let m = Vec3::new(-0.8, 0.0, 0.6);
        assert!(v.dot(m) < 0.0 && v.z > 0.0);
        assert_eq!(dist.g1(v, m), 0.0);
    }

    #[test]
    fn test_g1_never_exceeds_one_near_fit_boundary() {
        let dist = Beckmann::new(0.5);
        for i in 1..900 {
            let theta = (i as f32 * 0.1).to_radians();
            let v = Vec3::new(theta.sin(), 0.0, theta.cos());
            let g = dist.g1(v, Vec3::Z);
            assert!(g <= 1.0, "θ={}: {g}", i as f32 * 0.1);
        }
    }

    #[test]
    fn test_g1_bounds() {
        let dist = Beckmann::new(0.5);
        let m = Vec3::Z;
        let mut previous = 1.0;
        for i in 1..90 {
            let theta = (i as f32).to_radians();
            let v = Vec3::new(theta.sin(), 0.0, theta.cos());
            let g = dist.g1(v, m);
            assert!((0.0..=1.0).contains(&g));
            // Shadowing only gets stronger towards grazing
            assert!(g <= previous + 1e-6);
            previous = g;
        }
        // Facet faces away from a direction on the upper side
        let v = Vec3::new(0.9, 0.0, 0.1).normalize();
        let m = Vec3::new(-0.6, 0.0, 0.8);
        assert_eq!(dist.g1(v, m), 0.0);
        // Transmitted directions below the surface still see upward facets
        let below = Vec3::new(0.0, 0.0, -1.0);
        assert_eq!(dist.g1(below, Vec3::Z), 1.0);
    }
}
