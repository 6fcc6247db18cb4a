//! Disk emitter, blackbody sky and multiple importance sampled direct lighting.

use std::f32::consts::PI;

use caustic_core::spectrum::{blackbody, spectral_mean};
use caustic_core::{EmissionSpectrum, EmitterDesc, EnvironmentDesc};
use caustic_math::{Basis, Interval, Ray, Vec2, Vec3};
use rand::RngCore;

use crate::bsdf::{Bsdf, PDF_EPSILON};
use crate::geometry::{SdfScene, ShadingPoint};
use crate::sampling::{
    gen_f32, gen_vec2, power_heuristic, sample_uniform_sphere, sample_unit_disk,
    UNIFORM_SPHERE_PDF,
};

/// Probability of sampling the emitter rather than the sky.
pub const EMITTER_SELECT_PROBABILITY: f32 = 0.5;

/// Widest supported emission cone half-angle.
const MAX_SPREAD_DEGREES: f32 = 90.0;

/// Ray against emitter disk intersection.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EmitterHit {
    pub t: f32,
    pub point: Vec3,
    /// True when the ray strikes the emitting face
    pub front: bool,
}

/// One-sided disk light whose emission is limited to a cone around its normal.
#[derive(Debug, Clone)]
pub struct Emitter {
    center: Vec3,
    frame: Basis,
    radius: f32,
    cos_spread: f32,
    /// `None` for a hemispherical emitter
    tan_spread: Option<f32>,
    brightness: f32,
    spectrum: EmissionSpectrum,
    emission_mean: f32,
}

impl Emitter {
    /// `emission_mean` is the mean of the unnormalized spectrum over the rendered range.
    pub fn new(desc: &EmitterDesc, emission_mean: f32) -> Self {
        let spread = if desc.spread > MAX_SPREAD_DEGREES {
            log::warn!(
                "Emitter spread {}° clamped to {}°",
                desc.spread,
                MAX_SPREAD_DEGREES
            );
            MAX_SPREAD_DEGREES
        } else {
            desc.spread
        };
        let spread = spread.to_radians();
        let tan_spread = if spread >= MAX_SPREAD_DEGREES.to_radians() - 1.0e-4 {
            None
        } else {
            Some(spread.tan())
        };

        Self {
            center: Vec3::from_array(desc.position),
            frame: Basis::from_normal(Vec3::from_array(desc.direction).normalize()),
            radius: desc.radius,
            cos_spread: spread.cos(),
            tan_spread,
            brightness: desc.brightness,
            spectrum: desc.spectrum,
            emission_mean,
        }
    }

    #[inline]
    pub fn normal(&self) -> Vec3 {
        self.frame.normal
    }

    /// Spectral radiance of the emitting face, normalized so its mean is `brightness`.
    pub fn radiance(&self, wavelength: f32) -> f32 {
        if self.emission_mean <= 0.0 {
            return 0.0;
        }
        self.brightness * self.spectrum.eval(wavelength) / self.emission_mean
    }

    pub fn intersect(&self, ray: &Ray) -> Option<EmitterHit> {
        let n = self.normal();
        let denom = ray.direction().dot(n);
        if denom.abs() < 1.0e-8 {
            return None;
        }
        let t = (self.center - ray.origin()).dot(n) / denom;
        if t <= 0.0 {
            return None;
        }
        let point = ray.at(t);
        if (point - self.center).length_squared() > self.radius * self.radius {
            return None;
        }
        Some(EmitterHit {
            t,
            point,
            front: denom < 0.0,
        })
    }

    /// Radiance carried back along `ray` from a disk hit.
    pub fn emitted(&self, ray: &Ray, hit: &EmitterHit, wavelength: f32) -> f32 {
        if !hit.front || -ray.direction().dot(self.normal()) < self.cos_spread {
            return 0.0;
        }
        self.radiance(wavelength)
    }

    /// Disk that bounds the emitter points able to illuminate `x`.
    ///
    /// This is the smaller of the emitter itself and the footprint of the
    /// emission cone around the projection of `x` onto the emitter plane.
    fn sampling_disk(&self, x: Vec3) -> Option<(Vec3, f32)> {
        let n = self.normal();
        let height = (x - self.center).dot(n);
        if height <= 0.0 {
            return None;
        }
        let projected = x - height * n;
        match self.tan_spread {
            Some(tan) if height * tan < self.radius => Some((projected, height * tan)),
            _ => Some((self.center, self.radius)),
        }
    }

    /// Whether an emitter point both lies on the disk and sees `x` inside the cone.
    fn in_sampling_region(&self, x: Vec3, y: Vec3) -> bool {
        if (y - self.center).length_squared() > self.radius * self.radius {
            return false;
        }
        match self.tan_spread {
            Some(tan) => {
                let n = self.normal();
                let height = (x - self.center).dot(n);
                let projected = x - height * n;
                let reach = height * tan;
                (y - projected).length_squared() <= reach * reach
            }
            None => true,
        }
    }

    /// Direction from `x` towards a point on the emitter, or `None` if rejected.
    pub fn sample_direction(&self, x: Vec3, u: Vec2) -> Option<Vec3> {
        let (center, radius) = self.sampling_disk(x)?;
        let d = sample_unit_disk(u) * radius;
        let y = center + self.frame.tangent * d.x + self.frame.bitangent * d.y;
        if !self.in_sampling_region(x, y) {
            return None;
        }
        let direction = (y - x).normalize_or_zero();
        if direction == Vec3::ZERO {
            return None;
        }
        Some(direction)
    }

    /// Solid-angle density of [`Emitter::sample_direction`] from `x`.
    pub fn pdf(&self, x: Vec3, direction: Vec3) -> f32 {
        let Some((_, radius)) = self.sampling_disk(x) else {
            return 0.0;
        };
        let ray = Ray::new(x, direction);
        let Some(hit) = self.intersect(&ray) else {
            return 0.0;
        };
        if !hit.front || !self.in_sampling_region(x, hit.point) {
            return 0.0;
        }
        let cos = -ray.direction().dot(self.normal());
        let area = PI * radius * radius;
        if cos <= 0.0 || area <= 0.0 {
            return 0.0;
        }
        hit.t * hit.t / (cos * area)
    }
}

/// Uniform blackbody sky.
#[derive(Debug, Clone)]
pub struct Environment {
    temperature: f32,
    brightness: f32,
    mean: f32,
}

impl Environment {
    pub fn new(desc: &EnvironmentDesc) -> Self {
        let temperature = desc.temperature;
        Self {
            temperature,
            brightness: desc.brightness,
            mean: spectral_mean(|l| blackbody(l, temperature)),
        }
    }

    /// Spectral radiance, normalized so its mean is `brightness`.
    pub fn radiance(&self, wavelength: f32) -> f32 {
        if self.brightness <= 0.0 || self.mean <= 0.0 {
            return 0.0;
        }
        self.brightness * blackbody(wavelength, self.temperature) / self.mean
    }

    #[inline]
    pub fn sample_direction(&self, u: Vec2) -> Vec3 {
        sample_uniform_sphere(u)
    }

    #[inline]
    pub fn pdf(&self) -> f32 {
        UNIFORM_SPHERE_PDF
    }
}

/// The emitter and the sky, sampled together as one light strategy.
#[derive(Debug, Clone)]
pub struct Lights {
    pub emitter: Emitter,
    pub environment: Environment,
}

impl Lights {
    pub fn new(emitter: Emitter, environment: Environment) -> Self {
        Self {
            emitter,
            environment,
        }
    }

    /// Combined light-sampling density of `direction` from `x`.
    pub fn pdf(&self, x: Vec3, direction: Vec3) -> f32 {
        EMITTER_SELECT_PROBABILITY * self.emitter.pdf(x, direction)
            + (1.0 - EMITTER_SELECT_PROBABILITY) * self.environment.pdf()
    }

    /// Radiance arriving at `origin` from `direction`.
    ///
    /// Surfaces and the back of the emitter block everything behind them.
    pub fn incident(
        &self,
        scene: &SdfScene,
        origin: Vec3,
        direction: Vec3,
        wavelength: f32,
    ) -> f32 {
        let ray = Ray::new(origin, direction);
        let emitter_hit = self.emitter.intersect(&ray);
        let limit = emitter_hit.map_or(scene.config().max_distance, |h| h.t);
        if scene
            .trace_within(&ray, Interval::new(0.0, limit))
            .is_some()
        {
            return 0.0;
        }
        match emitter_hit {
            Some(hit) => self.emitter.emitted(&ray, &hit, wavelength),
            None => self.environment.radiance(wavelength),
        }
    }

    /// One-sample estimate of reflected direct light at a shading point.
    ///
    /// Picks the emitter or the sky with equal probability and weights the
    /// result against BSDF sampling with the power heuristic. Rejected and
    /// occluded samples return zero.
    pub fn direct_lighting(
        &self,
        scene: &SdfScene,
        shading: &ShadingPoint,
        bsdf: &dyn Bsdf,
        wo: Vec3,
        wavelength: f32,
        rng: &mut dyn RngCore,
    ) -> f32 {
        let x = shading.point;
        let direction = if gen_f32(rng) < EMITTER_SELECT_PROBABILITY {
            match self.emitter.sample_direction(x, gen_vec2(rng)) {
                Some(d) => d,
                None => return 0.0,
            }
        } else {
            self.environment.sample_direction(gen_vec2(rng))
        };

        let wi = shading.basis.to_local(direction);
        let f = bsdf.evaluate(wo, wi, wavelength);
        if f <= 0.0 {
            return 0.0;
        }
        let light_pdf = self.pdf(x, direction);
        if light_pdf <= PDF_EPSILON {
            return 0.0;
        }
        let radiance = self.incident(scene, shading.spawn(direction), direction, wavelength);
        if radiance <= 0.0 {
            return 0.0;
        }
        let bsdf_pdf = bsdf.pdf(wo, wi, wavelength);
        f * radiance * wi.z.abs() / light_pdf * power_heuristic(light_pdf, bsdf_pdf)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::MarchConfig;
    use crate::sdf::{Sdf, SdfUnion, SphereSdf};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn overhead_emitter(spread: f32) -> Emitter {
        let desc = EmitterDesc {
            position: [0.0, 2.0, 0.0],
            direction: [0.0, -1.0, 0.0],
            radius: 0.5,
            spread,
            brightness: 10.0,
            spectrum: EmissionSpectrum::Flat,
        };
        Emitter::new(&desc, 1.0)
    }

    fn empty_scene() -> SdfScene {
        let empty = || -> Box<dyn Sdf> { Box::new(SdfUnion::new()) };
        SdfScene::new(empty(), empty(), empty(), MarchConfig::default())
    }

    #[test]
    fn test_emitter_intersection_sides() {
        let emitter = overhead_emitter(90.0);
        let up = Ray::new(Vec3::ZERO, Vec3::Y);
        let hit = emitter.intersect(&up).unwrap();
        assert!((hit.t - 2.0).abs() < 1e-5);
        assert!(hit.front);
        assert_eq!(emitter.emitted(&up, &hit, 550.0), 10.0);

        let down = Ray::new(Vec3::new(0.0, 3.0, 0.0), Vec3::NEG_Y);
        let hit = emitter.intersect(&down).unwrap();
        assert!(!hit.front);
        assert_eq!(emitter.emitted(&down, &hit, 550.0), 0.0);

        let beside = Ray::new(Vec3::new(1.0, 0.0, 0.0), Vec3::Y);
        assert!(emitter.intersect(&beside).is_none());
    }

    #[test]
    fn test_emitter_pdf_integrates_solid_angle() {
        // Σ 1/pdf over accepted samples estimates the subtended solid angle
        let emitter = overhead_emitter(90.0);
        let x = Vec3::ZERO;
        let h: f32 = 2.0;
        let r: f32 = 0.5;
        let expected = 2.0 * PI * (1.0 - h / (h * h + r * r).sqrt());

        let mut rng = StdRng::seed_from_u64(13);
        let n = 20_000;
        let mut sum = 0.0;
        for _ in 0..n {
            if let Some(d) = emitter.sample_direction(x, gen_vec2(&mut rng)) {
                let pdf = emitter.pdf(x, d);
                assert!(pdf > 0.0);
                sum += 1.0 / pdf;
            }
        }
        let estimate = sum / n as f32;
        assert!(
            (estimate - expected).abs() < 0.01 * expected,
            "{estimate} vs {expected}"
        );
    }

    #[test]
    fn test_narrow_cone_limits_sampling() {
        let emitter = overhead_emitter(10.0);
        let mut rng = StdRng::seed_from_u64(19);

        // Far off to the side, outside every cone
        let outside = Vec3::new(3.0, 0.0, 0.0);
        for _ in 0..100 {
            assert!(emitter.sample_direction(outside, gen_vec2(&mut rng)).is_none());
        }
        let towards_center = (Vec3::new(0.0, 2.0, 0.0) - outside).normalize();
        assert_eq!(emitter.pdf(outside, towards_center), 0.0);

        // Directly below, the cone footprint is smaller than the disk
        let below = Vec3::ZERO;
        let d = emitter.sample_direction(below, gen_vec2(&mut rng)).unwrap();
        assert!(d.dot(Vec3::Y) >= 10f32.to_radians().cos() - 1e-4);

        // Behind the emitting face nothing is sampled
        assert!(emitter
            .sample_direction(Vec3::new(0.0, 3.0, 0.0), gen_vec2(&mut rng))
            .is_none());
    }

    #[test]
    fn test_environment_mean_is_brightness() {
        let env = Environment::new(&EnvironmentDesc {
            temperature: 5000.0,
            brightness: 2.0,
        });
        let mean = spectral_mean(|l| env.radiance(l));
        assert!((mean - 2.0).abs() < 1e-3);
        assert!((env.pdf() - 1.0 / (4.0 * PI)).abs() < 1e-7);
    }

    #[test]
    fn test_incident_is_blocked_by_geometry() {
        let lights = Lights::new(
            overhead_emitter(90.0),
            Environment::new(&EnvironmentDesc {
                temperature: 6500.0,
                brightness: 1.0,
            }),
        );
        let open = empty_scene();
        assert_eq!(lights.incident(&open, Vec3::ZERO, Vec3::Y, 550.0), 10.0);
        assert!(lights.incident(&open, Vec3::ZERO, Vec3::NEG_Y, 550.0) > 0.0);
        // The back of the emitter hides the sky
        assert_eq!(
            lights.incident(&open, Vec3::new(0.0, 3.0, 0.0), Vec3::NEG_Y, 550.0),
            0.0
        );

        let blocker = SdfScene::new(
            Box::new(SdfUnion::new()),
            Box::new(SdfUnion::new()),
            Box::new(SphereSdf {
                center: Vec3::new(0.0, 1.0, 0.0),
                radius: 0.3,
            }),
            MarchConfig::default(),
        );
        assert_eq!(lights.incident(&blocker, Vec3::ZERO, Vec3::Y, 550.0), 0.0);
    }

    #[test]
    fn test_light_pdf_mixes_strategies() {
        let lights = Lights::new(
            overhead_emitter(90.0),
            Environment::new(&EnvironmentDesc::default()),
        );
        let away = lights.pdf(Vec3::ZERO, Vec3::NEG_Y);
        assert!((away - 0.5 * UNIFORM_SPHERE_PDF).abs() < 1e-7);
        let towards = lights.pdf(Vec3::ZERO, Vec3::Y);
        let expected = 0.5 * 4.0 / (PI * 0.25) + 0.5 * UNIFORM_SPHERE_PDF;
        assert!((towards - expected).abs() < 1e-4);
    }
}
