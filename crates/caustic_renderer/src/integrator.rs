//! Single-wavelength path tracing with multiple importance sampling.
//!
//! A path carries one hero wavelength from the camera to its last bounce.
//! Radiance and throughput are scalars; conversion to RGB happens once, when
//! the sample is written to the pixel.

use caustic_core::spectrum::LAMBDA_RANGE;
use caustic_core::{MaterialClass, RGB_TABLE};
use caustic_math::{Basis, Interval, Ray, Vec3};
use rand::RngCore;

use crate::bsdf::{Bsdf, SurfaceBsdf, PDF_EPSILON};
use crate::camera::Camera;
use crate::geometry::ShadingPoint;
use crate::renderer::RenderConfig;
use crate::sampling::{gen_f32, power_heuristic};
use crate::scene::Scene;
use crate::wavelength::WavelengthSample;

/// Paths whose throughput falls below this are terminated.
pub const THROUGHPUT_CUTOFF: f32 = 1.0e-6;

/// First bounce eligible for Russian roulette.
const ROULETTE_START: u32 = 2;

/// Mutable state of one path between scattering events.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PathState {
    pub origin: Vec3,
    pub direction: Vec3,
    /// Longest distance the current segment may travel
    pub max_t: f32,
    pub throughput: f32,
    /// Channel of the last scattering vertex, `None` for camera rays
    pub class: Option<MaterialClass>,
    pub bounce: u32,
    /// Last direction was a camera ray or a delta lobe, so emission is not MIS weighted
    pub specular: bool,
    /// Solid-angle density that produced `direction`
    pub last_pdf: f32,
    /// Surface point the current segment left from
    pub last_point: Vec3,
}

impl PathState {
    pub fn camera(ray: Ray, max_t: f32) -> Self {
        Self {
            origin: ray.origin(),
            direction: ray.direction(),
            max_t,
            throughput: 1.0,
            class: None,
            bounce: 0,
            specular: true,
            last_pdf: 0.0,
            last_point: ray.origin(),
        }
    }

    #[inline]
    pub fn ray(&self) -> Ray {
        Ray::new(self.origin, self.direction)
    }
}

/// MIS weight for emission found by a continuation ray.
fn emission_weight(scene: &Scene, state: &PathState) -> f32 {
    if state.specular {
        return 1.0;
    }
    let light_pdf = scene.lights.pdf(state.last_point, state.direction);
    power_heuristic(state.last_pdf, light_pdf)
}

/// Beer-Lambert transmittance of a segment starting at `origin`.
fn segment_transmittance(scene: &Scene, origin: Vec3, length: f32, wavelength: f32) -> f32 {
    if scene.geometry.distance(MaterialClass::Dielectric, origin) >= 0.0 {
        return 1.0;
    }
    let sigma = scene.materials.dielectric.absorption_at(wavelength);
    if sigma <= 0.0 {
        return 1.0;
    }
    (-sigma * length).exp()
}

/// Radiance arriving along a camera ray at one wavelength.
pub fn path_radiance(
    scene: &Scene,
    ray: Ray,
    max_t: f32,
    wavelength: f32,
    config: &RenderConfig,
    rng: &mut dyn RngCore,
) -> f32 {
    let geometry = &scene.geometry;
    let lights = &scene.lights;
    let offset = geometry.config().ray_offset();

    let mut state = PathState::camera(ray, max_t);
    let mut radiance = 0.0;

    loop {
        let ray = state.ray();
        let emitter_hit = lights.emitter.intersect(&ray);
        let limit = emitter_hit.map_or(state.max_t, |h| h.t.min(state.max_t));
        let hit = geometry.trace_within(&ray, Interval::new(0.0, limit));

        let Some(hit) = hit else {
            // Reached the emitter, or left the scene. The far clip hides
            // geometry but never the sky behind it.
            let emitted = match emitter_hit {
                Some(h) if h.t <= state.max_t => lights.emitter.emitted(&ray, &h, wavelength),
                _ => lights.environment.radiance(wavelength),
            };
            if emitted > 0.0 {
                let transmittance = segment_transmittance(scene, state.origin, limit, wavelength);
                radiance +=
                    state.throughput * transmittance * emitted * emission_weight(scene, &state);
            }
            break;
        };

        state.throughput *= segment_transmittance(scene, state.origin, hit.t, wavelength);
        if state.bounce >= config.max_bounces || state.throughput <= THROUGHPUT_CUTOFF {
            break;
        }

        let bsdf = SurfaceBsdf::new(scene.materials.get(hit.class));
        let mut normal = geometry.normal_at(hit.point, hit.class);
        if !bsdf.is_transmissive() && normal.dot(ray.direction()) > 0.0 {
            normal = -normal;
        }
        let shading = ShadingPoint {
            point: hit.point,
            basis: Basis::from_normal(normal),
            offset,
        };
        let wo = shading.basis.to_local(-ray.direction());

        if !bsdf.is_delta() {
            radiance += state.throughput
                * lights.direct_lighting(geometry, &shading, &bsdf, wo, wavelength, rng);
        }

        let Some(sample) = bsdf.sample(wo, wavelength, rng) else {
            break;
        };
        if sample.pdf <= PDF_EPSILON || sample.value <= 0.0 {
            break;
        }
        state.throughput *= sample.value * sample.wi.z.abs() / sample.pdf;
        if !state.throughput.is_finite() || state.throughput <= THROUGHPUT_CUTOFF {
            break;
        }

        if config.russian_roulette && state.bounce >= ROULETTE_START {
            let survive = state.throughput.min(0.95);
            if gen_f32(rng) >= survive {
                break;
            }
            state.throughput /= survive;
        }

        let direction = shading.basis.to_world(sample.wi);
        state = PathState {
            origin: shading.spawn(direction),
            direction,
            max_t: geometry.config().max_distance,
            throughput: state.throughput,
            class: Some(hit.class),
            bounce: state.bounce + 1,
            specular: sample.delta,
            last_pdf: sample.pdf,
            last_point: hit.point,
        };
    }

    radiance
}

/// Linear RGB contribution of one radiance sample at a wavelength.
#[inline]
pub fn spectral_to_rgb(radiance: f32, wavelength: WavelengthSample) -> Vec3 {
    if wavelength.pdf <= 0.0 || !radiance.is_finite() {
        return Vec3::ZERO;
    }
    RGB_TABLE.rgb_at(wavelength.wavelength) * (radiance / (wavelength.pdf * LAMBDA_RANGE))
}

/// One full sample for pixel (x, y): wavelength, camera ray, path, RGB.
pub fn sample_pixel(
    scene: &Scene,
    camera: &Camera,
    x: u32,
    y: u32,
    config: &RenderConfig,
    rng: &mut dyn RngCore,
) -> Vec3 {
    let wavelength = scene.wavelengths.sample(gen_f32(rng));
    let ray = camera.get_ray(x, y, rng);
    let max_t = camera
        .clip_length(ray.direction())
        .min(scene.geometry.config().max_distance);
    let radiance = path_radiance(scene, ray, max_t, wavelength.wavelength, config, rng);
    spectral_to_rgb(radiance, wavelength)
}
