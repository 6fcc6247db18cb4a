//! Sphere tracing over the three material channels.

use caustic_core::{GeometryDesc, MaterialClass, RenderSettings};
use caustic_math::{Basis, Interval, Ray, Vec3};

use crate::sdf::{Sdf, SdfUnion};

/// Sphere tracing tolerances.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MarchConfig {
    /// Iteration cap before a ray is declared a miss
    pub max_steps: u32,
    /// Field magnitude that counts as touching a surface
    pub hit_threshold: f32,
    /// Distance beyond which a ray is declared a miss
    pub max_distance: f32,
    /// Step used by the finite difference gradient
    pub normal_epsilon: f32,
}

impl Default for MarchConfig {
    fn default() -> Self {
        Self {
            max_steps: 512,
            hit_threshold: 1.0e-4,
            max_distance: 1.0e3,
            normal_epsilon: 1.0e-4,
        }
    }
}

impl MarchConfig {
    pub fn from_settings(settings: &RenderSettings) -> Self {
        Self {
            max_steps: settings.max_steps,
            hit_threshold: settings.hit_threshold,
            max_distance: settings.max_distance,
            ..Self::default()
        }
    }

    /// Distance new rays are pushed off a surface.
    #[inline]
    pub fn ray_offset(&self) -> f32 {
        8.0 * self.hit_threshold
    }
}

/// A sphere tracing hit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfaceHit {
    pub point: Vec3,
    pub class: MaterialClass,
    /// Distance along the ray
    pub t: f32,
}

/// Local frame at a scattering vertex.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShadingPoint {
    pub point: Vec3,
    pub basis: Basis,
    /// Distance new rays start from the surface
    pub offset: f32,
}

impl ShadingPoint {
    #[inline]
    pub fn normal(&self) -> Vec3 {
        self.basis.normal
    }

    /// Origin for a ray leaving in `direction`, pushed to the side it travels into.
    #[inline]
    pub fn spawn(&self, direction: Vec3) -> Vec3 {
        let n = self.basis.normal;
        if direction.dot(n) >= 0.0 {
            self.point + n * self.offset
        } else {
            self.point - n * self.offset
        }
    }
}

/// Three signed distance fields, one per material channel.
pub struct SdfScene {
    channels: [Box<dyn Sdf>; 3],
    config: MarchConfig,
}

impl SdfScene {
    pub fn new(
        dielectric: Box<dyn Sdf>,
        metal: Box<dyn Sdf>,
        diffuse: Box<dyn Sdf>,
        config: MarchConfig,
    ) -> Self {
        Self {
            channels: [dielectric, metal, diffuse],
            config,
        }
    }

    pub fn from_geometry(geometry: &GeometryDesc, config: MarchConfig) -> Self {
        Self::new(
            Box::new(SdfUnion::from_shapes(&geometry.dielectric)),
            Box::new(SdfUnion::from_shapes(&geometry.metal)),
            Box::new(SdfUnion::from_shapes(&geometry.diffuse)),
            config,
        )
    }

    #[inline]
    pub fn config(&self) -> &MarchConfig {
        &self.config
    }

    /// Signed distance of one channel.
    #[inline]
    pub fn distance(&self, class: MaterialClass, p: Vec3) -> f32 {
        self.channels[class.index()].distance(p)
    }

    /// Closest channel by unsigned distance.
    fn nearest(&self, p: Vec3) -> (f32, MaterialClass) {
        let mut best = (f32::INFINITY, MaterialClass::Diffuse);
        for class in MaterialClass::ALL {
            let d = self.distance(class, p).abs();
            if d < best.0 {
                best = (d, class);
            }
        }
        best
    }

    /// March along a ray until a surface or `config.max_distance`.
    pub fn trace(&self, ray: &Ray) -> Option<SurfaceHit> {
        self.trace_within(ray, Interval::new(0.0, self.config.max_distance))
    }

    /// March along a ray, reporting only hits whose distance lies in `range`.
    ///
    /// Unsigned distances are used so rays inside a dielectric march to its
    /// far side.
    pub fn trace_within(&self, ray: &Ray, range: Interval) -> Option<SurfaceHit> {
        let mut t = range.min;
        for _ in 0..self.config.max_steps {
            let p = ray.at(t);
            let (d, class) = self.nearest(p);
            if d < self.config.hit_threshold {
                return Some(SurfaceHit { point: p, class, t });
            }
            t += d;
            if !range.contains(t) {
                return None;
            }
        }
        None
    }

    /// Outward unit normal of a channel, by central differences.
    pub fn normal_at(&self, p: Vec3, class: MaterialClass) -> Vec3 {
        let e = self.config.normal_epsilon;
        let field = &self.channels[class.index()];
        let gradient = Vec3::new(
            field.distance(p + Vec3::X * e) - field.distance(p - Vec3::X * e),
            field.distance(p + Vec3::Y * e) - field.distance(p - Vec3::Y * e),
            field.distance(p + Vec3::Z * e) - field.distance(p - Vec3::Z * e),
        );
        let n = gradient.normalize_or_zero();
        if n == Vec3::ZERO {
            Vec3::Y
        } else {
            n
        }
    }

    /// Whether the segment between two points is unoccluded.
    ///
    /// Both endpoints are pulled towards each other by the ray offset.
    pub fn visible(&self, a: Vec3, b: Vec3) -> bool {
        let delta = b - a;
        let length = delta.length();
        let offset = self.config.ray_offset();
        if length <= 2.0 * offset {
            return true;
        }
        let ray = Ray::new(a, delta);
        self.trace_within(&ray, Interval::new(offset, length - offset))
            .is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sdf::{PlaneSdf, SphereSdf};

    fn empty() -> Box<dyn Sdf> {
        Box::new(SdfUnion::new())
    }

    fn sphere_scene() -> SdfScene {
        SdfScene::new(
            empty(),
            empty(),
            Box::new(SphereSdf {
                center: Vec3::new(0.0, 0.0, -5.0),
                radius: 1.0,
            }),
            MarchConfig::default(),
        )
    }

    #[test]
    fn test_trace_hits_analytic_distance() {
        let scene = sphere_scene();
        let ray = Ray::new(Vec3::ZERO, Vec3::new(0.0, 0.0, -1.0));
        let hit = scene.trace(&ray).expect("ray should hit the sphere");
        assert_eq!(hit.class, MaterialClass::Diffuse);
        let expected = Vec3::new(0.0, 0.0, -4.0);
        let tolerance = scene.config().hit_threshold;
        assert!((hit.t - 4.0).abs() <= tolerance);
        assert!((hit.point - expected).length() <= tolerance);

        // Off-axis ray with a known chord
        let target = Vec3::new(0.6, 0.0, -5.0 + 0.8);
        let ray = Ray::new(Vec3::ZERO, target);
        let hit = scene.trace(&ray).unwrap();
        assert!((hit.point - target).length() < 10.0 * tolerance);
    }

    #[test]
    fn test_trace_misses() {
        let scene = sphere_scene();
        let ray = Ray::new(Vec3::ZERO, Vec3::new(0.0, 1.0, 0.0));
        assert!(scene.trace(&ray).is_none());

        let none = SdfScene::new(empty(), empty(), empty(), MarchConfig::default());
        assert!(none.trace(&ray).is_none());
    }

    #[test]
    fn test_trace_picks_nearest_channel() {
        let scene = SdfScene::new(
            Box::new(SphereSdf {
                center: Vec3::new(0.0, 0.0, -3.0),
                radius: 1.0,
            }),
            Box::new(SphereSdf {
                center: Vec3::new(0.0, 0.0, -10.0),
                radius: 1.0,
            }),
            Box::new(PlaneSdf::new(Vec3::Z, -20.0)),
            MarchConfig::default(),
        );
        let ray = Ray::new(Vec3::ZERO, Vec3::NEG_Z);
        let hit = scene.trace(&ray).unwrap();
        assert_eq!(hit.class, MaterialClass::Dielectric);

        // Starting inside the dielectric marches to its far side
        let inside = Ray::new(Vec3::new(0.0, 0.0, -3.0), Vec3::NEG_Z);
        let hit = scene.trace(&inside).unwrap();
        assert_eq!(hit.class, MaterialClass::Dielectric);
        assert!((hit.point.z + 4.0).abs() < 1e-3);
    }

    #[test]
    fn test_normal_at_sphere() {
        let scene = sphere_scene();
        let p = Vec3::new(0.0, 1.0, -5.0);
        let n = scene.normal_at(p, MaterialClass::Diffuse);
        assert!((n - Vec3::Y).length() < 1e-3);
        assert!((n.length() - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_spawn_follows_direction_side() {
        let shading = ShadingPoint {
            point: Vec3::ZERO,
            basis: Basis::from_normal(Vec3::Y),
            offset: 0.01,
        };
        assert_eq!(shading.spawn(Vec3::new(1.0, 1.0, 0.0)).y, 0.01);
        assert_eq!(shading.spawn(Vec3::NEG_Y).y, -0.01);
        assert_eq!(shading.normal(), Vec3::Y);
    }

    #[test]
    fn test_visibility() {
        let scene = sphere_scene();
        assert!(!scene.visible(Vec3::ZERO, Vec3::new(0.0, 0.0, -10.0)));
        assert!(scene.visible(Vec3::ZERO, Vec3::new(0.0, 3.0, 0.0)));
        // A point resting on the sphere sees the origin
        assert!(scene.visible(Vec3::new(0.0, 0.0, -4.0), Vec3::ZERO));
        assert!(scene.trace(&Ray::new(Vec3::ZERO, Vec3::Y)).is_none());
    }
}
