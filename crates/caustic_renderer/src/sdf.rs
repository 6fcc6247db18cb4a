//! Signed distance primitives.

use caustic_core::ShapeDesc;
use caustic_math::{Vec2, Vec3};

/// A signed distance field: negative inside, positive outside.
///
/// The magnitude must never exceed the true distance to the surface, or the
/// sphere tracer may step through it.
pub trait Sdf: Send + Sync {
    fn distance(&self, p: Vec3) -> f32;
}

impl<F> Sdf for F
where
    F: Fn(Vec3) -> f32 + Send + Sync,
{
    fn distance(&self, p: Vec3) -> f32 {
        self(p)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SphereSdf {
    pub center: Vec3,
    pub radius: f32,
}

impl Sdf for SphereSdf {
    fn distance(&self, p: Vec3) -> f32 {
        (p - self.center).length() - self.radius
    }
}

/// Half-space `dot(p, normal) <= offset`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlaneSdf {
    normal: Vec3,
    offset: f32,
}

impl PlaneSdf {
    pub fn new(normal: Vec3, offset: f32) -> Self {
        let length = normal.length();
        Self {
            normal: normal / length,
            offset: offset / length,
        }
    }
}

impl Sdf for PlaneSdf {
    fn distance(&self, p: Vec3) -> f32 {
        p.dot(self.normal) - self.offset
    }
}

/// Axis-aligned box, optionally with rounded edges.
///
/// The rounding radius is carved out of the half extents, so the outer
/// bounds stay the same.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoxSdf {
    pub center: Vec3,
    pub half_extents: Vec3,
    pub radius: f32,
}

impl Sdf for BoxSdf {
    fn distance(&self, p: Vec3) -> f32 {
        let r = self.radius.min(self.half_extents.min_element());
        let q = (p - self.center).abs() - (self.half_extents - Vec3::splat(r));
        q.max(Vec3::ZERO).length() + q.max_element().min(0.0) - r
    }
}

/// Torus around the y axis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TorusSdf {
    pub center: Vec3,
    pub major_radius: f32,
    pub minor_radius: f32,
}

impl Sdf for TorusSdf {
    fn distance(&self, p: Vec3) -> f32 {
        let p = p - self.center;
        let q = Vec2::new(Vec2::new(p.x, p.z).length() - self.major_radius, p.y);
        q.length() - self.minor_radius
    }
}

/// Capped cylinder along the y axis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CylinderSdf {
    pub center: Vec3,
    pub radius: f32,
    pub half_height: f32,
}

impl Sdf for CylinderSdf {
    fn distance(&self, p: Vec3) -> f32 {
        let p = p - self.center;
        let d = Vec2::new(Vec2::new(p.x, p.z).length(), p.y.abs())
            - Vec2::new(self.radius, self.half_height);
        d.x.max(d.y).min(0.0) + d.max(Vec2::ZERO).length()
    }
}

/// Union of shapes. Empty unions are infinitely far from every point.
#[derive(Default)]
pub struct SdfUnion {
    shapes: Vec<Box<dyn Sdf>>,
}

impl SdfUnion {
    pub fn new() -> Self {
        Self { shapes: Vec::new() }
    }

    pub fn add(&mut self, shape: Box<dyn Sdf>) {
        self.shapes.push(shape);
    }

    pub fn len(&self) -> usize {
        self.shapes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shapes.is_empty()
    }

    /// Build from scene description shapes.
    pub fn from_shapes(shapes: &[ShapeDesc]) -> Self {
        let mut union = Self::new();
        for shape in shapes {
            union.add(shape_sdf(shape));
        }
        union
    }
}

impl Sdf for SdfUnion {
    fn distance(&self, p: Vec3) -> f32 {
        self.shapes
            .iter()
            .map(|s| s.distance(p))
            .fold(f32::INFINITY, f32::min)
    }
}

/// Convert one described shape into its field.
pub fn shape_sdf(shape: &ShapeDesc) -> Box<dyn Sdf> {
    match *shape {
        ShapeDesc::Sphere { center, radius } => Box::new(SphereSdf {
            center: Vec3::from_array(center),
            radius,
        }),
        ShapeDesc::Plane { normal, offset } => {
            Box::new(PlaneSdf::new(Vec3::from_array(normal), offset))
        }
        ShapeDesc::Box {
            center,
            half_extents,
        } => Box::new(BoxSdf {
            center: Vec3::from_array(center),
            half_extents: Vec3::from_array(half_extents),
            radius: 0.0,
        }),
        ShapeDesc::RoundedBox {
            center,
            half_extents,
            radius,
        } => Box::new(BoxSdf {
            center: Vec3::from_array(center),
            half_extents: Vec3::from_array(half_extents),
            radius,
        }),
        ShapeDesc::Torus {
            center,
            major_radius,
            minor_radius,
        } => Box::new(TorusSdf {
            center: Vec3::from_array(center),
            major_radius,
            minor_radius,
        }),
        ShapeDesc::Cylinder {
            center,
            radius,
            half_height,
        } => Box::new(CylinderSdf {
            center: Vec3::from_array(center),
            radius,
            half_height,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sphere_distance() {
        let s = SphereSdf {
            center: Vec3::new(0.0, 1.0, 0.0),
            radius: 0.5,
        };
        assert!((s.distance(Vec3::new(0.0, 3.0, 0.0)) - 1.5).abs() < 1e-6);
        assert!((s.distance(Vec3::new(0.0, 1.0, 0.0)) + 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_plane_normalizes_input() {
        let plane = PlaneSdf::new(Vec3::new(0.0, 2.0, 0.0), 2.0);
        // Surface at y = 1
        assert!((plane.distance(Vec3::new(5.0, 3.0, -2.0)) - 2.0).abs() < 1e-6);
        assert!(plane.distance(Vec3::ZERO) < 0.0);
    }

    #[test]
    fn test_box_and_rounded_box() {
        let b = BoxSdf {
            center: Vec3::ZERO,
            half_extents: Vec3::ONE,
            radius: 0.0,
        };
        assert!((b.distance(Vec3::new(2.0, 0.0, 0.0)) - 1.0).abs() < 1e-6);
        assert!((b.distance(Vec3::new(2.0, 2.0, 1.0)) - 2f32.sqrt()).abs() < 1e-6);
        assert!((b.distance(Vec3::ZERO) + 1.0).abs() < 1e-6);

        let rounded = BoxSdf { radius: 0.25, ..b };
        // Faces are unchanged, corners are pulled in
        assert!((rounded.distance(Vec3::new(2.0, 0.0, 0.0)) - 1.0).abs() < 1e-6);
        assert!(rounded.distance(Vec3::splat(1.0)) > 0.0);
    }

    #[test]
    fn test_torus_and_cylinder() {
        let torus = TorusSdf {
            center: Vec3::ZERO,
            major_radius: 1.0,
            minor_radius: 0.25,
        };
        assert!((torus.distance(Vec3::new(1.0, 0.0, 0.0)) + 0.25).abs() < 1e-6);
        assert!((torus.distance(Vec3::ZERO) - 0.75).abs() < 1e-6);

        let cylinder = CylinderSdf {
            center: Vec3::ZERO,
            radius: 0.5,
            half_height: 1.0,
        };
        assert!((cylinder.distance(Vec3::new(0.0, 2.0, 0.0)) - 1.0).abs() < 1e-6);
        assert!((cylinder.distance(Vec3::new(1.5, 0.0, 0.0)) - 1.0).abs() < 1e-6);
        assert!(cylinder.distance(Vec3::ZERO) < 0.0);
    }

    #[test]
    fn test_union_takes_minimum() {
        let empty = SdfUnion::new();
        assert!(empty.is_empty());
        assert_eq!(empty.distance(Vec3::ZERO), f32::INFINITY);

        let union = SdfUnion::from_shapes(&[
            ShapeDesc::Sphere {
                center: [-2.0, 0.0, 0.0],
                radius: 1.0,
            },
            ShapeDesc::Sphere {
                center: [2.0, 0.0, 0.0],
                radius: 1.0,
            },
        ]);
        assert_eq!(union.len(), 2);
        assert!((union.distance(Vec3::ZERO) - 1.0).abs() < 1e-6);
        assert!(union.distance(Vec3::new(2.0, 0.0, 0.0)) < 0.0);
    }

    #[test]
    fn test_closures_are_fields() {
        let field = |p: Vec3| p.y;
        assert_eq!(field.distance(Vec3::new(0.0, 2.0, 0.0)), 2.0);
    }
}
