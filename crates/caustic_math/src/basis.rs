//! Orthonormal shading frames.

use crate::Vec3;

/// An orthonormal (tangent, bitangent, normal) frame.
///
/// Local shading space has the normal along +z, so `to_local(n) == Vec3::Z`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Basis {
    pub tangent: Vec3,
    pub bitangent: Vec3,
    pub normal: Vec3,
}

impl Basis {
    /// Build a frame around a unit normal.
    ///
    /// Uses the branchless construction of Duff et al. 2017, which stays
    /// continuous everywhere except across the `normal.z = 0` plane sign flip.
    pub fn from_normal(normal: Vec3) -> Self {
        let sign = 1.0_f32.copysign(normal.z);
        let a = -1.0 / (sign + normal.z);
        let b = normal.x * normal.y * a;
        let tangent = Vec3::new(1.0 + sign * normal.x * normal.x * a, sign * b, -sign * normal.x);
        let bitangent = Vec3::new(b, sign + normal.y * normal.y * a, -normal.y);
        Self {
            tangent,
            bitangent,
            normal,
        }
    }

    /// Express a world-space direction in this frame.
    #[inline]
    pub fn to_local(&self, v: Vec3) -> Vec3 {
        Vec3::new(v.dot(self.tangent), v.dot(self.bitangent), v.dot(self.normal))
    }

    /// Map a local-space direction back to world space.
    #[inline]
    pub fn to_world(&self, v: Vec3) -> Vec3 {
        self.tangent * v.x + self.bitangent * v.y + self.normal * v.z
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_orthonormal(basis: &Basis) {
        assert!((basis.tangent.length() - 1.0).abs() < 1e-5);
        assert!((basis.bitangent.length() - 1.0).abs() < 1e-5);
        assert!(basis.tangent.dot(basis.bitangent).abs() < 1e-5);
        assert!(basis.tangent.dot(basis.normal).abs() < 1e-5);
        assert!(basis.bitangent.dot(basis.normal).abs() < 1e-5);
    }

    #[test]
    fn test_basis_orthonormal() {
        for n in [
            Vec3::Z,
            -Vec3::Z,
            Vec3::X,
            Vec3::new(1.0, 2.0, -3.0).normalize(),
            Vec3::new(-0.3, 0.1, 0.9).normalize(),
        ] {
            let basis = Basis::from_normal(n);
            assert_orthonormal(&basis);
            assert!((basis.to_local(n) - Vec3::Z).length() < 1e-5);
        }
    }

    #[test]
    fn test_basis_round_trip() {
        let basis = Basis::from_normal(Vec3::new(0.2, -0.7, 0.4).normalize());
        let v = Vec3::new(0.3, 0.5, -0.8);
        let back = basis.to_world(basis.to_local(v));
        assert!((back - v).length() < 1e-5);
    }
}
