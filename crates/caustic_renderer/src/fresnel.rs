//! Fresnel reflectance and specular direction helpers.
//!
//! Directions follow the path tracing convention: every vector points away
//! from the surface, and cosines are taken against the normal of the side
//! named in each function.

use caustic_math::Vec3;

/// Unpolarized Fresnel reflectance at a dielectric interface.
///
/// The sign of `cos_incident` picks the side: positive means the light
/// arrives from the exterior (`ior_external`), negative from the interior.
/// Returns 1 past the critical angle.
pub fn fresnel_dielectric(cos_incident: f32, ior_internal: f32, ior_external: f32) -> f32 {
    let (eta_i, eta_t, cos_i) = if cos_incident > 0.0 {
        (ior_external, ior_internal, cos_incident.min(1.0))
    } else {
        (ior_internal, ior_external, (-cos_incident).min(1.0))
    };

    let sin_i = (1.0 - cos_i * cos_i).max(0.0).sqrt();
    let sin_t = eta_i / eta_t * sin_i;
    if sin_t >= 1.0 {
        return 1.0;
    }
    let cos_t = (1.0 - sin_t * sin_t).max(0.0).sqrt();

    let r_s = (eta_i * cos_i - eta_t * cos_t) / (eta_i * cos_i + eta_t * cos_t);
    let r_p = (eta_t * cos_i - eta_i * cos_t) / (eta_t * cos_i + eta_i * cos_t);
    (r_s * r_s + r_p * r_p) / 2.0
}

/// Unpolarized Fresnel reflectance of a conductor `n + ik` seen from air.
pub fn fresnel_conductor(cos_incident: f32, ior_n: f32, ior_k: f32) -> f32 {
    let cos_i = cos_incident.abs().min(1.0);
    let cos2 = cos_i * cos_i;
    let sin2 = 1.0 - cos2;
    let n2 = ior_n * ior_n;
    let k2 = ior_k * ior_k;

    let t0 = n2 - k2 - sin2;
    let a2_plus_b2 = (t0 * t0 + 4.0 * n2 * k2).max(0.0).sqrt();
    let a = (0.5 * (a2_plus_b2 + t0)).max(0.0).sqrt();

    let t1 = a2_plus_b2 + cos2;
    let t2 = 2.0 * cos_i * a;
    let r_s = (t1 - t2) / (t1 + t2).max(f32::MIN_POSITIVE);

    let t3 = cos2 * a2_plus_b2 + sin2 * sin2;
    let t4 = t2 * sin2;
    let r_p = r_s * (t3 - t4) / (t3 + t4).max(f32::MIN_POSITIVE);

    (0.5 * (r_s + r_p)).clamp(0.0, 1.0)
}

/// Mirror `w` about `n`.
#[inline]
pub fn reflect(w: Vec3, n: Vec3) -> Vec3 {
    2.0 * w.dot(n) * n - w
}

/// Direction on the far side of an interface.
///
/// `dir` points away from the surface on the side `normal` faces, and
/// `eta_ratio` is (index on that side) / (index on the far side). Snell's law
/// is inverted to recover the partner direction, also pointing away from the
/// surface. Returns `None` on total internal reflection.
pub fn refract(normal: Vec3, eta_ratio: f32, dir: Vec3) -> Option<Vec3> {
    let cos_i = normal.dot(dir);
    let sin2_i = (1.0 - cos_i * cos_i).max(0.0);
    let sin2_t = eta_ratio * eta_ratio * sin2_i;
    if sin2_t >= 1.0 {
        return None;
    }
    let cos_t = (1.0 - sin2_t).sqrt();
    Some(-eta_ratio * dir + (eta_ratio * cos_i - cos_t) * normal)
}
