//! Reflection, refraction and direction sampling helpers.
//!
//! Sampling functions take their uniform variates as arguments so callers
//! decide where randomness comes from.

use crate::Vec3;
use std::f32::consts::PI;

/// Outcome of bending a ray across an interface.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Refraction {
    /// Unit direction of the transmitted ray.
    Transmitted(Vec3),
    /// Incidence is beyond the critical angle.
    TotalInternalReflection,
}

/// Reflect a vector about a normal.
#[inline]
pub fn reflect(v: Vec3, n: Vec3) -> Vec3 {
    v - 2.0 * v.dot(n) * n
}

/// Flip `n` so that it faces against `incident`.
#[inline]
pub fn face_forward(n: Vec3, incident: Vec3) -> Vec3 {
    if incident.dot(n) > 0.0 {
        -n
    } else {
        n
    }
}

/// Refract a unit direction through an interface with Snell's law.
///
/// `n` may face either side; it is oriented against `incident` first.
/// `from_ior` is the medium the ray travels in, `to_ior` the one it enters.
pub fn refract(incident: Vec3, n: Vec3, from_ior: f32, to_ior: f32) -> Refraction {
    let n = face_forward(n, incident);
    let eta = from_ior / to_ior;
    let cos_i = (-incident.dot(n)).min(1.0);
    let k = 1.0 - eta * eta * (1.0 - cos_i * cos_i);

    if k < 0.0 {
        return Refraction::TotalInternalReflection;
    }

    let direction = eta * incident + (eta * cos_i - k.sqrt()) * n;
    Refraction::Transmitted(direction.normalize())
}

/// Tangent and bitangent completing a right-handed frame around unit `n`.
#[inline]
pub fn orthonormal_basis(n: Vec3) -> (Vec3, Vec3) {
    n.any_orthonormal_pair()
}

/// Cosine-weighted direction on the hemisphere around unit normal `n`.
///
/// `u1`, `u2` are uniform in [0, 1).
pub fn cosine_hemisphere_direction(n: Vec3, u1: f32, u2: f32) -> Vec3 {
    let r = u1.sqrt();
    let theta = 2.0 * PI * u2;
    let x = r * theta.cos();
    let y = r * theta.sin();
    let z = (1.0 - u1).max(0.0).sqrt();

    let (t, b) = orthonormal_basis(n);
    (x * t + y * b + z * n).normalize()
}

/// Uniformly distributed direction on the unit sphere.
pub fn uniform_sphere_direction(u1: f32, u2: f32) -> Vec3 {
    let z = 1.0 - 2.0 * u1;
    let r = (1.0 - z * z).max(0.0).sqrt();
    let phi = 2.0 * PI * u2;
    Vec3::new(r * phi.cos(), r * phi.sin(), z)
}
