// Re-export glam for convenience
pub use glam::*;

// Lux math types
mod aabb;
mod interval;
mod optics;
mod ray;

pub use aabb::Aabb;
pub use interval::Interval;
pub use optics::{
    cosine_hemisphere_direction, face_forward, orthonormal_basis, reflect, refract,
    uniform_sphere_direction, Refraction,
};
pub use ray::Ray;

/// Tolerance for ray-surface hit distances and sign tests.
pub const SMALL_EPSILON: f32 = 1e-5;

/// Offset applied when re-emitting a ray from a surface, to avoid
/// immediate self-intersection.
pub const LARGE_EPSILON: f32 = 1e-4;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vec3_reexport() {
        let v = Vec3::new(0.2, 0.7, 0.5);
        assert_eq!(v.max_element(), 0.7);
    }

    #[test]
    fn test_epsilons_ordered() {
        assert!(SMALL_EPSILON < LARGE_EPSILON);
    }
}
