//! Density estimation over gathered photons.

use crate::{Color, IntersectionState, Photon, Ray};
use std::f32::consts::PI;

/// Radiance leaving the hit point toward the camera, estimated from the
/// photons found within `radius` of it.
///
/// Photons whose stored normal disagrees with the surface normal (dot at or
/// below `normal_threshold`) are skipped; they belong to another surface
/// that happens to be close by. The sum over the remaining photons is
/// divided by the disk area `π r²`, scaled by `found / used` so the skipped
/// photons do not darken the estimate.
pub fn estimate_radiance(
    intersection: &IntersectionState,
    camera_ray: &Ray,
    photons: &[&Photon],
    radius: f32,
    normal_threshold: f32,
) -> Color {
    if photons.is_empty() || !(radius > 0.0) {
        return Color::ZERO;
    }

    let normal = intersection.facing_normal();
    let material = intersection.material;

    let mut sum = Color::ZERO;
    let mut used = 0usize;
    for photon in photons {
        if normal.dot(photon.normal) <= normal_threshold {
            continue;
        }
        sum += material.compute_brdf(
            intersection,
            photon.intensity,
            &photon.to_light_ray,
            camera_ray,
            1.0,
        );
        used += 1;
    }

    if used == 0 {
        return Color::ZERO;
    }

    let area = used as f32 * PI * radius * radius;
    sum * (photons.len() as f32 / area)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Lambertian, LightPath, PathTag};
    use lux_math::Vec3;

    fn photon(normal: Vec3, intensity: Color) -> Photon {
        let mut path = LightPath::from_light();
        path.push(PathTag::Diffuse);
        Photon::new(
            Vec3::ZERO,
            intensity,
            &Ray::new(Vec3::Y, -Vec3::Y),
            normal,
            &path,
        )
    }

    fn floor_hit(material: &Lambertian) -> IntersectionState<'_> {
        let mut state = IntersectionState::default();
        state.record_hit(&Ray::new(Vec3::Y, -Vec3::Y), 1.0, Vec3::Y, material);
        state
    }

    #[test]
    fn test_density_estimate() {
        let white = Lambertian::new(Color::ONE);
        let state = floor_hit(&white);
        let photons = [photon(Vec3::Y, Color::splat(0.1)), photon(Vec3::Y, Color::splat(0.1))];
        let refs: Vec<&Photon> = photons.iter().collect();

        let radius = 0.1;
        let color = estimate_radiance(&state, &state.ray, &refs, radius, 0.5);

        let expected = 0.2 / (2.0 * PI * radius * radius) * 2.0;
        assert!((color.x - expected).abs() < 1e-3 * expected);
    }

    #[test]
    fn test_filtered_photons_rescale_estimate() {
        let white = Lambertian::new(Color::ONE);
        let state = floor_hit(&white);
        let photons = [photon(Vec3::Y, Color::splat(0.1)), photon(Vec3::X, Color::splat(5.0))];
        let refs: Vec<&Photon> = photons.iter().collect();

        let radius = 0.1;
        let color = estimate_radiance(&state, &state.ray, &refs, radius, 0.5);

        // One of two used: sum / (1 * π r²) * 2
        let expected = 0.1 * 2.0 / (PI * radius * radius);
        assert!((color.x - expected).abs() < 1e-3 * expected);
    }

    #[test]
    fn test_no_usable_photons_is_black() {
        let white = Lambertian::new(Color::ONE);
        let state = floor_hit(&white);

        assert_eq!(estimate_radiance(&state, &state.ray, &[], 0.03, 0.5), Color::ZERO);

        let wall = [photon(Vec3::X, Color::ONE)];
        let refs: Vec<&Photon> = wall.iter().collect();
        let color = estimate_radiance(&state, &state.ray, &refs, 0.03, 0.5);
        assert_eq!(color, Color::ZERO);
        assert!(!color.is_nan());
    }
}
