//! Built-in Cornell box demo scene.

use lux_math::Vec3;
use lux_renderer::{
    BlinnPhong, Camera, Color, Lambertian, LensSettings, Material, PointLight, Scene, Sphere,
    Triangle,
};

const HALF_WIDTH: f32 = 1.0;
const HEIGHT: f32 = 2.0;

fn add_quad<M: Material + Clone + 'static>(scene: &mut Scene, corners: [Vec3; 4], material: M) {
    let [a, b, c, d] = corners;
    for tri in Triangle::quad(a, b, c, d, material) {
        scene.add_object(tri);
    }
}

/// Cornell box, open toward +Z, with a mirror ball, a glass ball and a
/// point light under the ceiling.
pub fn cornell_box() -> Scene {
    let mut scene = Scene::new();
    let (w, h) = (HALF_WIDTH, HEIGHT);
    let p = Vec3::new;

    let white = BlinnPhong::new(Color::splat(0.6)).with_specular(Color::splat(0.4), 40.0);
    let red = Lambertian::new(Color::new(0.63, 0.06, 0.04));
    let green = Lambertian::new(Color::new(0.15, 0.48, 0.09));

    // Floor, ceiling, back
    add_quad(&mut scene, [p(-w, 0.0, -w), p(-w, 0.0, w), p(w, 0.0, w), p(w, 0.0, -w)], white.clone());
    add_quad(&mut scene, [p(-w, h, -w), p(w, h, -w), p(w, h, w), p(-w, h, w)], white.clone());
    add_quad(&mut scene, [p(-w, 0.0, -w), p(w, 0.0, -w), p(w, h, -w), p(-w, h, -w)], white);
    // Left, right
    add_quad(&mut scene, [p(-w, 0.0, -w), p(-w, h, -w), p(-w, h, w), p(-w, 0.0, w)], red);
    add_quad(&mut scene, [p(w, 0.0, -w), p(w, 0.0, w), p(w, h, w), p(w, h, -w)], green);

    scene.add_object(Sphere::new(p(-0.45, 0.35, -0.3), 0.35, BlinnPhong::mirror(Color::splat(0.9))));
    scene.add_object(Sphere::new(p(0.45, 0.35, 0.3), 0.35, BlinnPhong::glass(1.5)));

    scene.add_light(PointLight::new(p(0.0, h - 0.05, 0.0), Color::ONE));
    scene
}

/// Camera framing the box opening. Focuses on the box center unless the
/// lens names another distance.
pub fn cornell_camera(width: u32, height: u32, lens: &LensSettings) -> Camera {
    let look_from = Vec3::new(0.0, 1.0, 3.9);
    let look_at = Vec3::new(0.0, 1.0, 0.0);
    let focus_dist = lens
        .focus_distance
        .unwrap_or_else(|| look_from.distance(look_at));

    let mut camera = Camera::new()
        .with_resolution(width, height)
        .with_position(look_from, look_at, Vec3::Y)
        .with_lens(40.0, lens.defocus_angle, focus_dist);
    camera.initialize();
    camera
}

#[cfg(test)]
mod tests {
    use super::*;
    use lux_renderer::{IntersectionState, Ray};
    use rand::SeedableRng;

    #[test]
    fn test_cornell_box_is_closed_on_five_sides() {
        let scene = cornell_box();
        assert_eq!(scene.object_count(), 12);
        assert_eq!(scene.lights().len(), 1);

        for direction in [Vec3::X, -Vec3::X, Vec3::Y, -Vec3::Y, -Vec3::Z] {
            let mut state = IntersectionState::default();
            let ray = Ray::new(Vec3::new(0.0, 1.0, 0.5), direction);
            assert!(scene.trace(&ray, &mut state), "no wall along {direction}");
        }
    }

    #[test]
    fn test_camera_sees_back_wall() {
        let scene = cornell_box();
        let camera = cornell_camera(64, 64, &LensSettings::default());
        let mut state = IntersectionState::default();

        assert!(!camera.has_defocus());
        assert!(scene.trace(&camera.get_ray_centered(32, 32), &mut state));
        assert!((state.point.z + HALF_WIDTH).abs() < 1e-3);
    }

    #[test]
    fn test_lens_settings_reach_camera() {
        let lens = LensSettings {
            defocus_angle: 2.0,
            focus_distance: None,
        };
        let camera = cornell_camera(64, 64, &lens);
        assert!(camera.has_defocus());

        // Default focus sits on the look-at point, so lens rays through the
        // middle pixel meet at the box center
        let pinhole = cornell_camera(64, 64, &LensSettings::default());
        let target = pinhole.get_ray_centered(32, 32).at(3.9);
        let mut rng = rand::rngs::StdRng::seed_from_u64(5);
        for _ in 0..16 {
            let ray = camera.get_ray(32, 32, &mut rng);
            let t = (target.z - ray.origin().z) / ray.direction().z;
            assert!((ray.at(t) - target).length() < 0.05);
        }
    }
}
