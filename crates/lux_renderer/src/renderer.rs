//! Backward ray tracing.
//!
//! Implements:
//! - The `Renderer` trait shared by the backward and photon-mapping renderers
//! - Direct lighting with shadow rays that pass through transmissive occluders
//! - Recursive mirror reflection and refraction for camera paths
//! - The per-pixel driver, rendering rows in parallel, and PNG output

use crate::sampling::{resolve_seed, stream_rng};
use crate::{Camera, Color, IntersectionState, RenderConfig, Scene};
use lux_math::{face_forward, reflect, refract, Ray, Refraction, LARGE_EPSILON, SMALL_EPSILON};
use rand::RngCore;
use rayon::prelude::*;
use std::path::Path;
use std::time::Instant;
use thiserror::Error;

/// Shades camera-ray hits.
///
/// Implementations are shared across shading threads once `initialize` has
/// run, so shading only takes `&self`.
pub trait Renderer: Send + Sync {
    /// The scene being rendered.
    fn scene(&self) -> &Scene;

    /// One-time preprocessing before any pixel is shaded.
    fn initialize(&mut self) {}

    /// Color leaving the hit in `intersection` toward the origin of
    /// `camera_ray`. A state without a hit is black.
    fn compute_sample_color(&self, intersection: &IntersectionState, camera_ray: &Ray) -> Color;
}

/// Shade the mirror reflection of a hit through `renderer`.
///
/// Consumes one reflection bounce; returns black once the budget is spent or
/// the reflected ray leaves the scene.
pub fn trace_reflection(renderer: &dyn Renderer, intersection: &IntersectionState) -> Color {
    if intersection.remaining_reflections == 0 {
        return Color::ZERO;
    }

    let normal = intersection.facing_normal();
    let direction = reflect(intersection.ray.direction(), normal);
    let ray = Ray::new(intersection.point + normal * LARGE_EPSILON, direction);

    let mut state = IntersectionState::new(
        intersection.remaining_reflections - 1,
        intersection.remaining_refractions,
    )
    .with_ior(intersection.current_ior);

    if !renderer.scene().trace(&ray, &mut state) {
        return Color::ZERO;
    }
    renderer.compute_sample_color(&state, &ray)
}

/// Shade the light refracted through a hit on a surface whose interior has
/// index `ior`.
///
/// Rays entering the surface move into `ior`, rays leaving move back into
/// air. Total internal reflection continues along the mirror direction in the
/// same medium. Consumes one refraction bounce.
pub fn trace_refraction(renderer: &dyn Renderer, intersection: &IntersectionState, ior: f32) -> Color {
    if intersection.remaining_refractions == 0 {
        return Color::ZERO;
    }

    let incoming = intersection.ray.direction();
    let entering = incoming.dot(intersection.normal) < SMALL_EPSILON;
    let target_ior = if entering { ior } else { 1.0 };
    let current_ior = intersection.current_ior;

    let (direction, next_ior) = match refract(incoming, intersection.normal, current_ior, target_ior) {
        Refraction::Transmitted(direction) => (direction, target_ior),
        Refraction::TotalInternalReflection => {
            (reflect(incoming, intersection.facing_normal()), current_ior)
        }
    };

    let exit_side = face_forward(intersection.normal, -direction);
    let ray = Ray::new(intersection.point + exit_side * LARGE_EPSILON, direction);

    let mut state = IntersectionState::new(
        intersection.remaining_reflections,
        intersection.remaining_refractions - 1,
    )
    .with_ior(next_ior);

    if !renderer.scene().trace(&ray, &mut state) {
        return Color::ZERO;
    }
    renderer.compute_sample_color(&state, &ray)
}

/// Direct lighting plus each material's light-independent term.
pub struct BackwardRenderer<'s> {
    scene: &'s Scene,
    shadow_bounce_cap: u32,
}

impl<'s> BackwardRenderer<'s> {
    pub fn new(scene: &'s Scene, config: &RenderConfig) -> Self {
        Self {
            scene,
            shadow_bounce_cap: config.shadow_bounce_cap,
        }
    }

    /// Shade a hit, recursing for specular terms through `outer`.
    ///
    /// Wrapping renderers pass themselves as `outer` so reflected and
    /// refracted rays pick up their extra terms too.
    pub fn shade(
        &self,
        outer: &dyn Renderer,
        intersection: &IntersectionState,
        camera_ray: &Ray,
    ) -> Color {
        if !intersection.has_intersection {
            return Color::ZERO;
        }

        let direct = self.compute_direct(intersection, camera_ray);
        direct
            + intersection
                .material
                .compute_non_light_dependent_brdf(outer, intersection)
    }

    /// Sum of BRDF responses to every visible light sample.
    pub fn compute_direct(&self, intersection: &IntersectionState, camera_ray: &Ray) -> Color {
        if !intersection.has_intersection {
            return Color::ZERO;
        }

        let point = intersection.point;
        let normal = intersection.facing_normal();
        let material = intersection.material;

        let mut color = Color::ZERO;
        for light in self.scene.lights() {
            let attenuation = light.compute_light_attenuation(point);
            for sample_ray in light.compute_sample_rays(point, normal) {
                if let Some(light_color) = self.shadow_transmission(&sample_ray, light.light_color())
                {
                    color +=
                        material.compute_brdf(intersection, light_color, &sample_ray, camera_ray, attenuation);
                }
            }
        }
        color
    }

    /// Light color surviving the walk along a shadow ray, or `None` if an
    /// opaque surface blocks it.
    ///
    /// Each transmissive surface crossed scales the color by the square root
    /// of its transmittance; a closed object is crossed twice. After
    /// `shadow_bounce_cap` crossings the light counts as visible.
    pub fn shadow_transmission(&self, ray: &Ray, light_color: Color) -> Option<Color> {
        let mut ray = *ray;
        let mut color = light_color;

        for _ in 0..self.shadow_bounce_cap {
            if ray.max_t() <= 0.0 {
                break;
            }

            let mut state = IntersectionState::default();
            if !self.scene.trace(&ray, &mut state) {
                break;
            }

            let material = state.material;
            if !material.is_transmissive() {
                return None;
            }

            let t = material.base_transmittance();
            color *= Color::new(t.x.max(0.0).sqrt(), t.y.max(0.0).sqrt(), t.z.max(0.0).sqrt());
            ray = ray.continued_past(state.t, LARGE_EPSILON);
        }

        Some(color)
    }
}

impl Renderer for BackwardRenderer<'_> {
    fn scene(&self) -> &Scene {
        self.scene
    }

    fn compute_sample_color(&self, intersection: &IntersectionState, camera_ray: &Ray) -> Color {
        self.shade(self, intersection, camera_ray)
    }
}

/// Errors that can occur while writing an image.
#[derive(Error, Debug)]
pub enum OutputError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Image encoding error: {0}")]
    ImageError(#[from] image::ImageError),
}

pub type OutputResult<T> = Result<T, OutputError>;

/// Apply gamma correction (gamma = 2.0).
#[inline]
pub fn linear_to_gamma(linear: f32) -> f32 {
    if linear > 0.0 {
        linear.sqrt()
    } else {
        0.0
    }
}

/// Convert a linear color to gamma-corrected 8-bit RGBA.
pub fn color_to_rgba(color: Color) -> [u8; 4] {
    let channel = |c: f32| (255.0 * linear_to_gamma(c).clamp(0.0, 1.0)) as u8;
    [channel(color.x), channel(color.y), channel(color.z), 255]
}

/// Linear color image produced by `render`.
#[derive(Debug, Clone)]
pub struct ImageBuffer {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<Color>,
}

impl ImageBuffer {
    /// Create a new image buffer filled with black.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![Color::ZERO; (width * height) as usize],
        }
    }

    /// Get the pixel at (x, y).
    pub fn get(&self, x: u32, y: u32) -> Color {
        self.pixels[(y * self.width + x) as usize]
    }

    /// Set the pixel at (x, y).
    pub fn set(&mut self, x: u32, y: u32, color: Color) {
        self.pixels[(y * self.width + x) as usize] = color;
    }

    /// Convert to RGBA bytes.
    pub fn to_rgba(&self) -> Vec<u8> {
        self.pixels
            .iter()
            .flat_map(|&color| color_to_rgba(color))
            .collect()
    }

    /// Write the image as a PNG.
    pub fn save_png(&self, path: impl AsRef<Path>) -> OutputResult<()> {
        let path = path.as_ref();
        image::save_buffer_with_format(
            path,
            &self.to_rgba(),
            self.width,
            self.height,
            image::ColorType::Rgba8,
            image::ImageFormat::Png,
        )?;
        log::info!("Wrote {}x{} image to {}", self.width, self.height, path.display());
        Ok(())
    }
}

/// Trace a camera ray and shade whatever it hits. Misses are black.
pub fn ray_color(renderer: &dyn Renderer, ray: &Ray, config: &RenderConfig) -> Color {
    let mut state =
        IntersectionState::new(config.max_reflection_bounces, config.max_refraction_bounces);
    if !renderer.scene().trace(ray, &mut state) {
        return Color::ZERO;
    }
    renderer.compute_sample_color(&state, ray)
}

/// Average color of pixel (x, y). A single pinhole sample goes through the
/// pixel center; otherwise samples are jittered across the pixel and lens.
pub fn render_pixel(
    camera: &Camera,
    renderer: &dyn Renderer,
    x: u32,
    y: u32,
    config: &RenderConfig,
    rng: &mut dyn RngCore,
) -> Color {
    if config.samples_per_pixel <= 1 && !camera.has_defocus() {
        return ray_color(renderer, &camera.get_ray_centered(x, y), config);
    }

    let mut pixel_color = Color::ZERO;
    for _ in 0..config.samples_per_pixel {
        let ray = camera.get_ray(x, y, rng);
        pixel_color += ray_color(renderer, &ray, config);
    }
    pixel_color / config.samples_per_pixel as f32
}

/// Stream ids for pixel rows start here, away from photon batch streams.
const ROW_STREAM_BASE: u64 = 1 << 40;

/// Render the scene seen by `camera`, rows in parallel.
///
/// The renderer must already be initialized. The image takes the camera's
/// resolution.
pub fn render(camera: &Camera, renderer: &dyn Renderer, config: &RenderConfig) -> ImageBuffer {
    let start = Instant::now();
    let seed = resolve_seed(config.seed);
    let (width, height) = (camera.image_width, camera.image_height);
    log::info!(
        "Rendering {}x{} at {} spp (seed {})",
        width,
        height,
        config.samples_per_pixel,
        seed
    );

    let rows: Vec<Vec<Color>> = (0..height)
        .into_par_iter()
        .map(|y| {
            let mut rng = stream_rng(seed, ROW_STREAM_BASE + y as u64);
            (0..width)
                .map(|x| render_pixel(camera, renderer, x, y, config, &mut rng))
                .collect()
        })
        .collect();

    let mut image = ImageBuffer::new(width, height);
    for (y, row) in rows.into_iter().enumerate() {
        for (x, color) in row.into_iter().enumerate() {
            image.set(x as u32, y as u32, color);
        }
    }
    log::info!("Render finished in {:?}", start.elapsed());
    image
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{BlinnPhong, Lambertian, PointLight, Sphere, Triangle};
    use lux_math::Vec3;

    fn floor(scene: &mut Scene, material: impl crate::Material + Clone + 'static) {
        for tri in Triangle::quad(
            Vec3::new(-5.0, 0.0, -5.0),
            Vec3::new(-5.0, 0.0, 5.0),
            Vec3::new(5.0, 0.0, 5.0),
            Vec3::new(5.0, 0.0, -5.0),
            material,
        ) {
            scene.add_object(tri);
        }
    }

    fn occluded_floor(occluder: impl crate::Material + 'static) -> Scene {
        let mut scene = Scene::new();
        floor(&mut scene, Lambertian::new(Color::splat(0.5)));
        scene.add_object(Sphere::new(Vec3::new(0.0, 1.0, 0.0), 0.3, occluder));
        scene.add_light(PointLight::new(Vec3::new(0.0, 3.0, 0.0), Color::ONE));
        scene
    }

    fn shadow_ray() -> Ray {
        Ray::between(Vec3::new(0.0, LARGE_EPSILON, 0.0), Vec3::new(0.0, 3.0, 0.0))
    }

    #[test]
    fn test_opaque_occluder_blocks_light() {
        let scene = occluded_floor(Lambertian::new(Color::ONE));
        let renderer = BackwardRenderer::new(&scene, &RenderConfig::default());

        assert_eq!(renderer.shadow_transmission(&shadow_ray(), Color::ONE), None);
    }

    #[test]
    fn test_clear_occluder_does_not_darken() {
        let scene = occluded_floor(BlinnPhong::new(Color::ZERO).with_transmittance(1.0));
        let renderer = BackwardRenderer::new(&scene, &RenderConfig::default());

        let color = renderer.shadow_transmission(&shadow_ray(), Color::ONE).unwrap();
        assert!((color - Color::ONE).length() < 1e-6);
    }

    #[test]
    fn test_each_crossing_applies_sqrt_transmittance() {
        let scene = occluded_floor(BlinnPhong::new(Color::ZERO).with_transmittance(0.81));
        let renderer = BackwardRenderer::new(&scene, &RenderConfig::default());

        // Entry and exit: 0.9 * 0.9
        let color = renderer.shadow_transmission(&shadow_ray(), Color::ONE).unwrap();
        assert!((color.x - 0.81).abs() < 1e-4);
    }

    #[test]
    fn test_exhausted_shadow_walk_counts_as_visible() {
        let scene = occluded_floor(Lambertian::new(Color::ONE));
        let config = RenderConfig {
            shadow_bounce_cap: 0,
            ..RenderConfig::default()
        };
        let renderer = BackwardRenderer::new(&scene, &config);

        assert_eq!(renderer.shadow_transmission(&shadow_ray(), Color::ONE), Some(Color::ONE));
    }

    #[test]
    fn test_light_behind_shadow_ray_end_is_ignored() {
        let scene = occluded_floor(Lambertian::new(Color::ONE));
        let renderer = BackwardRenderer::new(&scene, &RenderConfig::default());

        // Ends below the occluder
        let short = Ray::between(Vec3::new(0.0, LARGE_EPSILON, 0.0), Vec3::new(0.0, 0.5, 0.0));
        assert_eq!(renderer.shadow_transmission(&short, Color::ONE), Some(Color::ONE));
    }

    #[test]
    fn test_lit_and_shadowed_hemispheres() {
        let mut scene = Scene::new();
        scene.add_object(Sphere::new(Vec3::ZERO, 1.0, Lambertian::new(Color::splat(0.5))));
        scene.add_light(PointLight::new(Vec3::new(0.0, 5.0, 0.0), Color::ONE));
        let config = RenderConfig::default();
        let renderer = BackwardRenderer::new(&scene, &config);

        let from_above = Ray::new(Vec3::new(0.0, 3.0, 0.0), -Vec3::Y);
        let from_below = Ray::new(Vec3::new(0.0, -3.0, 0.0), Vec3::Y);

        let top = ray_color(&renderer, &from_above, &config);
        let bottom = ray_color(&renderer, &from_below, &config);

        assert!((top - Color::splat(0.5)).length() < 1e-3);
        assert_eq!(bottom, Color::ZERO);
    }

    #[test]
    fn test_no_lights_is_black() {
        let mut scene = Scene::new();
        scene.add_object(Sphere::new(Vec3::ZERO, 1.0, Lambertian::new(Color::ONE)));
        let config = RenderConfig::default();
        let renderer = BackwardRenderer::new(&scene, &config);

        let ray = Ray::new(Vec3::new(0.0, 0.0, 3.0), -Vec3::Z);
        assert_eq!(ray_color(&renderer, &ray, &config), Color::ZERO);
        assert_eq!(
            renderer.compute_sample_color(&IntersectionState::default(), &ray),
            Color::ZERO
        );
    }

    /// Mirror floor reflecting a lit diffuse sphere.
    fn mirror_scene() -> Scene {
        let mut scene = Scene::new();
        floor(&mut scene, BlinnPhong::mirror(Color::ONE));
        scene.add_object(Sphere::new(
            Vec3::new(-2.0, 1.0, 0.0),
            0.5,
            Lambertian::new(Color::splat(0.5)),
        ));
        scene.add_light(PointLight::new(Vec3::new(0.0, 3.0, 0.0), Color::ONE));
        scene
    }

    #[test]
    fn test_reflection_respects_budget() {
        let scene = mirror_scene();
        let renderer = BackwardRenderer::new(&scene, &RenderConfig::default());
        let camera_ray = Ray::new(Vec3::new(2.0, 1.0, 0.0), Vec3::new(-2.0, -1.0, 0.0));

        let mut state = IntersectionState::new(1, 0);
        assert!(scene.trace(&camera_ray, &mut state));
        assert!(trace_reflection(&renderer, &state).x > 0.0);

        let mut spent = IntersectionState::new(0, 0);
        assert!(scene.trace(&camera_ray, &mut spent));
        assert_eq!(trace_reflection(&renderer, &spent), Color::ZERO);
    }

    #[test]
    fn test_tinted_mirror_colors_reflection() {
        let red = Color::new(1.0, 0.0, 0.0);
        let mut scene = Scene::new();
        floor(&mut scene, BlinnPhong::mirror(red));
        scene.add_object(Sphere::new(
            Vec3::new(-2.0, 1.0, 0.0),
            0.5,
            BlinnPhong::new(Color::ZERO).with_ambient(Color::ONE),
        ));
        let config = RenderConfig::default();
        let renderer = BackwardRenderer::new(&scene, &config);

        // White glow seen in a red mirror comes back red only
        let camera_ray = Ray::new(Vec3::new(2.0, 1.0, 0.0), Vec3::new(-2.0, -1.0, 0.0));
        let color = ray_color(&renderer, &camera_ray, &config);
        assert!((color - red).length() < 1e-4, "got {color}");
    }

    #[test]
    fn test_refraction_passes_through_glass() {
        let mut scene = Scene::new();
        scene.add_object(Sphere::new(Vec3::ZERO, 1.0, BlinnPhong::glass(1.5)));
        scene.add_object(Sphere::new(
            Vec3::new(0.0, 0.0, -4.0),
            1.0,
            BlinnPhong::new(Color::ZERO).with_ambient(Color::ONE),
        ));
        let renderer = BackwardRenderer::new(&scene, &RenderConfig::default());
        let camera_ray = Ray::new(Vec3::new(0.0, 0.0, 4.0), -Vec3::Z);

        // In through the front, out through the back (scaled by the glass
        // transmittance), then the glowing sphere behind it
        let mut state = IntersectionState::new(0, 2);
        assert!(scene.trace(&camera_ray, &mut state));
        let through = trace_refraction(&renderer, &state, 1.5);
        assert!((through - Color::splat(0.9)).length() < 1e-4);

        let mut one_bounce = IntersectionState::new(0, 1);
        assert!(scene.trace(&camera_ray, &mut one_bounce));
        assert_eq!(trace_refraction(&renderer, &one_bounce, 1.5), Color::ZERO);
    }

    #[test]
    fn test_linear_to_gamma() {
        assert_eq!(linear_to_gamma(0.0), 0.0);
        assert_eq!(linear_to_gamma(-1.0), 0.0);
        assert!((linear_to_gamma(0.25) - 0.5).abs() < 0.0001);
        assert_eq!(color_to_rgba(Color::new(1.0, 4.0, 0.0)), [255, 255, 0, 255]);
    }

    #[test]
    fn test_render_is_reproducible() {
        let mut scene = Scene::new();
        scene.add_object(Sphere::new(
            Vec3::new(0.0, 0.0, -3.0),
            1.0,
            Lambertian::new(Color::splat(0.8)),
        ));
        scene.add_light(PointLight::new(Vec3::new(0.0, 3.0, 0.0), Color::ONE));

        let config = RenderConfig {
            width: 12,
            height: 8,
            samples_per_pixel: 4,
            seed: Some(3),
            ..RenderConfig::default()
        };
        let mut camera = Camera::new().with_resolution(config.width, config.height);
        camera.initialize();
        let renderer = BackwardRenderer::new(&scene, &config);

        let a = render(&camera, &renderer, &config);
        let b = render(&camera, &renderer, &config);

        assert_eq!(a.pixels.len(), 96);
        assert_eq!(a.pixels, b.pixels);
        assert!(a.get(6, 4).length() > 0.0);
        assert_eq!(a.to_rgba().len(), 96 * 4);

        // Each row's first pixel comes straight off that row's stream
        for y in 0..config.height {
            let mut rng = stream_rng(3, ROW_STREAM_BASE + y as u64);
            let expected = render_pixel(&camera, &renderer, 0, y, &config, &mut rng);
            assert_eq!(a.get(0, y), expected);
        }
    }
}
