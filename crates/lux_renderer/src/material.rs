//! Material trait describing how surfaces respond to light.

use crate::{trace_reflection, trace_refraction, IntersectionState, Ray, Renderer};
use lux_math::Vec3;

/// Color type alias (linear RGB, usually 0-1 but unbounded)
pub type Color = Vec3;

/// Trait for materials that describe how light interacts with surfaces.
///
/// The renderers only talk to materials through this trait: the BRDF for a
/// single light sample, the light-independent term, and a handful of
/// coefficients the photon tracer needs to decide how a photon continues.
pub trait Material: Send + Sync {
    /// Response to light arriving along `light_ray` and leaving towards the
    /// origin of `camera_ray`.
    fn compute_brdf(
        &self,
        intersection: &IntersectionState,
        light_color: Color,
        light_ray: &Ray,
        camera_ray: &Ray,
        attenuation: f32,
    ) -> Color;

    /// Light that does not depend on any light sample (ambient, mirror and
    /// refraction contributions).
    ///
    /// `renderer` is the outermost renderer, so recursive rays are shaded
    /// the same way as camera rays.
    fn compute_non_light_dependent_brdf(
        &self,
        renderer: &dyn Renderer,
        intersection: &IntersectionState,
    ) -> Color;

    /// True if the surface has a mirror component.
    fn is_reflective(&self) -> bool {
        false
    }

    /// True if light can pass through the surface.
    fn is_transmissive(&self) -> bool {
        false
    }

    /// True if the surface scatters light diffusely.
    fn has_diffuse_reflection(&self) -> bool {
        self.base_diffuse_reflection().max_element() > 0.0
    }

    fn base_diffuse_reflection(&self) -> Color {
        Color::ZERO
    }

    fn base_specular_reflection(&self) -> Color {
        Color::ZERO
    }

    fn base_transmittance(&self) -> Color {
        Color::ZERO
    }

    /// Index of refraction of the material's interior.
    fn ior(&self) -> f32 {
        1.0
    }
}

/// Lambertian (diffuse) material.
#[derive(Debug, Clone)]
pub struct Lambertian {
    albedo: Color,
}

impl Lambertian {
    /// Create a new Lambertian material with the given albedo color.
    pub fn new(albedo: Color) -> Self {
        Self { albedo }
    }
}

impl Material for Lambertian {
    fn compute_brdf(
        &self,
        intersection: &IntersectionState,
        light_color: Color,
        light_ray: &Ray,
        _camera_ray: &Ray,
        attenuation: f32,
    ) -> Color {
        let n_dot_l = intersection.facing_normal().dot(light_ray.direction());
        self.albedo * light_color * n_dot_l.max(0.0) * attenuation
    }

    fn compute_non_light_dependent_brdf(
        &self,
        _renderer: &dyn Renderer,
        _intersection: &IntersectionState,
    ) -> Color {
        Color::ZERO
    }

    fn base_diffuse_reflection(&self) -> Color {
        self.albedo
    }
}

/// Blinn-Phong material with optional mirror reflection and transmission.
#[derive(Debug, Clone)]
pub struct BlinnPhong {
    diffuse: Color,
    specular: Color,
    shininess: f32,
    ambient: Color,
    /// Per-channel fraction of light reflected as a perfect mirror
    reflectivity: Color,
    /// Fraction of light transmitted through the surface
    transmittance: f32,
    ior: f32,
}

impl BlinnPhong {
    /// Create a purely diffuse Blinn-Phong material.
    pub fn new(diffuse: Color) -> Self {
        Self {
            diffuse,
            specular: Color::ZERO,
            shininess: 1.0,
            ambient: Color::ZERO,
            reflectivity: Color::ZERO,
            transmittance: 0.0,
            ior: 1.0,
        }
    }

    /// A tinted mirror. The tint colors both the highlight and the
    /// reflected image.
    pub fn mirror(tint: Color) -> Self {
        Self::new(Color::ZERO)
            .with_specular(tint, 200.0)
            .with_reflection_color(tint)
    }

    /// Clear glass with the given index of refraction.
    pub fn glass(ior: f32) -> Self {
        Self::new(Color::ZERO)
            .with_specular(Color::splat(0.4), 120.0)
            .with_reflectivity(0.1)
            .with_transmittance(0.9)
            .with_ior(ior)
    }

    /// Set the highlight color and exponent.
    pub fn with_specular(mut self, specular: Color, shininess: f32) -> Self {
        self.specular = specular;
        self.shininess = shininess.max(0.0);
        self
    }

    pub fn with_ambient(mut self, ambient: Color) -> Self {
        self.ambient = ambient;
        self
    }

    /// Gray mirror reflection.
    pub fn with_reflectivity(self, reflectivity: f32) -> Self {
        self.with_reflection_color(Color::splat(reflectivity))
    }

    /// Tinted mirror reflection, each channel in [0, 1].
    pub fn with_reflection_color(mut self, reflectivity: Color) -> Self {
        self.reflectivity = reflectivity.clamp(Color::ZERO, Color::ONE);
        self
    }

    pub fn with_transmittance(mut self, transmittance: f32) -> Self {
        self.transmittance = transmittance.clamp(0.0, 1.0);
        self
    }

    pub fn with_ior(mut self, ior: f32) -> Self {
        self.ior = ior;
        self
    }
}

impl Material for BlinnPhong {
    fn compute_brdf(
        &self,
        intersection: &IntersectionState,
        light_color: Color,
        light_ray: &Ray,
        camera_ray: &Ray,
        attenuation: f32,
    ) -> Color {
        let n = intersection.facing_normal();
        let l = light_ray.direction();
        let n_dot_l = n.dot(l);
        if n_dot_l <= 0.0 {
            return Color::ZERO;
        }

        let diffuse = self.diffuse * n_dot_l;

        let half_vector = (l - camera_ray.direction()).normalize_or_zero();
        let n_dot_h = n.dot(half_vector).max(0.0);
        let specular = self.specular * n_dot_h.powf(self.shininess);

        (diffuse + specular) * light_color * attenuation
    }

    fn compute_non_light_dependent_brdf(
        &self,
        renderer: &dyn Renderer,
        intersection: &IntersectionState,
    ) -> Color {
        let mut color = self.ambient;
        if self.is_reflective() {
            color += self.reflectivity * trace_reflection(renderer, intersection);
        }
        if self.is_transmissive() {
            color +=
                self.transmittance * trace_refraction(renderer, intersection, self.ior);
        }
        color
    }

    fn is_reflective(&self) -> bool {
        self.reflectivity.max_element() > 0.0
    }

    fn is_transmissive(&self) -> bool {
        self.transmittance > 0.0
    }

    fn base_diffuse_reflection(&self) -> Color {
        self.diffuse
    }

    fn base_specular_reflection(&self) -> Color {
        self.reflectivity
    }

    fn base_transmittance(&self) -> Color {
        Color::splat(self.transmittance)
    }

    fn ior(&self) -> f32 {
        self.ior
    }
}
