//! Per-trace intersection state.

use crate::{Color, Material, Ray, Renderer};
use lux_math::{face_forward, Vec3};

/// Material used by states that have not hit anything yet.
/// Reflects nothing and is fully opaque.
struct NoMaterial;

impl Material for NoMaterial {
    fn compute_brdf(
        &self,
        _intersection: &IntersectionState,
        _light_color: Color,
        _light_ray: &Ray,
        _camera_ray: &Ray,
        _attenuation: f32,
    ) -> Color {
        Color::ZERO
    }

    fn compute_non_light_dependent_brdf(
        &self,
        _renderer: &dyn Renderer,
        _intersection: &IntersectionState,
    ) -> Color {
        Color::ZERO
    }
}

static NO_MATERIAL: NoMaterial = NoMaterial;

/// Result of tracing one ray, plus the budgets that bound recursive shading.
///
/// A fresh state is created for every `Scene::trace` call and never kept
/// beyond the shading of that hit.
#[derive(Clone)]
pub struct IntersectionState<'a> {
    /// Whether the ray hit anything
    pub has_intersection: bool,
    /// Distance along the ray to the hit
    pub t: f32,
    /// The ray that produced this hit
    pub ray: Ray,
    /// Point of intersection
    pub point: Vec3,
    /// Outward geometric normal (unit length)
    pub normal: Vec3,
    /// Material of the intersected object
    pub material: &'a dyn Material,
    /// Index of refraction of the medium the ray travels in
    pub current_ior: f32,
    /// Remaining specular reflection bounces for camera paths
    pub remaining_reflections: u32,
    /// Remaining refraction bounces for camera paths
    pub remaining_refractions: u32,
}

impl<'a> IntersectionState<'a> {
    /// Create an empty state in air with the given bounce budgets.
    pub fn new(max_reflections: u32, max_refractions: u32) -> Self {
        Self {
            has_intersection: false,
            t: f32::INFINITY,
            ray: Ray::default(),
            point: Vec3::ZERO,
            normal: Vec3::ZERO,
            material: &NO_MATERIAL,
            current_ior: 1.0,
            remaining_reflections: max_reflections,
            remaining_refractions: max_refractions,
        }
    }

    /// Same state travelling through a medium with index `ior`.
    pub fn with_ior(mut self, ior: f32) -> Self {
        self.current_ior = ior;
        self
    }

    /// Record a hit. Primitives call this from `Hittable::hit`.
    pub fn record_hit(
        &mut self,
        ray: &Ray,
        t: f32,
        outward_normal: Vec3,
        material: &'a dyn Material,
    ) {
        self.has_intersection = true;
        self.t = t;
        self.ray = *ray;
        self.point = ray.at(t);
        self.normal = outward_normal;
        self.material = material;
    }

    /// Whether the ray arrived on the outside of the surface.
    pub fn front_face(&self) -> bool {
        self.ray.direction().dot(self.normal) < 0.0
    }

    /// The normal flipped to face the side the ray came from.
    pub fn facing_normal(&self) -> Vec3 {
        face_forward(self.normal, self.ray.direction())
    }
}

impl Default for IntersectionState<'_> {
    fn default() -> Self {
        Self::new(0, 0)
    }
}
