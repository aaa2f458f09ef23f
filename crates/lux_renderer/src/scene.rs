//! Scene container: geometry plus lights.

use crate::{Hittable, HittableList, IntersectionState, Light, Ray};
use lux_math::{Interval, SMALL_EPSILON};

/// Static scene handed to the renderers.
///
/// Geometry is tested by linear scan; the photon and shading passes only
/// need `trace`.
#[derive(Default)]
pub struct Scene {
    objects: HittableList,
    lights: Vec<Box<dyn Light>>,
}

impl Scene {
    /// Create an empty scene.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a piece of geometry.
    pub fn add_object(&mut self, object: impl Hittable + 'static) {
        self.objects.add(Box::new(object));
    }

    /// Add a light source.
    pub fn add_light(&mut self, light: impl Light + 'static) {
        self.lights.push(Box::new(light));
    }

    /// All lights in insertion order.
    pub fn lights(&self) -> &[Box<dyn Light>] {
        &self.lights
    }

    /// Number of geometric objects.
    pub fn object_count(&self) -> usize {
        self.objects.len()
    }

    /// Trace `ray` against the scene, up to `ray.max_t`.
    ///
    /// On a hit, fills `state` and returns true. The state's IOR and bounce
    /// budgets are left as the caller set them.
    pub fn trace<'a>(&'a self, ray: &Ray, state: &mut IntersectionState<'a>) -> bool {
        state.has_intersection = false;
        state.ray = *ray;

        let ray_t = Interval::new(SMALL_EPSILON, f32::INFINITY).clipped_to(ray.max_t());
        self.objects.hit(ray, ray_t, state)
    }
}
