//! Triangle primitive for ray tracing.
//!
//! Uses the Möller-Trumbore algorithm for ray-triangle intersection.

use crate::{Hittable, IntersectionState, Material, Ray};
use lux_math::{Interval, Vec3};

/// A single-sided-normal triangle; rays may hit either face.
pub struct Triangle<M: Material> {
    v0: Vec3,
    edge1: Vec3,
    edge2: Vec3,
    /// Unit face normal following the winding v0 -> v1 -> v2
    normal: Vec3,
    material: M,
}

impl<M: Material> Triangle<M> {
    /// Create a new triangle from three vertices.
    pub fn new(v0: Vec3, v1: Vec3, v2: Vec3, material: M) -> Self {
        let edge1 = v1 - v0;
        let edge2 = v2 - v0;

        Self {
            v0,
            edge1,
            edge2,
            normal: edge1.cross(edge2).normalize_or_zero(),
            material,
        }
    }

    /// Face normal of the triangle.
    pub fn normal(&self) -> Vec3 {
        self.normal
    }
}

impl<M: Material + Clone> Triangle<M> {
    /// Split the planar quad `a b c d` (in winding order) into two triangles.
    pub fn quad(a: Vec3, b: Vec3, c: Vec3, d: Vec3, material: M) -> [Self; 2] {
        [
            Self::new(a, b, c, material.clone()),
            Self::new(a, c, d, material),
        ]
    }
}

impl<M: Material + 'static> Hittable for Triangle<M> {
    fn hit<'a>(&'a self, ray: &Ray, ray_t: Interval, state: &mut IntersectionState<'a>) -> bool {
        let h = ray.direction().cross(self.edge2);
        let a = self.edge1.dot(h);

        // Ray is parallel to triangle
        if a.abs() < 1e-8 {
            return false;
        }

        let f = 1.0 / a;
        let s = ray.origin() - self.v0;
        let u = f * s.dot(h);
        if !(0.0..=1.0).contains(&u) {
            return false;
        }

        let q = s.cross(self.edge1);
        let v = f * ray.direction().dot(q);
        if v < 0.0 || u + v > 1.0 {
            return false;
        }

        let t = f * self.edge2.dot(q);
        if !ray_t.surrounds(t) {
            return false;
        }

        state.record_hit(ray, t, self.normal, &self.material);
        true
    }
}
