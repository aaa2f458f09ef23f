//! Light sources.
//!
//! Each light answers two questions: how to emit a random photon (photon
//! pass) and which shadow rays to test from a shading point (direct pass).

use crate::sampling::gen_f32;
use crate::{Color, Ray};
use lux_math::{
    cosine_hemisphere_direction, orthonormal_basis, uniform_sphere_direction, Vec3,
    LARGE_EPSILON,
};
use rand::RngCore;

/// Trait for light sources.
pub trait Light: Send + Sync {
    /// Total color (power) of the light.
    fn light_color(&self) -> Color;

    /// A random photon ray leaving the light, following its emission
    /// distribution.
    fn generate_random_photon_ray(&self, rng: &mut dyn RngCore) -> Ray;

    /// Shadow rays from `point` (with surface normal `normal`) toward the
    /// light. Bounded rays end at the light.
    fn compute_sample_rays(&self, point: Vec3, normal: Vec3) -> Vec<Ray>;

    /// Scale applied to each sample ray's contribution at `point`.
    fn compute_light_attenuation(&self, _point: Vec3) -> f32 {
        1.0
    }
}

/// Origin for a shadow ray leaving a surface, nudged off it.
#[inline]
fn shadow_origin(point: Vec3, normal: Vec3) -> Vec3 {
    point + normal * LARGE_EPSILON
}

/// Point light emitting uniformly in every direction.
#[derive(Debug, Clone)]
pub struct PointLight {
    position: Vec3,
    color: Color,
}

impl PointLight {
    pub fn new(position: Vec3, color: Color) -> Self {
        Self { position, color }
    }
}

impl Light for PointLight {
    fn light_color(&self) -> Color {
        self.color
    }

    fn generate_random_photon_ray(&self, rng: &mut dyn RngCore) -> Ray {
        let direction = uniform_sphere_direction(gen_f32(rng), gen_f32(rng));
        Ray::new(self.position, direction)
    }

    fn compute_sample_rays(&self, point: Vec3, normal: Vec3) -> Vec<Ray> {
        vec![Ray::between(shadow_origin(point, normal), self.position)]
    }
}

/// Rectangular one-sided area light.
///
/// Shadow rays go to the centers of a `samples_u x samples_v` grid over the
/// rectangle; each carries `1 / (samples_u * samples_v)` of the light.
#[derive(Debug, Clone)]
pub struct AreaLight {
    /// One corner of the rectangle
    corner: Vec3,
    edge_u: Vec3,
    edge_v: Vec3,
    /// Emitting side, `edge_u x edge_v`
    facing: Vec3,
    color: Color,
    samples_u: u32,
    samples_v: u32,
}

impl AreaLight {
    /// Rectangle spanned by `edge_u` and `edge_v` from `corner`, emitting
    /// on the side of `edge_u x edge_v`.
    pub fn new(corner: Vec3, edge_u: Vec3, edge_v: Vec3, color: Color) -> Self {
        Self {
            corner,
            edge_u,
            edge_v,
            facing: edge_u.cross(edge_v).normalize_or_zero(),
            color,
            samples_u: 2,
            samples_v: 2,
        }
    }

    /// Set the shadow-ray grid resolution (at least 1x1).
    pub fn with_samples(mut self, samples_u: u32, samples_v: u32) -> Self {
        self.samples_u = samples_u.max(1);
        self.samples_v = samples_v.max(1);
        self
    }

    fn sample_count(&self) -> u32 {
        self.samples_u * self.samples_v
    }
}

impl Light for AreaLight {
    fn light_color(&self) -> Color {
        self.color
    }

    fn generate_random_photon_ray(&self, rng: &mut dyn RngCore) -> Ray {
        let origin = self.corner + gen_f32(rng) * self.edge_u + gen_f32(rng) * self.edge_v;
        let direction = cosine_hemisphere_direction(self.facing, gen_f32(rng), gen_f32(rng));
        Ray::new(origin + self.facing * LARGE_EPSILON, direction)
    }

    fn compute_sample_rays(&self, point: Vec3, normal: Vec3) -> Vec<Ray> {
        let origin = shadow_origin(point, normal);
        let mut rays = Vec::with_capacity(self.sample_count() as usize);

        for i in 0..self.samples_u {
            for j in 0..self.samples_v {
                let s = (i as f32 + 0.5) / self.samples_u as f32;
                let t = (j as f32 + 0.5) / self.samples_v as f32;
                let target = self.corner + s * self.edge_u + t * self.edge_v;
                rays.push(Ray::between(origin, target));
            }
        }

        rays
    }

    fn compute_light_attenuation(&self, _point: Vec3) -> f32 {
        1.0 / self.sample_count() as f32
    }
}

/// Distant light shining along a fixed direction.
///
/// Photons start on a bounded square orthogonal to the direction, since the
/// light itself has no position.
#[derive(Debug, Clone)]
pub struct DirectionalLight {
    direction: Vec3,
    color: Color,
    emission_center: Vec3,
    emission_half_extent: f32,
}

impl DirectionalLight {
    /// Light travelling along `direction`. Photons are emitted from a 2x2
    /// square centered 4 units up-light of the origin.
    pub fn new(direction: Vec3, color: Color) -> Self {
        let direction = direction.normalize_or_zero();
        Self {
            direction,
            color,
            emission_center: -4.0 * direction,
            emission_half_extent: 1.0,
        }
    }

    /// Place the photon emission square.
    pub fn with_emission_plane(mut self, center: Vec3, half_extent: f32) -> Self {
        self.emission_center = center;
        self.emission_half_extent = half_extent.max(0.0);
        self
    }

    pub fn direction(&self) -> Vec3 {
        self.direction
    }
}

impl Light for DirectionalLight {
    fn light_color(&self) -> Color {
        self.color
    }

    fn generate_random_photon_ray(&self, rng: &mut dyn RngCore) -> Ray {
        let (tangent, bitangent) = orthonormal_basis(self.direction);
        let u = (gen_f32(rng) * 2.0 - 1.0) * self.emission_half_extent;
        let v = (gen_f32(rng) * 2.0 - 1.0) * self.emission_half_extent;
        Ray::new(
            self.emission_center + u * tangent + v * bitangent,
            self.direction,
        )
    }

    fn compute_sample_rays(&self, point: Vec3, normal: Vec3) -> Vec<Ray> {
        vec![Ray::new(shadow_origin(point, normal), -self.direction)]
    }
}
