//! Photon records and the light paths that produce them.

use crate::{Color, Ray};
use lux_math::Vec3;

/// One hop of a photon's journey.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathTag {
    /// Left a light source
    Light,
    /// Scattered off a diffuse surface
    Diffuse,
    /// Mirror reflection or refraction
    Specular,
}

/// Hops taken so far by one photon, used to decide storage and continuation.
///
/// Each recursive branch owns its own path, so sibling branches (reflected
/// and refracted caustic photons) never see each other's hops.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LightPath {
    tags: Vec<PathTag>,
}

impl LightPath {
    /// A path that has just left a light.
    pub fn from_light() -> Self {
        Self {
            tags: vec![PathTag::Light],
        }
    }

    /// Append a hop.
    pub fn push(&mut self, tag: PathTag) {
        self.tags.push(tag);
    }

    /// Copy of this path extended by one hop.
    pub fn with(&self, tag: PathTag) -> Self {
        let mut next = self.clone();
        next.push(tag);
        next
    }

    pub fn len(&self) -> usize {
        self.tags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }

    /// True while the photon is still on its way from the light to the
    /// first surface it hits.
    pub fn is_first_hop(&self) -> bool {
        self.tags.len() <= 1
    }

    /// Number of specular hops taken.
    pub fn specular_hops(&self) -> usize {
        self.tags.iter().filter(|&&t| t == PathTag::Specular).count()
    }

    pub fn tags(&self) -> &[PathTag] {
        &self.tags
    }
}

/// A stored sample of light arriving at a surface point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Photon {
    pub position: Vec3,
    /// Power carried by the photon when it arrived
    pub intensity: Color,
    /// Ray from the photon position back toward where it came from
    pub to_light_ray: Ray,
    /// Surface normal at the storage point, facing the incoming photon
    pub normal: Vec3,
    /// Length of the light path when the photon was stored
    pub path_length: u16,
    /// Specular hops on the path before storage
    pub specular_hops: u16,
}

impl Photon {
    /// Record a photon that arrived at `position` along `incident`.
    pub fn new(
        position: Vec3,
        intensity: Color,
        incident: &Ray,
        normal: Vec3,
        path: &LightPath,
    ) -> Self {
        Self {
            position,
            intensity,
            to_light_ray: Ray::new(position, -incident.direction()),
            normal,
            path_length: path.len().min(u16::MAX as usize) as u16,
            specular_hops: path.specular_hops().min(u16::MAX as usize) as u16,
        }
    }
}
