//! Lux Renderer - CPU photon mapping
//!
//! Renders a static scene in two phases. `Renderer::initialize` emits photons
//! from the lights and stores where they land in kd-tree photon maps; shading
//! then traces camera rays, adds direct light from shadow rays, and gathers
//! nearby photons for indirect light and caustics.

mod camera;
mod config;
mod gather;
mod hittable;
mod intersection;
mod light;
mod material;
mod photon;
mod photon_map;
mod photon_renderer;
mod photon_tracer;
mod renderer;
mod scene;
mod sphere;
mod triangle;

pub mod sampling;

pub use camera::Camera;
pub use config::{ConfigError, ConfigResult, GatherMode, LensSettings, PhotonSettings, RenderConfig};
pub use gather::estimate_radiance;
pub use hittable::{Hittable, HittableList};
pub use intersection::IntersectionState;
pub use light::{AreaLight, DirectionalLight, Light, PointLight};
pub use material::{BlinnPhong, Color, Lambertian, Material};
pub use photon::{LightPath, PathTag, Photon};
pub use photon_map::{PhotonMap, PhotonMapBuilder};
pub use photon_renderer::PhotonMappingRenderer;
pub use photon_tracer::{
    photon_quotas, russian_roulette, DiffuseScatter, LightQuota, PhotonMapKind, PhotonTracer,
    MAX_PHOTON_DEPTH,
};
pub use renderer::{
    color_to_rgba, linear_to_gamma, ray_color, render, render_pixel, trace_reflection,
    trace_refraction, BackwardRenderer, ImageBuffer, OutputError, OutputResult, Renderer,
};
pub use scene::Scene;
pub use sphere::Sphere;
pub use triangle::Triangle;

/// Re-export Vec3 and common math types from lux_math
pub use lux_math::{Aabb, Interval, Ray, Vec3};
