//! Photon emission and tracing.
//!
//! Lights emit photons in proportion to their intensity. Photons bounce
//! through the scene and are stored where they land, building either the
//! global (diffuse) map or the caustic map.
//!
//! Emission is split into fixed-size batches traced in parallel with rayon.
//! Each batch has its own RNG stream and photon buffer; buffers are merged in
//! batch order before the map is balanced, so a seed always gives the same map.

use crate::config::PhotonSettings;
use crate::sampling::{gen_f32, stream_rng};
use crate::{
    Color, IntersectionState, Light, LightPath, PathTag, Photon, PhotonMap, PhotonMapBuilder,
    Ray, Scene,
};
use lux_math::{
    cosine_hemisphere_direction, face_forward, reflect, refract, Refraction, Vec3,
    LARGE_EPSILON, SMALL_EPSILON,
};
use rand::RngCore;
use rayon::prelude::*;
use std::time::Instant;

/// Hard cap on path length, independent of the configured bounce count.
pub const MAX_PHOTON_DEPTH: usize = 64;

/// Photons traced per parallel batch.
const EMISSION_BATCH: usize = 4096;

/// Which photon map is being built.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhotonMapKind {
    /// Diffuse interreflection
    Global,
    /// Light focused through mirrors and glass onto diffuse surfaces
    Caustic,
}

/// Share of the photon budget assigned to one light.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LightQuota {
    pub light_index: usize,
    pub photons: usize,
    /// Power carried by each photon: light color / photons
    pub photon_intensity: Color,
}

/// Split `total` photons over `lights` in proportion to `|color|`.
///
/// Lights whose share rounds down to zero are left out. If the scene has no
/// light intensity at all, no quota is produced.
pub fn photon_quotas(lights: &[Box<dyn Light>], total: usize) -> Vec<LightQuota> {
    let total_intensity: f32 = lights.iter().map(|l| l.light_color().length()).sum();
    if !(total_intensity > 0.0) {
        if !lights.is_empty() {
            log::warn!("Scene lights have zero total intensity; no photons emitted");
        }
        return Vec::new();
    }

    lights
        .iter()
        .enumerate()
        .filter_map(|(light_index, light)| {
            let color = light.light_color();
            let proportion = color.length() / total_intensity;
            let photons = (proportion * total as f32) as usize;
            if photons == 0 {
                return None;
            }
            Some(LightQuota {
                light_index,
                photons,
                photon_intensity: color / photons as f32,
            })
        })
        .collect()
}

/// Outcome of a Russian-roulette scatter at a diffuse surface.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DiffuseScatter {
    pub direction: Vec3,
    /// Per-channel factor applied to the surviving photon's intensity
    pub throughput: Color,
}

/// Russian roulette at a diffuse surface with reflectance `diffuse`.
///
/// The photon survives with probability `pr = max channel of diffuse`; a
/// survivor leaves in a cosine-weighted direction about `normal` with its
/// intensity scaled by `diffuse / pr`, keeping the estimate unbiased.
pub fn russian_roulette(
    diffuse: Color,
    normal: Vec3,
    rng: &mut dyn RngCore,
) -> Option<DiffuseScatter> {
    let pr = diffuse.max_element();
    if !(pr > 0.0) || gen_f32(rng) >= pr {
        return None;
    }

    let direction = cosine_hemisphere_direction(normal, gen_f32(rng), gen_f32(rng));
    Some(DiffuseScatter {
        direction,
        throughput: diffuse / pr,
    })
}

/// Emits and traces photons through a scene.
pub struct PhotonTracer<'s> {
    scene: &'s Scene,
    max_bounces: i32,
    caustic_attempt_factor: usize,
}

impl<'s> PhotonTracer<'s> {
    pub fn new(scene: &'s Scene, settings: &PhotonSettings) -> Self {
        Self {
            scene,
            // Path length is capped anyway; keeps huge settings from wrapping
            max_bounces: settings.max_photon_bounces.min(MAX_PHOTON_DEPTH as u32) as i32,
            caustic_attempt_factor: settings.caustic_attempt_factor.max(1),
        }
    }

    /// Emit `total` photons and build a map of the given kind.
    pub fn generate_photon_map(&self, kind: PhotonMapKind, total: usize, seed: u64) -> PhotonMap {
        let start = Instant::now();
        let lights = self.scene.lights();
        let quotas = photon_quotas(lights, total);

        // (light, photons in batch, stream id)
        let mut batches = Vec::new();
        for quota in &quotas {
            log::debug!(
                "Light {}: {} photons at intensity {:?}",
                quota.light_index,
                quota.photons,
                quota.photon_intensity
            );
            let mut remaining = quota.photons;
            while remaining > 0 {
                let count = remaining.min(EMISSION_BATCH);
                batches.push((*quota, count, batches.len() as u64));
                remaining -= count;
            }
        }

        let results: Vec<(PhotonMapBuilder, usize)> = batches
            .par_iter()
            .map(|(quota, count, stream)| {
                let mut rng = stream_rng(seed, *stream);
                let mut builder = PhotonMapBuilder::new();
                let light = lights[quota.light_index].as_ref();
                let emitted = match kind {
                    PhotonMapKind::Global => self.emit_global(
                        light,
                        quota.photon_intensity,
                        *count,
                        &mut rng,
                        &mut builder,
                    ),
                    PhotonMapKind::Caustic => self.emit_caustic(
                        light,
                        quota.photon_intensity,
                        *count,
                        &mut rng,
                        &mut builder,
                    ),
                };
                (builder, emitted)
            })
            .collect();

        let requested: usize = quotas.iter().map(|q| q.photons).sum();
        let mut emitted = 0;
        let mut merged = PhotonMapBuilder::new();
        for (builder, count) in results {
            merged.merge(builder);
            emitted += count;
        }
        log::debug!("Merged {} batches", batches.len());

        if emitted < requested {
            log::warn!(
                "{:?} map: only {} of {} photons found a specular surface",
                kind,
                emitted,
                requested
            );
        }

        let map = merged.build();
        log::info!(
            "{:?} photon map: {} photons stored from {} emitted in {:?}",
            kind,
            map.len(),
            emitted,
            start.elapsed()
        );
        map
    }

    /// Emit `count` global photons from one light. Returns `count`.
    fn emit_global(
        &self,
        light: &dyn Light,
        intensity: Color,
        count: usize,
        rng: &mut dyn RngCore,
        builder: &mut PhotonMapBuilder,
    ) -> usize {
        for _ in 0..count {
            let ray = light.generate_random_photon_ray(rng);
            self.trace_global_photon(
                ray,
                intensity,
                LightPath::from_light(),
                1.0,
                self.max_bounces,
                rng,
                builder,
            );
        }
        count
    }

    /// Emit caustic photons until `count` have been accepted or the attempt
    /// cap is hit. Returns the number accepted.
    fn emit_caustic(
        &self,
        light: &dyn Light,
        intensity: Color,
        count: usize,
        rng: &mut dyn RngCore,
        builder: &mut PhotonMapBuilder,
    ) -> usize {
        let max_attempts = count.saturating_mul(self.caustic_attempt_factor);
        let mut accepted = 0;
        let mut attempts = 0;

        while accepted < count && attempts < max_attempts {
            attempts += 1;
            let ray = light.generate_random_photon_ray(rng);
            let path = LightPath::from_light();
            if self.trace_caustic_photon(ray, intensity, &path, 1.0, self.max_bounces, rng, builder) {
                accepted += 1;
            }
        }

        accepted
    }

    /// Trace one global photon, storing it at every hit after the first and
    /// continuing by Russian roulette.
    #[allow(clippy::too_many_arguments)]
    pub fn trace_global_photon(
        &self,
        ray: Ray,
        intensity: Color,
        mut path: LightPath,
        current_ior: f32,
        remaining_bounces: i32,
        rng: &mut dyn RngCore,
        builder: &mut PhotonMapBuilder,
    ) {
        if remaining_bounces < 0 || path.len() > MAX_PHOTON_DEPTH {
            return;
        }

        let mut state = IntersectionState::new(0, 0).with_ior(current_ior);
        if !self.scene.trace(&ray, &mut state) {
            return;
        }

        let normal = state.facing_normal();

        // Direct light is handled by the backward pass
        if !path.is_first_hop() {
            builder.insert(Photon::new(state.point, intensity, &ray, normal, &path));
        }

        let Some(scatter) = russian_roulette(state.material.base_diffuse_reflection(), normal, rng)
        else {
            return;
        };

        path.push(PathTag::Diffuse);
        let next = Ray::new(state.point + normal * LARGE_EPSILON, scatter.direction);
        self.trace_global_photon(
            next,
            intensity * scatter.throughput,
            path,
            current_ior,
            remaining_bounces - 1,
            rng,
            builder,
        );
    }

    /// Trace one caustic photon.
    ///
    /// Returns false if the photon's first hit is not specular; the caller
    /// re-emits so the photon count is preserved. Photons are stored only on
    /// diffuse surfaces reached after at least one specular hop, and both the
    /// reflected and refracted continuations are followed.
    #[allow(clippy::too_many_arguments)]
    pub fn trace_caustic_photon(
        &self,
        ray: Ray,
        intensity: Color,
        path: &LightPath,
        current_ior: f32,
        remaining_bounces: i32,
        rng: &mut dyn RngCore,
        builder: &mut PhotonMapBuilder,
    ) -> bool {
        let mut state = IntersectionState::new(0, 0).with_ior(current_ior);
        if !self.scene.trace(&ray, &mut state) {
            return !path.is_first_hop();
        }

        let material = state.material;
        let specular = material.is_reflective() || material.is_transmissive();
        if path.is_first_hop() && !specular {
            return false;
        }

        let incoming = ray.direction();
        let facing = state.facing_normal();

        if !path.is_first_hop() && material.has_diffuse_reflection() {
            builder.insert(Photon::new(state.point, intensity, &ray, facing, path));
        }

        if remaining_bounces < 1 || path.len() >= MAX_PHOTON_DEPTH {
            return true;
        }

        let path = path.with(PathTag::Specular);

        if material.is_reflective() {
            let reflected = Ray::new(
                state.point + facing * LARGE_EPSILON,
                reflect(incoming, facing),
            );
            self.trace_caustic_photon(
                reflected,
                intensity * material.base_specular_reflection(),
                &path,
                current_ior,
                remaining_bounces - 1,
                rng,
                builder,
            );
        }

        if material.is_transmissive() {
            let entering = incoming.dot(state.normal) < SMALL_EPSILON;
            let target_ior = if entering { material.ior() } else { 1.0 };

            let (direction, next_ior) = match refract(incoming, state.normal, current_ior, target_ior) {
                Refraction::Transmitted(direction) => (direction, target_ior),
                Refraction::TotalInternalReflection => (reflect(incoming, facing), current_ior),
            };
            let exit_side = face_forward(state.normal, -direction);
            let refracted = Ray::new(state.point + exit_side * LARGE_EPSILON, direction);

            self.trace_caustic_photon(
                refracted,
                intensity * material.base_transmittance(),
                &path,
                next_ior,
                remaining_bounces - 1,
                rng,
                builder,
            );
        }

        true
    }
}
