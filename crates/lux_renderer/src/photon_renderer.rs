//! Photon-mapping renderer: backward direct lighting plus indirect light
//! gathered from photon maps.

use crate::gather::estimate_radiance;
use crate::sampling::resolve_seed;
use crate::{
    BackwardRenderer, Color, GatherMode, IntersectionState, PhotonMap, PhotonMapKind,
    PhotonSettings, PhotonTracer, Ray, RenderConfig, Renderer, Scene,
};

/// Flat color shown where photons are found in `GatherMode::Visualize`.
const VISUALIZE_COLOR: Color = Color::new(1.0, 0.0, 0.0);

/// Renderer combining direct lighting with a photon-map gather.
///
/// `initialize` builds the maps; until then the indirect term is black.
pub struct PhotonMappingRenderer<'s> {
    backward: BackwardRenderer<'s>,
    settings: PhotonSettings,
    seed: u64,
    diffuse_map: PhotonMap,
    caustic_map: Option<PhotonMap>,
}

impl<'s> PhotonMappingRenderer<'s> {
    pub fn new(scene: &'s Scene, config: &RenderConfig) -> Self {
        Self {
            backward: BackwardRenderer::new(scene, config),
            settings: config.photons.clone(),
            seed: resolve_seed(config.seed),
            diffuse_map: PhotonMap::empty(),
            caustic_map: None,
        }
    }

    pub fn diffuse_map(&self) -> &PhotonMap {
        &self.diffuse_map
    }

    pub fn caustic_map(&self) -> Option<&PhotonMap> {
        self.caustic_map.as_ref()
    }

    pub fn settings(&self) -> &PhotonSettings {
        &self.settings
    }

    /// Indirect light at a hit, from every photon within the gather radius.
    pub fn compute_indirect(&self, intersection: &IntersectionState, camera_ray: &Ray) -> Color {
        if !intersection.has_intersection {
            return Color::ZERO;
        }

        let radius = self.settings.gather_radius;
        let mut found = Vec::new();
        self.diffuse_map
            .find_within_radius_into(intersection.point, radius, &mut found);
        if let Some(caustic) = &self.caustic_map {
            caustic.find_within_radius_into(intersection.point, radius, &mut found);
        }

        if found.is_empty() {
            return Color::ZERO;
        }

        match self.settings.gather_mode {
            GatherMode::Density => estimate_radiance(
                intersection,
                camera_ray,
                &found,
                radius,
                self.settings.normal_threshold,
            ),
            GatherMode::Visualize => VISUALIZE_COLOR,
        }
    }
}

impl Renderer for PhotonMappingRenderer<'_> {
    fn scene(&self) -> &Scene {
        self.backward.scene()
    }

    fn initialize(&mut self) {
        let tracer = PhotonTracer::new(self.backward.scene(), &self.settings);

        if self.backward.scene().lights().is_empty() {
            log::warn!("Scene has no lights; photon maps will be empty");
        }

        log::info!(
            "Tracing {} diffuse photons (seed {})",
            self.settings.diffuse_photons,
            self.seed
        );
        self.diffuse_map =
            tracer.generate_photon_map(PhotonMapKind::Global, self.settings.diffuse_photons, self.seed);

        self.caustic_map = if self.settings.caustics {
            log::info!("Tracing {} caustic photons", self.settings.caustic_photons);
            Some(tracer.generate_photon_map(
                PhotonMapKind::Caustic,
                self.settings.caustic_photons,
                self.seed.wrapping_add(1),
            ))
        } else {
            None
        };
    }

    fn compute_sample_color(&self, intersection: &IntersectionState, camera_ray: &Ray) -> Color {
        self.backward.shade(self, intersection, camera_ray)
            + self.compute_indirect(intersection, camera_ray)
    }
}
