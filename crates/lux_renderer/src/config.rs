//! Render and photon-pass configuration.
//!
//! Every field has a default, so a JSON file only needs the keys it changes.

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Errors that can occur while loading or checking a configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid config: {0}")]
    Invalid(String),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

/// How gathered photons are turned into color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GatherMode {
    /// Density estimate over the gather disk
    #[default]
    Density,
    /// Flat red wherever any photon is found
    Visualize,
}

/// Settings for the photon pass and the gather.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhotonSettings {
    /// Photons emitted for the global (diffuse) map
    pub diffuse_photons: usize,
    /// Photons accepted into the caustic map
    pub caustic_photons: usize,
    /// Build and gather from the caustic map
    pub caustics: bool,
    pub max_photon_bounces: u32,
    pub gather_radius: f32,
    /// Minimum dot product between surface and photon normals
    pub normal_threshold: f32,
    pub gather_mode: GatherMode,
    /// Caustic emission gives up after `caustic_photons * factor` attempts
    pub caustic_attempt_factor: usize,
}

impl Default for PhotonSettings {
    fn default() -> Self {
        Self {
            diffuse_photons: 1_000_000,
            caustic_photons: 100_000,
            caustics: false,
            max_photon_bounces: 5,
            gather_radius: 0.03,
            normal_threshold: 0.5,
            gather_mode: GatherMode::Density,
            caustic_attempt_factor: 16,
        }
    }
}

/// Thin-lens settings. A zero defocus angle renders with a pinhole.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LensSettings {
    /// Cone angle in degrees of rays through each pixel
    pub defocus_angle: f32,
    /// Distance to the plane of perfect focus; the look-at distance when absent
    pub focus_distance: Option<f32>,
}

/// Render configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    pub width: u32,
    pub height: u32,
    /// Camera rays per pixel. One sample shoots through the pixel center.
    pub samples_per_pixel: u32,
    /// Mirror bounces allowed on a camera path
    pub max_reflection_bounces: u32,
    /// Refraction bounces allowed on a camera path
    pub max_refraction_bounces: u32,
    /// Transmissive occluders a shadow ray may pass through
    pub shadow_bounce_cap: u32,
    /// Fixed seed for reproducible renders; drawn from the OS when absent
    pub seed: Option<u64>,
    pub lens: LensSettings,
    pub photons: PhotonSettings,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            width: 512,
            height: 512,
            samples_per_pixel: 1,
            max_reflection_bounces: 2,
            max_refraction_bounces: 4,
            shadow_bounce_cap: 10,
            seed: None,
            lens: LensSettings::default(),
            photons: PhotonSettings::default(),
        }
    }
}

impl RenderConfig {
    /// Load and validate a JSON config file.
    pub fn from_json_file(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let text = std::fs::read_to_string(path.as_ref())?;
        let config = Self::from_json_str(&text)?;
        log::debug!("Loaded config from {}", path.as_ref().display());
        Ok(config)
    }

    /// Parse and validate a JSON config.
    pub fn from_json_str(text: &str) -> ConfigResult<Self> {
        let config: Self = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject settings that cannot produce an image.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.width == 0 || self.height == 0 {
            return Err(ConfigError::Invalid(format!(
                "resolution must be non-zero, got {}x{}",
                self.width, self.height
            )));
        }
        if self.samples_per_pixel == 0 {
            return Err(ConfigError::Invalid(
                "samples_per_pixel must be at least 1".to_string(),
            ));
        }

        let angle = self.lens.defocus_angle;
        if !(0.0..180.0).contains(&angle) {
            return Err(ConfigError::Invalid(format!(
                "defocus_angle must lie in [0, 180), got {angle}"
            )));
        }
        if let Some(distance) = self.lens.focus_distance {
            if !(distance.is_finite() && distance > 0.0) {
                return Err(ConfigError::Invalid(format!(
                    "focus_distance must be positive, got {distance}"
                )));
            }
        }

        let radius = self.photons.gather_radius;
        if !(radius.is_finite() && radius > 0.0) {
            return Err(ConfigError::Invalid(format!(
                "gather_radius must be positive, got {radius}"
            )));
        }

        let threshold = self.photons.normal_threshold;
        if !(-1.0..=1.0).contains(&threshold) {
            return Err(ConfigError::Invalid(format!(
                "normal_threshold must lie in [-1, 1], got {threshold}"
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = RenderConfig::default();

        assert_eq!(config.max_reflection_bounces, 2);
        assert_eq!(config.max_refraction_bounces, 4);
        assert_eq!(config.shadow_bounce_cap, 10);
        assert_eq!(config.photons.gather_radius, 0.03);
        assert_eq!(config.photons.normal_threshold, 0.5);
        assert!(!config.photons.caustics);
        assert_eq!(config.lens.defocus_angle, 0.0);
        assert_eq!(config.lens.focus_distance, None);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config = RenderConfig::from_json_str(
            r#"{ "width": 64, "seed": 7, "photons": { "caustics": true, "gather_mode": "visualize" } }"#,
        )
        .unwrap();

        assert_eq!(config.width, 64);
        assert_eq!(config.height, 512);
        assert_eq!(config.seed, Some(7));
        assert!(config.photons.caustics);
        assert_eq!(config.photons.gather_mode, GatherMode::Visualize);
        assert_eq!(config.photons.diffuse_photons, 1_000_000);
    }

    #[test]
    fn test_invalid_configs_rejected() {
        let zero_width = RenderConfig {
            width: 0,
            ..RenderConfig::default()
        };
        assert!(matches!(zero_width.validate(), Err(ConfigError::Invalid(_))));

        let mut bad_radius = RenderConfig::default();
        bad_radius.photons.gather_radius = 0.0;
        assert!(bad_radius.validate().is_err());

        let mut wide_lens = RenderConfig::default();
        wide_lens.lens.defocus_angle = 180.0;
        assert!(wide_lens.validate().is_err());

        let mut bad_focus = RenderConfig::default();
        bad_focus.lens.focus_distance = Some(0.0);
        assert!(bad_focus.validate().is_err());

        let mut bad_threshold = RenderConfig::default();
        bad_threshold.photons.normal_threshold = 1.5;
        assert!(bad_threshold.validate().is_err());

        assert!(matches!(
            RenderConfig::from_json_str("{ not json"),
            Err(ConfigError::Json(_))
        ));
        assert!(matches!(
            RenderConfig::from_json_str(r#"{ "samples_per_pixel": 0 }"#),
            Err(ConfigError::Invalid(_))
        ));
    }

    #[test]
    fn test_lens_from_json() {
        let config = RenderConfig::from_json_str(
            r#"{ "lens": { "defocus_angle": 2.5, "focus_distance": 3.9 } }"#,
        )
        .unwrap();

        assert_eq!(config.lens.defocus_angle, 2.5);
        assert_eq!(config.lens.focus_distance, Some(3.9));
        assert!(RenderConfig::from_json_str(r#"{ "lens": { "defocus_angle": -1.0 } }"#).is_err());
    }

    #[test]
    fn test_missing_file() {
        let result = RenderConfig::from_json_file("/definitely/not/here.json");
        assert!(matches!(result, Err(ConfigError::Io(_))));
    }
}
