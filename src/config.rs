use crate::camera::CameraModel;
use crate::environment::LookupMode;
use crate::irradiance::IrradianceKernel;
use crate::shading::ShadingParams;
use crate::transform::mat4_from_rows;
use anyhow::{Context, Result};
use glam::{UVec2, Vec2};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IrradianceConfig {
    /// Theta and phi step counts of the hemisphere grid.
    #[serde(default = "IrradianceConfig::default_samples")]
    pub samples: [u32; 2],
    #[serde(default)]
    pub lookup: LookupMode,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShadingConfig {
    #[serde(default = "ShadingConfig::default_focal_length")]
    pub focal_length: f32,
    #[serde(default = "ShadingConfig::default_horizontal_aperture")]
    pub horizontal_aperture: f32,
    #[serde(default = "ShadingConfig::default_near_plane")]
    pub near_plane: f32,
    #[serde(default = "ShadingConfig::default_far_plane")]
    pub far_plane: f32,
    /// Row-major, translation in the last column.
    #[serde(default = "ShadingConfig::default_camera_world_matrix")]
    pub camera_world_matrix: [[f32; 4]; 4],
    #[serde(default = "ShadingConfig::default_format_width")]
    pub format_width: f32,
    #[serde(default = "ShadingConfig::default_format_height")]
    pub format_height: f32,
    /// Degrees.
    #[serde(default)]
    pub hdri_offset_angle: f32,
    #[serde(default = "ShadingConfig::default_use_precomputed_irradiance")]
    pub use_precomputed_irradiance: bool,
    #[serde(default = "ShadingConfig::default_samples")]
    pub samples: u32,
    #[serde(default = "ShadingConfig::default_incident_refractive_index")]
    pub incident_refractive_index: f32,
    #[serde(default = "ShadingConfig::default_refracted_refractive_index")]
    pub refracted_refractive_index: f32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IblConfig {
    #[serde(default)]
    pub irradiance: IrradianceConfig,
    #[serde(default)]
    pub shading: ShadingConfig,
}

/// Command line values that take precedence over the config file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IblConfigOverrides {
    pub irradiance_samples: Option<UVec2>,
    pub legacy_lookup: bool,
    pub shading_samples: Option<u32>,
}

impl IrradianceConfig {
    const fn default_samples() -> [u32; 2] {
        [100, 50]
    }

    pub fn kernel(&self) -> Result<IrradianceKernel> {
        IrradianceKernel::new(UVec2::from_array(self.samples), self.lookup)
    }
}

impl Default for IrradianceConfig {
    fn default() -> Self {
        Self { samples: Self::default_samples(), lookup: LookupMode::default() }
    }
}

impl ShadingConfig {
    const fn default_focal_length() -> f32 {
        50.0
    }

    const fn default_horizontal_aperture() -> f32 {
        24.576
    }

    const fn default_near_plane() -> f32 {
        0.1
    }

    const fn default_far_plane() -> f32 {
        10_000.0
    }

    const fn default_camera_world_matrix() -> [[f32; 4]; 4] {
        [[1.0, 0.0, 0.0, 0.0], [0.0, 1.0, 0.0, 0.0], [0.0, 0.0, 1.0, 0.0], [0.0, 0.0, 0.0, 1.0]]
    }

    const fn default_format_width() -> f32 {
        3840.0
    }

    const fn default_format_height() -> f32 {
        2160.0
    }

    const fn default_use_precomputed_irradiance() -> bool {
        true
    }

    const fn default_samples() -> u32 {
        1
    }

    const fn default_incident_refractive_index() -> f32 {
        1.0
    }

    const fn default_refracted_refractive_index() -> f32 {
        1.33
    }

    pub fn params(&self) -> ShadingParams {
        ShadingParams {
            camera: CameraModel {
                focal_length: self.focal_length,
                horizontal_aperture: self.horizontal_aperture,
                near_plane: self.near_plane,
                far_plane: self.far_plane,
                world_matrix: mat4_from_rows(self.camera_world_matrix),
            },
            format: Vec2::new(self.format_width, self.format_height),
            hdri_offset_degrees: self.hdri_offset_angle,
            use_precomputed_irradiance: self.use_precomputed_irradiance,
            samples: self.samples,
            incident_refractive_index: self.incident_refractive_index,
            refracted_refractive_index: self.refracted_refractive_index,
        }
    }
}

impl Default for ShadingConfig {
    fn default() -> Self {
        Self {
            focal_length: Self::default_focal_length(),
            horizontal_aperture: Self::default_horizontal_aperture(),
            near_plane: Self::default_near_plane(),
            far_plane: Self::default_far_plane(),
            camera_world_matrix: Self::default_camera_world_matrix(),
            format_width: Self::default_format_width(),
            format_height: Self::default_format_height(),
            hdri_offset_angle: 0.0,
            use_precomputed_irradiance: Self::default_use_precomputed_irradiance(),
            samples: Self::default_samples(),
            incident_refractive_index: Self::default_incident_refractive_index(),
            refracted_refractive_index: Self::default_refracted_refractive_index(),
        }
    }
}

impl IblConfig {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let bytes =
            fs::read(path).with_context(|| format!("Failed to read config file {}", path.display()))?;
        let cfg = serde_json::from_slice(&bytes)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;
        Ok(cfg)
    }

    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        match Self::load(path) {
            Ok(cfg) => cfg,
            Err(err) => {
                log::warn!("Config load error: {err:?}. Falling back to defaults.");
                Self::default()
            }
        }
    }

    pub fn apply_overrides(&mut self, overrides: &IblConfigOverrides) {
        if let Some(samples) = overrides.irradiance_samples {
            self.irradiance.samples = samples.to_array();
        }
        if overrides.legacy_lookup {
            self.irradiance.lookup = LookupMode::LegacyNearest;
        }
        if let Some(samples) = overrides.shading_samples {
            self.shading.samples = samples;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Mat4;
    use tempfile::tempdir;

    #[test]
    fn empty_object_uses_defaults() {
        let cfg: IblConfig = serde_json::from_str("{}").expect("parse");
        assert_eq!(cfg, IblConfig::default());
        assert_eq!(cfg.irradiance.samples, [100, 50]);
        assert_eq!(cfg.shading.horizontal_aperture, 24.576);
        assert_eq!(cfg.shading.far_plane, 10_000.0);
        assert!(cfg.shading.use_precomputed_irradiance);
    }

    #[test]
    fn partial_sections_keep_remaining_defaults() {
        let json = r#"{
            "irradiance": { "lookup": "legacy_nearest" },
            "shading": { "samples": 16, "hdri_offset_angle": 90.0 }
        }"#;
        let cfg: IblConfig = serde_json::from_str(json).expect("parse");
        assert_eq!(cfg.irradiance.lookup, LookupMode::LegacyNearest);
        assert_eq!(cfg.irradiance.samples, [100, 50]);
        assert_eq!(cfg.shading.samples, 16);
        assert_eq!(cfg.shading.focal_length, 50.0);

        let params = cfg.shading.params();
        assert_eq!(params.hdri_offset_degrees, 90.0);
        assert_eq!(params.camera.world_matrix, Mat4::IDENTITY);
    }

    #[test]
    fn camera_matrix_is_read_row_major() {
        let json = r#"{ "shading": { "camera_world_matrix": [
            [1, 0, 0, 5], [0, 1, 0, 6], [0, 0, 1, 7], [0, 0, 0, 1]
        ] } }"#;
        let cfg: IblConfig = serde_json::from_str(json).expect("parse");
        let world = cfg.shading.params().camera.world_matrix;
        assert_eq!(world.w_axis.truncate(), glam::Vec3::new(5.0, 6.0, 7.0));
    }

    #[test]
    fn overrides_take_precedence() {
        let mut cfg = IblConfig::default();
        cfg.apply_overrides(&IblConfigOverrides {
            irradiance_samples: Some(UVec2::new(32, 16)),
            legacy_lookup: true,
            shading_samples: Some(8),
        });
        assert_eq!(cfg.irradiance.samples, [32, 16]);
        assert_eq!(cfg.irradiance.lookup, LookupMode::LegacyNearest);
        assert_eq!(cfg.shading.samples, 8);
        assert_eq!(cfg.irradiance.kernel().expect("kernel").samples(), UVec2::new(32, 16));
    }

    #[test]
    fn load_reads_file_and_bad_files_fall_back() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("ibl.json");
        fs::write(&path, r#"{ "shading": { "samples": 4 } }"#).expect("write config");
        assert_eq!(IblConfig::load(&path).expect("load").shading.samples, 4);

        let broken = dir.path().join("broken.json");
        fs::write(&broken, "{ not json").expect("write config");
        assert!(IblConfig::load(&broken).is_err());
        assert_eq!(IblConfig::load_or_default(&broken), IblConfig::default());
    }
}
