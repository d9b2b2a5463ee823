//! Configuration module for the iridescence demo.
//!
//! This module defines the parameter structures for the demo: the thin-film
//! stack that drives the lookup table, the iridescent material, the scene
//! layout and the cube-map asset locations.

use serde::{Deserialize, Serialize};
use std::fs;
use std::ops::RangeInclusive;
use std::path::{Path, PathBuf};

/// Range exposed for the film thickness (nanometers)
pub const FILM_THICKNESS_RANGE_NM: RangeInclusive<f64> = 100.0..=1000.0;

/// Range exposed for the film refractive index
pub const REFRACTIVE_INDEX_FILM_RANGE: RangeInclusive<f64> = 1.0..=5.0;

/// Range exposed for the base refractive index
pub const REFRACTIVE_INDEX_BASE_RANGE: RangeInclusive<f64> = 1.0..=5.0;

/// Parameters of the thin film and the material it sits on.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ThinFilmParameters {
    /// Film thickness in nanometers
    #[serde(default = "default_film_thickness")]
    pub film_thickness_nm: f64,

    /// Refractive index of the film
    #[serde(default = "default_refractive_index_film")]
    pub refractive_index_film: f64,

    /// Refractive index of the base material under the film
    #[serde(default = "default_refractive_index_base")]
    pub refractive_index_base: f64,
}

fn default_film_thickness() -> f64 {
    380.0
}

fn default_refractive_index_film() -> f64 {
    2.0
}

fn default_refractive_index_base() -> f64 {
    3.0
}

impl Default for ThinFilmParameters {
    fn default() -> Self {
        Self {
            film_thickness_nm: default_film_thickness(),
            refractive_index_film: default_refractive_index_film(),
            refractive_index_base: default_refractive_index_base(),
        }
    }
}

impl ThinFilmParameters {
    /// Clamp every field into the range exposed by the parameter panel.
    ///
    /// Non-finite values fall back to the defaults.
    pub fn clamped(&self) -> Self {
        let defaults = Self::default();
        Self {
            film_thickness_nm: clamp_finite(
                self.film_thickness_nm,
                &FILM_THICKNESS_RANGE_NM,
                defaults.film_thickness_nm,
            ),
            refractive_index_film: clamp_finite(
                self.refractive_index_film,
                &REFRACTIVE_INDEX_FILM_RANGE,
                defaults.refractive_index_film,
            ),
            refractive_index_base: clamp_finite(
                self.refractive_index_base,
                &REFRACTIVE_INDEX_BASE_RANGE,
                defaults.refractive_index_base,
            ),
        }
    }
}

fn clamp_finite(value: f64, range: &RangeInclusive<f64>, fallback: f64) -> f64 {
    if value.is_finite() {
        value.clamp(*range.start(), *range.end())
    } else {
        fallback
    }
}

/// Parameters of the iridescent material.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MaterialParameters {
    /// Base (albedo) color, linear RGB
    #[serde(default = "default_color")]
    pub color: [f32; 3],

    /// Multiplier on the iridescent reflection. The film model has no
    /// metallic response, so the demo exaggerates it.
    #[serde(default = "default_boost")]
    pub boost: f32,
}

fn default_color() -> [f32; 3] {
    [1.0, 1.0, 1.0]
}

fn default_boost() -> f32 {
    20.0
}

impl Default for MaterialParameters {
    fn default() -> Self {
        Self {
            color: default_color(),
            boost: default_boost(),
        }
    }
}

/// Torus knot shape parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TorusKnotParameters {
    /// Radius of the knot curve
    pub radius: f32,
    /// Radius of the tube swept along the curve
    pub tube: f32,
    /// Segments along the curve
    pub tubular_segments: u32,
    /// Segments around the tube
    pub radial_segments: u32,
    /// Winds around the axis of rotational symmetry
    pub p: u32,
    /// Winds around the interior circle
    pub q: u32,
}

impl Default for TorusKnotParameters {
    fn default() -> Self {
        Self {
            radius: 10.0,
            tube: 3.0,
            tubular_segments: 100,
            radial_segments: 16,
            p: 2,
            q: 3,
        }
    }
}

/// Scene layout parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SceneParameters {
    /// Edge length of the skybox cube
    #[serde(default = "default_skybox_size")]
    pub skybox_size: f32,

    /// Torus knot geometry
    #[serde(default)]
    pub torus_knot: TorusKnotParameters,

    /// Torus knot spin around X and Y in radians per second
    #[serde(default = "default_rotation_speed")]
    pub rotation_speed: [f32; 2],

    /// Initial camera distance from the origin
    #[serde(default = "default_camera_distance")]
    pub camera_distance: f32,
}

fn default_skybox_size() -> f32 {
    1000.0
}

fn default_rotation_speed() -> [f32; 2] {
    // 0.009 and 0.01 radians per frame at 60 fps
    [0.54, 0.6]
}

fn default_camera_distance() -> f32 {
    50.0
}

impl Default for SceneParameters {
    fn default() -> Self {
        Self {
            skybox_size: default_skybox_size(),
            torus_knot: TorusKnotParameters::default(),
            rotation_speed: default_rotation_speed(),
            camera_distance: default_camera_distance(),
        }
    }
}

/// Locations of the environment cube maps.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssetParameters {
    /// Directory holding the six irradiance faces
    #[serde(default = "default_irradiance_dir")]
    pub irradiance_dir: PathBuf,

    /// Directory holding the six radiance faces
    #[serde(default = "default_radiance_dir")]
    pub radiance_dir: PathBuf,
}

fn default_irradiance_dir() -> PathBuf {
    PathBuf::from("assets/skybox/irradiance")
}

fn default_radiance_dir() -> PathBuf {
    PathBuf::from("assets/skybox/radiance")
}

impl Default for AssetParameters {
    fn default() -> Self {
        Self {
            irradiance_dir: default_irradiance_dir(),
            radiance_dir: default_radiance_dir(),
        }
    }
}

impl AssetParameters {
    /// Point both probes at `<root>/irradiance` and `<root>/radiance`.
    pub fn with_root<P: AsRef<Path>>(root: P) -> Self {
        Self {
            irradiance_dir: root.as_ref().join("irradiance"),
            radiance_dir: root.as_ref().join("radiance"),
        }
    }
}

/// Lookup table resolution.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LookUpParameters {
    /// Number of samples between grazing (cos = 0) and normal (cos = 1) incidence
    #[serde(default = "default_look_up_size")]
    pub size: u32,
}

fn default_look_up_size() -> u32 {
    64
}

impl Default for LookUpParameters {
    fn default() -> Self {
        Self {
            size: default_look_up_size(),
        }
    }
}

/// Complete demo configuration combining all parameter groups.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct DemoConfig {
    /// Thin-film stack
    #[serde(default)]
    pub film: ThinFilmParameters,

    /// Iridescent material
    #[serde(default)]
    pub material: MaterialParameters,

    /// Scene layout
    #[serde(default)]
    pub scene: SceneParameters,

    /// Cube-map locations
    #[serde(default)]
    pub assets: AssetParameters,

    /// Lookup table resolution
    #[serde(default)]
    pub look_up: LookUpParameters,
}

impl DemoConfig {
    /// Load configuration from a JSON file.
    ///
    /// Missing sections and fields take their defaults; film parameters are
    /// clamped into the panel ranges.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path.as_ref()).map_err(|error| ConfigError::Io {
            path: path.as_ref().to_path_buf(),
            error,
        })?;
        let mut config: Self = serde_json::from_str(&contents).map_err(|error| ConfigError::Parse {
            path: path.as_ref().to_path_buf(),
            error,
        })?;
        config.film = config.film.clamped();
        Ok(config)
    }

    /// Save configuration to a JSON file.
    pub fn to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let contents =
            serde_json::to_string_pretty(self).map_err(|error| ConfigError::Serialize { error })?;
        fs::write(path.as_ref(), contents).map_err(|error| ConfigError::Io {
            path: path.as_ref().to_path_buf(),
            error,
        })
    }
}

/// Error types for configuration operations.
#[derive(Debug)]
pub enum ConfigError {
    /// IO error when reading or writing configuration files
    Io {
        path: PathBuf,
        error: std::io::Error,
    },
    /// JSON parsing error
    Parse {
        path: PathBuf,
        error: serde_json::Error,
    },
    /// JSON serialization error
    Serialize { error: serde_json::Error },
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io { path, error } => {
                write!(
                    formatter,
                    "Failed to read/write config file '{}': {}",
                    path.display(),
                    error
                )
            }
            ConfigError::Parse { path, error } => {
                write!(
                    formatter,
                    "Failed to parse config file '{}': {}",
                    path.display(),
                    error
                )
            }
            ConfigError::Serialize { error } => {
                write!(formatter, "Failed to serialize config: {}", error)
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Io { error, .. } => Some(error),
            ConfigError::Parse { error, .. } => Some(error),
            ConfigError::Serialize { error } => Some(error),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = DemoConfig::default();
        assert!((config.film.film_thickness_nm - 380.0).abs() < f64::EPSILON);
        assert!((config.film.refractive_index_film - 2.0).abs() < f64::EPSILON);
        assert!((config.film.refractive_index_base - 3.0).abs() < f64::EPSILON);
        assert!((config.material.boost - 20.0).abs() < f32::EPSILON);
        assert_eq!(config.look_up.size, 64);
        assert_eq!(config.scene.torus_knot.tubular_segments, 100);
    }

    #[test]
    fn test_clamped_enforces_panel_ranges() {
        let film = ThinFilmParameters {
            film_thickness_nm: 5000.0,
            refractive_index_film: 0.2,
            refractive_index_base: 9.0,
        }
        .clamped();
        assert!((film.film_thickness_nm - 1000.0).abs() < f64::EPSILON);
        assert!((film.refractive_index_film - 1.0).abs() < f64::EPSILON);
        assert!((film.refractive_index_base - 5.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_clamped_replaces_non_finite() {
        let film = ThinFilmParameters {
            film_thickness_nm: f64::NAN,
            refractive_index_film: f64::INFINITY,
            refractive_index_base: 1.5,
        }
        .clamped();
        assert_eq!(film.film_thickness_nm, default_film_thickness());
        assert_eq!(film.refractive_index_film, default_refractive_index_film());
        assert!((film.refractive_index_base - 1.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: DemoConfig =
            serde_json::from_str(r#"{ "film": { "film_thickness_nm": 250.0 } }"#).unwrap();
        assert!((config.film.film_thickness_nm - 250.0).abs() < f64::EPSILON);
        assert!((config.film.refractive_index_film - 2.0).abs() < f64::EPSILON);
        assert_eq!(config.material, MaterialParameters::default());
        assert_eq!(config.assets, AssetParameters::default());
    }

    #[test]
    fn test_asset_root() {
        let assets = AssetParameters::with_root("media/sky");
        assert_eq!(assets.irradiance_dir, Path::new("media/sky/irradiance"));
        assert_eq!(assets.radiance_dir, Path::new("media/sky/radiance"));
    }

    #[test]
    fn test_file_roundtrip_clamps_film() {
        let path = std::env::temp_dir().join("thin_film_config_roundtrip.json");
        let mut config = DemoConfig::default();
        config.film.film_thickness_nm = 20.0;
        config.material.boost = 3.5;
        config.to_file(&path).unwrap();

        let loaded = DemoConfig::from_file(&path).unwrap();
        assert!((loaded.film.film_thickness_nm - 100.0).abs() < f64::EPSILON);
        assert!((loaded.material.boost - 3.5).abs() < f32::EPSILON);

        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let result = DemoConfig::from_file("/nonexistent/thin_film.json");
        assert!(matches!(result, Err(ConfigError::Io { .. })));
    }
}
