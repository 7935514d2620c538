use anyhow::{ensure, Context, Result};
use serde::Deserialize;
use std::path::Path;

/// Settings loaded from a `--config` TOML file
#[derive(Debug, Deserialize, Clone, Default, PartialEq)]
pub struct DepthShadowConfig {
    #[serde(default)]
    pub mask: MaskConfig,
    #[serde(default)]
    pub colorize: ColorizeConfig,
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct MaskConfig {
    /// Light azimuth in degrees, clockwise from north
    #[serde(default = "default_azimuth")]
    pub azimuth: f32,
    /// Light elevation in degrees above the horizon
    #[serde(default = "default_elevation")]
    pub elevation: f32,
    /// Voxel edge length in world units
    #[serde(default = "default_resolution")]
    pub resolution: f32,
    /// Light-space depth margin in world units
    #[serde(default = "default_bias")]
    pub bias: f32,
    /// Width and height of the light depth map
    #[serde(default = "default_depth_map_size")]
    pub depth_map_size: u32,
    /// Sensor camera image scale
    #[serde(default = "default_scale")]
    pub scale: f32,
    #[serde(default = "default_max_depth")]
    pub max_depth: u32,
}

fn default_azimuth() -> f32 {
    183.29
}

fn default_elevation() -> f32 {
    62.16
}

fn default_resolution() -> f32 {
    1.0
}

fn default_bias() -> f32 {
    1.0
}

fn default_depth_map_size() -> u32 {
    1024
}

fn default_scale() -> f32 {
    1.0
}

fn default_max_depth() -> u32 {
    16
}

impl Default for MaskConfig {
    fn default() -> Self {
        Self {
            azimuth: default_azimuth(),
            elevation: default_elevation(),
            resolution: default_resolution(),
            bias: default_bias(),
            depth_map_size: default_depth_map_size(),
            scale: default_scale(),
            max_depth: default_max_depth(),
        }
    }
}

impl MaskConfig {
    pub fn validate(&self) -> Result<()> {
        ensure!(
            self.azimuth.is_finite() && self.elevation.is_finite(),
            "light angles must be finite"
        );
        ensure!(
            self.elevation > 0.0 && self.elevation <= 90.0,
            "elevation must be in (0, 90] degrees, got {}",
            self.elevation
        );
        ensure!(
            self.resolution > 0.0 && self.resolution.is_finite(),
            "resolution must be positive, got {}",
            self.resolution
        );
        ensure!(
            self.bias >= 0.0 && self.bias.is_finite(),
            "bias must not be negative, got {}",
            self.bias
        );
        ensure!(self.depth_map_size >= 2, "depth map size must be at least 2");
        ensure!(
            self.scale > 0.0 && self.scale.is_finite(),
            "scale must be positive, got {}",
            self.scale
        );
        Ok(())
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct ColorizeConfig {
    #[serde(default = "default_resolution")]
    pub resolution: f32,
    /// Projector camera image scale
    #[serde(default = "default_projector_scale")]
    pub projector_scale: f32,
    /// Projector distance tolerance in world units
    #[serde(default = "default_epsilon")]
    pub epsilon: f32,
    #[serde(default = "default_max_depth")]
    pub max_depth: u32,
}

fn default_projector_scale() -> f32 {
    0.5
}

fn default_epsilon() -> f32 {
    1.0
}

impl Default for ColorizeConfig {
    fn default() -> Self {
        Self {
            resolution: default_resolution(),
            projector_scale: default_projector_scale(),
            epsilon: default_epsilon(),
            max_depth: default_max_depth(),
        }
    }
}

impl ColorizeConfig {
    pub fn validate(&self) -> Result<()> {
        ensure!(
            self.resolution > 0.0 && self.resolution.is_finite(),
            "resolution must be positive, got {}",
            self.resolution
        );
        ensure!(
            self.projector_scale > 0.0 && self.projector_scale.is_finite(),
            "projector scale must be positive, got {}",
            self.projector_scale
        );
        ensure!(
            self.epsilon > 0.0,
            "epsilon must be positive, got {}",
            self.epsilon
        );
        Ok(())
    }
}

/// Load configuration from a TOML file
pub fn load_config(path: &Path) -> Result<DepthShadowConfig> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config file {}", path.display()))?;
    let config: DepthShadowConfig = toml::from_str(&text)
        .with_context(|| format!("failed to parse config file {}", path.display()))?;
    tracing::debug!(path = %path.display(), ?config, "loaded config");
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = DepthShadowConfig::default();
        assert_eq!(config.mask.azimuth, 183.29);
        assert_eq!(config.mask.elevation, 62.16);
        assert_eq!(config.mask.depth_map_size, 1024);
        assert_eq!(config.colorize.projector_scale, 0.5);
        assert!(config.mask.validate().is_ok());
        assert!(config.colorize.validate().is_ok());
    }

    #[test]
    fn test_partial_tables_keep_defaults() {
        let config: DepthShadowConfig = toml::from_str(
            "[mask]\nazimuth = 90.0\nbias = 0.25\n\n[colorize]\nepsilon = 2.0\n",
        )
        .unwrap();

        assert_eq!(config.mask.azimuth, 90.0);
        assert_eq!(config.mask.bias, 0.25);
        assert_eq!(config.mask.elevation, 62.16);
        assert_eq!(config.colorize.epsilon, 2.0);
        assert_eq!(config.colorize.resolution, 1.0);
    }

    #[test]
    fn test_empty_file_is_default() {
        let config: DepthShadowConfig = toml::from_str("").unwrap();
        assert_eq!(config, DepthShadowConfig::default());
    }

    #[test]
    fn test_validation() {
        let flat = MaskConfig {
            elevation: 0.0,
            ..MaskConfig::default()
        };
        assert!(flat.validate().is_err());

        let negative = MaskConfig {
            resolution: -1.0,
            ..MaskConfig::default()
        };
        assert!(negative.validate().is_err());

        let collapsed = ColorizeConfig {
            projector_scale: 0.0,
            ..ColorizeConfig::default()
        };
        assert!(collapsed.validate().is_err());
    }

    #[test]
    fn test_load_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("depthshadow.toml");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(file, "[mask]\ndepth_map_size = 256").unwrap();

        let config = load_config(&path).unwrap();
        assert_eq!(config.mask.depth_map_size, 256);

        let err = load_config(&dir.path().join("absent.toml")).unwrap_err();
        assert!(err.to_string().contains("failed to read config file"));
    }

    #[test]
    fn test_unknown_types_are_rejected() {
        let result: Result<DepthShadowConfig, _> = toml::from_str("[mask]\nazimuth = \"north\"");
        assert!(result.is_err());
    }
}
