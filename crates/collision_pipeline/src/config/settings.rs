//! Tunables for the broad phase and the per-frame pipeline

use serde::{Deserialize, Serialize};

use super::{Config, ConfigError};

/// # Spatial Index Configuration
///
/// Controls the uniform grid, the grid-to-DBVH conversion and the
/// cell-size auto-tuning of [`SpatialIndex`](crate::spatial::SpatialIndex).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpatialIndexConfig {
    /// Cell size used on creation and whenever auto-tuning has nothing to sample
    pub default_cell_size: f32,
    /// Lower bound for auto-tuned cell sizes
    pub min_cell_size: f32,
    /// A cell holding more entities than this converts its 3x3 block into a DBVH region
    pub conversion_threshold: usize,
    /// Mean entities per non-empty cell above which the cell size is re-tuned
    pub density_threshold: f32,
    /// Minimum seconds between two density checks
    pub tune_cooldown_secs: f32,
    /// Enable automatic cell-size tuning on insert
    pub auto_tune: bool,
}

impl Default for SpatialIndexConfig {
    fn default() -> Self {
        Self {
            default_cell_size: 64.0,
            min_cell_size: 32.0,
            conversion_threshold: 12,
            density_threshold: 6.0,
            tune_cooldown_secs: 5.0,
            auto_tune: true,
        }
    }
}

impl SpatialIndexConfig {
    /// Validate value ranges
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.default_cell_size.is_finite() && self.default_cell_size > 0.0) {
            return Err(ConfigError::Invalid {
                field: "default_cell_size",
                reason: format!("must be a positive number, got {}", self.default_cell_size),
            });
        }
        if !(self.min_cell_size.is_finite() && self.min_cell_size > 0.0) {
            return Err(ConfigError::Invalid {
                field: "min_cell_size",
                reason: format!("must be a positive number, got {}", self.min_cell_size),
            });
        }
        if self.density_threshold.is_nan() || self.density_threshold <= 0.0 {
            return Err(ConfigError::Invalid {
                field: "density_threshold",
                reason: format!("must be greater than zero, got {}", self.density_threshold),
            });
        }
        if self.tune_cooldown_secs.is_nan() || self.tune_cooldown_secs < 0.0 {
            return Err(ConfigError::Invalid {
                field: "tune_cooldown_secs",
                reason: format!("must not be negative, got {}", self.tune_cooldown_secs),
            });
        }
        Ok(())
    }
}

impl Config for SpatialIndexConfig {}

/// # Pipeline Configuration
///
/// Top-level configuration loaded by applications driving a
/// [`CollisionPipeline`](crate::physics::CollisionPipeline).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Broad-phase settings
    pub spatial: SpatialIndexConfig,
}

impl PipelineConfig {
    /// Validate every section
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.spatial.validate()
    }
}

impl Config for PipelineConfig {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        assert!(PipelineConfig::default().validate().is_ok());
    }

    #[test]
    fn test_partial_toml_falls_back_to_defaults() {
        let text = "[spatial]\nconversion_threshold = 4\nauto_tune = false\n";
        let config = PipelineConfig::from_str_with_format(text, "pipeline.toml").unwrap();

        assert_eq!(config.spatial.conversion_threshold, 4);
        assert!(!config.spatial.auto_tune);
        assert_eq!(config.spatial.default_cell_size, 64.0);
    }

    #[test]
    fn test_ron_round_trip_through_text() {
        let text = "(spatial: (default_cell_size: 128.0, tune_cooldown_secs: 0.0))";
        let config = PipelineConfig::from_str_with_format(text, "pipeline.ron").unwrap();

        assert_eq!(config.spatial.default_cell_size, 128.0);
        assert_eq!(config.spatial.tune_cooldown_secs, 0.0);
    }

    #[test]
    fn test_rejects_bad_values() {
        let config = SpatialIndexConfig {
            default_cell_size: 0.0,
            ..SpatialIndexConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Invalid { field: "default_cell_size", .. })
        ));

        let config = SpatialIndexConfig {
            tune_cooldown_secs: -1.0,
            ..SpatialIndexConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_unknown_extension_is_unsupported() {
        let result = PipelineConfig::from_str_with_format("", "pipeline.json");
        assert!(matches!(result, Err(ConfigError::UnsupportedFormat(_))));
    }
}
