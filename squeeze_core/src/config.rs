//! Compression policy configuration.
//!
//! The engine itself only ever borrows a `CompressionConfig`. Loading from
//! `$XDG_CONFIG_HOME/squeeze/config.toml` is offered for the CLI.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Tunable compression policy
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct CompressionConfig {
    #[serde(default = "default_core_lift_max_sets")]
    pub core_lift_max_sets: u32,

    #[serde(default = "default_core_lift_rest_seconds")]
    pub core_lift_rest_seconds: u32,

    #[serde(default = "default_superset_rest_seconds")]
    pub superset_rest_seconds: u32,

    #[serde(default = "default_block_inter_exercise_rest_seconds")]
    pub block_inter_exercise_rest_seconds: u32,

    #[serde(default = "default_block_inter_round_rest_seconds")]
    pub block_inter_round_rest_seconds: u32,

    #[serde(default = "default_max_block_exercises")]
    pub max_block_exercises: u32,
}

impl Default for CompressionConfig {
    fn default() -> Self {
        Self {
            core_lift_max_sets: default_core_lift_max_sets(),
            core_lift_rest_seconds: default_core_lift_rest_seconds(),
            superset_rest_seconds: default_superset_rest_seconds(),
            block_inter_exercise_rest_seconds: default_block_inter_exercise_rest_seconds(),
            block_inter_round_rest_seconds: default_block_inter_round_rest_seconds(),
            max_block_exercises: default_max_block_exercises(),
        }
    }
}

/// Partial override merged over the default policy
#[derive(Clone, Debug, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct CompressionOverrides {
    pub core_lift_max_sets: Option<u32>,
    pub core_lift_rest_seconds: Option<u32>,
    pub superset_rest_seconds: Option<u32>,
    pub block_inter_exercise_rest_seconds: Option<u32>,
    pub block_inter_round_rest_seconds: Option<u32>,
    pub max_block_exercises: Option<u32>,
}

// Default value functions
fn default_core_lift_max_sets() -> u32 {
    4
}

fn default_core_lift_rest_seconds() -> u32 {
    120
}

fn default_superset_rest_seconds() -> u32 {
    60
}

fn default_block_inter_exercise_rest_seconds() -> u32 {
    15
}

fn default_block_inter_round_rest_seconds() -> u32 {
    60
}

fn default_max_block_exercises() -> u32 {
    4
}

impl CompressionConfig {
    /// Default policy with the given overrides applied
    pub fn with_overrides(overrides: &CompressionOverrides) -> Self {
        Self::default().merged(overrides)
    }

    /// Copy of this policy with every populated override applied
    pub fn merged(&self, overrides: &CompressionOverrides) -> Self {
        Self {
            core_lift_max_sets: overrides
                .core_lift_max_sets
                .unwrap_or(self.core_lift_max_sets),
            core_lift_rest_seconds: overrides
                .core_lift_rest_seconds
                .unwrap_or(self.core_lift_rest_seconds),
            superset_rest_seconds: overrides
                .superset_rest_seconds
                .unwrap_or(self.superset_rest_seconds),
            block_inter_exercise_rest_seconds: overrides
                .block_inter_exercise_rest_seconds
                .unwrap_or(self.block_inter_exercise_rest_seconds),
            block_inter_round_rest_seconds: overrides
                .block_inter_round_rest_seconds
                .unwrap_or(self.block_inter_round_rest_seconds),
            max_block_exercises: overrides
                .max_block_exercises
                .unwrap_or(self.max_block_exercises),
        }
    }

    /// Reject policies the builder cannot honour
    pub fn validate(&self) -> Result<()> {
        if self.core_lift_max_sets == 0 {
            return Err(Error::Config(
                "core_lift_max_sets must be at least 1".into(),
            ));
        }
        if self.max_block_exercises < 2 {
            return Err(Error::Config(format!(
                "max_block_exercises must be at least 2, got {}",
                self.max_block_exercises
            )));
        }
        Ok(())
    }

    /// Parse a (possibly partial) TOML policy
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let config: CompressionConfig = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from the standard config path
    pub fn load() -> Result<Self> {
        match Self::default_config_path() {
            Some(path) if path.exists() => Self::load_from(&path),
            path => {
                tracing::info!("No config file found at {:?}, using defaults", path);
                Ok(Self::default())
            }
        }
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config = Self::from_toml_str(&contents)?;
        tracing::info!("Loaded config from {:?}", path);
        Ok(config)
    }

    /// Get the default config file path
    pub fn default_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|base| base.join("squeeze").join("config.toml"))
    }

    /// Render as TOML
    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self)
            .map_err(|e| Error::Config(format!("Failed to serialize config: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = CompressionConfig::default();
        assert_eq!(config.core_lift_max_sets, 4);
        assert_eq!(config.core_lift_rest_seconds, 120);
        assert_eq!(config.max_block_exercises, 4);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_roundtrip() {
        let config = CompressionConfig::default();
        let toml_str = config.to_toml_string().unwrap();
        let parsed = CompressionConfig::from_toml_str(&toml_str).unwrap();
        assert_eq!(config, parsed);
    }

    #[test]
    fn test_partial_config() {
        let toml_str = r#"
core_lift_max_sets = 3
"#;
        let config = CompressionConfig::from_toml_str(toml_str).unwrap();
        assert_eq!(config.core_lift_max_sets, 3);
        assert_eq!(config.superset_rest_seconds, 60); // default
    }

    #[test]
    fn test_overrides_merge_over_default() {
        let overrides = CompressionOverrides {
            superset_rest_seconds: Some(30),
            max_block_exercises: Some(3),
            ..Default::default()
        };
        let config = CompressionConfig::with_overrides(&overrides);
        assert_eq!(config.superset_rest_seconds, 30);
        assert_eq!(config.max_block_exercises, 3);
        assert_eq!(config.core_lift_max_sets, 4);
        assert_eq!(config.block_inter_round_rest_seconds, 60);
    }

    #[test]
    fn test_invalid_configs_rejected() {
        let zero_cap = CompressionConfig {
            core_lift_max_sets: 0,
            ..Default::default()
        };
        assert!(matches!(zero_cap.validate(), Err(Error::Config(_))));

        let tiny_block = "max_block_exercises = 1";
        assert!(CompressionConfig::from_toml_str(tiny_block).is_err());
    }

    #[test]
    fn test_load_from_file() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("config.toml");
        std::fs::write(&path, "block_inter_round_rest_seconds = 45\n").unwrap();

        let config = CompressionConfig::load_from(&path).unwrap();
        assert_eq!(config.block_inter_round_rest_seconds, 45);
    }
}
