//! Layout configuration
//!
//! Every constant of the force law and the scheduler lives here. Values can be
//! loaded from a YAML file; missing keys fall back to the defaults.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{LineageError, Result};

/// Configuration for the force layout and its scheduler
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    /// Ideal separation of a related pair (ln term is zero here)
    pub threshold: f64,
    /// Fraction of the accumulated force applied per step
    pub damping: f64,
    /// Largest force component still considered converged
    pub limit: f64,
    /// Distances below this are clamped before taking a logarithm
    pub epsilon: f64,
    /// Hard cap on steps for configurations that never settle
    pub max_iterations: usize,
    /// Side length of the square initial positions are scrambled into
    pub canvas_size: f64,
    /// Seed for initial positions; `None` draws from OS entropy
    pub seed: Option<u64>,
    /// Period of the frame tick source in milliseconds
    pub frame_interval_ms: u64,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            threshold: 10.0,
            damping: 0.1,
            limit: 1.0,
            epsilon: 1e-6,
            max_iterations: 2000,
            canvas_size: 100.0,
            seed: None,
            frame_interval_ms: 16,
        }
    }
}

impl LayoutConfig {
    /// Parse a configuration from YAML text
    pub fn from_yaml(text: &str) -> Result<Self> {
        let config: LayoutConfig = serde_yaml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Read a configuration file
    pub fn from_path(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path).map_err(|source| LineageError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml(&text)
    }

    /// Reject values the force law cannot work with
    pub fn validate(&self) -> Result<()> {
        let positive = [
            ("threshold", self.threshold),
            ("damping", self.damping),
            ("limit", self.limit),
            ("epsilon", self.epsilon),
            ("canvas_size", self.canvas_size),
        ];
        for (name, value) in positive {
            if !(value.is_finite() && value > 0.0) {
                return Err(LineageError::Config(format!(
                    "{name} must be a positive finite number, got {value}"
                )));
            }
        }
        if self.max_iterations == 0 {
            return Err(LineageError::Config(
                "max_iterations must be at least 1".to_string(),
            ));
        }
        if self.frame_interval_ms == 0 {
            return Err(LineageError::Config(
                "frame_interval_ms must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_reference_constants() {
        let config = LayoutConfig::default();
        assert_eq!(config.threshold, 10.0);
        assert_eq!(config.damping, 0.1);
        assert_eq!(config.limit, 1.0);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn partial_yaml_keeps_defaults() {
        let config = LayoutConfig::from_yaml("threshold: 12.5\nseed: 7\n").unwrap();
        assert_eq!(config.threshold, 12.5);
        assert_eq!(config.seed, Some(7));
        assert_eq!(config.damping, 0.1);
        assert_eq!(config.max_iterations, 2000);
    }

    #[test]
    fn rejects_non_positive_threshold() {
        let err = LayoutConfig::from_yaml("threshold: 0").unwrap_err();
        assert!(matches!(err, LineageError::Config(_)));
        assert!(err.to_string().contains("threshold"));
    }

    #[test]
    fn rejects_zero_iteration_cap() {
        let config = LayoutConfig {
            max_iterations: 0,
            ..LayoutConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn rejects_zero_frame_interval() {
        let err = LayoutConfig::from_yaml("frame_interval_ms: 0\n").unwrap_err();
        assert!(matches!(err, LineageError::Config(_)));
        assert!(err.to_string().contains("frame_interval_ms"));
    }

    #[test]
    fn malformed_yaml_is_a_parse_error() {
        let err = LayoutConfig::from_yaml("threshold: [1, 2").unwrap_err();
        assert!(matches!(err, LineageError::ConfigParse(_)));
    }

    #[test]
    fn reads_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("layout.yaml");
        fs::write(&path, "damping: 0.05\nmax_iterations: 300\n").unwrap();

        let config = LayoutConfig::from_path(&path).unwrap();
        assert_eq!(config.damping, 0.05);
        assert_eq!(config.max_iterations, 300);
    }
}
