//! Compositor configuration

use serde::{Deserialize, Serialize};
use sonomap_core::{DomainError, Material, Result, Shape};

/// Configuration for a [`DomainCompositor`](crate::DomainCompositor)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompositorConfig {
    /// Material filling every cell no sub-domain claims
    pub background: Material,
    /// Force the composite beta to the background constant everywhere
    pub ignore_non_linearity: bool,
    /// Fixed lattice shape; taken from the first registration when unset
    pub shape: Option<Shape>,
    /// Geometry value of unclaimed cells (0.0 or 1.0)
    pub background_geometry: f64,
    /// Air value of unclaimed cells (0.0 or 1.0)
    pub background_air: f64,
    /// Run composite validation after every merge
    pub validate: bool,
}

impl Default for CompositorConfig {
    fn default() -> Self {
        Self {
            background: Material::Tissue,
            ignore_non_linearity: false,
            shape: None,
            background_geometry: 0.0,
            background_air: 0.0,
            validate: true,
        }
    }
}

impl CompositorConfig {
    /// Linear propagation: beta is flattened to the background constant
    pub fn linear(background: Material) -> Self {
        Self {
            background,
            ignore_non_linearity: true,
            ..Default::default()
        }
    }

    /// Nonlinear propagation: beta is layered like the other channels
    pub fn nonlinear(background: Material) -> Self {
        Self {
            background,
            ignore_non_linearity: false,
            ..Default::default()
        }
    }

    /// Default configuration over a background given by catalog key
    pub fn for_background_name(name: &str) -> Result<Self> {
        Ok(Self {
            background: name.parse()?,
            ..Default::default()
        })
    }

    /// Parse from JSON
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| DomainError::config(format!("Invalid compositor config: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Reject invalid flag combinations
    pub fn validate(&self) -> Result<()> {
        for (name, value) in [
            ("background_geometry", self.background_geometry),
            ("background_air", self.background_air),
        ] {
            if value != 0.0 && value != 1.0 {
                return Err(DomainError::config(format!(
                    "{name} must be 0 or 1, got {value}"
                )));
            }
        }

        if let Some(shape) = self.shape {
            if shape.is_empty() {
                return Err(DomainError::config(format!(
                    "Lattice shape {shape} has no cells"
                )));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = CompositorConfig::default();
        assert_eq!(config.background, Material::Tissue);
        assert!(!config.ignore_non_linearity);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_presets() {
        assert!(CompositorConfig::linear(Material::Water).ignore_non_linearity);
        assert!(!CompositorConfig::nonlinear(Material::Water).ignore_non_linearity);
    }

    #[test]
    fn test_from_json() {
        let config = CompositorConfig::from_json(
            r#"{ "background": "liver", "ignore_non_linearity": true,
                 "shape": { "num_x": 8, "num_y": 16 } }"#,
        )
        .unwrap();

        assert_eq!(config.background, Material::Liver);
        assert!(config.ignore_non_linearity);
        assert_eq!(config.shape, Some(Shape::new(8, 16)));
        assert_eq!(config.background_air, 0.0);
    }

    #[test]
    fn test_unknown_background_rejected() {
        let err = CompositorConfig::from_json(r#"{ "background": "bone" }"#).unwrap_err();
        assert!(matches!(err, DomainError::Configuration(_)));

        let err = CompositorConfig::for_background_name("bone").unwrap_err();
        assert!(matches!(err, DomainError::Configuration(_)));
    }

    #[test]
    fn test_invalid_flags_rejected() {
        let config = CompositorConfig {
            background_air: 0.5,
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = CompositorConfig {
            shape: Some(Shape::new(0, 4)),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
