//! Producer selection from configuration

use crate::abdominal_wall::AbdominalWall;
use crate::background::Background;
use crate::lung::Lung;
use crate::phantom::Phantom;
use crate::producer::LayerProducer;
use crate::water_gel::WaterGel;
use serde::{Deserialize, Serialize};
use sonomap_core::{DomainError, MaterialLayer, Result, Shape};

/// Any known producer, tagged by `kind`
///
/// ```json
/// { "kind": "water_gel", "thickness": 8 }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LayerConfig {
    Background(Background),
    WaterGel(WaterGel),
    Phantom(Phantom),
    Lung(Lung),
    AbdominalWall(AbdominalWall),
}

impl LayerConfig {
    fn producer(&self) -> &dyn LayerProducer {
        match self {
            Self::Background(p) => p,
            Self::WaterGel(p) => p,
            Self::Phantom(p) => p,
            Self::Lung(p) => p,
            Self::AbdominalWall(p) => p,
        }
    }

    /// Parse a list of layers from JSON, lowest precedence first
    pub fn list_from_json(json: &str) -> Result<Vec<Self>> {
        serde_json::from_str(json)
            .map_err(|e| DomainError::config(format!("Invalid layer configuration: {e}")))
    }
}

impl LayerProducer for LayerConfig {
    fn name(&self) -> &str {
        self.producer().name()
    }

    fn build(&self, shape: Shape) -> Result<MaterialLayer> {
        self.producer().build(shape)
    }
}
