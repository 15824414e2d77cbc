//! Water/gel coupling layer

use crate::geometry::depth_band;
use crate::producer::LayerProducer;
use serde::{Deserialize, Serialize};
use sonomap_core::{Material, MaterialCatalog, MaterialLayer, Result, Shape};

/// Coupling medium between the transducer face and the skin
///
/// Occupies depth rows `0..thickness` across the full lateral extent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WaterGel {
    /// Thickness in cells
    pub thickness: usize,
    #[serde(default = "default_material")]
    pub material: Material,
}

fn default_material() -> Material {
    Material::Water
}

impl WaterGel {
    /// Water layer of `thickness` cells
    pub fn new(thickness: usize) -> Self {
        Self {
            thickness,
            material: Material::Water,
        }
    }
}

impl LayerProducer for WaterGel {
    fn name(&self) -> &str {
        "water_gel"
    }

    fn build(&self, shape: Shape) -> Result<MaterialLayer> {
        let props = MaterialCatalog::global().get(self.material);
        MaterialLayer::uniform(self.name(), props, depth_band(shape, 0..self.thickness))
    }
}
