//! Background tissue

use crate::producer::LayerProducer;
use serde::{Deserialize, Serialize};
use sonomap_core::{Material, MaterialCatalog, MaterialLayer, Result, Shape};
use tracing::debug;

/// Uniform material claiming the whole lattice
///
/// Registered first, it becomes the sheet everything else is stamped on.
/// Scatterer texture is usually injected into it before registration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Background {
    pub material: Material,
}

impl Background {
    /// Create a background of the given material
    pub fn new(material: Material) -> Self {
        Self { material }
    }
}

impl Default for Background {
    fn default() -> Self {
        Self::new(Material::Tissue)
    }
}

impl LayerProducer for Background {
    fn name(&self) -> &str {
        "background"
    }

    fn build(&self, shape: Shape) -> Result<MaterialLayer> {
        debug!(material = %self.material, shape = %shape, "Building background");
        let props = MaterialCatalog::global().get(self.material);
        MaterialLayer::uniform(self.name(), props, shape.full_mask())
    }
}
