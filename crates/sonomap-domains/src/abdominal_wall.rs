//! Stratified abdominal wall
//!
//! A parametric stand-in for measured wall geometry: horizontal strata of
//! fixed thickness stacked downward from a start depth.

use crate::geometry::{Spacing, count, depth_band};
use crate::producer::LayerProducer;
use serde::{Deserialize, Serialize};
use sonomap_core::{
    CellValues, ChannelSet, Material, MaterialCatalog, MaterialLayer, Result, Shape,
};
use tracing::debug;

/// One tissue stratum
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Stratum {
    pub material: Material,
    /// Thickness in cells
    pub thickness: usize,
}

impl Stratum {
    pub fn new(material: Material, thickness: usize) -> Self {
        Self {
            material,
            thickness,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AbdominalWall {
    /// Depth of the first stratum in cells
    #[serde(default)]
    pub start_depth: usize,
    /// Strata from the surface downward
    pub strata: Vec<Stratum>,
}

impl AbdominalWall {
    /// Create a wall from explicit strata
    pub fn new(start_depth: usize, strata: Vec<Stratum>) -> Self {
        Self {
            start_depth,
            strata,
        }
    }

    /// Skin, fat, muscle and fascia at typical adult thicknesses
    pub fn typical(spacing: &Spacing, start_depth: usize) -> Self {
        let layers = [
            (Material::Skin, 2.0e-3),
            (Material::Fat, 8.0e-3),
            (Material::Muscle, 10.0e-3),
            (Material::Connective, 1.0e-3),
        ];
        let strata = layers
            .iter()
            .map(|&(material, meters)| Stratum::new(material, spacing.cells_y(meters)))
            .collect();
        Self::new(start_depth, strata)
    }

    /// Total thickness in cells, saturating at `usize::MAX`
    pub fn thickness(&self) -> usize {
        self.strata
            .iter()
            .fold(0, |total: usize, s| total.saturating_add(s.thickness))
    }
}

impl LayerProducer for AbdominalWall {
    fn name(&self) -> &str {
        "abdominal_wall"
    }

    fn build(&self, shape: Shape) -> Result<MaterialLayer> {
        let catalog = MaterialCatalog::global();
        let base = CellValues::from_material(catalog.get(Material::Tissue));
        let mut channels = ChannelSet::filled(shape, base);

        let mut top = self.start_depth;
        for stratum in &self.strata {
            let bottom = top.saturating_add(stratum.thickness);
            let band = depth_band(shape, top..bottom);
            let values =
                CellValues::from_material(catalog.get(stratum.material)).with_geometry(true);
            channels.fill_masked(&band, values)?;
            debug!(material = %stratum.material, top, cells = count(&band), "Placed stratum");
            top = bottom;
        }

        // Strata are contiguous, so the wall covers one band
        let mask = depth_band(shape, self.start_depth..top);
        MaterialLayer::new(self.name(), channels, mask)
    }
}
