//! Lung region

use crate::geometry::ellipse;
use crate::producer::LayerProducer;
use serde::{Deserialize, Serialize};
use sonomap_core::{
    CellValues, ChannelSet, DomainError, Material, MaterialCatalog, MaterialLayer, Result, Shape,
};

/// Elliptical air-filled lung, optionally wrapped in a fluid rim
///
/// Interior cells carry `lung_air` properties with the air flag set; rim
/// cells carry `lung_fluid`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Lung {
    /// Center in cells, `[x, y]`
    pub center: [f64; 2],
    /// Semi-axes of the air region in cells
    pub radii: [f64; 2],
    /// Width of the fluid rim in cells
    #[serde(default)]
    pub fluid_rim: f64,
}

impl Lung {
    /// Create a lung without a fluid rim
    pub fn new(center: [f64; 2], radii: [f64; 2]) -> Self {
        Self {
            center,
            radii,
            fluid_rim: 0.0,
        }
    }

    /// Set the fluid rim width
    pub fn with_fluid_rim(mut self, width: f64) -> Self {
        self.fluid_rim = width;
        self
    }
}

impl LayerProducer for Lung {
    fn name(&self) -> &str {
        "lung"
    }

    fn build(&self, shape: Shape) -> Result<MaterialLayer> {
        if !(self.fluid_rim.is_finite() && self.fluid_rim >= 0.0) {
            return Err(DomainError::config(format!(
                "Lung fluid rim must be non-negative, got {}",
                self.fluid_rim
            )));
        }

        let catalog = MaterialCatalog::global();
        let air = CellValues::from_material(catalog.get(Material::LungAir)).with_air(true);
        let fluid = CellValues::from_material(catalog.get(Material::LungFluid));

        let inner = ellipse(shape, self.center, self.radii);
        let outer = ellipse(
            shape,
            self.center,
            [self.radii[0] + self.fluid_rim, self.radii[1] + self.fluid_rim],
        );

        let mut channels = ChannelSet::filled(shape, fluid);
        channels.fill_masked(&inner, air)?;

        let mask = if self.fluid_rim > 0.0 { outer } else { inner };

        MaterialLayer::new(self.name(), channels, mask)
    }
}
