//! Phantom inclusions
//!
//! Circular targets of a distinct material embedded in the background,
//! e.g. cysts or lesions in a calibration phantom.

use crate::geometry::{Spacing, circle, count};
use crate::producer::LayerProducer;
use serde::{Deserialize, Serialize};
use sonomap_core::{
    CellValues, ChannelSet, DomainError, Material, MaterialCatalog, MaterialLayer, Result, Shape,
};
use tracing::debug;

/// A single circular inclusion
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Inclusion {
    /// Center in cells, `[x, y]`
    pub center: [f64; 2],
    /// Radius in cells
    pub radius: f64,
    pub material: Material,
}

impl Inclusion {
    /// Create a new inclusion
    pub fn new(center: [f64; 2], radius: f64, material: Material) -> Self {
        Self {
            center,
            radius,
            material,
        }
    }
}

/// Set of inclusions forming one phantom layer
///
/// Inclusions listed later cover earlier ones where they overlap. Inclusion
/// cells are marked as solid geometry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Phantom {
    pub inclusions: Vec<Inclusion>,
    /// Material of the unclaimed cells in this layer's own arrays
    #[serde(default = "default_background")]
    pub background: Material,
}

fn default_background() -> Material {
    Material::Tissue
}

impl Phantom {
    /// Create a phantom from explicit inclusions
    pub fn new(inclusions: Vec<Inclusion>) -> Self {
        Self {
            inclusions,
            background: default_background(),
        }
    }

    /// `count` equal inclusions spread evenly across the lateral extent
    pub fn lateral(
        num_x: usize,
        count: usize,
        depth: f64,
        radius: f64,
        material: Material,
    ) -> Self {
        let pitch = num_x as f64 / count.max(1) as f64;
        let inclusions = (0..count)
            .map(|i| Inclusion::new([(i as f64 + 0.5) * pitch, depth], radius, material))
            .collect();
        Self::new(inclusions)
    }

    /// Physically sized lateral layout
    ///
    /// `extent`, `depth` and `radius` are in meters. The radius is converted
    /// with the lateral spacing.
    pub fn lateral_in_meters(
        spacing: &Spacing,
        extent: f64,
        count: usize,
        depth: f64,
        radius: f64,
        material: Material,
    ) -> Self {
        Self::lateral(
            spacing.cells_x(extent),
            count,
            depth / spacing.dy,
            radius / spacing.dx,
            material,
        )
    }

    /// Set the layer's background material
    pub fn with_background(mut self, material: Material) -> Self {
        self.background = material;
        self
    }
}

impl LayerProducer for Phantom {
    fn name(&self) -> &str {
        "phantom"
    }

    fn build(&self, shape: Shape) -> Result<MaterialLayer> {
        let catalog = MaterialCatalog::global();
        let base = CellValues::from_material(catalog.get(self.background));
        let mut channels = ChannelSet::filled(shape, base);
        let mut mask = shape.empty_mask();

        for (i, inclusion) in self.inclusions.iter().enumerate() {
            if !(inclusion.radius.is_finite() && inclusion.radius > 0.0) {
                return Err(DomainError::config(format!(
                    "Inclusion {i} has invalid radius {}",
                    inclusion.radius
                )));
            }

            let disc = circle(shape, inclusion.center, inclusion.radius);
            let values =
                CellValues::from_material(catalog.get(inclusion.material)).with_geometry(true);
            channels.fill_masked(&disc, values)?;
            mask.zip_mut_with(&disc, |m, &d| *m |= d);

            debug!(
                index = i,
                material = %inclusion.material,
                cells = count(&disc),
                "Placed inclusion"
            );
        }

        MaterialLayer::new(self.name(), channels, mask)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sonomap_core::{Channel, ChannelSource, SubDomain};

    #[test]
    fn test_single_inclusion() {
        let phantom = Phantom::new(vec![Inclusion::new([4.0, 4.0], 2.0, Material::Blood)]);
        let layer = phantom.build(Shape::new(9, 9)).unwrap();

        assert!(layer.occupancy_mask()[[4, 4]]);
        assert!(!layer.occupancy_mask()[[0, 0]]);
        assert_eq!(layer.channel(Channel::SoundSpeed)[[4, 4]], 1520.0);
        assert_eq!(layer.channel(Channel::Geometry)[[4, 4]], 1.0);
        assert_eq!(layer.channel(Channel::Geometry)[[0, 0]], 0.0);
    }

    #[test]
    fn test_later_inclusion_covers_earlier() {
        let phantom = Phantom::new(vec![
            Inclusion::new([3.0, 3.0], 2.0, Material::Fat),
            Inclusion::new([3.0, 3.0], 1.0, Material::Liver),
        ]);
        let layer = phantom.build(Shape::new(7, 7)).unwrap();

        assert_eq!(layer.channel(Channel::Rho)[[3, 3]], 1064.0);
        assert_eq!(layer.channel(Channel::Rho)[[1, 3]], 950.0);
    }

    #[test]
    fn test_lateral_layout() {
        let phantom = Phantom::lateral(12, 3, 6.0, 1.0, Material::Water);
        let centers: Vec<_> = phantom.inclusions.iter().map(|i| i.center[0]).collect();
        assert_eq!(centers, vec![2.0, 6.0, 10.0]);

        let layer = phantom.build(Shape::new(12, 12)).unwrap();
        assert_eq!(layer.claimed_cells(), 15);
    }

    #[test]
    fn test_lateral_in_meters() {
        let spacing = Spacing::uniform(1e-4);
        let phantom =
            Phantom::lateral_in_meters(&spacing, 1.2e-3, 3, 3e-4, 1e-4, Material::Water);
        let manual = Phantom::lateral(12, 3, 3.0, 1.0, Material::Water);

        for (a, b) in phantom.inclusions.iter().zip(&manual.inclusions) {
            assert!((a.center[0] - b.center[0]).abs() < 1e-9);
            assert!((a.center[1] - b.center[1]).abs() < 1e-9);
            assert!((a.radius - b.radius).abs() < 1e-9);
        }
    }

    #[test]
    fn test_invalid_radius() {
        let phantom = Phantom::new(vec![Inclusion::new([1.0, 1.0], -1.0, Material::Fat)]);
        let err = phantom.build(Shape::new(4, 4)).unwrap_err();
        assert!(matches!(err, DomainError::Configuration(_)));
    }
}
