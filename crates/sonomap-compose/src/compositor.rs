//! Ordered sub-domain composition
//!
//! Layers are applied bottom-up like stickers on a backing sheet: each
//! registered sub-domain overwrites every channel of the cells its mask
//! claims. Precedence is registration order and nothing else, so for a
//! cell claimed by several sub-domains the last one registered wins.

use crate::composite::CompositeDomain;
use crate::config::CompositorConfig;
use ndarray::{Array2, Zip};
use sonomap_core::{
    CellValues, Channel, ChannelSet, ChannelSource, DomainError, Material, MaterialCatalog,
    MaterialProperties, Result, Shape, SubDomain,
};
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Instant;
use tracing::{Level, debug, info, span, warn};

/// Fuses registered sub-domains into one composite grid
///
/// Not meant for concurrent registration; wrap it in a single lock if it is
/// shared, since both registration and construction mutate it.
pub struct DomainCompositor {
    config: CompositorConfig,
    /// Resolved background constants
    background: MaterialProperties,
    /// Registered sub-domains, lowest precedence first
    layers: Vec<Arc<dyn SubDomain>>,
    /// Lattice shape every layer must share
    shape: Option<Shape>,
    /// Last constructed composite, cleared by any registration
    constructed: Option<CompositeDomain>,
}

impl DomainCompositor {
    /// Create an empty compositor
    pub fn new(config: CompositorConfig) -> Result<Self> {
        config.validate()?;
        let background = *MaterialCatalog::global().get(config.background);

        info!(
            background = %config.background,
            ignore_non_linearity = config.ignore_non_linearity,
            shape = ?config.shape,
            "Creating domain compositor"
        );

        Ok(Self {
            shape: config.shape,
            config,
            background,
            layers: Vec::new(),
            constructed: None,
        })
    }

    /// Create a new compositor builder
    pub fn builder() -> CompositorBuilder {
        CompositorBuilder::new()
    }

    /// Append sub-domains in precedence order, later entries on top
    ///
    /// The whole batch is checked before anything is appended, so a shape
    /// mismatch leaves the registration list untouched.
    pub fn register_domains<I>(&mut self, domains: I) -> Result<()>
    where
        I: IntoIterator<Item = Arc<dyn SubDomain>>,
    {
        let batch: Vec<_> = domains.into_iter().collect();
        let mut shape = self.shape;

        for (offset, domain) in batch.iter().enumerate() {
            let index = self.layers.len() + offset;
            let expected = *shape.get_or_insert(domain.shape());
            check_layer(domain.as_ref(), expected).map_err(|e| e.at_index(index))?;
        }

        for domain in &batch {
            debug!(
                index = self.layers.len(),
                name = domain.name(),
                claimed = domain.claimed_cells(),
                "Registered sub-domain"
            );
            self.layers.push(Arc::clone(domain));
        }

        self.shape = shape;
        if !batch.is_empty() {
            self.constructed = None;
        }
        Ok(())
    }

    /// Register a single sub-domain, returning its registration index
    pub fn register(&mut self, domain: impl SubDomain + 'static) -> Result<usize> {
        let index = self.layers.len();
        self.register_domains([Arc::new(domain) as Arc<dyn SubDomain>])?;
        Ok(index)
    }

    /// Merge every registered sub-domain and cache the result
    ///
    /// Always rebuilds from the current registrations.
    pub fn construct_domain(&mut self) -> Result<&CompositeDomain> {
        self.constructed = None;

        let shape = self.shape.ok_or_else(|| {
            DomainError::config("No lattice shape: configure one or register a sub-domain")
        })?;

        let span = span!(Level::DEBUG, "construct_domain", layers = self.layers.len());
        let _enter = span.enter();
        let start = Instant::now();

        let composite = self.merge(shape);

        if self.config.validate {
            let report = composite.validate();
            if report.has_warnings() {
                for warning in &report.warnings {
                    warn!(?warning, "Composite validation warning");
                }
                warn!(count = report.warnings.len(), "Composite passed with warnings");
            }
            report.into_result()?;
        }

        info!(
            shape = %shape,
            layers = self.layers.len(),
            background_cells = composite.background_cells(),
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Composite domain constructed"
        );

        Ok(&*self.constructed.insert(composite))
    }

    /// The cached composite
    pub fn constructed_domain(&self) -> Result<&CompositeDomain> {
        self.constructed.as_ref().ok_or(DomainError::NotConstructed)
    }

    /// Cached composite channels keyed by canonical name
    pub fn constructed_domain_dict(&self) -> Result<BTreeMap<&'static str, &Array2<f64>>> {
        self.constructed_domain().map(CompositeDomain::to_dict)
    }

    /// Check if a composite is cached
    pub fn is_constructed(&self) -> bool {
        self.constructed.is_some()
    }

    /// Values written into unclaimed cells
    pub fn baseline(&self) -> CellValues {
        CellValues {
            air: self.config.background_air,
            geometry: self.config.background_geometry,
            ..CellValues::from_material(&self.background)
        }
    }

    /// Background material
    pub fn background(&self) -> Material {
        self.config.background
    }

    /// Get compositor configuration
    pub fn config(&self) -> &CompositorConfig {
        &self.config
    }

    /// Lattice shape, once known
    pub fn shape(&self) -> Option<Shape> {
        self.shape
    }

    /// Get number of registered sub-domains
    pub fn len(&self) -> usize {
        self.layers.len()
    }

    /// Check if nothing is registered
    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    /// Registered sub-domain names, lowest precedence first
    pub fn layer_names(&self) -> Vec<&str> {
        self.layers.iter().map(|l| l.name()).collect()
    }

    fn merge(&self, shape: Shape) -> CompositeDomain {
        let mut channels = ChannelSet::filled(shape, self.baseline());
        let mut owners: Array2<Option<usize>> = Array2::from_elem(shape.dim(), None);

        for (index, layer) in self.layers.iter().enumerate() {
            let mask = layer.occupancy_mask();
            let claimed = layer.claimed_cells();
            if claimed == 0 {
                debug!(index, name = layer.name(), "Skipping sub-domain with empty mask");
                continue;
            }

            for channel in Channel::ALL {
                if channel == Channel::Beta && self.config.ignore_non_linearity {
                    continue;
                }
                overwrite_masked(channels.get_mut(channel), layer.channel(channel), mask);
            }

            Zip::from(&mut owners).and(mask).for_each(|owner, &hit| {
                if hit {
                    *owner = Some(index);
                }
            });

            debug!(index, name = layer.name(), claimed, "Applied sub-domain");
        }

        let names = self.layers.iter().map(|l| l.name().to_string()).collect();
        CompositeDomain::new(channels, owners, names)
    }
}

/// Copy `src` into `dst` wherever `mask` is set
fn overwrite_masked(dst: &mut Array2<f64>, src: &Array2<f64>, mask: &Array2<bool>) {
    Zip::from(dst).and(src).and(mask).for_each(|d, &s, &hit| {
        if hit {
            *d = s;
        }
    });
}

/// Every array a layer exposes must match the lattice
fn check_layer(layer: &dyn SubDomain, expected: Shape) -> Result<()> {
    expected.ensure_matches(layer.shape())?;
    expected.ensure_matches(Shape::of(layer.occupancy_mask()))?;
    for channel in Channel::ALL {
        expected.ensure_matches(Shape::of(layer.channel(channel)))?;
    }
    Ok(())
}

/// Compositor builder
pub struct CompositorBuilder {
    config: CompositorConfig,
    layers: Vec<Arc<dyn SubDomain>>,
}

impl CompositorBuilder {
    /// Create a new builder
    pub fn new() -> Self {
        Self {
            config: CompositorConfig::default(),
            layers: Vec::new(),
        }
    }

    /// Set configuration
    pub fn config(mut self, config: CompositorConfig) -> Self {
        self.config = config;
        self
    }

    /// Set background material
    pub fn background(mut self, material: Material) -> Self {
        self.config.background = material;
        self
    }

    /// Enable/disable the linear-propagation beta override
    pub fn ignore_non_linearity(mut self, ignore: bool) -> Self {
        self.config.ignore_non_linearity = ignore;
        self
    }

    /// Fix the lattice shape up front
    pub fn shape(mut self, shape: Shape) -> Self {
        self.config.shape = Some(shape);
        self
    }

    /// Enable/disable validation after each merge
    pub fn validate(mut self, enabled: bool) -> Self {
        self.config.validate = enabled;
        self
    }

    /// Add a layer on top of those already added
    pub fn layer(mut self, layer: impl SubDomain + 'static) -> Self {
        self.layers.push(Arc::new(layer));
        self
    }

    /// Add a shared layer on top of those already added
    pub fn layer_arc(mut self, layer: Arc<dyn SubDomain>) -> Self {
        self.layers.push(layer);
        self
    }

    /// Build the compositor and register the layers
    pub fn build(self) -> Result<DomainCompositor> {
        let mut compositor = DomainCompositor::new(self.config)?;
        compositor.register_domains(self.layers)?;
        Ok(compositor)
    }
}

impl Default for CompositorBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sonomap_core::{Mask, MaterialLayer};

    fn water() -> MaterialProperties {
        *MaterialCatalog::global().get(Material::Water)
    }

    /// Water-based layer with custom density over `mask`
    fn density_layer(name: &str, mask: Mask, rho: f64) -> Arc<dyn SubDomain> {
        let values = CellValues {
            rho,
            ..CellValues::from_material(&water())
        };
        let channels = ChannelSet::filled(Shape::of(&mask), values);
        Arc::new(MaterialLayer::new(name, channels, mask).unwrap())
    }

    fn layer_with(name: &str, mask: Mask, values: CellValues) -> Arc<dyn SubDomain> {
        let channels = ChannelSet::filled(Shape::of(&mask), values);
        Arc::new(MaterialLayer::new(name, channels, mask).unwrap())
    }

    fn rows(shape: Shape, rows: std::ops::Range<usize>) -> Mask {
        Array2::from_shape_fn(shape.dim(), |(x, _)| rows.contains(&x))
    }

    fn column(shape: Shape, col: usize) -> Mask {
        Array2::from_shape_fn(shape.dim(), |(_, y)| y == col)
    }

    fn water_compositor() -> DomainCompositor {
        DomainCompositor::builder()
            .background(Material::Water)
            .build()
            .unwrap()
    }

    #[test]
    fn test_sticker_scenario() {
        let shape = Shape::new(4, 4);
        let mut compositor = water_compositor();
        compositor
            .register_domains([
                density_layer("a", rows(shape, 0..2), 1200.0),
                density_layer("b", column(shape, 0), 1500.0),
            ])
            .unwrap();

        let composite = compositor.construct_domain().unwrap();
        let rho = composite.channel(Channel::Rho);

        for x in 0..4 {
            for y in 0..4 {
                let expected = if y == 0 {
                    1500.0
                } else if x < 2 {
                    1200.0
                } else {
                    1000.0
                };
                assert_eq!(rho[[x, y]], expected, "cell ({x}, {y})");
            }
        }
    }

    #[test]
    fn test_later_registration_wins() {
        let shape = Shape::new(3, 3);
        let tissue = CellValues::from_material(MaterialCatalog::global().get(Material::Tissue));
        let lung = CellValues::from_material(MaterialCatalog::global().get(Material::LungAir))
            .with_air(true);

        let mut compositor = water_compositor();
        compositor
            .register_domains([
                layer_with("tissue", shape.full_mask(), tissue),
                layer_with("lung", rows(shape, 1..2), lung),
            ])
            .unwrap();
        let composite = compositor.construct_domain().unwrap();

        for y in 0..3 {
            assert_eq!(composite.cell(1, y), Some(lung));
            assert_eq!(composite.owner(1, y), Some(1));
            assert_eq!(composite.cell(0, y), Some(tissue));
            assert_eq!(composite.owner(0, y), Some(0));
        }
    }

    #[test]
    fn test_unclaimed_cells_keep_background() {
        let shape = Shape::new(4, 2);
        let mut mask = shape.empty_mask();
        mask[[0, 0]] = true;

        let mut compositor = DomainCompositor::builder()
            .background(Material::Liver)
            .build()
            .unwrap();
        compositor
            .register_domains([density_layer("spot", mask, 1111.0)])
            .unwrap();

        let expected = compositor.baseline();
        let composite = compositor.construct_domain().unwrap();

        for x in 0..4 {
            for y in 0..2 {
                if (x, y) == (0, 0) {
                    continue;
                }
                assert_eq!(composite.cell(x, y), Some(expected));
                assert_eq!(composite.owner(x, y), None);
            }
        }
        assert_eq!(expected.rho, 1064.0);
        assert_eq!(expected.c, 1570.0);
    }

    #[test]
    fn test_cells_are_never_mixed_across_layers() {
        let shape = Shape::new(5, 5);
        let fat = CellValues::from_material(MaterialCatalog::global().get(Material::Fat));
        let muscle = CellValues::from_material(MaterialCatalog::global().get(Material::Muscle))
            .with_geometry(true);
        let skin = CellValues::from_material(MaterialCatalog::global().get(Material::Skin));
        let values = [fat, muscle, skin];

        let mut compositor = water_compositor();
        compositor
            .register_domains([
                layer_with("fat", rows(shape, 0..4), fat),
                layer_with("muscle", column(shape, 2), muscle),
                layer_with("skin", rows(shape, 3..5), skin),
            ])
            .unwrap();
        let baseline = compositor.baseline();
        let composite = compositor.construct_domain().unwrap();

        for x in 0..5 {
            for y in 0..5 {
                let expected = match composite.owner(x, y) {
                    Some(i) => values[i],
                    None => baseline,
                };
                assert_eq!(composite.cell(x, y), Some(expected));
            }
        }
        assert_eq!(composite.owner_name(4, 2), Some("skin"));
        assert_eq!(composite.owner_name(1, 2), Some("muscle"));
    }

    #[test]
    fn test_construct_is_idempotent() {
        let shape = Shape::new(4, 4);
        let mut compositor = water_compositor();
        compositor
            .register_domains([
                density_layer("a", rows(shape, 1..3), 1100.0),
                density_layer("b", column(shape, 3), 1300.0),
            ])
            .unwrap();

        let first = compositor.construct_domain().unwrap().clone();
        let second = compositor.construct_domain().unwrap();
        assert_eq!(&first, second);
    }

    #[test]
    fn test_registration_invalidates_cache() {
        let shape = Shape::new(4, 4);
        let mut compositor = water_compositor();
        compositor
            .register_domains([density_layer("a", rows(shape, 0..2), 1200.0)])
            .unwrap();
        let before = compositor.construct_domain().unwrap().clone();

        let footprint = column(shape, 1);
        compositor
            .register_domains([density_layer("b", footprint.clone(), 1500.0)])
            .unwrap();
        assert!(!compositor.is_constructed());
        assert_eq!(
            compositor.constructed_domain().unwrap_err(),
            DomainError::NotConstructed
        );

        let after = compositor.construct_domain().unwrap();
        for x in 0..4 {
            for y in 0..4 {
                if footprint[[x, y]] {
                    assert_eq!(after.channel(Channel::Rho)[[x, y]], 1500.0);
                } else {
                    assert_eq!(after.cell(x, y), before.cell(x, y));
                }
            }
        }
    }

    #[test]
    fn test_ignore_non_linearity_flattens_beta() {
        let shape = Shape::new(3, 3);
        let fat = CellValues::from_material(MaterialCatalog::global().get(Material::Fat));
        let liver = CellValues::from_material(MaterialCatalog::global().get(Material::Liver));

        let mut compositor = DomainCompositor::builder()
            .background(Material::Tissue)
            .ignore_non_linearity(true)
            .layer_arc(layer_with("fat", shape.full_mask(), fat))
            .layer_arc(layer_with("liver", rows(shape, 0..1), liver))
            .build()
            .unwrap();

        let tissue_beta = MaterialCatalog::global().get(Material::Tissue).beta;
        let composite = compositor.construct_domain().unwrap();
        assert!(composite.channel(Channel::Beta).iter().all(|&b| b == tissue_beta));
        assert_eq!(composite.channel(Channel::SoundSpeed)[[0, 0]], liver.c);
        assert_eq!(composite.channel(Channel::SoundSpeed)[[2, 0]], fat.c);
    }

    #[test]
    fn test_empty_mask_contributes_nothing() {
        let shape = Shape::new(3, 3);
        let mut compositor = water_compositor();
        compositor
            .register_domains([density_layer("base", shape.full_mask(), 1200.0)])
            .unwrap();
        let before = compositor.construct_domain().unwrap().clone();

        compositor
            .register_domains([density_layer("disabled", shape.empty_mask(), 9999.0)])
            .unwrap();
        let after = compositor.construct_domain().unwrap();

        assert_eq!(after.channels(), before.channels());
        assert_eq!(after.cells_owned_by(1), 0);
    }

    #[test]
    fn test_full_mask_overwrites_everything() {
        let shape = Shape::new(3, 3);
        let mut compositor = water_compositor();
        compositor
            .register_domains([
                density_layer("a", rows(shape, 0..2), 1200.0),
                density_layer("b", shape.full_mask(), 1500.0),
            ])
            .unwrap();
        let composite = compositor.construct_domain().unwrap();

        assert!(composite.channel(Channel::Rho).iter().all(|&r| r == 1500.0));
        assert_eq!(composite.cells_owned_by(1), 9);
        assert_eq!(composite.background_cells(), 0);
    }

    #[test]
    fn test_shape_mismatch_reports_index() {
        let mut compositor = water_compositor();
        compositor
            .register_domains([density_layer("a", Shape::new(4, 4).full_mask(), 1200.0)])
            .unwrap();

        let err = compositor
            .register_domains([
                density_layer("b", Shape::new(4, 4).full_mask(), 1300.0),
                density_layer("c", Shape::new(4, 5).full_mask(), 1400.0),
            ])
            .unwrap_err();

        assert_eq!(
            err,
            DomainError::ShapeMismatch {
                index: Some(2),
                expected: Shape::new(4, 4),
                actual: Shape::new(4, 5),
            }
        );
        // Rejected batches are not partially appended
        assert_eq!(compositor.len(), 1);
    }

    #[test]
    fn test_configured_shape_is_enforced() {
        let mut compositor = DomainCompositor::builder()
            .shape(Shape::new(2, 2))
            .build()
            .unwrap();
        let err = compositor
            .register_domains([density_layer("a", Shape::new(3, 3).full_mask(), 1200.0)])
            .unwrap_err();
        assert!(matches!(err, DomainError::ShapeMismatch { index: Some(0), .. }));
    }

    #[test]
    fn test_configured_shape_without_layers() {
        let mut compositor = DomainCompositor::builder()
            .background(Material::Water)
            .shape(Shape::new(2, 3))
            .build()
            .unwrap();

        let composite = compositor.construct_domain().unwrap();
        assert_eq!(composite.shape(), Shape::new(2, 3));
        assert!(composite.channel(Channel::Rho).iter().all(|&r| r == 1000.0));
    }

    #[test]
    fn test_construct_without_shape_fails() {
        let mut compositor = water_compositor();
        let err = compositor.construct_domain().unwrap_err();
        assert!(matches!(err, DomainError::Configuration(_)));
    }

    #[test]
    fn test_read_before_construct_fails() {
        let compositor = water_compositor();
        assert_eq!(
            compositor.constructed_domain_dict().unwrap_err(),
            DomainError::NotConstructed
        );
    }

    #[test]
    fn test_constructed_domain_dict() {
        let shape = Shape::new(2, 2);
        let mut compositor = water_compositor();
        compositor
            .register_domains([density_layer("a", shape.full_mask(), 1200.0)])
            .unwrap();
        compositor.construct_domain().unwrap();

        let dict = compositor.constructed_domain_dict().unwrap();
        assert_eq!(dict.len(), 6);
        assert_eq!(dict["rho"][[1, 1]], 1200.0);
        assert_eq!(dict["c"][[1, 1]], 1480.0);
    }

    #[test]
    fn test_composite_matches_sub_domain_access() {
        let shape = Shape::new(2, 2);
        let layer = density_layer("a", shape.full_mask(), 1200.0);
        let mut compositor = water_compositor();
        compositor.register_domains([Arc::clone(&layer)]).unwrap();
        let composite = compositor.construct_domain().unwrap();

        fn read<S: ChannelSource + ?Sized>(source: &S) -> Vec<f64> {
            source.get_channel("rho").unwrap().iter().copied().collect()
        }
        assert_eq!(read(layer.as_ref()), read(composite));
    }

    #[test]
    fn test_invalid_layer_aborts_construction() {
        let shape = Shape::new(2, 2);
        let broken = CellValues {
            air: 0.5,
            ..CellValues::from_material(&water())
        };
        let mut compositor = water_compositor();
        compositor
            .register_domains([
                layer_with("ok", shape.full_mask(), CellValues::from_material(&water())),
                layer_with("broken", shape.full_mask(), broken),
            ])
            .unwrap();

        let err = compositor.construct_domain().unwrap_err();
        let DomainError::InvalidComposite(msg) = &err else {
            panic!("unexpected error: {err}");
        };
        assert!(msg.contains("sub-domain 'broken' (index 1)"), "{msg}");
        assert!(msg.contains("air occupancy"), "{msg}");
        assert!(!compositor.is_constructed());
    }

    #[test]
    fn test_register_single_returns_index() {
        let shape = Shape::new(2, 2);
        let water = water();
        let mut compositor = water_compositor();

        let first = MaterialLayer::uniform("one", &water, shape.full_mask()).unwrap();
        let second = MaterialLayer::uniform("two", &water, shape.empty_mask()).unwrap();
        assert_eq!(compositor.register(first).unwrap(), 0);
        assert_eq!(compositor.register(second).unwrap(), 1);
        assert_eq!(compositor.layer_names(), vec!["one", "two"]);
    }
}
