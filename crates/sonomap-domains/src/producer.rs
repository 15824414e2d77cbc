//! Producer trait
//!
//! Producers are parameter records that know how to build one layer for a
//! given lattice. They are chosen by configuration, not by subclassing.

use sonomap_core::{MaterialLayer, Result, Shape};

/// Something that can build a sub-domain for a lattice
pub trait LayerProducer {
    /// Name given to the built layer
    fn name(&self) -> &str;

    /// Build the layer over `shape`
    fn build(&self, shape: Shape) -> Result<MaterialLayer>;
}
