//! Sub-domain contract
//!
//! A sub-domain is an independently generated set of channel arrays plus an
//! occupancy mask marking the cells it claims. Producers build them, the
//! compositor only reads them.

use crate::channel::Channel;
use crate::error::Result;
use crate::grid::{CellValues, ChannelSet, Mask, Shape};
use crate::material::MaterialProperties;
use ndarray::Array2;

/// Read access to a full set of named channels
///
/// Sub-domains and finished composites both implement this, so a consumer
/// never needs to know which one it holds.
pub trait ChannelSource {
    /// Lattice shape of every channel
    fn shape(&self) -> Shape;

    /// Array for one channel
    fn channel(&self, channel: Channel) -> &Array2<f64>;

    /// Array for a channel looked up by name
    fn get_channel(&self, name: &str) -> Result<&Array2<f64>> {
        let channel: Channel = name.parse()?;
        Ok(self.channel(channel))
    }
}

/// A partial property grid that claims a subset of the lattice
pub trait SubDomain: ChannelSource + Send + Sync {
    /// Name used in logs and errors
    fn name(&self) -> &str;

    /// Cells where this sub-domain is authoritative
    fn occupancy_mask(&self) -> &Mask;

    /// Number of claimed cells
    fn claimed_cells(&self) -> usize {
        self.occupancy_mask().iter().filter(|&&c| c).count()
    }
}

/// Plain channel data plus a mask
#[derive(Debug, Clone)]
pub struct MaterialLayer {
    name: String,
    channels: ChannelSet,
    mask: Mask,
}

impl MaterialLayer {
    /// Create a layer, checking that the mask fits the channels
    pub fn new(name: impl Into<String>, channels: ChannelSet, mask: Mask) -> Result<Self> {
        channels.shape().ensure_matches(Shape::of(&mask))?;
        Ok(Self {
            name: name.into(),
            channels,
            mask,
        })
    }

    /// Uniform material over the claimed cells
    ///
    /// Unclaimed cells hold the same values; they are never read by the
    /// compositor but keep the arrays physically sensible for viewers.
    pub fn uniform(
        name: impl Into<String>,
        material: &MaterialProperties,
        mask: Mask,
    ) -> Result<Self> {
        let channels = ChannelSet::filled(Shape::of(&mask), CellValues::from_material(material));
        Self::new(name, channels, mask)
    }

    /// Channel data
    pub fn channels(&self) -> &ChannelSet {
        &self.channels
    }

    /// Mutable channel data, available until the layer is shared
    pub fn channels_mut(&mut self) -> &mut ChannelSet {
        &mut self.channels
    }
}

impl ChannelSource for MaterialLayer {
    fn shape(&self) -> Shape {
        self.channels.shape()
    }

    fn channel(&self, channel: Channel) -> &Array2<f64> {
        self.channels.get(channel)
    }
}

impl SubDomain for MaterialLayer {
    fn name(&self) -> &str {
        &self.name
    }

    fn occupancy_mask(&self) -> &Mask {
        &self.mask
    }
}
