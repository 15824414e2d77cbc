//! The finished composite grid
//!
//! A `CompositeDomain` is read through [`ChannelSource`], the same contract
//! sub-domains expose, so the solver and viewers treat both alike.

use ndarray::{Array2, Zip};
use sonomap_core::{
    CellValues, Channel, ChannelSet, ChannelSource, DomainError, Material, MaterialCatalog,
    Result, Shape,
};
use std::collections::BTreeMap;
use std::fmt;

/// Merged channel arrays plus per-cell provenance
#[derive(Debug, Clone, PartialEq)]
pub struct CompositeDomain {
    channels: ChannelSet,
    /// Registration index of the layer that wrote each cell, `None` for background
    owners: Array2<Option<usize>>,
    layer_names: Vec<String>,
}

impl CompositeDomain {
    pub(crate) fn new(
        channels: ChannelSet,
        owners: Array2<Option<usize>>,
        layer_names: Vec<String>,
    ) -> Self {
        Self {
            channels,
            owners,
            layer_names,
        }
    }

    /// Channel data
    pub fn channels(&self) -> &ChannelSet {
        &self.channels
    }

    /// All six values at a cell
    pub fn cell(&self, x: usize, y: usize) -> Option<CellValues> {
        self.channels.cell(x, y)
    }

    /// Registration index of the layer owning a cell
    ///
    /// Returns `None` for background cells and for cells outside the lattice.
    pub fn owner(&self, x: usize, y: usize) -> Option<usize> {
        self.owners.get((x, y)).copied().flatten()
    }

    /// Name of the layer owning a cell
    pub fn owner_name(&self, x: usize, y: usize) -> Option<&str> {
        self.owner(x, y)
            .and_then(|i| self.layer_names.get(i))
            .map(String::as_str)
    }

    /// Full ownership map
    pub fn ownership(&self) -> &Array2<Option<usize>> {
        &self.owners
    }

    /// Names of the layers that were merged, in registration order
    pub fn layer_names(&self) -> &[String] {
        &self.layer_names
    }

    /// Number of cells a given layer ended up owning
    pub fn cells_owned_by(&self, index: usize) -> usize {
        self.owners.iter().filter(|o| **o == Some(index)).count()
    }

    /// Number of cells left to the background
    pub fn background_cells(&self) -> usize {
        self.owners.iter().filter(|o| o.is_none()).count()
    }

    /// Channel arrays keyed by canonical name
    pub fn to_dict(&self) -> BTreeMap<&'static str, &Array2<f64>> {
        self.channels
            .iter()
            .map(|(ch, array)| (ch.as_str(), array))
            .collect()
    }

    fn cell_owner(&self, x: usize, y: usize) -> CellOwner {
        match self.owner(x, y) {
            Some(index) => CellOwner::Layer {
                index,
                name: self.layer_names.get(index).cloned().unwrap_or_default(),
            },
            None => CellOwner::Background,
        }
    }

    /// Check physical consistency of every cell
    pub fn validate(&self) -> ValidationReport {
        let mut report = ValidationReport::success();
        let water_c = MaterialCatalog::global().get(Material::Water).c0;

        for channel in Channel::ALL {
            Zip::indexed(self.channels.get(channel)).for_each(|(x, y), &value| {
                let kind = if !value.is_finite() {
                    Some(IssueKind::NonFinite)
                } else if matches!(channel, Channel::Rho | Channel::SoundSpeed) && value <= 0.0 {
                    Some(IssueKind::NonPositive)
                } else if channel.is_binary() && value != 0.0 && value != 1.0 {
                    Some(IssueKind::NonBinary)
                } else {
                    None
                };

                if let Some(kind) = kind {
                    report.add_error(CompositeIssue {
                        kind,
                        channel,
                        x,
                        y,
                        value,
                        owner: self.cell_owner(x, y),
                    });
                } else if channel == Channel::Attenuation && value < 0.0 {
                    report.add_warning(CompositeWarning::NegativeAttenuation { x, y, value });
                }
            });
        }

        Zip::indexed(self.channels.get(Channel::Air))
            .and(self.channels.get(Channel::SoundSpeed))
            .for_each(|(x, y), &air, &c| {
                if air == 1.0 && c > water_c {
                    report.add_warning(CompositeWarning::AirSpeedAboveWater { x, y, value: c });
                }
            });

        report
    }
}

impl ChannelSource for CompositeDomain {
    fn shape(&self) -> Shape {
        self.channels.shape()
    }

    fn channel(&self, channel: Channel) -> &Array2<f64> {
        self.channels.get(channel)
    }
}

/// Outcome of [`CompositeDomain::validate`]
#[derive(Debug, Clone)]
pub struct ValidationReport {
    /// Whether every hard invariant holds
    pub valid: bool,
    pub errors: Vec<CompositeIssue>,
    pub warnings: Vec<CompositeWarning>,
}

impl ValidationReport {
    /// An empty, passing report
    pub fn success() -> Self {
        Self {
            valid: true,
            errors: Vec::new(),
            warnings: Vec::new(),
        }
    }

    /// Add an error
    pub fn add_error(&mut self, issue: CompositeIssue) {
        self.valid = false;
        self.errors.push(issue);
    }

    /// Add a warning
    pub fn add_warning(&mut self, warning: CompositeWarning) {
        self.warnings.push(warning);
    }

    /// Check if there are any warnings
    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }

    /// Turn a failing report into an error naming the first issue
    pub fn into_result(self) -> Result<Self> {
        match self.errors.first() {
            None => Ok(self),
            Some(first) => Err(DomainError::InvalidComposite(format!(
                "{first} ({} issue(s) total)",
                self.errors.len()
            ))),
        }
    }
}

/// Which invariant a cell broke
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IssueKind {
    NonFinite,
    NonPositive,
    NonBinary,
}

/// Where a cell's values came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CellOwner {
    Background,
    Layer { index: usize, name: String },
}

impl fmt::Display for CellOwner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Background => write!(f, "background"),
            Self::Layer { index, name } => write!(f, "sub-domain '{name}' (index {index})"),
        }
    }
}

/// Hard invariant violated at a cell
#[derive(Debug, Clone, PartialEq)]
pub struct CompositeIssue {
    pub kind: IssueKind,
    pub channel: Channel,
    pub x: usize,
    pub y: usize,
    pub value: f64,
    /// Layer that wrote the offending value
    pub owner: CellOwner,
}

impl fmt::Display for CompositeIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Self {
            kind,
            channel,
            x,
            y,
            value,
            owner,
        } = self;
        let what = channel.description();
        match kind {
            IssueKind::NonFinite => write!(f, "{what} ({channel}) is not finite")?,
            IssueKind::NonPositive => {
                write!(f, "{what} ({channel}) must be positive, got {value}")?
            }
            IssueKind::NonBinary => write!(f, "{what} ({channel}) must be 0 or 1, got {value}")?,
        }
        write!(f, " at ({x}, {y}), written by {owner}")
    }
}

/// Suspicious but legal cell values
#[derive(Debug, Clone, PartialEq)]
pub enum CompositeWarning {
    NegativeAttenuation { x: usize, y: usize, value: f64 },
    AirSpeedAboveWater { x: usize, y: usize, value: f64 },
}
