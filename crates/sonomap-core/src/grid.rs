//! Lattice shapes and channel grids
//!
//! Arrays are indexed `[[x, y]]` with `x` lateral and `y` depth, so an
//! array for a `Shape { num_x, num_y }` has `dim() == (num_x, num_y)`.

use crate::channel::Channel;
use crate::error::{DomainError, Result};
use crate::material::MaterialProperties;
use ndarray::Array2;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Per-cell occupancy mask
pub type Mask = Array2<bool>;

/// Lattice dimensions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Shape {
    /// Lateral cell count
    pub num_x: usize,
    /// Depth cell count
    pub num_y: usize,
}

impl Shape {
    /// Create a new shape
    pub fn new(num_x: usize, num_y: usize) -> Self {
        Self { num_x, num_y }
    }

    /// Shape of an existing array
    pub fn of<T>(array: &Array2<T>) -> Self {
        let (num_x, num_y) = array.dim();
        Self { num_x, num_y }
    }

    /// Dimension tuple for ndarray constructors
    pub fn dim(&self) -> (usize, usize) {
        (self.num_x, self.num_y)
    }

    /// Total number of cells
    pub fn len(&self) -> usize {
        self.num_x * self.num_y
    }

    /// Check if the lattice has no cells
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Check if a cell lies inside the lattice
    pub fn contains(&self, x: usize, y: usize) -> bool {
        x < self.num_x && y < self.num_y
    }

    /// All-false mask of this shape
    pub fn empty_mask(&self) -> Mask {
        Array2::from_elem(self.dim(), false)
    }

    /// All-true mask of this shape
    pub fn full_mask(&self) -> Mask {
        Array2::from_elem(self.dim(), true)
    }

    /// Fail with a shape mismatch unless `other` equals `self`
    pub fn ensure_matches(&self, other: Shape) -> Result<()> {
        if *self == other {
            Ok(())
        } else {
            Err(DomainError::shape(*self, other))
        }
    }
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.num_x, self.num_y)
    }
}

/// The six channel values of a single cell
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CellValues {
    pub rho: f64,
    pub c: f64,
    pub a: f64,
    pub beta: f64,
    pub air: f64,
    pub geometry: f64,
}

impl CellValues {
    /// Tissue cell with the material's baseline constants
    pub fn from_material(material: &MaterialProperties) -> Self {
        Self {
            rho: material.rho0,
            c: material.c0,
            a: material.alpha,
            beta: material.beta,
            air: 0.0,
            geometry: 0.0,
        }
    }

    /// Set the air flag
    pub fn with_air(mut self, air: bool) -> Self {
        self.air = if air { 1.0 } else { 0.0 };
        self
    }

    /// Set the geometry flag
    pub fn with_geometry(mut self, solid: bool) -> Self {
        self.geometry = if solid { 1.0 } else { 0.0 };
        self
    }

    /// Value for one channel
    pub fn get(&self, channel: Channel) -> f64 {
        match channel {
            Channel::Rho => self.rho,
            Channel::SoundSpeed => self.c,
            Channel::Attenuation => self.a,
            Channel::Beta => self.beta,
            Channel::Air => self.air,
            Channel::Geometry => self.geometry,
        }
    }
}

/// A full set of channel arrays sharing one shape
#[derive(Debug, Clone, PartialEq)]
pub struct ChannelSet {
    shape: Shape,
    arrays: [Array2<f64>; 6],
}

impl ChannelSet {
    /// Broadcast one cell's values over the whole lattice
    pub fn filled(shape: Shape, values: CellValues) -> Self {
        let arrays = Channel::ALL.map(|ch| Array2::from_elem(shape.dim(), values.get(ch)));
        Self { shape, arrays }
    }

    /// Assemble from explicit arrays, which must all have the same shape
    pub fn from_arrays(
        rho: Array2<f64>,
        c: Array2<f64>,
        a: Array2<f64>,
        beta: Array2<f64>,
        air: Array2<f64>,
        geometry: Array2<f64>,
    ) -> Result<Self> {
        let shape = Shape::of(&rho);
        let arrays = [rho, c, a, beta, air, geometry];
        for array in &arrays[1..] {
            shape.ensure_matches(Shape::of(array))?;
        }
        Ok(Self { shape, arrays })
    }

    /// Lattice shape
    pub fn shape(&self) -> Shape {
        self.shape
    }

    /// Array for one channel
    pub fn get(&self, channel: Channel) -> &Array2<f64> {
        &self.arrays[channel.index()]
    }

    /// Mutable array for one channel
    pub fn get_mut(&mut self, channel: Channel) -> &mut Array2<f64> {
        &mut self.arrays[channel.index()]
    }

    /// All six values at a cell
    pub fn cell(&self, x: usize, y: usize) -> Option<CellValues> {
        if !self.shape.contains(x, y) {
            return None;
        }
        let at = |ch: Channel| self.arrays[ch.index()][[x, y]];
        Some(CellValues {
            rho: at(Channel::Rho),
            c: at(Channel::SoundSpeed),
            a: at(Channel::Attenuation),
            beta: at(Channel::Beta),
            air: at(Channel::Air),
            geometry: at(Channel::Geometry),
        })
    }

    /// Write all six values at a cell
    pub fn set_cell(&mut self, x: usize, y: usize, values: CellValues) -> Result<()> {
        if !self.shape.contains(x, y) {
            return Err(DomainError::OutOfBounds {
                x,
                y,
                shape: self.shape,
            });
        }
        for ch in Channel::ALL {
            self.arrays[ch.index()][[x, y]] = values.get(ch);
        }
        Ok(())
    }

    /// Write `values` into every cell where `mask` is set
    pub fn fill_masked(&mut self, mask: &Mask, values: CellValues) -> Result<()> {
        self.shape.ensure_matches(Shape::of(mask))?;
        for ch in Channel::ALL {
            let value = values.get(ch);
            ndarray::Zip::from(&mut self.arrays[ch.index()])
                .and(mask)
                .for_each(|dst, &claimed| {
                    if claimed {
                        *dst = value;
                    }
                });
        }
        Ok(())
    }

    /// Iterate over `(channel, array)` pairs in storage order
    pub fn iter(&self) -> impl Iterator<Item = (Channel, &Array2<f64>)> {
        Channel::ALL.into_iter().zip(self.arrays.iter())
    }
}
