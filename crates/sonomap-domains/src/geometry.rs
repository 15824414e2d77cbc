//! Mask construction helpers
//!
//! Coordinates are in cells, `x` lateral and `y` depth. Circle and ellipse
//! centers may be fractional.

use ndarray::{Array2, Zip};
use serde::{Deserialize, Serialize};
use sonomap_core::{Mask, Shape};
use std::ops::Range;

/// Physical size of one lattice cell
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Spacing {
    /// Lateral spacing (m)
    pub dx: f64,
    /// Depth spacing (m)
    pub dy: f64,
}

impl Spacing {
    /// Square cells of side `d`
    pub fn uniform(d: f64) -> Self {
        Self { dx: d, dy: d }
    }

    /// Spacing giving `ppw` points per wavelength at frequency `f0`
    pub fn from_ppw(c0: f64, f0: f64, ppw: f64) -> Self {
        Self::uniform(c0 / f0 / ppw)
    }

    /// Lateral distance in whole cells
    pub fn cells_x(&self, meters: f64) -> usize {
        (meters / self.dx).round().max(0.0) as usize
    }

    /// Depth distance in whole cells
    pub fn cells_y(&self, meters: f64) -> usize {
        (meters / self.dy).round().max(0.0) as usize
    }
}

/// Cells with depth in `rows`, clipped to the lattice
pub fn depth_band(shape: Shape, rows: Range<usize>) -> Mask {
    Array2::from_shape_fn(shape.dim(), |(_, y)| rows.contains(&y))
}

/// Cells with lateral position in `cols`, clipped to the lattice
pub fn lateral_band(shape: Shape, cols: Range<usize>) -> Mask {
    Array2::from_shape_fn(shape.dim(), |(x, _)| cols.contains(&x))
}

/// Axis-aligned rectangle
pub fn rectangle(shape: Shape, cols: Range<usize>, rows: Range<usize>) -> Mask {
    Array2::from_shape_fn(shape.dim(), |(x, y)| cols.contains(&x) && rows.contains(&y))
}

/// Disc of `radius` cells around `center`
pub fn circle(shape: Shape, center: [f64; 2], radius: f64) -> Mask {
    ellipse(shape, center, [radius, radius])
}

/// Axis-aligned ellipse with semi-axes `radii`
pub fn ellipse(shape: Shape, center: [f64; 2], radii: [f64; 2]) -> Mask {
    Array2::from_shape_fn(shape.dim(), |(x, y)| {
        if radii[0] <= 0.0 || radii[1] <= 0.0 {
            return false;
        }
        let dx = (x as f64 - center[0]) / radii[0];
        let dy = (y as f64 - center[1]) / radii[1];
        dx * dx + dy * dy <= 1.0
    })
}

/// Cells set in either mask
pub fn union(a: &Mask, b: &Mask) -> Mask {
    Zip::from(a).and(b).map_collect(|&p, &q| p || q)
}

/// Cells set in `a` but not in `b`
pub fn difference(a: &Mask, b: &Mask) -> Mask {
    Zip::from(a).and(b).map_collect(|&p, &q| p && !q)
}

/// Number of cells set
pub fn count(mask: &Mask) -> usize {
    mask.iter().filter(|&&c| c).count()
}
