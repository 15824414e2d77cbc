//! Sub-resolution scatterer speckle
//!
//! Produces a sparse random density pattern. The pattern is not a layer of
//! its own; it is blended into the background through texture injection.

use ndarray::Array2;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use sonomap_core::{DomainError, MaterialCatalog, Result, Shape};
use tracing::debug;

/// Random scatterer field parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scatterer {
    /// Probability that a cell holds a scatterer, in [0, 1]
    pub density: f64,
    /// Peak pattern value; defaults to the reference density
    #[serde(default = "default_amplitude")]
    pub amplitude: f64,
    /// RNG seed, so identical parameters give identical speckle
    #[serde(default)]
    pub seed: u64,
}

fn default_amplitude() -> f64 {
    MaterialCatalog::global().reference().rho0
}

impl Scatterer {
    /// Scatterers with the given per-cell probability
    pub fn new(density: f64) -> Self {
        Self {
            density,
            amplitude: default_amplitude(),
            seed: 0,
        }
    }

    /// Set the RNG seed
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Set the peak amplitude
    pub fn with_amplitude(mut self, amplitude: f64) -> Self {
        self.amplitude = amplitude;
        self
    }

    /// Generate the speckle pattern
    ///
    /// Each cell independently holds a scatterer with probability `density`;
    /// a scatterer's value is `amplitude * u` with `u` uniform in [0, 1).
    pub fn pattern(&self, shape: Shape) -> Result<Array2<f64>> {
        if !(0.0..=1.0).contains(&self.density) {
            return Err(DomainError::config(format!(
                "Scatterer density must be in [0, 1], got {}",
                self.density
            )));
        }
        if !self.amplitude.is_finite() {
            return Err(DomainError::config(format!(
                "Scatterer amplitude must be finite, got {}",
                self.amplitude
            )));
        }

        let mut rng = StdRng::seed_from_u64(self.seed);
        let pattern = Array2::from_shape_simple_fn(shape.dim(), || {
            if rng.random_bool(self.density) {
                self.amplitude * rng.random::<f64>()
            } else {
                0.0
            }
        });

        debug!(
            shape = %shape,
            density = self.density,
            scatterers = pattern.iter().filter(|&&v| v != 0.0).count(),
            "Generated scatterer pattern"
        );
        Ok(pattern)
    }
}
