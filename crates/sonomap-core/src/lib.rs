//! SonoMap Core - Acoustic property grids and the sub-domain contract
//!
//! SonoMap builds the material maps a finite-difference ultrasound solver
//! consumes: density, sound speed, attenuation, nonlinearity, air occupancy
//! and structural geometry over a 2-D lattice.
//!
//! # Layering
//!
//! ```text
//! Background → Phantom → Abdominal wall → ... → CompositeDomain
//!     (each layer claims cells through its occupancy mask)
//! ```
//!
//! Anatomical regions are produced independently as [`SubDomain`]s and fused
//! by the compositor in `sonomap-compose`. This crate holds the shared types:
//! channels, grids, the material catalog and the error taxonomy.

pub mod channel;
pub mod domain;
pub mod error;
pub mod grid;
pub mod material;

// Re-export commonly used types
pub use channel::Channel;
pub use domain::{ChannelSource, MaterialLayer, SubDomain};
pub use error::{DomainError, Result};
pub use grid::{CellValues, ChannelSet, Mask, Shape};
pub use material::{Material, MaterialCatalog, MaterialProperties, ReferenceMedium};
