//! SonoMap Domains - Anatomical sub-domain producers
//!
//! Each producer is a small parameter record implementing
//! [`LayerProducer`]; building it over a lattice yields a
//! [`MaterialLayer`](sonomap_core::MaterialLayer) ready for registration.
//!
//! # Producers
//!
//! - **Background**: uniform tissue over the whole lattice
//! - **WaterGel**: coupling layer under the transducer
//! - **Phantom**: circular inclusions, optionally laid out laterally
//! - **Lung**: elliptical air region with a fluid rim
//! - **AbdominalWall**: stacked tissue strata
//!
//! [`Scatterer`] is the odd one out: it produces a speckle pattern that is
//! injected into the background rather than layered on top of it.

pub mod abdominal_wall;
pub mod background;
pub mod config;
pub mod geometry;
pub mod lung;
pub mod phantom;
pub mod producer;
pub mod scatterer;
pub mod water_gel;

pub use abdominal_wall::{AbdominalWall, Stratum};
pub use background::Background;
pub use config::LayerConfig;
pub use geometry::Spacing;
pub use lung::Lung;
pub use phantom::{Inclusion, Phantom};
pub use producer::LayerProducer;
pub use scatterer::Scatterer;
pub use water_gel::WaterGel;
