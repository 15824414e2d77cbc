//! SonoMap Compose - Fusing sub-domains into one acoustic grid
//!
//! ```text
//! Background ─┐
//! Phantom ────┼─→ DomainCompositor ─→ CompositeDomain ─→ solver / viewer
//! Wall ───────┘    (registration order = precedence)
//! ```
//!
//! Sub-domains are registered back-to-front. Construction fills every
//! channel with the background material, then stamps each sub-domain over
//! the cells its occupancy mask claims, all channels at once.

pub mod composite;
pub mod compositor;
pub mod config;
pub mod texture;

// Re-export commonly used types
pub use composite::{
    CellOwner, CompositeDomain, CompositeIssue, CompositeWarning, IssueKind, ValidationReport,
};
pub use compositor::{CompositorBuilder, DomainCompositor};
pub use config::CompositorConfig;
pub use texture::{TextureBlend, TextureInjection};
