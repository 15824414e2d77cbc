//! Error types for domain composition

use crate::grid::Shape;
use thiserror::Error;

/// Domain construction errors
///
/// Every variant is a caller or configuration bug. Nothing here is transient,
/// so none of these are worth retrying.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DomainError {
    /// Unknown material or channel name, or an invalid flag combination
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Lattice shape disagrees with the one already in use
    #[error("Shape mismatch{}: expected {expected}, got {actual}", fmt_index(.index))]
    ShapeMismatch {
        /// Registration index of the offending sub-domain, if it has one
        index: Option<usize>,
        expected: Shape,
        actual: Shape,
    },

    /// Cell coordinates outside the lattice
    #[error("Cell ({x}, {y}) is outside the {shape} lattice")]
    OutOfBounds { x: usize, y: usize, shape: Shape },

    /// Composite channels were read before `construct_domain`
    #[error("Composite domain has not been constructed")]
    NotConstructed,

    /// Merged grid failed validation
    #[error("Invalid composite domain: {0}")]
    InvalidComposite(String),
}

fn fmt_index(index: &Option<usize>) -> String {
    match index {
        Some(i) => format!(" at registration index {i}"),
        None => String::new(),
    }
}

impl DomainError {
    /// Shorthand for a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }

    /// Shape mismatch with no registration index attached
    pub fn shape(expected: Shape, actual: Shape) -> Self {
        Self::ShapeMismatch {
            index: None,
            expected,
            actual,
        }
    }

    /// Attach a registration index to a shape mismatch
    pub fn at_index(self, index: usize) -> Self {
        match self {
            Self::ShapeMismatch {
                expected, actual, ..
            } => Self::ShapeMismatch {
                index: Some(index),
                expected,
                actual,
            },
            other => other,
        }
    }
}

/// Result type for domain operations
pub type Result<T> = std::result::Result<T, DomainError>;
