//! Acoustic property channels
//!
//! Every grid in SonoMap carries the same fixed set of channels. They are
//! stored as separate arrays but describe one cell together, so code that
//! writes a cell writes all of them.

use crate::error::DomainError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A named physical quantity stored over the lattice
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Channel {
    /// Density (kg/m^3)
    Rho,
    /// Sound speed (m/s)
    #[serde(rename = "c", alias = "sound_speed")]
    SoundSpeed,
    /// Attenuation coefficient (dB/cm/MHz^y)
    #[serde(rename = "a", alias = "attenuation")]
    Attenuation,
    /// Nonlinearity coefficient, 1 + B/2A
    Beta,
    /// Air occupancy, 1.0 for air and 0.0 for tissue
    Air,
    /// Structural geometry mask, 1.0 for solid structure
    Geometry,
}

impl Channel {
    /// All channels, in storage order
    pub const ALL: [Channel; 6] = [
        Channel::Rho,
        Channel::SoundSpeed,
        Channel::Attenuation,
        Channel::Beta,
        Channel::Air,
        Channel::Geometry,
    ];

    /// Canonical short name
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Rho => "rho",
            Self::SoundSpeed => "c",
            Self::Attenuation => "a",
            Self::Beta => "beta",
            Self::Air => "air",
            Self::Geometry => "geometry",
        }
    }

    /// Human-readable description
    pub fn description(&self) -> &'static str {
        match self {
            Self::Rho => "density",
            Self::SoundSpeed => "sound speed",
            Self::Attenuation => "attenuation",
            Self::Beta => "nonlinearity coefficient",
            Self::Air => "air occupancy",
            Self::Geometry => "structural geometry",
        }
    }

    /// Whether the channel only ever holds 0.0 or 1.0
    pub fn is_binary(&self) -> bool {
        matches!(self, Self::Air | Self::Geometry)
    }

    pub(crate) fn index(&self) -> usize {
        *self as usize
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Channel {
    type Err = DomainError;

    /// Parses canonical names and the `*_map` names used by map viewers
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "rho" | "rho_map" => Ok(Self::Rho),
            "c" | "c_map" => Ok(Self::SoundSpeed),
            "a" | "a_map" => Ok(Self::Attenuation),
            "beta" | "beta_map" => Ok(Self::Beta),
            "air" | "air_map" => Ok(Self::Air),
            "geometry" => Ok(Self::Geometry),
            other => Err(DomainError::config(format!("Unknown channel: {other}"))),
        }
    }
}
