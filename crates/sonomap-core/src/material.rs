//! Tissue material catalog
//!
//! A fixed table of acoustic constants per tissue type. The table is built
//! once on first access and never mutated afterwards.

use crate::error::{DomainError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

static CATALOG: LazyLock<MaterialCatalog> = LazyLock::new(MaterialCatalog::build);

/// Known tissue types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Material {
    Fat,
    Liver,
    Muscle,
    Water,
    Skin,
    Tissue,
    Connective,
    Blood,
    LungFluid,
    LungAir,
}

impl Material {
    /// All materials, in catalog order
    pub const ALL: [Material; 10] = [
        Material::Fat,
        Material::Liver,
        Material::Muscle,
        Material::Water,
        Material::Skin,
        Material::Tissue,
        Material::Connective,
        Material::Blood,
        Material::LungFluid,
        Material::LungAir,
    ];

    /// Catalog key
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Fat => "fat",
            Self::Liver => "liver",
            Self::Muscle => "muscle",
            Self::Water => "water",
            Self::Skin => "skin",
            Self::Tissue => "tissue",
            Self::Connective => "connective",
            Self::Blood => "blood",
            Self::LungFluid => "lung_fluid",
            Self::LungAir => "lung_air",
        }
    }
}

impl fmt::Display for Material {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Material {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self> {
        Material::ALL
            .into_iter()
            .find(|m| m.as_str() == s)
            .ok_or_else(|| DomainError::config(format!("Unknown material: {s}")))
    }
}

/// Acoustic constants of one material
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MaterialProperties {
    /// Nonlinearity parameter B/A
    pub bovera: f64,
    /// Attenuation coefficient (dB/cm/MHz^ppower)
    pub alpha: f64,
    /// Attenuation power law exponent
    pub ppower: f64,
    /// Sound speed (m/s)
    pub c0: f64,
    /// Density (kg/m^3)
    pub rho0: f64,
    /// Nonlinearity coefficient, `1 + bovera / 2`
    pub beta: f64,
}

impl MaterialProperties {
    /// Create a record, deriving `beta` from B/A
    pub fn new(bovera: f64, alpha: f64, ppower: f64, c0: f64, rho0: f64) -> Self {
        Self {
            bovera,
            alpha,
            ppower,
            c0,
            rho0,
            beta: 1.0 + bovera / 2.0,
        }
    }
}

/// Reference medium the solver normalizes against
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ReferenceMedium {
    pub c0: f64,
    pub rho0: f64,
    pub a0: f64,
    pub beta0: f64,
}

impl Default for ReferenceMedium {
    fn default() -> Self {
        Self {
            c0: 1540.0,
            rho0: 1000.0,
            a0: 0.5,
            beta0: 0.0,
        }
    }
}

/// Read-only material lookup table
#[derive(Debug)]
pub struct MaterialCatalog {
    entries: [MaterialProperties; 10],
    reference: ReferenceMedium,
}

impl MaterialCatalog {
    fn build() -> Self {
        let entries = Material::ALL.map(|m| match m {
            Material::Fat => MaterialProperties::new(9.6, 0.48, 1.1, 1478.0, 950.0),
            Material::Liver => MaterialProperties::new(7.6, 0.5, 1.0, 1570.0, 1064.0),
            Material::Muscle => MaterialProperties::new(9.0, 1.09, 1.0, 1547.0, 1050.0),
            Material::Water => MaterialProperties::new(5.0, 0.005, 2.0, 1480.0, 1000.0),
            Material::Skin => MaterialProperties::new(8.0, 2.1, 1.0, 1498.0, 1000.0),
            Material::Tissue => MaterialProperties::new(9.0, 0.5, 1.0, 1540.0, 1000.0),
            Material::Connective => MaterialProperties::new(8.0, 1.57, 1.0, 1613.0, 1120.0),
            Material::Blood => MaterialProperties::new(5.0, 0.005, 2.0, 1520.0, 1000.0),
            Material::LungFluid => MaterialProperties::new(5.0, 0.005, 2.0, 1440.0, 1000.0),
            Material::LungAir => MaterialProperties::new(5.0, 0.005, 2.0, 340.0, 1000.0),
        });

        Self {
            entries,
            reference: ReferenceMedium::default(),
        }
    }

    /// The process-wide catalog
    pub fn global() -> &'static MaterialCatalog {
        &CATALOG
    }

    /// Properties of a known material
    pub fn get(&self, material: Material) -> &MaterialProperties {
        &self.entries[material as usize]
    }

    /// Properties by catalog key
    pub fn lookup(&self, name: &str) -> Result<&MaterialProperties> {
        let material: Material = name.parse()?;
        Ok(self.get(material))
    }

    /// Reference medium constants
    pub fn reference(&self) -> &ReferenceMedium {
        &self.reference
    }

    /// Iterate over every material and its properties
    pub fn iter(&self) -> impl Iterator<Item = (Material, &MaterialProperties)> {
        Material::ALL.into_iter().zip(self.entries.iter())
    }
}
