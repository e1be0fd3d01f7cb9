//! Typed input records, as handed over by the deck-parsing stage.
//!
//! The XML reader (out of scope here) turns a VERA deck into this tree of
//! plain structs. Records validate themselves before construction starts,
//! reporting every problem with an object in one error rather than one at
//! a time.

use std::collections::HashMap;

use crate::error::{ConfigError, GeometryError, VeracoreError};
use crate::model::Nuclide;

/// Whether a nuclide fraction is by weight or by atom count.
///
/// The geometry core consumes weight fractions only; atomic fractions are
/// converted by the unit-conversion stage before records reach this crate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FractionBasis {
    Weight,
    Atomic,
}

/// One nuclide entry on a material card.
#[derive(Debug, Clone)]
pub struct NuclideFraction {
    pub nuclide: String,
    pub fraction: f64,
    pub basis: FractionBasis,
}

/// A material card: density in g/cc plus nuclide fractions.
#[derive(Debug, Clone)]
pub struct MaterialRecord {
    pub key: String,
    pub density: f64,
    pub fractions: Vec<NuclideFraction>,
}

impl MaterialRecord {
    /// The nuclide list as weight fractions.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::AtomicFraction`] if any entry still carries
    /// an atomic basis: conversion is the upstream stage's job and must
    /// not be inferred here.
    pub fn weight_nuclides(&self) -> Result<Vec<Nuclide>, ConfigError> {
        self.fractions
            .iter()
            .map(|f| {
                if f.basis == FractionBasis::Atomic {
                    return Err(ConfigError::AtomicFraction {
                        key: self.key.clone(),
                    });
                }
                Ok(Nuclide {
                    name: f.nuclide.clone(),
                    weight_fraction: f.fraction,
                })
            })
            .collect()
    }
}

/// A pin-cell card: concentric ring radii and the material of each ring.
#[derive(Debug, Clone)]
pub struct PinRecord {
    /// Unique key as used in lattice maps.
    pub key: String,
    /// Descriptive name.
    pub name: String,
    /// Ring outer radii, strictly ascending.
    pub radii: Vec<f64>,
    /// One material key per ring.
    pub materials: Vec<String>,
}

impl PinRecord {
    /// Checks list alignment and radius ordering.
    ///
    /// # Errors
    ///
    /// Returns a configuration error on a radii/materials length mismatch,
    /// or a geometry error if the radii are not positive and ascending.
    pub fn validate(&self) -> Result<(), VeracoreError> {
        if self.radii.is_empty() {
            return Err(ConfigError::MissingFields {
                object: format!("pin cell {}", self.key),
                fields: vec!["radii".to_owned()],
            }
            .into());
        }
        if self.radii.len() != self.materials.len() {
            return Err(ConfigError::LengthMismatch {
                object: format!("pin cell {}", self.key),
                left_name: "materials",
                left: self.materials.len(),
                right_name: "radii",
                right: self.radii.len(),
            }
            .into());
        }
        let ascending = self
            .radii
            .windows(2)
            .all(|w| w[0] < w[1]);
        if self.radii.first().is_some_and(|&r| r <= 0.0) || !ascending {
            return Err(GeometryError::NonAscendingRadii {
                context: format!("pin cell {}", self.key),
            }
            .into());
        }
        Ok(())
    }
}

/// A spacer-grid card.
#[derive(Debug, Clone)]
pub struct GridRecord {
    pub key: String,
    /// Axial height of the strap (cm).
    pub height: f64,
    /// Total mass of the grid (g).
    pub mass: f64,
    pub material: String,
}

/// A nozzle card: a smeared block capping one end of an assembly.
#[derive(Debug, Clone)]
pub struct NozzleRecord {
    pub material: String,
    pub height: f64,
    pub mass: f64,
}

/// A fuel-assembly card.
#[derive(Debug, Clone, Default)]
pub struct AssemblyRecord {
    /// Short key as used in the core assembly map.
    pub key: String,
    pub name: String,
    /// Pin pitch (cm).
    pub pitch: f64,
    /// Pins per row.
    pub npins: usize,
    pub cells: Vec<PinRecord>,
    /// Lattice names, bottom to top.
    pub axial_labels: Vec<String>,
    /// Per lattice name, `npins * npins` pin keys, row-major from the top.
    pub key_maps: HashMap<String, Vec<String>>,
    /// Layer boundary elevations; `axial_labels.len() + 1` entries.
    pub axial_elevations: Vec<f64>,
    pub grids: HashMap<String, GridRecord>,
    /// One grid key per grid elevation.
    pub grid_map: Vec<String>,
    /// Grid midpoint elevations.
    pub grid_elevations: Vec<f64>,
    pub lower_nozzle: Option<NozzleRecord>,
    pub upper_nozzle: Option<NozzleRecord>,
}

impl AssemblyRecord {
    /// Checks every required field and list-length invariant, reporting
    /// all missing fields at once.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingFields`] naming every absent field,
    /// or a length-mismatch error for elevation/map misalignment.
    pub fn validate(&self) -> Result<(), VeracoreError> {
        let mut missing = Vec::new();
        if self.key.is_empty() {
            missing.push("key".to_owned());
        }
        if self.pitch <= 0.0 {
            missing.push("pitch".to_owned());
        }
        if self.npins == 0 {
            missing.push("npins".to_owned());
        }
        if self.cells.is_empty() {
            missing.push("cells".to_owned());
        }
        if self.axial_labels.is_empty() {
            missing.push("axial_labels".to_owned());
        }
        if self.axial_elevations.is_empty() {
            missing.push("axial_elevations".to_owned());
        }
        for label in &self.axial_labels {
            if !self.key_maps.contains_key(label) {
                missing.push(format!("key_maps[{label}]"));
            }
        }
        if !missing.is_empty() {
            return Err(ConfigError::MissingFields {
                object: format!("assembly {}", self.key),
                fields: missing,
            }
            .into());
        }

        if self.axial_elevations.len() != self.axial_labels.len() + 1 {
            return Err(ConfigError::LengthMismatch {
                object: format!("assembly {}", self.key),
                left_name: "axial_elevations",
                left: self.axial_elevations.len(),
                right_name: "axial_labels + 1",
                right: self.axial_labels.len() + 1,
            }
            .into());
        }
        if self.grid_map.len() != self.grid_elevations.len() {
            return Err(ConfigError::LengthMismatch {
                object: format!("assembly {}", self.key),
                left_name: "grid_map",
                left: self.grid_map.len(),
                right_name: "grid_elevations",
                right: self.grid_elevations.len(),
            }
            .into());
        }
        let want = self.npins * self.npins;
        for (label, map) in &self.key_maps {
            if map.len() != want {
                return Err(ConfigError::LengthMismatch {
                    object: format!("assembly {} lattice {label}", self.key),
                    left_name: "key map",
                    left: map.len(),
                    right_name: "npins^2",
                    right: want,
                }
                .into());
            }
        }
        for pin in &self.cells {
            pin.validate()?;
        }
        Ok(())
    }
}

/// A reflector core plate above or below the active core.
#[derive(Debug, Clone)]
pub struct PlateRecord {
    pub material: String,
    pub thickness: f64,
}

/// The steel baffle hugging the core footprint.
#[derive(Debug, Clone)]
pub struct BaffleRecord {
    pub material: String,
    /// Water gap between the outermost assembly edge and the baffle (cm).
    pub gap: f64,
    /// Plate thickness (cm).
    pub thickness: f64,
}

/// Neutron pads mounted in one vessel ring.
#[derive(Debug, Clone)]
pub struct PadRecord {
    pub material: String,
    /// Index into the vessel ring list.
    pub ring: usize,
    /// Number of pads, evenly placed.
    pub count: u32,
    /// Arc length of one pad (degrees).
    pub arc_length: f64,
    /// Angle from the x-axis at which the first pad is centered (degrees).
    pub start_angle: f64,
}

/// Boundary-condition strings for the outer extent of the model.
#[derive(Debug, Clone)]
pub struct BoundaryRecord {
    pub bottom: String,
    pub top: String,
    pub radial: String,
}

/// The core card: layout, vessel, baffle, plates, boundary conditions.
#[derive(Debug, Clone)]
pub struct CoreRecord {
    /// Assembly pitch (cm).
    pub pitch: f64,
    /// Active core height (cm).
    pub height: f64,
    /// Square occupancy map of assembly locations, row-major from the top.
    pub shape: Vec<Vec<bool>>,
    /// Assembly keys at occupied locations.
    pub assembly_map: Vec<Vec<Option<String>>>,
    /// Vessel ring outer radii, ascending.
    pub vessel_radii: Vec<f64>,
    /// One material per vessel ring.
    pub vessel_materials: Vec<String>,
    pub baffle: Option<BaffleRecord>,
    pub pads: Option<PadRecord>,
    pub lower_plate: PlateRecord,
    pub upper_plate: PlateRecord,
    pub boundary: BoundaryRecord,
}

impl CoreRecord {
    /// Checks map shape, vessel ring alignment, and radius ordering.
    ///
    /// # Errors
    ///
    /// Returns configuration errors for ragged or mismatched maps and
    /// misaligned vessel lists.
    pub fn validate(&self) -> Result<(), VeracoreError> {
        if self.pitch <= 0.0 {
            return Err(GeometryError::NonPositivePitch {
                context: "core".to_owned(),
                value: self.pitch,
            }
            .into());
        }
        let n = self.shape.len();
        if self.shape.iter().any(|row| row.len() != n) {
            return Err(ConfigError::MissingFields {
                object: "core".to_owned(),
                fields: vec!["square shape map".to_owned()],
            }
            .into());
        }
        if self.assembly_map.len() != n
            || self.assembly_map.iter().any(|row| row.len() != n)
        {
            return Err(ConfigError::LengthMismatch {
                object: "core".to_owned(),
                left_name: "assembly_map",
                left: self.assembly_map.len(),
                right_name: "shape",
                right: n,
            }
            .into());
        }
        if self.vessel_radii.len() != self.vessel_materials.len() {
            return Err(ConfigError::LengthMismatch {
                object: "core vessel".to_owned(),
                left_name: "vessel_materials",
                left: self.vessel_materials.len(),
                right_name: "vessel_radii",
                right: self.vessel_radii.len(),
            }
            .into());
        }
        if !self.vessel_radii.windows(2).all(|w| w[0] < w[1]) {
            return Err(GeometryError::NonAscendingRadii {
                context: "core vessel rings".to_owned(),
            }
            .into());
        }
        Ok(())
    }
}

/// A whole parsed case.
#[derive(Debug, Clone)]
pub struct CaseRecord {
    pub case_id: String,
    pub materials: Vec<MaterialRecord>,
    pub assemblies: HashMap<String, AssemblyRecord>,
    pub core: CoreRecord,
}
