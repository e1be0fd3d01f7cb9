use std::collections::HashMap;

use crate::builders::spacergrid::{GridPin, SpacerGrid};
use crate::error::{LookupError, Result};
use crate::math::Point2;
use crate::model::{LatticeData, Model, UniverseKey, UniverseKind};

/// Fills an n-by-n lattice of pin universes from a 2-D key map.
///
/// The lattice is centered at the origin (lower-left corner at
/// `-pitch * n / 2`) and carries an explicit outer fallback universe for
/// positions outside the declared bounds, which models the water gap
/// between adjacent assemblies.
pub struct LatticeBuilder<'a> {
    name: &'a str,
    /// Assembly name, for lookup-error context.
    assembly: &'a str,
    pitch: f64,
    npins: usize,
    /// `npins * npins` pin keys, row-major from the top.
    key_map: &'a [String],
    pins: &'a HashMap<String, UniverseKey>,
    outer: UniverseKey,
}

impl<'a> LatticeBuilder<'a> {
    #[must_use]
    pub fn new(
        name: &'a str,
        assembly: &'a str,
        pitch: f64,
        npins: usize,
        key_map: &'a [String],
        pins: &'a HashMap<String, UniverseKey>,
        outer: UniverseKey,
    ) -> Self {
        Self {
            name,
            assembly,
            pitch,
            npins,
            key_map,
            pins,
            outer,
        }
    }

    /// Executes the operation, creating the lattice universe.
    ///
    /// # Errors
    ///
    /// Returns a lookup error naming the missing pin key and this
    /// assembly if a map key has no pin universe.
    pub fn execute(&self, model: &mut Model) -> Result<UniverseKey> {
        let universes = self
            .key_map
            .iter()
            .map(|key| {
                self.pins.get(key).copied().ok_or_else(|| {
                    LookupError::PinCell {
                        key: key.clone(),
                        assembly: self.assembly.to_owned(),
                    }
                    .into()
                })
            })
            .collect::<Result<Vec<_>>>()?;

        #[allow(clippy::cast_precision_loss)]
        let half = self.pitch * self.npins as f64 / 2.0;
        let lattice = LatticeData {
            pitch: self.pitch,
            n: self.npins,
            lower_left: Point2::new(-half, -half),
            universes,
            outer: self.outer,
        };
        Ok(model.new_lattice(self.name, lattice))
    }
}

/// Applies a spacer grid to every position of a lattice, producing a new
/// lattice of gridded pin universes.
///
/// Built immutably: the source lattice and its pin universes are never
/// touched; each distinct pin is gridded once through the pin-grid cache,
/// and the whole gridded lattice is cached by `(source lattice, grid key)`
/// so repeated grid elevations within one assembly reuse the same object.
pub struct GridLattice<'a> {
    lattice: UniverseKey,
    grid: &'a SpacerGrid,
}

impl<'a> GridLattice<'a> {
    #[must_use]
    pub fn new(lattice: UniverseKey, grid: &'a SpacerGrid) -> Self {
        Self { lattice, grid }
    }

    /// Executes the operation, returning the (possibly cached) gridded
    /// lattice universe.
    ///
    /// # Errors
    ///
    /// Returns an error if `lattice` is not a lattice universe or a store
    /// lookup fails.
    pub fn execute(&self, model: &mut Model) -> Result<UniverseKey> {
        let cache_key = (self.lattice, self.grid.key.clone());
        if let Some(&cached) = model.lattice_grids.get(&cache_key) {
            return Ok(cached);
        }

        let source = model.store.universe(self.lattice)?;
        let source_name = source.name.clone();
        let UniverseKind::Lattice(data) = &source.kind else {
            return Err(LookupError::Entity("lattice universe").into());
        };
        let data = data.clone();

        let mut universes = Vec::with_capacity(data.universes.len());
        for &pin in &data.universes {
            universes.push(GridPin::new(pin, data.pitch, self.grid).execute(model)?);
        }

        let gridded = LatticeData {
            universes,
            ..data
        };
        let universe = model.new_lattice(format!("{source_name}-gridded"), gridded);
        model.lattice_grids.insert(cache_key, universe);
        Ok(universe)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::builders::pincell::PinCell;
    use crate::model::{Fill, Region};
    use approx::assert_relative_eq;

    fn lattice_fixture() -> (Model, HashMap<String, UniverseKey>, UniverseKey) {
        let mut model = Model::new();
        let fuel = model.add_material("fuel", 10.2, Vec::new());
        let water = model.add_material("mod", 0.74, Vec::new());
        let fills = [fuel];
        let pin = PinCell::new("1", "fuel-pin", &[0.45], &fills, water)
            .execute(&mut model)
            .unwrap();

        let mod_cell = model.new_cell("infinite mod", Region::all_of([]), Fill::Material(water));
        let mod_verse = model.new_universe("infinite mod verse", vec![mod_cell]);

        let mut pins = HashMap::new();
        pins.insert("1".to_owned(), pin);
        (model, pins, mod_verse)
    }

    #[test]
    fn seventeen_by_seventeen_lower_left() {
        let (mut model, pins, outer) = lattice_fixture();
        let key_map = vec!["1".to_owned(); 17 * 17];
        let lattice = LatticeBuilder::new("LAT1", "a1", 1.26, 17, &key_map, &pins, outer)
            .execute(&mut model)
            .unwrap();

        let data = model.store.universe(lattice).unwrap();
        let UniverseKind::Lattice(lat) = &data.kind else {
            panic!("expected lattice");
        };
        assert_relative_eq!(lat.lower_left.x, -10.71);
        assert_relative_eq!(lat.lower_left.y, -10.71);
        assert_eq!(lat.outer, outer);
        assert_eq!(lat.universes.len(), 289);
        assert_eq!(lat.at(16, 16), Some(pins["1"]));
        assert_eq!(lat.at(17, 0), None);
    }

    #[test]
    fn unknown_pin_key_names_assembly() {
        let (mut model, pins, outer) = lattice_fixture();
        let key_map = vec!["9".to_owned(); 4];
        let err = LatticeBuilder::new("LAT1", "a1", 1.26, 2, &key_map, &pins, outer)
            .execute(&mut model)
            .err();
        let message = format!("{}", err.unwrap());
        assert!(message.contains('9') && message.contains("a1"), "{message}");
    }

    #[test]
    fn gridded_lattice_is_cached_and_immutable() {
        let (mut model, pins, outer) = lattice_fixture();
        let inconel = model.add_material("inconel", 6.55, Vec::new());
        let key_map = vec!["1".to_owned(); 4];
        let lattice = LatticeBuilder::new("LAT1", "a1", 1.26, 2, &key_map, &pins, outer)
            .execute(&mut model)
            .unwrap();
        let grid = SpacerGrid::new("g", 3.866, 12.0, inconel, 1.26, 2, &model).unwrap();

        let first = GridLattice::new(lattice, &grid).execute(&mut model).unwrap();
        let second = GridLattice::new(lattice, &grid).execute(&mut model).unwrap();
        assert_eq!(first, second);
        assert_ne!(first, lattice);

        // All four positions hold the same single gridded pin universe.
        let data = model.store.universe(first).unwrap();
        let UniverseKind::Lattice(lat) = &data.kind else {
            panic!("expected lattice");
        };
        assert!(lat.universes.windows(2).all(|w| w[0] == w[1]));
        assert_ne!(lat.universes[0], pins["1"]);

        // The source lattice still points at the ungridded pin.
        let source = model.store.universe(lattice).unwrap();
        let UniverseKind::Lattice(src) = &source.kind else {
            panic!("expected lattice");
        };
        assert_eq!(src.universes[0], pins["1"]);
    }
}
