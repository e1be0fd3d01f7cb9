use crate::error::Result;
use crate::model::{Fill, MaterialKey, Model, Region, UniverseKey};

/// Builds a pin-cell universe: one cell per concentric ring plus an
/// unbounded outer moderator cell.
///
/// Ring cylinders are obtained through the surface registry, so identical
/// radii across different pin designs resolve to the same surface. The
/// result is cached by the pin's declared key; repeat requests return the
/// cached universe unchanged.
///
/// Radii/material alignment is validated at the input-record boundary; the
/// builder assumes aligned, ascending lists.
pub struct PinCell<'a> {
    key: &'a str,
    name: &'a str,
    radii: &'a [f64],
    ring_fills: &'a [MaterialKey],
    moderator: MaterialKey,
}

impl<'a> PinCell<'a> {
    #[must_use]
    pub fn new(
        key: &'a str,
        name: &'a str,
        radii: &'a [f64],
        ring_fills: &'a [MaterialKey],
        moderator: MaterialKey,
    ) -> Self {
        Self {
            key,
            name,
            radii,
            ring_fills,
            moderator,
        }
    }

    /// Executes the operation, returning the (possibly cached) pin universe.
    ///
    /// # Errors
    ///
    /// Returns an error if a store lookup fails.
    pub fn execute(&self, model: &mut Model) -> Result<UniverseKey> {
        if let Some(&cached) = model.pincells.get(self.key) {
            return Ok(cached);
        }

        let mut cells = Vec::with_capacity(self.radii.len() + 1);
        let mut last_cylinder = None;
        for (ring, (&r, &fill)) in self.radii.iter().zip(self.ring_fills).enumerate() {
            let cylinder = model.cylinder(r);
            let region = match last_cylinder {
                None => Region::inside(cylinder),
                Some(prev) => Region::inside(cylinder).and(Region::outside(prev)),
            };
            cells.push(model.new_cell(
                format!("{}-ring{ring}", self.name),
                region,
                Fill::Material(fill),
            ));
            last_cylinder = Some(cylinder);
        }

        if let Some(outermost) = last_cylinder {
            cells.push(model.new_cell(
                format!("{}-mod", self.name),
                Region::outside(outermost),
                Fill::Material(self.moderator),
            ));
        }

        let universe = model.new_universe(format!("{}-verse", self.name), cells);
        model.pincells.insert(self.key.to_owned(), universe);
        Ok(universe)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::math::Point3;
    use crate::model::UniverseKind;

    fn model_with_mats() -> (Model, Vec<MaterialKey>, MaterialKey) {
        let mut model = Model::new();
        let fuel = model.add_material("fuel", 10.2, Vec::new());
        let gap = model.add_material("he", 0.0002, Vec::new());
        let clad = model.add_material("zirc", 6.56, Vec::new());
        let water = model.add_material("mod", 0.74, Vec::new());
        (model, vec![fuel, gap, clad], water)
    }

    #[test]
    fn three_ring_pin_has_four_cells() {
        let (mut model, fills, water) = model_with_mats();
        let radii = [0.30, 0.333, 0.35];
        let pin = PinCell::new("1", "fuel-pin", &radii, &fills, water)
            .execute(&mut model)
            .unwrap();

        let data = model.store.universe(pin).unwrap();
        let UniverseKind::Cells(cells) = &data.kind else {
            panic!("expected a cell universe");
        };
        assert_eq!(cells.len(), 4);

        // First three are strictly nested annuli in ascending radius; the
        // fourth is unbounded outward.
        let store = &model.store;
        let at = |r: f64| Point3::new(r, 0.0, 0.0);
        let samples = [0.15, 0.32, 0.34, 10.0];
        for (cell, r) in cells.iter().zip(samples) {
            let claimed = model.cells_claiming(pin, &at(r)).unwrap();
            assert_eq!(claimed, vec![*cell], "radius {r}");
        }
        let far = store.cell(cells[3]).unwrap();
        assert!(far.region.contains(store, &at(1e6)));
    }

    #[test]
    fn tiling_has_no_gaps_or_overlaps() {
        let (mut model, fills, water) = model_with_mats();
        let radii = [0.30, 0.333, 0.35];
        let pin = PinCell::new("1", "fuel-pin", &radii, &fills, water)
            .execute(&mut model)
            .unwrap();

        let steps = 41;
        for jy in 0..steps {
            for ix in 0..steps {
                let x = -0.63 + 1.26 * f64::from(ix) / f64::from(steps - 1);
                let y = -0.63 + 1.26 * f64::from(jy) / f64::from(steps - 1);
                let claimed = model
                    .cells_claiming(pin, &Point3::new(x, y, 0.0))
                    .unwrap();
                assert_eq!(claimed.len(), 1, "point ({x}, {y})");
            }
        }
    }

    #[test]
    fn cache_returns_identical_universe() {
        let (mut model, fills, water) = model_with_mats();
        let radii = [0.30, 0.333, 0.35];
        let first = PinCell::new("1", "fuel-pin", &radii, &fills, water)
            .execute(&mut model)
            .unwrap();
        let second = PinCell::new("1", "fuel-pin", &radii, &fills, water)
            .execute(&mut model)
            .unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn shared_radii_reuse_surfaces() {
        let (mut model, fills, water) = model_with_mats();
        let guide_fills = [fills[2]];

        PinCell::new("1", "fuel-pin", &[0.30, 0.333, 0.35], &fills, water)
            .execute(&mut model)
            .unwrap();
        let before = model.store.surface_count();

        // A different pin design whose only radius matches an existing
        // ring boundary creates no new surface at all.
        PinCell::new("2", "guide-tube", &[0.35], &guide_fills, water)
            .execute(&mut model)
            .unwrap();
        assert_eq!(model.store.surface_count(), before);
    }
}
