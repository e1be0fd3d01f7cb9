use crate::error::{ConfigError, LookupError, Result};
use crate::model::{Fill, MaterialKey, Model, Region, UniverseKey, UniverseKind};

/// A spacer grid design: strap material plus the solved strap
/// half-thickness around each pin.
#[derive(Debug, Clone)]
pub struct SpacerGrid {
    /// Unique name of this grid design.
    pub key: String,
    /// Axial height of the strap (cm).
    pub height: f64,
    /// Total mass of the grid (g).
    pub mass: f64,
    pub material: MaterialKey,
    /// Half the strap thickness between two pins (cm).
    pub thickness: f64,
}

impl SpacerGrid {
    /// Creates a grid design, solving for the strap half-thickness.
    ///
    /// The strap cross-section area around one pin is
    /// `mass / density / height / npins^2`, which also equals
    /// `4*t*pitch - 4*t^2`; equating and solving the quadratic for the
    /// physically valid root gives
    /// `t = 0.5 * (pitch - sqrt(pitch^2 - area))`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::GridThicknessUnsolvable`] when the
    /// discriminant is negative: the declared mass cannot fit in the
    /// pitch. Returns a lookup error if `material` is not in the store.
    pub fn new(
        key: impl Into<String>,
        height: f64,
        mass: f64,
        material: MaterialKey,
        pitch: f64,
        npins: usize,
        model: &Model,
    ) -> Result<Self> {
        let key = key.into();
        let density = model.store.material(material)?.density;
        #[allow(clippy::cast_precision_loss)]
        let per_pin_area = mass / density / height / (npins * npins) as f64;
        let discriminant = pitch * pitch - per_pin_area;
        if discriminant < 0.0 {
            return Err(ConfigError::GridThicknessUnsolvable { key, mass, pitch }.into());
        }
        let thickness = 0.5 * (pitch - discriminant.sqrt());
        Ok(Self {
            key,
            height,
            mass,
            material,
            thickness,
        })
    }

    /// Axial interval `[mid - height/2, mid + height/2)` of a grid
    /// centered at `mid`.
    #[must_use]
    pub fn interval(&self, mid: f64) -> (f64, f64) {
        (mid - self.height / 2.0, mid + self.height / 2.0)
    }
}

/// Wraps a pin universe with four rectangular strap cells carved from its
/// outer moderator region.
///
/// The inner ring cells are copied unchanged (fresh ids, same regions and
/// fills); the moderator cell is shrunk to the strap interior; north and
/// south bands span the full pitch while east and west bands sit between
/// them, so the four straps tile the frame without overlap. The source
/// universe is never mutated. Results are cached by
/// `(source universe, grid key)`.
pub struct GridPin<'a> {
    pin: UniverseKey,
    pitch: f64,
    grid: &'a SpacerGrid,
}

impl<'a> GridPin<'a> {
    #[must_use]
    pub fn new(pin: UniverseKey, pitch: f64, grid: &'a SpacerGrid) -> Self {
        Self { pin, pitch, grid }
    }

    /// Executes the wrap, returning the (possibly cached) gridded universe.
    ///
    /// # Errors
    ///
    /// Returns an error if the pin universe is not a cell universe or a
    /// store lookup fails.
    pub fn execute(&self, model: &mut Model) -> Result<UniverseKey> {
        let cache_key = (self.pin, self.grid.key.clone());
        if let Some(&cached) = model.pin_grids.get(&cache_key) {
            return Ok(cached);
        }

        let source = model.store.universe(self.pin)?;
        let source_name = source.name.clone();
        let UniverseKind::Cells(source_cells) = &source.kind else {
            return Err(LookupError::Entity("pin cell universe").into());
        };
        let source_cells = source_cells.clone();
        let (&mod_cell, ring_cells) = source_cells
            .split_last()
            .ok_or(LookupError::Entity("pin moderator cell"))?;

        let p = self.pitch / 2.0;
        let t = self.grid.thickness;
        let top_out = model.plane_y(p);
        let top_in = model.plane_y(p - t);
        let bot_in = model.plane_y(-p + t);
        let bot_out = model.plane_y(-p);
        let left_out = model.plane_x(-p);
        let left_in = model.plane_x(-p + t);
        let right_in = model.plane_x(p - t);
        let right_out = model.plane_x(p);

        let full_width = Region::outside(left_out).and(Region::inside(right_out));
        let mid_band = Region::outside(bot_in).and(Region::inside(top_in));
        let straps = [
            (
                "north",
                full_width
                    .clone()
                    .and(Region::outside(top_in))
                    .and(Region::inside(top_out)),
            ),
            (
                "south",
                full_width
                    .and(Region::outside(bot_out))
                    .and(Region::inside(bot_in)),
            ),
            (
                "east",
                mid_band
                    .clone()
                    .and(Region::outside(right_in))
                    .and(Region::inside(right_out)),
            ),
            (
                "west",
                mid_band
                    .clone()
                    .and(Region::outside(left_out))
                    .and(Region::inside(left_in)),
            ),
        ];

        let mut cells = Vec::with_capacity(source_cells.len() + 4);
        for &ring in ring_cells {
            cells.push(model.duplicate_cell(ring)?);
        }

        // Shrink the duplicated moderator cell to the strap interior.
        let new_mod = model.duplicate_cell(mod_cell)?;
        {
            let interior = mid_band.and(Region::outside(left_in)).and(Region::inside(right_in));
            let data = model.store.cell_mut(new_mod)?;
            data.name.push_str(" (gridded)");
            data.region = data.region.clone().and(interior);
        }
        cells.push(new_mod);

        for (side, region) in straps {
            cells.push(model.new_cell(
                format!("{source_name} spacer {side}"),
                region,
                Fill::Material(self.grid.material),
            ));
        }

        let universe = model.new_universe(format!("{source_name} gridded"), cells);
        model.pin_grids.insert(cache_key, universe);
        Ok(universe)
    }
}
