use crate::builders::lattice::GridLattice;
use crate::builders::nozzle::Nozzle;
use crate::builders::spacergrid::SpacerGrid;
use crate::error::{ConfigError, LookupError, Result};
use crate::math::{canonical_coeff, COEFF_DIGITS};
use crate::model::{CellKey, Fill, MaterialKey, Model, Region, UniverseKey};

/// A finished fuel assembly.
#[derive(Debug, Clone, Copy)]
pub struct BuiltAssembly {
    pub universe: UniverseKey,
    /// Lowest extent (bottom of the lower nozzle, or of the first lattice).
    pub bottom: f64,
    /// Highest extent (top of the upper nozzle, or of the last lattice).
    pub top: f64,
}

/// Stacks lattices axially between elevation boundaries, interleaves
/// spacer-grid layers at their midpoints, and caps the stack with
/// optional lower/upper nozzle cells.
///
/// The merged elevation list is the sorted, deduplicated union of the
/// declared lattice boundaries and every grid's `mid ± height/2`. One
/// cell is emitted per elevation step, filled with the active lattice or
/// its cached gridded variant; grid intervals are closed-open so a
/// boundary sample is never counted twice. The stack is closed by four
/// wall planes at `±pitch*npins/2` and a final moderator cell covering
/// everything outside the walls, below the bottom, or above the top.
pub struct AssemblyBuilder<'a> {
    /// Short key as used in the core map.
    pub key: &'a str,
    pub name: &'a str,
    pub pitch: f64,
    pub npins: usize,
    /// Lattice universes, bottom to top.
    pub lattices: &'a [UniverseKey],
    /// Layer boundaries; `lattices.len() + 1` entries, ascending.
    pub lattice_elevations: &'a [f64],
    pub spacers: &'a [SpacerGrid],
    /// One midpoint elevation per spacer.
    pub spacer_midpoints: &'a [f64],
    pub lower_nozzle: Option<&'a Nozzle>,
    pub upper_nozzle: Option<&'a Nozzle>,
    pub moderator: MaterialKey,
}

impl AssemblyBuilder<'_> {
    /// Executes the operation, building the assembly universe.
    ///
    /// # Errors
    ///
    /// Returns a configuration error enumerating every missing field at
    /// once, a length-mismatch error for misaligned elevation lists, or
    /// an error if a grid interval falls outside the lattice stack.
    pub fn execute(&self, model: &mut Model) -> Result<BuiltAssembly> {
        self.validate()?;

        let elevations = self.merged_elevations()?;
        #[allow(clippy::cast_precision_loss)]
        let half = self.pitch * self.npins as f64 / 2.0;
        let min_x = model.plane_x(-half);
        let max_x = model.plane_x(half);
        let min_y = model.plane_y(-half);
        let max_y = model.plane_y(half);
        let walls = Region::all_of([
            Region::outside(min_x),
            Region::inside(max_x),
            Region::outside(min_y),
            Region::inside(max_y),
        ]);

        let stack_bottom = elevations[0];
        let stack_top = elevations[elevations.len() - 1];
        let mut cells: Vec<CellKey> = Vec::new();

        let mut bottom = stack_bottom;
        if let Some(nozzle) = self.lower_nozzle {
            bottom = stack_bottom - nozzle.height;
            let lo = model.plane_z(bottom);
            let hi = model.plane_z(stack_bottom);
            cells.push(model.new_cell(
                format!("{}-lower-nozzle", self.name),
                walls
                    .clone()
                    .and(Region::outside(lo))
                    .and(Region::inside(hi)),
                Fill::Material(nozzle.material),
            ));
        }

        for (step, window) in elevations.windows(2).enumerate() {
            let (lo, hi) = (window[0], window[1]);
            let mid = 0.5 * (lo + hi);

            let layer = self
                .lattice_elevations
                .windows(2)
                .position(|bounds| bounds[0] <= mid && mid < bounds[1])
                .ok_or(LookupError::Entity("lattice layer"))?;
            let mut fill = self.lattices[layer];

            let active_grid = self
                .spacers
                .iter()
                .zip(self.spacer_midpoints)
                .find(|(grid, &gmid)| {
                    let (gb, gt) = grid.interval(gmid);
                    gb <= mid && mid < gt
                })
                .map(|(grid, _)| grid);
            if let Some(grid) = active_grid {
                fill = GridLattice::new(fill, grid).execute(model)?;
            }

            let lo_plane = model.plane_z(lo);
            let hi_plane = model.plane_z(hi);
            cells.push(model.new_cell(
                format!("{}-axial{step}", self.name),
                walls
                    .clone()
                    .and(Region::outside(lo_plane))
                    .and(Region::inside(hi_plane)),
                Fill::Universe(fill),
            ));
        }

        let mut top = stack_top;
        if let Some(nozzle) = self.upper_nozzle {
            top = stack_top + nozzle.height;
            let lo = model.plane_z(stack_top);
            let hi = model.plane_z(top);
            cells.push(model.new_cell(
                format!("{}-upper-nozzle", self.name),
                walls
                    .clone()
                    .and(Region::outside(lo))
                    .and(Region::inside(hi)),
                Fill::Material(nozzle.material),
            ));
        }

        // Everything outside the walls, below the bottom, or above the top.
        let bottom_plane = model.plane_z(bottom);
        let top_plane = model.plane_z(top);
        let outside = Region::any_of([
            Region::complement(walls),
            Region::inside(bottom_plane),
            Region::outside(top_plane),
        ]);
        cells.push(model.new_cell(
            format!("{}-outer", self.name),
            outside,
            Fill::Material(self.moderator),
        ));

        let universe = model.new_universe(self.name, cells);
        Ok(BuiltAssembly {
            universe,
            bottom,
            top,
        })
    }

    fn validate(&self) -> Result<()> {
        let mut missing = Vec::new();
        if self.pitch <= 0.0 {
            missing.push("pitch".to_owned());
        }
        if self.npins == 0 {
            missing.push("npins".to_owned());
        }
        if self.lattices.is_empty() {
            missing.push("lattices".to_owned());
        }
        if self.lattice_elevations.is_empty() {
            missing.push("lattice_elevations".to_owned());
        }
        if !missing.is_empty() {
            return Err(ConfigError::MissingFields {
                object: format!("assembly {}", self.key),
                fields: missing,
            }
            .into());
        }

        if self.lattice_elevations.len() != self.lattices.len() + 1 {
            return Err(ConfigError::LengthMismatch {
                object: format!("assembly {}", self.key),
                left_name: "lattice_elevations",
                left: self.lattice_elevations.len(),
                right_name: "lattices + 1",
                right: self.lattices.len() + 1,
            }
            .into());
        }
        if self.spacers.len() != self.spacer_midpoints.len() {
            return Err(ConfigError::LengthMismatch {
                object: format!("assembly {}", self.key),
                left_name: "spacer_midpoints",
                left: self.spacer_midpoints.len(),
                right_name: "spacers",
                right: self.spacers.len(),
            }
            .into());
        }
        Ok(())
    }

    /// Lattice boundaries plus grid tops/bottoms, sorted and deduplicated
    /// to the surface-registry tolerance.
    fn merged_elevations(&self) -> Result<Vec<f64>> {
        let stack_bottom = self.lattice_elevations[0];
        let stack_top = self.lattice_elevations[self.lattice_elevations.len() - 1];

        let mut elevations = self.lattice_elevations.to_vec();
        for (grid, &mid) in self.spacers.iter().zip(self.spacer_midpoints) {
            let (bottom, top) = grid.interval(mid);
            if bottom < stack_bottom || top > stack_top {
                return Err(ConfigError::GridOutsideStack {
                    key: grid.key.clone(),
                }
                .into());
            }
            elevations.push(bottom);
            elevations.push(top);
        }
        elevations.sort_by(f64::total_cmp);
        elevations
            .dedup_by(|a, b| canonical_coeff(*a, COEFF_DIGITS) == canonical_coeff(*b, COEFF_DIGITS));
        Ok(elevations)
    }
}
