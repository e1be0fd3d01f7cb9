use log::warn;

use crate::error::Result;
use crate::model::{Model, Region};

/// Traces the outer boundary of an irregular core footprint and emits one
/// unioned region for the steel baffle plates hugging the outline.
///
/// For every occupied map location, a rectangular strap is emitted on each
/// side whose orthogonal neighbor is unoccupied; locations outside the map
/// count as unoccupied, so edge rows and corners need no special cases.
/// Each strap spans `[d1, d2]` away from the assembly edge (past the water
/// gap) and is mitered at an end to the inside of the adjacent baffle run
/// when both the orthogonal-end neighbor and the diagonal beyond it are
/// occupied; otherwise it extends to the outer line, overlapping the
/// neighboring strap. Overlaps within the union are harmless; what matters
/// is that no strap protrudes into a neighbor's water gap. The rule
/// depends only on the rotated neighborhood, so a symmetric footprint
/// yields a symmetric region.
///
/// All strap edges resolve through the surface registry, so an edge shared
/// by two adjacent occupied locations is the same surface pair and the
/// union stays linear in boundary length.
pub struct BaffleBuilder<'a> {
    /// Square occupancy map, row-major from the top.
    pub map: &'a [Vec<bool>],
    /// Water gap between assembly edge and baffle (cm).
    pub gap: f64,
    /// Plate thickness (cm).
    pub thickness: f64,
    /// Assembly pitch (cm).
    pub pitch: f64,
}

/// One side of a map location, as (dj, di) steps.
const SIDES: [(i64, i64); 4] = [(-1, 0), (1, 0), (0, -1), (0, 1)];

impl BaffleBuilder<'_> {
    /// Executes the trace, returning the radial (2-D) baffle region.
    ///
    /// The caller intersects the result with the core's axial bounds
    /// after the core cell's radial region has been carved out; bounding
    /// it axially here, before the full radial shape is known, would
    /// silently produce a baffle with the wrong height.
    ///
    /// # Errors
    ///
    /// Currently infallible; kept fallible for parity with the other
    /// builders.
    #[allow(clippy::cast_possible_wrap, clippy::cast_precision_loss)]
    pub fn execute(&self, model: &mut Model) -> Result<Region> {
        let n = self.map.len();
        let width = n as f64 * self.pitch / 2.0;

        // Distances from an assembly center.
        let d0 = self.pitch / 2.0;
        let d1 = d0 + self.gap;
        let d2 = d1 + self.thickness;
        let d3 = d0 - self.gap;

        let mut straps: Vec<Region> = Vec::new();

        for j in 0..n {
            for i in 0..n {
                if !self.occupied(j as i64, i as i64) {
                    continue;
                }
                self.check_diagonal_pockets(j as i64, i as i64);

                let x = (i as f64 + 0.5) * self.pitch - width;
                let y = width - (j as f64 + 0.5) * self.pitch;

                for (dj, di) in SIDES {
                    if self.occupied(j as i64 + dj, i as i64 + di) {
                        continue;
                    }
                    // End extents along the strap, mitered where the run
                    // turns inward around an occupied diagonal.
                    let extent = |ej: i64, ei: i64| -> f64 {
                        let orthogonal = self.occupied(j as i64 + ej, i as i64 + ei);
                        let diagonal = self.occupied(j as i64 + ej + dj, i as i64 + ei + di);
                        if orthogonal && diagonal {
                            d3
                        } else {
                            d2
                        }
                    };

                    let (x_left, x_right, y_bottom, y_top) = if di == 0 {
                        // North/south strap: y offset by the side, x spans
                        // the location with per-end extents.
                        let (y_near, y_far) = if dj < 0 {
                            (y + d1, y + d2)
                        } else {
                            (y - d2, y - d1)
                        };
                        (x - extent(0, -1), x + extent(0, 1), y_near.min(y_far), y_near.max(y_far))
                    } else {
                        let (x_near, x_far) = if di < 0 {
                            (x - d2, x - d1)
                        } else {
                            (x + d1, x + d2)
                        };
                        (x_near.min(x_far), x_near.max(x_far), y - extent(1, 0), y + extent(-1, 0))
                    };

                    let left = model.plane_x(x_left);
                    let right = model.plane_x(x_right);
                    let bottom = model.plane_y(y_bottom);
                    let top = model.plane_y(y_top);
                    straps.push(Region::all_of([
                        Region::outside(left),
                        Region::inside(right),
                        Region::outside(bottom),
                        Region::inside(top),
                    ]));
                }
            }
        }

        Ok(Region::any_of(straps))
    }

    #[allow(clippy::cast_sign_loss)]
    fn occupied(&self, j: i64, i: i64) -> bool {
        if j < 0 || i < 0 {
            return false;
        }
        self.map
            .get(j as usize)
            .and_then(|row| row.get(i as usize))
            .copied()
            .unwrap_or(false)
    }

    /// A location surrounded orthogonally but with a vacant diagonal makes
    /// a one-assembly pocket whose corner the side rule cannot close.
    fn check_diagonal_pockets(&self, j: i64, i: i64) {
        let surrounded = SIDES
            .iter()
            .all(|&(dj, di)| self.occupied(j + dj, i + di));
        if !surrounded {
            return;
        }
        for (dj, di) in [(-1, -1), (-1, 1), (1, -1), (1, 1)] {
            if !self.occupied(j + dj, i + di) {
                warn!(
                    "baffle: location ({j}, {i}) touches a vacant diagonal at \
                     ({}, {}); the pocket corner may be uncovered",
                    j + dj,
                    i + di
                );
            }
        }
    }
}
