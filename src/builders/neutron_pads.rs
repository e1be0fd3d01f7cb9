use crate::error::{ConfigError, Result};
use crate::model::{CellKey, Fill, MaterialKey, Model, Region, SurfaceKind};

/// Cuts angular wedge cells for the neutron pads out of one vessel ring.
///
/// Pads alternate with moderator-filled gaps around the ring; each wedge
/// is bounded by a pair of origin-centred rotated planes. Consecutive
/// wedges share their common plane, and the closing wedge reuses the very
/// first plane, so exactly `2 * count` planes are created for
/// `2 * count` cells.
pub struct NeutronPads<'a> {
    /// The host ring region the pads are cut from (an annulus, already
    /// bounded axially by the caller).
    pub host: &'a Region,
    /// Pad material.
    pub material: MaterialKey,
    /// Fill between pads, usually the ring's own moderator.
    pub moderator: MaterialKey,
    /// Number of pads, evenly placed.
    pub count: u32,
    /// Arc length of one pad (degrees).
    pub arc_length: f64,
    /// Angle from the x-axis at which the first pad is centered (degrees).
    pub start_angle: f64,
}

/// The plane containing the direction at `theta` (degrees), through the
/// origin. Its negative half-space covers polar angles in
/// `(theta, theta + 180)`.
fn angled_plane(theta: f64) -> SurfaceKind {
    let radians = theta.to_radians();
    SurfaceKind::Plane {
        a: radians.sin(),
        b: -radians.cos(),
        c: 0.0,
        d: 0.0,
    }
}

impl NeutronPads<'_> {
    /// Executes the operation, returning the pad and gap cells in
    /// alternating order.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the combined pad arc exceeds a
    /// full circle.
    pub fn execute(&self, model: &mut Model) -> Result<Vec<CellKey>> {
        if self.arc_length * f64::from(self.count) > 360.0 {
            return Err(ConfigError::PadArcOverflow {
                count: self.count,
                arc: self.arc_length,
            }
            .into());
        }

        let theta = 360.0 / f64::from(self.count);
        let mut cells = Vec::with_capacity(2 * self.count as usize);
        let mut first_plane = None;
        let mut previous = None;

        for i in 0..self.count {
            let pad_start = self.start_angle + f64::from(i) * theta - self.arc_length / 2.0;
            let pad_end = pad_start + self.arc_length;

            let start = previous.unwrap_or_else(|| {
                let plane = model.general_plane(angled_plane(pad_start));
                first_plane = Some(plane);
                plane
            });
            let end = model.general_plane(angled_plane(pad_end));

            // The wedge between the start and end planes; arcs are under
            // 180 degrees, so the two half-spaces intersect in one wedge.
            cells.push(model.new_cell(
                format!("neutron pad {}", i + 1),
                self.host
                    .clone()
                    .and(Region::inside(start))
                    .and(Region::outside(end)),
                Fill::Material(self.material),
            ));

            // Gap up to the start of the next pad; the last gap closes the
            // ring on the first pad's plane.
            let next = if i + 1 == self.count {
                first_plane.unwrap_or(start)
            } else {
                model.general_plane(angled_plane(pad_start + theta))
            };
            cells.push(model.new_cell(
                format!("pad gap {}", i + 1),
                self.host
                    .clone()
                    .and(Region::inside(end))
                    .and(Region::outside(next)),
                Fill::Material(self.moderator),
            ));
            previous = Some(next);
        }

        Ok(cells)
    }
}
