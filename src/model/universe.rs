use crate::math::Point2;
use crate::model::cell::CellKey;

slotmap::new_key_type! {
    /// Unique identifier for a universe in the model store.
    pub struct UniverseKey;
}

/// A uniform rectangular array of universe references.
///
/// `universes` is row-major, `n`×`n`, top row first (matching the order
/// core maps are written in a deck). Positions outside the declared bounds
/// resolve to `outer`, which models the water gap between assemblies.
#[derive(Debug, Clone)]
pub struct LatticeData {
    pub pitch: f64,
    pub n: usize,
    /// Coordinates of the lower-left corner; the lattice is centered at
    /// the origin, so this is `(-pitch * n / 2, -pitch * n / 2)`.
    pub lower_left: Point2,
    pub universes: Vec<UniverseKey>,
    pub outer: UniverseKey,
}

impl LatticeData {
    /// The universe at row `j` (from the top), column `i`.
    #[must_use]
    pub fn at(&self, j: usize, i: usize) -> Option<UniverseKey> {
        if j < self.n && i < self.n {
            self.universes.get(j * self.n + i).copied()
        } else {
            None
        }
    }
}

/// The contents of a universe: an explicit cell list, or a lattice.
#[derive(Debug, Clone)]
pub enum UniverseKind {
    /// Ordered cells. For pin universes the outermost (moderator) cell is
    /// last; the spacer-grid wrap relies on this ordering.
    Cells(Vec<CellKey>),
    Lattice(LatticeData),
}

/// A self-contained, reusable geometric unit.
///
/// Universes may be referenced by many parent cells; identical pin, grid,
/// and lattice configurations always resolve to the same universe through
/// the model's caches, never to a structural duplicate.
#[derive(Debug, Clone)]
pub struct UniverseData {
    /// Engine-facing integer id.
    pub id: u32,
    pub name: String,
    pub kind: UniverseKind,
}

impl UniverseData {
    #[must_use]
    pub fn cells(id: u32, name: impl Into<String>, cells: Vec<CellKey>) -> Self {
        Self {
            id,
            name: name.into(),
            kind: UniverseKind::Cells(cells),
        }
    }

    #[must_use]
    pub fn lattice(id: u32, name: impl Into<String>, lattice: LatticeData) -> Self {
        Self {
            id,
            name: name.into(),
            kind: UniverseKind::Lattice(lattice),
        }
    }
}
