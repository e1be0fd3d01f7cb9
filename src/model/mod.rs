pub mod cell;
pub mod counter;
pub mod material;
pub mod region;
pub mod registry;
pub mod surface;
pub mod universe;

pub use cell::{CellData, CellKey, Fill};
pub use counter::{IdAllocator, IdKind};
pub use material::{MaterialData, MaterialKey, MaterialOrigin, Nuclide};
pub use region::Region;
pub use registry::{SurfaceClass, SurfaceRegistry};
pub use surface::{BoundaryType, SurfaceData, SurfaceKey, SurfaceKind};
pub use universe::{LatticeData, UniverseData, UniverseKey, UniverseKind};

use std::collections::HashMap;

use slotmap::SlotMap;

use crate::error::LookupError;
use crate::math::{Point3, COEFF_DIGITS};

/// Central arena that owns all model entities.
///
/// Entities reference each other via typed keys (generational indices);
/// "the same surface/universe" always means "the same key". Nothing is
/// ever removed during a build.
#[derive(Debug, Default)]
pub struct ModelStore {
    surfaces: SlotMap<SurfaceKey, SurfaceData>,
    cells: SlotMap<CellKey, CellData>,
    universes: SlotMap<UniverseKey, UniverseData>,
    materials: SlotMap<MaterialKey, MaterialData>,
}

impl ModelStore {
    /// Creates a new, empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a surface and returns its key.
    pub fn add_surface(&mut self, data: SurfaceData) -> SurfaceKey {
        self.surfaces.insert(data)
    }

    /// Returns a reference to the surface data.
    ///
    /// # Errors
    ///
    /// Returns an error if the entity is not found in the store.
    pub fn surface(&self, key: SurfaceKey) -> Result<&SurfaceData, LookupError> {
        self.surfaces.get(key).ok_or(LookupError::Entity("surface"))
    }

    /// Returns a mutable reference to the surface data.
    ///
    /// # Errors
    ///
    /// Returns an error if the entity is not found in the store.
    pub fn surface_mut(&mut self, key: SurfaceKey) -> Result<&mut SurfaceData, LookupError> {
        self.surfaces
            .get_mut(key)
            .ok_or(LookupError::Entity("surface"))
    }

    /// The kind of a surface known to be in the store.
    ///
    /// Keys are only ever produced by this store and nothing is deleted,
    /// so direct indexing is safe for keys obtained during this build.
    #[must_use]
    pub fn surface_kind(&self, key: SurfaceKey) -> SurfaceKind {
        self.surfaces[key].kind
    }

    /// Inserts a cell and returns its key.
    pub fn add_cell(&mut self, data: CellData) -> CellKey {
        self.cells.insert(data)
    }

    /// Returns a reference to the cell data.
    ///
    /// # Errors
    ///
    /// Returns an error if the entity is not found in the store.
    pub fn cell(&self, key: CellKey) -> Result<&CellData, LookupError> {
        self.cells.get(key).ok_or(LookupError::Entity("cell"))
    }

    /// Returns a mutable reference to the cell data.
    ///
    /// # Errors
    ///
    /// Returns an error if the entity is not found in the store.
    pub fn cell_mut(&mut self, key: CellKey) -> Result<&mut CellData, LookupError> {
        self.cells.get_mut(key).ok_or(LookupError::Entity("cell"))
    }

    /// Inserts a universe and returns its key.
    pub fn add_universe(&mut self, data: UniverseData) -> UniverseKey {
        self.universes.insert(data)
    }

    /// Returns a reference to the universe data.
    ///
    /// # Errors
    ///
    /// Returns an error if the entity is not found in the store.
    pub fn universe(&self, key: UniverseKey) -> Result<&UniverseData, LookupError> {
        self.universes
            .get(key)
            .ok_or(LookupError::Entity("universe"))
    }

    /// Returns a mutable reference to the universe data.
    ///
    /// # Errors
    ///
    /// Returns an error if the entity is not found in the store.
    pub fn universe_mut(&mut self, key: UniverseKey) -> Result<&mut UniverseData, LookupError> {
        self.universes
            .get_mut(key)
            .ok_or(LookupError::Entity("universe"))
    }

    /// Inserts a material and returns its key.
    pub fn add_material(&mut self, data: MaterialData) -> MaterialKey {
        self.materials.insert(data)
    }

    /// Returns a reference to the material data.
    ///
    /// # Errors
    ///
    /// Returns an error if the entity is not found in the store.
    pub fn material(&self, key: MaterialKey) -> Result<&MaterialData, LookupError> {
        self.materials
            .get(key)
            .ok_or(LookupError::Entity("material"))
    }

    /// Iterates over all materials in the store.
    pub fn materials(&self) -> impl Iterator<Item = (MaterialKey, &MaterialData)> {
        self.materials.iter()
    }

    /// Number of surfaces in the store.
    #[must_use]
    pub fn surface_count(&self) -> usize {
        self.surfaces.len()
    }

    /// Number of cells in the store.
    #[must_use]
    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }
}

/// The model under construction: arena, id allocator, surface registry,
/// and every structural cache, threaded by `&mut` through all builders.
///
/// The caches are what keep the region/cell graph linear in distinct
/// geometric configurations rather than in total pin count; entries are
/// created lazily and never invalidated during a build.
#[derive(Debug)]
pub struct Model {
    pub store: ModelStore,
    pub ids: IdAllocator,
    registry: SurfaceRegistry,
    /// Pin universes by pin-cell key.
    pub(crate) pincells: HashMap<String, UniverseKey>,
    /// Materials by case key.
    pub(crate) materials: HashMap<String, MaterialKey>,
    /// Gridded pin universes by (source pin universe, grid key).
    pub(crate) pin_grids: HashMap<(UniverseKey, String), UniverseKey>,
    /// Gridded lattice universes by (source lattice universe, grid key).
    pub(crate) lattice_grids: HashMap<(UniverseKey, String), UniverseKey>,
}

impl Default for Model {
    fn default() -> Self {
        Self::with_digits(COEFF_DIGITS)
    }
}

impl Model {
    /// Creates a model with the default coefficient tolerance (5 digits)
    /// and id floor (100).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a model whose surface registry rounds coefficients to
    /// `digits` decimal places.
    #[must_use]
    pub fn with_digits(digits: u32) -> Self {
        Self {
            store: ModelStore::new(),
            ids: IdAllocator::new(),
            registry: SurfaceRegistry::new(digits),
            pincells: HashMap::new(),
            materials: HashMap::new(),
            pin_grids: HashMap::new(),
            lattice_grids: HashMap::new(),
        }
    }

    /// Deduplicated surface lookup; see [`SurfaceRegistry::get_or_create`].
    pub fn surface(&mut self, class: SurfaceClass, coefficient: f64) -> SurfaceKey {
        self.registry
            .get_or_create(&mut self.store, &mut self.ids, class, coefficient)
    }

    /// The x-plane at `x0`.
    pub fn plane_x(&mut self, x0: f64) -> SurfaceKey {
        self.surface(SurfaceClass::XPlane, x0)
    }

    /// The y-plane at `y0`.
    pub fn plane_y(&mut self, y0: f64) -> SurfaceKey {
        self.surface(SurfaceClass::YPlane, y0)
    }

    /// The z-plane at `z0`.
    pub fn plane_z(&mut self, z0: f64) -> SurfaceKey {
        self.surface(SurfaceClass::ZPlane, z0)
    }

    /// The z-cylinder of radius `r`.
    pub fn cylinder(&mut self, r: f64) -> SurfaceKey {
        self.surface(SurfaceClass::ZCylinder, r)
    }

    /// A general plane, outside the registry namespaces. Callers that want
    /// sharing must hold on to the returned key themselves.
    pub fn general_plane(&mut self, kind: SurfaceKind) -> SurfaceKey {
        let id = self.ids.next_surface();
        self.store.add_surface(SurfaceData::new(id, kind))
    }

    /// Creates a cell with a fresh cell id.
    pub fn new_cell(&mut self, name: impl Into<String>, region: Region, fill: Fill) -> CellKey {
        let id = self.ids.next_cell();
        self.store.add_cell(CellData::new(id, name, region, fill))
    }

    /// Creates a cell-list universe with a fresh universe id.
    pub fn new_universe(&mut self, name: impl Into<String>, cells: Vec<CellKey>) -> UniverseKey {
        let id = self.ids.next_universe();
        self.store.add_universe(UniverseData::cells(id, name, cells))
    }

    /// Creates a lattice universe with a fresh universe id.
    pub fn new_lattice(&mut self, name: impl Into<String>, lattice: LatticeData) -> UniverseKey {
        let id = self.ids.next_universe();
        self.store
            .add_universe(UniverseData::lattice(id, name, lattice))
    }

    /// Copies a cell, issuing a new cell id but keeping region and fill.
    ///
    /// # Errors
    ///
    /// Returns an error if `cell` is not in the store.
    pub fn duplicate_cell(&mut self, cell: CellKey) -> Result<CellKey, LookupError> {
        let mut data = self.store.cell(cell)?.clone();
        data.id = self.ids.next_cell();
        Ok(self.store.add_cell(data))
    }

    /// Registers a directly specified material, cached by case key.
    pub fn add_material(
        &mut self,
        key: impl Into<String>,
        density: f64,
        nuclides: Vec<Nuclide>,
    ) -> MaterialKey {
        let key = key.into();
        if let Some(&existing) = self.materials.get(&key) {
            return existing;
        }
        let id = self.ids.next_material();
        let mat = self
            .store
            .add_material(MaterialData::new(id, key.clone(), density, nuclides));
        self.materials.insert(key, mat);
        mat
    }

    /// Builds a volume-weighted mixture of `parts`, cached by name.
    ///
    /// The result is indistinguishable from a directly specified material
    /// apart from its provenance tag.
    ///
    /// # Errors
    ///
    /// Returns an error if any part key is not in the store.
    pub fn add_mixture(
        &mut self,
        name: impl Into<String>,
        parts: &[(MaterialKey, f64)],
    ) -> Result<MaterialKey, LookupError> {
        let name = name.into();
        if let Some(&existing) = self.materials.get(&name) {
            return Ok(existing);
        }
        let sources: Vec<(&MaterialData, f64)> = parts
            .iter()
            .map(|&(key, v)| Ok((self.store.material(key)?, v)))
            .collect::<Result<_, LookupError>>()?;
        let (density, nuclides) = material::mix(&sources);
        let id = self.ids.next_material();
        let mut data = MaterialData::new(id, name.clone(), density, nuclides);
        data.origin = MaterialOrigin::Mixed;
        let mat = self.store.add_material(data);
        self.materials.insert(name, mat);
        Ok(mat)
    }

    /// Looks up a previously registered material by case key.
    #[must_use]
    pub fn material_by_key(&self, key: &str) -> Option<MaterialKey> {
        self.materials.get(key).copied()
    }

    /// Applies a boundary condition to a surface.
    ///
    /// # Errors
    ///
    /// Returns an error if `surface` is not in the store.
    pub fn set_boundary(
        &mut self,
        surface: SurfaceKey,
        boundary: BoundaryType,
    ) -> Result<(), LookupError> {
        self.store.surface_mut(surface)?.boundary = boundary;
        Ok(())
    }

    /// Every cell of a cell-list universe whose region claims `point`.
    ///
    /// The tiling invariant holds exactly when this returns one cell for
    /// every point of the universe's extent.
    ///
    /// # Errors
    ///
    /// Returns an error if `universe` is not in the store.
    pub fn cells_claiming(
        &self,
        universe: UniverseKey,
        point: &Point3,
    ) -> Result<Vec<CellKey>, LookupError> {
        let data = self.store.universe(universe)?;
        let UniverseKind::Cells(cells) = &data.kind else {
            return Ok(Vec::new());
        };
        let mut claiming = Vec::new();
        for &cell in cells {
            if self.store.cell(cell)?.region.contains(&self.store, point) {
                claiming.push(cell);
            }
        }
        Ok(claiming)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn duplicate_gets_fresh_id() {
        let mut model = Model::new();
        let mat = model.add_material("mod", 1.0, Vec::new());
        let s = model.cylinder(0.5);
        let cell = model.new_cell("ring", Region::inside(s), Fill::Material(mat));
        let copy = model.duplicate_cell(cell).unwrap();

        let orig = model.store.cell(cell).unwrap();
        let dup = model.store.cell(copy).unwrap();
        assert_ne!(orig.id, dup.id);
        assert_eq!(orig.name, dup.name);
        assert_eq!(orig.region, dup.region);
    }

    #[test]
    fn material_cache_returns_same_key() {
        let mut model = Model::new();
        let a = model.add_material("ss", 6.55, Vec::new());
        let b = model.add_material("ss", 6.55, Vec::new());
        assert_eq!(a, b);
    }

    #[test]
    fn mixture_is_tagged_but_behaves_like_material() {
        let mut model = Model::new();
        let water = model.add_material(
            "water",
            1.0,
            vec![Nuclide {
                name: "H1".into(),
                weight_fraction: 1.0,
            }],
        );
        let steel = model.add_material(
            "steel",
            7.8,
            vec![Nuclide {
                name: "Fe56".into(),
                weight_fraction: 1.0,
            }],
        );
        let mixkey = model
            .add_mixture("smear", &[(water, 0.5), (steel, 0.5)])
            .unwrap();
        let mix = model.store.material(mixkey).unwrap();
        assert_eq!(mix.origin, MaterialOrigin::Mixed);
        assert!((mix.density - 4.4).abs() < 1e-12);
        // Cached by name like any other material.
        let again = model.add_mixture("smear", &[]).unwrap();
        assert_eq!(mixkey, again);
    }
}
