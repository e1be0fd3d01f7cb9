use std::collections::HashMap;

use crate::builders::assembly::{AssemblyBuilder, BuiltAssembly};
use crate::builders::baffle::BaffleBuilder;
use crate::builders::lattice::LatticeBuilder;
use crate::builders::neutron_pads::NeutronPads;
use crate::builders::nozzle::{Nozzle, NozzleBuilder};
use crate::builders::pincell::PinCell;
use crate::builders::spacergrid::SpacerGrid;
use crate::error::{ConfigError, LookupError, Result};
use crate::input::{AssemblyRecord, CaseRecord, NozzleRecord};
use crate::math::Point2;
use crate::model::{
    BoundaryType, Fill, LatticeData, MaterialKey, Model, Region, SurfaceKey, UniverseKey,
};

/// Key of the implicit moderator material every deck defines.
const MODERATOR_KEY: &str = "mod";

/// The finished core model, ready for a downstream exporter.
#[derive(Debug, Clone, Copy)]
pub struct BuiltCore {
    /// Root universe: vessel rings, plates, baffle, and the core lattice.
    pub root: UniverseKey,
    /// The lattice of assembly universes inside the baffle.
    pub core_lattice: UniverseKey,
    /// Outermost vessel cylinder, carrying the radial boundary condition.
    pub radial_surface: SurfaceKey,
    /// Bottom of the lower core plate, carrying the bottom boundary
    /// condition.
    pub bottom_surface: SurfaceKey,
    /// Top of the upper core plate, carrying the top boundary condition.
    pub top_surface: SurfaceKey,
}

/// Assembles a whole case, bottom-up: materials, pin cells, lattices,
/// spacer grids, assemblies, then the baffle, neutron pads, core plates,
/// and vessel rings into one root universe.
///
/// Assemblies are cached by key, so a design instantiated in fifty core
/// locations is built exactly once.
pub struct CoreComposer<'a> {
    case: &'a CaseRecord,
    assemblies: HashMap<String, BuiltAssembly>,
    moderator: Option<(MaterialKey, UniverseKey)>,
}

impl<'a> CoreComposer<'a> {
    #[must_use]
    pub fn new(case: &'a CaseRecord) -> Self {
        Self {
            case,
            assemblies: HashMap::new(),
            moderator: None,
        }
    }

    /// Builds the full model.
    ///
    /// # Errors
    ///
    /// Returns the first configuration, lookup, or geometry error
    /// encountered; per-object validation aggregates all of an object's
    /// missing fields into one error.
    pub fn build(&mut self, model: &mut Model) -> Result<BuiltCore> {
        self.case.core.validate()?;
        for record in &self.case.materials {
            model.add_material(record.key.clone(), record.density, record.weight_nuclides()?);
        }
        let core_lattice = self.core_lattice(model)?;
        self.compose_vessel(model, core_lattice)
    }

    /// The built assembly for `key`, constructing it on first request.
    ///
    /// # Errors
    ///
    /// Returns a lookup error if `key` is not an assembly record, or any
    /// error from the assembly's own construction.
    pub fn built_assembly(&mut self, model: &mut Model, key: &str) -> Result<BuiltAssembly> {
        if let Some(&cached) = self.assemblies.get(key) {
            return Ok(cached);
        }
        let (moderator, mod_verse) = self.moderator_universe(model)?;
        let record = self
            .case
            .assemblies
            .get(key)
            .ok_or_else(|| LookupError::Assembly { key: key.to_owned() })?;
        record.validate()?;

        // Pin universes for every cell card in this assembly.
        let mut pins: HashMap<String, UniverseKey> = HashMap::new();
        for pin in &record.cells {
            let fills = pin
                .materials
                .iter()
                .map(|m| resolve_material(model, m, &record.name, ""))
                .collect::<Result<Vec<_>>>()?;
            let universe =
                PinCell::new(&pin.key, &pin.name, &pin.radii, &fills, moderator).execute(model)?;
            pins.insert(pin.key.clone(), universe);
        }

        let lattices = record
            .axial_labels
            .iter()
            .map(|label| {
                LatticeBuilder::new(
                    label,
                    &record.key,
                    record.pitch,
                    record.npins,
                    &record.key_maps[label],
                    &pins,
                    mod_verse,
                )
                .execute(model)
            })
            .collect::<Result<Vec<_>>>()?;

        // One grid design per distinct key; the per-elevation list aliases
        // those designs.
        let mut designs: HashMap<String, SpacerGrid> = HashMap::new();
        for gkey in &record.grid_map {
            if designs.contains_key(gkey) {
                continue;
            }
            let grid = record.grids.get(gkey).ok_or_else(|| LookupError::SpacerGrid {
                key: gkey.clone(),
                assembly: record.key.clone(),
            })?;
            let material = lookup_material(
                model,
                &grid.material,
                &format!("assembly {} grid {gkey}", record.key),
            )?;
            designs.insert(
                gkey.clone(),
                SpacerGrid::new(
                    gkey.clone(),
                    grid.height,
                    grid.mass,
                    material,
                    record.pitch,
                    record.npins,
                    model,
                )?,
            );
        }
        let spacers = record
            .grid_map
            .iter()
            .map(|k| designs[k].clone())
            .collect::<Vec<_>>();

        let lower = self.nozzle(model, record, record.lower_nozzle.as_ref(), "lower")?;
        let upper = self.nozzle(model, record, record.upper_nozzle.as_ref(), "upper")?;

        let built = AssemblyBuilder {
            key: &record.key,
            name: &record.name,
            pitch: record.pitch,
            npins: record.npins,
            lattices: &lattices,
            lattice_elevations: &record.axial_elevations,
            spacers: &spacers,
            spacer_midpoints: &record.grid_elevations,
            lower_nozzle: lower.as_ref(),
            upper_nozzle: upper.as_ref(),
            moderator,
        }
        .execute(model)?;

        self.assemblies.insert(key.to_owned(), built);
        Ok(built)
    }

    fn nozzle(
        &self,
        model: &mut Model,
        record: &AssemblyRecord,
        nozzle: Option<&NozzleRecord>,
        end: &str,
    ) -> Result<Option<Nozzle>> {
        let Some(noz) = nozzle else {
            return Ok(None);
        };
        let (moderator, _) = self
            .moderator
            .ok_or_else(|| LookupError::Material {
                key: MODERATOR_KEY.to_owned(),
                context: "nozzle".to_owned(),
            })?;
        let structural = lookup_material(
            model,
            &noz.material,
            &format!("assembly {} {end} nozzle", record.key),
        )?;
        NozzleBuilder::new(
            &format!("{end}-nozzle-mat"),
            noz.height,
            noz.mass,
            structural,
            moderator,
            record.npins,
            record.pitch,
        )
        .execute(model)
        .map(Some)
    }

    /// The infinite moderator universe used as lattice outer fill and for
    /// empty core-map positions.
    fn moderator_universe(&mut self, model: &mut Model) -> Result<(MaterialKey, UniverseKey)> {
        if let Some(cached) = self.moderator {
            return Ok(cached);
        }
        let material = lookup_material(model, MODERATOR_KEY, "core")?;
        let cell = model.new_cell("infinite mod", Region::all_of([]), Fill::Material(material));
        let universe = model.new_universe("infinite mod verse", vec![cell]);
        self.moderator = Some((material, universe));
        Ok((material, universe))
    }

    /// The lattice of assembly universes over the core shape map; vacant
    /// positions hold the moderator universe.
    fn core_lattice(&mut self, model: &mut Model) -> Result<UniverseKey> {
        let (_, mod_verse) = self.moderator_universe(model)?;
        let n = self.case.core.shape.len();
        log::info!("generating {n}x{n} core lattice for case {}", self.case.case_id);

        let mut universes = Vec::with_capacity(n * n);
        for j in 0..n {
            for i in 0..n {
                let key = if self.case.core.shape[j][i] {
                    Some(self.case.core.assembly_map[j][i].clone().ok_or_else(|| {
                        LookupError::Assembly {
                            key: format!("map position ({j}, {i})"),
                        }
                    })?)
                } else {
                    None
                };
                match key {
                    Some(key) => universes.push(self.built_assembly(model, &key)?.universe),
                    None => universes.push(mod_verse),
                }
            }
        }

        let pitch = self.case.core.pitch;
        #[allow(clippy::cast_precision_loss)]
        let half = pitch * n as f64 / 2.0;
        Ok(model.new_lattice(
            "core lattice",
            LatticeData {
                pitch,
                n,
                lower_left: Point2::new(-half, -half),
                universes,
                outer: mod_verse,
            },
        ))
    }

    /// Vessel rings, core plates, neutron pads, and the baffle around the
    /// core lattice.
    fn compose_vessel(&self, model: &mut Model, core_lattice: UniverseKey) -> Result<BuiltCore> {
        let core = &self.case.core;
        let bc_bottom = BoundaryType::parse(&core.boundary.bottom)?;
        let bc_top = BoundaryType::parse(&core.boundary.top)?;
        let bc_radial = BoundaryType::parse(&core.boundary.radial)?;

        let plate_bottom = model.plane_z(-core.lower_plate.thickness);
        let core_bottom = model.plane_z(0.0);
        let core_top = model.plane_z(core.height);
        let plate_top = model.plane_z(core.height + core.upper_plate.thickness);
        let full_height = Region::outside(plate_bottom).and(Region::inside(plate_top));

        if let Some(pads) = &core.pads {
            if pads.ring == 0 || pads.ring >= core.vessel_radii.len() {
                return Err(ConfigError::PadRing(pads.ring).into());
            }
        }

        let mut cells = Vec::new();
        let mut inner_cylinder = None;
        let mut last_cylinder = None;
        for (ring, (&radius, mat_key)) in core
            .vessel_radii
            .iter()
            .zip(&core.vessel_materials)
            .enumerate()
        {
            let cylinder = model.cylinder(radius);
            if ring == 0 {
                // The innermost ring holds the core itself; its cells are
                // added after the baffle below.
                inner_cylinder = Some(cylinder);
            } else {
                let annulus = Region::inside(cylinder)
                    .and(Region::outside(last_cylinder.unwrap_or(cylinder)))
                    .and(full_height.clone());
                let material =
                    lookup_material(model, mat_key, &format!("vessel ring {ring}"))?;
                match &core.pads {
                    Some(pads) if pads.ring == ring => {
                        let pad_material = lookup_material(
                            model,
                            &pads.material,
                            &format!("neutron pads in vessel ring {ring}"),
                        )?;
                        cells.extend(
                            NeutronPads {
                                host: &annulus,
                                material: pad_material,
                                moderator: material,
                                count: pads.count,
                                arc_length: pads.arc_length,
                                start_angle: pads.start_angle,
                            }
                            .execute(model)?,
                        );
                    }
                    _ => {
                        cells.push(model.new_cell(
                            format!("vessel ring {ring}"),
                            annulus,
                            Fill::Material(material),
                        ));
                    }
                }
            }
            last_cylinder = Some(cylinder);
        }
        let inner_cylinder = inner_cylinder.ok_or(LookupError::Entity("vessel ring"))?;
        let outer_cylinder = last_cylinder.unwrap_or(inner_cylinder);

        // Core plates cap the inner ring between the core and the vessel
        // plates' extent.
        let lower_plate = lookup_material(model, &core.lower_plate.material, "lower core plate")?;
        cells.push(model.new_cell(
            "lower core plate",
            Region::inside(inner_cylinder)
                .and(Region::outside(plate_bottom))
                .and(Region::inside(core_bottom)),
            Fill::Material(lower_plate),
        ));
        let upper_plate = lookup_material(model, &core.upper_plate.material, "upper core plate")?;
        cells.push(model.new_cell(
            "upper core plate",
            Region::inside(inner_cylinder)
                .and(Region::outside(core_top))
                .and(Region::inside(plate_top)),
            Fill::Material(upper_plate),
        ));

        // The baffle's radial shape must be complete before any axial
        // bound is applied to it.
        let active = Region::outside(core_bottom).and(Region::inside(core_top));
        let core_region = Region::inside(inner_cylinder).and(active.clone());
        let core_cell_region = match &core.baffle {
            Some(baffle) => {
                let radial = BaffleBuilder {
                    map: &core.shape,
                    gap: baffle.gap,
                    thickness: baffle.thickness,
                    pitch: core.pitch,
                }
                .execute(model)?;
                let material =
                    lookup_material(model, &baffle.material, "baffle")?;
                let carved = core_region.and(Region::complement(radial.clone()));
                cells.push(model.new_cell(
                    "baffle",
                    radial.and(active),
                    Fill::Material(material),
                ));
                carved
            }
            None => core_region,
        };
        cells.push(model.new_cell(
            "core",
            core_cell_region,
            Fill::Universe(core_lattice),
        ));

        model.set_boundary(plate_bottom, bc_bottom)?;
        model.set_boundary(plate_top, bc_top)?;
        model.set_boundary(outer_cylinder, bc_radial)?;

        let root = model.new_universe("reactor vessel", cells);
        Ok(BuiltCore {
            root,
            core_lattice,
            radial_surface: outer_cylinder,
            bottom_surface: plate_bottom,
            top_surface: plate_top,
        })
    }
}

/// Looks up a registered material, reporting the requesting context on
/// failure. Never defaults.
fn lookup_material(model: &Model, key: &str, context: &str) -> Result<MaterialKey> {
    model.material_by_key(key).ok_or_else(|| {
        LookupError::Material {
            key: key.to_owned(),
            context: context.to_owned(),
        }
        .into()
    })
}

/// Resolves a pin-ring material key with assembly/insert name suffixes.
///
/// Decks may shadow a material per assembly or per insert by appending
/// the assembly or insert name to the key; the most specific match wins.
fn resolve_material(
    model: &Model,
    key: &str,
    assembly_name: &str,
    insert_name: &str,
) -> Result<MaterialKey> {
    for suffix in [
        format!("{assembly_name}{insert_name}"),
        assembly_name.to_owned(),
        insert_name.to_owned(),
    ] {
        if suffix.is_empty() {
            continue;
        }
        if let Some(found) = model.material_by_key(&format!("{key}{suffix}")) {
            return Ok(found);
        }
    }
    lookup_material(model, key, &format!("assembly {assembly_name}"))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::input::{
        BaffleRecord, BoundaryRecord, CoreRecord, FractionBasis, GridRecord, MaterialRecord,
        NuclideFraction, PadRecord, PinRecord, PlateRecord,
    };
    use crate::math::Point3;
    use crate::model::{SurfaceKind, UniverseKind};

    fn material_record(key: &str, density: f64) -> MaterialRecord {
        MaterialRecord {
            key: key.to_owned(),
            density,
            fractions: vec![NuclideFraction {
                nuclide: "H1".to_owned(),
                fraction: 1.0,
                basis: FractionBasis::Weight,
            }],
        }
    }

    fn small_case() -> CaseRecord {
        let npins = 2;
        let pin = PinRecord {
            key: "1".to_owned(),
            name: "fuel".to_owned(),
            radii: vec![0.45, 0.48],
            materials: vec!["uo2".to_owned(), "zirc".to_owned()],
        };
        let mut key_maps = HashMap::new();
        key_maps.insert("L1".to_owned(), vec!["1".to_owned(); npins * npins]);

        let mut grids = HashMap::new();
        grids.insert(
            "g1".to_owned(),
            GridRecord {
                key: "g1".to_owned(),
                height: 3.866,
                mass: 10.0,
                material: "inconel".to_owned(),
            },
        );

        let assembly = AssemblyRecord {
            key: "a1".to_owned(),
            name: "assy-1".to_owned(),
            pitch: 1.26,
            npins,
            cells: vec![pin],
            axial_labels: vec!["L1".to_owned()],
            key_maps,
            axial_elevations: vec![0.0, 300.0],
            grids,
            grid_map: vec!["g1".to_owned(), "g1".to_owned()],
            grid_elevations: vec![50.0, 250.0],
            lower_nozzle: None,
            upper_nozzle: None,
        };
        let mut assemblies = HashMap::new();
        assemblies.insert("a1".to_owned(), assembly);

        let shape = vec![
            vec![false, true, false],
            vec![true, true, true],
            vec![false, true, false],
        ];
        let assembly_map = shape
            .iter()
            .map(|row| {
                row.iter()
                    .map(|&occ| occ.then(|| "a1".to_owned()))
                    .collect()
            })
            .collect();

        CaseRecord {
            case_id: "small".to_owned(),
            materials: vec![
                material_record("mod", 0.74),
                material_record("uo2", 10.2),
                material_record("zirc", 6.56),
                material_record("inconel", 6.55),
                material_record("ss", 8.0),
            ],
            assemblies,
            core: CoreRecord {
                pitch: 2.52,
                height: 300.0,
                shape,
                assembly_map,
                vessel_radii: vec![5.0, 6.0, 7.0],
                vessel_materials: vec!["mod".to_owned(), "mod".to_owned(), "ss".to_owned()],
                baffle: Some(BaffleRecord {
                    material: "ss".to_owned(),
                    gap: 0.19,
                    thickness: 0.25,
                }),
                pads: None,
                lower_plate: PlateRecord {
                    material: "ss".to_owned(),
                    thickness: 5.0,
                },
                upper_plate: PlateRecord {
                    material: "ss".to_owned(),
                    thickness: 5.0,
                },
                boundary: BoundaryRecord {
                    bottom: "vacuum".to_owned(),
                    top: "vacuum".to_owned(),
                    radial: "reflective".to_owned(),
                },
            },
        }
    }

    #[test]
    fn builds_a_complete_small_core() {
        let case = small_case();
        let mut model = Model::new();
        let built = CoreComposer::new(&case).build(&mut model).unwrap();

        // Root holds: ring 1, ring 2, two plates, baffle, core cell.
        let root = model.store.universe(built.root).unwrap();
        let UniverseKind::Cells(cells) = &root.kind else {
            panic!("expected cell universe");
        };
        assert_eq!(cells.len(), 6);

        // Boundary conditions landed on the outermost surfaces.
        let radial = model.store.surface(built.radial_surface).unwrap();
        assert_eq!(radial.boundary, BoundaryType::Reflective);
        assert!(matches!(radial.kind, SurfaceKind::ZCylinder { r } if (r - 7.0).abs() < 1e-12));
        let bottom = model.store.surface(built.bottom_surface).unwrap();
        assert_eq!(bottom.boundary, BoundaryType::Vacuum);
    }

    #[test]
    fn one_design_many_locations_builds_once() {
        let case = small_case();
        let mut model = Model::new();
        let mut composer = CoreComposer::new(&case);
        let built = composer.build(&mut model).unwrap();

        // Five occupied locations share one assembly universe.
        let lattice = model.store.universe(built.core_lattice).unwrap();
        let UniverseKind::Lattice(data) = &lattice.kind else {
            panic!("expected lattice");
        };
        let occupied: Vec<_> = (0..9usize)
            .filter(|&k| case.core.shape[k / 3][k % 3])
            .map(|k| data.universes[k])
            .collect();
        assert_eq!(occupied.len(), 5);
        assert!(occupied.windows(2).all(|w| w[0] == w[1]));

        // Requesting the assembly again returns the identical object and
        // creates nothing new.
        let surfaces = model.store.surface_count();
        let cells = model.store.cell_count();
        let again = composer.built_assembly(&mut model, "a1").unwrap();
        assert_eq!(again.universe, occupied[0]);
        assert_eq!(model.store.surface_count(), surfaces);
        assert_eq!(model.store.cell_count(), cells);
    }

    #[test]
    fn root_cells_tile_the_vessel() {
        let case = small_case();
        let mut model = Model::new();
        let built = CoreComposer::new(&case).build(&mut model).unwrap();

        // Dense-ish sampling at several heights: every point within the
        // vessel volume lies in exactly one root cell.
        for &z in &[-2.0, 10.0, 150.0, 299.9, 302.0] {
            let steps = 29;
            for jy in 0..steps {
                for ix in 0..steps {
                    let x = -6.9 + 13.8 * f64::from(ix) / f64::from(steps - 1);
                    let y = -6.9 + 13.8 * f64::from(jy) / f64::from(steps - 1);
                    if x.hypot(y) >= 6.99 {
                        continue;
                    }
                    let claimed = model
                        .cells_claiming(built.root, &Point3::new(x, y, z))
                        .unwrap();
                    assert_eq!(claimed.len(), 1, "point ({x}, {y}, {z})");
                }
            }
        }
    }

    #[test]
    fn pads_replace_their_ring_cell() {
        let mut case = small_case();
        case.core.pads = Some(PadRecord {
            material: "ss".to_owned(),
            ring: 1,
            count: 4,
            arc_length: 32.0,
            start_angle: 45.0,
        });
        let mut model = Model::new();
        let built = CoreComposer::new(&case).build(&mut model).unwrap();

        let root = model.store.universe(built.root).unwrap();
        let UniverseKind::Cells(cells) = &root.kind else {
            panic!("expected cell universe");
        };
        // Ring 1 became 8 pad/gap cells: 8 + ring 2 + 2 plates + baffle
        // + core cell.
        assert_eq!(cells.len(), 13);
    }

    #[test]
    fn bad_pad_ring_is_rejected() {
        let mut case = small_case();
        case.core.pads = Some(PadRecord {
            material: "ss".to_owned(),
            ring: 0,
            count: 4,
            arc_length: 32.0,
            start_angle: 45.0,
        });
        let mut model = Model::new();
        assert!(CoreComposer::new(&case).build(&mut model).is_err());
    }

    #[test]
    fn missing_material_reports_context() {
        let mut case = small_case();
        case.materials.retain(|m| m.key != "inconel");
        let mut model = Model::new();
        let err = CoreComposer::new(&case).build(&mut model).err();
        let message = format!("{}", err.unwrap());
        assert!(
            message.contains("inconel") && message.contains("g1"),
            "{message}"
        );
    }

    #[test]
    fn suffixed_material_shadows_the_bare_key() {
        let mut case = small_case();
        // A material specific to this assembly's name shadows "uo2".
        case.materials.push(material_record("uo2assy-1", 10.5));
        let mut model = Model::new();
        let mut composer = CoreComposer::new(&case);
        composer.build(&mut model).unwrap();

        let shadowed = resolve_material(&model, "uo2", "assy-1", "").unwrap();
        let bare = model.material_by_key("uo2assy-1").unwrap();
        assert_eq!(shadowed, bare);
    }
}
