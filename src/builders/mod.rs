pub mod assembly;
pub mod baffle;
pub mod core;
pub mod lattice;
pub mod neutron_pads;
pub mod nozzle;
pub mod pincell;
pub mod spacergrid;

pub use assembly::{AssemblyBuilder, BuiltAssembly};
pub use baffle::BaffleBuilder;
pub use core::{BuiltCore, CoreComposer};
pub use lattice::{GridLattice, LatticeBuilder};
pub use neutron_pads::NeutronPads;
pub use nozzle::{Nozzle, NozzleBuilder};
pub use pincell::PinCell;
pub use spacergrid::{GridPin, SpacerGrid};
