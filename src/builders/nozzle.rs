use crate::error::Result;
use crate::model::{MaterialKey, Model};

/// A nozzle: a smeared material block capping one end of an assembly.
#[derive(Debug, Clone)]
pub struct Nozzle {
    pub name: String,
    /// Axial height of the block (cm).
    pub height: f64,
    /// The smeared nozzle/moderator mixture.
    pub material: MaterialKey,
}

/// Smears a nozzle's structural mass with moderator over the assembly
/// footprint `(npins * pitch)^2 * height`, producing a single
/// effective-density material.
///
/// The mixture is cached by name, so every assembly sharing a nozzle
/// design shares one material.
pub struct NozzleBuilder<'a> {
    name: &'a str,
    height: f64,
    mass: f64,
    structural: MaterialKey,
    moderator: MaterialKey,
    npins: usize,
    pitch: f64,
}

impl<'a> NozzleBuilder<'a> {
    #[must_use]
    pub fn new(
        name: &'a str,
        height: f64,
        mass: f64,
        structural: MaterialKey,
        moderator: MaterialKey,
        npins: usize,
        pitch: f64,
    ) -> Self {
        Self {
            name,
            height,
            mass,
            structural,
            moderator,
            npins,
            pitch,
        }
    }

    /// Executes the operation, creating the smeared material.
    ///
    /// # Errors
    ///
    /// Returns an error if a material lookup fails.
    pub fn execute(&self, model: &mut Model) -> Result<Nozzle> {
        #[allow(clippy::cast_precision_loss)]
        let footprint = self.npins as f64 * self.pitch;
        let volume = footprint * footprint * self.height;
        let structural_volume = self.mass / model.store.material(self.structural)?.density;
        let moderator_volume = volume - structural_volume;

        let material = model.add_mixture(
            self.name,
            &[
                (self.structural, structural_volume / volume),
                (self.moderator, moderator_volume / volume),
            ],
        )?;
        Ok(Nozzle {
            name: self.name.to_owned(),
            height: self.height,
            material,
        })
    }
}
