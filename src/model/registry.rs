use std::collections::HashMap;

use crate::math::canonical_coeff;
use crate::model::counter::IdAllocator;
use crate::model::surface::{SurfaceData, SurfaceKey, SurfaceKind};
use crate::model::ModelStore;

/// The four deduplicated surface namespaces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SurfaceClass {
    XPlane,
    YPlane,
    ZPlane,
    ZCylinder,
}

impl SurfaceClass {
    fn kind(self, coefficient: f64) -> SurfaceKind {
        match self {
            Self::XPlane => SurfaceKind::XPlane { x0: coefficient },
            Self::YPlane => SurfaceKind::YPlane { y0: coefficient },
            Self::ZPlane => SurfaceKind::ZPlane { z0: coefficient },
            Self::ZCylinder => SurfaceKind::ZCylinder { r: coefficient },
        }
    }
}

/// Canonicalizes single-coefficient surfaces within four namespaces.
///
/// Two requests whose coefficients round to the same key anywhere in the
/// build return the identical surface, regardless of call order or caller;
/// this is what keeps the surface count linear in distinct coordinates
/// rather than in pin count, and what makes ring boundaries shared by
/// neighboring assemblies resolve to the same surface pair.
#[derive(Debug, Default)]
pub struct SurfaceRegistry {
    digits: u32,
    xplanes: HashMap<i64, SurfaceKey>,
    yplanes: HashMap<i64, SurfaceKey>,
    zplanes: HashMap<i64, SurfaceKey>,
    cylinders: HashMap<i64, SurfaceKey>,
}

impl SurfaceRegistry {
    #[must_use]
    pub fn new(digits: u32) -> Self {
        Self {
            digits,
            ..Self::default()
        }
    }

    /// Returns the registered surface for `(class, coefficient)`, creating
    /// and registering it (with a fresh id) on first request.
    pub fn get_or_create(
        &mut self,
        store: &mut ModelStore,
        ids: &mut IdAllocator,
        class: SurfaceClass,
        coefficient: f64,
    ) -> SurfaceKey {
        let key = canonical_coeff(coefficient, self.digits);
        let namespace = match class {
            SurfaceClass::XPlane => &mut self.xplanes,
            SurfaceClass::YPlane => &mut self.yplanes,
            SurfaceClass::ZPlane => &mut self.zplanes,
            SurfaceClass::ZCylinder => &mut self.cylinders,
        };
        if let Some(&existing) = namespace.get(&key) {
            return existing;
        }
        let surface = store.add_surface(SurfaceData::new(
            ids.next_surface(),
            class.kind(coefficient),
        ));
        namespace.insert(key, surface);
        surface
    }

    /// Total number of registered surfaces across all namespaces.
    #[must_use]
    pub fn len(&self) -> usize {
        self.xplanes.len() + self.yplanes.len() + self.zplanes.len() + self.cylinders.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::COEFF_DIGITS;

    fn registry() -> (ModelStore, IdAllocator, SurfaceRegistry) {
        (
            ModelStore::new(),
            IdAllocator::new(),
            SurfaceRegistry::new(COEFF_DIGITS),
        )
    }

    #[test]
    fn dedup_within_tolerance() {
        let (mut store, mut ids, mut reg) = registry();
        let a = reg.get_or_create(&mut store, &mut ids, SurfaceClass::XPlane, 0.475);
        let b = reg.get_or_create(&mut store, &mut ids, SurfaceClass::XPlane, 0.475_000_4);
        let c = reg.get_or_create(&mut store, &mut ids, SurfaceClass::XPlane, 0.474_999_6);
        assert_eq!(a, b);
        assert_eq!(a, c);
        assert_eq!(reg.len(), 1);
    }

    #[test]
    fn distinct_beyond_tolerance() {
        let (mut store, mut ids, mut reg) = registry();
        let a = reg.get_or_create(&mut store, &mut ids, SurfaceClass::ZCylinder, 0.475);
        let b = reg.get_or_create(&mut store, &mut ids, SurfaceClass::ZCylinder, 0.475_02);
        assert_ne!(a, b);
        assert_eq!(reg.len(), 2);
    }

    #[test]
    fn namespaces_do_not_collide() {
        let (mut store, mut ids, mut reg) = registry();
        let x = reg.get_or_create(&mut store, &mut ids, SurfaceClass::XPlane, 1.26);
        let y = reg.get_or_create(&mut store, &mut ids, SurfaceClass::YPlane, 1.26);
        let r = reg.get_or_create(&mut store, &mut ids, SurfaceClass::ZCylinder, 1.26);
        assert_ne!(x, y);
        assert_ne!(y, r);
        assert_eq!(reg.len(), 3);
    }

    #[test]
    fn signed_zero_resolves_to_one_surface() {
        let (mut store, mut ids, mut reg) = registry();
        let pos = reg.get_or_create(&mut store, &mut ids, SurfaceClass::XPlane, 0.0);
        let neg = reg.get_or_create(&mut store, &mut ids, SurfaceClass::XPlane, -0.0);
        let tiny = reg.get_or_create(&mut store, &mut ids, SurfaceClass::XPlane, -1e-9);
        assert_eq!(pos, neg);
        assert_eq!(pos, tiny);
        assert_eq!(reg.len(), 1);
    }

    #[test]
    fn call_order_is_irrelevant() {
        let (mut store_a, mut ids_a, mut reg_a) = registry();
        let first = reg_a.get_or_create(&mut store_a, &mut ids_a, SurfaceClass::YPlane, 2.5);
        reg_a.get_or_create(&mut store_a, &mut ids_a, SurfaceClass::YPlane, -2.5);
        let again = reg_a.get_or_create(&mut store_a, &mut ids_a, SurfaceClass::YPlane, 2.5);
        assert_eq!(first, again);
    }
}
