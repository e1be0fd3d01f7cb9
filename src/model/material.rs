slotmap::new_key_type! {
    /// Unique identifier for a material in the model store.
    pub struct MaterialKey;
}

/// One nuclide and its weight fraction within a material.
#[derive(Debug, Clone, PartialEq)]
pub struct Nuclide {
    pub name: String,
    pub weight_fraction: f64,
}

/// How a material came to be. Mixtures behave identically to directly
/// specified materials everywhere downstream; the tag only records
/// provenance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MaterialOrigin {
    Direct,
    Mixed,
}

/// A material composition: density in g/cc plus a weight-fraction
/// nuclide list summing to 1.
#[derive(Debug, Clone)]
pub struct MaterialData {
    /// Engine-facing integer id.
    pub id: u32,
    pub name: String,
    pub density: f64,
    pub nuclides: Vec<Nuclide>,
    pub origin: MaterialOrigin,
}

impl MaterialData {
    #[must_use]
    pub fn new(
        id: u32,
        name: impl Into<String>,
        density: f64,
        nuclides: Vec<Nuclide>,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            density,
            nuclides,
            origin: MaterialOrigin::Direct,
        }
    }
}

/// Volume-weighted combination of source materials.
///
/// The mixture density is `sum(rho_i * v_i) / sum(v_i)`; each nuclide's
/// weight fraction is the mass-weighted sum of its fractions in the
/// sources, normalized by the mixture density. A nuclide appearing in
/// several sources is merged into a single entry.
#[must_use]
pub fn mix(parts: &[(&MaterialData, f64)]) -> (f64, Vec<Nuclide>) {
    let total_volume: f64 = parts.iter().map(|(_, v)| v).sum();
    let density: f64 = parts
        .iter()
        .map(|(mat, v)| mat.density * (v / total_volume))
        .sum();

    let mut nuclides: Vec<Nuclide> = Vec::new();
    for (mat, v) in parts {
        // Mass of this source per unit mixture volume, over the mixture mass.
        let weight = (v / total_volume) * mat.density / density;
        for nuc in &mat.nuclides {
            let contribution = weight * nuc.weight_fraction;
            match nuclides.iter_mut().find(|n| n.name == nuc.name) {
                Some(existing) => existing.weight_fraction += contribution,
                None => nuclides.push(Nuclide {
                    name: nuc.name.clone(),
                    weight_fraction: contribution,
                }),
            }
        }
    }
    (density, nuclides)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn material(name: &str, density: f64, nuclides: &[(&str, f64)]) -> MaterialData {
        MaterialData::new(
            0,
            name,
            density,
            nuclides
                .iter()
                .map(|&(n, w)| Nuclide {
                    name: n.to_owned(),
                    weight_fraction: w,
                })
                .collect(),
        )
    }

    #[test]
    fn density_is_volume_weighted() {
        let water = material("water", 1.0, &[("H1", 0.112), ("O16", 0.888)]);
        let steel = material("steel", 7.8, &[("Fe56", 1.0)]);
        let (density, _) = mix(&[(&water, 0.25), (&steel, 0.75)]);
        assert_relative_eq!(density, 0.25 * 1.0 + 0.75 * 7.8);
    }

    #[test]
    fn fractions_sum_to_one() {
        let water = material("water", 1.0, &[("H1", 0.112), ("O16", 0.888)]);
        let steel = material("steel", 7.8, &[("Fe56", 0.9), ("Cr52", 0.1)]);
        let (_, nuclides) = mix(&[(&water, 0.5), (&steel, 0.5)]);
        let total: f64 = nuclides.iter().map(|n| n.weight_fraction).sum();
        assert_relative_eq!(total, 1.0, epsilon = 1e-12);
    }

    #[test]
    fn shared_nuclide_merges() {
        let a = material("a", 2.0, &[("Fe56", 1.0)]);
        let b = material("b", 4.0, &[("Fe56", 0.5), ("Ni58", 0.5)]);
        let (_, nuclides) = mix(&[(&a, 0.5), (&b, 0.5)]);
        assert_eq!(nuclides.len(), 2);

        let fe = nuclides
            .iter()
            .find(|n| n.name == "Fe56")
            .map(|n| n.weight_fraction)
            .unwrap_or_default();
        // 1.0 g of iron from a and 1.0 g from b per 3.0 g of mixture.
        assert_relative_eq!(fe, 2.0 / 3.0, epsilon = 1e-12);
        let total: f64 = nuclides.iter().map(|n| n.weight_fraction).sum();
        assert_relative_eq!(total, 1.0, epsilon = 1e-12);
    }
}
