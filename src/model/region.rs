use crate::math::Point3;
use crate::model::surface::SurfaceKey;
use crate::model::ModelStore;

/// A boolean expression over surface half-spaces.
///
/// Regions are immutable value trees built by composition; sub-expressions
/// may be shared by cloning. Equivalent regions built via different
/// operator orders evaluate to the same point-set.
#[derive(Debug, Clone, PartialEq)]
pub enum Region {
    /// The negative half-space of a surface (below a plane coefficient,
    /// within a cylinder radius).
    Inside(SurfaceKey),
    /// The positive half-space of a surface.
    Outside(SurfaceKey),
    /// Intersection of all operands.
    Intersection(Vec<Region>),
    /// Union of all operands.
    Union(Vec<Region>),
    /// Set complement of the operand.
    Complement(Box<Region>),
}

impl Region {
    #[must_use]
    pub fn inside(surface: SurfaceKey) -> Self {
        Self::Inside(surface)
    }

    #[must_use]
    pub fn outside(surface: SurfaceKey) -> Self {
        Self::Outside(surface)
    }

    /// Intersection of all `regions`.
    #[must_use]
    pub fn all_of<I: IntoIterator<Item = Region>>(regions: I) -> Self {
        Self::Intersection(regions.into_iter().collect())
    }

    /// Union of all `regions`.
    #[must_use]
    pub fn any_of<I: IntoIterator<Item = Region>>(regions: I) -> Self {
        Self::Union(regions.into_iter().collect())
    }

    #[must_use]
    pub fn complement(region: Region) -> Self {
        Self::Complement(Box::new(region))
    }

    /// Narrows this region by intersecting with `other`.
    #[must_use]
    pub fn and(self, other: Region) -> Self {
        match self {
            Self::Intersection(mut nodes) => {
                nodes.push(other);
                Self::Intersection(nodes)
            }
            first => Self::Intersection(vec![first, other]),
        }
    }

    /// Widens this region by uniting with `other`.
    #[must_use]
    pub fn or(self, other: Region) -> Self {
        match self {
            Self::Union(mut nodes) => {
                nodes.push(other);
                Self::Union(nodes)
            }
            first => Self::Union(vec![first, other]),
        }
    }

    /// Whether `point` lies within this region.
    ///
    /// Points exactly on a bounding surface are resolved to the positive
    /// half-space, so two cells sharing a surface never both claim it.
    #[must_use]
    pub fn contains(&self, store: &ModelStore, point: &Point3) -> bool {
        match self {
            Self::Inside(key) => store.surface_kind(*key).evaluate(point) < 0.0,
            Self::Outside(key) => store.surface_kind(*key).evaluate(point) >= 0.0,
            Self::Intersection(nodes) => nodes.iter().all(|r| r.contains(store, point)),
            Self::Union(nodes) => nodes.iter().any(|r| r.contains(store, point)),
            Self::Complement(node) => !node.contains(store, point),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::surface::SurfaceKind;
    use crate::model::Model;

    fn p(x: f64, y: f64) -> Point3 {
        Point3::new(x, y, 0.0)
    }

    #[test]
    fn annulus_membership() {
        let mut model = Model::new();
        let inner = model.cylinder(0.3);
        let outer = model.cylinder(0.5);
        let ring = Region::inside(outer).and(Region::outside(inner));

        assert!(ring.contains(&model.store, &p(0.4, 0.0)));
        assert!(!ring.contains(&model.store, &p(0.1, 0.0)));
        assert!(!ring.contains(&model.store, &p(0.6, 0.0)));
    }

    #[test]
    fn operator_order_is_irrelevant() {
        let mut model = Model::new();
        let a = model.plane_x(-1.0);
        let b = model.plane_x(1.0);
        let c = model.plane_y(0.0);

        let left = Region::all_of([
            Region::outside(a),
            Region::inside(b),
            Region::outside(c),
        ]);
        let right = Region::outside(c).and(Region::all_of([
            Region::inside(b),
            Region::outside(a),
        ]));

        for &(x, y) in &[(0.0, 0.5), (0.0, -0.5), (2.0, 0.5), (-0.5, 0.1)] {
            assert_eq!(
                left.contains(&model.store, &p(x, y)),
                right.contains(&model.store, &p(x, y)),
                "disagreement at ({x}, {y})"
            );
        }
    }

    #[test]
    fn complement_flips_membership() {
        let mut model = Model::new();
        let cyl = model.cylinder(1.0);
        let hole = Region::complement(Region::inside(cyl));

        assert!(!hole.contains(&model.store, &p(0.0, 0.0)));
        assert!(hole.contains(&model.store, &p(2.0, 0.0)));
    }

    #[test]
    fn shared_surface_claims_one_side() {
        let mut model = Model::new();
        let mid = model.plane_x(0.0);
        let west = Region::inside(mid);
        let east = Region::outside(mid);
        let on = p(0.0, 3.0);
        assert!(east.contains(&model.store, &on));
        assert!(!west.contains(&model.store, &on));
    }

    #[test]
    fn general_plane_wedge() {
        let mut model = Model::new();
        let kind = SurfaceKind::Plane {
            a: 0.0,
            b: 1.0,
            c: 0.0,
            d: 0.0,
        };
        let s = model.general_plane(kind);
        assert!(Region::outside(s).contains(&model.store, &p(0.0, 1.0)));
        assert!(Region::inside(s).contains(&model.store, &p(0.0, -1.0)));
    }
}
