use crate::error::ConfigError;
use crate::math::Point3;

slotmap::new_key_type! {
    /// Unique identifier for a surface in the model store.
    pub struct SurfaceKey;
}

/// A typed half-space boundary.
///
/// The axis-aligned kinds carry a single coefficient and are deduplicated
/// through the surface registry. The general `Plane` (used only for the
/// neutron-pad wedges) is created directly and never looked up by value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SurfaceKind {
    /// Plane normal to the x-axis at `x0`.
    XPlane { x0: f64 },
    /// Plane normal to the y-axis at `y0`.
    YPlane { y0: f64 },
    /// Plane normal to the z-axis at `z0`.
    ZPlane { z0: f64 },
    /// Infinite cylinder about the z-axis through the origin, radius `r`.
    ZCylinder { r: f64 },
    /// General plane `a*x + b*y + c*z = d`.
    Plane { a: f64, b: f64, c: f64, d: f64 },
}

impl SurfaceKind {
    /// Signed evaluation of the surface equation at `point`.
    ///
    /// Negative means the point lies on the "inside" (negative) half-space:
    /// below the plane coefficient, or within the cylinder radius.
    #[must_use]
    pub fn evaluate(&self, point: &Point3) -> f64 {
        match *self {
            Self::XPlane { x0 } => point.x - x0,
            Self::YPlane { y0 } => point.y - y0,
            Self::ZPlane { z0 } => point.z - z0,
            Self::ZCylinder { r } => point.x.hypot(point.y) - r,
            Self::Plane { a, b, c, d } => a * point.x + b * point.y + c * point.z - d,
        }
    }
}

/// Boundary condition applied at the outermost extent of the model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BoundaryType {
    /// Interior surface; particles stream through.
    #[default]
    Transmission,
    /// Particles are lost at the boundary.
    Vacuum,
    /// Particles are mirrored at the boundary.
    Reflective,
}

impl BoundaryType {
    /// Parses a VERA boundary-condition string.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidBoundary`] for anything other than
    /// `transmission`, `vacuum`, or `reflective` (any case).
    pub fn parse(s: &str) -> Result<Self, ConfigError> {
        match s.to_ascii_lowercase().as_str() {
            "transmission" => Ok(Self::Transmission),
            "vacuum" => Ok(Self::Vacuum),
            "reflective" | "reflecting" => Ok(Self::Reflective),
            _ => Err(ConfigError::InvalidBoundary(s.to_owned())),
        }
    }
}

/// Data associated with a surface.
///
/// Immutable once created, except for the boundary-condition tag applied
/// to the outermost surfaces after the model is assembled.
#[derive(Debug, Clone)]
pub struct SurfaceData {
    /// Engine-facing integer id.
    pub id: u32,
    pub kind: SurfaceKind,
    pub boundary: BoundaryType,
}

impl SurfaceData {
    #[must_use]
    pub fn new(id: u32, kind: SurfaceKind) -> Self {
        Self {
            id,
            kind,
            boundary: BoundaryType::Transmission,
        }
    }
}
