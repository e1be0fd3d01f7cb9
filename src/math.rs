/// 2D point type.
pub type Point2 = nalgebra::Point2<f64>;

/// 3D point type.
pub type Point3 = nalgebra::Point3<f64>;

/// 2D vector type.
pub type Vector2 = nalgebra::Vector2<f64>;

/// 3D vector type.
pub type Vector3 = nalgebra::Vector3<f64>;

/// Global geometric tolerance for floating-point comparisons.
pub const TOLERANCE: f64 = 1e-10;

/// Number of decimal digits to which surface coefficients are rounded
/// when deciding whether two surfaces are the same.
pub const COEFF_DIGITS: u32 = 5;

/// Canonical integer key for a surface coefficient, rounded to `digits`
/// decimal places.
///
/// Coefficients that agree to `digits` places map to the same key. The
/// integer conversion collapses `-0.0` and `+0.0` (and values within half
/// an ulp of the rounding grid on either side of zero) into a single
/// bucket, so mirrored geometry straddling an axis always resolves to one
/// surface.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
pub fn canonical_coeff(value: f64, digits: u32) -> i64 {
    (value * 10f64.powi(digits as i32)).round() as i64
}
