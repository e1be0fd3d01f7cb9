use thiserror::Error;

/// Top-level error type for the veracore model builder.
#[derive(Debug, Error)]
pub enum VeracoreError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Lookup(#[from] LookupError),

    #[error(transparent)]
    Geometry(#[from] GeometryError),
}

/// Errors in the case description itself: missing or inconsistent input.
///
/// Detected as early as possible and aggregated per object where feasible,
/// so a user can fix a whole batch of problems in one pass.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{object}: missing required fields: {}", .fields.join(", "))]
    MissingFields {
        object: String,
        fields: Vec<String>,
    },

    #[error("{object}: {left_name} has {left} entries, {right_name} requires {right}")]
    LengthMismatch {
        object: String,
        left_name: &'static str,
        left: usize,
        right_name: &'static str,
        right: usize,
    },

    #[error("spacer grid {key}: strap mass {mass} g does not fit in pitch {pitch} cm \
             (negative discriminant in the thickness solve)")]
    GridThicknessUnsolvable { key: String, mass: f64, pitch: f64 },

    #[error("spacer grid {key}: grid interval extends outside the lattice stack")]
    GridOutsideStack { key: String },

    #[error("invalid boundary condition {0:?}; expected transmission, vacuum, or reflective")]
    InvalidBoundary(String),

    #[error("neutron pads: {count} pads of {arc} degrees exceed a full circle")]
    PadArcOverflow { count: u32, arc: f64 },

    #[error("neutron pads: ring index {0} is not an annular vessel ring")]
    PadRing(usize),

    #[error("material {key}: atomic fractions must be converted to weight fractions upstream")]
    AtomicFraction { key: String },
}

/// A requested key was not present in the case's dictionaries.
///
/// Always reported with the offending key and the context in which it was
/// requested; fatal for that object's construction, never defaulted.
#[derive(Debug, Error)]
pub enum LookupError {
    #[error("material {key:?} not found (requested by {context})")]
    Material { key: String, context: String },

    #[error("pin cell {key:?} not found in assembly {assembly}")]
    PinCell { key: String, assembly: String },

    #[error("spacer grid {key:?} not found in assembly {assembly}")]
    SpacerGrid { key: String, assembly: String },

    #[error("assembly {key:?} not found in the core map")]
    Assembly { key: String },

    #[error("entity not found in the model store: {0}")]
    Entity(&'static str),
}

/// Degenerate geometric input that survived record validation.
#[derive(Debug, Error)]
pub enum GeometryError {
    #[error("{context}: pitch must be positive, got {value}")]
    NonPositivePitch { context: String, value: f64 },

    #[error("{context}: ring radii must be positive and strictly ascending")]
    NonAscendingRadii { context: String },
}

/// Convenience type alias for results using [`VeracoreError`].
pub type Result<T> = std::result::Result<T, VeracoreError>;
