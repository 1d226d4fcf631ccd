//! Errors for building and evaluating constraints.
//!
//! ## Conventions
//! - Spec-string errors carry the offending token so the message points at
//!   the exact entry to fix.
//! - Configuration errors (`MalformedSpec` through `ZeroTotalWeight`,
//!   `Config`) abort `parse`; `Data` and `EmptyModelCurve` abort a single
//!   evaluation.
use crate::{catalog::DataError, config::ConfigError};

/// Result alias for constraint construction and evaluation.
pub type ConstraintResult<T> = Result<T, ConstraintError>;

/// Unified error type for the constraint registry and evaluation.
#[derive(Debug, Clone, PartialEq)]
pub enum ConstraintError {
    // ---- Spec parsing ----
    /// A token does not match `NAME[(LOW-HIGH)][*WEIGHT]`.
    MalformedSpec { token: String },

    /// The name is not in the registry.
    UnknownConstraint { name: String },

    /// A numeric field of the token could not be parsed.
    MalformedNumber { token: String, value: String },

    // ---- Domain overrides ----
    /// The override starts below the constraint's physical floor.
    DomainBelowFloor { name: String, low: f64, floor: f64 },

    /// The override ends above the constraint's physical ceiling.
    DomainAboveCeiling { name: String, high: f64, ceiling: f64 },

    /// The override has `low > high`.
    InvertedDomain { name: String, low: f64, high: f64 },

    // ---- Weights ----
    /// Weight must be finite and ≥ 0.
    InvalidWeight { name: String, weight: f64 },

    /// Every weight in the spec is zero, so weights cannot be normalized.
    ZeroTotalWeight,

    // ---- Wrapped errors ----
    Config(ConfigError),
    Data(DataError),

    // ---- Evaluation ----
    /// The model produced no curve to interpolate (a binning with no bins
    /// or a run with no snapshots).
    EmptyModelCurve { name: String },
}

impl ConstraintError {
    /// True for errors that indicate a bad spec or configuration rather than
    /// a data-loading failure.
    pub fn is_configuration(&self) -> bool {
        !matches!(self, ConstraintError::Data(_) | ConstraintError::EmptyModelCurve { .. })
    }
}

impl std::error::Error for ConstraintError {}

impl std::fmt::Display for ConstraintError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConstraintError::MalformedSpec { token } => write!(
                f,
                "Malformed constraint {token:?}; expected NAME[(LOW-HIGH)][*WEIGHT]"
            ),
            ConstraintError::UnknownConstraint { name } => {
                write!(f, "Unknown constraint {name:?}")
            }
            ConstraintError::MalformedNumber { token, value } => {
                write!(f, "Constraint {token:?} contains an invalid number {value:?}")
            }
            ConstraintError::DomainBelowFloor { name, low, floor } => write!(
                f,
                "Lower bound {low} of {name} is below the minimum allowed value {floor}"
            ),
            ConstraintError::DomainAboveCeiling { name, high, ceiling } => write!(
                f,
                "Upper bound {high} of {name} is above the maximum allowed value {ceiling}"
            ),
            ConstraintError::InvertedDomain { name, low, high } => {
                write!(f, "Domain of {name} is inverted: {low} > {high}")
            }
            ConstraintError::InvalidWeight { name, weight } => {
                write!(f, "Weight of {name} must be finite and >= 0; got {weight}")
            }
            ConstraintError::ZeroTotalWeight => {
                write!(f, "Constraint weights sum to zero; cannot normalize")
            }
            ConstraintError::Config(err) => write!(f, "{err}"),
            ConstraintError::Data(err) => write!(f, "{err}"),
            ConstraintError::EmptyModelCurve { name } => {
                write!(f, "Model curve of {name} is empty")
            }
        }
    }
}

impl From<ConfigError> for ConstraintError {
    fn from(err: ConfigError) -> Self {
        ConstraintError::Config(err)
    }
}

impl From<DataError> for ConstraintError {
    fn from(err: DataError) -> Self {
        ConstraintError::Data(err)
    }
}

/// Convert a [`ConstraintError`] into a Python `ValueError` (configuration)
/// or `OSError` (data loading) carrying the error message.
#[cfg(feature = "python-bindings")]
impl From<ConstraintError> for pyo3::PyErr {
    fn from(err: ConstraintError) -> Self {
        use pyo3::exceptions::{PyOSError, PyValueError};

        if err.is_configuration() {
            PyValueError::new_err(err.to_string())
        } else {
            PyOSError::new_err(err.to_string())
        }
    }
}
