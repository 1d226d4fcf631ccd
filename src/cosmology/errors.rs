//! Errors for FRW distance / time conversions.

/// Result alias for cosmology conversions.
pub type CosmologyResult<T> = Result<T, CosmologyError>;

/// Error type for cosmology conversions.
///
/// These are numeric-domain failures; they are not expected for standard
/// ΛCDM parameters and are propagated to the caller unchanged.
#[derive(Debug, Clone, PartialEq)]
pub enum CosmologyError {
    /// Redshift must be finite and ≥ 0.
    InvalidRedshift { z: f64 },

    /// A cosmological parameter is non-finite or out of range.
    InvalidParameter { name: &'static str, value: f64 },

    /// Scale factors must be finite and > 0.
    InvalidScaleFactor { index: usize, value: f64 },

    /// E²(z) = Ωm(1+z)³ + Ωk(1+z)² + ΩΛ must stay > 0 along the integral.
    NonPhysicalExpansion { z: f64, e2: f64 },

    /// Adaptive quadrature hit its depth limit on the given sub-interval.
    QuadratureDidNotConverge { a: f64, b: f64 },
}

impl std::error::Error for CosmologyError {}

impl std::fmt::Display for CosmologyError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CosmologyError::InvalidRedshift { z } => {
                write!(f, "Redshift must be finite and >= 0; got: {z}")
            }
            CosmologyError::InvalidParameter { name, value } => {
                write!(f, "Cosmological parameter {name} is invalid: {value}")
            }
            CosmologyError::InvalidScaleFactor { index, value } => {
                write!(f, "Scale factor at index {index} must be finite and > 0; got: {value}")
            }
            CosmologyError::NonPhysicalExpansion { z, e2 } => {
                write!(f, "Non-physical expansion history: E^2({z}) = {e2} <= 0")
            }
            CosmologyError::QuadratureDidNotConverge { a, b } => {
                write!(f, "Quadrature did not converge on [{a}, {b}]")
            }
        }
    }
}
