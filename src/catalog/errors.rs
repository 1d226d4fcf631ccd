//! Errors for loading model catalogs, scale-factor lists and observation
//! tables.
//!
//! ## Conventions
//! - Paths are carried as display strings so the error stays `Clone` and
//!   comparable in tests.
//! - Line numbers in table errors are 1-based, matching what an editor shows.
use crate::{binning::BinningError, cosmology::CosmologyError};
use std::path::Path;

/// Result alias for data-loading paths that may produce [`DataError`].
pub type DataResult<T> = Result<T, DataError>;

/// Unified error type for model and observation data loading.
///
/// Model-data failures are fatal for an evaluation. Some observation
/// loaders catch [`DataError::Io`] and substitute fallback tables.
#[derive(Debug, Clone, PartialEq)]
pub enum DataError {
    // ---- Filesystem ----
    /// A file or directory could not be read.
    Io { path: String, message: String },

    /// No `model_<index>.hdf5` files in the model directory.
    NoModelFiles { dir: String },

    /// HDF5 backend failure.
    Hdf5 { path: String, message: String },

    // ---- Catalog structure ----
    /// A requested field is missing from a catalog file.
    MissingField { path: String, field: String },

    /// Field length disagrees with the galaxy count.
    LengthMismatch { field: String, expected: usize, actual: usize },

    /// Arrays could not be combined (e.g. differing history lengths).
    ShapeMismatch { field: String, message: String },

    // ---- Tables ----
    /// A table line could not be parsed.
    MalformedTable { path: String, line: usize, reason: String },

    /// A requested column index does not exist on some row.
    MissingColumn { path: String, line: usize, column: usize, available: usize },

    /// A table holds no data rows.
    EmptyTable { path: String },

    /// A snapshot number is beyond the scale-factor list.
    SnapshotOutOfRange { snapshot: u32, len: usize },

    /// No snapshot was requested.
    NoSnapshots,

    // ---- Wrapped numeric errors ----
    Cosmology(CosmologyError),
    Binning(BinningError),
}

impl DataError {
    pub(crate) fn io(path: &Path, err: &std::io::Error) -> Self {
        DataError::Io { path: path.display().to_string(), message: err.to_string() }
    }

    /// True for failures caused by a missing or unreadable file.
    pub fn is_io(&self) -> bool {
        matches!(self, DataError::Io { .. })
    }
}

impl std::error::Error for DataError {}

impl std::fmt::Display for DataError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DataError::Io { path, message } => write!(f, "Cannot read {path}: {message}"),
            DataError::NoModelFiles { dir } => {
                write!(f, "No model_<index>.hdf5 files found in {dir}")
            }
            DataError::Hdf5 { path, message } => write!(f, "HDF5 error in {path}: {message}"),
            DataError::MissingField { path, field } => {
                write!(f, "Field {field} missing from {path}")
            }
            DataError::LengthMismatch { field, expected, actual } => {
                write!(f, "Field {field} has {actual} entries; expected {expected}")
            }
            DataError::ShapeMismatch { field, message } => {
                write!(f, "Cannot combine field {field}: {message}")
            }
            DataError::MalformedTable { path, line, reason } => {
                write!(f, "Malformed table {path} at line {line}: {reason}")
            }
            DataError::MissingColumn { path, line, column, available } => write!(
                f,
                "Table {path} line {line} has {available} columns; column {column} requested"
            ),
            DataError::EmptyTable { path } => write!(f, "Table {path} holds no data rows"),
            DataError::SnapshotOutOfRange { snapshot, len } => {
                write!(f, "Snapshot {snapshot} is beyond the scale-factor list (length {len})")
            }
            DataError::NoSnapshots => write!(f, "No snapshot requested"),
            DataError::Cosmology(err) => write!(f, "{err}"),
            DataError::Binning(err) => write!(f, "{err}"),
        }
    }
}

impl From<CosmologyError> for DataError {
    fn from(err: CosmologyError) -> Self {
        DataError::Cosmology(err)
    }
}

impl From<BinningError> for DataError {
    fn from(err: BinningError) -> Self {
        DataError::Binning(err)
    }
}
