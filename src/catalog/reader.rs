//! Catalog readers — the seam between the model-data loader and the on-disk
//! galaxy catalog format.
//!
//! A reader returns, for one file and one snapshot, a map from field name to
//! an `n_galaxies × k` array: scalar properties have `k = 1`, star-formation
//! histories have one column per age bin (most recent first).
use crate::catalog::errors::{DataError, DataResult};
use ndarray::{Array1, Array2, Axis};
use std::{collections::HashMap, path::Path};

/// Field name → per-galaxy column(s).
pub type Columns = HashMap<String, Array2<f64>>;

/// Reads named fields of one snapshot from one catalog file.
pub trait CatalogReader: Send + Sync {
    /// Read `fields` of `snapshot` from the file at `path`.
    ///
    /// Errors
    /// ------
    /// - `DataError::Io` / `DataError::Hdf5` when the file cannot be read.
    /// - `DataError::MissingField` when a field is absent.
    fn read_snapshot(&self, path: &Path, snapshot: u32, fields: &[&str]) -> DataResult<Columns>;
}

/// HDF5 group holding a snapshot's datasets.
pub fn snapshot_group(snapshot: u32) -> String {
    format!("Snap_{snapshot}")
}

/// Wrap a per-galaxy vector as an `n × 1` column.
pub fn scalar_column(values: Vec<f64>) -> Array2<f64> {
    Array1::from(values).insert_axis(Axis(1))
}

/// In-memory catalog keyed by file name and snapshot.
///
/// The model directory still has to contain the `model_<index>.hdf5` files
/// (their content is ignored); only the file name is used as the key.
#[derive(Debug, Clone, Default)]
pub struct MemoryReader {
    catalogs: HashMap<(String, u32), Columns>,
}

impl MemoryReader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the columns of `snapshot` for the file named `file_name`.
    pub fn insert(&mut self, file_name: impl Into<String>, snapshot: u32, columns: Columns) {
        self.catalogs.insert((file_name.into(), snapshot), columns);
    }

    /// Register scalar-only columns.
    pub fn insert_scalars(
        &mut self, file_name: impl Into<String>, snapshot: u32, fields: Vec<(&str, Vec<f64>)>,
    ) {
        let columns =
            fields.into_iter().map(|(name, values)| (name.to_string(), scalar_column(values)));
        self.insert(file_name, snapshot, columns.collect());
    }
}

impl CatalogReader for MemoryReader {
    fn read_snapshot(&self, path: &Path, snapshot: u32, fields: &[&str]) -> DataResult<Columns> {
        let file_name =
            path.file_name().map(|n| n.to_string_lossy().into_owned()).unwrap_or_default();
        let catalog = self.catalogs.get(&(file_name, snapshot)).ok_or_else(|| DataError::Io {
            path: path.display().to_string(),
            message: format!("no in-memory catalog for {}", snapshot_group(snapshot)),
        })?;

        let mut out = Columns::with_capacity(fields.len());
        for &field in fields {
            let column = catalog.get(field).ok_or_else(|| DataError::MissingField {
                path: path.display().to_string(),
                field: field.to_string(),
            })?;
            out.insert(field.to_string(), column.clone());
        }
        Ok(out)
    }
}

/// HDF5 reader for `model_<index>.hdf5` files with one group per snapshot
/// (`Snap_<N>`) and one dataset per field.
#[cfg(feature = "hdf5")]
#[derive(Debug, Clone, Copy, Default)]
pub struct Hdf5Reader;

#[cfg(feature = "hdf5")]
impl CatalogReader for Hdf5Reader {
    fn read_snapshot(&self, path: &Path, snapshot: u32, fields: &[&str]) -> DataResult<Columns> {
        use ndarray::{Ix1, Ix2};

        let hdf5_err = |e: hdf5::Error| DataError::Hdf5 {
            path: path.display().to_string(),
            message: e.to_string(),
        };
        let file = hdf5::File::open(path).map_err(hdf5_err)?;
        let group = file.group(&snapshot_group(snapshot)).map_err(hdf5_err)?;

        let mut out = Columns::with_capacity(fields.len());
        for &field in fields {
            let dataset = group.dataset(field).map_err(|_| DataError::MissingField {
                path: path.display().to_string(),
                field: field.to_string(),
            })?;
            let raw = dataset.read_dyn::<f64>().map_err(hdf5_err)?;
            let column = match raw.ndim() {
                1 => raw.into_dimensionality::<Ix1>().map(|a| a.insert_axis(Axis(1))),
                _ => raw.into_dimensionality::<Ix2>(),
            }
            .map_err(|e| DataError::ShapeMismatch {
                field: field.to_string(),
                message: e.to_string(),
            })?;
            out.insert(field.to_string(), column);
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    // Purpose
    // -------
    // The in-memory reader returns exactly the requested fields and reports
    // missing fields and unknown files.
    fn memory_reader_serves_requested_fields() {
        let mut reader = MemoryReader::new();
        reader.insert_scalars(
            "model_0.hdf5",
            63,
            vec![("StellarMass", vec![1.0, 2.0]), ("Mvir", vec![10.0, 20.0])],
        );
        let path = Path::new("/tmp/run/model_0.hdf5");

        let cols = reader.read_snapshot(path, 63, &["StellarMass"]).unwrap();
        assert_eq!(cols.len(), 1);
        assert_eq!(cols["StellarMass"].dim(), (2, 1));

        let err = reader.read_snapshot(path, 63, &["BulgeMass"]).unwrap_err();
        assert!(matches!(err, DataError::MissingField { .. }));

        let err = reader.read_snapshot(path, 40, &["StellarMass"]).unwrap_err();
        assert!(err.is_io());
    }
}
