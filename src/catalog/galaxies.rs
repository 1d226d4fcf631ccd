//! Columnar galaxy catalogs assembled from one or more model files.
//!
//! Key behaviors
//! -------------
//! - [`model_files`] enumerates `model_<index>.hdf5` files and sorts them
//!   by numeric index (so `model_10` follows `model_9`).
//! - [`load_catalog`] reads a single file directly or concatenates every
//!   file field by field.
//! - [`read_scale_factors`] reads the simulation's `alist` (one scale factor
//!   per snapshot, earliest first).
//!
//! Invariants & assumptions
//! ------------------------
//! - Every scalar field of a [`GalaxyCatalog`] has the same length.
//! - Star-formation histories have identical column counts across files.
//! - Catalogs are built per evaluation and never cached.
use crate::catalog::{
    errors::{DataError, DataResult},
    reader::{CatalogReader, Columns},
};
use ndarray::{Array1, Array2, Axis, concatenate};
use once_cell::sync::Lazy;
use regex::Regex;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Fields read from every model file.
pub const MODEL_FIELDS: [&str; 7] =
    ["StellarMass", "BlackHoleMass", "Len", "SfrBulge", "BulgeMass", "Mvir", "SfrDisk"];

static MODEL_FILE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^model_(\d+)\.hdf5$").expect("valid regex"));

/// GalaxyCatalog — one snapshot's galaxies in internal units.
///
/// Fields
/// ------
/// - `stellar_mass`, `black_hole_mass`, `bulge_mass`, `mvir`: 1e10 M☉/h.
/// - `len`: number of halo particles.
/// - `sfr_disk`, `sfr_bulge`: M☉/yr, one column per age bin (most recent
///   first); a single column when the catalog stores instantaneous rates.
#[derive(Debug, Clone, PartialEq)]
pub struct GalaxyCatalog {
    pub stellar_mass: Array1<f64>,
    pub black_hole_mass: Array1<f64>,
    pub bulge_mass: Array1<f64>,
    pub mvir: Array1<f64>,
    pub len: Array1<f64>,
    pub sfr_disk: Array2<f64>,
    pub sfr_bulge: Array2<f64>,
}

impl GalaxyCatalog {
    /// Build a catalog from reader output, checking that all fields agree
    /// on the galaxy count.
    ///
    /// Errors
    /// ------
    /// - `DataError::MissingField` if a [`MODEL_FIELDS`] entry is absent.
    /// - `DataError::LengthMismatch` if field lengths disagree.
    /// - `DataError::ShapeMismatch` if a history field has no columns.
    pub fn from_columns(path: &Path, mut columns: Columns) -> DataResult<Self> {
        let mut take = |field: &str| {
            columns.remove(field).ok_or_else(|| DataError::MissingField {
                path: path.display().to_string(),
                field: field.to_string(),
            })
        };
        let stellar = take("StellarMass")?;
        let n = stellar.nrows();

        let scalar = |field: &str, arr: Array2<f64>| -> DataResult<Array1<f64>> {
            if arr.nrows() != n {
                return Err(DataError::LengthMismatch {
                    field: field.to_string(),
                    expected: n,
                    actual: arr.nrows(),
                });
            }
            Ok(arr.column(0).to_owned())
        };
        let history = |field: &str, arr: Array2<f64>| -> DataResult<Array2<f64>> {
            if arr.nrows() != n {
                return Err(DataError::LengthMismatch {
                    field: field.to_string(),
                    expected: n,
                    actual: arr.nrows(),
                });
            }
            if arr.ncols() == 0 {
                return Err(DataError::ShapeMismatch {
                    field: field.to_string(),
                    message: "history has no columns".to_string(),
                });
            }
            Ok(arr)
        };

        Ok(GalaxyCatalog {
            stellar_mass: scalar("StellarMass", stellar)?,
            black_hole_mass: scalar("BlackHoleMass", take("BlackHoleMass")?)?,
            bulge_mass: scalar("BulgeMass", take("BulgeMass")?)?,
            mvir: scalar("Mvir", take("Mvir")?)?,
            len: scalar("Len", take("Len")?)?,
            sfr_disk: history("SfrDisk", take("SfrDisk")?)?,
            sfr_bulge: history("SfrBulge", take("SfrBulge")?)?,
        })
    }

    /// Concatenate catalogs along the galaxy axis.
    ///
    /// Errors
    /// ------
    /// - `DataError::ShapeMismatch` if history column counts differ.
    pub fn concatenate(parts: &[GalaxyCatalog]) -> DataResult<Self> {
        let cat1 = |field: &str, pick: fn(&GalaxyCatalog) -> &Array1<f64>| {
            let views: Vec<_> = parts.iter().map(|p| pick(p).view()).collect();
            concatenate(Axis(0), &views).map_err(|e| DataError::ShapeMismatch {
                field: field.to_string(),
                message: e.to_string(),
            })
        };
        let cat2 = |field: &str, pick: fn(&GalaxyCatalog) -> &Array2<f64>| {
            let views: Vec<_> = parts.iter().map(|p| pick(p).view()).collect();
            concatenate(Axis(0), &views).map_err(|e| DataError::ShapeMismatch {
                field: field.to_string(),
                message: e.to_string(),
            })
        };

        Ok(GalaxyCatalog {
            stellar_mass: cat1("StellarMass", |c| &c.stellar_mass)?,
            black_hole_mass: cat1("BlackHoleMass", |c| &c.black_hole_mass)?,
            bulge_mass: cat1("BulgeMass", |c| &c.bulge_mass)?,
            mvir: cat1("Mvir", |c| &c.mvir)?,
            len: cat1("Len", |c| &c.len)?,
            sfr_disk: cat2("SfrDisk", |c| &c.sfr_disk)?,
            sfr_bulge: cat2("SfrBulge", |c| &c.sfr_bulge)?,
        })
    }

    pub fn n_galaxies(&self) -> usize {
        self.stellar_mass.len()
    }

    /// Current star-formation rate (M☉/yr): the most recent history column
    /// of disk plus bulge.
    pub fn instantaneous_sfr(&self) -> Array1<f64> {
        &self.sfr_disk.column(0) + &self.sfr_bulge.column(0)
    }
}

/// Sorted `model_<index>.hdf5` files in `dir`.
///
/// Errors
/// ------
/// - `DataError::Io` if the directory cannot be listed.
/// - `DataError::NoModelFiles` if no file matches.
pub fn model_files(dir: &Path) -> DataResult<Vec<PathBuf>> {
    let entries = std::fs::read_dir(dir).map_err(|e| DataError::io(dir, &e))?;
    let mut files: Vec<(u64, PathBuf)> = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| DataError::io(dir, &e))?;
        let name = entry.file_name().to_string_lossy().into_owned();
        let Some(caps) = MODEL_FILE_RE.captures(&name) else {
            continue;
        };
        if let Ok(index) = caps[1].parse::<u64>() {
            files.push((index, entry.path()));
        }
    }
    if files.is_empty() {
        return Err(DataError::NoModelFiles { dir: dir.display().to_string() });
    }
    files.sort_by_key(|(index, _)| *index);
    Ok(files.into_iter().map(|(_, path)| path).collect())
}

/// Read `snapshot` from every model file in `dir` into one catalog.
pub fn load_catalog(
    reader: &dyn CatalogReader, dir: &Path, snapshot: u32,
) -> DataResult<GalaxyCatalog> {
    let files = model_files(dir)?;
    debug!(dir = %dir.display(), files = files.len(), snapshot, "reading model files");

    if let [single] = files.as_slice() {
        let columns = reader.read_snapshot(single, snapshot, &MODEL_FIELDS)?;
        return GalaxyCatalog::from_columns(single, columns);
    }

    let parts = files
        .iter()
        .map(|path| {
            let columns = reader.read_snapshot(path, snapshot, &MODEL_FIELDS)?;
            GalaxyCatalog::from_columns(path, columns)
        })
        .collect::<DataResult<Vec<_>>>()?;
    GalaxyCatalog::concatenate(&parts)
}

/// Read the scale-factor list: one value per non-empty, non-comment line
/// (first whitespace-separated token).
///
/// Errors
/// ------
/// - `DataError::Io` if the file is unreadable.
/// - `DataError::MalformedTable` for a non-numeric entry.
/// - `DataError::EmptyTable` if no scale factor is found.
pub fn read_scale_factors(path: &Path) -> DataResult<Vec<f64>> {
    let text = std::fs::read_to_string(path).map_err(|e| DataError::io(path, &e))?;
    let mut out = Vec::new();
    for (i, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let token = line.split_whitespace().next().unwrap_or(line);
        let value = token.parse::<f64>().map_err(|_| DataError::MalformedTable {
            path: path.display().to_string(),
            line: i + 1,
            reason: format!("not a scale factor: {token:?}"),
        })?;
        out.push(value);
    }
    if out.is_empty() {
        return Err(DataError::EmptyTable { path: path.display().to_string() });
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::reader::{MemoryReader, scalar_column};
    use std::fs;

    fn columns(stellar: Vec<f64>) -> Columns {
        let n = stellar.len();
        let mut cols = Columns::new();
        cols.insert("StellarMass".into(), scalar_column(stellar));
        for field in ["BlackHoleMass", "BulgeMass", "Mvir", "Len"] {
            cols.insert(field.into(), scalar_column(vec![1.0; n]));
        }
        cols.insert("SfrDisk".into(), Array2::from_elem((n, 3), 0.5));
        cols.insert("SfrBulge".into(), Array2::from_elem((n, 3), 0.25));
        cols
    }

    #[test]
    // Purpose
    // -------
    // Model files are enumerated numerically, not lexically, and unrelated
    // files are ignored.
    fn model_files_sort_numerically() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["model_10.hdf5", "model_2.hdf5", "model_1.hdf5", "notes.txt", "model_x.hdf5"]
        {
            fs::write(dir.path().join(name), b"").unwrap();
        }

        let files = model_files(dir.path()).unwrap();
        let names: Vec<_> =
            files.iter().map(|p| p.file_name().unwrap().to_string_lossy().into_owned()).collect();
        assert_eq!(names, vec!["model_1.hdf5", "model_2.hdf5", "model_10.hdf5"]);
    }

    #[test]
    // Purpose
    // -------
    // An empty directory is a fatal data error.
    fn empty_model_dir_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(model_files(dir.path()).unwrap_err(), DataError::NoModelFiles { .. }));
    }

    #[test]
    // Purpose
    // -------
    // Multiple files are concatenated field by field in index order.
    //
    // Given
    // -----
    // - model_0 with two galaxies, model_1 with one.
    //
    // Expect
    // ------
    // - Three galaxies, model_0's first.
    fn multiple_files_are_concatenated() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("model_0.hdf5"), b"").unwrap();
        fs::write(dir.path().join("model_1.hdf5"), b"").unwrap();
        let mut reader = MemoryReader::new();
        reader.insert("model_0.hdf5", 5, columns(vec![1.0, 2.0]));
        reader.insert("model_1.hdf5", 5, columns(vec![3.0]));

        let cat = load_catalog(&reader, dir.path(), 5).unwrap();
        assert_eq!(cat.n_galaxies(), 3);
        assert_eq!(cat.stellar_mass.to_vec(), vec![1.0, 2.0, 3.0]);
        assert_eq!(cat.sfr_bulge.dim(), (3, 3));
        assert_eq!(cat.instantaneous_sfr().to_vec(), vec![0.75; 3]);
    }

    #[test]
    // Purpose
    // -------
    // Disagreeing field lengths are reported instead of silently truncated.
    fn length_mismatch_is_reported() {
        let mut cols = columns(vec![1.0, 2.0]);
        cols.insert("Mvir".into(), scalar_column(vec![1.0]));
        let err = GalaxyCatalog::from_columns(Path::new("m"), cols).unwrap_err();
        assert_eq!(
            err,
            DataError::LengthMismatch { field: "Mvir".into(), expected: 2, actual: 1 }
        );
    }

    #[test]
    // Purpose
    // -------
    // The alist reader skips comments and blank lines and rejects garbage.
    fn scale_factor_list_parsing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("alist.txt");
        fs::write(&path, "# a\n0.25\n\n0.5 extra\n1.0\n").unwrap();
        assert_eq!(read_scale_factors(&path).unwrap(), vec![0.25, 0.5, 1.0]);

        fs::write(&path, "0.25\nabc\n").unwrap();
        assert!(matches!(
            read_scale_factors(&path).unwrap_err(),
            DataError::MalformedTable { line: 2, .. }
        ));
    }
}
