//! Plain-text observation tables.
//!
//! Tables are whitespace- or comma-separated numeric columns; blank lines
//! and lines starting with `#` are skipped. Inline `#` comments end a row.
use crate::catalog::errors::{DataError, DataResult};
use ndarray::Array1;
use std::path::Path;

/// Read the requested column indices of `base_dir/relative_path`.
///
/// Parameters
/// ----------
/// - `cols`: zero-based column indices, returned in the order given.
///
/// Returns
/// -------
/// One array per requested column, all of equal length.
///
/// Errors
/// ------
/// - `DataError::Io` if the file is missing or unreadable. Datasets with a
///   built-in fallback substitute it only for this variant
///   ([`DataError::is_io`]).
/// - `DataError::MalformedTable` for a non-numeric cell in a requested
///   column.
/// - `DataError::MissingColumn` if a row is too short.
/// - `DataError::EmptyTable` if no data rows remain.
pub fn load_observation(
    base_dir: &Path, relative_path: &str, cols: &[usize],
) -> DataResult<Vec<Array1<f64>>> {
    let path = base_dir.join(relative_path);
    let text = std::fs::read_to_string(&path).map_err(|e| DataError::io(&path, &e))?;
    let mut out: Vec<Vec<f64>> = vec![Vec::new(); cols.len()];

    for (i, raw) in text.lines().enumerate() {
        let line = raw.split('#').next().unwrap_or("").trim();
        if line.is_empty() {
            continue;
        }
        let cells: Vec<&str> =
            line.split(|c: char| c == ',' || c.is_whitespace()).filter(|c| !c.is_empty()).collect();
        for (slot, &col) in out.iter_mut().zip(cols) {
            let cell = cells.get(col).ok_or_else(|| DataError::MissingColumn {
                path: path.display().to_string(),
                line: i + 1,
                column: col,
                available: cells.len(),
            })?;
            let value = cell.parse::<f64>().map_err(|_| DataError::MalformedTable {
                path: path.display().to_string(),
                line: i + 1,
                reason: format!("column {col} is not a number: {cell:?}"),
            })?;
            slot.push(value);
        }
    }

    if out.first().is_none_or(|c| c.is_empty()) {
        return Err(DataError::EmptyTable { path: path.display().to_string() });
    }
    Ok(out.into_iter().map(Array1::from).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    // Purpose
    // -------
    // Mixed separators and comments are accepted; columns come back in the
    // requested order.
    fn reads_requested_columns() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("t.dat"), "# x y e\n8.0, -2.0, 0.1\n\n8.5\t-2.5  0.2 # note\n")
            .unwrap();

        let cols = load_observation(dir.path(), "t.dat", &[2, 0]).unwrap();
        assert_eq!(cols[0].to_vec(), vec![0.1, 0.2]);
        assert_eq!(cols[1].to_vec(), vec![8.0, 8.5]);
    }

    #[test]
    // Purpose
    // -------
    // Missing files, short rows and garbage cells map to distinct errors.
    fn table_errors_are_classified() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load_observation(dir.path(), "absent.dat", &[0]).unwrap_err().is_io());

        fs::write(dir.path().join("short.dat"), "1 2\n3\n").unwrap();
        assert!(matches!(
            load_observation(dir.path(), "short.dat", &[1]).unwrap_err(),
            DataError::MissingColumn { line: 2, column: 1, available: 1, .. }
        ));

        fs::write(dir.path().join("bad.dat"), "1 x\n").unwrap();
        assert!(matches!(
            load_observation(dir.path(), "bad.dat", &[1]).unwrap_err(),
            DataError::MalformedTable { line: 1, .. }
        ));

        fs::write(dir.path().join("empty.dat"), "# nothing\n").unwrap();
        assert!(matches!(
            load_observation(dir.path(), "empty.dat", &[0]).unwrap_err(),
            DataError::EmptyTable { .. }
        ));
    }
}
