//! Per-constraint dump files consumed by external diagnostics.
//!
//! Format
//! ------
//! `<NAME>_dump.txt` under the output directory, append-only ASCII. Each
//! evaluation appends one block:
//!
//! ```text
//! # New Data Block
//! x_obs<TAB>y_obs<TAB>y_model
//! ...
//! ```
//!
//! A block is formatted into one buffer and written with a single
//! `write_all` on an append-mode handle, so concurrent writers sharing an
//! output directory interleave whole blocks rather than lines.
use ndarray::Array1;
use std::{
    fmt::Write as _,
    fs::OpenOptions,
    io::Write,
    path::{Path, PathBuf},
};

/// Block delimiter line.
pub const BLOCK_HEADER: &str = "# New Data Block";

/// Dump file of the constraint named `name`.
pub fn dump_path(output_dir: &Path, name: &str) -> PathBuf {
    output_dir.join(format!("{name}_dump.txt"))
}

/// Format one block of `(x, y_obs, y_model)` rows.
pub fn format_block(x: &Array1<f64>, y_obs: &Array1<f64>, y_model: &Array1<f64>) -> String {
    let mut block = String::with_capacity(32 * (x.len() + 1));
    block.push_str(BLOCK_HEADER);
    block.push('\n');
    for ((xi, yo), ym) in x.iter().zip(y_obs).zip(y_model) {
        // Writing into a String cannot fail.
        let _ = writeln!(block, "{xi}\t{yo}\t{ym}");
    }
    block
}

/// Append one block to `path`, creating the file if needed.
///
/// Errors
/// ------
/// - Any `std::io::Error` from opening or writing; dump failures are fatal
///   to the evaluation.
pub fn append_block(
    path: &Path, x: &Array1<f64>, y_obs: &Array1<f64>, y_model: &Array1<f64>,
) -> std::io::Result<()> {
    let block = format_block(x, y_obs, y_model);
    let mut file = OpenOptions::new().create(true).append(true).open(path)?;
    file.write_all(block.as_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    // Purpose
    // -------
    // Blocks are appended, each starting with the delimiter line and holding
    // tab-separated triples.
    fn blocks_are_appended() {
        let dir = tempfile::tempdir().unwrap();
        let path = dump_path(dir.path(), "SMF_z0");
        append_block(&path, &array![9.0, 9.5], &array![-2.0, -2.5], &array![-2.1, -2.4]).unwrap();
        append_block(&path, &array![10.0], &array![-3.0], &array![-3.5]).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert!(path.ends_with("SMF_z0_dump.txt"));
        assert_eq!(
            text,
            "# New Data Block\n9\t-2\t-2.1\n9.5\t-2.5\t-2.4\n# New Data Block\n10\t-3\t-3.5\n"
        );
    }
}
