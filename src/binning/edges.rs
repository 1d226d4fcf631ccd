//! Bin edges — validated, strictly increasing histogram boundaries.
//!
//! Purpose
//! -------
//! Represent the fixed bin edges used to histogram galaxy properties
//! (stellar mass, black-hole mass, sSFR, bulge and halo mass) and expose the
//! derived quantities every binned statistic needs: centers, widths and the
//! bin lookup for a single value.
//!
//! Conventions
//! -----------
//! - Bins are half-open `[e_i, e_{i+1})`, except the last bin which also
//!   includes its right edge. This matches the usual histogram convention
//!   for mass functions.
//! - Uniform edges are generated as `low + i * width` rather than by
//!   repeated addition, so the last edge does not drift.
use crate::binning::errors::{BinningError, BinningResult};
use ndarray::Array1;

/// `BinEdges` — strictly increasing bin boundaries.
///
/// Invariants
/// ----------
/// - At least two edges.
/// - All edges finite and strictly increasing.
#[derive(Debug, Clone, PartialEq)]
pub struct BinEdges {
    edges: Array1<f64>,
}

impl BinEdges {
    /// Build uniform edges covering `[low, high]` with spacing `width`.
    ///
    /// The number of bins is `round((high - low) / width)`, so `high` is
    /// reproduced exactly when the range is a multiple of `width`.
    ///
    /// Errors
    /// ------
    /// - `BinningError::InvalidBinWidth` when `width` is non-finite or ≤ 0.
    /// - `BinningError::InvalidRange` when `low`/`high` are non-finite or
    ///   `low >= high`.
    /// - `BinningError::TooFewEdges` when the range is narrower than half a
    ///   bin.
    pub fn uniform(low: f64, high: f64, width: f64) -> BinningResult<Self> {
        if !width.is_finite() || width <= 0.0 {
            return Err(BinningError::InvalidBinWidth { width });
        }
        if !low.is_finite() || !high.is_finite() || low >= high {
            return Err(BinningError::InvalidRange { low, high });
        }
        let n_bins = ((high - low) / width).round() as usize;
        if n_bins == 0 {
            return Err(BinningError::TooFewEdges { len: 1 });
        }
        Ok(Self::uniform_unchecked(low, width, n_bins))
    }

    /// Build edges from an explicit, strictly increasing sequence.
    pub fn from_edges(edges: Array1<f64>) -> BinningResult<Self> {
        if edges.len() < 2 {
            return Err(BinningError::TooFewEdges { len: edges.len() });
        }
        for (index, &value) in edges.iter().enumerate() {
            if !value.is_finite() || (index > 0 && value <= edges[index - 1]) {
                return Err(BinningError::NonIncreasingEdges { index, value });
            }
        }
        Ok(BinEdges { edges })
    }

    // Callers guarantee width > 0 and n_bins >= 1.
    pub(crate) fn uniform_unchecked(low: f64, width: f64, n_bins: usize) -> Self {
        let edges = Array1::from_iter((0..=n_bins).map(|i| low + i as f64 * width));
        BinEdges { edges }
    }

    /// The raw edge values.
    pub fn edges(&self) -> &Array1<f64> {
        &self.edges
    }

    pub fn n_bins(&self) -> usize {
        self.edges.len() - 1
    }

    pub fn low(&self) -> f64 {
        self.edges[0]
    }

    pub fn high(&self) -> f64 {
        self.edges[self.edges.len() - 1]
    }

    /// Mid-points of every bin (length `n_bins`).
    pub fn centers(&self) -> Array1<f64> {
        Array1::from_iter(self.edges.windows(2).into_iter().map(|w| 0.5 * (w[0] + w[1])))
    }

    /// Width of every bin (length `n_bins`).
    pub fn widths(&self) -> Array1<f64> {
        Array1::from_iter(self.edges.windows(2).into_iter().map(|w| w[1] - w[0]))
    }

    /// Index of the bin containing `value`, or `None` when it falls outside
    /// the edges (or is NaN).
    pub fn bin_index(&self, value: f64) -> Option<usize> {
        let n = self.edges.len();
        if !(value >= self.edges[0] && value <= self.edges[n - 1]) {
            return None;
        }
        if value == self.edges[n - 1] {
            return Some(n - 2);
        }
        // First edge strictly greater than value, minus one.
        let slice = self.edges.as_slice()?;
        let upper = slice.partition_point(|&e| e <= value);
        Some(upper - 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::array;

    #[test]
    // Purpose
    // -------
    // Uniform edges reproduce both range endpoints and have the expected
    // number of bins, centers and widths.
    //
    // Given
    // -----
    // - low = 8.0, high = 12.5, width = 0.1.
    //
    // Expect
    // ------
    // - 45 bins, first edge 8.0, last edge 12.5 (no drift).
    // - Centers start at 8.05 and all widths equal 0.1.
    fn uniform_edges_cover_range_without_drift() {
        let bins = BinEdges::uniform(8.0, 12.5, 0.1).unwrap();

        assert_eq!(bins.n_bins(), 45);
        assert_eq!(bins.low(), 8.0);
        assert_relative_eq!(bins.high(), 12.5, epsilon = 1e-12);
        assert_relative_eq!(bins.centers()[0], 8.05, epsilon = 1e-12);
        assert!(bins.widths().iter().all(|&w| (w - 0.1).abs() < 1e-12));
    }

    #[test]
    // Purpose
    // -------
    // Invalid widths and ranges are rejected with structured errors.
    fn uniform_rejects_bad_width_and_range() {
        assert_eq!(
            BinEdges::uniform(8.0, 12.0, 0.0).unwrap_err(),
            BinningError::InvalidBinWidth { width: 0.0 }
        );
        assert_eq!(
            BinEdges::uniform(12.0, 8.0, 0.1).unwrap_err(),
            BinningError::InvalidRange { low: 12.0, high: 8.0 }
        );
    }

    #[test]
    // Purpose
    // -------
    // Explicit edges must be strictly increasing; the first offending index
    // is reported.
    fn from_edges_rejects_non_increasing_sequence() {
        let err = BinEdges::from_edges(array![1.0, 2.0, 2.0, 3.0]).unwrap_err();
        assert_eq!(err, BinningError::NonIncreasingEdges { index: 2, value: 2.0 });

        let err = BinEdges::from_edges(array![1.0]).unwrap_err();
        assert_eq!(err, BinningError::TooFewEdges { len: 1 });
    }

    #[test]
    // Purpose
    // -------
    // `bin_index` follows half-open bins with an inclusive last edge.
    //
    // Given
    // -----
    // - Edges [0, 1, 2, 3].
    //
    // Expect
    // ------
    // - 0.0 → bin 0, 1.0 → bin 1, 3.0 → bin 2 (last edge inclusive).
    // - -0.1, 3.1 and NaN → None.
    fn bin_index_uses_half_open_bins() {
        let bins = BinEdges::from_edges(array![0.0, 1.0, 2.0, 3.0]).unwrap();

        assert_eq!(bins.bin_index(0.0), Some(0));
        assert_eq!(bins.bin_index(0.99), Some(0));
        assert_eq!(bins.bin_index(1.0), Some(1));
        assert_eq!(bins.bin_index(3.0), Some(2));
        assert_eq!(bins.bin_index(-0.1), None);
        assert_eq!(bins.bin_index(3.1), None);
        assert_eq!(bins.bin_index(f64::NAN), None);
    }
}
