//! Histograms, log-space densities and internal-to-physical mass conversion.
//!
//! Purpose
//! -------
//! Turn per-galaxy columns into the binned functions compared against
//! observations (mass functions, sSFR distributions) while keeping every
//! value finite: empty bins and non-finite conversions are mapped to the
//! [`LOG_FLOOR`] sentinel instead of `-inf`/`NaN`.
//!
//! Conventions
//! -----------
//! - Internal simulation masses are in units of 1e10 M☉/h.
//! - Physical log masses are `log10(m * 1e10 / h)` in M☉.
//! - Densities are `count / (bin_width * volume)` in Mpc⁻³ dex⁻¹ before
//!   taking log10.
use crate::binning::{INTERNAL_MASS_UNIT, LOG_FLOOR, edges::BinEdges};
use ndarray::Array1;

/// Count values into `edges` (NaN and out-of-range values are ignored).
pub fn histogram<I>(values: I, edges: &BinEdges) -> Array1<f64>
where
    I: IntoIterator<Item = f64>,
{
    let mut counts = Array1::<f64>::zeros(edges.n_bins());
    for value in values {
        if let Some(i) = edges.bin_index(value) {
            counts[i] += 1.0;
        }
    }
    counts
}

/// log10 of `value`, or [`LOG_FLOOR`] when `value` is non-positive or
/// non-finite.
#[inline]
pub fn floor_log10(value: f64) -> f64 {
    if value > 0.0 && value.is_finite() { value.log10() } else { LOG_FLOOR }
}

/// Replace non-finite values with [`LOG_FLOOR`].
#[inline]
pub fn clamp_non_finite(value: f64) -> f64 {
    if value.is_finite() { value } else { LOG_FLOOR }
}

/// Convert a histogram of counts into log10 number densities per unit
/// volume per bin width, with the [`LOG_FLOOR`] sentinel for empty bins.
///
/// `volume` is in Mpc³ and must be > 0 (guaranteed by
/// `SimulationParameters`).
pub fn log_density(counts: &Array1<f64>, edges: &BinEdges, volume: f64) -> Array1<f64> {
    let widths = edges.widths();
    Array1::from_iter(
        counts.iter().zip(widths.iter()).map(|(&n, &dx)| floor_log10(n / (dx * volume))),
    )
}

/// Histogram `values` into `edges` and return the log density.
pub fn log_mass_function<I>(values: I, edges: &BinEdges, volume: f64) -> Array1<f64>
where
    I: IntoIterator<Item = f64>,
{
    let counts = histogram(values, edges);
    log_density(&counts, edges, volume)
}

/// Internal mass (1e10 M☉/h) → log10 physical mass (M☉), clamped to
/// [`LOG_FLOOR`] when the result is non-finite (zero or negative mass).
#[inline]
pub fn physical_log_mass(internal: f64, hubble_h: f64) -> f64 {
    clamp_non_finite((internal * INTERNAL_MASS_UNIT / hubble_h).log10())
}

/// Inverse of [`physical_log_mass`] for positive masses.
#[inline]
pub fn internal_mass(log_mass: f64, hubble_h: f64) -> f64 {
    10f64.powf(log_mass) * hubble_h / INTERNAL_MASS_UNIT
}

/// Deterministic stride sub-sample of `0..n` with at most `max` entries.
///
/// Used to thin per-galaxy scatter clouds before they are handed to
/// plotting collaborators.
pub fn dilute_indices(n: usize, max: usize) -> Vec<usize> {
    if max == 0 {
        return Vec::new();
    }
    if n <= max {
        return (0..n).collect();
    }
    let stride = n as f64 / max as f64;
    (0..max).map(|i| ((i as f64 * stride) as usize).min(n - 1)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::array;

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover:
    // - Counting semantics of `histogram`.
    // - The LOG_FLOOR sentinel for empty bins and non-finite conversions.
    // - Round-tripping of the internal/physical mass conversion.
    // - Stride dilution bounds.
    // -------------------------------------------------------------------------

    fn unit_edges() -> BinEdges {
        BinEdges::from_edges(array![0.0, 1.0, 2.0, 3.0]).unwrap()
    }

    #[test]
    // Purpose
    // -------
    // Values are counted into their bins; NaN and out-of-range values are
    // dropped.
    fn histogram_counts_in_range_values_only() {
        let counts = histogram(vec![0.5, 0.7, 1.5, 3.0, -1.0, 4.0, f64::NAN], &unit_edges());
        assert_eq!(counts, array![2.0, 1.0, 1.0]);
    }

    #[test]
    // Purpose
    // -------
    // Empty bins map to exactly LOG_FLOOR, never -inf or NaN.
    //
    // Given
    // -----
    // - counts = [4, 0, 1], unit widths, volume 2.
    //
    // Expect
    // ------
    // - [log10(2), -20, log10(0.5)].
    fn log_density_uses_floor_for_empty_bins() {
        let dens = log_density(&array![4.0, 0.0, 1.0], &unit_edges(), 2.0);

        assert_relative_eq!(dens[0], 2f64.log10(), epsilon = 1e-12);
        assert_eq!(dens[1], LOG_FLOOR);
        assert_relative_eq!(dens[2], 0.5f64.log10(), epsilon = 1e-12);
        assert!(dens.iter().all(|v| v.is_finite()));
    }

    #[test]
    // Purpose
    // -------
    // Zero and negative masses clamp to LOG_FLOOR; positive masses round-trip
    // through the physical conversion.
    fn physical_mass_clamps_and_round_trips() {
        let h = 0.6774;
        assert_eq!(physical_log_mass(0.0, h), LOG_FLOOR);
        assert_eq!(physical_log_mass(-1.0, h), LOG_FLOOR);

        for &m in &[1e-5, 0.001, 1.0, 10.0, 3.5e3] {
            let back = internal_mass(physical_log_mass(m, h), h);
            assert_relative_eq!(back, m, max_relative = 1e-12);
        }
    }

    #[test]
    // Purpose
    // -------
    // Dilution never exceeds the requested size and keeps indices in range.
    fn dilute_indices_is_bounded() {
        assert_eq!(dilute_indices(5, 10), vec![0, 1, 2, 3, 4]);
        let idx = dilute_indices(1000, 7);
        assert_eq!(idx.len(), 7);
        assert!(idx.iter().all(|&i| i < 1000));
        assert!(idx.windows(2).all(|w| w[0] < w[1]));
        assert!(dilute_indices(10, 0).is_empty());
    }
}
