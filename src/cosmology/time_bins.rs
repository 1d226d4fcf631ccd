//! Snapshot scale factors → redshift / lookback-time bin edges for
//! star-formation histories.
//!
//! Star-formation histories are stored per galaxy as one column per age
//! bin, most recent first. The bin edges are derived from the simulation's
//! scale-factor list (`alist`, earliest snapshot first):
//!
//! - the list is reversed so redshift increases from the last snapshot;
//! - when more scale factors exist than `n_bins + 1`, the reversed redshift
//!   sequence is linearly resampled at `n_bins + 1` evenly spaced fractional
//!   indices;
//! - otherwise the reversed sequence is used as-is.
use crate::cosmology::{
    distances::Cosmology,
    errors::{CosmologyError, CosmologyResult},
};
use ndarray::Array1;

/// Redshift of a scale factor.
#[inline]
pub fn scale_factor_to_redshift(a: f64) -> f64 {
    1.0 / a - 1.0
}

/// Redshift bin edges for `n_bins` age bins.
///
/// Errors
/// ------
/// - `CosmologyError::InvalidScaleFactor` for a non-finite or non-positive
///   scale factor.
pub fn redshift_edges(scale_factors: &[f64], n_bins: usize) -> CosmologyResult<Array1<f64>> {
    for (index, &value) in scale_factors.iter().enumerate() {
        if !value.is_finite() || value <= 0.0 {
            return Err(CosmologyError::InvalidScaleFactor { index, value });
        }
    }
    let z: Vec<f64> = scale_factors.iter().rev().map(|&a| scale_factor_to_redshift(a)).collect();

    if z.len() <= n_bins + 1 || n_bins == 0 {
        return Ok(Array1::from(z));
    }

    let last = (z.len() - 1) as f64;
    let edges = (0..=n_bins).map(|i| {
        let pos = i as f64 * last / n_bins as f64;
        let lo = pos.floor() as usize;
        let hi = (lo + 1).min(z.len() - 1);
        let frac = pos - lo as f64;
        z[lo] + frac * (z[hi] - z[lo])
    });
    Ok(Array1::from_iter(edges))
}

/// Lookback-time bin edges (Gyr) for `n_bins` age bins.
///
/// Redshifts slightly below zero (a final scale factor marginally above 1)
/// are treated as z = 0.
pub fn time_bin_edges(
    scale_factors: &[f64], n_bins: usize, cosmology: &Cosmology,
) -> CosmologyResult<Array1<f64>> {
    let z_edges = redshift_edges(scale_factors, n_bins)?;
    let mut edges = Array1::<f64>::zeros(z_edges.len());
    for (out, &z) in edges.iter_mut().zip(z_edges.iter()) {
        *out = cosmology.lookback_time(z.max(0.0))?;
    }
    Ok(edges)
}
