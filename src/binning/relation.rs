//! Binned scaling relations (median and 16th/84th percentiles of y in bins
//! of x), used for the black-hole–bulge and halo–stellar mass relations.
use crate::binning::{
    edges::BinEdges,
    errors::{BinningError, BinningResult},
};
use ndarray::Array1;
use statrs::statistics::{Data, Median, OrderStatistics};

/// Median relation sampled at the centers of sufficiently populated bins.
#[derive(Debug, Clone, PartialEq)]
pub struct RelationCurve {
    /// Bin centers of the retained bins.
    pub x: Array1<f64>,
    /// Median y per retained bin.
    pub median: Array1<f64>,
    /// 16th percentile of y per retained bin.
    pub p16: Array1<f64>,
    /// 84th percentile of y per retained bin.
    pub p84: Array1<f64>,
}

/// Compute the median relation of `y` against `x`.
///
/// Pairs where either coordinate is non-finite or outside `edges` are
/// ignored. Bins holding fewer than `min_count` galaxies are dropped so the
/// relation is never driven by a handful of objects.
///
/// Errors
/// ------
/// - `BinningError::LengthMismatch` when `x` and `y` differ in length.
pub fn binned_median(
    x: &[f64], y: &[f64], edges: &BinEdges, min_count: usize,
) -> BinningResult<RelationCurve> {
    if x.len() != y.len() {
        return Err(BinningError::LengthMismatch { x_len: x.len(), y_len: y.len() });
    }

    let mut buckets: Vec<Vec<f64>> = vec![Vec::new(); edges.n_bins()];
    for (&xi, &yi) in x.iter().zip(y) {
        if !yi.is_finite() {
            continue;
        }
        if let Some(i) = edges.bin_index(xi) {
            buckets[i].push(yi);
        }
    }

    let centers = edges.centers();
    let (mut xs, mut med, mut lo, mut hi) = (Vec::new(), Vec::new(), Vec::new(), Vec::new());
    for (i, bucket) in buckets.into_iter().enumerate() {
        if bucket.is_empty() || bucket.len() < min_count {
            continue;
        }
        let mut data = Data::new(bucket);
        xs.push(centers[i]);
        med.push(data.median());
        lo.push(data.percentile(16));
        hi.push(data.percentile(84));
    }

    Ok(RelationCurve {
        x: Array1::from(xs),
        median: Array1::from(med),
        p16: Array1::from(lo),
        p84: Array1::from(hi),
    })
}
