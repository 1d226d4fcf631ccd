//! binning — fixed bin edges, unit constants and binned statistics.
//!
//! Purpose
//! -------
//! Hold the immutable binning configuration shared by the model-data loader
//! and the observation loaders, together with the histogram / log-density /
//! median-relation helpers built on top of it.
//!
//! Key behaviors
//! -------------
//! - [`BinningConfig`] bundles every bin-edge set and threshold in one value
//!   constructed once and passed by reference; there is no global state.
//! - [`histogram`] and friends map empty bins to [`LOG_FLOOR`] so downstream
//!   residual arithmetic never sees `-inf`/`NaN`.
//! - [`relation::binned_median`] computes median scaling relations with a
//!   minimum-population cut.
//!
//! Invariants & assumptions
//! ------------------------
//! - All bin edges are finite and strictly increasing (enforced by
//!   [`BinEdges`]).
//! - Log-space values use [`LOG_FLOOR`] (−20) as the "effectively zero"
//!   sentinel.
//!
//! Testing notes
//! -------------
//! - Unit tests live next to each submodule; `BinningConfig::default` is
//!   checked here against the documented edges.

pub mod edges;
pub mod errors;
pub mod histogram;
pub mod relation;

pub use self::edges::BinEdges;
pub use self::errors::{BinningError, BinningResult};
pub use self::histogram::{
    clamp_non_finite, dilute_indices, floor_log10, histogram, internal_mass, log_density,
    log_mass_function, physical_log_mass,
};
pub use self::relation::{RelationCurve, binned_median};

/// Log-space sentinel for "no galaxies" / non-finite conversions.
pub const LOG_FLOOR: f64 = -20.0;

/// Internal simulation mass unit (1e10 M☉/h).
pub const INTERNAL_MASS_UNIT: f64 = 1e10;

/// Years per gigayear.
pub const GYR_TO_YR: f64 = 1e9;

/// sSFR (log10 yr⁻¹) separating quiescent (red) from star-forming (blue).
pub const DEFAULT_SSFR_CUT: f64 = -11.0;

/// Minimum galaxies per bin for a median relation point.
pub const DEFAULT_MIN_GALAXIES: usize = 10;

/// Maximum number of galaxies in a plotted scatter cloud.
pub const DEFAULT_DILUTE: usize = 7500;

/// BinningConfig — every bin-edge set and threshold used by the constraints.
///
/// Fields
/// ------
/// - `stellar_mass`: log10 M★ edges for the (red/blue) stellar mass functions.
/// - `black_hole_mass`: log10 M_BH edges for the black-hole mass function.
/// - `ssfr`: log10 sSFR edges for the sSFR distribution.
/// - `bulge_mass`: log10 M_bulge edges for the black-hole–bulge relation.
/// - `halo_mass`: log10 M_vir edges for the halo–stellar mass relation.
/// - `ssfr_cut`: red/blue split in log10 yr⁻¹.
/// - `min_galaxies`: minimum bin population for median relations.
/// - `dilute`: maximum scatter-cloud size handed to plotters.
#[derive(Debug, Clone, PartialEq)]
pub struct BinningConfig {
    pub stellar_mass: BinEdges,
    pub black_hole_mass: BinEdges,
    pub ssfr: BinEdges,
    pub bulge_mass: BinEdges,
    pub halo_mass: BinEdges,
    pub ssfr_cut: f64,
    pub min_galaxies: usize,
    pub dilute: usize,
}

impl Default for BinningConfig {
    /// Stellar mass 7.0–12.5 (0.1 dex), black-hole mass 6.0–10.5 (0.1 dex),
    /// sSFR −13–−8 (0.1 dex), bulge mass 8.5–12.5 (0.25 dex), halo mass
    /// 10.0–15.0 (0.25 dex).
    fn default() -> Self {
        BinningConfig {
            stellar_mass: BinEdges::uniform_unchecked(7.0, 0.1, 55),
            black_hole_mass: BinEdges::uniform_unchecked(6.0, 0.1, 45),
            ssfr: BinEdges::uniform_unchecked(-13.0, 0.1, 50),
            bulge_mass: BinEdges::uniform_unchecked(8.5, 0.25, 16),
            halo_mass: BinEdges::uniform_unchecked(10.0, 0.25, 20),
            ssfr_cut: DEFAULT_SSFR_CUT,
            min_galaxies: DEFAULT_MIN_GALAXIES,
            dilute: DEFAULT_DILUTE,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    // Purpose
    // -------
    // The default configuration matches the documented edges and thresholds.
    fn default_config_matches_documented_edges() {
        let cfg = BinningConfig::default();

        assert_eq!(cfg.stellar_mass.low(), 7.0);
        assert_eq!(cfg.stellar_mass.n_bins(), 55);
        assert_relative_eq!(cfg.stellar_mass.high(), 12.5, epsilon = 1e-12);
        assert_relative_eq!(cfg.black_hole_mass.high(), 10.5, epsilon = 1e-12);
        assert_relative_eq!(cfg.ssfr.high(), -8.0, epsilon = 1e-12);
        assert_relative_eq!(cfg.bulge_mass.high(), 12.5, epsilon = 1e-12);
        assert_relative_eq!(cfg.halo_mass.high(), 15.0, epsilon = 1e-12);
        assert_eq!(cfg.ssfr_cut, -11.0);
        assert_eq!(cfg.min_galaxies, 10);
        assert_eq!(cfg.dilute, 7500);
    }
}
