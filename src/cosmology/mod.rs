//! cosmology — stateless redshift ↔ time ↔ distance conversions.
//!
//! Purpose
//! -------
//! Convert snapshot scale factors into redshift and lookback-time bin edges,
//! and convert observational quantities computed under one cosmology into
//! the run's own cosmology.
//!
//! Key behaviors
//! -------------
//! - [`z_to_lookback_time`], [`comoving_distance`] and
//!   [`z_to_angular_diameter_distance`] are pure functions of a scalar
//!   redshift; callers iterate element-wise.
//! - [`Cosmology`] packages (h, Ωm, ΩΛ) for repeated evaluation and for
//!   integrating rate densities over cosmic time.
//! - [`time_bins`] maps the simulation `alist` onto age-bin edges.
//!
//! Invariants & assumptions
//! ------------------------
//! - Redshifts are finite and ≥ 0.
//! - E²(z) must remain positive along every integral; otherwise a
//!   [`CosmologyError::NonPhysicalExpansion`] is returned and propagated.

pub mod distances;
pub mod errors;
pub mod time_bins;

pub use self::distances::{
    Cosmology, HUBBLE_TIME_GYR_PER_H, SPEED_OF_LIGHT_KM_S, comoving_distance, e_of_z,
    z_to_angular_diameter_distance, z_to_lookback_time,
};
pub use self::errors::{CosmologyError, CosmologyResult};
pub use self::time_bins::{redshift_edges, scale_factor_to_redshift, time_bin_edges};
