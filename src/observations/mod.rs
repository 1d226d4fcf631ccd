//! observations — literature datasets each constraint is compared against.
//!
//! Purpose
//! -------
//! Load tabulated observations (or analytic relations) and convert them to
//! the calibrated run's conventions.
//!
//! Key behaviors
//! -------------
//! - [`load_observation`] reads selected columns of a plain-text table.
//! - [`corrections`] re-expresses Hubble-dependent quantities at the run's
//!   `h` and converts IMFs to Chabrier.
//! - [`datasets`] assembles per-relation [`ObservationSet`]s, substituting
//!   [`literature`] fallbacks (with a logged warning) for the datasets that
//!   have one.
//!
//! Invariants & assumptions
//! ------------------------
//! - Loading is deterministic given the observation directory and the
//!   run's cosmology; nothing here mutates simulation parameters.
//! - The four arrays of an [`ObservationSet`] have equal length.

pub mod corrections;
pub mod datasets;
pub mod literature;
pub mod table;

pub use self::corrections::Imf;
pub use self::datasets::{
    ObservationSet, Population, baldry_smf, black_hole_bulge_relation, black_hole_mass_function,
    cosmic_sfrd_history, halo_stellar_mass_relation, stellar_mass_density_evolution,
    stellar_mass_function, target_stellar_mass_function,
};
pub use self::table::load_observation;
