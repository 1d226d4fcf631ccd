//! constraints — the calibration constraint registry and its evaluation.
//!
//! Purpose
//! -------
//! Turn a spec string such as `SMF_z0(9-12)*2,BHBM_z0` into configured
//! [`Constraint`]s and evaluate each against semi-analytic model output,
//! producing `(y_obs, y_mod, err)` vectors for an external optimizer.
//!
//! Key behaviors
//! -------------
//! - [`parse`] validates names, domain overrides and weights, and
//!   normalizes weights into `rel_weight` values summing to 1.
//! - [`Constraint::get_data`] loads model data, observations and an
//!   optional reference run, interpolates the model onto the observation
//!   grid, restricts to the domain and picks asymmetric errors.
//! - Every evaluation appends a block to `<NAME>_dump.txt` ([`dump`]) and
//!   draws best-effort figures through a [`Plotter`].
//!
//! Invariants & assumptions
//! ------------------------
//! - The set of constraint kinds is closed ([`REGISTRY`]); plot selection
//!   is declared per kind through [`Capabilities`].
//! - Constraints own their settings and share the reader and plotter via
//!   `Arc`, so they are independent once built and can be evaluated from
//!   different threads.
//!
//! Downstream usage
//! ----------------
//! - Rust callers use [`parse`] with a [`crate::catalog::CatalogReader`]
//!   and a [`Plotter`] (or [`NoopPlotter`]).
//! - The Python bindings wrap the same entry points.

pub mod constraint;
pub mod dump;
pub mod errors;
pub mod kind;
pub mod parser;
pub mod plotting;
pub mod relations;

pub use self::constraint::{
    Constraint, ConstraintData, RawData, interpolate_linear, resolve_snapshots,
};
pub use self::errors::{ConstraintError, ConstraintResult};
pub use self::kind::{Capabilities, ConstraintKind, Epoch, REGISTRY, SMD_EVOLUTION_REDSHIFTS};
pub use self::parser::{SpecEntry, parse, parse_entries, parse_entry};
pub use self::plotting::{
    Figure, NoopPlotter, PlotError, PlotPanel, PlotResult, Plotter, SMF_COLOR_FILE_NAME,
};
pub use self::relations::Curve;
