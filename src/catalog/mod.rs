//! catalog — model-output reading and the model-data loader.
//!
//! Purpose
//! -------
//! Read galaxy catalogs written by the calibrated run and reduce them to the
//! binned functions and per-galaxy arrays each constraint compares against
//! observations.
//!
//! Key behaviors
//! -------------
//! - [`CatalogReader`] is the seam to the on-disk format: [`Hdf5Reader`]
//!   (feature `hdf5`) for real runs, [`MemoryReader`] for tests and
//!   embedding.
//! - [`load_model_data`] enumerates `model_<index>.hdf5` files, concatenates
//!   them and produces a [`ModelBundle`].
//!
//! Downstream usage
//! ----------------
//! - `constraints::Constraint::get_data` calls [`load_model_data`] once per
//!   evaluation; nothing is cached between calls.

pub mod errors;
pub mod galaxies;
pub mod model_data;
pub mod reader;

pub use self::errors::{DataError, DataResult};
pub use self::galaxies::{
    GalaxyCatalog, MODEL_FIELDS, load_catalog, model_files, read_scale_factors,
};
pub use self::model_data::{
    ModelBundle, SubvolumeSelection, load_model_data, sfr_density_by_age, snapshot_redshifts,
};
#[cfg(feature = "hdf5")]
pub use self::reader::Hdf5Reader;
pub use self::reader::{CatalogReader, Columns, MemoryReader, scalar_column, snapshot_group};
