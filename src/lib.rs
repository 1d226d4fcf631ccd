//! sage_calibration — calibration constraints for the SAGE semi-analytic
//! galaxy-formation model, with Python bindings.
//!
//! Purpose
//! -------
//! Serve as the crate root for Rust callers and as the PyO3 bridge that
//! exposes the constraint registry to the Python particle-swarm driver via
//! the `_sage_calibration` extension module.
//!
//! Key behaviors
//! -------------
//! - Re-export the core modules: [`binning`], [`cosmology`], [`catalog`],
//!   [`observations`], [`config`] and [`constraints`].
//! - Define the `Constraint` `#[pyclass]`, the `parse` `#[pyfunction]` and
//!   the `#[pymodule]` initializer when `python-bindings` is enabled.
//!
//! Invariants & assumptions
//! ------------------------
//! - All numerical work lives in the inner modules; this file performs only
//!   FFI glue, argument conversion and error mapping.
//! - The Python surface reads model output through
//!   [`catalog::Hdf5Reader`]; Rust callers may supply any
//!   [`catalog::CatalogReader`].
//!
//! Conventions
//! -----------
//! - Masses are log10 M☉, number densities log10 Mpc⁻³ dex⁻¹, times Gyr of
//!   lookback, in the calibrated run's Hubble convention.
//! - Errors propagate as rich enums internally and become `ValueError`
//!   (configuration) or `OSError` (data loading) at the PyO3 boundary.
//!
//! Downstream usage
//! ----------------
//! - Rust: build [`config::ConstraintSettings`], call
//!   [`constraints::parse`], then [`constraints::Constraint::get_data`] once
//!   per model evaluation.
//! - Python: `_sage_calibration.parse(...)` returns `Constraint` objects
//!   whose `get_data(modeldir, subvols)` yields `(y_obs, y_mod, err)`.
//!
//! Testing notes
//! -------------
//! - Unit tests live next to each module; `tests/` drives `parse` →
//!   `get_data` end to end against an in-memory catalog.
//! - The library never installs a `tracing` subscriber.

pub mod binning;
pub mod catalog;
pub mod config;
pub mod constraints;
pub mod cosmology;
pub mod observations;
pub mod utils;

#[cfg(feature = "python-bindings")]
use numpy::{IntoPyArray, PyArray1};

#[cfg(feature = "python-bindings")]
use pyo3::{prelude::*, types::PyAny};

#[cfg(feature = "python-bindings")]
use std::{path::PathBuf, sync::Arc};

#[cfg(feature = "python-bindings")]
use crate::{
    catalog::{CatalogReader, Hdf5Reader},
    constraints::{NoopPlotter, Plotter},
    utils::{PyPlotter, build_settings},
};

/// Constraint — Python-facing wrapper for one configured constraint.
///
/// Purpose
/// -------
/// Let the Python driver evaluate a [`constraints::Constraint`] against a
/// model-output directory and receive numpy arrays.
///
/// Fields
/// ------
/// - `inner`: [`constraints::Constraint`]
///   Fully configured constraint sharing its reader and plotter.
///
/// Notes
/// -----
/// - Instances are created by `parse`; there is no Python constructor.
#[cfg(feature = "python-bindings")]
#[pyclass(name = "Constraint", module = "sage_calibration")]
pub struct PyConstraint {
    inner: constraints::Constraint,
}

#[cfg(feature = "python-bindings")]
type DataTriple<'py> =
    (Bound<'py, PyArray1<f64>>, Bound<'py, PyArray1<f64>>, Bound<'py, PyArray1<f64>>);

#[cfg(feature = "python-bindings")]
#[pymethods]
impl PyConstraint {
    /// Evaluate against `modeldir`, returning `(y_obs, y_mod, err)`.
    ///
    /// The GIL is released while model and observation files are read; a
    /// Python plotter reacquires it per figure.
    #[pyo3(signature = (modeldir, subvols), text_signature = "(self, modeldir, subvols)")]
    pub fn get_data<'py>(
        &self, py: Python<'py>, modeldir: PathBuf, subvols: Vec<u32>,
    ) -> PyResult<DataTriple<'py>> {
        let data = py.allow_threads(|| self.inner.get_data(&modeldir, &subvols))?;
        Ok((data.y_obs.into_pyarray(py), data.y_mod.into_pyarray(py), data.err.into_pyarray(py)))
    }

    #[getter]
    pub fn name(&self) -> String {
        self.inner.name()
    }

    #[getter]
    pub fn domain(&self) -> (f64, f64) {
        self.inner.domain()
    }

    #[getter]
    pub fn weight(&self) -> f64 {
        self.inner.weight()
    }

    #[getter]
    pub fn rel_weight(&self) -> f64 {
        self.inner.rel_weight()
    }

    pub fn __str__(&self) -> String {
        self.inner.to_string()
    }

    pub fn __repr__(&self) -> String {
        self.inner.to_string()
    }
}

/// parse — build constraints from a spec string for the Python driver.
///
/// Parameters
/// ----------
/// - `spec`: comma-separated `NAME[(LOW-HIGH)][*WEIGHT]` entries.
/// - `snapshots`: output snapshot numbers of the run.
/// - `sim`: simulation preset index (0 miniUchuu, 1 miniMillennium, else MTNG).
/// - `boxsize`, `vol_frac`, `age_alist_file`, `omega0`, `h0`: simulation
///   parameters.
/// - `output_dir`, `obs_dir`, `reference_dir`: dump/figure directory,
///   observation directory and optional reference-run directory.
/// - `plotter`: optional Python object receiving figures.
///
/// Errors
/// ------
/// - `ValueError` for spec or configuration errors; `OSError` if the
///   scale-factor list cannot be read.
#[cfg(feature = "python-bindings")]
#[pyfunction]
#[pyo3(signature = (
    spec,
    snapshots,
    sim,
    boxsize,
    vol_frac,
    age_alist_file,
    omega0,
    h0,
    output_dir,
    obs_dir,
    reference_dir = None,
    plotter = None,
))]
#[allow(clippy::too_many_arguments)]
pub fn parse(
    spec: &str, snapshots: Vec<u32>, sim: i64, boxsize: f64, vol_frac: f64,
    age_alist_file: PathBuf, omega0: f64, h0: f64, output_dir: PathBuf, obs_dir: PathBuf,
    reference_dir: Option<PathBuf>, plotter: Option<&Bound<'_, PyAny>>,
) -> PyResult<Vec<PyConstraint>> {
    let settings = build_settings(
        snapshots,
        sim,
        boxsize,
        vol_frac,
        age_alist_file,
        omega0,
        h0,
        output_dir,
        obs_dir,
        reference_dir,
    )?;
    let reader: Arc<dyn CatalogReader> = Arc::new(Hdf5Reader);
    let plotter: Arc<dyn Plotter> = match plotter {
        Some(obj) => Arc::new(PyPlotter::new(obj.clone().unbind())),
        None => Arc::new(NoopPlotter),
    };
    let parsed = constraints::parse(spec, &settings, reader, plotter)?;
    Ok(parsed.into_iter().map(|inner| PyConstraint { inner }).collect())
}

/// _sage_calibration — PyO3 module initializer for the Python extension.
///
/// Errors
/// ------
/// - `PyErr` if registering the class or function fails.
#[cfg(feature = "python-bindings")]
#[pymodule]
fn _sage_calibration<'py>(_py: Python<'py>, m: &Bound<'py, PyModule>) -> PyResult<()> {
    m.add_class::<PyConstraint>()?;
    m.add_function(wrap_pyfunction!(parse, m)?)?;
    Ok(())
}
