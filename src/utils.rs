//! Glue shared by the Python bindings: settings assembly from flat keyword
//! arguments and a [`Plotter`] that forwards figures to a Python object.
use crate::{
    config::{ConstraintSettings, SimulationParameters, SimulationPreset},
    constraints::ConstraintResult,
};
use std::path::PathBuf;

#[cfg(feature = "python-bindings")]
use crate::constraints::{Figure, PlotError, PlotPanel, PlotResult, Plotter};

#[cfg(feature = "python-bindings")]
use numpy::IntoPyArray;

#[cfg(feature = "python-bindings")]
use pyo3::{prelude::*, types::PyDict};

#[cfg(feature = "python-bindings")]
use std::path::Path;

/// Assemble validated [`ConstraintSettings`] from the flat keyword arguments
/// accepted by the Python `parse`.
///
/// Errors
/// ------
/// - `ConstraintError::Config` for non-physical simulation parameters or an
///   empty snapshot list.
#[allow(clippy::too_many_arguments)]
pub fn build_settings(
    snapshots: Vec<u32>, sim: i64, boxsize: f64, vol_frac: f64, age_alist_file: PathBuf,
    omega0: f64, h0: f64, output_dir: PathBuf, obs_dir: PathBuf, reference_dir: Option<PathBuf>,
) -> ConstraintResult<ConstraintSettings> {
    let preset = SimulationPreset::from_index(sim);
    let params = SimulationParameters::new(preset, h0, omega0, boxsize, vol_frac, age_alist_file)?;
    let settings = ConstraintSettings::new(params, snapshots, output_dir, obs_dir)?;
    Ok(match reference_dir {
        Some(dir) => settings.with_reference_dir(dir),
        None => settings,
    })
}

/// Plotter forwarding figures to a Python object exposing
/// `plot(figure, panel, image)` and `plot_smf_color(red, blue, image)`,
/// where `image` is the target PNG path.
///
/// Panels are passed as dicts of numpy arrays; any Python exception becomes
/// a [`PlotError`] that the caller logs.
#[cfg(feature = "python-bindings")]
pub struct PyPlotter {
    target: Py<PyAny>,
}

#[cfg(feature = "python-bindings")]
impl PyPlotter {
    pub fn new(target: Py<PyAny>) -> Self {
        PyPlotter { target }
    }
}

#[cfg(feature = "python-bindings")]
fn panel_dict<'py>(py: Python<'py>, panel: &PlotPanel) -> PyResult<Bound<'py, PyDict>> {
    let dict = PyDict::new(py);
    dict.set_item("name", &panel.name)?;
    dict.set_item("x_obs", panel.x_obs.clone().into_pyarray(py))?;
    dict.set_item("y_obs", panel.y_obs.clone().into_pyarray(py))?;
    dict.set_item("err_down", panel.err_down.clone().into_pyarray(py))?;
    dict.set_item("err_up", panel.err_up.clone().into_pyarray(py))?;
    dict.set_item("y_model", panel.y_model.clone().into_pyarray(py))?;
    dict.set_item("x_reference", panel.x_reference.clone().into_pyarray(py))?;
    dict.set_item("y_reference", panel.y_reference.clone().into_pyarray(py))?;
    match &panel.scatter {
        Some((x, y)) => dict.set_item(
            "scatter",
            (x.clone().into_pyarray(py), y.clone().into_pyarray(py)),
        )?,
        None => dict.set_item("scatter", py.None())?,
    }
    Ok(dict)
}

#[cfg(feature = "python-bindings")]
impl Plotter for PyPlotter {
    fn plot(&self, figure: Figure, panel: &PlotPanel, image: &Path) -> PlotResult<()> {
        Python::with_gil(|py| -> PyResult<()> {
            let dict = panel_dict(py, panel)?;
            let image = image.display().to_string();
            self.target.call_method1(py, "plot", (figure.label(), dict, image))?;
            Ok(())
        })
        .map_err(|err| PlotError::backend(figure.label(), err.to_string()))
    }

    fn plot_smf_color(&self, red: &PlotPanel, blue: &PlotPanel, image: &Path) -> PlotResult<()> {
        Python::with_gil(|py| -> PyResult<()> {
            let (red, blue) = (panel_dict(py, red)?, panel_dict(py, blue)?);
            let image = image.display().to_string();
            self.target.call_method1(py, "plot_smf_color", (red, blue, image))?;
            Ok(())
        })
        .map_err(|err| PlotError::backend("smf_color", err.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{config::ConfigError, constraints::ConstraintError};

    #[test]
    // Purpose
    // -------
    // Flat keyword arguments map onto validated settings.
    //
    // Given
    // -----
    // - Preset 1, h = 0.73, box 62.5 Mpc/h, full volume, snapshots [63].
    // - A second call with h0 = 0.
    //
    // Expect
    // ------
    // - Settings carry the reference directory; the bad h0 is a config error.
    fn settings_build_from_keyword_arguments() {
        let settings = build_settings(
            vec![63],
            1,
            62.5,
            1.0,
            "alist.txt".into(),
            0.25,
            0.73,
            "out".into(),
            "obs".into(),
            Some("ref".into()),
        )
        .unwrap();
        assert_eq!(settings.sim.preset, SimulationPreset::MiniMillennium);
        assert_eq!(settings.reference_dir, Some(PathBuf::from("ref")));

        let err = build_settings(
            vec![63],
            1,
            62.5,
            1.0,
            "alist.txt".into(),
            0.25,
            0.0,
            "out".into(),
            "obs".into(),
            None,
        )
        .unwrap_err();
        assert!(matches!(
            err,
            ConstraintError::Config(ConfigError::InvalidSimulationParameter { name: "h0", .. })
        ));
    }
}
