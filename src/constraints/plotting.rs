//! Plotting seam: diagnostic figures drawn after each evaluation.
//!
//! Plotting is best-effort. Every [`Plotter`] call returns a [`PlotResult`]
//! that the caller logs and discards, so a failed figure never aborts an
//! evaluation.
use ndarray::Array1;
use std::path::Path;

/// Result alias for plotting calls.
pub type PlotResult<T> = Result<T, PlotError>;

/// Failure reported by a plotting backend.
#[derive(Debug, Clone, PartialEq)]
pub enum PlotError {
    /// The backend failed to render or write the figure.
    Backend { figure: String, message: String },
}

impl PlotError {
    pub fn backend(figure: impl Into<String>, message: impl Into<String>) -> Self {
        PlotError::Backend { figure: figure.into(), message: message.into() }
    }
}

impl std::error::Error for PlotError {}

impl std::fmt::Display for PlotError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PlotError::Backend { figure, message } => {
                write!(f, "Plotting {figure} failed: {message}")
            }
        }
    }
}

/// Diagnostic figure kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Figure {
    Smf,
    SmfRed,
    TargetSmf,
    Bhmf,
    Bhbm,
    Hsmr,
}

impl Figure {
    /// Default image name under the output directory.
    pub const fn file_name(self) -> &'static str {
        match self {
            Figure::Smf => "smf.png",
            Figure::SmfRed => "smf_red.png",
            Figure::TargetSmf => "target_smf.png",
            Figure::Bhmf => "bhmf.png",
            Figure::Bhbm => "bhbm.png",
            Figure::Hsmr => "hsmr.png",
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Figure::Smf => "smf",
            Figure::SmfRed => "smf_red",
            Figure::TargetSmf => "target_smf",
            Figure::Bhmf => "bhmf",
            Figure::Bhbm => "bhbm",
            Figure::Hsmr => "hsmr",
        }
    }
}

/// Image name of the combined red + blue stellar mass function.
pub const SMF_COLOR_FILE_NAME: &str = "smf_color.png";

/// PlotPanel — data for one constraint's diagnostic panel.
///
/// Fields
/// ------
/// - `name`: registry name of the constraint.
/// - `x_obs`, `y_obs`, `err_down`, `err_up`: observations.
/// - `y_model`: model interpolated onto `x_obs`.
/// - `x_reference`, `y_reference`: reference-run curve (empty if none).
/// - `scatter`: diluted per-galaxy `(x, y)` cloud for relation figures.
#[derive(Debug, Clone, PartialEq)]
pub struct PlotPanel {
    pub name: String,
    pub x_obs: Array1<f64>,
    pub y_obs: Array1<f64>,
    pub err_down: Array1<f64>,
    pub err_up: Array1<f64>,
    pub y_model: Array1<f64>,
    pub x_reference: Array1<f64>,
    pub y_reference: Array1<f64>,
    pub scatter: Option<(Array1<f64>, Array1<f64>)>,
}

/// Backend drawing diagnostic figures.
///
/// `image` is the full target path: the output directory joined with
/// [`Figure::file_name`] or [`SMF_COLOR_FILE_NAME`].
pub trait Plotter: Send + Sync {
    /// Draw `figure` from `panel` into `image`.
    fn plot(&self, figure: Figure, panel: &PlotPanel, image: &Path) -> PlotResult<()>;

    /// Draw red and blue stellar mass functions in one figure.
    fn plot_smf_color(&self, red: &PlotPanel, blue: &PlotPanel, image: &Path) -> PlotResult<()>;
}

/// Plotter that draws nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopPlotter;

impl Plotter for NoopPlotter {
    fn plot(&self, _figure: Figure, _panel: &PlotPanel, _image: &Path) -> PlotResult<()> {
        Ok(())
    }

    fn plot_smf_color(&self, _red: &PlotPanel, _blue: &PlotPanel, _image: &Path) -> PlotResult<()> {
        Ok(())
    }
}
