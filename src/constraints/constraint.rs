//! Constraint — one calibration target evaluated against model output.
//!
//! Purpose
//! -------
//! Combine the model-data loader, the observation loader, the optional
//! reference run and the relation-specific model extraction into the
//! residual inputs `(y_obs, y_mod, err)` an external optimizer consumes.
//!
//! Key behaviors
//! -------------
//! - [`Constraint::get_data`] interpolates the model curve linearly onto
//!   the observation grid (extrapolating beyond the model's x-range),
//!   restricts to the constraint's domain and picks the upper error where
//!   the model lies above the observation, the lower error otherwise.
//! - Each evaluation appends one block to `<NAME>_dump.txt`; a failed dump
//!   write fails the evaluation.
//! - Figures are best-effort: plotting errors, companion failures and
//!   reference-run failures are logged with `warn!` and never returned.
//!
//! Invariants & assumptions
//! ------------------------
//! - `kind.domain().0 <= domain.0 <= domain.1 <= kind.domain().1`.
//! - `weight` is finite and ≥ 0; `rel_weight` is set once by `parse`.
//! - Snapshots are resolved at construction: each target redshift maps to
//!   the configured output snapshot with the nearest redshift.
//! - Nothing is cached; every call re-reads model data.
//!
//! Testing notes
//! -------------
//! - End-to-end behavior (dump contents, domain restriction, error
//!   selection, plot dispatch) is covered in
//!   `tests/integration_constraint_pipeline.rs`.
use crate::{
    catalog::{CatalogReader, DataError, load_model_data, read_scale_factors},
    config::{ConfigError, ConfigResult, ConstraintSettings},
    constraints::{
        dump::{append_block, dump_path},
        errors::{ConstraintError, ConstraintResult},
        kind::ConstraintKind,
        plotting::{Figure, PlotPanel, Plotter, SMF_COLOR_FILE_NAME},
        relations::{Curve, model_curve, observations, scatter_cloud},
    },
    cosmology::scale_factor_to_redshift,
    observations::ObservationSet,
};
use ndarray::Array1;
use std::{fmt, path::Path, sync::Arc};
use tracing::{debug, warn};

/// Everything one evaluation compares: observations, model and reference
/// curves, and the per-galaxy cloud for relation figures.
#[derive(Debug, Clone, PartialEq)]
pub struct RawData {
    pub observations: ObservationSet,
    pub model: Curve,
    pub reference: Curve,
    pub scatter: Option<(Array1<f64>, Array1<f64>)>,
}

/// Domain-restricted residual inputs of one evaluation.
#[derive(Debug, Clone, PartialEq)]
pub struct ConstraintData {
    pub x_obs: Array1<f64>,
    pub y_obs: Array1<f64>,
    pub y_mod: Array1<f64>,
    pub err: Array1<f64>,
}

impl ConstraintData {
    pub fn len(&self) -> usize {
        self.y_obs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.y_obs.is_empty()
    }
}

/// Linear interpolation of a curve sorted by x, extrapolating from the
/// outermost segments beyond its range.
///
/// A single-point curve is constant; zero-width segments take the left
/// value. An empty curve yields NaN.
pub fn interpolate_linear(xs: &[f64], ys: &[f64], at: f64) -> f64 {
    let n = xs.len().min(ys.len());
    match n {
        0 => f64::NAN,
        1 => ys[0],
        _ => {
            let j = xs[..n].partition_point(|&v| v <= at).clamp(1, n - 1);
            let (x0, x1, y0, y1) = (xs[j - 1], xs[j], ys[j - 1], ys[j]);
            if x1 == x0 { y0 } else { y0 + (at - x0) * (y1 - y0) / (x1 - x0) }
        }
    }
}

/// Map target redshifts to the nearest configured output snapshots
/// (duplicates removed, order kept).
///
/// Errors
/// ------
/// - `ConfigError::NoSnapshots` if `snapshots` is empty.
/// - `ConfigError::SnapshotOutOfRange` if a snapshot is beyond the
///   scale-factor list.
pub fn resolve_snapshots(
    targets: &[f64], snapshots: &[u32], scale_factors: &[f64],
) -> ConfigResult<Vec<u32>> {
    if snapshots.is_empty() {
        return Err(ConfigError::NoSnapshots);
    }
    let mut candidates = Vec::with_capacity(snapshots.len());
    for &snap in snapshots {
        let a = scale_factors
            .get(snap as usize)
            .ok_or(ConfigError::SnapshotOutOfRange { snapshot: snap, len: scale_factors.len() })?;
        candidates.push((snap, scale_factor_to_redshift(*a)));
    }

    let mut out: Vec<u32> = Vec::with_capacity(targets.len());
    for &target in targets {
        let mut best = candidates[0];
        for &cand in &candidates[1..] {
            if (cand.1 - target).abs() < (best.1 - target).abs() {
                best = cand;
            }
        }
        if !out.contains(&best.0) {
            out.push(best.0);
        }
    }
    Ok(out)
}

/// One configured calibration constraint.
#[derive(Clone)]
pub struct Constraint {
    kind: ConstraintKind,
    domain: (f64, f64),
    weight: f64,
    rel_weight: f64,
    snapshots: Vec<u32>,
    settings: ConstraintSettings,
    reader: Arc<dyn CatalogReader>,
    plotter: Arc<dyn Plotter>,
}

impl Constraint {
    /// Build a constraint with its physical domain and unit weight.
    ///
    /// Errors
    /// ------
    /// - `ConstraintError::Data` if the scale-factor list cannot be read.
    /// - `ConstraintError::Config` if a configured snapshot is beyond it.
    pub fn new(
        kind: ConstraintKind, settings: &ConstraintSettings, reader: Arc<dyn CatalogReader>,
        plotter: Arc<dyn Plotter>,
    ) -> ConstraintResult<Self> {
        let scale_factors = read_scale_factors(&settings.sim.age_alist_file)?;
        let snapshots =
            resolve_snapshots(&kind.target_redshifts(), &settings.snapshots, &scale_factors)?;
        debug!(constraint = %kind, ?snapshots, "resolved snapshots");

        Ok(Constraint {
            kind,
            domain: kind.domain(),
            weight: 1.0,
            rel_weight: 1.0,
            snapshots,
            settings: settings.clone(),
            reader,
            plotter,
        })
    }

    /// Narrow the domain to `[low, high]` inside the physical range.
    ///
    /// Errors
    /// ------
    /// - `ConstraintError::DomainBelowFloor` / `DomainAboveCeiling` /
    ///   `InvertedDomain` naming the offending bound.
    pub fn with_domain(mut self, low: f64, high: f64) -> ConstraintResult<Self> {
        let (floor, ceiling) = self.kind.domain();
        let name = self.kind.name();
        if !(low >= floor) {
            return Err(ConstraintError::DomainBelowFloor { name, low, floor });
        }
        if !(high <= ceiling) {
            return Err(ConstraintError::DomainAboveCeiling { name, high, ceiling });
        }
        if low > high {
            return Err(ConstraintError::InvertedDomain { name, low, high });
        }
        self.domain = (low, high);
        Ok(self)
    }

    /// Set the user weight.
    ///
    /// Errors
    /// ------
    /// - `ConstraintError::InvalidWeight` for negative or non-finite values.
    pub fn with_weight(mut self, weight: f64) -> ConstraintResult<Self> {
        if !weight.is_finite() || weight < 0.0 {
            return Err(ConstraintError::InvalidWeight { name: self.kind.name(), weight });
        }
        self.weight = weight;
        Ok(self)
    }

    pub(crate) fn set_rel_weight(&mut self, rel_weight: f64) {
        self.rel_weight = rel_weight;
    }

    pub fn kind(&self) -> ConstraintKind {
        self.kind
    }

    pub fn name(&self) -> String {
        self.kind.name()
    }

    pub fn domain(&self) -> (f64, f64) {
        self.domain
    }

    pub fn weight(&self) -> f64 {
        self.weight
    }

    pub fn rel_weight(&self) -> f64 {
        self.rel_weight
    }

    pub fn snapshots(&self) -> &[u32] {
        &self.snapshots
    }

    pub fn settings(&self) -> &ConstraintSettings {
        &self.settings
    }

    /// Load model, observation and reference data without interpolation.
    ///
    /// Errors
    /// ------
    /// - `ConstraintError::Data` for any model-data or observation failure
    ///   not covered by a fallback.
    pub fn get_raw_data(&self, modeldir: &Path, subvols: &[u32]) -> ConstraintResult<RawData> {
        let binning = &self.settings.binning;
        let bundle = load_model_data(
            self.reader.as_ref(),
            modeldir,
            subvols,
            &self.snapshots,
            &self.settings.sim,
            binning,
        )?;
        let observations = observations(self.kind, &self.settings)?;
        let model = model_curve(self.kind, &bundle, binning);
        let scatter = scatter_cloud(self.kind, &bundle, binning.dilute);
        let reference = self.reference_curve(subvols);
        Ok(RawData { observations, model, reference, scatter })
    }

    /// Reference-run curve, or an empty curve when none is configured or it
    /// cannot be loaded.
    fn reference_curve(&self, subvols: &[u32]) -> Curve {
        let Some(dir) = self.settings.reference_dir.as_deref() else {
            return Curve::default();
        };
        let binning = &self.settings.binning;
        match load_model_data(
            self.reader.as_ref(),
            dir,
            subvols,
            &self.snapshots,
            &self.settings.sim,
            binning,
        ) {
            Ok(bundle) => model_curve(self.kind, &bundle, binning),
            Err(err) => {
                warn!(
                    constraint = %self.kind,
                    dir = %dir.display(),
                    error = %err,
                    "reference run unavailable"
                );
                Curve::default()
            }
        }
    }

    /// Model curve interpolated onto the observation grid.
    fn interpolate_model(&self, raw: &RawData) -> ConstraintResult<Array1<f64>> {
        if raw.model.is_empty() {
            return Err(ConstraintError::EmptyModelCurve { name: self.name() });
        }
        let model = raw.model.sorted();
        let (xs, ys) = (model.x.to_vec(), model.y.to_vec());
        Ok(raw.observations.x.mapv(|x| interpolate_linear(&xs, &ys, x)))
    }

    /// Evaluate the constraint against the model output in `modeldir`.
    ///
    /// Returns
    /// -------
    /// [`ConstraintData`] restricted to observation points with
    /// `domain.0 <= x_obs <= domain.1`.
    ///
    /// Errors
    /// ------
    /// - `ConstraintError::Data` for model/observation loading or dump-file
    ///   failures.
    /// - `ConstraintError::EmptyModelCurve` if the model yields no points;
    ///   sparse relation bins hold −20 instead, so a readable catalog never
    ///   triggers it.
    pub fn get_data(&self, modeldir: &Path, subvols: &[u32]) -> ConstraintResult<ConstraintData> {
        let raw = self.get_raw_data(modeldir, subvols)?;
        let y_interp = self.interpolate_model(&raw)?;
        let obs = &raw.observations;
        let (low, high) = self.domain;

        let keep: Vec<usize> =
            (0..obs.len()).filter(|&i| obs.x[i] >= low && obs.x[i] <= high).collect();
        let pick = |arr: &Array1<f64>| Array1::from_iter(keep.iter().map(|&i| arr[i]));
        let x_obs = pick(&obs.x);
        let y_obs = pick(&obs.y);
        let y_mod = pick(&y_interp);
        let err = Array1::from_iter(keep.iter().map(|&i| {
            if y_interp[i] > obs.y[i] { obs.err_up[i] } else { obs.err_down[i] }
        }));

        let path = dump_path(self.settings.output_dir(), &self.name());
        append_block(&path, &x_obs, &y_obs, &y_mod).map_err(|e| DataError::io(&path, &e))?;

        self.dispatch_plots(&raw, &y_interp, modeldir, subvols);
        debug!(constraint = %self.kind, points = keep.len(), "evaluated constraint");

        Ok(ConstraintData { x_obs, y_obs, y_mod, err })
    }

    fn panel(&self, raw: &RawData, y_model: &Array1<f64>) -> PlotPanel {
        PlotPanel {
            name: self.name(),
            x_obs: raw.observations.x.clone(),
            y_obs: raw.observations.y.clone(),
            err_down: raw.observations.err_down.clone(),
            err_up: raw.observations.err_up.clone(),
            y_model: y_model.clone(),
            x_reference: raw.reference.x.clone(),
            y_reference: raw.reference.y.clone(),
            scatter: raw.scatter.clone(),
        }
    }

    fn dispatch_plots(
        &self, raw: &RawData, y_model: &Array1<f64>, modeldir: &Path, subvols: &[u32],
    ) {
        let caps = self.kind.capabilities();
        if caps.figures.is_empty() && !caps.color_companion {
            return;
        }
        let output_dir = self.settings.output_dir();
        let panel = self.panel(raw, y_model);

        for &figure in caps.figures {
            let image = output_dir.join(figure.file_name());
            if let Err(err) = self.plotter.plot(figure, &panel, &image) {
                let figure = figure.label();
                warn!(constraint = %self.kind, figure, error = %err, "plotting failed");
            }
        }
        if caps.color_companion {
            self.plot_color(&panel, modeldir, subvols);
        }
    }

    /// Combined red + blue figure; falls back to a red-only figure.
    fn plot_color(&self, red: &PlotPanel, modeldir: &Path, subvols: &[u32]) {
        let output_dir = self.settings.output_dir();
        let combined = match self.companion_panel(modeldir, subvols) {
            Ok(Some(blue)) => self
                .plotter
                .plot_smf_color(red, &blue, &output_dir.join(SMF_COLOR_FILE_NAME))
                .map_err(|err| err.to_string()),
            Ok(None) => return,
            Err(err) => Err(err.to_string()),
        };
        if let Err(error) = combined {
            warn!(constraint = %self.kind, %error, "color plot failed; drawing red SMF only");
            let image = output_dir.join(Figure::SmfRed.file_name());
            if let Err(err) = self.plotter.plot(Figure::SmfRed, red, &image) {
                warn!(constraint = %self.kind, error = %err, "plotting failed");
            }
        }
    }

    fn companion_panel(
        &self, modeldir: &Path, subvols: &[u32],
    ) -> ConstraintResult<Option<PlotPanel>> {
        let Some(kind) = self.kind.companion() else {
            return Ok(None);
        };
        let companion = Constraint {
            kind,
            domain: kind.domain(),
            weight: self.weight,
            rel_weight: self.rel_weight,
            snapshots: self.snapshots.clone(),
            settings: self.settings.clone(),
            reader: Arc::clone(&self.reader),
            plotter: Arc::clone(&self.plotter),
        };
        let raw = companion.get_raw_data(modeldir, subvols)?;
        let y_model = companion.interpolate_model(&raw)?;
        Ok(Some(companion.panel(&raw, &y_model)))
    }
}

impl fmt::Display for Constraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}(domain=[{}, {}], weight={}, rel_weight={})",
            self.kind, self.domain.0, self.domain.1, self.weight, self.rel_weight
        )
    }
}

impl fmt::Debug for Constraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Constraint")
            .field("kind", &self.kind)
            .field("domain", &self.domain)
            .field("weight", &self.weight)
            .field("rel_weight", &self.rel_weight)
            .field("snapshots", &self.snapshots)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    // Purpose
    // -------
    // Interpolation is linear inside the curve and extrapolates linearly
    // from the outer segments.
    //
    // Given
    // -----
    // - Curve through (0, 0), (1, 2), (2, 3).
    //
    // Expect
    // ------
    // - y(0.5) = 1, y(-1) = −2, y(4) = 5, knots reproduced exactly.
    fn interpolation_extrapolates_linearly() {
        let (xs, ys) = ([0.0, 1.0, 2.0], [0.0, 2.0, 3.0]);
        assert_relative_eq!(interpolate_linear(&xs, &ys, 0.5), 1.0);
        assert_relative_eq!(interpolate_linear(&xs, &ys, -1.0), -2.0);
        assert_relative_eq!(interpolate_linear(&xs, &ys, 4.0), 5.0);
        assert_relative_eq!(interpolate_linear(&xs, &ys, 2.0), 3.0);
        assert_relative_eq!(interpolate_linear(&xs, &ys, 1.0), 2.0);
        assert_eq!(interpolate_linear(&[1.0], &[7.0], 10.0), 7.0);
        assert!(interpolate_linear(&[], &[], 1.0).is_nan());
    }

    #[test]
    // Purpose
    // -------
    // Target redshifts map to the nearest configured snapshot; repeated
    // picks collapse.
    //
    // Given
    // -----
    // - alist z = [3, 1, 0.5, 0] for snapshots 0..=3; configured [1, 3]
    //   (z = 1 and z = 0).
    //
    // Expect
    // ------
    // - z = 0 → 3; z = 2 → 1; {0, 0.1} → [3] once.
    // - A snapshot beyond the list is rejected.
    fn snapshots_resolve_to_nearest_redshift() {
        let alist = [0.25, 0.5, 1.0 / 1.5, 1.0];
        assert_eq!(resolve_snapshots(&[0.0], &[1, 3], &alist).unwrap(), vec![3]);
        assert_eq!(resolve_snapshots(&[2.0], &[1, 3], &alist).unwrap(), vec![1]);
        assert_eq!(resolve_snapshots(&[0.0, 0.1], &[1, 3], &alist).unwrap(), vec![3]);
        assert_eq!(
            resolve_snapshots(&[0.0], &[7], &alist).unwrap_err(),
            ConfigError::SnapshotOutOfRange { snapshot: 7, len: 4 }
        );
    }
}
