//! Simulation parameters and the shared settings every constraint is built
//! from.
//!
//! Purpose
//! -------
//! Validate the handful of numbers describing a simulation run (Hubble
//! parameter, matter density, box size, loaded volume fraction, scale-factor
//! list) once, up front, so loaders and constraints can rely on them.
//!
//! Key behaviors
//! -------------
//! - [`SimulationParameters::new`] rejects non-physical values with a
//!   [`ConfigError`]; these surface as configuration errors from `parse`.
//! - [`SimulationParameters::volume`] gives the comoving volume (Mpc³)
//!   represented by the loaded subvolumes.
//! - [`ConstraintSettings`] bundles the simulation, the output snapshots,
//!   directories and binning shared by every constraint in a spec.
//!
//! Invariants & assumptions
//! ------------------------
//! - `0 < hubble_h ≤ 1`, `0 < vol_frac ≤ 1`, `boxsize > 0`,
//!   `0 < omega_m ≤ 1`, hence `volume() > 0`.
//! - Cosmologies are flat: ΩΛ = 1 − Ωm.
use crate::{
    binning::BinningConfig,
    cosmology::{Cosmology, CosmologyResult},
};
use std::path::{Path, PathBuf};

/// Result alias for configuration validation.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Configuration validation errors.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// A simulation parameter is non-finite or outside its allowed range.
    InvalidSimulationParameter { name: &'static str, value: f64, reason: &'static str },

    /// At least one output snapshot is required.
    NoSnapshots,

    /// An output snapshot is beyond the scale-factor list.
    SnapshotOutOfRange { snapshot: u32, len: usize },
}

impl std::error::Error for ConfigError {}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::InvalidSimulationParameter { name, value, reason } => {
                write!(f, "Invalid simulation parameter {name} = {value}: {reason}")
            }
            ConfigError::NoSnapshots => write!(f, "At least one output snapshot is required."),
            ConfigError::SnapshotOutOfRange { snapshot, len } => write!(
                f,
                "Output snapshot {snapshot} is beyond the scale-factor list (length {len})"
            ),
        }
    }
}

/// Named simulation presets selected by integer index.
///
/// All presets currently derive the volume from the same formula; the preset
/// only labels the run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SimulationPreset {
    MiniUchuu,
    MiniMillennium,
    Mtng,
}

impl SimulationPreset {
    /// 0 → miniUchuu, 1 → miniMillennium, anything else → MTNG.
    pub fn from_index(sim: i64) -> Self {
        match sim {
            0 => SimulationPreset::MiniUchuu,
            1 => SimulationPreset::MiniMillennium,
            _ => SimulationPreset::Mtng,
        }
    }

    pub const fn label(&self) -> &'static str {
        match self {
            SimulationPreset::MiniUchuu => "miniUchuu",
            SimulationPreset::MiniMillennium => "miniMillennium",
            SimulationPreset::Mtng => "MTNG",
        }
    }
}

/// SimulationParameters — validated description of one simulation run.
///
/// Fields
/// ------
/// - `preset`: [`SimulationPreset`] label.
/// - `hubble_h`: dimensionless Hubble parameter H0/100.
/// - `omega_m`: matter density parameter.
/// - `boxsize`: box side length in Mpc/h.
/// - `vol_frac`: fraction of the box represented by the loaded subvolumes.
/// - `age_alist_file`: path to the snapshot scale-factor list.
#[derive(Debug, Clone, PartialEq)]
pub struct SimulationParameters {
    pub preset: SimulationPreset,
    pub hubble_h: f64,
    pub omega_m: f64,
    pub boxsize: f64,
    pub vol_frac: f64,
    pub age_alist_file: PathBuf,
}

impl SimulationParameters {
    /// Validate and build simulation parameters.
    ///
    /// Errors
    /// ------
    /// - `ConfigError::InvalidSimulationParameter` naming the first offending
    ///   parameter.
    pub fn new(
        preset: SimulationPreset, hubble_h: f64, omega_m: f64, boxsize: f64, vol_frac: f64,
        age_alist_file: impl Into<PathBuf>,
    ) -> ConfigResult<Self> {
        if !hubble_h.is_finite() || hubble_h <= 0.0 || hubble_h > 1.0 {
            return Err(ConfigError::InvalidSimulationParameter {
                name: "h0",
                value: hubble_h,
                reason: "must satisfy 0 < h0 <= 1",
            });
        }
        if !omega_m.is_finite() || omega_m <= 0.0 || omega_m > 1.0 {
            return Err(ConfigError::InvalidSimulationParameter {
                name: "Omega0",
                value: omega_m,
                reason: "must satisfy 0 < Omega0 <= 1",
            });
        }
        if !boxsize.is_finite() || boxsize <= 0.0 {
            return Err(ConfigError::InvalidSimulationParameter {
                name: "boxsize",
                value: boxsize,
                reason: "must be finite and > 0",
            });
        }
        if !vol_frac.is_finite() || vol_frac <= 0.0 || vol_frac > 1.0 {
            return Err(ConfigError::InvalidSimulationParameter {
                name: "vol_frac",
                value: vol_frac,
                reason: "must satisfy 0 < vol_frac <= 1",
            });
        }
        Ok(SimulationParameters {
            preset,
            hubble_h,
            omega_m,
            boxsize,
            vol_frac,
            age_alist_file: age_alist_file.into(),
        })
    }

    /// Comoving volume in Mpc³: `(boxsize / h)^3 * vol_frac`.
    pub fn volume(&self) -> f64 {
        (self.boxsize / self.hubble_h).powi(3) * self.vol_frac
    }

    pub fn omega_lambda(&self) -> f64 {
        1.0 - self.omega_m
    }

    /// Flat cosmology of the run.
    pub fn cosmology(&self) -> CosmologyResult<Cosmology> {
        Cosmology::flat(self.hubble_h, self.omega_m)
    }
}

/// ConstraintSettings — shared settings handed to every constraint built
/// from one spec string.
///
/// Fields
/// ------
/// - `sim`: [`SimulationParameters`] of the calibrated run.
/// - `snapshots`: output snapshots written by the run; each constraint
///   picks the one nearest its target redshift.
/// - `output_dir`: where dump files and plots are written.
/// - `obs_dir`: root of the observational tables.
/// - `reference_dir`: optional model directory of a reference run whose
///   curves are drawn alongside the calibrated model.
/// - `binning`: [`BinningConfig`] shared by model and observation loaders.
#[derive(Debug, Clone, PartialEq)]
pub struct ConstraintSettings {
    pub sim: SimulationParameters,
    pub snapshots: Vec<u32>,
    pub output_dir: PathBuf,
    pub obs_dir: PathBuf,
    pub reference_dir: Option<PathBuf>,
    pub binning: BinningConfig,
}

impl ConstraintSettings {
    /// Build settings with the default binning and no reference run.
    ///
    /// Errors
    /// ------
    /// - `ConfigError::NoSnapshots` when `snapshots` is empty.
    pub fn new(
        sim: SimulationParameters, snapshots: Vec<u32>, output_dir: impl Into<PathBuf>,
        obs_dir: impl Into<PathBuf>,
    ) -> ConfigResult<Self> {
        if snapshots.is_empty() {
            return Err(ConfigError::NoSnapshots);
        }
        Ok(ConstraintSettings {
            sim,
            snapshots,
            output_dir: output_dir.into(),
            obs_dir: obs_dir.into(),
            reference_dir: None,
            binning: BinningConfig::default(),
        })
    }

    pub fn with_reference_dir(mut self, reference_dir: impl Into<PathBuf>) -> Self {
        self.reference_dir = Some(reference_dir.into());
        self
    }

    pub fn with_binning(mut self, binning: BinningConfig) -> Self {
        self.binning = binning;
        self
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }
}
