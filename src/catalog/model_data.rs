//! Model-data loader: model directory → [`ModelBundle`] of physical
//! quantities and binned functions.
//!
//! Purpose
//! -------
//! Run once per constraint evaluation: read the galaxies of every requested
//! snapshot, convert internal masses to physical log masses, and bin them
//! into the functions compared against observations.
//!
//! Key behaviors
//! -------------
//! - Only galaxies with `StellarMass > 0` enter the stellar mass functions,
//!   the sSFR split and the stellar mass density.
//! - sSFR = log10(SFR / M★) in yr⁻¹ with SFR the most recent disk + bulge
//!   rate; non-finite values (zero SFR) become [`LOG_FLOOR`] and therefore
//!   count as quiescent.
//! - Galaxies below `BinningConfig::ssfr_cut` are red, the rest blue.
//! - The star-formation-rate density by age uses the `SfrBulge` history
//!   columns of the first requested snapshot and lookback-time bins derived
//!   from the scale-factor list.
//!
//! Invariants & assumptions
//! ------------------------
//! - Every histogram value is finite; empty bins are exactly [`LOG_FLOOR`].
//! - Histogram fields have one row per requested snapshot, in request order.
//! - Any I/O or structure failure is returned, never replaced by zeros.
//!
//! [`LOG_FLOOR`]: crate::binning::LOG_FLOOR
use crate::{
    binning::{
        BinningConfig, GYR_TO_YR, INTERNAL_MASS_UNIT, clamp_non_finite, floor_log10,
        log_mass_function, physical_log_mass,
    },
    catalog::{
        errors::{DataError, DataResult},
        galaxies::{GalaxyCatalog, load_catalog, read_scale_factors},
        reader::CatalogReader,
    },
    config::SimulationParameters,
    cosmology::{scale_factor_to_redshift, time_bin_edges},
};
use ndarray::{Array1, Array2};
use std::path::Path;
use tracing::debug;

/// Subvolume bookkeeping: a single subvolume or "multiple batches".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubvolumeSelection {
    Single(u32),
    MultipleBatches,
}

impl SubvolumeSelection {
    pub fn from_subvols(subvols: &[u32]) -> Self {
        match subvols {
            [single] => SubvolumeSelection::Single(*single),
            _ => SubvolumeSelection::MultipleBatches,
        }
    }
}

/// ModelBundle — everything the constraint hooks extract model curves from.
///
/// Fields
/// ------
/// - `hubble_h`, `omega_m`: the run's cosmology.
/// - `snapshots`, `redshifts`: requested snapshots and their redshifts.
/// - `smf`, `smf_red`, `smf_blue`, `bhmf`, `ssfr_hist`: log10 densities
///   (Mpc⁻³ dex⁻¹), one row per snapshot.
/// - `stellar_mass_density`: log10 ΣM★/V (M☉ Mpc⁻³) per snapshot.
/// - `time_bin_edges`: lookback-time edges (Gyr) of the SFR history bins.
/// - `sfrd_age`: log10 SFR density (M☉ yr⁻¹ Mpc⁻³) per age bin.
/// - `stellar_mass`, `black_hole_mass`, `bulge_mass`, `halo_mass`: per-galaxy
///   log10 masses (M☉) of the first snapshot, [`crate::binning::LOG_FLOOR`]
///   for empty entries.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelBundle {
    pub hubble_h: f64,
    pub omega_m: f64,
    pub subvolumes: SubvolumeSelection,
    pub snapshots: Vec<u32>,
    pub redshifts: Array1<f64>,
    pub smf: Array2<f64>,
    pub smf_red: Array2<f64>,
    pub smf_blue: Array2<f64>,
    pub bhmf: Array2<f64>,
    pub ssfr_hist: Array2<f64>,
    pub stellar_mass_density: Array1<f64>,
    pub time_bin_edges: Array1<f64>,
    pub sfrd_age: Array1<f64>,
    pub stellar_mass: Array1<f64>,
    pub black_hole_mass: Array1<f64>,
    pub bulge_mass: Array1<f64>,
    pub halo_mass: Array1<f64>,
}

/// Redshift of every snapshot via the scale-factor list.
///
/// Errors
/// ------
/// - `DataError::SnapshotOutOfRange` for a snapshot beyond the list.
pub fn snapshot_redshifts(scale_factors: &[f64], snapshots: &[u32]) -> DataResult<Array1<f64>> {
    snapshots
        .iter()
        .map(|&snap| {
            scale_factors
                .get(snap as usize)
                .map(|&a| scale_factor_to_redshift(a))
                .ok_or(DataError::SnapshotOutOfRange { snapshot: snap, len: scale_factors.len() })
        })
        .collect::<DataResult<Vec<_>>>()
        .map(Array1::from)
}

/// Per-snapshot binned quantities.
struct SnapshotFunctions {
    smf: Array1<f64>,
    smf_red: Array1<f64>,
    smf_blue: Array1<f64>,
    bhmf: Array1<f64>,
    ssfr_hist: Array1<f64>,
    stellar_mass_density: f64,
}

fn bin_snapshot(
    cat: &GalaxyCatalog, hubble_h: f64, volume: f64, binning: &BinningConfig,
) -> SnapshotFunctions {
    let sfr = cat.instantaneous_sfr();
    let mut log_mstar = Vec::new();
    let (mut red, mut blue, mut ssfr) = (Vec::new(), Vec::new(), Vec::new());
    let mut total_mass = 0.0;

    for (i, &m) in cat.stellar_mass.iter().enumerate() {
        if m <= 0.0 {
            continue;
        }
        let mass = m * INTERNAL_MASS_UNIT / hubble_h;
        let log_m = physical_log_mass(m, hubble_h);
        let s = clamp_non_finite((sfr[i] / mass).log10());
        total_mass += mass;
        log_mstar.push(log_m);
        ssfr.push(s);
        if s < binning.ssfr_cut { red.push(log_m) } else { blue.push(log_m) }
    }

    let log_bh = cat.black_hole_mass.iter().map(|&m| physical_log_mass(m, hubble_h));

    SnapshotFunctions {
        smf: log_mass_function(log_mstar, &binning.stellar_mass, volume),
        smf_red: log_mass_function(red, &binning.stellar_mass, volume),
        smf_blue: log_mass_function(blue, &binning.stellar_mass, volume),
        bhmf: log_mass_function(log_bh, &binning.black_hole_mass, volume),
        ssfr_hist: log_mass_function(ssfr, &binning.ssfr, volume),
        stellar_mass_density: floor_log10(total_mass / volume),
    }
}

/// log10 SFR density per age bin from the `SfrBulge` history.
///
/// Bins beyond the available time edges are dropped; zero-width bins map to
/// the log floor.
pub fn sfr_density_by_age(
    sfr_bulge: &Array2<f64>, time_edges: &Array1<f64>, hubble_h: f64, volume: f64,
) -> Array1<f64> {
    let n_bins = sfr_bulge.ncols().min(time_edges.len().saturating_sub(1));
    Array1::from_iter((0..n_bins).map(|i| {
        let width_yr = (time_edges[i + 1] - time_edges[i]) * GYR_TO_YR;
        let total = sfr_bulge.column(i).sum() * INTERNAL_MASS_UNIT / hubble_h;
        floor_log10(total / width_yr / volume)
    }))
}

fn stack_rows(rows: &[Array1<f64>]) -> DataResult<Array2<f64>> {
    let views: Vec<_> = rows.iter().map(|r| r.view()).collect();
    ndarray::stack(ndarray::Axis(0), &views)
        .map_err(|e| DataError::ShapeMismatch { field: "histogram".into(), message: e.to_string() })
}

/// Load and bin the model output in `modeldir`.
///
/// Parameters
/// ----------
/// - `reader`: catalog backend.
/// - `modeldir`: directory of `model_<index>.hdf5` files.
/// - `subvols`: subvolume list; more than one entry collapses to
///   [`SubvolumeSelection::MultipleBatches`].
/// - `snapshots`: one or more snapshots; per-galaxy arrays and the SFR
///   history come from the first.
/// - `sim`, `binning`: run parameters and bin edges.
///
/// Errors
/// ------
/// - Any [`DataError`] from file discovery, reading, the scale-factor list
///   or the time-bin conversion.
pub fn load_model_data(
    reader: &dyn CatalogReader, modeldir: &Path, subvols: &[u32], snapshots: &[u32],
    sim: &SimulationParameters, binning: &BinningConfig,
) -> DataResult<ModelBundle> {
    let Some((&first_snapshot, rest)) = snapshots.split_first() else {
        return Err(DataError::NoSnapshots);
    };
    let subvolumes = SubvolumeSelection::from_subvols(subvols);
    let scale_factors = read_scale_factors(&sim.age_alist_file)?;
    let redshifts = snapshot_redshifts(&scale_factors, snapshots)?;
    let cosmology = sim.cosmology()?;
    let (h, volume) = (sim.hubble_h, sim.volume());

    let first = load_catalog(reader, modeldir, first_snapshot)?;
    debug!(
        snapshot = first_snapshot,
        galaxies = first.n_galaxies(),
        ?subvolumes,
        "binning model data"
    );
    let mut per_snapshot = Vec::with_capacity(snapshots.len());
    per_snapshot.push(bin_snapshot(&first, h, volume, binning));
    for &snap in rest {
        let cat = load_catalog(reader, modeldir, snap)?;
        debug!(snapshot = snap, galaxies = cat.n_galaxies(), ?subvolumes, "binning model data");
        per_snapshot.push(bin_snapshot(&cat, h, volume, binning));
    }

    let time_edges = time_bin_edges(&scale_factors, first.sfr_bulge.ncols(), &cosmology)?;
    let sfrd_age = sfr_density_by_age(&first.sfr_bulge, &time_edges, h, volume);

    let rows = |pick: fn(&SnapshotFunctions) -> &Array1<f64>| {
        stack_rows(&per_snapshot.iter().map(|f| pick(f).clone()).collect::<Vec<_>>())
    };
    let log_masses = |arr: &Array1<f64>| arr.mapv(|m| physical_log_mass(m, h));

    Ok(ModelBundle {
        hubble_h: h,
        omega_m: sim.omega_m,
        subvolumes,
        snapshots: snapshots.to_vec(),
        redshifts,
        smf: rows(|f| &f.smf)?,
        smf_red: rows(|f| &f.smf_red)?,
        smf_blue: rows(|f| &f.smf_blue)?,
        bhmf: rows(|f| &f.bhmf)?,
        ssfr_hist: rows(|f| &f.ssfr_hist)?,
        stellar_mass_density: per_snapshot.iter().map(|f| f.stellar_mass_density).collect(),
        time_bin_edges: time_edges,
        sfrd_age,
        stellar_mass: log_masses(&first.stellar_mass),
        black_hole_mass: log_masses(&first.black_hole_mass),
        bulge_mass: log_masses(&first.bulge_mass),
        halo_mass: log_masses(&first.mvir),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        binning::LOG_FLOOR,
        catalog::reader::{Columns, MemoryReader, scalar_column},
        config::SimulationPreset,
    };
    use approx::assert_relative_eq;
    use std::fs;

    fn fixture(
        stellar: Vec<f64>, sfr: Vec<f64>,
    ) -> (tempfile::TempDir, MemoryReader, SimulationParameters) {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("model_0.hdf5"), b"").unwrap();
        let alist = dir.path().join("alist.txt");
        fs::write(&alist, "0.2\n0.4\n0.6\n0.8\n1.0\n").unwrap();

        let n = stellar.len();
        let mut cols = Columns::new();
        cols.insert("StellarMass".into(), scalar_column(stellar));
        cols.insert("BlackHoleMass".into(), scalar_column(vec![0.01; n]));
        cols.insert("BulgeMass".into(), scalar_column(vec![1.0; n]));
        cols.insert("Mvir".into(), scalar_column(vec![100.0; n]));
        cols.insert("Len".into(), scalar_column(vec![50.0; n]));
        cols.insert("SfrDisk".into(), scalar_column(sfr));
        cols.insert("SfrBulge".into(), scalar_column(vec![0.0; n]));
        let mut reader = MemoryReader::new();
        reader.insert("model_0.hdf5", 4, cols);

        let sim =
            SimulationParameters::new(SimulationPreset::Mtng, 0.6774, 0.3089, 100.0, 1.0, alist)
                .unwrap();
        (dir, reader, sim)
    }

    #[test]
    // Purpose
    // -------
    // Galaxies without stellar mass are excluded from the stellar mass
    // function.
    //
    // Given
    // -----
    // - StellarMass = [0.0, 0.001, 10.0] (internal units), h = 0.6774; the
    //   0.001 galaxy sits at log10 M★ ≈ 7.17, the 10.0 galaxy at ≈ 11.17.
    //
    // Expect
    // ------
    // - Exactly two galaxies counted in the SMF; empty bins are −20.
    fn zero_mass_galaxies_are_excluded() {
        let (dir, reader, sim) = fixture(vec![0.0, 0.001, 10.0], vec![1.0, 1.0, 1.0]);
        let binning = BinningConfig::default();
        let bundle = load_model_data(&reader, dir.path(), &[0], &[4], &sim, &binning).unwrap();

        let width = 0.1;
        let density = 1.0 / (width * sim.volume());
        let counted: f64 = bundle
            .smf
            .row(0)
            .iter()
            .filter(|&&v| v != LOG_FLOOR)
            .map(|&v| (10f64.powf(v) / density).round())
            .sum();
        assert_eq!(counted, 2.0);
        let low_bin = binning.stellar_mass.bin_index(physical_log_mass(0.001, sim.hubble_h));
        assert_eq!(low_bin, Some(1));
        assert!(bundle.smf.iter().all(|v| v.is_finite()));
        assert_eq!(bundle.stellar_mass[0], LOG_FLOOR);
        assert_eq!(bundle.subvolumes, SubvolumeSelection::Single(0));
    }

    #[test]
    // Purpose
    // -------
    // The sSFR cut splits galaxies into red and blue populations.
    //
    // Given
    // -----
    // - Two galaxies of equal mass; one with zero SFR, one strongly
    //   star-forming.
    //
    // Expect
    // ------
    // - One galaxy in each of the red and blue functions, in the same bin.
    fn ssfr_cut_splits_red_and_blue() {
        let (dir, reader, sim) = fixture(vec![1.0, 1.0], vec![0.0, 100.0]);
        let binning = BinningConfig::default();
        let bundle = load_model_data(&reader, dir.path(), &[0, 1], &[4], &sim, &binning).unwrap();

        let bin = binning.stellar_mass.bin_index(physical_log_mass(1.0, sim.hubble_h)).unwrap();
        assert!(bundle.smf_red[[0, bin]] > LOG_FLOOR);
        assert_relative_eq!(bundle.smf_red[[0, bin]], bundle.smf_blue[[0, bin]]);
        assert_eq!(bundle.subvolumes, SubvolumeSelection::MultipleBatches);
    }

    #[test]
    // Purpose
    // -------
    // Snapshots beyond the scale-factor list are reported.
    fn snapshot_beyond_alist_is_an_error() {
        let err = snapshot_redshifts(&[0.5, 1.0], &[1, 2]).unwrap_err();
        assert_eq!(err, DataError::SnapshotOutOfRange { snapshot: 2, len: 2 });
    }

    #[test]
    // Purpose
    // -------
    // SFR density divides the summed bulge history by bin width and volume.
    fn sfr_density_uses_bin_widths() {
        let sfr = Array2::from_shape_vec((2, 2), vec![1.0, 0.0, 1.0, 0.0]).unwrap();
        let edges = Array1::from(vec![0.0, 2.0, 4.0]);
        let out = sfr_density_by_age(&sfr, &edges, 0.5, 10.0);

        let expected = (2.0 * 1e10 / 0.5 / 2e9 / 10.0f64).log10();
        assert_relative_eq!(out[0], expected, max_relative = 1e-12);
        assert_eq!(out[1], LOG_FLOOR);
    }
}
