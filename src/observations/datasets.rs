//! Per-constraint observational datasets.
//!
//! Purpose
//! -------
//! Supply `(x, y, err_down, err_up)` for each relation, already expressed in
//! the run's Hubble convention and a Chabrier IMF.
//!
//! Key behaviors
//! -------------
//! - Mass-function tables under `obs_dir` hold `(log x, log φ, err_down,
//!   err_up)` in dex, quoted at h = 0.7 with a Chabrier IMF.
//! - `SMF_z0`, `BHMF_z0`, the cosmic SFR density history and the stellar
//!   mass density evolution fall back to built-in literature data when
//!   their table is missing or unreadable; the substitution is logged with
//!   `warn!`. A table that exists but fails to parse is an error.
//! - Relations (black hole–bulge, halo–stellar mass) are analytic and need
//!   no file.
//! - Target stellar mass functions hold `(x, y, err)` already in run units
//!   and have no fallback.
//!
//! Conventions
//! -----------
//! Table paths relative to `obs_dir`:
//! - `SMF/SMF_<tag>.dat`, `SMF/SMF_red_<tag>.dat`, `SMF/SMF_blue_<tag>.dat`
//! - `BHMF/BHMF_<tag>.dat`
//! - `CSFRDH/CSFRDH.dat` (first column redshift)
//! - `SMD/SMD_evolution.dat` (first column redshift)
//! - `targets/SMF_<tag>.dat`
use crate::{
    binning::{BinEdges, floor_log10},
    catalog::errors::{DataError, DataResult},
    cosmology::Cosmology,
    observations::{
        corrections::{
            BLACK_HOLE_MASS_H_EXPONENT, HALO_MASS_H_EXPONENT, Imf, STELLAR_MASS_H_EXPONENT,
            correct_mass_function, density_shift, linear_to_log, mass_shift,
        },
        literature::{
            BALDRY08_HUBBLE_H, BALDRY08_SMF, BHMF_PLACEHOLDER, BHMF_PLACEHOLDER_HUBBLE_H,
            MD14_HUBBLE_H, MM13_SCATTER, MOSTER13_HUBBLE_H, MOSTER13_SCATTER,
            madau_dickinson_sfrd, madau_dickinson_smd, mcconnell_ma_bh_mass,
            moster_stellar_mass,
        },
        table::load_observation,
    },
};
use ndarray::Array1;
use std::path::Path;
use tracing::warn;

/// Hubble parameter of the tabulated observational data.
pub const TABLE_HUBBLE_H: f64 = 0.7;

/// Error (dex) attached to points sampled from a fitting function.
pub const FIT_ERROR_DEX: f64 = 0.15;

/// Upper redshift of the star-formation integral.
const SMD_INTEGRATION_Z_MAX: f64 = 20.0;

/// ObservationSet — observed points with asymmetric errors (dex).
#[derive(Debug, Clone, PartialEq)]
pub struct ObservationSet {
    pub x: Array1<f64>,
    pub y: Array1<f64>,
    pub err_down: Array1<f64>,
    pub err_up: Array1<f64>,
}

impl ObservationSet {
    pub fn new(x: Array1<f64>, y: Array1<f64>, err_down: Array1<f64>, err_up: Array1<f64>) -> Self {
        ObservationSet { x, y, err_down, err_up }
    }

    /// Points with the same error above and below.
    pub fn symmetric(x: Array1<f64>, y: Array1<f64>, err: Array1<f64>) -> Self {
        ObservationSet { x, y, err_down: err.clone(), err_up: err }
    }

    /// Points with one constant symmetric error.
    pub fn with_constant_error(x: Array1<f64>, y: Array1<f64>, err: f64) -> Self {
        let e = Array1::from_elem(x.len(), err);
        Self::symmetric(x, y, e)
    }

    pub fn len(&self) -> usize {
        self.x.len()
    }

    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }
}

/// Stellar population of a mass function.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Population {
    All,
    Red,
    Blue,
}

impl Population {
    const fn file_prefix(self) -> &'static str {
        match self {
            Population::All => "SMF",
            Population::Red => "SMF_red",
            Population::Blue => "SMF_blue",
        }
    }
}

fn read_log_table(obs_dir: &Path, relative_path: &str) -> DataResult<ObservationSet> {
    let mut cols = load_observation(obs_dir, relative_path, &[0, 1, 2, 3])?.into_iter();
    match (cols.next(), cols.next(), cols.next(), cols.next()) {
        (Some(x), Some(y), Some(dn), Some(up)) => Ok(ObservationSet::new(x, y, dn, up)),
        _ => Err(DataError::EmptyTable {
            path: obs_dir.join(relative_path).display().to_string(),
        }),
    }
}

/// Substitute `fallback` when the table could not be read at all; a
/// present but malformed table is returned as an error.
fn or_fallback<F>(
    loaded: DataResult<ObservationSet>, dataset: &str, fallback: F,
) -> DataResult<ObservationSet>
where
    F: FnOnce() -> DataResult<ObservationSet>,
{
    match loaded {
        Ok(set) => Ok(set),
        Err(err) if err.is_io() => {
            warn!(dataset, error = %err, "observation table unavailable; using fallback data");
            fallback()
        }
        Err(err) => Err(err),
    }
}

/// Observed stellar mass function of `population` at redshift tag `tag`.
///
/// Errors
/// ------
/// - Any [`DataError`] from the table. A missing all-galaxy `z0` table
///   falls back to Baldry et al. (2008) instead.
pub fn stellar_mass_function(
    obs_dir: &Path, population: Population, tag: &str, hubble_h: f64,
) -> DataResult<ObservationSet> {
    let path = format!("SMF/{}_{tag}.dat", population.file_prefix());
    let loaded = read_log_table(obs_dir, &path).map(|mut set| {
        correct_mass_function(
            &mut set.x,
            &mut set.y,
            STELLAR_MASS_H_EXPONENT,
            TABLE_HUBBLE_H,
            hubble_h,
            Imf::Chabrier,
        );
        set
    });
    if population == Population::All && tag == "z0" {
        return or_fallback(loaded, "SMF_z0", || Ok(baldry_smf(hubble_h)));
    }
    loaded
}

/// Baldry et al. (2008) local stellar mass function at the run's `h`.
pub fn baldry_smf(hubble_h: f64) -> ObservationSet {
    let mut x = Array1::from_iter(BALDRY08_SMF.iter().map(|r| r[0]));
    let phi = Array1::from_iter(BALDRY08_SMF.iter().map(|r| r[1]));
    let sigma = Array1::from_iter(BALDRY08_SMF.iter().map(|r| r[2]));
    let (mut y, err_down, err_up) = linear_to_log(&phi, &sigma);
    correct_mass_function(
        &mut x,
        &mut y,
        STELLAR_MASS_H_EXPONENT,
        BALDRY08_HUBBLE_H,
        hubble_h,
        Imf::Salpeter,
    );
    ObservationSet::new(x, y, err_down, err_up)
}

/// Observed black-hole mass function at redshift tag `tag`; a missing `z0`
/// table falls back to an approximate local function.
pub fn black_hole_mass_function(
    obs_dir: &Path, tag: &str, hubble_h: f64,
) -> DataResult<ObservationSet> {
    let loaded = read_log_table(obs_dir, &format!("BHMF/BHMF_{tag}.dat")).map(|mut set| {
        correct_mass_function(
            &mut set.x,
            &mut set.y,
            BLACK_HOLE_MASS_H_EXPONENT,
            TABLE_HUBBLE_H,
            hubble_h,
            Imf::Chabrier,
        );
        set
    });
    if tag == "z0" {
        return or_fallback(loaded, "BHMF_z0", || {
            let x = Array1::from_iter(BHMF_PLACEHOLDER.iter().map(|r| r[0]));
            let y = Array1::from_iter(BHMF_PLACEHOLDER.iter().map(|r| r[1]))
                + density_shift(BHMF_PLACEHOLDER_HUBBLE_H, hubble_h);
            let err = Array1::from_iter(BHMF_PLACEHOLDER.iter().map(|r| r[2]));
            Ok(ObservationSet::symmetric(x, y, err))
        });
    }
    loaded
}

/// McConnell & Ma (2013) black hole–bulge relation sampled at the centers
/// of the bulge-mass bins.
pub fn black_hole_bulge_relation(bulge_edges: &BinEdges) -> ObservationSet {
    let x = bulge_edges.centers();
    let y = x.mapv(mcconnell_ma_bh_mass);
    ObservationSet::with_constant_error(x, y, MM13_SCATTER)
}

/// Moster et al. (2013) halo–stellar mass relation at redshift `z`, sampled
/// at the halo-mass bin centers and re-expressed at the run's `h`.
pub fn halo_stellar_mass_relation(halo_edges: &BinEdges, z: f64, hubble_h: f64) -> ObservationSet {
    let grid = halo_edges.centers();
    let dx = mass_shift(HALO_MASS_H_EXPONENT, MOSTER13_HUBBLE_H, hubble_h);
    let dy = mass_shift(STELLAR_MASS_H_EXPONENT, MOSTER13_HUBBLE_H, hubble_h);
    let y = grid.mapv(|m| moster_stellar_mass(m, z) + dy);
    ObservationSet::with_constant_error(grid + dx, y, MOSTER13_SCATTER)
}

/// Target stellar mass function `(x, y, err)` in run units.
///
/// Errors
/// ------
/// - Any [`DataError`] from the table; there is no fallback.
pub fn target_stellar_mass_function(obs_dir: &Path, tag: &str) -> DataResult<ObservationSet> {
    let path = format!("targets/SMF_{tag}.dat");
    let mut cols = load_observation(obs_dir, &path, &[0, 1, 2])?.into_iter();
    match (cols.next(), cols.next(), cols.next()) {
        (Some(x), Some(y), Some(err)) => Ok(ObservationSet::symmetric(x, y, err)),
        _ => Err(DataError::EmptyTable { path: obs_dir.join(path).display().to_string() }),
    }
}

/// Shift of a log mass density (∝ h) quoted at `h_obs`.
fn mass_density_shift(h_obs: f64, h: f64) -> f64 {
    density_shift(h_obs, h) + mass_shift(STELLAR_MASS_H_EXPONENT, h_obs, h)
}

/// Cosmic star-formation-rate density against lookback time (Gyr) in the
/// run's cosmology. Falls back to the Madau & Dickinson (2014) fit.
pub fn cosmic_sfrd_history(obs_dir: &Path, cosmology: &Cosmology) -> DataResult<ObservationSet> {
    let h = cosmology.hubble_h;
    let loaded = read_log_table(obs_dir, "CSFRDH/CSFRDH.dat").and_then(|mut set| {
        set.x = redshifts_to_lookback(&set.x, cosmology)?;
        set.y += mass_density_shift(TABLE_HUBBLE_H, h);
        Ok(set)
    });
    or_fallback(loaded, "CSFRDH", || {
        let z = Array1::linspace(0.0, 8.0, 41);
        let shift = Imf::Salpeter.sfr_to_chabrier() + mass_density_shift(MD14_HUBBLE_H, h);
        let y = z.mapv(|z| floor_log10(madau_dickinson_sfrd(z)) + shift);
        let x = redshifts_to_lookback(&z, cosmology)?;
        Ok(ObservationSet::with_constant_error(x, y, FIT_ERROR_DEX))
    })
}

/// Stellar mass density against redshift. Falls back to the integrated
/// Madau & Dickinson (2014) history.
pub fn stellar_mass_density_evolution(
    obs_dir: &Path, cosmology: &Cosmology,
) -> DataResult<ObservationSet> {
    let h = cosmology.hubble_h;
    let loaded = read_log_table(obs_dir, "SMD/SMD_evolution.dat").map(|mut set| {
        set.y += mass_density_shift(TABLE_HUBBLE_H, h);
        set
    });
    or_fallback(loaded, "SMD_evolution", || {
        let z = Array1::linspace(0.0, 5.0, 21);
        let shift = Imf::Salpeter.sfr_to_chabrier() + mass_density_shift(MD14_HUBBLE_H, h);
        let mut y = Array1::zeros(z.len());
        for (out, &zi) in y.iter_mut().zip(z.iter()) {
            *out = floor_log10(madau_dickinson_smd(zi, SMD_INTEGRATION_Z_MAX, cosmology)?) + shift;
        }
        Ok(ObservationSet::with_constant_error(z, y, FIT_ERROR_DEX))
    })
}

fn redshifts_to_lookback(z: &Array1<f64>, cosmology: &Cosmology) -> DataResult<Array1<f64>> {
    let mut out = Array1::zeros(z.len());
    for (t, &zi) in out.iter_mut().zip(z.iter()) {
        *t = cosmology.lookback_time(zi)?;
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{binning::BinningConfig, observations::corrections::MAX_LOWER_ERROR_DEX};
    use approx::assert_relative_eq;
    use std::fs;

    #[test]
    // Purpose
    // -------
    // A missing SMF_z0 table falls back to the built-in Baldry et al. (2008)
    // data; a missing z1 table is an error.
    fn smf_z0_falls_back_but_z1_does_not() {
        let dir = tempfile::tempdir().unwrap();
        let set = stellar_mass_function(dir.path(), Population::All, "z0", 0.7).unwrap();
        assert_eq!(set.len(), BALDRY08_SMF.len());
        assert!(set.y.iter().all(|v| v.is_finite()));

        let err = stellar_mass_function(dir.path(), Population::All, "z1", 0.7).unwrap_err();
        assert!(err.is_io());
        let err = stellar_mass_function(dir.path(), Population::Red, "z0", 0.7).unwrap_err();
        assert!(err.is_io());
    }

    #[test]
    // Purpose
    // -------
    // Only an unreadable table triggers a fallback; a corrupt one is
    // reported.
    //
    // Given
    // -----
    // - `SMF/SMF_z0.dat` present with a non-numeric cell.
    //
    // Expect
    // ------
    // - `DataError::MalformedTable` rather than the Baldry et al. (2008)
    //   substitute.
    fn malformed_tables_do_not_fall_back() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("SMF")).unwrap();
        fs::write(dir.path().join("SMF/SMF_z0.dat"), "10.0 -2.0 0.1 0.2
10.5 abc 0.1 0.2
")
            .unwrap();

        let err = stellar_mass_function(dir.path(), Population::All, "z0", 0.7).unwrap_err();
        assert!(matches!(err, DataError::MalformedTable { line: 2, .. }));
        assert!(!err.is_io());
    }

    #[test]
    // Purpose
    // -------
    // The Baldry et al. (2008) rows whose error equals the density keep a
    // bounded lower error.
    //
    // Given
    // -----
    // - The three rows at 11.75–11.95 where σ = φ.
    //
    // Expect
    // ------
    // - Their lower error is the cap; all other rows stay below it.
    fn baldry_lower_errors_are_capped() {
        let set = baldry_smf(0.7);
        let n = set.len();
        for i in n - 3..n {
            assert_eq!(set.err_down[i], MAX_LOWER_ERROR_DEX);
        }
        assert!(set.err_down.iter().take(n - 3).all(|&e| e < MAX_LOWER_ERROR_DEX));
    }

    #[test]
    // Purpose
    // -------
    // Tabulated mass functions are shifted from h = 0.7 to the run's h.
    //
    // Given
    // -----
    // - One SMF row (10.0, −2.0, 0.1, 0.2), run h = 0.6774.
    //
    // Expect
    // ------
    // - x shifted by −2·log10(h/0.7), y by +3·log10(h/0.7); errors kept.
    fn tables_are_corrected_to_run_h() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("SMF")).unwrap();
        fs::write(dir.path().join("SMF/SMF_z1.dat"), "10.0 -2.0 0.1 0.2\n").unwrap();

        let h = 0.6774;
        let set = stellar_mass_function(dir.path(), Population::All, "z1", h).unwrap();
        assert_relative_eq!(set.x[0], 10.0 - 2.0 * (h / 0.7f64).log10(), epsilon = 1e-12);
        assert_relative_eq!(set.y[0], -2.0 + 3.0 * (h / 0.7f64).log10(), epsilon = 1e-12);
        assert_eq!((set.err_down[0], set.err_up[0]), (0.1, 0.2));
    }

    #[test]
    // Purpose
    // -------
    // Density-history fallbacks produce finite, ordered curves.
    fn density_fallbacks_are_well_formed() {
        let dir = tempfile::tempdir().unwrap();
        let cosmo = Cosmology::flat(0.7, 0.3).unwrap();

        let sfrd = cosmic_sfrd_history(dir.path(), &cosmo).unwrap();
        assert!(sfrd.x.windows(2).into_iter().all(|w| w[1] > w[0]));
        assert!(sfrd.x[sfrd.len() - 1] < 14.0);
        assert!(sfrd.y.iter().all(|v| v.is_finite()));

        let smd = stellar_mass_density_evolution(dir.path(), &cosmo).unwrap();
        assert!(smd.y.windows(2).into_iter().all(|w| w[1] < w[0]));
    }

    #[test]
    // Purpose
    // -------
    // Analytic relations are sampled on the configured bin centers.
    fn relations_use_bin_centers() {
        let cfg = BinningConfig::default();
        let bhbm = black_hole_bulge_relation(&cfg.bulge_mass);
        assert_eq!(bhbm.len(), cfg.bulge_mass.n_bins());
        assert_eq!(bhbm.err_up[0], MM13_SCATTER);

        let hsmr = halo_stellar_mass_relation(&cfg.halo_mass, 0.0, MOSTER13_HUBBLE_H);
        assert_eq!(hsmr.x, cfg.halo_mass.centers());
    }

    #[test]
    // Purpose
    // -------
    // Target tables are read verbatim with symmetric errors.
    fn target_tables_are_verbatim() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("targets")).unwrap();
        fs::write(dir.path().join("targets/SMF_z2.dat"), "9.0 -2.5 0.05\n9.5 -2.9 0.07\n")
            .unwrap();

        let set = target_stellar_mass_function(dir.path(), "z2").unwrap();
        assert_eq!(set.y.to_vec(), vec![-2.5, -2.9]);
        assert_eq!(set.err_down, set.err_up);
        assert!(target_stellar_mass_function(dir.path(), "z3").unwrap_err().is_io());
    }
}
