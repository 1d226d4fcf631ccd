//! Published fitting functions and built-in fallback tables.
//!
//! Every function here is quoted in the authors' own conventions (Hubble
//! parameter, IMF); callers apply [`crate::observations::corrections`].
use crate::cosmology::{Cosmology, CosmologyResult};

// ---- Madau & Dickinson (2014) ----

/// Hubble parameter assumed by Madau & Dickinson (2014).
pub const MD14_HUBBLE_H: f64 = 0.7;
/// Return fraction converting formed into surviving stellar mass.
pub const MD14_RETURN_FRACTION: f64 = 0.27;

/// Cosmic SFR density ψ(z) in M☉ yr⁻¹ Mpc⁻³ (Salpeter IMF).
#[inline]
pub fn madau_dickinson_sfrd(z: f64) -> f64 {
    let zp1 = 1.0 + z;
    0.015 * zp1.powf(2.7) / (1.0 + (zp1 / 2.9).powf(5.6))
}

/// Stellar mass density ρ★(z) in M☉ Mpc⁻³ (Salpeter IMF): the integral of
/// ψ over cosmic time from `z_max` down to `z`, reduced by the return
/// fraction.
pub fn madau_dickinson_smd(z: f64, z_max: f64, cosmology: &Cosmology) -> CosmologyResult<f64> {
    let formed_per_gyr = cosmology.integrate_over_time(madau_dickinson_sfrd, z, z_max)?;
    Ok((1.0 - MD14_RETURN_FRACTION) * formed_per_gyr * crate::binning::GYR_TO_YR)
}

// ---- McConnell & Ma (2013) ----

pub const MM13_ALPHA: f64 = 8.46;
pub const MM13_BETA: f64 = 1.05;
/// Intrinsic scatter (dex).
pub const MM13_SCATTER: f64 = 0.34;

/// log10 M_BH for a log10 bulge mass, both in M☉.
#[inline]
pub fn mcconnell_ma_bh_mass(log_bulge_mass: f64) -> f64 {
    MM13_ALPHA + MM13_BETA * (log_bulge_mass - 11.0)
}

// ---- Moster, Naab & White (2013) ----

/// Hubble parameter assumed by Moster et al. (2013).
pub const MOSTER13_HUBBLE_H: f64 = 0.704;
/// Scatter in stellar mass at fixed halo mass (dex).
pub const MOSTER13_SCATTER: f64 = 0.15;

const M10: f64 = 11.590;
const M11: f64 = 1.195;
const N10: f64 = 0.0351;
const N11: f64 = -0.0247;
const BETA10: f64 = 1.376;
const BETA11: f64 = -0.826;
const GAMMA10: f64 = 0.608;
const GAMMA11: f64 = 0.329;

/// log10 M★ for a log10 halo mass at redshift `z` (both in M☉).
pub fn moster_stellar_mass(log_halo_mass: f64, z: f64) -> f64 {
    let s = z / (1.0 + z);
    let log_m1 = M10 + M11 * s;
    let n = N10 + N11 * s;
    let beta = BETA10 + BETA11 * s;
    let gamma = GAMMA10 + GAMMA11 * s;

    let ratio = 10f64.powf(log_halo_mass - log_m1);
    let fraction = 2.0 * n / (ratio.powf(-beta) + ratio.powf(gamma));
    log_halo_mass + fraction.log10()
}

// ---- Baldry, Glazebrook & Driver (2008) ----

/// Hubble parameter of the Baldry et al. (2008) table (h = 1 units).
pub const BALDRY08_HUBBLE_H: f64 = 1.0;

/// Local stellar mass function: (log10 M★ [M☉ h⁻²], φ [h³ Mpc⁻³ dex⁻¹],
/// σφ).
pub const BALDRY08_SMF: [[f64; 3]; 50] = [
    [7.05, 1.3531e-01, 6.0741e-02],
    [7.15, 1.3474e-01, 6.0109e-02],
    [7.25, 2.0971e-01, 7.7965e-02],
    [7.35, 1.7161e-01, 3.1841e-02],
    [7.45, 2.1648e-01, 5.7832e-02],
    [7.55, 2.1645e-01, 3.9988e-02],
    [7.65, 2.0837e-01, 4.8713e-02],
    [7.75, 2.0402e-01, 7.0061e-02],
    [7.85, 1.5536e-01, 3.9182e-02],
    [7.95, 1.5232e-01, 2.6824e-02],
    [8.05, 1.5067e-01, 4.8824e-02],
    [8.15, 1.3032e-01, 2.1892e-02],
    [8.25, 1.2545e-01, 3.5526e-02],
    [8.35, 9.8472e-02, 2.7181e-02],
    [8.45, 8.7194e-02, 2.8345e-02],
    [8.55, 7.0758e-02, 2.0808e-02],
    [8.65, 5.8190e-02, 1.3359e-02],
    [8.75, 5.6057e-02, 1.3512e-02],
    [8.85, 5.1380e-02, 1.2815e-02],
    [8.95, 4.4206e-02, 9.6866e-03],
    [9.05, 4.1149e-02, 1.0169e-02],
    [9.15, 3.4959e-02, 6.7898e-03],
    [9.25, 3.3111e-02, 8.3704e-03],
    [9.35, 3.0138e-02, 4.7741e-03],
    [9.45, 2.6692e-02, 5.5029e-03],
    [9.55, 2.4656e-02, 4.4359e-03],
    [9.65, 2.2885e-02, 3.7915e-03],
    [9.75, 2.1849e-02, 3.9812e-03],
    [9.85, 2.0383e-02, 3.2930e-03],
    [9.95, 1.9929e-02, 2.9370e-03],
    [10.05, 1.8865e-02, 2.4624e-03],
    [10.15, 1.8136e-02, 2.5208e-03],
    [10.25, 1.7657e-02, 2.4217e-03],
    [10.35, 1.6616e-02, 2.2784e-03],
    [10.45, 1.6114e-02, 2.1783e-03],
    [10.55, 1.4366e-02, 1.8819e-03],
    [10.65, 1.2588e-02, 1.8249e-03],
    [10.75, 1.1372e-02, 1.4436e-03],
    [10.85, 9.1213e-03, 1.5816e-03],
    [10.95, 6.1125e-03, 9.6735e-04],
    [11.05, 4.3923e-03, 9.6254e-04],
    [11.15, 2.5463e-03, 5.0038e-04],
    [11.25, 1.4298e-03, 4.2816e-04],
    [11.35, 6.4867e-04, 1.6439e-04],
    [11.45, 2.8294e-04, 9.9799e-05],
    [11.55, 1.0617e-04, 4.9085e-05],
    [11.65, 3.2702e-05, 2.4546e-05],
    [11.75, 1.2571e-05, 1.2571e-05],
    [11.85, 8.4589e-06, 8.4589e-06],
    [11.95, 7.4764e-06, 7.4764e-06],
];

// ---- Local black-hole mass function (placeholder) ----

/// Hubble parameter assumed by the placeholder table.
pub const BHMF_PLACEHOLDER_HUBBLE_H: f64 = 0.7;

/// Approximate local black-hole mass function: (log10 M_BH [M☉],
/// log10 φ [Mpc⁻³ dex⁻¹], error [dex]).
pub const BHMF_PLACEHOLDER: [[f64; 3]; 9] = [
    [6.5, -2.00, 0.30],
    [7.0, -2.15, 0.30],
    [7.5, -2.35, 0.30],
    [8.0, -2.60, 0.30],
    [8.5, -3.00, 0.30],
    [9.0, -3.55, 0.35],
    [9.5, -4.30, 0.40],
    [10.0, -5.30, 0.50],
    [10.5, -6.60, 0.60],
];

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    // Purpose
    // -------
    // ψ(z) reproduces the published normalization and peaks near z ≈ 2.
    fn madau_dickinson_shape() {
        assert_relative_eq!(
            madau_dickinson_sfrd(0.0),
            0.015 / (1.0 + (1.0f64 / 2.9).powf(5.6)),
            max_relative = 1e-12
        );
        let peak = (0..100)
            .map(|i| i as f64 * 0.05)
            .max_by(|a, b| madau_dickinson_sfrd(*a).total_cmp(&madau_dickinson_sfrd(*b)))
            .unwrap();
        assert!((1.5..2.3).contains(&peak), "peak at z = {peak}");
    }

    #[test]
    // Purpose
    // -------
    // The integrated stellar mass density decreases with redshift and is of
    // the right order locally (a few 1e8 M☉ Mpc⁻³).
    fn stellar_mass_density_decreases_with_redshift() {
        let cosmo = Cosmology::flat(MD14_HUBBLE_H, 0.3).unwrap();
        let rho0 = madau_dickinson_smd(0.0, 20.0, &cosmo).unwrap();
        let rho2 = madau_dickinson_smd(2.0, 20.0, &cosmo).unwrap();

        assert!(rho0 > rho2);
        assert!((1e8..1e9).contains(&rho0), "rho0 = {rho0}");
    }

    #[test]
    // Purpose
    // -------
    // Relations pass through their pivot points.
    fn relations_pass_through_pivots() {
        assert_relative_eq!(mcconnell_ma_bh_mass(11.0), MM13_ALPHA);
        // At M = M1 the stellar fraction is exactly N.
        assert_relative_eq!(
            moster_stellar_mass(M10, 0.0),
            M10 + N10.log10(),
            max_relative = 1e-12
        );
        assert!(moster_stellar_mass(12.0, 2.0) < moster_stellar_mass(12.0, 0.0));
    }
}
