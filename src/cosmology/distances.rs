//! FRW lookback time and distances.
//!
//! Purpose
//! -------
//! Pure conversions from redshift to lookback time, line-of-sight comoving
//! distance and angular-diameter distance for a general (Ωm, Ωk, ΩΛ)
//! cosmology, evaluated by adaptive Simpson quadrature.
//!
//! Conventions
//! -----------
//! - `hubble_h` is the dimensionless H0/100; `hubble_constant` is H0 in
//!   km s⁻¹ Mpc⁻¹. The free functions keep the argument orders used by the
//!   calibration scripts.
//! - Times are in Gyr, distances in Mpc.
//! - z = 0 returns exactly 0 for lookback time and comoving distance.
use crate::cosmology::errors::{CosmologyError, CosmologyResult};

/// Speed of light in km/s.
pub const SPEED_OF_LIGHT_KM_S: f64 = 299_792.458;

/// 1 / (100 km s⁻¹ Mpc⁻¹) in Gyr.
pub const HUBBLE_TIME_GYR_PER_H: f64 = 9.777_922_216_807_891;

const QUAD_TOL: f64 = 1e-10;
const QUAD_MAX_DEPTH: u32 = 48;

/// Cosmology — (h, Ωm, ΩΛ) triple with Ωk = 1 − Ωm − ΩΛ.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Cosmology {
    pub hubble_h: f64,
    pub omega_m: f64,
    pub omega_l: f64,
}

impl Cosmology {
    /// Validate and build a cosmology.
    ///
    /// Errors
    /// ------
    /// - `CosmologyError::InvalidParameter` when `hubble_h` is non-finite or
    ///   ≤ 0, or either density parameter is non-finite or negative.
    pub fn new(hubble_h: f64, omega_m: f64, omega_l: f64) -> CosmologyResult<Self> {
        if !hubble_h.is_finite() || hubble_h <= 0.0 {
            return Err(CosmologyError::InvalidParameter { name: "hubble_h", value: hubble_h });
        }
        if !omega_m.is_finite() || omega_m < 0.0 {
            return Err(CosmologyError::InvalidParameter { name: "omega_m", value: omega_m });
        }
        if !omega_l.is_finite() || omega_l < 0.0 {
            return Err(CosmologyError::InvalidParameter { name: "omega_l", value: omega_l });
        }
        Ok(Cosmology { hubble_h, omega_m, omega_l })
    }

    /// Flat cosmology with ΩΛ = 1 − Ωm.
    pub fn flat(hubble_h: f64, omega_m: f64) -> CosmologyResult<Self> {
        Self::new(hubble_h, omega_m, 1.0 - omega_m)
    }

    pub fn omega_k(&self) -> f64 {
        1.0 - self.omega_m - self.omega_l
    }

    /// Hubble time 1/H0 in Gyr.
    pub fn hubble_time_gyr(&self) -> f64 {
        HUBBLE_TIME_GYR_PER_H / self.hubble_h
    }

    /// Hubble distance c/H0 in Mpc.
    pub fn hubble_distance_mpc(&self) -> f64 {
        SPEED_OF_LIGHT_KM_S / (100.0 * self.hubble_h)
    }

    /// Dimensionless expansion rate E(z) = H(z)/H0.
    pub fn e_of_z(&self, z: f64) -> CosmologyResult<f64> {
        e_of_z(z, self.omega_m, self.omega_k(), self.omega_l)
    }

    /// Lookback time to redshift `z` in Gyr.
    pub fn lookback_time(&self, z: f64) -> CosmologyResult<f64> {
        Ok(self.hubble_time_gyr() * self.lookback_integral(0.0, z)?)
    }

    /// Line-of-sight comoving distance to `z` in Mpc.
    pub fn comoving_distance(&self, z: f64) -> CosmologyResult<f64> {
        check_redshift(z)?;
        let integral = integrate(|zp| Ok(1.0 / self.e_of_z(zp)?), 0.0, z)?;
        Ok(self.hubble_distance_mpc() * integral)
    }

    /// Transverse comoving distance in Mpc (curvature-corrected).
    pub fn transverse_comoving_distance(&self, z: f64) -> CosmologyResult<f64> {
        let d_c = self.comoving_distance(z)?;
        let d_h = self.hubble_distance_mpc();
        let ok = self.omega_k();
        let d_m = if ok > 0.0 {
            let s = ok.sqrt();
            d_h / s * (s * d_c / d_h).sinh()
        } else if ok < 0.0 {
            let s = (-ok).sqrt();
            d_h / s * (s * d_c / d_h).sin()
        } else {
            d_c
        };
        Ok(d_m)
    }

    /// Angular-diameter distance to `z` in Mpc.
    pub fn angular_diameter_distance(&self, z: f64) -> CosmologyResult<f64> {
        Ok(self.transverse_comoving_distance(z)? / (1.0 + z))
    }

    /// ∫ f(z) dt over the cosmic time elapsed between `z_lo` and `z_hi`
    /// (`z_lo <= z_hi`), with dt in Gyr.
    ///
    /// Used to accumulate rate densities (e.g. star formation) into
    /// integrated densities.
    pub fn integrate_over_time<F>(&self, f: F, z_lo: f64, z_hi: f64) -> CosmologyResult<f64>
    where
        F: Fn(f64) -> f64,
    {
        check_redshift(z_lo)?;
        check_redshift(z_hi)?;
        let integral =
            integrate(|zp| Ok(f(zp) / ((1.0 + zp) * self.e_of_z(zp)?)), z_lo, z_hi)?;
        Ok(self.hubble_time_gyr() * integral)
    }

    fn lookback_integral(&self, z_lo: f64, z_hi: f64) -> CosmologyResult<f64> {
        check_redshift(z_hi)?;
        integrate(|zp| Ok(1.0 / ((1.0 + zp) * self.e_of_z(zp)?)), z_lo, z_hi)
    }
}

/// E(z) for explicit density parameters.
///
/// Errors
/// ------
/// - `CosmologyError::NonPhysicalExpansion` when E²(z) ≤ 0 or non-finite.
pub fn e_of_z(z: f64, omega_m: f64, omega_k: f64, omega_l: f64) -> CosmologyResult<f64> {
    let zp1 = 1.0 + z;
    let e2 = omega_m * zp1.powi(3) + omega_k * zp1 * zp1 + omega_l;
    if !(e2 > 0.0) || !e2.is_finite() {
        return Err(CosmologyError::NonPhysicalExpansion { z, e2 });
    }
    Ok(e2.sqrt())
}

/// Lookback time (Gyr) to redshift `z` for dimensionless `h0`, Ωm and ΩΛ;
/// curvature is 1 − Ωm − ΩΛ. Monotonically increasing in `z`.
pub fn z_to_lookback_time(z: f64, h0: f64, omega_m: f64, omega_l: f64) -> CosmologyResult<f64> {
    Cosmology::new(h0, omega_m, omega_l)?.lookback_time(z)
}

/// Line-of-sight comoving distance (Mpc) for H0 in km s⁻¹ Mpc⁻¹.
///
/// `omega_k` is taken as given rather than derived, so inconsistent triples
/// are evaluated as supplied.
pub fn comoving_distance(
    z: f64, hubble_constant: f64, omega_k: f64, omega_m: f64, omega_l: f64,
) -> CosmologyResult<f64> {
    check_redshift(z)?;
    check_hubble_constant(hubble_constant)?;
    let integral = integrate(|zp| Ok(1.0 / e_of_z(zp, omega_m, omega_k, omega_l)?), 0.0, z)?;
    Ok(SPEED_OF_LIGHT_KM_S / hubble_constant * integral)
}

/// Angular-diameter distance (Mpc) for H0 in km s⁻¹ Mpc⁻¹.
pub fn z_to_angular_diameter_distance(
    z: f64, hubble_constant: f64, omega_m: f64, omega_k: f64, omega_l: f64,
) -> CosmologyResult<f64> {
    let d_c = comoving_distance(z, hubble_constant, omega_k, omega_m, omega_l)?;
    let d_h = SPEED_OF_LIGHT_KM_S / hubble_constant;
    let d_m = if omega_k > 0.0 {
        let s = omega_k.sqrt();
        d_h / s * (s * d_c / d_h).sinh()
    } else if omega_k < 0.0 {
        let s = (-omega_k).sqrt();
        d_h / s * (s * d_c / d_h).sin()
    } else {
        d_c
    };
    Ok(d_m / (1.0 + z))
}

fn check_redshift(z: f64) -> CosmologyResult<()> {
    if !z.is_finite() || z < 0.0 {
        return Err(CosmologyError::InvalidRedshift { z });
    }
    Ok(())
}

fn check_hubble_constant(hubble_constant: f64) -> CosmologyResult<()> {
    if !hubble_constant.is_finite() || hubble_constant <= 0.0 {
        return Err(CosmologyError::InvalidParameter {
            name: "hubble_constant",
            value: hubble_constant,
        });
    }
    Ok(())
}

/// Adaptive Simpson quadrature of a fallible integrand over `[a, b]`.
pub(crate) fn integrate<F>(f: F, a: f64, b: f64) -> CosmologyResult<f64>
where
    F: Fn(f64) -> CosmologyResult<f64>,
{
    if a == b {
        return Ok(0.0);
    }
    let (lo, hi, sign) = if a < b { (a, b, 1.0) } else { (b, a, -1.0) };
    let fa = f(lo)?;
    let fb = f(hi)?;
    let m = 0.5 * (lo + hi);
    let fm = f(m)?;
    let whole = (hi - lo) / 6.0 * (fa + 4.0 * fm + fb);
    let value = simpson_step(&f, lo, hi, fa, fm, fb, whole, QUAD_TOL, QUAD_MAX_DEPTH)?;
    Ok(sign * value)
}

#[allow(clippy::too_many_arguments)]
fn simpson_step<F>(
    f: &F, a: f64, b: f64, fa: f64, fm: f64, fb: f64, whole: f64, tol: f64, depth: u32,
) -> CosmologyResult<f64>
where
    F: Fn(f64) -> CosmologyResult<f64>,
{
    let m = 0.5 * (a + b);
    let lm = 0.5 * (a + m);
    let rm = 0.5 * (m + b);
    let flm = f(lm)?;
    let frm = f(rm)?;
    let left = (m - a) / 6.0 * (fa + 4.0 * flm + fm);
    let right = (b - m) / 6.0 * (fm + 4.0 * frm + fb);
    let delta = left + right - whole;
    if !delta.is_finite() {
        return Err(CosmologyError::QuadratureDidNotConverge { a, b });
    }
    // Floor the tolerance at round-off level of the partial sum.
    let tol_eff = tol.max(1e-15 * (left + right).abs());
    if delta.abs() <= 15.0 * tol_eff {
        return Ok(left + right + delta / 15.0);
    }
    if depth == 0 {
        return Err(CosmologyError::QuadratureDidNotConverge { a, b });
    }
    let l = simpson_step(f, a, m, fa, flm, fm, left, 0.5 * tol, depth - 1)?;
    let r = simpson_step(f, m, b, fm, frm, fb, right, 0.5 * tol, depth - 1)?;
    Ok(l + r)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover:
    // - z = 0 edge case and monotonicity of lookback time.
    // - Agreement with the closed-form flat ΛCDM lookback time.
    // - Einstein–de Sitter comoving distance (closed form).
    // - Curvature handling and non-physical parameter combinations.
    // -------------------------------------------------------------------------

    /// Closed-form flat ΛCDM lookback time (Gyr).
    fn flat_lcdm_lookback(z: f64, h: f64, om: f64) -> f64 {
        let ol = 1.0 - om;
        let t_h = HUBBLE_TIME_GYR_PER_H / h;
        let k = (ol / om).sqrt();
        2.0 / (3.0 * ol.sqrt()) * t_h * (k.asinh() - (k * (1.0 + z).powf(-1.5)).asinh())
    }

    #[test]
    // Purpose
    // -------
    // z = 0 yields exactly zero lookback time and comoving distance.
    fn zero_redshift_is_zero() {
        assert_eq!(z_to_lookback_time(0.0, 0.6774, 0.3089, 0.6911).unwrap(), 0.0);
        assert_eq!(comoving_distance(0.0, 67.74, 0.0, 0.3089, 0.6911).unwrap(), 0.0);
        assert_eq!(z_to_angular_diameter_distance(0.0, 67.74, 0.3089, 0.0, 0.6911).unwrap(), 0.0);
    }

    #[test]
    // Purpose
    // -------
    // Quadrature agrees with the analytic flat ΛCDM lookback time and is
    // monotonically increasing with z.
    //
    // Given
    // -----
    // - h = 0.73, Ωm = 0.25, ΩΛ = 0.75 (Millennium cosmology).
    //
    // Expect
    // ------
    // - Relative agreement better than 1e-8 at several redshifts.
    // - Strictly increasing sequence.
    fn lookback_time_matches_closed_form_and_is_monotone() {
        let (h, om) = (0.73, 0.25);
        let zs = [0.1, 0.5, 1.0, 2.0, 4.0, 10.0];
        let mut previous = 0.0;
        for &z in &zs {
            let t = z_to_lookback_time(z, h, om, 1.0 - om).unwrap();
            assert_relative_eq!(t, flat_lcdm_lookback(z, h, om), max_relative = 1e-8);
            assert!(t > previous);
            previous = t;
        }
    }

    #[test]
    // Purpose
    // -------
    // Einstein–de Sitter comoving distance follows 2 c/H0 (1 − 1/sqrt(1+z)).
    fn comoving_distance_matches_einstein_de_sitter() {
        let h0 = 70.0;
        let z = 3.0;
        let expected = 2.0 * SPEED_OF_LIGHT_KM_S / h0 * (1.0 - 1.0 / (1.0f64 + z).sqrt());
        let d_c = comoving_distance(z, h0, 0.0, 1.0, 0.0).unwrap();
        assert_relative_eq!(d_c, expected, max_relative = 1e-8);
    }

    #[test]
    // Purpose
    // -------
    // Open curvature increases the transverse distance relative to the
    // line-of-sight distance, and the Cosmology method agrees with the
    // free function.
    fn angular_diameter_distance_handles_curvature() {
        let cosmo = Cosmology::new(0.7, 0.3, 0.0).unwrap();
        let z = 2.0;
        let d_c = cosmo.comoving_distance(z).unwrap();
        let d_m = cosmo.transverse_comoving_distance(z).unwrap();
        assert!(d_m > d_c);

        let d_a = z_to_angular_diameter_distance(z, 70.0, 0.3, cosmo.omega_k(), 0.0).unwrap();
        assert_relative_eq!(cosmo.angular_diameter_distance(z).unwrap(), d_a, max_relative = 1e-10);
    }

    #[test]
    // Purpose
    // -------
    // A closed universe whose expansion turns around before z is reached is
    // reported as non-physical; negative redshifts are rejected.
    fn non_physical_configurations_fail() {
        let err = z_to_lookback_time(5.0, 0.7, 0.0, 2.0).unwrap_err();
        assert!(matches!(err, CosmologyError::NonPhysicalExpansion { .. }));

        let err = z_to_lookback_time(-0.5, 0.7, 0.3, 0.7).unwrap_err();
        assert_eq!(err, CosmologyError::InvalidRedshift { z: -0.5 });
    }
}
