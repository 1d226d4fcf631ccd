//! Hubble-convention and IMF corrections for literature data.
//!
//! Conventions
//! -----------
//! - A mass quoted at h_obs that scales as h⁻ⁿ moves by
//!   `n · log10(h_obs / h)` dex when re-expressed at the run's `h`.
//! - Number densities scale as h³: `log φ += 3 · log10(h / h_obs)`.
//! - Stellar masses are brought to a Chabrier IMF by fixed offsets.
use ndarray::Array1;

/// Stellar-mass exponent of h (M ∝ h⁻²).
pub const STELLAR_MASS_H_EXPONENT: f64 = 2.0;
/// Halo-mass exponent of h (M ∝ h⁻¹).
pub const HALO_MASS_H_EXPONENT: f64 = 1.0;
/// Black-hole masses are quoted without an h dependence.
pub const BLACK_HOLE_MASS_H_EXPONENT: f64 = 0.0;

/// Salpeter → Chabrier stellar-mass offset (dex).
pub const SALPETER_TO_CHABRIER: f64 = -0.26;
/// Kroupa → Chabrier stellar-mass offset (dex).
pub const KROUPA_TO_CHABRIER: f64 = -0.04;
/// Salpeter → Chabrier factor applied to SFR densities.
pub const SALPETER_TO_CHABRIER_SFR: f64 = 0.63;

/// Initial mass function assumed by a dataset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Imf {
    Chabrier,
    Salpeter,
    Kroupa,
}

impl Imf {
    /// Offset (dex) bringing stellar masses to Chabrier.
    pub const fn to_chabrier(self) -> f64 {
        match self {
            Imf::Chabrier => 0.0,
            Imf::Salpeter => SALPETER_TO_CHABRIER,
            Imf::Kroupa => KROUPA_TO_CHABRIER,
        }
    }

    /// Offset (dex) bringing SFR densities to Chabrier.
    pub fn sfr_to_chabrier(self) -> f64 {
        match self {
            Imf::Chabrier => 0.0,
            Imf::Salpeter => SALPETER_TO_CHABRIER_SFR.log10(),
            Imf::Kroupa => KROUPA_TO_CHABRIER,
        }
    }
}

/// Shift of a log mass quoted at `h_obs` when re-expressed at `h`.
#[inline]
pub fn mass_shift(h_exponent: f64, h_obs: f64, h: f64) -> f64 {
    h_exponent * (h_obs / h).log10()
}

/// Shift of a log number density quoted at `h_obs` when re-expressed at `h`.
#[inline]
pub fn density_shift(h_obs: f64, h: f64) -> f64 {
    3.0 * (h / h_obs).log10()
}

/// Re-express a log mass function `(x, log φ)` at the run's `h` and a
/// Chabrier IMF. Error bars in dex are unchanged.
pub fn correct_mass_function(
    x: &mut Array1<f64>, y: &mut Array1<f64>, h_exponent: f64, h_obs: f64, h: f64, imf: Imf,
) {
    let dx = mass_shift(h_exponent, h_obs, h) + imf.to_chabrier();
    let dy = density_shift(h_obs, h);
    x.mapv_inplace(|v| v + dx);
    y.mapv_inplace(|v| v + dy);
}

/// Largest lower error bar, in dex, produced by [`linear_to_log`].
pub const MAX_LOWER_ERROR_DEX: f64 = 1.0;

/// Linear φ with symmetric linear errors → (log φ, err_down, err_up) in dex.
///
/// Lower errors are capped at [`MAX_LOWER_ERROR_DEX`]; a point with
/// `φ − σ ≤ 0` would otherwise reach the log floor and carry a ~15 dex
/// error bar that removes it from any fit.
pub fn linear_to_log(
    phi: &Array1<f64>, sigma: &Array1<f64>,
) -> (Array1<f64>, Array1<f64>, Array1<f64>) {
    use crate::binning::floor_log10;

    let y = phi.mapv(floor_log10);
    let up = Array1::from_iter(
        phi.iter().zip(sigma).map(|(&p, &s)| floor_log10(p + s) - floor_log10(p)),
    );
    let down = Array1::from_iter(
        phi.iter()
            .zip(sigma)
            .map(|(&p, &s)| (floor_log10(p) - floor_log10(p - s)).min(MAX_LOWER_ERROR_DEX)),
    );
    (y, down, up)
}
