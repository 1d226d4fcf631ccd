//! Relation-specific hooks: which observations a kind is compared against,
//! how its model curve is extracted from a [`ModelBundle`], and which
//! per-galaxy cloud its figure shows.
use crate::{
    binning::{BinEdges, BinningConfig, LOG_FLOOR, binned_median, dilute_indices},
    catalog::{DataResult, ModelBundle},
    config::ConstraintSettings,
    constraints::kind::ConstraintKind,
    observations::{
        ObservationSet, Population, black_hole_bulge_relation, black_hole_mass_function,
        cosmic_sfrd_history, halo_stellar_mass_relation, stellar_mass_density_evolution,
        stellar_mass_function, target_stellar_mass_function,
    },
};
use ndarray::Array1;

/// A model or reference curve `y(x)`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Curve {
    pub x: Array1<f64>,
    pub y: Array1<f64>,
}

impl Curve {
    pub fn new(x: Array1<f64>, y: Array1<f64>) -> Self {
        Curve { x, y }
    }

    pub fn len(&self) -> usize {
        self.x.len()
    }

    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }

    /// Points reordered by increasing x.
    pub fn sorted(&self) -> Curve {
        let mut order: Vec<usize> = (0..self.x.len()).collect();
        order.sort_by(|&a, &b| self.x[a].total_cmp(&self.x[b]));
        Curve {
            x: order.iter().map(|&i| self.x[i]).collect(),
            y: order.iter().map(|&i| self.y[i]).collect(),
        }
    }
}

/// Observed data for `kind` in the run's conventions.
pub fn observations(
    kind: ConstraintKind, settings: &ConstraintSettings,
) -> DataResult<ObservationSet> {
    let obs_dir = settings.obs_dir.as_path();
    let h = settings.sim.hubble_h;
    let binning = &settings.binning;
    match kind {
        ConstraintKind::Smf(e) => stellar_mass_function(obs_dir, Population::All, e.tag(), h),
        ConstraintKind::SmfRed(e) => stellar_mass_function(obs_dir, Population::Red, e.tag(), h),
        ConstraintKind::SmfBlue(e) => {
            stellar_mass_function(obs_dir, Population::Blue, e.tag(), h)
        }
        ConstraintKind::TargetSmf(e) => target_stellar_mass_function(obs_dir, e.tag()),
        ConstraintKind::Bhmf(e) => black_hole_mass_function(obs_dir, e.tag(), h),
        ConstraintKind::Bhbm(_) => Ok(black_hole_bulge_relation(&binning.bulge_mass)),
        ConstraintKind::Hsmr(e) => {
            Ok(halo_stellar_mass_relation(&binning.halo_mass, e.redshift(), h))
        }
        ConstraintKind::Csfrdh => cosmic_sfrd_history(obs_dir, &settings.sim.cosmology()?),
        ConstraintKind::SmdEvolution => {
            stellar_mass_density_evolution(obs_dir, &settings.sim.cosmology()?)
        }
    }
}

/// Model curve of `kind` extracted from `bundle`.
///
/// Mass functions come from the first snapshot row; the stellar mass
/// density evolution uses one point per snapshot; relations are binned
/// medians of galaxies with a non-empty y, one point per bin.
pub fn model_curve(kind: ConstraintKind, bundle: &ModelBundle, binning: &BinningConfig) -> Curve {
    let first_row = |hist: &ndarray::Array2<f64>| {
        if hist.nrows() == 0 { Array1::zeros(0) } else { hist.row(0).to_owned() }
    };
    match kind {
        ConstraintKind::Smf(_) | ConstraintKind::TargetSmf(_) => {
            Curve::new(binning.stellar_mass.centers(), first_row(&bundle.smf))
        }
        ConstraintKind::SmfRed(_) => {
            Curve::new(binning.stellar_mass.centers(), first_row(&bundle.smf_red))
        }
        ConstraintKind::SmfBlue(_) => {
            Curve::new(binning.stellar_mass.centers(), first_row(&bundle.smf_blue))
        }
        ConstraintKind::Bhmf(_) => {
            Curve::new(binning.black_hole_mass.centers(), first_row(&bundle.bhmf))
        }
        ConstraintKind::Bhbm(_) => median_relation(
            &bundle.bulge_mass,
            &bundle.black_hole_mass,
            binning,
            &binning.bulge_mass,
        ),
        ConstraintKind::Hsmr(_) => {
            median_relation(&bundle.halo_mass, &bundle.stellar_mass, binning, &binning.halo_mass)
        }
        ConstraintKind::Csfrdh => {
            let edges = &bundle.time_bin_edges;
            let n = bundle.sfrd_age.len().min(edges.len().saturating_sub(1));
            let centers = Array1::from_iter((0..n).map(|i| 0.5 * (edges[i] + edges[i + 1])));
            Curve::new(centers, bundle.sfrd_age.slice(ndarray::s![..n]).to_owned())
        }
        ConstraintKind::SmdEvolution => {
            Curve::new(bundle.redshifts.clone(), bundle.stellar_mass_density.clone())
        }
    }
}

/// Median relation sampled at every bin center; bins below the minimum
/// population hold the −20 sentinel so the curve spans all of `edges`.
fn median_relation(
    x: &Array1<f64>, y: &Array1<f64>, binning: &BinningConfig, edges: &BinEdges,
) -> Curve {
    let centers = edges.centers();
    let mut medians = Array1::from_elem(centers.len(), LOG_FLOOR);
    let (xs, ys): (Vec<f64>, Vec<f64>) =
        x.iter().zip(y).filter(|&(_, &yi)| yi > LOG_FLOOR).map(|(&a, &b)| (a, b)).unzip();
    // xs and ys come from one unzip, so lengths always agree.
    if let Ok(rel) = binned_median(&xs, &ys, edges, binning.min_galaxies) {
        for (&xc, &m) in rel.x.iter().zip(&rel.median) {
            if let Some(i) = edges.bin_index(xc) {
                medians[i] = m;
            }
        }
    }
    Curve::new(centers, medians)
}

/// Diluted per-galaxy cloud drawn behind relation figures.
pub fn scatter_cloud(
    kind: ConstraintKind, bundle: &ModelBundle, dilute: usize,
) -> Option<(Array1<f64>, Array1<f64>)> {
    let (x, y) = match kind {
        ConstraintKind::Bhbm(_) => (&bundle.bulge_mass, &bundle.black_hole_mass),
        ConstraintKind::Hsmr(_) => (&bundle.halo_mass, &bundle.stellar_mass),
        _ => return None,
    };
    let keep: Vec<usize> =
        (0..x.len()).filter(|&i| x[i] > LOG_FLOOR && y[i] > LOG_FLOOR).collect();
    let picked = dilute_indices(keep.len(), dilute);
    Some((
        picked.iter().map(|&i| x[keep[i]]).collect(),
        picked.iter().map(|&i| y[keep[i]]).collect(),
    ))
}
