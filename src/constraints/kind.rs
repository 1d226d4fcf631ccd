//! Constraint kinds: the closed set of relations × redshifts the registry
//! accepts, with their physical domains and plot capabilities.
//!
//! Key behaviors
//! -------------
//! - [`REGISTRY`] lists every accepted kind; [`ConstraintKind::from_name`]
//!   is the only way a spec name becomes a kind.
//! - Plot selection is an explicit [`Capabilities`] value per kind rather
//!   than a naming convention.
use crate::constraints::plotting::Figure;
use std::fmt;

/// Target redshift of a single-epoch constraint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Epoch {
    Z0,
    Z0p5,
    Z1,
    Z2,
    Z3,
    Z4,
}

impl Epoch {
    pub const fn redshift(self) -> f64 {
        match self {
            Epoch::Z0 => 0.0,
            Epoch::Z0p5 => 0.5,
            Epoch::Z1 => 1.0,
            Epoch::Z2 => 2.0,
            Epoch::Z3 => 3.0,
            Epoch::Z4 => 4.0,
        }
    }

    /// Name suffix and observation-table tag (`z0`, `z0p5`, ...).
    pub const fn tag(self) -> &'static str {
        match self {
            Epoch::Z0 => "z0",
            Epoch::Z0p5 => "z0p5",
            Epoch::Z1 => "z1",
            Epoch::Z2 => "z2",
            Epoch::Z3 => "z3",
            Epoch::Z4 => "z4",
        }
    }
}

/// Redshifts sampled by the stellar-mass-density evolution constraint.
pub const SMD_EVOLUTION_REDSHIFTS: [f64; 6] = [0.0, 0.5, 1.0, 2.0, 3.0, 4.0];

/// One concrete constraint: a relation at one epoch, or a history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConstraintKind {
    /// Stellar mass function of all galaxies.
    Smf(Epoch),
    /// Stellar mass function of quiescent galaxies.
    SmfRed(Epoch),
    /// Stellar mass function of star-forming galaxies.
    SmfBlue(Epoch),
    /// Stellar mass function against a user-supplied target table.
    TargetSmf(Epoch),
    Bhmf(Epoch),
    /// Black hole–bulge mass relation.
    Bhbm(Epoch),
    /// Halo–stellar mass relation.
    Hsmr(Epoch),
    /// Cosmic star-formation-rate density against lookback time.
    Csfrdh,
    /// Stellar mass density against redshift.
    SmdEvolution,
}

/// Every accepted constraint kind, in registry order.
pub const REGISTRY: [ConstraintKind; 33] = {
    use ConstraintKind::*;
    use Epoch::*;
    [
        Smf(Z0),
        Smf(Z0p5),
        Smf(Z1),
        Smf(Z2),
        Smf(Z3),
        Smf(Z4),
        SmfRed(Z0),
        SmfRed(Z0p5),
        SmfRed(Z1),
        SmfRed(Z2),
        SmfBlue(Z0),
        SmfBlue(Z0p5),
        SmfBlue(Z1),
        SmfBlue(Z2),
        TargetSmf(Z0),
        TargetSmf(Z0p5),
        TargetSmf(Z1),
        TargetSmf(Z2),
        TargetSmf(Z3),
        TargetSmf(Z4),
        Bhmf(Z0),
        Bhmf(Z0p5),
        Bhmf(Z1),
        Bhmf(Z2),
        Bhbm(Z0),
        Hsmr(Z0),
        Hsmr(Z0p5),
        Hsmr(Z1),
        Hsmr(Z2),
        Hsmr(Z3),
        Hsmr(Z4),
        Csfrdh,
        SmdEvolution,
    ]
};

/// Figures a constraint contributes to after each evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Capabilities {
    /// Figures drawn from this constraint's own data.
    pub figures: &'static [Figure],
    /// Draw a combined red + blue stellar mass function using a companion
    /// blue constraint (falling back to [`Figure::SmfRed`]).
    pub color_companion: bool,
}

impl ConstraintKind {
    /// Look up a registry name such as `SMF_z0p5` or `CSFRDH`.
    pub fn from_name(name: &str) -> Option<Self> {
        REGISTRY.iter().copied().find(|kind| kind.name() == name)
    }

    pub fn name(&self) -> String {
        match self {
            ConstraintKind::Smf(e) => format!("SMF_{}", e.tag()),
            ConstraintKind::SmfRed(e) => format!("SMF_red_{}", e.tag()),
            ConstraintKind::SmfBlue(e) => format!("SMF_blue_{}", e.tag()),
            ConstraintKind::TargetSmf(e) => format!("TARGET_SMF_{}", e.tag()),
            ConstraintKind::Bhmf(e) => format!("BHMF_{}", e.tag()),
            ConstraintKind::Bhbm(e) => format!("BHBM_{}", e.tag()),
            ConstraintKind::Hsmr(e) => format!("HSMR_{}", e.tag()),
            ConstraintKind::Csfrdh => "CSFRDH".to_string(),
            ConstraintKind::SmdEvolution => "SMD_evolution".to_string(),
        }
    }

    /// Physical validity range of x; domain overrides must lie inside it.
    pub const fn domain(&self) -> (f64, f64) {
        match self {
            ConstraintKind::Smf(_)
            | ConstraintKind::SmfRed(_)
            | ConstraintKind::SmfBlue(_)
            | ConstraintKind::TargetSmf(_) => (8.0, 13.0),
            ConstraintKind::Bhmf(_) => (6.0, 11.0),
            ConstraintKind::Bhbm(_) => (8.5, 12.5),
            ConstraintKind::Hsmr(_) => (10.0, 15.0),
            ConstraintKind::Csfrdh => (0.0, 14.0),
            ConstraintKind::SmdEvolution => (0.0, 5.0),
        }
    }

    pub const fn epoch(&self) -> Option<Epoch> {
        match self {
            ConstraintKind::Smf(e)
            | ConstraintKind::SmfRed(e)
            | ConstraintKind::SmfBlue(e)
            | ConstraintKind::TargetSmf(e)
            | ConstraintKind::Bhmf(e)
            | ConstraintKind::Bhbm(e)
            | ConstraintKind::Hsmr(e) => Some(*e),
            ConstraintKind::Csfrdh | ConstraintKind::SmdEvolution => None,
        }
    }

    /// Redshifts whose nearest snapshots the model data is read from.
    pub fn target_redshifts(&self) -> Vec<f64> {
        match self {
            ConstraintKind::SmdEvolution => SMD_EVOLUTION_REDSHIFTS.to_vec(),
            ConstraintKind::Csfrdh => vec![0.0],
            other => other.epoch().map(Epoch::redshift).into_iter().collect(),
        }
    }

    pub fn capabilities(&self) -> Capabilities {
        match self {
            ConstraintKind::Smf(_) | ConstraintKind::SmfBlue(_) => {
                Capabilities { figures: &[Figure::Smf], color_companion: false }
            }
            ConstraintKind::SmfRed(_) => {
                Capabilities { figures: &[Figure::Smf], color_companion: true }
            }
            ConstraintKind::TargetSmf(_) => {
                Capabilities { figures: &[Figure::Smf, Figure::TargetSmf], color_companion: false }
            }
            ConstraintKind::Bhmf(_) => {
                Capabilities { figures: &[Figure::Bhmf], color_companion: false }
            }
            ConstraintKind::Bhbm(_) => {
                Capabilities { figures: &[Figure::Bhbm], color_companion: false }
            }
            ConstraintKind::Hsmr(_) => {
                Capabilities { figures: &[Figure::Hsmr], color_companion: false }
            }
            ConstraintKind::Csfrdh | ConstraintKind::SmdEvolution => {
                Capabilities { figures: &[], color_companion: false }
            }
        }
    }

    /// The blue counterpart drawn next to a red stellar mass function.
    pub const fn companion(&self) -> Option<ConstraintKind> {
        match self {
            ConstraintKind::SmfRed(e) => Some(ConstraintKind::SmfBlue(*e)),
            _ => None,
        }
    }
}

impl fmt::Display for ConstraintKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name())
    }
}
