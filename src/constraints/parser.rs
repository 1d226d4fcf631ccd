//! Constraint spec parser.
//!
//! Grammar
//! -------
//! ```text
//! spec  := entry ("," entry)*
//! entry := NAME [ "(" LOW "-" HIGH ")" ] [ "*" WEIGHT ]
//! ```
//! `NAME` must be a registry name; `LOW`, `HIGH` and `WEIGHT` are unsigned
//! decimals. Whitespace around entries is ignored.
//!
//! Behavior
//! --------
//! - Entries become constraints in spec order; duplicates are kept.
//! - Each constraint's `rel_weight` is its weight divided by the total, so
//!   relative weights sum to 1.
//! - Any malformed entry fails the whole spec.
use crate::{
    catalog::CatalogReader,
    config::ConstraintSettings,
    constraints::{
        constraint::Constraint,
        errors::{ConstraintError, ConstraintResult},
        kind::ConstraintKind,
        plotting::Plotter,
    },
};
use once_cell::sync::Lazy;
use regex::Regex;
use std::sync::Arc;
use tracing::info;

static CONSTRAINT_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^([0-9_a-zA-Z]+)(?:\(([0-9.]+)-([0-9.]+)\))?(?:\*([0-9.]+))?$")
        .expect("valid constraint regex")
});

/// One parsed spec entry before it is bound to settings.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpecEntry {
    pub kind: ConstraintKind,
    pub domain: Option<(f64, f64)>,
    pub weight: f64,
}

fn number(token: &str, value: &str) -> ConstraintResult<f64> {
    value.parse::<f64>().map_err(|_| ConstraintError::MalformedNumber {
        token: token.to_string(),
        value: value.to_string(),
    })
}

/// Parse one `NAME[(LOW-HIGH)][*WEIGHT]` entry.
///
/// Errors
/// ------
/// - `ConstraintError::MalformedSpec` if the entry does not match the grammar.
/// - `ConstraintError::UnknownConstraint` for names outside the registry.
/// - `ConstraintError::MalformedNumber` for numbers such as `1.2.3`.
pub fn parse_entry(token: &str) -> ConstraintResult<SpecEntry> {
    let caps = CONSTRAINT_RE
        .captures(token)
        .ok_or_else(|| ConstraintError::MalformedSpec { token: token.to_string() })?;
    let name = &caps[1];
    let kind = ConstraintKind::from_name(name)
        .ok_or_else(|| ConstraintError::UnknownConstraint { name: name.to_string() })?;

    let domain = match (caps.get(2), caps.get(3)) {
        (Some(low), Some(high)) => {
            Some((number(token, low.as_str())?, number(token, high.as_str())?))
        }
        _ => None,
    };
    let weight = match caps.get(4) {
        Some(w) => number(token, w.as_str())?,
        None => 1.0,
    };
    Ok(SpecEntry { kind, domain, weight })
}

/// Split a spec string into entries without binding them.
pub fn parse_entries(spec: &str) -> ConstraintResult<Vec<SpecEntry>> {
    spec.split(',')
        .map(str::trim)
        .map(|token| {
            if token.is_empty() {
                Err(ConstraintError::MalformedSpec { token: token.to_string() })
            } else {
                parse_entry(token)
            }
        })
        .collect()
}

/// Build the constraints named by `spec`.
///
/// Parameters
/// ----------
/// - `spec`: comma-separated `NAME[(LOW-HIGH)][*WEIGHT]` entries.
/// - `settings`: simulation, snapshots and directories shared by all
///   constraints.
/// - `reader`: model-output backend.
/// - `plotter`: figure backend (best-effort).
///
/// Returns
/// -------
/// Constraints in spec order with `rel_weight` values summing to 1.
///
/// Errors
/// ------
/// - Any entry error from [`parse_entry`], domain or weight validation.
/// - `ConstraintError::ZeroTotalWeight` if every weight is zero.
/// - `ConstraintError::Config` / `Data` if snapshots cannot be resolved.
pub fn parse(
    spec: &str, settings: &ConstraintSettings, reader: Arc<dyn CatalogReader>,
    plotter: Arc<dyn Plotter>,
) -> ConstraintResult<Vec<Constraint>> {
    let entries = parse_entries(spec)?;

    let mut constraints = Vec::with_capacity(entries.len());
    for entry in entries {
        let mut constraint =
            Constraint::new(entry.kind, settings, Arc::clone(&reader), Arc::clone(&plotter))?
                .with_weight(entry.weight)?;
        if let Some((low, high)) = entry.domain {
            constraint = constraint.with_domain(low, high)?;
        }
        constraints.push(constraint);
    }

    let total: f64 = constraints.iter().map(Constraint::weight).sum();
    if !(total > 0.0) {
        return Err(ConstraintError::ZeroTotalWeight);
    }
    for constraint in &mut constraints {
        constraint.set_rel_weight(constraint.weight() / total);
    }

    for constraint in &constraints {
        info!("{constraint}");
    }
    Ok(constraints)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constraints::kind::Epoch;

    #[test]
    // Purpose
    // -------
    // Entries accept an optional domain and weight in that order.
    //
    // Given
    // -----
    // - `SMF_z0`, `HSMR_z1(11-14)`, `BHMF_z0*3`, `SMF_red_z0(9-12)*0.5`.
    //
    // Expect
    // ------
    // - Defaults: no domain override, weight 1.
    fn entries_parse_domain_and_weight() {
        let entries = parse_entries(" SMF_z0, HSMR_z1(11-14),BHMF_z0*3 ,SMF_red_z0(9-12)*0.5")
            .unwrap();
        assert_eq!(
            entries,
            vec![
                SpecEntry { kind: ConstraintKind::Smf(Epoch::Z0), domain: None, weight: 1.0 },
                SpecEntry {
                    kind: ConstraintKind::Hsmr(Epoch::Z1),
                    domain: Some((11.0, 14.0)),
                    weight: 1.0,
                },
                SpecEntry { kind: ConstraintKind::Bhmf(Epoch::Z0), domain: None, weight: 3.0 },
                SpecEntry {
                    kind: ConstraintKind::SmfRed(Epoch::Z0),
                    domain: Some((9.0, 12.0)),
                    weight: 0.5,
                },
            ]
        );
    }

    #[test]
    // Purpose
    // -------
    // Malformed entries fail the whole spec with a token-specific error.
    fn malformed_entries_are_rejected() {
        assert_eq!(
            parse_entries("SMF_z0,").unwrap_err(),
            ConstraintError::MalformedSpec { token: String::new() }
        );
        assert_eq!(
            parse_entry("SMF_z0(9-)").unwrap_err(),
            ConstraintError::MalformedSpec { token: "SMF_z0(9-)".to_string() }
        );
        assert_eq!(
            parse_entry("SMF_z0*-1").unwrap_err(),
            ConstraintError::MalformedSpec { token: "SMF_z0*-1".to_string() }
        );
        assert_eq!(
            parse_entry("SMF_z9").unwrap_err(),
            ConstraintError::UnknownConstraint { name: "SMF_z9".to_string() }
        );
        assert_eq!(
            parse_entry("SMF_z0*1.2.3").unwrap_err(),
            ConstraintError::MalformedNumber {
                token: "SMF_z0*1.2.3".to_string(),
                value: "1.2.3".to_string(),
            }
        );
    }
}
