//! Constraint engine.
//!
//! Each constraint is a variant carrying its own parameters. Hard
//! constraints gate a pairing; soft constraints return a multiplier in
//! [0, 1] and the compatibility score is the product of all multipliers.

use std::collections::HashMap;

use crate::config::{
    ConstraintKind, MatrizRevisitParams, MaxDistanceParams, PlanningConfig,
    SubsidiaryGroupingParams, WorkloadBalanceParams, ZonePreferenceParams,
};
use crate::matrix::{Distance, DistanceMatrix};
use crate::models::{Assignment, Auditor, Location, Zone};
use crate::solver::WorkloadTracker;
use crate::traits::PlanningHistory;

/// Multiplier applied to the score for each failed hard constraint.
const HARD_FAILURE_PENALTY: f64 = 0.1;

/// Soft multipliers below this leave a diagnostic on the pairing.
const SOFT_DIAGNOSTIC_THRESHOLD: f64 = 0.5;

/// Longest matriz look-back. Visit history is keyed by month of year, so
/// anything older only repeats months already checked.
const MAX_LOOKBACK_MONTHS: u32 = 12;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConstraintType {
    Hard,
    Soft,
    /// Accepted in configuration, applied outside scoring.
    Deferred,
}

/// A configured constraint.
#[derive(Debug, Clone, PartialEq)]
pub enum Constraint {
    MatrizRevisitPrevention(MatrizRevisitParams),
    MaxDistanceLimit(MaxDistanceParams),
    ZonePreference(ZonePreferenceParams),
    WorkloadBalance(WorkloadBalanceParams),
    SubsidiaryGrouping(SubsidiaryGroupingParams),
    DateDistribution,
}

/// Result of a single constraint check.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Pass,
    Fail(String),
    Score { multiplier: f64, note: Option<String> },
    Skipped,
}

/// Everything a constraint may read while scoring one pairing.
pub struct ConstraintContext<'a> {
    pub matrix: &'a DistanceMatrix,
    pub history: &'a dyn PlanningHistory,
    /// Target month, 0 = January.
    pub target_month: u32,
    pub target_year: i32,
    pub workload: &'a WorkloadTracker,
    /// Assignments made so far in this run.
    pub assignments: &'a [Assignment],
    /// Convenio → id of its matriz location.
    pub matriz_by_convenio: &'a HashMap<String, String>,
    pub total_locations: usize,
    pub total_auditors: usize,
}

/// Aggregate of every enabled constraint for one pairing.
#[derive(Debug, Clone, PartialEq)]
pub struct ConstraintEvaluation {
    pub is_valid: bool,
    pub score: f64,
    pub violations: Vec<String>,
}

impl Constraint {
    pub fn from_kind(kind: ConstraintKind, config: &PlanningConfig) -> Self {
        let params = &config.constraint_parameters;
        match kind {
            ConstraintKind::MatrizRevisitPrevention => {
                Constraint::MatrizRevisitPrevention(params.matriz_revisit_prevention.clone())
            }
            ConstraintKind::MaxDistanceLimit => {
                Constraint::MaxDistanceLimit(params.max_distance_limit.clone())
            }
            ConstraintKind::ZonePreference => {
                Constraint::ZonePreference(params.zone_preference.clone())
            }
            ConstraintKind::WorkloadBalance => {
                Constraint::WorkloadBalance(params.workload_balance.clone())
            }
            ConstraintKind::SubsidiaryGrouping => {
                Constraint::SubsidiaryGrouping(params.subsidiary_grouping.clone())
            }
            ConstraintKind::DateDistribution => Constraint::DateDistribution,
        }
    }

    pub fn kind(&self) -> ConstraintKind {
        match self {
            Constraint::MatrizRevisitPrevention(_) => ConstraintKind::MatrizRevisitPrevention,
            Constraint::MaxDistanceLimit(_) => ConstraintKind::MaxDistanceLimit,
            Constraint::ZonePreference(_) => ConstraintKind::ZonePreference,
            Constraint::WorkloadBalance(_) => ConstraintKind::WorkloadBalance,
            Constraint::SubsidiaryGrouping(_) => ConstraintKind::SubsidiaryGrouping,
            Constraint::DateDistribution => ConstraintKind::DateDistribution,
        }
    }

    pub fn constraint_type(&self) -> ConstraintType {
        match self {
            Constraint::MatrizRevisitPrevention(_) | Constraint::MaxDistanceLimit(_) => {
                ConstraintType::Hard
            }
            Constraint::ZonePreference(_)
            | Constraint::WorkloadBalance(_)
            | Constraint::SubsidiaryGrouping(_) => ConstraintType::Soft,
            Constraint::DateDistribution => ConstraintType::Deferred,
        }
    }

    pub fn evaluate(&self, auditor: &Auditor, location: &Location, ctx: &ConstraintContext<'_>) -> Outcome {
        match self {
            Constraint::MatrizRevisitPrevention(params) => {
                matriz_revisit(params, auditor, location, ctx)
            }
            Constraint::MaxDistanceLimit(params) => max_distance(params, auditor, location, ctx),
            Constraint::ZonePreference(params) => zone_preference(params, auditor, location),
            Constraint::WorkloadBalance(params) => workload_balance(params, auditor, ctx),
            Constraint::SubsidiaryGrouping(params) => {
                subsidiary_grouping(params, auditor, location, ctx)
            }
            Constraint::DateDistribution => Outcome::Skipped,
        }
    }
}

/// The constraints enabled for a run, in configuration order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConstraintSet {
    constraints: Vec<Constraint>,
}

impl ConstraintSet {
    pub fn from_config(config: &PlanningConfig) -> Self {
        let mut constraints: Vec<Constraint> = Vec::new();
        for &kind in &config.enabled_constraints {
            if constraints.iter().any(|c| c.kind() == kind) {
                continue;
            }
            constraints.push(Constraint::from_kind(kind, config));
        }
        Self { constraints }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Constraint> {
        self.constraints.iter()
    }

}

/// Evaluates every enabled constraint for an (auditor, location) pairing.
///
/// A failed hard constraint invalidates the pairing but the score is still
/// computed (with a 0.1 penalty per failure) so callers can inspect it.
pub fn evaluate_constraints(
    auditor: &Auditor,
    location: &Location,
    ctx: &ConstraintContext<'_>,
    enabled: &ConstraintSet,
) -> ConstraintEvaluation {
    let mut is_valid = true;
    let mut score: f64 = 1.0;
    let mut violations = Vec::new();

    for constraint in enabled.iter() {
        match constraint.evaluate(auditor, location, ctx) {
            Outcome::Pass | Outcome::Skipped => {}
            Outcome::Fail(message) => {
                is_valid = false;
                violations.push(message);
                score *= HARD_FAILURE_PENALTY;
            }
            Outcome::Score { multiplier, note } => {
                score *= multiplier;
                violations.extend(note);
            }
        }
    }

    ConstraintEvaluation {
        is_valid,
        score: score.clamp(0.0, 1.0),
        violations,
    }
}

/// `(year, month)` pairs for the `lookback` months before the target,
/// most recent first. At most twelve months are produced.
pub fn previous_months(year: i32, month: u32, lookback: u32) -> impl Iterator<Item = (i32, u32)> {
    let base = year as i64 * 12 + month as i64;
    (1..=lookback.min(MAX_LOOKBACK_MONTHS) as i64).map(move |back| {
        let index = base - back;
        (index.div_euclid(12) as i32, index.rem_euclid(12) as u32)
    })
}

fn matriz_revisit(
    params: &MatrizRevisitParams,
    auditor: &Auditor,
    location: &Location,
    ctx: &ConstraintContext<'_>,
) -> Outcome {
    if !location.es_matriz {
        return Outcome::Pass;
    }

    for (year, month) in previous_months(ctx.target_year, ctx.target_month, params.lookback_months) {
        if ctx.history.auditor_for(&location.id, year, month) == Some(auditor.id.as_str()) {
            return Outcome::Fail(format!(
                "Auditor {} already audited matriz {} in {:02}/{}",
                auditor.full_name,
                location.convenio,
                month + 1,
                year
            ));
        }
    }

    Outcome::Pass
}

fn max_distance(
    params: &MaxDistanceParams,
    auditor: &Auditor,
    location: &Location,
    ctx: &ConstraintContext<'_>,
) -> Outcome {
    match ctx.matrix.distance(&auditor.id, &location.id) {
        Distance::Km(km) if km <= params.max_distance_km => Outcome::Pass,
        Distance::Km(km) => Outcome::Fail(format!(
            "Distance {:.1} km exceeds limit of {} km",
            km, params.max_distance_km
        )),
        Distance::Unreachable => {
            Outcome::Fail("Distance unknown: missing coordinates".to_string())
        }
    }
}

fn zone_preference(params: &ZonePreferenceParams, auditor: &Auditor, location: &Location) -> Outcome {
    if auditor.zone_matches(location) {
        return Outcome::Score {
            multiplier: params.weight,
            note: None,
        };
    }

    let multiplier = 1.0 - params.weight;
    let note = (multiplier < SOFT_DIAGNOSTIC_THRESHOLD).then(|| {
        format!(
            "Auditor zone {} differs from location zone {}",
            zone_label(auditor.zone),
            zone_label(location.zona)
        )
    });
    Outcome::Score { multiplier, note }
}

fn zone_label(zone: Option<Zone>) -> String {
    zone.map(|z| z.to_string()).unwrap_or_else(|| "(none)".to_string())
}

fn workload_balance(
    params: &WorkloadBalanceParams,
    auditor: &Auditor,
    ctx: &ConstraintContext<'_>,
) -> Outcome {
    let current = ctx.workload.count(&auditor.id) as f64;

    let multiplier = if params.strict_mode {
        let ideal = if ctx.total_auditors == 0 {
            0.0
        } else {
            (ctx.total_locations / ctx.total_auditors) as f64
        };
        if params.max_variance <= 0.0 {
            if current == ideal { 1.0 } else { 0.0 }
        } else {
            (1.0 - (current - ideal).abs() / params.max_variance).max(0.0)
        }
    } else {
        let max = ctx.workload.max() as f64;
        if max == 0.0 { 1.0 } else { 1.0 - current / max }
    };

    Outcome::Score {
        multiplier,
        note: None,
    }
}

fn subsidiary_grouping(
    params: &SubsidiaryGroupingParams,
    auditor: &Auditor,
    location: &Location,
    ctx: &ConstraintContext<'_>,
) -> Outcome {
    if location.es_matriz {
        return Outcome::Score {
            multiplier: 0.5,
            note: None,
        };
    }

    let matriz_holder = ctx
        .matriz_by_convenio
        .get(&location.convenio)
        .and_then(|matriz_id| ctx.assignments.iter().find(|a| &a.location_id == matriz_id))
        .map(|a| a.auditor_id.as_str());

    match matriz_holder {
        Some(holder) if holder == auditor.id => Outcome::Score {
            multiplier: params.weight,
            note: None,
        },
        Some(_) => {
            let multiplier = 1.0 - params.weight;
            let note = (multiplier < SOFT_DIAGNOSTIC_THRESHOLD).then(|| {
                format!(
                    "Matriz of convenio {} is assigned to another auditor",
                    location.convenio
                )
            });
            Outcome::Score { multiplier, note }
        }
        None => Outcome::Score {
            multiplier: 1.0 - params.weight,
            note: None,
        },
    }
}
