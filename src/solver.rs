//! Assignment allocator (weighted greedy matching).
//!
//! Locations are processed once, in priority order. Each one goes to the
//! valid auditor with the highest weighted score; there is no backtracking.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::config::{AlgorithmWeights, PlanningConfig};
use crate::constraints::{evaluate_constraints, ConstraintContext, ConstraintEvaluation, ConstraintSet};
use crate::matrix::{Distance, DistanceMatrix};
use crate::models::{Assignment, Auditor, Location, UnassignedLocation, UnassignedReason};
use crate::traits::{DistanceMatrixProvider, PlanningHistory};

/// Distance at which the distance term of the score reaches zero.
/// Independent of the hard distance cap.
const DISTANCE_NORMALIZATION_KM: f64 = 300.0;

/// Zone term when auditor and location zones differ.
const ZONE_MISMATCH_SCORE: f64 = 0.3;

/// Running per-auditor assignment counts.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WorkloadTracker {
    order: Vec<String>,
    counts: HashMap<String, usize>,
}

impl WorkloadTracker {
    /// Starts every listed auditor at zero.
    pub fn new<I, S>(auditor_ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut tracker = Self::default();
        for id in auditor_ids {
            let id = id.into();
            if !tracker.counts.contains_key(&id) {
                tracker.counts.insert(id.clone(), 0);
                tracker.order.push(id);
            }
        }
        tracker
    }

    pub fn count(&self, auditor_id: &str) -> usize {
        self.counts.get(auditor_id).copied().unwrap_or(0)
    }

    /// Highest count across all auditors.
    pub fn max(&self) -> usize {
        self.counts.values().copied().max().unwrap_or(0)
    }

    pub fn increment(&mut self, auditor_id: &str) {
        if let Some(count) = self.counts.get_mut(auditor_id) {
            *count += 1;
        } else {
            self.counts.insert(auditor_id.to_string(), 1);
            self.order.push(auditor_id.to_string());
        }
    }

    /// Counts in the order auditors were registered.
    pub fn iter(&self) -> impl Iterator<Item = (&str, usize)> {
        self.order
            .iter()
            .map(|id| (id.as_str(), self.counts.get(id).copied().unwrap_or(0)))
    }

    pub fn distribution(&self) -> BTreeMap<String, usize> {
        self.iter().map(|(id, count)| (id.to_string(), count)).collect()
    }
}

/// Mutable state threaded through one greedy pass.
#[derive(Debug, Clone, Default)]
pub struct AllocationState {
    pub workload: WorkloadTracker,
    pub assignments: Vec<Assignment>,
    pub unassigned: Vec<UnassignedLocation>,
}

impl AllocationState {
    pub fn new(auditors: &[Auditor]) -> Self {
        Self {
            workload: WorkloadTracker::new(auditors.iter().map(|a| a.id.as_str())),
            assignments: Vec::new(),
            unassigned: Vec::new(),
        }
    }
}

/// Aggregate quality of an allocation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AllocationMetrics {
    pub total_assignments: usize,
    pub average_distance: f64,
    pub average_confidence: f64,
    pub workload_distribution: BTreeMap<String, usize>,
    pub total_constraint_violations: usize,
    /// Whole-number percentage of active locations that were assigned.
    pub assignment_rate: u32,
}

impl AllocationMetrics {
    pub fn calculate(
        assignments: &[Assignment],
        unassigned_count: usize,
        workload: &WorkloadTracker,
    ) -> Self {
        let total = assignments.len();
        let (average_distance, average_confidence) = if total == 0 {
            (0.0, 0.0)
        } else {
            let distance: f64 = assignments.iter().map(|a| a.distance_km).sum();
            let confidence: f64 = assignments.iter().map(|a| a.confidence_score).sum();
            (distance / total as f64, confidence / total as f64)
        };

        let processed = total + unassigned_count;
        let assignment_rate = if processed == 0 {
            0
        } else {
            (total as f64 / processed as f64 * 100.0).round() as u32
        };

        Self {
            total_assignments: total,
            average_distance,
            average_confidence,
            workload_distribution: workload.distribution(),
            total_constraint_violations: assignments
                .iter()
                .map(|a| a.constraint_violations.len())
                .sum(),
            assignment_rate,
        }
    }
}

#[derive(Debug, Clone)]
pub struct AllocationResult {
    pub assignments: Vec<Assignment>,
    pub unassigned: Vec<UnassignedLocation>,
    pub metrics: AllocationMetrics,
}

/// A valid pairing under consideration for one location.
#[derive(Debug, Clone)]
struct Candidate<'a> {
    auditor: &'a Auditor,
    distance_km: f64,
    zone_match: bool,
    score: f64,
    evaluation: ConstraintEvaluation,
}

/// Runs the weighted greedy allocation for one target month.
///
/// `target_month` is 0-based (0 = January).
pub fn allocate<M, H>(
    locations: &[Location],
    auditors: &[Auditor],
    target_month: u32,
    target_year: i32,
    matrix_provider: &M,
    history: &H,
    config: &PlanningConfig,
) -> AllocationResult
where
    M: DistanceMatrixProvider,
    H: PlanningHistory,
{
    let active: Vec<Location> = locations.iter().filter(|l| l.is_active).cloned().collect();
    info!(
        active = active.len(),
        inactive = locations.len() - active.len(),
        auditors = auditors.len(),
        "starting auditor allocation"
    );

    let matrix = matrix_provider.matrix_for(auditors, &active);
    let ordered = prioritize(&active, &matrix);
    let matriz_by_convenio = matriz_lookup(&active);
    let constraints = ConstraintSet::from_config(config);

    let mut state = AllocationState::new(auditors);

    for location in ordered {
        let best = {
            let ctx = ConstraintContext {
                matrix: &matrix,
                history,
                target_month,
                target_year,
                workload: &state.workload,
                assignments: &state.assignments,
                matriz_by_convenio: &matriz_by_convenio,
                total_locations: active.len(),
                total_auditors: auditors.len(),
            };
            best_candidate(location, auditors, &ctx, &constraints, &config.algorithm_weights)
        };

        match best {
            Ok(candidate) => {
                debug!(
                    location = %location.id,
                    auditor = %candidate.auditor.id,
                    score = candidate.score,
                    distance_km = candidate.distance_km,
                    "location assigned"
                );
                let assignment = build_assignment(location, &candidate, &state.workload);
                state.workload.increment(&candidate.auditor.id);
                state.assignments.push(assignment);
            }
            Err(reason) => {
                debug!(location = %location.id, %reason, "location left unassigned");
                state.unassigned.push(UnassignedLocation {
                    location: location.clone(),
                    reason,
                });
            }
        }
    }

    let metrics = AllocationMetrics::calculate(&state.assignments, state.unassigned.len(), &state.workload);
    info!(
        assigned = metrics.total_assignments,
        unassigned = state.unassigned.len(),
        rate = metrics.assignment_rate,
        "allocation finished"
    );

    AllocationResult {
        assignments: state.assignments,
        unassigned: state.unassigned,
        metrics,
    }
}

/// Matriz locations first, then by ascending distance to the closest
/// auditor. Unreachable locations go last. Stable for equal keys.
fn prioritize<'a>(locations: &'a [Location], matrix: &DistanceMatrix) -> Vec<&'a Location> {
    let mut keyed: Vec<(&Location, f64)> = locations
        .iter()
        .map(|location| (location, matrix.min_distance_to(&location.id).as_f64()))
        .collect();

    keyed.sort_by(|(a, a_min), (b, b_min)| {
        b.es_matriz
            .cmp(&a.es_matriz)
            .then_with(|| a_min.total_cmp(b_min))
    });

    keyed.into_iter().map(|(location, _)| location).collect()
}

/// Convenio → first matriz location id in input order.
fn matriz_lookup(locations: &[Location]) -> HashMap<String, String> {
    let mut lookup = HashMap::new();
    for location in locations.iter().filter(|l| l.es_matriz) {
        lookup
            .entry(location.convenio.clone())
            .or_insert_with(|| location.id.clone());
    }
    lookup
}

fn best_candidate<'a>(
    location: &Location,
    auditors: &'a [Auditor],
    ctx: &ConstraintContext<'_>,
    constraints: &ConstraintSet,
    weights: &AlgorithmWeights,
) -> Result<Candidate<'a>, UnassignedReason> {
    let mut best: Option<Candidate<'a>> = None;
    let mut any_reachable = false;
    let max_load = ctx.workload.max();

    for auditor in auditors {
        let distance_km = match ctx.matrix.distance(&auditor.id, &location.id) {
            Distance::Km(km) if km.is_finite() => km,
            _ => continue,
        };
        any_reachable = true;

        let evaluation = evaluate_constraints(auditor, location, ctx, constraints);
        if !evaluation.is_valid {
            continue;
        }

        let zone_match = auditor.zone_matches(location);
        let score = weighted_score(
            distance_km,
            zone_match,
            ctx.workload.count(&auditor.id),
            max_load,
            evaluation.score,
            weights,
        );

        // Strictly greater: on exact ties the earlier auditor keeps the spot.
        if best.as_ref().is_none_or(|b| score > b.score) {
            best = Some(Candidate {
                auditor,
                distance_km,
                zone_match,
                score,
                evaluation,
            });
        }
    }

    match best {
        Some(candidate) => Ok(candidate),
        None if any_reachable => Err(UnassignedReason::NoValidAuditor),
        None => Err(UnassignedReason::NoReachableAuditor),
    }
}

/// `distance·wD + zone·wZ + workload·wW + constraints·wC`.
pub fn weighted_score(
    distance_km: f64,
    zone_match: bool,
    current_load: usize,
    max_load: usize,
    constraint_score: f64,
    weights: &AlgorithmWeights,
) -> f64 {
    let distance_score = (1.0 - distance_km / DISTANCE_NORMALIZATION_KM).max(0.0);
    let zone_score = if zone_match { 1.0 } else { ZONE_MISMATCH_SCORE };
    let workload_score = if max_load == 0 {
        1.0
    } else {
        1.0 - current_load as f64 / max_load as f64
    };

    distance_score * weights.distance
        + zone_score * weights.zone_match
        + workload_score * weights.workload
        + constraint_score * weights.constraints
}

fn build_assignment(location: &Location, candidate: &Candidate<'_>, workload: &WorkloadTracker) -> Assignment {
    let zone = if candidate.zone_match {
        "same zone"
    } else {
        "different zone"
    };
    let reason = format!(
        "Best weighted score {:.2}: {:.1} km away, {}, {} prior assignment(s) this run",
        candidate.score,
        candidate.distance_km,
        zone,
        workload.count(&candidate.auditor.id)
    );

    Assignment {
        location_id: location.id.clone(),
        auditor_id: candidate.auditor.id.clone(),
        auditor_name: candidate.auditor.full_name.clone(),
        location_name: location.convenio.clone(),
        distance_km: candidate.distance_km,
        confidence_score: candidate.score.clamp(0.0, 1.0),
        constraint_violations: candidate.evaluation.violations.clone(),
        assignment_reason: reason,
        audit_date: None,
        date_assignment_reason: None,
    }
}
