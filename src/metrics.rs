//! Planning summary and per-auditor workload.

use serde::{Deserialize, Serialize};

use crate::models::{Assignment, Auditor, UnassignedLocation};

const MONTH_NAMES_ES: [&str; 12] = [
    "enero",
    "febrero",
    "marzo",
    "abril",
    "mayo",
    "junio",
    "julio",
    "agosto",
    "septiembre",
    "octubre",
    "noviembre",
    "diciembre",
];

/// Spanish month name for a 0-based month index.
pub fn month_name_es(month: u32) -> &'static str {
    MONTH_NAMES_ES.get(month as usize).copied().unwrap_or("")
}

pub(crate) fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

/// Assignment totals for one auditor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditorWorkload {
    pub auditor_id: String,
    pub auditor_name: String,
    pub assignments: usize,
    pub total_distance_km: f64,
    pub average_distance_km: f64,
}

/// Workload of every auditor in roster order, including idle ones.
pub fn auditor_workloads(auditors: &[Auditor], assignments: &[Assignment]) -> Vec<AuditorWorkload> {
    auditors
        .iter()
        .map(|auditor| {
            let (count, total) = assignments
                .iter()
                .filter(|a| a.auditor_id == auditor.id)
                .fold((0usize, 0.0f64), |(count, total), a| (count + 1, total + a.distance_km));
            AuditorWorkload {
                auditor_id: auditor.id.clone(),
                auditor_name: auditor.full_name.clone(),
                assignments: count,
                total_distance_km: round_to(total, 2),
                average_distance_km: if count == 0 {
                    0.0
                } else {
                    round_to(total / count as f64, 2)
                },
            }
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanningSummary {
    /// 0-based.
    pub target_month: u32,
    pub target_year: i32,
    pub month_name: String,
    pub total_locations: usize,
    pub assigned_locations: usize,
    pub unassigned_locations: usize,
    /// Percentage with one decimal.
    pub assignment_rate: f64,
    pub total_auditors: usize,
    pub auditors_used: usize,
    pub average_distance_km: f64,
    pub average_confidence: f64,
    pub auditor_workloads: Vec<AuditorWorkload>,
}

impl PlanningSummary {
    pub fn from_results(
        assignments: &[Assignment],
        unassigned: &[UnassignedLocation],
        auditors: &[Auditor],
        target_month: u32,
        target_year: i32,
    ) -> Self {
        let assigned = assignments.len();
        let total = assigned + unassigned.len();
        let workloads = auditor_workloads(auditors, assignments);

        let (average_distance_km, average_confidence) = if assigned == 0 {
            (0.0, 0.0)
        } else {
            let distance: f64 = assignments.iter().map(|a| a.distance_km).sum();
            let confidence: f64 = assignments.iter().map(|a| a.confidence_score).sum();
            (
                round_to(distance / assigned as f64, 2),
                round_to(confidence / assigned as f64, 2),
            )
        };

        Self {
            target_month,
            target_year,
            month_name: month_name_es(target_month).to_string(),
            total_locations: total,
            assigned_locations: assigned,
            unassigned_locations: unassigned.len(),
            assignment_rate: if total == 0 {
                0.0
            } else {
                round_to(assigned as f64 / total as f64 * 100.0, 1)
            },
            total_auditors: auditors.len(),
            auditors_used: workloads.iter().filter(|w| w.assignments > 0).count(),
            average_distance_km,
            average_confidence,
            auditor_workloads: workloads,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::UnassignedReason;

    fn auditor(id: &str, name: &str) -> Auditor {
        Auditor {
            id: id.to_string(),
            full_name: name.to_string(),
            zone: None,
            home_address_coordinates: None,
        }
    }

    fn assignment(auditor_id: &str, distance_km: f64) -> Assignment {
        Assignment {
            location_id: "l".into(),
            auditor_id: auditor_id.into(),
            auditor_name: String::new(),
            location_name: "C1".into(),
            distance_km,
            confidence_score: 0.5,
            constraint_violations: Vec::new(),
            assignment_reason: String::new(),
            audit_date: None,
            date_assignment_reason: None,
        }
    }

    #[test]
    fn test_month_names() {
        assert_eq!(month_name_es(0), "enero");
        assert_eq!(month_name_es(11), "diciembre");
        assert_eq!(month_name_es(12), "");
    }

    #[test]
    fn test_workloads_include_idle_auditors() {
        let auditors = vec![auditor("a1", "Ana"), auditor("a2", "Beto")];
        let assignments = vec![assignment("a1", 10.0), assignment("a1", 15.5)];

        let workloads = auditor_workloads(&auditors, &assignments);

        assert_eq!(workloads[0].assignments, 2);
        assert_eq!(workloads[0].total_distance_km, 25.5);
        assert_eq!(workloads[0].average_distance_km, 12.75);
        assert_eq!(workloads[1].assignments, 0);
        assert_eq!(workloads[1].average_distance_km, 0.0);
    }

    #[test]
    fn test_summary_rates() {
        let auditors = vec![auditor("a1", "Ana"), auditor("a2", "Beto")];
        let assignments = vec![assignment("a1", 10.0), assignment("a2", 20.0)];
        let unassigned = vec![UnassignedLocation {
            location: serde_json::from_str(r#"{"id": "x"}"#).unwrap(),
            reason: UnassignedReason::NoValidAuditor,
        }];

        let summary = PlanningSummary::from_results(&assignments, &unassigned, &auditors, 2, 2025);

        assert_eq!(summary.month_name, "marzo");
        assert_eq!(summary.total_locations, 3);
        assert_eq!(summary.assignment_rate, 66.7);
        assert_eq!(summary.auditors_used, 2);
        assert_eq!(summary.average_distance_km, 15.0);
    }
}
