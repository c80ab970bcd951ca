//! End-to-end smoke tests on real Monterrey coordinates.

mod fixtures;

use auditor_planner::export::{report_file_name, PlanningReport};
use auditor_planner::logging;
use auditor_planner::models::{UnassignedReason, Zone};
use auditor_planner::planner::{generate_planning, PlanningRequest};
use chrono::NaiveDate;

use fixtures::*;

fn monterrey_request() -> PlanningRequest {
    let locations = vec![
        TestLocation::new("sub-sp").at(SAN_PEDRO).convenio("BANORTE-12").build(),
        TestLocation::new("hq").at(GUADALUPE_NL).convenio("BANORTE-12").matriz().build(),
        TestLocation::new("sub-apo").at(APODACA).convenio("BANORTE-12").build(),
    ];
    let auditors = vec![
        TestAuditor::new("mty").home(MONTERREY_CENTRO).zone(Zone::Norte).build(),
        TestAuditor::new("slp").home(SAN_LUIS_POTOSI).zone(Zone::Sur).build(),
    ];
    // March 2025
    PlanningRequest::new(locations, auditors, 2, 2025)
}

#[test]
fn test_smoke_convenio_goes_to_local_auditor() {
    logging::init_test();

    let result = generate_planning(&monterrey_request()).unwrap();

    assert_eq!(result.assignments.len(), 3);
    assert!(result.unassigned_locations.is_empty());
    assert!(result.assignments.iter().all(|a| a.auditor_id == "mty"));
    assert_eq!(result.metrics.assignment_rate, 100);
    assert!(result.metrics.average_distance < 20.0, "avg {}", result.metrics.average_distance);
    assert_eq!(result.summary.assignment_rate, 100.0);
    assert_eq!(result.summary.auditors_used, 1);

    // the matriz is allocated first
    assert_eq!(result.assignments[0].location_id, "hq");
}

#[test]
fn test_smoke_matriz_visited_before_subsidiaries() {
    let result = generate_planning(&monterrey_request()).unwrap();

    let date_of = |id: &str| {
        result
            .assignments
            .iter()
            .find(|a| a.location_id == id)
            .and_then(|a| a.audit_date)
            .unwrap()
    };

    let day = |d: u32| NaiveDate::from_ymd_opt(2025, 3, d).unwrap();
    assert_eq!(date_of("hq"), day(3));

    let mut subsidiaries = vec![date_of("sub-sp"), date_of("sub-apo")];
    subsidiaries.sort();
    assert_eq!(subsidiaries, vec![day(4), day(5)]);

    assert!(result
        .assignments
        .iter()
        .all(|a| a.date_assignment_reason.is_some()));
}

#[test]
fn test_smoke_far_auditor_alone_leaves_everything_unassigned() {
    let mut request = monterrey_request();
    request.auditors.retain(|a| a.id == "slp");

    let result = generate_planning(&request).unwrap();

    assert!(result.assignments.is_empty());
    assert_eq!(result.unassigned_locations.len(), 3);
    assert!(result
        .unassigned_locations
        .iter()
        .all(|u| u.reason == UnassignedReason::NoValidAuditor));
    assert_eq!(result.summary.assignment_rate, 0.0);
}

#[test]
fn test_smoke_report_has_every_section() {
    let result = generate_planning(&monterrey_request()).unwrap();

    let csv = PlanningReport::new(&result).to_csv().unwrap();

    for section in ["[SUMMARY]", "[ASSIGNMENTS]", "[METRICS]", "[WORKLOAD]", "[UNASSIGNED]"] {
        assert!(csv.contains(section), "missing {}", section);
    }
    assert!(csv.contains("Month,marzo"));
    assert!(csv.contains("hq,BANORTE-12,mty"));
    assert!(csv.contains("2025-03-03"));

    let stamp = NaiveDate::from_ymd_opt(2025, 2, 20).unwrap();
    assert_eq!(
        report_file_name(result.summary.target_month, result.summary.target_year, stamp),
        "planificacion_auditorias_marzo_2025_2025-02-20.csv"
    );
}

#[test]
fn test_smoke_result_serializes_to_camel_case_json() {
    let result = generate_planning(&monterrey_request()).unwrap();

    let json = serde_json::to_value(&result).unwrap();

    assert!(json["unassignedLocations"].as_array().unwrap().is_empty());
    assert_eq!(json["metrics"]["assignmentRate"], 100);
    assert_eq!(json["summary"]["monthName"], "marzo");
}
