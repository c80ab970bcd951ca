//! Flat CSV report of a planning run.
//!
//! One document, several sections. Each section starts with a `[NAME]`
//! marker row followed by its own header row, so the row width varies.

use std::io;

use chrono::NaiveDate;

use crate::error::Result;
use crate::metrics::month_name_es;
use crate::planner::PlanningResult;

/// `planificacion_auditorias_{mes}_{year}_{YYYY-MM-DD}.csv`
pub fn report_file_name(month: u32, year: i32, stamp: NaiveDate) -> String {
    format!(
        "planificacion_auditorias_{}_{}_{}.csv",
        month_name_es(month),
        year,
        stamp.format("%Y-%m-%d")
    )
}

/// Renders a [`PlanningResult`] as a sectioned CSV report.
pub struct PlanningReport<'a> {
    result: &'a PlanningResult,
}

impl<'a> PlanningReport<'a> {
    pub fn new(result: &'a PlanningResult) -> Self {
        Self { result }
    }

    pub fn to_csv(&self) -> Result<String> {
        let mut buffer = Vec::new();
        self.write_csv(&mut buffer)?;
        Ok(String::from_utf8(buffer)?)
    }

    pub fn write_csv<W: io::Write>(&self, writer: W) -> Result<()> {
        let mut wtr = csv::WriterBuilder::new().flexible(true).from_writer(writer);
        let result = self.result;
        let summary = &result.summary;

        wtr.write_record(["[SUMMARY]"])?;
        wtr.write_record(["Month", summary.month_name.as_str()])?;
        wtr.write_record(["Year", &summary.target_year.to_string()])?;
        wtr.write_record(["Total locations", &summary.total_locations.to_string()])?;
        wtr.write_record(["Assigned", &summary.assigned_locations.to_string()])?;
        wtr.write_record(["Unassigned", &summary.unassigned_locations.to_string()])?;
        wtr.write_record(["Assignment rate (%)", &format!("{:.1}", summary.assignment_rate)])?;
        wtr.write_record(["Auditors used", &summary.auditors_used.to_string()])?;
        wtr.write_record(["Warnings", &result.warnings.len().to_string()])?;

        wtr.write_record(["[ASSIGNMENTS]"])?;
        wtr.write_record([
            "Location ID",
            "Convenio",
            "Auditor ID",
            "Auditor",
            "Distance (km)",
            "Confidence (%)",
            "Audit date",
            "Date reason",
            "Assignment reason",
            "Constraint violations",
        ])?;
        for a in &result.assignments {
            let date = a.audit_date.map(|d| d.to_string()).unwrap_or_default();
            wtr.write_record([
                a.location_id.as_str(),
                a.location_name.as_str(),
                a.auditor_id.as_str(),
                a.auditor_name.as_str(),
                &format!("{:.2}", a.distance_km),
                &format!("{:.1}", a.confidence_score * 100.0),
                &date,
                a.date_assignment_reason.as_deref().unwrap_or(""),
                a.assignment_reason.as_str(),
                &a.constraint_violations.join("; "),
            ])?;
        }

        let metrics = &result.metrics;
        wtr.write_record(["[METRICS]"])?;
        wtr.write_record(["Total assignments", &metrics.total_assignments.to_string()])?;
        wtr.write_record(["Average distance (km)", &format!("{:.1}", metrics.average_distance)])?;
        wtr.write_record([
            "Average confidence (%)",
            &format!("{:.1}", metrics.average_confidence * 100.0),
        ])?;
        wtr.write_record([
            "Constraint violations",
            &metrics.total_constraint_violations.to_string(),
        ])?;
        wtr.write_record(["Assignment rate (%)", &format!("{:.1}", summary.assignment_rate)])?;
        wtr.write_record(["Date issues", &result.date_validation.issues.len().to_string()])?;

        wtr.write_record(["[WORKLOAD]"])?;
        wtr.write_record([
            "Auditor ID",
            "Auditor",
            "Assignments",
            "Total distance (km)",
            "Average distance (km)",
        ])?;
        for w in &summary.auditor_workloads {
            wtr.write_record([
                w.auditor_id.as_str(),
                w.auditor_name.as_str(),
                &w.assignments.to_string(),
                &format!("{:.1}", w.total_distance_km),
                &format!("{:.1}", w.average_distance_km),
            ])?;
        }

        wtr.write_record(["[UNASSIGNED]"])?;
        wtr.write_record(["Location ID", "Cliente", "Convenio", "Agencia", "Zona", "Reason"])?;
        for u in &result.unassigned_locations {
            let zona = u.location.zona.map(|z| z.to_string()).unwrap_or_default();
            wtr.write_record([
                u.location.id.as_str(),
                u.location.cliente.as_str(),
                u.location.convenio.as_str(),
                u.location.agencia.as_str(),
                &zona,
                &u.reason.to_string(),
            ])?;
        }

        wtr.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_file_name() {
        let stamp = NaiveDate::from_ymd_opt(2025, 2, 14).unwrap();
        assert_eq!(
            report_file_name(2, 2025, stamp),
            "planificacion_auditorias_marzo_2025_2025-02-14.csv"
        );
    }
}
