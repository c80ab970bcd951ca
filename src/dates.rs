//! Audit date distribution.
//!
//! Dates are scheduled per auditor; there is no shared calendar between
//! auditors. A matriz and its subsidiaries can be kept together so they are
//! visited on the same or adjacent working days.

use std::collections::{BTreeMap, HashMap};
use std::fmt;

use chrono::{Datelike, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::DateDistributionOptions;
use crate::error::{PlanningError, Result};
use crate::models::{Assignment, Location};

/// Working days of a month (0 = January), optionally without weekends.
pub fn working_days(year: i32, month: u32, avoid_weekends: bool) -> Result<Vec<NaiveDate>> {
    if month > 11 {
        return Err(PlanningError::InvalidMonth(month));
    }
    let first = NaiveDate::from_ymd_opt(year, month + 1, 1)
        .ok_or(PlanningError::NoWorkingDays { month, year })?;

    let days: Vec<NaiveDate> = first
        .iter_days()
        .take_while(|day| day.month() == month + 1)
        .filter(|day| !(avoid_weekends && is_weekend(*day)))
        .collect();

    if days.is_empty() {
        return Err(PlanningError::NoWorkingDays { month, year });
    }
    Ok(days)
}

fn is_weekend(day: NaiveDate) -> bool {
    matches!(day.weekday(), Weekday::Sat | Weekday::Sun)
}

/// Assignments of one auditor that share a visit slot.
#[derive(Debug)]
struct VisitGroup {
    convenio: String,
    /// Indices into the assignment list; a matriz, if present, comes first.
    members: Vec<usize>,
    has_matriz: bool,
}

/// Attaches an audit date to every assignment.
///
/// Output order matches input order.
pub fn distribute_dates(
    assignments: &[Assignment],
    locations: &[Location],
    year: i32,
    month: u32,
    options: &DateDistributionOptions,
) -> Result<Vec<Assignment>> {
    let days = working_days(year, month, options.avoid_weekends)?;
    let by_id: HashMap<&str, &Location> = locations.iter().map(|l| (l.id.as_str(), l)).collect();
    let is_matriz = |a: &Assignment| by_id.get(a.location_id.as_str()).is_some_and(|l| l.es_matriz);

    let mut result = assignments.to_vec();

    for (auditor_id, indices) in by_auditor(assignments) {
        let groups = build_groups(assignments, &indices, options.group_subsidiaries, &is_matriz);
        let starts = group_start_indices(groups.len(), days.len(), options);
        debug!(auditor = %auditor_id, groups = groups.len(), "distributing audit dates");

        for (position, (group, start)) in groups.iter().zip(starts).enumerate() {
            for (offset, &index) in group.members.iter().enumerate() {
                let wanted = start + offset;
                let day_index = wanted.min(days.len() - 1);
                let reason = date_reason(group, offset, position, wanted != day_index, options);

                let assignment = &mut result[index];
                assignment.audit_date = Some(days[day_index]);
                assignment.date_assignment_reason = Some(reason);
            }
        }
    }

    Ok(result)
}

/// Assignment indices per auditor, in first-appearance order.
fn by_auditor(assignments: &[Assignment]) -> Vec<(String, Vec<usize>)> {
    let mut order: Vec<(String, Vec<usize>)> = Vec::new();
    let mut position: HashMap<&str, usize> = HashMap::new();

    for (index, assignment) in assignments.iter().enumerate() {
        match position.get(assignment.auditor_id.as_str()) {
            Some(&slot) => order[slot].1.push(index),
            None => {
                position.insert(assignment.auditor_id.as_str(), order.len());
                order.push((assignment.auditor_id.clone(), vec![index]));
            }
        }
    }
    order
}

fn build_groups(
    assignments: &[Assignment],
    indices: &[usize],
    group_subsidiaries: bool,
    is_matriz: &dyn Fn(&Assignment) -> bool,
) -> Vec<VisitGroup> {
    if !group_subsidiaries {
        return indices
            .iter()
            .map(|&index| VisitGroup {
                convenio: assignments[index].location_name.clone(),
                members: vec![index],
                has_matriz: is_matriz(&assignments[index]),
            })
            .collect();
    }

    let mut groups: Vec<VisitGroup> = Vec::new();
    for &index in indices {
        let convenio = &assignments[index].location_name;
        match groups.iter_mut().find(|g| &g.convenio == convenio) {
            Some(group) => group.members.push(index),
            None => groups.push(VisitGroup {
                convenio: convenio.clone(),
                members: vec![index],
                has_matriz: false,
            }),
        }
    }

    for group in &mut groups {
        // stable: subsidiaries keep their relative order
        group
            .members
            .sort_by_key(|&index| !is_matriz(&assignments[index]));
        group.has_matriz = group
            .members
            .first()
            .is_some_and(|&index| is_matriz(&assignments[index]));
    }
    groups
}

/// First working-day index for each group.
fn group_start_indices(group_count: usize, available: usize, options: &DateDistributionOptions) -> Vec<usize> {
    if group_count == 0 || available == 0 {
        return Vec::new();
    }
    let min_days = options.min_days_between_visits as usize;

    if !options.distribute_evenly {
        return (0..group_count)
            .map(|i| (i * min_days).min(available - 1))
            .collect();
    }

    if group_count >= available {
        // more slots than days: share days evenly
        return (0..group_count).map(|i| i * available / group_count).collect();
    }

    let spacing = min_days.max(available / group_count);
    let mut cursor: usize = 0;
    (0..group_count)
        .map(|i| {
            let latest = available - (group_count - i);
            let index = cursor.min(latest);
            cursor = index + spacing;
            index
        })
        .collect()
}

fn date_reason(
    group: &VisitGroup,
    offset: usize,
    position: usize,
    clamped: bool,
    options: &DateDistributionOptions,
) -> String {
    let mut reason = if group.members.len() == 1 {
        if options.distribute_evenly {
            format!("Visit {} evenly distributed across the month", position + 1)
        } else {
            format!(
                "Visit {} spaced {} day(s) from the previous visit",
                position + 1,
                options.min_days_between_visits
            )
        }
    } else if offset == 0 && group.has_matriz {
        format!(
            "Matriz of convenio {}, visited before its {} subsidiar{}",
            group.convenio,
            group.members.len() - 1,
            if group.members.len() == 2 { "y" } else { "ies" }
        )
    } else if group.has_matriz {
        format!(
            "Subsidiary of convenio {}, {} working day(s) after its matriz",
            group.convenio, offset
        )
    } else {
        format!(
            "Grouped with convenio {} (visit {} of {})",
            group.convenio,
            offset + 1,
            group.members.len()
        )
    };

    if clamped {
        reason.push_str(", moved to the last working day of the month");
    }
    reason
}

/// A scheduling problem found by [`validate_date_distribution`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum DateIssue {
    #[serde(rename_all = "camelCase")]
    TooManyVisits {
        auditor_id: String,
        date: NaiveDate,
        visits: usize,
        max_visits: usize,
    },
    #[serde(rename_all = "camelCase")]
    InsufficientSpacing {
        auditor_id: String,
        first: NaiveDate,
        second: NaiveDate,
        days_apart: i64,
        min_days: u32,
    },
}

impl fmt::Display for DateIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DateIssue::TooManyVisits {
                auditor_id,
                date,
                visits,
                max_visits,
            } => write!(
                f,
                "Auditor {} has {} visits on {} (max {})",
                auditor_id, visits, date, max_visits
            ),
            DateIssue::InsufficientSpacing {
                auditor_id,
                first,
                second,
                days_apart,
                min_days,
            } => write!(
                f,
                "Auditor {} has visits on {} and {} only {} day(s) apart (min {})",
                auditor_id, first, second, days_apart, min_days
            ),
        }
    }
}

/// Advisory report on a dated schedule.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DateValidation {
    pub is_valid: bool,
    pub issues: Vec<DateIssue>,
    pub suggestions: Vec<String>,
}

/// Checks per-day visit load and spacing for every auditor.
///
/// Never modifies the schedule. Assignments without a date are ignored.
pub fn validate_date_distribution(
    assignments: &[Assignment],
    options: &DateDistributionOptions,
) -> DateValidation {
    let mut issues = Vec::new();

    for (auditor_id, indices) in by_auditor(assignments) {
        let mut visits_per_day: BTreeMap<NaiveDate, usize> = BTreeMap::new();
        for &index in &indices {
            if let Some(date) = assignments[index].audit_date {
                *visits_per_day.entry(date).or_default() += 1;
            }
        }

        for (&date, &visits) in &visits_per_day {
            if visits > options.max_visits_per_day {
                issues.push(DateIssue::TooManyVisits {
                    auditor_id: auditor_id.clone(),
                    date,
                    visits,
                    max_visits: options.max_visits_per_day,
                });
            }
        }

        let dates: Vec<NaiveDate> = visits_per_day.keys().copied().collect();
        for pair in dates.windows(2) {
            let days_apart = (pair[1] - pair[0]).num_days();
            if days_apart < options.min_days_between_visits as i64 {
                issues.push(DateIssue::InsufficientSpacing {
                    auditor_id: auditor_id.clone(),
                    first: pair[0],
                    second: pair[1],
                    days_apart,
                    min_days: options.min_days_between_visits,
                });
            }
        }
    }

    let mut suggestions = Vec::new();
    if issues.iter().any(|i| matches!(i, DateIssue::TooManyVisits { .. })) {
        suggestions.push(
            "Spread visits over more working days, add auditors, or raise maxVisitsPerDay"
                .to_string(),
        );
    }
    if issues
        .iter()
        .any(|i| matches!(i, DateIssue::InsufficientSpacing { .. }))
    {
        suggestions.push(
            "Lower minDaysBetweenVisits, or disable groupSubsidiaries if grouped visits should also be spaced"
                .to_string(),
        );
    }

    DateValidation {
        is_valid: issues.is_empty(),
        issues,
        suggestions,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assignment(location_id: &str, auditor_id: &str, convenio: &str) -> Assignment {
        Assignment {
            location_id: location_id.to_string(),
            auditor_id: auditor_id.to_string(),
            auditor_name: String::new(),
            location_name: convenio.to_string(),
            distance_km: 1.0,
            confidence_score: 1.0,
            constraint_violations: Vec::new(),
            assignment_reason: String::new(),
            audit_date: None,
            date_assignment_reason: None,
        }
    }

    fn location(id: &str, convenio: &str, es_matriz: bool) -> Location {
        serde_json::from_value(serde_json::json!({
            "id": id,
            "convenio": convenio,
            "es_matriz": es_matriz,
        }))
        .unwrap()
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_working_days_skip_weekends() {
        // March 2025 has 31 days, 10 of them on weekends
        let days = working_days(2025, 2, true).unwrap();
        assert_eq!(days.len(), 21);
        assert_eq!(days[0], date(2025, 3, 3));
        assert!(days.iter().all(|d| !is_weekend(*d)));

        let all = working_days(2025, 2, false).unwrap();
        assert_eq!(all.len(), 31);
    }

    #[test]
    fn test_working_days_february_leap_year() {
        assert_eq!(working_days(2024, 1, false).unwrap().len(), 29);
        assert_eq!(working_days(2025, 1, false).unwrap().len(), 28);
    }

    #[test]
    fn test_working_days_invalid_month() {
        assert!(matches!(working_days(2025, 12, true), Err(PlanningError::InvalidMonth(12))));
    }

    #[test]
    fn test_even_spacing_respects_minimum() {
        let assignments: Vec<Assignment> = (0..5)
            .map(|i| assignment(&format!("l{}", i), "a1", &format!("C{}", i)))
            .collect();
        let locations: Vec<Location> = (0..5)
            .map(|i| location(&format!("l{}", i), &format!("C{}", i), false))
            .collect();
        let options = DateDistributionOptions::default();

        let dated = distribute_dates(&assignments, &locations, 2025, 2, &options).unwrap();

        let mut dates: Vec<NaiveDate> = dated.iter().filter_map(|a| a.audit_date).collect();
        dates.sort();
        assert_eq!(dates.len(), 5);
        for pair in dates.windows(2) {
            assert!((pair[1] - pair[0]).num_days() >= 2, "{:?}", pair);
        }
        assert!(validate_date_distribution(&dated, &options).is_valid);
    }

    #[test]
    fn test_matriz_and_subsidiaries_cluster() {
        let assignments = vec![
            assignment("s1", "a1", "C1"),
            assignment("m1", "a1", "C1"),
            assignment("s2", "a1", "C1"),
        ];
        let locations = vec![
            location("s1", "C1", false),
            location("m1", "C1", true),
            location("s2", "C1", false),
        ];

        let dated =
            distribute_dates(&assignments, &locations, 2025, 2, &DateDistributionOptions::default()).unwrap();

        // output keeps input order
        assert_eq!(dated[1].location_id, "m1");
        assert_eq!(dated[1].audit_date, Some(date(2025, 3, 3)));
        assert_eq!(dated[0].audit_date, Some(date(2025, 3, 4)));
        assert_eq!(dated[2].audit_date, Some(date(2025, 3, 5)));
        assert!(dated[1]
            .date_assignment_reason
            .as_deref()
            .is_some_and(|r| r.starts_with("Matriz")));
    }

    #[test]
    fn test_ungrouped_subsidiaries_are_spaced_individually() {
        let assignments = vec![
            assignment("m1", "a1", "C1"),
            assignment("s1", "a1", "C1"),
            assignment("s2", "a1", "C1"),
        ];
        let locations = vec![
            location("m1", "C1", true),
            location("s1", "C1", false),
            location("s2", "C1", false),
        ];
        let options = DateDistributionOptions {
            group_subsidiaries: false,
            ..DateDistributionOptions::default()
        };

        let dated = distribute_dates(&assignments, &locations, 2025, 2, &options).unwrap();

        // 21 working days over 3 visits: every 7th working day
        let dates: Vec<_> = dated.iter().map(|a| a.audit_date).collect();
        assert_eq!(
            dates,
            vec![Some(date(2025, 3, 3)), Some(date(2025, 3, 12)), Some(date(2025, 3, 21))]
        );
        for (i, a) in dated.iter().enumerate() {
            let expected = format!("Visit {} evenly distributed across the month", i + 1);
            assert_eq!(a.date_assignment_reason.as_deref(), Some(expected.as_str()));
        }
        assert!(validate_date_distribution(&dated, &options).is_valid);
    }

    #[test]
    fn test_group_overflowing_month_end_is_clamped() {
        let assignments = vec![
            assignment("l0", "a1", "C0"),
            assignment("m1", "a1", "C1"),
            assignment("s1", "a1", "C1"),
        ];
        let locations = vec![
            location("l0", "C0", false),
            location("m1", "C1", true),
            location("s1", "C1", false),
        ];
        // second group starts on the last working day, 31 March
        let options = DateDistributionOptions {
            distribute_evenly: false,
            min_days_between_visits: 20,
            ..DateDistributionOptions::default()
        };

        let dated = distribute_dates(&assignments, &locations, 2025, 2, &options).unwrap();

        assert_eq!(dated[0].audit_date, Some(date(2025, 3, 3)));
        assert_eq!(dated[1].audit_date, Some(date(2025, 3, 31)));
        assert_eq!(dated[2].audit_date, Some(date(2025, 3, 31)));
        assert!(!dated[1]
            .date_assignment_reason
            .as_deref()
            .is_some_and(|r| r.contains("moved to the last working day")));
        assert_eq!(
            dated[2].date_assignment_reason.as_deref(),
            Some(
                "Subsidiary of convenio C1, 1 working day(s) after its matriz, \
                 moved to the last working day of the month"
            )
        );
    }

    #[test]
    fn test_strict_stepping_without_even_distribution() {
        let assignments: Vec<Assignment> = (0..3)
            .map(|i| assignment(&format!("l{}", i), "a1", &format!("C{}", i)))
            .collect();
        let options = DateDistributionOptions {
            distribute_evenly: false,
            avoid_weekends: false,
            min_days_between_visits: 3,
            ..DateDistributionOptions::default()
        };

        let dated = distribute_dates(&assignments, &[], 2025, 2, &options).unwrap();
        let dates: Vec<_> = dated.iter().map(|a| a.audit_date).collect();
        assert_eq!(
            dates,
            vec![Some(date(2025, 3, 1)), Some(date(2025, 3, 4)), Some(date(2025, 3, 7))]
        );
    }

    #[test]
    fn test_auditors_are_scheduled_independently() {
        let assignments = vec![assignment("l1", "a1", "C1"), assignment("l2", "a2", "C2")];
        let dated = distribute_dates(&assignments, &[], 2025, 2, &DateDistributionOptions::default()).unwrap();
        assert_eq!(dated[0].audit_date, dated[1].audit_date);
    }

    #[test]
    fn test_group_starts_fit_before_month_end() {
        let options = DateDistributionOptions {
            min_days_between_visits: 5,
            ..DateDistributionOptions::default()
        };
        let starts = group_start_indices(6, 20, &options);
        assert_eq!(starts, vec![0, 5, 10, 15, 18, 19]);
        assert!(starts.iter().all(|&s| s < 20));

        let crowded = group_start_indices(30, 20, &options);
        assert_eq!(crowded.len(), 30);
        assert!(crowded.iter().all(|&s| s < 20));
    }

    #[test]
    fn test_validation_flags_overload_and_spacing() {
        let mut assignments = vec![
            assignment("l1", "a1", "C1"),
            assignment("l2", "a1", "C2"),
            assignment("l3", "a1", "C3"),
            assignment("l4", "a1", "C4"),
            assignment("l5", "a1", "C5"),
        ];
        for a in assignments.iter_mut().take(4) {
            a.audit_date = Some(date(2025, 3, 3));
        }
        assignments[4].audit_date = Some(date(2025, 3, 4));

        let validation = validate_date_distribution(&assignments, &DateDistributionOptions::default());

        assert!(!validation.is_valid);
        assert_eq!(validation.issues.len(), 2);
        assert!(matches!(
            validation.issues[0],
            DateIssue::TooManyVisits { visits: 4, max_visits: 3, .. }
        ));
        assert!(matches!(
            validation.issues[1],
            DateIssue::InsufficientSpacing { days_apart: 1, .. }
        ));
        assert_eq!(validation.suggestions.len(), 2);
    }
}
