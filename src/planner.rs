//! Top-level planning pipeline.
//!
//! validate → distance matrix → greedy allocation → date distribution →
//! date validation → summary.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::config::PlanningConfig;
use crate::dates::{distribute_dates, validate_date_distribution, DateValidation};
use crate::error::{PlanningError, Result};
use crate::haversine::HaversineMatrix;
use crate::metrics::PlanningSummary;
use crate::models::{Assignment, Auditor, Location, UnassignedLocation, Zone};
use crate::solver::{allocate, AllocationMetrics};
use crate::traits::{DistanceMatrixProvider, ExistingPlannings, PlanningHistory};

const MIN_YEAR: i32 = 2000;
const MAX_YEAR: i32 = 2100;

/// Everything needed for one planning run.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanningRequest {
    pub locations: Vec<Location>,
    pub auditors: Vec<Auditor>,
    /// 0 = January.
    pub target_month: u32,
    pub target_year: i32,
    #[serde(default)]
    pub existing_plannings: ExistingPlannings,
    #[serde(default)]
    pub configuration: PlanningConfig,
}

impl PlanningRequest {
    pub fn new(locations: Vec<Location>, auditors: Vec<Auditor>, target_month: u32, target_year: i32) -> Self {
        Self {
            locations,
            auditors,
            target_month,
            target_year,
            existing_plannings: ExistingPlannings::default(),
            configuration: PlanningConfig::default(),
        }
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn with_history(mut self, history: ExistingPlannings) -> Self {
        self.existing_plannings = history;
        self
    }

    pub fn with_config(mut self, config: PlanningConfig) -> Self {
        self.configuration = config;
        self
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanningResult {
    pub assignments: Vec<Assignment>,
    pub unassigned_locations: Vec<UnassignedLocation>,
    pub metrics: AllocationMetrics,
    pub warnings: Vec<String>,
    pub date_validation: DateValidation,
    pub summary: PlanningSummary,
}

/// Plans a month using haversine distances and the request's history.
pub fn generate_planning(request: &PlanningRequest) -> Result<PlanningResult> {
    generate_planning_with(request, &HaversineMatrix, &request.existing_plannings)
}

/// Plans a month with caller-supplied distance and history providers.
///
/// Fatal errors are wrapped in [`PlanningError::Generation`].
pub fn generate_planning_with<M, H>(
    request: &PlanningRequest,
    matrix_provider: &M,
    history: &H,
) -> Result<PlanningResult>
where
    M: DistanceMatrixProvider,
    H: PlanningHistory,
{
    run_pipeline(request, matrix_provider, history).map_err(|err| {
        warn!(error = %err, "planning aborted");
        PlanningError::generation(err)
    })
}

fn run_pipeline<M, H>(request: &PlanningRequest, matrix_provider: &M, history: &H) -> Result<PlanningResult>
where
    M: DistanceMatrixProvider,
    H: PlanningHistory,
{
    validate_request(request)?;
    let config = &request.configuration;

    info!(
        month = request.target_month,
        year = request.target_year,
        locations = request.locations.len(),
        auditors = request.auditors.len(),
        "generating planning"
    );

    let warnings = collect_warnings(&request.locations, &request.auditors);

    let allocation = allocate(
        &request.locations,
        &request.auditors,
        request.target_month,
        request.target_year,
        matrix_provider,
        history,
        config,
    );

    let assignments = distribute_dates(
        &allocation.assignments,
        &request.locations,
        request.target_year,
        request.target_month,
        &config.date_distribution_options,
    )?;

    let date_validation = validate_date_distribution(&assignments, &config.date_distribution_options);
    if !date_validation.is_valid {
        info!(issues = date_validation.issues.len(), "date distribution has advisory issues");
    }

    let summary = PlanningSummary::from_results(
        &assignments,
        &allocation.unassigned,
        &request.auditors,
        request.target_month,
        request.target_year,
    );

    Ok(PlanningResult {
        assignments,
        unassigned_locations: allocation.unassigned,
        metrics: allocation.metrics,
        warnings,
        date_validation,
        summary,
    })
}

fn validate_request(request: &PlanningRequest) -> Result<()> {
    if request.locations.is_empty() {
        return Err(PlanningError::NoLocations);
    }
    if request.auditors.is_empty() {
        return Err(PlanningError::NoAuditors);
    }
    if request.target_month > 11 {
        return Err(PlanningError::InvalidMonth(request.target_month));
    }
    if !(MIN_YEAR..=MAX_YEAR).contains(&request.target_year) {
        return Err(PlanningError::InvalidYear(request.target_year));
    }
    Ok(())
}

/// Data gaps that do not stop the run.
fn collect_warnings(locations: &[Location], auditors: &[Auditor]) -> Vec<String> {
    let mut warnings = Vec::new();

    for auditor in auditors.iter().filter(|a| !a.has_coordinates()) {
        warn!(auditor = %auditor.id, "auditor has no home coordinates");
        warnings.push(format!(
            "Auditor {} ({}) has no home coordinates and cannot be matched",
            auditor.full_name, auditor.id
        ));
    }

    for location in locations.iter().filter(|l| l.is_active && !l.has_coordinates()) {
        warn!(location = %location.id, "location has no coordinates");
        warnings.push(format!(
            "Location {} ({}) has no coordinates and cannot be matched",
            location.id, location.convenio
        ));
    }

    let mut seen = HashSet::new();
    for auditor in auditors {
        if !seen.insert(auditor.id.as_str()) {
            warn!(auditor = %auditor.id, "duplicate auditor id");
            warnings.push(format!(
                "Auditor id {} appears more than once; its rows share one distance row and workload count",
                auditor.id
            ));
        }
    }

    for auditor in auditors.iter().filter(|a| a.zone == Some(Zone::Unrecognized)) {
        warn!(auditor = %auditor.id, "auditor zone not recognized");
        warnings.push(format!(
            "Auditor {} ({}) has an unrecognized zone and never matches a location zone",
            auditor.full_name, auditor.id
        ));
    }

    for location in locations
        .iter()
        .filter(|l| l.is_active && l.zona == Some(Zone::Unrecognized))
    {
        warn!(location = %location.id, "location zona not recognized");
        warnings.push(format!(
            "Location {} ({}) has an unrecognized zona and never matches an auditor zone",
            location.id, location.convenio
        ));
    }

    let inactive = locations.iter().filter(|l| !l.is_active).count();
    if inactive > 0 {
        warnings.push(format!("{} inactive location(s) excluded from planning", inactive));
    }

    warnings
}
