//! Seams between the planner core and its collaborators.
//!
//! The planner only needs two things from the outside world besides the
//! roster and the location directory: distances, and who audited what in
//! previous months. Both are traits so callers can swap in their own data.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::matrix::DistanceMatrix;
use crate::models::{Auditor, Location};

/// Provides an auditor × location distance matrix.
pub trait DistanceMatrixProvider {
    fn matrix_for(&self, auditors: &[Auditor], locations: &[Location]) -> DistanceMatrix;
}

/// Read access to historical plannings.
pub trait PlanningHistory {
    /// Auditor that audited `location_id` in the given month (0 = January).
    fn auditor_for(&self, location_id: &str, year: i32, month: u32) -> Option<&str>;
}

/// A single historical visit record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriorVisit {
    pub auditor_id: String,
}

/// Historical plannings keyed by location id, then month index (0-11).
///
/// The upstream shape carries no year, so lookups ignore it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExistingPlannings {
    by_location: HashMap<String, HashMap<u32, PriorVisit>>,
}

impl ExistingPlannings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, location_id: impl Into<String>, month: u32, auditor_id: impl Into<String>) {
        self.by_location.entry(location_id.into()).or_default().insert(
            month,
            PriorVisit {
                auditor_id: auditor_id.into(),
            },
        );
    }

    pub fn with_visit(mut self, location_id: &str, month: u32, auditor_id: &str) -> Self {
        self.record(location_id, month, auditor_id);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.by_location.is_empty()
    }
}

impl PlanningHistory for ExistingPlannings {
    fn auditor_for(&self, location_id: &str, _year: i32, month: u32) -> Option<&str> {
        self.by_location
            .get(location_id)
            .and_then(|months| months.get(&month))
            .map(|visit| visit.auditor_id.as_str())
    }
}
