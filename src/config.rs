//! Planning configuration.
//!
//! Mirrors the JSON object the admin UI sends with each run. Every field
//! has a default, so `{}` is a valid configuration.

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Names of the constraints a run may enable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ConstraintKind {
    MatrizRevisitPrevention,
    MaxDistanceLimit,
    ZonePreference,
    WorkloadBalance,
    SubsidiaryGrouping,
    /// Applied by the date distributor, not during scoring.
    DateDistribution,
}

impl ConstraintKind {
    pub const ALL: [ConstraintKind; 6] = [
        ConstraintKind::MatrizRevisitPrevention,
        ConstraintKind::MaxDistanceLimit,
        ConstraintKind::ZonePreference,
        ConstraintKind::WorkloadBalance,
        ConstraintKind::SubsidiaryGrouping,
        ConstraintKind::DateDistribution,
    ];

    pub fn name(self) -> &'static str {
        match self {
            ConstraintKind::MatrizRevisitPrevention => "matrizRevisitPrevention",
            ConstraintKind::MaxDistanceLimit => "maxDistanceLimit",
            ConstraintKind::ZonePreference => "zonePreference",
            ConstraintKind::WorkloadBalance => "workloadBalance",
            ConstraintKind::SubsidiaryGrouping => "subsidiaryGrouping",
            ConstraintKind::DateDistribution => "dateDistribution",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MatrizRevisitParams {
    pub lookback_months: u32,
}

impl Default for MatrizRevisitParams {
    fn default() -> Self {
        Self { lookback_months: 1 }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MaxDistanceParams {
    pub max_distance_km: f64,
}

impl Default for MaxDistanceParams {
    fn default() -> Self {
        Self {
            max_distance_km: 200.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ZonePreferenceParams {
    pub weight: f64,
}

impl Default for ZonePreferenceParams {
    fn default() -> Self {
        Self { weight: 0.7 }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct WorkloadBalanceParams {
    /// Score distance from the ideal load instead of relative load.
    pub strict_mode: bool,
    /// Allowed deviation from the ideal load in strict mode.
    pub max_variance: f64,
}

impl Default for WorkloadBalanceParams {
    fn default() -> Self {
        Self {
            strict_mode: false,
            max_variance: 2.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SubsidiaryGroupingParams {
    pub weight: f64,
}

impl Default for SubsidiaryGroupingParams {
    fn default() -> Self {
        Self { weight: 0.8 }
    }
}

/// Per-constraint parameters. Absent entries take their defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ConstraintParameters {
    pub matriz_revisit_prevention: MatrizRevisitParams,
    pub max_distance_limit: MaxDistanceParams,
    pub zone_preference: ZonePreferenceParams,
    pub workload_balance: WorkloadBalanceParams,
    pub subsidiary_grouping: SubsidiaryGroupingParams,
}

/// Weights of the allocator's scoring terms. They need not sum to 1.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AlgorithmWeights {
    pub distance: f64,
    pub zone_match: f64,
    pub workload: f64,
    pub constraints: f64,
}

impl Default for AlgorithmWeights {
    fn default() -> Self {
        Self {
            distance: 0.4,
            zone_match: 0.3,
            workload: 0.2,
            constraints: 0.1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DateDistributionOptions {
    pub min_days_between_visits: u32,
    pub avoid_weekends: bool,
    pub distribute_evenly: bool,
    pub group_subsidiaries: bool,
    pub max_visits_per_day: usize,
}

impl Default for DateDistributionOptions {
    fn default() -> Self {
        Self {
            min_days_between_visits: 2,
            avoid_weekends: true,
            distribute_evenly: true,
            group_subsidiaries: true,
            max_visits_per_day: 3,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PlanningConfig {
    pub enabled_constraints: Vec<ConstraintKind>,
    pub constraint_parameters: ConstraintParameters,
    pub algorithm_weights: AlgorithmWeights,
    pub date_distribution_options: DateDistributionOptions,
}

impl Default for PlanningConfig {
    fn default() -> Self {
        Self {
            enabled_constraints: vec![
                ConstraintKind::MatrizRevisitPrevention,
                ConstraintKind::MaxDistanceLimit,
                ConstraintKind::ZonePreference,
                ConstraintKind::WorkloadBalance,
                ConstraintKind::SubsidiaryGrouping,
                ConstraintKind::DateDistribution,
            ],
            constraint_parameters: ConstraintParameters::default(),
            algorithm_weights: AlgorithmWeights::default(),
            date_distribution_options: DateDistributionOptions::default(),
        }
    }
}

impl PlanningConfig {
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn is_enabled(&self, kind: ConstraintKind) -> bool {
        self.enabled_constraints.contains(&kind)
    }

    pub fn with_enabled(mut self, enabled: &[ConstraintKind]) -> Self {
        self.enabled_constraints = enabled.to_vec();
        self
    }

    pub fn with_max_distance_km(mut self, max_distance_km: f64) -> Self {
        self.constraint_parameters.max_distance_limit.max_distance_km = max_distance_km;
        self
    }

    pub fn with_lookback_months(mut self, months: u32) -> Self {
        self.constraint_parameters
            .matriz_revisit_prevention
            .lookback_months = months;
        self
    }

    pub fn with_date_options(mut self, options: DateDistributionOptions) -> Self {
        self.date_distribution_options = options;
        self
    }
}
