//! Planning data model.
//!
//! Field names follow the external records (`zona`, `es_matriz`,
//! `location_coordinates`, ...) so rows coming from the database
//! deserialize without a mapping layer.

use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Geographic region used for auditor/location affinity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Zone {
    Norte,
    Sur,
    Centro,
    Occidente,
    /// Any other value in the source data. Never matches.
    #[serde(other)]
    Unrecognized,
}

impl Zone {
    pub fn is_known(self) -> bool {
        self != Zone::Unrecognized
    }
}

impl fmt::Display for Zone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Zone::Norte => "Norte",
            Zone::Sur => "Sur",
            Zone::Centro => "Centro",
            Zone::Occidente => "Occidente",
            Zone::Unrecognized => "(unrecognized)",
        };
        f.write_str(name)
    }
}

/// Raw coordinates as stored upstream. Either component may be missing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    #[serde(default)]
    pub lat: Option<f64>,
    #[serde(default)]
    pub lon: Option<f64>,
}

impl Coordinates {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self {
            lat: Some(lat),
            lon: Some(lon),
        }
    }

    /// Returns `(lat, lon)` when both components are present.
    pub fn point(&self) -> Option<(f64, f64)> {
        match (self.lat, self.lon) {
            (Some(lat), Some(lon)) => Some((lat, lon)),
            _ => None,
        }
    }
}

/// A site to audit (bank branch, dealer, ...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub id: String,
    #[serde(default)]
    pub cliente: String,
    /// Agreement key tying a matriz to its subsidiaries.
    #[serde(default)]
    pub convenio: String,
    #[serde(default)]
    pub agencia: String,
    #[serde(default)]
    pub direccion: Option<String>,
    #[serde(default)]
    pub ciudad: Option<String>,
    #[serde(default)]
    pub estado: Option<String>,
    #[serde(default)]
    pub zona: Option<Zone>,
    #[serde(default)]
    pub es_matriz: bool,
    #[serde(default = "default_active")]
    pub is_active: bool,
    #[serde(default)]
    pub location_coordinates: Option<Coordinates>,
}

fn default_active() -> bool {
    true
}

impl Location {
    pub fn has_coordinates(&self) -> bool {
        self.location_coordinates
            .as_ref()
            .and_then(Coordinates::point)
            .is_some()
    }
}

/// A field auditor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Auditor {
    pub id: String,
    #[serde(default)]
    pub full_name: String,
    #[serde(default)]
    pub zone: Option<Zone>,
    #[serde(default)]
    pub home_address_coordinates: Option<Coordinates>,
}

impl Auditor {
    pub fn has_coordinates(&self) -> bool {
        self.home_address_coordinates
            .as_ref()
            .and_then(Coordinates::point)
            .is_some()
    }

    /// Whether the auditor's zone matches the location's zona.
    /// A missing or unrecognized zone on either side never matches.
    pub fn zone_matches(&self, location: &Location) -> bool {
        match (self.zone, location.zona) {
            (Some(a), Some(b)) => a.is_known() && a == b,
            _ => false,
        }
    }
}

/// One auditor/location pairing produced by a planning run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Assignment {
    pub location_id: String,
    pub auditor_id: String,
    pub auditor_name: String,
    /// Convenio of the location.
    pub location_name: String,
    pub distance_km: f64,
    /// Weighted selection score, clamped to [0, 1].
    pub confidence_score: f64,
    pub constraint_violations: Vec<String>,
    pub assignment_reason: String,
    #[serde(default)]
    pub audit_date: Option<NaiveDate>,
    #[serde(default)]
    pub date_assignment_reason: Option<String>,
}

/// Why a location could not be assigned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UnassignedReason {
    /// Every auditor is at an unknown distance (missing coordinates).
    NoReachableAuditor,
    /// Every reachable auditor fails at least one hard constraint.
    NoValidAuditor,
}

impl fmt::Display for UnassignedReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UnassignedReason::NoReachableAuditor => {
                f.write_str("No auditor with known coordinates can reach this location")
            }
            UnassignedReason::NoValidAuditor => {
                f.write_str("No auditor satisfies all hard constraints")
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnassignedLocation {
    pub location: Location,
    pub reason: UnassignedReason,
}
