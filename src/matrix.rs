//! Auditor × location distance matrix.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Distance between an auditor's home and a location.
///
/// `Unreachable` stands for "unknown": one of the two sides has no usable
/// coordinates. It compares greater than every finite distance.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Distance {
    Km(f64),
    Unreachable,
}

impl Distance {
    pub fn km(self) -> Option<f64> {
        match self {
            Distance::Km(km) => Some(km),
            Distance::Unreachable => None,
        }
    }

    /// Numeric view, with `Unreachable` as `f64::INFINITY`.
    pub fn as_f64(self) -> f64 {
        self.km().unwrap_or(f64::INFINITY)
    }

    pub fn is_reachable(self) -> bool {
        matches!(self, Distance::Km(km) if km.is_finite())
    }
}

/// Dense distance lookup built once per planning run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DistanceMatrix {
    rows: HashMap<String, HashMap<String, Distance>>,
}

impl DistanceMatrix {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_rows(rows: HashMap<String, HashMap<String, Distance>>) -> Self {
        Self { rows }
    }

    pub fn insert(&mut self, auditor_id: &str, location_id: &str, distance: Distance) {
        self.rows
            .entry(auditor_id.to_string())
            .or_default()
            .insert(location_id.to_string(), distance);
    }

    /// Distance for a pair. Unknown ids are unreachable.
    pub fn distance(&self, auditor_id: &str, location_id: &str) -> Distance {
        self.rows
            .get(auditor_id)
            .and_then(|row| row.get(location_id))
            .copied()
            .unwrap_or(Distance::Unreachable)
    }

    /// Shortest distance from any auditor to the location.
    pub fn min_distance_to(&self, location_id: &str) -> Distance {
        self.rows
            .values()
            .filter_map(|row| row.get(location_id).and_then(|d| d.km()))
            .filter(|km| km.is_finite())
            .min_by(|a, b| a.total_cmp(b))
            .map(Distance::Km)
            .unwrap_or(Distance::Unreachable)
    }

    pub fn auditor_count(&self) -> usize {
        self.rows.len()
    }
}
