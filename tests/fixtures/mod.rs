//! Test fixtures for auditor-planner.
//!
//! Provides:
//! - Real Mexican city coordinates
//! - Builders for locations and auditors
//! - A fixed-distance matrix provider for exact distance scenarios

#![allow(dead_code)]

pub mod mexico_sites;

use std::collections::HashMap;

use auditor_planner::matrix::{Distance, DistanceMatrix};
use auditor_planner::models::{Auditor, Coordinates, Location, Zone};
use auditor_planner::traits::DistanceMatrixProvider;

pub use mexico_sites::*;

/// Builder for test locations with sensible defaults.
#[derive(Clone, Debug)]
pub struct TestLocation {
    location: Location,
}

impl TestLocation {
    pub fn new(id: &str) -> Self {
        Self {
            location: Location {
                id: id.to_string(),
                cliente: "Banco del Norte".to_string(),
                convenio: format!("CONV-{}", id),
                agencia: format!("Agencia {}", id),
                direccion: None,
                ciudad: None,
                estado: None,
                zona: Some(Zone::Norte),
                es_matriz: false,
                is_active: true,
                location_coordinates: None,
            },
        }
    }

    pub fn at(mut self, site: Site) -> Self {
        self.location.location_coordinates = Some(Coordinates::new(site.lat, site.lon));
        self.location.ciudad = Some(site.name.to_string());
        self
    }

    pub fn convenio(mut self, convenio: &str) -> Self {
        self.location.convenio = convenio.to_string();
        self
    }

    pub fn zona(mut self, zone: Zone) -> Self {
        self.location.zona = Some(zone);
        self
    }

    pub fn matriz(mut self) -> Self {
        self.location.es_matriz = true;
        self
    }

    pub fn inactive(mut self) -> Self {
        self.location.is_active = false;
        self
    }

    pub fn build(self) -> Location {
        self.location
    }
}

/// Builder for test auditors.
#[derive(Clone, Debug)]
pub struct TestAuditor {
    auditor: Auditor,
}

impl TestAuditor {
    pub fn new(id: &str) -> Self {
        Self {
            auditor: Auditor {
                id: id.to_string(),
                full_name: format!("Auditor {}", id),
                zone: Some(Zone::Norte),
                home_address_coordinates: None,
            },
        }
    }

    pub fn home(mut self, site: Site) -> Self {
        self.auditor.home_address_coordinates = Some(Coordinates::new(site.lat, site.lon));
        self
    }

    pub fn zone(mut self, zone: Zone) -> Self {
        self.auditor.zone = Some(zone);
        self
    }

    pub fn build(self) -> Auditor {
        self.auditor
    }
}

/// Distance matrix with hand-picked distances. Unlisted pairs are
/// unreachable.
#[derive(Debug, Default)]
pub struct FixedMatrix {
    distances: HashMap<(String, String), f64>,
}

impl FixedMatrix {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn distance(mut self, auditor_id: &str, location_id: &str, km: f64) -> Self {
        self.distances
            .insert((auditor_id.to_string(), location_id.to_string()), km);
        self
    }
}

impl DistanceMatrixProvider for FixedMatrix {
    fn matrix_for(&self, auditors: &[Auditor], locations: &[Location]) -> DistanceMatrix {
        let mut matrix = DistanceMatrix::new();
        for auditor in auditors {
            for location in locations {
                let distance = self
                    .distances
                    .get(&(auditor.id.clone(), location.id.clone()))
                    .map(|&km| Distance::Km(km))
                    .unwrap_or(Distance::Unreachable);
                matrix.insert(&auditor.id, &location.id, distance);
            }
        }
        matrix
    }
}
