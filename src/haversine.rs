//! Haversine distance matrix provider.
//!
//! Uses great-circle distance between an auditor's home and each location.
//! Ignores roads, but needs nothing beyond the coordinates already stored.

use std::collections::HashMap;

use rayon::prelude::*;

use crate::matrix::{Distance, DistanceMatrix};
use crate::models::{Auditor, Coordinates, Location};
use crate::traits::DistanceMatrixProvider;

/// Earth radius in kilometers.
const EARTH_RADIUS_KM: f64 = 6371.0;

/// Haversine distance between two `(lat, lon)` points in kilometers,
/// rounded to 2 decimals.
pub fn haversine_km(from: (f64, f64), to: (f64, f64)) -> f64 {
    let (lat1, lon1) = from;
    let (lat2, lon2) = to;

    let lat1_rad = lat1.to_radians();
    let lat2_rad = lat2.to_radians();
    let delta_lat = (lat2 - lat1).to_radians();
    let delta_lon = (lon2 - lon1).to_radians();

    let a = (delta_lat / 2.0).sin().powi(2)
        + lat1_rad.cos() * lat2_rad.cos() * (delta_lon / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    (EARTH_RADIUS_KM * c * 100.0).round() / 100.0
}

/// Distance between two optional coordinates.
///
/// Missing points, or points missing `lat`/`lon`, are unreachable.
pub fn haversine_distance_km(from: Option<&Coordinates>, to: Option<&Coordinates>) -> Distance {
    match (from.and_then(Coordinates::point), to.and_then(Coordinates::point)) {
        (Some(from), Some(to)) => Distance::Km(haversine_km(from, to)),
        _ => Distance::Unreachable,
    }
}

/// Haversine-based distance matrix provider.
///
/// Stateless: every call recomputes the full matrix.
#[derive(Debug, Clone, Copy, Default)]
pub struct HaversineMatrix;

impl DistanceMatrixProvider for HaversineMatrix {
    fn matrix_for(&self, auditors: &[Auditor], locations: &[Location]) -> DistanceMatrix {
        let rows: HashMap<String, HashMap<String, Distance>> = auditors
            .par_iter()
            .map(|auditor| {
                let home = auditor.home_address_coordinates.as_ref();
                let row = locations
                    .iter()
                    .map(|location| {
                        let distance =
                            haversine_distance_km(home, location.location_coordinates.as_ref());
                        (location.id.clone(), distance)
                    })
                    .collect();
                (auditor.id.clone(), row)
            })
            .collect();

        DistanceMatrix::from_rows(rows)
    }
}
