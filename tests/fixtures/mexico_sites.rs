//! Real Mexican city coordinates for realistic test fixtures.
//!
//! Coordinates are city/district centers from OpenStreetMap, rounded to
//! four decimals.

/// A named point.
#[derive(Debug, Clone, Copy)]
pub struct Site {
    pub name: &'static str,
    pub lat: f64,
    pub lon: f64,
}

impl Site {
    pub const fn new(name: &'static str, lat: f64, lon: f64) -> Self {
        Self { name, lat, lon }
    }
}

// ============================================================================
// Monterrey metro area (Norte)
// ============================================================================

pub const MONTERREY_CENTRO: Site = Site::new("Monterrey Centro", 25.6866, -100.3161);
pub const GUADALUPE_NL: Site = Site::new("Guadalupe", 25.6775, -100.2597);
pub const SAN_PEDRO: Site = Site::new("San Pedro Garza Garcia", 25.6573, -100.4022);
pub const APODACA: Site = Site::new("Apodaca", 25.7817, -100.1883);
pub const SAN_NICOLAS: Site = Site::new("San Nicolas de los Garza", 25.7417, -100.3022);
pub const SANTA_CATARINA: Site = Site::new("Santa Catarina", 25.6733, -100.4583);

pub const MONTERREY_SITES: &[Site] = &[
    MONTERREY_CENTRO,
    GUADALUPE_NL,
    SAN_PEDRO,
    APODACA,
    SAN_NICOLAS,
    SANTA_CATARINA,
];

// ============================================================================
// Elsewhere
// ============================================================================

/// Roughly 400 km south of Monterrey.
pub const SAN_LUIS_POTOSI: Site = Site::new("San Luis Potosi", 22.1565, -100.9855);
pub const SALTILLO: Site = Site::new("Saltillo", 25.4232, -101.0053);
pub const CDMX_ZOCALO: Site = Site::new("CDMX Zocalo", 19.4326, -99.1332);
pub const CDMX_POLANCO: Site = Site::new("CDMX Polanco", 19.4336, -99.1910);
pub const GUADALAJARA: Site = Site::new("Guadalajara", 20.6597, -103.3496);
pub const MERIDA: Site = Site::new("Merida", 20.9674, -89.5926);
