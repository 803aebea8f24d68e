use serde::{Deserialize, Serialize};

/// A point on the globe in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinate {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Latitude must lie in [-90, 90] and longitude in [-180, 180].
    pub fn is_valid(&self) -> bool {
        self.latitude.is_finite()
            && self.longitude.is_finite()
            && (-90.0..=90.0).contains(&self.latitude)
            && (-180.0..=180.0).contains(&self.longitude)
    }

    /// Great-circle distance to `other` in meters (haversine).
    pub fn distance_meters(&self, other: &Coordinate) -> f64 {
        const R: f64 = 6_371_000.0; // Earth radius in meters

        let d_lat = (other.latitude - self.latitude).to_radians();
        let d_lon = (other.longitude - self.longitude).to_radians();
        let lat1 = self.latitude.to_radians();
        let lat2 = other.latitude.to_radians();

        let a = f64::sin(d_lat / 2.).powi(2)
            + f64::cos(lat1) * f64::cos(lat2) * f64::sin(d_lon / 2.).powi(2);
        let c = 2. * f64::asin(f64::sqrt(a));

        R * c
    }

    /// OpenStreetMap link centered on this coordinate, used when a
    /// location is shared outward.
    pub fn osm_url(&self) -> String {
        format!(
            "https://www.openstreetmap.org/?mlat={lat}&mlon={lon}#map=18/{lat}/{lon}",
            lat = self.latitude,
            lon = self.longitude
        )
    }
}

/// Distance in meters between two possibly-unknown positions.
///
/// An absent operand yields infinity: "no movement recorded yet" must never
/// be mistaken for "not moving".
pub fn distance_meters(a: Option<Coordinate>, b: Option<Coordinate>) -> f64 {
    match (a, b) {
        (Some(a), Some(b)) => a.distance_meters(&b),
        _ => f64::INFINITY,
    }
}
