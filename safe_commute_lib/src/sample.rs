use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::coordinate::Coordinate;

/// A single fix from the position stream.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PositionSample {
    pub coordinate: Coordinate,
    /// Reported horizontal accuracy radius in meters.
    pub accuracy_meters: f64,
    pub timestamp: DateTime<Utc>,
}

impl PositionSample {
    pub fn new(coordinate: Coordinate, accuracy_meters: f64, timestamp: DateTime<Utc>) -> Self {
        Self {
            coordinate,
            accuracy_meters,
            timestamp,
        }
    }

    /// A sample is usable when its coordinate is in range and its accuracy
    /// is a finite non-negative radius.
    pub fn is_valid(&self) -> bool {
        self.coordinate.is_valid() && self.accuracy_meters.is_finite() && self.accuracy_meters >= 0.0
    }
}
