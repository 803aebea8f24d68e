use serde::{Deserialize, Serialize};

use crate::coordinate::Coordinate;

/// Why an alert went out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AlertKind {
    TripStarted,
    StoppedMoving,
    MissedCheckin,
    Sos,
    LocationShare,
}

/// An outbound notification to the user's emergency contacts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlertEvent {
    pub kind: AlertKind,
    pub message: String,
    /// Last known position at the time of dispatch, if any.
    pub location: Option<Coordinate>,
}

impl AlertEvent {
    pub fn new(kind: AlertKind, message: impl Into<String>, location: Option<Coordinate>) -> Self {
        Self {
            kind,
            message: message.into(),
            location,
        }
    }

    /// The full text handed to the sharing channel. Includes a map link
    /// when a position is known.
    pub fn share_text(&self) -> String {
        match &self.location {
            Some(coordinate) => {
                format!("{}\n\nLocation: {}", self.message, coordinate.osm_url())
            }
            None => format!("{}\n\nLocation not available", self.message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn share_text_links_known_location() {
        let alert = AlertEvent::new(
            AlertKind::Sos,
            "EMERGENCY! I need help. Sharing my live location.",
            Some(Coordinate::new(1.0, 2.0)),
        );
        let text = alert.share_text();
        assert!(text.starts_with("EMERGENCY! I need help."));
        assert!(text.contains("https://www.openstreetmap.org/?mlat=1&mlon=2"));
    }

    #[test]
    fn share_text_without_location() {
        let alert = AlertEvent::new(AlertKind::MissedCheckin, "User missed check-in.", None);
        assert_eq!(
            alert.share_text(),
            "User missed check-in.\n\nLocation not available"
        );
    }
}
