use safe_commute_lib::alert::{AlertEvent, AlertKind};
use safe_commute_lib::coordinate::Coordinate;
use tokio::sync::broadcast;

pub const TRIP_STARTED_MESSAGE: &str = "Trip started. Sharing live location.";
pub const STOPPED_MOVING_MESSAGE: &str = "User has stopped moving. Check safety.";
pub const MISSED_CHECKIN_MESSAGE: &str = "User missed check-in. Please verify safety.";
pub const SOS_MESSAGE: &str = "EMERGENCY! I need help. Sharing my live location.";
pub const LOCATION_SHARE_MESSAGE: &str = "Sharing current location:";

/// Fans alert events out to whatever transports are listening.
///
/// Fire and forget: sends with no receivers are fine, delivery is never
/// awaited or retried.
#[derive(Debug, Clone)]
pub struct AlertDispatcher {
    tx: broadcast::Sender<AlertEvent>,
}

impl AlertDispatcher {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(100);
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<AlertEvent> {
        self.tx.subscribe()
    }

    pub fn emit(&self, kind: AlertKind, message: impl Into<String>, location: Option<Coordinate>) {
        let alert = AlertEvent::new(kind, message, location);
        tracing::info!("Alert {:?}: {}", alert.kind, alert.message);
        let _ = self.tx.send(alert);
    }
}

impl Default for AlertDispatcher {
    fn default() -> Self {
        Self::new()
    }
}
