/// Errors reported to callers of the trip monitor handle.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TrackerError {
    #[error("A trip is already being tracked")]
    AlreadyTracking,

    #[error("No trip is being tracked")]
    NotTracking,

    #[error("Unable to retrieve location: {0}")]
    LocationUnavailable(String),

    #[error("Location permission denied")]
    PermissionDenied,

    #[error("Invalid check-in duration: {0} minutes")]
    InvalidDuration(f64),

    #[error("No location available yet")]
    NoLocation,

    #[error("Trip monitor is no longer running")]
    Closed,
}

/// Errors from a one-shot position fix request.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PositionError {
    #[error("Position unavailable: {0}")]
    Unavailable(String),

    #[error("Location permission denied")]
    PermissionDenied,

    #[error("Timed out waiting for a position fix")]
    Timeout,
}

impl From<PositionError> for TrackerError {
    fn from(error: PositionError) -> Self {
        match error {
            PositionError::Unavailable(reason) => TrackerError::LocationUnavailable(reason),
            PositionError::PermissionDenied => TrackerError::PermissionDenied,
            PositionError::Timeout => {
                TrackerError::LocationUnavailable("position request timed out".to_string())
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamErrorKind {
    /// Transient loss of signal. Tracking continues.
    SignalLost,
    /// The platform revoked location access. The feed is dead.
    PermissionRevoked,
}

/// Error delivered through a live position subscription.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("{message}")]
pub struct StreamError {
    pub kind: StreamErrorKind,
    pub message: String,
}

impl StreamError {
    pub fn signal_lost(message: impl Into<String>) -> Self {
        Self {
            kind: StreamErrorKind::SignalLost,
            message: message.into(),
        }
    }

    pub fn permission_revoked(message: impl Into<String>) -> Self {
        Self {
            kind: StreamErrorKind::PermissionRevoked,
            message: message.into(),
        }
    }

    /// Fatal errors end the trip; recoverable ones only surface in the status line.
    pub fn is_fatal(&self) -> bool {
        self.kind == StreamErrorKind::PermissionRevoked
    }
}
