use serde::{Deserialize, Serialize};

/// Severity of a status line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StatusLevel {
    Ok,
    Warn,
    Error,
}

/// One user-facing line describing what the tracker is doing. Published on
/// a watch channel so a presentation layer can render the latest value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Status {
    pub message: String,
    pub level: StatusLevel,
}

impl Status {
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            level: StatusLevel::Ok,
        }
    }

    pub fn warn(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            level: StatusLevel::Warn,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            level: StatusLevel::Error,
        }
    }

    /// Initial line before anything has happened.
    pub fn ready() -> Self {
        Self::ok("Ready")
    }
}
