use std::time::Duration;

use safe_commute_lib::coordinate::{self, Coordinate};
use safe_commute_lib::sample::PositionSample;
use tokio::time::Instant;

/// Tuning for stopped-moving detection.
#[derive(Debug, Clone, Copy)]
pub struct StillnessConfig {
    /// Movement below this distance counts as standing still.
    pub threshold_meters: f64,
    /// How long the user must stay within the threshold before an alert fires.
    pub still_duration: Duration,
}

impl Default for StillnessConfig {
    fn default() -> Self {
        Self {
            threshold_meters: 10.0,
            still_duration: Duration::from_secs(60),
        }
    }
}

/// Lifecycle of the single-shot stillness window.
#[derive(Debug, Clone, Copy, PartialEq)]
enum StillnessWindow {
    Disarmed,
    /// No sufficient movement since the window was armed; an alert is due
    /// at `deadline` unless movement resumes first.
    Armed { deadline: Instant },
    /// The alert for the current stop already fired. Stays consumed until
    /// movement resumes.
    Alerted,
}

/// Watches successive position samples for prolonged stillness.
///
/// Pure synchronous state. The owner drives time by polling [`deadline`]
/// and calling [`expire`] when it elapses.
///
/// [`deadline`]: StillnessDetector::deadline
/// [`expire`]: StillnessDetector::expire
#[derive(Debug)]
pub struct StillnessDetector {
    config: StillnessConfig,
    last_location: Option<Coordinate>,
    window: StillnessWindow,
}

impl StillnessDetector {
    pub fn new(config: StillnessConfig) -> Self {
        Self {
            config,
            last_location: None,
            window: StillnessWindow::Disarmed,
        }
    }

    /// Feed one sample. Arms the window when movement stalls, disarms it
    /// when movement resumes.
    pub fn observe(&mut self, sample: &PositionSample, now: Instant) {
        let delta = coordinate::distance_meters(self.last_location, Some(sample.coordinate));

        if delta < self.config.threshold_meters {
            // An Alerted window stays consumed until movement resumes.
            if self.window == StillnessWindow::Disarmed {
                self.window = StillnessWindow::Armed {
                    deadline: now + self.config.still_duration,
                };
            }
        } else {
            // Covers real movement and the infinite first-sample delta.
            self.window = StillnessWindow::Disarmed;
        }

        self.last_location = Some(sample.coordinate);
    }

    /// Deadline of the armed window, if any.
    pub fn deadline(&self) -> Option<Instant> {
        match self.window {
            StillnessWindow::Armed { deadline } => Some(deadline),
            _ => None,
        }
    }

    /// Consume the armed window once its deadline has elapsed. Returns
    /// `true` exactly once per stop; the caller emits the alert.
    pub fn expire(&mut self) -> bool {
        match self.window {
            StillnessWindow::Armed { .. } => {
                self.window = StillnessWindow::Alerted;
                true
            }
            _ => false,
        }
    }

    /// Forget all observations. Called when the trip stops.
    pub fn reset(&mut self) {
        self.last_location = None;
        self.window = StillnessWindow::Disarmed;
    }
}
