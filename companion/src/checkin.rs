use std::time::Duration;

use tokio::time::Instant;

use crate::error::TrackerError;

/// Single-shot check-in countdown.
///
/// Independent of trip state: a countdown may be armed while no trip is
/// tracked. Pure synchronous state, driven like the stillness window.
#[derive(Debug, Default)]
pub struct CheckinTimer {
    deadline: Option<Instant>,
}

impl CheckinTimer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Arm a countdown of `minutes`, replacing any pending one. A rejected
    /// duration leaves a pending countdown untouched.
    pub fn start(&mut self, minutes: f64, now: Instant) -> Result<(), TrackerError> {
        if !minutes.is_finite() || minutes <= 0.0 {
            return Err(TrackerError::InvalidDuration(minutes));
        }

        let duration = Duration::try_from_secs_f64(minutes * 60.0)
            .map_err(|_| TrackerError::InvalidDuration(minutes))?;
        let deadline = now
            .checked_add(duration)
            .ok_or(TrackerError::InvalidDuration(minutes))?;

        self.deadline = Some(deadline);
        Ok(())
    }

    /// Clear the pending countdown. Returns whether one was pending.
    pub fn cancel(&mut self) -> bool {
        self.deadline.take().is_some()
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Consume the countdown once its deadline has elapsed. Returns `true`
    /// if one was pending; the caller emits the alert.
    pub fn expire(&mut self) -> bool {
        self.deadline.take().is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn start_arms_a_deadline() {
        let mut timer = CheckinTimer::new();
        let t0 = Instant::now();
        timer.start(5.0, t0).unwrap();
        assert_eq!(timer.deadline(), Some(t0 + Duration::from_secs(300)));
    }

    #[test]
    fn fractional_minutes() {
        let mut timer = CheckinTimer::new();
        let t0 = Instant::now();
        timer.start(0.5, t0).unwrap();
        assert_eq!(timer.deadline(), Some(t0 + Duration::from_secs(30)));
    }

    #[test]
    fn rejects_non_positive_and_non_finite() {
        let mut timer = CheckinTimer::new();
        let t0 = Instant::now();

        for minutes in [-1.0, 0.0, f64::NAN, f64::INFINITY] {
            let result = timer.start(minutes, t0);
            assert!(matches!(result, Err(TrackerError::InvalidDuration(_))));
            assert_eq!(timer.deadline(), None);
        }
    }

    #[test]
    fn rejected_start_keeps_pending_countdown() {
        let mut timer = CheckinTimer::new();
        let t0 = Instant::now();

        timer.start(5.0, t0).unwrap();
        assert!(timer.start(-1.0, t0).is_err());
        assert_eq!(timer.deadline(), Some(t0 + Duration::from_secs(300)));
    }

    #[test]
    fn restart_replaces_deadline() {
        let mut timer = CheckinTimer::new();
        let t0 = Instant::now();

        timer.start(5.0, t0).unwrap();
        timer.start(1.0, t0 + Duration::from_secs(10)).unwrap();
        assert_eq!(timer.deadline(), Some(t0 + Duration::from_secs(70)));
    }

    #[test]
    fn cancel_and_expire_clear() {
        let mut timer = CheckinTimer::new();
        let t0 = Instant::now();

        timer.start(5.0, t0).unwrap();
        assert!(timer.cancel());
        assert!(!timer.cancel());
        assert!(!timer.expire());

        timer.start(5.0, t0).unwrap();
        assert!(timer.expire());
        assert_eq!(timer.deadline(), None);
    }
}
