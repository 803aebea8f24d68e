use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use safe_commute_lib::{
    alert::{AlertEvent, AlertKind},
    coordinate::{self, Coordinate},
    sample::PositionSample,
};
use tokio::{
    sync::{broadcast, mpsc, oneshot, watch},
    time::Instant,
};

use crate::checkin::CheckinTimer;
use crate::dispatch::{self, AlertDispatcher};
use crate::error::{PositionError, StreamError, TrackerError};
use crate::position::{PositionSource, PositionSubscription, PositionUpdate};
use crate::status::Status;
use crate::stillness::{StillnessConfig, StillnessDetector};

#[derive(Debug, Clone, Copy)]
pub struct MonitorConfig {
    pub stillness: StillnessConfig,
    /// How long `start_trip` waits for the initial fix before giving up.
    pub first_fix_timeout: Duration,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            stillness: StillnessConfig::default(),
            first_fix_timeout: Duration::from_secs(10),
        }
    }
}

type Reply = oneshot::Sender<Result<(), TrackerError>>;

enum Command {
    StartTrip(Reply),
    StopTrip(Reply),
    StartCheckin(f64, Reply),
    CancelCheckin(Reply),
    TriggerSos(Reply),
    ShareLocation(Reply),
}

/// A start request whose first fix is still resolving off the loop.
struct PendingStart {
    outcome: oneshot::Receiver<Result<PositionSample, PositionError>>,
    reply: Reply,
}

enum TripState {
    Idle,
    Tracking {
        subscription: PositionSubscription,
        start_location: Coordinate,
        started_at: DateTime<Utc>,
    },
}

/// Client side of the trip monitor. Cheap to clone; all clones talk to the
/// same supervisor task. The task shuts down when the last handle is dropped.
#[derive(Clone)]
pub struct TripHandle {
    commands: mpsc::Sender<Command>,
    alerts: AlertDispatcher,
    status: watch::Receiver<Status>,
    position: watch::Receiver<Option<PositionSample>>,
}

impl TripHandle {
    pub async fn start_trip(&self) -> Result<(), TrackerError> {
        self.request(Command::StartTrip).await
    }

    pub async fn stop_trip(&self) -> Result<(), TrackerError> {
        self.request(Command::StopTrip).await
    }

    /// Arm the check-in countdown, replacing any pending one.
    pub async fn start_checkin(&self, minutes: f64) -> Result<(), TrackerError> {
        self.request(|reply| Command::StartCheckin(minutes, reply)).await
    }

    pub async fn cancel_checkin(&self) -> Result<(), TrackerError> {
        self.request(Command::CancelCheckin).await
    }

    pub async fn trigger_sos(&self) -> Result<(), TrackerError> {
        self.request(Command::TriggerSos).await
    }

    /// Share the last known location on demand.
    pub async fn share_location(&self) -> Result<(), TrackerError> {
        self.request(Command::ShareLocation).await
    }

    pub fn alerts(&self) -> broadcast::Receiver<AlertEvent> {
        self.alerts.subscribe()
    }

    pub fn status(&self) -> watch::Receiver<Status> {
        self.status.clone()
    }

    pub fn position(&self) -> watch::Receiver<Option<PositionSample>> {
        self.position.clone()
    }

    async fn request(&self, build: impl FnOnce(Reply) -> Command) -> Result<(), TrackerError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.commands
            .send(build(reply_tx))
            .await
            .map_err(|_| TrackerError::Closed)?;
        reply_rx.await.map_err(|_| TrackerError::Closed)?
    }
}

/// Supervisor owning all trip state. Every transition happens inside its
/// event loop, in response to a command, a first-fix resolution, a stream
/// update or an elapsed deadline, so there is nothing to lock and no timer
/// callback to race.
pub struct TripMonitor {
    source: Arc<dyn PositionSource>,
    config: MonitorConfig,
    state: TripState,
    pending_start: Option<PendingStart>,
    detector: StillnessDetector,
    checkin: CheckinTimer,
    last_known: Option<Coordinate>,
    alerts: AlertDispatcher,
    status: watch::Sender<Status>,
    position: watch::Sender<Option<PositionSample>>,
}

impl TripMonitor {
    pub fn spawn(source: Arc<dyn PositionSource>, config: MonitorConfig) -> TripHandle {
        let (command_tx, command_rx) = mpsc::channel(16);
        let (status_tx, status_rx) = watch::channel(Status::ready());
        let (position_tx, position_rx) = watch::channel(None);
        let alerts = AlertDispatcher::new();

        let monitor = TripMonitor {
            source,
            config,
            state: TripState::Idle,
            pending_start: None,
            detector: StillnessDetector::new(config.stillness),
            checkin: CheckinTimer::new(),
            last_known: None,
            alerts: alerts.clone(),
            status: status_tx,
            position: position_tx,
        };

        tokio::spawn(monitor.run(command_rx));

        TripHandle {
            commands: command_tx,
            alerts,
            status: status_rx,
            position: position_rx,
        }
    }

    async fn run(mut self, mut commands: mpsc::Receiver<Command>) {
        loop {
            let stillness_deadline = self.detector.deadline();
            let checkin_deadline = self.checkin.deadline();

            tokio::select! {
                biased;

                command = commands.recv() => {
                    let Some(command) = command else {
                        // Last handle dropped.
                        break;
                    };
                    self.handle_command(command);
                }

                fix = first_fix(&mut self.pending_start) => {
                    self.start_resolved(fix).await;
                }

                update = next_update(&mut self.state) => {
                    match update {
                        Some(Ok(sample)) => self.handle_sample(sample),
                        Some(Err(error)) => self.handle_stream_error(error),
                        None => self.handle_stream_end(),
                    }
                }

                _ = sleep_until_opt(stillness_deadline) => {
                    self.stillness_elapsed();
                }

                _ = sleep_until_opt(checkin_deadline) => {
                    self.checkin_elapsed();
                }
            }
        }

        tracing::debug!("Trip monitor shutting down");
    }

    fn handle_command(&mut self, command: Command) {
        match command {
            Command::StartTrip(reply) => {
                self.start_trip(reply);
            }
            Command::StopTrip(reply) => {
                let _ = reply.send(self.stop_trip());
            }
            Command::StartCheckin(minutes, reply) => {
                let _ = reply.send(self.checkin.start(minutes, Instant::now()));
            }
            Command::CancelCheckin(reply) => {
                self.checkin.cancel();
                let _ = reply.send(Ok(()));
            }
            Command::TriggerSos(reply) => {
                self.trigger_sos();
                let _ = reply.send(Ok(()));
            }
            Command::ShareLocation(reply) => {
                let _ = reply.send(self.share_location());
            }
        }
    }

    fn start_trip(&mut self, reply: Reply) {
        if matches!(self.state, TripState::Tracking { .. }) || self.pending_start.is_some() {
            let _ = reply.send(Err(TrackerError::AlreadyTracking));
            return;
        }

        // Resolve the fix off the loop so armed deadlines keep firing on
        // time while we wait.
        let (tx, rx) = oneshot::channel();
        let source = self.source.clone();
        let first_fix_timeout = self.config.first_fix_timeout;
        tokio::spawn(async move {
            let fix = tokio::time::timeout(first_fix_timeout, source.current_position())
                .await
                .unwrap_or(Err(PositionError::Timeout));
            let _ = tx.send(fix);
        });

        self.pending_start = Some(PendingStart { outcome: rx, reply });
    }

    async fn start_resolved(&mut self, fix: Result<PositionSample, PositionError>) {
        let Some(PendingStart { reply, .. }) = self.pending_start.take() else {
            return;
        };

        let fix = fix.and_then(|sample| {
            if sample.is_valid() {
                Ok(sample)
            } else {
                Err(PositionError::Unavailable(
                    "source reported an invalid fix".to_string(),
                ))
            }
        });

        let sample = match fix {
            Ok(sample) => sample,
            Err(error) => {
                tracing::error!("Could not get initial fix: {error}");
                self.status
                    .send_replace(Status::error(format!("Unable to get current location: {error}")));
                let _ = reply.send(Err(error.into()));
                return;
            }
        };

        let subscription = self.source.subscribe().await;

        self.last_known = Some(sample.coordinate);
        self.state = TripState::Tracking {
            subscription,
            start_location: sample.coordinate,
            started_at: Utc::now(),
        };
        self.position.send_replace(Some(sample));
        self.alerts.emit(
            AlertKind::TripStarted,
            dispatch::TRIP_STARTED_MESSAGE,
            Some(sample.coordinate),
        );
        self.status
            .send_replace(Status::ok("Trip Started... Tracking location"));
        tracing::info!(
            "Trip started at ({:.5}, {:.5})",
            sample.coordinate.latitude,
            sample.coordinate.longitude
        );

        let _ = reply.send(Ok(()));
    }

    fn stop_trip(&mut self) -> Result<(), TrackerError> {
        let previous = std::mem::replace(&mut self.state, TripState::Idle);
        let TripState::Tracking { start_location, started_at, .. } = previous else {
            return Err(TrackerError::NotTracking);
        };
        // The subscription was dropped with `previous`, which ends the feed.

        self.detector.reset();
        self.checkin.cancel();
        self.position.send_replace(None);
        self.status.send_replace(Status::warn("Trip stopped."));

        let distance = coordinate::distance_meters(Some(start_location), self.last_known);
        tracing::info!(
            "Trip stopped after {} s, {:.0} m from start",
            (Utc::now() - started_at).num_seconds(),
            distance
        );

        Ok(())
    }

    fn handle_sample(&mut self, sample: PositionSample) {
        if !sample.is_valid() {
            tracing::warn!(
                "Ignoring invalid sample ({}, {}) accuracy {}",
                sample.coordinate.latitude,
                sample.coordinate.longitude,
                sample.accuracy_meters
            );
            return;
        }

        tracing::trace!(
            "Sample ({:.5}, {:.5}) accuracy {:.0} m",
            sample.coordinate.latitude,
            sample.coordinate.longitude,
            sample.accuracy_meters
        );

        self.last_known = Some(sample.coordinate);
        self.detector.observe(&sample, Instant::now());
        self.position.send_replace(Some(sample));
    }

    fn handle_stream_error(&mut self, error: StreamError) {
        if error.is_fatal() {
            tracing::error!("Fatal stream error, stopping trip: {}", error.message);
            let _ = self.stop_trip();
        } else {
            tracing::warn!("Stream error: {}", error.message);
        }
        self.status
            .send_replace(Status::error(format!("Location error: {}", error.message)));
    }

    fn handle_stream_end(&mut self) {
        tracing::error!("Position stream ended unexpectedly, stopping trip");
        let _ = self.stop_trip();
        self.status
            .send_replace(Status::error("Location error: position stream ended"));
    }

    fn stillness_elapsed(&mut self) {
        if self.detector.expire() {
            tracing::warn!("No movement inside the stillness window, alerting contacts");
            self.alerts.emit(
                AlertKind::StoppedMoving,
                dispatch::STOPPED_MOVING_MESSAGE,
                self.last_known,
            );
        }
    }

    fn checkin_elapsed(&mut self) {
        if self.checkin.expire() {
            tracing::warn!("Check-in deadline passed, alerting contacts");
            self.alerts.emit(
                AlertKind::MissedCheckin,
                dispatch::MISSED_CHECKIN_MESSAGE,
                self.last_known,
            );
        }
    }

    fn trigger_sos(&self) {
        tracing::warn!("SOS triggered");
        self.alerts
            .emit(AlertKind::Sos, dispatch::SOS_MESSAGE, self.last_known);
    }

    fn share_location(&self) -> Result<(), TrackerError> {
        let Some(location) = self.last_known else {
            return Err(TrackerError::NoLocation);
        };
        self.alerts.emit(
            AlertKind::LocationShare,
            dispatch::LOCATION_SHARE_MESSAGE,
            Some(location),
        );
        Ok(())
    }
}

async fn next_update(state: &mut TripState) -> Option<PositionUpdate> {
    match state {
        TripState::Tracking { subscription, .. } => subscription.next().await,
        TripState::Idle => std::future::pending().await,
    }
}

/// Completion of the spawned first-fix request; pends while no start is
/// in flight.
async fn first_fix(pending: &mut Option<PendingStart>) -> Result<PositionSample, PositionError> {
    match pending {
        Some(start) => match (&mut start.outcome).await {
            Ok(fix) => fix,
            Err(_) => Err(PositionError::Unavailable(
                "fix request was dropped".to_string(),
            )),
        },
        None => std::future::pending().await,
    }
}

/// A disarmed deadline never completes, so its select arm is inert.
async fn sleep_until_opt(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => tokio::time::sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}
